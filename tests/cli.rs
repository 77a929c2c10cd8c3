use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const ARTICLE: &str = r#"<html><head>
    <title>How Otters Sleep — Example Site</title>
    <meta property="og:site_name" content="Example Site">
    <meta property="og:title" content="How Otters Sleep — Example Site">
    <meta name="citation_author" content="Barbara Moran">
    <meta property="article:published_time" content="2023-04-05T10:12:00Z">
    <meta name="citation_doi" content="doi:10.1234/otters.5678">
    <link rel="canonical" href="https://example.com/otters">
    </head><body>
    <div class="byline">By Barbara Moran / WBUR</div>
    <p>Some text about otters.</p>
    </body></html>"#;

fn fixture(html: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".html")
        .tempfile()
        .expect("tmp file");
    file.write_all(html.as_bytes()).expect("write fixture");
    file
}

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("cite").expect("binary");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn cite_renders_an_apa_citation_from_a_file() -> Result<(), Box<dyn std::error::Error>> {
    let file = fixture(ARTICLE);
    let output = bin()
        .arg("cite")
        .arg(file.path())
        .arg("--page-url")
        .arg("https://www.example.com/otters")
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert!(
        stdout.contains("Moran, B. (2023, April 5). How Otters Sleep. Example Site."),
        "unexpected citation. stdout=\n{stdout}"
    );
    assert!(
        stdout.contains("https://doi.org/10.1234/otters.5678"),
        "missing DOI link. stdout=\n{stdout}"
    );
    assert!(
        stderr.contains("✓ 1") && stderr.contains("✗ 0"),
        "stderr summary mismatch. stderr=\n{stderr}"
    );
    Ok(())
}

#[test]
fn cite_supports_other_styles() -> Result<(), Box<dyn std::error::Error>> {
    let file = fixture(ARTICLE);
    bin()
        .arg("cite")
        .arg(file.path())
        .arg("--style")
        .arg("mla")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moran, Barbara."))
        .stdout(predicate::str::contains("\u{201c}How Otters Sleep.\u{201d}"));
    Ok(())
}

#[test]
fn export_emits_a_bibtex_record() -> Result<(), Box<dyn std::error::Error>> {
    let file = fixture(ARTICLE);
    let output = bin().arg("export").arg(file.path()).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("@misc{"), "stdout=\n{stdout}");
    assert!(stdout.contains("Barbara Moran"), "stdout=\n{stdout}");
    assert!(stdout.contains("10.1234/otters.5678"), "stdout=\n{stdout}");
    Ok(())
}

#[test]
fn export_emits_ris_and_csl_json() -> Result<(), Box<dyn std::error::Error>> {
    let file = fixture(ARTICLE);
    bin()
        .arg("export")
        .arg(file.path())
        .arg("--format")
        .arg("ris")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("TY  - ELEC"))
        .stdout(predicate::str::contains("AU  - Moran, Barbara"))
        .stdout(predicate::str::contains("ER  - "));

    let output = bin()
        .arg("export")
        .arg(file.path())
        .arg("--format")
        .arg("csl-json")
        .output()?;
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value[0]["type"], "webpage");
    assert_eq!(value[0]["author"][0]["family"], "Moran");
    Ok(())
}

#[test]
fn manual_overrides_replace_extracted_fields() -> Result<(), Box<dyn std::error::Error>> {
    let file = fixture(ARTICLE);
    let output = bin()
        .arg("cite")
        .arg(file.path())
        .arg("--authors")
        .arg("Jane Doe, John Smith")
        .arg("--title")
        .arg("A Better Title")
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(
        stdout.contains("Doe, J. & Smith, J."),
        "override not applied. stdout=\n{stdout}"
    );
    assert!(stdout.contains("A Better Title"), "stdout=\n{stdout}");
    Ok(())
}

#[test]
fn unknown_sources_are_rejected_at_parse_time() {
    // Neither an existing file nor an http(s) URL.
    bin().arg("cite").arg("no-such-file.html").assert().failure();
}

#[test]
fn multiple_sources_are_tallied_in_the_summary() -> Result<(), Box<dyn std::error::Error>> {
    let one = fixture(ARTICLE);
    let two = fixture(ARTICLE);
    let output = bin().arg("cite").arg(one.path()).arg(two.path()).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert_eq!(stdout.lines().count(), 2, "stdout=\n{stdout}");
    assert!(
        stderr.contains("✓ 2") && stderr.contains("✗ 0"),
        "stderr summary mismatch. stderr=\n{stderr}"
    );
    Ok(())
}

#[test]
fn pages_with_no_author_render_title_first() -> Result<(), Box<dyn std::error::Error>> {
    let file = fixture(
        r#"<html><head><title>Quiet Page</title></head>
        <body><p>Nothing to see.</p></body></html>"#,
    );
    let output = bin().arg("cite").arg(file.path()).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(
        stdout.starts_with("Quiet Page. (n.d.)."),
        "expected title-first citation. stdout=\n{stdout}"
    );
    Ok(())
}
