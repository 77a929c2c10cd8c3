//! Export encoders: BibTeX, RIS and CSL-JSON. The BibTeX path constructs an
//! entry textually and round-trips it through the BibLaTeX parser, so a
//! malformed construction is caught here rather than in the reader's
//! reference manager.

use std::fmt;
use std::str::FromStr;

use biblatex::Bibliography;
use chrono::Datelike;

use crate::author::AuthorKind;
use crate::payload::CitationPayload;
use crate::style::split_person_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Bibtex,
    Ris,
    CslJson,
}

impl FromStr for ExportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bibtex" | "bib" => Ok(ExportFormat::Bibtex),
            "ris" => Ok(ExportFormat::Ris),
            "csl-json" | "csl" => Ok(ExportFormat::CslJson),
            _ => Err(format!(
                "unknown export format: {s} (expected bibtex, ris or csl-json)"
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Bibtex => "bibtex",
            ExportFormat::Ris => "ris",
            ExportFormat::CslJson => "csl-json",
        };
        f.write_str(name)
    }
}

pub fn export(payload: &CitationPayload, format: ExportFormat) -> anyhow::Result<String> {
    match format {
        ExportFormat::Bibtex => bibtex(payload),
        ExportFormat::Ris => Ok(ris(payload)),
        ExportFormat::CslJson => csl_json(payload),
    }
}

fn bibtex(payload: &CitationPayload) -> anyhow::Result<String> {
    let year = payload.date.as_ref().and_then(|d| d.year);

    let mut fields: Vec<(&str, String)> = Vec::new();
    if !payload.authors.is_empty() {
        let authors: Vec<&str> = payload.authors.iter().map(|a| a.name.as_str()).collect();
        fields.push(("author", authors.join(" and ")));
    }
    if !payload.title.is_empty() {
        fields.push(("title", payload.title.clone()));
    }
    if let Some(y) = year {
        fields.push(("year", y.to_string()));
    }
    if let Some(url) = &payload.url {
        fields.push(("url", url.clone()));
    }
    if let Some(doi) = &payload.doi {
        fields.push(("doi", doi.clone()));
    }
    if let Some(venue) = payload.venue() {
        fields.push(("publisher", venue.to_string()));
    }
    if payload.is_pdf {
        let note = match &payload.pdf_filename {
            Some(name) => format!("PDF: {name}"),
            None => "PDF".to_string(),
        };
        fields.push(("note", note));
    }

    let mut out = String::new();
    out.push_str("@misc{");
    out.push_str(&build_key(payload, year));
    out.push_str(",\n");
    for (key, value) in fields {
        out.push_str("    ");
        out.push_str(key);
        out.push_str(" = {");
        out.push_str(&escape_braces(&value));
        out.push_str("},\n");
    }
    out.push_str("}\n");

    let bib = Bibliography::parse(&out)
        .map_err(|e| anyhow::anyhow!("failed to parse constructed BibTeX: {e}"))?;
    let entry = bib
        .iter()
        .next()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("empty bibliography from constructed BibTeX"))?;
    Ok(entry.to_biblatex_string())
}

/// "first-author-2023-leading-title-words".
fn build_key(payload: &CitationPayload, year: Option<i32>) -> String {
    let who = payload
        .authors
        .first()
        .map(|a| a.name.as_str())
        .or_else(|| payload.venue())
        .unwrap_or("unknown");
    let year = year.map(|y| y.to_string()).unwrap_or_else(|| "nd".to_string());
    let title: String = slug(&payload.title).chars().take(12).collect();
    let title = title.trim_end_matches('-');
    let key = format!("{}-{}-{}", slug(who), year, title);
    key.trim_matches('-').to_string()
}

fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_dash = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

fn escape_braces(s: &str) -> String {
    s.replace('{', "\\{").replace('}', "\\}")
}

fn ris(payload: &CitationPayload) -> String {
    let mut lines: Vec<String> = vec!["TY  - ELEC".to_string()];
    for author in &payload.authors {
        lines.push(format!("AU  - {}", ris_author(author)));
    }
    if !payload.title.is_empty() {
        lines.push(format!("TI  - {}", payload.title));
    }
    if let Some(date) = &payload.date {
        if let Some(year) = date.year {
            lines.push(format!("PY  - {year}"));
        }
        if date.month.is_some()
            && let Some(iso) = date.iso()
        {
            lines.push(format!("DA  - {}", iso.replace('-', "/")));
        }
    }
    if let Some(venue) = payload.venue() {
        lines.push(format!("PB  - {venue}"));
    }
    if let Some(doi) = &payload.doi {
        lines.push(format!("DO  - {doi}"));
    }
    if let Some(url) = &payload.url {
        lines.push(format!("UR  - {url}"));
    }
    lines.push("ER  - ".to_string());
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// RIS wants "Family, Given"; organizations go through literally.
fn ris_author(author: &crate::author::ResolvedAuthor) -> String {
    if author.kind == AuthorKind::Organization {
        return author.name.clone();
    }
    let name = split_person_name(&author.name);
    if name.given.is_empty() {
        name.family
    } else {
        format!("{}, {}", name.family, name.given.join(" "))
    }
}

fn csl_json(payload: &CitationPayload) -> anyhow::Result<String> {
    let authors: Vec<serde_json::Value> = payload
        .authors
        .iter()
        .map(|a| {
            if a.kind == AuthorKind::Organization {
                serde_json::json!({ "literal": a.name })
            } else {
                let name = split_person_name(&a.name);
                serde_json::json!({
                    "family": name.family,
                    "given": name.given.join(" "),
                })
            }
        })
        .collect();

    let mut obj = serde_json::Map::new();
    obj.insert("type".into(), serde_json::json!("webpage"));
    obj.insert(
        "id".into(),
        serde_json::json!(build_key(payload, payload.date.as_ref().and_then(|d| d.year))),
    );
    obj.insert("title".into(), serde_json::json!(payload.title));
    if !authors.is_empty() {
        obj.insert("author".into(), serde_json::Value::Array(authors));
    }
    if let Some(date) = &payload.date {
        if let Some(year) = date.year {
            let mut parts: Vec<serde_json::Value> = vec![year.into()];
            if let Some(month) = date.month {
                parts.push(month.into());
                if let Some(day) = date.day {
                    parts.push(day.into());
                }
            }
            obj.insert(
                "issued".into(),
                serde_json::json!({ "date-parts": [parts] }),
            );
        } else if !date.raw.is_empty() {
            obj.insert("issued".into(), serde_json::json!({ "raw": date.raw }));
        }
    }
    if let Some(url) = &payload.url {
        obj.insert("URL".into(), serde_json::json!(url));
    }
    if let Some(doi) = &payload.doi {
        obj.insert("DOI".into(), serde_json::json!(doi));
    }
    if let Some(venue) = payload.venue() {
        obj.insert("publisher".into(), serde_json::json!(venue));
    }
    let today = chrono::Local::now().date_naive();
    obj.insert(
        "accessed".into(),
        serde_json::json!({ "date-parts": [[today.year(), today.month(), today.day()]] }),
    );

    let item = serde_json::Value::Object(obj);
    Ok(serde_json::to_string_pretty(&serde_json::json!([item]))?)
}
