//! One extraction pass: page snapshot in, citation payload out. Field
//! chains follow a fixed precedence (structured metadata before visible
//! markup before body-text guesses) and every chain tolerates absence;
//! this function cannot fail.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::author::harvest::harvest;
use crate::author::{ResolverOptions, resolve_authors};
use crate::page::PageModel;
use crate::payload::{CitationPayload, DateParts};
use crate::sitehooks;

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub resolver: ResolverOptions,
}

pub fn extract(page: &PageModel, opts: &ExtractOptions) -> CitationPayload {
    // A site name the page actually declared, as opposed to the hostname
    // stand-in used for display. Only the former may become a corporate
    // author.
    let named_site = extract_site_name(page);
    let site_name = named_site.clone().or_else(|| page.hostname());
    let publisher = extract_publisher(page);
    let title = extract_title(page, site_name.as_deref());
    let date = extract_date(page);
    let doi = extract_doi(page);

    let fragments = harvest(page);
    let hostname = page.hostname();
    let resolution = resolve_authors(
        &fragments,
        hostname.as_deref(),
        publisher.as_deref().or(named_site.as_deref()),
        &opts.resolver,
    );

    log::debug!(
        "authors resolved via {} at {} confidence",
        resolution.source.as_str(),
        resolution.confidence.as_str()
    );

    let mut payload = CitationPayload {
        title,
        authors: resolution.authors,
        date,
        url: page.canonical_url().map(|u| u.to_string()),
        site_name,
        publisher,
        doi,
        is_pdf: page.is_pdf(),
        pdf_filename: page.pdf_filename(),
        author_source: resolution.source,
        author_confidence: resolution.confidence,
    };
    sitehooks::apply(page, &mut payload);
    payload
}

fn extract_site_name(page: &PageModel) -> Option<String> {
    page.meta_property("og:site_name")
        .or_else(|| page.meta_value_ci("application-name"))
        .or_else(|| json_publisher(page))
}

fn extract_publisher(page: &PageModel) -> Option<String> {
    json_publisher(page)
        .or_else(|| page.meta_value_ci("publisher"))
        .or_else(|| page.meta_value("citation_publisher"))
}

fn extract_title(page: &PageModel, site_name: Option<&str>) -> String {
    let title = page
        .meta_any(&["citation_title", "dc.title"])
        .or_else(|| page.meta_property("og:title"))
        .or_else(|| json_first_string(page, &["headline", "name", "alternativeHeadline"]))
        .or_else(|| {
            page.h1s
                .iter()
                .find(|t| !t.is_empty() && !t.eq_ignore_ascii_case("research publications"))
                .cloned()
        })
        .or_else(|| pdf_title(page))
        .or_else(|| page.title_tag.clone())
        .unwrap_or_default();
    match site_name {
        Some(site) => strip_site_suffix(&title, site),
        None => title,
    }
}

/// For bare PDF URLs the decoded filename stem is the best title on offer.
fn pdf_title(page: &PageModel) -> Option<String> {
    let filename = page.pdf_filename()?;
    let stem = filename
        .strip_suffix(".pdf")
        .or_else(|| filename.strip_suffix(".PDF"))
        .unwrap_or(&filename);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

static BODY_ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(20\d{2}-\d{2}-\d{2})\b").unwrap());
static BODY_LONG_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}\s+(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+20\d{2})\b")
        .unwrap()
});

fn extract_date(page: &PageModel) -> Option<DateParts> {
    let raw = page
        .meta_any(&["citation_publication_date", "dc.date"])
        .or_else(|| page.meta_property("article:published_time"))
        .or_else(|| page.meta_property("og:updated_time"))
        .or_else(|| page.meta_any(&["date", "pubdate"]))
        .or_else(|| page.time_datetime.clone())
        .or_else(|| {
            json_first_string(
                page,
                &["datePublished", "dateCreated", "uploadDate", "dateModified"],
            )
        })
        .or_else(|| {
            BODY_ISO_DATE_RE
                .captures(&page.body_text)
                .map(|c| c[1].to_string())
        })
        .or_else(|| {
            BODY_LONG_DATE_RE
                .captures(&page.body_text)
                .map(|c| c[1].to_string())
        })?;
    Some(DateParts::parse(&raw))
}

static DOI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(10\.\d{4,9}/[-._;()/:A-Z0-9]+)\b").unwrap());

fn extract_doi(page: &PageModel) -> Option<String> {
    let from_meta = page
        .meta_any(&["citation_doi", "dc.identifier"])
        .and_then(|v| clean_doi(&v));
    from_meta.or_else(|| clean_doi(&page.body_text))
}

fn clean_doi(s: &str) -> Option<String> {
    DOI_RE
        .captures(s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn json_publisher(page: &PageModel) -> Option<String> {
    for node in &page.json_ld {
        if let Some(publisher) = node.get("publisher") {
            if let Some(s) = publisher.as_str() {
                return Some(s.trim().to_string());
            }
            if let Some(name) = publisher.get("name").and_then(|n| n.as_str()) {
                return Some(name.trim().to_string());
            }
        }
    }
    None
}

fn json_first_string(page: &PageModel, keys: &[&str]) -> Option<String> {
    for node in &page.json_ld {
        for key in keys {
            if let Some(s) = node.get(*key).and_then(|v| v.as_str()) {
                let s = s.trim();
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            }
        }
    }
    None
}

/// Drop a trailing " - Site Name"-style suffix from a title.
fn strip_site_suffix(title: &str, site: &str) -> String {
    let site_esc = regex::escape(site.trim());
    let re = Regex::new(&format!(r"(?i)\s*[\-–—=|:~#]\s*{}\s*$", site_esc)).unwrap();
    re.replace(title, "").trim().to_string()
}
