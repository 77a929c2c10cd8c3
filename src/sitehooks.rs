//! Per-site adjustments for sources whose markup defeats the generic pass.
//! Hooks only refine an already-extracted payload; one that finds nothing
//! leaves it alone.

use log::debug;

use crate::author::classify::{Classification, classify};
use crate::author::split::split_fragment;
use crate::author::{
    AuthorKind, AuthorSource, ConfidenceTier, RawFragment, ResolutionConfidence, ResolvedAuthor,
    ResolverOptions, SourceKind,
};
use crate::page::PageModel;
use crate::payload::{CitationPayload, DateParts};

type Hook = fn(&PageModel, &mut CitationPayload);

/// NOTE: Ordering is priority. The first hook whose domain matches the page
/// hostname runs, and only that one.
static HOOKS: &[(&str, Hook)] = &[
    ("arxiv.org", arxiv),
    ("ssrn.com", ssrn),
    ("ncbi.nlm.nih.gov", pubmed),
    ("lop.parl.ca", parliament),
];

pub fn apply(page: &PageModel, payload: &mut CitationPayload) {
    let Some(host) = page.hostname() else {
        return;
    };
    for (domain, hook) in HOOKS {
        if host == *domain || host.ends_with(&format!(".{domain}")) {
            debug!("applying site hook for {domain}");
            hook(page, payload);
            return;
        }
    }
}

fn arxiv(page: &PageModel, payload: &mut CitationPayload) {
    if let Some(title) = first_h1(page) {
        let title = title.strip_prefix("Title:").unwrap_or(&title).trim();
        if !title.is_empty() {
            payload.title = title.to_string();
        }
    }
    if let Some(block) = page.class_blocks.iter().find(|b| b.has_class("authors")) {
        let text = block.text.strip_prefix("Authors:").unwrap_or(&block.text);
        set_person_authors(payload, text);
    }
    payload.publisher = Some("arXiv".to_string());
}

fn ssrn(page: &PageModel, payload: &mut CitationPayload) {
    if let Some(title) = first_h1(page) {
        payload.title = title;
    }
    if let Some(block) = page.class_blocks.iter().find(|b| b.has_class("authors")) {
        set_person_authors(payload, &block.text);
    }
    payload.publisher = Some("SSRN".to_string());
}

fn pubmed(page: &PageModel, payload: &mut CitationPayload) {
    if let Some(title) = first_h1(page) {
        payload.title = title;
    }
    let opts = ResolverOptions::default();
    let names: Vec<ResolvedAuthor> = page
        .class_blocks
        .iter()
        .filter(|b| b.has_class("full-name"))
        .filter(|b| classify(&b.text, &opts) == Classification::Person)
        .map(|b| person(&b.text))
        .collect();
    if !names.is_empty() {
        replace_authors(payload, names);
    }
    if payload.date.is_none()
        && let Some(block) = page.class_blocks.iter().find(|b| b.has_class("cit"))
    {
        let parsed = DateParts::parse(&block.text);
        if parsed.year.is_some() {
            payload.date = Some(parsed);
        }
    }
    payload.publisher = Some("PubMed".to_string());
}

fn parliament(page: &PageModel, payload: &mut CitationPayload) {
    if let Some(title) = page
        .h1s
        .iter()
        .find(|t| !t.is_empty() && !t.eq_ignore_ascii_case("research publications"))
    {
        payload.title = title.clone();
    }
    payload.publisher = Some("Library of Parliament".to_string());
}

fn first_h1(page: &PageModel) -> Option<String> {
    page.h1s.iter().find(|t| !t.is_empty()).cloned()
}

/// Run a raw author line through the regular split/classify machinery and
/// replace the payload's authors with the persons it yields, if any.
fn set_person_authors(payload: &mut CitationPayload, text: &str) {
    let opts = ResolverOptions::default();
    let fragment = RawFragment::new(text, SourceKind::VisibleSelector, ConfidenceTier::High);
    let mut persons: Vec<ResolvedAuthor> = Vec::new();
    for candidate in split_fragment(&fragment, &opts) {
        if classify(&candidate.text, &opts) != Classification::Person {
            continue;
        }
        let dup = persons
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(&candidate.text));
        if !dup {
            persons.push(person(&candidate.text));
        }
    }
    if !persons.is_empty() {
        replace_authors(payload, persons);
    }
}

fn person(name: &str) -> ResolvedAuthor {
    ResolvedAuthor {
        name: name.to_string(),
        kind: AuthorKind::Person,
        score: ConfidenceTier::High.weight(),
    }
}

fn replace_authors(payload: &mut CitationPayload, authors: Vec<ResolvedAuthor>) {
    payload.authors = authors;
    payload.author_source = AuthorSource::Page;
    payload.author_confidence = ResolutionConfidence::High;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractOptions, extract};
    use url::Url;

    fn run(url: &str, html: &str) -> CitationPayload {
        let page = PageModel::from_html(Some(Url::parse(url).unwrap()), html);
        extract(&page, &ExtractOptions::default())
    }

    #[test]
    fn arxiv_pages_get_title_authors_and_publisher() {
        let html = r#"<html><body>
            <h1 class="title">Title: Attention Is All You Need</h1>
            <div class="authors">Authors: Ashish Vaswani, Noam Shazeer</div>
            </body></html>"#;
        let payload = run("https://arxiv.org/abs/1706.03762", html);
        assert_eq!(payload.title, "Attention Is All You Need");
        assert_eq!(
            payload
                .authors
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Ashish Vaswani", "Noam Shazeer"]
        );
        assert_eq!(payload.publisher.as_deref(), Some("arXiv"));
    }

    #[test]
    fn pubmed_pages_use_full_name_blocks() {
        let html = r#"<html><body>
            <h1>Effects of Things on Stuff</h1>
            <span class="full-name">Jane Smith</span>
            <span class="full-name">John Doe</span>
            <span class="cit">2021 May 10;12(3):45-67.</span>
            </body></html>"#;
        let payload = run("https://pubmed.ncbi.nlm.nih.gov/12345/", html);
        assert_eq!(payload.title, "Effects of Things on Stuff");
        assert_eq!(payload.authors.len(), 2);
        assert_eq!(payload.publisher.as_deref(), Some("PubMed"));
        assert_eq!(payload.date.as_ref().and_then(|d| d.year), Some(2021));
    }

    #[test]
    fn parliament_pages_skip_the_section_banner_title() {
        let html = r#"<html><body>
            <h1>Research Publications</h1>
            <h1>An Actual Report Title</h1>
            </body></html>"#;
        let payload = run("https://lop.parl.ca/sites/x", html);
        assert_eq!(payload.title, "An Actual Report Title");
        assert_eq!(payload.publisher.as_deref(), Some("Library of Parliament"));
    }

    #[test]
    fn unmatched_hosts_are_left_alone() {
        let html = r#"<html><head><meta name="author" content="Jane Smith"></head>
            <body><h1>Plain Page</h1></body></html>"#;
        let payload = run("https://example.com/a", html);
        assert_eq!(payload.publisher, None);
    }
}
