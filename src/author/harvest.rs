use crate::page::PageModel;

use super::{ConfidenceTier, RawFragment, SourceKind, patterns};

/// Bounded prefix of body text the byline fallback may scan. Anything past
/// this point is article body, not a byline.
const BYLINE_SCAN_LIMIT: usize = 1200;

/// Byline-specific markup classes.
const MEDIUM_CLASSES: &[&str] = &[
    "byline",
    "c-byline",
    "article-author",
    "author-name",
    "article__byline",
];

/// Generic containers that sometimes hold an author and often hold junk.
const LOW_CLASSES: &[&str] = &["author", "metadata", "pub-info"];

/// Sweep every page surface for raw author fragments. All surfaces
/// contribute; corroboration across them is what the resolver's scoring
/// rewards. No deduplication happens here. The body-text regex is the one
/// exception: it runs only when everything else came up empty, because a
/// bare "by ..." match from running prose is guesswork.
pub fn harvest(page: &PageModel) -> Vec<RawFragment> {
    let mut fragments = Vec::new();

    for value in page.meta_values("citation_author") {
        push_meta(&mut fragments, value);
    }
    for value in page.meta_values("dc.creator") {
        push_meta(&mut fragments, value);
    }
    for value in page.meta_values("author") {
        push_meta(&mut fragments, value);
    }
    for value in page.meta_properties("article:author") {
        // OpenGraph author values are frequently profile URLs; those are
        // addresses, not names.
        push_meta(&mut fragments, value);
    }

    for node in &page.json_ld {
        for key in ["author", "creator", "contributor"] {
            if let Some(value) = node.get(key) {
                collect_json_people(value, &mut fragments);
            }
        }
    }

    for text in &page.itemprop_authors {
        fragments.push(RawFragment::new(
            text.clone(),
            SourceKind::Microdata,
            ConfidenceTier::High,
        ));
    }
    for text in &page.rel_authors {
        fragments.push(RawFragment::new(
            text.clone(),
            SourceKind::VisibleSelector,
            ConfidenceTier::High,
        ));
    }

    for block in &page.class_blocks {
        if MEDIUM_CLASSES.iter().any(|c| block.has_class(c)) {
            fragments.push(RawFragment::new(
                block.text.clone(),
                SourceKind::VisibleSelector,
                ConfidenceTier::Medium,
            ));
        } else if LOW_CLASSES.iter().any(|c| block.has_class(c)) {
            fragments.push(RawFragment::new(
                block.text.clone(),
                SourceKind::VisibleSelector,
                ConfidenceTier::Low,
            ));
        }
    }

    if fragments.is_empty() {
        let prefix: String = page.body_text.chars().take(BYLINE_SCAN_LIMIT).collect();
        if let Some(cap) = patterns::BODY_BYLINE_RE.captures(&prefix)
            && let Some(m) = cap.get(1)
        {
            log::debug!("no structured author surface; body-text byline {:?}", m.as_str());
            fragments.push(RawFragment::new(
                m.as_str(),
                SourceKind::BodyTextRegex,
                ConfidenceTier::Medium,
            ));
        }
    }

    fragments
}

fn push_meta(fragments: &mut Vec<RawFragment>, value: String) {
    if value.is_empty() || looks_like_url_or_handle(&value) {
        return;
    }
    fragments.push(RawFragment::new(value, SourceKind::Meta, ConfidenceTier::High));
}

/// JSON-LD author fields may be a string, an array, or an object carrying a
/// `name`; arrays may nest any of these.
fn collect_json_people(value: &serde_json::Value, fragments: &mut Vec<RawFragment>) {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && !looks_like_url_or_handle(s) {
                fragments.push(RawFragment::new(s, SourceKind::JsonLd, ConfidenceTier::High));
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_json_people(item, fragments);
            }
        }
        serde_json::Value::Object(obj) => {
            if let Some(name) = obj.get("name").and_then(|n| n.as_str()) {
                let name = name.trim();
                if !name.is_empty() {
                    fragments.push(RawFragment::new(
                        name,
                        SourceKind::JsonLd,
                        ConfidenceTier::High,
                    ));
                }
            }
        }
        _ => {}
    }
}

fn looks_like_url_or_handle(s: &str) -> bool {
    s.contains('@') || s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(html: &str) -> PageModel {
        PageModel::from_html(Some(Url::parse("https://example.com/a").unwrap()), html)
    }

    #[test]
    fn meta_and_json_ld_surfaces_all_contribute() {
        let p = page(
            r#"<html><head>
            <meta name="citation_author" content="Smith, Jane">
            <meta name="author" content="Jane Smith">
            <script type="application/ld+json">{"author":[{"name":"Jane Smith"},"John Doe"]}</script>
            </head><body><span itemprop="author">Jane Smith</span></body></html>"#,
        );
        let fragments = harvest(&p);
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Smith, Jane", "Jane Smith", "Jane Smith", "John Doe", "Jane Smith"]
        );
        assert!(fragments.iter().all(|f| f.tier == ConfidenceTier::High));
        assert_eq!(fragments[2].kind, SourceKind::JsonLd);
        assert_eq!(fragments[4].kind, SourceKind::Microdata);
    }

    #[test]
    fn profile_urls_and_handles_are_not_names() {
        let p = page(
            r#"<html><head>
            <meta property="article:author" content="https://example.com/profile/jane">
            <meta name="author" content="jane@example.com">
            </head><body></body></html>"#,
        );
        assert!(harvest(&p).is_empty() || harvest(&p).iter().all(|f| f.kind == SourceKind::BodyTextRegex));
    }

    #[test]
    fn byline_classes_are_medium_and_author_containers_low() {
        let p = page(
            r#"<html><body>
            <div class="byline">By Jane Smith</div>
            <div class="author">Jane Smith</div>
            </body></html>"#,
        );
        let fragments = harvest(&p);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].tier, ConfidenceTier::Medium);
        assert_eq!(fragments[1].tier, ConfidenceTier::Low);
        assert!(fragments.iter().all(|f| f.kind == SourceKind::VisibleSelector));
    }

    #[test]
    fn body_text_fallback_only_when_structured_surfaces_are_empty() {
        let p = page("<html><body><p>By Barbara Moran</p><p>More text.</p></body></html>");
        let fragments = harvest(&p);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, SourceKind::BodyTextRegex);
        assert_eq!(fragments[0].tier, ConfidenceTier::Medium);
        assert_eq!(fragments[0].text, "Barbara Moran");

        let structured = page(
            r#"<html><head><meta name="author" content="Jane Smith"></head>
            <body><p>By Barbara Moran</p></body></html>"#,
        );
        let fragments = harvest(&structured);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, SourceKind::Meta);
    }

    #[test]
    fn byline_scan_is_bounded() {
        let padding = "word ".repeat(400);
        let html = format!("<html><body><p>{padding}</p><p>By Barbara Moran</p></body></html>");
        assert!(harvest(&page(&html)).is_empty());
    }
}
