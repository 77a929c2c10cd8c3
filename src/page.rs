//! Read-only snapshot of one page, built once per extraction pass from the
//! raw HTML and the request URL. Downstream modules only ever see this
//! value, which keeps them pure and testable.

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

/// Body text is kept as a bounded prefix; date and DOI scans never need
/// more, and bylines past this point are somebody else's article.
const BODY_TEXT_LIMIT: usize = 4000;

#[derive(Debug, Clone)]
pub struct MetaTag {
    pub name: Option<String>,
    pub property: Option<String>,
    pub itemprop: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct LinkTag {
    pub rel: String,
    pub href: String,
}

/// A visible element that carried a `class` attribute, reduced to its class
/// list and inner text.
#[derive(Debug, Clone)]
pub struct ClassBlock {
    pub classes: String,
    pub text: String,
}

impl ClassBlock {
    pub fn has_class(&self, name: &str) -> bool {
        self.classes
            .split_whitespace()
            .any(|c| c.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone)]
pub struct PageModel {
    pub url: Option<Url>,
    pub meta: Vec<MetaTag>,
    pub links: Vec<LinkTag>,
    pub title_tag: Option<String>,
    pub h1s: Vec<String>,
    pub json_ld: Vec<serde_json::Value>,
    pub class_blocks: Vec<ClassBlock>,
    pub itemprop_authors: Vec<String>,
    pub rel_authors: Vec<String>,
    pub time_datetime: Option<String>,
    pub body_text: String,
    has_pdf_embed: bool,
}

static META_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").unwrap());
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    // Attribute pairs: key="value" or key='value' (no backreferences in Rust regex)
    Regex::new(r#"(?i)([a-zA-Z_:\-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});
static LINK_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<link\b[^>]*>").unwrap());
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1>").unwrap());
static TIME_DT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<time\b[^>]*?datetime\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#).unwrap()
});
static SCRIPT_LD_JSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .unwrap()
});
// Only author-ish class attributes are captured; matching every classed
// element would let an outer wrapper swallow the byline nested inside it,
// since regex matches cannot overlap.
static CLASS_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<(?:div|span|p|a|li|address|section|figcaption|h1|h2)\b[^>]*\bclass\s*=\s*(?:"([^"]*(?:byline|author|metadata|pub-info|full-name|cit)[^"]*)"|'([^']*(?:byline|author|metadata|pub-info|full-name|cit)[^']*)')[^>]*>(.*?)</(?:div|span|p|a|li|address|section|figcaption|h1|h2)>"#,
    )
    .unwrap()
});
static ITEMPROP_AUTHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<(?:div|span|p|a|li|address)\b[^>]*\bitemprop\s*=\s*["']author["'][^>]*>(.*?)</(?:div|span|p|a|li|address)>"#)
        .unwrap()
});
static REL_AUTHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*\brel\s*=\s*(?:"[^"]*\bauthor\b[^"]*"|'[^']*\bauthor\b[^']*')[^>]*>(.*?)</a>"#)
        .unwrap()
});
static PDF_EMBED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<(?:embed|iframe|object)\b[^>]*(?:type\s*=\s*["']application/pdf["']|(?:src|data)\s*=\s*["'][^"']*\.pdf[^"']*["'])"#,
    )
    .unwrap()
});
static SCRIPT_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script>").unwrap());
static BLOCK_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(?:p|div|h[1-6]|li|tr|section|article|header|footer)>|<br\s*/?>").unwrap()
});
static STYLE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b.*?</style>").unwrap());
static HEAD_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<head\b.*?</head>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());

impl PageModel {
    pub fn from_html(url: Option<Url>, html: &str) -> Self {
        let meta = collect_meta(html);
        let mut itemprop_authors: Vec<String> = ITEMPROP_AUTHOR_RE
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| strip_tags(m.as_str()))
            .filter(|t| !t.is_empty())
            .collect();
        itemprop_authors.extend(
            meta.iter()
                .filter(|m| {
                    m.itemprop
                        .as_deref()
                        .map(|p| p.eq_ignore_ascii_case("author"))
                        .unwrap_or(false)
                })
                .map(|m| normalize_ws(&m.content))
                .filter(|t| !t.is_empty()),
        );

        PageModel {
            meta,
            links: collect_links(html),
            title_tag: TITLE_RE
                .captures(html)
                .and_then(|c| c.get(1))
                .map(|m| strip_tags(m.as_str()))
                .filter(|t| !t.is_empty()),
            h1s: H1_RE
                .captures_iter(html)
                .filter_map(|c| c.get(1))
                .map(|m| strip_tags(m.as_str()))
                .filter(|t| !t.is_empty())
                .collect(),
            json_ld: collect_json_ld(html),
            class_blocks: collect_class_blocks(html),
            itemprop_authors,
            rel_authors: REL_AUTHOR_RE
                .captures_iter(html)
                .filter_map(|c| c.get(1))
                .map(|m| strip_tags(m.as_str()))
                .filter(|t| !t.is_empty())
                .collect(),
            time_datetime: TIME_DT_RE
                .captures(html)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| m.as_str().to_string()),
            body_text: collect_body_text(html),
            has_pdf_embed: PDF_EMBED_RE.is_match(html),
            url,
        }
    }

    /// Page hostname, lowercased, leading "www." dropped.
    pub fn hostname(&self) -> Option<String> {
        let host = self.url.as_ref()?.host_str()?.to_ascii_lowercase();
        Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
    }

    /// Canonical URL: rel=canonical when present, otherwise the request URL,
    /// with the fragment and `utm_*` tracking parameters removed.
    pub fn canonical_url(&self) -> Option<Url> {
        let canonical = self
            .links
            .iter()
            .find(|l| l.rel.eq_ignore_ascii_case("canonical"))
            .and_then(|l| match &self.url {
                Some(base) => base.join(&l.href).ok(),
                None => Url::parse(&l.href).ok(),
            });
        canonical.or_else(|| self.url.clone()).map(strip_tracking)
    }

    pub fn is_pdf(&self) -> bool {
        if self.has_pdf_embed {
            return true;
        }
        self.url
            .as_ref()
            .map(|u| u.as_str().to_ascii_lowercase().contains(".pdf"))
            .unwrap_or(false)
    }

    /// Percent-decoded last path segment, for PDF pages only.
    pub fn pdf_filename(&self) -> Option<String> {
        if !self.is_pdf() {
            return None;
        }
        let url = self.canonical_url()?;
        let last = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
        let decoded = percent_decode_str(last).decode_utf8().ok()?;
        Some(decoded.into_owned())
    }

    /// First content value of an exactly named `<meta>` tag.
    pub fn meta_value(&self, name: &str) -> Option<String> {
        self.meta
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
            .map(|m| m.content.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Same, but the name comparison ignores case ("DC.creator" vs "dc.creator").
    pub fn meta_value_ci(&self, name: &str) -> Option<String> {
        self.meta
            .iter()
            .find(|m| {
                m.name
                    .as_deref()
                    .map(|n| n.eq_ignore_ascii_case(name))
                    .unwrap_or(false)
            })
            .map(|m| m.content.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// All content values of a named tag, in document order.
    pub fn meta_values(&self, name: &str) -> Vec<String> {
        self.meta
            .iter()
            .filter(|m| {
                m.name
                    .as_deref()
                    .map(|n| n.eq_ignore_ascii_case(name))
                    .unwrap_or(false)
            })
            .map(|m| m.content.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }

    pub fn meta_property(&self, prop: &str) -> Option<String> {
        self.meta
            .iter()
            .find(|m| m.property.as_deref() == Some(prop))
            .map(|m| m.content.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn meta_properties(&self, prop: &str) -> Vec<String> {
        self.meta
            .iter()
            .filter(|m| m.property.as_deref() == Some(prop))
            .map(|m| m.content.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }

    pub fn meta_any(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|n| self.meta_value_ci(n))
    }
}

fn collect_meta(html: &str) -> Vec<MetaTag> {
    META_TAG_RE
        .find_iter(html)
        .filter_map(|m| parse_meta_tag(m.as_str()))
        .collect()
}

fn parse_meta_tag(tag: &str) -> Option<MetaTag> {
    let mut name = None;
    let mut property = None;
    let mut itemprop = None;
    let mut content = None;
    for cap in ATTR_RE.captures_iter(tag) {
        let key = &cap[1];
        let val = cap
            .get(2)
            .or_else(|| cap.get(3))
            .map(|m| m.as_str().to_string());
        if let Some(val) = val {
            match key.to_ascii_lowercase().as_str() {
                "name" => name = Some(val),
                "property" => property = Some(val),
                "itemprop" => itemprop = Some(val),
                "content" => content = Some(decode_entities(&val)),
                _ => {}
            }
        }
    }
    let content = content?;
    Some(MetaTag {
        name,
        property,
        itemprop,
        content,
    })
}

fn collect_links(html: &str) -> Vec<LinkTag> {
    LINK_TAG_RE
        .find_iter(html)
        .filter_map(|m| {
            let tag = m.as_str();
            let mut rel = None;
            let mut href = None;
            for cap in ATTR_RE.captures_iter(tag) {
                let key = &cap[1];
                let val = cap
                    .get(2)
                    .or_else(|| cap.get(3))
                    .map(|m| m.as_str().to_string());
                if let Some(val) = val {
                    match key.to_ascii_lowercase().as_str() {
                        "rel" => rel = Some(val),
                        "href" => href = Some(val),
                        _ => {}
                    }
                }
            }
            Some(LinkTag {
                rel: rel?,
                href: href?,
            })
        })
        .collect()
}

fn collect_json_ld(html: &str) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    for c in SCRIPT_LD_JSON_RE.captures_iter(html) {
        if let Some(m) = c.get(1) {
            let raw = m.as_str().trim();
            // Relax common breakage: embedded HTML comments and NULs.
            let cleaned = raw
                .replace("<!--", "")
                .replace("-->", "")
                .replace('\u{0000}', "");
            match serde_json::from_str::<serde_json::Value>(&cleaned) {
                Ok(serde_json::Value::Array(a)) => out.extend(a),
                Ok(v) => out.push(v),
                Err(err) => log::debug!("skipping malformed JSON-LD block: {err}"),
            }
        }
    }
    out
}

fn collect_class_blocks(html: &str) -> Vec<ClassBlock> {
    CLASS_BLOCK_RE
        .captures_iter(html)
        .filter_map(|c| {
            let classes = c
                .get(1)
                .or_else(|| c.get(2))
                .map(|m| m.as_str().to_ascii_lowercase())?;
            let text = strip_tags(c.get(3)?.as_str());
            if text.is_empty() {
                None
            } else {
                Some(ClassBlock { classes, text })
            }
        })
        .collect()
}

fn collect_body_text(html: &str) -> String {
    let without_head = HEAD_BLOCK_RE.replace(html, " ");
    let without_scripts = SCRIPT_BLOCK_RE.replace_all(&without_head, " ");
    let without_styles = STYLE_BLOCK_RE.replace_all(&without_scripts, " ");
    // Block boundaries become line breaks so downstream patterns can refuse
    // to match across paragraphs.
    let with_breaks = BLOCK_END_RE.replace_all(&without_styles, "\n");
    let stripped = TAG_RE.replace_all(&with_breaks, " ");
    let text = collapse_keeping_newlines(&decode_entities(&stripped));
    text.chars().take(BODY_TEXT_LIMIT).collect()
}

/// Collapse whitespace runs, keeping a single newline when the run crossed
/// a line break.
fn collapse_keeping_newlines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    let mut run_had_newline = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            in_run = true;
            if ch == '\n' || ch == '\r' {
                run_had_newline = true;
            }
        } else {
            if in_run {
                if !out.is_empty() {
                    out.push(if run_had_newline { '\n' } else { ' ' });
                }
                in_run = false;
                run_had_newline = false;
            }
            out.push(ch);
        }
    }
    out
}

/// Drop markup, decode the common entities, collapse whitespace.
pub(crate) fn strip_tags(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, " ");
    normalize_ws(&decode_entities(&stripped))
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
}

fn strip_tracking(mut url: Url) -> Url {
    url.set_fragment(None);
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !k.starts_with("utm_"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        drop(pairs);
    }
    url
}

fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}
