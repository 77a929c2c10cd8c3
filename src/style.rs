//! Citation styles: person-name splitting, per-style author joins, and the
//! final citation line for each supported style. Organization authors pass
//! through unchanged in every style.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local};

use crate::author::{AuthorKind, ResolvedAuthor, patterns};
use crate::payload::{CitationPayload, DateParts, month_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Apa,
    Mla,
    Chicago,
    Ieee,
    Harvard,
    Vancouver,
}

#[cfg(test)]
impl Style {
    const ALL: [Style; 6] = [
        Style::Apa,
        Style::Mla,
        Style::Chicago,
        Style::Ieee,
        Style::Harvard,
        Style::Vancouver,
    ];
}

impl FromStr for Style {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "apa" => Ok(Style::Apa),
            "mla" => Ok(Style::Mla),
            "chicago" => Ok(Style::Chicago),
            "ieee" => Ok(Style::Ieee),
            "harvard" => Ok(Style::Harvard),
            "vancouver" => Ok(Style::Vancouver),
            _ => Err(format!(
                "unknown citation style: {s} (expected apa, mla, chicago, ieee, harvard or vancouver)"
            )),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Style::Apa => "apa",
            Style::Mla => "mla",
            Style::Chicago => "chicago",
            Style::Ieee => "ieee",
            Style::Harvard => "harvard",
            Style::Vancouver => "vancouver",
        };
        f.write_str(name)
    }
}

/// Rendering toggles, mirroring the manual options a caller may flip.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Append a "Retrieved/Accessed <today>" clause where the style has one.
    pub include_accessed: bool,
    /// Smart sentence-casing of the title (APA only).
    pub sentence_case: bool,
    /// Fall back to the publisher/site as a corporate author when the list
    /// is empty (APA and Chicago).
    pub corporate_author: bool,
    /// Append " [PDF]" to the title of PDF pages.
    pub pdf_suffix: bool,
}

/// A person name split for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub family: String,
    pub given: Vec<String>,
    pub suffix: Option<String>,
}

/// Split a canonical person string. A comma means "Family, Given ...";
/// otherwise the last token is the family name, with honorifics dropped and
/// generational suffixes held aside.
pub fn split_person_name(name: &str) -> PersonName {
    if let Some((family, given)) = name.split_once(',') {
        let (given, suffix) = take_suffix(tokens(given));
        return PersonName {
            family: family.trim().to_string(),
            given,
            suffix,
        };
    }
    let mut parts = tokens(name);
    if let Some(first) = parts.first()
        && patterns::HONORIFIC_RE.is_match(first)
    {
        parts.remove(0);
    }
    let (mut parts, suffix) = take_suffix(parts);
    let family = parts.pop().unwrap_or_default();
    PersonName {
        family,
        given: parts,
        suffix,
    }
}

fn tokens(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

fn take_suffix(mut parts: Vec<String>) -> (Vec<String>, Option<String>) {
    let suffix = match parts.last() {
        Some(last) if parts.len() > 1 && patterns::SUFFIX_TOKEN_RE.is_match(last.trim_end_matches(',')) => {
            Some(parts.pop().unwrap().trim_end_matches(',').to_string())
        }
        _ => None,
    };
    (parts, suffix)
}

/// "Jane Anne" -> ["J.", "A."].
fn initials(given: &[String]) -> Vec<String> {
    given
        .iter()
        .filter_map(|g| g.chars().next())
        .map(|c| format!("{}.", c.to_uppercase()))
        .collect()
}

/// The author-list string for one style; the pure half of rendering.
pub fn format_authors_for_style(authors: &[ResolvedAuthor], style: Style) -> String {
    if authors.is_empty() {
        return String::new();
    }
    match style {
        Style::Apa => {
            let formatted: Vec<String> = authors.iter().map(apa_name).collect();
            join_serial(&formatted, "&")
        }
        Style::Mla => mla_authors(authors),
        Style::Chicago => {
            let formatted: Vec<String> = authors.iter().map(natural_name).collect();
            join_with_and(&formatted)
        }
        Style::Ieee => {
            let formatted: Vec<String> = authors.iter().map(ieee_name).collect();
            if formatted.len() > 6 {
                format!("{} et al.", formatted[0])
            } else {
                join_with_and(&formatted)
            }
        }
        Style::Harvard => {
            let formatted: Vec<String> = authors.iter().map(harvard_name).collect();
            if formatted.len() > 3 {
                format!("{} et al.", formatted[0])
            } else {
                join_with_and(&formatted)
            }
        }
        Style::Vancouver => {
            let formatted: Vec<String> = authors.iter().map(vancouver_name).collect();
            if formatted.len() > 6 {
                format!("{}, et al.", formatted[..6].join(", "))
            } else {
                formatted.join(", ")
            }
        }
    }
}

fn apa_name(author: &ResolvedAuthor) -> String {
    if author.kind == AuthorKind::Organization {
        return author.name.clone();
    }
    let name = split_person_name(&author.name);
    let mut out = if name.given.is_empty() {
        name.family.clone()
    } else {
        format!("{}, {}", name.family, initials(&name.given).join(" "))
    };
    if let Some(suffix) = name.suffix {
        out = format!("{out}, {suffix}");
    }
    out
}

fn mla_authors(authors: &[ResolvedAuthor]) -> String {
    let first = &authors[0];
    let lead = if first.kind == AuthorKind::Organization {
        first.name.clone()
    } else {
        let name = split_person_name(&first.name);
        if name.given.is_empty() {
            name.family
        } else {
            format!("{}, {}", name.family, name.given.join(" "))
        }
    };
    match authors.len() {
        1 => lead,
        2 => format!("{lead}, and {}", natural_name(&authors[1])),
        _ => format!("{lead}, et al."),
    }
}

/// "Given Family" order, organizations untouched.
fn natural_name(author: &ResolvedAuthor) -> String {
    if author.kind == AuthorKind::Organization {
        return author.name.clone();
    }
    let name = split_person_name(&author.name);
    let mut parts = name.given;
    parts.push(name.family);
    let mut out = parts.join(" ").trim().to_string();
    if let Some(suffix) = name.suffix {
        out = format!("{out} {suffix}");
    }
    out
}

fn ieee_name(author: &ResolvedAuthor) -> String {
    if author.kind == AuthorKind::Organization {
        return author.name.clone();
    }
    let name = split_person_name(&author.name);
    if name.given.is_empty() {
        name.family
    } else {
        format!("{} {}", initials(&name.given).join(" "), name.family)
    }
}

fn harvard_name(author: &ResolvedAuthor) -> String {
    if author.kind == AuthorKind::Organization {
        return author.name.clone();
    }
    let name = split_person_name(&author.name);
    if name.given.is_empty() {
        name.family
    } else {
        format!("{}, {}", name.family, initials(&name.given).join(""))
    }
}

fn vancouver_name(author: &ResolvedAuthor) -> String {
    if author.kind == AuthorKind::Organization {
        return author.name.clone();
    }
    let name = split_person_name(&author.name);
    if name.given.is_empty() {
        name.family
    } else {
        let initials: String = name
            .given
            .iter()
            .filter_map(|g| g.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        format!("{} {}", name.family, initials)
    }
}

/// "a", "a & b", "a, b, & c" (serial comma before the final join word).
fn join_serial(parts: &[String], word: &str) -> String {
    match parts.len() {
        1 => parts[0].clone(),
        2 => format!("{} {word} {}", parts[0], parts[1]),
        _ => format!(
            "{}, {word} {}",
            parts[..parts.len() - 1].join(", "),
            parts[parts.len() - 1]
        ),
    }
}

/// "a", "a and b", "a, b, and c".
fn join_with_and(parts: &[String]) -> String {
    join_serial(parts, "and")
}

/// Render one full citation line.
pub fn render(payload: &CitationPayload, style: Style, opts: &RenderOptions) -> String {
    match style {
        Style::Apa => apa(payload, opts),
        Style::Mla => mla(payload, opts),
        Style::Chicago => chicago(payload, opts),
        Style::Ieee => ieee(payload, opts),
        Style::Harvard => harvard(payload, opts),
        Style::Vancouver => vancouver(payload, opts),
    }
}

fn corporate_author(payload: &CitationPayload) -> Option<ResolvedAuthor> {
    payload.venue().map(|name| ResolvedAuthor {
        name: name.to_string(),
        kind: AuthorKind::Organization,
        score: 0,
    })
}

fn author_line(payload: &CitationPayload, style: Style, use_corporate: bool) -> String {
    if payload.authors.is_empty() {
        if use_corporate
            && let Some(corp) = corporate_author(payload)
        {
            return corp.name;
        }
        return String::new();
    }
    format_authors_for_style(&payload.authors, style)
}

fn title_for(payload: &CitationPayload, style: Style, opts: &RenderOptions) -> String {
    let mut title = payload.title.clone();
    if style == Style::Apa && opts.sentence_case {
        title = sentence_case_smart(&title);
    }
    if opts.pdf_suffix && payload.is_pdf {
        title = format!("{title} [PDF]");
    }
    title
}

fn apa(payload: &CitationPayload, opts: &RenderOptions) -> String {
    let author = ensure_terminal_period(&author_line(payload, Style::Apa, opts.corporate_author));
    let date_str = match &payload.date {
        Some(d) if d.year.is_some() => {
            let mut inner = d.year.unwrap().to_string();
            if let Some(month) = d.month_name() {
                inner.push_str(&format!(", {month}"));
                if let Some(day) = d.day {
                    inner.push_str(&format!(" {day}"));
                }
            }
            format!("({inner}).")
        }
        _ => "(n.d.).".to_string(),
    };
    let title = title_for(payload, Style::Apa, opts);

    let mut out = if author.is_empty() {
        format!("{title}. {date_str}")
    } else {
        format!("{author} {date_str} {title}.")
    };
    if let Some(site) = payload.venue() {
        out.push_str(&format!(" {site}."));
    }
    if let Some(doi) = payload.doi.as_deref() {
        out.push_str(&format!(" https://doi.org/{doi}"));
    }
    match (opts.include_accessed, payload.url.as_deref()) {
        (true, Some(url)) => out.push_str(&format!(" Retrieved {}, from {url}", today_long())),
        (true, None) => out.push_str(&format!(" Retrieved {}.", today_long())),
        (false, Some(url)) => out.push_str(&format!(" {url}")),
        (false, None) => {}
    }
    out
}

fn mla(payload: &CitationPayload, opts: &RenderOptions) -> String {
    let author = author_line(payload, Style::Mla, false);
    let title = format!("\u{201c}{}.\u{201d}", title_for(payload, Style::Mla, opts));
    let date_str = payload
        .date
        .as_ref()
        .map(format_date_mla)
        .unwrap_or_else(|| "n.d.".to_string());

    let mut out = String::new();
    if !author.is_empty() {
        out.push_str(&format!("{author}. "));
    }
    out.push_str(&title);
    let mut tail: Vec<String> = Vec::new();
    if let Some(site) = payload.venue() {
        tail.push(site.to_string());
    }
    tail.push(date_str);
    if let Some(url) = payload.url.as_deref() {
        tail.push(url.to_string());
    }
    out.push_str(&format!(" {}.", tail.join(", ")));
    if let Some(doi) = payload.doi.as_deref() {
        out.push_str(&format!(" DOI: {doi}."));
    }
    if opts.include_accessed {
        out.push_str(&format!(" Accessed {}.", today_mla()));
    }
    out
}

fn chicago(payload: &CitationPayload, opts: &RenderOptions) -> String {
    let author = author_line(payload, Style::Chicago, opts.corporate_author);
    let title = format!("\u{201c}{}.\u{201d}", title_for(payload, Style::Chicago, opts));
    let date_str = payload
        .date
        .as_ref()
        .map(format_date_chicago)
        .unwrap_or_else(|| "n.d.".to_string());

    let mut out = String::new();
    if !author.is_empty() {
        out.push_str(&format!("{author}. "));
    }
    out.push_str(&title);
    match payload.venue() {
        Some(site) => out.push_str(&format!(" {site}, {date_str}.")),
        None => out.push_str(&format!(" {date_str}.")),
    }
    if let Some(url) = payload.url.as_deref() {
        out.push_str(&format!(" {url}."));
    }
    if let Some(doi) = payload.doi.as_deref() {
        out.push_str(&format!(" https://doi.org/{doi}"));
    }
    if opts.include_accessed {
        out.push_str(&format!(" Accessed {}.", today_long()));
    }
    out
}

fn ieee(payload: &CitationPayload, opts: &RenderOptions) -> String {
    let author = author_line(payload, Style::Ieee, false);
    let title = title_for(payload, Style::Ieee, opts);
    let year = payload
        .date
        .as_ref()
        .and_then(|d| d.year)
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".to_string());

    let mut out = String::new();
    if !author.is_empty() {
        out.push_str(&format!("{author}, "));
    }
    out.push_str(&format!("\u{201c}{title},\u{201d} "));
    if let Some(site) = payload.venue() {
        out.push_str(&format!("{site}, "));
    }
    out.push_str(&format!("{year}."));
    if let Some(url) = payload.url.as_deref() {
        out.push_str(&format!(" [Online]. Available: {url}."));
    }
    if opts.include_accessed {
        out.push_str(&format!(" [Accessed: {}].", today_long()));
    }
    out
}

fn harvard(payload: &CitationPayload, opts: &RenderOptions) -> String {
    let author = author_line(payload, Style::Harvard, false);
    let title = title_for(payload, Style::Harvard, opts);
    let year = payload
        .date
        .as_ref()
        .and_then(|d| d.year)
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".to_string());

    let mut out = String::new();
    if author.is_empty() {
        out.push_str(&format!("{title} ({year})"));
    } else {
        out.push_str(&format!("{author} ({year}) {title}."));
    }
    if let Some(site) = payload.venue() {
        out.push_str(&format!(" {site}."));
    }
    if let Some(url) = payload.url.as_deref() {
        out.push_str(&format!(" Available at: {url}"));
        if opts.include_accessed {
            out.push_str(&format!(" (Accessed: {})", today_harvard()));
        }
        out.push('.');
    }
    out
}

fn vancouver(payload: &CitationPayload, opts: &RenderOptions) -> String {
    let author = author_line(payload, Style::Vancouver, false);
    let title = title_for(payload, Style::Vancouver, opts);
    let date_str = payload
        .date
        .as_ref()
        .and_then(|d| d.year)
        .map(|y| y.to_string())
        .unwrap_or_else(|| "date unknown".to_string());

    let mut out = String::new();
    if !author.is_empty() {
        out.push_str(&format!("{author}. "));
    }
    out.push_str(&format!("{title} [Internet]."));
    match payload.venue() {
        Some(site) => out.push_str(&format!(" {site}; {date_str}")),
        None => out.push_str(&format!(" {date_str}")),
    }
    if opts.include_accessed {
        out.push_str(&format!(" [cited {}]", today_vancouver()));
    }
    out.push('.');
    if let Some(url) = payload.url.as_deref() {
        out.push_str(&format!(" Available from: {url}"));
    }
    out
}

fn format_date_mla(date: &DateParts) -> String {
    match (date.day, date.month_abbrev(), date.year) {
        (Some(day), Some(month), Some(year)) => format!("{day} {month}. {year}"),
        (None, Some(month), Some(year)) => format!("{month}. {year}"),
        (_, None, Some(year)) => year.to_string(),
        _ => "n.d.".to_string(),
    }
}

fn format_date_chicago(date: &DateParts) -> String {
    match (date.month_name(), date.day, date.year) {
        (Some(month), Some(day), Some(year)) => format!("{month} {day}, {year}"),
        (Some(month), None, Some(year)) => format!("{month} {year}"),
        (None, _, Some(year)) => year.to_string(),
        _ => "n.d.".to_string(),
    }
}

fn ensure_terminal_period(s: &str) -> String {
    let t = s.trim_end();
    if t.is_empty() || t.ends_with('.') {
        t.to_string()
    } else {
        format!("{t}.")
    }
}

/// Capitalize the first word and the first word after a colon; lowercase the
/// rest except all-caps tokens and quoted words.
pub fn sentence_case_smart(s: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut cap_next = true;
    for word in s.split_whitespace() {
        let alpha: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
        let all_caps = alpha.len() >= 2 && alpha.iter().all(|c| c.is_uppercase());
        let quoted = word.starts_with('"') && word.ends_with('"') && word.len() > 1;
        let rendered = if all_caps || quoted {
            word.to_string()
        } else if cap_next {
            capitalize(word)
        } else {
            word.to_lowercase()
        };
        cap_next = word.ends_with(':');
        out.push(rendered);
    }
    out.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn today_parts() -> (i32, u32, u32) {
    let today = Local::now().date_naive();
    (today.year(), today.month(), today.day())
}

fn today_long() -> String {
    let (y, m, d) = today_parts();
    format!("{} {d}, {y}", month_name(m).unwrap_or(""))
}

fn today_mla() -> String {
    let (y, m, d) = today_parts();
    let month = month_name(m).map(|n| &n[..3]).unwrap_or("");
    format!("{d} {month}. {y}")
}

fn today_harvard() -> String {
    let (y, m, d) = today_parts();
    format!("{d} {} {y}", month_name(m).unwrap_or(""))
}

fn today_vancouver() -> String {
    let (y, m, d) = today_parts();
    let month = month_name(m).map(|n| &n[..3]).unwrap_or("");
    format!("{y} {month} {d}")
}
