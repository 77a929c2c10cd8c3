//! The citation-ready payload value: one immutable struct per extraction
//! pass. The formatting and export layers read it; manual edits produce a
//! fresh copy via [`CitationPayload::with_overrides`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::author::{AuthorKind, AuthorSource, ResolutionConfidence, ResolvedAuthor};

#[derive(Debug, Clone)]
pub struct CitationPayload {
    pub title: String,
    pub authors: Vec<ResolvedAuthor>,
    pub date: Option<DateParts>,
    pub url: Option<String>,
    pub site_name: Option<String>,
    pub publisher: Option<String>,
    pub doi: Option<String>,
    pub is_pdf: bool,
    pub pdf_filename: Option<String>,
    pub author_source: AuthorSource,
    pub author_confidence: ResolutionConfidence,
}

impl CitationPayload {
    /// Whether the pass produced anything worth keeping. Used by the driver
    /// to decide on the one deferred re-check.
    pub fn has_signal(&self) -> bool {
        !self.title.is_empty() || !self.authors.is_empty()
    }

    /// Best available container/publisher name for rendering.
    pub fn venue(&self) -> Option<&str> {
        self.publisher
            .as_deref()
            .or(self.site_name.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Clone-and-edit: manual field overrides yield a distinct payload, the
    /// extracted original stays as scanned.
    pub fn with_overrides(&self, overrides: &FieldOverrides) -> CitationPayload {
        let mut edited = self.clone();
        if let Some(title) = &overrides.title {
            edited.title = title.trim().to_string();
        }
        if let Some(authors) = &overrides.authors {
            edited.authors = authors
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|name| ResolvedAuthor {
                    name: name.to_string(),
                    kind: AuthorKind::Person,
                    score: 0,
                })
                .collect();
        }
        if let Some(date) = &overrides.date {
            edited.date = Some(DateParts::parse(date));
        }
        if let Some(publisher) = &overrides.publisher {
            edited.publisher = Some(publisher.trim().to_string());
        }
        if let Some(doi) = &overrides.doi {
            edited.doi = Some(doi.trim().to_string());
        }
        edited
    }
}

/// Manual edits applied on top of an extracted payload.
#[derive(Debug, Clone, Default)]
pub struct FieldOverrides {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
    pub doi: Option<String>,
}

impl FieldOverrides {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_none()
            && self.date.is_none()
            && self.publisher.is_none()
            && self.doi.is_none()
    }
}

/// A page date broken into whatever parts the raw string actually carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParts {
    pub raw: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

static ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:[-/](\d{1,2})(?:[-/](\d{1,2}))?)?$").unwrap());
static DAY_MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})\s+([A-Za-z]{3,9})\.?,?\s+(\d{4})\b").unwrap());
static MONTH_DAY_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([A-Za-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})\b").unwrap());
static MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([A-Za-z]{3,9})\.?\s+(\d{4})\b").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl DateParts {
    /// Parse whatever date shape the page handed over: ISO, "12 March 2023",
    /// "March 12, 2023", "March 2023", or a bare year. Unrecognized input
    /// keeps the raw string with no parts.
    pub fn parse(raw: &str) -> DateParts {
        let t = raw.trim();
        let mut parts = DateParts {
            raw: t.to_string(),
            year: None,
            month: None,
            day: None,
        };

        // RFC3339 timestamps reduce to their date head.
        let head = t
            .split(['T', ' '])
            .next()
            .unwrap_or(t)
            .trim_end_matches(['.', ',', ';']);
        if let Some(c) = ISO_RE.captures(head) {
            parts.year = c.get(1).and_then(|m| m.as_str().parse().ok());
            parts.month = c.get(2).and_then(|m| m.as_str().parse().ok()).filter(valid_month);
            parts.day = c.get(3).and_then(|m| m.as_str().parse().ok()).filter(valid_day);
            if parts.year.is_some() {
                return parts;
            }
        }
        if let Some(c) = DAY_MONTH_YEAR_RE.captures(t)
            && let Some(month) = month_number(&c[2])
        {
            parts.day = c[1].parse().ok().filter(valid_day);
            parts.month = Some(month);
            parts.year = c[3].parse().ok();
            return parts;
        }
        if let Some(c) = MONTH_DAY_YEAR_RE.captures(t)
            && let Some(month) = month_number(&c[1])
        {
            parts.month = Some(month);
            parts.day = c[2].parse().ok().filter(valid_day);
            parts.year = c[3].parse().ok();
            return parts;
        }
        if let Some(c) = MONTH_YEAR_RE.captures(t)
            && let Some(month) = month_number(&c[1])
        {
            parts.month = Some(month);
            parts.year = c[2].parse().ok();
            return parts;
        }
        if let Some(c) = YEAR_RE.captures(t) {
            parts.year = c[1].parse().ok();
        }
        parts
    }

    pub fn month_name(&self) -> Option<&'static str> {
        self.month.map(|m| MONTHS[(m - 1) as usize])
    }

    pub fn month_abbrev(&self) -> Option<&'static str> {
        self.month_name().map(|name| &name[..3])
    }

    /// "2023-04-05", "2023-04" or "2023", whichever is known.
    pub fn iso(&self) -> Option<String> {
        let year = self.year?;
        match (self.month, self.day) {
            (Some(m), Some(d)) => Some(format!("{year:04}-{m:02}-{d:02}")),
            (Some(m), None) => Some(format!("{year:04}-{m:02}")),
            _ => Some(format!("{year:04}")),
        }
    }
}

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTHS.get((month as usize).checked_sub(1)?).copied()
}

/// Full month names and unambiguous prefixes of three or more letters
/// ("Dec", "Sept").
fn month_number(name: &str) -> Option<u32> {
    let low = name.to_lowercase();
    if low.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.to_lowercase().starts_with(&low))
        .map(|i| (i + 1) as u32)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn valid_month(m: &u32) -> bool {
    (1..=12).contains(m)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn valid_day(d: &u32) -> bool {
    (1..=31).contains(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: &str) -> (Option<i32>, Option<u32>, Option<u32>) {
        let d = DateParts::parse(raw);
        (d.year, d.month, d.day)
    }

    #[test]
    fn parses_iso_variants() {
        assert_eq!(parsed("2023-04-05"), (Some(2023), Some(4), Some(5)));
        assert_eq!(parsed("2023/04/05"), (Some(2023), Some(4), Some(5)));
        assert_eq!(parsed("2023-04"), (Some(2023), Some(4), None));
        assert_eq!(parsed("2023"), (Some(2023), None, None));
        assert_eq!(parsed("2023-04-05T10:00:00Z"), (Some(2023), Some(4), Some(5)));
    }

    #[test]
    fn parses_written_dates() {
        assert_eq!(parsed("5 April 2023"), (Some(2023), Some(4), Some(5)));
        assert_eq!(parsed("April 5, 2023"), (Some(2023), Some(4), Some(5)));
        assert_eq!(parsed("April 2023"), (Some(2023), Some(4), None));
        assert_eq!(parsed("3 Dec 2020"), (Some(2020), Some(12), Some(3)));
    }

    #[test]
    fn falls_back_to_a_bare_year() {
        assert_eq!(parsed("Published in 2019, updated later"), (Some(2019), None, None));
        assert_eq!(parsed("no date here"), (None, None, None));
    }

    #[test]
    fn iso_rendering_uses_known_parts_only() {
        assert_eq!(DateParts::parse("2023-04-05").iso().as_deref(), Some("2023-04-05"));
        assert_eq!(DateParts::parse("April 2023").iso().as_deref(), Some("2023-04"));
        assert_eq!(DateParts::parse("2023").iso().as_deref(), Some("2023"));
        assert_eq!(DateParts::parse("n.d.").iso(), None);
    }

    #[test]
    fn month_names_resolve() {
        let d = DateParts::parse("2023-04-05");
        assert_eq!(d.month_name(), Some("April"));
        assert_eq!(d.month_abbrev(), Some("Apr"));
    }

    #[test]
    fn overrides_edit_a_copy_not_the_original() {
        let payload = CitationPayload {
            title: "Original".into(),
            authors: Vec::new(),
            date: None,
            url: None,
            site_name: None,
            publisher: None,
            doi: None,
            is_pdf: false,
            pdf_filename: None,
            author_source: AuthorSource::None,
            author_confidence: ResolutionConfidence::None,
        };
        let edited = payload.with_overrides(&FieldOverrides {
            title: Some("Edited".into()),
            authors: Some("Jane Doe, John Smith".into()),
            ..FieldOverrides::default()
        });
        assert_eq!(payload.title, "Original");
        assert_eq!(edited.title, "Edited");
        assert_eq!(edited.authors.len(), 2);
        assert_eq!(edited.authors[0].name, "Jane Doe");
    }
}
