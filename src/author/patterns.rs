//! Classifier tables for the author pipeline, kept as data so they can be
//! tested and extended without touching the logic that consults them.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading byline verbiage stripped before any split is attempted.
pub static BYLINE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:by|written by|reported by|story by|words by)[:\s]+").unwrap());

/// Trailing provenance clauses ("From WBUR", "Heard on Morning Edition").
/// These describe where a piece ran, not who wrote it.
pub static PROVENANCE_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:[,/|]\s*)?\b(?:from|heard on|reviewed by|produced by|edited by)\s+\S.*$")
        .unwrap()
});

/// Photo and image credits are never authorship.
pub static PHOTO_CREDIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:photo(?:graph)?s?|image(?:s|ry)?|illustrations?|getty|credits?)\b").unwrap()
});

/// Wire services and outlets that show up inside bylines as provenance.
/// Matched whole, case-insensitively.
pub static WIRE_SERVICES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "npr",
        "npr news",
        "ap",
        "associated press",
        "the associated press",
        "reuters",
        "afp",
        "upi",
        "pbs",
        "pbs newshour",
        "bbc",
        "bbc news",
        "cnn",
        "bloomberg",
        "cbc",
        "cbc news",
    ]
    .into_iter()
    .collect()
});

/// US broadcast station call signs: K or W prefix, three or four letters,
/// optional band tag.
pub static CALL_SIGN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[KW][A-Z]{2,3}(?:-(?:AM|FM|TV))?$").unwrap());

/// Section names and content descriptors that read like bylines but denote
/// no person. Matched on whole-word containment.
pub static CONTENT_TOPICS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "staff",
        "editorial",
        "team",
        "newsroom",
        "communications",
        "webmaster",
        "administrator",
        "content",
        "opinion",
        "newsletter",
        "transcript",
        "research publications",
        "research and education",
        "special series",
    ]
    .into_iter()
    .collect()
});

/// Vocabulary that marks a candidate as an organization name.
pub static ORG_VOCAB: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "department",
        "institute",
        "institution",
        "administration",
        "committee",
        "network",
        "university",
        "college",
        "school",
        "agency",
        "center",
        "centre",
        "bureau",
        "commission",
        "association",
        "foundation",
        "laboratory",
        "library",
        "council",
        "society",
        "office",
        "ministry",
        "organization",
        "organisation",
        "corporation",
        "company",
        "coalition",
        "initiative",
        "project",
        "service",
        "services",
        "research",
        "press",
        "media",
        "group",
    ]
    .into_iter()
    .collect()
});

/// Broadcast/segment/program-type words: a two-word candidate ending in one
/// of these ("Morning Edition", "Science Friday") is a program, not a person.
pub static PROGRAM_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "news", "newshour", "edition", "show", "report", "reports", "radio", "podcast", "hour",
        "tonight", "today", "program", "programme", "friday", "weekend",
    ]
    .into_iter()
    .collect()
});

/// Honorific prefixes tolerated in front of a person name.
pub static HONORIFIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Dr|Prof|Professor|Mr|Mrs|Ms|Sir|Rev|Hon)\.?$").unwrap());

/// Generational/suffix tokens.
pub static SUFFIX_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Jr\.?|Sr\.?|II|III|IV)$").unwrap());

/// Single bare or dotted initial ("J", "J.").
pub static INITIAL_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]\.?$").unwrap());

/// Run of dotted initials ("J.R.").
pub static DOTTED_INITIALS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Z]\.){1,3}$").unwrap());

/// Capitalized name word, allowing apostrophes and hyphens (O'Brien,
/// Smith-Jones, McDonald).
pub static CAP_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z'’-]+$").unwrap());

/// Title-cased bare dictionary-shaped word of an organization-style name.
/// Initials, particles and short given names break the pattern.
pub static ORG_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]{3,}$").unwrap());

/// Recognized overall person-name shapes. A candidate must match at least
/// one in addition to passing per-token checks.
pub static NAME_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // First Last, First Middle Last
        r"^[A-Z][A-Za-z'’-]+(?:\s+[A-Z][A-Za-z'’.-]+){1,3}$",
        // First M. Last, First M Last, First M. N. Last
        r"^[A-Z][A-Za-z'’-]+\s+(?:[A-Z]\.?\s+){1,2}[A-Z][A-Za-z'’-]+$",
        // Suffixed
        r"^[A-Z][A-Za-z'’-]+(?:\s+[A-Z][A-Za-z'’.-]+){1,3},?\s+(?:Jr\.?|Sr\.?|II|III|IV)$",
        // Honorific-prefixed
        r"^(?:Dr|Prof|Professor|Mr|Mrs|Ms|Sir|Rev|Hon)\.?\s+[A-Z][A-Za-z'’-]+(?:\s+[A-Z][A-Za-z'’.-]+){1,3}$",
        // Last, First (Middle)
        r"^[A-Z][A-Za-z'’-]+,\s*[A-Z][A-Za-z'’.\s-]+$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// "Last, First" two-part shape used by the comma split to re-join an
/// inverted single name instead of over-splitting it.
pub static LAST_FIRST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z'’-]+,\s*[A-Z][A-Za-z'’.\s-]*[A-Za-z.]$").unwrap());

/// Body-text byline fallback. Only "by" itself is case-relaxed; the captured
/// name must be properly cased and stay on one line, or the first thousand
/// characters of any page would cough up false positives.
pub static BODY_BYLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[Bb][Yy] ([A-Z][a-z]+(?: [A-Z][a-z]+){0,3})\b").unwrap());

/// Hostname-to-canonical-name lookup used as the corporate author of last
/// resort. Suffix-matched, so "blog.epa.gov" hits the "epa.gov" entry.
///
/// The built-in table is a seed, not an authority; callers with better
/// coverage supply their own entries.
#[derive(Debug, Clone)]
pub struct CorporateDomains {
    entries: Vec<(String, String)>,
}

impl CorporateDomains {
    pub fn with_entries<I, S, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        CorporateDomains {
            entries: entries
                .into_iter()
                .map(|(d, n)| (d.into().to_ascii_lowercase(), n.into()))
                .collect(),
        }
    }

    pub fn lookup(&self, hostname: &str) -> Option<&str> {
        let host = hostname.trim().to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        self.entries
            .iter()
            .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{domain}")))
            .map(|(_, name)| name.as_str())
    }
}

impl Default for CorporateDomains {
    fn default() -> Self {
        CorporateDomains::with_entries([
            ("epa.gov", "U.S. Environmental Protection Agency"),
            ("noaa.gov", "National Oceanic and Atmospheric Administration"),
            ("cdc.gov", "Centers for Disease Control and Prevention"),
            ("nih.gov", "National Institutes of Health"),
            ("nasa.gov", "NASA"),
            ("census.gov", "U.S. Census Bureau"),
            ("npr.org", "NPR"),
            ("bbc.co.uk", "BBC"),
            ("bbc.com", "BBC"),
            ("who.int", "World Health Organization"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corporate_lookup_suffix_matches() {
        let table = CorporateDomains::default();
        assert_eq!(
            table.lookup("epa.gov"),
            Some("U.S. Environmental Protection Agency")
        );
        assert_eq!(
            table.lookup("www.epa.gov"),
            Some("U.S. Environmental Protection Agency")
        );
        assert_eq!(
            table.lookup("blog.epa.gov"),
            Some("U.S. Environmental Protection Agency")
        );
        assert_eq!(table.lookup("notepa.gov"), None);
        assert_eq!(table.lookup("example.com"), None);
    }

    #[test]
    fn corporate_lookup_custom_entries() {
        let table = CorporateDomains::with_entries([("example.org", "Example Society")]);
        assert_eq!(table.lookup("example.org"), Some("Example Society"));
        assert_eq!(table.lookup("epa.gov"), None);
    }

    #[test]
    fn call_signs_match() {
        assert!(CALL_SIGN_RE.is_match("WBUR"));
        assert!(CALL_SIGN_RE.is_match("KQED"));
        assert!(CALL_SIGN_RE.is_match("WNYC-FM"));
        assert!(!CALL_SIGN_RE.is_match("NPR"));
        assert!(!CALL_SIGN_RE.is_match("Wbur"));
    }

    #[test]
    fn byline_prefix_strips() {
        assert_eq!(BYLINE_PREFIX_RE.replace("By Jane Doe", ""), "Jane Doe");
        assert_eq!(
            BYLINE_PREFIX_RE.replace("Written by: Jane Doe", ""),
            "Jane Doe"
        );
        assert_eq!(BYLINE_PREFIX_RE.replace("Byron Smith", ""), "Byron Smith");
    }
}
