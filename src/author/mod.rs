pub mod classify;
pub mod harvest;
pub mod patterns;
pub mod resolve;
pub mod split;

pub use resolve::{ResolverOptions, resolve_authors};

/// Which page surface a fragment was harvested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Meta,
    JsonLd,
    Microdata,
    VisibleSelector,
    BodyTextRegex,
}

/// How trustworthy the harvesting surface is. Weights feed the aggregate
/// score a candidate needs to survive resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn weight(self) -> u32 {
        match self {
            ConfidenceTier::High => 3,
            ConfidenceTier::Medium => 2,
            ConfidenceTier::Low => 1,
        }
    }
}

/// A raw text fragment harvested from one page surface. Fragments carry
/// provenance only; splitting and classification happen downstream.
#[derive(Debug, Clone)]
pub struct RawFragment {
    pub text: String,
    pub kind: SourceKind,
    pub tier: ConfidenceTier,
}

impl RawFragment {
    pub fn new(text: impl Into<String>, kind: SourceKind, tier: ConfidenceTier) -> Self {
        RawFragment {
            text: text.into(),
            kind,
            tier,
        }
    }
}

/// An atomic name-like string split out of one fragment, inheriting the
/// fragment's confidence tier.
#[derive(Debug, Clone)]
pub struct NameCandidate {
    pub text: String,
    pub tier: ConfidenceTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorKind {
    Person,
    Organization,
}

/// A canonical author entry with its aggregated evidence score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuthor {
    pub name: String,
    pub kind: AuthorKind,
    pub score: u32,
}

/// Where the final author list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorSource {
    /// Harvested from the page itself (metadata, markup, or body text).
    Page,
    /// Inferred from the corporate domain table.
    DomainTable,
    /// The publisher/site name standing in as a corporate author.
    Publisher,
    /// Nothing resolved.
    None,
}

impl AuthorSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthorSource::Page => "page",
            AuthorSource::DomainTable => "domain-table",
            AuthorSource::Publisher => "publisher",
            AuthorSource::None => "none",
        }
    }
}

/// Overall trust in the resolved list, derived from the best aggregate score
/// or fixed per fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionConfidence {
    High,
    Medium,
    Low,
    None,
}

impl ResolutionConfidence {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionConfidence::High => "high",
            ResolutionConfidence::Medium => "medium",
            ResolutionConfidence::Low => "low",
            ResolutionConfidence::None => "none",
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub(crate) fn normalize_ws(s: &str) -> String {
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
