use log::debug;

use super::classify::{Classification, classify, is_provenance_noise};
use super::patterns::CorporateDomains;
use super::split::split_fragment;
use super::{
    AuthorKind, AuthorSource, RawFragment, ResolutionConfidence, ResolvedAuthor, normalize_ws,
};

/// Tunable knobs of the author pipeline. The numeric defaults are the
/// empirically chosen values the heuristics were tuned against; they are
/// fields rather than literals so callers can move them without edits here.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Candidate length bounds, in characters, after trimming.
    pub min_len: usize,
    pub max_len: usize,
    /// Person-name token count bounds.
    pub min_tokens: usize,
    pub max_tokens: usize,
    /// Upper bound on how many parts a split strategy may produce.
    pub max_split_parts: usize,
    /// Minimum aggregate score a candidate group needs to survive.
    pub score_threshold: u32,
    /// Cap on the final author list.
    pub max_authors: usize,
    /// Corporate author inference table for the no-person fallback.
    pub corporate_domains: CorporateDomains,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            min_len: 4,
            max_len: 80,
            min_tokens: 2,
            max_tokens: 5,
            max_split_parts: 5,
            score_threshold: 2,
            max_authors: 20,
            corporate_domains: CorporateDomains::default(),
        }
    }
}

/// Final author list plus diagnostics about where it came from.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub authors: Vec<ResolvedAuthor>,
    pub source: AuthorSource,
    pub confidence: ResolutionConfidence,
}

#[cfg(test)]
impl Resolution {
    fn names(&self) -> Vec<&str> {
        self.authors.iter().map(|a| a.name.as_str()).collect()
    }
}

impl Resolution {
    fn empty() -> Self {
        Resolution {
            authors: Vec::new(),
            source: AuthorSource::None,
            confidence: ResolutionConfidence::None,
        }
    }
}

/// Merge harvested fragments into the final ordered author list.
///
/// Always returns a value; a fragment set that yields nothing ends in the
/// fallback chain (corporate domain table, harvested organization,
/// publisher) and ultimately an empty list, never an error.
pub fn resolve_authors(
    fragments: &[RawFragment],
    hostname: Option<&str>,
    publisher: Option<&str>,
    opts: &ResolverOptions,
) -> Resolution {
    struct Group {
        key: String,
        display: String,
        kind: AuthorKind,
        score: u32,
    }

    let mut groups: Vec<Group> = Vec::new();
    for fragment in fragments {
        for cand in split_fragment(fragment, opts) {
            let kind = match classify(&cand.text, opts) {
                Classification::Person => AuthorKind::Person,
                Classification::Organization => AuthorKind::Organization,
                Classification::Discard => {
                    debug!("discarding candidate {:?} from {:?}", cand.text, fragment.kind);
                    continue;
                }
            };
            let key = comparison_key(&cand.text);
            if let Some(group) = groups.iter_mut().find(|g| g.key == key) {
                group.score += cand.tier.weight();
            } else {
                groups.push(Group {
                    key,
                    display: normalize_ws(&cand.text),
                    kind,
                    score: cand.tier.weight(),
                });
            }
        }
    }

    let mut persons: Vec<ResolvedAuthor> = groups
        .iter()
        .filter(|g| g.kind == AuthorKind::Person && g.score >= opts.score_threshold)
        .map(|g| ResolvedAuthor {
            name: g.display.clone(),
            kind: g.kind,
            score: g.score,
        })
        .collect();
    // Stable sort: equal scores keep first-discovery order.
    persons.sort_by(|a, b| b.score.cmp(&a.score));
    persons.truncate(opts.max_authors);

    if let Some(best) = persons.first() {
        let confidence = confidence_for(best.score);
        return Resolution {
            authors: persons,
            source: AuthorSource::Page,
            confidence,
        };
    }

    // No person survived. Corporate author of last resort, most canonical
    // source first.
    if let Some(host) = hostname
        && let Some(name) = opts.corporate_domains.lookup(host)
    {
        debug!("no person candidates; corporate inference for {host}");
        return Resolution {
            authors: vec![organization(name, 0)],
            source: AuthorSource::DomainTable,
            confidence: ResolutionConfidence::Medium,
        };
    }

    let mut orgs: Vec<&Group> = groups
        .iter()
        .filter(|g| g.kind == AuthorKind::Organization && g.score >= opts.score_threshold)
        .collect();
    orgs.sort_by(|a, b| b.score.cmp(&a.score));
    if let Some(best) = orgs.first() {
        return Resolution {
            authors: vec![ResolvedAuthor {
                name: best.display.clone(),
                kind: AuthorKind::Organization,
                score: best.score,
            }],
            source: AuthorSource::Page,
            confidence: confidence_for(best.score),
        };
    }

    if let Some(publisher) = publisher {
        let publisher = normalize_ws(publisher);
        if !publisher.is_empty() && !is_provenance_noise(&publisher) {
            return Resolution {
                authors: vec![organization(&publisher, 0)],
                source: AuthorSource::Publisher,
                confidence: ResolutionConfidence::Low,
            };
        }
    }

    Resolution::empty()
}

fn organization(name: &str, score: u32) -> ResolvedAuthor {
    ResolvedAuthor {
        name: name.to_string(),
        kind: AuthorKind::Organization,
        score,
    }
}

fn confidence_for(score: u32) -> ResolutionConfidence {
    if score >= 6 {
        ResolutionConfidence::High
    } else if score >= 3 {
        ResolutionConfidence::Medium
    } else {
        ResolutionConfidence::Low
    }
}

/// Case-, whitespace- and punctuation-insensitive grouping key.
fn comparison_key(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    normalize_ws(&mapped)
}

#[cfg(test)]
mod tests {
    use super::super::{ConfidenceTier, SourceKind};
    use super::*;

    fn frag(text: &str, tier: ConfidenceTier) -> RawFragment {
        RawFragment::new(text, SourceKind::VisibleSelector, tier)
    }

    fn meta(text: &str) -> RawFragment {
        RawFragment::new(text, SourceKind::Meta, ConfidenceTier::High)
    }

    fn resolve(fragments: &[RawFragment]) -> Resolution {
        resolve_authors(fragments, None, None, &ResolverOptions::default())
    }

    #[test]
    fn splits_high_confidence_byline_into_two_persons() {
        let res = resolve(&[frag("By Jane A. Smith and John Doe", ConfidenceTier::High)]);
        assert_eq!(res.names(), vec!["Jane A. Smith", "John Doe"]);
        assert!(res.authors.iter().all(|a| a.kind == AuthorKind::Person));
        assert_eq!(res.source, AuthorSource::Page);
    }

    #[test]
    fn corroborated_mentions_merge_into_one_entry() {
        let res = resolve(&[frag("Barbara Moran", ConfidenceTier::High), meta("Barbara Moran")]);
        assert_eq!(res.names(), vec!["Barbara Moran"]);
        assert_eq!(res.authors[0].score, 6);
        assert_eq!(res.confidence, ResolutionConfidence::High);
    }

    #[test]
    fn dedup_is_case_and_punctuation_insensitive() {
        let res = resolve(&[
            meta("Jane A. Smith"),
            frag("JANE A SMITH", ConfidenceTier::Medium),
            frag("Jane A Smith", ConfidenceTier::Low),
        ]);
        assert_eq!(res.authors.len(), 1);
        assert_eq!(res.authors[0].name, "Jane A. Smith");
        assert_eq!(res.authors[0].score, 6);
    }

    #[test]
    fn single_low_confidence_mention_is_insufficient() {
        let res = resolve(&[frag("Barbara Moran", ConfidenceTier::Low)]);
        assert!(res.authors.is_empty());
        assert_eq!(res.source, AuthorSource::None);
    }

    #[test]
    fn two_low_confidence_mentions_clear_the_threshold() {
        let res = resolve(&[
            frag("Barbara Moran", ConfidenceTier::Low),
            frag("By Barbara Moran", ConfidenceTier::Low),
        ]);
        assert_eq!(res.names(), vec!["Barbara Moran"]);
        assert_eq!(res.authors[0].score, 2);
        assert_eq!(res.confidence, ResolutionConfidence::Low);
    }

    #[test]
    fn ordering_is_by_score_then_first_seen() {
        let res = resolve(&[
            frag("Jane Doe", ConfidenceTier::Medium),
            frag("John Smith", ConfidenceTier::Medium),
            meta("John Smith"),
        ]);
        assert_eq!(res.names(), vec!["John Smith", "Jane Doe"]);

        let tie = resolve(&[
            frag("Jane Doe", ConfidenceTier::Medium),
            frag("John Smith", ConfidenceTier::Medium),
        ]);
        assert_eq!(tie.names(), vec!["Jane Doe", "John Smith"]);
    }

    #[test]
    fn outlet_noise_never_survives() {
        let res = resolve(&[
            meta("By Barbara Moran / WBUR"),
            frag("NPR", ConfidenceTier::Low),
        ]);
        assert_eq!(res.names(), vec!["Barbara Moran"]);
    }

    #[test]
    fn corporate_domain_inference_beats_harvested_org_string() {
        let res = resolve_authors(
            &[meta("US EPA")],
            Some("epa.gov"),
            None,
            &ResolverOptions::default(),
        );
        assert_eq!(res.names(), vec!["U.S. Environmental Protection Agency"]);
        assert_eq!(res.authors[0].kind, AuthorKind::Organization);
        assert_eq!(res.source, AuthorSource::DomainTable);
    }

    #[test]
    fn harvested_org_is_used_without_a_domain_mapping() {
        let res = resolve_authors(
            &[meta("US EPA")],
            Some("example.com"),
            None,
            &ResolverOptions::default(),
        );
        assert_eq!(res.names(), vec!["US EPA"]);
        assert_eq!(res.source, AuthorSource::Page);
    }

    #[test]
    fn publisher_is_the_last_fallback_unless_noisy() {
        let res = resolve_authors(&[], None, Some("The Boston Globe"), &ResolverOptions::default());
        assert_eq!(res.names(), vec!["The Boston Globe"]);
        assert_eq!(res.source, AuthorSource::Publisher);
        assert_eq!(res.confidence, ResolutionConfidence::Low);

        let noisy = resolve_authors(&[], None, Some("WBUR"), &ResolverOptions::default());
        assert!(noisy.authors.is_empty());
    }

    #[test]
    fn three_character_candidate_is_always_discarded() {
        let res = resolve(&[meta("Abc")]);
        assert!(res.authors.is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let fragments = vec![
            meta("By Jane A. Smith and John Doe"),
            frag("Jane A. Smith", ConfidenceTier::Medium),
            frag("US EPA", ConfidenceTier::Low),
            frag("Barbara Moran", ConfidenceTier::Low),
        ];
        let a = resolve(&fragments);
        let b = resolve(&fragments);
        assert_eq!(a.names(), b.names());
        assert_eq!(a.source, b.source);
    }

    #[test]
    fn no_duplicates_under_loose_equality() {
        proptest::proptest!(|(reps in 1usize..5, tier_seed in 0u8..3)| {
            let tier = match tier_seed {
                0 => ConfidenceTier::Low,
                1 => ConfidenceTier::Medium,
                _ => ConfidenceTier::High,
            };
            let mut fragments = Vec::new();
            for _ in 0..reps {
                fragments.push(frag("Jane  Doe", tier));
                fragments.push(meta("JANE DOE"));
                fragments.push(frag("jane doe", ConfidenceTier::Medium));
            }
            let res = resolve(&fragments);
            let mut keys: Vec<String> = res
                .authors
                .iter()
                .map(|a| comparison_key(&a.name))
                .collect();
            keys.sort();
            keys.dedup();
            proptest::prop_assert_eq!(keys.len(), res.authors.len());
        })
    }
}
