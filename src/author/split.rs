use once_cell::sync::Lazy;
use regex::Regex;

use super::classify::{Classification, classify};
use super::resolve::ResolverOptions;
use super::{NameCandidate, RawFragment, normalize_ws, patterns};

/// Break one harvested fragment into atomic name candidates.
///
/// Splitting is a strict fallback chain: each strategy is tried against the
/// whole cleaned text, and the first one whose parts all validate as person
/// names wins. Byline text is too heterogeneous for a single separator, but
/// merging strategies would over-split single-author text that happens to
/// contain a stray comma or slash.
pub fn split_fragment(fragment: &RawFragment, opts: &ResolverOptions) -> Vec<NameCandidate> {
    let cleaned = clean_fragment(&fragment.text);
    if cleaned.is_empty() {
        return Vec::new();
    }

    // "Last, First" inversion: exactly two comma parts shaped like an
    // inverted single name are re-joined, not treated as two authors.
    let comma_parts: Vec<&str> = cleaned
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if comma_parts.len() == 2 && patterns::LAST_FIRST_RE.is_match(&normalize_ws(&cleaned)) {
        let joined = normalize_ws(&format!("{} {}", comma_parts[1], comma_parts[0]));
        if classify(&joined, opts) == Classification::Person {
            return vec![NameCandidate {
                text: joined,
                tier: fragment.tier,
            }];
        }
    }

    static AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+|\s*&\s*").unwrap());

    let attempts: [Vec<String>; 6] = [
        split_parts(&cleaned, ','),
        AND_RE
            .split(&cleaned)
            .map(normalize_ws)
            .filter(|p| !p.is_empty())
            .collect(),
        split_parts(&cleaned, '/'),
        split_parts(&cleaned, ';'),
        split_parts(&cleaned, '|'),
        split_parts(&cleaned, '\n'),
    ];

    for parts in attempts {
        if parts.len() >= 2
            && parts.len() <= opts.max_split_parts
            && parts
                .iter()
                .all(|p| classify(p, opts) == Classification::Person)
        {
            return parts
                .into_iter()
                .map(|text| NameCandidate {
                    text,
                    tier: fragment.tier,
                })
                .collect();
        }
    }

    // No structured interpretation held up: the whole cleaned fragment is one
    // candidate if it survives classification on its own.
    let whole = normalize_ws(&cleaned);
    if classify(&whole, opts) != Classification::Discard {
        return vec![NameCandidate {
            text: whole,
            tier: fragment.tier,
        }];
    }
    Vec::new()
}

fn split_parts(text: &str, sep: char) -> Vec<String> {
    text.split(sep)
        .map(normalize_ws)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Strip byline verbiage and provenance from a raw fragment, preserving line
/// breaks (one of the split strategies needs them).
fn clean_fragment(text: &str) -> String {
    let collapsed = collapse_keeping_newlines(text);
    let stripped = patterns::BYLINE_PREFIX_RE.replace(&collapsed, "");
    let truncated = match patterns::PROVENANCE_TAIL_RE.find(&stripped) {
        Some(m) if m.start() > 0 => &stripped[..m.start()],
        _ => &stripped[..],
    };
    let trimmed = truncated
        .trim()
        .trim_matches(|c: char| matches!(c, ',' | '|' | '/' | ';' | '-'))
        .trim()
        .to_string();
    strip_trailing_outlets(trimmed)
}

/// Drop trailing separator-delimited segments that are pure provenance
/// ("Barbara Moran / WBUR" keeps only the name). Repeats until the tail is
/// not an outlet token.
fn strip_trailing_outlets(mut text: String) -> String {
    loop {
        let Some(idx) = text.rfind(['/', '|', ';', ',']) else {
            return text;
        };
        let tail = text[idx + 1..].trim();
        if tail.is_empty() || is_outlet_token(tail) {
            text.truncate(idx);
            let trimmed = text.trim_end().trim_end_matches([',', '|', '/', ';']);
            text = trimmed.trim_end().to_string();
        } else {
            return text;
        }
    }
}

fn is_outlet_token(tail: &str) -> bool {
    let t = normalize_ws(tail);
    patterns::WIRE_SERVICES.contains(t.to_lowercase().as_str())
        || patterns::CALL_SIGN_RE.is_match(&t)
        || patterns::PHOTO_CREDIT_RE.is_match(&t)
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
