use super::patterns;
use super::resolve::ResolverOptions;
use super::normalize_ws;

/// Verdict for one candidate string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Person,
    Organization,
    Discard,
}

/// Decide whether a candidate denotes a person, an organization, or noise.
///
/// Order matters: provenance and noise are filtered before the organization
/// check so that short all-caps outlet tokens never get promoted to
/// corporate authors.
pub fn classify(candidate: &str, opts: &ResolverOptions) -> Classification {
    let t = normalize_ws(candidate);
    let len = t.chars().count();
    if len < opts.min_len || len > opts.max_len {
        return Classification::Discard;
    }
    if is_provenance_noise(&t) {
        return Classification::Discard;
    }
    if is_organization(&t) {
        return Classification::Organization;
    }
    if is_person(&t, opts) {
        return Classification::Person;
    }
    Classification::Discard
}

/// True when a string is provenance noise on its own: a wire service, a
/// station call sign, a photo credit, or a content-topic term. Used for
/// candidate rejection and for vetting the publisher fallback.
pub(crate) fn is_provenance_noise(s: &str) -> bool {
    let t = normalize_ws(s);
    let low = t.to_lowercase();
    patterns::WIRE_SERVICES.contains(low.as_str())
        || patterns::CALL_SIGN_RE.is_match(&t)
        || patterns::PHOTO_CREDIT_RE.is_match(&t)
        || contains_topic(&low)
}

/// Whole-word containment against the content-topic list. Punctuation is
/// treated as a word break.
fn contains_topic(low: &str) -> bool {
    let words: String = low
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let padded = format!(" {} ", normalize_ws(&words));
    patterns::CONTENT_TOPICS
        .iter()
        .any(|topic| padded.contains(&format!(" {topic} ")))
}

fn is_organization(t: &str) -> bool {
    let words: Vec<&str> = t.split_whitespace().collect();

    if words
        .iter()
        .any(|w| patterns::ORG_VOCAB.contains(trim_word(w).to_lowercase().as_str()))
    {
        return true;
    }

    // Fully upper-case strings longer than four characters ("US EPA", "NASA JPL").
    let has_upper = t.chars().any(|c| c.is_uppercase());
    let has_lower = t.chars().any(|c| c.is_lowercase());
    if t.len() > 4 && has_upper && !has_lower {
        return true;
    }

    // Three or more title-cased bare words reads like an institution name.
    // Initials, particles and short given names break ORG_WORD_RE, which is
    // what keeps most person names out of this arm.
    if words.len() >= 3 && words.iter().all(|w| patterns::ORG_WORD_RE.is_match(w)) {
        return true;
    }

    // Two title-cased words ending in a broadcast/program-type word
    // ("Morning Edition", "Science Friday").
    if words.len() == 2
        && words[0].starts_with(|c: char| c.is_uppercase())
        && patterns::PROGRAM_WORDS.contains(trim_word(words[1]).to_lowercase().as_str())
    {
        return true;
    }

    false
}

fn is_person(t: &str, opts: &ResolverOptions) -> bool {
    let tokens: Vec<&str> = t.split_whitespace().collect();
    if tokens.len() < opts.min_tokens || tokens.len() > opts.max_tokens {
        return false;
    }
    let token_ok = |w: &str| {
        let w = w.trim_end_matches(',');
        patterns::INITIAL_TOKEN_RE.is_match(w)
            || patterns::DOTTED_INITIALS_RE.is_match(w)
            || patterns::CAP_WORD_RE.is_match(w)
            || patterns::SUFFIX_TOKEN_RE.is_match(w)
            || patterns::HONORIFIC_RE.is_match(w)
    };
    if !tokens.iter().all(|w| token_ok(w)) {
        return false;
    }
    patterns::NAME_SHAPES.iter().any(|re| re.is_match(t))
}

fn trim_word(w: &str) -> &str {
    w.trim_matches(|c: char| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(s: &str) -> Classification {
        classify(s, &ResolverOptions::default())
    }

    #[test]
    fn short_candidates_are_discarded_regardless_of_shape() {
        assert_eq!(check("Abc"), Classification::Discard);
        assert_eq!(check("AP"), Classification::Discard);
        assert_eq!(check(" Ab "), Classification::Discard);
    }

    #[test]
    fn overlong_candidates_are_discarded() {
        let long = "Jane ".repeat(20) + "Doe";
        assert_eq!(check(&long), Classification::Discard);
    }

    #[test]
    fn wire_services_and_call_signs_are_noise() {
        assert_eq!(check("Reuters"), Classification::Discard);
        assert_eq!(check("Associated Press"), Classification::Discard);
        assert_eq!(check("WBUR"), Classification::Discard);
        assert_eq!(check("KQED"), Classification::Discard);
    }

    #[test]
    fn photo_credits_are_noise() {
        assert_eq!(check("Photo: Jane Doe"), Classification::Discard);
        assert_eq!(check("Getty Images"), Classification::Discard);
    }

    #[test]
    fn content_topics_are_noise() {
        assert_eq!(check("Editorial Board"), Classification::Discard);
        assert_eq!(check("Research Publications"), Classification::Discard);
        assert_eq!(check("Newsroom Staff"), Classification::Discard);
    }

    #[test]
    fn topic_match_respects_word_boundaries() {
        // "Staffan" must not trip the "staff" topic.
        assert_eq!(check("Staffan Larsson"), Classification::Person);
    }

    #[test]
    fn organizations_by_vocabulary() {
        assert_eq!(
            check("Department of Energy"),
            Classification::Organization
        );
        assert_eq!(
            check("Acme Research Institute"),
            Classification::Organization
        );
    }

    #[test]
    fn organizations_by_case_and_shape() {
        assert_eq!(check("US EPA"), Classification::Organization);
        assert_eq!(check("Morning Edition"), Classification::Organization);
    }

    #[test]
    fn plain_person_names() {
        assert_eq!(check("Barbara Moran"), Classification::Person);
        assert_eq!(check("Jane A. Smith"), Classification::Person);
        assert_eq!(check("Dr. Jane Smith"), Classification::Person);
        assert_eq!(check("Smith, Jane"), Classification::Person);
        assert_eq!(check("John Smith Jr."), Classification::Person);
        assert_eq!(check("Conor O'Brien"), Classification::Person);
    }

    #[test]
    fn lowercase_junk_is_discarded() {
        assert_eq!(check("read more here"), Classification::Discard);
        assert_eq!(check("subscribe today"), Classification::Discard);
    }
}
