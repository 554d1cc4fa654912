//! Keyword-to-query matching: exact, phrase, and broad match, with negative
//! keyword blocking.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use adsim_core::MatchType;

/// Tokenize and normalize text for matching: lowercase, strip non-alphanumeric
/// (retaining whitespace), split on whitespace, drop empty tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let normalized: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    normalized
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Exact match: token lists must be identical.
pub fn exact_match(keyword_tokens: &[String], query_tokens: &[String]) -> bool {
    keyword_tokens == query_tokens
}

/// Phrase match: keyword tokens appear as a contiguous ordered sub-sequence
/// of query tokens.
pub fn phrase_match(keyword_tokens: &[String], query_tokens: &[String]) -> bool {
    if keyword_tokens.is_empty() || keyword_tokens.len() > query_tokens.len() {
        return false;
    }
    query_tokens
        .windows(keyword_tokens.len())
        .any(|window| window == keyword_tokens)
}

static SYNONYMS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("buy", &["purchase", "get", "acquire", "order"][..]);
    m.insert("cheap", &["affordable", "low cost", "budget", "inexpensive"][..]);
    m.insert("best", &["top", "premier", "leading", "excellent"][..]);
    m.insert("near", &["nearby", "close to", "around", "local"][..]);
    m.insert("rent", &["lease", "hire", "rental"][..]);
    m.insert("apartment", &["flat", "unit", "condo"][..]);
    m.insert("villa", &["house", "home", "property"][..]);
    m.insert("service", &["services", "help", "assistance"][..]);
    m.insert("repair", &["fix", "fixing", "maintenance"][..]);
    m.insert("cleaning", &["clean", "cleaner", "housekeeping"][..]);
    m.insert("ac", &["air conditioning", "air conditioner", "hvac"][..]);
    m.insert("plumber", &["plumbing", "plumbers"][..]);
    m.insert("electrician", &["electrical", "electric"][..]);
    m.insert("dubai", &["dxb"][..]);
    m.insert("abu dhabi", &["abudhabi", "ad"][..]);
    m.insert("uae", &["emirates", "united arab emirates"][..]);
    m.insert("price", &["cost", "pricing", "rate", "rates"][..]);
    m.insert("discount", &["sale", "offer", "deal", "deals"][..]);
    m.insert("shop", &["store", "shopping", "buy"][..]);
    m.insert("delivery", &["shipping", "deliver"][..]);
    m.insert("online", &["web", "internet", "digital"][..]);
    m
});

/// Synonyms of `word`, including `word` itself. Looks both directions: `word`
/// as a table key, and `word` appearing in another key's synonym list.
pub fn get_synonyms(word: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    out.insert(word.to_string());
    if let Some(list) = SYNONYMS.get(word) {
        out.extend(list.iter().map(|s| s.to_string()));
    }
    for (key, list) in SYNONYMS.iter() {
        if list.contains(&word) {
            out.insert(key.to_string());
            out.extend(list.iter().map(|s| s.to_string()));
        }
    }
    out
}

/// `score = 0.60*topic_overlap + 0.25*synonym_hit + 0.15*context_fit`.
pub fn compute_broad_match_score(keyword_tokens: &[String], query_tokens: &[String]) -> (f64, String) {
    if keyword_tokens.is_empty() || query_tokens.is_empty() {
        return (0.0, "empty_input".to_string());
    }

    let query_set: HashSet<&str> = query_tokens.iter().map(|s| s.as_str()).collect();

    let mut direct_matches = 0usize;
    let mut synonym_matches = 0usize;

    for kw_token in keyword_tokens {
        if query_set.contains(kw_token.as_str()) {
            direct_matches += 1;
        } else {
            let synonyms = get_synonyms(kw_token);
            if synonyms.iter().any(|s| query_set.contains(s.as_str())) {
                synonym_matches += 1;
            }
        }
    }

    let n_kw = keyword_tokens.len() as f64;
    let topic_overlap = (direct_matches as f64 + 0.8 * synonym_matches as f64) / n_kw;
    let synonym_hit = synonym_matches as f64 / n_kw;

    let q_len = query_tokens.len() as f64;
    let k_len = n_kw;
    let context_fit = q_len.min(k_len) / q_len.max(k_len);

    let score = 0.6 * topic_overlap + 0.25 * synonym_hit + 0.15 * context_fit;
    let reason = format!(
        "topic={:.2}, synonym={:.2}, context={:.2}",
        topic_overlap, synonym_hit, context_fit
    );
    (score, reason)
}

/// Broad match against a threshold of 0.58 (learning phase) or 0.62 (stable).
pub fn broad_match(keyword_tokens: &[String], query_tokens: &[String], learning_state: bool) -> (bool, f64, String) {
    let threshold = if learning_state { 0.58 } else { 0.62 };
    let (score, reason) = compute_broad_match_score(keyword_tokens, query_tokens);
    let matched = score >= threshold;
    (matched, score, format!("score={:.3} (threshold={}): {}", score, threshold, reason))
}

/// A negative keyword that blocks matches.
#[derive(Debug, Clone)]
pub struct NegativeKeyword {
    pub text: String,
    pub match_type: MatchType,
}

/// Check whether any negative blocks the query. The reference behavior
/// blocks deterministically once any negative matches, regardless of
/// `neg_quality` (see SPEC_FULL §4.2/§11); the parameter is retained for
/// forward-compatible signature parity only.
pub fn check_negative_block(
    query_tokens: &[String],
    negatives: &[NegativeKeyword],
    _neg_quality: f64,
) -> (bool, Option<String>) {
    for neg in negatives {
        let neg_tokens = tokenize(&neg.text);

        let blocked = match neg.match_type {
            MatchType::Exact => exact_match(&neg_tokens, query_tokens),
            MatchType::Phrase => phrase_match(&neg_tokens, query_tokens),
            MatchType::Broad => {
                let query_set: HashSet<&str> = query_tokens.iter().map(|s| s.as_str()).collect();
                neg_tokens.iter().any(|neg_token| {
                    query_set.contains(neg_token.as_str())
                        || get_synonyms(neg_token).iter().any(|s| query_set.contains(s.as_str()))
                })
            }
        };

        if blocked {
            return (true, Some(neg.text.clone()));
        }
    }
    (false, None)
}

/// Result of a keyword-query match attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matched: bool,
    pub match_type: Option<MatchType>,
    pub match_reason: String,
    pub match_score: f64,
    pub blocked_by_negative: bool,
    pub blocking_negative: Option<String>,
}

/// Main matching entry point: classify `query` against `keyword` under
/// `match_type`, then apply negatives.
pub fn match_keyword(
    keyword: &str,
    query: &str,
    match_type: MatchType,
    negatives: &[NegativeKeyword],
    learning_state: bool,
    neg_quality: f64,
) -> MatchResult {
    let keyword_tokens = tokenize(keyword);
    let query_tokens = tokenize(query);

    let (matched, match_score, match_reason) = match match_type {
        MatchType::Exact => {
            let m = exact_match(&keyword_tokens, &query_tokens);
            (m, 1.0, if m { "exact_match".to_string() } else { "no_exact_match".to_string() })
        }
        MatchType::Phrase => {
            let m = phrase_match(&keyword_tokens, &query_tokens);
            (m, 1.0, if m { "phrase_match".to_string() } else { "no_phrase_match".to_string() })
        }
        MatchType::Broad => broad_match(&keyword_tokens, &query_tokens, learning_state),
    };

    if !matched {
        return MatchResult {
            matched: false,
            match_type: None,
            match_reason,
            match_score: 0.0,
            blocked_by_negative: false,
            blocking_negative: None,
        };
    }

    if !negatives.is_empty() {
        let (blocked, blocking_neg) = check_negative_block(&query_tokens, negatives, neg_quality);
        if blocked {
            return MatchResult {
                matched: false,
                match_type: Some(match_type),
                match_reason: format!("blocked_by_negative: {}", blocking_neg.as_deref().unwrap_or("")),
                match_score,
                blocked_by_negative: true,
                blocking_negative: blocking_neg,
            };
        }
    }

    MatchResult {
        matched: true,
        match_type: Some(match_type),
        match_reason,
        match_score,
        blocked_by_negative: false,
        blocking_negative: None,
    }
}
