//! Query normalization against the known-location vocabulary.
//!
//! Free-text queries are scored against every vocabulary entry with a
//! weighted blend of Indel similarities (0-100). When the best entry reaches
//! [`MATCH_SCORE_CUTOFF`] it replaces the query before geocoding, which fixes
//! common misspellings and historical names ("Pondicherry" -> "Puducherry").

use std::collections::BTreeSet;

use tracing::debug;

use super::lookup::LookupError;

/// Minimum score for a vocabulary entry to replace the query.
pub const MATCH_SCORE_CUTOFF: f64 = 70.0;

/// Best vocabulary entry for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub candidate: &'a str,
    pub score: f64,
    /// Position of the candidate in the vocabulary.
    pub index: usize,
}

/// Length of the longest common subsequence of two char slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    let distance = total - 2 * lcs_len(a, b);
    100.0 * (1.0 - distance as f64 / total as f64)
}

/// Normalized Indel similarity of two strings, 0-100.
///
/// Two empty strings are identical (100); one empty string scores 0.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio(&a, &b)
}

/// Best [`ratio`] of the shorter string against any same-length window of the
/// longer one, including windows cut off at either end.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let (m, n) = (short.len(), long.len());
    let windows = (1..m)
        .map(|i| &long[..i])
        .chain((0..=n - m).map(|i| &long[i..i + m]))
        .chain((n - m + 1..n).map(|i| &long[i..]));

    let mut best = 0.0_f64;
    for window in windows {
        best = best.max(indel_ratio(&short, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// [`ratio`] after sorting whitespace-separated tokens alphabetically.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sort_tokens(a), &sort_tokens(b))
}

/// Token-set comparison: shared tokens against each side's remainder.
///
/// Scores 100 when one side's tokens are a subset of the other's.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let shared = join(tokens_a.intersection(&tokens_b));
    let only_a = join(tokens_a.difference(&tokens_b));
    let only_b = join(tokens_b.difference(&tokens_a));

    if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let with_a = join([shared.as_str(), only_a.as_str()].iter());
    let with_b = join([shared.as_str(), only_b.as_str()].iter());

    let mut best = ratio(&with_a, &with_b);
    if !shared.is_empty() {
        best = best.max(ratio(&shared, &with_a)).max(ratio(&shared, &with_b));
    }
    best
}

/// [`partial_ratio`] over token-level rewrites; 100 when any token is shared.
fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    if tokens_a.intersection(&tokens_b).next().is_some() {
        return 100.0;
    }

    let sorted = partial_ratio(&sort_tokens(a), &sort_tokens(b));
    let unique = partial_ratio(&join(tokens_a.iter()), &join(tokens_b.iter()));
    sorted.max(unique)
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join<'a>(tokens: impl Iterator<Item = &'a &'a str>) -> String {
    tokens
        .filter(|t| !t.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Weighted blend of the ratios above, 0-100.
///
/// Strings of similar length (ratio of lengths under 1.5) are compared whole
/// and by tokens, with token scores scaled by 0.95. Longer-vs-shorter pairs
/// are also compared by best-aligned substring, scaled by 0.9, or by 0.6 once
/// one string is at least 8 times the other.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let base = ratio(a, b);

    if len_ratio < 1.5 {
        let tokens = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return base.max(tokens * TOKEN_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    base.max(partial_ratio(a, b) * partial_scale)
        .max(partial_token_ratio(a, b) * TOKEN_SCALE * partial_scale)
}

/// Weight applied to token-based scores in [`weighted_ratio`].
const TOKEN_SCALE: f64 = 0.95;

/// Lowercase, map punctuation to spaces and collapse whitespace.
pub fn preprocess(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of a query to a vocabulary entry, 0-100.
pub fn score(query: &str, candidate: &str) -> f64 {
    weighted_ratio(&preprocess(query), &preprocess(candidate))
}

/// Best candidate scoring at least `cutoff`.
///
/// Ties go to the earliest candidate.
pub fn extract_one<'a, S: AsRef<str>>(
    query: &str,
    candidates: &'a [S],
    cutoff: f64,
) -> Option<Match<'a>> {
    let mut best: Option<Match<'a>> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate.as_ref();
        let score = score(query, candidate);
        if score < cutoff {
            continue;
        }
        if best.map_or(true, |b| score > b.score) {
            best = Some(Match {
                candidate,
                score,
                index,
            });
        }
    }

    best
}

/// Rewrites queries to the closest known location name.
#[derive(Debug, Clone, Copy)]
pub struct QueryNormalizer<'a> {
    vocabulary: &'a [String],
    cutoff: f64,
}

impl<'a> QueryNormalizer<'a> {
    pub fn new(vocabulary: &'a [String]) -> Self {
        Self {
            vocabulary,
            cutoff: MATCH_SCORE_CUTOFF,
        }
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Name to geocode for `query`.
    ///
    /// Returns the matched vocabulary entry, or the trimmed query when nothing
    /// scores at or above the cutoff.
    pub fn normalize(&self, query: &str) -> Result<String, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::InvalidQuery);
        }

        match extract_one(query, self.vocabulary, self.cutoff) {
            Some(m) => {
                debug!(
                    "Matched query '{}' to '{}' (score {:.1})",
                    query, m.candidate, m.score
                );
                Ok(m.candidate.to_string())
            }
            None => {
                debug!("No vocabulary match for '{}', using as-is", query);
                Ok(query.to_string())
            }
        }
    }
}
