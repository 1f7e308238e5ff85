//! Name similarity between tag sets.

use peak_model::Tags;

/// Returned by [`compare_names`] when either side has no name tags.
///
/// It lies above every real score: it passes a lower-bound test
/// such as `score >= 0.9` and fails a bounded test such as
/// `0.9 <= score && score <= 1.0`.
pub const NAMES_NOT_COMPARABLE: f64 = 2.0;

/// Separator for multiple names in one tag value.
const VALUE_SEPARATOR: char = ';';

/// Winkler bonus per shared leading character.
const PREFIX_WEIGHT: f64 = 0.1;

/// Longest prefix that earns the Winkler bonus.
const MAX_PREFIX: usize = 4;

/// Jaro score below which no prefix bonus is given.
const BOOST_THRESHOLD: f64 = 0.7;

/// Jaro similarity in `[0, 1]`.
///
/// Characters match when equal and no further apart than
/// `max(len) / 2 - 1`. Transpositions are half the matched characters that
/// appear in a different order, counted as a fraction.
pub fn jaro_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    jaro(&a, &b)
}

/// Jaro similarity with the Winkler prefix bonus (0.1 per shared leading
/// character, at most four, only above 0.7).
pub fn jaro_winkler_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let score = jaro(&a, &b);
    if score <= BOOST_THRESHOLD {
        return score;
    }
    let prefix = a
        .iter()
        .zip(&b)
        .take_while(|(left, right)| left == right)
        .take(MAX_PREFIX)
        .count();
    score + PREFIX_WEIGHT * prefix as f64 * (1.0 - score)
}

fn jaro(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let window = (a.len().max(b.len()) / 2).saturating_sub(1);

    let mut matched_a = vec![false; a.len()];
    let mut matched_b = vec![false; b.len()];
    let mut matches = 0_usize;
    for (i, ch) in a.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if !matched_b[j] && b[j] == *ch {
                matched_a[i] = true;
                matched_b[j] = true;
                matches += 1;
                break;
            }
        }
    }
    if matches == 0 {
        return 0.0;
    }

    let in_order_a = a.iter().zip(&matched_a).filter(|(_, hit)| **hit);
    let in_order_b = b.iter().zip(&matched_b).filter(|(_, hit)| **hit);
    let out_of_order = in_order_a
        .zip(in_order_b)
        .filter(|((left, _), (right, _))| left != right)
        .count();
    let transpositions = out_of_order as f64 / 2.0;

    let m = matches as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - transpositions) / m) / 3.0
}

/// Best Jaro-Winkler score over every pair of names on the two sides.
///
/// Returns [`NAMES_NOT_COMPARABLE`] if either side carries no name tag.
pub fn compare_names(a: &Tags, b: &Tags) -> f64 {
    let names_a = name_values(a);
    let names_b = name_values(b);
    if names_a.is_empty() || names_b.is_empty() {
        return NAMES_NOT_COMPARABLE;
    }

    let mut best = 0.0_f64;
    for left in &names_a {
        for right in &names_b {
            best = best.max(jaro_winkler_similarity(left, right));
        }
    }
    best
}

/// Lower-bound test: the sentinel counts as a match.
pub fn names_allow_match(score: f64, threshold: f64) -> bool {
    score >= threshold
}

/// Bounded test: the sentinel does not count as a probable duplicate.
pub fn names_look_duplicate(score: f64, threshold: f64) -> bool {
    threshold <= score && score <= 1.0
}

fn name_values(tags: &Tags) -> Vec<&str> {
    tags.name_keys()
        .filter_map(|key| tags.get(key))
        .flat_map(|value| value.split(VALUE_SEPARATOR))
        .collect()
}
