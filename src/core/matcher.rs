//! Keyword search over a catalog
//!
//! A search is the union of two branches:
//!
//! 1. the best `limit` rows by partial-ratio similarity between the keyword
//!    and the description (no minimum score),
//! 2. every row whose identifier contains the keyword.
//!
//! Results are deduplicated by row index, so rows that share a description
//! are still reported separately.

use serde::Serialize;
use std::collections::HashSet;

use crate::core::catalog::{Catalog, CatalogRow};

/// Default number of fuzzy matches kept per search
pub const DEFAULT_LIMIT: usize = 50;

/// Which branch of the search produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrigin {
    Description,
    Identifier,
}

/// A catalog row selected by a search
#[derive(Debug, Clone, Serialize)]
pub struct Match<'a> {
    /// Position of the row in the catalog
    pub index: usize,
    pub row: &'a CatalogRow,
    pub origin: MatchOrigin,
    /// Partial-ratio score (0-100) of the description against the keyword
    pub score: f64,
}

/// Search the catalog for a keyword
pub fn search<'a>(catalog: &'a Catalog, keyword: &str, limit: usize) -> Vec<Match<'a>> {
    if keyword.is_empty() {
        return Vec::new();
    }

    let needle = keyword.to_lowercase();
    let rows = catalog.rows();

    let mut scored: Vec<(usize, f64)> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| (index, partial_ratio(&needle, &row.description.to_lowercase())))
        .collect();
    // Stable sort keeps catalog order among equal scores
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(limit);

    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for (index, score) in scored {
        if seen.insert(index) {
            results.push(Match {
                index,
                row: &rows[index],
                origin: MatchOrigin::Description,
                score,
            });
        }
    }

    for (index, row) in rows.iter().enumerate() {
        if row.identifier.to_lowercase().contains(&needle) && seen.insert(index) {
            results.push(Match {
                index,
                row,
                origin: MatchOrigin::Identifier,
                score: partial_ratio(&needle, &row.description.to_lowercase()),
            });
        }
    }

    log::debug!(
        "search '{}': {} result(s) from {} catalog row(s)",
        keyword,
        results.len(),
        rows.len()
    );
    results
}

/// Partial-ratio similarity of two strings, from 0 to 100
///
/// The shorter string is aligned against every window of the longer one,
/// including windows hanging off either end, and the best indel similarity
/// wins. A string contained in the other scores 100.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long): (Vec<char>, Vec<char>) = if a.chars().count() <= b.chars().count() {
        (a.chars().collect(), b.chars().collect())
    } else {
        (b.chars().collect(), a.chars().collect())
    };

    if short.is_empty() || long.is_empty() {
        return 0.0;
    }

    let n = short.len();
    let m = long.len();
    let window_score = |start: usize, end: usize| indel_similarity(&short, &long[start..end]) * 100.0;

    let mut best = 0.0_f64;

    // Windows overlapping the start of the longer string
    for end in 1..n {
        best = best.max(window_score(0, end));
    }

    // Full-width windows
    for start in 0..=(m - n) {
        best = best.max(window_score(start, start + n));
        if best >= 100.0 {
            return 100.0;
        }
    }

    // Windows overlapping the end
    for start in (m - n + 1)..m {
        best = best.max(window_score(start, m));
    }

    best
}

/// Normalized indel similarity: `1 - (|a| + |b| - 2 * lcs) / (|a| + |b|)`
///
/// Only insertions and deletions count, so a swap of two neighbouring
/// characters costs a single unmatched character on each side.
pub fn indel_similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let lcs = longest_common_subsequence(a, b);
    1.0 - (total - 2 * lcs) as f64 / total as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(
            "prices.csv",
            vec![
                CatalogRow::new("4006381333931", "Widget A", 10.0),
                CatalogRow::new("4006381333948", "Blue widget B", 12.0),
                CatalogRow::new("5901234123457", "Garden hose 20m", 25.0),
                CatalogRow::new("0012345678905", "Hose clamp", 1.5),
                CatalogRow::new("9780201379624", "Garden hose 20m", 27.0),
            ],
        )
    }

    #[test]
    fn test_partial_ratio_substring_scores_full() {
        assert_eq!(partial_ratio("hose", "garden hose 20m"), 100.0);
        assert_eq!(partial_ratio("garden hose 20m", "hose"), 100.0);
    }

    #[test]
    fn test_partial_ratio_empty() {
        assert_eq!(partial_ratio("", "anything"), 0.0);
        assert_eq!(partial_ratio("x", ""), 0.0);
    }

    #[test]
    fn test_partial_ratio_prefers_closer_text() {
        let close = partial_ratio("widgit", "blue widget b");
        let far = partial_ratio("widgit", "garden hose 20m");
        assert!(close > far, "{} should exceed {}", close, far);
    }

    #[test]
    fn test_indel_similarity() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(indel_similarity(&chars("form"), &chars("from")), 0.75);
        assert_eq!(indel_similarity(&chars("form"), &chars("foam")), 0.75);
        assert_eq!(indel_similarity(&chars("abc"), &chars("abc")), 1.0);
        assert_eq!(indel_similarity(&chars("abc"), &chars("xyz")), 0.0);
    }

    #[test]
    fn test_partial_ratio_transposition_costs_one_character() {
        assert_eq!(partial_ratio("form", "from"), 75.0);
        assert_eq!(partial_ratio("form", "foam"), 75.0);
    }

    #[test]
    fn test_transposed_and_substituted_rows_tie_in_catalog_order() {
        let catalog = Catalog::new(
            "p.csv",
            vec![CatalogRow::new("1", "from", 1.0), CatalogRow::new("2", "foam", 1.0)],
        );
        let indices: Vec<usize> = search(&catalog, "form", DEFAULT_LIMIT)
            .iter()
            .map(|m| m.index)
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_empty_keyword_returns_nothing() {
        assert!(search(&catalog(), "", DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn test_fuzzy_results_ordered_by_score_then_position() {
        let catalog = catalog();
        let results = search(&catalog, "HOSE", DEFAULT_LIMIT);
        let indices: Vec<usize> = results.iter().map(|m| m.index).collect();

        // The three hose rows all contain the keyword and keep catalog order
        assert_eq!(&indices[..3], &[2, 3, 4]);
        assert!(results.iter().all(|m| m.origin == MatchOrigin::Description));
    }

    #[test]
    fn test_no_minimum_score() {
        let catalog = catalog();
        let results = search(&catalog, "zzzz", DEFAULT_LIMIT);
        assert_eq!(results.len(), catalog.len());
    }

    #[test]
    fn test_duplicate_descriptions_stay_distinct() {
        let catalog = catalog();
        let results = search(&catalog, "garden hose 20m", DEFAULT_LIMIT);
        let indices: Vec<usize> = results.iter().map(|m| m.index).collect();
        assert!(indices.contains(&2));
        assert!(indices.contains(&4));
    }

    #[test]
    fn test_identifier_branch_appends_after_fuzzy() {
        let catalog = catalog();
        let results = search(&catalog, "40063813339", 1);

        // One fuzzy slot, then both identifier matches not already taken
        assert_eq!(results[0].origin, MatchOrigin::Description);
        let from_ids: Vec<usize> = results
            .iter()
            .filter(|m| m.origin == MatchOrigin::Identifier)
            .map(|m| m.index)
            .collect();
        assert!(from_ids.iter().all(|i| *i == 0 || *i == 1));
        assert!(results.iter().any(|m| m.index == 0));
        assert!(results.iter().any(|m| m.index == 1));
    }

    #[test]
    fn test_results_have_no_duplicate_rows() {
        let catalog = catalog();
        for keyword in ["hose", "4006", "widget", "0", "A"] {
            let results = search(&catalog, keyword, DEFAULT_LIMIT);
            let unique: HashSet<usize> = results.iter().map(|m| m.index).collect();
            assert_eq!(unique.len(), results.len(), "duplicates for '{}'", keyword);
        }
    }

    #[test]
    fn test_identifier_match_is_case_insensitive() {
        let catalog = Catalog::new(
            "p.csv",
            vec![
                CatalogRow::new("AB-100", "Thing", 1.0),
                CatalogRow::new("XY-200", "Other", 1.0),
            ],
        );
        let results = search(&catalog, "ab-1", 0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);
        assert_eq!(results[0].origin, MatchOrigin::Identifier);
    }

    #[test]
    fn test_limit_caps_fuzzy_branch() {
        let rows = (0..80)
            .map(|i| CatalogRow::new(format!("ID{}", i), format!("item {}", i), 1.0))
            .collect();
        let catalog = Catalog::new("p.csv", rows);
        assert_eq!(search(&catalog, "item", DEFAULT_LIMIT).len(), 50);
    }
}
