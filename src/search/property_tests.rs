use super::fuzzy::{match_candidate, FuzzyMatcher};
use super::parser::fold_char;
use super::SearchEngine;
use proptest::prelude::*;

// Reference check: whitespace-free query chars appear in order in the candidate
fn is_case_insensitive_subsequence(query: &str, candidate: &str) -> bool {
    let mut hay = candidate.chars().map(fold_char);
    query
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(fold_char)
        .all(|wanted| hay.any(|c| c == wanted))
}

fn path_like() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _./-]{0,16}"
}

fn query_like() -> impl Strategy<Value = String> {
    "[a-zA-Z _/]{0,5}"
}

proptest! {
    #[test]
    fn empty_query_always_matches(candidate in any::<String>()) {
        let outcome = match_candidate("", &candidate);
        prop_assert!(outcome.is_match);
        prop_assert_eq!(outcome.score, 0);
    }

    #[test]
    fn match_iff_subsequence(query in query_like(), candidate in path_like()) {
        let outcome = match_candidate(&query, &candidate);
        prop_assert_eq!(outcome.is_match, is_case_insensitive_subsequence(&query, &candidate));
    }

    #[test]
    fn match_implies_subsequence_for_any_text(query in any::<String>(), candidate in any::<String>()) {
        if match_candidate(&query, &candidate).is_match {
            prop_assert!(is_case_insensitive_subsequence(&query, &candidate));
        }
    }

    #[test]
    fn matching_is_deterministic(query in query_like(), candidate in path_like()) {
        let first = match_candidate(&query, &candidate);
        let second = match_candidate(&query, &candidate);
        prop_assert_eq!(first, second);

        // A reused matcher gives the same answer as a fresh one
        let mut matcher = FuzzyMatcher::new();
        matcher.fuzzy_match("some/other/candidate_that_is_longer.txt", "sot");
        let reused = matcher.fuzzy_match(&candidate, &query).map(|m| m.score);
        prop_assert_eq!(reused, first.is_match.then_some(first.score));
    }

    #[test]
    fn matching_ignores_ascii_case(query in query_like(), candidate in path_like()) {
        let lower = match_candidate(&query.to_ascii_lowercase(), &candidate.to_ascii_lowercase());
        let upper = match_candidate(&query.to_ascii_uppercase(), &candidate);
        prop_assert_eq!(lower.is_match, upper.is_match);
    }

    #[test]
    fn positions_point_at_query_chars(query in query_like(), candidate in path_like()) {
        let mut matcher = FuzzyMatcher::new();
        if let Some(m) = matcher.fuzzy_match(&candidate, &query) {
            let chars: Vec<char> = candidate.chars().map(fold_char).collect();
            let needle: Vec<char> = query.chars().filter(|c| !c.is_whitespace()).map(fold_char).collect();
            prop_assert_eq!(m.positions.len(), needle.len());
            prop_assert!(m.positions.windows(2).all(|p| p[0] < p[1]));
            for (position, wanted) in m.positions.iter().zip(&needle) {
                prop_assert_eq!(chars[*position as usize], *wanted);
            }
        }
    }

    #[test]
    fn results_are_sorted_best_first(
        query in query_like(),
        candidates in proptest::collection::vec(path_like(), 0..24),
    ) {
        let mut engine = SearchEngine::new();
        let results = engine.filter_strings(&query, &candidates);

        if query.chars().all(char::is_whitespace) {
            let texts: Vec<&str> = results.iter().map(|r| r.item.as_str()).collect();
            let expected: Vec<&str> = candidates.iter().map(String::as_str).collect();
            prop_assert_eq!(texts, expected);
            return Ok(());
        }

        for pair in results.windows(2) {
            prop_assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].matched_text <= pair[1].matched_text)
            );
        }
    }
}
