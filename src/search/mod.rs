//! Fuzzy search: matching, ranking and list filtering
//!
//! The matcher decides whether a query is a case-insensitive subsequence of a
//! candidate and scores the best alignment; the engine runs it over a list
//! and sorts the results best-first.

pub mod engine;
pub mod fuzzy;
pub mod parser;
pub mod ranking;

#[cfg(test)]
mod property_tests;

pub use engine::{SearchEngine, SearchOptions, SearchResult};
pub use fuzzy::{
    match_candidate, match_optional, matches_subsequence, FuzzyMatch, FuzzyMatcher, MatchOutcome,
    MatchType, MatcherBackend,
};
pub use parser::{ParsedQuery, QueryParser};
pub use ranking::{compare_ranked, ScoringWeights};
