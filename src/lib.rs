//! fuzzyfind: fuzzy subsequence matching for search-as-you-type lists
//!
//! A query matches a candidate when its characters, whitespace ignored,
//! appear in the candidate in order, compared case-insensitively. Matches
//! carry a score so lists can be ranked best-first.
//!
//! ```
//! use fuzzyfind::match_candidate;
//!
//! let outcome = match_candidate("fm", "FuzzyMatcher");
//! assert!(outcome.is_match);
//! assert!(outcome.score > match_candidate("fm", "farm").score);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod search;
pub mod server;
pub mod tools;

pub use error::AppError;
pub use search::{
    match_candidate, match_optional, matches_subsequence, FuzzyMatcher, MatchOutcome,
    SearchEngine, SearchOptions, SearchResult,
};
