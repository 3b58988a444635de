//! Search Engine Integration
//!
//! Ties together query parsing, fuzzy matching, and ranking to filter a
//! candidate list the way search-as-you-type widgets do: one pass per
//! keystroke, best matches first.

use super::fuzzy::{FuzzyMatch, FuzzyMatcher, MatchType, MatcherBackend};
use super::parser::{reverse_graphemes_into, ParsedQuery};
use super::ranking::{compare_ranked, ScoringWeights};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Behaviour of a filter pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Keep at most this many results after sorting
    pub limit: Option<usize>,
    /// Stop scanning once this many candidates matched
    pub max_matches: Option<usize>,
    /// With an empty query, return at most this many candidates in input order
    pub empty_query_limit: Option<usize>,
    /// Also match the reversed candidate against the reversed query and keep
    /// the better score, favouring matches near the end of paths
    pub bidirectional: bool,
    /// Scoring backend
    pub backend: MatcherBackend,
    /// NFC-compose queries and candidates before matching
    pub normalize_unicode: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: None,
            max_matches: None,
            empty_query_limit: None,
            bidirectional: false,
            backend: MatcherBackend::Native,
            normalize_unicode: false,
        }
    }
}

impl SearchOptions {
    /// Autocomplete popup: the scan stops once more than 90 candidates
    /// matched (91 kept), and an empty query lists the first 21 entries
    pub fn hint_popup() -> Self {
        Self {
            max_matches: Some(91),
            empty_query_limit: Some(21),
            ..Self::default()
        }
    }

    /// Asset browser: rank whole paths from both ends
    pub fn path_browser() -> Self {
        Self {
            bidirectional: true,
            ..Self::default()
        }
    }
}

/// Search result with content and score
#[derive(Debug, Clone)]
pub struct SearchResult<T> {
    /// The matched item
    pub item: T,
    /// Match score, 0 for an empty query
    pub score: i32,
    /// The searchable text of the item that produced the score
    pub matched_text: String,
    /// Matched character positions in `matched_text`
    pub positions: Vec<u32>,
    /// Where the match sits in `matched_text`
    pub match_type: MatchType,
    /// Whether the reversed match produced the score
    pub reversed: bool,
}

/// Search engine that combines parsing, matching, and ranking
pub struct SearchEngine {
    fuzzy_matcher: FuzzyMatcher,
    options: SearchOptions,
    reversed_buf: String,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// Create a new search engine with default configuration
    pub fn new() -> Self {
        Self::with_settings(ScoringWeights::default(), SearchOptions::default())
    }

    /// Create search engine with custom weights and options
    pub fn with_settings(weights: ScoringWeights, options: SearchOptions) -> Self {
        let fuzzy_matcher = FuzzyMatcher::with_weights(weights)
            .with_backend(options.backend)
            .with_unicode_normalization(options.normalize_unicode);
        Self {
            fuzzy_matcher,
            options,
            reversed_buf: String::new(),
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Search items with a query string
    ///
    /// `extract_text` returns the searchable texts of an item; the best
    /// scoring one wins. Results are sorted by score (highest first), ties
    /// by matched text, and the sort is stable. An empty query returns the
    /// items in input order.
    pub fn search<T, F>(&mut self, query: &str, items: &[T], extract_text: F) -> Vec<SearchResult<T>>
    where
        T: Clone,
        F: Fn(&T) -> Vec<&str>,
    {
        let parsed = self.fuzzy_matcher.parse_query(query);

        if parsed.is_empty() {
            let cap = self
                .options
                .empty_query_limit
                .into_iter()
                .chain(self.options.limit)
                .min()
                .unwrap_or(items.len());

            return items
                .iter()
                .take(cap)
                .map(|item| SearchResult {
                    matched_text: extract_text(item).first().map(|t| t.to_string()).unwrap_or_default(),
                    item: item.clone(),
                    score: 0,
                    positions: Vec::new(),
                    match_type: MatchType::Empty,
                    reversed: false,
                })
                .collect();
        }

        let mut results = Vec::new();

        for item in items {
            if self
                .options
                .max_matches
                .is_some_and(|max| results.len() >= max)
            {
                break;
            }

            let mut best: Option<(FuzzyMatch, &str, bool)> = None;
            for text in extract_text(item) {
                let Some((fuzzy_match, reversed)) = self.match_text(text, &parsed) else {
                    continue;
                };
                let better = match &best {
                    Some((current, current_text, _)) => compare_ranked(
                        fuzzy_match.score,
                        text,
                        current.score,
                        current_text,
                    )
                    .is_lt(),
                    None => true,
                };
                if better {
                    best = Some((fuzzy_match, text, reversed));
                }
            }

            if let Some((fuzzy_match, text, reversed)) = best {
                results.push(SearchResult {
                    item: item.clone(),
                    score: fuzzy_match.score,
                    matched_text: text.to_string(),
                    positions: fuzzy_match.positions,
                    match_type: fuzzy_match.match_type,
                    reversed,
                });
            }
        }

        results.sort_by(|a, b| compare_ranked(a.score, &a.matched_text, b.score, &b.matched_text));

        if let Some(limit) = self.options.limit {
            results.truncate(limit);
        }

        debug!(
            "Filter pass for {:?}: {} candidates, {} results",
            query,
            items.len(),
            results.len()
        );

        results
    }

    /// Filter plain strings
    pub fn filter_strings(&mut self, query: &str, candidates: &[String]) -> Vec<SearchResult<String>> {
        self.search(query, candidates, |c| vec![c.as_str()])
    }

    /// Match one text, forwards and, when enabled, backwards
    fn match_text(&mut self, text: &str, parsed: &ParsedQuery) -> Option<(FuzzyMatch, bool)> {
        let forward = self.fuzzy_matcher.match_parsed(text, parsed)?;

        if !self.options.bidirectional {
            return Some((forward, false));
        }

        reverse_graphemes_into(text, &mut self.reversed_buf);
        let backward = self
            .fuzzy_matcher
            .score_reversed(&self.reversed_buf, parsed);

        match backward {
            Some(score) if score > forward.score => Some((FuzzyMatch { score, ..forward }, true)),
            _ => Some((forward, false)),
        }
    }
}
