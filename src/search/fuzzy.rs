//! Fuzzy Matching Engine
//!
//! Subsequence matching with a scored best alignment. The query characters
//! (whitespace ignored) must appear in the candidate in order, compared
//! case-insensitively; among all such alignments the matcher picks the one
//! with the highest score, which rewards consecutive runs, early matches and
//! matches on word or path boundaries.
//!
//! A second backend delegates scoring to the Smith-Waterman implementation of
//! the nucleo-matcher crate (used in Helix editor).

use super::parser::{fold_char, ParsedQuery, QueryParser};
use super::ranking::{is_word_end, is_word_start, CharClass, ScoringWeights};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

const UNREACHABLE: i32 = i32::MIN;
const NO_PREDECESSOR: u32 = u32::MAX;

/// Match result with score and position information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Alignment score, higher is better
    pub score: i32,
    /// Positions of matched characters in the haystack
    pub positions: Vec<u32>,
    /// Match type classification
    pub match_type: MatchType,
}

/// Classification of where the match occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Empty query, matches anything
    Empty,
    /// Contiguous run covering a whole word
    FullWord,
    /// Contiguous run at the beginning of a word
    WordStart,
    /// Contiguous run at the end of a word
    WordEnd,
    /// Contiguous run inside a word
    WordMiddle,
    /// Scattered match that picks up several word starts
    MultiWord,
    /// Scattered match inside words
    Scattered,
}

/// The `(is_match, score)` pair handed to list filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    pub is_match: bool,
    pub score: i32,
}

impl MatchOutcome {
    pub const NO_MATCH: MatchOutcome = MatchOutcome {
        is_match: false,
        score: 0,
    };

    fn from_match(fuzzy_match: Option<&FuzzyMatch>) -> Self {
        match fuzzy_match {
            Some(m) => MatchOutcome {
                is_match: true,
                score: m.score,
            },
            None => Self::NO_MATCH,
        }
    }
}

/// Scoring algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatcherBackend {
    /// Built-in best-alignment scorer driven by [`ScoringWeights`]
    #[default]
    Native,
    /// nucleo-matcher Smith-Waterman scorer; positions are grapheme indices
    Nucleo,
}

impl FromStr for MatcherBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(MatcherBackend::Native),
            "nucleo" => Ok(MatcherBackend::Nucleo),
            other => Err(format!(
                "unknown backend '{}', expected 'native' or 'nucleo'",
                other
            )),
        }
    }
}

impl fmt::Display for MatcherBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatcherBackend::Native => write!(f, "native"),
            MatcherBackend::Nucleo => write!(f, "nucleo"),
        }
    }
}

/// Fuzzy matcher with configuration and reusable scratch buffers.
///
/// One instance is meant to be reused across a whole filter pass; the buffers
/// grow to the largest candidate seen and are not reallocated afterwards.
pub struct FuzzyMatcher {
    weights: ScoringWeights,
    backend: MatcherBackend,
    normalize_unicode: bool,
    nucleo: Option<Matcher>,

    chars: Vec<char>,
    folded: Vec<char>,
    classes: Vec<CharClass>,
    bonuses: Vec<i32>,
    scores: Vec<i32>,
    from: Vec<u32>,

    text: String,
    utf32_haystack: Vec<char>,
    utf32_needle: Vec<char>,
    indices: Vec<u32>,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    /// Create a new fuzzy matcher with default weights and the native backend
    pub fn new() -> Self {
        Self::with_weights(ScoringWeights::default())
    }

    /// Create a fuzzy matcher with custom weights
    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self {
            weights,
            backend: MatcherBackend::Native,
            normalize_unicode: false,
            nucleo: None,
            chars: Vec::new(),
            folded: Vec::new(),
            classes: Vec::new(),
            bonuses: Vec::new(),
            scores: Vec::new(),
            from: Vec::new(),
            text: String::new(),
            utf32_haystack: Vec::new(),
            utf32_needle: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn with_backend(mut self, backend: MatcherBackend) -> Self {
        self.backend = backend;
        self
    }

    /// NFC-compose candidates before matching. Queries must then be parsed
    /// with [`FuzzyMatcher::parse_query`].
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn backend(&self) -> MatcherBackend {
        self.backend
    }

    /// Parse a query the way this matcher expects it
    pub fn parse_query(&self, query: &str) -> ParsedQuery {
        if self.normalize_unicode {
            QueryParser::parse_normalized(query)
        } else {
            QueryParser::parse(query)
        }
    }

    /// Perform fuzzy matching between needle and haystack
    ///
    /// Returns Some(FuzzyMatch) if there's a match, None otherwise.
    /// An empty needle matches every haystack with score 0.
    pub fn fuzzy_match(&mut self, haystack: &str, needle: &str) -> Option<FuzzyMatch> {
        let parsed = self.parse_query(needle);
        self.match_parsed(haystack, &parsed)
    }

    /// Match a haystack against a query parsed once for the whole pass
    pub fn match_parsed(&mut self, haystack: &str, query: &ParsedQuery) -> Option<FuzzyMatch> {
        self.match_needle(haystack, &query.needle, &query.needle_text, true)
    }

    /// Match a reversed haystack against the reversed query
    pub fn match_parsed_reversed(
        &mut self,
        reversed_haystack: &str,
        query: &ParsedQuery,
    ) -> Option<FuzzyMatch> {
        self.match_needle(reversed_haystack, &query.reversed, &query.reversed_text, true)
    }

    /// Score only; skips building the positions list
    pub fn score(&mut self, haystack: &str, query: &ParsedQuery) -> Option<i32> {
        self.match_needle(haystack, &query.needle, &query.needle_text, false)
            .map(|m| m.score)
    }

    /// Score only, reversed haystack against the reversed query
    pub fn score_reversed(&mut self, reversed_haystack: &str, query: &ParsedQuery) -> Option<i32> {
        self.match_needle(reversed_haystack, &query.reversed, &query.reversed_text, false)
            .map(|m| m.score)
    }

    fn match_needle(
        &mut self,
        haystack: &str,
        needle: &[char],
        needle_text: &str,
        want_positions: bool,
    ) -> Option<FuzzyMatch> {
        if needle.is_empty() {
            return Some(FuzzyMatch {
                score: 0,
                positions: Vec::new(),
                match_type: MatchType::Empty,
            });
        }

        self.load_haystack(haystack);
        if needle.len() > self.folded.len() || !is_subsequence(&self.folded, needle) {
            return None;
        }

        let (score, positions) = match self.backend {
            MatcherBackend::Native => self.align(needle, want_positions),
            MatcherBackend::Nucleo => self.nucleo_align(needle_text, want_positions)?,
        };

        let match_type = if want_positions {
            classify_match_type(&positions, &self.classes)
        } else {
            MatchType::Scattered
        };

        Some(FuzzyMatch {
            score,
            positions,
            match_type,
        })
    }

    fn load_haystack(&mut self, haystack: &str) {
        self.chars.clear();
        if self.normalize_unicode {
            self.chars.extend(haystack.nfc());
        } else {
            self.chars.extend(haystack.chars());
        }

        self.folded.clear();
        self.folded.extend(self.chars.iter().copied().map(fold_char));
        self.classes.clear();
        self.classes.extend(self.chars.iter().copied().map(CharClass::of));
    }

    /// Best alignment by dynamic programming over (needle char, haystack char).
    ///
    /// `scores[j * n + i]` is the best score of matching the first `j + 1`
    /// needle characters with needle character `j` placed on haystack
    /// character `i`. The caller guarantees a match exists. Arithmetic
    /// saturates so very long candidates cannot overflow.
    fn align(&mut self, needle: &[char], want_positions: bool) -> (i32, Vec<u32>) {
        let Self {
            weights,
            folded,
            classes,
            bonuses,
            scores,
            from,
            ..
        } = self;

        let n = folded.len();
        let m = needle.len();

        bonuses.clear();
        bonuses.extend((0..n).map(|i| {
            let previous = i.checked_sub(1).map(|p| classes[p]);
            weights.boundary_bonus(previous, classes[i])
        }));

        scores.clear();
        scores.resize(m * n, UNREACHABLE);
        from.clear();
        from.resize(m * n, NO_PREDECESSOR);

        for i in 0..n {
            if folded[i] == needle[0] {
                scores[i] = weights
                    .match_score
                    .saturating_add(bonuses[i])
                    .saturating_sub(weights.leading_penalty(i));
            }
        }

        for j in 1..m {
            let row = j * n;
            let prev_row = (j - 1) * n;
            // Best predecessor at least two characters back, gap penalty applied
            let mut gap: Option<(i32, usize)> = None;

            for i in j..n {
                let diagonal = scores[prev_row + i - 1];

                if folded[i] == needle[j] {
                    let consecutive = (diagonal != UNREACHABLE)
                        .then(|| (diagonal.saturating_add(weights.consecutive_bonus), i - 1));
                    let best = match (consecutive, gap) {
                        (Some(c), Some(g)) => Some(if c.0 >= g.0 { c } else { g }),
                        (c, g) => c.or(g),
                    };
                    if let Some((value, k)) = best {
                        scores[row + i] = value
                            .saturating_add(weights.match_score)
                            .saturating_add(bonuses[i]);
                        from[row + i] = k as u32;
                    }
                }

                gap = gap.map(|(value, k)| (value.saturating_sub(weights.gap_extension_penalty), k));
                if diagonal != UNREACHABLE {
                    let opened = diagonal.saturating_sub(weights.gap_start_penalty);
                    if gap.map_or(true, |(value, _)| opened > value) {
                        gap = Some((opened, i - 1));
                    }
                }
            }
        }

        let last_row = (m - 1) * n;
        let mut end = m - 1;
        let mut best = UNREACHABLE;
        for i in (m - 1)..n {
            let value = scores[last_row + i];
            if value != UNREACHABLE && value > best {
                best = value;
                end = i;
            }
        }

        if !want_positions {
            return (best, Vec::new());
        }

        let mut positions = vec![0u32; m];
        let mut i = end;
        for j in (0..m).rev() {
            positions[j] = i as u32;
            if j > 0 {
                i = from[j * n + i] as usize;
            }
        }

        (best, positions)
    }

    fn nucleo_align(&mut self, needle_text: &str, want_positions: bool) -> Option<(i32, Vec<u32>)> {
        let Self {
            nucleo,
            chars,
            text,
            utf32_haystack,
            utf32_needle,
            indices,
            ..
        } = self;

        let matcher = nucleo.get_or_insert_with(|| {
            let mut config = Config::DEFAULT;
            // The needle is already case-folded; keep accented characters distinct
            config.ignore_case = true;
            config.normalize = false;
            Matcher::new(config)
        });

        text.clear();
        text.extend(chars.iter());
        let haystack = Utf32Str::new(text, utf32_haystack);
        let needle = Utf32Str::new(needle_text, utf32_needle);

        if !want_positions {
            let score = matcher.fuzzy_match(haystack, needle)?;
            return Some((i32::from(score), Vec::new()));
        }

        indices.clear();
        let score = matcher.fuzzy_indices(haystack, needle, indices)?;
        indices.sort_unstable();
        indices.dedup();

        Some((i32::from(score), indices.clone()))
    }

    /// Calculate proximity score based on how close matched characters are
    pub fn calculate_proximity_score(&self, positions: &[u32]) -> f64 {
        if positions.len() <= 1 {
            return 0.0;
        }

        let mut total_gap = 0u32;
        for i in 1..positions.len() {
            total_gap += positions[i] - positions[i - 1];
        }

        let avg_gap = total_gap as f64 / (positions.len() - 1) as f64;

        // Perfect sequential match (gap=1) gets 1.0
        (1.0 / avg_gap).min(1.0)
    }
}

fn is_subsequence(haystack: &[char], needle: &[char]) -> bool {
    let mut remaining = needle.iter();
    let mut wanted = remaining.next();
    for c in haystack {
        match wanted {
            Some(w) if w == c => wanted = remaining.next(),
            Some(_) => {}
            None => break,
        }
    }
    wanted.is_none()
}

/// Classify the type of match based on position in words
fn classify_match_type(positions: &[u32], classes: &[CharClass]) -> MatchType {
    let (first, last) = match (positions.first(), positions.last()) {
        (Some(&first), Some(&last)) => (first as usize, last as usize),
        _ => return MatchType::Empty,
    };
    let class_at = |p: usize| classes.get(p).copied().unwrap_or(CharClass::Other);

    let contiguous = positions.windows(2).all(|pair| pair[1] == pair[0] + 1);
    if !contiguous {
        let picks_word_starts = positions
            .iter()
            .skip(1)
            .map(|&p| p as usize)
            .any(|p| p > 0 && is_word_start(Some(class_at(p - 1)), class_at(p)));
        return if picks_word_starts {
            MatchType::MultiWord
        } else {
            MatchType::Scattered
        };
    }

    let starts = is_word_start(first.checked_sub(1).map(class_at), class_at(first));
    let ends = is_word_end(class_at(last), classes.get(last + 1).copied());

    match (starts, ends) {
        (true, true) => MatchType::FullWord,
        (true, false) => MatchType::WordStart,
        (false, true) => MatchType::WordEnd,
        (false, false) => MatchType::WordMiddle,
    }
}

/// Match one candidate against a query.
///
/// Pure function: safe to call from any thread. For tight loops over many
/// candidates prefer a reused [`FuzzyMatcher`].
pub fn match_candidate(query: &str, candidate: &str) -> MatchOutcome {
    let mut matcher = FuzzyMatcher::new();
    let parsed = QueryParser::parse(query);
    let result = matcher.match_needle(candidate, &parsed.needle, &parsed.needle_text, false);
    MatchOutcome::from_match(result.as_ref())
}

/// Defensive form of [`match_candidate`]: an absent query is treated as
/// empty, an absent candidate never matches.
pub fn match_optional(query: Option<&str>, candidate: Option<&str>) -> MatchOutcome {
    match candidate {
        Some(candidate) => match_candidate(query.unwrap_or(""), candidate),
        None => MatchOutcome::NO_MATCH,
    }
}

/// Cheap visibility check without scoring: do the needle characters, with
/// whitespace skipped, appear in order in the haystack, ignoring case?
pub fn matches_subsequence(haystack: &str, needle: &str) -> bool {
    let mut hay = haystack.chars().map(fold_char);
    needle
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(fold_char)
        .all(|wanted| hay.any(|c| c == wanted))
}
