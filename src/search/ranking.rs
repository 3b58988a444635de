//! Ranking & Scoring Policy
//!
//! Holds the tunable weights used by the fuzzy matcher, the character
//! classification that drives boundary bonuses, and the total order used to
//! sort ranked candidates.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Largest accepted value for a single weight
pub const MAX_WEIGHT: i32 = 10_000;

/// Scoring weights for the different match signals.
///
/// All values are integer points; the final score of a match is the sum of
/// per-character points minus gap penalties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Points for every matched character
    pub match_score: i32,
    /// Bonus when a character directly follows the previous matched one
    pub consecutive_bonus: i32,
    /// Bonus for matching the first character of the candidate
    pub start_bonus: i32,
    /// Bonus for a match right after `/` or `\`
    pub path_separator_bonus: i32,
    /// Bonus for a match right after `.`, `_`, `-`, `:`, whitespace or punctuation
    pub separator_bonus: i32,
    /// Bonus for a camelCase hump or a letter/digit transition
    pub camel_case_bonus: i32,
    /// Penalty for opening a gap between two matched characters
    pub gap_start_penalty: i32,
    /// Penalty for every further skipped character in the same gap
    pub gap_extension_penalty: i32,
    /// Penalty per candidate character skipped before the first match
    pub leading_gap_penalty: i32,
    /// Cap on the total leading gap penalty
    pub max_leading_gap_penalty: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            match_score: 16,
            consecutive_bonus: 12,
            start_bonus: 12,
            path_separator_bonus: 12,
            separator_bonus: 10,
            camel_case_bonus: 8,
            gap_start_penalty: 3,
            gap_extension_penalty: 1,
            leading_gap_penalty: 2,
            max_leading_gap_penalty: 12,
        }
    }
}

impl ScoringWeights {
    /// Check that the weights keep contiguous runs ahead of scattered matches
    /// and earlier matches ahead of later ones. Every weight must lie in
    /// `0..=MAX_WEIGHT`.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.match_score <= 0 {
            return Err(AppError::Config(
                "match_score must be positive".to_string(),
            ));
        }

        let weights = [
            ("match_score", self.match_score),
            ("consecutive_bonus", self.consecutive_bonus),
            ("start_bonus", self.start_bonus),
            ("path_separator_bonus", self.path_separator_bonus),
            ("separator_bonus", self.separator_bonus),
            ("camel_case_bonus", self.camel_case_bonus),
            ("gap_start_penalty", self.gap_start_penalty),
            ("gap_extension_penalty", self.gap_extension_penalty),
            ("leading_gap_penalty", self.leading_gap_penalty),
            ("max_leading_gap_penalty", self.max_leading_gap_penalty),
        ];
        for (name, value) in weights {
            if value < 0 {
                return Err(AppError::Config(format!("{} must not be negative", name)));
            }
            if value > MAX_WEIGHT {
                return Err(AppError::Config(format!(
                    "{} must not exceed {}",
                    name, MAX_WEIGHT
                )));
            }
        }

        let best_boundary = self
            .separator_bonus
            .max(self.path_separator_bonus)
            .max(self.camel_case_bonus);
        if self.consecutive_bonus <= best_boundary - self.gap_start_penalty {
            return Err(AppError::Config(format!(
                "consecutive_bonus ({}) must exceed the best boundary bonus minus gap_start_penalty ({})",
                self.consecutive_bonus,
                best_boundary - self.gap_start_penalty
            )));
        }

        Ok(())
    }

    /// Boundary bonus for a character of class `current` preceded by `previous`
    /// (`None` at the start of the candidate).
    pub fn boundary_bonus(&self, previous: Option<CharClass>, current: CharClass) -> i32 {
        let previous = match previous {
            None => return self.start_bonus,
            Some(previous) => previous,
        };

        if !current.is_word() {
            return 0;
        }

        match previous {
            CharClass::PathSeparator => self.path_separator_bonus,
            CharClass::Separator | CharClass::Whitespace | CharClass::Other => {
                self.separator_bonus
            }
            _ if is_hump(previous, current) => self.camel_case_bonus,
            _ => 0,
        }
    }

    /// Penalty for skipping `skipped` characters before the first match.
    ///
    /// The penalty stops growing at `max_leading_gap_penalty` (6 characters
    /// with the defaults); past that point a later first match scores the
    /// same as an earlier one and only the text tie-break separates them.
    pub fn leading_penalty(&self, skipped: usize) -> i32 {
        let skipped = i32::try_from(skipped).unwrap_or(i32::MAX);
        skipped
            .saturating_mul(self.leading_gap_penalty)
            .min(self.max_leading_gap_penalty)
    }
}

/// Coarse character classes used to find word boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Lower,
    Upper,
    Digit,
    Separator,
    PathSeparator,
    Whitespace,
    Other,
}

impl CharClass {
    pub fn of(c: char) -> Self {
        match c {
            '/' | '\\' => CharClass::PathSeparator,
            '.' | '_' | '-' | ':' | ',' | ';' => CharClass::Separator,
            c if c.is_whitespace() => CharClass::Whitespace,
            c if c.is_numeric() => CharClass::Digit,
            c if c.is_uppercase() => CharClass::Upper,
            // Letters without case behave like lowercase letters
            c if c.is_alphabetic() => CharClass::Lower,
            _ => CharClass::Other,
        }
    }

    /// Whether characters of this class can be part of a word
    pub fn is_word(self) -> bool {
        matches!(self, CharClass::Lower | CharClass::Upper | CharClass::Digit)
    }
}

/// camelCase hump or letter/digit transition
fn is_hump(previous: CharClass, current: CharClass) -> bool {
    matches!(
        (previous, current),
        (CharClass::Lower, CharClass::Upper)
            | (CharClass::Lower | CharClass::Upper, CharClass::Digit)
            | (CharClass::Digit, CharClass::Lower | CharClass::Upper)
    )
}

/// Whether a character of class `current` starts a new word
pub fn is_word_start(previous: Option<CharClass>, current: CharClass) -> bool {
    match previous {
        None => current.is_word(),
        Some(previous) => current.is_word() && (!previous.is_word() || is_hump(previous, current)),
    }
}

/// Whether a word ends between `current` and `next`
pub fn is_word_end(current: CharClass, next: Option<CharClass>) -> bool {
    match next {
        None => true,
        Some(next) => !next.is_word() || is_hump(current, next),
    }
}

/// Total order for ranked candidates: higher score first, then candidate text
/// ascending so that ties sort deterministically.
pub fn compare_ranked(score_a: i32, text_a: &str, score_b: i32, text_b: &str) -> Ordering {
    score_b.cmp(&score_a).then_with(|| text_a.cmp(text_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_valid() {
        let weights = ScoringWeights::default();
        assert!(weights.validate().is_ok());
        assert_eq!(weights.match_score, 16);
    }

    #[test]
    fn test_validate_rejects_weak_consecutive_bonus() {
        let weights = ScoringWeights {
            consecutive_bonus: 2,
            ..ScoringWeights::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(err.to_string().contains("consecutive_bonus"));
    }

    #[test]
    fn test_validate_rejects_negative_penalty() {
        let weights = ScoringWeights {
            gap_extension_penalty: -1,
            ..ScoringWeights::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_camel_hump_above_consecutive() {
        // A digit hump would otherwise outscore a contiguous run: "a1b" > "ab"
        let weights = ScoringWeights {
            camel_case_bonus: 100,
            ..ScoringWeights::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(err.to_string().contains("consecutive_bonus"));
    }

    #[test]
    fn test_validate_rejects_negative_bonus() {
        for weights in [
            ScoringWeights {
                start_bonus: -50,
                ..ScoringWeights::default()
            },
            ScoringWeights {
                separator_bonus: -1,
                ..ScoringWeights::default()
            },
            ScoringWeights {
                camel_case_bonus: -1,
                ..ScoringWeights::default()
            },
        ] {
            let err = weights.validate().unwrap_err();
            assert!(err.to_string().contains("must not be negative"));
        }
    }

    #[test]
    fn test_validate_rejects_oversized_weight() {
        let weights = ScoringWeights {
            match_score: i32::MAX / 2,
            consecutive_bonus: i32::MAX / 2,
            ..ScoringWeights::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"));

        let at_cap = ScoringWeights {
            match_score: MAX_WEIGHT,
            consecutive_bonus: MAX_WEIGHT,
            ..ScoringWeights::default()
        };
        assert!(at_cap.validate().is_ok());
    }

    #[test]
    fn test_char_classes() {
        assert_eq!(CharClass::of('a'), CharClass::Lower);
        assert_eq!(CharClass::of('Q'), CharClass::Upper);
        assert_eq!(CharClass::of('7'), CharClass::Digit);
        assert_eq!(CharClass::of('/'), CharClass::PathSeparator);
        assert_eq!(CharClass::of('\\'), CharClass::PathSeparator);
        assert_eq!(CharClass::of('_'), CharClass::Separator);
        assert_eq!(CharClass::of(' '), CharClass::Whitespace);
        assert_eq!(CharClass::of('('), CharClass::Other);
        assert_eq!(CharClass::of('日'), CharClass::Lower);
    }

    #[test]
    fn test_boundary_bonus() {
        let w = ScoringWeights::default();
        assert_eq!(w.boundary_bonus(None, CharClass::Lower), w.start_bonus);
        assert_eq!(
            w.boundary_bonus(Some(CharClass::PathSeparator), CharClass::Lower),
            w.path_separator_bonus
        );
        assert_eq!(
            w.boundary_bonus(Some(CharClass::Separator), CharClass::Upper),
            w.separator_bonus
        );
        assert_eq!(
            w.boundary_bonus(Some(CharClass::Lower), CharClass::Upper),
            w.camel_case_bonus
        );
        assert_eq!(w.boundary_bonus(Some(CharClass::Lower), CharClass::Lower), 0);
        assert_eq!(w.boundary_bonus(Some(CharClass::Upper), CharClass::Upper), 0);
        // Separators themselves never earn a boundary bonus
        assert_eq!(w.boundary_bonus(Some(CharClass::Lower), CharClass::Separator), 0);
    }

    #[test]
    fn test_leading_penalty_is_capped() {
        let w = ScoringWeights::default();
        assert_eq!(w.leading_penalty(0), 0);
        assert_eq!(w.leading_penalty(3), 6);
        assert_eq!(w.leading_penalty(1_000_000), w.max_leading_gap_penalty);
        // Past the cap, later first matches are no longer penalized further
        assert_eq!(w.leading_penalty(6), w.leading_penalty(40));
    }

    #[test]
    fn test_word_start_and_end() {
        assert!(is_word_start(None, CharClass::Lower));
        assert!(is_word_start(Some(CharClass::Whitespace), CharClass::Lower));
        assert!(is_word_start(Some(CharClass::Lower), CharClass::Upper));
        assert!(!is_word_start(Some(CharClass::Lower), CharClass::Lower));

        assert!(is_word_end(CharClass::Lower, None));
        assert!(is_word_end(CharClass::Lower, Some(CharClass::Separator)));
        assert!(is_word_end(CharClass::Lower, Some(CharClass::Upper)));
        assert!(!is_word_end(CharClass::Lower, Some(CharClass::Lower)));
    }

    #[test]
    fn test_compare_ranked() {
        assert_eq!(compare_ranked(10, "b", 5, "a"), Ordering::Less);
        assert_eq!(compare_ranked(5, "a", 10, "b"), Ordering::Greater);
        assert_eq!(compare_ranked(5, "a", 5, "b"), Ordering::Less);
        assert_eq!(compare_ranked(5, "a", 5, "a"), Ordering::Equal);
    }
}
