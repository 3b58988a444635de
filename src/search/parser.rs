//! Query Parser & Preprocessor
//!
//! Turns the raw text typed by the user into the needle the matcher works on:
//! whitespace removed, characters case-folded, and a reversed copy ready for
//! matching paths from their end. Parsing happens once per keystroke so the
//! per-candidate loop does not allocate for the query.

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Parsed and processed search query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    /// Original unmodified query
    pub original: String,
    /// Case-folded query characters with whitespace removed
    pub needle: Vec<char>,
    /// `needle` as a string
    pub needle_text: String,
    /// Needle with its graphemes in reverse order
    pub reversed: Vec<char>,
    /// `reversed` as a string
    pub reversed_text: String,
}

impl ParsedQuery {
    /// An empty query matches every candidate
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Number of needle characters
    pub fn len(&self) -> usize {
        self.needle.len()
    }
}

/// Query parser and preprocessor
pub struct QueryParser;

impl QueryParser {
    /// Parse a search query into its components
    pub fn parse(query: &str) -> ParsedQuery {
        Self::build(query, query.chars())
    }

    /// Parse after Unicode NFC composition, for use with normalized candidates
    pub fn parse_normalized(query: &str) -> ParsedQuery {
        Self::build(query, query.nfc())
    }

    /// Parse a query that may be absent; absent is the same as empty
    pub fn parse_optional(query: Option<&str>) -> ParsedQuery {
        query.map(Self::parse).unwrap_or_default()
    }

    fn build(original: &str, chars: impl Iterator<Item = char>) -> ParsedQuery {
        let needle_text: String = chars
            .filter(|c| !c.is_whitespace())
            .map(fold_char)
            .collect();
        let needle: Vec<char> = needle_text.chars().collect();

        let reversed_text = reverse_graphemes(&needle_text);
        let reversed: Vec<char> = reversed_text.chars().collect();

        ParsedQuery {
            original: original.to_string(),
            needle,
            needle_text,
            reversed,
            reversed_text,
        }
    }
}

/// Simple case folding used on both sides of a comparison
pub fn fold_char(c: char) -> char {
    if c.is_ascii() {
        c.to_ascii_lowercase()
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

/// Reverse a string grapheme by grapheme, keeping combining marks attached
pub fn reverse_graphemes(text: &str) -> String {
    let mut reversed = String::with_capacity(text.len());
    reverse_graphemes_into(text, &mut reversed);
    reversed
}

/// Same as [`reverse_graphemes`], writing into a reusable buffer
pub fn reverse_graphemes_into(text: &str, out: &mut String) {
    out.clear();
    for grapheme in text.graphemes(true).rev() {
        out.push_str(grapheme);
    }
}
