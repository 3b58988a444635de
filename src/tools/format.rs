//! Text formatting helpers shared by the tools

use crate::search::SearchResult;

/// Wrap matched characters in **bold**, merging adjacent positions into one
/// run. Positions are character indices; out-of-range positions are ignored.
pub fn highlight_positions(text: &str, positions: &[u32]) -> String {
    if positions.is_empty() {
        return text.to_string();
    }

    // Merge positions into half-open character ranges
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &pos in positions {
        let pos = pos as usize;
        if let Some(last) = ranges.last_mut() {
            if pos == last.1 {
                last.1 = pos + 1;
                continue;
            }
            if pos < last.1 {
                continue;
            }
        }
        ranges.push((pos, pos + 1));
    }

    let mut res = String::with_capacity(text.len() + ranges.len() * 4);
    let mut ranges = ranges.into_iter().peekable();
    let mut open = false;

    for (idx, c) in text.chars().enumerate() {
        if !open && ranges.peek().is_some_and(|r| r.0 == idx) {
            res.push_str("**");
            open = true;
        }
        res.push(c);
        if open && ranges.peek().is_some_and(|r| r.1 == idx + 1) {
            res.push_str("**");
            open = false;
            ranges.next();
        }
    }

    if open {
        res.push_str("**");
    }

    res
}

/// One line per result: score, tab, candidate
pub fn format_result_lines(results: &[SearchResult<String>], highlight: bool) -> String {
    let mut out = String::new();
    for result in results {
        let text = if highlight {
            highlight_positions(&result.item, &result.positions)
        } else {
            result.item.clone()
        };
        out.push_str(&format!("{}\t{}\n", result.score, text));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_merges_runs() {
        assert_eq!(highlight_positions("sv_gravity", &[0, 3, 4]), "**s**v_**gr**avity");
    }

    #[test]
    fn test_highlight_whole_text() {
        assert_eq!(highlight_positions("car", &[0, 1, 2]), "**car**");
    }

    #[test]
    fn test_highlight_no_positions() {
        assert_eq!(highlight_positions("plain", &[]), "plain");
    }

    #[test]
    fn test_highlight_multibyte() {
        assert_eq!(highlight_positions("Ärger", &[0, 1]), "**Är**ger");
    }

    #[test]
    fn test_highlight_ignores_out_of_range() {
        assert_eq!(highlight_positions("ab", &[1, 7]), "a**b**");
    }
}
