/// Full-width (ideographic) space, common in Chinese input methods.
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == IDEOGRAPHIC_SPACE
}

/// Splits a search query into its terms.
///
/// Terms are separated by any whitespace, including the full-width space.
/// Empty terms are dropped, and repeated terms keep only their first
/// occurrence, so the result behaves like an ordered set.
pub fn tokenize(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query.split(is_separator).filter(|t| !t.is_empty()) {
        if !terms.iter().any(|existing| existing == term) {
            terms.push(term.to_string());
        }
    }
    terms
}

/// True when the query carries no usable term.
pub fn is_blank(query: &str) -> bool {
    query.split(is_separator).all(str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_mixed_spaces() {
        assert_eq!(tokenize("番茄 鸡蛋\u{3000}豆腐"), vec!["番茄", "鸡蛋", "豆腐"]);
        assert_eq!(tokenize("  土豆\t\n青椒  "), vec!["土豆", "青椒"]);
    }

    #[test]
    fn test_tokenize_drops_duplicates_and_empties() {
        assert_eq!(tokenize("蛋 蛋\u{3000}\u{3000}蛋"), vec!["蛋"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \u{3000} ").is_empty());
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("\u{3000}\t "));
        assert!(!is_blank(" 番茄 "));
    }
}
