use crate::error::AnnotateError;
use crate::model::TextRange;

use super::normalize_whitespace;

/// Accept `range` only if it lies inside `clean` and covers `selected`.
///
/// Exact, trimmed, whitespace-normalised and equal-normalised-length matches
/// are all accepted, so selections that gained or lost surrounding
/// whitespace still pass.
pub fn validate(clean: &str, selected: &str, range: TextRange) -> Result<(), AnnotateError> {
    let invalid = AnnotateError::InvalidPosition {
        start: range.start,
        end: range.end,
        len: clean.len(),
    };
    if range.start >= range.end || range.end > clean.len() {
        return Err(invalid);
    }
    let Some(found) = range.slice(clean) else {
        return Err(invalid);
    };

    if found == selected || found.trim() == selected.trim() {
        return Ok(());
    }
    let found_norm = normalize_whitespace(found);
    let selected_norm = normalize_whitespace(selected);
    let found_len = found_norm.chars().count();
    if found_norm == selected_norm || (found_len > 0 && found_len == selected_norm.chars().count()) {
        return Ok(());
    }

    Err(AnnotateError::TextMismatch {
        expected: selected.to_string(),
        found: found.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_exact_and_whitespace_variants() {
        let clean = "say  hello\nworld now";
        assert!(validate(clean, "hello", TextRange::new(5, 10)).is_ok());
        assert!(validate(clean, " hello ", TextRange::new(5, 10)).is_ok());
        assert!(validate(clean, "hello world", TextRange::new(5, 16)).is_ok());
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let clean = "abc";
        assert!(matches!(
            validate(clean, "a", TextRange { start: 2, end: 2 }),
            Err(AnnotateError::InvalidPosition { .. })
        ));
        assert!(matches!(
            validate(clean, "abcd", TextRange::new(0, 4)),
            Err(AnnotateError::InvalidPosition { len: 3, .. })
        ));
        assert!(matches!(
            validate("ñ", "ñ", TextRange::new(0, 1)),
            Err(AnnotateError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_rejects_mismatch() {
        let err = validate("abc defgh", "abc", TextRange::new(4, 9)).unwrap_err();
        assert_eq!(
            err,
            AnnotateError::TextMismatch {
                expected: "abc".to_string(),
                found: "defgh".to_string(),
            }
        );
    }

    #[test]
    fn test_equal_length_is_tolerated() {
        // Same normalised length counts as a match.
        assert!(validate("abc xyz", "abc", TextRange::new(4, 7)).is_ok());
    }
}
