use serde::{Deserialize, Serialize};

use crate::model::TextRange;

/// Default number of characters captured on each side of a selection
pub const DEFAULT_CONTEXT_WINDOW: usize = 50;

/// Clean text immediately around a selection, captured at selection time
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionContext {
    pub before: String,
    pub after: String,
}

impl SelectionContext {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }

    /// Capture up to `window` characters of `clean` on each side of `range`.
    pub fn capture(clean: &str, range: TextRange, window: usize) -> Self {
        let before = clean.get(..range.start).unwrap_or_default();
        let after = clean.get(range.end..).unwrap_or_default();
        Self {
            before: tail_chars(before, window).to_string(),
            after: head_chars(after, window).to_string(),
        }
    }
}

/// A user selection: the highlighted text plus its context
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub text: String,
    #[serde(flatten)]
    pub context: SelectionContext,
}

impl Selection {
    pub fn new(text: impl Into<String>, context: SelectionContext) -> Self {
        Self {
            text: text.into(),
            context,
        }
    }
}

/// Collapse whitespace runs to a single space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Last `n` chars of `text`.
pub(crate) fn tail_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((index, _)) => &text[index..],
        None => text,
    }
}

/// First `n` chars of `text`.
pub(crate) fn head_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
