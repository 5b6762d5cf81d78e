use serde::{Deserialize, Serialize};

use super::TextRange;

/// Annotation identifier, the `N` in `<mark_N>`
pub type MarkId = u32;

/// A marked range recovered from tagged text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mark {
    pub id: MarkId,
    #[serde(flatten)]
    pub range: TextRange,
}

impl Mark {
    pub fn new(id: MarkId, start: usize, end: usize) -> Self {
        Self {
            id,
            range: TextRange { start, end },
        }
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    /// The marked slice of `clean`
    pub fn text<'a>(&self, clean: &'a str) -> Option<&'a str> {
        self.range.slice(clean)
    }
}
