//! Coordinate translation for clean text.
//!
//! Offsets inside the crate are UTF-8 byte offsets. Front ends want
//! (line, column) pairs for display, and browsers count UTF-16 code units.

/// Line start offsets for translating byte offsets to (line, col)
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Convert a byte offset to zero-based (line, byte column)
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line, offset - self.line_starts[line])
    }
}

/// UTF-16 code units before byte `offset` of `text`.
pub fn byte_to_utf16(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.char_indices()
        .take_while(|(i, _)| *i < offset)
        .map(|(_, c)| c.len_utf16())
        .sum()
}

/// Byte offset of UTF-16 position `units` in `text`. A position inside a
/// surrogate pair rounds down to the start of its character.
pub fn utf16_to_byte(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (i, c) in text.char_indices() {
        let next = seen + c.len_utf16();
        if next > units {
            return i;
        }
        seen = next;
    }
    text.len()
}
