//! Streaming scanner from tagged text to clean text.
//!
//! The scanner is a fold over source positions: [`ScanState::step`] consumes
//! one unit (a fence delimiter, a whole marker tag, or a single character)
//! and returns the next position. Marker tags vanish from the clean text;
//! everything else is copied verbatim and recorded in the index map.

use serde::Serialize;

use crate::model::{Mark, MarkId, TextRange};

const OPEN_PREFIX: &[u8] = b"<mark_";
const CLOSE_PREFIX: &[u8] = b"</mark_";
const FENCE: &[u8] = b"```";

/// Kind of code region observed while scanning
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CodeKind {
    Fenced,
    Inline,
}

/// A fenced block or inline code span, in clean-text coordinates
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CodeRegion {
    pub kind: CodeKind,
    #[serde(flatten)]
    pub range: TextRange,
}

/// Result of scanning tagged text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed {
    /// Tagged text with every recognised marker tag removed
    pub clean: String,
    /// `index_map[i]` is the tagged-text offset of clean byte `i`
    pub index_map: Vec<usize>,
    /// Closed marker pairs, sorted by start
    pub marks: Vec<Mark>,
    /// Code regions, sorted by start
    pub code_regions: Vec<CodeRegion>,
}

impl Parsed {
    pub fn mark(&self, id: MarkId) -> Option<&Mark> {
        self.marks.iter().find(|m| m.id == id)
    }

    /// Highest mark id present, 0 when there are none
    pub fn max_id(&self) -> MarkId {
        self.marks.iter().map(|m| m.id).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Open(MarkId),
    Close(MarkId),
}

#[derive(Debug, Clone, Copy)]
struct OpenMark {
    id: MarkId,
    start: usize,
}

/// Fold accumulator for [`parse`]
#[derive(Debug, Default)]
struct ScanState {
    in_code_block: bool,
    in_inline_code: bool,
    open: Vec<OpenMark>,
    fence_start: usize,
    inline_start: usize,
    out: Parsed,
}

impl ScanState {
    /// Consume the unit starting at `pos` and return the next position.
    fn step(&mut self, raw: &str, pos: usize) -> usize {
        let bytes = raw.as_bytes();

        if is_fence(raw, pos) {
            self.toggle_fence();
            for offset in pos..pos + FENCE.len() {
                self.push_byte(bytes[offset], offset);
            }
            return pos + FENCE.len();
        }

        if !self.in_code_block && bytes[pos] == b'`' && !touches_fence(bytes, pos) {
            self.toggle_inline();
        }

        if bytes[pos] == b'<' {
            if let Some((tag, next)) = read_tag(bytes, pos) {
                match tag {
                    Tag::Open(id) => self.open.push(OpenMark {
                        id,
                        start: self.out.clean.len(),
                    }),
                    Tag::Close(id) => self.close(id),
                }
                return next;
            }
        }

        let ch = raw[pos..].chars().next().unwrap_or('\u{FFFD}');
        let width = ch.len_utf8();
        self.out.clean.push(ch);
        self.out.index_map.extend(pos..pos + width);
        pos + width
    }

    fn push_byte(&mut self, byte: u8, offset: usize) {
        self.out.clean.push(byte as char);
        self.out.index_map.push(offset);
    }

    fn toggle_fence(&mut self) {
        let here = self.out.clean.len();
        if self.in_code_block {
            self.out.code_regions.push(CodeRegion {
                kind: CodeKind::Fenced,
                range: TextRange::new(self.fence_start, here + FENCE.len()),
            });
        } else {
            self.fence_start = here;
        }
        self.in_code_block = !self.in_code_block;
    }

    fn toggle_inline(&mut self) {
        let here = self.out.clean.len();
        if self.in_inline_code {
            self.out.code_regions.push(CodeRegion {
                kind: CodeKind::Inline,
                range: TextRange::new(self.inline_start, here + 1),
            });
        } else {
            self.inline_start = here;
        }
        self.in_inline_code = !self.in_inline_code;
    }

    /// Close the topmost open mark with `id`; unmatched closers are dropped.
    fn close(&mut self, id: MarkId) {
        let Some(index) = self.open.iter().rposition(|m| m.id == id) else {
            tracing::debug!(target: "inkmark::codec", id, "dropping unmatched closing tag");
            return;
        };
        let open = self.open.remove(index);
        let end = self.out.clean.len();
        if open.start < end {
            self.out.marks.push(Mark::new(id, open.start, end));
        }
    }

    fn finish(mut self) -> Parsed {
        let end = self.out.clean.len();
        if self.in_code_block && self.fence_start < end {
            self.out.code_regions.push(CodeRegion {
                kind: CodeKind::Fenced,
                range: TextRange::new(self.fence_start, end),
            });
        }
        if self.in_inline_code && self.inline_start < end {
            self.out.code_regions.push(CodeRegion {
                kind: CodeKind::Inline,
                range: TextRange::new(self.inline_start, end),
            });
        }
        if !self.open.is_empty() {
            tracing::debug!(
                target: "inkmark::codec",
                dangling = self.open.len(),
                "ignoring unclosed opening tags"
            );
        }

        self.out.marks.sort_by_key(|m| m.range.start);
        self.out.code_regions.sort_by_key(|r| r.range.start);
        debug_assert_eq!(self.out.index_map.len(), self.out.clean.len());
        self.out
    }
}

/// Split tagged text into clean text, index map, marks and code regions.
///
/// Never fails: malformed tags are kept as literal text and unmatched
/// closing tags are dropped.
pub fn parse(tagged: &str) -> Parsed {
    let mut state = ScanState::default();
    let mut pos = 0;
    while pos < tagged.len() {
        pos = state.step(tagged, pos);
    }
    let parsed = state.finish();

    tracing::debug!(
        target: "inkmark::codec",
        tagged_len = tagged.len(),
        clean_len = parsed.clean.len(),
        marks = parsed.marks.len(),
        "parsed tagged text"
    );
    parsed
}

/// A "```" at line start followed by whitespace, alphanumerics or end of text.
fn is_fence(raw: &str, pos: usize) -> bool {
    let bytes = raw.as_bytes();
    if !bytes[pos..].starts_with(FENCE) {
        return false;
    }
    let at_line_start = pos == 0 || matches!(bytes[pos - 1], b'\n' | b'\r');
    if !at_line_start {
        return false;
    }
    match raw[pos + FENCE.len()..].chars().next() {
        None => true,
        Some(c) => c.is_ascii_alphanumeric() || c.is_whitespace(),
    }
}

/// Whether the backtick at `pos` borders another pair of backticks.
fn touches_fence(bytes: &[u8], pos: usize) -> bool {
    let before = pos >= 2 && &bytes[pos - 2..pos] == b"``";
    let after = bytes.len() >= pos + 3 && &bytes[pos + 1..pos + 3] == b"``";
    before || after
}

/// Recognise `<mark_N>` or `</mark_N>` at `pos`, returning the tag and the
/// position just past its `>`.
fn read_tag(bytes: &[u8], pos: usize) -> Option<(Tag, usize)> {
    let rest = &bytes[pos..];
    let (closing, digits_at) = if rest.starts_with(CLOSE_PREFIX) {
        (true, pos + CLOSE_PREFIX.len())
    } else if rest.starts_with(OPEN_PREFIX) {
        (false, pos + OPEN_PREFIX.len())
    } else {
        return None;
    };

    let digits = bytes[digits_at..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let gt = digits_at + digits;
    if digits == 0 || bytes.get(gt) != Some(&b'>') {
        return None;
    }

    // Digits are ASCII, so the slice is valid UTF-8.
    let id: MarkId = std::str::from_utf8(&bytes[digits_at..gt])
        .ok()?
        .parse()
        .ok()
        .filter(|id| *id > 0)?;

    let tag = if closing { Tag::Close(id) } else { Tag::Open(id) };
    Some((tag, gt + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_strips_tags_and_maps_offsets() {
        let parsed = parse("See <mark_1>foo</mark_1> and foo again.");

        assert_eq!(parsed.clean, "See foo and foo again.");
        assert_eq!(parsed.marks, vec![Mark::new(1, 4, 7)]);
        assert_eq!(parsed.index_map.len(), parsed.clean.len());
        // 'f' of the first foo sits right after "<mark_1>"
        assert_eq!(parsed.index_map[4], 12);
        // ' ' after foo sits right after "</mark_1>"
        assert_eq!(parsed.index_map[7], 24);
        assert!(parsed.index_map.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unmatched_closer_is_dropped() {
        let parsed = parse("plain </mark_5> text");
        assert_eq!(parsed.clean, "plain  text");
        assert!(parsed.marks.is_empty());
    }

    #[test]
    fn test_dangling_opener_is_invisible() {
        let parsed = parse("a<mark_3>b");
        assert_eq!(parsed.clean, "ab");
        assert!(parsed.marks.is_empty());
    }

    #[rstest]
    #[case::no_digits("<mark_>x")]
    #[case::no_gt("<mark_12 x")]
    #[case::zero_id("<mark_0>x")]
    #[case::letters("<mark_a1>x")]
    #[case::overflow("<mark_99999999999>x")]
    fn test_malformed_tags_are_literal(#[case] input: &str) {
        let parsed = parse(input);
        assert_eq!(parsed.clean, input);
        assert!(parsed.marks.is_empty());
    }

    #[test]
    fn test_non_strict_nesting_closes_matching_id() {
        // 1 opens, 2 opens, 1 closes before 2
        let parsed = parse("<mark_1>ab<mark_2>cd</mark_1>ef</mark_2>");
        assert_eq!(parsed.clean, "abcdef");
        assert_eq!(parsed.marks, vec![Mark::new(1, 0, 4), Mark::new(2, 2, 6)]);
    }

    #[test]
    fn test_equal_starts_keep_emission_order() {
        let parsed = parse("<mark_1><mark_2>ab</mark_2>c</mark_1>");
        assert_eq!(parsed.marks, vec![Mark::new(2, 0, 2), Mark::new(1, 0, 3)]);
    }

    #[test]
    fn test_empty_pair_emits_no_mark() {
        let parsed = parse("x<mark_4></mark_4>y");
        assert_eq!(parsed.clean, "xy");
        assert!(parsed.marks.is_empty());
    }

    #[test]
    fn test_tags_recognised_inside_code() {
        let input = "```rust\nlet <mark_1>x</mark_1> = 1;\n```\nand `<mark_2>y</mark_2>`";
        let parsed = parse(input);

        assert_eq!(parsed.clean, "```rust\nlet x = 1;\n```\nand `y`");
        assert_eq!(parsed.marks.len(), 2);
        assert_eq!(parsed.marks[0].text(&parsed.clean), Some("x"));
        assert_eq!(parsed.marks[1].text(&parsed.clean), Some("y"));
    }

    #[test]
    fn test_code_regions() {
        let parsed = parse("```\ncode\n```\nuse `x` here");
        let kinds: Vec<_> = parsed.code_regions.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![CodeKind::Fenced, CodeKind::Inline]);
        assert_eq!(
            parsed.code_regions[0].range.slice(&parsed.clean),
            Some("```\ncode\n```")
        );
        assert_eq!(parsed.code_regions[1].range.slice(&parsed.clean), Some("`x`"));
    }

    #[test]
    fn test_fence_needs_line_start() {
        let parsed = parse("text ```not a fence``` `tick`");
        assert!(parsed
            .code_regions
            .iter()
            .all(|r| r.kind == CodeKind::Inline));
    }

    #[test]
    fn test_fence_followed_by_punctuation_is_inline() {
        // "```{" does not open a fence; its middle backtick opens inline code.
        let parsed = parse("```{\nx`");
        assert_eq!(
            parsed.code_regions,
            vec![CodeRegion {
                kind: CodeKind::Inline,
                range: TextRange::new(1, 7),
            }]
        );
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let parsed = parse("intro\n```\nstill code");
        assert_eq!(parsed.code_regions.len(), 1);
        assert_eq!(parsed.code_regions[0].range.end, parsed.clean.len());
    }

    #[test]
    fn test_multibyte_text_maps_every_byte() {
        let parsed = parse("批<mark_1>注</mark_1>!");
        assert_eq!(parsed.clean, "批注!");
        assert_eq!(parsed.index_map.len(), parsed.clean.len());
        assert_eq!(parsed.marks[0].text(&parsed.clean), Some("注"));
        // "批" is 3 bytes, "<mark_1>" is 8
        assert_eq!(parsed.index_map[3], 11);
    }

    #[test]
    fn test_clean_text_is_fixed_point() {
        let parsed = parse("a <mark_1>b</mark_1> <mark_2>c</mark_2> </mark_9>");
        let again = parse(&parsed.clean);
        assert!(again.marks.is_empty());
        assert_eq!(again.clean, parsed.clean);
    }
}
