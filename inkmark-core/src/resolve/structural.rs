//! Render-tree fallback for selections the lexical locator cannot settle.
//!
//! At selection time the front end wraps the live selection in a transient
//! marker element. Walking the rendered text nodes in document order and
//! counting characters before and inside that marker yields the selection's
//! offset in the rendered text, which equals clean-text offsets as long as
//! the render has not been mutated since.

use crate::model::TextRange;

/// A locator that measures the selection against the rendered output.
pub trait StructuralLocator {
    /// Offsets of the marked selection in `clean`, or `None` when the marker
    /// is missing or empty.
    fn locate_structural(&self, clean: &str) -> Option<TextRange>;
}

/// A minimal rendered tree: text leaves inside elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedNode {
    Text(String),
    Element {
        /// Whether this element is the transient selection marker
        selection_marker: bool,
        children: Vec<RenderedNode>,
    },
}

impl RenderedNode {
    pub fn text(text: impl Into<String>) -> Self {
        RenderedNode::Text(text.into())
    }

    pub fn element(children: Vec<RenderedNode>) -> Self {
        RenderedNode::Element {
            selection_marker: false,
            children,
        }
    }

    pub fn marker(children: Vec<RenderedNode>) -> Self {
        RenderedNode::Element {
            selection_marker: true,
            children,
        }
    }
}

/// Text-offset walk over text nodes in document order.
///
/// Feed it each text node with whether it lies inside the marker; it
/// stops accepting input at the first text node after the marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextWalk {
    offset: usize,
    start: Option<usize>,
    end: Option<usize>,
    done: bool,
}

impl TextWalk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one text node of `len` units. Returns `false` once the
    /// walk is complete.
    pub fn visit(&mut self, len: usize, in_marker: bool) -> bool {
        if self.done {
            return false;
        }
        if in_marker {
            if self.start.is_none() {
                self.start = Some(self.offset);
            }
            self.offset += len;
            self.end = Some(self.offset);
        } else if self.start.is_some() {
            self.done = true;
            return false;
        } else {
            self.offset += len;
        }
        true
    }

    pub fn finish(self) -> Option<TextRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end > start => Some(TextRange::new(start, end)),
            _ => None,
        }
    }
}

impl RenderedNode {
    fn walk(&self, in_marker: bool, walk: &mut TextWalk) -> bool {
        match self {
            RenderedNode::Text(text) => walk.visit(text.len(), in_marker),
            RenderedNode::Element {
                selection_marker,
                children,
            } => {
                let in_marker = in_marker || *selection_marker;
                children.iter().all(|child| child.walk(in_marker, walk))
            }
        }
    }
}

impl StructuralLocator for RenderedNode {
    fn locate_structural(&self, clean: &str) -> Option<TextRange> {
        let mut walk = TextWalk::new();
        self.walk(false, &mut walk);
        walk.finish().filter(|range| range.end <= clean.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> RenderedNode {
        // <p>See <span>foo</span> and <mark>foo</mark> again.</p>
        RenderedNode::element(vec![
            RenderedNode::text("See "),
            RenderedNode::element(vec![RenderedNode::text("foo")]),
            RenderedNode::text(" and "),
            RenderedNode::marker(vec![RenderedNode::text("foo")]),
            RenderedNode::text(" again."),
        ])
    }

    #[test]
    fn test_measures_marker_offsets() {
        let clean = "See foo and foo again.";
        assert_eq!(tree().locate_structural(clean), Some(TextRange::new(12, 15)));
    }

    #[test]
    fn test_marker_spanning_nested_nodes() {
        let root = RenderedNode::element(vec![
            RenderedNode::text("ab"),
            RenderedNode::marker(vec![
                RenderedNode::text("c"),
                RenderedNode::element(vec![RenderedNode::text("de")]),
            ]),
            RenderedNode::text("f"),
        ]);
        assert_eq!(root.locate_structural("abcdef"), Some(TextRange::new(2, 5)));
    }

    #[test]
    fn test_missing_or_empty_marker() {
        let no_marker = RenderedNode::element(vec![RenderedNode::text("abc")]);
        assert_eq!(no_marker.locate_structural("abc"), None);

        let empty = RenderedNode::element(vec![
            RenderedNode::text("abc"),
            RenderedNode::marker(vec![]),
        ]);
        assert_eq!(empty.locate_structural("abc"), None);
    }

    #[test]
    fn test_render_longer_than_clean_is_rejected() {
        assert_eq!(tree().locate_structural("short"), None);
    }
}
