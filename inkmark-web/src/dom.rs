//! Structural fallback over the live DOM.
//!
//! The page wraps the current selection in a transient element carrying
//! [`SELECTION_MARKER_ATTR`] before calling `confirm`. Rendered text must
//! equal the clean text for the measured offsets to be meaningful.

use inkmark_core::model::TextRange;
use inkmark_core::resolve::{StructuralLocator, TextWalk};
use web_sys::{Element, Node};

/// Attribute identifying the transient selection wrapper
pub const SELECTION_MARKER_ATTR: &str = "data-inkmark-selection";

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

pub struct DomLocator {
    container: Element,
}

impl DomLocator {
    pub fn new(container: Element) -> Self {
        Self { container }
    }

    fn marker(&self) -> Option<Element> {
        self.container
            .query_selector(&format!("[{SELECTION_MARKER_ATTR}]"))
            .ok()
            .flatten()
    }

    fn measure(&self, marker: &Node) -> Option<TextRange> {
        let document = self.container.owner_document()?;
        let walker = document
            .create_tree_walker_with_what_to_show(&self.container, SHOW_TEXT)
            .ok()?;

        let mut walk = TextWalk::new();
        while let Ok(Some(node)) = walker.next_node() {
            let len = node.text_content().map_or(0, |text| text.len());
            if !walk.visit(len, marker.contains(Some(&node))) {
                break;
            }
        }
        walk.finish()
    }
}

impl StructuralLocator for DomLocator {
    fn locate_structural(&self, clean: &str) -> Option<TextRange> {
        let marker = self.marker()?;
        let range = self.measure(&marker)?;
        (range.end <= clean.len()).then_some(range)
    }
}
