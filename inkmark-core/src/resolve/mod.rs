//! Mapping an on-screen selection back to a clean-text range.
//!
//! [`locate`] is the primary, purely lexical method. A
//! [`StructuralLocator`] can be chained behind it for selections whose
//! context is too short or repetitive to settle; [`validate`] gates whatever
//! either method returns.

mod context;
mod lexical;
mod structural;
mod validate;

pub use context::{normalize_whitespace, Selection, SelectionContext, DEFAULT_CONTEXT_WINDOW};
pub use lexical::locate;
pub use structural::{RenderedNode, StructuralLocator, TextWalk};
pub use validate::validate;

use crate::model::TextRange;

/// Which method produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Lexical,
    Structural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub range: TextRange,
    pub method: Method,
}

/// Lexical lookup first, then the structural fallback if one is given.
pub fn resolve(
    clean: &str,
    selection: &Selection,
    fallback: Option<&dyn StructuralLocator>,
) -> Option<Resolution> {
    if let Some(range) = locate(clean, &selection.text, &selection.context) {
        return Some(Resolution {
            range,
            method: Method::Lexical,
        });
    }

    let range = fallback?.locate_structural(clean)?;
    tracing::debug!(
        target: "inkmark::resolve",
        start = range.start,
        end = range.end,
        "resolved by structural fallback"
    );
    Some(Resolution {
        range,
        method: Method::Structural,
    })
}
