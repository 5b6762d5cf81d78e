//! Conversion between tagged text and clean text plus marks.
//!
//! Tagged text carries annotation positions inline as `<mark_N>…</mark_N>`
//! pairs. [`parse`] strips them into a [`Parsed`] view, [`inject`] and
//! [`delete_mark`] produce new tagged text from clean-text coordinates.

mod highlight;
mod inject;
mod scan;

pub use highlight::highlight;
pub use inject::{close_tag, delete_mark, inject, open_tag, strip_tags};
pub use scan::{parse, CodeKind, CodeRegion, Parsed};
