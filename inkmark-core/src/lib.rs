//! Inkmark Core - Platform-agnostic markdown annotation library
//!
//! Annotation positions live inside the markdown itself as `<mark_N>` tag
//! pairs. This crate converts between that tagged text and the clean text a
//! reader sees, maps on-screen selections back to clean-text ranges, and
//! manages the annotations bound to each mark. It's designed to work both in
//! native CLI and WASM environments.

pub mod app;
pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod offsets;
pub mod persist;
pub mod resolve;

pub use app::Session;
pub use codec::{delete_mark, highlight, inject, parse, Parsed};
pub use config::AnnotatorConfig;
pub use error::{AnnotateError, SnapshotError};
pub use export::{summarize, to_json, SimplifiedSnapshot, Snapshot};
pub use model::{Annotation, Document, Mark, MarkId, TextRange};
pub use resolve::{locate, Selection, SelectionContext, StructuralLocator};
