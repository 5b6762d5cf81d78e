//! Error types for annotation mutations and snapshot import.

use thiserror::Error;

use crate::model::MarkId;

/// Why an annotation mutation was rejected. State is unchanged in every case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnnotateError {
    #[error("selection is empty")]
    EmptySelection,

    #[error("note is empty")]
    EmptyNote,

    #[error("could not locate the selected text")]
    Unresolved,

    #[error("invalid position {start}..{end} in text of length {len}")]
    InvalidPosition { start: usize, end: usize, len: usize },

    #[error("text at resolved position {found:?} does not match selection {expected:?}")]
    TextMismatch { expected: String, found: String },

    #[error("selection overlaps annotation {id}")]
    Overlap { id: MarkId },

    #[error("no annotation with id {0}")]
    UnknownAnnotation(MarkId),

    #[error("no annotation ids left")]
    IdExhausted,

    #[error("no pending selection")]
    NoPendingSelection,

    #[error("no document loaded")]
    NoDocument,
}

/// Snapshot import failures
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid annotation data: {0}")]
    Invalid(&'static str),
}
