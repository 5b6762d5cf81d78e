use serde::{Deserialize, Serialize};

use crate::resolve::DEFAULT_CONTEXT_WINDOW;

/// Snapshot format version written by this crate
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Default delay before a scheduled save fires
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default CSS class for highlight spans
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "annotation-highlight";

/// Annotator settings; every field falls back to its default when absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotatorConfig {
    /// Characters captured on each side of a selection
    pub context_window: usize,
    /// Debounce delay for persistence, in milliseconds
    pub debounce_ms: u64,
    pub highlight_class: String,
    pub snapshot_version: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            highlight_class: DEFAULT_HIGHLIGHT_CLASS.to_string(),
            snapshot_version: SNAPSHOT_VERSION.to_string(),
        }
    }
}

impl AnnotatorConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
