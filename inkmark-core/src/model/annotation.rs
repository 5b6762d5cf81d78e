use serde::{Deserialize, Serialize};

use super::MarkId;

/// A user-authored note bound 1:1 to a mark by id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Annotation {
    pub id: MarkId,
    pub note: String,
}

impl Annotation {
    pub fn new(id: MarkId, note: impl Into<String>) -> Self {
        Self {
            id,
            note: note.into(),
        }
    }
}
