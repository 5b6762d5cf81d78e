//! Persisted snapshot format and human-readable summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec;
use crate::config::SNAPSHOT_VERSION;
use crate::error::SnapshotError;
use crate::model::{Annotation, Document, Mark};

/// Full persisted state of an annotated document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub annotations: Vec<Annotation>,
    pub marks: Vec<Mark>,
    /// Tagged text
    pub markdown: String,
    /// Tagged text with markers removed
    #[serde(default)]
    pub clean_markdown: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Annotations and marks only, without the document text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedSnapshot {
    pub annotations: Vec<Annotation>,
    pub marks: Vec<Mark>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

fn default_version() -> String {
    SNAPSHOT_VERSION.to_string()
}

impl Snapshot {
    pub fn from_document(doc: &Document, version: &str) -> Self {
        Self {
            annotations: doc.annotations().to_vec(),
            marks: doc.marks().to_vec(),
            markdown: doc.markdown().to_string(),
            clean_markdown: doc.clean().to_string(),
            version: version.to_string(),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }

    /// Rebuild the document. Marks are re-derived from the tagged text.
    pub fn into_document(self, title: String) -> Document {
        Document::from_parts(
            title,
            self.markdown,
            self.annotations,
            self.created_at,
            self.updated_at,
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a snapshot. A missing `createdAt` is filled in,
    /// `updatedAt` is refreshed to now.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let mut value: Value = serde_json::from_str(json)?;
        let obj = value
            .as_object_mut()
            .ok_or(SnapshotError::Invalid("expected an object"))?;
        require_array(obj, "annotations")?;
        require_array(obj, "marks")?;
        if !obj.get("markdown").is_some_and(Value::is_string) {
            return Err(SnapshotError::Invalid("markdown must be a string"));
        }

        let now = Utc::now().timestamp_millis();
        if obj.get("createdAt").map_or(true, Value::is_null) {
            obj.insert("createdAt".to_string(), Value::from(now));
        }
        obj.insert("updatedAt".to_string(), Value::from(now));

        let mut snapshot: Snapshot = serde_json::from_value(value)?;
        if snapshot.clean_markdown.is_empty() {
            snapshot.clean_markdown = codec::strip_tags(&snapshot.markdown);
        }
        Ok(snapshot)
    }
}

impl SimplifiedSnapshot {
    pub fn from_document(doc: &Document, version: &str) -> Self {
        Self {
            annotations: doc.annotations().to_vec(),
            marks: doc.marks().to_vec(),
            version: version.to_string(),
            updated_at: doc.updated_at,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let mut value: Value = serde_json::from_str(json)?;
        let obj = value
            .as_object_mut()
            .ok_or(SnapshotError::Invalid("expected an object"))?;
        require_array(obj, "annotations")?;
        require_array(obj, "marks")?;
        obj.insert(
            "updatedAt".to_string(),
            Value::from(Utc::now().timestamp_millis()),
        );
        Ok(serde_json::from_value(value)?)
    }
}

fn require_array(obj: &serde_json::Map<String, Value>, field: &'static str) -> Result<(), SnapshotError> {
    if obj.get(field).is_some_and(Value::is_array) {
        return Ok(());
    }
    Err(SnapshotError::Invalid(match field {
        "annotations" => "annotations must be an array",
        _ => "marks must be an array",
    }))
}

/// Serialize a document as a pretty-printed snapshot
pub fn to_json(doc: &Document) -> serde_json::Result<String> {
    Snapshot::from_document(doc, SNAPSHOT_VERSION).to_json()
}

/// Markdown listing of a document's annotations in document order
pub fn summarize(doc: &Document) -> String {
    let mut out = String::new();

    out.push_str(&format!("## {}\n\n", doc.title));
    if doc.annotations().is_empty() {
        out.push_str("No annotations.\n");
        return out;
    }
    out.push_str(&format!("### Annotations ({} items)\n\n", doc.annotations().len()));

    for ann in doc.annotations_sorted() {
        match doc.mark(ann.id).and_then(|m| m.text(doc.clean())) {
            Some(text) => out.push_str(&format!("**[{}] \"{}\"**\n", ann.id, text)),
            None => out.push_str(&format!("**[{}] (mark missing)**\n", ann.id)),
        }
        out.push_str(&format!("- Note: {}\n\n", ann.note));
    }
    out
}
