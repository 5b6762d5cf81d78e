use chrono::{DateTime, Utc};

use super::{Annotation, Mark, MarkId, TextRange};
use crate::codec::{self, Parsed};
use crate::error::AnnotateError;
use crate::resolve::{self, Selection, StructuralLocator};

/// A tagged markdown document with its annotations.
///
/// The tagged text is the source of truth; the parsed view is rebuilt from
/// it after every mutation and never edited in place.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub filepath: Option<String>,
    markdown: String,
    parsed: Parsed,
    annotations: Vec<Annotation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: String, markdown: String) -> Self {
        let now = Utc::now();
        Self::from_parts(title, markdown, Vec::new(), now, now)
    }

    /// Create a document with file metadata (used by the CLI when loading from disk)
    pub fn with_file_info(title: String, markdown: String, filepath: String) -> Self {
        let mut doc = Self::new(title, markdown);
        doc.filepath = Some(filepath);
        doc
    }

    /// Rebuild a document from persisted parts
    pub fn from_parts(
        title: String,
        markdown: String,
        annotations: Vec<Annotation>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let parsed = codec::parse(&markdown);
        Self {
            title,
            filepath: None,
            markdown,
            parsed,
            annotations,
            created_at,
            updated_at,
        }
    }

    /// Tagged source text
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Displayed text, tags removed
    pub fn clean(&self) -> &str {
        &self.parsed.clean
    }

    pub fn marks(&self) -> &[Mark] {
        &self.parsed.marks
    }

    pub fn parsed(&self) -> &Parsed {
        &self.parsed
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: MarkId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn mark(&self, id: MarkId) -> Option<&Mark> {
        self.parsed.mark(id)
    }

    /// Next free id: one past the largest annotation or mark id. `None` once
    /// `MarkId::MAX` is taken.
    pub fn next_id(&self) -> Option<MarkId> {
        let max_annotation = self.annotations.iter().map(|a| a.id).max().unwrap_or(0);
        max_annotation.max(self.parsed.max_id()).checked_add(1)
    }

    /// Resolve `selection`, wrap it in a new mark and attach `note`.
    ///
    /// Either the tagged text and the annotation list both change, or
    /// neither does.
    pub fn add_annotation(
        &mut self,
        selection: &Selection,
        note: &str,
        fallback: Option<&dyn StructuralLocator>,
    ) -> Result<Mark, AnnotateError> {
        let text = selection.text.trim();
        if text.is_empty() {
            return Err(AnnotateError::EmptySelection);
        }
        let note = note.trim();
        if note.is_empty() {
            return Err(AnnotateError::EmptyNote);
        }

        let trimmed = Selection::new(text, selection.context.clone());
        let resolution =
            resolve::resolve(self.clean(), &trimmed, fallback).ok_or(AnnotateError::Unresolved)?;
        let range = resolution.range;
        resolve::validate(self.clean(), text, range)?;
        if let Some(existing) = self.mark_touching(range) {
            return Err(AnnotateError::Overlap { id: existing.id });
        }

        let id = self.next_id().ok_or(AnnotateError::IdExhausted)?;
        let markdown = codec::inject(&self.markdown, &self.parsed.index_map, range.start, range.end, id);
        let parsed = codec::parse(&markdown);
        let mark = match parsed.mark(id) {
            Some(mark) if mark.range == range => *mark,
            _ => {
                return Err(AnnotateError::InvalidPosition {
                    start: range.start,
                    end: range.end,
                    len: self.clean().len(),
                })
            }
        };

        self.markdown = markdown;
        self.parsed = parsed;
        self.annotations.push(Annotation::new(id, note));
        self.updated_at = Utc::now();

        tracing::info!(
            target: "inkmark::store",
            id,
            start = range.start,
            end = range.end,
            method = ?resolution.method,
            "annotation created"
        );
        Ok(mark)
    }

    /// Replace the note of annotation `id`
    pub fn edit_annotation(&mut self, id: MarkId, note: &str) -> Result<(), AnnotateError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(AnnotateError::EmptyNote);
        }
        let ann = self
            .annotations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AnnotateError::UnknownAnnotation(id))?;
        ann.note = note.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove annotation `id` and unwrap its mark tags
    pub fn remove_annotation(&mut self, id: MarkId) -> Option<Annotation> {
        let pos = self.annotations.iter().position(|a| a.id == id)?;
        let markdown = codec::delete_mark(&self.markdown, id);
        self.parsed = codec::parse(&markdown);
        self.markdown = markdown;
        self.updated_at = Utc::now();

        tracing::info!(target: "inkmark::store", id, "annotation deleted");
        Some(self.annotations.remove(pos))
    }

    /// Get annotations in document order; those without a mark come last
    pub fn annotations_sorted(&self) -> Vec<&Annotation> {
        let mut sorted: Vec<_> = self.annotations.iter().collect();
        sorted.sort_by_key(|a| self.mark(a.id).map_or(usize::MAX, Mark::start));
        sorted
    }

    /// Annotations whose mark is missing from the tagged text
    pub fn orphaned_annotations(&self) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| self.mark(a.id).is_none())
            .collect()
    }

    /// A mark that the start or end of `range` falls inside. Wrapping a whole
    /// mark is allowed and nests the tags.
    fn mark_touching(&self, range: TextRange) -> Option<&Mark> {
        self.parsed
            .marks
            .iter()
            .find(|m| m.range.contains(range.start) || m.range.contains(range.end - 1))
    }
}
