use chrono::{DateTime, Utc};

use crate::config::AnnotatorConfig;
use crate::error::AnnotateError;
use crate::export::Snapshot;
use crate::model::{Document, Mark, MarkId, TextRange};
use crate::persist::Debouncer;
use crate::resolve::{Selection, SelectionContext, StructuralLocator};

/// Platform-agnostic annotation session.
///
/// Owns the open document, the selection waiting for a note, and the
/// debounced save. Front ends feed it selection events and mutation
/// requests; nothing here touches a terminal or the DOM.
pub struct Session {
    pub document: Option<Document>,
    pub config: AnnotatorConfig,

    // Selection captured at select time, consumed by confirm
    pending: Option<Selection>,

    saver: Debouncer<Snapshot>,

    // Status message
    pub status_message: Option<String>,
}

impl Session {
    pub fn new(config: AnnotatorConfig) -> Self {
        Self {
            document: None,
            saver: Debouncer::from_millis(config.debounce_ms),
            config,
            pending: None,
            status_message: None,
        }
    }

    pub fn load_document(&mut self, doc: Document) {
        self.document = Some(doc);
        self.pending = None;
        self.saver.cancel();
    }

    /// Record a selection event. Whitespace-only selections are ignored.
    pub fn select(&mut self, text: &str, context: SelectionContext) -> bool {
        if text.trim().is_empty() {
            self.pending = None;
            return false;
        }
        self.pending = Some(Selection::new(text, context));
        true
    }

    /// Select a range of the clean text, capturing its context.
    pub fn select_range(&mut self, range: TextRange) -> bool {
        let Some(doc) = self.document.as_ref() else {
            return false;
        };
        let Some(text) = range.slice(doc.clean()) else {
            return false;
        };
        let context = SelectionContext::capture(doc.clean(), range, self.config.context_window);
        let text = text.to_string();
        self.select(&text, context)
    }

    pub fn pending_selection(&self) -> Option<&Selection> {
        self.pending.as_ref()
    }

    pub fn cancel_selection(&mut self) {
        self.pending = None;
    }

    /// Attach `note` to the pending selection.
    ///
    /// The pending selection is consumed whether or not the mark is created.
    pub fn confirm(
        &mut self,
        note: &str,
        fallback: Option<&dyn StructuralLocator>,
    ) -> Result<Mark, AnnotateError> {
        let selection = self.pending.take().ok_or(AnnotateError::NoPendingSelection)?;
        let doc = self.document.as_mut().ok_or(AnnotateError::NoDocument)?;

        match doc.add_annotation(&selection, note, fallback) {
            Ok(mark) => {
                self.set_status("Annotation added");
                self.schedule_save();
                Ok(mark)
            }
            Err(err) => {
                tracing::warn!(target: "inkmark::store", error = %err, selected = %selection.text, "annotation rejected");
                self.set_status(&err.to_string());
                Err(err)
            }
        }
    }

    pub fn edit_annotation(&mut self, id: MarkId, note: &str) -> Result<(), AnnotateError> {
        let doc = self.document.as_mut().ok_or(AnnotateError::NoDocument)?;
        if let Err(err) = doc.edit_annotation(id, note) {
            tracing::warn!(target: "inkmark::store", id, error = %err, "edit rejected");
            self.set_status(&err.to_string());
            return Err(err);
        }
        self.set_status("Annotation updated");
        self.schedule_save();
        Ok(())
    }

    /// Delete annotation `id` and its mark. Unknown ids are ignored.
    pub fn delete_annotation(&mut self, id: MarkId) -> bool {
        let Some(doc) = self.document.as_mut() else {
            return false;
        };
        if doc.remove_annotation(id).is_none() {
            return false;
        }
        self.set_status("Annotation deleted");
        self.schedule_save();
        true
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.document
            .as_ref()
            .map(|doc| Snapshot::from_document(doc, &self.config.snapshot_version))
    }

    fn schedule_save(&mut self) {
        if let Some(snapshot) = self.snapshot() {
            self.saver.schedule(snapshot, Utc::now());
        }
    }

    /// Snapshot to persist, once the debounce delay has elapsed at `now`
    pub fn poll_save(&mut self, now: DateTime<Utc>) -> Option<Snapshot> {
        self.saver.poll(now)
    }

    /// Pending snapshot regardless of the deadline
    pub fn flush_save(&mut self) -> Option<Snapshot> {
        self.saver.flush()
    }

    pub fn save_pending(&self) -> bool {
        self.saver.is_pending()
    }

    /// Set status message
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
    }

    /// Get title for display
    pub fn title(&self) -> String {
        self.document
            .as_ref()
            .map(|d| d.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AnnotatorConfig::default())
    }
}
