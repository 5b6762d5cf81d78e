//! Inkmark Web - WebAssembly binding for the markdown annotation engine
//!
//! Exposes an [`Annotator`] class to JavaScript. Offsets crossing this
//! boundary are UTF-16 code units, as the DOM counts them.

use chrono::DateTime;
use serde_json::json;
use wasm_bindgen::prelude::*;

use inkmark_core::codec;
use inkmark_core::offsets::{byte_to_utf16, utf16_to_byte};
use inkmark_core::{
    Annotation, AnnotatorConfig, Document, MarkId, SelectionContext, Session, Snapshot, StructuralLocator,
    TextRange,
};

mod dom;
pub mod io;

pub use dom::{DomLocator, SELECTION_MARKER_ATTR};

/// Install the panic hook
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"Inkmark WASM initialized".into());
    Ok(())
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct Annotator {
    session: Session,
}

#[wasm_bindgen]
impl Annotator {
    /// Open tagged markdown with an optional JSON array of annotations
    #[wasm_bindgen(constructor)]
    pub fn new(markdown: &str, annotations_json: Option<String>) -> Result<Annotator, JsValue> {
        let annotations: Vec<Annotation> = match annotations_json {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(&json).map_err(js_error)?,
            _ => Vec::new(),
        };
        let now = chrono::Utc::now();
        let doc = Document::from_parts(String::new(), markdown.to_string(), annotations, now, now);
        Ok(Self::with_document(doc, AnnotatorConfig::default()))
    }

    /// Restore from snapshot JSON
    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(json: &str) -> Result<Annotator, JsValue> {
        let snapshot = Snapshot::from_json(json).map_err(js_error)?;
        Ok(Self::with_document(
            snapshot.into_document(String::new()),
            AnnotatorConfig::default(),
        ))
    }

    /// Restore the snapshot saved under `key` in localStorage
    #[wasm_bindgen(js_name = loadLocal)]
    pub fn load_local(key: &str) -> Result<Option<Annotator>, JsValue> {
        match io::load_from_storage(key)? {
            Some(json) => Self::from_snapshot(&json).map(Some),
            None => Ok(None),
        }
    }

    /// Replace settings from a JSON config object
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, json: &str) -> Result<(), JsValue> {
        let config = AnnotatorConfig::from_json(json).map_err(js_error)?;
        let doc = self.session.document.take();
        self.session = Session::new(config);
        if let Some(doc) = doc {
            self.session.load_document(doc);
        }
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn markdown(&self) -> String {
        self.doc().map(|d| d.markdown().to_string()).unwrap_or_default()
    }

    #[wasm_bindgen(getter)]
    pub fn clean(&self) -> String {
        self.doc().map(|d| d.clean().to_string()).unwrap_or_default()
    }

    /// Clean text with highlight spans, ready for a markdown renderer
    #[wasm_bindgen(getter)]
    pub fn highlighted(&self) -> String {
        self.doc()
            .map(|d| codec::highlight(d.clean(), d.marks(), &self.session.config.highlight_class))
            .unwrap_or_default()
    }

    /// Marks as JSON `[{id, start, end}]` in UTF-16 offsets
    #[wasm_bindgen(getter)]
    pub fn marks(&self) -> String {
        let Some(doc) = self.doc() else {
            return "[]".to_string();
        };
        let clean = doc.clean();
        let marks: Vec<_> = doc
            .marks()
            .iter()
            .map(|m| {
                json!({
                    "id": m.id,
                    "start": byte_to_utf16(clean, m.start()),
                    "end": byte_to_utf16(clean, m.end()),
                })
            })
            .collect();
        serde_json::Value::from(marks).to_string()
    }

    /// Annotations as JSON `[{id, note}]`
    #[wasm_bindgen(getter)]
    pub fn annotations(&self) -> String {
        let annotations = self.doc().map(Document::annotations).unwrap_or_default();
        serde_json::to_string(annotations).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> Option<String> {
        self.session.status_message.clone()
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let snapshot = self.session.snapshot().ok_or("No document")?;
        snapshot.to_json().map_err(js_error)
    }

    /// Record a selection event from the page
    pub fn select(&mut self, text: &str, before: &str, after: &str) -> bool {
        self.session.select(text, SelectionContext::new(before, after))
    }

    /// Select clean text `[start, end)` given in UTF-16 offsets
    #[wasm_bindgen(js_name = selectRange)]
    pub fn select_range(&mut self, start: usize, end: usize) -> bool {
        let Some(clean) = self.doc().map(|d| d.clean().to_string()) else {
            return false;
        };
        let range = TextRange::new(utf16_to_byte(&clean, start), utf16_to_byte(&clean, end));
        self.session.select_range(range)
    }

    #[wasm_bindgen(js_name = cancelSelection)]
    pub fn cancel_selection(&mut self) {
        self.session.cancel_selection();
    }

    /// Attach `note` to the pending selection, returning the new id.
    ///
    /// When `container` is given and the selection cannot be settled from
    /// its text and context, the selection marker inside `container` is
    /// measured instead.
    pub fn confirm(&mut self, note: &str, container: Option<web_sys::Element>) -> Result<MarkId, JsValue> {
        let locator = container.map(DomLocator::new);
        let fallback = locator.as_ref().map(|l| l as &dyn StructuralLocator);
        match self.session.confirm(note, fallback) {
            Ok(mark) => Ok(mark.id),
            Err(err) => {
                web_sys::console::warn_1(&format!("Annotation rejected: {err}").into());
                Err(js_error(err))
            }
        }
    }

    pub fn edit(&mut self, id: MarkId, note: &str) -> Result<(), JsValue> {
        self.session.edit_annotation(id, note).map_err(js_error)
    }

    pub fn remove(&mut self, id: MarkId) -> bool {
        self.session.delete_annotation(id)
    }

    /// Snapshot JSON to persist once the debounce delay has passed at `now_ms`
    #[wasm_bindgen(js_name = pollSave)]
    pub fn poll_save(&mut self, now_ms: f64) -> Option<String> {
        let now = DateTime::from_timestamp_millis(now_ms as i64)?;
        let snapshot = self.session.poll_save(now)?;
        snapshot.to_json().ok()
    }

    /// Pending snapshot JSON regardless of the deadline
    #[wasm_bindgen(js_name = flushSave)]
    pub fn flush_save(&mut self) -> Option<String> {
        self.session.flush_save()?.to_json().ok()
    }

    /// Write the current snapshot to localStorage under `key`
    #[wasm_bindgen(js_name = saveLocal)]
    pub fn save_local(&self, key: &str) -> Result<(), JsValue> {
        io::save_to_storage(key, &self.snapshot_json()?)
    }

    /// Trigger a download of the current snapshot
    pub fn download(&self, filename: &str) -> Result<(), JsValue> {
        io::download_json(filename, &self.snapshot_json()?)
    }
}

impl Annotator {
    fn with_document(doc: Document, config: AnnotatorConfig) -> Self {
        let mut session = Session::new(config);
        session.load_document(doc);
        Self { session }
    }

    fn doc(&self) -> Option<&Document> {
        self.session.document.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_use_utf16_offsets() {
        let annotator = Annotator::new("😀 <mark_1>hi</mark_1>", None).unwrap();
        assert_eq!(annotator.clean(), "😀 hi");
        assert_eq!(annotator.marks(), r#"[{"end":5,"id":1,"start":3}]"#);
    }

    #[test]
    fn test_select_range_in_utf16() {
        let mut annotator = Annotator::new("é cat é cat", None).unwrap();
        assert!(annotator.select_range(8, 11));
        assert_eq!(annotator.session.pending_selection().unwrap().text, "cat");
        let id = annotator.session.confirm("second", None).unwrap().id;
        assert_eq!(id, 1);
        assert_eq!(annotator.markdown(), "é cat é <mark_1>cat</mark_1>");
    }

    #[test]
    fn test_annotations_round_trip() {
        let annotator = Annotator::new("<mark_1>a</mark_1>", Some(r#"[{"id":1,"note":"n"}]"#.to_string())).unwrap();
        assert_eq!(annotator.annotations(), r#"[{"id":1,"note":"n"}]"#);
    }
}
