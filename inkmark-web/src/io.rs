//! Browser-based file I/O using Web APIs

use wasm_bindgen::prelude::*;
use web_sys::{Blob, HtmlAnchorElement, Storage, Url};

/// Download JSON as a file
pub fn download_json(filename: &str, json: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    // Create a blob from the JSON content
    let blob_parts = js_sys::Array::new();
    blob_parts.push(&JsValue::from_str(json));

    let blob_options = web_sys::BlobPropertyBag::new();
    blob_options.set_type("application/json");

    let blob = Blob::new_with_str_sequence_and_options(&blob_parts, &blob_options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    Url::revoke_object_url(&url)?;

    Ok(())
}

fn local_storage() -> Result<Storage, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    Ok(window.local_storage()?.ok_or("No localStorage")?)
}

/// Save a snapshot to localStorage
pub fn save_to_storage(key: &str, json: &str) -> Result<(), JsValue> {
    local_storage()?.set_item(key, json)
}

/// Load a snapshot from localStorage
pub fn load_from_storage(key: &str) -> Result<Option<String>, JsValue> {
    local_storage()?.get_item(key)
}
