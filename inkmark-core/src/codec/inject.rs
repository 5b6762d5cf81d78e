use std::sync::OnceLock;

use regex::Regex;

use crate::model::MarkId;

pub fn open_tag(id: MarkId) -> String {
    format!("<mark_{id}>")
}

pub fn close_tag(id: MarkId) -> String {
    format!("</mark_{id}>")
}

/// Wrap clean range `[start, end)` of `tagged` in a `<mark_{id}>` pair.
///
/// `index_map` must come from parsing `tagged`. Offsets past the end of the
/// map resolve to the end of `tagged`; an `end` before `start` collapses to
/// an empty pair at `start`.
pub fn inject(tagged: &str, index_map: &[usize], start: usize, end: usize, id: MarkId) -> String {
    let start_raw = index_map.get(start).copied().unwrap_or(tagged.len());
    let end_raw = if end == 0 {
        0
    } else {
        index_map.get(end).copied().unwrap_or(tagged.len())
    };
    let end_raw = end_raw.max(start_raw);

    let start_raw = floor_char_boundary(tagged, start_raw);
    let end_raw = floor_char_boundary(tagged, end_raw);

    let open = open_tag(id);
    let close = close_tag(id);
    let mut out = String::with_capacity(tagged.len() + open.len() + close.len());
    out.push_str(&tagged[..start_raw]);
    out.push_str(&open);
    out.push_str(&tagged[start_raw..end_raw]);
    out.push_str(&close);
    out.push_str(&tagged[end_raw..]);
    out
}

/// Remove every `<mark_{id}>…</mark_{id}>` pair, keeping the enclosed text.
///
/// Matching is non-greedy, so repeated pairs for the same id are each
/// unwrapped on their own.
pub fn delete_mark(tagged: &str, id: MarkId) -> String {
    let pattern = format!(r"(?s)<mark_{id}>(.*?)</mark_{id}>");
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(tagged, "$1").into_owned(),
        Err(err) => {
            // The pattern only interpolates digits.
            tracing::error!(target: "inkmark::codec", %err, "invalid mark pattern");
            tagged.to_string()
        }
    }
}

/// Remove every marker tag regardless of pairing.
pub fn strip_tags(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let re = TAGS.get_or_init(|| Regex::new(r"</?mark_\d+>").expect("static pattern"));
    re.replace_all(text, "").into_owned()
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
