//! End-to-end behaviour of the codec, resolver and store together.

use inkmark_core::codec::{delete_mark, inject, parse};
use inkmark_core::resolve::locate;
use inkmark_core::{
    Annotation, AnnotateError, Document, Mark, Selection, SelectionContext, Session, Snapshot, TextRange,
};
use rstest::rstest;

/// Rebuild tagged text from its clean text by injecting each mark in order.
fn reinject(tagged: &str) -> String {
    let parsed = parse(tagged);
    let mut rebuilt = parsed.clean.clone();
    for mark in &parsed.marks {
        let current = parse(&rebuilt);
        rebuilt = inject(&rebuilt, &current.index_map, mark.start(), mark.end(), mark.id);
    }
    rebuilt
}

#[rstest]
#[case::single("See <mark_1>foo</mark_1> and foo again.")]
#[case::two_marks("a <mark_1>b</mark_1> c <mark_2>d</mark_2>")]
#[case::adjacent("<mark_1>a</mark_1><mark_2>b</mark_2>")]
#[case::whole_document("<mark_7>everything here</mark_7>")]
#[case::multiline("intro\n\n<mark_3>first\nsecond</mark_3>\n\nend")]
#[case::multibyte("héllo <mark_2>wörld</mark_2> 😀")]
fn test_round_trip(#[case] tagged: &str) {
    assert_eq!(reinject(tagged), tagged);
}

#[rstest]
#[case("See <mark_1>foo</mark_1> and foo again.")]
#[case("<mark_1>outer <mark_2>inner</mark_2></mark_1>")]
#[case("</mark_5> stray and <mark_6>dangling")]
fn test_clean_text_has_no_markers(#[case] tagged: &str) {
    let clean = parse(tagged).clean;
    assert!(parse(&clean).marks.is_empty());
}

#[test]
fn test_disambiguates_second_cat() {
    let clean = "A cat sat. A cat ran.";
    let range = locate(clean, "cat", &SelectionContext::new("A ", " ran")).unwrap();
    assert_eq!(range, TextRange::new(13, 16));
}

#[test]
fn test_single_occurrence_needs_no_context() {
    let clean = "the quick brown fox";
    let range = locate(clean, "brown", &SelectionContext::default()).unwrap();
    assert_eq!(range, TextRange::new(10, 15));
}

#[test]
fn test_absent_text_is_not_found() {
    let clean = "A cat sat. A cat ran.";
    assert_eq!(locate(clean, "zzz", &SelectionContext::new("A ", " ran")), None);
}

#[test]
fn test_injection_wraps_whole_document() {
    let tagged = "plain *markdown* text";
    let parsed = parse(tagged);
    let out = inject(tagged, &parsed.index_map, 0, parsed.clean.len(), 1);
    assert_eq!(out, "<mark_1>plain *markdown* text</mark_1>");
}

#[test]
fn test_create_then_delete_restores_text() {
    let original = "See <mark_1>foo</mark_1> and foo again.";
    let mut doc = Document::from_parts(
        "doc".to_string(),
        original.to_string(),
        vec![Annotation::new(1, "first")],
        chrono::Utc::now(),
        chrono::Utc::now(),
    );
    let selection = Selection::new("foo", SelectionContext::new("and ", " again"));
    let mark = doc.add_annotation(&selection, "second", None).unwrap();

    let removed = doc.remove_annotation(mark.id).unwrap();
    assert_eq!(removed.note, "second");
    assert_eq!(doc.markdown(), original);
    assert_eq!(doc.annotations(), &[Annotation::new(1, "first")]);
    assert_eq!(delete_mark(original, 1), "See foo and foo again.");
}

#[test]
fn test_unmatched_close_tag_is_tolerated() {
    let parsed = parse("text </mark_5> more");
    assert!(parsed.mark(5).is_none());
    assert!(parsed.marks.is_empty());
}

#[test]
fn test_end_to_end_second_foo() {
    let tagged = "See <mark_1>foo</mark_1> and foo again.";
    let parsed = parse(tagged);
    assert_eq!(parsed.clean, "See foo and foo again.");
    assert_eq!(parsed.marks, vec![Mark::new(1, 4, 7)]);

    let mut session = Session::default();
    session.load_document(Document::from_parts(
        "doc".to_string(),
        tagged.to_string(),
        vec![Annotation::new(1, "first")],
        chrono::Utc::now(),
        chrono::Utc::now(),
    ));
    assert!(session.select("foo", SelectionContext::new("and ", " again")));
    let mark = session.confirm("second", None).unwrap();
    assert_eq!(mark, Mark::new(2, 12, 15));

    let doc = session.document.as_ref().unwrap();
    assert_eq!(
        doc.markdown(),
        "See <mark_1>foo</mark_1> and <mark_2>foo</mark_2> again."
    );
    assert_eq!(
        doc.annotations(),
        &[Annotation::new(1, "first"), Annotation::new(2, "second")]
    );
}

#[test]
fn test_rejected_selection_changes_nothing() {
    let mut session = Session::default();
    session.load_document(Document::new("doc".to_string(), "x cat y. x cat y.".to_string()));
    session.select("cat", SelectionContext::new("q", "w"));

    assert_eq!(session.confirm("note", None), Err(AnnotateError::Unresolved));
    let doc = session.document.as_ref().unwrap();
    assert_eq!(doc.markdown(), "x cat y. x cat y.");
    assert!(doc.annotations().is_empty());
}

#[test]
fn test_snapshot_survives_reload() {
    let mut session = Session::default();
    session.load_document(Document::new("doc".to_string(), "one two three".to_string()));
    session.select("two", SelectionContext::default());
    session.confirm("middle", None).unwrap();

    let json = session.flush_save().unwrap().to_json().unwrap();
    let restored = Snapshot::from_json(&json).unwrap().into_document("doc".to_string());
    assert_eq!(restored.markdown(), "one <mark_1>two</mark_1> three");
    assert_eq!(restored.mark(1).and_then(|m| m.text(restored.clean())), Some("two"));
    assert_eq!(restored.annotation(1).map(|a| a.note.as_str()), Some("middle"));
}
