use crate::model::Mark;

use super::strip_tags;

/// Wrap each mark of `clean` in a highlight span for a markdown renderer
/// that passes raw HTML through.
///
/// A mark lying wholly inside another becomes a nested span. Marks that are
/// out of bounds, empty, split a character or cross the end of an enclosing
/// mark are left unwrapped.
pub fn highlight(clean: &str, marks: &[Mark], class: &str) -> String {
    let clean = strip_tags(clean);
    if marks.is_empty() {
        return clean;
    }

    // Outer marks open first when starts are equal.
    let mut ordered: Vec<&Mark> = marks.iter().collect();
    ordered.sort_by(|a, b| a.start().cmp(&b.start()).then(b.end().cmp(&a.end())));

    let mut out = String::with_capacity(clean.len() + marks.len() * 48);
    let mut cursor = 0;
    let mut open: Vec<usize> = Vec::new();
    for mark in ordered {
        if mark.range.is_empty() || mark.text(&clean).is_none() {
            continue;
        }
        while let Some(&end) = open.last().filter(|&&end| end <= mark.start()) {
            out.push_str(&clean[cursor..end]);
            out.push_str("</span>");
            cursor = end;
            open.pop();
        }
        if open.last().is_some_and(|&end| end < mark.end()) {
            continue;
        }
        out.push_str(&clean[cursor..mark.start()]);
        out.push_str(&format!(r#"<span class="{class}" data-id="{}">"#, mark.id));
        cursor = mark.start();
        open.push(mark.end());
    }
    while let Some(end) = open.pop() {
        out.push_str(&clean[cursor..end]);
        out.push_str("</span>");
        cursor = end;
    }
    out.push_str(&clean[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse;

    #[test]
    fn test_wraps_marks_in_order() {
        let parsed = parse("See <mark_1>foo</mark_1> and <mark_2>foo</mark_2> again.");
        let html = highlight(&parsed.clean, &parsed.marks, "annotation-highlight");
        assert_eq!(
            html,
            concat!(
                r#"See <span class="annotation-highlight" data-id="1">foo</span>"#,
                r#" and <span class="annotation-highlight" data-id="2">foo</span> again."#
            )
        );
    }

    #[test]
    fn test_skips_overlapping_and_out_of_range() {
        let clean = "abcdef";
        let marks = [Mark::new(1, 0, 3), Mark::new(2, 2, 5), Mark::new(3, 4, 40)];
        let html = highlight(clean, &marks, "hl");
        assert_eq!(html, r#"<span class="hl" data-id="1">abc</span>def"#);
    }

    #[test]
    fn test_nested_marks_become_nested_spans() {
        let parsed = parse("<mark_2>See <mark_1>foo</mark_1> and</mark_2> more");
        let html = highlight(&parsed.clean, &parsed.marks, "hl");
        assert_eq!(
            html,
            concat!(
                r#"<span class="hl" data-id="2">See "#,
                r#"<span class="hl" data-id="1">foo</span> and</span> more"#
            )
        );
    }

    #[test]
    fn test_same_range_marks_nest() {
        // Equal ranges keep parse order.
        let parsed = parse("<mark_1><mark_2>ab</mark_2></mark_1>c");
        let html = highlight(&parsed.clean, &parsed.marks, "hl");
        assert_eq!(
            html,
            r#"<span class="hl" data-id="2"><span class="hl" data-id="1">ab</span></span>c"#
        );
    }

    #[test]
    fn test_without_marks_returns_clean() {
        assert_eq!(highlight("plain", &[], "hl"), "plain");
    }
}
