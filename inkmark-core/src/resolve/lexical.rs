//! Context scoring over repeated occurrences of the selected text.

use crate::model::TextRange;

use super::context::{head_chars, normalize_whitespace, tail_chars, SelectionContext};

/// Minimum window, in chars, read around each candidate occurrence.
const CANDIDATE_WINDOW: usize = 100;

/// Context evidence below this many chars is "partial" for acceptance.
const MIN_EVIDENCE: usize = 3;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    range: TextRange,
    before_score: usize,
    after_score: usize,
}

impl Candidate {
    fn total(&self) -> usize {
        self.before_score + self.after_score
    }

    fn is_balanced(&self) -> bool {
        self.before_score > 0 && self.after_score > 0
    }

    /// Higher total wins; on a tie, two-sided evidence beats one-sided.
    fn beats(&self, best: &Candidate) -> bool {
        self.total() > best.total()
            || (self.total() == best.total() && self.is_balanced() && !best.is_balanced())
    }
}

/// Find the occurrence of `selected` in `clean` that `context` points at.
///
/// Returns `None` when `selected` is empty or absent, or when several
/// occurrences exist and none has enough context evidence.
pub fn locate(clean: &str, selected: &str, context: &SelectionContext) -> Option<TextRange> {
    if selected.is_empty() {
        return None;
    }

    let occurrences: Vec<usize> = clean.match_indices(selected).map(|(i, _)| i).collect();
    if occurrences.is_empty() {
        tracing::debug!(target: "inkmark::resolve", selected, "selected text not found");
        return None;
    }

    let wanted_before = normalize_whitespace(&context.before);
    let wanted_after = normalize_whitespace(&context.after);
    let wanted_before_len = wanted_before.chars().count();
    let wanted_after_len = wanted_after.chars().count();
    let before_window = context.before.chars().count().max(CANDIDATE_WINDOW);
    let after_window = context.after.chars().count().max(CANDIDATE_WINDOW);

    let mut best: Option<Candidate> = None;
    for &start in &occurrences {
        let end = start + selected.len();
        let found_before = normalize_whitespace(tail_chars(&clean[..start], before_window));
        let found_after = normalize_whitespace(head_chars(&clean[end..], after_window));

        let candidate = Candidate {
            range: TextRange::new(start, end),
            before_score: common_suffix_len(&found_before, &wanted_before),
            after_score: common_prefix_len(&found_after, &wanted_after),
        };

        if candidate.before_score == wanted_before_len && candidate.after_score == wanted_after_len {
            tracing::debug!(
                target: "inkmark::resolve",
                start,
                end,
                candidates = occurrences.len(),
                "exact context match"
            );
            return Some(candidate.range);
        }

        best = match best {
            Some(current) if !candidate.beats(&current) => Some(current),
            _ => Some(candidate),
        };
    }

    let best = best?;
    let accepted = (best.before_score >= wanted_before_len.min(MIN_EVIDENCE)
        && best.after_score >= wanted_after_len.min(MIN_EVIDENCE))
        || best.is_balanced()
        || occurrences.len() == 1;

    tracing::debug!(
        target: "inkmark::resolve",
        start = best.range.start,
        before_score = best.before_score,
        after_score = best.after_score,
        candidates = occurrences.len(),
        accepted,
        "best context match"
    );
    accepted.then_some(best.range)
}

fn common_suffix_len(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}
