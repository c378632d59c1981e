//! Character-level refinement of replaced lines.
//!
//! When a hunk replaces `k` old lines with `m` new lines, the first
//! `min(k, m)` lines of each side are paired by position and aligned
//! character by character with the same greedy longest-match algorithm used
//! for lines. Surplus lines on either side keep their whole-line tag and get
//! no spans.

use dirdelta_types::DiffSpanKind;
use serde::{Deserialize, Serialize};

use crate::error::Interrupted;
use crate::matcher::{never, Opcode, SequenceMatcher};
use crate::unified::Hunk;

/// A run of characters sharing one tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineSpan {
    pub kind: DiffSpanKind,
    pub text: String,
}

/// Character alignment of one old line against one new line.
///
/// `old` uses `Equal`, `Delete`, and `Replace`; `new` uses `Equal`, `Insert`,
/// and `Replace`. Concatenating the span texts of a side gives back that
/// side's line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineDiff {
    pub old: Vec<InlineSpan>,
    pub new: Vec<InlineSpan>,
}

impl InlineDiff {
    /// Per-character tags of the old line.
    pub fn old_tags(&self) -> Vec<DiffSpanKind> {
        char_tags(&self.old)
    }

    /// Per-character tags of the new line.
    pub fn new_tags(&self) -> Vec<DiffSpanKind> {
        char_tags(&self.new)
    }
}

/// Expand spans into one tag per character.
pub fn char_tags(spans: &[InlineSpan]) -> Vec<DiffSpanKind> {
    spans
        .iter()
        .flat_map(|span| std::iter::repeat(span.kind).take(span.text.chars().count()))
        .collect()
}

/// Align two lines character by character.
///
/// The popular-item heuristic is disabled here: on long lines it would junk
/// spaces and common letters and leave almost nothing to anchor on.
pub fn intraline(old: &str, new: &str) -> InlineDiff {
    intraline_until(old, new, &never).unwrap_or_default()
}

/// [`intraline`], abandoned when `stop` returns `true`.
///
/// Alignment without the popular-item heuristic is quadratic in line
/// length, so a long line pair can take far longer than the rest of a file.
pub fn intraline_until(old: &str, new: &str, stop: &dyn Fn() -> bool) -> Result<InlineDiff, Interrupted> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    let matcher = SequenceMatcher::with_autojunk(&a, &b, false);

    let mut diff = InlineDiff::default();
    for op in matcher.diff_ops_until(stop)?.iter().map(Opcode::from) {
        let old_chars = &a[op.old.clone()];
        let new_chars = &b[op.new.clone()];
        match op.tag {
            DiffSpanKind::Equal => {
                push_span(&mut diff.old, DiffSpanKind::Equal, old_chars);
                push_span(&mut diff.new, DiffSpanKind::Equal, new_chars);
            }
            DiffSpanKind::Delete => push_span(&mut diff.old, DiffSpanKind::Delete, old_chars),
            DiffSpanKind::Insert => push_span(&mut diff.new, DiffSpanKind::Insert, new_chars),
            DiffSpanKind::Replace => {
                push_span(&mut diff.old, DiffSpanKind::Replace, old_chars);
                push_span(&mut diff.new, DiffSpanKind::Replace, new_chars);
            }
        }
    }
    Ok(diff)
}

fn push_span(spans: &mut Vec<InlineSpan>, kind: DiffSpanKind, chars: &[char]) {
    if chars.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.kind == kind => last.text.extend(chars),
        _ => spans.push(InlineSpan {
            kind,
            text: chars.iter().collect(),
        }),
    }
}

/// Attach intraline spans to every positionally paired replace line in
/// `hunk`. Returns the number of pairs refined.
pub fn refine_hunk(hunk: &mut Hunk) -> usize {
    refine_hunk_until(hunk, &never).unwrap_or_default()
}

/// [`refine_hunk`], abandoned when `stop` returns `true`. Pairs refined
/// before the interruption keep their spans.
pub fn refine_hunk_until(hunk: &mut Hunk, stop: &dyn Fn() -> bool) -> Result<usize, Interrupted> {
    let mut cursor = 0;
    let mut refined = 0;

    for op in &hunk.ops {
        let old_len = op.old.len();
        let new_len = op.new.len();
        match op.tag {
            DiffSpanKind::Equal | DiffSpanKind::Delete => cursor += old_len,
            DiffSpanKind::Insert => cursor += new_len,
            DiffSpanKind::Replace => {
                for k in 0..old_len.min(new_len) {
                    let del = cursor + k;
                    let ins = cursor + old_len + k;
                    let diff = intraline_until(&hunk.lines[del].text, &hunk.lines[ins].text, stop)?;
                    hunk.lines[del].inline = Some(diff.old);
                    hunk.lines[ins].inline = Some(diff.new);
                    refined += 1;
                }
                cursor += old_len + new_len;
            }
        }
    }

    Ok(refined)
}
