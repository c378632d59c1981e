//! Line-level unified diff.
//!
//! Lines are aligned with [`SequenceMatcher`], the opcodes are grouped into
//! hunks with `similar::group_diff_ops`, and each group is expanded into
//! tagged lines by [`hunk_from_group`].

use dirdelta_types::DiffSpanKind;
use serde::{Deserialize, Serialize};
use similar::{group_diff_ops, DiffOp};

use crate::error::{DiffError, DiffResult, Interrupted};
use crate::intraline::{self, InlineSpan};
use crate::matcher::{never, Opcode, SequenceMatcher};

/// Default number of unchanged lines kept around each change.
pub const DEFAULT_CONTEXT: usize = 3;

/// The line diff of two texts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    /// The diff hunks.
    pub hunks: Vec<Hunk>,
    /// Total number of lines in the old content.
    pub old_lines: usize,
    /// Total number of lines in the new content.
    pub new_lines: usize,
}

impl LineDiff {
    /// Returns `true` if the two texts have the same lines.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total number of lines added across all hunks.
    pub fn additions(&self) -> usize {
        self.hunks.iter().map(Hunk::additions).sum()
    }

    /// Total number of lines removed across all hunks.
    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(Hunk::deletions).sum()
    }
}

/// A contiguous region of changes plus surrounding context.
///
/// Start numbers follow the unified-diff convention: 1-based, except that a
/// side with a zero count reports the line preceding the gap (`0` when the
/// gap is at the top of the file).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// The grouped opcodes this hunk was built from, with 0-based ranges.
    pub ops: Vec<Opcode>,
    /// The individual diff lines, in output order.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// The `@@ -a,b +c,d @@` header line. Counts of 1 are omitted.
    pub fn header(&self) -> String {
        format!(
            "@@ -{} +{} @@",
            format_range(self.old_start, self.old_count),
            format_range(self.new_start, self.new_count)
        )
    }

    /// 0-based index in the old sequence where this hunk begins.
    pub fn old_index(&self) -> usize {
        if self.old_count == 0 {
            self.old_start
        } else {
            self.old_start - 1
        }
    }

    /// 0-based index in the new sequence where this hunk begins.
    pub fn new_index(&self) -> usize {
        if self.new_count == 0 {
            self.new_start
        } else {
            self.new_start - 1
        }
    }

    /// Number of inserted lines.
    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind == DiffSpanKind::Insert)
            .count()
    }

    /// Number of deleted lines.
    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind == DiffSpanKind::Delete)
            .count()
    }

    /// Number of unchanged context lines.
    pub fn context_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind == DiffSpanKind::Equal)
            .count()
    }
}

fn format_range(start: usize, count: usize) -> String {
    if count == 1 {
        format!("{start}")
    } else {
        format!("{start},{count}")
    }
}

/// A single line in a hunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// `Equal` (context), `Delete`, or `Insert`.
    pub kind: DiffSpanKind,
    /// 1-based line number in the old content, if the line exists there.
    pub old_lineno: Option<usize>,
    /// 1-based line number in the new content, if the line exists there.
    pub new_lineno: Option<usize>,
    /// Line text including its terminator.
    pub text: String,
    /// Character-level spans, set when the line is paired in a replace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<Vec<InlineSpan>>,
}

impl DiffLine {
    fn context(text: &str, old: usize, new: usize) -> Self {
        Self {
            kind: DiffSpanKind::Equal,
            old_lineno: Some(old + 1),
            new_lineno: Some(new + 1),
            text: text.to_string(),
            inline: None,
        }
    }

    fn deleted(text: &str, old: usize) -> Self {
        Self {
            kind: DiffSpanKind::Delete,
            old_lineno: Some(old + 1),
            new_lineno: None,
            text: text.to_string(),
            inline: None,
        }
    }

    fn inserted(text: &str, new: usize) -> Self {
        Self {
            kind: DiffSpanKind::Insert,
            old_lineno: None,
            new_lineno: Some(new + 1),
            text: text.to_string(),
            inline: None,
        }
    }

    /// The line text without its trailing `\n` / `\r\n`.
    pub fn content(&self) -> &str {
        let text = self.text.strip_suffix('\n').unwrap_or(&self.text);
        text.strip_suffix('\r').unwrap_or(text)
    }

    /// The unified-diff prefix character for this line.
    pub fn prefix(&self) -> char {
        match self.kind {
            DiffSpanKind::Insert => '+',
            DiffSpanKind::Delete => '-',
            _ => ' ',
        }
    }
}

/// Split text into lines, keeping each line's `\n` terminator.
///
/// A final line without a terminator is kept as-is; empty text has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Grouped unified diff of two line sequences, without intraline spans.
///
/// Identical input yields no hunks. When one side is empty the single hunk
/// spans the whole other side with no context.
pub fn unified_diff<S: AsRef<str>>(a: &[S], b: &[S], context: usize) -> Vec<Hunk> {
    unified_diff_until(a, b, context, &never).unwrap_or_default()
}

/// [`unified_diff`], abandoned when `stop` returns `true`.
pub fn unified_diff_until<S: AsRef<str>>(
    a: &[S],
    b: &[S],
    context: usize,
    stop: &dyn Fn() -> bool,
) -> Result<Vec<Hunk>, Interrupted> {
    let a: Vec<&str> = a.iter().map(|l| l.as_ref()).collect();
    let b: Vec<&str> = b.iter().map(|l| l.as_ref()).collect();

    let ops = SequenceMatcher::new(&a, &b).diff_ops_until(stop)?;
    Ok(group_diff_ops(ops, context)
        .iter()
        .map(|group| hunk_from_group(group, &a, &b))
        .collect())
}

/// Line diff of two texts with every replace pair refined at character
/// level.
pub fn diff_text(old: &str, new: &str, context: usize) -> LineDiff {
    diff_text_until(old, new, context, &never).unwrap_or_else(|Interrupted| LineDiff {
        hunks: Vec::new(),
        old_lines: 0,
        new_lines: 0,
    })
}

/// [`diff_text`], polling `stop` throughout line matching and intraline
/// refinement.
pub fn diff_text_until(
    old: &str,
    new: &str,
    context: usize,
    stop: &dyn Fn() -> bool,
) -> Result<LineDiff, Interrupted> {
    let a = split_lines(old);
    let b = split_lines(new);
    let mut hunks = unified_diff_until(&a, &b, context, stop)?;
    for hunk in &mut hunks {
        intraline::refine_hunk_until(hunk, stop)?;
    }
    Ok(LineDiff {
        hunks,
        old_lines: a.len(),
        new_lines: b.len(),
    })
}

/// Expand one group of opcodes into a hunk of tagged lines.
///
/// Replace opcodes emit all their deleted lines followed by all their
/// inserted lines, matching conventional unified output.
pub fn hunk_from_group(group: &[DiffOp], a: &[&str], b: &[&str]) -> Hunk {
    let (old_range, new_range) = match (group.first(), group.last()) {
        (Some(first), Some(last)) => (
            first.old_range().start..last.old_range().end,
            first.new_range().start..last.new_range().end,
        ),
        _ => (0..0, 0..0),
    };

    let mut lines = Vec::new();
    for op in group {
        let old = op.old_range();
        let new = op.new_range();
        match op {
            DiffOp::Equal { .. } => {
                for (i, j) in old.zip(new) {
                    lines.push(DiffLine::context(a[i], i, j));
                }
            }
            DiffOp::Delete { .. } => {
                lines.extend(old.map(|i| DiffLine::deleted(a[i], i)));
            }
            DiffOp::Insert { .. } => {
                lines.extend(new.map(|j| DiffLine::inserted(b[j], j)));
            }
            DiffOp::Replace { .. } => {
                lines.extend(old.map(|i| DiffLine::deleted(a[i], i)));
                lines.extend(new.map(|j| DiffLine::inserted(b[j], j)));
            }
        }
    }

    Hunk {
        old_start: header_start(&old_range),
        old_count: old_range.len(),
        new_start: header_start(&new_range),
        new_count: new_range.len(),
        // Zero-context trimming can leave empty equal runs behind.
        ops: group
            .iter()
            .filter(|op| !(op.old_range().is_empty() && op.new_range().is_empty()))
            .map(Opcode::from)
            .collect(),
        lines,
    }
}

fn header_start(range: &std::ops::Range<usize>) -> usize {
    if range.is_empty() {
        range.start
    } else {
        range.start + 1
    }
}

/// Apply hunks, in order, to `old` and return the resulting lines.
///
/// Context and deleted lines must match `old` exactly.
pub fn apply_hunks<S: AsRef<str>>(old: &[S], hunks: &[Hunk]) -> DiffResult<Vec<String>> {
    let mut out = Vec::with_capacity(old.len());
    let mut cursor = 0usize;

    for hunk in hunks {
        let start = hunk.old_index();
        if start < cursor || start > old.len() {
            return Err(DiffError::HunkOutOfRange {
                start: hunk.old_start,
                len: old.len(),
            });
        }
        out.extend(old[cursor..start].iter().map(|l| l.as_ref().to_string()));
        cursor = start;

        for (pos, line) in hunk.lines.iter().enumerate() {
            match line.kind {
                DiffSpanKind::Insert => out.push(line.text.clone()),
                DiffSpanKind::Equal | DiffSpanKind::Delete => {
                    let found = old.get(cursor).map(|l| l.as_ref()).ok_or(
                        DiffError::HunkOutOfRange {
                            start: hunk.old_start,
                            len: old.len(),
                        },
                    )?;
                    if found != line.text {
                        return Err(DiffError::Mismatch {
                            line: cursor + 1,
                            expected: line.text.clone(),
                            found: found.to_string(),
                        });
                    }
                    if line.kind == DiffSpanKind::Equal {
                        out.push(line.text.clone());
                    }
                    cursor += 1;
                }
                DiffSpanKind::Replace => return Err(DiffError::UnexpectedReplaceLine(pos)),
            }
        }
    }

    out.extend(old[cursor..].iter().map(|l| l.as_ref().to_string()));
    Ok(out)
}
