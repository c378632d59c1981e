//! Greedy longest-match sequence alignment.
//!
//! [`SequenceMatcher`] finds the longest contiguous run common to both
//! sequences, then recurses on the pieces to its left and right. Ties are
//! broken by the earliest start in `a`, then the earliest start in `b`. The
//! resulting matching blocks are turned into `similar::DiffOp` opcodes so the
//! grouping step can reuse `similar::group_diff_ops`.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

use dirdelta_types::DiffSpanKind;
use serde::{Deserialize, Serialize};
use similar::{DiffOp, DiffTag};

use crate::error::Interrupted;

/// Sequences of at least this many items on the `b` side get the
/// popular-item heuristic.
pub const AUTOJUNK_MIN_LEN: usize = 200;

/// A run of `len` equal items starting at `a[a]` and `b[b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub len: usize,
}

/// A tagged instruction mapping `a[old]` onto `b[new]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opcode {
    pub tag: DiffSpanKind,
    pub old: Range<usize>,
    pub new: Range<usize>,
}

impl From<&DiffOp> for Opcode {
    fn from(op: &DiffOp) -> Self {
        let (tag, old, new) = op.as_tag_tuple();
        let tag = match tag {
            DiffTag::Equal => DiffSpanKind::Equal,
            DiffTag::Delete => DiffSpanKind::Delete,
            DiffTag::Insert => DiffSpanKind::Insert,
            DiffTag::Replace => DiffSpanKind::Replace,
        };
        Self { tag, old, new }
    }
}

/// Aligns two sequences by repeatedly taking the longest common run.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    /// Positions of each indexed item of `b`. Popular items are left out.
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// Create a matcher with the popular-item heuristic enabled.
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        Self::with_autojunk(a, b, true)
    }

    /// Create a matcher, choosing whether popular items of `b` are dropped
    /// from the index.
    ///
    /// With `autojunk`, when `b` has at least [`AUTOJUNK_MIN_LEN`] items,
    /// any item occurring more than `len / 100 + 1` times is not used to seed
    /// matches. Matches are still extended across such items.
    pub fn with_autojunk(a: &'a [T], b: &'a [T], autojunk: bool) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b2j.entry(item).or_default().push(j);
        }

        if autojunk && b.len() >= AUTOJUNK_MIN_LEN {
            let threshold = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= threshold);
        }

        Self { a, b, b2j }
    }

    /// Longest matching run inside `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Returns a zero-length match at `(alo, blo)` when nothing matches.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        // `never` cannot interrupt, so the fallback is not reached.
        self.longest_match(alo, ahi, blo, bhi, &never)
            .unwrap_or(Match {
                a: alo,
                b: blo,
                len: 0,
            })
    }

    /// Like [`find_longest_match`](Self::find_longest_match), polling `stop`
    /// once per item of `a`.
    fn longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
        stop: &dyn Fn() -> bool,
    ) -> Result<Match, Interrupted> {
        let mut best = Match {
            a: alo,
            b: blo,
            len: 0,
        };

        // j2len[j] = length of the match ending at a[i - 1], b[j].
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            if stop() {
                return Err(Interrupted);
            }
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best.len {
                        best = Match {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            len: k,
                        };
                    }
                }
            }
            j2len = next;
        }

        // Grow across items the index skipped.
        while best.a > alo && best.b > blo && self.a[best.a - 1] == self.b[best.b - 1] {
            best.a -= 1;
            best.b -= 1;
            best.len += 1;
        }
        while best.a + best.len < ahi
            && best.b + best.len < bhi
            && self.a[best.a + best.len] == self.b[best.b + best.len]
        {
            best.len += 1;
        }

        Ok(best)
    }

    /// All matching blocks in ascending order, adjacent blocks merged, ending
    /// with the sentinel `(a.len(), b.len(), 0)`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        self.matching_blocks_until(&never).unwrap_or_default()
    }

    /// [`matching_blocks`](Self::matching_blocks), abandoned with
    /// [`Interrupted`] as soon as `stop` returns `true`.
    pub fn matching_blocks_until(&self, stop: &dyn Fn() -> bool) -> Result<Vec<Match>, Interrupted> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.longest_match(alo, ahi, blo, bhi, stop)?;
            if m.len == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.len < ahi && m.b + m.len < bhi {
                queue.push((m.a + m.len, ahi, m.b + m.len, bhi));
            }
            blocks.push(m);
        }
        blocks.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for m in blocks {
            if let Some(last) = merged.last_mut() {
                if last.a + last.len == m.a && last.b + last.len == m.b {
                    last.len += m.len;
                    continue;
                }
            }
            merged.push(m);
        }
        merged.push(Match {
            a: la,
            b: lb,
            len: 0,
        });
        Ok(merged)
    }

    /// The opcode sequence that turns `a` into `b`.
    ///
    /// Gaps before each matching block become `Replace`, `Delete`, or
    /// `Insert` depending on which side is non-empty; the blocks themselves
    /// become `Equal`.
    pub fn diff_ops(&self) -> Vec<DiffOp> {
        self.diff_ops_until(&never).unwrap_or_default()
    }

    /// [`diff_ops`](Self::diff_ops), abandoned when `stop` returns `true`.
    pub fn diff_ops_until(&self, stop: &dyn Fn() -> bool) -> Result<Vec<DiffOp>, Interrupted> {
        let mut ops = Vec::new();
        let (mut i, mut j) = (0, 0);

        for m in self.matching_blocks_until(stop)? {
            let old_len = m.a - i;
            let new_len = m.b - j;
            match (old_len > 0, new_len > 0) {
                (true, true) => ops.push(DiffOp::Replace {
                    old_index: i,
                    old_len,
                    new_index: j,
                    new_len,
                }),
                (true, false) => ops.push(DiffOp::Delete {
                    old_index: i,
                    old_len,
                    new_index: j,
                }),
                (false, true) => ops.push(DiffOp::Insert {
                    old_index: i,
                    new_index: j,
                    new_len,
                }),
                (false, false) => {}
            }
            if m.len > 0 {
                ops.push(DiffOp::Equal {
                    old_index: m.a,
                    new_index: m.b,
                    len: m.len,
                });
            }
            i = m.a + m.len;
            j = m.b + m.len;
        }

        Ok(ops)
    }

    /// [`diff_ops`](Self::diff_ops) as serializable opcodes.
    pub fn opcodes(&self) -> Vec<Opcode> {
        self.diff_ops().iter().map(Opcode::from).collect()
    }
}

/// A stop check that never fires.
pub(crate) fn never() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn longest_match_prefers_earliest_in_a() {
        let a = chars(" abcd");
        let b = chars("abcd abcd");
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, 5, 0, 9);
        assert_eq!(m, Match { a: 0, b: 4, len: 5 });
    }

    #[test]
    fn longest_match_ties_resolve_left() {
        let a = chars("ab");
        let b = chars("ba");
        // Both single-item runs have length 1; `a[0]` wins.
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, 2, 0, 2);
        assert_eq!(m, Match { a: 0, b: 1, len: 1 });
    }

    #[test]
    fn no_match_is_zero_length_at_origin() {
        let a = chars("xyz");
        let b = chars("abc");
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, 3, 0, 3);
        assert_eq!(m, Match { a: 0, b: 0, len: 0 });
    }

    #[test]
    fn matching_blocks_end_with_sentinel() {
        let a = chars("abxcd");
        let b = chars("abcd");
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                Match { a: 0, b: 0, len: 2 },
                Match { a: 3, b: 2, len: 2 },
                Match { a: 5, b: 4, len: 0 },
            ]
        );
    }

    #[test]
    fn opcodes_cover_both_sequences() {
        let a = chars("qabxcd");
        let b = chars("abycdf");
        let ops = SequenceMatcher::new(&a, &b).opcodes();
        let tags: Vec<_> = ops.iter().map(|op| op.tag).collect();
        assert_eq!(
            tags,
            vec![
                DiffSpanKind::Delete,
                DiffSpanKind::Equal,
                DiffSpanKind::Replace,
                DiffSpanKind::Equal,
                DiffSpanKind::Insert,
            ]
        );
        assert_eq!(ops[0].old, 0..1);
        assert_eq!(ops[2].old, 3..4);
        assert_eq!(ops[2].new, 2..3);
        assert_eq!(ops[4].new, 5..6);
    }

    #[test]
    fn identical_sequences_are_one_equal_op() {
        let a = chars("same");
        let ops = SequenceMatcher::new(&a, &a).opcodes();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag, DiffSpanKind::Equal);
        assert_eq!(ops[0].old, 0..4);
    }

    #[test]
    fn empty_sequences_produce_no_ops() {
        let empty: Vec<char> = Vec::new();
        assert!(SequenceMatcher::new(&empty, &empty).opcodes().is_empty());
        let b = chars("abc");
        let ops = SequenceMatcher::new(&empty, &b).opcodes();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag, DiffSpanKind::Insert);
    }

    #[test]
    fn popular_items_still_extend_matches() {
        // 300 copies of "x" make "x" popular in b; the unique "y" anchors a
        // match that is then extended across the popular neighbours.
        let mut a = vec!["x"; 3];
        a.push("y");
        a.extend(vec!["x"; 3]);
        let mut b = vec!["x"; 300];
        b.insert(150, "y");

        let matcher = SequenceMatcher::new(&a, &b);
        let m = matcher.find_longest_match(0, a.len(), 0, b.len());
        assert_eq!(m, Match { a: 0, b: 147, len: 7 });

        let plain = SequenceMatcher::with_autojunk(&a, &b, false);
        assert_eq!(plain.find_longest_match(0, a.len(), 0, b.len()).len, 7);
    }

    #[test]
    fn stop_request_abandons_matching() {
        let a = chars("abcabcabc");
        let b = chars("cbacbacba");
        let matcher = SequenceMatcher::with_autojunk(&a, &b, false);
        assert_eq!(matcher.matching_blocks_until(&|| true), Err(Interrupted));
        assert_eq!(matcher.diff_ops_until(&|| true), Err(Interrupted));
        assert_eq!(
            matcher.matching_blocks_until(&|| false).unwrap(),
            matcher.matching_blocks()
        );
    }

    #[test]
    fn stop_is_polled_during_a_single_scan() {
        use std::cell::Cell;

        let a = chars(&"ab".repeat(50));
        let b = chars(&"ba".repeat(50));
        let polls = Cell::new(0);
        let stop = || {
            polls.set(polls.get() + 1);
            polls.get() > 10
        };
        let result = SequenceMatcher::with_autojunk(&a, &b, false).matching_blocks_until(&stop);
        assert_eq!(result, Err(Interrupted));
        assert_eq!(polls.get(), 11);
    }
}
