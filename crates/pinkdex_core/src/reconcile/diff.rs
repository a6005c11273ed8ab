//! Minimal edit scripts between ordered lists.

use std::ops::Range;

/// Kind of change an [`Opcode`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTag {
    /// `a[a]` is replaced by `b[b]`.
    Replace,
    /// `a[a]` is deleted; `b` is empty.
    Delete,
    /// `b[b]` is inserted before `a.start`; `a` is empty.
    Insert,
}

/// One non-equal run between two sequences.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Opcode {
    /// Kind of change.
    pub tag: OpTag,
    /// Affected range of the old sequence.
    pub a: Range<usize>,
    /// Corresponding range of the new sequence.
    pub b: Range<usize>,
}

impl Opcode {
    fn between(a: Range<usize>, b: Range<usize>) -> Option<Self> {
        let tag = match (a.is_empty(), b.is_empty()) {
            (true, true) => return None,
            (true, false) => OpTag::Insert,
            (false, true) => OpTag::Delete,
            (false, false) => OpTag::Replace,
        };
        Some(Self { tag, a, b })
    }
}

/// Computes the opcodes that turn `a` into `b`.
///
/// Elements kept are those of a longest common subsequence; every other
/// run becomes one opcode. Equal runs are omitted. Opcodes come out in
/// ascending position order.
///
/// ```
/// use pinkdex_core::reconcile::{diff, OpTag};
///
/// let ops = diff(&["A", "B", "C"], &["A", "X", "C"]);
/// assert_eq!(ops.len(), 1);
/// assert_eq!(ops[0].tag, OpTag::Replace);
/// assert_eq!(ops[0].a, 1..2);
/// ```
pub fn diff<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Opcode> {
    let (n, m) = (a.len(), b.len());

    // lcs[i][j] = length of an LCS of a[i..] and b[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    let (mut run_a, mut run_b) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            ops.extend(Opcode::between(run_a..i, run_b..j));
            i += 1;
            j += 1;
            run_a = i;
            run_b = j;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    ops.extend(Opcode::between(run_a..n, run_b..m));
    ops
}
