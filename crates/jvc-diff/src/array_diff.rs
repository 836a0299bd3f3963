//! Array diff: edit-distance alignment with move detection.
//!
//! The alignment fills a Levenshtein table over the two arrays, where "equal"
//! means [`IdentityResolver::same_element`], then walks it back from the
//! bottom-right corner. Each step that lowers the distance is an edit:
//!
//! - diagonal: the element at that position was replaced, either by an
//!   element that already existed somewhere in the old array (a move) or by
//!   a new value (a substitution);
//! - up: an old element was deleted;
//! - left: a new element was inserted.
//!
//! Ops are emitted in increasing position order. Insert and delete indices
//! address the array as it evolves while the ops run: after the ops for
//! the first `j` new positions, the live array is `after[..j]` followed by
//! the not yet consumed tail of `before`. Moves read from the original array.
//!
//! Identity-matched pairs are then diffed field by field, except where the
//! new position was filled by an insert or a substitution: those already
//! carry the final value.

use std::collections::BTreeSet;

use jvc_types::{ArrayOp, ChangeOp, DocPath};
use serde_json::Value;

use crate::differ::Differ;
use crate::identity::IdentityResolver;

/// Row-major `(before.len() + 1) x (after.len() + 1)` edit-distance table.
#[derive(Debug)]
pub struct DistanceTable {
    width: usize,
    cells: Vec<usize>,
}

impl DistanceTable {
    /// Fill the table for `before` -> `after`.
    pub fn build(resolver: &IdentityResolver<'_>, before: &[Value], after: &[Value]) -> Self {
        let width = after.len() + 1;
        let mut cells = vec![0; (before.len() + 1) * width];

        for (j, cell) in cells.iter_mut().take(width).enumerate() {
            *cell = j;
        }
        for i in 1..=before.len() {
            cells[i * width] = i;
            for j in 1..=after.len() {
                let diagonal = cells[(i - 1) * width + j - 1];
                cells[i * width + j] = if resolver.same_element(&before[i - 1], &after[j - 1]) {
                    diagonal
                } else {
                    let up = cells[(i - 1) * width + j];
                    let left = cells[i * width + j - 1];
                    1 + up.min(left).min(diagonal)
                };
            }
        }

        Self { width, cells }
    }

    pub fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }

    /// The edit distance between the two arrays.
    pub fn distance(&self) -> usize {
        self.cells.last().copied().unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Diagonal,
    Up,
    Left,
}

/// Pick the predecessor of `(i, j)`: the smallest of diagonal, up, left,
/// with ties going to the earlier one in that order.
fn select_step(table: &DistanceTable, i: usize, j: usize) -> (Step, usize) {
    let candidates = [
        (Step::Diagonal, i > 0 && j > 0),
        (Step::Up, i > 0),
        (Step::Left, j > 0),
    ];

    let mut best: Option<(Step, usize)> = None;
    for (step, valid) in candidates {
        if !valid {
            continue;
        }
        let value = match step {
            Step::Diagonal => table.get(i - 1, j - 1),
            Step::Up => table.get(i - 1, j),
            Step::Left => table.get(i, j - 1),
        };
        if best.map_or(true, |(_, min)| value < min) {
            best = Some((step, value));
        }
    }

    // Callers stop at (0, 0), so at least one candidate is valid.
    best.unwrap_or((Step::Diagonal, 0))
}

/// Positional ops turning `before` into `after`, in application order.
pub fn align(resolver: &IdentityResolver<'_>, before: &[Value], after: &[Value]) -> Vec<ArrayOp> {
    let table = DistanceTable::build(resolver, before, after);

    let mut ops = Vec::new();
    let (mut i, mut j) = (before.len(), after.len());

    while i > 0 || j > 0 {
        let here = table.get(i, j);
        let (step, value) = select_step(&table, i, j);

        if value < here {
            ops.push(match step {
                Step::Diagonal => match resolver.position_in(before, &after[j - 1]) {
                    Some(from) => ArrayOp::Move { to: j - 1, from },
                    None => ArrayOp::Substitute {
                        index: j - 1,
                        value: after[j - 1].clone(),
                    },
                },
                Step::Up => ArrayOp::Delete { index: j },
                Step::Left => ArrayOp::Add {
                    index: j - 1,
                    value: after[j - 1].clone(),
                },
            });
        }

        match step {
            Step::Diagonal => {
                i -= 1;
                j -= 1;
            }
            Step::Up => i -= 1,
            Step::Left => j -= 1,
        }
    }

    ops.reverse();
    ops
}

/// Diff two arrays at `path`, appending to `out`.
///
/// Emits at most one [`ChangeOp::ArrayChange`], followed by the field-level
/// changes of every identity-matched element pair. Each pair is diffed at the
/// element's position in `after`, unless an `Add` or `Substitute` wrote that
/// position whole. Id values are assumed unique within each array.
pub(crate) fn diff_arrays(
    differ: &Differ,
    before: &[Value],
    after: &[Value],
    path: &DocPath,
    out: &mut Vec<ChangeOp>,
) {
    let resolver = differ.resolver();

    let ops = align(&resolver, before, after);
    let written: BTreeSet<usize> = ops
        .iter()
        .filter_map(|op| match op {
            ArrayOp::Add { index, .. } | ArrayOp::Substitute { index, .. } => Some(*index),
            ArrayOp::Delete { .. } | ArrayOp::Move { .. } => None,
        })
        .collect();
    if !ops.is_empty() {
        out.push(ChangeOp::array_change(path.clone(), ops));
    }

    if resolver.id_key().is_none() {
        return;
    }

    for old in before {
        for (index, new) in after.iter().enumerate() {
            if !written.contains(&index) && resolver.identity_matched(old, new) {
                differ.diff_at(old, new, &path.join(index), out);
            }
        }
    }
}
