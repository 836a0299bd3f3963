//! Change-list replay.
//!
//! Map ops write through the path accessors: `Add`/`Modify` put a value,
//! `Delete` removes a key. A write whose parent is missing is skipped, not
//! an error. Array changes operate on the live array found at their path
//! together with an immutable copy of that array taken before the first op.
//! `Add`/`Delete`/`Substitute` and the target of `Move` address the live
//! array; the source of `Move` addresses the copy.

use jvc_types::{path, ArrayOp, ChangeOp, ChangeSet, DocPath};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{PatchError, PatchResult};

/// Apply `changes` to `doc` and return the patched document.
///
/// On error the partially patched document is dropped; callers that need the
/// original should pass a clone.
pub fn patch(changes: &ChangeSet, mut doc: Value) -> PatchResult<Value> {
    patch_in_place(&changes.changes, &mut doc)?;
    Ok(doc)
}

/// Decode `changes` from untrusted JSON, then apply them to `doc`.
///
/// Nothing is applied unless every op decodes; an unrecognised op tag fails
/// with [`jvc_types::TypeError::UnknownChangeOpKind`].
pub fn patch_json(changes: &Value, doc: Value) -> PatchResult<Value> {
    let changes = ChangeSet::from_json(changes)?;
    patch(&changes, doc)
}

/// Apply `changes` to `doc` in order.
///
/// Ops preceding a failing op stay applied.
pub fn patch_in_place(changes: &[ChangeOp], doc: &mut Value) -> PatchResult<()> {
    for change in changes {
        apply_change(change, doc)?;
    }
    Ok(())
}

fn apply_change(change: &ChangeOp, doc: &mut Value) -> PatchResult<()> {
    match change {
        ChangeOp::Add { path, value } | ChangeOp::Modify { path, value } => {
            if !path::put(doc, path, value.clone()) {
                debug!(%path, kind = change.kind(), "write skipped: parent missing");
            }
        }
        ChangeOp::Delete { path } => {
            if path::delete(doc, path).is_none() {
                trace!(%path, "delete skipped: key missing");
            }
        }
        ChangeOp::ArrayChange { path, ops } => {
            let live = match path::get_mut(doc, path) {
                Some(Value::Array(items)) => items,
                _ => return Err(PatchError::ArrayNotFound(path.clone())),
            };
            let original = live.clone();
            apply_array_ops(path, live, &original, ops)?;
            debug!(%path, ops = ops.len(), len = live.len(), "array change applied");
        }
    }
    Ok(())
}

/// Apply positional `ops` to `live`, reading move sources from `original`.
///
/// `original` must be the state of `live` before the first op.
pub fn apply_array_ops(
    path: &DocPath,
    live: &mut Vec<Value>,
    original: &[Value],
    ops: &[ArrayOp],
) -> PatchResult<()> {
    let out_of_bounds = |index: usize, len: usize| PatchError::IndexOutOfBounds {
        path: path.clone(),
        index,
        len,
    };

    for op in ops {
        match op {
            ArrayOp::Add { index, value } => {
                if *index > live.len() {
                    return Err(out_of_bounds(*index, live.len()));
                }
                live.insert(*index, value.clone());
            }
            ArrayOp::Delete { index } => {
                if *index >= live.len() {
                    return Err(out_of_bounds(*index, live.len()));
                }
                live.remove(*index);
            }
            ArrayOp::Move { to, from } => {
                let source = original
                    .get(*from)
                    .ok_or_else(|| PatchError::MoveSourceOutOfBounds {
                        path: path.clone(),
                        from: *from,
                        len: original.len(),
                    })?;
                let len = live.len();
                let slot = live.get_mut(*to).ok_or_else(|| out_of_bounds(*to, len))?;
                *slot = source.clone();
            }
            ArrayOp::Substitute { index, value } => {
                let len = live.len();
                let slot = live.get_mut(*index).ok_or_else(|| out_of_bounds(*index, len))?;
                *slot = value.clone();
            }
        }
    }
    Ok(())
}
