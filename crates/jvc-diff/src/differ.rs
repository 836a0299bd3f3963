//! Document-level diff: dispatch on value kind and recurse through mappings.

use jvc_types::{ChangeOp, ChangeSet, DiffOptions, DocPath};
use serde_json::{Map, Value};

use crate::array_diff;
use crate::identity::{strict_eq, IdentityResolver};

/// A structural differ configured with [`DiffOptions`].
///
/// The differ is pure: it never mutates its inputs and the same inputs
/// always produce the same change list.
#[derive(Clone, Debug, Default)]
pub struct Differ {
    options: DiffOptions,
}

impl Differ {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn resolver(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(self.options.id_key())
    }

    /// The change list that turns `before` into `after`.
    ///
    /// - Two mappings: deletions and recursive changes in `before`'s key
    ///   order, then additions in `after`'s key order.
    /// - Two arrays: an array change plus element-level changes of
    ///   identity-matched elements.
    /// - Anything else: a single `Modify` at the root unless strictly equal.
    pub fn diff(&self, before: &Value, after: &Value) -> ChangeSet {
        let mut changes = Vec::new();
        self.diff_at(before, after, &DocPath::root(), &mut changes);
        ChangeSet::from(changes)
    }

    pub(crate) fn diff_at(
        &self,
        before: &Value,
        after: &Value,
        path: &DocPath,
        out: &mut Vec<ChangeOp>,
    ) {
        match (before, after) {
            (Value::Array(old), Value::Array(new)) => {
                array_diff::diff_arrays(self, old, new, path, out)
            }
            (Value::Object(old), Value::Object(new)) => self.diff_objects(old, new, path, out),
            _ => {
                if !strict_eq(before, after) {
                    out.push(ChangeOp::modify(path.clone(), after.clone()));
                }
            }
        }
    }

    fn diff_objects(
        &self,
        old: &Map<String, Value>,
        new: &Map<String, Value>,
        path: &DocPath,
        out: &mut Vec<ChangeOp>,
    ) {
        for (key, old_val) in old {
            match new.get(key) {
                Some(new_val) => self.diff_at(old_val, new_val, &path.join(key), out),
                None => out.push(ChangeOp::delete(path.join(key))),
            }
        }

        for (key, new_val) in new {
            if !old.contains_key(key) {
                out.push(ChangeOp::add(path.join(key), new_val.clone()));
            }
        }
    }
}

/// Compute the change list from `before` to `after` with the given options.
pub fn diff(before: &Value, after: &Value, options: &DiffOptions) -> ChangeSet {
    Differ::new(options.clone()).diff(before, after)
}
