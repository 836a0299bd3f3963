//! Change operations: the typed edits a differ emits and a patcher replays.
//!
//! The serialized form is a tagged JSON object per operation:
//!
//! | op               | JSON                                          |
//! |------------------|-----------------------------------------------|
//! | `Add`            | `{"type":"A","path":"a.b","value":..}`        |
//! | `Modify`         | `{"type":"M","path":"a.b","value":..}`        |
//! | `Delete`         | `{"type":"D","path":"a.b"}`                   |
//! | `ArrayChange`    | `{"type":"AR","path":"a","value":[..]}`       |
//! | `ArrayOp::Add`   | `{"type":"AA","path":index,"value":..}`       |
//! | `ArrayOp::Delete`| `{"type":"AD","path":index}`                  |
//! | `ArrayOp::Move`  | `{"type":"AM","path":to,"value":from}`        |
//! | `ArrayOp::Substitute` | `{"type":"AS","path":index,"value":..}`  |

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::TypeError;
use crate::path::DocPath;

const CHANGE_TAGS: [&str; 4] = ["A", "M", "D", "AR"];
const ARRAY_TAGS: [&str; 4] = ["AA", "AD", "AM", "AS"];

/// A single edit of a document at a path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangeOp {
    /// A mapping key now exists with `value`.
    #[serde(rename = "A")]
    Add { path: DocPath, value: Value },
    /// The leaf at `path` now equals `value`.
    #[serde(rename = "M")]
    Modify { path: DocPath, value: Value },
    /// The key at `path` no longer exists.
    #[serde(rename = "D")]
    Delete { path: DocPath },
    /// The array at `path` changed; `ops` are applied in order.
    #[serde(rename = "AR")]
    ArrayChange {
        path: DocPath,
        #[serde(rename = "value")]
        ops: Vec<ArrayOp>,
    },
}

impl ChangeOp {
    pub fn add(path: DocPath, value: Value) -> Self {
        Self::Add { path, value }
    }

    pub fn modify(path: DocPath, value: Value) -> Self {
        Self::Modify { path, value }
    }

    pub fn delete(path: DocPath) -> Self {
        Self::Delete { path }
    }

    pub fn array_change(path: DocPath, ops: Vec<ArrayOp>) -> Self {
        Self::ArrayChange { path, ops }
    }

    /// The location this op targets.
    pub fn path(&self) -> &DocPath {
        match self {
            Self::Add { path, .. }
            | Self::Modify { path, .. }
            | Self::Delete { path }
            | Self::ArrayChange { path, .. } => path,
        }
    }

    /// The wire tag of this op.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "A",
            Self::Modify { .. } => "M",
            Self::Delete { .. } => "D",
            Self::ArrayChange { .. } => "AR",
        }
    }
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { path, value } => write!(f, "+ {path} = {value}"),
            Self::Modify { path, value } => write!(f, "~ {path} = {value}"),
            Self::Delete { path } => write!(f, "- {path}"),
            Self::ArrayChange { path, ops } => {
                write!(f, "[] {path}:")?;
                for op in ops {
                    write!(f, " {op}")?;
                }
                Ok(())
            }
        }
    }
}

/// A positional edit inside an [`ChangeOp::ArrayChange`].
///
/// `Add` and `Delete` indices address the array as it evolves while the ops
/// are applied in order. `Move` reads its source from the array as it was
/// before the first op ran.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArrayOp {
    /// Insert `value` at `index`, shifting later elements right.
    #[serde(rename = "AA")]
    Add {
        #[serde(rename = "path")]
        index: usize,
        value: Value,
    },
    /// Remove the element at `index`, shifting later elements left.
    #[serde(rename = "AD")]
    Delete {
        #[serde(rename = "path")]
        index: usize,
    },
    /// `live[to] = original[from]`.
    #[serde(rename = "AM")]
    Move {
        #[serde(rename = "path")]
        to: usize,
        #[serde(rename = "value")]
        from: usize,
    },
    /// `live[index] = value`.
    #[serde(rename = "AS")]
    Substitute {
        #[serde(rename = "path")]
        index: usize,
        value: Value,
    },
}

impl ArrayOp {
    /// The wire tag of this op.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "AA",
            Self::Delete { .. } => "AD",
            Self::Move { .. } => "AM",
            Self::Substitute { .. } => "AS",
        }
    }
}

impl fmt::Display for ArrayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { index, value } => write!(f, "+{index}={value}"),
            Self::Delete { index } => write!(f, "-{index}"),
            Self::Move { to, from } => write!(f, "{from}->{to}"),
            Self::Substitute { index, value } => write!(f, "~{index}={value}"),
        }
    }
}

/// An ordered list of change ops.
///
/// Deserialization checks every tag before decoding, so a change list from
/// a foreign producer fails with [`TypeError::UnknownChangeOpKind`] instead
/// of being partially understood.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct ChangeSet {
    /// The ops, in application order.
    pub changes: Vec<ChangeOp>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of top-level changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn push(&mut self, op: ChangeOp) {
        self.changes.push(op);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeOp> {
        self.changes.iter()
    }

    /// Number of added keys.
    pub fn additions(&self) -> usize {
        self.count(|c| matches!(c, ChangeOp::Add { .. }))
    }

    /// Number of modified leaves.
    pub fn modifications(&self) -> usize {
        self.count(|c| matches!(c, ChangeOp::Modify { .. }))
    }

    /// Number of deleted keys.
    pub fn deletions(&self) -> usize {
        self.count(|c| matches!(c, ChangeOp::Delete { .. }))
    }

    /// Number of array changes.
    pub fn array_changes(&self) -> usize {
        self.count(|c| matches!(c, ChangeOp::ArrayChange { .. }))
    }

    fn count(&self, pred: impl Fn(&ChangeOp) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(c)).count()
    }

    /// Decode a change list from JSON, rejecting unknown op tags.
    pub fn from_json(value: &Value) -> Result<Self, TypeError> {
        let items = value
            .as_array()
            .ok_or_else(|| TypeError::MalformedChangeOp("change list must be an array".into()))?;

        for item in items {
            let tag = check_tag(item, &CHANGE_TAGS)?;
            if tag == "AR" {
                let ops = item
                    .get("value")
                    .and_then(Value::as_array)
                    .ok_or_else(|| {
                        TypeError::MalformedChangeOp("array change without op list".into())
                    })?;
                for op in ops {
                    check_tag(op, &ARRAY_TAGS)?;
                }
            }
        }

        let changes = serde_json::from_value(value.clone())
            .map_err(|e| TypeError::MalformedChangeOp(e.to_string()))?;
        Ok(Self { changes })
    }

    /// Decode a change list from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, TypeError> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| TypeError::Serialization(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Encode as a JSON value.
    pub fn to_json(&self) -> Result<Value, TypeError> {
        serde_json::to_value(&self.changes).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

fn check_tag<'a>(item: &'a Value, known: &[&str]) -> Result<&'a str, TypeError> {
    let tag = item
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| TypeError::MalformedChangeOp(format!("missing type tag in {item}")))?;
    if known.contains(&tag) {
        Ok(tag)
    } else {
        Err(TypeError::UnknownChangeOpKind(tag.to_owned()))
    }
}

impl TryFrom<Value> for ChangeSet {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.changes.serialize(serializer)
    }
}

impl From<Vec<ChangeOp>> for ChangeSet {
    fn from(changes: Vec<ChangeOp>) -> Self {
        Self { changes }
    }
}

impl Extend<ChangeOp> for ChangeSet {
    fn extend<T: IntoIterator<Item = ChangeOp>>(&mut self, iter: T) {
        self.changes.extend(iter);
    }
}

impl IntoIterator for ChangeSet {
    type Item = ChangeOp;
    type IntoIter = std::vec::IntoIter<ChangeOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeOp;
    type IntoIter = std::slice::Iter<'a, ChangeOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format_of_map_ops() {
        let add = ChangeOp::add("a.b".into(), json!(1));
        assert_eq!(
            serde_json::to_value(&add).unwrap(),
            json!({"type": "A", "path": "a.b", "value": 1})
        );

        let delete = ChangeOp::delete("a".into());
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            json!({"type": "D", "path": "a"})
        );
    }

    #[test]
    fn wire_format_of_array_change() {
        let change = ChangeOp::array_change(
            DocPath::root(),
            vec![
                ArrayOp::Move { to: 0, from: 1 },
                ArrayOp::Add { index: 2, value: json!(3) },
                ArrayOp::Delete { index: 4 },
            ],
        );
        assert_eq!(
            serde_json::to_value(&change).unwrap(),
            json!({
                "type": "AR",
                "path": "",
                "value": [
                    {"type": "AM", "path": 0, "value": 1},
                    {"type": "AA", "path": 2, "value": 3},
                    {"type": "AD", "path": 4}
                ]
            })
        );
    }

    #[test]
    fn decode_change_set() {
        let raw = json!([
            {"type": "M", "path": "1.a", "value": 2},
            {"type": "AR", "path": "list", "value": [{"type": "AS", "path": 0, "value": {"x": 1}}]}
        ]);
        let set = ChangeSet::from_json(&raw).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.modifications(), 1);
        assert_eq!(set.array_changes(), 1);
        assert_eq!(set.changes[0].path().to_string(), "1.a");
        assert_eq!(set.to_json().unwrap(), raw);
    }

    #[test]
    fn encode_keeps_every_change() {
        let set = ChangeSet::from(vec![
            ChangeOp::add("a".into(), json!({"n": [1, 2.5]})),
            ChangeOp::delete("b.0".into()),
            ChangeOp::array_change(
                "c".into(),
                vec![ArrayOp::Move { to: 0, from: 1 }, ArrayOp::Delete { index: 1 }],
            ),
        ]);
        let encoded = set.to_json().unwrap();
        assert_eq!(encoded.as_array().map(Vec::len), Some(set.len()));
        assert_eq!(ChangeSet::from_json(&encoded).unwrap(), set);
    }

    #[test]
    fn unknown_change_kind_is_rejected() {
        let raw = json!([{"type": "X", "path": "a"}]);
        assert_eq!(
            ChangeSet::from_json(&raw),
            Err(TypeError::UnknownChangeOpKind("X".into()))
        );
    }

    #[test]
    fn unknown_array_op_kind_is_rejected() {
        let raw = json!([{"type": "AR", "path": "", "value": [{"type": "AZ", "path": 0}]}]);
        assert_eq!(
            ChangeSet::from_json(&raw),
            Err(TypeError::UnknownChangeOpKind("AZ".into()))
        );
    }

    #[test]
    fn missing_tag_is_malformed() {
        let raw = json!([{"path": "a"}]);
        assert!(matches!(
            ChangeSet::from_json(&raw),
            Err(TypeError::MalformedChangeOp(_))
        ));
        assert!(matches!(
            ChangeSet::from_json(&json!({"type": "A"})),
            Err(TypeError::MalformedChangeOp(_))
        ));
    }

    #[test]
    fn serde_deserialize_goes_through_tag_check() {
        let err = serde_json::from_str::<ChangeSet>(r#"[{"type":"Q","path":""}]"#).unwrap_err();
        assert!(err.to_string().contains("unknown change op kind: Q"));

        let ok: ChangeSet = serde_json::from_str(r#"[{"type":"D","path":"k"}]"#).unwrap();
        assert_eq!(ok.deletions(), 1);
    }

    #[test]
    fn display_is_compact() {
        let op = ChangeOp::array_change(
            "xs".into(),
            vec![ArrayOp::Move { to: 0, from: 1 }, ArrayOp::Substitute { index: 1, value: json!(5) }],
        );
        assert_eq!(op.to_string(), "[] xs: 1->0 ~1=5");
    }
}
