use jvc_types::{ChangeSet, CommitId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Commit fields that caller metadata can never override.
pub const RESERVED_KEYS: [&str; 4] = ["id", "parent", "diff", "createdAt"];

/// One entry of the commit chain.
///
/// `diff` is a reverse delta: patching the document as of this commit with
/// it yields the document as of `parent`. The root commit has no parent and
/// an empty diff.
///
/// Serialized flat as `{id, parent, diff, createdAt, ...metadata}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    #[serde(default)]
    pub parent: Option<CommitId>,
    #[serde(default)]
    pub diff: ChangeSet,
    #[serde(rename = "createdAt", default)]
    pub created_at: Timestamp,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Commit {
    /// A parentless commit with an empty diff and a fresh id.
    pub fn root(meta: CommitMeta) -> Self {
        Self {
            id: CommitId::generate(),
            parent: None,
            diff: ChangeSet::new(),
            created_at: Timestamp::now(),
            metadata: meta.into_metadata(),
        }
    }

    /// A child of `parent` carrying `diff`, with a fresh id.
    pub fn child(parent: CommitId, diff: ChangeSet, meta: CommitMeta) -> Self {
        Self {
            id: CommitId::generate(),
            parent: Some(parent),
            diff,
            created_at: Timestamp::now(),
            metadata: meta.into_metadata(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The `message` metadata entry, if it is a string.
    pub fn message(&self) -> Option<&str> {
        self.metadata.get("message").and_then(Value::as_str)
    }
}

/// Caller-supplied metadata merged into a new commit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommitMeta(Map<String, Value>);

impl CommitMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata holding only a `message` entry.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new().with("message", Value::String(message.into()))
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_metadata(self) -> Map<String, Value> {
        self.0
            .into_iter()
            .filter(|(key, _)| {
                let reserved = RESERVED_KEYS.contains(&key.as_str());
                if reserved {
                    warn!(key = %key, "dropping reserved commit metadata key");
                }
                !reserved
            })
            .collect()
    }
}

impl From<Map<String, Value>> for CommitMeta {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jvc_types::ChangeOp;
    use serde_json::json;

    #[test]
    fn root_commit_shape() {
        let root = Commit::root(CommitMeta::new());
        assert!(root.is_root());
        assert!(root.diff.is_empty());
        assert!(root.metadata.is_empty());
    }

    #[test]
    fn reserved_metadata_is_dropped() {
        let meta = CommitMeta::message("tidy up")
            .with("id", json!("forged"))
            .with("createdAt", json!(0))
            .with("author", json!("ann"));
        let commit = Commit::child(CommitId::new("p"), ChangeSet::new(), meta);
        assert_ne!(commit.id.as_str(), "forged");
        assert_eq!(commit.parent, Some(CommitId::new("p")));
        assert_eq!(commit.message(), Some("tidy up"));
        assert_eq!(commit.metadata.get("author"), Some(&json!("ann")));
        assert!(!commit.metadata.contains_key("id"));
        assert!(!commit.metadata.contains_key("createdAt"));
    }

    #[test]
    fn serializes_flat() {
        let commit = Commit {
            id: CommitId::new("c1"),
            parent: Some(CommitId::new("c0")),
            diff: ChangeSet::from(vec![ChangeOp::delete("b".into())]),
            created_at: Timestamp::from_millis(42),
            metadata: CommitMeta::message("m").into_metadata(),
        };
        let value = serde_json::to_value(&commit).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "c1",
                "parent": "c0",
                "diff": [{"type": "D", "path": "b"}],
                "createdAt": 42,
                "message": "m"
            })
        );
        let back: Commit = serde_json::from_value(value).unwrap();
        assert_eq!(back, commit);
    }

    #[test]
    fn root_deserializes_with_null_parent() {
        let commit: Commit =
            serde_json::from_value(json!({"id": "r", "parent": null, "diff": [], "createdAt": 1}))
                .unwrap();
        assert!(commit.is_root());
        assert!(commit.metadata.is_empty());
    }

    #[test]
    fn unknown_op_in_stored_diff_is_rejected() {
        let result: Result<Commit, _> = serde_json::from_value(json!({
            "id": "c", "parent": "r", "diff": [{"type": "X", "path": "a"}], "createdAt": 1
        }));
        assert!(result.is_err());
    }
}
