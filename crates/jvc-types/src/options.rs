use serde::{Deserialize, Serialize};

/// The field name used for array-element identity when none is configured.
pub const DEFAULT_ID_KEY: &str = "id";

fn default_id_key() -> Option<String> {
    Some(DEFAULT_ID_KEY.to_owned())
}

/// Options that steer the differ.
///
/// `id_key` names the mapping field that marks array elements as
/// identity-bearing: two mappings with equal values under that key are the
/// same element even when their other fields or positions differ. `None`
/// disables identity matching, so mapping elements are only ever
/// substituted, never moved.
///
/// Serialized as `{"idKey": "id"}`. An explicit `null` disables the key; a
/// missing field falls back to [`DEFAULT_ID_KEY`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffOptions {
    #[serde(default = "default_id_key")]
    pub id_key: Option<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            id_key: default_id_key(),
        }
    }
}

impl DiffOptions {
    /// Options using `key` as the id key.
    pub fn with_id_key(key: impl Into<String>) -> Self {
        Self {
            id_key: Some(key.into()),
        }
    }

    /// Options with identity matching disabled.
    pub fn without_id_key() -> Self {
        Self { id_key: None }
    }

    pub fn id_key(&self) -> Option<&str> {
        self.id_key.as_deref()
    }
}
