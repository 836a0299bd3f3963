//! Element identity for array alignment.
//!
//! Two array elements are the *same element* when either
//! - both are mappings carrying a value under the configured id key, and
//!   those values are strictly equal, or
//! - neither is a container and they are strictly equal.
//!
//! Containers without an id value only match themselves (the very same
//! instance), never a structurally identical copy.

use serde_json::Value;

/// Returns `true` for anything that is not a mapping or an array.
pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Strict equality: scalars by value, containers by instance.
///
/// Numbers compare as `serde_json` stores them, so the integer `1` and the
/// float `1.0` differ.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => {
            std::ptr::eq(a, b)
        }
        _ => a == b,
    }
}

/// Decides whether two values are the same logical array element.
#[derive(Clone, Copy, Debug)]
pub struct IdentityResolver<'a> {
    id_key: Option<&'a str>,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(id_key: Option<&'a str>) -> Self {
        Self { id_key }
    }

    pub fn id_key(&self) -> Option<&'a str> {
        self.id_key
    }

    /// The id value of a keyed mapping, if identity matching is enabled.
    pub fn id_of<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        let key = self.id_key?;
        match value {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns `true` if `x` and `y` denote the same element.
    pub fn same_element(&self, x: &Value, y: &Value) -> bool {
        match (self.id_of(x), self.id_of(y)) {
            (Some(a), Some(b)) => strict_eq(a, b),
            _ => strict_eq(x, y),
        }
    }

    /// Returns `true` if both values carry id values and those are equal.
    pub fn identity_matched(&self, x: &Value, y: &Value) -> bool {
        matches!((self.id_of(x), self.id_of(y)), (Some(a), Some(b)) if strict_eq(a, b))
    }

    /// Position of the element in `haystack` sharing `needle`'s identity.
    ///
    /// Keyed mappings are looked up by id value, scalars by value; any other
    /// container has no findable identity. When several positions qualify
    /// the last one wins.
    pub fn position_in(&self, haystack: &[Value], needle: &Value) -> Option<usize> {
        match self.id_of(needle) {
            Some(id) => haystack
                .iter()
                .rposition(|candidate| self.id_of(candidate).is_some_and(|c| strict_eq(c, id))),
            None if is_scalar(needle) => haystack
                .iter()
                .rposition(|candidate| is_scalar(candidate) && strict_eq(candidate, needle)),
            None => None,
        }
    }
}
