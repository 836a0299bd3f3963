//! Dotted document paths and the accessors that navigate them.
//!
//! A [`DocPath`] is a sequence of segments. Each segment is either a mapping
//! key or, when the value being navigated is an array, a decimal index. The
//! empty path denotes the document root. Paths serialize as their dotted
//! string form (`"a.0.b"`), so mapping keys must be non-empty and must not
//! contain `.`. A path built from such keys still navigates correctly in
//! memory, but its string form re-parses to a different path: `""` is the
//! root and `"a.b"` is two segments.
//!
//! The accessors never create intermediate structure. Navigating through a
//! missing segment is not an error: [`get`] yields `None`, [`put`] and
//! [`delete`] leave the document untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const SEPARATOR: char = '.';

/// A location inside a document.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// The empty path (document root).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted path. The empty string is the root.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        Self {
            segments: path.split(SEPARATOR).map(str::to_owned).collect(),
        }
    }

    /// Build a path from explicit segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// A new path with `part` appended.
    pub fn join(&self, part: impl fmt::Display) -> Self {
        let mut segments = self.segments.clone();
        segments.push(part.to_string());
        Self { segments }
    }

    /// Split into the parent segments and the final segment.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.segments
            .split_last()
            .map(|(last, parent)| (parent, last.as_str()))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocPath({:?})", self.to_string())
    }
}

impl From<String> for DocPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<&str> for DocPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<DocPath> for String {
    fn from(path: DocPath) -> Self {
        path.to_string()
    }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

fn navigate_mut<'a>(doc: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    segments
        .iter()
        .try_fold(doc, |current, segment| child_mut(current, segment))
}

/// The value at `path`, or `None` if any segment is absent.
pub fn get<'a>(doc: &'a Value, path: &DocPath) -> Option<&'a Value> {
    path.segments
        .iter()
        .try_fold(doc, |current, segment| child(current, segment))
}

/// The value at `path`, or `default` if any segment is absent.
pub fn get_or<'a>(doc: &'a Value, path: &DocPath, default: &'a Value) -> &'a Value {
    get(doc, path).unwrap_or(default)
}

/// Mutable access to the value at `path`.
pub fn get_mut<'a>(doc: &'a mut Value, path: &DocPath) -> Option<&'a mut Value> {
    navigate_mut(doc, &path.segments)
}

/// Write `value` at `path`.
///
/// The root path replaces the whole document. Otherwise the parent must
/// already exist: mapping parents gain or overwrite the key, array parents
/// accept an existing index or the one-past-the-end index (append).
/// Returns `false` when nothing was written.
pub fn put(doc: &mut Value, path: &DocPath, value: Value) -> bool {
    let Some((parent, last)) = path.split_last() else {
        *doc = value;
        return true;
    };

    match navigate_mut(doc, parent) {
        Some(Value::Object(map)) => {
            map.insert(last.to_owned(), value);
            true
        }
        Some(Value::Array(items)) => match last.parse::<usize>() {
            Ok(index) if index < items.len() => {
                items[index] = value;
                true
            }
            Ok(index) if index == items.len() => {
                items.push(value);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// Remove the final segment of `path`, returning the removed value.
///
/// Deleting the root takes the whole document and leaves `null` behind.
/// Array parents shift later elements left.
pub fn delete(doc: &mut Value, path: &DocPath) -> Option<Value> {
    let Some((parent, last)) = path.split_last() else {
        return Some(doc.take());
    };

    match navigate_mut(doc, parent)? {
        Value::Object(map) => map.remove(last),
        Value::Array(items) => {
            let index = last.parse::<usize>().ok()?;
            (index < items.len()).then(|| items.remove(index))
        }
        _ => None,
    }
}
