//! Dotted JSON path resolution with `#` array wildcards.
//!
//! `spec.containers.#.ports.#.protocol` walks into `spec`, then `containers`,
//! expands every container, then every port of each container. Numeric
//! segments index into arrays (`spec.containers.0.name`) and `\.` escapes a
//! literal dot inside a key (`metadata.annotations.example\.com/owner`).
//!
//! Resolution is a pure function of `(document, path)`: nothing is cached
//! between calls and the same [`FieldPath`] can be resolved any number of times.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Segment that expands every element of the array matched so far.
pub const WILDCARD: &str = "#";

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object key (or array index when the current node is an array).
    Key(String),
    /// `#`: every element of the current array.
    Wildcard,
}

/// A parsed dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

/// Path syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("field path must not be empty")]
    Empty,
    #[error("field path '{path}' has an empty segment at position {position}")]
    EmptySegment { path: String, position: usize },
}

impl FieldPath {
    /// Parse a dotted path, rejecting empty segments (`a..b`, `.a`, `a.`).
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = raw.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                },
                '.' => {
                    let segment = Self::segment(raw, segments.len(), std::mem::take(&mut current))?;
                    segments.push(segment);
                }
                other => current.push(other),
            }
        }
        let last = Self::segment(raw, segments.len(), current)?;
        segments.push(last);

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    fn segment(raw: &str, position: usize, text: String) -> Result<Segment, PathError> {
        match text.as_str() {
            "" => Err(PathError::EmptySegment {
                path: raw.to_string(),
                position,
            }),
            WILDCARD => Ok(Segment::Wildcard),
            _ => Ok(Segment::Key(text)),
        }
    }

    /// The path exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Name of the last segment, used as the field name handed to validators.
    ///
    /// `spec.containers.#.name` → `name`. A trailing wildcard yields `#`.
    pub fn last_segment(&self) -> &str {
        match self.segments.last() {
            Some(Segment::Key(key)) => key,
            _ => WILDCARD,
        }
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ── Resolution ──────────────────────────────────────────────────────

/// Intermediate match tree: a wildcard produces one child per array element
/// that matched the remainder of the path.
enum Matched<'a> {
    Node(&'a Value),
    Each(Vec<Matched<'a>>),
}

impl<'a> Matched<'a> {
    /// Elements of an array-shaped match, or the match itself when it is not one.
    fn into_elements(self) -> Result<Vec<Matched<'a>>, Matched<'a>> {
        match self {
            Matched::Node(Value::Array(items)) => Ok(items.iter().map(Matched::Node).collect()),
            Matched::Each(items) => Ok(items),
            single => Err(single),
        }
    }

    fn into_value(self) -> Cow<'a, Value> {
        match self {
            Matched::Node(value) => Cow::Borrowed(value),
            Matched::Each(items) => Cow::Owned(Value::Array(
                items.into_iter().map(|m| m.into_value().into_owned()).collect(),
            )),
        }
    }
}

fn walk<'a>(node: &'a Value, segments: &[Segment]) -> Option<Matched<'a>> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(Matched::Node(node));
    };

    match head {
        Segment::Wildcard => {
            let items = node.as_array()?;
            if rest.is_empty() {
                // Trailing `#`: the array itself, expanded when flattened.
                return Some(Matched::Node(node));
            }
            Some(Matched::Each(
                items.iter().filter_map(|item| walk(item, rest)).collect(),
            ))
        }
        Segment::Key(key) => {
            let child = match node {
                Value::Object(map) => map.get(key)?,
                Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
            walk(child, rest)
        }
    }
}

/// Resolve `path` against `document`.
///
/// - Missing path → empty.
/// - Scalar or object → one element.
/// - Array → its elements, with any element that is itself an array spliced
///   in (one level of flattening), so `a.#.b.#.c` yields the union of every
///   `c` across all `a` elements.
pub fn resolve<'a>(document: &'a Value, path: &FieldPath) -> Vec<Cow<'a, Value>> {
    let Some(matched) = walk(document, path.segments()) else {
        return Vec::new();
    };

    match matched.into_elements() {
        Ok(elements) => elements
            .into_iter()
            .flat_map(|element| match element.into_elements() {
                Ok(inner) => inner.into_iter().map(Matched::into_value).collect::<Vec<_>>(),
                Err(single) => vec![single.into_value()],
            })
            .collect(),
        Err(single) => vec![single.into_value()],
    }
}

// ── Tests ───────────────────────────────────────────────────────────
