//! Composite entity keys with case-insensitive ordering.
//!
//! A [`Key`] is an entity's own `simple` key plus, for entities that have an
//! identifying parent, the parent's key. Two keys are equal when their simple
//! keys match ignoring case and their parent keys are both absent or
//! recursively equal. Ordering compares the simple keys first (ordinal,
//! ignoring case) and breaks ties on the parent key, where "no parent" sorts
//! below "has parent".
//!
//! Keys are plain values. The storage layer computes them from the live
//! entity graph on demand, so a key read from the graph always reflects the
//! current simple key and parent chain.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, KeySide, Result};

/// Separator between path segments in [`Key`]'s display form.
pub const PATH_SEPARATOR: char = '|';

/// Composite identity of an entity.
#[derive(Clone)]
pub struct Key {
    simple: String,
    parent: Option<Box<Key>>,
}

impl Key {
    /// Creates a key from a simple key and an optional identifying-parent key.
    #[must_use]
    pub fn new(simple: impl Into<String>, parent: Option<Key>) -> Self {
        Self {
            simple: simple.into(),
            parent: parent.map(Box::new),
        }
    }

    /// Creates the key of a top-level entity.
    #[must_use]
    pub fn top_level(simple: impl Into<String>) -> Self {
        Self::new(simple, None)
    }

    /// Builds a key from root-first segments, e.g. `["Fred's", "2013/05/01"]`.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Option<Self> {
        segments
            .iter()
            .fold(None, |parent, segment| {
                Some(Self::new(segment.as_ref(), parent))
            })
    }

    /// Returns the entity's own key component.
    #[must_use]
    pub fn simple(&self) -> &str {
        &self.simple
    }

    /// Returns the identifying parent's key, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Key> {
        self.parent.as_deref()
    }

    /// Returns true if this key has no identifying parent.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of segments from the top-level ancestor down to this key.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.depth())
    }

    /// Returns the segments root-first.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = match &self.parent {
            Some(parent) => parent.segments(),
            None => Vec::with_capacity(1),
        };
        segments.push(&self.simple);
        segments
    }

    /// Returns a copy of this key with a different simple component.
    #[must_use]
    pub fn with_simple(&self, simple: impl Into<String>) -> Self {
        Self {
            simple: simple.into(),
            parent: self.parent.clone(),
        }
    }

    /// Compares two possibly missing keys.
    ///
    /// A key whose *parent* is absent is an ordinary top-level key and orders
    /// below keys that have a parent. A missing key *argument*, however,
    /// means the caller had no key to compare at all, which is a programming
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MissingKeyArgument`](crate::ErrorKind::MissingKeyArgument)
    /// naming the side that was not supplied.
    pub fn try_compare(lhs: Option<&Key>, rhs: Option<&Key>) -> Result<Ordering> {
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => Ok(lhs.cmp(rhs)),
            (None, _) => Err(Error::missing_key_argument(KeySide::Left)),
            (Some(_), None) => Err(Error::missing_key_argument(KeySide::Right)),
        }
    }
}

/// Ordinal comparison of two strings ignoring case.
#[must_use]
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_uppercase)
        .cmp(b.chars().flat_map(char::to_uppercase))
}

/// Equality of two strings ignoring case.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    cmp_ignore_case(a, b) == Ordering::Equal
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_case(&self.simple, &other.simple).then_with(|| {
            match (&self.parent, &other.parent) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            }
        })
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.simple.chars().flat_map(char::to_uppercase) {
            c.hash(state);
        }
        // Terminator so ("ab", "c") and ("a", "bc") chains differ
        0xFFu8.hash(state);
        if let Some(parent) = &self.parent {
            parent.hash(state);
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({self})")
    }
}

impl fmt::Display for Key {
    /// Root-first path, e.g. `Fred's|2013/05/01|01`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent}{PATH_SEPARATOR}")?;
        }
        f.write_str(&self.simple)
    }
}
