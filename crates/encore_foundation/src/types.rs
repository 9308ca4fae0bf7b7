//! Nominal entity types.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The nominal type of an entity, used for relation lookup and messages.
///
/// Types are declared as constants by the domain model. Identity is the
/// singular name alone; the plural only feeds user-facing messages such as
/// "referenced by 3 Events".
#[derive(Copy, Clone)]
pub struct EntityType {
    name: &'static str,
    plural: &'static str,
}

impl EntityType {
    /// Declares a type with its singular and plural display names.
    #[must_use]
    pub const fn new(name: &'static str, plural: &'static str) -> Self {
        Self { name, plural }
    }

    /// Returns the singular name, e.g. `Event`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Returns the plural name, e.g. `Events`.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        self.plural
    }

    /// Formats a count with the matching noun: `1 Event`, `3 Events`.
    #[must_use]
    pub fn count_phrase(self, count: usize) -> String {
        if count == 1 {
            format!("1 {}", self.name)
        } else {
            format!("{count} {}", self.plural)
        }
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for EntityType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name)
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self.name)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
