//! Entity identifiers with generational indices.

use std::fmt;

/// Identifier of an entity in the arena.
///
/// Parents and children refer to each other only through these ids. The
/// generation counter changes when an index is reused after an entity is
/// removed, so a handle kept past removal is detected as stale instead of
/// silently addressing a different entity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityId {
    /// Index into the arena.
    pub index: u64,
    /// Generation counter for stale handle detection.
    pub generation: u32,
}

impl EntityId {
    /// Creates a new entity ID with the given index and generation.
    #[must_use]
    pub const fn new(index: u64, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}
