//! Ordered, key-indexed child collections.

use encore_foundation::{EntityId, EntityType, Key};

/// One parent's children of one type, ordered by [`Key`].
///
/// Lookup is O(log n) and iteration is in key order. Only the integrity
/// engine can insert or remove entries, so every change to membership goes
/// through the checks that keep both sides of the relation mirrored.
///
/// Backed by a persistent map: cloning is O(1), which keeps graph snapshots
/// cheap.
#[derive(Clone, Debug)]
pub struct SortedChildCollection {
    child_type: EntityType,
    entries: im::OrdMap<Key, EntityId>,
}

impl SortedChildCollection {
    pub(crate) fn new(child_type: EntityType) -> Self {
        Self {
            child_type,
            entries: im::OrdMap::new(),
        }
    }

    /// The type of the children held.
    #[must_use]
    pub fn child_type(&self) -> EntityType {
        self.child_type
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a child by key.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<EntityId> {
        self.entries.get(key).copied()
    }

    /// Returns true if a child has the given key.
    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns true if the entity is a member.
    ///
    /// This is a linear scan; prefer [`get`](Self::get) when the key is known.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.values().any(|&member| member == id)
    }

    /// Iterates children in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, EntityId)> {
        self.entries.iter().map(|(k, &id)| (k, id))
    }

    /// Iterates child ids in key order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.values().copied()
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    /// The child with the lowest key.
    #[must_use]
    pub fn first(&self) -> Option<(&Key, EntityId)> {
        self.entries.get_min().map(|(k, id)| (k, *id))
    }

    /// The child with the highest key.
    #[must_use]
    pub fn last(&self) -> Option<(&Key, EntityId)> {
        self.entries.get_max().map(|(k, id)| (k, *id))
    }

    /// Zero-based position of a key in iteration order.
    #[must_use]
    pub fn position(&self, key: &Key) -> Option<usize> {
        if !self.entries.contains_key(key) {
            return None;
        }
        Some(self.entries.range(..key).count())
    }

    /// Inserts a child. The engine checks for collisions first; an occupied
    /// key here means a broken invariant.
    pub(crate) fn insert(&mut self, key: Key, id: EntityId) -> Option<EntityId> {
        self.entries.insert(key, id)
    }

    pub(crate) fn remove(&mut self, key: &Key) -> Option<EntityId> {
        self.entries.remove(key)
    }
}
