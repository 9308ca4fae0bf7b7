//! Entity arena with generational indices.
//!
//! The `EntityStore` owns every [`EntityNode`] and hands out [`EntityId`]s.
//! Removed slots are recycled with a new generation so that ids held past
//! removal are reported as stale.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use encore_foundation::{EntityId, Error, Result};

use crate::node::EntityNode;

#[derive(Clone, Debug)]
struct Slot {
    /// Even generations are free, odd generations are alive.
    generation: u32,
    node: Option<EntityNode>,
}

/// Arena of entity nodes.
///
/// Backed by persistent vectors, so cloning the store (to snapshot a graph
/// for a transaction) is O(1).
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    slots: im::Vector<Slot>,
    /// Free list of indices available for reuse.
    free_list: im::Vector<u64>,
    /// Count of live entities.
    live_count: usize,
}

impl EntityStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its id.
    ///
    /// Reuses indices from the free list when available.
    pub fn spawn(&mut self, node: EntityNode) -> EntityId {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop_back() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                // Was even/free, now odd/alive
                slot.generation += 1;
                slot.node = Some(node);
                return EntityId::new(index, slot.generation);
            }
        }

        let index = self.slots.len() as u64;
        self.slots.push_back(Slot {
            generation: 1,
            node: Some(node),
        });
        EntityId::new(index, 1)
    }

    /// Removes a node, returning it.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is stale or never existed.
    pub fn destroy(&mut self, id: EntityId) -> Result<EntityNode> {
        self.validate(id)?;

        let slot = self
            .slots
            .get_mut(id.index as usize)
            .ok_or_else(|| Error::entity_not_found(id))?;
        // Was odd/alive, now even/free
        slot.generation += 1;
        let node = slot.node.take().ok_or_else(|| Error::entity_not_found(id))?;
        self.free_list.push_back(id.index);
        self.live_count -= 1;

        Ok(node)
    }

    /// Checks if an entity exists and is not stale.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.validate(id).is_ok()
    }

    /// Returns true if the id once named an entity that has since been
    /// removed.
    #[must_use]
    pub fn is_removed(&self, id: EntityId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.generation > id.generation && id.generation % 2 == 1)
    }

    /// Validates that an entity is live.
    ///
    /// # Errors
    ///
    /// Returns a `StaleEntity` error for a removed entity and an
    /// `EntityNotFound` error for an id that never existed.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        let Some(slot) = self.slots.get(id.index as usize) else {
            return Err(Error::entity_not_found(id));
        };

        if slot.generation != id.generation {
            if self.is_removed(id) {
                return Err(Error::stale_entity(id));
            }
            return Err(Error::entity_not_found(id));
        }

        if slot.generation % 2 == 0 || slot.node.is_none() {
            return Err(Error::entity_not_found(id));
        }

        Ok(())
    }

    /// Returns the node for a live id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is stale or never existed.
    pub fn get(&self, id: EntityId) -> Result<&EntityNode> {
        self.validate(id)?;
        self.slots
            .get(id.index as usize)
            .and_then(|slot| slot.node.as_ref())
            .ok_or_else(|| Error::entity_not_found(id))
    }

    /// Returns the node for a live id, mutably.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is stale or never existed.
    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut EntityNode> {
        self.validate(id)?;
        self.slots
            .get_mut(id.index as usize)
            .and_then(|slot| slot.node.as_mut())
            .ok_or_else(|| Error::entity_not_found(id))
    }

    /// Returns the total number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over all live entities in index order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityNode)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.node
                .as_ref()
                .map(|node| (EntityId::new(idx as u64, slot.generation), node))
        })
    }
}
