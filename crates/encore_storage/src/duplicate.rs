//! Full-population duplicate detection.
//!
//! Where no single parent collection can answer "is this key taken?" (top
//! level types, or lookups that span parents) the finder scans every live
//! entity of the type. The scan is linear on purpose: archive-sized
//! populations make it cheap enough, and it depends on nothing but the
//! population source.

use encore_foundation::key::eq_ignore_case;
use encore_foundation::{EntityId, EntityType, Key};
use tracing::trace;

/// A source of live entities, as enumerated by the persistence session.
///
/// The graph implements this over its persisted entities; tests can supply
/// a fixed population instead.
pub trait Population {
    /// All live entities whose main type is `ty`.
    fn all_objects(&self, ty: EntityType) -> Vec<EntityId>;

    /// The current key of an entity, or `None` if it has no simple key yet
    /// or is not part of the population.
    fn key_of(&self, id: EntityId) -> Option<Key>;
}

/// Scans a population for key collisions.
pub struct DuplicateFinder<'a> {
    population: &'a dyn Population,
}

impl<'a> DuplicateFinder<'a> {
    /// Creates a finder over the given population.
    #[must_use]
    pub fn new(population: &'a dyn Population) -> Self {
        Self { population }
    }

    /// Finds an entity of type `ty`, other than `candidate`, whose simple key
    /// matches `simple_key` ignoring case.
    ///
    /// With `identifying_parent` given, the match must also have that parent
    /// key; without it, parents are not compared. Returns the first match.
    #[must_use]
    pub fn find(
        &self,
        ty: EntityType,
        simple_key: &str,
        identifying_parent: Option<&Key>,
        candidate: Option<EntityId>,
    ) -> Option<EntityId> {
        let population = self.population.all_objects(ty);
        trace!(
            entity_type = %ty,
            key = simple_key,
            population = population.len(),
            "scanning for duplicate key"
        );

        population.into_iter().find(|&id| {
            if Some(id) == candidate {
                return false;
            }
            let Some(key) = self.population.key_of(id) else {
                return false;
            };
            if !eq_ignore_case(key.simple(), simple_key) {
                return false;
            }
            match identifying_parent {
                Some(parent) => key.parent() == Some(parent),
                None => true,
            }
        })
    }

    /// Finds an entity of type `ty`, other than `candidate`, with exactly the
    /// given composite key.
    #[must_use]
    pub fn find_key(
        &self,
        ty: EntityType,
        key: &Key,
        candidate: Option<EntityId>,
    ) -> Option<EntityId> {
        self.population
            .all_objects(ty)
            .into_iter()
            .filter(|&id| Some(id) != candidate)
            .find(|&id| self.population.key_of(id).as_ref() == Some(key))
    }

    /// All entities of type `ty` whose simple key matches, in population
    /// order.
    #[must_use]
    pub fn find_all(&self, ty: EntityType, simple_key: &str) -> Vec<EntityId> {
        self.population
            .all_objects(ty)
            .into_iter()
            .filter(|&id| {
                self.population
                    .key_of(id)
                    .is_some_and(|key| eq_ignore_case(key.simple(), simple_key))
            })
            .collect()
    }
}
