//! Per-entity state held in the arena.

use encore_foundation::{EntityId, EntityType};

use crate::catalog::{EntityKind, RelationCatalog};
use crate::collection::SortedChildCollection;

/// Where an entity is in its lifecycle.
///
/// `Removed` is terminal and is only ever observed through a stale id; the
/// node itself leaves the arena on removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Freshly created: no simple key, no parents, no children.
    Unattached,
    /// Has a key or a parent but has not been admitted.
    PersistencePending,
    /// Admitted; every invariant holds.
    Persisted,
    /// Removed from the graph.
    Removed,
}

/// The state of one entity.
///
/// Parents and children are held as ids. Only the engine mutates nodes, so
/// a child listed in a parent's collection always names that parent on its
/// own side and vice versa.
#[derive(Clone, Debug)]
pub struct EntityNode {
    kind: EntityKind,
    concrete: EntityType,
    simple_key: Option<String>,
    identifying_parent: Option<EntityId>,
    parents: im::OrdMap<EntityType, Option<EntityId>>,
    children: im::OrdMap<EntityType, SortedChildCollection>,
    lifecycle: Lifecycle,
}

impl EntityNode {
    /// Builds an unattached node with the parent and child skeletons the
    /// catalog declares for the kind.
    pub(crate) fn new(kind: EntityKind, concrete: EntityType, catalog: &RelationCatalog) -> Self {
        let parents = catalog
            .parent_relations(kind.ty)
            .iter()
            .filter(|r| !r.identifying)
            .map(|r| (r.parent, None))
            .collect();
        let children = catalog
            .child_relations(kind.ty)
            .iter()
            .map(|r| (r.child, SortedChildCollection::new(r.child)))
            .collect();
        Self {
            kind,
            concrete,
            simple_key: None,
            identifying_parent: None,
            parents,
            children,
            lifecycle: Lifecycle::Unattached,
        }
    }

    /// The declared kind (main type).
    #[must_use]
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// The main type used for relation lookup.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.kind.ty
    }

    /// The concrete type the entity was created as.
    #[must_use]
    pub fn concrete_type(&self) -> EntityType {
        self.concrete
    }

    /// The entity's own key component, if set.
    #[must_use]
    pub fn simple_key(&self) -> Option<&str> {
        self.simple_key.as_deref()
    }

    /// The identifying parent, if set.
    #[must_use]
    pub fn identifying_parent(&self) -> Option<EntityId> {
        self.identifying_parent
    }

    /// The current non-identifying parent of the given type.
    ///
    /// Returns `None` both for an unset relation and for an undeclared one;
    /// use [`has_parent_relation`](Self::has_parent_relation) to tell apart.
    #[must_use]
    pub fn parent(&self, parent_type: EntityType) -> Option<EntityId> {
        self.parents.get(&parent_type).copied().flatten()
    }

    /// Returns true if the kind declares a non-identifying relation to the
    /// parent type.
    #[must_use]
    pub fn has_parent_relation(&self, parent_type: EntityType) -> bool {
        self.parents.contains_key(&parent_type)
    }

    /// All non-identifying parent slots, set or not.
    pub fn parents(&self) -> impl Iterator<Item = (EntityType, Option<EntityId>)> + '_ {
        self.parents.iter().map(|(ty, id)| (*ty, *id))
    }

    /// Every parent currently held, identifying first.
    #[must_use]
    pub fn held_parents(&self) -> Vec<EntityId> {
        self.identifying_parent
            .into_iter()
            .chain(self.parents.values().filter_map(|p| *p))
            .collect()
    }

    /// The collection of children of the given type.
    #[must_use]
    pub fn children(&self, child_type: EntityType) -> Option<&SortedChildCollection> {
        self.children.get(&child_type)
    }

    /// All child collections, ordered by child type.
    pub fn child_collections(&self) -> impl Iterator<Item = &SortedChildCollection> {
        self.children.values()
    }

    /// Returns true if any child collection is non-empty.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.children.values().any(|c| !c.is_empty())
    }

    /// Where the entity is in its lifecycle.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Returns true once the entity has been admitted.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.lifecycle == Lifecycle::Persisted
    }

    pub(crate) fn set_simple_key(&mut self, simple_key: String) {
        self.simple_key = Some(simple_key);
        self.touch();
    }

    pub(crate) fn set_identifying_parent(&mut self, parent: Option<EntityId>) {
        self.identifying_parent = parent;
        self.touch();
    }

    pub(crate) fn set_parent(&mut self, parent_type: EntityType, parent: Option<EntityId>) {
        self.parents.insert(parent_type, parent);
        self.touch();
    }

    pub(crate) fn children_mut(
        &mut self,
        child_type: EntityType,
    ) -> Option<&mut SortedChildCollection> {
        self.children.get_mut(&child_type)
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.lifecycle = Lifecycle::Persisted;
    }

    /// Moves an unattached node to pending on its first change.
    fn touch(&mut self) {
        if self.lifecycle == Lifecycle::Unattached {
            self.lifecycle = Lifecycle::PersistencePending;
        }
    }
}
