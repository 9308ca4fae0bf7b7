//! The entity graph and its integrity engine.
//!
//! `Graph` owns every entity and is the only code path that changes keys,
//! parents or child collections. Each operation validates first and mutates
//! second; the mutation itself runs against an O(1) snapshot of the arena
//! and is rolled back wholesale if any step fails, so a rejected operation
//! leaves the graph exactly as it was.
//!
//! Child collections are indexed by the children's keys. A key includes the
//! keys of all identifying ancestors, so re-keying or reparenting an entity
//! re-indexes it and every identifying descendant in every collection that
//! holds them.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use encore_foundation::{ChildCount, EntityId, EntityType, Error, ErrorKind, Key, Result};
use tracing::debug;

use crate::catalog::{EntityKind, RelationCatalog};
use crate::collection::SortedChildCollection;
use crate::duplicate::{DuplicateFinder, Population};
use crate::entity::EntityStore;
use crate::node::{EntityNode, Lifecycle};

/// The arena of entities plus the operations that keep it consistent.
///
/// Cloning is O(1) and yields an independent snapshot.
#[derive(Clone, Debug)]
pub struct Graph {
    catalog: Arc<RelationCatalog>,
    entities: EntityStore,
}

impl Graph {
    /// Creates an empty graph over a catalog.
    #[must_use]
    pub fn new(catalog: Arc<RelationCatalog>) -> Self {
        Self {
            catalog,
            entities: EntityStore::new(),
        }
    }

    /// The relation catalog.
    #[must_use]
    pub fn catalog(&self) -> &RelationCatalog {
        &self.catalog
    }

    /// Number of live entities, persisted or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the graph holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns true if the id names a live entity.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.exists(id)
    }

    /// Iterates all live entities in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityNode)> + '_ {
        self.entities.iter()
    }

    /// Returns the node for a live entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is stale or unknown.
    pub fn node(&self, id: EntityId) -> Result<&EntityNode> {
        self.entities.get(id)
    }

    /// The lifecycle state of an entity. Removed entities report
    /// [`Lifecycle::Removed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the id never named an entity.
    pub fn lifecycle(&self, id: EntityId) -> Result<Lifecycle> {
        if self.entities.is_removed(id) {
            return Ok(Lifecycle::Removed);
        }
        Ok(self.entities.get(id)?.lifecycle())
    }

    /// The main type of an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is stale or unknown.
    pub fn entity_type(&self, id: EntityId) -> Result<EntityType> {
        Ok(self.entities.get(id)?.entity_type())
    }

    /// The current key of an entity, computed from the live graph.
    ///
    /// # Errors
    ///
    /// Returns a `BlankIdentity` error if the simple key is not set yet.
    pub fn key(&self, id: EntityId) -> Result<Key> {
        match self.key_opt(id)? {
            Some(key) => Ok(key),
            None => {
                let kind = self.entities.get(id)?.kind();
                Err(Error::blank_identity(kind.ty, kind.key_name))
            }
        }
    }

    /// Compares the current keys of two entities.
    ///
    /// Both keys are re-read on every call, so the result always reflects
    /// the graph as it is now.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is missing or has no key.
    pub fn compare_keys(&self, a: EntityId, b: EntityId) -> Result<Ordering> {
        Ok(self.key(a)?.cmp(&self.key(b)?))
    }

    /// Human-readable description, e.g. `Event 'Fred's|2013/05/01'`.
    #[must_use]
    pub fn describe(&self, id: EntityId) -> String {
        match self.entities.get(id) {
            Ok(node) => match self.key_opt(id) {
                Ok(Some(key)) => format!("{} '{key}'", node.entity_type()),
                _ => format!("{} (no key)", node.entity_type()),
            },
            Err(_) => format!("{id:?}"),
        }
    }

    /// The identifying parent of an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is stale or unknown.
    pub fn identifying_parent(&self, id: EntityId) -> Result<Option<EntityId>> {
        Ok(self.entities.get(id)?.identifying_parent())
    }

    /// The current parent of an entity in the relation with `parent_type`,
    /// identifying or not.
    ///
    /// # Errors
    ///
    /// Returns `NotSupported` if no such relation is declared.
    pub fn parent(&self, id: EntityId, parent_type: EntityType) -> Result<Option<EntityId>> {
        let node = self.entities.get(id)?;
        let parent_type = self.catalog.main_type(parent_type);
        if node.kind().identifying_parent == Some(parent_type) {
            return Ok(node.identifying_parent());
        }
        if !node.has_parent_relation(parent_type) {
            return Err(Error::not_supported(format!(
                "a {} has no {parent_type}",
                node.entity_type()
            )));
        }
        Ok(node.parent(parent_type))
    }

    /// The children of an entity of the given type, in key order.
    ///
    /// # Errors
    ///
    /// Returns `NotSupported` if no such relation is declared.
    pub fn children(
        &self,
        id: EntityId,
        child_type: EntityType,
    ) -> Result<&SortedChildCollection> {
        let node = self.entities.get(id)?;
        let ty = node.entity_type();
        node.children(self.catalog.main_type(child_type)).ok_or_else(|| {
            Error::not_supported(format!("a {ty} has no {}", child_type.plural()))
        })
    }

    // --- Lifecycle ---

    /// Creates a new unattached entity of the given type.
    ///
    /// # Errors
    ///
    /// Returns `NotSupported` if the catalog does not declare the type.
    pub fn create(&mut self, ty: EntityType) -> Result<EntityId> {
        let kind = *self.catalog.kind(ty)?;
        let node = EntityNode::new(kind, ty, &self.catalog);
        let id = self.entities.spawn(node);
        debug!(entity_type = %ty, %id, "created entity");
        Ok(id)
    }

    /// Validates an entity and admits it to the persisted population.
    ///
    /// Persisting an already persisted entity does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending property if:
    /// - The simple key is not set
    /// - The identifying parent or a mandatory parent is not set
    /// - A parent has not been persisted yet
    /// - A top-level entity's simple key is taken by another live entity
    pub fn persist(&mut self, id: EntityId) -> Result<()> {
        let node = self.entities.get(id)?;
        if node.is_persisted() {
            return Ok(());
        }
        let kind = *node.kind();

        let Some(simple_key) = node.simple_key() else {
            return Err(Error::blank_identity(kind.ty, kind.key_name));
        };

        if let Some(parent_type) = kind.identifying_parent {
            if node.identifying_parent().is_none() {
                return Err(Error::missing_parent(
                    kind.ty,
                    Some(simple_key.to_string()),
                    parent_type,
                    true,
                ));
            }
        }

        for relation in self.catalog.parent_relations(kind.ty) {
            if relation.mandatory && !relation.identifying && node.parent(relation.parent).is_none()
            {
                return Err(Error::missing_parent(
                    kind.ty,
                    Some(self.key(id)?.to_string()),
                    relation.parent,
                    false,
                ));
            }
        }

        for parent in node.held_parents() {
            let parent_node = self.entities.get(parent)?;
            if !parent_node.is_persisted() {
                return Err(Error::new(ErrorKind::UnpersistedParent {
                    entity_type: kind.ty,
                    key: self.key(id)?.to_string(),
                    parent_type: parent_node.entity_type(),
                    parent_key: self.key(parent)?.to_string(),
                }));
            }
        }

        if kind.is_top_level()
            && DuplicateFinder::new(self)
                .find(kind.ty, simple_key, None, Some(id))
                .is_some()
        {
            return Err(Error::duplicate_key(
                kind.ty,
                kind.key_name,
                simple_key,
                None,
            ));
        }

        self.entities.get_mut(id)?.mark_persisted();
        debug!(entity_type = %kind.ty, key = %self.key(id)?, %id, "persisted entity");
        Ok(())
    }

    /// Removes an entity that no other entity depends on.
    ///
    /// # Errors
    ///
    /// Returns a `ReferentialIntegrity` error listing every populated child
    /// type and its count if any child remains.
    pub fn remove(&mut self, id: EntityId) -> Result<()> {
        let node = self.entities.get(id)?;
        if node.has_children() {
            let children = node
                .child_collections()
                .filter(|c| !c.is_empty())
                .map(|c| ChildCount {
                    child_type: c.child_type(),
                    count: c.len(),
                })
                .collect();
            let key = self
                .key_opt(id)?
                .map_or_else(|| "(no key)".to_string(), |k| k.to_string());
            return Err(Error::new(ErrorKind::ReferentialIntegrity {
                entity_type: node.entity_type(),
                key,
                children,
            }));
        }

        let description = self.describe(id);
        self.atomically(|graph| {
            let ty = graph.entities.get(id)?.entity_type();
            if let Some(key) = graph.key_opt(id)? {
                for parent in graph.entities.get(id)?.held_parents() {
                    graph.collection_mut(parent, ty)?.remove(&key);
                }
            }
            graph.entities.destroy(id)?;
            Ok(())
        })?;
        debug!(entity = %description, %id, "removed entity");
        Ok(())
    }

    // --- Identity ---

    /// Sets an entity's simple key.
    ///
    /// Setting the current value again does nothing.
    ///
    /// # Errors
    ///
    /// Returns a `BlankIdentity` error for a missing or blank value, and a
    /// `DuplicateKey` error if another entity already has the resulting key.
    /// The stored value is unchanged on error.
    pub fn set_simple_key(&mut self, id: EntityId, value: Option<&str>) -> Result<()> {
        let node = self.entities.get(id)?;
        let kind = *node.kind();
        let value = match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => return Err(Error::blank_identity(kind.ty, kind.key_name)),
        };
        if node.simple_key() == Some(value) {
            return Ok(());
        }

        if let Some(parent) = node.identifying_parent() {
            let prospective = Key::new(value, Some(self.key(parent)?));
            self.check_for_duplicate_child(parent, id, &prospective)?;
        } else if kind.is_top_level()
            && node.is_persisted()
            && DuplicateFinder::new(self)
                .find(kind.ty, value, None, Some(id))
                .is_some()
        {
            return Err(Error::duplicate_key(kind.ty, kind.key_name, value, None));
        }

        let value = value.to_string();
        self.atomically(|graph| graph.rekey(id, |node| node.set_simple_key(value)))?;
        debug!(entity = %self.describe(id), %id, "set simple key");
        Ok(())
    }

    /// Sets the identifying parent, moving the entity between parents.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The type declares no identifying parent (`NotSupported`)
    /// - `parent` is `None` (`MissingMandatoryParent`)
    /// - The parent has the wrong type (`IdentifyingParentTypeMismatch`)
    /// - The entity or the parent has no simple key yet (`BlankIdentity`)
    /// - The new parent already has a child with the resulting key
    ///
    /// On error the entity's parent, key and memberships are unchanged.
    pub fn set_identifying_parent(&mut self, id: EntityId, parent: Option<EntityId>) -> Result<()> {
        let node = self.entities.get(id)?;
        let kind = *node.kind();
        let Some(expected) = kind.identifying_parent else {
            return Err(Error::not_supported(format!(
                "a {} has no identifying parent",
                kind.ty
            )));
        };
        let Some(parent) = parent else {
            return Err(Error::missing_parent(
                kind.ty,
                self.key_opt(id)?.map(|k| k.to_string()),
                expected,
                true,
            ));
        };
        let actual = self.entities.get(parent)?.entity_type();
        if actual != expected {
            return Err(Error::new(ErrorKind::IdentifyingParentTypeMismatch {
                entity_type: kind.ty,
                expected,
                actual,
            }));
        }
        if node.identifying_parent() == Some(parent) {
            return Ok(());
        }
        let Some(simple_key) = node.simple_key() else {
            return Err(Error::blank_identity(kind.ty, kind.key_name));
        };
        if self.identity_closure(id)?.contains(&parent) {
            return Err(Error::not_supported(format!(
                "{} cannot be identified by its own descendant",
                self.describe(id)
            )));
        }

        let prospective = Key::new(simple_key, Some(self.key(parent)?));
        self.check_for_duplicate_child(parent, id, &prospective)?;

        self.atomically(|graph| {
            graph.rekey(id, |node| node.set_identifying_parent(Some(parent)))
        })?;
        debug!(entity = %self.describe(id), %id, parent = %parent, "set identifying parent");
        Ok(())
    }

    /// Sets or clears a non-identifying parent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No non-identifying relation to `parent_type` is declared
    /// - `parent` is `None` and the relation is mandatory
    /// - `parent` is not of `parent_type`
    /// - The entity has no simple key yet
    /// - The new parent already holds a child with the same key
    pub fn set_non_identifying_parent(
        &mut self,
        id: EntityId,
        parent_type: EntityType,
        parent: Option<EntityId>,
    ) -> Result<()> {
        let node = self.entities.get(id)?;
        let kind = *node.kind();
        let parent_type = self.catalog.main_type(parent_type);
        let relation = match self.catalog.relation(parent_type, kind.ty) {
            Some(r) if !r.identifying => *r,
            Some(_) => {
                return Err(Error::not_supported(format!(
                    "{parent_type} is the identifying parent of a {}; use set_identifying_parent",
                    kind.ty
                )));
            }
            None => {
                return Err(Error::not_supported(format!(
                    "a {} has no {parent_type}",
                    kind.ty
                )));
            }
        };

        let current = node.parent(parent_type);
        if current == parent {
            return Ok(());
        }

        match parent {
            None if relation.mandatory => {
                return Err(Error::missing_parent(
                    kind.ty,
                    self.key_opt(id)?.map(|k| k.to_string()),
                    parent_type,
                    false,
                ));
            }
            None => {}
            Some(parent) => {
                let actual = self.entities.get(parent)?.entity_type();
                if actual != parent_type {
                    return Err(Error::new(ErrorKind::ParentTypeMismatch {
                        entity_type: kind.ty,
                        expected: parent_type,
                        actual,
                    }));
                }
            }
        }

        let key = match self.key_opt(id)? {
            Some(key) => key,
            None => return Err(Error::blank_identity(kind.ty, kind.key_name)),
        };
        if let Some(parent) = parent {
            self.check_for_duplicate_child(parent, id, &key)?;
        }

        self.atomically(|graph| {
            if let Some(old) = current {
                graph.collection_mut(old, kind.ty)?.remove(&key);
            }
            graph.entities.get_mut(id)?.set_parent(parent_type, parent);
            if let Some(new) = parent {
                graph.index_child(new, id, kind.ty, key.clone())?;
            }
            Ok(())
        })?;
        debug!(
            entity = %self.describe(id),
            %id,
            parent_type = %parent_type,
            parent = ?parent,
            "set parent"
        );
        Ok(())
    }

    // --- Parent-side operations ---

    /// Adds `child` to `parent`'s collection, recording `parent` on the
    /// child's side.
    ///
    /// # Errors
    ///
    /// Returns `NotSupported` if no relation between the two types is
    /// declared, or any error the child-side setter raises.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        let parent_type = self.entities.get(parent)?.entity_type();
        let child_type = self.entities.get(child)?.entity_type();
        let relation = *self.catalog.relation(parent_type, child_type).ok_or_else(|| {
            Error::not_supported(format!("a {parent_type} has no {}", child_type.plural()))
        })?;

        if relation.identifying {
            self.set_identifying_parent(child, Some(parent))
        } else {
            self.set_non_identifying_parent(child, parent_type, Some(parent))
        }
    }

    /// Removes `child` from `parent`'s collection, clearing the child's
    /// reference to `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if `child` is not currently a child of `parent`, or
    /// if the relation is mandatory and the child is persisted.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        let parent_type = self.entities.get(parent)?.entity_type();
        let child_node = self.entities.get(child)?;
        let kind = *child_node.kind();
        let relation = *self.catalog.relation(parent_type, kind.ty).ok_or_else(|| {
            Error::not_supported(format!("a {parent_type} has no {}", kind.ty.plural()))
        })?;

        let recorded = if relation.identifying {
            child_node.identifying_parent()
        } else {
            child_node.parent(parent_type)
        };
        if recorded != Some(parent) {
            return Err(Error::not_supported(format!(
                "{} is not a child of {}",
                self.describe(child),
                self.describe(parent)
            )));
        }
        if relation.mandatory && child_node.is_persisted() {
            return Err(Error::missing_parent(
                kind.ty,
                self.key_opt(child)?.map(|k| k.to_string()),
                parent_type,
                relation.identifying,
            ));
        }

        if relation.identifying {
            self.atomically(|graph| graph.rekey(child, |node| node.set_identifying_parent(None)))?;
        } else {
            self.set_non_identifying_parent(child, parent_type, None)?;
        }
        debug!(
            parent = %self.describe(parent),
            child = %self.describe(child),
            "removed child"
        );
        Ok(())
    }

    /// Checks whether `parent` already holds a child, other than `child`
    /// itself, under `key`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if a different child holds the key, or
    /// `NotSupported` if the parent has no collection for the child's type.
    pub fn check_for_duplicate_child(
        &self,
        parent: EntityId,
        child: EntityId,
        key: &Key,
    ) -> Result<()> {
        let kind = *self.entities.get(child)?.kind();
        match self.children(parent, kind.ty)?.get(key) {
            Some(existing) if existing != child => Err(duplicate_error(&kind, key)),
            _ => Ok(()),
        }
    }

    // --- Lookup ---

    /// All persisted entities of a type, in key order.
    #[must_use]
    pub fn entities_of(&self, ty: EntityType) -> Vec<EntityId> {
        let mut keyed: Vec<(Key, EntityId)> = self
            .all_objects(ty)
            .into_iter()
            .filter_map(|id| self.key_of(id).map(|k| (k, id)))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, id)| id).collect()
    }

    /// Resolves a full key to a live entity of the given type.
    ///
    /// Top-level keys are looked up in the persisted population; nested keys
    /// are resolved parent by parent through the child collections.
    ///
    /// # Errors
    ///
    /// Returns `NotSupported` if the type is unknown.
    pub fn resolve(&self, ty: EntityType, key: &Key) -> Result<Option<EntityId>> {
        let kind = *self.catalog.kind(ty)?;
        match (kind.identifying_parent, key.parent()) {
            (None, None) => Ok(DuplicateFinder::new(self).find(kind.ty, key.simple(), None, None)),
            (Some(parent_type), Some(parent_key)) => {
                let Some(parent) = self.resolve(parent_type, parent_key)? else {
                    return Ok(None);
                };
                Ok(self.children(parent, kind.ty)?.get(key))
            }
            _ => Ok(None),
        }
    }

    /// Verifies every structural invariant of the graph.
    ///
    /// Intended for tests and diagnostics; a healthy graph always passes.
    ///
    /// # Errors
    ///
    /// Returns an `Internal` error describing the first violation found.
    pub fn check_integrity(&self) -> Result<()> {
        let mut seen: HashSet<(EntityType, Key)> = HashSet::new();

        for (id, node) in self.entities.iter() {
            let ty = node.entity_type();
            let key = self.key_opt(id)?;

            if node.is_persisted() {
                let Some(key) = &key else {
                    return Err(violation(format!("persisted {ty} {id} has no key")));
                };
                if key.simple().trim().is_empty() {
                    return Err(violation(format!("persisted {ty} {id} has a blank key")));
                }
                if !seen.insert((ty, key.clone())) {
                    return Err(violation(format!("duplicate persisted {ty} '{key}'")));
                }
                if node.kind().identifying_parent.is_some() && node.identifying_parent().is_none()
                {
                    return Err(violation(format!(
                        "persisted {ty} '{key}' has no identifying parent"
                    )));
                }
                for relation in self.catalog.parent_relations(ty) {
                    if relation.mandatory
                        && !relation.identifying
                        && node.parent(relation.parent).is_none()
                    {
                        return Err(violation(format!(
                            "persisted {ty} '{key}' has no {}",
                            relation.parent
                        )));
                    }
                }
            }

            // Child side: every held parent lists this entity under its key
            for parent in node.held_parents() {
                let Some(key) = &key else {
                    return Err(violation(format!("{ty} {id} has a parent but no key")));
                };
                let listed = self.entities.get(parent)?.children(ty).and_then(|c| c.get(key));
                if listed != Some(id) {
                    return Err(violation(format!(
                        "{} does not list {}",
                        self.describe(parent),
                        self.describe(id)
                    )));
                }
            }

            // Parent side: every listed child records this entity
            for collection in node.child_collections() {
                for (listed_key, child) in collection.iter() {
                    let child_node = self.entities.get(child)?;
                    let recorded = if child_node.kind().identifying_parent == Some(ty) {
                        child_node.identifying_parent()
                    } else {
                        child_node.parent(ty)
                    };
                    if recorded != Some(id) {
                        return Err(violation(format!(
                            "{} lists {} but the child does not record it",
                            self.describe(id),
                            self.describe(child)
                        )));
                    }
                    if self.key_opt(child)?.as_ref() != Some(listed_key) {
                        return Err(violation(format!(
                            "{} is indexed under stale key '{listed_key}'",
                            self.describe(child)
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    // --- Internals ---

    /// Runs a mutation against a snapshot, restoring it on error.
    fn atomically<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.entities.clone();
        let result = op(self);
        if result.is_err() {
            self.entities = snapshot;
        }
        result
    }

    fn key_opt(&self, id: EntityId) -> Result<Option<Key>> {
        let node = self.entities.get(id)?;
        let Some(simple) = node.simple_key() else {
            return Ok(None);
        };
        let parent = match node.identifying_parent() {
            Some(parent) => match self.key_opt(parent)? {
                Some(key) => Some(key),
                None => return Ok(None),
            },
            None => None,
        };
        Ok(Some(Key::new(simple, parent)))
    }

    /// The entity and all of its identifying descendants: everything whose
    /// key embeds this entity's key.
    fn identity_closure(&self, id: EntityId) -> Result<Vec<EntityId>> {
        let mut closure = vec![id];
        let mut next = 0;
        while next < closure.len() {
            let node = self.entities.get(closure[next])?;
            for relation in self.catalog.child_relations(node.entity_type()) {
                if relation.identifying {
                    if let Some(children) = node.children(relation.child) {
                        closure.extend(children.ids());
                    }
                }
            }
            next += 1;
        }
        Ok(closure)
    }

    /// Applies a key-affecting change to `id` and re-indexes `id` and its
    /// identifying descendants in every collection that holds them.
    fn rekey(&mut self, id: EntityId, mutate: impl FnOnce(&mut EntityNode)) -> Result<()> {
        let closure = self.identity_closure(id)?;

        for &member in &closure {
            let Some(old_key) = self.key_opt(member)? else {
                continue;
            };
            let node = self.entities.get(member)?;
            let ty = node.entity_type();
            for parent in node.held_parents() {
                let collection = self.collection_mut(parent, ty)?;
                if collection.get(&old_key) == Some(member) {
                    collection.remove(&old_key);
                }
            }
        }

        mutate(self.entities.get_mut(id)?);

        for &member in &closure {
            let Some(new_key) = self.key_opt(member)? else {
                continue;
            };
            let node = self.entities.get(member)?;
            let ty = node.entity_type();
            for parent in node.held_parents() {
                self.index_child(parent, member, ty, new_key.clone())?;
            }
        }
        Ok(())
    }

    /// Inserts a child into a parent's collection, refusing to displace a
    /// different child.
    fn index_child(
        &mut self,
        parent: EntityId,
        child: EntityId,
        child_type: EntityType,
        key: Key,
    ) -> Result<()> {
        let existing = self.collection_mut(parent, child_type)?.get(&key);
        if let Some(existing) = existing {
            if existing != child {
                let kind = *self.entities.get(child)?.kind();
                return Err(duplicate_error(&kind, &key));
            }
        }
        self.collection_mut(parent, child_type)?.insert(key, child);
        Ok(())
    }

    fn collection_mut(
        &mut self,
        parent: EntityId,
        child_type: EntityType,
    ) -> Result<&mut SortedChildCollection> {
        let node = self.entities.get_mut(parent)?;
        let parent_type = node.entity_type();
        node.children_mut(child_type).ok_or_else(|| {
            Error::internal(format!("a {parent_type} has no collection of {child_type}"))
        })
    }
}

impl Population for Graph {
    fn all_objects(&self, ty: EntityType) -> Vec<EntityId> {
        let ty = self.catalog.main_type(ty);
        self.entities
            .iter()
            .filter(|(_, node)| node.entity_type() == ty && node.is_persisted())
            .map(|(id, _)| id)
            .collect()
    }

    fn key_of(&self, id: EntityId) -> Option<Key> {
        self.key_opt(id).ok().flatten()
    }
}

fn duplicate_error(kind: &EntityKind, key: &Key) -> Error {
    let parent = kind
        .identifying_parent
        .zip(key.parent())
        .map(|(ty, parent_key)| (ty, parent_key.to_string()));
    Error::duplicate_key(kind.ty, kind.key_name, key.simple(), parent)
}

fn violation(message: String) -> Error {
    Error::internal(format!("integrity check failed: {message}"))
}
