//! Declarative relation catalog.
//!
//! The catalog lists every entity kind and every one-to-many relation
//! between kinds. It is assembled once through a [`CatalogBuilder`] at
//! startup and is immutable afterwards; the engine shares it by `Arc`.

use std::collections::{BTreeMap, HashMap};

use encore_foundation::{EntityType, Error, Result};

/// Declaration of an entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityKind {
    /// The entity type.
    pub ty: EntityType,
    /// Display name of the simple key property (e.g. `Name`, `Date`).
    pub key_name: &'static str,
    /// The parent type whose key is part of this kind's identity.
    pub identifying_parent: Option<EntityType>,
}

impl EntityKind {
    /// Declares a top-level kind, unique by simple key alone.
    #[must_use]
    pub const fn top_level(ty: EntityType, key_name: &'static str) -> Self {
        Self {
            ty,
            key_name,
            identifying_parent: None,
        }
    }

    /// Declares a kind whose identity includes its parent's key.
    #[must_use]
    pub const fn identified_by(ty: EntityType, key_name: &'static str, parent: EntityType) -> Self {
        Self {
            ty,
            key_name,
            identifying_parent: Some(parent),
        }
    }

    /// Returns true if this kind has no identifying parent.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.identifying_parent.is_none()
    }
}

/// A one-to-many relation: one parent, many children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relation {
    /// The "one" side.
    pub parent: EntityType,
    /// The "many" side.
    pub child: EntityType,
    /// Whether a persisted child must have a parent.
    pub mandatory: bool,
    /// Whether the parent contributes to the child's key.
    ///
    /// Set by the builder from the child's [`EntityKind`].
    pub identifying: bool,
}

impl Relation {
    /// Declares a relation every persisted child must participate in.
    #[must_use]
    pub const fn mandatory(parent: EntityType, child: EntityType) -> Self {
        Self {
            parent,
            child,
            mandatory: true,
            identifying: false,
        }
    }

    /// Declares a relation a child may leave unset.
    #[must_use]
    pub const fn optional(parent: EntityType, child: EntityType) -> Self {
        Self {
            parent,
            child,
            mandatory: false,
            identifying: false,
        }
    }
}

/// Collects kind and relation declarations, then freezes them.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    kinds: BTreeMap<EntityType, EntityKind>,
    relations: Vec<Relation>,
    subtypes: BTreeMap<EntityType, EntityType>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is already registered.
    pub fn register_kind(&mut self, kind: EntityKind) -> Result<()> {
        if self.kinds.contains_key(&kind.ty) || self.subtypes.contains_key(&kind.ty) {
            return Err(Error::internal(format!(
                "entity kind already registered: {}",
                kind.ty
            )));
        }
        self.kinds.insert(kind.ty, kind);
        Ok(())
    }

    /// Registers a relation.
    ///
    /// # Errors
    ///
    /// Returns an error if a relation between the same two types is already
    /// registered.
    pub fn register_relation(&mut self, relation: Relation) -> Result<()> {
        if self
            .relations
            .iter()
            .any(|r| r.parent == relation.parent && r.child == relation.child)
        {
            return Err(Error::internal(format!(
                "relation already registered: {} -> {}",
                relation.parent, relation.child
            )));
        }
        self.relations.push(relation);
        Ok(())
    }

    /// Declares `subtype` as a concrete variant collapsing to `main`.
    ///
    /// # Errors
    ///
    /// Returns an error if `subtype` is already registered as a kind or
    /// subtype.
    pub fn register_subtype(&mut self, subtype: EntityType, main: EntityType) -> Result<()> {
        if self.kinds.contains_key(&subtype) || self.subtypes.contains_key(&subtype) {
            return Err(Error::internal(format!(
                "subtype already registered: {subtype}"
            )));
        }
        self.subtypes.insert(subtype, main);
        Ok(())
    }

    /// Validates the declarations and freezes them into a catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A relation or subtype names an undeclared kind
    /// - A kind's identifying parent has no matching relation
    /// - An identifying relation is declared optional
    pub fn build(self) -> Result<RelationCatalog> {
        for (subtype, main) in &self.subtypes {
            if !self.kinds.contains_key(main) {
                return Err(Error::internal(format!(
                    "subtype {subtype} collapses to undeclared kind {main}"
                )));
            }
        }

        let mut relations = self.relations;
        for relation in &mut relations {
            for ty in [relation.parent, relation.child] {
                if !self.kinds.contains_key(&ty) {
                    return Err(Error::internal(format!(
                        "relation {} -> {} names undeclared kind {ty}",
                        relation.parent, relation.child
                    )));
                }
            }
            let child_kind = &self.kinds[&relation.child];
            if child_kind.identifying_parent == Some(relation.parent) {
                if !relation.mandatory {
                    return Err(Error::internal(format!(
                        "identifying relation {} -> {} must be mandatory",
                        relation.parent, relation.child
                    )));
                }
                relation.identifying = true;
            }
        }

        for kind in self.kinds.values() {
            if let Some(parent) = kind.identifying_parent {
                if !relations
                    .iter()
                    .any(|r| r.parent == parent && r.child == kind.ty)
                {
                    return Err(Error::internal(format!(
                        "{} is identified by {parent} but no relation {parent} -> {} is declared",
                        kind.ty, kind.ty
                    )));
                }
            }
        }

        let mut parents: HashMap<EntityType, Vec<Relation>> = HashMap::new();
        let mut children: HashMap<EntityType, Vec<Relation>> = HashMap::new();
        for relation in &relations {
            parents.entry(relation.child).or_default().push(*relation);
            children.entry(relation.parent).or_default().push(*relation);
        }

        Ok(RelationCatalog {
            kinds: self.kinds.into_iter().collect(),
            subtypes: self.subtypes.into_iter().collect(),
            parents,
            children,
        })
    }
}

/// Immutable table of entity kinds and the relations between them.
#[derive(Debug)]
pub struct RelationCatalog {
    kinds: HashMap<EntityType, EntityKind>,
    subtypes: HashMap<EntityType, EntityType>,
    /// Relations keyed by their child type.
    parents: HashMap<EntityType, Vec<Relation>>,
    /// Relations keyed by their parent type.
    children: HashMap<EntityType, Vec<Relation>>,
}

impl RelationCatalog {
    /// Collapses a concrete subtype to its declared main type.
    ///
    /// Types that are not subtypes are returned unchanged.
    #[must_use]
    pub fn main_type(&self, ty: EntityType) -> EntityType {
        self.subtypes.get(&ty).copied().unwrap_or(ty)
    }

    /// Returns the kind declaration for a type (or its main type).
    ///
    /// # Errors
    ///
    /// Returns a `NotSupported` error for types the catalog does not know.
    pub fn kind(&self, ty: EntityType) -> Result<&EntityKind> {
        self.kinds
            .get(&self.main_type(ty))
            .ok_or_else(|| Error::not_supported(format!("unknown entity type: {ty}")))
    }

    /// Returns true if the type (or its main type) is declared.
    #[must_use]
    pub fn is_known(&self, ty: EntityType) -> bool {
        self.kinds.contains_key(&self.main_type(ty))
    }

    /// Looks up a declared kind by its type name, ignoring case.
    #[must_use]
    pub fn kind_named(&self, name: &str) -> Option<&EntityKind> {
        self.kinds
            .values()
            .find(|k| k.ty.name().eq_ignore_ascii_case(name))
    }

    /// Relations in which `ty` is the child.
    #[must_use]
    pub fn parent_relations(&self, ty: EntityType) -> &[Relation] {
        self.parents
            .get(&self.main_type(ty))
            .map_or(&[], Vec::as_slice)
    }

    /// Relations in which `ty` is the parent.
    #[must_use]
    pub fn child_relations(&self, ty: EntityType) -> &[Relation] {
        self.children
            .get(&self.main_type(ty))
            .map_or(&[], Vec::as_slice)
    }

    /// The relation between two types, if declared.
    #[must_use]
    pub fn relation(&self, parent: EntityType, child: EntityType) -> Option<&Relation> {
        let parent = self.main_type(parent);
        self.parent_relations(child)
            .iter()
            .find(|r| r.parent == parent)
    }

    /// The identifying relation of a type, if it has one.
    #[must_use]
    pub fn identifying_relation(&self, ty: EntityType) -> Option<&Relation> {
        self.parent_relations(ty).iter().find(|r| r.identifying)
    }

    /// All declared kinds, sorted by type name.
    #[must_use]
    pub fn kinds(&self) -> Vec<&EntityKind> {
        let mut kinds: Vec<_> = self.kinds.values().collect();
        kinds.sort_by_key(|k| k.ty);
        kinds
    }
}
