//! Typed handles over graph entities.
//!
//! A handle is a `Copy` wrapper around an [`EntityId`]. It carries no state
//! of its own: every read goes to the graph and every write goes through the
//! integrity engine.

use encore_foundation::{EntityId, EntityType, Error, Key, Result};
use encore_storage::{DuplicateFinder, EntityKind, Graph};
use tracing::debug;

/// An archive entity type with a typed handle.
pub trait Entity: Copy {
    /// The declared kind.
    const KIND: EntityKind;

    /// The underlying arena id.
    fn id(self) -> EntityId;

    /// Wraps an id without checking its type. Use [`Entity::from_id`] for
    /// ids of unknown origin.
    fn from_id_unchecked(id: EntityId) -> Self;

    /// Wraps an id after checking it names a live entity of this type.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is stale or of another type.
    fn from_id(graph: &Graph, id: EntityId) -> Result<Self> {
        let actual = graph.entity_type(id)?;
        if actual != Self::KIND.ty {
            return Err(Error::not_supported(format!(
                "{} is not a {}",
                graph.describe(id),
                Self::KIND.ty
            )));
        }
        Ok(Self::from_id_unchecked(id))
    }

    /// The entity's current full key.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity has been removed.
    fn key(self, graph: &Graph) -> Result<Key> {
        graph.key(self.id())
    }

    /// The entity's own key component.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity has been removed.
    fn simple_key(self, graph: &Graph) -> Result<String> {
        Ok(self.key(graph)?.simple().to_string())
    }

    /// Changes the entity's simple key. The input is normalized to the
    /// type's key format first.
    ///
    /// # Errors
    ///
    /// Returns a format error, `BlankIdentity` or `DuplicateKey`.
    fn rename(self, graph: &mut Graph, simple_key: &str) -> Result<()> {
        let value = crate::keys::normalize(Self::KIND.ty, simple_key)?;
        graph.set_simple_key(self.id(), Some(&value))
    }

    /// Removes the entity.
    ///
    /// # Errors
    ///
    /// Returns `ReferentialIntegrity` if anything still belongs to it.
    fn remove(self, graph: &mut Graph) -> Result<()> {
        graph.remove(self.id())
    }

    /// Every persisted entity of this type, in key order.
    fn all(graph: &Graph) -> Vec<Self> {
        graph
            .entities_of(Self::KIND.ty)
            .into_iter()
            .map(Self::from_id_unchecked)
            .collect()
    }
}

macro_rules! entity_handle {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(encore_foundation::EntityId);

        impl $crate::entity::Entity for $name {
            const KIND: encore_storage::EntityKind = $kind;

            fn id(self) -> encore_foundation::EntityId {
                self.0
            }

            fn from_id_unchecked(id: encore_foundation::EntityId) -> Self {
                Self(id)
            }
        }
    };
}
pub(crate) use entity_handle;

/// Creates, fills in and persists an entity as one step.
///
/// If any step fails the graph is restored, so no half-built entity is left
/// behind.
pub(crate) fn insert_with<E: Entity>(
    graph: &mut Graph,
    simple_key: &str,
    attach: impl FnOnce(&mut Graph, EntityId) -> Result<()>,
) -> Result<E> {
    let snapshot = graph.clone();
    match build(graph, E::KIND.ty, simple_key, attach) {
        Ok(id) => {
            debug!(entity = %graph.describe(id), "inserted");
            Ok(E::from_id_unchecked(id))
        }
        Err(err) => {
            *graph = snapshot;
            Err(err)
        }
    }
}

fn build(
    graph: &mut Graph,
    ty: EntityType,
    simple_key: &str,
    attach: impl FnOnce(&mut Graph, EntityId) -> Result<()>,
) -> Result<EntityId> {
    let value = crate::keys::normalize(ty, simple_key)?;
    let id = graph.create(ty)?;
    graph.set_simple_key(id, Some(&value))?;
    attach(graph, id)?;
    graph.persist(id)?;
    Ok(id)
}

/// The children of `parent` of type `C`, in key order.
pub(crate) fn children_of<C: Entity>(graph: &Graph, parent: EntityId) -> Result<Vec<C>> {
    Ok(graph
        .children(parent, C::KIND.ty)?
        .ids()
        .map(C::from_id_unchecked)
        .collect())
}

/// The current parent of `child` of type `P`, if set.
pub(crate) fn parent_of<P: Entity>(graph: &Graph, child: EntityId) -> Result<Option<P>> {
    Ok(graph
        .parent(child, P::KIND.ty)?
        .map(P::from_id_unchecked))
}

/// Finds a top-level entity by simple key, ignoring case.
///
/// The input is normalized to the type's key format first.
pub(crate) fn find_top_level<E: Entity>(graph: &Graph, simple_key: &str) -> Result<Option<E>> {
    let value = crate::keys::normalize(E::KIND.ty, simple_key)?;
    Ok(DuplicateFinder::new(graph)
        .find(E::KIND.ty, &value, None, None)
        .map(E::from_id_unchecked))
}

/// Finds a child of `parent` of type `C` by simple key, ignoring case.
///
/// The input is normalized to the child type's key format first.
pub(crate) fn find_child<C: Entity>(
    graph: &Graph,
    parent: EntityId,
    simple_key: &str,
) -> Result<Option<C>> {
    let value = crate::keys::normalize(C::KIND.ty, simple_key)?;
    let key = Key::new(value, Some(graph.key(parent)?));
    Ok(graph
        .children(parent, C::KIND.ty)?
        .get(&key)
        .map(C::from_id_unchecked))
}
