//! A venue catalog independent of the music archive crate.

use std::sync::Arc;

use encore_foundation::{EntityId, EntityType, Result};
use encore_storage::{CatalogBuilder, EntityKind, Graph, Relation, RelationCatalog};

pub const LOCATION: EntityType = EntityType::new("Location", "Locations");
pub const SERIES: EntityType = EntityType::new("Series", "Series");
pub const GENRE: EntityType = EntityType::new("Genre", "Genres");
pub const EVENT: EntityType = EntityType::new("Event", "Events");
pub const SET: EntityType = EntityType::new("Set", "Sets");

pub fn catalog() -> Arc<RelationCatalog> {
    let mut builder = CatalogBuilder::new();
    for kind in [
        EntityKind::top_level(LOCATION, "Name"),
        EntityKind::top_level(SERIES, "Name"),
        EntityKind::top_level(GENRE, "Name"),
        EntityKind::identified_by(EVENT, "Date", LOCATION),
        EntityKind::identified_by(SET, "SetNo", EVENT),
    ] {
        builder.register_kind(kind).unwrap();
    }
    for relation in [
        Relation::mandatory(LOCATION, EVENT),
        Relation::optional(SERIES, EVENT),
        Relation::mandatory(EVENT, SET),
        Relation::mandatory(GENRE, SET),
    ] {
        builder.register_relation(relation).unwrap();
    }
    Arc::new(builder.build().unwrap())
}

pub fn graph() -> Graph {
    Graph::new(catalog())
}

/// Creates and persists a top-level entity.
pub fn top_level(graph: &mut Graph, ty: EntityType, name: &str) -> Result<EntityId> {
    let id = graph.create(ty)?;
    graph.set_simple_key(id, Some(name))?;
    graph.persist(id)?;
    Ok(id)
}

/// Creates and persists an event at a location.
pub fn event(graph: &mut Graph, location: EntityId, date: &str) -> Result<EntityId> {
    let id = graph.create(EVENT)?;
    graph.set_simple_key(id, Some(date))?;
    graph.set_identifying_parent(id, Some(location))?;
    graph.persist(id)?;
    Ok(id)
}

/// Creates and persists a set within an event.
pub fn set(graph: &mut Graph, event: EntityId, number: &str, genre: EntityId) -> Result<EntityId> {
    let id = graph.create(SET)?;
    graph.set_simple_key(id, Some(number))?;
    graph.set_identifying_parent(id, Some(event))?;
    graph.set_non_identifying_parent(id, GENRE, Some(genre))?;
    graph.persist(id)?;
    Ok(id)
}

/// Simple keys of a parent's children, in collection order.
pub fn child_names(graph: &Graph, parent: EntityId, child_type: EntityType) -> Vec<String> {
    graph
        .children(parent, child_type)
        .unwrap()
        .keys()
        .map(|key| key.simple().to_string())
        .collect()
}
