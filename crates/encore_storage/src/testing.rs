//! Shared catalog for unit tests: a small slice of the music archive.

use std::sync::Arc;

use encore_foundation::EntityType;

use crate::catalog::{CatalogBuilder, EntityKind, Relation, RelationCatalog};
use crate::graph::Graph;

pub const LOCATION: EntityType = EntityType::new("Location", "Locations");
pub const SERIES: EntityType = EntityType::new("Series", "Series");
pub const GENRE: EntityType = EntityType::new("Genre", "Genres");
pub const EVENT: EntityType = EntityType::new("Event", "Events");
pub const SET: EntityType = EntityType::new("Set", "Sets");

pub fn catalog() -> Arc<RelationCatalog> {
    let mut b = CatalogBuilder::new();
    b.register_kind(EntityKind::top_level(LOCATION, "Name")).unwrap();
    b.register_kind(EntityKind::top_level(SERIES, "Name")).unwrap();
    b.register_kind(EntityKind::top_level(GENRE, "Name")).unwrap();
    b.register_kind(EntityKind::identified_by(EVENT, "Date", LOCATION))
        .unwrap();
    b.register_kind(EntityKind::identified_by(SET, "SetNo", EVENT))
        .unwrap();
    b.register_relation(Relation::mandatory(LOCATION, EVENT)).unwrap();
    b.register_relation(Relation::optional(SERIES, EVENT)).unwrap();
    b.register_relation(Relation::mandatory(EVENT, SET)).unwrap();
    b.register_relation(Relation::mandatory(GENRE, SET)).unwrap();
    Arc::new(b.build().unwrap())
}

pub fn graph() -> Graph {
    Graph::new(catalog())
}
