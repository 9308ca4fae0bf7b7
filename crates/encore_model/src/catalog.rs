//! The archive's relation catalog, built once per process.

use std::sync::{Arc, LazyLock};

use encore_foundation::{EntityType, Error, Result};
use encore_storage::{CatalogBuilder, EntityKind, Graph, MemorySession, Relation, RelationCatalog};

use crate::entity::Entity;
use crate::performance::{Credit, Event, Piece, Set};
use crate::reference::{Act, Artist, EventType, Genre, Location, Newsletter, Role, Series};
use crate::types::{
    ACT, ARTIST, CREDIT, EVENT, EVENT_TYPE, GENRE, LOCATION, NEWSLETTER, PIECE, ROLE, SERIES, SET,
};

static CATALOG: LazyLock<std::result::Result<Arc<RelationCatalog>, String>> =
    LazyLock::new(|| build().map(Arc::new).map_err(|e| e.to_string()));

/// Every kind in the archive.
pub const KINDS: [EntityKind; 12] = [
    Location::KIND,
    EventType::KIND,
    Series::KIND,
    Newsletter::KIND,
    Act::KIND,
    Genre::KIND,
    Artist::KIND,
    Role::KIND,
    Event::KIND,
    Set::KIND,
    Piece::KIND,
    Credit::KIND,
];

/// Every relation in the archive. Identifying relations are listed first
/// for each child.
pub const RELATIONS: [Relation; 11] = [
    Relation::mandatory(LOCATION, EVENT),
    Relation::mandatory(EVENT_TYPE, EVENT),
    Relation::optional(SERIES, EVENT),
    Relation::optional(NEWSLETTER, EVENT),
    Relation::mandatory(EVENT, SET),
    Relation::optional(ACT, SET),
    Relation::mandatory(GENRE, SET),
    Relation::mandatory(SET, PIECE),
    Relation::mandatory(PIECE, CREDIT),
    Relation::mandatory(ARTIST, CREDIT),
    Relation::mandatory(ROLE, CREDIT),
];

fn build() -> Result<RelationCatalog> {
    let mut builder = CatalogBuilder::new();
    for kind in KINDS {
        builder.register_kind(kind)?;
    }
    for relation in RELATIONS {
        builder.register_relation(relation)?;
    }
    builder.build()
}

/// The archive catalog, shared by every graph in the process.
///
/// # Errors
///
/// Returns an `Internal` error if the declarations are inconsistent.
pub fn catalog() -> Result<Arc<RelationCatalog>> {
    CATALOG.as_ref().map(Arc::clone).map_err(|message| {
        Error::internal(format!("archive catalog is invalid: {message}"))
    })
}

/// An empty archive graph.
///
/// # Errors
///
/// Returns an error if the catalog cannot be built.
pub fn new_graph() -> Result<Graph> {
    Ok(Graph::new(catalog()?))
}

/// A session over an empty archive graph.
///
/// # Errors
///
/// Returns an error if the catalog cannot be built.
pub fn new_session() -> Result<MemorySession> {
    Ok(MemorySession::new(new_graph()?))
}

/// Looks up an archive type by name, ignoring case.
#[must_use]
pub fn type_named(name: &str) -> Option<EntityType> {
    catalog().ok()?.kind_named(name).map(|kind| kind.ty)
}
