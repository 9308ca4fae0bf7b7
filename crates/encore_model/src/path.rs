//! Lookup by key path.
//!
//! A path lists an entity's key segments root first, separated by `|`:
//! `Fred's|2013/05/01|01` names set 1 of the 1 May 2013 event at Fred's.

use encore_foundation::key::PATH_SEPARATOR;
use encore_foundation::{EntityId, EntityType, Error, Key, Result};
use encore_storage::{EntityKind, Graph};

use crate::entity::find_top_level;
use crate::keys::normalize;
use crate::reference::Location;

/// The kinds that make up a type's key, root first, ending with the type
/// itself.
///
/// # Errors
///
/// Returns `NotSupported` for a type the catalog does not declare.
pub fn identity_chain(graph: &Graph, ty: EntityType) -> Result<Vec<EntityKind>> {
    let mut chain = vec![*graph.catalog().kind(ty)?];
    while let Some(parent) = chain.last().and_then(|kind| kind.identifying_parent) {
        chain.push(*graph.catalog().kind(parent)?);
    }
    chain.reverse();
    Ok(chain)
}

/// How a path for the type is written, e.g. `Location|Event|SetNo`.
///
/// # Errors
///
/// Returns `NotSupported` for an unknown type.
pub fn path_shape(graph: &Graph, ty: EntityType) -> Result<String> {
    let separator = PATH_SEPARATOR.to_string();
    Ok(identity_chain(graph, ty)?
        .iter()
        .map(|kind| {
            if kind.ty == ty {
                kind.key_name.to_string()
            } else {
                kind.ty.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(separator.as_str()))
}

/// Splits a `|`-separated path into segments.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR).map(str::trim).collect()
}

/// Builds the normalized key a path denotes for a type.
///
/// # Errors
///
/// Returns a `Command` error if the path has the wrong number of segments
/// or a segment is malformed for its type.
pub fn path_key(graph: &Graph, ty: EntityType, segments: &[&str]) -> Result<Key> {
    let chain = identity_chain(graph, ty)?;
    if segments.len() != chain.len() {
        return Err(Error::command(format!(
            "a {ty} path has {} segment{}: {}",
            chain.len(),
            if chain.len() == 1 { "" } else { "s" },
            path_shape(graph, ty)?
        )));
    }
    let mut key: Option<Key> = None;
    for (kind, segment) in chain.iter().zip(segments) {
        key = Some(Key::new(normalize(kind.ty, segment)?, key));
    }
    key.ok_or_else(|| Error::command(format!("empty {ty} path")))
}

/// Resolves a path of key segments to a persisted entity of the type.
///
/// # Errors
///
/// Returns a `Command` error if the path is malformed for the type.
pub fn resolve_path(graph: &Graph, ty: EntityType, segments: &[&str]) -> Result<Option<EntityId>> {
    let key = path_key(graph, ty, segments)?;
    graph.resolve(ty, &key)
}

/// Resolves a path, failing if nothing is there.
///
/// # Errors
///
/// Returns a `Command` error naming the path if no entity has it.
pub fn require_path(graph: &Graph, ty: EntityType, path: &str) -> Result<EntityId> {
    resolve_path(graph, ty, &split_path(path))?
        .ok_or_else(|| Error::command(format!("no {ty} '{path}'")))
}

/// Finds a location by name, ignoring case.
///
/// # Errors
///
/// Returns a `Command` error if the name contains the path separator.
pub fn find_location(graph: &Graph, name: &str) -> Result<Option<Location>> {
    find_top_level(graph, name)
}
