//! Relation catalog, entity arena, and integrity engine for Encore.
//!
//! This crate provides:
//! - [`RelationCatalog`] - Declared entity kinds and one-to-many relations
//! - [`Graph`] - The entity arena and the operations that keep it consistent
//! - [`SortedChildCollection`] - Key-ordered children of one parent
//! - [`DuplicateFinder`] - Full-population key collision scans
//! - [`Session`] - Transactions over the graph, with [`MemorySession`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod collection;
pub mod duplicate;
pub mod entity;
pub mod graph;
pub mod node;
pub mod session;

#[cfg(test)]
mod testing;

pub use catalog::{CatalogBuilder, EntityKind, Relation, RelationCatalog};
pub use collection::SortedChildCollection;
pub use duplicate::{DuplicateFinder, Population};
pub use entity::EntityStore;
pub use graph::Graph;
pub use node::{EntityNode, Lifecycle};
pub use session::{MemorySession, Session, TransactionMode};
