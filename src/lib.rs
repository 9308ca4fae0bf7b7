//! Encore - In-memory entity-relationship integrity engine
//!
//! This crate re-exports all layers of the Encore system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: encore_runtime     REPL, CLI, configuration
//! Layer 2: encore_model       Music archive entity types and catalog
//! Layer 1: encore_storage     Relation catalog, sorted child collections, integrity engine
//! Layer 0: encore_foundation  Core types (Key, EntityId, EntityType, Error)
//! ```

pub use encore_foundation as foundation;
pub use encore_model as model;
pub use encore_runtime as runtime;
pub use encore_storage as storage;
