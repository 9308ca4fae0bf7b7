//! Core types for Encore.
//!
//! This crate provides:
//! - [`EntityId`] - Generational identifiers into the entity arena
//! - [`EntityType`] - Nominal entity types used for relation lookup
//! - [`Key`] - Composite, case-insensitive entity identity
//! - [`Error`] - Integrity violations and other errors with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod key;
pub mod types;

pub use entity::EntityId;
pub use error::{ChildCount, Error, ErrorContext, ErrorKind, KeySide, Result};
pub use key::Key;
pub use types::EntityType;
