//! Music archive entity types for Encore.
//!
//! This crate declares the archive's entity network on top of the storage
//! engine:
//! - [`catalog()`] - The relation catalog, built once per process
//! - [`Entity`] - Typed `Copy` handles with parent setters and child providers
//! - [`keys`] - Date and number key formats
//! - [`path`] - Lookup by `|`-separated key path
//!
//! ```text
//! Location ─┐                       EventType, Series, Newsletter ─┐
//!           └─< Event (Date) >──────────────────────────────────────┘
//!                 └─< Set (SetNo) >── Act, Genre
//!                       └─< Piece (PieceNo)
//!                             └─< Credit (CreditNo) >── Artist, Role
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod entity;
pub mod keys;
pub mod path;
pub mod performance;
pub mod reference;
pub mod types;

pub use catalog::{catalog, new_graph, new_session, type_named};
pub use entity::Entity;
pub use path::{find_location, require_path, resolve_path};
pub use performance::{Credit, Event, Piece, Set};
pub use reference::{Act, Artist, EventType, Genre, Location, Newsletter, Role, Series};
