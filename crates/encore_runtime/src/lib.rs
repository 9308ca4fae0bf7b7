//! REPL, CLI, and configuration for Encore.
//!
//! This crate provides:
//! - [`Repl`] - Interactive read-eval-print loop over an archive
//! - [`Archive`] - Command execution with per-command transactions
//! - [`Command`] - The command language
//! - [`RuntimeConfig`] - TOML configuration with command-line overrides

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod archive;
pub mod command;
pub mod config;
pub mod demo;
pub mod editor;
pub mod repl;

pub use archive::{Archive, Reply};
pub use command::Command;
pub use config::{ConfigOverrides, RuntimeConfig};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Repl, print_error};
