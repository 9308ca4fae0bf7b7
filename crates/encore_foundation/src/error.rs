//! Error types for Encore.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Integrity violations are deterministic, so none of these errors is
//! retried; callers surface the message and abort the enclosing transaction.

use std::fmt;

use thiserror::Error;

use crate::entity::EntityId;
use crate::types::EntityType;

/// Convenience result type for Encore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Encore operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a blank identity error for the given key property.
    #[must_use]
    pub fn blank_identity(entity_type: EntityType, property: &'static str) -> Self {
        Self::new(ErrorKind::BlankIdentity {
            entity_type,
            property,
        })
    }

    /// Creates a duplicate key error.
    #[must_use]
    pub fn duplicate_key(
        entity_type: EntityType,
        property: &'static str,
        simple_key: impl Into<String>,
        parent: Option<(EntityType, String)>,
    ) -> Self {
        Self::new(ErrorKind::DuplicateKey {
            entity_type,
            property,
            simple_key: simple_key.into(),
            parent,
        })
    }

    /// Creates a missing mandatory parent error.
    #[must_use]
    pub fn missing_parent(
        entity_type: EntityType,
        key: Option<String>,
        parent_type: EntityType,
        identifying: bool,
    ) -> Self {
        Self::new(ErrorKind::MissingMandatoryParent {
            entity_type,
            key,
            parent_type,
            identifying,
        })
    }

    /// Creates an unsupported operation error.
    #[must_use]
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotSupported(message.into()))
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(id: EntityId) -> Self {
        Self::new(ErrorKind::EntityNotFound(id))
    }

    /// Creates a stale entity reference error.
    #[must_use]
    pub fn stale_entity(id: EntityId) -> Self {
        Self::new(ErrorKind::StaleEntity(id))
    }

    /// Creates a missing key argument error.
    #[must_use]
    pub fn missing_key_argument(side: KeySide) -> Self {
        Self::new(ErrorKind::MissingKeyArgument(side))
    }

    /// Creates a transaction misuse error.
    #[must_use]
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transaction(message.into()))
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(message.into()))
    }

    /// Creates a command error (unparseable or unresolvable user input).
    #[must_use]
    pub fn command(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Command(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error is an integrity violation raised by the
    /// engine, as opposed to misuse of the API or the session.
    #[must_use]
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::BlankIdentity { .. }
                | ErrorKind::DuplicateKey { .. }
                | ErrorKind::MissingMandatoryParent { .. }
                | ErrorKind::IdentifyingParentTypeMismatch { .. }
                | ErrorKind::ParentTypeMismatch { .. }
                | ErrorKind::ReferentialIntegrity { .. }
                | ErrorKind::UnpersistedParent { .. }
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A simple key was set to nothing, or was missing at persist time.
    #[error("{entity_type}.{property} must be specified")]
    BlankIdentity {
        /// The entity type.
        entity_type: EntityType,
        /// Name of the simple key property (e.g. `Name`, `Date`).
        property: &'static str,
    },

    /// Another live entity of the same type already has the key.
    #[error("{}", duplicate_message(.entity_type, .property, .simple_key, .parent.as_ref()))]
    DuplicateKey {
        /// The entity type.
        entity_type: EntityType,
        /// Name of the simple key property.
        property: &'static str,
        /// The colliding simple key.
        simple_key: String,
        /// The identifying parent's type and key, if any.
        parent: Option<(EntityType, String)>,
    },

    /// A mandatory parent (identifying or not) is not set.
    #[error("{}", missing_parent_message(.entity_type, .key.as_deref(), .parent_type, .identifying))]
    MissingMandatoryParent {
        /// The entity type.
        entity_type: EntityType,
        /// The entity's current key, if it has one.
        key: Option<String>,
        /// The parent type that is required.
        parent_type: EntityType,
        /// Whether the relation is the identifying one.
        identifying: bool,
    },

    /// The supplied identifying parent has the wrong type.
    #[error("the identifying parent of a {entity_type} must be a {expected}, not a {actual}")]
    IdentifyingParentTypeMismatch {
        /// The entity type.
        entity_type: EntityType,
        /// The declared identifying parent type.
        expected: EntityType,
        /// The type that was supplied.
        actual: EntityType,
    },

    /// The supplied non-identifying parent has the wrong type.
    #[error("a {entity_type}'s {expected} cannot be set to a {actual}")]
    ParentTypeMismatch {
        /// The entity type.
        entity_type: EntityType,
        /// The parent type named by the caller.
        expected: EntityType,
        /// The type of the entity that was supplied.
        actual: EntityType,
    },

    /// The operation is not supported for this entity type.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Removal was attempted while children still reference the entity.
    #[error(
        "{entity_type} '{key}' cannot be removed because it is referenced by {}",
        join_counts(.children)
    )]
    ReferentialIntegrity {
        /// The entity type.
        entity_type: EntityType,
        /// The entity's key.
        key: String,
        /// Populated child types and their counts.
        children: Vec<ChildCount>,
    },

    /// An entity was persisted before one of its parents.
    #[error(
        "{entity_type} '{key}' cannot be persisted before its {parent_type} '{parent_key}'"
    )]
    UnpersistedParent {
        /// The entity type.
        entity_type: EntityType,
        /// The entity's key.
        key: String,
        /// The parent's type.
        parent_type: EntityType,
        /// The parent's key.
        parent_key: String,
    },

    /// Entity was not found in the arena.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// Entity handle is stale (the entity was removed).
    #[error("stale entity reference: {0:?} has been removed")]
    StaleEntity(EntityId),

    /// A key comparison was asked to compare against no key at all.
    #[error(
        "no Key object supplied on the {0} side of a comparison \
         (an absent parent is valid and orders first; an absent Key is a programming error)"
    )]
    MissingKeyArgument(KeySide),

    /// The persistence session was used outside a suitable transaction.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// A command could not be parsed or resolved.
    #[error("{0}")]
    Command(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Which side of a key comparison was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySide {
    /// The left-hand operand.
    Left,
    /// The right-hand operand.
    Right,
}

impl fmt::Display for KeySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Number of live children of one type, reported by referential integrity
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildCount {
    /// The child type.
    pub child_type: EntityType,
    /// How many children of that type remain.
    pub count: usize,
}

impl fmt::Display for ChildCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.child_type.count_phrase(self.count))
    }
}

fn duplicate_message(
    entity_type: &EntityType,
    property: &str,
    simple_key: &str,
    parent: Option<&(EntityType, String)>,
) -> String {
    match parent {
        Some((parent_type, parent_key)) => format!(
            "another {entity_type} with {property} '{simple_key}' already exists in {parent_type} '{parent_key}'"
        ),
        None => format!("another {entity_type} with {property} '{simple_key}' already exists"),
    }
}

fn missing_parent_message(
    entity_type: &EntityType,
    key: Option<&str>,
    parent_type: &EntityType,
    identifying: &bool,
) -> String {
    let subject = match key {
        Some(key) => format!("{entity_type} '{key}'"),
        None => format!("a new {entity_type}"),
    };
    if *identifying {
        format!("{subject} must belong to a {parent_type}")
    } else {
        format!("{subject} requires a {parent_type}")
    }
}

fn join_counts(children: &[ChildCount]) -> String {
    children
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Script file or other input source.
    pub source: Option<String>,
    /// Line number in the source.
    pub line: Option<usize>,
    /// The operation or command being executed.
    pub operation: Option<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line number.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the operation being executed.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        if let Some(operation) = &self.operation {
            if self.source.is_some() {
                f.write_str(" ")?;
            }
            write!(f, "in `{operation}`")?;
        }
        Ok(())
    }
}
