//! Error types for shelfsync
//!
//! This module defines the fatal error taxonomy surfaced to callers.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Only primary-store outcomes ever cross the coordinator boundary.
//! Secondary-index and cache failures are absorbed (logged and tracked for
//! resync) by the coordinator and never appear here.

use crate::kind::EntityKind;
use thiserror::Error;

/// Result type alias for shelfsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors surfaced to callers
#[derive(Debug, Error)]
pub enum Error {
    /// Primary store transaction or storage failure
    #[error("primary store error: {0}")]
    Primary(String),

    /// Id string did not parse as a valid identifier
    #[error("malformed id: {0:?}")]
    MalformedId(String),

    /// Insert called with an id already assigned (ids are store-assigned)
    #[error("{0} insert requires an unassigned id")]
    IdAlreadyAssigned(EntityKind),

    /// A required field was missing or empty
    #[error("{kind} is missing required field {field:?}")]
    MissingField {
        /// Entity kind being validated
        kind: EntityKind,
        /// Name of the missing field
        field: &'static str,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
