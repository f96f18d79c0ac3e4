//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{ParticipantId, SessionError};
use storage::repository::StorageError;

/// Errors emitted by a `Transport` implementation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("participant {0} is unreachable")]
    Unreachable(ParticipantId),
    #[error("delivery failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted while building an `EngineConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
    #[error("{name} is not a valid number: {raw}")]
    Invalid { name: &'static str, raw: String },
}

/// Errors returned by `SessionHub::dispatch`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The event was rejected; the participant has been re-prompted.
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("session runner for participant {0} has stopped")]
    Closed(ParticipantId),
}
