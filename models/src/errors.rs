// models/src/errors.rs

use std::io;
pub use thiserror::Error;
use serde_json::Error as SerdeJsonError;

/// Error taxonomy shared by every layer of the fleet backend.
///
/// `NotFound`, `Conflict` and `InvalidInput` are client errors and carry the
/// human-readable reason that is surfaced verbatim to callers. Everything
/// else maps to an internal failure of the specific operation.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("{entity} with id {id} was not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("An internal error occurred: {0}")]
    InternalError(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[cfg(feature = "sled-errors")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
}

impl From<SerdeJsonError> for FleetError {
    fn from(e: SerdeJsonError) -> Self {
        FleetError::SerializationError(e.to_string())
    }
}

impl FleetError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        FleetError::NotFound { entity, id: id.into() }
    }
}

pub type FleetResult<T> = Result<T, FleetError>;
