//! Error types used by the crate.

use cartesia_srs::error::SrsError;
use geozero::error::GeozeroError;
use thiserror::Error;

use crate::crs::CrsError;

/// A geometry could not be constructed because its input violates the invariants of the geometry
/// type.
///
/// Factory constructors convert this error into `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid geometry: {0}")]
pub struct InvalidGeometry(pub String);

/// A method was called with malformed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("usage error: {0}")]
pub struct UsageError(pub String);

/// Cartesia error type.
#[derive(Debug, Error)]
pub enum CartesiaError {
    /// Geometry invariants are violated.
    #[error(transparent)]
    InvalidGeometry(#[from] InvalidGeometry),
    /// Malformed call arguments.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// Malformed WKT or WKB input, or failure to write it.
    #[error("codec error: {0}")]
    Codec(#[from] GeozeroError),
    /// Invalid hex encoded binary input.
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),
    /// Invalid coordinate system definition.
    #[error(transparent)]
    Crs(#[from] CrsError),
    /// Spatial reference database failure.
    #[error(transparent)]
    Srs(#[from] SrsError),
    /// Failure to encode or decode a persisted record.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::error::EncodeError> for CartesiaError {
    fn from(value: bincode::error::EncodeError) -> Self {
        Self::Serialization(value.to_string())
    }
}

impl From<bincode::error::DecodeError> for CartesiaError {
    fn from(value: bincode::error::DecodeError) -> Self {
        Self::Serialization(value.to_string())
    }
}

impl From<serde_json::Error> for CartesiaError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}
