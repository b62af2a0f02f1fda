//! Error type used by the crate.

use thiserror::Error;

/// Errors returned by spatial reference system databases.
#[derive(Debug, Error)]
pub enum SrsError {
    /// The data file could not be opened or read.
    #[error("failed to read srs data file: {0}")]
    Io(#[from] std::io::Error),
}
