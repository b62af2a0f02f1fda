//! Coordinate reference identity of a factory: proj4 projection definitions (see [`ProjectionDef`])
//! and OGC WKT coordinate system descriptors (see [`CoordSys`]).
//!
//! Neither type does any coordinate transformation. They are carried by a
//! [`Factory`](crate::Factory), compared and persisted together with it.

mod coord_sys;
mod projection;

pub use coord_sys::{CoordSys, CoordSysKind};
pub use projection::ProjectionDef;

use thiserror::Error;

/// Error parsing a coordinate system definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrsError {
    /// Invalid proj4 definition string.
    #[error("invalid proj4 definition: {0}")]
    Proj4(String),
    /// Invalid WKT coordinate system.
    #[error("invalid coordinate system wkt: {0}")]
    Wkt(String),
}
