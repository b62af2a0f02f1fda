//! Cartesia is a planar implementation of the OGC Simple Features geometry model.
//!
//! Geometries are created by a [`Factory`], which defines their coordinate arity (optional z and m
//! values), their spatial reference and the codecs used to read and write them as WKT/EWKT and
//! WKB/EWKB.
//!
//! ```
//! use cartesia::{Curve, Factory, Geometry};
//!
//! let factory = Factory::default();
//! let polygon = factory.parse_text("POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))").unwrap();
//!
//! let Geometry::Polygon(polygon) = polygon else {
//!     panic!("not a polygon");
//! };
//! assert_eq!(polygon.area(), 16.0);
//! assert_eq!(polygon.exterior_ring().num_points(), 5);
//! ```
//!
//! Spatial reference definitions can be looked up in a database such as
//! [`Proj4Data`](cartesia_srs::Proj4Data), see [`FactoryBuilder::with_srs_database`].

pub mod codec;
pub mod crs;
pub mod error;
mod factory;
pub mod geometry;

pub use cartesia_srs;
pub use error::{CartesiaError, InvalidGeometry, UsageError};
pub use factory::{Factory, FactoryBuilder, FactoryConfig, GeometryDump, Proj4Text};
pub use geometry::{
    AnyCurve, Coordinates, Curve, Geometry, GeometryCollection, GeometryKind, Line, LineString,
    LinearRing, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon, SimpleGeometry,
    TryConvertTo,
};
