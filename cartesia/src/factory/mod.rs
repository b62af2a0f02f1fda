//! The [`Factory`] creates geometries and defines their common properties.
//!
//! All geometries created by one factory share its coordinate arity, spatial reference and codecs.
//! A factory is configured with a [`FactoryBuilder`] (or a declarative [`FactoryConfig`]) and is
//! immutable afterwards.
//!
//! ```
//! use cartesia::{Curve, Factory};
//!
//! let factory = Factory::builder().with_srid(3857).with_z_coordinate(true).build().unwrap();
//! let a = factory.point(0.0, 0.0, &[10.0]).unwrap();
//! let b = factory.point(3.0, 4.0, &[20.0]).unwrap();
//!
//! let line = factory.line(&a, &b).unwrap();
//! assert_eq!(line.length(), 5.0);
//!
//! // a line string cannot have a single point
//! assert!(factory.line_string([&a]).is_none());
//! ```

mod builder;
mod config;
mod persist;

use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

pub use builder::FactoryBuilder;
pub use config::{FactoryConfig, Proj4Text};
pub use persist::GeometryDump;

use geozero::GeozeroGeometry;

use crate::codec::{BinaryGenerator, BinaryParser, TextGenerator, TextParser};
use crate::crs::{CoordSys, ProjectionDef};
use crate::error::{CartesiaError, InvalidGeometry, UsageError};
use crate::geometry::hash::hash_one;
use crate::geometry::{
    Geometry, GeometryCollection, Line, LineString, LinearRing, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, SimpleGeometry, TryConvertTo,
};
use persist::InternalCodecs;

const FACTORY_TAG: &str = "cartesia::Factory";

/// Creates geometries with a common coordinate arity and spatial reference.
///
/// Two factories are equal if they have the same srid, coordinate arity and projection. The
/// coordinate system descriptor is not taken into account by the comparison.
#[derive(Debug, Clone)]
pub struct Factory {
    srid: i32,
    has_z: bool,
    has_m: bool,
    projection: Option<ProjectionDef>,
    coord_sys: Option<CoordSys>,
    lenient_assertions: bool,
    buffer_resolution: u32,
    text_generator: TextGenerator,
    text_parser: TextParser,
    binary_generator: BinaryGenerator,
    binary_parser: BinaryParser,
    hash: OnceLock<u64>,
    internal: InternalCodecs,
}

impl Factory {
    /// Starts configuration of a new factory.
    pub fn builder<'a>() -> FactoryBuilder<'a> {
        FactoryBuilder::default()
    }

    /// Spatial reference identifier of the geometries.
    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// Whether the geometries have a z coordinate.
    pub fn has_z(&self) -> bool {
        self.has_z
    }

    /// Whether the geometries have an m coordinate.
    pub fn has_m(&self) -> bool {
        self.has_m
    }

    /// Whether invalid linear rings are accepted.
    pub fn lenient_assertions(&self) -> bool {
        self.lenient_assertions
    }

    /// Number of segments used to approximate a quarter circle. Stored for compatibility, not used
    /// by the planar operations.
    pub fn buffer_resolution(&self) -> u32 {
        self.buffer_resolution
    }

    /// Proj4 projection of the factory.
    pub fn projection(&self) -> Option<&ProjectionDef> {
        self.projection.as_ref()
    }

    /// Coordinate system descriptor of the factory.
    pub fn coord_sys(&self) -> Option<&CoordSys> {
        self.coord_sys.as_ref()
    }

    /// Generator used by [`Factory::generate_text`].
    pub fn text_generator(&self) -> &TextGenerator {
        &self.text_generator
    }

    /// Parser used by [`Factory::parse_text`].
    pub fn text_parser(&self) -> &TextParser {
        &self.text_parser
    }

    /// Generator used by [`Factory::generate_binary`].
    pub fn binary_generator(&self) -> &BinaryGenerator {
        &self.binary_generator
    }

    /// Parser used by [`Factory::parse_binary`].
    pub fn binary_parser(&self) -> &BinaryParser {
        &self.binary_parser
    }

    /// Hash code of the factory, consistent with its equality.
    pub fn hash_code(&self) -> u64 {
        *self.hash.get_or_init(|| {
            hash_one(&(
                FACTORY_TAG,
                self.srid,
                self.has_z,
                self.has_m,
                &self.projection,
            ))
        })
    }

    /// Creates a point. `extra` must contain the z value if the factory has z coordinates, followed
    /// by the m value if it has m coordinates.
    pub fn point(&self, x: f64, y: f64, extra: &[f64]) -> Result<Point<'_>, UsageError> {
        Point::new(self, x, y, extra)
    }

    /// Creates a line string. Returns `None` if the input is not a valid line string.
    pub fn line_string<G: TryConvertTo>(
        &self,
        points: impl IntoIterator<Item = G>,
    ) -> Option<LineString<'_>> {
        accept("line string", LineString::new(self, points))
    }

    /// Creates a line from two points.
    pub fn line(&self, start: impl TryConvertTo, end: impl TryConvertTo) -> Option<Line<'_>> {
        accept("line", Line::new(self, start, end))
    }

    /// Creates a linear ring, closing it if necessary. See [`LinearRing::new`].
    pub fn linear_ring<G: TryConvertTo>(
        &self,
        points: impl IntoIterator<Item = G>,
    ) -> Option<LinearRing<'_>> {
        accept("linear ring", LinearRing::new(self, points))
    }

    /// Creates a polygon from an exterior ring and holes.
    pub fn polygon<E, G>(
        &self,
        exterior: E,
        interiors: impl IntoIterator<Item = G>,
    ) -> Option<Polygon<'_>>
    where
        E: TryConvertTo,
        G: TryConvertTo,
    {
        accept("polygon", Polygon::new(self, exterior, interiors))
    }

    /// Creates a geometry collection.
    pub fn collection<G: TryConvertTo>(
        &self,
        geometries: impl IntoIterator<Item = G>,
    ) -> Option<GeometryCollection<'_>> {
        accept("geometry collection", GeometryCollection::new(self, geometries))
    }

    /// Creates a multi point.
    pub fn multi_point<G: TryConvertTo>(
        &self,
        points: impl IntoIterator<Item = G>,
    ) -> Option<MultiPoint<'_>> {
        accept("multi point", MultiPoint::new(self, points))
    }

    /// Creates a multi line string.
    pub fn multi_line_string<G: TryConvertTo>(
        &self,
        curves: impl IntoIterator<Item = G>,
    ) -> Option<MultiLineString<'_>> {
        accept("multi line string", MultiLineString::new(self, curves))
    }

    /// Creates a multi polygon.
    pub fn multi_polygon<G: TryConvertTo>(
        &self,
        polygons: impl IntoIterator<Item = G>,
    ) -> Option<MultiPolygon<'_>> {
        accept("multi polygon", MultiPolygon::new(self, polygons))
    }

    /// Parses a geometry with the text parser of the factory.
    pub fn parse_text(&self, text: &str) -> Result<Geometry<'_>, CartesiaError> {
        self.text_parser.parse(self, text)
    }

    /// Parses a geometry with the binary parser of the factory.
    pub fn parse_binary(&self, bytes: &[u8]) -> Result<Geometry<'_>, CartesiaError> {
        self.binary_parser.parse(self, bytes)
    }

    /// Writes the geometry with the text generator of the factory.
    pub fn generate_text<'f, G>(&self, geometry: &G) -> Result<String, CartesiaError>
    where
        G: SimpleGeometry<'f> + GeozeroGeometry,
    {
        self.text_generator.generate(geometry)
    }

    /// Writes the geometry with the binary generator of the factory.
    pub fn generate_binary<'f, G>(&self, geometry: &G) -> Result<Vec<u8>, CartesiaError>
    where
        G: SimpleGeometry<'f> + GeozeroGeometry,
    {
        self.binary_generator.generate(geometry)
    }

    pub(crate) fn internal_codecs(&self) -> &InternalCodecs {
        &self.internal
    }
}

fn accept<T>(kind: &str, result: Result<T, InvalidGeometry>) -> Option<T> {
    match result {
        Ok(geometry) => Some(geometry),
        Err(err) => {
            log::debug!("Factory rejected {kind}: {err}");
            None
        }
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self {
            srid: 0,
            has_z: false,
            has_m: false,
            projection: None,
            coord_sys: None,
            lenient_assertions: false,
            buffer_resolution: 1,
            text_generator: TextGenerator::default(),
            text_parser: TextParser::default(),
            binary_generator: BinaryGenerator::default(),
            binary_parser: BinaryParser::default(),
            hash: OnceLock::new(),
            internal: InternalCodecs::default(),
        }
    }
}

impl PartialEq for Factory {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.srid == other.srid
                && self.has_z == other.has_z
                && self.has_m == other.has_m
                && self.projection == other.projection)
    }
}

impl Eq for Factory {}

impl Hash for Factory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::geometry::Curve;

    #[test]
    fn equality_ignores_codecs_and_coord_sys() {
        let a = Factory::builder().with_srid(4326).build().unwrap();
        let b = Factory::builder()
            .with_srid(4326)
            .with_coord_sys_wkt(r#"GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]]"#)
            .with_lenient_assertions(true)
            .build()
            .unwrap();
        assert!(b.coord_sys().is_some());
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());

        let c = Factory::builder().with_srid(4326).with_m_coordinate(true).build().unwrap();
        assert_ne!(a, c);

        let d = Factory::builder()
            .with_srid(4326)
            .with_proj4("+proj=longlat +datum=WGS84")
            .build()
            .unwrap();
        assert_ne!(a, d);
    }

    #[test]
    fn constructors_return_none_for_invalid_geometries() {
        let factory = Factory::default();
        let a = factory.point(0.0, 0.0, &[]).unwrap();
        let b = factory.point(1.0, 1.0, &[]).unwrap();
        let c = factory.point(2.0, 0.0, &[]).unwrap();

        assert!(factory.line_string([&a]).is_none());
        assert!(factory.line_string(Vec::<Point>::new()).is_some());
        assert!(factory.line_string([&a, &b, &c]).is_some());
        assert!(factory.line(&a, &b).is_some());
        assert!(factory.linear_ring([&a, &b]).is_none());
        assert_eq!(factory.linear_ring([&a, &b, &c]).unwrap().num_points(), 4);
    }

    #[test]
    fn point_arity() {
        let factory = Factory::builder().with_z_coordinate(true).build().unwrap();

        assert_matches!(factory.point(1.0, 2.0, &[]), Err(UsageError(_)));
        assert_matches!(factory.point(1.0, 2.0, &[3.0, 4.0]), Err(UsageError(_)));
        assert_eq!(factory.point(1.0, 2.0, &[3.0]).unwrap().z(), Some(3.0));
    }

    #[test]
    fn parsing_propagates_errors() {
        let factory = Factory::default();

        assert_matches!(
            factory.parse_text("LINESTRING(0 0)"),
            Err(CartesiaError::InvalidGeometry(_))
        );
        assert_matches!(factory.parse_text("NOT A GEOMETRY"), Err(CartesiaError::Codec(_)));
        assert_matches!(factory.parse_binary(&[]), Err(CartesiaError::Codec(_)));
    }
}
