//! Planar geometry types of the OGC Simple Features model.
//!
//! Every geometry is created by a [`Factory`] and keeps a reference to it for its whole life. The
//! factory defines the coordinate arity (z and m) and the spatial reference of the geometry, and
//! provides text and binary codecs for it.
//!
//! All geometry types implement [`SimpleGeometry`]. [`Geometry`] is an enum over all of them, which
//! is what the parsers return and what heterogeneous collections contain.
//!
//! # Equality
//!
//! There are two notions of equality:
//! * *representational* equality ([`SimpleGeometry::rep_equals`], also used by `PartialEq`): the
//!   geometries have the same type, equal factories and identical coordinates (including z and m)
//!   in the same order;
//! * *spatial* equality ([`Geometry::equals`]): the geometries occupy the same locations on the
//!   plane. Only x and y are compared.
//!
//! ```
//! use cartesia::{Factory, SimpleGeometry};
//!
//! let factory = Factory::default();
//! let a = factory.point(1.0, 1.0, &[]).unwrap();
//! let line = factory.line_string([&a, &a.clone()]).unwrap();
//!
//! assert!(!a.to_geometry().rep_equals(&line.to_geometry()));
//! assert!(a.to_geometry().equals(&line.to_geometry()));
//! ```

mod cast;
mod collection;
mod curve;
pub(crate) mod hash;
mod kind;
mod point;
mod polygon;
mod segment;

use serde::{Deserialize, Serialize};

pub use cast::TryConvertTo;
pub use collection::{GeometryCollection, MultiLineString, MultiPoint, MultiPolygon};
pub use curve::{AnyCurve, Curve, Line, LineString, LinearRing, PointSequence};
pub use kind::GeometryKind;
pub use point::Point;
pub use polygon::Polygon;

pub(crate) use cast::{cast, cast_all, convert, Convertible, Shape};

use crate::error::{CartesiaError, InvalidGeometry};
use crate::Factory;

/// Common operations of all geometry types.
pub trait SimpleGeometry<'f> {
    /// The factory that created the geometry.
    fn factory(&self) -> &'f Factory;

    /// Runtime type of the geometry.
    fn geometry_kind(&self) -> GeometryKind;

    /// Topological dimension: 0 for points, 1 for curves, 2 for surfaces. For collections this is
    /// the largest dimension of the elements, or -1 if the collection is empty.
    fn dimension(&self) -> i32;

    /// Whether the geometry has no points.
    fn is_empty(&self) -> bool;

    /// Structural hash code. Geometries that are [`rep_equals`](SimpleGeometry::rep_equals) have
    /// equal hash codes.
    fn hash_code(&self) -> u64;

    /// Strict structural equality.
    fn rep_equals(&self, other: &Self) -> bool
    where
        Self: Sized;

    /// Copies the geometry into the [`Geometry`] enum.
    fn to_geometry(&self) -> Geometry<'f>;

    /// Spatial reference identifier of the geometry.
    fn srid(&self) -> i32 {
        self.factory().srid()
    }

    /// Text representation of the geometry, created by the text generator of its factory.
    fn as_text(&self) -> Result<String, CartesiaError>
    where
        Self: geozero::GeozeroGeometry + Sized,
    {
        self.factory().generate_text(self)
    }

    /// Binary representation of the geometry, created by the binary generator of its factory.
    fn as_binary(&self) -> Result<Vec<u8>, CartesiaError>
    where
        Self: geozero::GeozeroGeometry + Sized,
    {
        self.factory().generate_binary(self)
    }
}

/// Nested coordinate arrays of a geometry, in the same layout as GeoJSON uses.
///
/// A position contains x and y followed by z and m if the factory of the geometry has them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    /// Single position.
    Position(Vec<f64>),
    /// Sequence of positions or of nested sequences.
    Nested(Vec<Coordinates>),
}

impl Coordinates {
    /// Compares locations of two coordinate trees, ignoring z and m values.
    pub fn same_locations(&self, other: &Coordinates) -> bool {
        match (self, other) {
            (Self::Position(a), Self::Position(b)) => a.get(..2) == b.get(..2),
            (Self::Nested(a), Self::Nested(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same_locations(b))
            }
            _ => false,
        }
    }
}

impl From<Vec<f64>> for Coordinates {
    fn from(value: Vec<f64>) -> Self {
        Self::Position(value)
    }
}

pub(crate) fn nest<T>(
    items: impl IntoIterator<Item = T>,
    f: impl Fn(T) -> Coordinates,
) -> Coordinates {
    Coordinates::Nested(items.into_iter().map(f).collect())
}

/// Any geometry.
#[derive(Debug, Clone)]
pub enum Geometry<'f> {
    /// Point.
    Point(Point<'f>),
    /// Line string.
    LineString(LineString<'f>),
    /// Line.
    Line(Line<'f>),
    /// Linear ring.
    LinearRing(LinearRing<'f>),
    /// Polygon.
    Polygon(Polygon<'f>),
    /// Multi point.
    MultiPoint(MultiPoint<'f>),
    /// Multi line string.
    MultiLineString(MultiLineString<'f>),
    /// Multi polygon.
    MultiPolygon(MultiPolygon<'f>),
    /// Geometry collection.
    GeometryCollection(GeometryCollection<'f>),
}

macro_rules! dispatch {
    ($value:expr, $g:ident => $body:expr) => {
        match $value {
            Geometry::Point($g) => $body,
            Geometry::LineString($g) => $body,
            Geometry::Line($g) => $body,
            Geometry::LinearRing($g) => $body,
            Geometry::Polygon($g) => $body,
            Geometry::MultiPoint($g) => $body,
            Geometry::MultiLineString($g) => $body,
            Geometry::MultiPolygon($g) => $body,
            Geometry::GeometryCollection($g) => $body,
        }
    };
}


impl<'f> SimpleGeometry<'f> for Geometry<'f> {
    fn factory(&self) -> &'f Factory {
        dispatch!(self, g => g.factory())
    }

    fn geometry_kind(&self) -> GeometryKind {
        dispatch!(self, g => g.geometry_kind())
    }

    fn dimension(&self) -> i32 {
        dispatch!(self, g => g.dimension())
    }

    fn is_empty(&self) -> bool {
        dispatch!(self, g => g.is_empty())
    }

    fn hash_code(&self) -> u64 {
        dispatch!(self, g => g.hash_code())
    }

    fn rep_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Point(a), Self::Point(b)) => a.rep_equals(b),
            (Self::LineString(a), Self::LineString(b)) => a.rep_equals(b),
            (Self::Line(a), Self::Line(b)) => a.rep_equals(b),
            (Self::LinearRing(a), Self::LinearRing(b)) => a.rep_equals(b),
            (Self::Polygon(a), Self::Polygon(b)) => a.rep_equals(b),
            (Self::MultiPoint(a), Self::MultiPoint(b)) => a.rep_equals(b),
            (Self::MultiLineString(a), Self::MultiLineString(b)) => a.rep_equals(b),
            (Self::MultiPolygon(a), Self::MultiPolygon(b)) => a.rep_equals(b),
            (Self::GeometryCollection(a), Self::GeometryCollection(b)) => a.rep_equals(b),
            _ => false,
        }
    }

    fn to_geometry(&self) -> Geometry<'f> {
        self.clone()
    }
}

impl<'f> Geometry<'f> {
    /// Spatial equality: whether the two geometries occupy the same locations. Only x and y are
    /// compared, and geometries of different factories are never equal.
    ///
    /// A point equals a curve or a collection if that geometry is not empty and every one of its
    /// points equals the point. Other geometries are equal if they are of the same kind (all curves
    /// are considered the same kind) and their coordinates are at the same locations.
    pub fn equals(&self, other: &Geometry) -> bool {
        match (self, other) {
            (Self::Point(point), _) => point.equals(other),
            (_, Geometry::Point(point)) => point.equals(self),
            _ => {
                self.factory() == other.factory()
                    && self.geometry_kind().family() == other.geometry_kind().family()
                    && self.coordinates().same_locations(&other.coordinates())
            }
        }
    }

    /// Topological boundary of the geometry. Returns `None` for geometry collections, for which the
    /// boundary is not defined.
    pub fn boundary(&self) -> Option<Geometry<'f>> {
        match self {
            Self::Point(g) => Some(g.boundary().into()),
            Self::LineString(g) => Some(g.boundary().into()),
            Self::Line(g) => Some(g.boundary().into()),
            Self::LinearRing(g) => Some(g.boundary().into()),
            Self::Polygon(g) => Some(g.boundary().into()),
            Self::MultiPoint(g) => Some(g.boundary().into()),
            Self::MultiLineString(g) => Some(g.boundary().into()),
            Self::MultiPolygon(g) => Some(g.boundary().into()),
            Self::GeometryCollection(_) => None,
        }
    }

    /// Coordinates of the geometry as a nested tree.
    pub fn coordinates(&self) -> Coordinates {
        match self {
            Self::Point(g) => g.coordinates().into(),
            Self::LineString(g) => g.coordinate_tree(),
            Self::Line(g) => g.coordinate_tree(),
            Self::LinearRing(g) => g.coordinate_tree(),
            Self::Polygon(g) => g.coordinate_tree(),
            Self::MultiPoint(g) => g.coordinate_tree(),
            Self::MultiLineString(g) => g.coordinate_tree(),
            Self::MultiPolygon(g) => g.coordinate_tree(),
            Self::GeometryCollection(g) => g.coordinate_tree(),
        }
    }

    /// Text representation of the geometry, created by the text generator of its factory.
    pub fn as_text(&self) -> Result<String, CartesiaError> {
        self.factory().generate_text(self)
    }

    /// Binary representation of the geometry, created by the binary generator of its factory.
    pub fn as_binary(&self) -> Result<Vec<u8>, CartesiaError> {
        self.factory().generate_binary(self)
    }

    /// Whether the geometry is a curve (line string, line or linear ring).
    pub fn is_curve(&self) -> bool {
        self.geometry_kind().is_curve()
    }

    /// Returns the point if the geometry is one.
    pub fn as_point(&self) -> Option<&Point<'f>> {
        match self {
            Self::Point(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the curve if the geometry is a line string, a line or a linear ring.
    pub fn as_curve(&self) -> Option<&dyn Curve<'f>> {
        match self {
            Self::LineString(g) => Some(g),
            Self::Line(g) => Some(g),
            Self::LinearRing(g) => Some(g),
            _ => None,
        }
    }

    /// Returns the polygon if the geometry is one.
    pub fn as_polygon(&self) -> Option<&Polygon<'f>> {
        match self {
            Self::Polygon(p) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn restamp<'t>(
        &self,
        factory: &'t Factory,
    ) -> Result<Geometry<'t>, InvalidGeometry> {
        Ok(match self {
            Self::Point(g) => g.restamp(factory).into(),
            Self::LineString(g) => g.restamp(factory)?.into(),
            Self::Line(g) => g.restamp(factory)?.into(),
            Self::LinearRing(g) => g.restamp(factory)?.into(),
            Self::Polygon(g) => g.restamp(factory)?.into(),
            Self::MultiPoint(g) => g.restamp(factory)?.into(),
            Self::MultiLineString(g) => g.restamp(factory)?.into(),
            Self::MultiPolygon(g) => g.restamp(factory)?.into(),
            Self::GeometryCollection(g) => g.restamp(factory)?.into(),
        })
    }
}

impl Convertible for Geometry<'_> {
    fn kind(&self) -> GeometryKind {
        self.geometry_kind()
    }

    fn restamp_into<'t>(&self, factory: &'t Factory) -> Result<Geometry<'t>, InvalidGeometry> {
        self.restamp(factory)
    }

    fn shape(&self) -> Shape<'_> {
        dispatch!(self, g => g.shape())
    }
}

macro_rules! impl_geometry_conversions {
    ($($variant:ident),*) => {
        $(
            impl<'f> From<$variant<'f>> for Geometry<'f> {
                fn from(value: $variant<'f>) -> Self {
                    Self::$variant(value)
                }
            }

            impl<'f> TryFrom<Geometry<'f>> for $variant<'f> {
                type Error = Geometry<'f>;

                fn try_from(value: Geometry<'f>) -> Result<Self, Self::Error> {
                    match value {
                        Geometry::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }

            impl PartialEq for $variant<'_> {
                fn eq(&self, other: &Self) -> bool {
                    self.rep_equals(other)
                }
            }

            impl std::hash::Hash for $variant<'_> {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    state.write_u64(self.hash_code());
                }
            }

            impl TryConvertTo for $variant<'_> {
                fn source_kind(&self) -> GeometryKind {
                    self.geometry_kind()
                }

                fn try_convert_to<'t>(
                    &self,
                    factory: &'t Factory,
                    kind: GeometryKind,
                    keep_subtype: bool,
                ) -> Option<Geometry<'t>> {
                    convert(self, factory, kind, keep_subtype)
                }
            }
        )*
    };
}

impl_geometry_conversions!(
    Point,
    LineString,
    Line,
    LinearRing,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection
);

impl PartialEq for Geometry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.rep_equals(other)
    }
}

impl std::hash::Hash for Geometry<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl TryConvertTo for Geometry<'_> {
    fn source_kind(&self) -> GeometryKind {
        self.geometry_kind()
    }

    fn try_convert_to<'t>(
        &self,
        factory: &'t Factory,
        kind: GeometryKind,
        keep_subtype: bool,
    ) -> Option<Geometry<'t>> {
        convert(self, factory, kind, keep_subtype)
    }
}

impl<'f> From<AnyCurve<'f>> for Geometry<'f> {
    fn from(value: AnyCurve<'f>) -> Self {
        match value {
            AnyCurve::LineString(g) => Self::LineString(g),
            AnyCurve::Line(g) => Self::Line(g),
            AnyCurve::LinearRing(g) => Self::LinearRing(g),
        }
    }
}

impl<'f> TryFrom<Geometry<'f>> for AnyCurve<'f> {
    type Error = Geometry<'f>;

    fn try_from(value: Geometry<'f>) -> Result<Self, Self::Error> {
        match value {
            Geometry::LineString(g) => Ok(Self::LineString(g)),
            Geometry::Line(g) => Ok(Self::Line(g)),
            Geometry::LinearRing(g) => Ok(Self::LinearRing(g)),
            other => Err(other),
        }
    }
}
