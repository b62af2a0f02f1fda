use std::sync::OnceLock;

use super::hash::{coord_bits, fold, hash_one, seed};
use super::{
    Convertible, Curve, Geometry, GeometryCollection, GeometryKind, InvalidGeometry, Shape,
    SimpleGeometry,
};
use crate::error::UsageError;
use crate::Factory;

/// A single position on the plane.
///
/// A point has a z coordinate if and only if its factory has z coordinates enabled, and the same
/// holds for m.
#[derive(Debug, Clone)]
pub struct Point<'f> {
    factory: &'f Factory,
    x: f64,
    y: f64,
    z: Option<f64>,
    m: Option<f64>,
    hash: OnceLock<u64>,
}

impl<'f> Point<'f> {
    /// Creates a point. `extra` must contain exactly one value for each of z and m that are enabled
    /// in the factory, z first.
    pub fn new(factory: &'f Factory, x: f64, y: f64, extra: &[f64]) -> Result<Self, UsageError> {
        let expected = usize::from(factory.has_z()) + usize::from(factory.has_m());
        if extra.len() != expected {
            return Err(UsageError(format!(
                "point of this factory takes {expected} extra coordinates, but {} were given",
                extra.len()
            )));
        }

        let mut extra = extra.iter().copied();
        let z = factory.has_z().then(|| extra.next()).flatten();
        let m = factory.has_m().then(|| extra.next()).flatten();

        Ok(Self::from_parts(factory, x, y, z, m))
    }

    /// Creates a point from the given components, adapting them to the arity of the factory:
    /// missing z and m become `0.0` and the ones the factory does not support are dropped.
    pub(crate) fn from_parts(
        factory: &'f Factory,
        x: f64,
        y: f64,
        z: Option<f64>,
        m: Option<f64>,
    ) -> Self {
        Self {
            factory,
            x,
            y,
            z: factory.has_z().then(|| z.unwrap_or(0.0)),
            m: factory.has_m().then(|| m.unwrap_or(0.0)),
            hash: OnceLock::new(),
        }
    }

    pub(crate) fn restamp<'t>(&self, factory: &'t Factory) -> Point<'t> {
        Point::from_parts(factory, self.x, self.y, self.z, self.m)
    }

    /// X coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Z coordinate, if the factory has it.
    pub fn z(&self) -> Option<f64> {
        self.z
    }

    /// M coordinate, if the factory has it.
    pub fn m(&self) -> Option<f64> {
        self.m
    }

    /// Whether the two points are at the same location. Z and m are ignored.
    pub fn same_location(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Points are always simple.
    pub fn is_simple(&self) -> bool {
        true
    }

    /// Spatial equality with another geometry.
    ///
    /// The point equals another point at the same location, and a curve or a collection that is not
    /// empty and all of whose points equal this point. Geometries of other factories are never
    /// equal.
    pub fn equals(&self, other: &Geometry) -> bool {
        if self.factory != other.factory() {
            return false;
        }

        match other {
            Geometry::Point(p) => self.same_location(p),
            Geometry::LineString(c) => self.equals_curve(c),
            Geometry::Line(c) => self.equals_curve(c),
            Geometry::LinearRing(c) => self.equals_curve(c),
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => false,
            Geometry::MultiPoint(mp) => !mp.is_empty() && mp.iter().all(|p| self.same_location(p)),
            Geometry::MultiLineString(mls) => {
                !mls.is_empty() && mls.iter().all(|c| self.equals_curve(c))
            }
            Geometry::GeometryCollection(gc) => !gc.is_empty() && gc.iter().all(|g| self.equals(g)),
        }
    }

    fn equals_curve<'a>(&self, curve: &impl Curve<'a>) -> bool {
        !curve.is_empty() && curve.points().iter().all(|p| self.same_location(p))
    }

    /// The boundary of a point is an empty geometry collection.
    pub fn boundary(&self) -> GeometryCollection<'f> {
        GeometryCollection::from_elements(self.factory, vec![])
    }

    /// X and y followed by z and m if the factory has them.
    pub fn coordinates(&self) -> Vec<f64> {
        let mut coords = vec![self.x, self.y];
        coords.extend(self.z);
        coords.extend(self.m);
        coords
    }
}

impl<'f> SimpleGeometry<'f> for Point<'f> {
    fn factory(&self) -> &'f Factory {
        self.factory
    }

    fn geometry_kind(&self) -> GeometryKind {
        GeometryKind::Point
    }

    fn dimension(&self) -> i32 {
        0
    }

    fn is_empty(&self) -> bool {
        false
    }

    fn hash_code(&self) -> u64 {
        *self.hash.get_or_init(|| {
            let mut hash = seed(self.factory, GeometryKind::Point);
            hash = fold(hash, coord_bits(self.x));
            hash = fold(hash, coord_bits(self.y));
            hash = fold(hash, hash_one(&self.z.map(coord_bits)));
            fold(hash, hash_one(&self.m.map(coord_bits)))
        })
    }

    fn rep_equals(&self, other: &Self) -> bool {
        self.factory == other.factory
            && self.x == other.x
            && self.y == other.y
            && self.z == other.z
            && self.m == other.m
    }

    fn to_geometry(&self) -> Geometry<'f> {
        self.clone().into()
    }
}

impl Convertible for Point<'_> {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Point
    }

    fn restamp_into<'t>(&self, factory: &'t Factory) -> Result<Geometry<'t>, InvalidGeometry> {
        Ok(self.restamp(factory).into())
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Single
    }
}
