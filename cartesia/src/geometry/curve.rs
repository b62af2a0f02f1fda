//! Line strings and their specializations.
//!
//! In the OGC model a curve is a sequence of points connected with straight segments. There are
//! three curve types:
//! * [`LineString`] is any sequence of points except a single point;
//! * [`Line`] has exactly two points (or none);
//! * [`LinearRing`] is closed and simple. It closes itself on construction by repeating the first
//!   point at the end if needed, and collapses consecutive points at the same location.
//!
//! Common operations of curves are provided by the [`Curve`] trait. [`AnyCurve`] is the element
//! type of [`MultiLineString`](super::MultiLineString), which keeps the specific type of every
//! curve it contains.

use std::sync::OnceLock;

use super::hash::{fold, seed};
use super::segment::{is_simple_path, Segment};
use super::{
    cast, cast_all, nest, Convertible, Coordinates, Geometry, GeometryKind, InvalidGeometry,
    MultiPoint, Point, Shape, SimpleGeometry, TryConvertTo,
};
use crate::Factory;

/// Ordered points of a curve, shared by all curve types.
#[derive(Debug, Clone)]
pub struct PointSequence<'f> {
    factory: &'f Factory,
    points: Vec<Point<'f>>,
    closed: OnceLock<bool>,
    hash: OnceLock<u64>,
}

impl<'f> PointSequence<'f> {
    fn new(factory: &'f Factory, points: Vec<Point<'f>>) -> Self {
        Self {
            factory,
            points,
            closed: OnceLock::new(),
            hash: OnceLock::new(),
        }
    }

    /// Points of the sequence.
    pub fn points(&self) -> &[Point<'f>] {
        &self.points
    }

    fn is_closed(&self) -> bool {
        *self.closed.get_or_init(|| match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 2 && first.same_location(last),
            _ => false,
        })
    }

    fn hash_code(&self, kind: GeometryKind) -> u64 {
        *self.hash.get_or_init(|| {
            self.points
                .iter()
                .fold(seed(self.factory, kind), |hash, p| fold(hash, p.hash_code()))
        })
    }

    fn rep_equals(&self, other: &PointSequence) -> bool {
        self.factory == other.factory
            && self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(&other.points)
                .all(|(a, b)| a.rep_equals(b))
    }

    fn restamp_points<'t>(&self, factory: &'t Factory) -> Vec<Point<'t>> {
        self.points.iter().map(|p| p.restamp(factory)).collect()
    }
}

/// Operations common to all curve types.
pub trait Curve<'f>: SimpleGeometry<'f> {
    /// Points of the curve.
    fn sequence(&self) -> &PointSequence<'f>;

    /// Points of the curve.
    fn points(&self) -> &[Point<'f>] {
        self.sequence().points()
    }

    /// Number of points.
    fn num_points(&self) -> usize {
        self.points().len()
    }

    /// Point with the index `n`.
    fn point_n(&self, n: usize) -> Option<&Point<'f>> {
        self.points().get(n)
    }

    /// First point of the curve, `None` if the curve is empty.
    fn start_point(&self) -> Option<&Point<'f>> {
        self.points().first()
    }

    /// Last point of the curve, `None` if the curve is empty.
    fn end_point(&self) -> Option<&Point<'f>> {
        self.points().last()
    }

    /// Whether the curve has more than two points and its first and last points are at the same
    /// location.
    fn is_closed(&self) -> bool {
        self.sequence().is_closed()
    }

    /// Whether the curve does not pass through the same location twice. The start and the end point
    /// of a closed curve are not considered an intersection.
    fn is_simple(&self) -> bool {
        is_simple_path(self.points())
    }

    /// Whether the curve is closed and simple.
    fn is_ring(&self) -> bool {
        self.is_closed() && self.is_simple()
    }

    /// Sum of lengths of all segments.
    fn length(&self) -> f64 {
        self.points()
            .windows(2)
            .map(|pair| Segment(&pair[0], &pair[1]).length())
            .sum()
    }

    /// Start and end points of the curve. Empty for empty and closed curves.
    fn boundary(&self) -> MultiPoint<'f> {
        let points = match (self.start_point(), self.end_point()) {
            (Some(start), Some(end)) if !self.is_closed() => vec![start.clone(), end.clone()],
            _ => vec![],
        };

        MultiPoint::from_elements(self.factory(), points)
    }

    /// Coordinates of every point.
    fn coordinates(&self) -> Vec<Vec<f64>> {
        self.points().iter().map(Point::coordinates).collect()
    }
}

fn validate_count(points: &[Point]) -> Result<(), InvalidGeometry> {
    if points.len() == 1 {
        return Err(InvalidGeometry("line string cannot have 1 point".into()));
    }

    Ok(())
}

/// Sequence of points connected with straight segments.
#[derive(Debug, Clone)]
pub struct LineString<'f>(PointSequence<'f>);

impl<'f> LineString<'f> {
    /// Creates a line string. It can have any number of points except 1.
    pub fn new<G: TryConvertTo>(
        factory: &'f Factory,
        points: impl IntoIterator<Item = G>,
    ) -> Result<Self, InvalidGeometry> {
        Self::from_points(factory, cast_all(points, factory, GeometryKind::Point, false)?)
    }

    pub(crate) fn from_points(
        factory: &'f Factory,
        points: Vec<Point<'f>>,
    ) -> Result<Self, InvalidGeometry> {
        validate_count(&points)?;
        Ok(Self(PointSequence::new(factory, points)))
    }

    pub(crate) fn restamp<'t>(
        &self,
        factory: &'t Factory,
    ) -> Result<LineString<'t>, InvalidGeometry> {
        LineString::from_points(factory, self.0.restamp_points(factory))
    }
}

/// Line string with exactly two points.
#[derive(Debug, Clone)]
pub struct Line<'f>(PointSequence<'f>);

impl<'f> Line<'f> {
    /// Creates a line from its start and end points.
    pub fn new(
        factory: &'f Factory,
        start: impl TryConvertTo,
        end: impl TryConvertTo,
    ) -> Result<Self, InvalidGeometry> {
        let start = cast(&start, factory, GeometryKind::Point, false)?;
        let end = cast(&end, factory, GeometryKind::Point, false)?;
        Self::from_points(factory, vec![start, end])
    }

    pub(crate) fn from_points(
        factory: &'f Factory,
        points: Vec<Point<'f>>,
    ) -> Result<Self, InvalidGeometry> {
        validate_count(&points)?;
        if points.len() > 2 {
            return Err(InvalidGeometry("line must have 0 or 2 points".into()));
        }

        Ok(Self(PointSequence::new(factory, points)))
    }

    pub(crate) fn restamp<'t>(&self, factory: &'t Factory) -> Result<Line<'t>, InvalidGeometry> {
        Line::from_points(factory, self.0.restamp_points(factory))
    }
}

/// Closed simple line string.
#[derive(Debug, Clone)]
pub struct LinearRing<'f>(PointSequence<'f>);

impl<'f> LinearRing<'f> {
    /// Creates a linear ring.
    ///
    /// If the first and the last points are not at the same location, the first point is added to
    /// the end of the ring. Then consecutive points at the same location are collapsed into one.
    /// Unless the factory uses lenient assertions, the result must be closed and simple.
    pub fn new<G: TryConvertTo>(
        factory: &'f Factory,
        points: impl IntoIterator<Item = G>,
    ) -> Result<Self, InvalidGeometry> {
        Self::from_points(factory, cast_all(points, factory, GeometryKind::Point, false)?)
    }

    /// An empty ring.
    pub fn empty(factory: &'f Factory) -> Self {
        Self(PointSequence::new(factory, vec![]))
    }

    pub(crate) fn from_points(
        factory: &'f Factory,
        mut points: Vec<Point<'f>>,
    ) -> Result<Self, InvalidGeometry> {
        validate_count(&points)?;
        if points.is_empty() {
            return Ok(Self::empty(factory));
        }

        let closing = match (points.first(), points.last()) {
            (Some(first), Some(last)) if !first.same_location(last) => Some(first.clone()),
            _ => None,
        };
        points.extend(closing);
        points.dedup_by(|a, b| a.same_location(b));

        let ring = Self(PointSequence::new(factory, points));
        if !factory.lenient_assertions() && !ring.is_ring() {
            return Err(InvalidGeometry("linear ring failed ring test".into()));
        }

        Ok(ring)
    }

    pub(crate) fn restamp<'t>(
        &self,
        factory: &'t Factory,
    ) -> Result<LinearRing<'t>, InvalidGeometry> {
        LinearRing::from_points(factory, self.0.restamp_points(factory))
    }

    /// Signed area of the ring: positive for counterclockwise rings.
    pub(crate) fn signed_area(&self) -> f64 {
        self.points()
            .windows(2)
            .map(|pair| pair[0].x() * pair[1].y() - pair[1].x() * pair[0].y())
            .sum::<f64>()
            / 2.0
    }
}

macro_rules! impl_curve {
    ($($ty:ident => $kind:ident),*) => {
        $(
            impl<'f> SimpleGeometry<'f> for $ty<'f> {
                fn factory(&self) -> &'f Factory {
                    self.0.factory
                }

                fn geometry_kind(&self) -> GeometryKind {
                    GeometryKind::$kind
                }

                fn dimension(&self) -> i32 {
                    1
                }

                fn is_empty(&self) -> bool {
                    self.0.points.is_empty()
                }

                fn hash_code(&self) -> u64 {
                    self.0.hash_code(GeometryKind::$kind)
                }

                fn rep_equals(&self, other: &Self) -> bool {
                    self.0.rep_equals(&other.0)
                }

                fn to_geometry(&self) -> Geometry<'f> {
                    self.clone().into()
                }
            }

            impl<'f> Curve<'f> for $ty<'f> {
                fn sequence(&self) -> &PointSequence<'f> {
                    &self.0
                }
            }

            impl Convertible for $ty<'_> {
                fn kind(&self) -> GeometryKind {
                    GeometryKind::$kind
                }

                fn restamp_into<'t>(
                    &self,
                    factory: &'t Factory,
                ) -> Result<Geometry<'t>, InvalidGeometry> {
                    self.restamp(factory).map(Into::into)
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::Curve(self.points())
                }
            }

            impl $ty<'_> {
                pub(crate) fn coordinate_tree(&self) -> Coordinates {
                    nest(self.points(), |p| p.coordinates().into())
                }
            }
        )*
    };
}

impl_curve!(LineString => LineString, Line => Line, LinearRing => LinearRing);

/// Any of the curve types.
#[derive(Debug, Clone)]
pub enum AnyCurve<'f> {
    /// Line string.
    LineString(LineString<'f>),
    /// Line.
    Line(Line<'f>),
    /// Linear ring.
    LinearRing(LinearRing<'f>),
}

macro_rules! dispatch_curve {
    ($value:expr, $c:ident => $body:expr) => {
        match $value {
            AnyCurve::LineString($c) => $body,
            AnyCurve::Line($c) => $body,
            AnyCurve::LinearRing($c) => $body,
        }
    };
}

impl<'f> AnyCurve<'f> {
    pub(crate) fn restamp<'t>(
        &self,
        factory: &'t Factory,
    ) -> Result<AnyCurve<'t>, InvalidGeometry> {
        Ok(match self {
            Self::LineString(c) => AnyCurve::LineString(c.restamp(factory)?),
            Self::Line(c) => AnyCurve::Line(c.restamp(factory)?),
            Self::LinearRing(c) => AnyCurve::LinearRing(c.restamp(factory)?),
        })
    }

    pub(crate) fn coordinate_tree(&self) -> Coordinates {
        dispatch_curve!(self, c => c.coordinate_tree())
    }
}

impl<'f> SimpleGeometry<'f> for AnyCurve<'f> {
    fn factory(&self) -> &'f Factory {
        dispatch_curve!(self, c => c.factory())
    }

    fn geometry_kind(&self) -> GeometryKind {
        dispatch_curve!(self, c => c.geometry_kind())
    }

    fn dimension(&self) -> i32 {
        1
    }

    fn is_empty(&self) -> bool {
        dispatch_curve!(self, c => c.is_empty())
    }

    fn hash_code(&self) -> u64 {
        dispatch_curve!(self, c => c.hash_code())
    }

    fn rep_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::LineString(a), Self::LineString(b)) => a.rep_equals(b),
            (Self::Line(a), Self::Line(b)) => a.rep_equals(b),
            (Self::LinearRing(a), Self::LinearRing(b)) => a.rep_equals(b),
            _ => false,
        }
    }

    fn to_geometry(&self) -> Geometry<'f> {
        self.clone().into()
    }
}

impl<'f> Curve<'f> for AnyCurve<'f> {
    fn sequence(&self) -> &PointSequence<'f> {
        dispatch_curve!(self, c => c.sequence())
    }
}

impl Convertible for AnyCurve<'_> {
    fn kind(&self) -> GeometryKind {
        self.geometry_kind()
    }

    fn restamp_into<'t>(&self, factory: &'t Factory) -> Result<Geometry<'t>, InvalidGeometry> {
        self.restamp(factory).map(Into::into)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Curve(self.points())
    }
}

impl TryConvertTo for AnyCurve<'_> {
    fn source_kind(&self) -> GeometryKind {
        self.geometry_kind()
    }

    fn try_convert_to<'t>(
        &self,
        factory: &'t Factory,
        kind: GeometryKind,
        keep_subtype: bool,
    ) -> Option<Geometry<'t>> {
        super::convert(self, factory, kind, keep_subtype)
    }
}

impl PartialEq for AnyCurve<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.rep_equals(other)
    }
}

impl std::hash::Hash for AnyCurve<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

macro_rules! impl_any_curve_from {
    ($($ty:ident),*) => {
        $(
            impl<'f> From<$ty<'f>> for AnyCurve<'f> {
                fn from(value: $ty<'f>) -> Self {
                    Self::$ty(value)
                }
            }
        )*
    };
}

impl_any_curve_from!(LineString, Line, LinearRing);

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;

    fn points<'f>(factory: &'f Factory, coords: &[(f64, f64)]) -> Vec<Point<'f>> {
        coords
            .iter()
            .map(|&(x, y)| factory.point(x, y, &[]).unwrap())
            .collect()
    }

    fn xy<'a>(curve: &impl Curve<'a>) -> Vec<(f64, f64)> {
        curve.points().iter().map(|p| (p.x(), p.y())).collect()
    }

    #[test]
    fn line_string_point_count() {
        let factory = Factory::default();
        for n in 0..5 {
            let coords: Vec<_> = (0..n).map(|i| (i as f64, 0.0)).collect();
            let result = LineString::new(&factory, points(&factory, &coords));
            if n == 1 {
                assert_matches!(result, Err(InvalidGeometry(_)));
            } else {
                assert_eq!(result.unwrap().num_points(), n);
            }
        }
    }

    #[test]
    fn line_rejects_more_than_two_points() {
        let factory = Factory::default();
        let three = points(&factory, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_matches!(Line::from_points(&factory, three), Err(InvalidGeometry(_)));

        let pts = points(&factory, &[(0.0, 0.0), (3.0, 4.0)]);
        let line = Line::new(&factory, &pts[0], &pts[1]).unwrap();
        assert_eq!(line.num_points(), 2);
        assert_abs_diff_eq!(line.length(), 5.0);
    }

    #[test]
    fn ring_is_closed_on_construction() {
        let factory = Factory::default();
        let ring =
            LinearRing::new(&factory, points(&factory, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]))
                .unwrap();
        assert_eq!(xy(&ring), vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        assert!(ring.is_closed());
        assert!(ring.is_ring());
    }

    #[test]
    fn ring_collapses_duplicates() {
        let factory = Factory::default();
        let ring = LinearRing::new(
            &factory,
            points(&factory, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
        )
        .unwrap();
        assert_eq!(xy(&ring), vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
    }

    #[test]
    fn self_intersecting_ring() {
        let factory = Factory::default();
        let bowtie = points(&factory, &[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        assert_matches!(LinearRing::new(&factory, &bowtie), Err(InvalidGeometry(_)));

        let lenient = Factory::builder().with_lenient_assertions(true).build().unwrap();
        let ring = LinearRing::new(&lenient, &bowtie).unwrap();
        assert!(ring.is_closed());
        assert!(!ring.is_simple());
    }

    #[test]
    fn closed_and_simple() {
        let factory = Factory::default();
        let open =
            LineString::new(&factory, points(&factory, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]))
                .unwrap();
        assert!(!open.is_closed());
        assert!(open.is_simple());

        let crossing = LineString::new(
            &factory,
            points(&factory, &[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]),
        )
        .unwrap();
        assert!(!crossing.is_simple());

        let back =
            LineString::new(&factory, points(&factory, &[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0)]))
                .unwrap();
        assert!(!back.is_simple());

        let two = LineString::new(&factory, points(&factory, &[(0.0, 0.0), (0.0, 0.0)])).unwrap();
        assert!(!two.is_closed());
    }

    #[test]
    fn boundary_of_curves() {
        let factory = Factory::default();
        let open =
            LineString::new(&factory, points(&factory, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]))
                .unwrap();
        let boundary = open.boundary();
        assert_eq!(boundary.len(), 2);
        assert!(boundary.geometry_n(0).unwrap().same_location(open.start_point().unwrap()));
        assert!(boundary.geometry_n(1).unwrap().same_location(open.end_point().unwrap()));

        let ring =
            LinearRing::new(&factory, points(&factory, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]))
                .unwrap();
        assert!(ring.boundary().is_empty());

        let empty = LineString::new(&factory, Vec::<Point>::new()).unwrap();
        assert!(empty.boundary().is_empty());
    }

    #[test]
    fn rep_equals_depends_on_type() {
        let factory = Factory::default();
        let pts = points(&factory, &[(0.0, 0.0), (1.0, 0.0)]);
        let line_string = LineString::new(&factory, &pts).unwrap();
        let line = Line::new(&factory, &pts[0], &pts[1]).unwrap();

        assert_eq!(line_string, LineString::new(&factory, &pts).unwrap());
        assert_ne!(
            AnyCurve::from(line_string.clone()),
            AnyCurve::from(line.clone())
        );
        assert!(line_string.to_geometry().equals(&line.to_geometry()));
    }
}
