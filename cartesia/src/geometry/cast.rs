//! Conversion of geometries between kinds and factories.

use super::{
    AnyCurve, Geometry, GeometryCollection, GeometryKind, Line, LineString, LinearRing,
    MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use crate::error::InvalidGeometry;
use crate::Factory;

/// Conversion of a value into a geometry of the given kind, created by the given factory.
///
/// All geometry constructors take their elements through this trait, so elements created by another
/// factory (with different coordinate arity or spatial reference) or of another kind can be used as
/// long as a conversion exists.
///
/// Rules of the conversion:
/// * a geometry of the required kind, or of its subtype if `keep_subtype` is set or the required
///   kind is [`GeometryKind::Geometry`], is copied into the target factory. Missing z and m values
///   become `0.0`, extra ones are dropped;
/// * any curve converts into a line string, into a line if it has 0 or 2 points, and into a linear
///   ring if ring construction succeeds;
/// * a collection with a single element converts into whatever that element converts into;
/// * a point, a curve or a polygon converts into a multi geometry containing it, and any geometry
///   converts into a geometry collection containing it;
/// * a collection converts into a multi geometry if every element converts into the element kind of
///   that multi geometry.
pub trait TryConvertTo {
    /// Kind of the value being converted.
    fn source_kind(&self) -> GeometryKind;

    /// Converts the value. Returns `None` if no conversion exists.
    fn try_convert_to<'t>(
        &self,
        factory: &'t Factory,
        kind: GeometryKind,
        keep_subtype: bool,
    ) -> Option<Geometry<'t>>;
}

impl<T: TryConvertTo + ?Sized> TryConvertTo for &T {
    fn source_kind(&self) -> GeometryKind {
        (**self).source_kind()
    }

    fn try_convert_to<'t>(
        &self,
        factory: &'t Factory,
        kind: GeometryKind,
        keep_subtype: bool,
    ) -> Option<Geometry<'t>> {
        (**self).try_convert_to(factory, kind, keep_subtype)
    }
}

/// Structure of a geometry as seen by the conversion.
pub(crate) enum Shape<'a> {
    Single,
    Curve(&'a [Point<'a>]),
    Collection(Vec<&'a dyn TryConvertTo>),
}

pub(crate) trait Convertible {
    fn kind(&self) -> GeometryKind;
    fn restamp_into<'t>(&self, factory: &'t Factory) -> Result<Geometry<'t>, InvalidGeometry>;
    fn shape(&self) -> Shape<'_>;
}

pub(crate) fn convert<'t, G>(
    source: &G,
    factory: &'t Factory,
    kind: GeometryKind,
    keep_subtype: bool,
) -> Option<Geometry<'t>>
where
    G: Convertible + ?Sized,
{
    let source_kind = source.kind();
    if kind == GeometryKind::Geometry
        || source_kind == kind
        || (keep_subtype && source_kind.is_subtype_of(kind))
    {
        return source.restamp_into(factory).ok();
    }

    let shape = source.shape();
    if let Shape::Collection(elements) = &shape {
        if let [element] = elements.as_slice() {
            if let Some(converted) = element.try_convert_to(factory, kind, keep_subtype) {
                return Some(converted);
            }
        }
    }

    match (kind, shape) {
        (GeometryKind::LineString, Shape::Curve(points)) => {
            LineString::from_points(factory, restamp_points(points, factory))
                .ok()
                .map(Into::into)
        }
        (GeometryKind::Line, Shape::Curve(points)) => {
            Line::from_points(factory, restamp_points(points, factory))
                .ok()
                .map(Into::into)
        }
        (GeometryKind::LinearRing, Shape::Curve(points)) => {
            LinearRing::from_points(factory, restamp_points(points, factory))
                .ok()
                .map(Into::into)
        }
        (GeometryKind::MultiPoint, Shape::Collection(elements)) => {
            let points = convert_all(&elements, factory, GeometryKind::Point, true)?;
            Some(MultiPoint::from_elements(factory, points).into())
        }
        (GeometryKind::MultiPoint, Shape::Single) if source_kind == GeometryKind::Point => {
            let point = Point::try_from(source.restamp_into(factory).ok()?).ok()?;
            Some(MultiPoint::from_elements(factory, vec![point]).into())
        }
        (GeometryKind::MultiLineString, Shape::Collection(elements)) => {
            let curves = convert_all(&elements, factory, GeometryKind::LineString, true)?;
            Some(MultiLineString::from_elements(factory, curves).into())
        }
        (GeometryKind::MultiLineString, Shape::Curve(_)) => {
            let curve = AnyCurve::try_from(source.restamp_into(factory).ok()?).ok()?;
            Some(MultiLineString::from_elements(factory, vec![curve]).into())
        }
        (GeometryKind::MultiPolygon, Shape::Collection(elements)) => {
            let polygons = convert_all(&elements, factory, GeometryKind::Polygon, true)?;
            Some(MultiPolygon::from_elements(factory, polygons).into())
        }
        (GeometryKind::MultiPolygon, Shape::Single) if source_kind == GeometryKind::Polygon => {
            let polygon = Polygon::try_from(source.restamp_into(factory).ok()?).ok()?;
            Some(MultiPolygon::from_elements(factory, vec![polygon]).into())
        }
        (GeometryKind::GeometryCollection, Shape::Collection(elements)) => {
            let geometries = convert_all(&elements, factory, GeometryKind::Geometry, true)?;
            Some(GeometryCollection::from_elements(factory, geometries).into())
        }
        (GeometryKind::GeometryCollection, _) => {
            let geometry = source.restamp_into(factory).ok()?;
            Some(GeometryCollection::from_elements(factory, vec![geometry]).into())
        }
        _ => None,
    }
}

fn restamp_points<'t>(points: &[Point], factory: &'t Factory) -> Vec<Point<'t>> {
    points.iter().map(|p| p.restamp(factory)).collect()
}

fn convert_all<'t, T>(
    elements: &[&dyn TryConvertTo],
    factory: &'t Factory,
    kind: GeometryKind,
    keep_subtype: bool,
) -> Option<Vec<T>>
where
    T: TryFrom<Geometry<'t>>,
{
    elements
        .iter()
        .map(|element| {
            element
                .try_convert_to(factory, kind, keep_subtype)
                .and_then(|g| T::try_from(g).ok())
        })
        .collect()
}

/// Converts a construction input into the type required at its position.
pub(crate) fn cast<'f, T, G>(
    value: &G,
    factory: &'f Factory,
    kind: GeometryKind,
    keep_subtype: bool,
) -> Result<T, InvalidGeometry>
where
    T: TryFrom<Geometry<'f>>,
    G: TryConvertTo + ?Sized,
{
    value
        .try_convert_to(factory, kind, keep_subtype)
        .and_then(|g| T::try_from(g).ok())
        .ok_or_else(|| {
            InvalidGeometry(format!(
                "could not cast {} into {kind}",
                value.source_kind()
            ))
        })
}

pub(crate) fn cast_all<'f, T, G>(
    values: impl IntoIterator<Item = G>,
    factory: &'f Factory,
    kind: GeometryKind,
    keep_subtype: bool,
) -> Result<Vec<T>, InvalidGeometry>
where
    T: TryFrom<Geometry<'f>>,
    G: TryConvertTo,
{
    values
        .into_iter()
        .map(|value| cast(&value, factory, kind, keep_subtype))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Curve, SimpleGeometry};

    #[test]
    fn point_into_other_arity() {
        let xy = Factory::default();
        let xyzm = Factory::builder()
            .with_z_coordinate(true)
            .with_m_coordinate(true)
            .build()
            .unwrap();

        let point = xyzm.point(1.0, 2.0, &[3.0, 4.0]).unwrap();
        let converted: Point = cast(&point, &xy, GeometryKind::Point, false).unwrap();
        assert_eq!(converted.coordinates(), vec![1.0, 2.0]);

        let back: Point = cast(&converted, &xyzm, GeometryKind::Point, false).unwrap();
        assert_eq!(back.coordinates(), vec![1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn curve_subtypes() {
        let factory = Factory::default();
        let ring = factory
            .linear_ring([
                factory.point(0.0, 0.0, &[]).unwrap(),
                factory.point(1.0, 0.0, &[]).unwrap(),
                factory.point(0.0, 1.0, &[]).unwrap(),
            ])
            .unwrap();

        let kept = ring
            .try_convert_to(&factory, GeometryKind::LineString, true)
            .unwrap();
        assert_eq!(kept.geometry_kind(), GeometryKind::LinearRing);

        let downgraded = ring
            .try_convert_to(&factory, GeometryKind::LineString, false)
            .unwrap();
        assert_eq!(downgraded.geometry_kind(), GeometryKind::LineString);

        assert!(ring
            .try_convert_to(&factory, GeometryKind::Line, false)
            .is_none());
        assert!(ring
            .try_convert_to(&factory, GeometryKind::Point, false)
            .is_none());
    }

    #[test]
    fn line_string_into_ring_closes_it() {
        let factory = Factory::default();
        let line = factory
            .line_string([
                factory.point(0.0, 0.0, &[]).unwrap(),
                factory.point(2.0, 0.0, &[]).unwrap(),
                factory.point(2.0, 2.0, &[]).unwrap(),
            ])
            .unwrap();

        let ring: LinearRing = cast(&line, &factory, GeometryKind::LinearRing, false).unwrap();
        assert_eq!(ring.num_points(), 4);
        assert!(ring.is_closed());
    }

    #[test]
    fn wrapping_and_unwrapping() {
        let factory = Factory::default();
        let point = factory.point(1.0, 1.0, &[]).unwrap();

        let multi: MultiPoint = cast(&point, &factory, GeometryKind::MultiPoint, false).unwrap();
        assert_eq!(multi.len(), 1);

        let single: Point = cast(&multi, &factory, GeometryKind::Point, false).unwrap();
        assert_eq!(single, point);

        let collection: GeometryCollection =
            cast(&point, &factory, GeometryKind::GeometryCollection, false).unwrap();
        let multi: MultiPoint =
            cast(&collection, &factory, GeometryKind::MultiPoint, false).unwrap();
        assert_eq!(multi.len(), 1);
    }

    #[test]
    fn failed_cast_names_kinds() {
        let factory = Factory::default();
        let point = factory.point(1.0, 1.0, &[]).unwrap();

        let err = cast::<Polygon, _>(&point, &factory, GeometryKind::Polygon, false).unwrap_err();
        assert_eq!(err.0, "could not cast Point into Polygon");
    }
}
