//! Feeding of the geometries into geozero processors.

use geozero::error::GeozeroError;
use geozero::{CoordDimensions, GeomProcessor, GeozeroGeometry};

use super::dimensions;
use crate::geometry::{
    AnyCurve, Curve, Geometry, GeometryCollection, Line, LineString, LinearRing, MultiLineString,
    MultiPoint, MultiPolygon, Point, Polygon, SimpleGeometry,
};

fn process_coord<P: GeomProcessor>(
    point: &Point,
    idx: usize,
    processor: &mut P,
) -> Result<(), GeozeroError> {
    if processor.multi_dim() {
        processor.coordinate(point.x(), point.y(), point.z(), point.m(), None, None, idx)
    } else {
        processor.xy(point.x(), point.y(), idx)
    }
}

fn process_point<P: GeomProcessor>(
    point: &Point,
    idx: usize,
    processor: &mut P,
) -> Result<(), GeozeroError> {
    processor.point_begin(idx)?;
    process_coord(point, 0, processor)?;
    processor.point_end(idx)
}

fn process_curve<P: GeomProcessor>(
    points: &[Point],
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> Result<(), GeozeroError> {
    processor.linestring_begin(tagged, points.len(), idx)?;
    for (i, point) in points.iter().enumerate() {
        process_coord(point, i, processor)?;
    }
    processor.linestring_end(tagged, idx)
}

fn process_polygon<P: GeomProcessor>(
    polygon: &Polygon,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> Result<(), GeozeroError> {
    if polygon.is_empty() {
        processor.polygon_begin(tagged, 0, idx)?;
        return processor.polygon_end(tagged, idx);
    }

    processor.polygon_begin(tagged, polygon.num_interior_rings() + 1, idx)?;
    let rings = std::iter::once(polygon.exterior_ring()).chain(polygon.interior_rings());
    for (i, ring) in rings.enumerate() {
        process_curve(ring.points(), false, i, processor)?;
    }
    processor.polygon_end(tagged, idx)
}

fn process_multi_point<P: GeomProcessor>(
    multi_point: &MultiPoint,
    idx: usize,
    processor: &mut P,
) -> Result<(), GeozeroError> {
    processor.multipoint_begin(multi_point.len(), idx)?;
    for (i, point) in multi_point.iter().enumerate() {
        process_coord(point, i, processor)?;
    }
    processor.multipoint_end(idx)
}

fn process_multi_line_string<P: GeomProcessor>(
    multi_line_string: &MultiLineString,
    idx: usize,
    processor: &mut P,
) -> Result<(), GeozeroError> {
    processor.multilinestring_begin(multi_line_string.len(), idx)?;
    for (i, curve) in multi_line_string.iter().enumerate() {
        process_curve(curve.points(), false, i, processor)?;
    }
    processor.multilinestring_end(idx)
}

fn process_multi_polygon<P: GeomProcessor>(
    multi_polygon: &MultiPolygon,
    idx: usize,
    processor: &mut P,
) -> Result<(), GeozeroError> {
    processor.multipolygon_begin(multi_polygon.len(), idx)?;
    for (i, polygon) in multi_polygon.iter().enumerate() {
        process_polygon(polygon, false, i, processor)?;
    }
    processor.multipolygon_end(idx)
}

fn process_collection<P: GeomProcessor>(
    collection: &GeometryCollection,
    idx: usize,
    processor: &mut P,
) -> Result<(), GeozeroError> {
    processor.geometrycollection_begin(collection.len(), idx)?;
    for (i, geometry) in collection.iter().enumerate() {
        process_geometry(geometry, i, processor)?;
    }
    processor.geometrycollection_end(idx)
}

fn process_geometry<P: GeomProcessor>(
    geometry: &Geometry,
    idx: usize,
    processor: &mut P,
) -> Result<(), GeozeroError> {
    match geometry {
        Geometry::Point(point) => process_point(point, idx, processor),
        Geometry::LineString(curve) => process_curve(curve.points(), true, idx, processor),
        Geometry::Line(curve) => process_curve(curve.points(), true, idx, processor),
        Geometry::LinearRing(curve) => process_curve(curve.points(), true, idx, processor),
        Geometry::Polygon(polygon) => process_polygon(polygon, true, idx, processor),
        Geometry::MultiPoint(multi_point) => process_multi_point(multi_point, idx, processor),
        Geometry::MultiLineString(multi_line_string) => {
            process_multi_line_string(multi_line_string, idx, processor)
        }
        Geometry::MultiPolygon(multi_polygon) => {
            process_multi_polygon(multi_polygon, idx, processor)
        }
        Geometry::GeometryCollection(collection) => process_collection(collection, idx, processor),
    }
}

macro_rules! impl_geozero_geometry {
    ($($ty:ident => |$g:ident, $p:ident| $body:expr),* $(,)?) => {
        $(
            impl GeozeroGeometry for $ty<'_> {
                fn process_geom<P: GeomProcessor>(
                    &self,
                    processor: &mut P,
                ) -> Result<(), GeozeroError> {
                    let $g = self;
                    let $p = processor;
                    $body
                }

                fn dims(&self) -> CoordDimensions {
                    dimensions(self.factory())
                }

                fn srid(&self) -> Option<i32> {
                    Some(SimpleGeometry::srid(self))
                }
            }
        )*
    };
}

impl_geozero_geometry!(
    Point => |g, p| process_point(g, 0, p),
    LineString => |g, p| process_curve(g.points(), true, 0, p),
    Line => |g, p| process_curve(g.points(), true, 0, p),
    LinearRing => |g, p| process_curve(g.points(), true, 0, p),
    AnyCurve => |g, p| process_curve(g.points(), true, 0, p),
    Polygon => |g, p| process_polygon(g, true, 0, p),
    MultiPoint => |g, p| process_multi_point(g, 0, p),
    MultiLineString => |g, p| process_multi_line_string(g, 0, p),
    MultiPolygon => |g, p| process_multi_polygon(g, 0, p),
    GeometryCollection => |g, p| process_collection(g, 0, p),
    Geometry => |g, p| process_geometry(g, 0, p),
);

#[cfg(test)]
mod tests {
    use geozero::ToWkt;

    use super::*;
    use crate::Factory;

    #[test]
    fn writes_nested_collection() {
        let factory = Factory::default();
        let point = factory.point(1.0, 2.0, &[]).unwrap();
        let line = factory
            .line_string([point.clone(), factory.point(3.0, 4.0, &[]).unwrap()])
            .unwrap();
        let collection = factory.collection([point.to_geometry(), line.to_geometry()]).unwrap();

        assert_eq!(
            collection.to_wkt().unwrap(),
            "GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(1 2,3 4))"
        );
    }

    #[test]
    fn reports_factory_dimensions() {
        let factory = Factory::builder().with_m_coordinate(true).build().unwrap();
        let point = factory.point(1.0, 2.0, &[5.0]).unwrap();

        let dims = GeozeroGeometry::dims(&point);
        assert!(!dims.z);
        assert!(dims.m);
        assert_eq!(GeozeroGeometry::srid(&point), Some(0));
    }
}
