use geozero::error::GeozeroError;
use geozero::GeomProcessor;

use crate::error::{CartesiaError, InvalidGeometry};
use crate::geometry::{
    Geometry, GeometryCollection, GeometryKind, LineString, LinearRing, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use crate::Factory;

/// Geometry as reported by a geozero reader, before validation.
#[derive(Debug)]
enum RawGeometry<'f> {
    Coord(Point<'f>),
    Empty,
    Node(GeometryKind, Vec<RawGeometry<'f>>),
}

#[derive(Debug)]
struct Frame<'f> {
    kind: GeometryKind,
    items: Vec<RawGeometry<'f>>,
}

/// Collects the events of a geozero reader and builds a geometry of the factory from them.
///
/// The events are only recorded while reading. Geometries are constructed in
/// [`GeometryBuilder::finish`], so invalid geometries are reported as
/// [`CartesiaError::InvalidGeometry`] rather than as reader errors.
pub(crate) struct GeometryBuilder<'f> {
    factory: &'f Factory,
    stack: Vec<Frame<'f>>,
    result: Option<RawGeometry<'f>>,
    srid: Option<i32>,
}

impl<'f> GeometryBuilder<'f> {
    pub(crate) fn new(factory: &'f Factory) -> Self {
        Self {
            factory,
            stack: vec![],
            result: None,
            srid: None,
        }
    }

    /// Srid found in the input, if any.
    pub(crate) fn parsed_srid(&self) -> Option<i32> {
        self.srid
    }

    pub(crate) fn finish(self) -> Result<Geometry<'f>, CartesiaError> {
        if !self.stack.is_empty() {
            return Err(structure_error("unterminated geometry").into());
        }

        let raw = self
            .result
            .ok_or_else(|| structure_error("input contains no geometry"))?;
        build(self.factory, raw)
    }

    fn begin(&mut self, kind: GeometryKind, size: usize) {
        self.stack.push(Frame {
            kind,
            items: Vec::with_capacity(size),
        });
    }

    fn end(&mut self) -> Result<(), GeozeroError> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| structure_error("unexpected end of geometry"))?;
        self.push(RawGeometry::Node(frame.kind, frame.items))
    }

    fn push(&mut self, raw: RawGeometry<'f>) -> Result<(), GeozeroError> {
        match self.stack.last_mut() {
            Some(frame) => frame.items.push(raw),
            None if self.result.is_none() => self.result = Some(raw),
            None => return Err(structure_error("input contains more than one geometry")),
        }

        Ok(())
    }
}

fn structure_error(message: &str) -> GeozeroError {
    GeozeroError::Geometry(message.to_string())
}

fn build<'f>(factory: &'f Factory, raw: RawGeometry<'f>) -> Result<Geometry<'f>, CartesiaError> {
    let (kind, items) = match raw {
        RawGeometry::Coord(point) => return Ok(point.into()),
        RawGeometry::Empty => {
            return Err(InvalidGeometry("empty points are not supported".into()).into())
        }
        RawGeometry::Node(kind, items) => (kind, items),
    };

    let geometry = match kind {
        GeometryKind::Point => {
            let mut items = items.into_iter();
            match (items.next(), items.next()) {
                (Some(RawGeometry::Coord(point)), None) => point.into(),
                (Some(RawGeometry::Empty), None) => {
                    return Err(InvalidGeometry("empty points are not supported".into()).into())
                }
                _ => return Err(structure_error("point must have exactly one coordinate").into()),
            }
        }
        GeometryKind::LineString => build_line_string(factory, items)?.into(),
        GeometryKind::Polygon => {
            let mut rings = items
                .into_iter()
                .map(|ring| match ring {
                    RawGeometry::Node(GeometryKind::LineString, coords) => {
                        build_line_string(factory, coords)
                    }
                    _ => Err(structure_error("polygon ring must be a line string").into()),
                })
                .collect::<Result<Vec<_>, _>>()?
                .into_iter();

            let polygon = match rings.next() {
                Some(exterior) => Polygon::new(factory, exterior, rings)?,
                None => Polygon::new(
                    factory,
                    LinearRing::empty(factory),
                    Vec::<LineString>::new(),
                )?,
            };
            polygon.into()
        }
        GeometryKind::MultiPoint => MultiPoint::new(factory, build_all(factory, items)?)?.into(),
        GeometryKind::MultiLineString => {
            MultiLineString::new(factory, build_all(factory, items)?)?.into()
        }
        GeometryKind::MultiPolygon => {
            MultiPolygon::new(factory, build_all(factory, items)?)?.into()
        }
        GeometryKind::GeometryCollection => {
            GeometryCollection::new(factory, build_all(factory, items)?)?.into()
        }
        other => return Err(structure_error(&format!("unsupported geometry kind {other}")).into()),
    };

    Ok(geometry)
}

fn build_all<'f>(
    factory: &'f Factory,
    items: Vec<RawGeometry<'f>>,
) -> Result<Vec<Geometry<'f>>, CartesiaError> {
    items.into_iter().map(|item| build(factory, item)).collect()
}

fn build_line_string<'f>(
    factory: &'f Factory,
    items: Vec<RawGeometry<'f>>,
) -> Result<LineString<'f>, CartesiaError> {
    let points = items
        .into_iter()
        .map(|item| match item {
            RawGeometry::Coord(point) => Ok(point),
            _ => Err(structure_error("line string must consist of coordinates")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LineString::new(factory, points)?)
}

impl GeomProcessor for GeometryBuilder<'_> {
    fn multi_dim(&self) -> bool {
        true
    }

    fn srid(&mut self, srid: Option<i32>) -> Result<(), GeozeroError> {
        self.srid = srid;
        Ok(())
    }

    fn xy(&mut self, x: f64, y: f64, _idx: usize) -> Result<(), GeozeroError> {
        self.push(RawGeometry::Coord(Point::from_parts(self.factory, x, y, None, None)))
    }

    fn coordinate(
        &mut self,
        x: f64,
        y: f64,
        z: Option<f64>,
        m: Option<f64>,
        _t: Option<f64>,
        _tm: Option<u64>,
        _idx: usize,
    ) -> Result<(), GeozeroError> {
        self.push(RawGeometry::Coord(Point::from_parts(self.factory, x, y, z, m)))
    }

    fn empty_point(&mut self, _idx: usize) -> Result<(), GeozeroError> {
        self.push(RawGeometry::Empty)
    }

    fn point_begin(&mut self, _idx: usize) -> Result<(), GeozeroError> {
        self.begin(GeometryKind::Point, 1);
        Ok(())
    }

    fn point_end(&mut self, _idx: usize) -> Result<(), GeozeroError> {
        self.end()
    }

    fn multipoint_begin(&mut self, size: usize, _idx: usize) -> Result<(), GeozeroError> {
        self.begin(GeometryKind::MultiPoint, size);
        Ok(())
    }

    fn multipoint_end(&mut self, _idx: usize) -> Result<(), GeozeroError> {
        self.end()
    }

    fn linestring_begin(
        &mut self,
        _tagged: bool,
        size: usize,
        _idx: usize,
    ) -> Result<(), GeozeroError> {
        self.begin(GeometryKind::LineString, size);
        Ok(())
    }

    fn linestring_end(&mut self, _tagged: bool, _idx: usize) -> Result<(), GeozeroError> {
        self.end()
    }

    fn multilinestring_begin(&mut self, size: usize, _idx: usize) -> Result<(), GeozeroError> {
        self.begin(GeometryKind::MultiLineString, size);
        Ok(())
    }

    fn multilinestring_end(&mut self, _idx: usize) -> Result<(), GeozeroError> {
        self.end()
    }

    fn polygon_begin(
        &mut self,
        _tagged: bool,
        size: usize,
        _idx: usize,
    ) -> Result<(), GeozeroError> {
        self.begin(GeometryKind::Polygon, size);
        Ok(())
    }

    fn polygon_end(&mut self, _tagged: bool, _idx: usize) -> Result<(), GeozeroError> {
        self.end()
    }

    fn multipolygon_begin(&mut self, size: usize, _idx: usize) -> Result<(), GeozeroError> {
        self.begin(GeometryKind::MultiPolygon, size);
        Ok(())
    }

    fn multipolygon_end(&mut self, _idx: usize) -> Result<(), GeozeroError> {
        self.end()
    }

    fn geometrycollection_begin(&mut self, size: usize, _idx: usize) -> Result<(), GeozeroError> {
        self.begin(GeometryKind::GeometryCollection, size);
        Ok(())
    }

    fn geometrycollection_end(&mut self, _idx: usize) -> Result<(), GeozeroError> {
        self.end()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::geometry::SimpleGeometry;

    #[test]
    fn builds_nested_collection() {
        let factory = Factory::default();
        let mut builder = GeometryBuilder::new(&factory);

        builder.geometrycollection_begin(2, 0).unwrap();
        builder.point_begin(0).unwrap();
        builder.xy(1.0, 2.0, 0).unwrap();
        builder.point_end(0).unwrap();
        builder.multipoint_begin(2, 1).unwrap();
        builder.xy(0.0, 0.0, 0).unwrap();
        builder.xy(3.0, 3.0, 1).unwrap();
        builder.multipoint_end(1).unwrap();
        builder.geometrycollection_end(0).unwrap();

        let collection = match builder.finish().unwrap() {
            Geometry::GeometryCollection(collection) => collection,
            other => panic!("expected a collection, got {other:?}"),
        };
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.geometry_n(1).unwrap().geometry_kind(), GeometryKind::MultiPoint);
    }

    #[test]
    fn drops_unsupported_dimensions() {
        let factory = Factory::default();
        let mut builder = GeometryBuilder::new(&factory);

        builder.point_begin(0).unwrap();
        builder.coordinate(1.0, 2.0, Some(3.0), Some(4.0), None, None, 0).unwrap();
        builder.point_end(0).unwrap();

        let geometry = builder.finish().unwrap();
        let point = geometry.as_point().unwrap();
        assert_eq!(point.z(), None);
        assert_eq!(point.m(), None);
    }

    #[test]
    fn rejects_malformed_event_streams() {
        let factory = Factory::default();

        let mut unterminated = GeometryBuilder::new(&factory);
        unterminated.linestring_begin(true, 2, 0).unwrap();
        assert_matches!(unterminated.finish(), Err(CartesiaError::Codec(_)));

        let mut empty_point = GeometryBuilder::new(&factory);
        empty_point.empty_point(0).unwrap();
        assert_matches!(empty_point.finish(), Err(CartesiaError::InvalidGeometry(_)));

        let mut two_points = GeometryBuilder::new(&factory);
        two_points.xy(0.0, 0.0, 0).unwrap();
        assert!(two_points.xy(1.0, 1.0, 0).is_err());
    }
}
