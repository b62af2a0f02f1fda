use std::sync::OnceLock;

use super::hash::{fold, seed};
use super::{
    cast, cast_all, nest, AnyCurve, Convertible, Coordinates, Curve, Geometry, GeometryKind,
    InvalidGeometry, LinearRing, MultiLineString, Shape, SimpleGeometry, TryConvertTo,
};
use crate::Factory;

/// Planar surface bounded by an exterior ring, with optional holes bounded by interior rings.
///
/// Rings are validated as rings, but their mutual position (e.g. whether holes are inside the
/// exterior) is not.
#[derive(Debug, Clone)]
pub struct Polygon<'f> {
    factory: &'f Factory,
    exterior: LinearRing<'f>,
    interiors: Vec<LinearRing<'f>>,
    hash: OnceLock<u64>,
}

impl<'f> Polygon<'f> {
    /// Creates a polygon. The exterior and every interior are converted into linear rings.
    pub fn new<E, G>(
        factory: &'f Factory,
        exterior: E,
        interiors: impl IntoIterator<Item = G>,
    ) -> Result<Self, InvalidGeometry>
    where
        E: TryConvertTo,
        G: TryConvertTo,
    {
        let exterior = cast(&exterior, factory, GeometryKind::LinearRing, false)?;
        let interiors = cast_all(interiors, factory, GeometryKind::LinearRing, false)?;
        Ok(Self::from_rings(factory, exterior, interiors))
    }

    pub(crate) fn from_rings(
        factory: &'f Factory,
        exterior: LinearRing<'f>,
        interiors: Vec<LinearRing<'f>>,
    ) -> Self {
        Self {
            factory,
            exterior,
            interiors,
            hash: OnceLock::new(),
        }
    }

    pub(crate) fn restamp<'t>(&self, factory: &'t Factory) -> Result<Polygon<'t>, InvalidGeometry> {
        Ok(Polygon::from_rings(
            factory,
            self.exterior.restamp(factory)?,
            self.interiors
                .iter()
                .map(|ring| ring.restamp(factory))
                .collect::<Result<_, _>>()?,
        ))
    }

    /// Exterior ring.
    pub fn exterior_ring(&self) -> &LinearRing<'f> {
        &self.exterior
    }

    /// Interior rings (holes).
    pub fn interior_rings(&self) -> &[LinearRing<'f>] {
        &self.interiors
    }

    /// Number of interior rings.
    pub fn num_interior_rings(&self) -> usize {
        self.interiors.len()
    }

    /// Interior ring with the index `n`.
    pub fn interior_ring_n(&self, n: usize) -> Option<&LinearRing<'f>> {
        self.interiors.get(n)
    }

    /// Area of the exterior minus areas of the holes.
    pub fn area(&self) -> f64 {
        self.exterior.signed_area().abs()
            - self
                .interiors
                .iter()
                .map(|ring| ring.signed_area().abs())
                .sum::<f64>()
    }

    /// All rings of the polygon: the exterior if it is not empty, followed by the interiors.
    pub fn boundary(&self) -> MultiLineString<'f> {
        MultiLineString::from_elements(self.factory, self.rings().collect())
    }

    pub(crate) fn rings(&self) -> impl Iterator<Item = AnyCurve<'f>> + '_ {
        (!self.exterior.is_empty())
            .then(|| self.exterior.clone())
            .into_iter()
            .chain(self.interiors.iter().cloned())
            .map(AnyCurve::LinearRing)
    }

    /// Coordinates of the exterior followed by coordinates of the interiors. An empty polygon has
    /// no coordinates.
    pub fn coordinates(&self) -> Vec<Vec<Vec<f64>>> {
        if self.is_empty() {
            return vec![];
        }

        std::iter::once(&self.exterior)
            .chain(&self.interiors)
            .map(|ring| ring.coordinates())
            .collect()
    }

    pub(crate) fn coordinate_tree(&self) -> Coordinates {
        nest(self.coordinates(), |ring| nest(ring, Coordinates::from))
    }
}

impl<'f> SimpleGeometry<'f> for Polygon<'f> {
    fn factory(&self) -> &'f Factory {
        self.factory
    }

    fn geometry_kind(&self) -> GeometryKind {
        GeometryKind::Polygon
    }

    fn dimension(&self) -> i32 {
        2
    }

    fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    fn hash_code(&self) -> u64 {
        *self.hash.get_or_init(|| {
            std::iter::once(&self.exterior)
                .chain(&self.interiors)
                .fold(seed(self.factory, GeometryKind::Polygon), |hash, ring| {
                    fold(hash, ring.hash_code())
                })
        })
    }

    fn rep_equals(&self, other: &Self) -> bool {
        self.factory == other.factory
            && self.exterior.rep_equals(&other.exterior)
            && self.interiors.len() == other.interiors.len()
            && self
                .interiors
                .iter()
                .zip(&other.interiors)
                .all(|(a, b)| a.rep_equals(b))
    }

    fn to_geometry(&self) -> Geometry<'f> {
        self.clone().into()
    }
}

impl Convertible for Polygon<'_> {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Polygon
    }

    fn restamp_into<'t>(&self, factory: &'t Factory) -> Result<Geometry<'t>, InvalidGeometry> {
        self.restamp(factory).map(Into::into)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Single
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::geometry::Point;

    fn ring<'f>(factory: &'f Factory, coords: &[(f64, f64)]) -> LinearRing<'f> {
        let points: Vec<Point> = coords
            .iter()
            .map(|&(x, y)| factory.point(x, y, &[]).unwrap())
            .collect();
        LinearRing::new(factory, points).unwrap()
    }

    #[test]
    fn area_with_hole() {
        let factory = Factory::default();
        let exterior = ring(&factory, &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let hole = ring(&factory, &[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0)]);

        let polygon = Polygon::new(&factory, &exterior, [&hole]).unwrap();
        assert_abs_diff_eq!(polygon.area(), 15.0);
        assert_eq!(polygon.dimension(), 2);
        assert_eq!(polygon.num_interior_rings(), 1);

        let boundary = polygon.boundary();
        assert_eq!(boundary.len(), 2);
        assert_eq!(boundary.geometry_n(0).unwrap().geometry_kind(), GeometryKind::LinearRing);
    }

    #[test]
    fn exterior_from_open_line_string() {
        let factory = Factory::default();
        let line = factory
            .line_string([
                factory.point(0.0, 0.0, &[]).unwrap(),
                factory.point(2.0, 0.0, &[]).unwrap(),
                factory.point(0.0, 2.0, &[]).unwrap(),
            ])
            .unwrap();

        let polygon = Polygon::new(&factory, &line, Vec::<LinearRing>::new()).unwrap();
        assert_eq!(polygon.exterior_ring().num_points(), 4);
        assert_abs_diff_eq!(polygon.area(), 2.0);
        assert_eq!(polygon.coordinates().len(), 1);
    }

    #[test]
    fn empty_polygon() {
        let factory = Factory::default();
        let polygon =
            Polygon::new(&factory, LinearRing::empty(&factory), Vec::<LinearRing>::new()).unwrap();

        assert!(polygon.is_empty());
        assert!(polygon.boundary().is_empty());
        assert!(polygon.coordinates().is_empty());
    }
}
