//! Geometry collections: [`MultiPoint`], [`MultiLineString`], [`MultiPolygon`] and the
//! heterogeneous [`GeometryCollection`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::hash::{coord_bits, fold, seed};
use super::{
    cast_all, nest, AnyCurve, Convertible, Coordinates, Curve, Geometry, GeometryKind,
    InvalidGeometry, Point, Polygon, Shape, SimpleGeometry, TryConvertTo,
};
use crate::Factory;

#[derive(Debug, Clone)]
struct ElementSequence<'f, G> {
    factory: &'f Factory,
    elements: Vec<G>,
    dimension: OnceLock<i32>,
    hash: OnceLock<u64>,
}

impl<'f, G: SimpleGeometry<'f>> ElementSequence<'f, G> {
    fn new(factory: &'f Factory, elements: Vec<G>) -> Self {
        Self {
            factory,
            elements,
            dimension: OnceLock::new(),
            hash: OnceLock::new(),
        }
    }

    fn dimension(&self) -> i32 {
        *self.dimension.get_or_init(|| {
            self.elements
                .iter()
                .map(SimpleGeometry::dimension)
                .max()
                .unwrap_or(-1)
        })
    }

    fn hash_code(&self, kind: GeometryKind) -> u64 {
        *self.hash.get_or_init(|| {
            self.elements
                .iter()
                .fold(seed(self.factory, kind), |hash, g| fold(hash, g.hash_code()))
        })
    }

    fn rep_equals(&self, other: &Self) -> bool {
        self.factory == other.factory
            && self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.rep_equals(b))
    }
}

macro_rules! impl_collection {
    ($($ty:ident<$elem:ident> => $kind:ident),*) => {
        $(
            impl<'f> $ty<'f> {
                pub(crate) fn from_elements(
                    factory: &'f Factory,
                    elements: Vec<$elem<'f>>,
                ) -> Self {
                    Self(ElementSequence::new(factory, elements))
                }

                /// Number of elements.
                pub fn len(&self) -> usize {
                    self.0.elements.len()
                }

                /// Number of elements.
                pub fn num_geometries(&self) -> usize {
                    self.len()
                }

                /// Element with the index `n`.
                pub fn geometry_n(&self, n: usize) -> Option<&$elem<'f>> {
                    self.0.elements.get(n)
                }

                /// Elements of the collection.
                pub fn elements(&self) -> &[$elem<'f>] {
                    &self.0.elements
                }

                /// Iterates over the elements.
                pub fn iter(&self) -> std::slice::Iter<'_, $elem<'f>> {
                    self.0.elements.iter()
                }
            }

            impl<'a, 'f> IntoIterator for &'a $ty<'f> {
                type Item = &'a $elem<'f>;
                type IntoIter = std::slice::Iter<'a, $elem<'f>>;

                fn into_iter(self) -> Self::IntoIter {
                    self.iter()
                }
            }

            impl<'f> SimpleGeometry<'f> for $ty<'f> {
                fn factory(&self) -> &'f Factory {
                    self.0.factory
                }

                fn geometry_kind(&self) -> GeometryKind {
                    GeometryKind::$kind
                }

                fn dimension(&self) -> i32 {
                    self.0.dimension()
                }

                fn is_empty(&self) -> bool {
                    self.0.elements.is_empty()
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
                    Shape::Collection(
                        self.0
                            .elements
                            .iter()
                            .map(|e| e as &dyn TryConvertTo)
                            .collect(),
                    )
                }
            }
        )*
    };
}

/// Set of points.
#[derive(Debug, Clone)]
pub struct MultiPoint<'f>(ElementSequence<'f, Point<'f>>);

/// Set of curves. Every element keeps its specific curve type.
#[derive(Debug, Clone)]
pub struct MultiLineString<'f>(ElementSequence<'f, AnyCurve<'f>>);

/// Set of polygons.
#[derive(Debug, Clone)]
pub struct MultiPolygon<'f>(ElementSequence<'f, Polygon<'f>>);

/// Set of geometries of any kind.
#[derive(Debug, Clone)]
pub struct GeometryCollection<'f>(ElementSequence<'f, Geometry<'f>>);

impl_collection!(
    MultiPoint<Point> => MultiPoint,
    MultiLineString<AnyCurve> => MultiLineString,
    MultiPolygon<Polygon> => MultiPolygon,
    GeometryCollection<Geometry> => GeometryCollection
);

impl<'f> MultiPoint<'f> {
    /// Creates a multi point. Elements are converted into points.
    pub fn new<G: TryConvertTo>(
        factory: &'f Factory,
        points: impl IntoIterator<Item = G>,
    ) -> Result<Self, InvalidGeometry> {
        Ok(Self::from_elements(
            factory,
            cast_all(points, factory, GeometryKind::Point, true)?,
        ))
    }

    pub(crate) fn restamp<'t>(
        &self,
        factory: &'t Factory,
    ) -> Result<MultiPoint<'t>, InvalidGeometry> {
        Ok(MultiPoint::from_elements(
            factory,
            self.iter().map(|p| p.restamp(factory)).collect(),
        ))
    }

    /// The boundary of a multi point is an empty geometry collection.
    pub fn boundary(&self) -> GeometryCollection<'f> {
        GeometryCollection::from_elements(self.0.factory, vec![])
    }

    /// Coordinates of every point.
    pub fn coordinates(&self) -> Vec<Vec<f64>> {
        self.iter().map(Point::coordinates).collect()
    }

    pub(crate) fn coordinate_tree(&self) -> Coordinates {
        nest(self.iter(), |p| p.coordinates().into())
    }
}

impl<'f> MultiLineString<'f> {
    /// Creates a multi line string. Elements are converted into curves, keeping their specific
    /// curve types.
    pub fn new<G: TryConvertTo>(
        factory: &'f Factory,
        curves: impl IntoIterator<Item = G>,
    ) -> Result<Self, InvalidGeometry> {
        Ok(Self::from_elements(
            factory,
            cast_all(curves, factory, GeometryKind::LineString, true)?,
        ))
    }

    pub(crate) fn restamp<'t>(
        &self,
        factory: &'t Factory,
    ) -> Result<MultiLineString<'t>, InvalidGeometry> {
        Ok(MultiLineString::from_elements(
            factory,
            self.iter()
                .map(|c| c.restamp(factory))
                .collect::<Result<_, _>>()?,
        ))
    }

    /// Whether every element is closed.
    pub fn is_closed(&self) -> bool {
        self.iter().all(|c| c.is_closed())
    }

    /// Sum of lengths of the elements.
    pub fn length(&self) -> f64 {
        self.iter().map(|c| c.length()).sum()
    }

    /// Boundary by the "mod 2" rule: end points of the open elements that are shared by an odd
    /// number of element ends. Points are returned in the order they are first encountered.
    pub fn boundary(&self) -> MultiPoint<'f> {
        let mut endpoints: Vec<(&Point<'f>, usize)> = vec![];
        let mut index: HashMap<(u64, u64), usize, ahash::RandomState> = HashMap::default();

        let open_ends = self
            .iter()
            .filter(|c| !c.is_empty() && !c.is_closed())
            .flat_map(|c| c.start_point().into_iter().chain(c.end_point()));

        for point in open_ends {
            match index.entry((coord_bits(point.x()), coord_bits(point.y()))) {
                Entry::Occupied(entry) => endpoints[*entry.get()].1 += 1,
                Entry::Vacant(entry) => {
                    entry.insert(endpoints.len());
                    endpoints.push((point, 1));
                }
            }
        }

        MultiPoint::from_elements(
            self.0.factory,
            endpoints
                .into_iter()
                .filter(|(_, count)| count % 2 == 1)
                .map(|(point, _)| point.clone())
                .collect(),
        )
    }

    /// Coordinates of every curve.
    pub fn coordinates(&self) -> Vec<Vec<Vec<f64>>> {
        self.iter().map(|c| c.coordinates()).collect()
    }

    pub(crate) fn coordinate_tree(&self) -> Coordinates {
        nest(self.iter(), AnyCurve::coordinate_tree)
    }
}

impl<'f> MultiPolygon<'f> {
    /// Creates a multi polygon. Elements are converted into polygons.
    pub fn new<G: TryConvertTo>(
        factory: &'f Factory,
        polygons: impl IntoIterator<Item = G>,
    ) -> Result<Self, InvalidGeometry> {
        Ok(Self::from_elements(
            factory,
            cast_all(polygons, factory, GeometryKind::Polygon, true)?,
        ))
    }

    pub(crate) fn restamp<'t>(
        &self,
        factory: &'t Factory,
    ) -> Result<MultiPolygon<'t>, InvalidGeometry> {
        Ok(MultiPolygon::from_elements(
            factory,
            self.iter()
                .map(|p| p.restamp(factory))
                .collect::<Result<_, _>>()?,
        ))
    }

    /// Sum of areas of the elements.
    pub fn area(&self) -> f64 {
        self.iter().map(Polygon::area).sum()
    }

    /// Rings of all elements: for every polygon its exterior ring if it is not empty, followed by
    /// its interior rings.
    pub fn boundary(&self) -> MultiLineString<'f> {
        MultiLineString::from_elements(
            self.0.factory,
            self.iter().flat_map(Polygon::rings).collect(),
        )
    }

    /// Coordinates of every polygon.
    pub fn coordinates(&self) -> Vec<Vec<Vec<Vec<f64>>>> {
        self.iter().map(Polygon::coordinates).collect()
    }

    pub(crate) fn coordinate_tree(&self) -> Coordinates {
        nest(self.iter(), Polygon::coordinate_tree)
    }
}

impl<'f> GeometryCollection<'f> {
    /// Creates a geometry collection. Elements of any kind are copied into the factory.
    pub fn new<G: TryConvertTo>(
        factory: &'f Factory,
        geometries: impl IntoIterator<Item = G>,
    ) -> Result<Self, InvalidGeometry> {
        Ok(Self::from_elements(
            factory,
            cast_all(geometries, factory, GeometryKind::Geometry, true)?,
        ))
    }

    pub(crate) fn restamp<'t>(
        &self,
        factory: &'t Factory,
    ) -> Result<GeometryCollection<'t>, InvalidGeometry> {
        Ok(GeometryCollection::from_elements(
            factory,
            self.iter()
                .map(|g| g.restamp(factory))
                .collect::<Result<_, _>>()?,
        ))
    }

    /// Coordinates of every element.
    pub fn coordinates(&self) -> Vec<Coordinates> {
        self.iter().map(Geometry::coordinates).collect()
    }

    pub(crate) fn coordinate_tree(&self) -> Coordinates {
        Coordinates::Nested(self.coordinates())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::geometry::{LineString, LinearRing};

    fn line<'f>(factory: &'f Factory, coords: &[(f64, f64)]) -> LineString<'f> {
        let points: Vec<Point> = coords
            .iter()
            .map(|&(x, y)| factory.point(x, y, &[]).unwrap())
            .collect();
        LineString::new(factory, points).unwrap()
    }

    fn xy(points: &MultiPoint) -> Vec<(f64, f64)> {
        points.iter().map(|p| (p.x(), p.y())).collect()
    }

    #[test]
    fn boundary_of_two_segment_path() {
        let factory = Factory::default();
        let a = line(&factory, &[(0.0, 0.0), (1.0, 1.0)]);
        let b = line(&factory, &[(1.0, 1.0), (2.0, 2.0)]);

        let mls = MultiLineString::new(&factory, [&a, &b]).unwrap();
        assert_eq!(xy(&mls.boundary()), vec![(0.0, 0.0), (2.0, 2.0)]);
    }

    #[test]
    fn boundary_odd_count() {
        let factory = Factory::default();
        let a = line(&factory, &[(0.0, 0.0), (1.0, 0.0)]);
        let b = line(&factory, &[(1.0, 0.0), (1.0, 1.0)]);
        let c = line(&factory, &[(1.0, 0.0), (2.0, 0.0)]);
        let closed = line(&factory, &[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 5.0)]);

        let mls = MultiLineString::new(&factory, [&a, &b, &c, &closed]).unwrap();
        assert_eq!(
            xy(&mls.boundary()),
            vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (2.0, 0.0)]
        );
        assert!(!mls.is_closed());
        assert_abs_diff_eq!(mls.length(), 5.0 + 2f64.sqrt());
    }

    #[test]
    fn keeps_curve_subtypes() {
        let factory = Factory::default();
        let ring = factory
            .linear_ring([
                factory.point(0.0, 0.0, &[]).unwrap(),
                factory.point(1.0, 0.0, &[]).unwrap(),
                factory.point(0.0, 1.0, &[]).unwrap(),
            ])
            .unwrap();

        let mls = MultiLineString::new(&factory, [&ring]).unwrap();
        assert_eq!(mls.geometry_n(0).unwrap().geometry_kind(), GeometryKind::LinearRing);
        assert!(mls.is_closed());
        assert!(mls.boundary().is_empty());
    }

    #[test]
    fn dimension_of_collections() {
        let factory = Factory::default();
        let empty = GeometryCollection::new(&factory, Vec::<Geometry>::new()).unwrap();
        assert_eq!(empty.dimension(), -1);

        let point = factory.point(0.0, 0.0, &[]).unwrap().to_geometry();
        let curve = line(&factory, &[(0.0, 0.0), (1.0, 1.0)]).to_geometry();
        let mixed = GeometryCollection::new(&factory, [&point, &curve]).unwrap();
        assert_eq!(mixed.dimension(), 1);
        assert_eq!(mixed.len(), 2);
    }

    fn ring<'f>(factory: &'f Factory, coords: &[(f64, f64)]) -> LinearRing<'f> {
        let points: Vec<Point> = coords
            .iter()
            .map(|&(x, y)| factory.point(x, y, &[]).unwrap())
            .collect();
        LinearRing::new(factory, points).unwrap()
    }

    #[test]
    fn multi_polygon_area_and_boundary() {
        let factory = Factory::default();
        let square = Polygon::new(
            &factory,
            ring(&factory, &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]),
            [ring(&factory, &[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0)])],
        )
        .unwrap();
        let triangle = Polygon::new(
            &factory,
            ring(&factory, &[(10.0, 10.0), (11.0, 10.0), (11.0, 11.0)]),
            Vec::<LinearRing>::new(),
        )
        .unwrap();

        let polygons = MultiPolygon::new(&factory, [&square, &triangle]).unwrap();
        assert_eq!(polygons.dimension(), 2);
        assert_abs_diff_eq!(polygons.area(), 15.5);

        let boundary = polygons.boundary();
        assert_eq!(boundary.len(), 3);
        assert!(boundary
            .iter()
            .all(|curve| curve.geometry_kind() == GeometryKind::LinearRing));

        let starts: Vec<(f64, f64)> = boundary
            .iter()
            .map(|curve| {
                let start = curve.start_point().unwrap();
                (start.x(), start.y())
            })
            .collect();
        assert_eq!(starts, vec![(0.0, 0.0), (1.0, 1.0), (10.0, 10.0)]);
        assert!(boundary.is_closed());
    }

    #[test]
    fn multi_polygon_with_empty_element() {
        let factory = Factory::default();
        let empty =
            Polygon::new(&factory, LinearRing::empty(&factory), Vec::<LinearRing>::new()).unwrap();
        let triangle = Polygon::new(
            &factory,
            ring(&factory, &[(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]),
            Vec::<LinearRing>::new(),
        )
        .unwrap();

        let polygons = MultiPolygon::new(&factory, [&empty, &triangle]).unwrap();
        assert_eq!(polygons.len(), 2);
        assert!(polygons.geometry_n(0).unwrap().is_empty());
        assert_abs_diff_eq!(polygons.area(), 2.0);

        let boundary = polygons.boundary();
        assert_eq!(boundary.len(), 1);
        assert_eq!(boundary.geometry_n(0).unwrap().num_points(), 4);
    }

    #[test]
    fn rejects_elements_of_wrong_kind() {
        let factory = Factory::default();
        let curve = line(&factory, &[(0.0, 0.0), (1.0, 1.0)]);
        assert!(MultiPoint::new(&factory, [&curve]).is_err());
        assert!(MultiPolygon::new(&factory, [&curve]).is_err());
    }

    #[test]
    fn hash_follows_rep_equals() {
        let factory = Factory::default();
        let a = MultiPoint::new(
            &factory,
            [
                factory.point(0.0, 0.0, &[]).unwrap(),
                factory.point(1.0, 1.0, &[]).unwrap(),
            ],
        )
        .unwrap();
        let b = a.clone();
        let reversed = MultiPoint::new(&factory, a.iter().rev()).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_ne!(a, reversed);
    }
}
