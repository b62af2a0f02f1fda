use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Runtime type of a geometry.
///
/// Types form the OGC hierarchy: [`Line`](GeometryKind::Line) and
/// [`LinearRing`](GeometryKind::LinearRing) are line strings, all multi-geometries are geometry
/// collections, and everything is a [`Geometry`](GeometryKind::Geometry).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    /// Any geometry.
    Geometry,
    /// Single position.
    Point,
    /// Sequence of connected points.
    LineString,
    /// Line string with exactly two points.
    Line,
    /// Closed simple line string.
    LinearRing,
    /// Area bounded by an exterior ring with optional holes.
    Polygon,
    /// Set of points.
    MultiPoint,
    /// Set of line strings.
    MultiLineString,
    /// Set of polygons.
    MultiPolygon,
    /// Set of arbitrary geometries.
    GeometryCollection,
}

impl GeometryKind {
    /// Returns true if a geometry of this kind is also a geometry of the `other` kind.
    pub fn is_subtype_of(self, other: GeometryKind) -> bool {
        use GeometryKind::*;

        self == other
            || other == Geometry
            || matches!(
                (self, other),
                (Line | LinearRing, LineString)
                    | (MultiPoint | MultiLineString | MultiPolygon, GeometryCollection)
            )
    }

    /// Kind of the elements of a collection kind.
    pub fn element_kind(self) -> Option<GeometryKind> {
        match self {
            Self::MultiPoint => Some(Self::Point),
            Self::MultiLineString => Some(Self::LineString),
            Self::MultiPolygon => Some(Self::Polygon),
            Self::GeometryCollection => Some(Self::Geometry),
            _ => None,
        }
    }

    pub(crate) fn is_curve(self) -> bool {
        self.is_subtype_of(Self::LineString)
    }

    pub(crate) fn family(self) -> GeometryKind {
        if self.is_curve() {
            Self::LineString
        } else {
            self
        }
    }

    /// Name of the kind as used in the OGC standard.
    pub fn name(self) -> &'static str {
        match self {
            Self::Geometry => "Geometry",
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::Line => "Line",
            Self::LinearRing => "LinearRing",
            Self::Polygon => "Polygon",
            Self::MultiPoint => "MultiPoint",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPolygon => "MultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
        }
    }
}

impl Display for GeometryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
