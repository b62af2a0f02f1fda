//! Segment predicates used by simplicity checks of curves.

use super::Point;

/// Orientation of a triplet of points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Orientation {
    Clockwise,
    Counterclockwise,
    Collinear,
}

impl Orientation {
    /// Determines orientation of a triplet of points.
    pub fn triplet(p: &Point, q: &Point, r: &Point) -> Self {
        let v = (q.y() - p.y()) * (r.x() - q.x()) - (q.x() - p.x()) * (r.y() - q.y());
        if v > 0.0 {
            Self::Clockwise
        } else if v < 0.0 {
            Self::Counterclockwise
        } else {
            Self::Collinear
        }
    }
}

/// A straight line segment between two points.
#[derive(Debug)]
pub(crate) struct Segment<'a, 'f>(pub &'a Point<'f>, pub &'a Point<'f>);

impl Segment<'_, '_> {
    pub fn length(&self) -> f64 {
        (self.1.x() - self.0.x()).hypot(self.1.y() - self.0.y())
    }

    /// Returns true, if the segment has at least one common point with the `other` segment.
    pub fn intersects(&self, other: &Segment) -> bool {
        // Whether `q` lies within the bounding box of `p` and `r`.
        fn on_segment(p: &Point, q: &Point, r: &Point) -> bool {
            q.x() <= p.x().max(r.x())
                && q.x() >= p.x().min(r.x())
                && q.y() <= p.y().max(r.y())
                && q.y() >= p.y().min(r.y())
        }

        let o1 = Orientation::triplet(self.0, other.0, self.1);
        let o2 = Orientation::triplet(self.0, other.1, self.1);
        let o3 = Orientation::triplet(other.0, self.0, other.1);
        let o4 = Orientation::triplet(other.0, self.1, other.1);

        if o1 != o2 && o3 != o4 {
            return true;
        }

        (o1 == Orientation::Collinear && on_segment(self.0, other.0, self.1))
            || (o2 == Orientation::Collinear && on_segment(self.0, other.1, self.1))
            || (o3 == Orientation::Collinear && on_segment(other.0, self.0, other.1))
            || (o4 == Orientation::Collinear && on_segment(other.0, self.1, other.1))
    }
}

/// Whether two segments that meet at `shared` overlap beyond that point, i.e. the path doubles back
/// on itself.
pub(crate) fn doubles_back(shared: &Point, a: &Point, b: &Point) -> bool {
    Orientation::triplet(a, shared, b) == Orientation::Collinear
        && (a.x() - shared.x()) * (b.x() - shared.x()) + (a.y() - shared.y()) * (b.y() - shared.y())
            > 0.0
}

/// Returns true if the path through `points` does not intersect itself. For closed paths the shared
/// first and last point is not an intersection.
pub(crate) fn is_simple_path(points: &[Point]) -> bool {
    let mut path: Vec<&Point> = Vec::with_capacity(points.len());
    for point in points {
        if path.last().map_or(true, |last| !last.same_location(point)) {
            path.push(point);
        }
    }

    let n = path.len();
    if n < 3 {
        return true;
    }

    let closed = path[0].same_location(path[n - 1]);
    let segment_count = n - 1;

    for i in 0..segment_count {
        for j in i + 1..segment_count {
            let adjacent = j == i + 1;
            let wraps = closed && i == 0 && j == segment_count - 1;

            if adjacent && doubles_back(path[i + 1], path[i], path[j + 1]) {
                return false;
            }
            if wraps && doubles_back(path[0], path[1], path[n - 2]) {
                return false;
            }
            if adjacent || wraps {
                continue;
            }

            let a = Segment(path[i], path[i + 1]);
            let b = Segment(path[j], path[j + 1]);
            if a.intersects(&b) {
                return false;
            }
        }
    }

    true
}
