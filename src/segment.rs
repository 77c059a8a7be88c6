use std::hash::{Hash, Hasher};

use geo::Line;

use crate::events::SweepPoint;
use crate::tolerance::Tolerance;

/// Sentinel slope reported for vertical segments, so that slope
/// comparisons stay total without resorting to ±∞.
pub(crate) const VERTICAL_SLOPE: f64 = f64::MAX;

/// An input segment canonicalized for the sweep.
///
/// The endpoints are ordered so that `left` is the one with the smaller
/// quantized x (ties broken by smaller quantized y) and `right` the
/// other. The axis-parallel flags and the slope are derived once at
/// construction; the original input [`Line`] is kept verbatim for
/// reporting. Equality and hashing are tolerance-bucketed over the
/// canonical endpoints, so two segments whose endpoints coincide within
/// ε are the same segment.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    line: Line<f64>,
    left: SweepPoint,
    right: SweepPoint,
    is_vertical: bool,
    is_horizontal: bool,
    slope: f64,
}

impl Segment {
    /// Canonicalize an input line under the given tolerance.
    ///
    /// Panics on non-finite coordinates (see [`SweepPoint::new`]); the
    /// sweep validates its input before constructing segments.
    pub fn new(line: Line<f64>, tol: &Tolerance) -> Self {
        let start = SweepPoint::new(line.start, tol);
        let end = SweepPoint::new(line.end, tol);
        let (left, right) = if start <= end { (start, end) } else { (end, start) };

        let is_vertical = left.key().0 == right.key().0;
        let is_horizontal = left.key().1 == right.key().1;
        let slope = if is_vertical {
            VERTICAL_SLOPE
        } else {
            (right.y() - left.y()) / (right.x() - left.x())
        };

        Segment {
            line,
            left,
            right,
            is_vertical,
            is_horizontal,
            slope,
        }
    }

    /// The original input geometry.
    pub fn line(&self) -> Line<f64> {
        self.line
    }

    pub fn left(&self) -> SweepPoint {
        self.left
    }

    pub fn right(&self) -> SweepPoint {
        self.right
    }

    /// Both endpoints share a quantized x.
    pub fn is_vertical(&self) -> bool {
        self.is_vertical
    }

    /// Both endpoints share a quantized y.
    pub fn is_horizontal(&self) -> bool {
        self.is_horizontal
    }

    /// Vertical or horizontal: excluded from the positional active
    /// order and tracked in the sweep's special set instead.
    pub fn is_axis_parallel(&self) -> bool {
        self.is_vertical || self.is_horizontal
    }

    /// Slope of the carrying line; [`VERTICAL_SLOPE`] for verticals.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// y of the carrying line at sweep position `x`.
    ///
    /// For a vertical segment the value is independent of `x` and the
    /// lower endpoint's y is reported; verticals never participate in
    /// the positional order, so this only keeps the function total.
    pub(crate) fn y_at(&self, x: f64) -> f64 {
        if self.is_vertical {
            self.left.y()
        } else {
            self.left.y() + self.slope * (x - self.left.x())
        }
    }

    /// Quantized endpoint identity, used for duplicate detection.
    pub(crate) fn quantized(&self) -> (i64, i64, i64, i64) {
        let (lx, ly) = self.left.key();
        let (rx, ry) = self.right.key();
        (lx, ly, rx, ry)
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.quantized() == other.quantized()
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.quantized().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::Line;

    use super::*;

    fn segment(a: (f64, f64), b: (f64, f64)) -> Segment {
        Segment::new(Line::from([a, b]), &Tolerance::default())
    }

    #[test]
    fn canonicalizes_endpoints() {
        let s = segment((3., 1.), (0., 2.));
        assert_eq!(s.left().coord(), (0., 2.).into());
        assert_eq!(s.right().coord(), (3., 1.).into());
        // Equal x: the smaller y becomes the left end.
        let v = segment((1., 4.), (1., -1.));
        assert_eq!(v.left().coord(), (1., -1.).into());
        assert_eq!(v.right().coord(), (1., 4.).into());
        // The input line is kept as given.
        assert_eq!(s.line().start, (3., 1.).into());
    }

    #[test]
    fn axis_parallel_flags() {
        assert!(segment((1., 0.), (1., 5.)).is_vertical());
        assert!(segment((0., 2.), (7., 2.)).is_horizontal());
        let s = segment((0., 0.), (1., 1.));
        assert!(!s.is_axis_parallel());
        // Within tolerance counts as parallel to the axis.
        assert!(segment((1., 0.), (1.000_001, 5.)).is_vertical());
    }

    #[test]
    fn slope_and_evaluation() {
        let s = segment((0., 1.), (4., 3.));
        assert_relative_eq!(s.slope(), 0.5);
        assert_relative_eq!(s.y_at(2.), 2.);
        assert_relative_eq!(s.y_at(0.), 1.);
        assert_eq!(segment((2., 0.), (2., 9.)).slope(), VERTICAL_SLOPE);
    }

    #[test]
    fn equality_is_tolerance_bucketed() {
        let s = segment((0., 0.), (2., 2.));
        let t = segment((2.000_001, 2.000_001), (0., 0.));
        let u = segment((0., 0.), (2., 2.0001));
        assert_eq!(s, t);
        assert_ne!(s, u);
    }
}
