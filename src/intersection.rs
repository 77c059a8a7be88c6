use geo::{Coordinate, Line};

use crate::segment::Segment;
use crate::tolerance::Tolerance;

/// Result of intersecting two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentCrossing {
    /// The segments meet at a single point.
    Point(Coordinate<f64>),
    /// The segments are collinear and share an extended interval.
    ///
    /// A shared continuum has no single intersection point; callers
    /// that expect one must treat this as a degeneracy of its own (the
    /// sweep reports it as [`Error::OverlappingSegments`]).
    ///
    /// [`Error::OverlappingSegments`]: crate::Error::OverlappingSegments
    Overlap(Coordinate<f64>, Coordinate<f64>),
}

/// Where two segments cross, or `None` if they do not.
///
/// Degeneracies are decided in priority order: collinear axis-parallel
/// pairs first (shared extent, touching point, or nothing), distinct
/// parallels next, then the general infinite-line solve with a vertical
/// operand substituted by its fixed x. A solution is verified against
/// both line equations within tolerance and must fall, truncated, inside
/// the closed truncated bounding boxes of both segments. The returned
/// point is the untruncated computed value; only the internal decisions
/// use truncated copies.
///
/// The routine is symmetric in its arguments.
pub fn segment_crossing(a: &Segment, b: &Segment, tol: &Tolerance) -> Option<SegmentCrossing> {
    // Canonical argument order: the computation below assumes
    // a.left <= b.left.
    let (a, b) = if a.quantized() <= b.quantized() {
        (a, b)
    } else {
        (b, a)
    };

    let (x1, y1) = (a.left().x(), a.left().y());
    let (x2, y2) = (a.right().x(), a.right().y());
    let (x3, y3) = (b.left().x(), b.left().y());
    let (x4, y4) = (b.right().x(), b.right().y());

    // Equations of the form x = c: the intersection of two verticals at
    // the same x is a y-interval.
    if a.is_vertical() && b.is_vertical() {
        return if tol.eq(x1, x3) {
            collinear_extent(a, b)
        } else {
            None
        };
    }

    // Equations of the form y = c, symmetric by x.
    if a.is_horizontal() && b.is_horizontal() {
        return if tol.eq(y1, y3) {
            collinear_extent(a, b)
        } else {
            None
        };
    }

    let (x, y) = if a.is_vertical() {
        // Undefined slope; substitute x = x1 into b's line equation.
        let m2 = (y4 - y3) / (x4 - x3);
        let c2 = -m2 * x3 + y3;
        (x1, c2 + m2 * x1)
    } else if b.is_vertical() {
        let m1 = (y2 - y1) / (x2 - x1);
        let c1 = -m1 * x1 + y1;
        (x3, c1 + m1 * x3)
    } else {
        let m1 = (y2 - y1) / (x2 - x1);
        let c1 = -m1 * x1 + y1;
        let m2 = (y4 - y3) / (x4 - x3);
        let c2 = -m2 * x3 + y3;

        if tol.eq(m1, m2) {
            // Same carrying line: the intersection is the shared
            // extent, if any. Distinct parallels never meet.
            return if tol.eq(c1, c2) {
                collinear_extent(a, b)
            } else {
                None
            };
        }

        let x = (c1 - c2) / (m2 - m1);
        let y = c2 + m2 * x;

        // Verify by substituting (x, y) back into both line equations;
        // near-parallel slopes produce a non-finite solve that fails
        // this check.
        if !(tol.eq(-m1 * x + y, c1) && tol.eq(-m2 * x + y, c2)) {
            return None;
        }
        (x, y)
    };

    // The lines are infinitely long: (x, y) counts only if it falls
    // inside both segments.
    let result = Coordinate { x, y };
    if inside_segment(a, result, tol) && inside_segment(b, result, tol) {
        Some(SegmentCrossing::Point(result))
    } else {
        None
    }
}

/// Convenience wrapper over raw input lines.
///
/// Panics on non-finite coordinates.
pub fn line_crossing(a: Line<f64>, b: Line<f64>, precision: i32) -> Option<SegmentCrossing> {
    let tol = Tolerance::new(precision);
    segment_crossing(&Segment::new(a, &tol), &Segment::new(b, &tol), &tol)
}

/// Shared extent of two collinear segments, in endpoint order.
///
/// Requires `a.left <= b.left`. For collinear segments the lexicographic
/// endpoint order is the order along the carrying line, so the shared
/// extent runs from `b.left` to the smaller of the right endpoints.
fn collinear_extent(a: &Segment, b: &Segment) -> Option<SegmentCrossing> {
    let lo = b.left();
    let hi = if a.right() <= b.right() {
        a.right()
    } else {
        b.right()
    };
    if lo > hi {
        None
    } else if lo == hi {
        Some(SegmentCrossing::Point(lo.coord()))
    } else {
        Some(SegmentCrossing::Overlap(lo.coord(), hi.coord()))
    }
}

/// Closed bounding-box containment, decided on truncated copies.
fn inside_segment(segment: &Segment, p: Coordinate<f64>, tol: &Tolerance) -> bool {
    let (x, y) = (tol.truncate(p.x), tol.truncate(p.y));
    let left_x = tol.truncate(segment.left().x());
    let left_y = tol.truncate(segment.left().y());
    let right_x = tol.truncate(segment.right().x());
    let right_y = tol.truncate(segment.right().y());

    (x >= left_x && x <= right_x || x >= right_x && x <= left_x)
        && (y >= left_y && y <= right_y || y >= right_y && y <= left_y)
}
