use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use geo::Coordinate;

use crate::tolerance::Tolerance;

/// Wraps a [`Coordinate`] to support tolerance-bucketed identity.
///
/// Carries the raw coordinate alongside its quantized key. `Eq`, `Ord`
/// and `Hash` are defined on the key only, so two points whose
/// coordinates truncate to the same decimal bucket are interchangeable
/// in sets, maps and the event heap, while the raw value is preserved
/// for reporting. The ordering is lexicographic: by x, then by y.
#[derive(Debug, Clone, Copy)]
pub struct SweepPoint {
    coord: Coordinate<f64>,
    key: (i64, i64),
}

impl SweepPoint {
    /// Create from a coordinate, bucketing under the given tolerance.
    ///
    /// Panics if either coordinate is not finite; the sweep requires
    /// totally ordered event points.
    pub fn new(coord: Coordinate<f64>, tol: &Tolerance) -> Self {
        assert!(
            coord.x.is_finite(),
            "sweep point requires a finite x-coordinate"
        );
        assert!(
            coord.y.is_finite(),
            "sweep point requires a finite y-coordinate"
        );
        SweepPoint {
            coord,
            key: (tol.quantize(coord.x), tol.quantize(coord.y)),
        }
    }

    /// The raw, untruncated coordinate.
    pub fn coord(&self) -> Coordinate<f64> {
        self.coord
    }

    pub fn x(&self) -> f64 {
        self.coord.x
    }

    pub fn y(&self) -> f64 {
        self.coord.y
    }

    pub(crate) fn key(&self) -> (i64, i64) {
        self.key
    }
}

impl PartialEq for SweepPoint {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SweepPoint {}

impl PartialOrd for SweepPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SweepPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Hash for SweepPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// A sweep event: a point at which the active order changes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Event {
    pub(crate) point: SweepPoint,
    pub(crate) kind: EventKind,
}

/// Event kind, carrying the slab keys of the segments involved.
///
/// The rank of the variants matters: at equal x, starts are handled
/// before crossings and crossings before ends, so that a segment
/// beginning exactly where another ends or crosses is inserted into the
/// active order before any removal or reordering at that x runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventKind {
    Start { segment: usize },
    Crossing { upper: usize, lower: usize },
    End { segment: usize },
}

impl EventKind {
    fn rank(&self) -> u8 {
        match self {
            EventKind::Start { .. } => 0,
            EventKind::Crossing { .. } => 1,
            EventKind::End { .. } => 2,
        }
    }
}

/// Equality check for heap usage; ignores the segment keys.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point && self.kind.rank() == other.kind.rank()
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordering for use with a max-heap (`BinaryHeap`): x ascending, then
/// kind rank, then y as the final tie-break, reversed so that `pop`
/// yields the least event. Ignores the segment keys; this suffices for
/// heap usage, where repeated items are allowed.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        let (ax, ay) = self.point.key();
        let (bx, by) = other.point.key();
        ax.cmp(&bx)
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| ay.cmp(&by))
            .reverse()
    }
}
