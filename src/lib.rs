//! Plane-sweep computation of all pairwise intersections among a set
//! of line segments.
//!
//! This is an implementation of the [Bentley-Ottman] algorithm: it
//! finds every point where two or more input segments cross in
//! O((n + k) log(n)) time for n segments and k intersections, instead
//! of the brute-force check over all pairs. For each distinct
//! intersection point the distinct segments passing through it are
//! reported, so three segments concurrent at one point yield a single
//! entry attributing all three.
//!
//! All geometric decisions are made up to a decimal tolerance
//! ε = 10⁻ᵖ (see [`Tolerance`]), which absorbs floating-point error in
//! the sweep-order comparisons and deduplicates near-coincident
//! results. The pairwise test itself is available as
//! [`line_crossing`] / [`segment_crossing`].
//!
//! # Usage
//!
//! ```rust
//! use geo::Line;
//! use segment_sweep::intersections;
//!
//! let input = vec![
//!     Line::from([(0., 0.), (2., 2.)]),
//!     Line::from([(0., 2.), (2., 0.)]),
//!     Line::from([(0., 1.), (2., 1.)]),
//! ];
//! // All three segments pass through (1, 1).
//! let found = intersections(input).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].point, (1., 1.).into());
//! assert_eq!(found[0].segments.len(), 3);
//! ```
//!
//! Duplicate input segments are rejected, and two collinear segments
//! sharing more than one point are reported as
//! [`Error::OverlappingSegments`] rather than silently resolved to a
//! single point.
//!
//! [Bentley-Ottman]: //en.wikipedia.org/wiki/Bentley%E2%80%93Ottmann_algorithm

use geo::Line;

mod tolerance;
pub use tolerance::{Tolerance, DEFAULT_PRECISION};

mod events;
pub use events::SweepPoint;

mod segment;
pub use segment::Segment;

mod error;
pub use error::Error;

pub mod intersection;
pub use intersection::{line_crossing, segment_crossing, SegmentCrossing};

mod active;

pub mod sweep;
pub use sweep::{Intersection, Sweep};

/// Find all intersections at the default precision.
pub fn intersections<I>(lines: I) -> Result<Vec<Intersection>, Error>
where
    I: IntoIterator<Item = Line<f64>>,
{
    Sweep::new(lines, Tolerance::default())?.run()
}

/// Find all intersections with tolerance ε = 10⁻ᵖ.
pub fn intersections_with_precision<I>(lines: I, precision: i32) -> Result<Vec<Intersection>, Error>
where
    I: IntoIterator<Item = Line<f64>>,
{
    Sweep::new(lines, Tolerance::new(precision))?.run()
}

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;
