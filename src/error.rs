use std::error;
use std::fmt;

use geo::Line;

/// Errors reported by input validation or by the sweep itself.
///
/// Internal invariant violations (a corrupted active order, an
/// unorderable comparison) are defects, not data problems, and panic
/// with a diagnostic instead of appearing here.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Two input segments share both endpoints within tolerance. Their
    /// relative order on the sweep line is ambiguous, so the input is
    /// rejected before the sweep starts.
    DuplicateSegments(Line<f64>),
    /// Two distinct collinear input segments share more than one point.
    /// The shared continuum has no single intersection point to report.
    OverlappingSegments(Line<f64>, Line<f64>),
    /// An input segment's endpoints coincide within tolerance.
    DegenerateSegment(Line<f64>),
    /// An input coordinate is NaN or infinite.
    NonFiniteCoordinate(Line<f64>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateSegments(line) => {
                write!(f, "duplicate input segment: {:?}", line)
            }
            Error::OverlappingSegments(a, b) => write!(
                f,
                "segments overlap along a shared interval: {:?} and {:?}",
                a, b
            ),
            Error::DegenerateSegment(line) => {
                write!(f, "segment endpoints coincide: {:?}", line)
            }
            Error::NonFiniteCoordinate(line) => {
                write!(f, "segment has a non-finite coordinate: {:?}", line)
            }
        }
    }
}

impl error::Error for Error {}
