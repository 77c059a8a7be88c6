use std::cmp::Ordering;

/// Default decimal precision used by the convenience entry points.
pub const DEFAULT_PRECISION: i32 = 5;

/// Decimal-precision tolerance for floating-point comparisons.
///
/// All geometric decisions in this crate are made up to ε = 10⁻ᵖ for a
/// configured number of decimal digits `p`. Two coordinates closer than ε
/// are treated as equal; [`quantize`] maps a coordinate to the integer
/// bucket used as its identity in hashed and ordered collections, so that
/// near-coincident results from different computation paths deduplicate.
///
/// [`quantize`]: Tolerance::quantize
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    precision: i32,
    eps: f64,
    scale: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::new(DEFAULT_PRECISION)
    }
}

impl Tolerance {
    /// Tolerance with ε = 10⁻ᵖ for `precision` decimal digits.
    pub fn new(precision: i32) -> Self {
        assert!(
            (0..=12).contains(&precision),
            "precision must be between 0 and 12 decimal digits"
        );
        Tolerance {
            precision,
            eps: 10f64.powi(-precision),
            scale: 10f64.powi(precision),
        }
    }

    /// The configured number of decimal digits.
    pub fn precision(&self) -> i32 {
        self.precision
    }

    /// ε = 10⁻ᵖ.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Truncate toward zero at `precision` decimal digits.
    pub fn truncate(&self, v: f64) -> f64 {
        (v * self.scale).trunc() / self.scale
    }

    /// The truncated value scaled to an integer bucket.
    pub fn quantize(&self, v: f64) -> i64 {
        (v * self.scale).trunc() as i64
    }

    /// `a == b` within ε.
    pub fn eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.eps
    }

    /// `a < b` by more than ε.
    pub fn lt(&self, a: f64, b: f64) -> bool {
        a - b < -self.eps
    }

    /// `a <= b` within ε.
    pub fn le(&self, a: f64, b: f64) -> bool {
        let d = a - b;
        d < -self.eps || d.abs() < self.eps
    }

    /// `a > b` by more than ε.
    pub fn gt(&self, a: f64, b: f64) -> bool {
        a - b > self.eps
    }

    /// `a >= b` within ε.
    pub fn ge(&self, a: f64, b: f64) -> bool {
        let d = a - b;
        d > self.eps || d.abs() < self.eps
    }

    /// Three-way comparison treating values within ε as equal.
    pub fn cmp(&self, a: f64, b: f64) -> Ordering {
        let d = a - b;
        if d.abs() < self.eps {
            Ordering::Equal
        } else if d < 0. {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}
