//! The tolerance pair governing every nearly-equal test in the engine.
//!
//! A single distance epsilon and a single angular epsilon are threaded
//! through the geometry, intersection, and assembly code so that "the same
//! point", "the same angle", and "degenerate" mean the same thing everywhere.

use serde::{Deserialize, Serialize};

/// Absolute-distance and angular tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eps {
    /// Absolute distance below which two coordinates are the same point.
    pub distance: f64,
    /// Angle in degrees below which two directions are the same direction.
    pub angle: f64,
}

impl Default for Eps {
    fn default() -> Self {
        Self {
            distance: 1e-6,
            angle: 1e-4,
        }
    }
}

impl Eps {
    /// Returns true when `a` and `b` are within the distance tolerance.
    pub fn same(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.distance
    }

    /// Returns true when the two angles (degrees) are within the angular
    /// tolerance, comparing on the circle.
    pub fn same_angle(&self, a: f64, b: f64) -> bool {
        let mut d = (a - b) % 360.0;
        if d > 180.0 {
            d -= 360.0;
        } else if d < -180.0 {
            d += 360.0;
        }
        d.abs() <= self.angle
    }

    /// Returns true when `v` is below the distance tolerance.
    pub fn zero(&self, v: f64) -> bool {
        v.abs() <= self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_angle_wraps() {
        let eps = Eps::default();
        assert!(eps.same_angle(359.99999, -0.00001));
        assert!(eps.same_angle(0.0, 360.0));
        assert!(!eps.same_angle(0.0, 1.0));
    }
}
