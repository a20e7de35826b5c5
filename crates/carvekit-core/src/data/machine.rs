//! The project/material record.
//!
//! Supplies the unit system, the material envelope, the safe traverse
//! height, and the numeric precision the motion sink formats with. The
//! synthesis engine reads these fields; it never writes them.

use crate::units::MeasurementSystem;
use serde::{Deserialize, Serialize};

/// Machine and stock description for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Unit system for every coordinate in the job.
    pub units: MeasurementSystem,
    /// Material origin (lower-left corner of the stock).
    pub origin: (f64, f64),
    /// Material envelope as (width, height, thickness).
    pub envelope: (f64, f64, f64),
    /// Safe traverse height above the stock for rapid moves.
    pub traverse_z: f64,
    /// Decimal places the emission collaborator formats coordinates with.
    pub decimals: u8,
}

impl Default for Machine {
    fn default() -> Self {
        Self {
            units: MeasurementSystem::Metric,
            origin: (0.0, 0.0),
            envelope: (100.0, 100.0, 10.0),
            traverse_z: 5.0,
            decimals: 4,
        }
    }
}

impl Machine {
    /// The y-range of the material envelope, used by the pocket rasterizer.
    pub fn y_range(&self) -> (f64, f64) {
        (self.origin.1, self.origin.1 + self.envelope.1)
    }

    /// The x-range of the material envelope.
    pub fn x_range(&self) -> (f64, f64) {
        (self.origin.0, self.origin.0 + self.envelope.0)
    }
}
