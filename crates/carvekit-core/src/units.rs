//! Unit system selection.
//!
//! Handles the Metric (mm) / Imperial (inch) distinction the machine record
//! carries and the conversion between them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl MeasurementSystem {
    /// Converts a length in this system to millimeters.
    pub fn to_mm(&self, value: f64) -> f64 {
        match self {
            Self::Metric => value,
            Self::Imperial => value * MM_PER_INCH,
        }
    }

    /// Converts a length in millimeters to this system.
    pub fn from_mm(&self, value: f64) -> f64 {
        match self {
            Self::Metric => value,
            Self::Imperial => value / MM_PER_INCH,
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Feed rate units selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedRateUnits {
    /// Millimeters per minute
    #[default]
    MmPerMin,
    /// Inches per minute
    InPerMin,
}

impl fmt::Display for FeedRateUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MmPerMin => write!(f, "mm/min"),
            Self::InPerMin => write!(f, "in/min"),
        }
    }
}
