//! # CarveKit Core
//!
//! Core types and records shared by the CarveKit toolpath-synthesis engine:
//! units, the global tolerance pair, error types, callback aliases, and the
//! tool-table and machine records the geometry layers read.

pub mod data;
pub mod error;
pub mod tolerance;
pub mod types;
pub mod units;

pub use data::{CoolantMode, Machine, Tool, ToolLibrary};
pub use error::{BlockError, CamError, Error, Result};
pub use tolerance::Eps;
pub use types::{shared, ProgressCallback, Shared};
pub use units::{FeedRateUnits, MeasurementSystem};
