//! The offset-transform record.
//!
//! An offset describes how raw primitive geometry is positioned and
//! tool-compensated for one pass: a rotation and 2D origin, a radial
//! displacement (tool radius plus the depth profile's evaluation at the
//! current z), the side the displacement acts on, and the z-range the owning
//! construct spans.
//!
//! Offsets are owned by whichever construct computed them (sketch, bolt-hole
//! pattern, or the project-wide zero record) and are referenced, never
//! implicitly copied, by child primitives. Snapshots allocate their own zero
//! record which drops with the snapshot.

use carvekit_core::types::{shared, Shared};
use serde::{Deserialize, Serialize};

use crate::geom::Point2;

/// Shared handle to an offset record.
pub type OffsetCell = Shared<Offset>;

/// Positioning and tool-compensation state applied to raw geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    /// Displacement side: -1 (left of travel), 0 (on the path), +1 (right).
    pub side: i8,
    /// Tool radius component of the radial displacement.
    pub tool: f64,
    /// Depth-profile evaluation component of the radial displacement.
    pub eval: f64,
    /// Rotation in degrees applied before translation.
    pub rotation: f64,
    /// Translation applied after rotation.
    pub origin: Point2,
    /// Top of the z-range the owning construct spans.
    pub z0: f64,
    /// Bottom of the z-range.
    pub z1: f64,
}

impl Default for Offset {
    fn default() -> Self {
        Self::zero()
    }
}

impl Offset {
    /// The identity offset: no rotation, no translation, no displacement.
    pub fn zero() -> Self {
        Self {
            side: 0,
            tool: 0.0,
            eval: 0.0,
            rotation: 0.0,
            origin: Point2::ZERO,
            z0: 0.0,
            z1: 0.0,
        }
    }

    /// Allocates a fresh shared zero record.
    pub fn zero_cell() -> OffsetCell {
        shared(Self::zero())
    }

    /// Total radial displacement magnitude before the side sign is applied.
    pub fn magnitude(&self) -> f64 {
        self.tool + self.eval
    }

    /// Signed displacement along the right-hand travel normal.
    pub fn shift(&self) -> f64 {
        f64::from(self.side) * self.magnitude()
    }

    /// Applies rotation and translation (no radial displacement) to a point.
    pub fn place(&self, p: Point2) -> Point2 {
        p.rotated_deg(self.rotation) + self.origin
    }
}
