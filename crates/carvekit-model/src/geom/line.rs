//! Line primitive geometry.

use carvekit_core::Eps;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Aabb, Point2};
use crate::offset::Offset;

/// A line segment between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub p0: Point2,
    pub p1: Point2,
}

impl Line {
    pub fn new(p0: Point2, p1: Point2) -> Self {
        Self { p0, p1 }
    }

    /// Raw (unpositioned) endpoints.
    pub fn ends(&self) -> (Point2, Point2) {
        (self.p0, self.p1)
    }

    /// Assigns new endpoints.
    pub fn set_ends(&mut self, p0: Point2, p1: Point2) {
        self.p0 = p0;
        self.p1 = p1;
    }

    /// Positioned, tool-compensated endpoints.
    ///
    /// Rotate and translate both endpoints, then displace along the unit
    /// right-hand normal by `side * (tool + eval)`. Undefined for zero-length
    /// input; callers prune degenerate segments first.
    pub fn ends_with_offset(&self, off: &Offset) -> (Point2, Point2) {
        let a = off.place(self.p0);
        let b = off.place(self.p1);
        let d = b - a;
        let n = d.perp_right().normalized().unwrap_or(Point2::ZERO);
        let shift = off.shift();
        (a + n * shift, b + n * shift)
    }

    /// Unit travel tangents at the two endpoints (identical for a line).
    pub fn tangents(&self, off: &Offset) -> (Point2, Point2) {
        let (a, b) = self.ends_with_offset(off);
        let t = (b - a).normalized().unwrap_or(Point2::ZERO);
        (t, t)
    }

    /// Unit right-hand travel normals at the two endpoints.
    pub fn normals(&self, off: &Offset) -> (Point2, Point2) {
        let (t0, t1) = self.tangents(off);
        (t0.perp_right(), t1.perp_right())
    }

    /// X positions where the positioned segment crosses the horizontal at
    /// `y`. A horizontal segment contributes no crossings.
    pub fn eval(&self, y: f64, off: &Offset, eps: &Eps) -> SmallVec<[f64; 2]> {
        let mut out = SmallVec::new();
        let (a, b) = self.ends_with_offset(off);
        let dy = b.y - a.y;
        if dy.abs() <= eps.distance {
            return out;
        }
        let t = (y - a.y) / dy;
        let tol = eps.distance / dy.abs();
        if t >= -tol && t <= 1.0 + tol {
            out.push(a.x + t * (b.x - a.x));
        }
        out
    }

    /// Positioned length.
    pub fn length(&self, off: &Offset) -> f64 {
        let (a, b) = self.ends_with_offset(off);
        a.distance_to(&b)
    }

    /// Positioned bounding box.
    pub fn aabb(&self, off: &Offset) -> Aabb {
        let (a, b) = self.ends_with_offset(off);
        Aabb::from_points(a, b)
    }

    /// Reverses the travel direction.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.p0, &mut self.p1);
    }

    /// True when the segment is too short to take part in contour math.
    pub fn is_null(&self, eps: &Eps) -> bool {
        self.p0.distance_to(&self.p1) <= eps.distance
    }

    pub fn translate(&mut self, d: Point2) {
        self.p0 = self.p0 + d;
        self.p1 = self.p1 + d;
    }

    pub fn rotate_about(&mut self, center: Point2, angle_deg: f64) {
        self.p0 = self.p0.rotated_about(center, angle_deg);
        self.p1 = self.p1.rotated_about(center, angle_deg);
    }

    pub fn scale(&mut self, factor: f64) {
        self.p0 = self.p0 * factor;
        self.p1 = self.p1 * factor;
    }
}
