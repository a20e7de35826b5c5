//! The primitive union: a single line or arc geometry element.

use carvekit_core::Eps;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Aabb, Arc, Line, Point2};
use crate::offset::Offset;

/// A single contour element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Line(Line),
    Arc(Arc),
}

impl Primitive {
    /// Raw start point, ignoring travel direction conventions.
    pub fn alpha(&self) -> Point2 {
        match self {
            Primitive::Line(l) => l.p0,
            Primitive::Arc(a) => a.start,
        }
    }

    /// Raw end point derived from the geometry.
    pub fn omega(&self) -> Point2 {
        match self {
            Primitive::Line(l) => l.p1,
            Primitive::Arc(a) => a.end(),
        }
    }

    /// Raw endpoints.
    pub fn ends(&self) -> (Point2, Point2) {
        (self.alpha(), self.omega())
    }

    /// Assigns new endpoints. For arcs this re-derives start angle and sweep
    /// through angle reconstruction; returns false (geometry untouched) when
    /// no arc of the stored radius joins the new endpoints.
    pub fn set_ends(&mut self, p0: Point2, p1: Point2, eps: &Eps) -> bool {
        match self {
            Primitive::Line(l) => {
                l.set_ends(p0, p1);
                true
            }
            Primitive::Arc(a) => a.set_ends(p0, p1, eps),
        }
    }

    /// Positioned, tool-compensated endpoints.
    pub fn ends_with_offset(&self, off: &Offset) -> (Point2, Point2) {
        match self {
            Primitive::Line(l) => l.ends_with_offset(off),
            Primitive::Arc(a) => a.ends_with_offset(off),
        }
    }

    /// Unit travel tangents at the positioned endpoints.
    pub fn tangents(&self, off: &Offset) -> (Point2, Point2) {
        match self {
            Primitive::Line(l) => l.tangents(off),
            Primitive::Arc(a) => a.tangents(off),
        }
    }

    /// Unit right-hand travel normals at the positioned endpoints.
    pub fn normals(&self, off: &Offset) -> (Point2, Point2) {
        match self {
            Primitive::Line(l) => l.normals(off),
            Primitive::Arc(a) => a.normals(off),
        }
    }

    /// Scanline crossings of the positioned geometry at height `y`.
    pub fn eval(&self, y: f64, off: &Offset, eps: &Eps) -> SmallVec<[f64; 2]> {
        match self {
            Primitive::Line(l) => l.eval(y, off, eps),
            Primitive::Arc(a) => a.eval(y, off, eps),
        }
    }

    /// Positioned length.
    pub fn length(&self, off: &Offset) -> f64 {
        match self {
            Primitive::Line(l) => l.length(off),
            Primitive::Arc(a) => a.length(off),
        }
    }

    /// Positioned bounding box.
    pub fn aabb(&self, off: &Offset) -> Aabb {
        match self {
            Primitive::Line(l) => l.aabb(off),
            Primitive::Arc(a) => a.aabb(off),
        }
    }

    /// Reverses the travel direction in place.
    pub fn flip(&mut self) {
        match self {
            Primitive::Line(l) => l.flip(),
            Primitive::Arc(a) => a.flip(),
        }
    }

    /// True when the element is degenerate and must be pruned before
    /// contour math.
    pub fn is_null(&self, eps: &Eps) -> bool {
        match self {
            Primitive::Line(l) => l.is_null(eps),
            Primitive::Arc(a) => a.is_null(eps),
        }
    }

    pub fn translate(&mut self, d: Point2) {
        match self {
            Primitive::Line(l) => l.translate(d),
            Primitive::Arc(a) => a.translate(d),
        }
    }

    pub fn rotate_about(&mut self, center: Point2, angle_deg: f64) {
        match self {
            Primitive::Line(l) => l.rotate_about(center, angle_deg),
            Primitive::Arc(a) => a.rotate_about(center, angle_deg),
        }
    }

    pub fn scale(&mut self, factor: f64) {
        match self {
            Primitive::Line(l) => l.scale(factor),
            Primitive::Arc(a) => a.scale(factor),
        }
    }

    /// Bakes the positioned, tool-compensated geometry into a new primitive
    /// whose raw coordinates equal the offset-applied ones.
    pub fn baked(&self, off: &Offset) -> Primitive {
        match self {
            Primitive::Line(l) => {
                let (a, b) = l.ends_with_offset(off);
                Primitive::Line(Line::new(a, b))
            }
            Primitive::Arc(a) => {
                let pose = a.pose(off);
                Primitive::Arc(Arc::new(
                    pose.p0,
                    pose.radius,
                    pose.start_angle,
                    pose.sweep,
                ))
            }
        }
    }
}
