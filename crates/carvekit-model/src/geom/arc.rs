//! Arc primitive geometry.
//!
//! Arcs store a start point, radius, start angle, and a signed sweep no
//! larger than a full turn. Positive sweep is counter-clockwise. The center
//! is derived, never stored, so endpoint edits go through the angle
//! reconstruction below.

use carvekit_core::Eps;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{dir_deg, normalize_deg, Aabb, Point2};
use crate::offset::Offset;

/// An arc: start point, radius, start angle, signed sweep (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub start: Point2,
    pub radius: f64,
    /// Angle of the start point as seen from the center, degrees.
    pub start_angle: f64,
    /// Signed sweep in degrees; |sweep| <= 360, positive = counter-clockwise.
    pub sweep: f64,
}

/// An arc's positioned, tool-compensated geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPose {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
    pub p0: Point2,
    pub p1: Point2,
}

impl ArcPose {
    /// End angle in degrees (start + sweep, not normalized).
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    /// True when `angle_deg` lies inside the swept angular window, with the
    /// angular tolerance applied at both ends.
    pub fn in_window(&self, angle_deg: f64, eps: &Eps) -> bool {
        let d = if self.sweep >= 0.0 {
            normalize_deg(angle_deg - self.start_angle)
        } else {
            normalize_deg(self.start_angle - angle_deg)
        };
        d <= self.sweep.abs() + eps.angle || d >= 360.0 - eps.angle
    }
}

impl Arc {
    pub fn new(start: Point2, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self {
            start,
            radius,
            start_angle,
            sweep,
        }
    }

    /// Raw center recovered from (start point, start angle, radius).
    pub fn center(&self) -> Point2 {
        self.start - dir_deg(self.start_angle) * self.radius
    }

    /// Raw end angle (start + sweep, not normalized).
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    /// Raw end point.
    pub fn end(&self) -> Point2 {
        self.center() + dir_deg(self.end_angle()) * self.radius
    }

    /// Raw (unpositioned) endpoints.
    pub fn ends(&self) -> (Point2, Point2) {
        (self.start, self.end())
    }

    /// Positioned, tool-compensated geometry.
    ///
    /// The center and start angle are rotated/translated; the displacement
    /// sign is `side * signum(sweep)` so a right-side offset grows a
    /// counter-clockwise arc and shrinks a clockwise one. The new radius is
    /// clamped at zero, and both endpoints are recomputed from the new
    /// center/radius/angles.
    pub fn pose(&self, off: &Offset) -> ArcPose {
        let center = off.place(self.center());
        let start_angle = self.start_angle + off.rotation;
        let sign = f64::from(off.side) * self.sweep.signum();
        let radius = (self.radius + sign * off.magnitude()).max(0.0);
        let p0 = center + dir_deg(start_angle) * radius;
        let p1 = center + dir_deg(start_angle + self.sweep) * radius;
        ArcPose {
            center,
            radius,
            start_angle,
            sweep: self.sweep,
            p0,
            p1,
        }
    }

    /// Positioned endpoints.
    pub fn ends_with_offset(&self, off: &Offset) -> (Point2, Point2) {
        let pose = self.pose(off);
        (pose.p0, pose.p1)
    }

    /// Assigns new endpoints, re-deriving start angle and sweep through the
    /// two-circle reconstruction while keeping the radius and the original
    /// large-arc/direction character. Returns false (leaving the arc
    /// untouched) when no arc with this radius joins the new endpoints.
    pub fn set_ends(&mut self, p0: Point2, p1: Point2, eps: &Eps) -> bool {
        let large = self.sweep.abs() > 180.0;
        let cw = self.sweep < 0.0;
        match arc_from_endpoints(p0, p1, self.radius, large, cw, eps) {
            Some(arc) => {
                *self = arc;
                true
            }
            None => false,
        }
    }

    /// Unit travel tangents at the two endpoints of the positioned arc.
    pub fn tangents(&self, off: &Offset) -> (Point2, Point2) {
        let pose = self.pose(off);
        let turn = if pose.sweep >= 0.0 { 90.0 } else { -90.0 };
        (
            dir_deg(pose.start_angle + turn),
            dir_deg(pose.end_angle() + turn),
        )
    }

    /// Unit right-hand travel normals at the two endpoints.
    pub fn normals(&self, off: &Offset) -> (Point2, Point2) {
        let (t0, t1) = self.tangents(off);
        (t0.perp_right(), t1.perp_right())
    }

    /// X positions where the positioned arc crosses the horizontal at `y`.
    ///
    /// A tangency (the scanline grazing the circle) contributes at most one
    /// crossing, and only when the grazing point is an actual arc endpoint; a
    /// pure interior tangency is not a boundary crossing.
    pub fn eval(&self, y: f64, off: &Offset, eps: &Eps) -> SmallVec<[f64; 2]> {
        let mut out = SmallVec::new();
        let pose = self.pose(off);
        if pose.radius <= eps.distance {
            return out;
        }
        let dy = y - pose.center.y;
        if dy.abs() > pose.radius + eps.distance {
            return out;
        }
        if pose.radius - dy.abs() <= eps.distance {
            // Tangency: the two candidate angles collapse into one.
            let angle = if dy >= 0.0 { 90.0 } else { 270.0 };
            let at_endpoint = eps.same_angle(angle, pose.start_angle)
                || eps.same_angle(angle, pose.end_angle());
            if at_endpoint && pose.in_window(angle, eps) {
                out.push(pose.center.x);
            }
            return out;
        }
        let dx = (pose.radius * pose.radius - dy * dy).sqrt();
        for x in [pose.center.x + dx, pose.center.x - dx] {
            let angle = (Point2::new(x, y) - pose.center).angle_deg();
            if pose.in_window(angle, eps) {
                out.push(x);
            }
        }
        out
    }

    /// Positioned arc length.
    pub fn length(&self, off: &Offset) -> f64 {
        let pose = self.pose(off);
        pose.radius * pose.sweep.abs().to_radians()
    }

    /// Positioned bounding box: both endpoints plus every axis-extreme
    /// quadrant angle inside the angular window.
    pub fn aabb(&self, off: &Offset) -> Aabb {
        let pose = self.pose(off);
        let mut bb = Aabb::from_points(pose.p0, pose.p1);
        let eps = Eps::default();
        for quadrant in [0.0, 90.0, 180.0, 270.0] {
            if pose.in_window(quadrant, &eps) {
                bb.expand(pose.center + dir_deg(quadrant) * pose.radius);
            }
        }
        bb
    }

    /// Reverses the travel direction: the end becomes the start.
    pub fn flip(&mut self) {
        let end = self.end();
        self.start_angle = normalize_deg(self.end_angle());
        self.sweep = -self.sweep;
        self.start = end;
    }

    /// True when the arc is too small to take part in contour math.
    pub fn is_null(&self, eps: &Eps) -> bool {
        self.radius <= eps.distance || self.sweep.abs() <= eps.angle
    }

    pub fn translate(&mut self, d: Point2) {
        self.start = self.start + d;
    }

    pub fn rotate_about(&mut self, center: Point2, angle_deg: f64) {
        self.start = self.start.rotated_about(center, angle_deg);
        self.start_angle += angle_deg;
    }

    pub fn scale(&mut self, factor: f64) {
        self.start = self.start * factor;
        self.radius *= factor;
    }
}

/// Reconstructs an arc from two endpoints, a radius, a large-arc flag, and a
/// direction flag (the "radius-to-sweep" solve).
///
/// The center lies on the chord bisector at the two-circle intersection
/// height; of the two candidates, the one whose sweep in the requested
/// direction matches the large-arc flag wins. Returns `None` when the
/// endpoints coincide, the radius is degenerate, or the chord is longer than
/// the diameter.
pub fn arc_from_endpoints(
    p0: Point2,
    p1: Point2,
    radius: f64,
    large: bool,
    cw: bool,
    eps: &Eps,
) -> Option<Arc> {
    let chord = p1 - p0;
    let d = chord.norm();
    if d <= eps.distance || radius <= eps.distance || d > 2.0 * radius + eps.distance {
        return None;
    }
    let mid = p0 + chord * 0.5;
    let h = (radius * radius - (d / 2.0) * (d / 2.0)).max(0.0).sqrt();
    let u = chord * (1.0 / d);
    let v = Point2::new(-u.y, u.x);

    let mut half_circle: Option<Arc> = None;
    for center in [mid + v * h, mid - v * h] {
        let a0 = (p0 - center).angle_deg();
        let a1 = (p1 - center).angle_deg();
        let sweep = if cw {
            -normalize_deg(a0 - a1)
        } else {
            normalize_deg(a1 - a0)
        };
        let arc = Arc::new(p0, radius, a0, sweep);
        if (sweep.abs() - 180.0).abs() <= eps.angle {
            // Chord equals the diameter: both candidates coincide and either
            // flag is satisfiable.
            half_circle.get_or_insert(arc);
        } else if large == (sweep.abs() > 180.0) {
            return Some(arc);
        }
    }
    half_circle
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_center_recovery() {
        // Start at angle 0 on a unit circle centered at the origin.
        let arc = Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 90.0);
        assert!(arc.center().distance_to(&Point2::ZERO) < EPS);
        assert!(arc.end().distance_to(&Point2::new(0.0, 1.0)) < EPS);
    }

    #[test]
    fn test_offset_grows_ccw_arc_on_right_side() {
        let arc = Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 90.0);
        let off = Offset {
            side: 1,
            tool: 0.25,
            ..Offset::zero()
        };
        let pose = arc.pose(&off);
        assert!((pose.radius - 1.25).abs() < EPS);
        // Clockwise arc shrinks instead.
        let cw = Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, -90.0);
        assert!((cw.pose(&off).radius - 0.75).abs() < EPS);
    }

    #[test]
    fn test_radius_clamped_at_zero() {
        let cw = Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, -90.0);
        let off = Offset {
            side: 1,
            tool: 5.0,
            ..Offset::zero()
        };
        assert_eq!(cw.pose(&off).radius, 0.0);
    }

    #[test]
    fn test_flip_swaps_ends() {
        let mut arc = Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 90.0);
        let (a, b) = arc.ends();
        arc.flip();
        let (fa, fb) = arc.ends();
        assert!(fa.distance_to(&b) < EPS);
        assert!(fb.distance_to(&a) < EPS);
        assert!((arc.sweep + 90.0).abs() < EPS);
    }

    #[test]
    fn test_eval_two_crossings() {
        let eps = Eps::default();
        // Full upper semicircle of the unit circle, CCW from (1,0) to (-1,0).
        let arc = Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 180.0);
        let xs = arc.eval(0.5, &Offset::zero(), &eps);
        assert_eq!(xs.len(), 2);
        let expect = (1.0f64 - 0.25).sqrt();
        assert!(xs.iter().any(|x| (x - expect).abs() < 1e-9));
        assert!(xs.iter().any(|x| (x + expect).abs() < 1e-9));
    }

    #[test]
    fn test_eval_interior_tangency_is_not_a_crossing() {
        let eps = Eps::default();
        // The scanline grazes the top of the arc mid-span.
        let arc = Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 180.0);
        assert!(arc.eval(1.0, &Offset::zero(), &eps).is_empty());
    }

    #[test]
    fn test_eval_endpoint_tangency_is_a_crossing() {
        let eps = Eps::default();
        // Quarter arc ending exactly at the top of the circle.
        let arc = Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 90.0);
        let xs = arc.eval(1.0, &Offset::zero(), &eps);
        assert_eq!(xs.len(), 1);
        assert!(xs[0].abs() < 1e-9);
    }

    #[test]
    fn test_reconstruction_small_ccw() {
        let eps = Eps::default();
        let arc = arc_from_endpoints(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            1.0,
            false,
            false,
            &eps,
        )
        .unwrap();
        assert!(arc.sweep > 0.0 && arc.sweep < 180.0);
        let (a, b) = arc.ends();
        assert!(a.distance_to(&Point2::ZERO) < 1e-9);
        assert!(b.distance_to(&Point2::new(1.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_reconstruction_rejects_long_chord() {
        let eps = Eps::default();
        assert!(arc_from_endpoints(
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            1.0,
            false,
            false,
            &eps,
        )
        .is_none());
    }

    #[test]
    fn test_reconstruction_rejects_coincident_ends() {
        let eps = Eps::default();
        assert!(
            arc_from_endpoints(Point2::ZERO, Point2::ZERO, 1.0, false, false, &eps).is_none()
        );
    }
}
