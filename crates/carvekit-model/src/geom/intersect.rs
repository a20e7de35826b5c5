//! Intersection engine for line/arc primitive pairs.
//!
//! All solves run on positioned (offset-applied) geometry and clamp results
//! to the finite segments/angular windows with the shared tolerance pair.
//! A geometric miss is an empty result, never an error.

use carvekit_core::Eps;
use smallvec::SmallVec;

use super::{Aabb, ArcPose, Line, Point2, Primitive};
use crate::offset::Offset;

/// Intersects two positioned primitives.
///
/// Returns up to two intersection points on both elements (tolerance-aware).
pub fn intersect(
    a: &Primitive,
    ao: &Offset,
    b: &Primitive,
    bo: &Offset,
    eps: &Eps,
) -> SmallVec<[Point2; 2]> {
    match (a, b) {
        (Primitive::Line(la), Primitive::Line(lb)) => line_line(la, ao, lb, bo, eps),
        (Primitive::Line(l), Primitive::Arc(arc)) => line_arc(l, ao, &arc.pose(bo), eps),
        (Primitive::Arc(arc), Primitive::Line(l)) => line_arc(l, bo, &arc.pose(ao), eps),
        (Primitive::Arc(aa), Primitive::Arc(ab)) => arc_arc(&aa.pose(ao), &ab.pose(bo), eps),
    }
}

/// Line/line intersection.
///
/// Touching segments are tested for shared endpoints first so continuity is
/// not misclassified as "parallel, none" by the determinant solve.
fn line_line(a: &Line, ao: &Offset, b: &Line, bo: &Offset, eps: &Eps) -> SmallVec<[Point2; 2]> {
    let mut out = SmallVec::new();
    let (a0, a1) = a.ends_with_offset(ao);
    let (b0, b1) = b.ends_with_offset(bo);

    for (p, q) in [(a1, b0), (a0, b0), (a1, b1), (a0, b1)] {
        if p.distance_to(&q) <= eps.distance {
            out.push(p);
            return out;
        }
    }

    let d1 = a1 - a0;
    let d2 = b1 - b0;
    let den = d1.cross(&d2);
    if den.abs() <= eps.distance * d1.norm().max(d2.norm()) {
        return out;
    }
    let t = (b0 - a0).cross(&d2) / den;
    let p = a0 + d1 * t;
    let box_a = Aabb::from_points(a0, a1);
    let box_b = Aabb::from_points(b0, b1);
    if box_a.contains(p, eps.distance) && box_b.contains(p, eps.distance) {
        out.push(p);
    }
    out
}

/// Line/arc intersection via the discriminant-based quadratic against the
/// arc's circle, clamped to the segment and the angular window.
fn line_arc(l: &Line, lo: &Offset, pose: &ArcPose, eps: &Eps) -> SmallVec<[Point2; 2]> {
    let mut out = SmallVec::new();
    let (p0, p1) = l.ends_with_offset(lo);
    let d = p1 - p0;
    let f = p0 - pose.center;
    let aa = d.dot(&d);
    if aa <= eps.distance * eps.distance {
        return out;
    }
    let bb = 2.0 * f.dot(&d);
    let cc = f.dot(&f) - pose.radius * pose.radius;
    // half2 is the squared half-chord length cut by the line.
    let half2 = (bb * bb - 4.0 * aa * cc) / (4.0 * aa);
    let band = eps.distance * (2.0 * pose.radius).max(eps.distance);
    if half2 < -band {
        return out;
    }

    let seg_box = Aabb::from_points(p0, p1);
    let base_t = -bb / (2.0 * aa);
    let ts: SmallVec<[f64; 2]> = if half2 <= band {
        // Near-zero discriminant: tangency, a single candidate.
        smallvec::smallvec![base_t]
    } else {
        let dt = half2.max(0.0).sqrt() / aa.sqrt();
        smallvec::smallvec![base_t - dt, base_t + dt]
    };

    for t in ts {
        let p = p0 + d * t;
        if !seg_box.contains(p, eps.distance) {
            continue;
        }
        let angle = (p - pose.center).angle_deg();
        if pose.in_window(angle, eps) {
            out.push(p);
        }
    }
    out
}

/// Arc/arc intersection via the classic two-circle construction (center
/// distance / chord height), clamped to both angular windows.
fn arc_arc(a: &ArcPose, b: &ArcPose, eps: &Eps) -> SmallVec<[Point2; 2]> {
    let mut out = SmallVec::new();
    let between = b.center - a.center;
    let d = between.norm();
    if d <= eps.distance {
        // Concentric circles never cross.
        return out;
    }
    if d > a.radius + b.radius + eps.distance || d < (a.radius - b.radius).abs() - eps.distance {
        return out;
    }
    let u = between * (1.0 / d);
    let along = (a.radius * a.radius - b.radius * b.radius + d * d) / (2.0 * d);
    let h2 = a.radius * a.radius - along * along;
    let foot = a.center + u * along;

    let candidates: SmallVec<[Point2; 2]> = if h2 <= eps.distance * (2.0 * a.radius) {
        // Tangent circles: one contact point.
        smallvec::smallvec![foot]
    } else {
        let h = h2.sqrt();
        let v = Point2::new(-u.y, u.x);
        smallvec::smallvec![foot + v * h, foot - v * h]
    };

    for p in candidates {
        let angle_a = (p - a.center).angle_deg();
        let angle_b = (p - b.center).angle_deg();
        if a.in_window(angle_a, eps) && b.in_window(angle_b, eps) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Arc;

    fn prim_line(x0: f64, y0: f64, x1: f64, y1: f64) -> Primitive {
        Primitive::Line(Line::new(Point2::new(x0, y0), Point2::new(x1, y1)))
    }

    #[test]
    fn test_perpendicular_lines_cross_once_at_midpoints() {
        let eps = Eps::default();
        let zero = Offset::zero();
        let a = prim_line(-0.5, 0.0, 0.5, 0.0);
        let b = prim_line(0.0, -0.5, 0.0, 0.5);
        let pts = intersect(&a, &zero, &b, &zero, &eps);
        assert_eq!(pts.len(), 1);
        assert!(pts[0].distance_to(&Point2::ZERO) < 1e-9);
    }

    #[test]
    fn test_shared_endpoint_is_continuity_not_parallel() {
        let eps = Eps::default();
        let zero = Offset::zero();
        // Collinear, sharing one endpoint: the determinant is zero but the
        // shared point must still be reported.
        let a = prim_line(0.0, 0.0, 1.0, 0.0);
        let b = prim_line(1.0, 0.0, 2.0, 0.0);
        let pts = intersect(&a, &zero, &b, &zero, &eps);
        assert_eq!(pts.len(), 1);
        assert!(pts[0].distance_to(&Point2::new(1.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_disjoint_parallel_lines_do_not_cross() {
        let eps = Eps::default();
        let zero = Offset::zero();
        let a = prim_line(0.0, 0.0, 1.0, 0.0);
        let b = prim_line(0.0, 1.0, 1.0, 1.0);
        assert!(intersect(&a, &zero, &b, &zero, &eps).is_empty());
    }

    #[test]
    fn test_line_misses_segment_despite_circle_hit() {
        let eps = Eps::default();
        let zero = Offset::zero();
        // The infinite line crosses the circle, but the finite segment stops
        // well short of it.
        let a = prim_line(-5.0, 0.0, -3.0, 0.0);
        let circle = Primitive::Arc(Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 360.0));
        assert!(intersect(&a, &zero, &circle, &zero, &eps).is_empty());
    }

    #[test]
    fn test_line_through_circle_hits_twice() {
        let eps = Eps::default();
        let zero = Offset::zero();
        let a = prim_line(-2.0, 0.0, 2.0, 0.0);
        let circle = Primitive::Arc(Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 360.0));
        let pts = intersect(&a, &zero, &circle, &zero, &eps);
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn test_tangent_line_hits_once() {
        let eps = Eps::default();
        let zero = Offset::zero();
        let a = prim_line(-2.0, 1.0, 2.0, 1.0);
        let circle = Primitive::Arc(Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 360.0));
        let pts = intersect(&a, &zero, &circle, &zero, &eps);
        assert_eq!(pts.len(), 1);
        assert!(pts[0].distance_to(&Point2::new(0.0, 1.0)) < 1e-6);
    }

    #[test]
    fn test_concentric_arcs_never_cross() {
        let eps = Eps::default();
        let zero = Offset::zero();
        let inner = Primitive::Arc(Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 360.0));
        let outer = Primitive::Arc(Arc::new(Point2::new(2.0, 0.0), 2.0, 0.0, 360.0));
        assert!(intersect(&inner, &zero, &outer, &zero, &eps).is_empty());
    }

    #[test]
    fn test_crossing_circles_hit_twice() {
        let eps = Eps::default();
        let zero = Offset::zero();
        let a = Primitive::Arc(Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 360.0));
        // Unit circle centered at (1, 0).
        let b = Primitive::Arc(Arc::new(Point2::new(2.0, 0.0), 1.0, 0.0, 360.0));
        let pts = intersect(&a, &zero, &b, &zero, &eps);
        assert_eq!(pts.len(), 2);
        for p in pts {
            assert!((p.x - 0.5).abs() < 1e-9);
            assert!((p.y.abs() - (0.75f64).sqrt()).abs() < 1e-9);
        }
    }
}
