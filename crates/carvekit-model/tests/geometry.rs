use carvekit_core::Eps;
use carvekit_model::{arc_from_endpoints, Arc, Line, Offset, Point2, Primitive};
use proptest::prelude::*;

#[test]
fn zero_offset_line_round_trip() {
    let line = Line::new(Point2::new(-3.5, 2.0), Point2::new(7.25, -1.0));
    let (a, b) = line.ends_with_offset(&Offset::zero());
    assert!(a.distance_to(&line.p0) < 1e-12);
    assert!(b.distance_to(&line.p1) < 1e-12);
}

#[test]
fn offset_square_side_grows_outward() {
    // Each edge of a CCW unit square offset to the right (outside) moves
    // away from the square's interior by the displacement magnitude.
    let off = Offset {
        side: 1,
        tool: 0.1,
        ..Offset::zero()
    };
    let bottom = Line::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
    let (a, b) = bottom.ends_with_offset(&off);
    assert!((a.y + 0.1).abs() < 1e-12);
    assert!((b.y + 0.1).abs() < 1e-12);
}

#[test]
fn rotation_and_origin_compose() {
    let off = Offset {
        rotation: 90.0,
        origin: Point2::new(10.0, 0.0),
        ..Offset::zero()
    };
    let line = Line::new(Point2::new(1.0, 0.0), Point2::new(2.0, 0.0));
    let (a, b) = line.ends_with_offset(&off);
    assert!(a.distance_to(&Point2::new(10.0, 1.0)) < 1e-9);
    assert!(b.distance_to(&Point2::new(10.0, 2.0)) < 1e-9);
}

#[test]
fn arc_set_ends_keeps_radius_and_direction() {
    let eps = Eps::default();
    let mut arc = Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 90.0);
    let moved_start = Point2::new(1.0, -0.2);
    let (_, end) = arc.ends();
    assert!(arc.set_ends(moved_start, end, &eps));
    let (a, b) = arc.ends();
    assert!(a.distance_to(&moved_start) < 1e-9);
    assert!(b.distance_to(&end) < 1e-9);
    assert!((arc.radius - 1.0).abs() < 1e-12);
    assert!(arc.sweep > 0.0);
}

#[test]
fn primitive_json_round_trip() {
    let prim = Primitive::Arc(Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 90.0));
    let json = serde_json::to_string(&prim).unwrap();
    let back: Primitive = serde_json::from_str(&json).unwrap();
    assert_eq!(prim, back);
}

#[test]
fn primitive_flip_reverses_travel() {
    let eps = Eps::default();
    let mut prim = Primitive::Arc(Arc::new(Point2::new(1.0, 0.0), 1.0, 0.0, 90.0));
    let (a, o) = prim.ends();
    prim.flip();
    assert!(prim.alpha().distance_to(&o) < 1e-9);
    assert!(prim.omega().distance_to(&a) < 1e-9);
    assert!(!prim.is_null(&eps));
}

proptest! {
    /// Building an arc from (p0, p1, radius, large, cw) and reading its own
    /// endpoints reproduces p0 and p1, for any chord no longer than the
    /// diameter.
    #[test]
    fn arc_reconstruction_left_inverse(
        x0 in -10.0f64..10.0,
        y0 in -10.0f64..10.0,
        dx in -5.0f64..5.0,
        dy in -5.0f64..5.0,
        radius_scale in 0.5f64..4.0,
        large in any::<bool>(),
        cw in any::<bool>(),
    ) {
        let eps = Eps::default();
        let p0 = Point2::new(x0, y0);
        let p1 = Point2::new(x0 + dx, y0 + dy);
        let chord = p0.distance_to(&p1);
        prop_assume!(chord > 1e-3);
        let radius = chord * radius_scale.max(0.5);

        let arc = arc_from_endpoints(p0, p1, radius, large, cw, &eps).unwrap();
        let (a, b) = arc.ends();
        prop_assert!(a.distance_to(&p0) < 1e-6);
        prop_assert!(b.distance_to(&p1) < 1e-6);
        prop_assert!((arc.radius - radius).abs() < 1e-9);
        prop_assert_eq!(arc.sweep < 0.0, cw);
        if (arc.sweep.abs() - 180.0).abs() > 1e-6 {
            prop_assert_eq!(arc.sweep.abs() > 180.0, large);
        }
    }
}
