use carvekit_cam::{synthesize, MotionToken, RecordingSink};
use carvekit_core::{Eps, Machine, Tool};
use carvekit_model::{
    Arena, BlockPayload, BoltHoles, DrillHoles, HolePattern, Point2, PointBlock,
};

#[test]
fn bolt_holes_radial_pattern_drills_each_hole() {
    let eps = Eps::default();
    let mut arena = Arena::new();
    let tool = arena.create(BlockPayload::Tool(Tool::new(2, "drill", 3.0)));
    arena.append_tail(None, tool);
    let bolts = arena.create(BlockPayload::BoltHoles(BoltHoles {
        position: Point2::new(50.0, 50.0),
        number: 6,
        hole_diameter: 5.0,
        offset_distance: 20.0,
        pattern: HolePattern::Radial,
    }));
    arena.append_tail(None, bolts);
    arena.get(bolts).unwrap().offset.borrow_mut().z1 = -4.0;

    let machine = Machine::default();
    let mut sink = RecordingSink::new();
    synthesize(&arena, &machine, &mut sink, &eps, None).unwrap();

    let drills: Vec<(Point2, f64)> = sink
        .tokens
        .iter()
        .filter_map(|t| match t {
            MotionToken::Drill { position, z, .. } => Some((*position, *z)),
            _ => None,
        })
        .collect();
    assert_eq!(drills.len(), 6);
    for (p, z) in &drills {
        assert!((p.distance_to(&Point2::new(50.0, 50.0)) - 20.0).abs() < 1e-9);
        assert!((z + 4.0).abs() < 1e-9);
    }
}

#[test]
fn drill_holes_use_point_children() {
    let eps = Eps::default();
    let mut arena = Arena::new();
    let tool = arena.create(BlockPayload::Tool(Tool::new(2, "drill", 1.0)));
    arena.append_tail(None, tool);
    let holes = arena.create(BlockPayload::DrillHoles(DrillHoles { hole_diameter: 2.0 }));
    arena.append_tail(None, holes);
    arena.get(holes).unwrap().offset.borrow_mut().z1 = -2.0;
    for (x, y) in [(1.0, 1.0), (9.0, 1.0), (5.0, 8.0)] {
        let p = arena.create(BlockPayload::Point(PointBlock {
            position: Point2::new(x, y),
        }));
        arena.append_tail(Some(holes), p);
    }

    let machine = Machine::default();
    let mut sink = RecordingSink::new();
    synthesize(&arena, &machine, &mut sink, &eps, None).unwrap();

    assert_eq!(
        sink.count(|t| matches!(t, MotionToken::Drill { z, .. } if (z + 2.0).abs() < 1e-9)),
        3
    );
    assert_eq!(sink.count(|t| matches!(t, MotionToken::ToolChange(2))), 1);
}
