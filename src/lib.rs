//! # CarveKit
//!
//! A CAM toolpath-synthesis engine. Given 2D contours (lines and arcs)
//! organized in a hierarchical block tree plus per-depth profile
//! information, CarveKit computes tool-radius- and taper-compensated offset
//! curves, repairs their topology at corners, rasterizes pocket fills, and
//! hands the result to a motion-emission sink.
//!
//! ## Architecture
//!
//! CarveKit is organized as a workspace with multiple crates:
//!
//! 1. **carvekit-core** - Units, tolerances, errors, tool and machine records
//! 2. **carvekit-model** - Block tree, primitive geometry, offset transforms,
//!    intersection engine, chain logic
//! 3. **carvekit-cam** - Sketch assembly pipeline, pocket rasterizer, drill
//!    cycles, motion emission
//! 4. **carvekit** - Facade crate re-exporting the public surface
//!
//! ## Usage
//!
//! ```rust
//! use carvekit::{
//!     synthesize, Arena, BlockPayload, CutSide, Eps, Extrusion, Line, Machine, Point2,
//!     RecordingSink, Sketch, Tool,
//! };
//!
//! let mut arena = Arena::new();
//! let tool = arena.create(BlockPayload::Tool(Tool::new(1, "end mill", 0.25)));
//! arena.append_tail(None, tool);
//!
//! let sketch = arena.create(BlockPayload::Sketch(Sketch::default()));
//! arena.append_tail(None, sketch);
//! let pts = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! for i in 0..4 {
//!     let edge = arena.create(BlockPayload::Line(Line::new(pts[i], pts[(i + 1) % 4])));
//!     arena.append_tail(Some(sketch), edge);
//! }
//! let ext = arena.create(BlockPayload::Extrusion(Extrusion {
//!     resolution: 1.0,
//!     cut_side: CutSide::Outside,
//! }));
//! let profile = arena.create(BlockPayload::Line(Line::new(
//!     Point2::new(0.0, 0.0),
//!     Point2::new(0.0, -1.0),
//! )));
//! arena.append_tail(Some(ext), profile);
//! arena.set_extruder(sketch, ext);
//!
//! let mut sink = RecordingSink::new();
//! synthesize(&arena, &Machine::default(), &mut sink, &Eps::default(), None).unwrap();
//! assert!(!sink.tokens.is_empty());
//! ```

pub use carvekit_cam as cam;
pub use carvekit_model as model;

pub use carvekit_cam::{
    assemble_contour, depth_passes, emit_chain, make_block, mill_holes, mill_sketch, synthesize,
    DepthProfile, EmitContext, MotionSink, MotionToken, Pocket, PocketRow, RecordingSink,
    Snapshot,
};
pub use carvekit_core::{
    BlockError, CamError, CoolantMode, Eps, Error, Machine, MeasurementSystem, Result, Tool,
    ToolLibrary,
};
pub use carvekit_model::{
    arc_from_endpoints, intersect, reorder, subchains, winding, Aabb, Arc, Arena, BlockFlags,
    BlockId, BlockNode, BlockPayload, BoltHoles, ChainLink, CutSide, DrillHoles, Extrusion,
    HolePattern, Image, Line, Offset, OffsetCell, Point2, PointBlock, Primitive, Sketch,
    SubChain, Template,
};
