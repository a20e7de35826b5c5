//! # CarveKit CAM
//!
//! Toolpath synthesis on top of the block tree: the sketch assembly
//! pipeline (per-depth offset snapshots, corner trimming, transition
//! fillets, helical distribution), the scanline pocket rasterizer, drill
//! cycle emission, and the motion-emission sink interface.

pub mod contour;
pub mod drill;
pub mod emit;
pub mod pocket;
pub mod program;

pub use contour::{
    assemble_contour, depth_passes, emit_chain, mill_sketch, DepthProfile, Snapshot,
};
pub use drill::mill_holes;
pub use emit::{EmitContext, MotionSink, MotionToken, RecordingSink};
pub use pocket::{Pocket, PocketRow};
pub use program::{make_block, synthesize};
