//! # CarveKit Model
//!
//! The geometric and structural substrate of the toolpath-synthesis engine:
//!
//! - **Block tree**: an arena of typed nodes with intrusive-index sibling
//!   lists, an owned child list, and one special extruder slot per node.
//! - **Primitive geometry**: lines and arcs with offset-transformed
//!   evaluation, endpoint manipulation, and arc angle reconstruction.
//! - **Intersection engine**: line/line, line/arc, and arc/arc intersection
//!   with a shared tolerance pair.
//! - **Chains**: sub-chain detection, winding classification, and fragment
//!   reordering over unordered primitive lists.

pub mod block;
pub mod chain;
pub mod geom;
pub mod offset;

pub use block::{
    Arena, BlockFlags, BlockId, BlockNode, BlockPayload, BoltHoles, CutSide, DrillHoles,
    Extrusion, HolePattern, Image, PointBlock, Sketch, Template,
};
pub use chain::{reorder, subchains, winding, ChainLink, SubChain};
pub use geom::{
    arc_from_endpoints, intersect, Aabb, Arc, ArcPose, Line, Point2, Primitive,
};
pub use offset::{Offset, OffsetCell};
