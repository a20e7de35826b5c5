//! Block payloads and flags.
//!
//! Every node in the tree carries a type-specific payload; the capability
//! dispatch in [`tree`] matches on the payload variant and reports a defined
//! "unsupported" result for capabilities a variant does not implement.

mod tree;

use carvekit_core::Tool;
use serde::{Deserialize, Serialize};

use crate::geom::{dir_deg, Arc, Line, Point2, Primitive};

pub use tree::{Arena, BlockId, BlockNode};

/// Lock/suppress flag set carried by every block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockFlags {
    /// Locked blocks refuse repositioning.
    pub locked: bool,
    /// Suppressed blocks are skipped by traversal and emission.
    pub suppressed: bool,
}

/// Which side of a contour the tool travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CutSide {
    /// Tool inside the contour.
    Inside,
    /// Tool outside the contour.
    #[default]
    Outside,
    /// Tool centered on the contour.
    Along,
}

/// A sketch: an ordered primitive container with milling options and an
/// extrusion child describing depth versus offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sketch {
    /// Lateral origin shift accumulated over the depth range.
    pub taper_offset: Point2,
    /// Fill the interior before cutting the contour.
    pub pocket: bool,
    /// Start milling with a pass at depth zero.
    pub zero_pass: bool,
    /// Distribute each pass's z-drop helically along the contour.
    pub helical: bool,
}

/// An extrusion: a child curve in (offset, depth) space plus stepping and
/// cut-side settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrusion {
    /// Depth step per pass.
    pub resolution: f64,
    /// Side of the contour the tool travels on.
    pub cut_side: CutSide,
}

impl Default for Extrusion {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            cut_side: CutSide::Outside,
        }
    }
}

/// Hole layout for a bolt-hole pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolePattern {
    /// Evenly spaced around a circle of the offset distance.
    Radial,
    /// A rows-by-columns grid spaced by the offset distance.
    Matrix { rows: u32, columns: u32 },
}

/// A parametric bolt-hole pattern. Owns its own offset record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltHoles {
    pub position: Point2,
    pub number: u32,
    pub hole_diameter: f64,
    /// Circle radius (radial) or grid spacing (matrix).
    pub offset_distance: f64,
    pub pattern: HolePattern,
}

impl BoltHoles {
    /// Hole centers in pattern-local coordinates.
    pub fn positions(&self) -> Vec<Point2> {
        match self.pattern {
            HolePattern::Radial => (0..self.number)
                .map(|i| {
                    let angle = 360.0 * f64::from(i) / f64::from(self.number.max(1));
                    self.position + dir_deg(angle) * self.offset_distance
                })
                .collect(),
            HolePattern::Matrix { rows, columns } => {
                let mut out = Vec::with_capacity((rows * columns) as usize);
                for r in 0..rows {
                    for c in 0..columns {
                        out.push(
                            self.position
                                + Point2::new(
                                    f64::from(c) * self.offset_distance,
                                    f64::from(r) * self.offset_distance,
                                ),
                        );
                    }
                }
                out
            }
        }
    }
}

/// A drilled-hole container; the holes are its Point children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrillHoles {
    pub hole_diameter: f64,
}

/// A reusable placed container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    pub position: Point2,
    pub rotation: f64,
}

/// A bare position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointBlock {
    pub position: Point2,
}

/// A depth-map image; carried as a defined variant, most capabilities are
/// unsupported.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Image {
    /// Physical size (width, height).
    pub size: (f64, f64),
    /// Grid resolution (columns, rows).
    pub resolution: (usize, usize),
    /// Row-major depth samples.
    pub depths: Vec<f64>,
}

/// The type-specific payload of a block node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockPayload {
    Begin,
    End,
    Line(Line),
    Arc(Arc),
    Point(PointBlock),
    Tool(Tool),
    Sketch(Sketch),
    Extrusion(Extrusion),
    BoltHoles(BoltHoles),
    DrillHoles(DrillHoles),
    Template(Template),
    Image(Image),
}

impl BlockPayload {
    /// Variant name for diagnostics and unsupported-capability reports.
    pub fn variant_name(&self) -> &'static str {
        match self {
            BlockPayload::Begin => "Begin",
            BlockPayload::End => "End",
            BlockPayload::Line(_) => "Line",
            BlockPayload::Arc(_) => "Arc",
            BlockPayload::Point(_) => "Point",
            BlockPayload::Tool(_) => "Tool",
            BlockPayload::Sketch(_) => "Sketch",
            BlockPayload::Extrusion(_) => "Extrusion",
            BlockPayload::BoltHoles(_) => "BoltHoles",
            BlockPayload::DrillHoles(_) => "DrillHoles",
            BlockPayload::Template(_) => "Template",
            BlockPayload::Image(_) => "Image",
        }
    }

    /// True for variants that own a child list.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockPayload::Sketch(_)
                | BlockPayload::Extrusion(_)
                | BlockPayload::DrillHoles(_)
                | BlockPayload::Template(_)
        )
    }

    /// True for variants that compute and own their own offset record
    /// instead of referencing the parent's.
    pub fn owns_offset(&self) -> bool {
        self.is_container() || matches!(self, BlockPayload::BoltHoles(_))
    }

    /// The primitive geometry, when this is a Line or Arc block.
    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            BlockPayload::Line(l) => Some(Primitive::Line(*l)),
            BlockPayload::Arc(a) => Some(Primitive::Arc(*a)),
            _ => None,
        }
    }

    /// Replaces the primitive geometry of a Line or Arc payload.
    pub fn set_primitive(&mut self, prim: Primitive) {
        match (self, prim) {
            (BlockPayload::Line(dst), Primitive::Line(src)) => *dst = src,
            (BlockPayload::Arc(dst), Primitive::Arc(src)) => *dst = src,
            _ => {}
        }
    }
}
