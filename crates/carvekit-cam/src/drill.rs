//! Drill-cycle emission for hole blocks.
//!
//! DrillHoles blocks drill at their Point children; BoltHoles blocks drill
//! the positions of their parametric pattern. Both use the block's offset
//! record for placement and z-range, and the current tool's plunge feed.

use carvekit_core::error::CamError;
use carvekit_model::{Arena, BlockId, BlockPayload, Point2};
use tracing::{debug, warn};

use crate::emit::EmitContext;

/// Emits drill cycles for a DrillHoles or BoltHoles block.
pub fn mill_holes(
    arena: &Arena,
    id: BlockId,
    ctx: &mut EmitContext<'_>,
    _eps: &carvekit_core::Eps,
) -> Result<(), CamError> {
    let node = arena.get(id).ok_or_else(|| CamError::EmptyGeometry {
        reason: "stale hole block id".into(),
    })?;
    let tool = arena.find_tool(id).ok_or(CamError::ToolNotFound)?;
    ctx.ensure_tool(&tool);
    let off = node.offset.borrow().clone();

    let (positions, hole_diameter): (Vec<Point2>, f64) = match &node.payload {
        BlockPayload::DrillHoles(d) => {
            let mut pts = Vec::new();
            for child in arena.children(Some(id)) {
                let Some(cnode) = arena.get(child) else { continue };
                if cnode.flags.suppressed {
                    continue;
                }
                if let BlockPayload::Point(p) = &cnode.payload {
                    pts.push(off.place(p.position));
                }
            }
            (pts, d.hole_diameter)
        }
        BlockPayload::BoltHoles(b) => (
            b.positions().into_iter().map(|p| off.place(p)).collect(),
            b.hole_diameter,
        ),
        other => {
            return Err(CamError::EmptyGeometry {
                reason: format!("expected a hole block, got {}", other.variant_name()),
            })
        }
    };

    if positions.is_empty() {
        debug!("Hole block has no positions, nothing to drill");
        return Ok(());
    }
    if tool.diameter > hole_diameter {
        warn!(
            tool = tool.diameter,
            hole = hole_diameter,
            "Tool is larger than the hole diameter"
        );
    }

    let z_end = off.z1;
    for p in positions {
        ctx.retract();
        ctx.rapid_to(p);
        ctx.drill_at(p, z_end);
    }
    Ok(())
}
