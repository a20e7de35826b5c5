//! Top-level synthesis driver: walks the block tree and dispatches each
//! variant's `make` capability.

use carvekit_core::error::CamError;
use carvekit_core::types::ProgressCallback;
use carvekit_core::{Eps, Machine, Tool};
use carvekit_model::{Arena, BlockId, BlockPayload};
use tracing::debug;

use crate::contour::mill_sketch;
use crate::drill::mill_holes;
use crate::emit::{EmitContext, MotionSink};

fn reborrow<'a>(
    progress: &'a mut Option<ProgressCallback<'_>>,
) -> Option<ProgressCallback<'a>> {
    progress.as_mut().map(|cb| &mut **cb as &mut dyn FnMut(u64, u64))
}

/// Synthesizes the whole program: every top-level block in list order.
pub fn synthesize(
    arena: &Arena,
    machine: &Machine,
    sink: &mut dyn MotionSink,
    eps: &Eps,
    mut progress: Option<ProgressCallback<'_>>,
) -> Result<(), CamError> {
    let mut ctx = EmitContext::new(machine, Tool::new(0, "unassigned", 0.0), sink);
    for id in arena.children(None) {
        make_block(arena, id, &mut ctx, eps, reborrow(&mut progress))?;
    }
    Ok(())
}

/// Dispatches one block's `make` capability. Variants with no motion to
/// emit (primitives outside a sketch, points, images) are skipped.
pub fn make_block(
    arena: &Arena,
    id: BlockId,
    ctx: &mut EmitContext<'_>,
    eps: &Eps,
    mut progress: Option<ProgressCallback<'_>>,
) -> Result<(), CamError> {
    let Some(node) = arena.get(id) else {
        return Ok(());
    };
    if node.flags.suppressed {
        return Ok(());
    }
    match &node.payload {
        BlockPayload::Begin => {
            let machine = ctx.machine;
            ctx.sink().program_begin(machine);
        }
        BlockPayload::End => ctx.sink().program_end(),
        BlockPayload::Tool(t) => ctx.ensure_tool(t),
        BlockPayload::Sketch(_) => mill_sketch(arena, id, ctx, eps, reborrow(&mut progress))?,
        BlockPayload::DrillHoles(_) | BlockPayload::BoltHoles(_) => {
            mill_holes(arena, id, ctx, eps)?
        }
        BlockPayload::Template(t) => {
            // The template computed its children's placement; push it into
            // their offset records, then make each child.
            let (position, rotation) = (t.position, t.rotation);
            for child in arena.children(Some(id)) {
                if let Some(cnode) = arena.get(child) {
                    if matches!(
                        cnode.payload,
                        BlockPayload::Sketch(_) | BlockPayload::BoltHoles(_)
                    ) {
                        let mut off = cnode.offset.borrow_mut();
                        off.origin = position;
                        off.rotation = rotation;
                    }
                }
                make_block(arena, child, ctx, eps, reborrow(&mut progress))?;
            }
        }
        other => {
            debug!(variant = other.variant_name(), "Block has no make capability");
        }
    }
    Ok(())
}
