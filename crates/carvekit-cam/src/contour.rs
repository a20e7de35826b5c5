//! The sketch assembly pipeline.
//!
//! Per required depth pass: detect sub-chains, classify winding, bake the
//! pass's offset transform into an independent snapshot, trim overlap
//! pinches at concave corners, synthesize transition fillets at convex
//! corners, rasterize pockets where requested, and hand the final geometry
//! to the motion-emission sink.

use carvekit_core::error::CamError;
use carvekit_core::types::ProgressCallback;
use carvekit_core::Eps;
use carvekit_model::chain::{self, chain_length, reorder, subchains, winding, ChainLink};
use carvekit_model::geom::{dir_deg, intersect, normalize_deg};
use carvekit_model::{
    Arc, Arena, BlockId, BlockPayload, CutSide, Extrusion, Line, Offset, Primitive,
};
use carvekit_model::offset::OffsetCell;
use carvekit_model::Aabb;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::emit::EmitContext;
use crate::pocket::Pocket;

/// A transient, independently owned clone of one sub-chain with the pass
/// offset baked into its geometry.
///
/// The snapshot keeps each primitive's origin identity for reverse lookup
/// but not its ownership relation; it owns its own zero offset record, which
/// drops with the snapshot.
pub struct Snapshot {
    pub links: Vec<ChainLink>,
    pub closed: bool,
    offset: OffsetCell,
}

impl Snapshot {
    /// Clones a sub-chain and bakes the offset transform into every
    /// primitive's geometry, detaching the result onto a fresh zero record.
    pub fn bake(links: &[ChainLink], off: &Offset, closed: bool) -> Self {
        Self {
            links: links
                .iter()
                .map(|l| ChainLink::new(l.origin, l.prim.baked(off)))
                .collect(),
            closed,
            offset: Offset::zero_cell(),
        }
    }

    /// The snapshot's own zero offset record.
    pub fn offset(&self) -> &OffsetCell {
        &self.offset
    }
}

/// Repairs overlap pinches: for each adjacent pair, if an intersection point
/// exists that is not already the pair's shared endpoint, retarget each
/// primitive's near endpoint to the closer intersection point (tie-break:
/// nearer the first primitive's pre-existing endpoint).
pub(crate) fn trim_corners(snap: &mut Snapshot, eps: &Eps) {
    let n = snap.links.len();
    if n < 2 {
        return;
    }
    let zero = Offset::zero();
    let pairs = if snap.closed { n } else { n - 1 };
    for i in 0..pairs {
        let j = (i + 1) % n;
        let pa = snap.links[i].prim;
        let pb = snap.links[j].prim;
        let pts = intersect(&pa, &zero, &pb, &zero, eps);
        if pts.is_empty() {
            continue;
        }
        let end_a = pa.omega();
        let start_b = pb.alpha();
        let shared = end_a.distance_to(&start_b) <= eps.distance;
        let best = pts
            .into_iter()
            .filter(|p| !(shared && p.distance_to(&end_a) <= eps.distance))
            .min_by(|p, q| {
                p.distance_to(&end_a)
                    .partial_cmp(&q.distance_to(&end_a))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        let Some(best) = best else { continue };
        if best.distance_to(&end_a) <= eps.distance && best.distance_to(&start_b) <= eps.distance
        {
            continue;
        }
        let mut na = pa;
        let mut nb = pb;
        if na.set_ends(na.alpha(), best, eps) && nb.set_ends(best, nb.omega(), eps) {
            snap.links[i].prim = na;
            snap.links[j].prim = nb;
        } else {
            // No arc joins the trimmed endpoints; the gap is left for the
            // transition step.
            debug!("Corner trim has no solution, leaving gap");
        }
    }
}

/// Builds the C1-continuous fillet between two primitives whose endpoints
/// have separated: its center is the intersection of the two end normals,
/// its radius the (equal, tolerance-checked) distance from the center to
/// each endpoint. `None` when the normals are parallel or the radii
/// disagree; the caller falls back to a straight connector.
fn fillet_between(a: &Primitive, b: &Primitive, eps: &Eps) -> Option<Arc> {
    let zero = Offset::zero();
    let e1 = a.omega();
    let s2 = b.alpha();
    let (_, n1) = a.normals(&zero);
    let (n2, _) = b.normals(&zero);
    let den = n1.cross(&n2);
    if den.abs() <= eps.angle.to_radians() {
        return None;
    }
    let t1 = (s2 - e1).cross(&n2) / den;
    let center = e1 + n1 * t1;
    let r1 = center.distance_to(&e1);
    let r2 = center.distance_to(&s2);
    if (r1 - r2).abs() > eps.distance {
        return None;
    }
    let radius = 0.5 * (r1 + r2);
    if radius <= eps.distance {
        return None;
    }
    let a1 = (e1 - center).angle_deg();
    let a2 = (s2 - center).angle_deg();
    // The fillet must leave e1 tangent to the incoming travel direction.
    let (_, exit) = a.tangents(&zero);
    let ccw = dir_deg(a1 + 90.0).dot(&exit) >= 0.0;
    let sweep = if ccw {
        normalize_deg(a2 - a1)
    } else {
        -normalize_deg(a1 - a2)
    };
    if sweep.abs() <= eps.angle {
        return None;
    }
    Some(Arc::new(e1, radius, a1, sweep))
}

/// Inserts transition elements wherever adjacent endpoints no longer
/// coincide after offsetting: a fillet arc where the end normals intersect,
/// a straight connector where they are parallel.
pub(crate) fn insert_transitions(snap: &mut Snapshot, eps: &Eps) {
    let n = snap.links.len();
    if n < 2 {
        return;
    }
    let pairs = if snap.closed { n } else { n - 1 };
    let mut out: Vec<ChainLink> = Vec::with_capacity(n + 4);
    for i in 0..n {
        out.push(snap.links[i].clone());
        if i >= pairs {
            continue;
        }
        let j = (i + 1) % n;
        let a = snap.links[i].prim;
        let b = snap.links[j].prim;
        let e1 = a.omega();
        let s2 = b.alpha();
        if e1.distance_to(&s2) <= eps.distance {
            continue;
        }
        let transition = match fillet_between(&a, &b, eps) {
            Some(fillet) => Primitive::Arc(fillet),
            None => {
                debug!("Transition normals are parallel, inserting straight connector");
                Primitive::Line(Line::new(e1, s2))
            }
        };
        out.push(ChainLink::new(Uuid::new_v4(), transition));
    }
    snap.links = out;
}

/// Bakes one sub-chain for a pass and repairs its topology: snapshot, trim,
/// transitions.
pub fn assemble_contour(links: &[ChainLink], off: &Offset, closed: bool, eps: &Eps) -> Snapshot {
    let mut snap = Snapshot::bake(links, off, closed);
    trim_corners(&mut snap, eps);
    insert_transitions(&mut snap, eps);
    snap
}

/// Walks a snapshot and hands each primitive's final geometry to the sink.
/// With `helical` set, the single z-drop from `z_from` to `z_to` is
/// distributed proportionally by cumulative path length.
pub fn emit_chain(
    snap: &Snapshot,
    ctx: &mut EmitContext<'_>,
    z_from: f64,
    z_to: f64,
    helical: bool,
) {
    if snap.links.is_empty() {
        return;
    }
    let zero = snap.offset().borrow().clone();
    let start = snap.links[0].prim.alpha();
    ctx.retract();
    ctx.rapid_to(start);
    ctx.plunge_to(if helical { z_from } else { z_to });

    let total = chain_length(&snap.links, &zero);
    let mut acc = 0.0;
    for link in &snap.links {
        acc += link.prim.length(&zero);
        let z = if helical && total > 0.0 {
            z_from + (z_to - z_from) * (acc / total)
        } else {
            z_to
        };
        match &link.prim {
            Primitive::Line(l) => ctx.cut_line(l.p1, z),
            Primitive::Arc(a) => {
                ctx.cut_arc(a.end(), z, a.center() - a.start, a.sweep < 0.0);
            }
        }
    }
}

/// The depth-vs-offset profile read from a sketch's extrusion child.
pub struct DepthProfile {
    prims: Vec<Primitive>,
    /// Top of the depth range (usually zero).
    pub z_top: f64,
    /// End depth.
    pub z_end: f64,
}

impl DepthProfile {
    /// Reads the profile curve from the sketch's extruder slot.
    pub fn from_arena(arena: &Arena, sketch: BlockId) -> Result<(Self, Extrusion), CamError> {
        let ext_id = arena
            .get(sketch)
            .and_then(|n| n.extruder())
            .ok_or(CamError::MissingExtrusion)?;
        let ext = match arena.get(ext_id).map(|n| &n.payload) {
            Some(BlockPayload::Extrusion(e)) => *e,
            _ => return Err(CamError::MissingExtrusion),
        };
        let links = arena.chain_of(ext_id);
        if links.is_empty() {
            return Err(CamError::MissingExtrusion);
        }
        let zero = Offset::zero();
        let mut bb = Aabb::EMPTY;
        for l in &links {
            bb.merge(&l.prim.aabb(&zero));
        }
        Ok((
            Self {
                prims: links.into_iter().map(|l| l.prim).collect(),
                z_top: bb.max.y,
                z_end: bb.min.y,
            },
            ext,
        ))
    }

    /// Radial offset of the profile curve at depth `z`: the first
    /// x-intercept of the curve at that scan height.
    pub fn eval(&self, z: f64, eps: &Eps) -> Option<f64> {
        let zero = Offset::zero();
        for p in &self.prims {
            if let Some(x) = p.eval(z, &zero, eps).first() {
                return Some(*x);
            }
        }
        None
    }

    /// [`eval`](Self::eval) with an epsilon nudge inward at the range ends.
    pub fn eval_clamped(&self, z: f64, eps: &Eps) -> Option<f64> {
        self.eval(z, eps)
            .or_else(|| self.eval(z - eps.distance, eps))
            .or_else(|| self.eval(z + eps.distance, eps))
    }

    /// True when the radial offset changes over the depth range.
    pub fn is_tapered(&self, eps: &Eps) -> bool {
        let top = self.eval_clamped(self.z_top, eps).unwrap_or(0.0);
        let end = self.eval_clamped(self.z_end, eps).unwrap_or(top);
        (top - end).abs() > eps.distance
    }
}

/// Depth passes from the top to the end depth in resolution-sized steps,
/// snapping the last step exactly to the end depth once the remaining depth
/// is under one step. With `zero_first`, a pass at the top depth leads.
pub fn depth_passes(z_top: f64, z_end: f64, resolution: f64, zero_first: bool, eps: &Eps) -> Vec<f64> {
    let mut out = Vec::new();
    if zero_first {
        out.push(z_top);
    }
    if resolution <= eps.distance {
        warn!(resolution, "Non-positive depth resolution, single full-depth pass");
        out.push(z_end);
        return out;
    }
    let mut z = z_top;
    while z - z_end > eps.distance {
        let remaining = z - z_end;
        if remaining < resolution - eps.distance {
            z = z_end;
        } else {
            z -= resolution;
        }
        out.push(z);
    }
    if out.is_empty() {
        out.push(z_end);
    }
    out
}

/// Mills one sketch: every sub-chain over every depth pass, with pockets
/// where the contour is tapered or pocketing is requested.
pub fn mill_sketch(
    arena: &Arena,
    id: BlockId,
    ctx: &mut EmitContext<'_>,
    eps: &Eps,
    mut progress: Option<ProgressCallback<'_>>,
) -> Result<(), CamError> {
    let node = arena.get(id).ok_or_else(|| CamError::EmptyGeometry {
        reason: "stale sketch id".into(),
    })?;
    let sk = match &node.payload {
        BlockPayload::Sketch(s) => *s,
        other => {
            return Err(CamError::EmptyGeometry {
                reason: format!("expected a sketch, got {}", other.variant_name()),
            })
        }
    };
    let sketch_off = node.offset.borrow().clone();
    let tool = arena.find_tool(id).ok_or(CamError::ToolNotFound)?;
    let (profile, ext) = DepthProfile::from_arena(arena, id)?;

    let mut links = arena.chain_of(id);
    chain::prune_null(&mut links, eps);
    if links.is_empty() {
        return Err(CamError::EmptyGeometry {
            reason: "sketch has no millable primitives".into(),
        });
    }
    let fully_closed = reorder(&mut links, eps);
    if !fully_closed {
        debug!("Sketch contains open sub-chains");
    }
    let chains = subchains(&links, eps);
    ctx.ensure_tool(&tool);

    let tapered = profile.is_tapered(eps) || sk.taper_offset.norm() > eps.distance;
    let passes = depth_passes(
        profile.z_top,
        profile.z_end,
        ext.resolution,
        sk.zero_pass || sk.helical,
        eps,
    );
    let total_passes = passes.len() as u64;
    debug!(
        passes = total_passes,
        tapered,
        chains = chains.len(),
        "Milling sketch"
    );

    for (pi, &z) in passes.iter().enumerate() {
        let prev_z = if pi == 0 { profile.z_top } else { passes[pi - 1] };
        for sc in &chains {
            let chain_slice = &links[sc.range()];
            let w = if sc.closed { winding(chain_slice) } else { 1 };
            let side: i8 = match ext.cut_side {
                CutSide::Along => 0,
                CutSide::Outside => w,
                CutSide::Inside => -w,
            };
            let eval = profile.eval_clamped(z, eps).unwrap_or_else(|| {
                warn!(z, "Depth profile undefined, falling back to zero offset");
                0.0
            });
            let span = profile.z_top - profile.z_end;
            let fraction = if span > eps.distance {
                (profile.z_top - z) / span
            } else {
                1.0
            };
            let pass_off = Offset {
                side,
                tool: tool.radius(),
                eval,
                rotation: sketch_off.rotation,
                origin: sketch_off.origin + sk.taper_offset * fraction,
                z0: profile.z_top,
                z1: profile.z_end,
            };
            let snap = assemble_contour(chain_slice, &pass_off, sc.closed, eps);
            if snap.links.is_empty() {
                continue;
            }

            if sc.closed && (sk.pocket || tapered) {
                let row_step = tool.diameter / 2.0;
                let (y0, y1) = ctx.machine.y_range();
                match ext.cut_side {
                    CutSide::Inside => {
                        let zero = snap.offset().borrow().clone();
                        let fill =
                            Pocket::build(&snap.links, &zero, y0, y1, row_step, eps, None);
                        fill.generate(ctx, z);
                    }
                    CutSide::Outside if tapered => {
                        // Clear the annulus between the current-depth and
                        // end-depth offset contours.
                        let end_eval =
                            profile.eval_clamped(profile.z_end, eps).unwrap_or(eval);
                        let end_off = Offset {
                            eval: end_eval,
                            origin: sketch_off.origin + sk.taper_offset,
                            ..pass_off.clone()
                        };
                        let end_snap = assemble_contour(chain_slice, &end_off, sc.closed, eps);
                        let zero = snap.offset().borrow().clone();
                        let mut fill =
                            Pocket::build(&snap.links, &zero, y0, y1, row_step, eps, None);
                        let inner =
                            Pocket::build(&end_snap.links, &zero, y0, y1, row_step, eps, None);
                        fill.subtract(&inner, eps);
                        fill.generate(ctx, z);
                    }
                    _ => {}
                }
            }

            let helical = sk.helical && sc.closed && !tapered;
            emit_chain(&snap, ctx, prev_z, z, helical);
        }
        if let Some(cb) = progress.as_mut() {
            cb((pi + 1) as u64, total_passes);
        }
    }
    Ok(())
}
