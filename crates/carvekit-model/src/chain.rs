//! Contour chains: sub-chain detection, winding classification, and
//! fragment reordering.
//!
//! These operate on flat lists of primitives paired with the identity of the
//! block they came from, the form snapshots take during assembly.

use carvekit_core::Eps;
use tracing::debug;
use uuid::Uuid;

use crate::geom::{signed_delta_deg, Primitive};
use crate::offset::Offset;

/// One element of a chain: a primitive plus the identity of its origin
/// block, kept for reverse lookup after cloning.
#[derive(Debug, Clone)]
pub struct ChainLink {
    pub origin: Uuid,
    pub prim: Primitive,
}

impl ChainLink {
    pub fn new(origin: Uuid, prim: Primitive) -> Self {
        Self { origin, prim }
    }
}

/// A contiguous run inside a chain list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubChain {
    /// Index of the first link.
    pub start: usize,
    /// Number of links in the run.
    pub len: usize,
    /// True when the run's overall end meets its overall start.
    pub closed: bool,
}

impl SubChain {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Splits a list into maximal contiguous runs.
///
/// A run continues while each primitive's end matches the next one's start
/// within tolerance; it is closed when its overall end matches its overall
/// start.
pub fn subchains(links: &[ChainLink], eps: &Eps) -> Vec<SubChain> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < links.len() {
        let mut len = 1;
        while start + len < links.len() {
            let end = links[start + len - 1].prim.omega();
            let next = links[start + len].prim.alpha();
            if end.distance_to(&next) > eps.distance {
                break;
            }
            len += 1;
        }
        let closed = links[start]
            .prim
            .alpha()
            .distance_to(&links[start + len - 1].prim.omega())
            <= eps.distance;
        out.push(SubChain { start, len, closed });
        start += len;
    }
    out
}

/// Classifies the winding of a closed run.
///
/// Sums the signed turning angle across the chain: the joint turn between
/// each primitive's exit direction and the next one's entry direction, plus
/// each arc's own sweep. The total resolves to ±360 degrees; the sign picks
/// "inside-is-left" (+1, counter-clockwise) or "inside-is-right" (-1).
pub fn winding(links: &[ChainLink]) -> i8 {
    let zero = Offset::zero();
    let mut total = 0.0;
    for (i, link) in links.iter().enumerate() {
        if let Primitive::Arc(arc) = &link.prim {
            total += arc.sweep;
        }
        let next = &links[(i + 1) % links.len()];
        let (_, exit) = link.prim.tangents(&zero);
        let (entry, _) = next.prim.tangents(&zero);
        total += signed_delta_deg(exit.angle_deg(), entry.angle_deg());
    }
    if (total.abs() - 360.0).abs() > 1.0 {
        debug!(total, "Winding sum off the expected full turn");
    }
    if total >= 0.0 {
        1
    } else {
        -1
    }
}

/// Reorders an unordered, possibly-reversed primitive list into maximal
/// contiguous runs, flipping primitives matched in reverse orientation.
///
/// Starting from the original head, the current fragment's two open ends are
/// matched against the remainder; the first match in list order wins (the
/// tie-break at exact branch points). A full pass with no match closes the
/// fragment and starts the next one. If more than half the primitives were
/// flipped, everything is re-flipped to preserve the original majority
/// direction. Returns whether every resulting fragment is closed.
///
/// Worst case quadratic in list size; callers should keep input
/// near-ordered.
pub fn reorder(links: &mut Vec<ChainLink>, eps: &Eps) -> bool {
    let total = links.len();
    if total == 0 {
        return false;
    }
    if total == 1 {
        return links[0]
            .prim
            .alpha()
            .distance_to(&links[0].prim.omega())
            <= eps.distance;
    }

    let original_head = links[0].origin;
    let mut rest: Vec<ChainLink> = links.split_off(1);
    let mut out = std::mem::take(links);

    let mut fragments: Vec<(usize, usize)> = Vec::new();
    let mut frag_start = 0;
    let mut flipped = 0usize;
    let mut all_closed = true;

    loop {
        let open_start = out[frag_start].prim.alpha();
        let open_end = out.last().expect("fragment is never empty").prim.omega();

        let mut matched = false;
        let mut i = 0;
        while i < rest.len() {
            let (a, o) = rest[i].prim.ends();
            if a.distance_to(&open_end) <= eps.distance {
                let link = rest.remove(i);
                out.push(link);
                matched = true;
                break;
            }
            if o.distance_to(&open_end) <= eps.distance {
                let mut link = rest.remove(i);
                link.prim.flip();
                flipped += 1;
                out.push(link);
                matched = true;
                break;
            }
            if o.distance_to(&open_start) <= eps.distance {
                let link = rest.remove(i);
                out.insert(frag_start, link);
                matched = true;
                break;
            }
            if a.distance_to(&open_start) <= eps.distance {
                let mut link = rest.remove(i);
                link.prim.flip();
                flipped += 1;
                out.insert(frag_start, link);
                matched = true;
                break;
            }
            i += 1;
        }
        if matched {
            continue;
        }

        let closed = out[frag_start]
            .prim
            .alpha()
            .distance_to(&out.last().expect("fragment is never empty").prim.omega())
            <= eps.distance;
        all_closed &= closed;
        fragments.push((frag_start, out.len()));
        if rest.is_empty() {
            break;
        }
        frag_start = out.len();
        out.push(rest.remove(0));
    }

    if flipped * 2 > total {
        debug!(flipped, total, "Restoring majority direction");
        for &(s, e) in &fragments {
            out[s..e].reverse();
            for link in &mut out[s..e] {
                link.prim.flip();
            }
        }
        // Best effort: keep the original head in front of its fragment when
        // the fragment is closed and can be rotated freely.
        if let Some(&(s, e)) = fragments.first() {
            let closed = out[s].prim.alpha().distance_to(&out[e - 1].prim.omega())
                <= eps.distance;
            if closed {
                if let Some(pos) = out[s..e].iter().position(|l| l.origin == original_head) {
                    out[s..e].rotate_left(pos);
                }
            }
        }
    }

    *links = out;
    all_closed
}

/// Total positioned path length of a chain.
pub fn chain_length(links: &[ChainLink], off: &Offset) -> f64 {
    links.iter().map(|l| l.prim.length(off)).sum()
}

/// Removes degenerate primitives (near-zero length or radius) from a chain.
pub fn prune_null(links: &mut Vec<ChainLink>, eps: &Eps) {
    let before = links.len();
    links.retain(|l| !l.prim.is_null(eps));
    if links.len() != before {
        debug!(removed = before - links.len(), "Pruned null sections");
    }
}
