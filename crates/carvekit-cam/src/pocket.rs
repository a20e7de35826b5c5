//! Scanline pocket rasterizer.
//!
//! A pocket is an array of rows at fixed y, each row a sorted list of
//! [xstart, xend] spans. Rows are built by evaluating every primitive of the
//! target contour per scanline and pairing the sorted crossings even-odd;
//! generation walks the rows serpentine, retracting before each new span;
//! subtraction removes the portion of each span covered by another pocket's
//! row-aligned spans.

use carvekit_core::types::ProgressCallback;
use carvekit_core::Eps;
use carvekit_model::chain::ChainLink;
use carvekit_model::{Offset, Point2};
use tracing::debug;

use crate::emit::EmitContext;

/// Fraction of the tool diameter kept clear of each span end.
const SPAN_PADDING_FRACTION: f64 = 0.25;

/// How many rows between cooperative progress reports during build.
const PROGRESS_STRIDE: usize = 32;

/// One scanline row.
#[derive(Debug, Clone, PartialEq)]
pub struct PocketRow {
    pub y: f64,
    /// Sorted, disjoint [xstart, xend] spans.
    pub spans: Vec<(f64, f64)>,
}

/// The rasterized fill pattern for a closed contour's interior.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pocket {
    pub rows: Vec<PocketRow>,
}

impl Pocket {
    /// Rasterizes a contour: one row per `row_step` over `[y0, y1]`, sorted
    /// and deduplicated crossings paired left-to-right even-odd.
    pub fn build(
        links: &[ChainLink],
        offset: &Offset,
        y0: f64,
        y1: f64,
        row_step: f64,
        eps: &Eps,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Pocket {
        let mut rows = Vec::new();
        if row_step <= eps.distance || y1 <= y0 {
            return Pocket { rows };
        }
        let total = ((y1 - y0) / row_step).floor() as u64 + 1;
        let mut y = y0;
        let mut row_index = 0u64;
        while y <= y1 + eps.distance {
            let mut crossings: Vec<f64> = Vec::new();
            for link in links {
                crossings.extend(link.prim.eval(y, offset, eps));
            }
            let spans = pair_crossings(crossings, eps);
            if !spans.is_empty() {
                rows.push(PocketRow { y, spans });
            }

            row_index += 1;
            if row_index % PROGRESS_STRIDE as u64 == 0 {
                if let Some(cb) = progress.as_mut() {
                    cb(row_index, total);
                }
            }
            y += row_step;
        }
        Pocket { rows }
    }

    /// True when no row holds a span.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.spans.is_empty())
    }

    /// Removes, from each span of `self`, the portion covered by any
    /// overlapping span of `other` on the row at the same y. Containment
    /// splits a span in two; partial overlap shrinks it from the covered
    /// side.
    pub fn subtract(&mut self, other: &Pocket, eps: &Eps) {
        for row in &mut self.rows {
            let Some(other_row) = other
                .rows
                .iter()
                .find(|r| (r.y - row.y).abs() <= eps.distance)
            else {
                continue;
            };
            let mut pending: Vec<(f64, f64)> = std::mem::take(&mut row.spans);
            for &(b0, b1) in &other_row.spans {
                let mut next: Vec<(f64, f64)> = Vec::with_capacity(pending.len());
                for (a0, a1) in pending {
                    if b1 <= a0 + eps.distance || b0 >= a1 - eps.distance {
                        // No overlap.
                        next.push((a0, a1));
                    } else if b0 <= a0 + eps.distance && b1 >= a1 - eps.distance {
                        // Fully covered: span disappears.
                    } else if b0 > a0 + eps.distance && b1 < a1 - eps.distance {
                        // Contained: split in two.
                        next.push((a0, b0));
                        next.push((b1, a1));
                    } else if b0 <= a0 + eps.distance {
                        // Overlaps the left side.
                        next.push((b1, a1));
                    } else {
                        // Overlaps the right side.
                        next.push((a0, b0));
                    }
                }
                pending = next;
            }
            row.spans = pending;
        }
        self.rows.retain(|r| !r.spans.is_empty());
    }

    /// Emits the fill: rows in serpentine order, spans narrower than the
    /// tool diameter skipped, a retract before every new span, and an inward
    /// padding fraction of the tool diameter at each span end.
    pub fn generate(&self, ctx: &mut EmitContext<'_>, z: f64) {
        let diameter = ctx.tool.diameter;
        let pad = diameter * SPAN_PADDING_FRACTION;
        let mut forward = true;
        for row in &self.rows {
            let mut spans: Vec<(f64, f64)> = row.spans.clone();
            if !forward {
                spans.reverse();
            }
            for (x0, x1) in spans {
                if x1 - x0 < diameter {
                    continue;
                }
                let (enter, exit) = if forward {
                    (x0 + pad, x1 - pad)
                } else {
                    (x1 - pad, x0 + pad)
                };
                ctx.retract();
                ctx.rapid_to(Point2::new(enter, row.y));
                ctx.plunge_to(z);
                ctx.cut_line(Point2::new(exit, row.y), z);
            }
            forward = !forward;
        }
    }
}

/// Sorts and deduplicates crossings, then pairs them left-to-right into
/// even-odd fill spans. An odd trailing crossing is dropped.
fn pair_crossings(mut crossings: Vec<f64>, eps: &Eps) -> Vec<(f64, f64)> {
    crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    crossings.dedup_by(|a, b| (*a - *b).abs() <= eps.distance);
    if crossings.len() % 2 != 0 {
        debug!(count = crossings.len(), "Odd crossing count, dropping last");
        crossings.pop();
    }
    crossings.chunks_exact(2).map(|p| (p[0], p[1])).collect()
}
