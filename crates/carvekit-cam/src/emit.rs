//! Motion emission: the sink trait, a recording sink, and the emission
//! context.
//!
//! The engine never formats control-program text; it hands computed geometry
//! to a [`MotionSink`] as an append-only stream of motion tokens. The
//! [`EmitContext`] threads the cached tool position through emission so
//! redundant moves are elided explicitly, not through a singleton.

use carvekit_core::{Eps, Machine, Tool};
use carvekit_model::Point2;

/// Receiver of the motion-token stream.
///
/// Implementors turn tokens into G-code text, visualization geometry, or
/// test records; the engine only invokes these primitives.
pub trait MotionSink {
    fn program_begin(&mut self, machine: &Machine);
    fn program_end(&mut self);
    fn select_tool(&mut self, tool: &Tool);
    fn comment(&mut self, _text: &str) {}
    /// Rapid straight up to the traverse height.
    fn retract(&mut self, z: f64);
    /// Rapid at the current height to a new XY position.
    fn rapid(&mut self, target: Point2);
    /// Feed straight down to a cutting depth.
    fn plunge(&mut self, z: f64, feed: f64);
    /// Feed move along a line, possibly changing depth.
    fn feed_line(&mut self, target: Point2, z: f64, feed: f64);
    /// Feed move along an arc given the center offset from the current
    /// position (I/J convention).
    fn feed_arc(&mut self, target: Point2, z: f64, center_offset: Point2, cw: bool, feed: f64);
    /// Canned drill cycle at a position.
    fn drill(&mut self, position: Point2, z: f64, retract_z: f64, feed: f64);
}

/// A recorded motion token.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionToken {
    ProgramBegin,
    ProgramEnd,
    ToolChange(u32),
    Comment(String),
    Retract { z: f64 },
    Rapid { target: Point2 },
    Plunge { z: f64, feed: f64 },
    Line { target: Point2, z: f64, feed: f64 },
    Arc {
        target: Point2,
        z: f64,
        center_offset: Point2,
        cw: bool,
        feed: f64,
    },
    Drill {
        position: Point2,
        z: f64,
        retract_z: f64,
        feed: f64,
    },
}

/// A sink that records every token, for tests and read-only visualization
/// consumers.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub tokens: Vec<MotionToken>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens matching a predicate.
    pub fn count(&self, pred: impl Fn(&MotionToken) -> bool) -> usize {
        self.tokens.iter().filter(|t| pred(t)).count()
    }
}

impl MotionSink for RecordingSink {
    fn program_begin(&mut self, _machine: &Machine) {
        self.tokens.push(MotionToken::ProgramBegin);
    }
    fn program_end(&mut self) {
        self.tokens.push(MotionToken::ProgramEnd);
    }
    fn select_tool(&mut self, tool: &Tool) {
        self.tokens.push(MotionToken::ToolChange(tool.number));
    }
    fn comment(&mut self, text: &str) {
        self.tokens.push(MotionToken::Comment(text.to_string()));
    }
    fn retract(&mut self, z: f64) {
        self.tokens.push(MotionToken::Retract { z });
    }
    fn rapid(&mut self, target: Point2) {
        self.tokens.push(MotionToken::Rapid { target });
    }
    fn plunge(&mut self, z: f64, feed: f64) {
        self.tokens.push(MotionToken::Plunge { z, feed });
    }
    fn feed_line(&mut self, target: Point2, z: f64, feed: f64) {
        self.tokens.push(MotionToken::Line { target, z, feed });
    }
    fn feed_arc(&mut self, target: Point2, z: f64, center_offset: Point2, cw: bool, feed: f64) {
        self.tokens.push(MotionToken::Arc {
            target,
            z,
            center_offset,
            cw,
            feed,
        });
    }
    fn drill(&mut self, position: Point2, z: f64, retract_z: f64, feed: f64) {
        self.tokens.push(MotionToken::Drill {
            position,
            z,
            retract_z,
            feed,
        });
    }
}

/// Emission state threaded through one synthesis run: the machine record,
/// the active tool, and the cached tool position used to elide redundant
/// moves.
pub struct EmitContext<'a> {
    pub machine: &'a Machine,
    pub tool: Tool,
    pub eps: Eps,
    sink: &'a mut dyn MotionSink,
    current_tool: Option<u32>,
    position: Option<Point2>,
    z: Option<f64>,
}

impl<'a> EmitContext<'a> {
    pub fn new(machine: &'a Machine, tool: Tool, sink: &'a mut dyn MotionSink) -> Self {
        Self {
            machine,
            tool,
            eps: Eps::default(),
            sink,
            current_tool: None,
            position: None,
            z: None,
        }
    }

    /// Direct access to the sink for tokens the context does not track.
    pub fn sink(&mut self) -> &mut dyn MotionSink {
        &mut *self.sink
    }

    /// The cached XY position, if known.
    pub fn position(&self) -> Option<Point2> {
        self.position
    }

    /// Switches the active tool, emitting a change only when it differs.
    pub fn ensure_tool(&mut self, tool: &Tool) {
        if self.current_tool != Some(tool.number) {
            self.sink.select_tool(tool);
            self.current_tool = Some(tool.number);
        }
        self.tool = tool.clone();
    }

    /// Retracts to the traverse height unless already there.
    pub fn retract(&mut self) {
        let traverse = self.machine.traverse_z;
        if self.z.map(|z| self.eps.same(z, traverse)) != Some(true) {
            self.sink.retract(traverse);
            self.z = Some(traverse);
        }
    }

    /// Rapid to an XY position unless already there.
    pub fn rapid_to(&mut self, target: Point2) {
        if self
            .position
            .map(|p| p.distance_to(&target) <= self.eps.distance)
            != Some(true)
        {
            self.sink.rapid(target);
            self.position = Some(target);
        }
    }

    /// Plunges to a cutting depth unless already there.
    pub fn plunge_to(&mut self, z: f64) {
        if self.z.map(|cur| self.eps.same(cur, z)) != Some(true) {
            self.sink.plunge(z, self.tool.plunge_feed());
            self.z = Some(z);
        }
    }

    /// Linear cutting move.
    pub fn cut_line(&mut self, target: Point2, z: f64) {
        self.sink.feed_line(target, z, self.tool.feed);
        self.position = Some(target);
        self.z = Some(z);
    }

    /// Arc cutting move; the center offset is relative to the current
    /// position.
    pub fn cut_arc(&mut self, target: Point2, z: f64, center_offset: Point2, cw: bool) {
        self.sink
            .feed_arc(target, z, center_offset, cw, self.tool.feed);
        self.position = Some(target);
        self.z = Some(z);
    }

    /// Canned drill cycle; the tool ends retracted above the hole.
    pub fn drill_at(&mut self, position: Point2, z: f64) {
        self.sink.drill(
            position,
            z,
            self.machine.traverse_z,
            self.tool.plunge_feed(),
        );
        self.position = Some(position);
        self.z = Some(self.machine.traverse_z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redundant_moves_are_elided() {
        let machine = Machine::default();
        let tool = Tool::new(1, "test", 3.0);
        let mut sink = RecordingSink::new();
        let mut ctx = EmitContext::new(&machine, tool, &mut sink);

        ctx.retract();
        ctx.retract();
        ctx.rapid_to(Point2::new(1.0, 1.0));
        ctx.rapid_to(Point2::new(1.0, 1.0));
        ctx.plunge_to(-1.0);
        ctx.plunge_to(-1.0);

        assert_eq!(sink.tokens.len(), 3);
    }

    #[test]
    fn test_tool_change_emitted_once() {
        let machine = Machine::default();
        let tool = Tool::new(1, "test", 3.0);
        let mut sink = RecordingSink::new();
        let mut ctx = EmitContext::new(&machine, tool.clone(), &mut sink);
        ctx.ensure_tool(&tool);
        ctx.ensure_tool(&tool);
        assert_eq!(
            sink.count(|t| matches!(t, MotionToken::ToolChange(_))),
            1
        );
    }
}
