//! Tool definitions and library management.
//!
//! The engine reads a small set of cutting parameters per tool: diameter,
//! feed rate, plunge ratio, spindle speed, and coolant mode. The library is
//! the lookup surface external tool-table collaborators populate.

use serde::{Deserialize, Serialize};

/// Coolant behavior while this tool cuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoolantMode {
    /// No coolant.
    #[default]
    Off,
    /// Flood coolant on while cutting.
    Flood,
    /// Mist coolant on while cutting.
    Mist,
}

/// A cutting tool as the synthesis engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool number used by tool-change emission.
    pub number: u32,
    /// Display label.
    pub label: String,
    /// Cutting diameter.
    pub diameter: f64,
    /// Horizontal feed rate.
    pub feed: f64,
    /// Plunge feed as a fraction of the horizontal feed.
    pub plunge_ratio: f64,
    /// Spindle speed in RPM.
    pub spindle_rpm: f64,
    /// Coolant mode.
    pub coolant: CoolantMode,
}

impl Tool {
    /// Creates a tool with default cutting parameters for the diameter.
    pub fn new(number: u32, label: impl Into<String>, diameter: f64) -> Self {
        Self {
            number,
            label: label.into(),
            diameter,
            feed: 600.0,
            plunge_ratio: 0.2,
            spindle_rpm: 12000.0,
            coolant: CoolantMode::Off,
        }
    }

    /// The tool radius.
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// The plunge feed rate.
    pub fn plunge_feed(&self) -> f64 {
        self.feed * self.plunge_ratio
    }
}

/// A tool table keyed by tool number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolLibrary {
    tools: Vec<Tool>,
}

impl ToolLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool, replacing any existing tool with the same number.
    pub fn add(&mut self, tool: Tool) {
        if let Some(existing) = self.tools.iter_mut().find(|t| t.number == tool.number) {
            tracing::debug!("Replacing tool {} in library", tool.number);
            *existing = tool;
        } else {
            self.tools.push(tool);
        }
    }

    /// Looks up a tool by number.
    pub fn get(&self, number: u32) -> Option<&Tool> {
        self.tools.iter().find(|t| t.number == number)
    }

    /// Removes a tool by number, returning it if present.
    pub fn remove(&mut self, number: u32) -> Option<Tool> {
        let idx = self.tools.iter().position(|t| t.number == number)?;
        Some(self.tools.remove(idx))
    }

    /// Iterates over the tools in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    /// Number of tools in the library.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when the library holds no tools.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_replaces_same_number() {
        let mut lib = ToolLibrary::new();
        lib.add(Tool::new(1, "1/8 end mill", 3.175));
        lib.add(Tool::new(1, "replacement", 6.35));
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.get(1).unwrap().diameter, 6.35);
    }

    #[test]
    fn test_tool_json_round_trip() {
        let tool = Tool::new(3, "vbit", 0.2);
        let json = serde_json::to_string(&tool).unwrap();
        let back: Tool = serde_json::from_str(&json).unwrap();
        assert_eq!(tool, back);
    }
}
