//! Layout value types and configuration.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Flow direction of layered placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Ranks stacked vertically.
    #[default]
    #[serde(rename = "TB")]
    TopToBottom,
    /// Ranks stacked horizontally.
    #[serde(rename = "LR")]
    LeftToRight,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopToBottom => "TB",
            Self::LeftToRight => "LR",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tb" | "td" | "top-to-bottom" => Ok(Self::TopToBottom),
            "lr" | "left-to-right" => Ok(Self::LeftToRight),
            other => Err(format!("unsupported direction `{other}`; expected TB|LR")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Open-interval overlap test; touching edges do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Separation parameters for one flat layered pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    /// Gap between neighbours inside one rank.
    pub node_sep: f64,
    /// Gap between consecutive ranks.
    pub rank_sep: f64,
    /// Offset of the whole drawing from the origin.
    pub margin: f64,
}

impl Spacing {
    pub fn new(node_sep: f64, rank_sep: f64, margin: f64) -> Self {
        Self {
            node_sep,
            rank_sep,
            margin,
        }
    }
}

/// Fixed spacing and sizing parameters.
///
/// Every field has a default, so partial JSON configs are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub leaf_width: f64,
    pub leaf_height: f64,
    /// Margin on the left, right and bottom of a group.
    pub side_margin: f64,
    /// Band at the top of a group reserved for its label.
    pub top_margin: f64,
    pub min_group_width: f64,
    pub min_group_height: f64,
    /// Spacing used when laying out the children of one group.
    pub group_spacing: Spacing,
    /// Spacing used for the single root-level pass.
    pub root_spacing: Spacing,
    /// Upper bound on crossing-reduction sweeps per flat pass.
    pub max_ordering_sweeps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            leaf_width: 200.0,
            leaf_height: 60.0,
            side_margin: 40.0,
            top_margin: 60.0,
            min_group_width: 300.0,
            min_group_height: 200.0,
            group_spacing: Spacing::new(80.0, 100.0, 0.0),
            root_spacing: Spacing::new(120.0, 180.0, 50.0),
            max_ordering_sweeps: 8,
        }
    }
}

impl LayoutConfig {
    pub fn leaf_size(&self) -> Size {
        Size::new(self.leaf_width, self.leaf_height)
    }
}

/// Input node: an id and optional containment parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub parent_id: Option<String>,
}

impl NodeSpec {
    pub fn root(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
        }
    }

    pub fn child(id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
        }
    }
}

/// Cross edge between two nodes, independent of containment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl LayoutEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Sized and placed node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub size: Size,
    /// Top-left corner, relative to the parent's top-left for children and
    /// absolute for roots.
    pub position: Point,
    /// Absolute top-left corner.
    pub absolute: Point,
}

impl PositionedNode {
    /// Absolute bounding box.
    pub fn rect(&self) -> Rect {
        Rect::new(self.absolute, self.size)
    }
}

/// Output of one full layout run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Placed nodes in input order.
    pub nodes: Vec<PositionedNode>,
    /// Edges that took part in no pass: unknown endpoints, self-loops, or
    /// endpoints in different containers.
    pub dropped_edges: Vec<LayoutEdge>,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, LayoutConfig, Point, Rect, Size};

    #[test]
    fn direction_parses_short_and_long_names() {
        assert_eq!("tb".parse::<Direction>().unwrap(), Direction::TopToBottom);
        assert_eq!(" LR ".parse::<Direction>().unwrap(), Direction::LeftToRight);
        assert!("diagonal".parse::<Direction>().is_err());
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Rect::new(Point::new(10.0, 0.0), Size::new(10.0, 10.0));
        let c = Rect::new(Point::new(5.0, 5.0), Size::new(10.0, 10.0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"side_margin": 10.0}"#).expect("config should parse");
        assert_eq!(config.side_margin, 10.0);
        assert_eq!(config.leaf_width, LayoutConfig::default().leaf_width);
    }
}
