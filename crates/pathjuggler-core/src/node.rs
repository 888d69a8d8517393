use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Role of a node within a closed outline.
///
/// `Line` and `Curve` nodes sit on the outline and describe the segment that *ends* at them;
/// `OffCurve` nodes are control points for the segment ending at the next on-curve node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Line,
    Curve,
    #[serde(rename = "offcurve", alias = "off")]
    OffCurve,
}

impl NodeKind {
    #[must_use]
    pub fn is_on_curve(self) -> bool {
        !matches!(self, NodeKind::OffCurve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
}

impl Node {
    #[must_use]
    pub fn new(x: f64, y: f64, kind: NodeKind) -> Self {
        Self { x, y, kind }
    }

    #[must_use]
    pub fn line(x: f64, y: f64) -> Self {
        Self::new(x, y, NodeKind::Line)
    }

    #[must_use]
    pub fn curve(x: f64, y: f64) -> Self {
        Self::new(x, y, NodeKind::Curve)
    }

    #[must_use]
    pub fn off_curve(x: f64, y: f64) -> Self {
        Self::new(x, y, NodeKind::OffCurve)
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn is_on_curve(&self) -> bool {
        self.kind.is_on_curve()
    }

    /// Straight-line distance to `other`, ignoring any curvature between them.
    #[must_use]
    pub fn distance_to(&self, other: &Node) -> f64 {
        self.position().distance(other.position())
    }
}
