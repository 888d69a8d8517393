use kurbo::{BezPath, Point, Rect, Shape};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeKind};

/// Traversal sense of a closed path in the y-up font coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

impl Winding {
    /// `+1` for clockwise, `-1` for counter-clockwise.
    #[must_use]
    pub fn sign(self) -> i32 {
        match self {
            Winding::Clockwise => 1,
            Winding::CounterClockwise => -1,
        }
    }
}

/// A closed outline.
///
/// The node list is circular and `nodes[0]` is the starting node. Off-curve nodes directly
/// preceding an on-curve node are the control points of the segment ending at that node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub nodes: Vec<Node>,
}

impl Path {
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Polygon made of line nodes only.
    #[must_use]
    pub fn polygon(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().map(|&(x, y)| Node::line(x, y)).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn on_curve_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| n.is_on_curve())
    }

    pub fn on_curve_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_on_curve())
            .map(|(i, _)| i)
    }

    /// Number of segments; every on-curve node closes exactly one segment.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.on_curve_nodes().count()
    }

    /// Rotate the circular node list so that `index` becomes the starting node.
    ///
    /// Returns `true` when the start actually moved. Off-curve and out-of-range indices are
    /// ignored.
    pub fn make_node_first(&mut self, index: usize) -> bool {
        match self.nodes.get(index) {
            Some(node) if node.is_on_curve() && index != 0 => {
                self.nodes.rotate_left(index);
                true
            }
            _ => false,
        }
    }

    /// Reverse the traversal direction, keeping the starting node.
    ///
    /// Line/curve types are re-derived because each on-curve node now ends the segment that
    /// previously started at it.
    pub fn reverse(&mut self) {
        let n = self.nodes.len();
        if n < 2 {
            return;
        }
        self.nodes.reverse();
        self.nodes.rotate_right(1);

        let kinds: Vec<NodeKind> = (0..n)
            .map(|i| {
                let prev = self.nodes[(i + n - 1) % n].kind;
                match self.nodes[i].kind {
                    NodeKind::OffCurve => NodeKind::OffCurve,
                    _ if prev == NodeKind::OffCurve => NodeKind::Curve,
                    _ => NodeKind::Line,
                }
            })
            .collect();
        for (node, kind) in self.nodes.iter_mut().zip(kinds) {
            node.kind = kind;
        }
    }

    /// Bezier representation of the outline, starting at the first on-curve node.
    ///
    /// One control point gives a quadratic segment, two a cubic one; longer runs are treated as
    /// a TrueType quadratic spline with implied on-curve midpoints. Paths without on-curve nodes
    /// produce an empty `BezPath`.
    #[must_use]
    pub fn to_bez_path(&self) -> BezPath {
        let mut bez = BezPath::new();
        let Some(start) = self.nodes.iter().position(|n| n.is_on_curve()) else {
            return bez;
        };
        let n = self.nodes.len();
        bez.move_to(self.nodes[start].position());

        let mut controls: Vec<Point> = Vec::new();
        for step in 1..=n {
            let node = &self.nodes[(start + step) % n];
            if !node.is_on_curve() {
                controls.push(node.position());
                continue;
            }
            let end = node.position();
            match controls.as_slice() {
                [] => bez.line_to(end),
                [c] => bez.quad_to(*c, end),
                [c1, c2] => bez.curve_to(*c1, *c2, end),
                many => {
                    for pair in many.windows(2) {
                        bez.quad_to(pair[0], pair[0].midpoint(pair[1]));
                    }
                    if let Some(last) = many.last() {
                        bez.quad_to(*last, end);
                    }
                }
            }
            controls.clear();
        }
        bez.close_path();
        bez
    }

    /// Tight bounding rectangle of the outline.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.to_bez_path().bounding_box()
    }

    /// Signed area; positive for counter-clockwise paths.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.to_bez_path().area()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// `None` for degenerate (zero-area) outlines.
    #[must_use]
    pub fn winding(&self) -> Option<Winding> {
        let area = self.signed_area();
        if area > 0.0 {
            Some(Winding::CounterClockwise)
        } else if area < 0.0 {
            Some(Winding::Clockwise)
        } else {
            None
        }
    }

    /// Reverse the path if it does not already wind in `desired`. Returns `true` on reversal.
    pub fn set_winding(&mut self, desired: Winding) -> bool {
        match self.winding() {
            Some(current) if current != desired => {
                self.reverse();
                true
            }
            _ => false,
        }
    }

    /// Arithmetic mean of the on-curve node positions.
    #[must_use]
    pub fn centre_of_mass(&self) -> Option<Point> {
        let (count, sum_x, sum_y) = self
            .on_curve_nodes()
            .fold((0usize, 0.0, 0.0), |(c, x, y), n| (c + 1, x + n.x, y + n.y));
        if count == 0 {
            return None;
        }
        Some(Point::new(sum_x / count as f64, sum_y / count as f64))
    }
}
