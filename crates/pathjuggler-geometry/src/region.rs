use std::collections::HashSet;

use cavalier_contours::core::math::Vector2;
use cavalier_contours::polyline::{FindIntersectsOptions, PlineSource, PlineVertex, Polyline};
use kurbo::{PathEl, Point, Vec2};
use pathjuggler_core::{Layer, Node, Path};

/// Maximum distance between a curve and its flattened polyline, in font units.
pub const FLATTEN_TOLERANCE: f64 = 0.25;

const POS_EQUAL_EPS: f64 = 1e-5;

/// Coordinates are compared after rounding to this many steps per font unit.
const COORD_QUANTUM: f64 = 1000.0;

/// Distance from a vertex, along its corner bisector, at which the fill is sampled.
const SIDE_OFFSET: f64 = 1e-2;

/// Closed polyline approximating `path`, or `None` when fewer than two distinct points remain.
pub fn path_to_polyline(path: &Path) -> Option<Polyline<f64>> {
    let bez = path.to_bez_path();
    let mut points: Vec<Point> = Vec::new();
    kurbo::flatten(&bez, FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => {
            if points
                .last()
                .map_or(true, |last| last.distance(p) > POS_EQUAL_EPS)
            {
                points.push(p);
            }
        }
        _ => {}
    });
    while points.len() > 1
        && points
            .first()
            .zip(points.last())
            .is_some_and(|(a, b)| a.distance(*b) <= POS_EQUAL_EPS)
    {
        points.pop();
    }
    if points.len() < 2 {
        return None;
    }

    let mut pl = Polyline::new_closed();
    for p in points {
        pl.vertex_data.push(PlineVertex::new(p.x, p.y, 0.0));
    }
    Some(pl)
}

/// Whether the outlines of `a` and `b` cross or touch.
pub fn outlines_intersect(a: &Path, b: &Path) -> bool {
    let (Some(pa), Some(pb)) = (path_to_polyline(a), path_to_polyline(b)) else {
        return false;
    };
    let opts = FindIntersectsOptions {
        pline1_aabb_index: None,
        pos_equal_eps: POS_EQUAL_EPS,
    };
    let intersects = pa.find_intersects_opt(&pb, &opts);
    !intersects.basic_intersects.is_empty() || !intersects.overlapping_intersects.is_empty()
}

/// Node positions that survive flattening a layer's outlines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapCoords {
    keys: HashSet<(i64, i64)>,
}

impl OverlapCoords {
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            keys: points.into_iter().map(quantize).collect(),
        }
    }

    /// Flatten `layer` under the nonzero fill rule and collect the vertices left on its outline.
    ///
    /// A vertex survives when the layer is filled on exactly one side of it. Corners buried in
    /// another stroke are filled on both sides and drop out; counters and islands nested inside
    /// them keep their nodes whatever their winding.
    pub fn for_layer(layer: &Layer) -> Self {
        let plines: Vec<Polyline<f64>> = layer.paths().filter_map(path_to_polyline).collect();
        let filled = |p: Point| {
            plines
                .iter()
                .map(|pl| pl.winding_number(Vector2::new(p.x, p.y)))
                .sum::<i32>()
                != 0
        };

        let mut keys = HashSet::new();
        for pl in &plines {
            let n = pl.vertex_data.len();
            for i in 0..n {
                let prev = vertex_point(&pl.vertex_data[(i + n - 1) % n]);
                let at = vertex_point(&pl.vertex_data[i]);
                let next = vertex_point(&pl.vertex_data[(i + 1) % n]);
                let (left, right) = side_points(prev, at, next);
                if filled(left) != filled(right) {
                    keys.insert(quantize(at));
                }
            }
        }

        let coords = Self { keys };
        tracing::trace!(
            layer = %layer.name,
            count = coords.len(),
            "overlap coordinates"
        );
        coords
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.keys.contains(&quantize(p))
    }

    #[must_use]
    pub fn contains_node(&self, node: &Node) -> bool {
        self.contains(node.position())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn vertex_point(v: &PlineVertex<f64>) -> Point {
    Point::new(v.x, v.y)
}

/// Points just off `at` on either side of the outline, along the bisector of its corner.
fn side_points(prev: Point, at: Point, next: Point) -> (Point, Point) {
    let incoming = (at - prev).normalize();
    let outgoing = (next - at).normalize();
    let mut bisector = incoming + outgoing;
    if bisector.hypot() < 1e-9 {
        // Cusp: the outline doubles back on itself.
        bisector = incoming;
    }
    let normal = Vec2::new(-bisector.y, bisector.x).normalize() * SIDE_OFFSET;
    (at + normal, at - normal)
}

fn quantize(p: Point) -> (i64, i64) {
    (
        (p.x * COORD_QUANTUM).round() as i64,
        (p.y * COORD_QUANTUM).round() as i64,
    )
}
