use kurbo::Rect;
use pathjuggler_core::{Layer, Path, Winding};
use pathjuggler_geometry::outlines_intersect;

use crate::outcome::Outcome;

/// Which rule last reversed a path in [`correct_path_direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DirectionChange {
    /// A top-level outer path was made counter-clockwise.
    Outer = 1,
    /// A nested path was made clockwise.
    Inner = 2,
    /// A nested path overlapping the dominant counter was made counter-clockwise.
    OverlappingInner = 3,
}

fn rect_contains(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

fn set_winding(
    path: &mut Path,
    desired: Winding,
    change: DirectionChange,
    last: &mut Option<DirectionChange>,
) {
    if path.set_winding(desired) {
        *last = Some(change);
    }
}

/// Assign canonical winding directions to the paths of `layer`.
///
/// Outer paths become counter-clockwise and the paths they enclose without touching become
/// clockwise. When one outer path encloses several paths, the largest keeps clockwise and every
/// other enclosed path crossing it turns counter-clockwise. Paths that neither enclose nor are
/// enclosed by anything are left alone.
pub fn correct_path_direction(layer: &mut Layer) -> Outcome {
    let change = correct_winding(layer.paths_mut().collect());
    match change {
        Some(change) => Outcome::status(format!(
            "{}: Corrected path direction with intersection order {}",
            layer.name, change as u8
        )),
        None => Outcome::status(format!("{}: No changes made", layer.name)),
    }
}

fn correct_winding(mut paths: Vec<&mut Path>) -> Option<DirectionChange> {
    let bounds: Vec<Rect> = paths.iter().map(|p| p.bounds()).collect();
    let n = paths.len();

    // (outer, inner) pairs: inner bounds inside outer bounds and the outlines do not cross.
    let mut nested: Vec<(usize, usize)> = Vec::new();
    for inner in 0..n {
        for outer in 0..n {
            if inner != outer
                && rect_contains(bounds[outer], bounds[inner])
                && !outlines_intersect(&*paths[inner], &*paths[outer])
            {
                nested.push((outer, inner));
            }
        }
    }

    let mut outers: Vec<usize> = Vec::new();
    for &(outer, _) in &nested {
        if !outers.contains(&outer) {
            outers.push(outer);
        }
    }
    outers.retain(|o| !nested.iter().any(|&(_, inner)| inner == *o));
    tracing::debug!(?nested, ?outers, "path nesting");

    let mut last = None;
    for &outer in &outers {
        set_winding(
            &mut *paths[outer],
            Winding::CounterClockwise,
            DirectionChange::Outer,
            &mut last,
        );
    }
    for &(_, inner) in &nested {
        if !outers.contains(&inner) {
            set_winding(
                &mut *paths[inner],
                Winding::Clockwise,
                DirectionChange::Inner,
                &mut last,
            );
        }
    }

    for &outer in &outers {
        let group: Vec<usize> = nested
            .iter()
            .filter(|&&(o, _)| o == outer)
            .map(|&(_, inner)| inner)
            .collect();
        if group.len() < 2 {
            continue;
        }
        let mut dominant = group[0];
        let mut dominant_area = paths[dominant].area();
        for &candidate in &group[1..] {
            let area = paths[candidate].area();
            if area > dominant_area {
                dominant = candidate;
                dominant_area = area;
            }
        }
        for &candidate in &group {
            if candidate != dominant && outlines_intersect(&*paths[candidate], &*paths[dominant]) {
                set_winding(
                    &mut *paths[candidate],
                    Winding::CounterClockwise,
                    DirectionChange::OverlappingInner,
                    &mut last,
                );
            }
        }
    }
    last
}
