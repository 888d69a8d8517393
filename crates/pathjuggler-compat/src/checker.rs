use pathjuggler_core::{Glyph, Layer, Node, NodeKind, Path};
use pathjuggler_geometry::{direction, OverlapCoords};

use crate::compare::{is_corner, is_similar_angle};
use crate::settings::Settings;

/// Same node count, segment count and node type at every index.
#[must_use]
pub fn path_structure_matches(a: &Path, b: &Path) -> bool {
    a.len() == b.len()
        && a.segment_count() == b.segment_count()
        && a.nodes.iter().zip(&b.nodes).all(|(n1, n2)| n1.kind == n2.kind)
}

/// Structural compatibility of two layers: equal path counts and matching node structure for
/// every path in the existing order. No directions are compared.
#[must_use]
pub fn paths_compatible(source: &Layer, target: &Layer) -> bool {
    source.path_count() == target.path_count()
        && source
            .paths()
            .zip(target.paths())
            .all(|(a, b)| path_structure_matches(a, b))
}

/// Every active layer is structurally compatible with the first active layer.
#[must_use]
pub fn masters_compatible(glyph: &Glyph) -> bool {
    let mut active = glyph.active_layers().map(|(_, l)| l);
    let Some(first) = active.next() else {
        return true;
    };
    active.all(|l| paths_compatible(first, l))
}

/// Walk the on-curve nodes of both paths in lock-step and compare the bearing of each segment.
///
/// `source` supplies the node order; the result is not guaranteed to be symmetric. Short seam
/// segments whose endpoints vanish under overlap removal are skipped when
/// [`Settings::ignore_overlap`] is set.
#[must_use]
pub fn paths_directionally_compatible(
    source: &Path,
    target: &Path,
    source_coords: &OverlapCoords,
    target_coords: &OverlapCoords,
    settings: &Settings,
) -> bool {
    if source.len() != target.len() || source.segment_count() != target.segment_count() {
        return false;
    }

    let s: Vec<&Node> = source.on_curve_nodes().collect();
    let t: Vec<&Node> = target.on_curve_nodes().collect();
    if s.len() != t.len() {
        return false;
    }
    let n = s.len();

    let mut mismatches = 0u32;
    for i in 0..n {
        let prev = (i + n - 1) % n;
        let next = (i + 1) % n;
        let prev_prev = (i + 2 * n - 2) % n;

        let (n1, n2) = (s[i], t[i]);
        if n1.kind != n2.kind {
            return false;
        }
        let both_lines = n1.kind == NodeKind::Line && n2.kind == NodeKind::Line;

        if settings.ignore_overlap && both_lines {
            let source_seam =
                !source_coords.contains_node(s[prev]) && !source_coords.contains_node(n1);
            let target_seam =
                !target_coords.contains_node(t[prev]) && !target_coords.contains_node(n2);
            if (source_seam || target_seam)
                && shorter_than_neighbours(s[prev_prev], s[prev], n1, s[next])
                && shorter_than_neighbours(t[prev_prev], t[prev], n2, t[next])
            {
                tracing::trace!(segment = i, "skipping seam segment in overlap");
                continue;
            }
        }

        if settings.ignore_corners && both_lines && source.len() >= 3 {
            let corner = |pp: &Node, p: &Node, c: &Node, nx: &Node| {
                is_corner(
                    direction(pp.position(), p.position()),
                    direction(p.position(), c.position()),
                    direction(c.position(), nx.position()),
                )
            };
            if corner(s[prev_prev], s[prev], n1, s[next])
                && corner(t[prev_prev], t[prev], n2, t[next])
            {
                tracing::trace!(segment = i, "skipping corner segment");
                continue;
            }
        }

        if is_similar_angle(
            s[prev].position(),
            n1.position(),
            t[prev].position(),
            n2.position(),
            None,
            settings,
        ) {
            mismatches = 0;
        } else {
            mismatches += 1;
            tracing::trace!(segment = i, mismatches, "segment directions differ");
            if mismatches > settings.max_mismatches {
                return false;
            }
        }
    }
    true
}

/// The segment `prev -> current` is strictly shorter than the segments on either side of it.
fn shorter_than_neighbours(prev_prev: &Node, prev: &Node, current: &Node, next: &Node) -> bool {
    let len = prev.distance_to(current);
    len < prev_prev.distance_to(prev) && len < current.distance_to(next)
}

/// Equal path counts and every path pair, in existing order, directionally compatible.
#[must_use]
pub fn all_paths_directionally_compatible(
    source: &Layer,
    target: &Layer,
    source_coords: &OverlapCoords,
    target_coords: &OverlapCoords,
    settings: &Settings,
) -> bool {
    source.path_count() == target.path_count()
        && source.paths().zip(target.paths()).all(|(a, b)| {
            paths_directionally_compatible(a, b, source_coords, target_coords, settings)
        })
}
