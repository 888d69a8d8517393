use pathjuggler_core::{Glyph, Layer, Node, Path};
use pathjuggler_geometry::OverlapCoords;

use crate::checker::{all_paths_directionally_compatible, paths_directionally_compatible};
use crate::outcome::{Incompatibility, Outcome};
use crate::settings::Settings;

/// Rotate `path` until it is directionally compatible with `reference`.
///
/// On-curve nodes are tried as the new start in their existing order and the first match is
/// kept. Returns the index, in the node order before the call, of the node that became first.
/// When no rotation matches, the path is restored exactly and `None` is returned.
pub fn find_matching_starting_node(
    path: &mut Path,
    reference: &Path,
    path_coords: &OverlapCoords,
    reference_coords: &OverlapCoords,
    settings: &Settings,
) -> Option<usize> {
    let candidates: Vec<usize> = path.on_curve_indices().collect();
    let mut shift = 0usize;
    for index in candidates {
        path.make_node_first(index - shift);
        shift = index;
        if paths_directionally_compatible(path, reference, path_coords, reference_coords, settings)
        {
            tracing::debug!(start = index, "found compatible starting node");
            return Some(index);
        }
    }
    path.nodes.rotate_right(shift);
    None
}

fn bottom_left_index(path: &Path) -> Option<usize> {
    let mut best: Option<(usize, &Node)> = None;
    for (index, node) in path.nodes.iter().enumerate() {
        if !node.is_on_curve() {
            continue;
        }
        match best {
            Some((_, b)) if node.y > b.y || (node.y == b.y && node.x >= b.x) => {}
            _ => best = Some((index, node)),
        }
    }
    best.map(|(index, _)| index)
}

/// Move the start of `path` to its lowest on-curve node, leftmost on ties.
///
/// `number` is the 1-based position of the path in its layer, used in the status text.
pub fn set_starting_point(layer_name: &str, number: usize, path: &mut Path) -> String {
    let prefix = format!("{layer_name}: path {number}");
    match bottom_left_index(path) {
        None => format!("{prefix}: No bottom left node found"),
        Some(index) if path.make_node_first(index) => format!("{prefix}: Setting starting point"),
        Some(_) => format!("{prefix}: Starting point is already at the bottom left"),
    }
}

/// [`set_starting_point`] for every path of `layer`.
pub fn set_starting_points(layer: &mut Layer) -> Outcome {
    let name = layer.name.clone();
    let status = layer
        .paths_mut()
        .enumerate()
        .map(|(i, path)| set_starting_point(&name, i + 1, path))
        .collect();
    Outcome {
        status,
        warnings: Vec::new(),
    }
}

/// Rotate the starting points of every other active layer to match `glyph.layers[reference]`.
///
/// Layers already directionally compatible are left alone. The first path that cannot be fixed
/// stops the operation; rotations applied before it stay in place.
pub fn reestablish_starting_point_compatibility(
    glyph: &mut Glyph,
    reference: usize,
    settings: &Settings,
) -> Outcome {
    let Some(reference_layer) = glyph.layers.get(reference).cloned() else {
        return Outcome::default();
    };
    let glyph_name = glyph.name.clone();
    let reference_coords = OverlapCoords::for_layer(&reference_layer);
    let mut changed = false;

    for (index, layer) in glyph.layers.iter_mut().enumerate() {
        if index == reference || !layer.is_active() {
            continue;
        }
        let coords = OverlapCoords::for_layer(layer);
        if all_paths_directionally_compatible(
            layer,
            &reference_layer,
            &coords,
            &reference_coords,
            settings,
        ) {
            continue;
        }
        if layer.path_count() != reference_layer.path_count() {
            return Outcome::warning(Incompatibility::PathCount {
                glyph: glyph_name,
                layer: layer.name.clone(),
                count: layer.path_count(),
                reference: reference_layer.name.clone(),
                reference_count: reference_layer.path_count(),
            });
        }

        let layer_name = layer.name.clone();
        for (path, reference_path) in layer.paths_mut().zip(reference_layer.paths()) {
            if paths_directionally_compatible(
                path,
                reference_path,
                &coords,
                &reference_coords,
                settings,
            ) {
                continue;
            }
            changed = true;
            let start = find_matching_starting_node(
                path,
                reference_path,
                &coords,
                &reference_coords,
                settings,
            );
            if start.is_none() {
                tracing::debug!(glyph = %glyph_name, layer = %layer_name, "no compatible rotation");
                return Outcome::warning(Incompatibility::StartingPoints {
                    glyph: glyph_name,
                    layer: layer_name,
                });
            }
        }
    }

    if changed {
        Outcome::status(format!(
            "{glyph_name}: Reestablished compatibility by moving starting points"
        ))
    } else {
        Outcome::status(format!("{glyph_name}: No changes made"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathjuggler_core::{LayerKind, NodeKind};

    fn square() -> Path {
        Path::polygon(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)])
    }

    fn triangle() -> Path {
        Path::polygon(&[(200.0, 0.0), (300.0, 0.0), (250.0, 80.0)])
    }

    fn rotated(mut path: Path, index: usize) -> Path {
        path.make_node_first(index);
        path
    }

    fn reversed(mut path: Path) -> Path {
        path.reverse();
        path
    }

    #[test]
    fn finds_rotation_that_restores_compatibility() {
        let s = Settings::default();
        let none = OverlapCoords::default();
        let mut path = rotated(square(), 3);
        assert_eq!(
            find_matching_starting_node(&mut path, &square(), &none, &none, &s),
            Some(1)
        );
        assert_eq!(path, square());
    }

    #[test]
    fn already_compatible_path_keeps_its_start() {
        let s = Settings::default();
        let none = OverlapCoords::default();
        let mut path = square();
        assert_eq!(
            find_matching_starting_node(&mut path, &square(), &none, &none, &s),
            Some(0)
        );
        assert_eq!(path, square());
    }

    #[test]
    fn failed_search_restores_original_start() {
        let s = Settings::default();
        let none = OverlapCoords::default();
        let original = rotated(reversed(square()), 2);
        let mut path = original.clone();
        assert_eq!(
            find_matching_starting_node(&mut path, &square(), &none, &none, &s),
            None
        );
        assert_eq!(path, original);
    }

    #[test]
    fn off_curve_nodes_are_never_made_first() {
        let s = Settings::default();
        let none = OverlapCoords::default();
        let reference = Path::new(vec![
            Node::line(0.0, 0.0),
            Node::line(100.0, 0.0),
            Node::off_curve(100.0, 60.0),
            Node::off_curve(60.0, 100.0),
            Node::curve(0.0, 100.0),
        ]);
        let mut path = rotated(reference.clone(), 1);
        assert_eq!(
            find_matching_starting_node(&mut path, &reference, &none, &none, &s),
            Some(4)
        );
        assert_eq!(path, reference);
        assert_eq!(path.nodes[0].kind, NodeKind::Line);
    }

    #[test]
    fn bottom_left_node_becomes_start() {
        let mut path = rotated(square(), 2);
        assert_eq!(
            set_starting_point("Bold", 1, &mut path),
            "Bold: path 1: Setting starting point"
        );
        assert_eq!(path, square());
        assert_eq!(
            set_starting_point("Bold", 1, &mut path),
            "Bold: path 1: Starting point is already at the bottom left"
        );

        let mut empty = Path::new(vec![Node::off_curve(0.0, 0.0)]);
        assert_eq!(
            set_starting_point("Bold", 2, &mut empty),
            "Bold: path 2: No bottom left node found"
        );
    }

    #[test]
    fn ties_on_y_prefer_the_leftmost_node() {
        let mut path = Path::polygon(&[(50.0, 0.0), (100.0, 50.0), (0.0, 50.0), (-10.0, 0.0)]);
        set_starting_point("Regular", 1, &mut path);
        assert_eq!(path.nodes[0], Node::line(-10.0, 0.0));
    }

    #[test]
    fn set_starting_points_reports_every_path() {
        let mut layer = Layer::with_paths(
            "Regular",
            LayerKind::Master,
            vec![rotated(square(), 1), triangle()],
        );
        let outcome = set_starting_points(&mut layer);
        assert_eq!(
            outcome.status,
            vec![
                "Regular: path 1: Setting starting point",
                "Regular: path 2: Starting point is already at the bottom left",
            ]
        );
        assert!(outcome.is_clean());
    }

    fn glyph(bold: Vec<Path>) -> Glyph {
        Glyph::new(
            "o",
            vec![
                Layer::with_paths("Regular", LayerKind::Master, vec![square(), triangle()]),
                Layer::with_paths("Bold", LayerKind::Master, bold),
                Layer::with_paths("Bold backup", LayerKind::Backup, vec![rotated(square(), 2)]),
            ],
        )
    }

    #[test]
    fn reestablish_rotates_sibling_layers() {
        let s = Settings::default();
        let mut g = glyph(vec![rotated(square(), 2), triangle()]);
        let outcome = reestablish_starting_point_compatibility(&mut g, 0, &s);
        assert_eq!(
            outcome.status,
            vec!["o: Reestablished compatibility by moving starting points"]
        );
        assert!(outcome.is_clean());
        assert_eq!(g.layers[1].path(0), Some(&square()));
        assert_eq!(g.layers[2].path(0), Some(&rotated(square(), 2)));

        let again = reestablish_starting_point_compatibility(&mut g, 0, &s);
        assert_eq!(again.status, vec!["o: No changes made"]);
    }

    #[test]
    fn reestablish_reports_path_count_mismatch() {
        let s = Settings::default();
        let mut g = glyph(vec![rotated(square(), 2)]);
        let outcome = reestablish_starting_point_compatibility(&mut g, 0, &s);
        assert_eq!(
            outcome.warnings[0].to_string(),
            "o: Layer Bold has 1 paths; layer Regular has 2 paths"
        );
        assert_eq!(g.layers[1].path(0), Some(&rotated(square(), 2)));
    }

    #[test]
    fn reestablish_keeps_earlier_rotations_on_failure() {
        let s = Settings::default();
        let mut g = glyph(vec![rotated(square(), 2), reversed(triangle())]);
        let outcome = reestablish_starting_point_compatibility(&mut g, 0, &s);
        assert_eq!(
            outcome.warnings,
            vec![Incompatibility::StartingPoints {
                glyph: "o".into(),
                layer: "Bold".into(),
            }]
        );
        assert!(outcome.status.is_empty());
        assert_eq!(g.layers[1].path(0), Some(&square()));
        assert_eq!(g.layers[1].path(1), Some(&reversed(triangle())));
    }
}
