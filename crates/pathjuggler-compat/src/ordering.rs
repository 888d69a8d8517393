use pathjuggler_core::{Glyph, Layer, Path};
use pathjuggler_geometry::OverlapCoords;

use crate::checker::paths_directionally_compatible;
use crate::compare::is_similar_angle;
use crate::outcome::{Incompatibility, Outcome};
use crate::settings::Settings;
use crate::starting_point::find_matching_starting_node;

/// Bearing tolerance, in degrees, between centres of mass of two paths across layers.
pub const ARRANGEMENT_TOLERANCE: f64 = 45.0;

/// Path counts above this make the permutation search noticeably slow.
const LARGE_PATH_COUNT: usize = 8;

/// Why two path lists are not arranged alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingMismatch {
    /// The lists have different lengths.
    PathCount,
    /// The path at this index has no on-curve nodes.
    Undefined { path: usize },
    /// The relative position of these two paths differs.
    Switched { first: usize, second: usize },
}

/// Check that every pair of paths sits in the same relative position in both lists.
///
/// Pairs where either centre of mass falls inside the other path's bounds are ambiguous and
/// skipped, in either list.
pub fn check_path_ordering_lists(
    a: &[&Path],
    b: &[&Path],
    settings: &Settings,
) -> Result<(), OrderingMismatch> {
    if a.len() != b.len() {
        return Err(OrderingMismatch::PathCount);
    }
    let centre = |paths: &[&Path], i: usize| {
        paths[i]
            .centre_of_mass()
            .ok_or(OrderingMismatch::Undefined { path: i })
    };

    for i in 0..a.len() {
        for j in (i + 1)..a.len() {
            let (cm1, cm2) = (centre(a, i)?, centre(a, j)?);
            if a[j].bounds().contains(cm1) || a[i].bounds().contains(cm2) {
                continue;
            }
            let (lcm1, lcm2) = (centre(b, i)?, centre(b, j)?);
            if b[j].bounds().contains(lcm1) || b[i].bounds().contains(lcm2) {
                continue;
            }
            if !is_similar_angle(cm1, cm2, lcm1, lcm2, Some(ARRANGEMENT_TOLERANCE), settings) {
                return Err(OrderingMismatch::Switched {
                    first: i,
                    second: j,
                });
            }
        }
    }
    Ok(())
}

/// Compare the arrangement of `glyph.layers[reference]` against every other active layer.
pub fn check_path_ordering(
    glyph: &Glyph,
    reference: usize,
    settings: &Settings,
) -> Result<(), OrderingMismatch> {
    let Some(reference_layer) = glyph.layers.get(reference) else {
        return Ok(());
    };
    let a: Vec<&Path> = reference_layer.paths().collect();
    for (index, layer) in glyph.active_layers() {
        if index == reference {
            continue;
        }
        let b: Vec<&Path> = layer.paths().collect();
        check_path_ordering_lists(&a, &b, settings)?;
    }
    Ok(())
}

/// How a sibling path pairs with a reference path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairMatch {
    Direct,
    /// Compatible after moving the start to this node index.
    Shifted(usize),
    Incompatible,
}

/// Chosen sibling path and optional new start node for each reference position.
type Arrangement = Vec<(usize, Option<usize>)>;

struct PermutationSearch<'a> {
    reference: &'a [&'a Path],
    sibling: &'a [&'a Path],
    reference_coords: &'a OverlapCoords,
    sibling_coords: &'a OverlapCoords,
    settings: &'a Settings,
    shift_starting_points: bool,
    memo: Vec<Vec<Option<PairMatch>>>,
    used: Vec<bool>,
    chosen: Arrangement,
}

impl<'a> PermutationSearch<'a> {
    fn new(
        reference: &'a [&'a Path],
        sibling: &'a [&'a Path],
        reference_coords: &'a OverlapCoords,
        sibling_coords: &'a OverlapCoords,
        settings: &'a Settings,
        shift_starting_points: bool,
    ) -> Self {
        let n = reference.len();
        Self {
            reference,
            sibling,
            reference_coords,
            sibling_coords,
            settings,
            shift_starting_points,
            memo: vec![vec![None; n]; n],
            used: vec![false; n],
            chosen: Vec::with_capacity(n),
        }
    }

    /// First arrangement in lexicographic order that pairs every path and keeps the layout.
    fn run(mut self) -> Option<Arrangement> {
        if self.descend(0) {
            Some(self.chosen)
        } else {
            None
        }
    }

    fn pair(&mut self, position: usize, candidate: usize) -> PairMatch {
        if let Some(cached) = self.memo[position][candidate] {
            return cached;
        }
        let reference = self.reference[position];
        let sibling = self.sibling[candidate];
        let result = if paths_directionally_compatible(
            reference,
            sibling,
            self.reference_coords,
            self.sibling_coords,
            self.settings,
        ) {
            PairMatch::Direct
        } else if self.shift_starting_points
            && !sibling.is_empty()
            && sibling.len() == reference.len()
        {
            let mut scratch = sibling.clone();
            match find_matching_starting_node(
                &mut scratch,
                reference,
                self.sibling_coords,
                self.reference_coords,
                self.settings,
            ) {
                Some(start) => PairMatch::Shifted(start),
                None => PairMatch::Incompatible,
            }
        } else {
            PairMatch::Incompatible
        };
        self.memo[position][candidate] = Some(result);
        result
    }

    fn descend(&mut self, position: usize) -> bool {
        let n = self.reference.len();
        if position == n {
            let candidate: Vec<&Path> =
                self.chosen.iter().map(|&(c, _)| self.sibling[c]).collect();
            return check_path_ordering_lists(self.reference, &candidate, self.settings).is_ok();
        }
        for candidate in 0..n {
            if self.used[candidate] {
                continue;
            }
            let start = match self.pair(position, candidate) {
                PairMatch::Incompatible => continue,
                PairMatch::Direct => None,
                PairMatch::Shifted(start) => Some(start),
            };
            self.used[candidate] = true;
            self.chosen.push((candidate, start));
            if self.descend(position + 1) {
                return true;
            }
            self.chosen.pop();
            self.used[candidate] = false;
        }
        false
    }
}

fn arrangement_changes_layer(arrangement: &[(usize, Option<usize>)]) -> bool {
    arrangement
        .iter()
        .enumerate()
        .any(|(i, &(source, start))| source != i || start.is_some_and(|s| s != 0))
}

fn apply_arrangement(layer: &mut Layer, arrangement: &[(usize, Option<usize>)]) {
    let paths: Vec<Path> = layer.paths().cloned().collect();
    let reordered = arrangement
        .iter()
        .map(|&(source, start)| {
            let mut path = paths[source].clone();
            if let Some(start) = start {
                path.make_node_first(start);
            }
            path
        })
        .collect();
    layer.replace_paths(reordered);
}

/// Reorder the paths of every other active layer to match `glyph.layers[reference]`.
///
/// Each sibling layer's permutations are searched in lexicographic order over its existing
/// path order; with `shift_starting_points` a pair that is not directly compatible may still
/// match after rotating the sibling path's start. Layers are only modified when every sibling
/// found an arrangement, and only those whose arrangement differs from the current one.
pub fn correct_path_ordering(
    glyph: &mut Glyph,
    reference: usize,
    shift_starting_points: bool,
    settings: &Settings,
) -> Outcome {
    let glyph_name = glyph.name.clone();
    let Some(reference_layer) = glyph.layers.get(reference).cloned() else {
        return Outcome::default();
    };
    if !reference_layer.has_paths() {
        return Outcome::status("Original layer has no paths");
    }
    let reference_paths: Vec<&Path> = reference_layer.paths().collect();
    let reference_coords = OverlapCoords::for_layer(&reference_layer);

    let mut path_count_mismatch = false;
    let mut no_match = false;
    let mut plans: Vec<(usize, Arrangement)> = Vec::new();

    for (index, layer) in glyph.active_layers() {
        if index == reference || !layer.has_paths() {
            continue;
        }
        if layer.path_count() != reference_paths.len() {
            tracing::debug!(glyph = %glyph_name, layer = %layer.name, "path count differs");
            path_count_mismatch = true;
            continue;
        }
        if reference_paths.len() > LARGE_PATH_COUNT {
            tracing::warn!(
                glyph = %glyph_name,
                paths = reference_paths.len(),
                "searching path permutations; this may take a while"
            );
        }

        let sibling: Vec<&Path> = layer.paths().collect();
        let coords = OverlapCoords::for_layer(layer);
        let search = PermutationSearch::new(
            &reference_paths,
            &sibling,
            &reference_coords,
            &coords,
            settings,
            shift_starting_points,
        );
        match search.run() {
            Some(arrangement) => {
                tracing::debug!(
                    glyph = %glyph_name,
                    layer = %layer.name,
                    ?arrangement,
                    "found arrangement"
                );
                plans.push((index, arrangement));
            }
            None => {
                tracing::debug!(
                    glyph = %glyph_name,
                    layer = %layer.name,
                    "no compatible arrangement"
                );
                no_match = true;
            }
        }
    }

    if path_count_mismatch || no_match {
        return Outcome::status(format!("{glyph_name}: Reordering failed")).with_warning(
            Incompatibility::Reordering {
                glyph: glyph_name,
                path_count: path_count_mismatch,
                no_match,
            },
        );
    }

    let mut reordered = false;
    for (index, arrangement) in &plans {
        if arrangement_changes_layer(arrangement) {
            apply_arrangement(&mut glyph.layers[*index], arrangement);
            reordered = true;
        }
    }

    if !reordered {
        Outcome::status(format!("{glyph_name}: No changes made"))
    } else if shift_starting_points {
        Outcome::status(format!(
            "{glyph_name}: Reordered paths and/or starting points"
        ))
    } else {
        Outcome::status(format!("{glyph_name}: Reordered paths"))
    }
}
