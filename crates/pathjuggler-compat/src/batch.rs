use pathjuggler_core::{Font, Glyph, Layer};
use pathjuggler_geometry::OverlapCoords;
use thiserror::Error;

use crate::checker::{all_paths_directionally_compatible, masters_compatible};
use crate::ordering::{check_path_ordering, correct_path_ordering, OrderingMismatch};
use crate::outcome::{Incompatibility, Outcome};
use crate::settings::Settings;
use crate::starting_point::{reestablish_starting_point_compatibility, set_starting_points};
use crate::winding::correct_path_direction;

const PROGRESS_INTERVAL: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CheckDirectionalCompatibility,
    CheckPathOrdering,
    SetStartingPoints { all_layers: bool },
    ReestablishStartingPoints,
    CorrectPathDirection { all_layers: bool },
    CorrectPathOrdering { shift_starting_points: bool },
    RunAllCorrections,
}

impl Command {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Command::CheckDirectionalCompatibility => "Check paths for directional compatibility",
            Command::CheckPathOrdering => "Check path ordering",
            Command::SetStartingPoints { all_layers: false } => "Set starting points",
            Command::SetStartingPoints { all_layers: true } => "Set starting points for all layers",
            Command::ReestablishStartingPoints => "Reestablish starting point compatibility",
            Command::CorrectPathDirection { all_layers: false } => "Correct (only) path direction",
            Command::CorrectPathDirection { all_layers: true } => {
                "Correct (only) path direction for all layers"
            }
            Command::CorrectPathOrdering {
                shift_starting_points: false,
            } => "Correct path ordering",
            Command::CorrectPathOrdering {
                shift_starting_points: true,
            } => "Correct path ordering, moving starting points if necessary",
            Command::RunAllCorrections => "Run all corrections for all layers",
        }
    }

    fn success_text(self) -> &'static str {
        match self {
            Command::CheckDirectionalCompatibility => {
                "All glyphs in the selection are directionally compatible"
            }
            Command::CheckPathOrdering => {
                "All glyphs in the selection have paths in the same order"
            }
            _ => "Command generated no warnings.",
        }
    }

    /// Whether the command can change glyph data.
    #[must_use]
    pub fn modifies(self) -> bool {
        !matches!(
            self,
            Command::CheckDirectionalCompatibility | Command::CheckPathOrdering
        )
    }
}

/// Glyphs to process and the layer acting as reference ("selected layer") in each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Glyph names in processing order; empty selects every glyph of the font.
    pub glyphs: Vec<String>,
    /// Reference layer name; glyphs without it fall back to their first master layer.
    pub layer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Report text in output order.
    pub lines: Vec<String>,
    pub warnings: Vec<Incompatibility>,
    /// Glyphs fully processed.
    pub glyphs: usize,
}

impl BatchReport {
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("glyph \"{glyph}\" has no master layer")]
    NoMasterLayer { glyph: String },

    #[error("glyph \"{glyph}\" not found")]
    UnknownGlyph { glyph: String },
}

/// A batch stopped by an unexpected error, with everything reported up to that point.
#[derive(Debug, Error)]
#[error("batch aborted: {source}")]
pub struct BatchAbort {
    #[source]
    pub source: BatchError,
    pub report: BatchReport,
}

fn warning_line(warning: &Incompatibility) -> String {
    format!("Warning: {warning}")
}

/// Run `command` over the selected glyphs of `font`.
///
/// Incompatibilities are collected as warnings and never stop the batch. Selections larger
/// than [`Settings::suppress_output`] only report progress and the collected warnings.
pub fn run_batch(
    font: &mut Font,
    selection: &Selection,
    command: Command,
    settings: &Settings,
) -> Result<BatchReport, BatchAbort> {
    let mut report = BatchReport::default();
    report
        .lines
        .push(format!("Running command: {}", command.title()));

    let names: Vec<String> = if selection.glyphs.is_empty() {
        font.glyphs.iter().map(|g| g.name.clone()).collect()
    } else {
        selection.glyphs.clone()
    };
    if names.is_empty() {
        report.lines.push("No glyphs selected".to_string());
        return Ok(report);
    }

    let total = names.len();
    let suppress = total > settings.suppress_output;
    tracing::info!(command = command.title(), glyphs = total, suppress, "running batch");

    for (i, name) in names.iter().enumerate() {
        let Some(glyph) = font.glyphs.iter_mut().find(|g| &g.name == name) else {
            return Err(abort(
                BatchError::UnknownGlyph {
                    glyph: name.clone(),
                },
                report,
            ));
        };
        let outcome = match run_glyph(glyph, selection.layer.as_deref(), command, settings) {
            Ok(outcome) => outcome,
            Err(error) => return Err(abort(error, report)),
        };
        tracing::debug!(glyph = %name, warnings = outcome.warnings.len(), "glyph processed");
        report.glyphs += 1;

        if suppress {
            if (i + 1) % PROGRESS_INTERVAL == 0 {
                report
                    .lines
                    .push(format!("Glyph {} of {total} processed", i + 1));
            }
        } else {
            report.lines.extend(outcome.status);
            report.lines.extend(outcome.warnings.iter().map(warning_line));
        }
        report.warnings.extend(outcome.warnings);
    }

    if !report.has_warnings() {
        report.lines.push(command.success_text().to_string());
    } else if suppress {
        report
            .lines
            .push("Command generated following warnings:".to_string());
        let collected: Vec<String> = report.warnings.iter().map(warning_line).collect();
        report.lines.extend(collected);
    }
    Ok(report)
}

fn abort(error: BatchError, report: BatchReport) -> BatchAbort {
    tracing::error!(%error, processed = report.glyphs, "batch aborted");
    BatchAbort {
        source: error,
        report,
    }
}

fn reference_layer(glyph: &Glyph, layer: Option<&str>) -> Result<usize, BatchError> {
    layer
        .and_then(|name| glyph.layer_index(name))
        .or_else(|| glyph.first_master_index())
        .ok_or_else(|| BatchError::NoMasterLayer {
            glyph: glyph.name.clone(),
        })
}

fn layers_outcome(layers: &mut [Layer], f: impl Fn(&mut Layer) -> Outcome) -> Outcome {
    let mut outcome = Outcome::default();
    for layer in layers {
        outcome.merge(f(layer));
    }
    outcome
}

fn run_glyph(
    glyph: &mut Glyph,
    layer: Option<&str>,
    command: Command,
    settings: &Settings,
) -> Result<Outcome, BatchError> {
    if !glyph.has_paths_in_active_layers() {
        return Ok(Outcome::status(format!(
            "{}: does not contain any paths in active layers",
            glyph.name
        )));
    }
    let name = glyph.name.clone();

    let outcome = match command {
        Command::CheckDirectionalCompatibility => {
            if masters_compatible(glyph) {
                check_directional_compatibility(glyph, settings)
            } else {
                Outcome::warning(Incompatibility::MastersIncompatible { glyph: name })
            }
        }
        Command::CheckPathOrdering => {
            let reference = reference_layer(glyph, layer)?;
            if !masters_compatible(glyph) {
                Outcome::warning(Incompatibility::MastersIncompatible { glyph: name })
            } else {
                match check_path_ordering(glyph, reference, settings) {
                    Ok(()) => Outcome::status(format!("{name}: has paths in the same order")),
                    Err(OrderingMismatch::Undefined { path }) => {
                        Outcome::warning(Incompatibility::UndefinedCentre {
                            glyph: name,
                            path: path + 1,
                        })
                    }
                    Err(_) => Outcome::warning(Incompatibility::PathsSwitched { glyph: name }),
                }
            }
        }
        Command::SetStartingPoints { all_layers: true } => {
            layers_outcome(&mut glyph.layers, set_starting_points)
        }
        Command::SetStartingPoints { all_layers: false } => {
            let reference = reference_layer(glyph, layer)?;
            set_starting_points(&mut glyph.layers[reference])
        }
        Command::ReestablishStartingPoints => {
            let reference = reference_layer(glyph, layer)?;
            reestablish_starting_point_compatibility(glyph, reference, settings)
        }
        Command::CorrectPathDirection { all_layers: true } => {
            layers_outcome(&mut glyph.layers, correct_path_direction)
        }
        Command::CorrectPathDirection { all_layers: false } => {
            let reference = reference_layer(glyph, layer)?;
            correct_path_direction(&mut glyph.layers[reference])
        }
        Command::CorrectPathOrdering {
            shift_starting_points,
        } => {
            let reference = reference_layer(glyph, layer)?;
            correct_path_ordering(glyph, reference, shift_starting_points, settings)
        }
        Command::RunAllCorrections => {
            let reference = reference_layer(glyph, layer)?;
            let mut outcome = Outcome::status(format!("Processing glyph {name}"));
            for layer in &mut glyph.layers {
                outcome.merge(correct_path_direction(layer));
                outcome.merge(set_starting_points(layer));
            }
            outcome.merge(correct_path_ordering(glyph, reference, true, settings));
            outcome
        }
    };
    Ok(outcome)
}

/// Every ordered pair of active layers must be directionally compatible.
fn check_directional_compatibility(glyph: &Glyph, settings: &Settings) -> Outcome {
    let active: Vec<(&Layer, OverlapCoords)> = glyph
        .active_layers()
        .map(|(_, layer)| (layer, OverlapCoords::for_layer(layer)))
        .collect();

    let compatible = active.iter().enumerate().all(|(i, (source, source_coords))| {
        active
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .all(|(_, (target, target_coords))| {
                all_paths_directionally_compatible(
                    source,
                    target,
                    source_coords,
                    target_coords,
                    settings,
                )
            })
    });

    if compatible {
        Outcome::status(format!("{}: is directionally compatible", glyph.name))
    } else {
        Outcome::warning(Incompatibility::NotDirectionallyCompatible {
            glyph: glyph.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathjuggler_core::{LayerKind, Path};

    fn square(x: f64) -> Path {
        Path::polygon(&[(x, 0.0), (x + 50.0, 0.0), (x + 50.0, 50.0), (x, 50.0)])
    }

    fn reversed(mut path: Path) -> Path {
        path.reverse();
        path
    }

    fn two_masters(name: &str, light: Vec<Path>, bold: Vec<Path>) -> Glyph {
        Glyph::new(
            name,
            vec![
                Layer::with_paths("Light", LayerKind::Master, light),
                Layer::with_paths("Bold", LayerKind::Master, bold),
            ],
        )
    }

    fn font(glyphs: Vec<Glyph>) -> Font {
        Font { glyphs }
    }

    #[test]
    fn reports_directional_compatibility_per_glyph() {
        let mut f = font(vec![
            two_masters("a", vec![square(0.0)], vec![square(0.0)]),
            two_masters("b", vec![square(0.0)], vec![reversed(square(0.0))]),
            two_masters("c", vec![square(0.0)], vec![square(0.0), square(100.0)]),
        ]);
        let report = run_batch(
            &mut f,
            &Selection::default(),
            Command::CheckDirectionalCompatibility,
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(
            report.lines,
            vec![
                "Running command: Check paths for directional compatibility",
                "a: is directionally compatible",
                "Warning: b: has compatible masters, but they are not directionally compatible",
                "Warning: c: does not have compatible masters",
            ]
        );
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.glyphs, 3);
    }

    #[test]
    fn clean_run_ends_with_success_text() {
        let mut f = font(vec![two_masters("a", vec![square(0.0)], vec![square(0.0)])]);
        let report = run_batch(
            &mut f,
            &Selection::default(),
            Command::CheckPathOrdering,
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(
            report.lines.last().map(String::as_str),
            Some("All glyphs in the selection have paths in the same order")
        );
        assert!(report.lines.contains(&"a: has paths in the same order".to_string()));
    }

    #[test]
    fn glyph_without_paths_is_noted() {
        let mut f = font(vec![Glyph::new(
            "space",
            vec![Layer::new("Light", LayerKind::Master)],
        )]);
        let report = run_batch(
            &mut f,
            &Selection::default(),
            Command::RunAllCorrections,
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(
            report.lines[1],
            "space: does not contain any paths in active layers"
        );
    }

    #[test]
    fn large_selections_only_report_progress_and_warnings() {
        let mut glyphs: Vec<Glyph> = (0..12)
            .map(|i| two_masters(&format!("g{i}"), vec![square(0.0)], vec![square(0.0)]))
            .collect();
        glyphs.push(two_masters(
            "bad",
            vec![square(0.0)],
            vec![reversed(square(0.0))],
        ));
        let mut f = font(glyphs);
        let settings = Settings {
            suppress_output: 5,
            ..Settings::default()
        };
        let report = run_batch(
            &mut f,
            &Selection::default(),
            Command::CheckDirectionalCompatibility,
            &settings,
        )
        .unwrap();
        assert_eq!(
            report.lines,
            vec![
                "Running command: Check paths for directional compatibility",
                "Glyph 10 of 13 processed",
                "Command generated following warnings:",
                "Warning: bad: has compatible masters, but they are not directionally compatible",
            ]
        );
    }

    #[test]
    fn missing_master_aborts_with_partial_report() {
        let mut f = font(vec![
            two_masters("a", vec![square(0.0)], vec![square(0.0)]),
            Glyph::new(
                "b",
                vec![Layer::with_paths("Light [100]", LayerKind::Bracket, vec![square(0.0)])],
            ),
            two_masters("c", vec![square(0.0)], vec![square(0.0)]),
        ]);
        let abort = run_batch(
            &mut f,
            &Selection::default(),
            Command::CorrectPathOrdering {
                shift_starting_points: false,
            },
            &Settings::default(),
        )
        .unwrap_err();
        assert!(matches!(abort.source, BatchError::NoMasterLayer { ref glyph } if glyph == "b"));
        assert_eq!(abort.report.glyphs, 1);
        assert_eq!(abort.report.lines.last().unwrap(), "a: No changes made");
    }

    #[test]
    fn unknown_glyph_aborts() {
        let mut f = font(vec![two_masters("a", vec![square(0.0)], vec![square(0.0)])]);
        let selection = Selection {
            glyphs: vec!["zz".into()],
            layer: None,
        };
        let abort = run_batch(
            &mut f,
            &selection,
            Command::CheckPathOrdering,
            &Settings::default(),
        )
        .unwrap_err();
        assert!(matches!(abort.source, BatchError::UnknownGlyph { .. }));
    }

    #[test]
    fn selected_layer_is_the_reference() {
        let mut f = font(vec![two_masters(
            "a",
            vec![square(0.0), square(100.0)],
            vec![square(100.0), square(0.0)],
        )]);
        let selection = Selection {
            glyphs: vec!["a".into()],
            layer: Some("Bold".into()),
        };
        run_batch(
            &mut f,
            &selection,
            Command::CorrectPathOrdering {
                shift_starting_points: false,
            },
            &Settings::default(),
        )
        .unwrap();
        let light: Vec<&Path> = f.glyphs[0].layers[0].paths().collect();
        assert_eq!(light, vec![&square(100.0), &square(0.0)]);
    }

    #[test]
    fn run_all_fixes_direction_start_and_order() {
        let mut bold_a = square(0.0);
        bold_a.make_node_first(2);
        let mut f = font(vec![two_masters(
            "o",
            vec![square(0.0), square(100.0)],
            vec![square(100.0), bold_a],
        )]);
        let report = run_batch(
            &mut f,
            &Selection::default(),
            Command::RunAllCorrections,
            &Settings::default(),
        )
        .unwrap();
        assert!(!report.has_warnings());
        assert_eq!(report.lines[1], "Processing glyph o");
        let n = report.lines.len();
        assert_eq!(
            report.lines[n - 2..],
            [
                "o: Reordered paths and/or starting points",
                "Command generated no warnings.",
            ]
        );
        let bold: Vec<&Path> = f.glyphs[0].layers[1].paths().collect();
        assert_eq!(bold, vec![&square(0.0), &square(100.0)]);
    }
}
