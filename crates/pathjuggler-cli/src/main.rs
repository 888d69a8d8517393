mod error;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pathjuggler_compat::{run_batch, Command, Selection, Settings};
use pathjuggler_core::Font;
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, ErrorCode};

#[derive(Parser)]
#[command(name = "pathjuggler", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,

    /// Log decisions (debug level) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Check that all active layers of each glyph are directionally compatible
    CheckDirection(RunArgs),
    /// Check that paths appear in the same arrangement in every active layer
    CheckOrdering(RunArgs),
    /// Move the start of every path to its bottom-left node
    SetStartingPoints {
        /// Process every layer, backups included, instead of only the selected one
        #[arg(long)]
        all_layers: bool,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Rotate starting points of the other layers to match the selected layer
    ReestablishStartingPoints(RunArgs),
    /// Make outer paths counter-clockwise and counters clockwise
    CorrectDirection {
        /// Process every layer, backups included, instead of only the selected one
        #[arg(long)]
        all_layers: bool,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Reorder the paths of the other layers to match the selected layer
    CorrectOrdering {
        /// Allow moving starting points while searching for a matching order
        #[arg(long)]
        shift_starting_points: bool,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Correct direction and starting points on all layers, then reorder paths
    RunAll(RunArgs),
}

impl CliCommand {
    fn split(&self) -> (Command, &RunArgs) {
        match self {
            CliCommand::CheckDirection(run) => (Command::CheckDirectionalCompatibility, run),
            CliCommand::CheckOrdering(run) => (Command::CheckPathOrdering, run),
            CliCommand::SetStartingPoints { all_layers, run } => (
                Command::SetStartingPoints {
                    all_layers: *all_layers,
                },
                run,
            ),
            CliCommand::ReestablishStartingPoints(run) => (Command::ReestablishStartingPoints, run),
            CliCommand::CorrectDirection { all_layers, run } => (
                Command::CorrectPathDirection {
                    all_layers: *all_layers,
                },
                run,
            ),
            CliCommand::CorrectOrdering {
                shift_starting_points,
                run,
            } => (
                Command::CorrectPathOrdering {
                    shift_starting_points: *shift_starting_points,
                },
                run,
            ),
            CliCommand::RunAll(run) => (Command::RunAllCorrections, run),
        }
    }
}

#[derive(Args)]
struct RunArgs {
    /// Glyph file (YAML or JSON)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Glyph to process; repeat for several, all glyphs when omitted
    #[arg(long = "glyph", value_name = "NAME")]
    glyphs: Vec<String>,

    /// Reference layer; defaults to each glyph's first master
    #[arg(long, value_name = "NAME")]
    layer: Option<String>,

    /// Write the processed glyphs to this file (YAML or JSON by extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Settings file (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Angle tolerance in degrees
    #[arg(long)]
    tolerance: Option<f64>,

    /// Angle tolerance in degrees when a segment is horizontal
    #[arg(long)]
    horizontal_tolerance: Option<f64>,

    /// Consecutive mismatching segments allowed per path
    #[arg(long)]
    max_mismatches: Option<u32>,

    /// Selections larger than this only report progress and warnings
    #[arg(long)]
    suppress_output: Option<usize>,

    /// Compare short segments inside overlaps too
    #[arg(long)]
    no_ignore_overlap: bool,

    /// Compare 16-way compass buckets instead of angles
    #[arg(long)]
    use_compass: bool,

    /// Skip segments at consistent corners
    #[arg(long)]
    ignore_corners: bool,

    /// Exit with status 4 when any warning was reported
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ErrorCode::Usage.into()
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            err.code.into()
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let (command, args) = cli.command.split();
    let settings = resolve_settings(args)?;
    let mut font =
        read_font(&args.input).map_err(|err| CliError::input(format!("{err:#}")))?;
    tracing::debug!(input = %args.input.display(), glyphs = font.glyphs.len(), "loaded glyphs");

    let selection = Selection {
        glyphs: args.glyphs.clone(),
        layer: args.layer.clone(),
    };
    let report = match run_batch(&mut font, &selection, command, &settings) {
        Ok(report) => report,
        Err(abort) => {
            print!("{}", abort.report.render());
            return Err(CliError::processing(abort.to_string()));
        }
    };
    print!("{}", report.render());

    if let Some(output) = &args.output {
        if !command.modifies() {
            tracing::warn!(command = command.title(), "command does not change glyphs");
        }
        write_font(&font, output).map_err(|err| CliError::processing(format!("{err:#}")))?;
        tracing::info!(output = %output.display(), "wrote glyphs");
    }

    if args.strict && report.has_warnings() {
        return Err(CliError::warnings(report.warnings.len()));
    }
    Ok(())
}

/// Defaults, then the settings file, then flags.
fn resolve_settings(args: &RunArgs) -> Result<Settings, CliError> {
    let mut settings = match &args.settings {
        Some(path) => read_settings(path).map_err(|err| CliError::input(format!("{err:#}")))?,
        None => Settings::default(),
    };

    if let Some(tolerance) = args.tolerance {
        settings.tolerance = tolerance;
    }
    if let Some(tolerance) = args.horizontal_tolerance {
        settings.horizontal_tolerance = tolerance;
    }
    if let Some(max) = args.max_mismatches {
        settings.max_mismatches = max;
    }
    if let Some(limit) = args.suppress_output {
        settings.suppress_output = limit;
    }
    if args.no_ignore_overlap {
        settings.ignore_overlap = false;
    }
    if args.use_compass {
        settings.use_compass = true;
    }
    if args.ignore_corners {
        settings.ignore_corners = true;
    }

    settings
        .validate()
        .map_err(|err| CliError::usage(err.to_string()))?;
    Ok(settings)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn read_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    let settings = if is_json(path) {
        Settings::from_json_str(&content)
    } else {
        Settings::from_yaml_str(&content)
    };
    settings.with_context(|| format!("Invalid settings file: {}", path.display()))
}

fn read_font(path: &Path) -> Result<Font> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let font = if is_json(path) {
        Font::from_json_str(&content)
    } else {
        Font::from_yaml_str(&content)
    };
    font.with_context(|| format!("Failed to parse glyph data: {}", path.display()))
}

fn write_font(font: &Font, path: &Path) -> Result<()> {
    let content = if is_json(path) {
        font.to_json_string()
    } else {
        font.to_yaml_string()
    }
    .context("Failed to serialize glyph data")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}
