//! Simlabel: KITTI-style object labels from a simulated camera.
//!
//! Given a camera pose and calibration, the frame's depth buffer, and the
//! poses and bounding boxes of the agents in the scene, simlabel projects
//! each agent's 3D box into the image, decides how much of it is actually
//! visible, and emits a 2D/3D training label for the agents that pass.
//!
//! # Modules
//!
//! - [`geom`]: Pixel-space and simulator-space geometry types
//! - [`sensor`]: Camera model and depth buffers
//! - [`agent`]: Agent snapshots and label classes
//! - [`projection`]: World to sensor to image projection of box corners
//! - [`occlusion`]: Per-corner visibility against the depth buffer
//! - [`label`]: Acceptance gates, label assembly and reports
//! - [`kitti`]: KITTI label file writer
//! - [`scene`]: Frame snapshot files
//! - [`config`]: Labeling thresholds
//! - [`overlay`]: Optional debug drawing of classified corners
//! - [`error`]: Error types for simlabel operations

pub mod agent;
pub mod config;
pub mod error;
pub mod geom;
pub mod kitti;
pub mod label;
pub mod occlusion;
pub mod overlay;
pub mod projection;
pub mod scene;
pub mod sensor;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use walkdir::WalkDir;

pub use config::LabelConfig;
pub use error::SimlabelError;
pub use label::{evaluate, evaluate_with_diagnostics, Diagnostics, FrameContext, Label, Outcome};

use label::{FrameReport, LabelingReport};
use occlusion::OcclusionTest;

/// The simlabel CLI application.
#[derive(Parser)]
#[command(name = "simlabel")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Generate KITTI labels from frame snapshots.
    Label(LabelArgs),
    /// Print the effective labeling configuration as YAML.
    Config(ThresholdArgs),
}

/// Config file and per-threshold overrides.
#[derive(clap::Args)]
struct ThresholdArgs {
    /// YAML or JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Corners at or beyond this depth count as outside.
    #[arg(long)]
    max_render_depth: Option<f64>,

    /// Minimum number of visible corners.
    #[arg(long)]
    min_visible: Option<usize>,

    /// Reject boxes with this many or more corners outside the image.
    #[arg(long)]
    max_outside: Option<usize>,

    /// Minimum 2D box area in square pixels.
    #[arg(long)]
    min_area: Option<f64>,

    /// How corners are tested against the depth buffer.
    #[arg(long, value_enum)]
    occlusion: Option<OcclusionTest>,
}

impl ThresholdArgs {
    fn resolve(&self) -> Result<LabelConfig, SimlabelError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => LabelConfig::default(),
        };
        if let Some(depth) = self.max_render_depth {
            config = config.with_max_render_depth(depth);
        }
        if let Some(count) = self.min_visible {
            config = config.with_min_visible_vertices(count);
        }
        if let Some(count) = self.max_outside {
            config = config.with_max_outside_vertices(count);
        }
        if let Some(area) = self.min_area {
            config = config.with_min_bbox_area(area);
        }
        if let Some(test) = self.occlusion {
            config = config.with_occlusion_test(test);
        }
        Ok(config)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the label subcommand.
#[derive(clap::Args)]
struct LabelArgs {
    /// Snapshot file, or a directory searched recursively for `*.json`.
    input: PathBuf,

    #[command(flatten)]
    thresholds: ThresholdArgs,

    /// Write one `<frame>.txt` per snapshot here instead of to stdout.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Summary format.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,

    /// Also write a per-agent CSV report.
    #[arg(long)]
    report_csv: Option<PathBuf>,
}

/// Run the simlabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), SimlabelError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Label(args)) => run_label(args),
        Some(Commands::Config(args)) => run_config(args),
        None => {
            println!("simlabel {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("KITTI-style object labels from simulated camera and depth sensors.");
            println!();
            println!("Run 'simlabel --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // RUST_LOG wins over -v; a logger installed by an embedding program is kept
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

/// Execute the config subcommand.
fn run_config(args: ThresholdArgs) -> Result<(), SimlabelError> {
    let config = args.resolve()?;
    let yaml = serde_yaml::to_string(&config).map_err(|e| SimlabelError::Serialize {
        what: "config",
        message: e.to_string(),
    })?;
    print!("{}", yaml);
    Ok(())
}

/// Execute the label subcommand.
fn run_label(args: LabelArgs) -> Result<(), SimlabelError> {
    let config = args.thresholds.resolve()?;

    if args.input.is_dir() && args.output_dir.is_none() {
        return Err(SimlabelError::InvalidInput(format!(
            "'{}' is a directory; --output-dir is required to label several frames",
            args.input.display()
        )));
    }
    let snapshots = collect_snapshots(&args.input)?;
    log::info!("Labeling {} snapshot(s)", snapshots.len());

    let mut report = LabelingReport::new();
    let mut csv_rows = Vec::new();

    for path in &snapshots {
        let snapshot = scene::read_frame_snapshot(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let camera = snapshot.camera();
        let depth = snapshot.load_depth(base_dir)?;
        let context = FrameContext::new(&camera, &depth, &snapshot.reference)?;

        let diagnostics = context.evaluate_all(&snapshot.agents, &config);
        let labels: Vec<Label> = diagnostics.iter().filter_map(|d| d.label.clone()).collect();
        log::debug!(
            "Frame {}: {} of {} agent(s) labeled",
            snapshot.frame,
            labels.len(),
            snapshot.agents.len()
        );

        match &args.output_dir {
            Some(dir) => {
                let out = dir.join(kitti::label_file_name(snapshot.frame));
                kitti::write_kitti_file(&out, &labels)?;
            }
            None => print!("{}", kitti::to_kitti_string(&labels)),
        }

        report.add(FrameReport::from_diagnostics(snapshot.frame, &diagnostics));
        if args.report_csv.is_some() {
            csv_rows.extend(diagnostics.into_iter().map(|d| (snapshot.frame, d)));
        }
    }

    if let Some(csv_path) = &args.report_csv {
        label::write_report_csv(csv_path, csv_rows.iter().map(|(frame, d)| (*frame, d)))?;
    }

    let summary = match args.report {
        ReportFormat::Text => report.to_string(),
        ReportFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&report).map_err(|e| SimlabelError::Serialize {
                    what: "report",
                    message: e.to_string(),
                })?;
            json.push('\n');
            json
        }
    };
    // stdout carries the labels themselves unless they go to files
    if args.output_dir.is_some() {
        print!("{}", summary);
    } else {
        eprint!("{}", summary);
    }

    Ok(())
}

/// Lists the snapshot files to process, in file-name order.
fn collect_snapshots(input: &Path) -> Result<Vec<PathBuf>, SimlabelError> {
    if !input.is_dir() {
        if !input.exists() {
            return Err(SimlabelError::InvalidInput(format!(
                "'{}' does not exist",
                input.display()
            )));
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let mut snapshots = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let is_json = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if entry.file_type().is_file() && is_json {
            snapshots.push(entry.into_path());
        }
    }

    if snapshots.is_empty() {
        return Err(SimlabelError::InvalidInput(format!(
            "no .json snapshots found under '{}'",
            input.display()
        )));
    }
    Ok(snapshots)
}
