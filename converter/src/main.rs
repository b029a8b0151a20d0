use anyhow::Context;
use clap::Parser;
use generator::dump::{build_dump_from_config, GeneratorConfig};
use sketchcore::prelude::{BoundsMode, StageConfig};
use std::io::Cursor;
use std::path::PathBuf;
use workflow::config::{InputKind, WorkflowConfig};
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert legacy serialized sketch dumps into normalized stroke XML"
)]
struct Args {
    /// Serialized object dump, or intermediate notation with --from-notation
    #[arg(long)]
    input: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Treat the input as intermediate notation and skip extraction
    #[arg(long, default_value_t = false)]
    from_notation: bool,
    /// Save the intermediate notation produced by extraction
    #[arg(long)]
    notation_out: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    #[arg(long, default_value = "Sketch")]
    prefix: String,
    /// Pixel gap the closest consecutive samples are scaled to
    #[arg(long, default_value_t = 2.0)]
    pixel_gap: f64,
    #[arg(long, default_value_t = 200.0)]
    offset: f64,
    /// Reproduce the legacy bounding-box update for each stroke's last point
    #[arg(long, default_value_t = false)]
    legacy_bounds: bool,
    /// Convert a synthetic dump instead of reading an input file
    #[arg(long, default_value_t = false)]
    demo: bool,
    /// Print the run summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Args {
    fn input_kind(&self) -> InputKind {
        if self.from_notation {
            InputKind::Notation
        } else {
            InputKind::Dump
        }
    }

    fn stage_config(&self) -> StageConfig {
        StageConfig {
            target_pixel_gap: self.pixel_gap,
            output_offset: self.offset,
            bounds_mode: if self.legacy_bounds {
                BoundsMode::Legacy
            } else {
                BoundsMode::Corrected
            },
            output_dir: self.output_dir.clone(),
            file_prefix: self.prefix.clone(),
            ..StageConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        let mut config = WorkflowConfig::load(path)?;
        if args.input.is_some() {
            config.input = args.input.clone();
            config.input_kind = args.input_kind();
        }
        if args.notation_out.is_some() {
            config.notation_out = args.notation_out.clone();
        }
        config
    } else {
        WorkflowConfig::from_args(
            args.input.clone(),
            args.input_kind(),
            args.notation_out.clone(),
            args.stage_config(),
        )
    };

    let runner = Runner::new(workflow_config.clone());
    let result = if args.demo {
        let generator = GeneratorConfig {
            markers: workflow_config.stage.markers.clone(),
            ..GeneratorConfig::default()
        };
        let dump = build_dump_from_config(&generator).context("generating demo dump")?;
        runner.execute_dump(Box::new(Cursor::new(dump)))?
    } else {
        runner.execute()?
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.summary).context("serializing run summary")?
        );
    } else {
        let summary = result.summary;
        println!(
            "Converted -> documents {}, skipped sketches {:?}, points {}, skipped values {}, dropped strokes {}",
            result.documents.len(),
            result.skipped,
            summary.points_extracted,
            summary.values_skipped,
            summary.strokes_dropped
        );
    }

    Ok(())
}
