use crate::workflow::config::{InputKind, WorkflowConfig};
use anyhow::Context;
use log::warn;
use sketchcore::prelude::{ProcessingStage, StageError};
use sketchcore::processing::{AssembleStage, EmitRequest, EmitStage, ExtractStage, NormalizeStage};
use sketchcore::sketch_interface::Notation;
use sketchcore::telemetry::{MetricsRecorder, RunSummary};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

pub struct WorkflowResult {
    pub summary: RunSummary,
    pub documents: Vec<PathBuf>,
    /// Discovery indexes of sketches that produced no document.
    pub skipped: Vec<usize>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Runs the workflow on the configured input file.
    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let path = self
            .config
            .input
            .as_ref()
            .context("no input path configured")?;

        match self.config.input_kind {
            InputKind::Dump => {
                let file = File::open(path)
                    .with_context(|| format!("opening dump {}", path.display()))?;
                self.execute_dump(Box::new(BufReader::new(file)))
            }
            InputKind::Notation => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading notation {}", path.display()))?;
                self.execute_notation(Notation::from(text), MetricsRecorder::new())
            }
        }
    }

    /// Runs extraction and the rest of the workflow on an in-memory dump.
    pub fn execute_dump(&self, dump: Box<dyn BufRead>) -> anyhow::Result<WorkflowResult> {
        let stage_config = self.config.to_stage_config();
        let mut metrics = MetricsRecorder::new();

        let mut extract_stage = ExtractStage::new();
        extract_stage
            .initialize(&stage_config)
            .context("initializing extract stage")?;
        let extraction = extract_stage
            .execute(dump)
            .context("executing extract stage")?;
        extract_stage.cleanup();
        metrics.record_extraction(extraction.points, extraction.skipped_values);

        if let Some(path) = &self.config.notation_out {
            fs::write(path, extraction.notation.as_str())
                .with_context(|| format!("writing notation {}", path.display()))?;
        }

        self.execute_notation(extraction.notation, metrics)
    }

    /// Assembles, normalizes and emits every sketch in `notation`.
    pub fn execute_notation(
        &self,
        notation: Notation,
        mut metrics: MetricsRecorder,
    ) -> anyhow::Result<WorkflowResult> {
        let stage_config = self.config.to_stage_config();

        let mut assemble_stage = AssembleStage::new();
        assemble_stage
            .initialize(&stage_config)
            .context("initializing assemble stage")?;
        let assembly = assemble_stage
            .execute(notation)
            .context("executing assemble stage")?;
        assemble_stage.cleanup();
        metrics.record_dropped_strokes(assembly.dropped_strokes);

        let mut normalize_stage = NormalizeStage::new();
        normalize_stage
            .initialize(&stage_config)
            .context("initializing normalize stage")?;
        let mut emit_stage = EmitStage::new();
        emit_stage.initialize(&stage_config).with_context(|| {
            format!(
                "creating output directory {}",
                stage_config.output_dir.display()
            )
        })?;

        let mut documents = Vec::new();
        let mut skipped = Vec::new();
        for (index, sketch) in assembly.sketches.into_iter().enumerate() {
            let normalized = match normalize_stage.execute(sketch) {
                Ok(normalized) => normalized,
                Err(err @ StageError::DegenerateSketch { .. }) => {
                    warn!("sketch {} skipped: {}", index, err);
                    metrics.record_skipped();
                    skipped.push(index);
                    continue;
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("normalizing sketch {}", index))
                }
            };

            let path = emit_stage
                .execute(EmitRequest {
                    index,
                    sketch: normalized,
                })
                .with_context(|| format!("emitting sketch {}", index))?;
            metrics.record_emitted();
            documents.push(path);
        }
        normalize_stage.cleanup();
        emit_stage.cleanup();

        Ok(WorkflowResult {
            summary: metrics.snapshot(),
            documents,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::dump::{build_dump_from_config, GeneratorConfig};
    use sketchcore::prelude::StageConfig;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> WorkflowConfig {
        let stage = StageConfig {
            output_dir: dir.join("xml"),
            ..StageConfig::default()
        };
        WorkflowConfig::from_args(None, InputKind::Dump, None, stage)
    }

    #[test]
    fn runner_converts_generated_dump() {
        let dir = tempdir().unwrap();
        let generator = GeneratorConfig {
            sketches: 2,
            strokes_per_sketch: 3,
            points_per_stroke: 5,
            ..Default::default()
        };
        let dump = build_dump_from_config(&generator).unwrap();

        let runner = Runner::new(config_in(dir.path()));
        let result = runner.execute_dump(Box::new(Cursor::new(dump))).unwrap();

        assert_eq!(result.summary.points_extracted, 30);
        assert_eq!(result.summary.values_skipped, 0);
        assert_eq!(result.summary.sketches_emitted, 2);
        assert_eq!(
            result.documents,
            vec![
                dir.path().join("xml").join("Sketch0.xml"),
                dir.path().join("xml").join("Sketch1.xml"),
            ]
        );

        let text = fs::read_to_string(&result.documents[1]).unwrap();
        assert_eq!(text.matches("<Stroke ").count(), 3);
        assert_eq!(text.matches("<Point ").count(), 15);
    }

    #[test]
    fn runner_matches_reference_geometry() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(config_in(dir.path()));
        let notation = Notation::from("[{'time':0,'x':0,'y':0},{'time':10,'x':3,'y':4},]\nsketch\n");
        let result = runner
            .execute_notation(notation, MetricsRecorder::new())
            .unwrap();

        let text = fs::read_to_string(&result.documents[0]).unwrap();
        let first = text
            .find("<Point x=\"200.000000\" y=\"201.600000\" t=\"0\"/>")
            .unwrap();
        let second = text
            .find("<Point x=\"201.200000\" y=\"200.000000\" t=\"10\"/>")
            .unwrap();
        assert!(first < second);
        assert_eq!(text.matches("<BeginSketch>").count(), 1);
        assert_eq!(text.matches("<Stroke ").count(), 1);
    }

    #[test]
    fn degenerate_sketch_is_skipped_and_indexes_hold() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(config_in(dir.path()));
        let notation = Notation::from(
            "[{'time':0,'x':0,'y':0},{'time':1,'x':1,'y':0},]\nsketch\n\
             [{'time':2,'x':5,'y':5},]\nsketch\n\
             [{'time':3,'x':0,'y':0},{'time':4,'x':0,'y':2},]\nsketch\n",
        );
        let result = runner
            .execute_notation(notation, MetricsRecorder::new())
            .unwrap();

        assert_eq!(result.skipped, vec![1]);
        assert_eq!(result.summary.sketches_emitted, 2);
        assert_eq!(result.summary.sketches_skipped, 1);
        assert!(dir.path().join("xml").join("Sketch0.xml").exists());
        assert!(!dir.path().join("xml").join("Sketch1.xml").exists());
        assert!(dir.path().join("xml").join("Sketch2.xml").exists());
    }

    #[test]
    fn runner_reads_files_and_saves_notation() {
        let dir = tempdir().unwrap();
        let dump_path = dir.path().join("dump.xml");
        let notation_path = dir.path().join("stageOne");
        fs::write(&dump_path, build_dump_from_config(&GeneratorConfig::default()).unwrap())
            .unwrap();

        let mut config = config_in(dir.path());
        config.input = Some(dump_path);
        config.notation_out = Some(notation_path.clone());
        let result = Runner::new(config.clone()).execute().unwrap();
        assert_eq!(result.documents.len(), 3);

        let notation = fs::read_to_string(&notation_path).unwrap();
        assert_eq!(notation.matches("sketch").count(), 3);

        config.input = Some(notation_path);
        config.input_kind = InputKind::Notation;
        config.notation_out = None;
        config.stage.file_prefix = "Replay".into();
        let replay = Runner::new(config).execute().unwrap();
        assert_eq!(replay.documents.len(), 3);
        assert_eq!(
            fs::read_to_string(&result.documents[0]).unwrap(),
            fs::read_to_string(&replay.documents[0]).unwrap()
        );
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.input = Some(dir.path().join("absent.xml"));
        let err = Runner::new(config).execute().err().unwrap();
        assert!(format!("{err:#}").contains("opening dump"));
    }
}
