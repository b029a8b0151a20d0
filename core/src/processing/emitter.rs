use crate::prelude::{ProcessingStage, StageConfig, StageError, StageResult};
use crate::sketch_interface::NormalizedSketch;
use crate::telemetry::log::LogManager;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One normalized sketch and its position in discovery order.
#[derive(Debug, Clone)]
pub struct EmitRequest {
    pub index: usize,
    pub sketch: NormalizedSketch,
}

/// Emission stage: writes one XML document per sketch.
pub struct EmitStage {
    config: Option<StageConfig>,
    logger: LogManager,
}

impl EmitStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("emit"),
        }
    }

    /// Path of the document for the sketch at `index`.
    pub fn document_path(config: &StageConfig, index: usize) -> PathBuf {
        config
            .output_dir
            .join(format!("{}{}.xml", config.file_prefix, index))
    }

    /// Serializes `sketch` into `out`.
    pub fn write_document<W: Write>(sketch: &NormalizedSketch, out: &mut W) -> StageResult<()> {
        writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(out, "<BeginSketch>")?;
        for stroke in &sketch.sketch.strokes {
            writeln!(out, "<Stroke beautified=\"false\" type=\"-1\">")?;
            for point in &stroke.points {
                writeln!(
                    out,
                    "<Point x=\"{:.6}\" y=\"{:.6}\" t=\"{}\"/>",
                    point.x, point.y, point.time
                )?;
            }
            writeln!(out, "</Stroke>")?;
        }
        writeln!(out, "</BeginSketch>")?;
        Ok(())
    }

    fn write_file(path: &Path, sketch: &NormalizedSketch) -> StageResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        Self::write_document(sketch, &mut out)?;
        out.flush()?;
        Ok(())
    }
}

impl Default for EmitStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for EmitStage {
    type Input = EmitRequest;
    type Output = PathBuf;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        fs::create_dir_all(&config.output_dir)?;
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let path = Self::document_path(config, input.index);
        Self::write_file(&path, &input.sketch)?;
        self.logger.record(&format!(
            "wrote {} ({} strokes)",
            path.display(),
            input.sketch.sketch.strokes.len()
        ));
        Ok(path)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch_interface::{
        NormalizationStats, PointRecord, SketchRecord, StrokeRecord,
    };
    use tempfile::tempdir;

    fn sample() -> NormalizedSketch {
        NormalizedSketch {
            sketch: SketchRecord::new(vec![StrokeRecord::new(vec![
                PointRecord::new(0, 200.0, 201.6),
                PointRecord::new(10, 201.2, 200.0),
            ])]),
            stats: NormalizationStats {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 3.0,
                max_y: 1.6,
                min_distance: 5.0,
                scale: 0.4,
            },
        }
    }

    #[test]
    fn document_follows_fixed_schema() {
        let mut out = Vec::new();
        EmitStage::write_document(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <BeginSketch>\n\
             <Stroke beautified=\"false\" type=\"-1\">\n\
             <Point x=\"200.000000\" y=\"201.600000\" t=\"0\"/>\n\
             <Point x=\"201.200000\" y=\"200.000000\" t=\"10\"/>\n\
             </Stroke>\n\
             </BeginSketch>\n"
        );
    }

    #[test]
    fn execute_writes_prefixed_indexed_file() {
        let dir = tempdir().unwrap();
        let config = StageConfig {
            output_dir: dir.path().join("out"),
            file_prefix: "Sketch".into(),
            ..StageConfig::default()
        };

        let mut stage = EmitStage::new();
        stage.initialize(&config).unwrap();
        let path = stage
            .execute(EmitRequest {
                index: 3,
                sketch: sample(),
            })
            .unwrap();
        stage.cleanup();

        assert_eq!(path, dir.path().join("out").join("Sketch3.xml"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("<Point x=\"201.200000\" y=\"200.000000\" t=\"10\"/>"));
    }
}
