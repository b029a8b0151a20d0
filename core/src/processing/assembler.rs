use crate::prelude::{ProcessingStage, StageConfig, StageError, StageResult};
use crate::sketch_interface::notation::{parse_record_list, SKETCH_SEPARATOR, STROKE_SEPARATOR};
use crate::sketch_interface::{Notation, SketchRecord};
use crate::telemetry::log::LogManager;

/// Sketches regrouped from the intermediate notation.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub sketches: Vec<SketchRecord>,
    pub dropped_strokes: usize,
    /// Record lists after the last sketch delimiter; never assembled.
    pub trailing_strokes: usize,
}

/// Assembly stage: intermediate notation in, sketches out.
pub struct AssembleStage {
    config: Option<StageConfig>,
    logger: LogManager,
}

impl AssembleStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("assemble"),
        }
    }

    fn flush(&self, buffer: &mut Vec<String>, assembly: &mut Assembly) {
        let sketch_index = assembly.sketches.len();
        let mut strokes = Vec::with_capacity(buffer.len());
        for literal in buffer.drain(..) {
            match parse_record_list(&literal) {
                Ok(stroke) if stroke.is_empty() => {
                    self.logger.warn(&format!(
                        "sketch {}: empty stroke dropped",
                        sketch_index
                    ));
                    assembly.dropped_strokes += 1;
                }
                Ok(stroke) => strokes.push(stroke),
                Err(err) => {
                    self.logger
                        .warn(&format!("sketch {}: stroke dropped, {}", sketch_index, err));
                    assembly.dropped_strokes += 1;
                }
            }
        }
        assembly.sketches.push(SketchRecord::new(strokes));
    }
}

impl Default for AssembleStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips any stroke separators trailing a record-list line.
fn record_literal(line: &str) -> &str {
    let mut literal = line.trim();
    while let Some(rest) = literal.strip_suffix(STROKE_SEPARATOR) {
        literal = rest.trim_end();
    }
    literal
}

impl ProcessingStage for AssembleStage {
    type Input = Notation;
    type Output = Assembly;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output> {
        if self.config.is_none() {
            return Err(StageError::Internal("stage not initialized".into()));
        }

        let mut assembly = Assembly::default();
        let mut buffer: Vec<String> = Vec::new();

        for line in input.lines() {
            if line.trim() == SKETCH_SEPARATOR {
                self.flush(&mut buffer, &mut assembly);
                continue;
            }
            let literal = record_literal(line);
            if !literal.is_empty() {
                buffer.push(literal.to_string());
            }
        }

        if !buffer.is_empty() {
            self.logger.warn(&format!(
                "{} stroke(s) after the last sketch delimiter discarded",
                buffer.len()
            ));
            assembly.trailing_strokes = buffer.len();
        }

        let strokes: usize = assembly
            .sketches
            .iter()
            .map(|sketch| sketch.strokes.len())
            .sum();
        self.logger.record(&format!(
            "assembled {} sketches, {} strokes, {} dropped",
            assembly.sketches.len(),
            strokes,
            assembly.dropped_strokes
        ));
        Ok(assembly)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch_interface::PointRecord;

    fn assemble(text: &str) -> Assembly {
        let mut stage = AssembleStage::new();
        stage.initialize(&StageConfig::default()).unwrap();
        let assembly = stage.execute(Notation::from(text)).unwrap();
        stage.cleanup();
        assembly
    }

    #[test]
    fn strokes_group_into_one_sketch_per_delimiter() {
        let assembly =
            assemble("[{'time':0,'x':0,'y':0},]--\n[{'time':1,'x':1,'y':1},]--\nsketch\n");
        assert_eq!(assembly.sketches.len(), 1);
        let sketch = &assembly.sketches[0];
        assert_eq!(sketch.strokes.len(), 2);
        assert_eq!(sketch.strokes[1].points, vec![PointRecord::new(1, 1.0, 1.0)]);
    }

    #[test]
    fn extractor_layout_with_blank_and_separator_lines() {
        let assembly = assemble(
            "--\n[{'time':0,'x':0.000000,'y':0.000000},]\n--\n[{'time':4,'x':2.000000,'y':2.000000},]\n\nsketch\n--\n[{'time':9,'x':1.000000,'y':1.000000},]\n\nsketch\n",
        );
        assert_eq!(assembly.sketches.len(), 2);
        assert_eq!(assembly.sketches[0].strokes.len(), 2);
        assert_eq!(assembly.sketches[1].strokes.len(), 1);
        assert_eq!(assembly.dropped_strokes, 0);
    }

    #[test]
    fn malformed_stroke_is_dropped_and_siblings_kept() {
        let assembly = assemble(
            "[{'time':0,'x':0,'y':0},]\n[{'time':1,'x':oops,'y':1},]\n[{'time':2,'x':2,'y':2},]\nsketch\n",
        );
        assert_eq!(assembly.dropped_strokes, 1);
        let times: Vec<i64> = assembly.sketches[0]
            .points()
            .map(|point| point.time)
            .collect();
        assert_eq!(times, vec![0, 2]);
    }

    #[test]
    fn empty_stroke_is_dropped() {
        let assembly = assemble("[]\n[{'time':0,'x':0,'y':0},]\nsketch\n");
        assert_eq!(assembly.dropped_strokes, 1);
        assert_eq!(assembly.sketches[0].strokes.len(), 1);
    }

    #[test]
    fn strokes_after_last_delimiter_are_discarded() {
        let assembly = assemble("[{'time':0,'x':0,'y':0},]\nsketch\n[{'time':1,'x':1,'y':1},]\n");
        assert_eq!(assembly.sketches.len(), 1);
        assert_eq!(assembly.trailing_strokes, 1);
    }

    #[test]
    fn consecutive_delimiters_yield_empty_sketch() {
        let assembly = assemble("sketch\nsketch\n");
        assert_eq!(assembly.sketches.len(), 2);
        assert!(assembly.sketches.iter().all(|s| s.strokes.is_empty()));
    }
}
