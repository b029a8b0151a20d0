use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a stroke's final point contributes to the sketch bounding box.
///
/// The legacy converter updated the extrema for the last point of every
/// stroke using the loop index of the previous iteration, so the value it
/// stored came from the second-to-last point. `Legacy` reproduces that
/// geometry bit for bit; `Corrected` uses the last point itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoundsMode {
    #[default]
    Corrected,
    Legacy,
}

/// Text markers recognized in the serialized object dump.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MarkerSet {
    pub object_open: String,
    pub object_close: String,
    pub stroke_class: String,
    pub stroke_finished: String,
    pub sketch_finished: String,
    pub property_close: String,
    pub property_x: String,
    pub property_y: String,
    pub property_time: String,
    pub coordinate_tag: String,
    pub time_tag: String,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            object_open: "<object".into(),
            object_close: "</object>".into(),
            stroke_class: "org.ladder.core.sketch.Stroke".into(),
            stroke_finished: "info.sift.dg.ca.datamodel.StrokeFinished".into(),
            sketch_finished: "SketchSegmentFinished".into(),
            property_close: "</void>".into(),
            property_x: "<void property=\"x\">".into(),
            property_y: "<void property=\"y\">".into(),
            property_time: "<void property=\"time\">".into(),
            coordinate_tag: "double".into(),
            time_tag: "long".into(),
        }
    }
}

/// Shared configuration for each processing stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StageConfig {
    /// Desired on-screen gap, in pixels, between the two closest samples.
    pub target_pixel_gap: f64,
    /// Translation added to every rescaled coordinate.
    pub output_offset: f64,
    pub bounds_mode: BoundsMode,
    pub markers: MarkerSet,
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            target_pixel_gap: 2.0,
            output_offset: 200.0,
            bounds_mode: BoundsMode::default(),
            markers: MarkerSet::default(),
            output_dir: PathBuf::from("."),
            file_prefix: "Sketch".into(),
        }
    }
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record list: {0}")]
    MalformedRecord(String),
    #[error("degenerate sketch: no nonzero inter-point distance among {points} points")]
    DegenerateSketch { points: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing the conversion pipeline stages.
pub trait ProcessingStage {
    type Input;
    type Output;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()>;
    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output>;
    fn cleanup(&mut self);
}
