//! Stroke extraction and normalization core for legacy sketch dumps.
//!
//! A serialized object-graph dump is scanned into a compact record-list
//! notation, regrouped into sketches, rescaled into canonical pixel space,
//! and written out as one fixed-schema XML document per sketch.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod sketch_interface;
pub mod telemetry;

pub use prelude::{BoundsMode, MarkerSet, ProcessingStage, StageConfig, StageError, StageResult};
