pub mod notation;
pub mod records;

pub use notation::{Fragment, Notation};
pub use records::{NormalizationStats, NormalizedSketch, PointRecord, SketchRecord, StrokeRecord};
