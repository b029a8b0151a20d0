pub mod assembler;
pub mod emitter;
pub mod extractor;
pub mod normalizer;

pub use assembler::{AssembleStage, Assembly};
pub use emitter::{EmitRequest, EmitStage};
pub use extractor::{ExtractStage, Extraction};
pub use normalizer::NormalizeStage;
