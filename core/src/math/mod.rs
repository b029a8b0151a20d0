pub mod geometry;
pub mod stats;

pub use geometry::{Extrema, GeometryHelper};
pub use stats::StatsHelper;
