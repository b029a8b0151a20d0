use crate::math::{Extrema, GeometryHelper, StatsHelper};
use crate::prelude::{BoundsMode, ProcessingStage, StageConfig, StageError, StageResult};
use crate::sketch_interface::{
    NormalizationStats, NormalizedSketch, PointRecord, SketchRecord, StrokeRecord,
};
use crate::telemetry::log::LogManager;

/// Normalization stage: rescales a sketch so its closest consecutive samples
/// sit `target_pixel_gap` pixels apart.
pub struct NormalizeStage {
    config: Option<StageConfig>,
    logger: LogManager,
}

impl NormalizeStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("normalize"),
        }
    }
}

impl Default for NormalizeStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounding-box extrema of a sketch under the given bounds mode.
pub fn sketch_extrema(sketch: &SketchRecord, mode: BoundsMode) -> Extrema {
    let mut extrema = Extrema::new();
    for stroke in &sketch.strokes {
        match mode {
            BoundsMode::Corrected => stroke.points.iter().for_each(|p| extrema.include(p)),
            BoundsMode::Legacy => {
                if let Some((last, body)) = stroke.points.split_last() {
                    body.iter().for_each(|p| extrema.include(p));
                    // Stale index: the stored value comes from the point before.
                    let source = body.last().unwrap_or(last);
                    extrema.include_from(last, source);
                }
            }
        }
    }
    extrema
}

/// Smallest nonzero distance between temporally adjacent samples.
pub fn min_distance(sketch: &SketchRecord) -> Option<f64> {
    StatsHelper::min_positive(
        sketch
            .strokes
            .iter()
            .flat_map(|stroke| GeometryHelper::consecutive_distances(&stroke.points)),
    )
}

/// Derives the scale and the rescaled extrema for one sketch.
pub fn derive_stats(
    sketch: &SketchRecord,
    target_pixel_gap: f64,
    mode: BoundsMode,
) -> StageResult<NormalizationStats> {
    let min_distance = min_distance(sketch).ok_or(StageError::DegenerateSketch {
        points: sketch.point_count(),
    })?;
    let extrema = sketch_extrema(sketch, mode);
    let scale = target_pixel_gap / min_distance;

    // Extrema are scaled once here, never recomputed from scaled points.
    Ok(NormalizationStats {
        min_x: extrema.min_x * scale,
        min_y: extrema.min_y * scale,
        max_x: extrema.max_x,
        max_y: extrema.max_y * scale,
        min_distance,
        scale,
    })
}

/// Maps one raw sample into canonical pixel space.
///
/// `stats.min_y` is not part of the y formula; the y axis is flipped
/// against `max_y` only.
pub fn to_canvas(point: &PointRecord, stats: &NormalizationStats, offset: f64) -> PointRecord {
    let x = ((point.x * stats.scale).abs() - stats.min_x.abs()).abs() + offset;
    let y = (stats.max_y.abs() - (point.y * stats.scale).abs()).abs() + offset;
    PointRecord::new(point.time, x, y)
}

impl ProcessingStage for NormalizeStage {
    type Input = SketchRecord;
    type Output = NormalizedSketch;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        if !(config.target_pixel_gap.is_finite() && config.target_pixel_gap > 0.0) {
            return Err(StageError::InvalidInput(format!(
                "target pixel gap must be positive, got {}",
                config.target_pixel_gap
            )));
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let stats = derive_stats(&input, config.target_pixel_gap, config.bounds_mode)?;
        let strokes = input
            .strokes
            .iter()
            .map(|stroke| {
                StrokeRecord::new(
                    stroke
                        .points
                        .iter()
                        .map(|point| to_canvas(point, &stats, config.output_offset))
                        .collect(),
                )
            })
            .collect();

        self.logger.record(&format!(
            "min distance {:.6}, scale {:.6}, {} points",
            stats.min_distance,
            stats.scale,
            input.point_count()
        ));

        Ok(NormalizedSketch {
            sketch: SketchRecord::new(strokes),
            stats,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
