use serde::{Deserialize, Serialize};

/// One recorded pen sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PointRecord {
    pub time: i64,
    pub x: f64,
    pub y: f64,
}

impl PointRecord {
    pub fn new(time: i64, x: f64, y: f64) -> Self {
        Self { time, x, y }
    }
}

/// One continuous pen-down gesture, points in capture order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct StrokeRecord {
    pub points: Vec<PointRecord>,
}

impl StrokeRecord {
    pub fn new(points: Vec<PointRecord>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A full drawing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SketchRecord {
    pub strokes: Vec<StrokeRecord>,
}

impl SketchRecord {
    pub fn new(strokes: Vec<StrokeRecord>) -> Self {
        Self { strokes }
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(StrokeRecord::len).sum()
    }

    pub fn points(&self) -> impl Iterator<Item = &PointRecord> {
        self.strokes.iter().flat_map(|stroke| stroke.points.iter())
    }
}

/// Per-sketch scale derivation.
///
/// `min_x`, `min_y` and `max_y` are stored after multiplication by `scale`.
/// `max_x` is kept for diagnostics and stays in raw units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NormalizationStats {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub min_distance: f64,
    pub scale: f64,
}

/// A sketch rescaled into canonical pixel coordinates, with the stats used.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSketch {
    pub sketch: SketchRecord,
    pub stats: NormalizationStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sketch_counts_points_across_strokes() {
        let sketch = SketchRecord::new(vec![
            StrokeRecord::new(vec![PointRecord::new(0, 0.0, 0.0)]),
            StrokeRecord::new(vec![
                PointRecord::new(1, 1.0, 1.0),
                PointRecord::new(2, 2.0, 2.0),
            ]),
        ]);
        assert_eq!(sketch.point_count(), 3);
        assert_eq!(sketch.points().last().map(|p| p.time), Some(2));
    }

    #[test]
    fn point_record_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<PointRecord>(r#"{"time":1,"x":1.0,"y":2.0,"z":3.0}"#);
        assert!(parsed.is_err());
    }
}
