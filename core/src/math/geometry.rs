use crate::sketch_interface::PointRecord;

pub struct GeometryHelper;

impl GeometryHelper {
    /// Euclidean distance between two samples.
    pub fn distance(a: &PointRecord, b: &PointRecord) -> f64 {
        ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
    }

    /// Distances between temporally adjacent samples of one stroke.
    pub fn consecutive_distances(points: &[PointRecord]) -> impl Iterator<Item = f64> + '_ {
        points
            .windows(2)
            .map(|pair| Self::distance(&pair[0], &pair[1]))
    }
}

/// Running axis-aligned extrema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrema {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Extrema {
    fn default() -> Self {
        Self::new()
    }
}

impl Extrema {
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn include(&mut self, point: &PointRecord) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    /// Tests `probe` against each bound, but stores the matching coordinate
    /// of `source` when `probe` would extend it.
    pub fn include_from(&mut self, probe: &PointRecord, source: &PointRecord) {
        if probe.x < self.min_x {
            self.min_x = source.x;
        }
        if probe.x > self.max_x {
            self.max_x = source.x;
        }
        if probe.y < self.min_y {
            self.min_y = source.y;
        }
        if probe.y > self.max_y {
            self.max_y = source.y;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_of_three_four_triangle_is_five() {
        let a = PointRecord::new(0, 0.0, 0.0);
        let b = PointRecord::new(10, 3.0, 4.0);
        assert_eq!(GeometryHelper::distance(&a, &b), 5.0);
    }

    #[test]
    fn single_point_has_no_consecutive_distance() {
        let points = [PointRecord::new(0, 1.0, 1.0)];
        assert_eq!(GeometryHelper::consecutive_distances(&points).count(), 0);
    }

    #[test]
    fn include_from_stores_source_coordinate() {
        let mut extrema = Extrema::new();
        extrema.include(&PointRecord::new(0, 0.0, 0.0));
        extrema.include_from(&PointRecord::new(2, 3.0, 4.0), &PointRecord::new(1, 1.0, 2.0));
        assert_eq!(extrema.max_x, 1.0);
        assert_eq!(extrema.max_y, 2.0);
        assert_eq!(extrema.min_y, 0.0);
    }
}
