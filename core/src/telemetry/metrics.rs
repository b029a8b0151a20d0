use serde::Serialize;

/// Counters accumulated over one conversion run.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    inner: RunSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub points_extracted: usize,
    pub values_skipped: usize,
    pub strokes_dropped: usize,
    pub sketches_emitted: usize,
    pub sketches_skipped: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_extraction(&mut self, points: usize, skipped_values: usize) {
        self.inner.points_extracted += points;
        self.inner.values_skipped += skipped_values;
    }

    pub fn record_dropped_strokes(&mut self, count: usize) {
        self.inner.strokes_dropped += count;
    }

    pub fn record_emitted(&mut self) {
        self.inner.sketches_emitted += 1;
    }

    pub fn record_skipped(&mut self) {
        self.inner.sketches_skipped += 1;
    }

    pub fn snapshot(&self) -> RunSummary {
        self.inner
    }
}
