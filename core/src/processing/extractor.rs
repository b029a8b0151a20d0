//! Line-driven extraction of strokes from a serialized object dump.
//!
//! The dump is never parsed as XML. Each line is matched against a fixed
//! marker vocabulary and advances an explicit [`ScanState`], which yields
//! [`Fragment`]s of the intermediate notation.

use crate::prelude::{MarkerSet, ProcessingStage, StageConfig, StageError, StageResult};
use crate::sketch_interface::{Fragment, Notation, PointRecord};
use crate::telemetry::log::LogManager;
use log::{trace, warn};
use std::io::BufRead;

/// Point property currently being captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    X,
    Y,
    Time,
}

/// Position of the scanner relative to stroke objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    InStroke {
        base_depth: usize,
    },
    AwaitField {
        base_depth: usize,
        field: Field,
    },
}

impl Phase {
    fn base_depth(&self) -> Option<usize> {
        match *self {
            Phase::Idle => None,
            Phase::InStroke { base_depth } | Phase::AwaitField { base_depth, .. } => {
                Some(base_depth)
            }
        }
    }
}

/// Fields seen so far for the point under construction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PendingPoint {
    time: Option<i64>,
    x: Option<f64>,
}

impl PendingPoint {
    fn is_empty(&self) -> bool {
        self.time.is_none() && self.x.is_none()
    }
}

/// Scanner state threaded through every line of the dump.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanState {
    depth: usize,
    phase: Phase,
    pending: PendingPoint,
    line_no: usize,
    skipped_values: usize,
}

impl ScanState {
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn skipped_values(&self) -> usize {
        self.skipped_values
    }

    /// Consumes one line and returns the next state, pushing any notation
    /// fragments the line completes onto `out`.
    pub fn advance(mut self, line: &str, markers: &MarkerSet, out: &mut Vec<Fragment>) -> Self {
        self.line_no += 1;
        let opens = line.contains(markers.object_open.as_str());
        let closes = line.contains(markers.object_close.as_str());
        let self_closing = opens && !closes && line.trim_end().ends_with("/>");

        if opens && !self_closing {
            self.depth += 1;
        }

        if closes {
            if self.depth == 0 {
                warn!("line {}: object close without matching open", self.line_no);
            } else {
                if self.phase.base_depth() == Some(self.depth) {
                    self.close_stroke(out);
                }
                self.depth -= 1;
            }
        }

        if line.contains(markers.stroke_class.as_str()) && !self_closing {
            self.open_stroke(out);
        }
        if line.contains(markers.stroke_finished.as_str()) {
            out.push(Fragment::StrokeFinished);
        }
        if line.contains(markers.sketch_finished.as_str()) {
            out.push(Fragment::SketchFinished);
        }

        self.capture(line, markers, out);
        self
    }

    fn open_stroke(&mut self, out: &mut Vec<Fragment>) {
        match self.phase {
            Phase::Idle if self.depth > 0 => {
                self.phase = Phase::InStroke {
                    base_depth: self.depth,
                };
                self.pending = PendingPoint::default();
                out.push(Fragment::OpenStroke);
            }
            Phase::Idle => warn!(
                "line {}: stroke marker outside any object, ignored",
                self.line_no
            ),
            _ => warn!(
                "line {}: stroke marker nested inside an open stroke, ignored",
                self.line_no
            ),
        }
    }

    fn close_stroke(&mut self, out: &mut Vec<Fragment>) {
        if !self.pending.is_empty() {
            warn!(
                "line {}: stroke closed with an incomplete point, dropped",
                self.line_no
            );
            self.skipped_values += 1;
        }
        self.pending = PendingPoint::default();
        self.phase = Phase::Idle;
        out.push(Fragment::CloseStroke);
    }

    fn capture(&mut self, line: &str, markers: &MarkerSet, out: &mut Vec<Fragment>) {
        let base_depth = match self.phase.base_depth() {
            Some(depth) => depth,
            None => return,
        };

        let opened = [
            (markers.property_time.as_str(), Field::Time),
            (markers.property_x.as_str(), Field::X),
            (markers.property_y.as_str(), Field::Y),
        ]
        .into_iter()
        .find_map(|(marker, field)| line.find(marker).map(|at| (at + marker.len(), field)));

        let field = match (opened, self.phase) {
            (Some((_, field)), _) => {
                self.phase = Phase::AwaitField { base_depth, field };
                field
            }
            (None, Phase::AwaitField { .. }) if line.contains(markers.property_close.as_str()) => {
                self.phase = Phase::InStroke { base_depth };
                return;
            }
            (None, Phase::AwaitField { field, .. }) => field,
            (None, _) => return,
        };

        let tag = match field {
            Field::Time => markers.time_tag.as_str(),
            Field::X | Field::Y => markers.coordinate_tag.as_str(),
        };
        if let Some(payload) = payload(line, tag) {
            self.accept(field, payload, out);
        }

        // Single-line properties close on the line that opened them.
        if let Some((after, _)) = opened {
            if line[after..].contains(markers.property_close.as_str()) {
                self.phase = Phase::InStroke { base_depth };
            }
        }
    }

    fn accept(&mut self, field: Field, payload: &str, out: &mut Vec<Fragment>) {
        match field {
            Field::Time => match payload.parse::<i64>() {
                Ok(time) => {
                    if !self.pending.is_empty() {
                        self.drop_pending("time repeated before the point completed");
                    }
                    self.pending.time = Some(time);
                }
                Err(_) => self.skip_value("long", payload),
            },
            Field::X => match parse_coordinate(payload) {
                Some(x) => {
                    if self.pending.x.is_some() {
                        self.drop_pending("x repeated before y");
                    }
                    self.pending.x = Some(x);
                }
                None => self.skip_value("double", payload),
            },
            Field::Y => match parse_coordinate(payload) {
                Some(y) => match self.pending {
                    PendingPoint {
                        time: Some(time),
                        x: Some(x),
                    } => {
                        trace!("line {}: point t={} x={} y={}", self.line_no, time, x, y);
                        out.push(Fragment::Point(PointRecord::new(time, x, y)));
                        self.pending = PendingPoint::default();
                    }
                    _ => {
                        self.skipped_values += 1;
                        self.drop_pending("y without a preceding time and x");
                    }
                },
                None => self.skip_value("double", payload),
            },
        }
    }

    fn skip_value(&mut self, kind: &str, payload: &str) {
        warn!(
            "line {}: malformed {} payload {:?}, skipped",
            self.line_no, kind, payload
        );
        self.skipped_values += 1;
    }

    fn drop_pending(&mut self, reason: &str) {
        warn!("line {}: {}, partial point dropped", self.line_no, reason);
        if !self.pending.is_empty() {
            self.skipped_values += 1;
        }
        self.pending = PendingPoint::default();
    }
}

/// Text enclosed by `<tag>` on this line, up to `</tag>` or the line end.
fn payload<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = line.find(&open)? + open.len();
    let rest = &line[start..];
    let end = rest.find(&close).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

fn parse_coordinate(payload: &str) -> Option<f64> {
    payload.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Result of scanning one dump.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub notation: Notation,
    pub points: usize,
    pub skipped_values: usize,
}

/// Extraction stage: serialized dump lines in, intermediate notation out.
pub struct ExtractStage {
    config: Option<StageConfig>,
    logger: LogManager,
}

impl ExtractStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("extract"),
        }
    }
}

impl Default for ExtractStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for ExtractStage {
    type Input = Box<dyn BufRead>;
    type Output = Extraction;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, mut input: Self::Input) -> StageResult<Self::Output> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let mut state = ScanState::default();
        let mut fragments = Vec::new();
        let mut extraction = Extraction::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            state = state.advance(&line, &config.markers, &mut fragments);
            for fragment in fragments.drain(..) {
                if matches!(fragment, Fragment::Point(_)) {
                    extraction.points += 1;
                }
                extraction.notation.push(&fragment);
            }
        }

        if state.phase() != Phase::Idle {
            self.logger
                .warn("input ended inside an open stroke; its points stay unterminated");
        }
        extraction.skipped_values = state.skipped_values();
        self.logger.record(&format!(
            "scanned {} lines, {} points, {} skipped values",
            state.line_no, extraction.points, extraction.skipped_values
        ));
        Ok(extraction)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
