//! Intermediate record-list notation passed from extraction to assembly.
//!
//! ```text
//! record-list    := "[" point-fragment* "]"
//! point-fragment := "{'time':" INT "," "'x':" FLOAT "," "'y':" FLOAT "},"
//! stroke-sep     := "--"
//! sketch-sep     := "sketch"
//! ```

use crate::prelude::{StageError, StageResult};
use crate::sketch_interface::records::{PointRecord, StrokeRecord};
use std::fmt;

pub const STROKE_OPEN: &str = "[";
pub const STROKE_CLOSE: &str = "]";
pub const STROKE_SEPARATOR: &str = "--";
pub const SKETCH_SEPARATOR: &str = "sketch";

/// A unit of notation produced by the extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fragment {
    OpenStroke,
    Point(PointRecord),
    CloseStroke,
    StrokeFinished,
    SketchFinished,
}

impl Fragment {
    pub fn render(&self, out: &mut String) {
        match self {
            Fragment::OpenStroke => out.push_str(STROKE_OPEN),
            Fragment::Point(point) => out.push_str(&format!(
                "{{'time':{},'x':{:.6},'y':{:.6}}},",
                point.time, point.x, point.y
            )),
            Fragment::CloseStroke => {
                out.push_str(STROKE_CLOSE);
                out.push('\n');
            }
            Fragment::StrokeFinished => {
                out.push_str(STROKE_SEPARATOR);
                out.push('\n');
            }
            Fragment::SketchFinished => {
                out.push('\n');
                out.push_str(SKETCH_SEPARATOR);
                out.push('\n');
            }
        }
    }
}

/// Intermediate notation text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notation(String);

impl Notation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &Fragment) {
        fragment.render(&mut self.0);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.0.lines()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Notation {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Notation {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses one stroke's record-list literal.
///
/// The literal is rewritten into JSON (single quotes become double quotes,
/// trailing commas are dropped) and deserialized into `PointRecord`s, which
/// reject any record that is not exactly `{time, x, y}`.
pub fn parse_record_list(literal: &str) -> StageResult<StrokeRecord> {
    let json = record_list_to_json(literal)?;
    serde_json::from_str::<Vec<PointRecord>>(&json)
        .map(StrokeRecord::new)
        .map_err(|err| StageError::MalformedRecord(format!("{err} in {literal:?}")))
}

fn record_list_to_json(literal: &str) -> StageResult<String> {
    let trimmed = literal.trim();
    if !trimmed.starts_with(STROKE_OPEN) || !trimmed.ends_with(STROKE_CLOSE) {
        return Err(StageError::MalformedRecord(format!(
            "expected a bracketed record list, got {trimmed:?}"
        )));
    }
    if trimmed.contains('"') {
        return Err(StageError::MalformedRecord(format!(
            "unexpected double quote in {trimmed:?}"
        )));
    }

    let mut json = String::with_capacity(trimmed.len());
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '\'' => json.push('"'),
            ',' if closes_next(&trimmed[idx + 1..]) => {}
            _ => json.push(ch),
        }
    }
    Ok(json)
}

fn closes_next(rest: &str) -> bool {
    matches!(rest.trim_start().chars().next(), Some(']') | Some('}'))
}
