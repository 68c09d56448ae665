//! Read-only record of one transformation run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::geodesy::EngineRequest;
use crate::models::{Coord3, InputFormat, TransformationParameters};

/// What the engine was asked to do and what came back.
///
/// Built after a successful run; never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionSnapshot {
    pub parameters: TransformationParameters,
    pub request: EngineRequest,
    pub input_format: InputFormat,
    pub point_count: usize,
    pub first_input: Option<Coord3>,
    pub last_input: Option<Coord3>,
    pub input_sample: Vec<Map<String, Value>>,
    pub output_sample: Vec<Map<String, Value>>,
    pub engine: String,
    /// Engine caveats for this request
    pub notes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl InspectionSnapshot {
    /// One line per fact, for logs and the CLI.
    pub fn summary_lines(&self) -> Vec<String> {
        let (s, t) = (self.parameters.source(), self.parameters.target());
        let mut lines = vec![
            format!("Engine: {}", self.engine),
            format!(
                "Source: {} {} {} @ {}",
                s.frame.label(),
                s.coords,
                s.vertical_datum,
                s.epoch
            ),
            format!(
                "Target: {} {} {} @ {}",
                t.frame.label(),
                t.coords,
                t.vertical_datum,
                t.epoch
            ),
            format!("Input format: {}", self.input_format.id()),
            format!("Points: {}", self.point_count),
        ];
        if let Some(first) = self.first_input {
            lines.push(format!("First input: {first}"));
        }
        if let Some(last) = self.last_input {
            lines.push(format!("Last input: {last}"));
        }
        lines.extend(self.notes.iter().map(|n| format!("Note: {n}")));
        lines
    }
}
