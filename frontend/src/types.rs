//! Common types used across the frontend application.
//!
//! Wire types mirror the backend's `api::types` and `ConvertRequest`; field
//! names are camelCase on the wire.
//!
//! # Categories
//!
//! - **Log Types** - Real-time log streaming
//! - **Options Types** - Selectable parameters from `/api/options`
//! - **Request Types** - Convert request parameters
//! - **Response Types** - Convert results
//! - **Error Types** - Frontend error handling

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Log Types
// =============================================================================

/// Log severity level.
///
/// Matches the backend's log levels for SSE streaming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
        }
    }
}

/// A single log entry.
///
/// Received via SSE from `/api/logs`, or added locally by the UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth sent by the backend
    #[serde(default)]
    pub indent: u8,
    /// Conversion job id; absent for local entries
    #[serde(default)]
    pub job: Option<String>,
    /// Local time of arrival (HH:MM:SS)
    #[serde(default)]
    pub timestamp: String,
}

impl LogEntry {
    /// First block of the job id, enough to tell concurrent uploads apart
    pub fn short_job(&self) -> Option<&str> {
        self.job.as_deref().and_then(|j| j.split('-').next())
    }
}

// =============================================================================
// Options Types
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatumChoice {
    pub id: String,
    pub label: String,
    pub ellipsoidal: bool,
    /// False when the server has no grid for this datum
    pub available: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochBounds {
    pub min: f64,
    pub max: f64,
    pub default_target: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneBounds {
    pub min: u8,
    pub max: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequiredColumns {
    pub geographic: Vec<String>,
    pub cartesian: Vec<String>,
}

/// Everything the parameter panels may offer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub reference_frames: Vec<Choice>,
    pub vertical_datums: Vec<DatumChoice>,
    pub coord_types: Vec<String>,
    pub utm_zones: ZoneBounds,
    pub epoch: EpochBounds,
    pub image_types: Vec<Choice>,
    pub required_columns: RequiredColumns,
    pub engine: String,
}

// =============================================================================
// Request Types
// =============================================================================

/// Picker values for one side of the transformation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSelection {
    pub ref_frame: String,
    pub coords: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_zone: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_datum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch_date: Option<NaiveDate>,
}

/// The `params` part of the multipart convert request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub source: Option<SideSelection>,
    pub target: Option<SideSelection>,
    pub transform: bool,
    /// `RGBI` or `RGB`
    pub image_type: Option<String>,
    /// Job whose log stream the client is already following
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// Decimal year of a calendar date, counted from the start of the day.
pub fn decimal_year(date: NaiveDate) -> f64 {
    let year = date.year();
    let days_in_year = if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    };
    year as f64 + f64::from(date.ordinal0()) / days_in_year
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Successful conversion, as returned by `POST /api/convert`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub job_id: String,
    pub status: String,
    /// Suggested download name (`<stem>_converted.csv`)
    pub file_name: String,
    pub csv: String,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub preview: Vec<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub details: Vec<String>,
    pub csv_info: CsvInfo,
}

/// Error body returned with a 4xx/5xx status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub kind: String,
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
#[derive(Clone, Debug, PartialEq)]
pub enum AppError {
    /// The backend rejected the conversion; carries its user-facing message.
    Conversion { message: String, kind: String },
    /// Network/HTTP error.
    Network(String),
    /// Invalid input caught before sending.
    Validation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Conversion { message, .. } => write!(f, "{}", message),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;
