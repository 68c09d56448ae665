//! REST API types for frontend integration.
//!
//! Field names are camelCase to match the frontend's `types.rs`.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{ImageType, ReferenceFrame, UtmZone, VerticalDatum};
use crate::transform::pipeline::{ConversionResult, CsvInfo};
use crate::transform::InspectionSnapshot;
use crate::validation::{REQUIRED_FILE_COLS_CARTESIAN, REQUIRED_FILE_COLS_GEOGRAPHIC};

/// Rows included in a convert response preview
pub const PREVIEW_ROWS: usize = 10;

/// A selectable value with its display label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

/// A vertical datum and whether its geoid grid is loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatumChoice {
    pub id: String,
    pub label: String,
    pub ellipsoidal: bool,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochBounds {
    pub min: f64,
    pub max: f64,
    pub default_target: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneBounds {
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredColumns {
    pub geographic: Vec<String>,
    pub cartesian: Vec<String>,
}

/// Everything the parameter pickers may offer
#[derive(Debug, Clone, Serialize, Deserialize)]
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

impl OptionsResponse {
    /// `available` lists the orthometric datums whose grids are loaded.
    pub fn new(engine: &str, available: &[VerticalDatum]) -> Self {
        Self {
            reference_frames: ReferenceFrame::ALL
                .iter()
                .map(|f| Choice {
                    id: f.id().to_string(),
                    label: f.label().to_string(),
                })
                .collect(),
            vertical_datums: VerticalDatum::ALL
                .iter()
                .map(|d| DatumChoice {
                    id: d.id().to_string(),
                    label: d.label().to_string(),
                    ellipsoidal: d.is_ellipsoidal(),
                    available: d.is_ellipsoidal() || available.contains(d),
                })
                .collect(),
            coord_types: ["Geographic", "Cartesian", "Projected"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            utm_zones: ZoneBounds {
                min: UtmZone::MIN,
                max: UtmZone::MAX,
            },
            epoch: EpochBounds {
                min: 1900.0,
                max: 3000.0,
                default_target: 2002.0,
            },
            image_types: ImageType::ALL
                .iter()
                .map(|t| Choice {
                    id: t.label().to_string(),
                    label: t.column().to_string(),
                })
                .collect(),
            required_columns: RequiredColumns {
                geographic: REQUIRED_FILE_COLS_GEOGRAPHIC.iter().map(|s| s.to_string()).collect(),
                cartesian: REQUIRED_FILE_COLS_CARTESIAN.iter().map(|s| s.to_string()).collect(),
            },
            engine: engine.to_string(),
        }
    }
}

/// Response sent to frontend after a conversion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Always "ok"; failures use [`error_response`]
    pub status: String,

    /// Suggested download name
    pub file_name: String,

    /// Output CSV text
    pub csv: String,

    pub row_count: usize,

    /// Output column names
    pub columns: Vec<String>,

    /// First rows of the output, as header → value maps
    pub preview: Vec<Map<String, Value>>,

    pub inspection: Option<InspectionSnapshot>,

    /// Human-readable transformation details, empty without a transformation
    pub details: Vec<String>,

    pub csv_info: CsvInfo,
}

impl From<ConversionResult> for ConvertResponse {
    fn from(result: ConversionResult) -> Self {
        ConvertResponse {
            job_id: result.job_id.to_string(),
            status: "ok".to_string(),
            file_name: result.file_name,
            row_count: result.table.row_count(),
            columns: result.table.headers.clone(),
            preview: result.table.preview(PREVIEW_ROWS),
            csv: result.csv,
            details: result
                .inspection
                .as_ref()
                .map(InspectionSnapshot::summary_lines)
                .unwrap_or_default(),
            inspection: result.inspection,
            csv_info: result.csv_info,
        }
    }
}

/// HTTP status for a failed conversion
pub fn pipeline_status(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Csv(_) | PipelineError::Schema(_) | PipelineError::Parameter(_) => {
            StatusCode::BAD_REQUEST
        }
        PipelineError::Transformation(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Create an error response
pub fn error_response(error: &str, kind: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "kind": kind,
    })
}
