//! Error types for the camconv conversion pipeline.
//!
//! One error enum per layer, wrapped by the top-level [`PipelineError`]:
//!
//! - [`CsvError`] - CSV reading and decoding errors
//! - [`SchemaError`] - uploaded table does not have the expected shape
//! - [`ParameterError`] - transformation parameters outside the supported sets
//! - [`EngineError`] - failures inside the coordinate transformation engine
//! - [`TransformationError`] - a batch transformation that could not complete
//! - [`GridError`] - geoid grid store errors
//! - [`ConfigError`] - unusable environment configuration
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading an uploaded CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Bytes could not be decoded with the detected encoding.
    #[error("Failed to decode content as {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file (not even a header row).
    #[error("CSV file is empty")]
    EmptyFile,

    /// Failed to write the output table.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),
}

// =============================================================================
// Schema Errors
// =============================================================================

/// The uploaded table does not have the shape the converter needs.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// One or more required columns are absent. Lists every missing column.
    #[error("Missing columns in uploaded file: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// The table has a header but no data rows.
    #[error("Uploaded file has no data rows")]
    EmptyInput,

    /// A coordinate cell could not be parsed as a number (or DMS angle).
    #[error("Row {row}, column '{column}': '{value}' is not a valid coordinate")]
    InvalidCoordinate {
        row: usize,
        column: String,
        value: String,
    },
}

// =============================================================================
// Parameter Errors
// =============================================================================

/// A transformation parameter is outside the supported sets.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidParameter {
        field: String,
        value: String,
        reason: String,
    },
}

impl ParameterError {
    pub fn invalid(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Engine Errors
// =============================================================================

/// Failures raised by a [`crate::geodesy::TransformEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Coordinate is NaN or infinite.
    #[error("Point {index} is not finite: ({x}, {y}, {z})")]
    NonFinite { index: usize, x: f64, y: f64, z: f64 },

    /// Geographic coordinate out of range.
    #[error("Point {index} is out of range: {reason}")]
    OutOfRange { index: usize, reason: String },

    /// Geoid model required by a vertical datum is not loaded.
    #[error("Geoid grid for vertical datum {0} is not available")]
    MissingGrid(String),

    /// Point falls outside the coverage of a geoid grid.
    #[error("Point {index} ({lon:.6}, {lat:.6}) is outside the {grid} grid")]
    OutsideGrid {
        index: usize,
        grid: String,
        lon: f64,
        lat: f64,
    },

    /// Catch-all for engine implementations outside this crate.
    #[error("{0}")]
    Other(String),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// A batch transformation failed. No partial result is ever returned.
#[derive(Debug, Error)]
pub enum TransformationError {
    /// The engine rejected the batch.
    #[error("Coordinate transformation failed: {0}")]
    Engine(#[from] EngineError),

    /// The engine returned the wrong number of points.
    #[error("Engine returned {actual} points for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
}

// =============================================================================
// Grid Store Errors
// =============================================================================

/// Errors from the local geoid grid store.
#[derive(Debug, Error)]
pub enum GridError {
    /// IO error.
    #[error("Grid IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// File is not a valid GTX grid.
    #[error("Invalid grid file {file}: {message}")]
    InvalidGrid { file: String, message: String },

    /// Download failed.
    #[error("Failed to download {file}: {message}")]
    Download { file: String, message: String },

    /// No download URL configured.
    #[error("No grid download URL configured (set CAMCONV_GRID_URL)")]
    NoSource,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// An environment variable holds a value that cannot be used.
#[derive(Debug, Error)]
#[error("Invalid value '{value}' for {name}: {reason}")]
pub struct ConfigError {
    pub name: String,
    pub value: String,
    pub reason: String,
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::convert_bytes`].
/// It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Table shape error.
    #[error("{0}")]
    Schema(#[from] SchemaError),

    /// Invalid parameters.
    #[error("{0}")]
    Parameter(#[from] ParameterError),

    /// Transformation error.
    #[error("{0}")]
    Transformation(#[from] TransformationError),
}

impl PipelineError {
    /// Short machine-readable kind, used by the HTTP layer and the UI.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Csv(_) => "csv",
            PipelineError::Schema(SchemaError::MissingColumns { .. }) => "missing_columns",
            PipelineError::Schema(SchemaError::EmptyInput) => "empty_input",
            PipelineError::Schema(SchemaError::InvalidCoordinate { .. }) => "invalid_coordinate",
            PipelineError::Parameter(_) => "invalid_parameter",
            PipelineError::Transformation(_) => "transformation",
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// Failures starting or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Geoid grids could not be loaded at startup.
    #[error("Geoid grids: {0}")]
    Grid(#[from] GridError),

    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for schema validation.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for grid store operations.
pub type GridResult<T> = Result<T, GridError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));
        assert_eq!(pipeline_err.kind(), "csv");

        // EngineError -> TransformationError -> PipelineError
        let engine_err = EngineError::MissingGrid("CGG2013A".into());
        let transform_err: TransformationError = engine_err.into();
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("CGG2013A"));
        assert_eq!(pipeline_err.kind(), "transformation");
    }

    #[test]
    fn test_missing_columns_lists_all() {
        let err = SchemaError::MissingColumns {
            missing: vec!["Timestamp".into(), "Kappa[deg]".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Timestamp"));
        assert!(msg.contains("Kappa[deg]"));
    }

    #[test]
    fn test_invalid_parameter_format() {
        let err = ParameterError::invalid("source_frame", "NAD27", "unsupported reference frame");
        let msg = err.to_string();
        assert!(msg.contains("source_frame"));
        assert!(msg.contains("NAD27"));
        let pipeline_err: PipelineError = err.into();
        assert_eq!(pipeline_err.kind(), "invalid_parameter");
    }

    #[test]
    fn test_server_error_wraps_grid_failure() {
        let err: ServerError = GridError::NoSource.into();
        assert!(err.to_string().starts_with("Geoid grids:"));
        assert!(err.to_string().contains("CAMCONV_GRID_URL"));
    }
}
