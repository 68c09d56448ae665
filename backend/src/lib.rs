//! # camconv - Camera location CSV conversion
//!
//! camconv reads aerial camera event exports (timestamp, image filename,
//! camera origin, attitude angles), transforms the camera positions between
//! reference frames, epochs, coordinate types and vertical datums, and
//! writes the table back with every other column untouched.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Validator  │────▶│  Transform  │────▶ CSV
//! │  (ISO/UTF8) │     │  (auto-enc) │     │  (columns)  │     │  (engine)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use camconv::{convert_file, ConversionContext, ConvertOptions, CsrsEngine};
//!
//! let ctx = ConversionContext::new(None, ConvertOptions::default(), Some(params));
//! let result = convert_file("events.csv".as_ref(), &ctx, CsrsEngine::without_geoids())?;
//! println!("Converted {} rows", result.table.row_count());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Frames, datums, coordinate types, parameters
//! - [`parser`] - CSV parsing with auto-detection
//! - [`validation`] - Required columns and coordinate parsing
//! - [`geodesy`] - Transformation engine trait and implementation
//! - [`cache`] - Geoid grid store
//! - [`transform`] - Transformation service and pipeline
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Geodesy
pub mod geodesy;

// Grid store
pub mod cache;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, CsvError, EngineError, GridError, ParameterError, PipelineError, PipelineResult,
    SchemaError, ServerError, TransformationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CameraRecord, Coord3, CoordType, Epoch, FrameSelection, ImageType, InputFormat,
    ParameterSelection, ReferenceFrame, SideSelection, TransformationParameters, UtmZone,
    VerticalDatum,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto,
    parse_str, write_csv, CsvTable, ParseResult,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    extract_records, validate_table, validate_upload, ColumnLayout, ValidatedTable,
    REQUIRED_FILE_COLS_CARTESIAN, REQUIRED_FILE_COLS_GEOGRAPHIC,
};

// =============================================================================
// Re-exports - Engine and grids
// =============================================================================

pub use cache::{GridStatus, GridStore};
pub use geodesy::{CsrsEngine, EngineRequest, GeoidGrid, GeoidModels, TransformEngine};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    convert_bytes, convert_file, ConversionContext, ConversionResult, ConvertOptions,
    ConvertRequest, CsvInfo, InspectionSnapshot, TransformationService,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ConvertResponse, OptionsResponse};
pub use config::AppConfig;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
