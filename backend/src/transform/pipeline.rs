//! High-level pipeline API for camera location conversion.
//!
//! This module combines all steps: parsing, validation, transformation
//! and output formatting. Everything a run needs travels in a
//! request-scoped [`ConversionContext`]; nothing is kept between runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use camconv::geodesy::CsrsEngine;
//! use camconv::transform::pipeline::{convert_file, ConversionContext, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ConversionContext::new(Some("events.csv".into()), ConvertOptions::default(), Some(params));
//!     let result = convert_file(Path::new("events.csv"), &ctx, CsrsEngine::without_geoids())?;
//!     println!("Converted {} rows", result.table.row_count());
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use super::inspection::InspectionSnapshot;
use super::service::{write_coordinates, TransformationService, DEFAULT_SAMPLE_ROWS};
use crate::api::logs::JobLog;
use crate::error::{CsvError, CsvResult, ParameterError, PipelineError, PipelineResult, SchemaError};
use crate::geodesy::TransformEngine;
use crate::models::{
    ImageType, InputFormat, ParameterSelection, SideSelection, TransformationParameters,
};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, write_csv, CsvTable, ParseResult};
use crate::validation::{validate_upload, ColumnLayout, ValidatedTable};

/// Options for the conversion pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Run the coordinate transformation; when false only DMS
    /// normalisation and filename derivation happen
    pub transform: bool,

    /// Append a derived image filename column
    pub image_type: Option<ImageType>,

    /// Rows kept in inspection samples
    pub inspection_sample_rows: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            transform: true,
            image_type: None,
            inspection_sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

fn default_true() -> bool {
    true
}

/// The JSON `params` part of a convert request, as sent by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    #[serde(default)]
    pub source: Option<SideSelection>,
    #[serde(default)]
    pub target: Option<SideSelection>,
    #[serde(default = "default_true")]
    pub transform: bool,
    #[serde(default)]
    pub image_type: Option<ImageType>,
    /// Chosen by the client so it can follow `/api/logs?job=<id>` before uploading
    #[serde(default)]
    pub job_id: Option<Uuid>,
}

impl ConvertRequest {
    /// Validated parameters, or `None` when no transformation is requested.
    pub fn parameters(&self) -> Result<Option<TransformationParameters>, ParameterError> {
        if !self.transform {
            return Ok(None);
        }
        let missing = |side: &str| {
            ParameterError::invalid(format!("{side}.ref_frame"), "", "a reference frame is required")
        };
        let selection = ParameterSelection {
            source: self.source.clone().ok_or_else(|| missing("source"))?,
            target: self.target.clone().ok_or_else(|| missing("target"))?,
        };
        TransformationParameters::try_from(&selection).map(Some)
    }

    pub fn options(&self, inspection_sample_rows: usize) -> ConvertOptions {
        ConvertOptions {
            transform: self.transform,
            image_type: self.image_type,
            inspection_sample_rows,
        }
    }
}

/// Everything one conversion run needs, created per request.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    pub job_id: Uuid,
    /// Name of the uploaded file, if known
    pub file_name: Option<String>,
    pub options: ConvertOptions,
    /// Required when `options.transform` is set
    pub parameters: Option<TransformationParameters>,
    pub started_at: DateTime<Utc>,
}

impl ConversionContext {
    pub fn new(
        file_name: Option<String>,
        options: ConvertOptions,
        parameters: Option<TransformationParameters>,
    ) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            file_name,
            options,
            parameters,
            started_at: Utc::now(),
        }
    }

    pub fn with_job_id(mut self, job_id: Uuid) -> Self {
        self.job_id = job_id;
        self
    }

    /// Output file name: the input stem suffixed `_converted.csv`
    pub fn output_file_name(&self) -> String {
        let stem = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).file_stem())
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("camera_locations");
        format!("{stem}_converted.csv")
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete conversion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub job_id: Uuid,
    pub file_name: String,
    /// Output table
    pub table: CsvTable,
    /// Output table written as comma-delimited CSV
    pub csv: String,
    pub layout: ColumnLayout,
    pub input_format: InputFormat,
    /// Present when the engine ran with inspection enabled
    pub inspection: Option<InspectionSnapshot>,
    /// CSV parsing metadata
    pub csv_info: CsvInfo,
}

/// Convert a CSV file.
///
/// This is the main entry point for the pipeline. It:
/// 1. Parses the CSV with auto-detection
/// 2. Validates columns and coordinates
/// 3. Transforms every coordinate in one engine call (or only normalises them)
/// 4. Appends derived filenames and writes the output CSV
pub fn convert_file<E: TransformEngine>(
    path: &Path,
    ctx: &ConversionContext,
    engine: E,
) -> PipelineResult<ConversionResult> {
    let parse_result = upload(parse_csv_file_auto(path))?;
    convert_parsed(parse_result, ctx, engine)
}

/// Convert CSV bytes.
///
/// Same as `convert_file` but accepts raw bytes instead of a file path.
pub fn convert_bytes<E: TransformEngine>(
    bytes: &[u8],
    ctx: &ConversionContext,
    engine: E,
) -> PipelineResult<ConversionResult> {
    let parse_result = upload(parse_bytes_auto(bytes))?;
    convert_parsed(parse_result, ctx, engine)
}

/// A file with no header and no rows is reported like a header-only one.
fn upload(parsed: CsvResult<ParseResult>) -> PipelineResult<ParseResult> {
    parsed.map_err(|e| match e {
        CsvError::EmptyFile => PipelineError::Schema(SchemaError::EmptyInput),
        other => PipelineError::Csv(other),
    })
}

/// Internal: convert parsed CSV data
fn convert_parsed<E: TransformEngine>(
    parse_result: ParseResult,
    ctx: &ConversionContext,
    engine: E,
) -> PipelineResult<ConversionResult> {
    let log = JobLog::new(ctx.job_id);
    log.info("Reading CSV file...");
    log.success(format!("Detected encoding: {}", parse_result.encoding));
    log.success(format!("Detected separator: '{}'", format_delimiter(parse_result.delimiter)));
    log.success(format!("Read {} rows", parse_result.table.row_count()));

    let csv_info = CsvInfo {
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.table.headers.clone(),
        row_count: parse_result.table.row_count(),
    };

    log.info("Validating columns...");
    let validated = validate_upload(parse_result.table).inspect_err(|e| log.error(e.to_string()))?;
    log.success(format!(
        "Layout: {:?}, coordinates as {}",
        validated.layout(),
        validated.format().id()
    ));

    let (table, inspection) = match (ctx.options.transform, ctx.parameters.as_ref()) {
        (true, Some(params)) => transform_table(&validated, params, ctx, engine)?,
        (true, None) => {
            let err = ParameterError::invalid("parameters", "", "transformation parameters are required");
            log.error(err.to_string());
            return Err(err.into());
        }
        (false, _) => {
            log.info("Transformation skipped, normalising coordinates only");
            (normalise_table(&validated), None)
        }
    };

    let table = match ctx.options.image_type {
        Some(image_type) => {
            log.info(format!("Adding {} column", image_type.column()));
            append_image_filenames(table, validated.filename_index(), image_type)
        }
        None => table,
    };

    let csv = write_csv(&table)?;
    let file_name = ctx.output_file_name();
    log.success(format!("Wrote {} rows to {}", table.row_count(), file_name));

    Ok(ConversionResult {
        job_id: ctx.job_id,
        file_name,
        table,
        csv,
        layout: validated.layout(),
        input_format: validated.format(),
        inspection,
        csv_info,
    })
}

fn transform_table<E: TransformEngine>(
    validated: &ValidatedTable,
    params: &TransformationParameters,
    ctx: &ConversionContext,
    engine: E,
) -> PipelineResult<(CsvTable, Option<InspectionSnapshot>)> {
    let log = JobLog::new(ctx.job_id);
    let source_coords = validated.layout().coord_type();
    if params.source().coords != source_coords {
        log.warning(format!(
            "Source coordinate type {} does not match the file layout, using {}",
            params.source().coords,
            source_coords
        ));
    }
    let mut source = *params.source();
    source.coords = source_coords;
    let params = TransformationParameters::new(source, *params.target());

    log.info(format!("Transforming {} points with {}...", validated.row_count(), engine.name()));
    let mut service = TransformationService::new(engine).with_sample_rows(ctx.options.inspection_sample_rows);
    let table = service
        .transform(validated, &params)
        .inspect_err(|e| log.error(e.to_string()))?;

    let inspection = service.inspect().cloned();
    if let Some(snapshot) = &inspection {
        for line in snapshot.summary_lines() {
            log.detail(line);
        }
    }
    log.success("Transformation complete");
    Ok((table, inspection))
}

/// Rewrite coordinates without transforming them (DMS becomes decimal).
pub fn normalise_table(validated: &ValidatedTable) -> CsvTable {
    let points: Vec<_> = validated.records().iter().map(|r| r.position).collect();
    write_coordinates(validated, validated.layout().coord_type(), &points)
}

/// Append a column derived from the raw image filename.
pub fn append_image_filenames(mut table: CsvTable, filename_index: usize, image_type: ImageType) -> CsvTable {
    table.headers.push(image_type.column().to_string());
    for row in &mut table.rows {
        let derived = image_type.derive_filename(&row[filename_index]);
        row.push(derived);
    }
    table
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EngineError, EngineResult};
    use crate::geodesy::EngineRequest;
    use crate::models::{Coord3, CoordType, Epoch, FrameSelection, ReferenceFrame, VerticalDatum};

    const HEADER: &str = "Timestamp,Filename,Origin (Latitude[deg],Longitude[deg],Altitude[m]),Roll(X)[deg],Pitch(Y)[deg],Yaw(Z)[deg],Omega[deg],Phi[deg],Kappa[deg]";

    struct EchoEngine;

    impl TransformEngine for EchoEngine {
        fn name(&self) -> &str {
            "echo"
        }

        fn transform(&self, _request: &EngineRequest, points: &[Coord3]) -> EngineResult<Vec<Coord3>> {
            Ok(points.to_vec())
        }
    }

    struct FailingEngine;

    impl TransformEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        fn transform(&self, _request: &EngineRequest, _points: &[Coord3]) -> EngineResult<Vec<Coord3>> {
            Err(EngineError::Other("no".to_string()))
        }
    }

    fn params() -> TransformationParameters {
        let side = FrameSelection::new(
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            VerticalDatum::Grs80,
            Epoch::new(2010.0).unwrap(),
        );
        TransformationParameters::new(side, side)
    }

    fn ctx(options: ConvertOptions) -> ConversionContext {
        ConversionContext::new(Some("flight_01.csv".to_string()), options, Some(params()))
    }

    #[test]
    fn test_default_options() {
        let opts = ConvertOptions::default();
        assert!(opts.transform);
        assert!(opts.image_type.is_none());
        assert_eq!(opts.inspection_sample_rows, 5);
    }

    #[test]
    fn test_identity_conversion() {
        let csv = format!("{HEADER}\n2023-06-01,a.iiq,52.5125,-123.258333,100.0,0,0,0,0,0,0\n");
        let result = convert_bytes(csv.as_bytes(), &ctx(ConvertOptions::default()), EchoEngine).unwrap();

        assert_eq!(result.file_name, "flight_01_converted.csv");
        assert_eq!(result.table.row_count(), 1);
        assert_eq!(result.table.rows[0][2], "52.512500000");
        assert_eq!(result.table.rows[0][3], "-123.258333000");
        assert!(result.inspection.is_some());
        assert!(result.csv.starts_with("Timestamp,Filename,"));
        assert_eq!(result.csv_info.row_count, 1);
    }

    #[test]
    fn test_no_transform_normalises_dms_and_adds_filenames() {
        let csv = format!(
            "{HEADER}\n2023-06-01,a.iiq,\"N52° 30' 45\"\"\",\"W123° 15' 30\"\"\",100.0,0,0,0,0,0,0\n"
        );
        let options = ConvertOptions {
            transform: false,
            image_type: Some(ImageType::Rgbi),
            ..ConvertOptions::default()
        };
        let result = convert_bytes(csv.as_bytes(), &ctx(options), FailingEngine).unwrap();

        assert_eq!(result.input_format, InputFormat::Dms);
        assert!(result.inspection.is_none());
        assert_eq!(result.table.headers.last().unwrap(), "RGBI_Filename");
        assert_eq!(result.table.rows[0].last().unwrap(), "a_rgbi.tif");
        assert_eq!(result.table.rows[0][2], "52.512500000");
        assert_eq!(result.table.rows[0][3], "-123.258333333");
    }

    #[test]
    fn test_engine_failure_aborts() {
        let csv = format!("{HEADER}\n2023-06-01,a.iiq,52.5,-123.2,100.0,0,0,0,0,0,0\n");
        let err = convert_bytes(csv.as_bytes(), &ctx(ConvertOptions::default()), FailingEngine).unwrap_err();
        assert_eq!(err.kind(), "transformation");
    }

    #[test]
    fn test_missing_parameters() {
        let csv = format!("{HEADER}\n2023-06-01,a.iiq,52.5,-123.2,100.0,0,0,0,0,0,0\n");
        let ctx = ConversionContext::new(None, ConvertOptions::default(), None);
        let err = convert_bytes(csv.as_bytes(), &ctx, EchoEngine).unwrap_err();
        assert!(matches!(err, PipelineError::Parameter(_)));
    }

    #[test]
    fn test_header_only_upload() {
        let csv = format!("{HEADER}\n");
        let err = convert_bytes(csv.as_bytes(), &ctx(ConvertOptions::default()), EchoEngine).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(SchemaError::EmptyInput)));
    }

    #[test]
    fn test_zero_byte_upload_is_empty_input() {
        for bytes in [&b""[..], b"\n\n  \n"] {
            let err = convert_bytes(bytes, &ctx(ConvertOptions::default()), EchoEngine).unwrap_err();
            assert!(matches!(err, PipelineError::Schema(SchemaError::EmptyInput)));
            assert_eq!(err.kind(), "empty_input");
        }
    }

    #[test]
    fn test_delimiter_only_row_fails_whole_upload() {
        let csv = format!(
            "{HEADER}\n2023,a.iiq,52.5,-123.2,100.0,0,0,0,0,0,0\n,,,,,,,,,,\n2023,b.iiq,52.6,-123.3,100.0,0,0,0,0,0,0\n"
        );
        let err = convert_bytes(csv.as_bytes(), &ctx(ConvertOptions::default()), EchoEngine).unwrap_err();
        match err {
            PipelineError::Schema(SchemaError::InvalidCoordinate { row, ref value, .. }) => {
                assert_eq!(row, 2);
                assert!(value.is_empty());
            }
            other => panic!("expected InvalidCoordinate, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_request_parameters() {
        let json = r#"{
            "source": {"refFrame": "ITRF2014", "coords": "Geographic", "epoch": 2023.5},
            "target": {"refFrame": "NAD83CSRS", "coords": "Projected", "utmZone": 10, "epoch": 2002.0},
            "imageType": "RGB"
        }"#;
        let request: ConvertRequest = serde_json::from_str(json).unwrap();
        assert!(request.transform);
        assert_eq!(request.image_type, Some(ImageType::Rgb));
        assert!(request.job_id.is_none());

        let params = request.parameters().unwrap().unwrap();
        assert_eq!(params.target().coords.id(), "UTM10");

        let request: ConvertRequest = serde_json::from_str(r#"{"transform": false}"#).unwrap();
        assert!(request.parameters().unwrap().is_none());

        let request: ConvertRequest = serde_json::from_str("{}").unwrap();
        let err = request.parameters().unwrap_err();
        assert!(err.to_string().contains("source.ref_frame"));

        let request: ConvertRequest =
            serde_json::from_str(r#"{"transform": false, "jobId": "123e4567-e89b-12d3-a456-426614174000"}"#).unwrap();
        assert_eq!(request.job_id.unwrap().to_string(), "123e4567-e89b-12d3-a456-426614174000");
    }

    #[test]
    fn test_output_file_name_fallback() {
        let ctx = ConversionContext::new(None, ConvertOptions::default(), None);
        assert_eq!(ctx.output_file_name(), "camera_locations_converted.csv");
    }
}
