//! Batch coordinate transformation over a validated table.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::inspection::InspectionSnapshot;
use crate::error::TransformationError;
use crate::geodesy::{EngineRequest, TransformEngine};
use crate::models::{Coord3, CoordType, TransformationParameters};
use crate::parser::CsvTable;
use crate::validation::{output_coordinate_columns, ValidatedTable};

/// Default number of rows kept in inspection samples.
pub const DEFAULT_SAMPLE_ROWS: usize = 5;

/// Runs one engine call per table and rebuilds the table around the result.
pub struct TransformationService<E> {
    engine: E,
    inspection: bool,
    sample_rows: usize,
    last: Option<InspectionSnapshot>,
}

impl<E: TransformEngine> TransformationService<E> {
    pub fn new(engine: E) -> Self {
        Self::with_inspection(engine, true)
    }

    /// With `enabled == false`, [`Self::inspect`] always returns `None`.
    pub fn with_inspection(engine: E, enabled: bool) -> Self {
        Self {
            engine,
            inspection: enabled,
            sample_rows: DEFAULT_SAMPLE_ROWS,
            last: None,
        }
    }

    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Transform every coordinate of `validated` in a single engine call.
    ///
    /// The returned table has the same rows in the same order. Coordinate
    /// columns are replaced in place and renamed for the target coordinate
    /// type; every other cell is copied unchanged. On any engine failure
    /// nothing is returned and the previous snapshot is kept.
    pub fn transform(
        &mut self,
        validated: &ValidatedTable,
        params: &TransformationParameters,
    ) -> Result<CsvTable, TransformationError> {
        let request = EngineRequest::from(params);
        let points: Vec<Coord3> = validated.records().iter().map(|r| r.position).collect();

        debug!(engine = self.engine.name(), points = points.len(), ?request, "Invoking engine");
        let output = self.engine.transform(&request, &points)?;

        if output.len() != points.len() {
            return Err(TransformationError::CountMismatch {
                expected: points.len(),
                actual: output.len(),
            });
        }

        let table = write_coordinates(validated, params.target().coords, &output);
        info!(rows = table.row_count(), engine = self.engine.name(), "Transformed coordinates");

        let notes = self.engine.notes(&request);
        for note in &notes {
            warn!(engine = self.engine.name(), "{note}");
        }

        if self.inspection {
            self.last = Some(InspectionSnapshot {
                parameters: *params,
                request,
                input_format: validated.format(),
                point_count: points.len(),
                first_input: points.first().copied(),
                last_input: points.last().copied(),
                input_sample: validated.table().preview(self.sample_rows),
                output_sample: table.preview(self.sample_rows),
                engine: self.engine.name().to_string(),
                notes,
                created_at: Utc::now(),
            });
        }

        Ok(table)
    }

    /// Snapshot of the last successful run, without touching the engine.
    pub fn inspect(&self) -> Option<&InspectionSnapshot> {
        self.last.as_ref()
    }
}

/// Format a point in file column order for the given coordinate type.
///
/// Degrees keep 9 decimals (sub-millimetre), metres keep 4.
pub fn format_coordinates(coords: CoordType, p: Coord3) -> [String; 3] {
    match coords {
        CoordType::Geographic => [format!("{:.9}", p.1), format!("{:.9}", p.0), format!("{:.4}", p.2)],
        CoordType::Cartesian | CoordType::Utm(_) => {
            [format!("{:.4}", p.0), format!("{:.4}", p.1), format!("{:.4}", p.2)]
        }
    }
}

/// Copy of the validated table with its coordinate columns replaced.
///
/// `points` holds one point per row, in engine axis order.
pub fn write_coordinates(validated: &ValidatedTable, coords: CoordType, points: &[Coord3]) -> CsvTable {
    let indices = validated.coordinate_indices();
    let source = validated.table();

    let mut headers = source.headers.clone();
    for (&idx, name) in indices.iter().zip(output_coordinate_columns(coords)) {
        headers[idx] = name.to_string();
    }

    let rows = source
        .rows
        .iter()
        .zip(points)
        .map(|(row, &p)| {
            let mut row = row.clone();
            for (&idx, value) in indices.iter().zip(format_coordinates(coords, p)) {
                row[idx] = value;
            }
            row
        })
        .collect();

    CsvTable::new(headers, rows)
}
