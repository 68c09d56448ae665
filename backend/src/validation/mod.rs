//! Shape validation for uploaded camera location tables.
//!
//! Validation is a pure check: a table either comes back unchanged (wrapped
//! in a [`ValidatedTable`] carrying what was learned about it) or the
//! upload is rejected before any transformation is attempted.
//!
//! # Rules
//!
//! - column names match case-insensitively, otherwise exactly
//! - every missing required column is reported, not just the first
//! - a header-only table is [`SchemaError::EmptyInput`]
//!
//! # Example
//!
//! ```rust,ignore
//! use camconv::parser::parse_str;
//! use camconv::validation::validate_upload;
//!
//! let table = parse_str(csv, ',')?;
//! let validated = validate_upload(table)?;
//! let records = validated.records();
//! ```

pub mod columns;

use serde::Serialize;

use crate::error::{SchemaError, SchemaResult};
use crate::models::{CameraRecord, Coord3, InputFormat};
use crate::parser::{dms_to_decimal, is_dms, CsvTable};

pub use columns::{
    output_coordinate_columns, ColumnLayout, REQUIRED_FILE_COLS_CARTESIAN,
    REQUIRED_FILE_COLS_GEOGRAPHIC,
};

/// Required columns absent from `table`, in the order they are required.
pub fn missing_columns(table: &CsvTable, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|col| table.column_index(col).is_none())
        .map(|col| col.to_string())
        .collect()
}

/// Check `table` against a fixed set of required columns.
///
/// Returns the table unchanged, or the complete list of missing columns.
pub fn validate_table(table: CsvTable, required: &[&str]) -> SchemaResult<CsvTable> {
    let missing = missing_columns(&table, required);
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns { missing });
    }
    if table.is_empty() {
        return Err(SchemaError::EmptyInput);
    }
    Ok(table)
}

/// Validate an upload against both supported layouts.
///
/// Cartesian wins when both layouts are complete. When neither is, the
/// error lists every column missing from the layout closest to complete.
pub fn validate_upload(table: CsvTable) -> SchemaResult<ValidatedTable> {
    let missing_cart = missing_columns(&table, &REQUIRED_FILE_COLS_CARTESIAN);
    let missing_geo = missing_columns(&table, &REQUIRED_FILE_COLS_GEOGRAPHIC);

    let layout = if missing_cart.is_empty() {
        ColumnLayout::Cartesian
    } else if missing_geo.is_empty() {
        ColumnLayout::Geographic
    } else if missing_cart.len() < missing_geo.len() {
        return Err(SchemaError::MissingColumns { missing: missing_cart });
    } else {
        return Err(SchemaError::MissingColumns { missing: missing_geo });
    };

    let table = validate_table(table, layout.required())?;
    ValidatedTable::new(table, layout)
}

/// Detect how coordinates are written in a table with the given layout.
pub fn detect_input_format(table: &CsvTable, layout: ColumnLayout) -> InputFormat {
    match layout {
        ColumnLayout::Cartesian => InputFormat::Cartesian,
        ColumnLayout::Geographic => {
            let has_dms = table
                .column(columns::LATITUDE)
                .is_some_and(|values| values.iter().any(|v| is_dms(v)));
            if has_dms {
                InputFormat::Dms
            } else {
                InputFormat::DecimalDegrees
            }
        }
    }
}

/// Parse every row of `table` into a [`CameraRecord`] in engine axis order.
///
/// Geographic angles may be decimal degrees or DMS strings. Fails on the
/// first cell that is neither, naming its 1-based data row.
pub fn extract_records(table: &CsvTable, layout: ColumnLayout) -> SchemaResult<Vec<CameraRecord>> {
    let indices = coordinate_indices(table, layout)?;
    let filename = column_index(table, columns::FILENAME)?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let mut values = [0.0_f64; 3];
            for (axis, (slot, &idx)) in values.iter_mut().zip(indices.iter()).enumerate() {
                let is_angle = layout == ColumnLayout::Geographic && axis < 2;
                *slot = parse_coordinate(&cells[idx], is_angle).ok_or_else(|| {
                    SchemaError::InvalidCoordinate {
                        row: row + 1,
                        column: table.headers[idx].clone(),
                        value: cells[idx].clone(),
                    }
                })?;
            }
            let position = match layout {
                // file order is lat, lon, alt; engine order is lon, lat, h
                ColumnLayout::Geographic => Coord3(values[1], values[0], values[2]),
                ColumnLayout::Cartesian => Coord3(values[0], values[1], values[2]),
            };
            Ok(CameraRecord {
                id: cells[filename].clone(),
                position,
                row,
            })
        })
        .collect()
}

fn parse_coordinate(value: &str, is_angle: bool) -> Option<f64> {
    if is_angle && is_dms(value) {
        dms_to_decimal(value)
    } else {
        value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

fn column_index(table: &CsvTable, name: &str) -> SchemaResult<usize> {
    table
        .column_index(name)
        .ok_or_else(|| SchemaError::MissingColumns {
            missing: vec![name.to_string()],
        })
}

fn coordinate_indices(table: &CsvTable, layout: ColumnLayout) -> SchemaResult<[usize; 3]> {
    let [a, b, c] = layout.coordinate_columns();
    Ok([column_index(table, a)?, column_index(table, b)?, column_index(table, c)?])
}

/// A table known to have every required column, at least one row and a
/// number in every coordinate cell.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedTable {
    table: CsvTable,
    layout: ColumnLayout,
    format: InputFormat,
    /// Indices of the coordinate columns, in file order.
    coordinate_indices: [usize; 3],
    filename_index: usize,
    records: Vec<CameraRecord>,
}

impl ValidatedTable {
    fn new(table: CsvTable, layout: ColumnLayout) -> SchemaResult<Self> {
        let coordinate_indices = coordinate_indices(&table, layout)?;
        let filename_index = column_index(&table, columns::FILENAME)?;
        let format = detect_input_format(&table, layout);
        let records = extract_records(&table, layout)?;

        Ok(Self {
            table,
            layout,
            format,
            coordinate_indices,
            filename_index,
            records,
        })
    }

    pub fn table(&self) -> &CsvTable {
        &self.table
    }

    pub fn into_table(self) -> CsvTable {
        self.table
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }

    pub fn coordinate_indices(&self) -> [usize; 3] {
        self.coordinate_indices
    }

    pub fn filename_index(&self) -> usize {
        self.filename_index
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// One record per row, in row order.
    pub fn records(&self) -> &[CameraRecord] {
        &self.records
    }
}
