//! CSV reading and writing with encoding and delimiter auto-detection.
//!
//! Cells are kept as the exact strings read from the file so that columns
//! the converter does not touch can be written back unchanged.

pub mod dms;

use serde::Serialize;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

pub use dms::{dms_to_decimal, is_dms};

/// An uploaded table: header row plus data rows, all as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.to_lowercase() == name.to_lowercase())
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// The first `n` rows as header → value maps, for previews.
    pub fn preview(&self, n: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .take(n)
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| serde_json::Value::String(v.clone())))
                    .collect()
            })
            .collect()
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: CsvTable,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset.to_lowercase(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let codec = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => encoding_rs::UTF_8,
        // WHATWG maps latin-1 labels to windows-1252, a superset of its printable range
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252,
        other => encoding_rs::Encoding::for_label(other.as_bytes())
            .ok_or_else(|| CsvError::EncodingError(other.to_string()))?,
    };

    let (decoded, _, had_errors) = codec.decode(bytes);
    if had_errors && codec == encoding_rs::UTF_8 {
        // Mis-detected legacy file: fall back to the encoding the camera software writes
        return Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned());
    }
    Ok(decoded.into_owned())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Rows shorter than the header are padded with empty cells, longer rows
/// are truncated. Blank lines are skipped; a row of bare delimiters is kept
/// so that validation can reject its empty cells.
///
/// # Example
/// ```ignore
/// use camconv::parser::parse_str;
///
/// let table = parse_str("id,lat\nCAM01,45.0", ',').unwrap();
/// assert_eq!(table.rows[0][0], "CAM01");
/// ```
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<CsvTable> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_error(&e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::EmptyFile);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| parse_error(&e))?;
        if is_blank_line(&record) {
            continue;
        }
        let mut row: Vec<String> = record.iter().take(headers.len()).map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(CsvTable::new(headers, rows))
}

/// A line with no delimiter and nothing but whitespace.
fn is_blank_line(record: &csv::StringRecord) -> bool {
    match record.len() {
        0 => true,
        1 => record[0].trim().is_empty(),
        _ => false,
    }
}

fn parse_error(e: &csv::Error) -> CsvError {
    let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
    CsvError::ParseError {
        line,
        message: e.to_string(),
    }
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let table = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Serialize a table as comma-delimited UTF-8 CSV.
pub fn write_csv(table: &CsvTable) -> CsvResult<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .map_err(|e| CsvError::WriteError(e.to_string()))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| CsvError::WriteError(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::WriteError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::WriteError(e.to_string()))
}
