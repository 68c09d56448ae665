//! Geoid undulation grids in NOAA GTX format.
//!
//! A GTX file is a 40-byte big-endian header (`lat0`, `lon0`, `dlat`, `dlon`
//! as f64, `rows`, `cols` as i32) followed by `rows * cols` f32 values,
//! row-major from the southernmost row, west to east.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{GridError, GridResult};
use crate::models::VerticalDatum;

const HEADER_LEN: usize = 40;
const NODATA: f32 = -88.8888;

/// One geoid model: a regular lat/lon grid of undulations in metres.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoidGrid {
    name: String,
    lat0: f64,
    lon0: f64,
    dlat: f64,
    dlon: f64,
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

fn be_f64(bytes: &[u8], at: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    f64::from_be_bytes(buf)
}

fn be_i32(bytes: &[u8], at: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    i32::from_be_bytes(buf)
}

impl GeoidGrid {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> GridResult<Self> {
        let invalid = |message: String| GridError::InvalidGrid {
            file: name.to_string(),
            message,
        };

        if bytes.len() < HEADER_LEN {
            return Err(invalid(format!("{} bytes is shorter than the header", bytes.len())));
        }

        let (lat0, lon0, dlat, dlon) = (be_f64(bytes, 0), be_f64(bytes, 8), be_f64(bytes, 16), be_f64(bytes, 24));
        let (rows, cols) = (be_i32(bytes, 32), be_i32(bytes, 36));

        if rows < 2 || cols < 2 {
            return Err(invalid(format!("grid must be at least 2x2, got {rows}x{cols}")));
        }
        if !(dlat > 0.0 && dlon > 0.0) {
            return Err(invalid(format!("non-positive spacing {dlat} x {dlon}")));
        }

        let (rows, cols) = (rows as usize, cols as usize);
        let expected = rows
            .checked_mul(cols)
            .and_then(|nodes| nodes.checked_mul(4))
            .and_then(|len| len.checked_add(HEADER_LEN))
            .ok_or_else(|| invalid(format!("{rows}x{cols} grid does not fit in memory")))?;
        if bytes.len() != expected {
            return Err(invalid(format!("expected {expected} bytes, found {}", bytes.len())));
        }

        let values = bytes[HEADER_LEN..]
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self {
            name: name.to_string(),
            lat0,
            lon0: lon0.rem_euclid(360.0),
            dlat,
            dlon,
            rows,
            cols,
            values,
        })
    }

    pub fn from_file(path: &Path) -> GridResult<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(&name, &bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn value(&self, row: usize, col: usize) -> Option<f64> {
        let v = self.values[row * self.cols + col];
        ((v - NODATA).abs() > 1e-3).then_some(f64::from(v))
    }

    /// Bilinearly interpolated undulation at `lon`, `lat` (degrees).
    ///
    /// `None` outside the grid or when a surrounding node has no data.
    pub fn undulation(&self, lon: f64, lat: f64) -> Option<f64> {
        let y = (lat - self.lat0) / self.dlat;
        let x = (lon.rem_euclid(360.0) - self.lon0).rem_euclid(360.0) / self.dlon;

        let (max_y, max_x) = ((self.rows - 1) as f64, (self.cols - 1) as f64);
        if !(0.0..=max_y).contains(&y) || !(0.0..=max_x).contains(&x) {
            return None;
        }

        let (r0, c0) = ((y.floor() as usize).min(self.rows - 2), (x.floor() as usize).min(self.cols - 2));
        let (fy, fx) = (y - r0 as f64, x - c0 as f64);

        let v00 = self.value(r0, c0)?;
        let v01 = self.value(r0, c0 + 1)?;
        let v10 = self.value(r0 + 1, c0)?;
        let v11 = self.value(r0 + 1, c0 + 1)?;

        let south = v00 + (v01 - v00) * fx;
        let north = v10 + (v11 - v10) * fx;
        Some(south + (north - south) * fy)
    }
}

/// The geoid grids available to the engine, keyed by vertical datum.
#[derive(Debug, Clone, Default)]
pub struct GeoidModels {
    grids: HashMap<VerticalDatum, GeoidGrid>,
}

impl GeoidModels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, datum: VerticalDatum, grid: GeoidGrid) {
        self.grids.insert(datum, grid);
    }

    pub fn get(&self, datum: VerticalDatum) -> Option<&GeoidGrid> {
        self.grids.get(&datum)
    }

    pub fn datums(&self) -> Vec<VerticalDatum> {
        VerticalDatum::ALL
            .into_iter()
            .filter(|d| self.grids.contains_key(d))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}
