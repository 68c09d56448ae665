//! Column names of camera event exports.
//!
//! The odd parentheses are part of the real header: the export writes the
//! origin as one logical `Origin (Latitude[deg], Longitude[deg], Altitude[m])`
//! group split over three columns.

use serde::Serialize;

use crate::models::CoordType;

pub const TIMESTAMP: &str = "Timestamp";
pub const FILENAME: &str = "Filename";

pub const LATITUDE: &str = "Origin (Latitude[deg]";
pub const LONGITUDE: &str = "Longitude[deg]";
pub const ALTITUDE: &str = "Altitude[m])";

pub const CART_X: &str = "Origin (X[m]";
pub const CART_Y: &str = "Y[m]";
pub const CART_Z: &str = "Z[m])";

pub const EASTING: &str = "Easting[m]";
pub const NORTHING: &str = "Northing[m]";
pub const PROJECTED_ALTITUDE: &str = "Altitude[m]";

pub const ROLL: &str = "Roll(X)[deg]";
pub const PITCH: &str = "Pitch(Y)[deg]";
pub const YAW: &str = "Yaw(Z)[deg]";
pub const OMEGA: &str = "Omega[deg]";
pub const PHI: &str = "Phi[deg]";
pub const KAPPA: &str = "Kappa[deg]";

pub const REQUIRED_FILE_COLS_GEOGRAPHIC: [&str; 11] = [
    TIMESTAMP, FILENAME, LATITUDE, LONGITUDE, ALTITUDE, ROLL, PITCH, YAW, OMEGA, PHI, KAPPA,
];

pub const REQUIRED_FILE_COLS_CARTESIAN: [&str; 11] = [
    TIMESTAMP, FILENAME, CART_X, CART_Y, CART_Z, ROLL, PITCH, YAW, OMEGA, PHI, KAPPA,
];

/// Which coordinate columns an upload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnLayout {
    Geographic,
    Cartesian,
}

impl ColumnLayout {
    pub fn required(&self) -> &'static [&'static str] {
        match self {
            ColumnLayout::Geographic => &REQUIRED_FILE_COLS_GEOGRAPHIC,
            ColumnLayout::Cartesian => &REQUIRED_FILE_COLS_CARTESIAN,
        }
    }

    /// Coordinate columns in file order.
    pub fn coordinate_columns(&self) -> [&'static str; 3] {
        match self {
            ColumnLayout::Geographic => [LATITUDE, LONGITUDE, ALTITUDE],
            ColumnLayout::Cartesian => [CART_X, CART_Y, CART_Z],
        }
    }

    /// Engine coordinate type matching the layout.
    pub fn coord_type(&self) -> CoordType {
        match self {
            ColumnLayout::Geographic => CoordType::Geographic,
            ColumnLayout::Cartesian => CoordType::Cartesian,
        }
    }
}

/// Output coordinate column names, in file order, for a target coordinate type.
pub fn output_coordinate_columns(coords: CoordType) -> [&'static str; 3] {
    match coords {
        CoordType::Geographic => [LATITUDE, LONGITUDE, ALTITUDE],
        CoordType::Cartesian => [CART_X, CART_Y, CART_Z],
        CoordType::Utm(_) => [EASTING, NORTHING, PROJECTED_ALTITUDE],
    }
}
