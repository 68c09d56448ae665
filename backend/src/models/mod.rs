//! Domain models for camera location conversion.
//!
//! - [`frames`] - closed sets of reference frames, vertical datums, coordinate types
//! - [`params`] - validated transformation parameters and their raw wire shape
//! - camera records and coordinate triples (this module)

pub mod frames;
pub mod params;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParameterError;

pub use frames::{CoordType, ReferenceFrame, UtmZone, VerticalDatum};
pub use params::{Epoch, FrameSelection, ParameterSelection, SideSelection, TransformationParameters};

/// A coordinate triple in engine axis order.
///
/// Geographic: (longitude, latitude, height). Cartesian: (X, Y, Z).
/// UTM: (easting, northing, height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord3(pub f64, pub f64, pub f64);

impl Coord3 {
    pub fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.2.is_finite()
    }
}

impl fmt::Display for Coord3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0, self.1, self.2)
    }
}

/// One camera event parsed from a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRecord {
    /// Image filename identifying the exposure.
    pub id: String,
    /// Position in engine axis order.
    pub position: Coord3,
    /// Zero-based data row index in the source table.
    pub row: usize,
}

/// How coordinates are written in an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    /// Decimal degrees latitude/longitude.
    #[serde(rename = "dd")]
    DecimalDegrees,
    /// Degrees-minutes-seconds strings such as `N52° 30' 45"`.
    #[serde(rename = "dms")]
    Dms,
    /// ECEF X/Y/Z in metres.
    #[serde(rename = "cart")]
    Cartesian,
}

impl InputFormat {
    pub fn id(&self) -> &'static str {
        match self {
            InputFormat::DecimalDegrees => "dd",
            InputFormat::Dms => "dms",
            InputFormat::Cartesian => "cart",
        }
    }
}

/// Imagery product the derived filename column points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageType {
    /// Four band imagery, `_rgbi.tif`.
    Rgbi,
    /// Calibrated colour imagery, `_cal.tif`.
    Rgb,
}

impl ImageType {
    pub const ALL: [ImageType; 2] = [ImageType::Rgbi, ImageType::Rgb];

    /// Name of the appended column.
    pub fn column(&self) -> &'static str {
        match self {
            ImageType::Rgbi => "RGBI_Filename",
            ImageType::Rgb => "RGB_Filename",
        }
    }

    /// Replacement for the raw `.iiq` extension.
    pub fn suffix(&self) -> &'static str {
        match self {
            ImageType::Rgbi => "_rgbi.tif",
            ImageType::Rgb => "_cal.tif",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageType::Rgbi => "RGBI",
            ImageType::Rgb => "RGB",
        }
    }

    /// Derives the processed image filename from a raw `.iiq` name.
    pub fn derive_filename(&self, raw: &str) -> String {
        raw.replace(".iiq", self.suffix())
    }
}

impl FromStr for ImageType {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ImageType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParameterError::invalid("image_type", s, "expected RGBI or RGB"))
    }
}
