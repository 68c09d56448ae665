//! Closed sets of supported reference frames, vertical datums and coordinate types.
//!
//! These enums are the constant tables the UI pickers and the parameter
//! validation are built from. Parsing accepts either the stable id
//! (`"NAD83CSRS"`, `"ITRF14"`, `"UTM10"`) or the display label
//! (`"NAD83 (CSRS)"`, `"ITRF2014"`), case-insensitively.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParameterError;

// =============================================================================
// Reference frames
// =============================================================================

/// A geodetic reference frame realization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceFrame {
    #[serde(rename = "WGS84")]
    Wgs84,
    #[serde(rename = "NAD83CSRS")]
    Nad83Csrs,
    #[serde(rename = "ITRF88")]
    Itrf88,
    #[serde(rename = "ITRF89")]
    Itrf89,
    #[serde(rename = "ITRF90")]
    Itrf90,
    #[serde(rename = "ITRF91")]
    Itrf91,
    #[serde(rename = "ITRF92")]
    Itrf92,
    #[serde(rename = "ITRF93")]
    Itrf93,
    #[serde(rename = "ITRF94")]
    Itrf94,
    #[serde(rename = "ITRF96")]
    Itrf96,
    #[serde(rename = "ITRF97")]
    Itrf97,
    #[serde(rename = "ITRF00")]
    Itrf00,
    #[serde(rename = "ITRF05")]
    Itrf05,
    #[serde(rename = "ITRF08")]
    Itrf08,
    #[serde(rename = "ITRF14")]
    Itrf14,
    #[serde(rename = "ITRF20")]
    Itrf20,
}

impl ReferenceFrame {
    /// All supported frames, in picker order.
    pub const ALL: [ReferenceFrame; 16] = [
        ReferenceFrame::Wgs84,
        ReferenceFrame::Nad83Csrs,
        ReferenceFrame::Itrf88,
        ReferenceFrame::Itrf89,
        ReferenceFrame::Itrf90,
        ReferenceFrame::Itrf91,
        ReferenceFrame::Itrf92,
        ReferenceFrame::Itrf93,
        ReferenceFrame::Itrf94,
        ReferenceFrame::Itrf96,
        ReferenceFrame::Itrf97,
        ReferenceFrame::Itrf00,
        ReferenceFrame::Itrf05,
        ReferenceFrame::Itrf08,
        ReferenceFrame::Itrf14,
        ReferenceFrame::Itrf20,
    ];

    /// Stable identifier used on the wire.
    pub fn id(&self) -> &'static str {
        match self {
            ReferenceFrame::Wgs84 => "WGS84",
            ReferenceFrame::Nad83Csrs => "NAD83CSRS",
            ReferenceFrame::Itrf88 => "ITRF88",
            ReferenceFrame::Itrf89 => "ITRF89",
            ReferenceFrame::Itrf90 => "ITRF90",
            ReferenceFrame::Itrf91 => "ITRF91",
            ReferenceFrame::Itrf92 => "ITRF92",
            ReferenceFrame::Itrf93 => "ITRF93",
            ReferenceFrame::Itrf94 => "ITRF94",
            ReferenceFrame::Itrf96 => "ITRF96",
            ReferenceFrame::Itrf97 => "ITRF97",
            ReferenceFrame::Itrf00 => "ITRF00",
            ReferenceFrame::Itrf05 => "ITRF05",
            ReferenceFrame::Itrf08 => "ITRF08",
            ReferenceFrame::Itrf14 => "ITRF14",
            ReferenceFrame::Itrf20 => "ITRF20",
        }
    }

    /// Human readable label shown in pickers.
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceFrame::Wgs84 => "WGS84",
            ReferenceFrame::Nad83Csrs => "NAD83 (CSRS)",
            ReferenceFrame::Itrf88 => "ITRF1988",
            ReferenceFrame::Itrf89 => "ITRF1989",
            ReferenceFrame::Itrf90 => "ITRF1990",
            ReferenceFrame::Itrf91 => "ITRF1991",
            ReferenceFrame::Itrf92 => "ITRF1992",
            ReferenceFrame::Itrf93 => "ITRF1993",
            ReferenceFrame::Itrf94 => "ITRF1994",
            ReferenceFrame::Itrf96 => "ITRF1996",
            ReferenceFrame::Itrf97 => "ITRF1997",
            ReferenceFrame::Itrf00 => "ITRF2000",
            ReferenceFrame::Itrf05 => "ITRF2005",
            ReferenceFrame::Itrf08 => "ITRF2008",
            ReferenceFrame::Itrf14 => "ITRF2014",
            ReferenceFrame::Itrf20 => "ITRF2020",
        }
    }
}

impl fmt::Display for ReferenceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ReferenceFrame {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReferenceFrame::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(wanted) || f.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParameterError::invalid("reference_frame", s, "unsupported reference frame"))
    }
}

// =============================================================================
// Vertical datums
// =============================================================================

/// The surface heights are referenced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalDatum {
    #[serde(rename = "WGS84")]
    Wgs84,
    #[serde(rename = "GRS80")]
    Grs80,
    #[serde(rename = "CGG2013A")]
    Cgg2013a,
    #[serde(rename = "CGG2013")]
    Cgg2013,
    #[serde(rename = "HT2_2010v70")]
    Ht2_2010v70,
}

impl VerticalDatum {
    pub const ALL: [VerticalDatum; 5] = [
        VerticalDatum::Wgs84,
        VerticalDatum::Grs80,
        VerticalDatum::Cgg2013a,
        VerticalDatum::Cgg2013,
        VerticalDatum::Ht2_2010v70,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            VerticalDatum::Wgs84 => "WGS84",
            VerticalDatum::Grs80 => "GRS80",
            VerticalDatum::Cgg2013a => "CGG2013A",
            VerticalDatum::Cgg2013 => "CGG2013",
            VerticalDatum::Ht2_2010v70 => "HT2_2010v70",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerticalDatum::Wgs84 => "WGS84",
            VerticalDatum::Grs80 => "GRS80",
            VerticalDatum::Cgg2013a => "CGG2013a",
            VerticalDatum::Cgg2013 => "CGG2013",
            VerticalDatum::Ht2_2010v70 => "HT2_2010v70",
        }
    }

    /// Heights on an ellipsoidal datum need no geoid model.
    pub fn is_ellipsoidal(&self) -> bool {
        matches!(self, VerticalDatum::Wgs84 | VerticalDatum::Grs80)
    }

    /// GTX file holding the geoid undulations for this datum.
    pub fn grid_file(&self) -> Option<&'static str> {
        match self {
            VerticalDatum::Wgs84 | VerticalDatum::Grs80 => None,
            VerticalDatum::Cgg2013a => Some("CGG2013an83.gtx"),
            VerticalDatum::Cgg2013 => Some("CGG2013n83.gtx"),
            VerticalDatum::Ht2_2010v70 => Some("HT2_2010v70.gtx"),
        }
    }
}

impl fmt::Display for VerticalDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for VerticalDatum {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        VerticalDatum::ALL
            .into_iter()
            .find(|d| d.id().eq_ignore_ascii_case(wanted) || d.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParameterError::invalid("vertical_datum", s, "unsupported vertical datum"))
    }
}

// =============================================================================
// Coordinate types
// =============================================================================

/// A northern-hemisphere UTM zone among the supported ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtmZone(u8);

impl UtmZone {
    pub const MIN: u8 = 3;
    pub const MAX: u8 = 23;

    pub fn new(zone: u8) -> Result<Self, ParameterError> {
        if (Self::MIN..=Self::MAX).contains(&zone) {
            Ok(Self(zone))
        } else {
            Err(ParameterError::invalid(
                "utm_zone",
                zone.to_string(),
                format!("UTM zone must be between {} and {}", Self::MIN, Self::MAX),
            ))
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        f64::from(self.0) * 6.0 - 183.0
    }
}

/// How a position is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordType {
    /// Longitude, latitude (degrees), ellipsoidal or orthometric height (m).
    Geographic,
    /// Earth-centred earth-fixed X, Y, Z (m).
    Cartesian,
    /// UTM easting, northing, height (m).
    Utm(UtmZone),
}

impl CoordType {
    pub fn id(&self) -> String {
        match self {
            CoordType::Geographic => "GEOG".to_string(),
            CoordType::Cartesian => "CART".to_string(),
            CoordType::Utm(zone) => format!("UTM{}", zone.number()),
        }
    }

    /// Builds a coordinate type from the UI's kind picker plus zone input.
    pub fn from_selection(kind: &str, utm_zone: Option<u8>) -> Result<Self, ParameterError> {
        let kind = kind.trim();
        if kind.eq_ignore_ascii_case("projected") || kind.eq_ignore_ascii_case("utm") {
            let zone = utm_zone.ok_or_else(|| {
                ParameterError::invalid("utm_zone", "", "a UTM zone is required for projected coordinates")
            })?;
            return Ok(CoordType::Utm(UtmZone::new(zone)?));
        }
        kind.parse()
    }
}

impl fmt::Display for CoordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl FromStr for CoordType {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "GEOG" | "GEOGRAPHIC" => Ok(CoordType::Geographic),
            "CART" | "CARTESIAN" => Ok(CoordType::Cartesian),
            _ => {
                let zone = upper
                    .strip_prefix("UTM")
                    .and_then(|z| z.parse::<u8>().ok())
                    .ok_or_else(|| ParameterError::invalid("coords", s, "unsupported coordinate type"))?;
                Ok(CoordType::Utm(UtmZone::new(zone)?))
            }
        }
    }
}

impl Serialize for CoordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> Deserialize<'de> for CoordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
