//! Transformation parameters.
//!
//! [`ParameterSelection`] is the raw shape the UI and CLI send (strings and
//! numbers). Converting it into [`TransformationParameters`] validates every
//! field against the supported sets; the result is immutable.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::frames::{CoordType, ReferenceFrame, VerticalDatum};
use crate::error::ParameterError;

/// A decimal-year epoch, finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Epoch(f64);

impl Epoch {
    pub fn new(year: f64) -> Result<Self, ParameterError> {
        if year.is_finite() && year > 0.0 {
            Ok(Self(year))
        } else {
            Err(ParameterError::invalid(
                "epoch",
                year.to_string(),
                "epoch must be a positive decimal year",
            ))
        }
    }

    /// Decimal year of midnight at the start of `date`.
    pub fn from_date(date: NaiveDate) -> Result<Self, ParameterError> {
        let year = date.year();
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let next = NaiveDate::from_ymd_opt(year + 1, 1, 1);
        let (Some(start), Some(next)) = (start, next) else {
            return Err(ParameterError::invalid("epoch_date", date.to_string(), "date out of range"));
        };
        let elapsed = (date - start).num_days() as f64;
        let length = (next - start).num_days() as f64;
        Self::new(f64::from(year) + elapsed / length)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// One side (source or target) of a transformation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSelection {
    pub frame: ReferenceFrame,
    pub coords: CoordType,
    pub vertical_datum: VerticalDatum,
    pub epoch: Epoch,
}

impl FrameSelection {
    pub fn new(
        frame: ReferenceFrame,
        coords: CoordType,
        vertical_datum: VerticalDatum,
        epoch: Epoch,
    ) -> Self {
        Self {
            frame,
            coords,
            vertical_datum,
            epoch,
        }
    }

    /// Validates a raw selection; `side` prefixes field names in errors.
    pub fn from_selection(raw: &SideSelection, side: &str) -> Result<Self, ParameterError> {
        let prefixed = |e: ParameterError| match e {
            ParameterError::InvalidParameter { field, value, reason } => {
                ParameterError::invalid(format!("{side}.{field}"), value, reason)
            }
        };

        let frame = raw.ref_frame.parse::<ReferenceFrame>().map_err(prefixed)?;
        let coords = CoordType::from_selection(&raw.coords, raw.utm_zone).map_err(prefixed)?;
        let vertical_datum = match raw.vertical_datum.as_deref() {
            Some(vd) if !vd.trim().is_empty() => vd.parse::<VerticalDatum>().map_err(prefixed)?,
            _ => VerticalDatum::Grs80,
        };
        let epoch = match (raw.epoch, raw.epoch_date) {
            (Some(year), _) => Epoch::new(year).map_err(prefixed)?,
            (None, Some(date)) => Epoch::from_date(date).map_err(prefixed)?,
            (None, None) => {
                return Err(ParameterError::invalid(
                    format!("{side}.epoch"),
                    "",
                    "an epoch (decimal year or date) is required",
                ))
            }
        };

        Ok(Self::new(frame, coords, vertical_datum, epoch))
    }
}

/// A complete, validated transformation request.
///
/// Fields are private: once built, a parameter set cannot be altered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformationParameters {
    source: FrameSelection,
    target: FrameSelection,
}

impl TransformationParameters {
    pub fn new(source: FrameSelection, target: FrameSelection) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> &FrameSelection {
        &self.source
    }

    pub fn target(&self) -> &FrameSelection {
        &self.target
    }

    pub fn source_frame(&self) -> ReferenceFrame {
        self.source.frame
    }

    pub fn target_frame(&self) -> ReferenceFrame {
        self.target.frame
    }

    pub fn source_epoch(&self) -> Epoch {
        self.source.epoch
    }

    pub fn target_epoch(&self) -> Epoch {
        self.target.epoch
    }

    /// `Some((from, to))` when heights change reference surface.
    pub fn vertical_datum_change(&self) -> Option<(VerticalDatum, VerticalDatum)> {
        (self.source.vertical_datum != self.target.vertical_datum)
            .then_some((self.source.vertical_datum, self.target.vertical_datum))
    }

    /// Same frame, epoch, datum and coordinate type on both sides.
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }
}

impl TryFrom<&ParameterSelection> for TransformationParameters {
    type Error = ParameterError;

    fn try_from(raw: &ParameterSelection) -> Result<Self, Self::Error> {
        Ok(Self::new(
            FrameSelection::from_selection(&raw.source, "source")?,
            FrameSelection::from_selection(&raw.target, "target")?,
        ))
    }
}

// =============================================================================
// Raw selections (wire format)
// =============================================================================

/// Raw picker values for one side, as sent by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSelection {
    /// Frame id or label.
    pub ref_frame: String,
    /// `Geographic`, `Cartesian`, `Projected`, or an id such as `UTM10`.
    #[serde(default = "default_coords")]
    pub coords: String,
    /// Zone for projected coordinates.
    #[serde(default)]
    pub utm_zone: Option<u8>,
    /// Datum id or label; ellipsoidal (GRS80) when absent.
    #[serde(default)]
    pub vertical_datum: Option<String>,
    /// Decimal year. Takes precedence over `epoch_date`.
    #[serde(default)]
    pub epoch: Option<f64>,
    /// Calendar date, converted to a decimal year.
    #[serde(default)]
    pub epoch_date: Option<NaiveDate>,
}

fn default_coords() -> String {
    "Geographic".to_string()
}

/// Raw picker values for a whole transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSelection {
    pub source: SideSelection,
    pub target: SideSelection,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(frame: &str, epoch: f64) -> SideSelection {
        SideSelection {
            ref_frame: frame.to_string(),
            coords: "Geographic".to_string(),
            utm_zone: None,
            vertical_datum: None,
            epoch: Some(epoch),
            epoch_date: None,
        }
    }

    #[test]
    fn test_valid_selection_builds() {
        let raw = ParameterSelection {
            source: side("NAD83CSRS", 2010.0),
            target: side("ITRF2014", 2023.0),
        };
        let params = TransformationParameters::try_from(&raw).unwrap();
        assert_eq!(params.source_frame(), ReferenceFrame::Nad83Csrs);
        assert_eq!(params.target_frame(), ReferenceFrame::Itrf14);
        assert_eq!(params.source_epoch().value(), 2010.0);
        assert_eq!(params.target_epoch().value(), 2023.0);
        assert!(params.vertical_datum_change().is_none());
        assert!(!params.is_identity());
    }

    #[test]
    fn test_every_supported_frame_pair_builds() {
        for s in ReferenceFrame::ALL {
            for t in ReferenceFrame::ALL {
                let raw = ParameterSelection {
                    source: side(s.label(), 2002.0),
                    target: side(t.id(), 2020.5),
                };
                assert!(TransformationParameters::try_from(&raw).is_ok(), "{s} -> {t}");
            }
        }
    }

    #[test]
    fn test_out_of_set_selections_fail() {
        let raw = ParameterSelection {
            source: side("NAD27", 2010.0),
            target: side("ITRF14", 2010.0),
        };
        let err = TransformationParameters::try_from(&raw).unwrap_err();
        assert!(err.to_string().contains("source.reference_frame"));

        let mut bad_datum = side("ITRF14", 2010.0);
        bad_datum.vertical_datum = Some("NAVD88".into());
        let raw = ParameterSelection {
            source: side("ITRF14", 2010.0),
            target: bad_datum,
        };
        let err = TransformationParameters::try_from(&raw).unwrap_err();
        assert!(err.to_string().contains("target.vertical_datum"));
    }

    #[test]
    fn test_epoch_must_be_positive() {
        assert!(Epoch::new(0.0).is_err());
        assert!(Epoch::new(-2010.0).is_err());
        assert!(Epoch::new(f64::NAN).is_err());
        assert!(Epoch::new(2010.25).is_ok());

        let raw = ParameterSelection {
            source: side("ITRF14", -1.0),
            target: side("ITRF14", 2010.0),
        };
        assert!(TransformationParameters::try_from(&raw).is_err());
    }

    #[test]
    fn test_missing_epoch_fails() {
        let mut no_epoch = side("ITRF14", 2010.0);
        no_epoch.epoch = None;
        let raw = ParameterSelection {
            source: no_epoch,
            target: side("ITRF14", 2010.0),
        };
        let err = TransformationParameters::try_from(&raw).unwrap_err();
        assert!(err.to_string().contains("source.epoch"));
    }

    #[test]
    fn test_epoch_from_date() {
        let jan1 = Epoch::from_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).unwrap();
        assert_eq!(jan1.value(), 2020.0);

        // 2021 is not a leap year: July 2nd is day 182 of 365
        let mid = Epoch::from_date(NaiveDate::from_ymd_opt(2021, 7, 2).unwrap()).unwrap();
        assert!((mid.value() - (2021.0 + 182.0 / 365.0)).abs() < 1e-12);
    }

    #[test]
    fn test_projected_side_and_datum_change() {
        let mut target = side("NAD83CSRS", 2002.0);
        target.coords = "Projected".into();
        target.utm_zone = Some(10);
        target.vertical_datum = Some("CGG2013a".into());

        let mut source = side("WGS84", 2020.0);
        source.vertical_datum = Some("WGS84".into());

        let params = TransformationParameters::try_from(&ParameterSelection { source, target }).unwrap();
        assert_eq!(params.target().coords.id(), "UTM10");
        assert_eq!(
            params.vertical_datum_change(),
            Some((VerticalDatum::Wgs84, VerticalDatum::Cgg2013a))
        );
    }

    #[test]
    fn test_selection_deserializes_from_camel_case() {
        let json = r#"{
            "source": {"refFrame": "NAD83 (CSRS)", "epochDate": "2010-01-01"},
            "target": {"refFrame": "ITRF14", "coords": "Projected", "utmZone": 18, "epoch": 2023.0}
        }"#;
        let raw: ParameterSelection = serde_json::from_str(json).unwrap();
        let params = TransformationParameters::try_from(&raw).unwrap();
        assert_eq!(params.source_epoch().value(), 2010.0);
        assert_eq!(params.target().coords.id(), "UTM18");
    }
}
