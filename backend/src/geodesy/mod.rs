//! Coordinate transformation engines.
//!
//! The conversion pipeline talks to geodesy through the [`TransformEngine`]
//! trait only. [`CsrsEngine`] is the built-in implementation: Helmert
//! transformations through NAD83(CSRS), UTM projection and geoid-based
//! vertical datums. Tests substitute a mock engine.

pub mod ellipsoid;
pub mod engine;
pub mod geoid;
pub mod helmert;
pub mod utm;

use std::sync::Arc;

use serde::Serialize;

use crate::error::EngineResult;
use crate::models::{Coord3, CoordType, ReferenceFrame, TransformationParameters, VerticalDatum};

pub use engine::CsrsEngine;
pub use geoid::{GeoidGrid, GeoidModels};

/// The exact arguments handed to an engine for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineRequest {
    pub s_ref_frame: ReferenceFrame,
    pub s_coords: CoordType,
    pub s_vd: VerticalDatum,
    pub s_epoch: f64,
    pub t_ref_frame: ReferenceFrame,
    pub t_coords: CoordType,
    pub t_vd: VerticalDatum,
    pub t_epoch: f64,
}

impl From<&TransformationParameters> for EngineRequest {
    fn from(params: &TransformationParameters) -> Self {
        let (s, t) = (params.source(), params.target());
        Self {
            s_ref_frame: s.frame,
            s_coords: s.coords,
            s_vd: s.vertical_datum,
            s_epoch: s.epoch.value(),
            t_ref_frame: t.frame,
            t_coords: t.coords,
            t_vd: t.vertical_datum,
            t_epoch: t.epoch.value(),
        }
    }
}

/// Converts a batch of points between frames, epochs, coordinate types and
/// vertical datums.
///
/// Points are in engine axis order: `(lon, lat, h)` for geographic,
/// `(x, y, z)` for cartesian and `(easting, northing, h)` for UTM.
/// Implementations must return exactly one output per input, in order,
/// or fail for the whole batch.
pub trait TransformEngine: Send + Sync {
    /// Short identifier recorded in inspection snapshots.
    fn name(&self) -> &str;

    fn transform(&self, request: &EngineRequest, points: &[Coord3]) -> EngineResult<Vec<Coord3>>;

    /// Caveats about how this engine handles `request`, shown with the result.
    fn notes(&self, _request: &EngineRequest) -> Vec<String> {
        Vec::new()
    }
}

impl<T: TransformEngine + ?Sized> TransformEngine for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn transform(&self, request: &EngineRequest, points: &[Coord3]) -> EngineResult<Vec<Coord3>> {
        (**self).transform(request, points)
    }

    fn notes(&self, request: &EngineRequest) -> Vec<String> {
        (**self).notes(request)
    }
}

impl<T: TransformEngine + ?Sized> TransformEngine for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn transform(&self, request: &EngineRequest, points: &[Coord3]) -> EngineResult<Vec<Coord3>> {
        (**self).transform(request, points)
    }

    fn notes(&self, request: &EngineRequest) -> Vec<String> {
        (**self).notes(request)
    }
}
