//! Built-in transformation engine.
//!
//! Every point follows the same path:
//!
//! 1. source coordinates to geodetic longitude/latitude/height
//! 2. orthometric heights to ellipsoidal (`h = H + N`)
//! 3. source frame at source epoch to NAD83(CSRS), via ITRF2014
//! 4. NAD83(CSRS) to target frame at target epoch
//! 5. ellipsoidal heights to the target vertical datum (`H = h - N`)
//! 6. geodetic to target coordinates
//!
//! NAD83(CSRS) is held fixed to the North American plate, so the epoch
//! change happens there with zero velocity. The NRCan NAD83v70VG velocity
//! grid (residual intraplate motion, a few mm/yr) is not applied; requests
//! that change epoch get a note saying so. Step 3 and 4 are skipped when
//! both sides share a frame and an epoch.

use tracing::debug;

use super::ellipsoid::GRS80;
use super::geoid::GeoidModels;
use super::helmert::{itrf2014_to, to_itrf2014};
use super::utm::TransverseMercator;
use super::{EngineRequest, TransformEngine};
use crate::error::{EngineError, EngineResult};
use crate::models::{Coord3, CoordType, ReferenceFrame, VerticalDatum};

pub struct CsrsEngine {
    geoids: GeoidModels,
    tm: TransverseMercator,
}

impl CsrsEngine {
    pub fn new(geoids: GeoidModels) -> Self {
        Self {
            geoids,
            tm: TransverseMercator::new(GRS80),
        }
    }

    /// An engine that only supports ellipsoidal heights.
    pub fn without_geoids() -> Self {
        Self::new(GeoidModels::new())
    }

    pub fn geoids(&self) -> &GeoidModels {
        &self.geoids
    }

    fn to_geodetic(&self, index: usize, coords: CoordType, p: Coord3) -> EngineResult<[f64; 3]> {
        let [lon, lat, h] = match coords {
            CoordType::Geographic => [p.0, p.1, p.2],
            CoordType::Cartesian => GRS80.ecef_to_geodetic([p.0, p.1, p.2]),
            CoordType::Utm(zone) => {
                let (lon, lat) = self.tm.inverse(zone, p.0, p.1);
                [lon, lat, p.2]
            }
        };
        if !(-90.0..=90.0).contains(&lat) {
            return Err(EngineError::OutOfRange {
                index,
                reason: format!("latitude {lat} outside [-90, 90]"),
            });
        }
        if !(-180.0..=360.0).contains(&lon) {
            return Err(EngineError::OutOfRange {
                index,
                reason: format!("longitude {lon} outside [-180, 360]"),
            });
        }
        Ok([lon, lat, h])
    }

    fn from_geodetic(&self, index: usize, coords: CoordType, [lon, lat, h]: [f64; 3]) -> EngineResult<Coord3> {
        match coords {
            CoordType::Geographic => Ok(Coord3(lon, lat, h)),
            CoordType::Cartesian => {
                let [x, y, z] = GRS80.geodetic_to_ecef(lon, lat, h);
                Ok(Coord3(x, y, z))
            }
            CoordType::Utm(zone) => {
                let offset = (lon - zone.central_meridian() + 180.0).rem_euclid(360.0) - 180.0;
                if offset.abs() > 30.0 {
                    return Err(EngineError::OutOfRange {
                        index,
                        reason: format!("longitude {lon} is too far from UTM zone {}", zone.number()),
                    });
                }
                let (e, n) = self.tm.forward(zone, lon, lat);
                Ok(Coord3(e, n, h))
            }
        }
    }

    /// Geoid undulation for an orthometric datum, `0.0` for ellipsoidal ones.
    ///
    /// Cartesian positions carry no height datum of their own.
    fn undulation(&self, index: usize, datum: VerticalDatum, coords: CoordType, lon: f64, lat: f64) -> EngineResult<f64> {
        if datum.is_ellipsoidal() || coords == CoordType::Cartesian {
            return Ok(0.0);
        }
        let grid = self
            .geoids
            .get(datum)
            .ok_or_else(|| EngineError::MissingGrid(datum.id().to_string()))?;
        grid.undulation(lon, lat).ok_or_else(|| EngineError::OutsideGrid {
            index,
            grid: grid.name().to_string(),
            lon,
            lat,
        })
    }

    fn transform_point(&self, request: &EngineRequest, index: usize, p: Coord3) -> EngineResult<Coord3> {
        if !p.is_finite() {
            return Err(EngineError::NonFinite {
                index,
                x: p.0,
                y: p.1,
                z: p.2,
            });
        }

        let [lon, lat, height] = self.to_geodetic(index, request.s_coords, p)?;
        let h = height + self.undulation(index, request.s_vd, request.s_coords, lon, lat)?;

        let same_frame = request.s_ref_frame == request.t_ref_frame && request.s_epoch == request.t_epoch;
        let [lon, lat, h] = if same_frame {
            [lon, lat, h]
        } else {
            let xyz = GRS80.geodetic_to_ecef(lon, lat, h);
            let nad83 = frame_to_nad83(request.s_ref_frame, xyz, request.s_epoch);
            let out = nad83_to_frame(request.t_ref_frame, nad83, request.t_epoch);
            GRS80.ecef_to_geodetic(out)
        };

        let h = h - self.undulation(index, request.t_vd, request.t_coords, lon, lat)?;
        let out = self.from_geodetic(index, request.t_coords, [lon, lat, h])?;

        if !out.is_finite() {
            return Err(EngineError::NonFinite {
                index,
                x: out.0,
                y: out.1,
                z: out.2,
            });
        }
        Ok(out)
    }
}

fn frame_to_nad83(frame: ReferenceFrame, xyz: [f64; 3], epoch: f64) -> [f64; 3] {
    if frame == ReferenceFrame::Nad83Csrs {
        return xyz;
    }
    let itrf14 = to_itrf2014(frame, xyz, epoch);
    itrf2014_to(ReferenceFrame::Nad83Csrs, itrf14, epoch)
}

fn nad83_to_frame(frame: ReferenceFrame, xyz: [f64; 3], epoch: f64) -> [f64; 3] {
    if frame == ReferenceFrame::Nad83Csrs {
        return xyz;
    }
    let itrf14 = to_itrf2014(ReferenceFrame::Nad83Csrs, xyz, epoch);
    itrf2014_to(frame, itrf14, epoch)
}

impl TransformEngine for CsrsEngine {
    fn name(&self) -> &str {
        "csrs"
    }

    fn transform(&self, request: &EngineRequest, points: &[Coord3]) -> EngineResult<Vec<Coord3>> {
        debug!(
            points = points.len(),
            from = %request.s_ref_frame,
            to = %request.t_ref_frame,
            "Transforming batch"
        );
        points
            .iter()
            .enumerate()
            .map(|(index, &p)| self.transform_point(request, index, p))
            .collect()
    }

    fn notes(&self, request: &EngineRequest) -> Vec<String> {
        if request.s_epoch == request.t_epoch {
            return Vec::new();
        }
        vec![format!(
            "Epoch {} -> {} propagated with NAD83(CSRS) plate motion only; the NAD83v70VG velocity grid is not applied",
            request.s_epoch, request.t_epoch
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::geoid::tests::small_grid;
    use crate::geodesy::GeoidGrid;
    use crate::models::UtmZone;

    fn request(
        s_frame: ReferenceFrame,
        s_coords: CoordType,
        s_epoch: f64,
        t_frame: ReferenceFrame,
        t_coords: CoordType,
        t_epoch: f64,
    ) -> EngineRequest {
        EngineRequest {
            s_ref_frame: s_frame,
            s_coords,
            s_vd: VerticalDatum::Grs80,
            s_epoch,
            t_ref_frame: t_frame,
            t_coords,
            t_vd: VerticalDatum::Grs80,
            t_epoch,
        }
    }

    fn ottawa() -> Coord3 {
        Coord3(-75.7, 45.4, 100.0)
    }

    #[test]
    fn test_identity_returns_input() {
        let engine = CsrsEngine::without_geoids();
        let req = request(
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
        );
        let out = engine.transform(&req, &[ottawa()]).unwrap();
        assert_eq!(out, vec![ottawa()]);
    }

    #[test]
    fn test_geographic_cartesian_round_trip() {
        let engine = CsrsEngine::without_geoids();
        let to_cart = request(
            ReferenceFrame::Itrf14,
            CoordType::Geographic,
            2020.0,
            ReferenceFrame::Itrf14,
            CoordType::Cartesian,
            2020.0,
        );
        let back = request(
            ReferenceFrame::Itrf14,
            CoordType::Cartesian,
            2020.0,
            ReferenceFrame::Itrf14,
            CoordType::Geographic,
            2020.0,
        );
        let cart = engine.transform(&to_cart, &[ottawa()]).unwrap();
        let geog = engine.transform(&back, &cart).unwrap();
        assert!((geog[0].0 - ottawa().0).abs() < 1e-10);
        assert!((geog[0].1 - ottawa().1).abs() < 1e-10);
        assert!((geog[0].2 - ottawa().2).abs() < 1e-5);
    }

    #[test]
    fn test_utm_output() {
        let engine = CsrsEngine::without_geoids();
        let zone = UtmZone::new(18).unwrap();
        let req = request(
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
            ReferenceFrame::Nad83Csrs,
            CoordType::Utm(zone),
            2010.0,
        );
        let out = engine.transform(&req, &[Coord3(-75.0, 45.0, 50.0)]).unwrap();
        assert!((out[0].0 - 500_000.0).abs() < 1e-6);
        assert!((out[0].1 - 4_982_950.4).abs() < 0.05);
        assert_eq!(out[0].2, 50.0);
    }

    #[test]
    fn test_itrf_to_nad83_moves_about_a_metre() {
        let engine = CsrsEngine::without_geoids();
        let req = request(
            ReferenceFrame::Itrf14,
            CoordType::Cartesian,
            2010.0,
            ReferenceFrame::Nad83Csrs,
            CoordType::Cartesian,
            2010.0,
        );
        let [x, y, z] = GRS80.geodetic_to_ecef(-75.7, 45.4, 100.0);
        let out = engine.transform(&req, &[Coord3(x, y, z)]).unwrap();
        let d = ((out[0].0 - x).powi(2) + (out[0].1 - y).powi(2) + (out[0].2 - z).powi(2)).sqrt();
        assert!(d > 0.5 && d < 3.0, "shift {d}");
    }

    #[test]
    fn test_nad83_epoch_change_without_velocity_grid() {
        let engine = CsrsEngine::without_geoids();
        let req = request(
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2002.0,
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
        );
        let out = engine.transform(&req, &[ottawa()]).unwrap();
        assert!((out[0].0 - ottawa().0).abs() < 1e-10);
        assert!((out[0].1 - ottawa().1).abs() < 1e-10);
        assert!((out[0].2 - ottawa().2).abs() < 1e-5);

        let notes = engine.notes(&req);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("NAD83v70VG"));
    }

    #[test]
    fn test_same_epoch_has_no_notes() {
        let engine = CsrsEngine::without_geoids();
        let req = request(
            ReferenceFrame::Itrf14,
            CoordType::Geographic,
            2010.0,
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
        );
        assert!(engine.notes(&req).is_empty());
    }

    #[test]
    fn test_itrf_epoch_change_follows_plate_motion() {
        let engine = CsrsEngine::without_geoids();
        let req = request(
            ReferenceFrame::Itrf14,
            CoordType::Cartesian,
            2010.0,
            ReferenceFrame::Itrf14,
            CoordType::Cartesian,
            2020.0,
        );
        let [x, y, z] = GRS80.geodetic_to_ecef(-75.7, 45.4, 100.0);
        let out = engine.transform(&req, &[Coord3(x, y, z)]).unwrap();
        let d = ((out[0].0 - x).powi(2) + (out[0].1 - y).powi(2) + (out[0].2 - z).powi(2)).sqrt();
        // North America moves ~2 cm/yr in ITRF
        assert!(d > 0.05 && d < 0.5, "shift {d}");
    }

    #[test]
    fn test_orthometric_height_uses_geoid() {
        let mut geoids = GeoidModels::new();
        geoids.insert(VerticalDatum::Cgg2013a, GeoidGrid::from_bytes("small.gtx", &small_grid()).unwrap());
        let engine = CsrsEngine::new(geoids);

        let mut req = request(
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
        );
        req.t_vd = VerticalDatum::Cgg2013a;

        // N = -27 at the grid centre, so H = h + 27
        let out = engine.transform(&req, &[Coord3(-74.5, 45.5, 100.0)]).unwrap();
        assert!((out[0].2 - 127.0).abs() < 1e-9);

        req.s_vd = VerticalDatum::Cgg2013a;
        req.t_vd = VerticalDatum::Grs80;
        let out = engine.transform(&req, &[Coord3(-74.5, 45.5, 127.0)]).unwrap();
        assert!((out[0].2 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_and_outside_grid() {
        let mut req = request(
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
        );
        req.t_vd = VerticalDatum::Cgg2013a;

        let err = CsrsEngine::without_geoids().transform(&req, &[ottawa()]).unwrap_err();
        assert!(matches!(err, EngineError::MissingGrid(ref d) if d == "CGG2013A"));

        let mut geoids = GeoidModels::new();
        geoids.insert(VerticalDatum::Cgg2013a, GeoidGrid::from_bytes("small.gtx", &small_grid()).unwrap());
        let err = CsrsEngine::new(geoids)
            .transform(&req, &[Coord3(-74.5, 45.5, 0.0), Coord3(-120.0, 50.0, 0.0)])
            .unwrap_err();
        assert!(matches!(err, EngineError::OutsideGrid { index: 1, .. }));
    }

    #[test]
    fn test_rejects_bad_points() {
        let engine = CsrsEngine::without_geoids();
        let req = request(
            ReferenceFrame::Itrf14,
            CoordType::Geographic,
            2010.0,
            ReferenceFrame::Nad83Csrs,
            CoordType::Geographic,
            2010.0,
        );
        let err = engine.transform(&req, &[ottawa(), Coord3(f64::NAN, 45.0, 0.0)]).unwrap_err();
        assert!(matches!(err, EngineError::NonFinite { index: 1, .. }));

        let err = engine.transform(&req, &[Coord3(-75.0, 95.0, 0.0)]).unwrap_err();
        assert!(matches!(err, EngineError::OutOfRange { index: 0, .. }));
    }
}
