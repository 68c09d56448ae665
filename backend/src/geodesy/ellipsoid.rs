//! Reference ellipsoid and geodetic ↔ earth-centred cartesian conversion.

/// A biaxial reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (m).
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

/// GRS80, the ellipsoid of NAD83(CSRS) and the ITRF realizations.
pub const GRS80: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    f: 1.0 / 298.257_222_101,
};

impl Ellipsoid {
    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Third flattening, the expansion parameter of the UTM series.
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }

    /// Prime vertical radius of curvature at latitude `phi` (radians).
    fn prime_vertical(&self, phi: f64) -> f64 {
        self.a / (1.0 - self.e2() * phi.sin().powi(2)).sqrt()
    }

    /// Longitude/latitude in degrees and ellipsoidal height to ECEF X, Y, Z.
    pub fn geodetic_to_ecef(&self, lon: f64, lat: f64, h: f64) -> [f64; 3] {
        let (lam, phi) = (lon.to_radians(), lat.to_radians());
        let n = self.prime_vertical(phi);
        [
            (n + h) * phi.cos() * lam.cos(),
            (n + h) * phi.cos() * lam.sin(),
            (n * (1.0 - self.e2()) + h) * phi.sin(),
        ]
    }

    /// ECEF X, Y, Z to longitude/latitude in degrees and ellipsoidal height.
    pub fn ecef_to_geodetic(&self, xyz: [f64; 3]) -> [f64; 3] {
        let [x, y, z] = xyz;
        let e2 = self.e2();
        let p = x.hypot(y);
        let lam = y.atan2(x);

        let mut phi = z.atan2(p * (1.0 - e2));
        for _ in 0..10 {
            let n = self.prime_vertical(phi);
            let next = (z + e2 * n * phi.sin()).atan2(p);
            let done = (next - phi).abs() < 1e-14;
            phi = next;
            if done {
                break;
            }
        }

        let h = p * phi.cos() + z * phi.sin() - self.a * (1.0 - e2 * phi.sin().powi(2)).sqrt();
        [lam.to_degrees(), phi.to_degrees(), h]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_prime_meridian() {
        let xyz = GRS80.geodetic_to_ecef(0.0, 0.0, 0.0);
        assert!((xyz[0] - 6_378_137.0).abs() < 1e-6);
        assert!(xyz[1].abs() < 1e-6);
        assert!(xyz[2].abs() < 1e-6);
    }

    #[test]
    fn test_round_trip() {
        for &(lon, lat, h) in &[
            (-75.0, 45.0, 100.0),
            (-123.258333, 52.5125, 1500.0),
            (10.0, -33.0, -20.0),
            (179.9, 89.9, 0.0),
        ] {
            let xyz = GRS80.geodetic_to_ecef(lon, lat, h);
            let [lon2, lat2, h2] = GRS80.ecef_to_geodetic(xyz);
            assert!((lon - lon2).abs() < 1e-10, "lon {lon} vs {lon2}");
            assert!((lat - lat2).abs() < 1e-10, "lat {lat} vs {lat2}");
            assert!((h - h2).abs() < 1e-5, "h {h} vs {h2}");
        }
    }

    #[test]
    fn test_pole() {
        let xyz = GRS80.geodetic_to_ecef(0.0, 90.0, 0.0);
        let b = GRS80.a * (1.0 - GRS80.f);
        assert!((xyz[2] - b).abs() < 1e-6);
        let [_, lat, h] = GRS80.ecef_to_geodetic(xyz);
        assert!((lat - 90.0).abs() < 1e-10);
        assert!(h.abs() < 1e-5);
    }
}
