//! Transverse Mercator projection (Krüger n-series) for UTM zones.

use super::ellipsoid::Ellipsoid;
use crate::models::UtmZone;

const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;

/// Series coefficients for one ellipsoid.
#[derive(Debug, Clone, Copy)]
pub struct TransverseMercator {
    /// Rectifying radius times the scale factor.
    k0a: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
    /// Eccentricity.
    e: f64,
}

impl TransverseMercator {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        let n = ellipsoid.n();
        let (n2, n3) = (n * n, n * n * n);
        let a_rect = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

        Self {
            k0a: K0 * a_rect,
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
            e: ellipsoid.e2().sqrt(),
        }
    }

    /// Longitude/latitude (degrees) to easting/northing (m) in `zone`.
    pub fn forward(&self, zone: UtmZone, lon: f64, lat: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let dlam = (lon - zone.central_meridian()).to_radians();

        let t = (phi.sin().atanh() - self.e * (self.e * phi.sin()).atanh()).sinh();
        let xi_p = t.atan2(dlam.cos());
        let eta_p = (dlam.sin() / (1.0 + t * t).sqrt()).atanh();

        let (mut xi, mut eta) = (xi_p, eta_p);
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        (FALSE_EASTING + self.k0a * eta, self.k0a * xi)
    }

    /// Easting/northing (m) in `zone` to longitude/latitude (degrees).
    pub fn inverse(&self, zone: UtmZone, easting: f64, northing: f64) -> (f64, f64) {
        let xi = northing / self.k0a;
        let eta = (easting - FALSE_EASTING) / self.k0a;

        let (mut xi_p, mut eta_p) = (xi, eta);
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, d) in self.delta.iter().enumerate() {
            phi += d * (2.0 * (j as f64 + 1.0) * chi).sin();
        }
        let lam = eta_p.sinh().atan2(xi_p.cos());

        (zone.central_meridian() + lam.to_degrees(), phi.to_degrees())
    }
}
