//! Time-dependent 14-parameter Helmert transformations between frames.
//!
//! Every supported frame is related to ITRF2014. Parameters use the IERS
//! convention:
//!
//! ```text
//! X_to = X_from + T + D·X_from + R·X_from
//!
//!     |  0   -R3   R2 |
//! R = |  R3   0   -R1 |
//!     | -R2   R1   0  |
//! ```
//!
//! with each parameter evaluated at epoch `t` as `P(t) = P + Ṗ·(t − t0)`.

use crate::models::ReferenceFrame;

const MAS_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0 * 1000.0);

/// Helmert parameters in published units: mm, ppb, mas (and per year).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helmert {
    pub t: [f64; 3],
    pub d: f64,
    pub r: [f64; 3],
    pub t_rate: [f64; 3],
    pub d_rate: f64,
    pub r_rate: [f64; 3],
    /// Reference epoch of the parameters.
    pub epoch: f64,
}

/// Parameters evaluated at one epoch, in SI units (m, unitless, rad).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Evaluated {
    t: [f64; 3],
    d: f64,
    r: [f64; 3],
}

impl Helmert {
    const fn new(
        t: [f64; 3],
        d: f64,
        r: [f64; 3],
        t_rate: [f64; 3],
        d_rate: f64,
        r_rate: [f64; 3],
        epoch: f64,
    ) -> Self {
        Self {
            t,
            d,
            r,
            t_rate,
            d_rate,
            r_rate,
            epoch,
        }
    }

    fn at(&self, epoch: f64) -> Evaluated {
        let dt = epoch - self.epoch;
        let lin = |p: f64, rate: f64| p + rate * dt;
        Evaluated {
            t: [0, 1, 2].map(|i| lin(self.t[i], self.t_rate[i]) * 1e-3),
            d: lin(self.d, self.d_rate) * 1e-9,
            r: [0, 1, 2].map(|i| lin(self.r[i], self.r_rate[i]) * MAS_TO_RAD),
        }
    }

    /// Apply the transformation at `epoch`.
    pub fn forward(&self, xyz: [f64; 3], epoch: f64) -> [f64; 3] {
        let p = self.at(epoch);
        let [x, y, z] = xyz;
        [
            x + p.t[0] + p.d * x - p.r[2] * y + p.r[1] * z,
            y + p.t[1] + p.r[2] * x + p.d * y - p.r[0] * z,
            z + p.t[2] - p.r[1] * x + p.r[0] * y + p.d * z,
        ]
    }

    /// Undo [`Helmert::forward`] at the same epoch.
    ///
    /// Solves the linear system exactly, so `inverse(forward(x)) == x` to
    /// floating point precision.
    pub fn inverse(&self, xyz: [f64; 3], epoch: f64) -> [f64; 3] {
        let p = self.at(epoch);
        let b = [xyz[0] - p.t[0], xyz[1] - p.t[1], xyz[2] - p.t[2]];
        let s = 1.0 + p.d;
        let m = [
            [s, -p.r[2], p.r[1]],
            [p.r[2], s, -p.r[0]],
            [-p.r[1], p.r[0], s],
        ];
        solve3(m, b)
    }
}

fn det3(m: [[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Cramer's rule; the Helmert matrix is always close to identity.
fn solve3(m: [[f64; 3]; 3], b: [f64; 3]) -> [f64; 3] {
    let det = det3(m);
    let mut out = [0.0; 3];
    for (col, slot) in out.iter_mut().enumerate() {
        let mut mc = m;
        for row in 0..3 {
            mc[row][col] = b[row];
        }
        *slot = det3(mc) / det;
    }
    out
}

const ITRF_1997_RATES: ([f64; 3], f64, [f64; 3]) = ([0.1, -0.5, -3.3], 0.12, [0.0, 0.0, 0.02]);

/// ITRF2014 → `frame`, or `None` when the frame coincides with ITRF2014.
pub fn from_itrf2014(frame: ReferenceFrame) -> Option<Helmert> {
    let (tr, dr, rr) = ITRF_1997_RATES;
    let params = match frame {
        // WGS84 (G2139) is aligned to ITRF2014 at the centimetre level
        ReferenceFrame::Wgs84 | ReferenceFrame::Itrf14 => return None,
        ReferenceFrame::Nad83Csrs => Helmert::new(
            [1005.30, -1909.21, -541.57],
            0.36891,
            [-26.78138, 0.42027, -10.93206],
            [0.79, -0.60, -1.44],
            -0.07201,
            [-0.06667, 0.75744, 0.05133],
            2010.0,
        ),
        ReferenceFrame::Itrf20 => Helmert::new(
            [1.4, 0.9, -1.4],
            0.42,
            [0.0, 0.0, 0.0],
            [0.0, 0.1, -0.2],
            0.0,
            [0.0, 0.0, 0.0],
            2015.0,
        ),
        ReferenceFrame::Itrf08 => Helmert::new(
            [1.6, 1.9, 2.4],
            -0.02,
            [0.0, 0.0, 0.0],
            [0.0, 0.0, -0.1],
            0.03,
            [0.0, 0.0, 0.0],
            2010.0,
        ),
        ReferenceFrame::Itrf05 => Helmert::new(
            [2.6, 1.0, -2.3],
            0.92,
            [0.0, 0.0, 0.0],
            [0.3, 0.0, -0.1],
            0.03,
            [0.0, 0.0, 0.0],
            2010.0,
        ),
        ReferenceFrame::Itrf00 => Helmert::new(
            [0.7, 1.2, -26.1],
            2.12,
            [0.0, 0.0, 0.0],
            [0.1, 0.1, -1.9],
            0.11,
            [0.0, 0.0, 0.0],
            2010.0,
        ),
        ReferenceFrame::Itrf97 | ReferenceFrame::Itrf96 | ReferenceFrame::Itrf94 => {
            Helmert::new([7.4, -0.5, -62.8], 3.80, [0.0, 0.0, 0.26], tr, dr, rr, 2010.0)
        }
        ReferenceFrame::Itrf93 => Helmert::new(
            [-50.4, 3.3, -60.2],
            4.29,
            [-2.81, -3.38, 0.40],
            [-2.8, -0.1, -2.5],
            0.12,
            [-0.11, -0.19, 0.07],
            2010.0,
        ),
        ReferenceFrame::Itrf92 => {
            Helmert::new([15.4, 1.5, -70.8], 3.09, [0.0, 0.0, 0.26], tr, dr, rr, 2010.0)
        }
        ReferenceFrame::Itrf91 => {
            Helmert::new([27.4, 15.5, -76.8], 4.49, [0.0, 0.0, 0.26], tr, dr, rr, 2010.0)
        }
        ReferenceFrame::Itrf90 => {
            Helmert::new([25.4, 11.5, -92.8], 4.79, [0.0, 0.0, 0.26], tr, dr, rr, 2010.0)
        }
        ReferenceFrame::Itrf89 => {
            Helmert::new([30.4, 35.5, -130.8], 8.19, [0.0, 0.0, 0.26], tr, dr, rr, 2010.0)
        }
        ReferenceFrame::Itrf88 => {
            Helmert::new([25.4, -0.5, -154.8], 11.29, [0.1, 0.0, 0.26], tr, dr, rr, 2010.0)
        }
    };
    Some(params)
}

/// Express `xyz` (in `frame` at `epoch`) in ITRF2014.
pub fn to_itrf2014(frame: ReferenceFrame, xyz: [f64; 3], epoch: f64) -> [f64; 3] {
    match from_itrf2014(frame) {
        Some(h) => h.inverse(xyz, epoch),
        None => xyz,
    }
}

/// Express `xyz` (in ITRF2014 at `epoch`) in `frame`.
pub fn itrf2014_to(frame: ReferenceFrame, xyz: [f64; 3], epoch: f64) -> [f64; 3] {
    match from_itrf2014(frame) {
        Some(h) => h.forward(xyz, epoch),
        None => xyz,
    }
}
