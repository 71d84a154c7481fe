//! Frequency response sweeps and stability margins.
//!
//! Margins follow the usual Bode definitions:
//! - phase margin `PM = 180 deg + phase(L(j w_gc))` where `|L(j w_gc)| = 1`
//! - gain margin `GM = 1 / |L(j w_pc)|` where `phase(L(j w_pc)) = -180 deg`
//!
//! Crossings are located on a log-spaced sweep and refined by linear
//! interpolation in `log10(w)`.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{LtiError, LtiResult};
use crate::transfer_function::TransferFunction;

/// Log-spaced angular frequency grid (rad/s).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyGrid {
    omegas: Vec<f64>,
}

impl FrequencyGrid {
    pub fn logspace(min_rad_s: f64, max_rad_s: f64, points: usize) -> LtiResult<Self> {
        Ok(Self {
            omegas: hf_core::logspace(min_rad_s, max_rad_s, points)?,
        })
    }

    pub fn omegas(&self) -> &[f64] {
        &self.omegas
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodePoint {
    pub omega_rad_s: f64,
    pub magnitude: f64,
    pub magnitude_db: f64,
    /// Unwrapped phase in degrees.
    pub phase_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodeResponse {
    pub points: Vec<BodePoint>,
}

/// Gain/phase margins of an open-loop transfer function.
///
/// Absent crossings leave the frequency `None` and the margin infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityMargins {
    pub gain_margin: f64,
    pub gain_margin_db: f64,
    pub phase_margin_deg: f64,
    pub phase_crossover_rad_s: Option<f64>,
    pub gain_crossover_rad_s: Option<f64>,
}

impl StabilityMargins {
    /// Both margins strictly positive.
    pub fn is_stable(&self) -> bool {
        self.gain_margin_db > 0.0 && self.phase_margin_deg > 0.0
    }
}

/// Sweep `tf(j w)` over the grid, unwrapping the phase.
pub fn bode(tf: &TransferFunction, grid: &FrequencyGrid) -> LtiResult<BodeResponse> {
    let mut points = Vec::with_capacity(grid.omegas.len());
    let mut prev_raw: Option<f64> = None;
    let mut offset = 0.0;

    for &w in &grid.omegas {
        let g = tf.freq_response(w).ok_or_else(|| LtiError::Degenerate {
            what: format!("pole on the imaginary axis at w = {w:.6} rad/s"),
        })?;
        let raw = g.arg();
        if let Some(prev) = prev_raw {
            let jump = raw - prev;
            if jump > PI {
                offset -= 2.0 * PI;
            } else if jump < -PI {
                offset += 2.0 * PI;
            }
        }
        prev_raw = Some(raw);

        let magnitude = g.norm();
        points.push(BodePoint {
            omega_rad_s: w,
            magnitude,
            magnitude_db: 20.0 * magnitude.log10(),
            phase_deg: (raw + offset).to_degrees(),
        });
    }

    Ok(BodeResponse { points })
}

/// Gain and phase margins from a sweep of the open-loop transfer function.
///
/// When several crossings exist, the most critical one (smallest margin) is
/// reported.
pub fn stability_margins(tf: &TransferFunction, grid: &FrequencyGrid) -> LtiResult<StabilityMargins> {
    let resp = bode(tf, grid)?;
    let mut margins = StabilityMargins {
        gain_margin: f64::INFINITY,
        gain_margin_db: f64::INFINITY,
        phase_margin_deg: f64::INFINITY,
        phase_crossover_rad_s: None,
        gain_crossover_rad_s: None,
    };

    for pair in resp.points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (la, lb) = (a.omega_rad_s.log10(), b.omega_rad_s.log10());

        // Phase crossover: unwrapped phase crosses -180 (mod 360).
        let ka = ((a.phase_deg + 180.0) / 360.0).floor();
        let kb = ((b.phase_deg + 180.0) / 360.0).floor();
        if ka != kb {
            let target = 360.0 * ka.max(kb) - 180.0;
            let lw = hf_core::interpolate_crossing(la, a.phase_deg, lb, b.phase_deg, target);
            let w = 10f64.powf(lw);
            if let Some(g) = tf.freq_response(w) {
                let gm = 1.0 / g.norm();
                if gm < margins.gain_margin {
                    margins.gain_margin = gm;
                    margins.gain_margin_db = 20.0 * gm.log10();
                    margins.phase_crossover_rad_s = Some(w);
                }
            }
        }

        // Gain crossover: magnitude crosses 0 dB.
        if (a.magnitude_db >= 0.0) != (b.magnitude_db >= 0.0) {
            let lw = hf_core::interpolate_crossing(la, a.magnitude_db, lb, b.magnitude_db, 0.0);
            let w = 10f64.powf(lw);
            if let Some(g) = tf.freq_response(w) {
                let pm = wrap_degrees(g.arg().to_degrees() + 180.0);
                if pm < margins.phase_margin_deg {
                    margins.phase_margin_deg = pm;
                    margins.gain_crossover_rad_s = Some(w);
                }
            }
        }
    }

    Ok(margins)
}

/// Wrap an angle into (-180, 180].
fn wrap_degrees(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d <= -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }
    d
}
