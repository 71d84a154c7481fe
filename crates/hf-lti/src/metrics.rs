//! Step response performance metrics.
//!
//! Computes final value, settling time, rise time and overshoot from sampled
//! `(t, y)` step response data, plus the position-error formula used by the
//! humidity loop report.

use serde::{Deserialize, Serialize};

use crate::error::{LtiError, LtiResult};
use crate::transfer_function::DcGain;

/// Lower and upper rise-time levels as fractions of the final value.
pub const RISE_LOW: f64 = 0.05;
pub const RISE_HIGH: f64 = 0.95;

/// Metrics derived from one simulated step response.
///
/// Time metrics are `None` when the level is not reached within the
/// simulated horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResponseMetrics {
    /// Steady-state value the metrics are measured against: the analytic
    /// `dc_gain * amplitude` when known, otherwise the last sample.
    pub final_value: f64,
    /// Last simulated sample.
    pub last_value: f64,
    /// First sample time inside the settling band.
    pub settling_time_s: Option<f64>,
    /// Time between the 5 % and 95 % crossings.
    pub rise_time_s: Option<f64>,
    /// Peak overshoot in percent of the final value, never negative.
    pub overshoot_pct: f64,
    /// Largest excursion in the direction of the final value.
    pub peak_value: f64,
    pub peak_time_s: f64,
}

/// Compute metrics from `(t, y)` samples.
///
/// `steady_state` is the expected final value (`dc_gain * amplitude`); pass
/// `None` when the DC gain is not finite and the last sample is used instead.
///
/// Settling time is the earliest sample with
/// `|y - y_final| <= settle_tolerance * |y_final|`. This is a single
/// crossing check: a response that enters the band and later leaves it still
/// reports the first entry. A response whose last sample lies outside the
/// band has not converged within the horizon and reports no settling time.
pub fn response_metrics(
    samples: &[(f64, f64)],
    settle_tolerance: f64,
    steady_state: Option<f64>,
) -> LtiResult<StepResponseMetrics> {
    let tol = hf_core::ensure_positive(settle_tolerance, "settle tolerance")?;
    let Some(&(_, last_value)) = samples.last() else {
        return Err(LtiError::InvalidArg {
            what: "step response has no samples",
        });
    };
    let final_value = match steady_state {
        Some(v) => hf_core::ensure_finite(v, "steady-state value")?,
        None => last_value,
    };

    let rising = final_value >= 0.0;
    let (peak_time_s, peak_value) = samples
        .iter()
        .copied()
        .fold(samples[0], |best, cur| {
            let better = if rising { cur.1 > best.1 } else { cur.1 < best.1 };
            if better { cur } else { best }
        });

    let mut metrics = StepResponseMetrics {
        final_value,
        last_value,
        settling_time_s: None,
        rise_time_s: None,
        overshoot_pct: 0.0,
        peak_value,
        peak_time_s,
    };

    if final_value.abs() < 1e-12 {
        return Ok(metrics);
    }

    let overshoot = (peak_value - final_value) / final_value * 100.0;
    metrics.overshoot_pct = overshoot.max(0.0);

    let band = tol * final_value.abs();
    if (last_value - final_value).abs() <= band {
        metrics.settling_time_s = samples
            .iter()
            .find(|(_, y)| (y - final_value).abs() <= band)
            .map(|(t, _)| *t);
    }

    let t_low = time_to_fraction(samples, final_value, RISE_LOW);
    let t_high = time_to_fraction(samples, final_value, RISE_HIGH);
    if let (Some(lo), Some(hi)) = (t_low, t_high) {
        metrics.rise_time_s = Some(hi - lo);
    }

    Ok(metrics)
}

/// First time the response reaches `fraction * final_value`, linearly
/// interpolated between samples.
fn time_to_fraction(samples: &[(f64, f64)], final_value: f64, fraction: f64) -> Option<f64> {
    let target = fraction * final_value;
    let reached = |y: f64| {
        if final_value > 0.0 {
            y >= target
        } else {
            y <= target
        }
    };

    for (i, &(t, y)) in samples.iter().enumerate() {
        if !reached(y) {
            continue;
        }
        if i == 0 {
            return Some(t);
        }
        let (t_prev, y_prev) = samples[i - 1];
        return Some(hf_core::interpolate_crossing(t_prev, y_prev, t, y, target));
    }
    None
}

/// Steady-state error to a unit step, `1 / (1 + K)`.
///
/// Valid for unity-feedback Type-0 loops. The humidity report applies it to
/// the sensor-scaled loop gain as well, which is only an approximation there.
/// An infinite `K` (integrator in the
/// loop) gives exactly zero; an undefined `K` or `K = -1` gives `None`.
pub fn steady_state_error(dc_gain: DcGain) -> Option<f64> {
    match dc_gain {
        DcGain::Finite(k) => {
            let denom = 1.0 + k;
            if denom.abs() < 1e-12 {
                None
            } else {
                Some(1.0 / denom)
            }
        }
        DcGain::Infinite => Some(0.0),
        DcGain::Undefined => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rise_time_interpolated() {
        let samples = vec![
            (0.0, 0.0),
            (1.0, 0.1),  // 5 % crossed at t = 0.5
            (2.0, 0.5),
            (3.0, 0.9),
            (4.0, 1.0),  // 95 % crossed at t = 3.5
            (5.0, 1.0),
        ];
        let m = response_metrics(&samples, 0.02, None).unwrap();
        let rise = m.rise_time_s.unwrap();
        assert!((rise - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_overshoot() {
        let samples = vec![(0.0, 0.0), (1.0, 0.5), (2.0, 1.2), (3.0, 1.1), (4.0, 1.0)];
        let m = response_metrics(&samples, 0.02, None).unwrap();
        assert!((m.overshoot_pct - 20.0).abs() < 1e-9);
        assert_eq!(m.peak_time_s, 2.0);
    }

    #[test]
    fn test_overshoot_clamped_for_monotonic() {
        let samples = vec![(0.0, 0.0), (1.0, 0.6), (2.0, 0.9), (3.0, 0.99)];
        let m = response_metrics(&samples, 0.02, None).unwrap();
        assert_eq!(m.overshoot_pct, 0.0);
    }

    #[test]
    fn test_settling_is_first_entry() {
        // Enters the 2 % band at t = 2, leaves at t = 3, re-enters at t = 4.
        let samples = vec![
            (0.0, 0.0),
            (1.0, 0.8),
            (2.0, 1.01),
            (3.0, 1.05),
            (4.0, 1.005),
            (5.0, 1.0),
        ];
        let m = response_metrics(&samples, 0.02, None).unwrap();
        assert_eq!(m.settling_time_s, Some(2.0));
    }

    #[test]
    fn test_negative_final_value() {
        let samples = vec![(0.0, 0.0), (1.0, -0.5), (2.0, -1.1), (3.0, -1.0)];
        let m = response_metrics(&samples, 0.02, None).unwrap();
        assert!((m.overshoot_pct - 10.0).abs() < 1e-9);
        assert!(m.rise_time_s.is_some());
    }

    #[test]
    fn test_zero_final_value_reports_nothing() {
        let samples = vec![(0.0, 0.0), (1.0, 0.0)];
        let m = response_metrics(&samples, 0.02, None).unwrap();
        assert!(m.settling_time_s.is_none());
        assert!(m.rise_time_s.is_none());
    }

    #[test]
    fn test_truncated_response_is_not_settled() {
        // First order heading for 1.0 but cut off at 0.6.
        let samples = vec![(0.0, 0.0), (1.0, 0.3), (2.0, 0.5), (3.0, 0.6)];
        let m = response_metrics(&samples, 0.02, Some(1.0)).unwrap();
        assert_eq!(m.final_value, 1.0);
        assert_eq!(m.last_value, 0.6);
        assert!(m.settling_time_s.is_none());
        assert!(m.rise_time_s.is_none());

        // Without the analytic value the last sample looks settled.
        let m = response_metrics(&samples, 0.02, None).unwrap();
        assert_eq!(m.settling_time_s, Some(3.0));
    }

    #[test]
    fn test_settling_measured_against_steady_state() {
        let samples = vec![(0.0, 0.0), (1.0, 0.9), (2.0, 0.985), (3.0, 0.995)];
        let m = response_metrics(&samples, 0.02, Some(1.0)).unwrap();
        assert_eq!(m.settling_time_s, Some(2.0));
        assert!(response_metrics(&samples, 0.02, Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_empty_series() {
        assert!(response_metrics(&[], 0.02, None).is_err());
        assert!(response_metrics(&[(0.0, 1.0)], 0.0, None).is_err());
    }

    #[test]
    fn test_steady_state_error() {
        assert_eq!(steady_state_error(DcGain::Finite(0.0)), Some(1.0));
        assert_eq!(steady_state_error(DcGain::Infinite), Some(0.0));
        assert_eq!(steady_state_error(DcGain::Undefined), None);
        assert_eq!(steady_state_error(DcGain::Finite(-1.0)), None);
        let big = steady_state_error(DcGain::Finite(1e12)).unwrap();
        assert!(big < 1e-11);
    }
}
