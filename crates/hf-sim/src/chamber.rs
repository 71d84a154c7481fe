//! Enclosure fill model.
//!
//! Vapour density `rho` (g/m^3) in a closed chamber of volume `V` evolves as
//!
//! ```text
//! d(rho V)/dt = dotm - Q (rho - rho_out) - condensation
//! ```
//!
//! with `Q = ACH * V / 60` (m^3/min). The model is stepped explicitly in
//! minutes; after each step the density is clamped to `[0, rho_sat]` and any
//! excess above saturation is booked as condensed mass.

use hf_core::units::working::{
    g_per_m3_of, g_per_min_of, m3_of, minutes_of, per_hour_of, percent_of,
};
use hf_core::{
    Frequency, MassRate, Ratio, Temperature, Time, Volume, degc, g_per_min, m3, minutes,
    per_hour, percent,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::psychro::{density_from_rh, saturation_density};

/// Condensation loss model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condensation {
    /// Constant loss, capped by the vapour mass present.
    Fixed { rate: MassRate },
    /// Loss proportional to the vapour excess above saturation.
    Proportional { rate: Frequency },
}

impl Condensation {
    /// Mass removed during one step of `dt_min` minutes.
    fn loss_g(&self, rho: f64, rho_sat: f64, volume_m3: f64, dt_min: f64) -> f64 {
        match *self {
            Self::Fixed { rate } => (g_per_min_of(rate) * dt_min).min((rho * volume_m3).max(0.0)),
            Self::Proportional { rate } => {
                // rate is per minute in the working units
                let k = per_hour_of(rate) / 60.0;
                (rho - rho_sat).max(0.0) * volume_m3 * k * dt_min
            }
        }
    }
}

/// Inputs of a fill run.
#[derive(Debug, Clone, PartialEq)]
pub struct FillParameters {
    pub volume: Volume,
    pub humidifier_rate: MassRate,
    pub temperature: Temperature,
    pub initial_rh: Ratio,
    pub outdoor_rh: Ratio,
    /// Air changes per hour.
    pub air_changes: Frequency,
    pub condensation: Condensation,
    pub target_rh: Ratio,
    pub dt: Time,
    pub t_max: Time,
}

impl Default for FillParameters {
    fn default() -> Self {
        Self {
            volume: m3(0.2),
            humidifier_rate: g_per_min(3.3),
            temperature: degc(20.0),
            initial_rh: percent(0.0),
            outdoor_rh: percent(20.0),
            air_changes: per_hour(10.0),
            condensation: Condensation::Fixed {
                rate: g_per_min(0.55),
            },
            target_rh: percent(100.0),
            dt: minutes(0.05),
            t_max: minutes(60.0),
        }
    }
}

impl FillParameters {
    pub fn validate(&self) -> SimResult<()> {
        hf_core::ensure_positive(m3_of(self.volume), "chamber volume")?;
        hf_core::ensure_positive(minutes_of(self.dt), "fill time step")?;
        hf_core::ensure_positive(minutes_of(self.t_max), "fill horizon")?;
        non_negative(g_per_min_of(self.humidifier_rate), "humidifier rate")?;
        non_negative(per_hour_of(self.air_changes), "air changes per hour")?;
        let condensation_rate = match self.condensation {
            Condensation::Fixed { rate } => g_per_min_of(rate),
            Condensation::Proportional { rate } => per_hour_of(rate),
        };
        non_negative(condensation_rate, "condensation rate")?;
        for (rh, what) in [
            (self.initial_rh, "initial relative humidity"),
            (self.outdoor_rh, "outdoor relative humidity"),
            (self.target_rh, "target relative humidity"),
        ] {
            let v = hf_core::ensure_finite(percent_of(rh), what)?;
            if !(0.0..=100.0).contains(&v) {
                return Err(SimError::InvalidArg {
                    what: "relative humidity must lie in 0..=100 %",
                });
            }
        }
        if minutes_of(self.dt) > minutes_of(self.t_max) {
            return Err(SimError::InvalidArg {
                what: "fill time step exceeds the horizon",
            });
        }
        Ok(())
    }
}

fn non_negative(v: f64, what: &'static str) -> SimResult<f64> {
    let v = hf_core::ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(SimError::InvalidArg { what });
    }
    Ok(v)
}

/// Chamber state in working units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChamberState {
    pub density_g_m3: f64,
    pub injected_g: f64,
    pub condensed_g: f64,
}

/// Recorded fill trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRecord {
    pub times_min: Vec<f64>,
    pub density_g_m3: Vec<f64>,
    /// `None` when the target is not reached before `t_max`.
    pub time_to_target_min: Option<f64>,
    pub injected_g: f64,
    pub condensed_g: f64,
    pub saturation_g_m3: f64,
    pub target_g_m3: f64,
}

impl FillRecord {
    pub fn rh_pct(&self) -> impl Iterator<Item = f64> + '_ {
        let sat = self.saturation_g_m3;
        self.density_g_m3.iter().map(move |rho| rho / sat * 100.0)
    }

    pub fn final_rh_pct(&self) -> f64 {
        self.density_g_m3
            .last()
            .map_or(0.0, |rho| rho / self.saturation_g_m3 * 100.0)
    }

    pub fn time_to_target_s(&self) -> Option<f64> {
        self.time_to_target_min.map(|t| t * 60.0)
    }
}

/// Constant per-run quantities in working units.
struct Chamber {
    volume_m3: f64,
    inject_g_min: f64,
    vent_m3_min: f64,
    rho_out: f64,
    rho_sat: f64,
    condensation: Condensation,
}

impl Chamber {
    fn step(&self, state: &ChamberState, dt_min: f64) -> ChamberState {
        let v = self.volume_m3;
        let rho = state.density_g_m3;
        let mass = rho * v;

        let injected = self.inject_g_min * dt_min;
        let vented = self.vent_m3_min * (rho - self.rho_out) * dt_min;
        let condensed = self.condensation.loss_g(rho, self.rho_sat, v, dt_min);

        let mut next_rho = ((mass + injected - vented - condensed) / v).max(0.0);
        let mut saturated = 0.0;
        if next_rho > self.rho_sat {
            saturated = (next_rho - self.rho_sat) * v;
            next_rho = self.rho_sat;
        }

        ChamberState {
            density_g_m3: next_rho,
            injected_g: state.injected_g + injected,
            condensed_g: state.condensed_g + condensed + saturated,
        }
    }
}

/// Step the chamber from its initial humidity until the target is reached or
/// the horizon runs out.
pub fn simulate_fill(params: &FillParameters) -> SimResult<FillRecord> {
    params.validate()?;

    let rho_sat = g_per_m3_of(saturation_density(params.temperature)?);
    let volume_m3 = m3_of(params.volume);
    let chamber = Chamber {
        volume_m3,
        inject_g_min: g_per_min_of(params.humidifier_rate),
        vent_m3_min: per_hour_of(params.air_changes) * volume_m3 / 60.0,
        rho_out: g_per_m3_of(density_from_rh(params.outdoor_rh, params.temperature)?),
        rho_sat,
        condensation: params.condensation,
    };
    let target = percent_of(params.target_rh) / 100.0 * rho_sat;

    let dt = minutes_of(params.dt);
    let max_steps = (minutes_of(params.t_max) / dt + 1e-9).floor() as usize;

    let mut state = ChamberState {
        density_g_m3: g_per_m3_of(density_from_rh(params.initial_rh, params.temperature)?),
        ..ChamberState::default()
    };
    let mut times = Vec::with_capacity(max_steps + 1);
    let mut densities = Vec::with_capacity(max_steps + 1);
    times.push(0.0);
    densities.push(state.density_g_m3);

    let mut reached = None;
    for i in 1..=max_steps {
        state = chamber.step(&state, dt);
        let t = i as f64 * dt;
        times.push(t);
        densities.push(state.density_g_m3);
        if state.density_g_m3 >= target {
            reached = Some(t);
            break;
        }
    }

    debug!(
        steps = times.len() - 1,
        reached = ?reached,
        injected_g = state.injected_g,
        condensed_g = state.condensed_g,
        "fill simulation finished"
    );

    Ok(FillRecord {
        times_min: times,
        density_g_m3: densities,
        time_to_target_min: reached,
        injected_g: state.injected_g,
        condensed_g: state.condensed_g,
        saturation_g_m3: rho_sat,
        target_g_m3: target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chamber() -> Chamber {
        Chamber {
            volume_m3: 1.0,
            inject_g_min: 0.0,
            vent_m3_min: 0.0,
            rho_out: 0.0,
            rho_sat: 10.0,
            condensation: Condensation::Fixed {
                rate: g_per_min(0.0),
            },
        }
    }

    #[test]
    fn injection_only() {
        let c = Chamber {
            inject_g_min: 2.0,
            ..chamber()
        };
        let s = c.step(&ChamberState::default(), 0.5);
        assert!((s.density_g_m3 - 1.0).abs() < 1e-12);
        assert!((s.injected_g - 1.0).abs() < 1e-12);
        assert_eq!(s.condensed_g, 0.0);
    }

    #[test]
    fn saturation_excess_is_condensed() {
        let c = Chamber {
            inject_g_min: 4.0,
            ..chamber()
        };
        let start = ChamberState {
            density_g_m3: 9.0,
            ..ChamberState::default()
        };
        let s = c.step(&start, 1.0);
        assert_eq!(s.density_g_m3, 10.0);
        assert!((s.condensed_g - 3.0).abs() < 1e-12);
    }

    #[test]
    fn fixed_loss_capped_by_available_mass() {
        let c = Chamber {
            condensation: Condensation::Fixed {
                rate: g_per_min(5.0),
            },
            ..chamber()
        };
        let start = ChamberState {
            density_g_m3: 1.0,
            ..ChamberState::default()
        };
        let s = c.step(&start, 1.0);
        assert_eq!(s.density_g_m3, 0.0);
        assert!((s.condensed_g - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ventilation_pulls_towards_outdoor() {
        let c = Chamber {
            vent_m3_min: 0.1,
            rho_out: 5.0,
            ..chamber()
        };
        let s = c.step(&ChamberState::default(), 1.0);
        assert!((s.density_g_m3 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn proportional_loss_needs_supersaturation() {
        let cond = Condensation::Proportional { rate: per_hour(60.0) };
        assert_eq!(cond.loss_g(5.0, 10.0, 1.0, 1.0), 0.0);
        assert!((cond.loss_g(12.0, 10.0, 1.0, 0.5) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_bad_inputs() {
        let base = FillParameters::default();
        assert!(base.validate().is_ok());

        let p = FillParameters { volume: m3(0.0), ..base.clone() };
        assert!(p.validate().is_err());
        let p = FillParameters { target_rh: percent(120.0), ..base.clone() };
        assert!(p.validate().is_err());
        let p = FillParameters { humidifier_rate: g_per_min(-1.0), ..base.clone() };
        assert!(p.validate().is_err());
        let p = FillParameters { dt: minutes(0.0), ..base };
        assert!(p.validate().is_err());
    }

    #[test]
    fn validate_checks_condensation_rate_of_either_model() {
        let base = FillParameters::default();
        for condensation in [
            Condensation::Fixed { rate: g_per_min(-0.1) },
            Condensation::Proportional { rate: per_hour(-0.1) },
            Condensation::Fixed { rate: g_per_min(f64::NAN) },
        ] {
            let p = FillParameters { condensation, ..base.clone() };
            assert!(p.validate().is_err(), "{condensation:?}");
        }
        let p = FillParameters {
            condensation: Condensation::Proportional { rate: per_hour(33.0) },
            ..base
        };
        assert!(p.validate().is_ok());
    }
}
