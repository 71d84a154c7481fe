//! Configuration validation logic.

use crate::schema::{AnalysisConfig, AnalysisDef, CompensatorDef, CondensationDef, FillDef, PlantDef};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &AnalysisConfig) -> Result<(), ValidationError> {
    if config.version == 0 || config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    validate_plant(&config.plant)?;
    validate_compensator(&config.compensator)?;
    validate_analysis(&config.analysis)?;
    validate_fill(&config.fill)?;
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, v: f64) -> Result<f64, ValidationError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(invalid(field, v, "must be finite"))
    }
}

fn positive(field: &str, v: f64) -> Result<f64, ValidationError> {
    if finite(field, v)? > 0.0 {
        Ok(v)
    } else {
        Err(invalid(field, v, "must be positive"))
    }
}

fn non_negative(field: &str, v: f64) -> Result<f64, ValidationError> {
    if finite(field, v)? >= 0.0 {
        Ok(v)
    } else {
        Err(invalid(field, v, "must be non-negative"))
    }
}

fn percentage(field: &str, v: f64) -> Result<f64, ValidationError> {
    if (0.0..=100.0).contains(&finite(field, v)?) {
        Ok(v)
    } else {
        Err(invalid(field, v, "must lie in 0..=100"))
    }
}

fn validate_plant(plant: &PlantDef) -> Result<(), ValidationError> {
    finite("plant.sensor_gain", plant.sensor_gain)?;
    finite("plant.enclosure_gain", plant.enclosure_gain)?;
    finite("plant.humidifier_gain", plant.humidifier_gain)?;
    positive("plant.sensor_tau", plant.sensor_tau)?;
    positive("plant.enclosure_tau", plant.enclosure_tau)?;
    positive("plant.humidifier_tau", plant.humidifier_tau)?;
    if finite("plant.loop_gain_k", plant.loop_gain_k)? == 0.0 {
        return Err(invalid("plant.loop_gain_k", plant.loop_gain_k, "must be nonzero"));
    }
    Ok(())
}

fn validate_compensator(comp: &CompensatorDef) -> Result<(), ValidationError> {
    positive("compensator.compensator_zero", comp.compensator_zero)?;
    finite("compensator.target_pole.re", comp.target_pole.re)?;
    finite("compensator.target_pole.im", comp.target_pole.im)?;
    Ok(())
}

fn validate_analysis(analysis: &AnalysisDef) -> Result<(), ValidationError> {
    finite("analysis.step_amplitude", analysis.step_amplitude)?;
    let tol = positive("analysis.settle_tolerance", analysis.settle_tolerance)?;
    if tol >= 1.0 {
        return Err(invalid("analysis.settle_tolerance", tol, "must be below 1"));
    }
    positive("analysis.open_loop_horizon_s", analysis.open_loop_horizon_s)?;
    positive("analysis.closed_loop_horizon_s", analysis.closed_loop_horizon_s)?;
    let dt = positive("analysis.dt_s", analysis.dt_s)?;
    if dt > analysis.open_loop_horizon_s.min(analysis.closed_loop_horizon_s) {
        return Err(invalid("analysis.dt_s", dt, "exceeds the simulated horizon"));
    }
    finite("analysis.reference_step_v", analysis.reference_step_v)?;
    finite("analysis.target_rh_pct", analysis.target_rh_pct)?;

    let lo = positive("analysis.freq_min_rad_s", analysis.freq_min_rad_s)?;
    let hi = positive("analysis.freq_max_rad_s", analysis.freq_max_rad_s)?;
    if hi <= lo {
        return Err(invalid("analysis.freq_max_rad_s", hi, "must exceed freq_min_rad_s"));
    }
    if analysis.freq_points < 2 {
        return Err(invalid("analysis.freq_points", analysis.freq_points, "needs at least two points"));
    }
    Ok(())
}

fn validate_fill(fill: &FillDef) -> Result<(), ValidationError> {
    positive("fill.volume_m3", fill.volume_m3)?;
    non_negative("fill.humidifier_rate_g_min", fill.humidifier_rate_g_min)?;
    let t = finite("fill.temperature_c", fill.temperature_c)?;
    if t <= -243.12 {
        return Err(invalid("fill.temperature_c", t, "outside the Magnus formula range"));
    }
    percentage("fill.initial_rh_pct", fill.initial_rh_pct)?;
    percentage("fill.outdoor_rh_pct", fill.outdoor_rh_pct)?;
    percentage("fill.target_rh_pct", fill.target_rh_pct)?;
    non_negative("fill.air_changes_per_hour", fill.air_changes_per_hour)?;
    match fill.condensation {
        CondensationDef::Fixed { rate_g_min } => {
            non_negative("fill.condensation.rate_g_min", rate_g_min)?;
        }
        CondensationDef::Proportional { rate_per_min } => {
            non_negative("fill.condensation.rate_per_min", rate_per_min)?;
        }
    }
    let dt = positive("fill.dt_min", fill.dt_min)?;
    let t_max = positive("fill.t_max_min", fill.t_max_min)?;
    if dt > t_max {
        return Err(invalid("fill.dt_min", dt, "exceeds fill.t_max_min"));
    }
    Ok(())
}
