//! Analysis configuration schema.
//!
//! Every field defaults to the reference humidity chamber, so an empty file
//! describes the worked example.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default = "latest_version")]
    pub version: u32,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub plant: PlantDef,
    #[serde(default)]
    pub compensator: CompensatorDef,
    #[serde(default)]
    pub analysis: AnalysisDef,
    #[serde(default)]
    pub fill: FillDef,
}

fn latest_version() -> u32 {
    crate::LATEST_VERSION
}

fn default_name() -> String {
    "humidity-loop".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            version: latest_version(),
            name: default_name(),
            plant: PlantDef::default(),
            compensator: CompensatorDef::default(),
            analysis: AnalysisDef::default(),
            fill: FillDef::default(),
        }
    }
}

/// First-order blocks of the loop plus the lumped proportional gain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlantDef {
    pub sensor_gain: f64,
    pub sensor_tau: f64,
    pub enclosure_gain: f64,
    pub enclosure_tau: f64,
    pub humidifier_gain: f64,
    pub humidifier_tau: f64,
    #[serde(alias = "loop_gain_K")]
    pub loop_gain_k: f64,
}

impl Default for PlantDef {
    fn default() -> Self {
        Self {
            sensor_gain: 0.03,
            sensor_tau: 5.0,
            enclosure_gain: 30.0,
            enclosure_tau: 45.0,
            humidifier_gain: 0.66,
            humidifier_tau: 5.0,
            loop_gain_k: 5.0 / 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TargetPoleDef {
    pub re: f64,
    #[serde(default)]
    pub im: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompensatorDef {
    /// PI zero magnitude; the zero sits at `s = -compensator_zero`.
    pub compensator_zero: f64,
    pub target_pole: TargetPoleDef,
}

impl Default for CompensatorDef {
    fn default() -> Self {
        Self {
            // Cancels the enclosure pole at -1/45.
            compensator_zero: 1.0 / 45.0,
            target_pole: TargetPoleDef { re: -0.05, im: 0.0 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisDef {
    /// Step input height in volts.
    pub step_amplitude: f64,
    pub settle_tolerance: f64,
    pub open_loop_horizon_s: f64,
    pub closed_loop_horizon_s: f64,
    pub dt_s: f64,
    pub reference_step_v: f64,
    pub target_rh_pct: f64,
    pub freq_min_rad_s: f64,
    pub freq_max_rad_s: f64,
    pub freq_points: usize,
}

impl Default for AnalysisDef {
    fn default() -> Self {
        Self {
            step_amplitude: 3.5,
            settle_tolerance: 0.02,
            open_loop_horizon_s: 600.0,
            closed_loop_horizon_s: 600.0,
            dt_s: 0.1,
            reference_step_v: 5.0,
            target_rh_pct: 70.0,
            freq_min_rad_s: 1e-4,
            freq_max_rad_s: 1e2,
            freq_points: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CondensationDef {
    /// Constant loss in g/min.
    Fixed { rate_g_min: f64 },
    /// Loss per minute proportional to the excess above saturation.
    Proportional { rate_per_min: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FillDef {
    pub volume_m3: f64,
    pub humidifier_rate_g_min: f64,
    pub temperature_c: f64,
    pub initial_rh_pct: f64,
    pub outdoor_rh_pct: f64,
    pub air_changes_per_hour: f64,
    pub condensation: CondensationDef,
    pub target_rh_pct: f64,
    pub dt_min: f64,
    pub t_max_min: f64,
}

impl Default for FillDef {
    fn default() -> Self {
        Self {
            volume_m3: 0.2,
            humidifier_rate_g_min: 3.3,
            temperature_c: 20.0,
            initial_rh_pct: 0.0,
            outdoor_rh_pct: 20.0,
            air_changes_per_hour: 10.0,
            condensation: CondensationDef::Fixed { rate_g_min: 0.55 },
            target_rh_pct: 100.0,
            dt_min: 0.05,
            t_max_min: 60.0,
        }
    }
}
