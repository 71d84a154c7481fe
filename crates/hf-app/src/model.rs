//! Plant model construction.
//!
//! Three first-order blocks `gain / (tau s + 1)` make up the humidity loop:
//! the humidifier drives the enclosure (forward path `G`) and the sensor,
//! scaled by the lumped gain `K`, closes the loop (feedback path `H`).

use hf_lti::{DcGain, TransferFunction};
use hf_project::PlantDef;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Gain and time constant of one first-order block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockParameters {
    pub gain: f64,
    pub tau_s: f64,
}

/// Loop constants, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantParameters {
    pub sensor: BlockParameters,
    pub enclosure: BlockParameters,
    pub humidifier: BlockParameters,
    pub loop_gain_k: f64,
}

impl From<&PlantDef> for PlantParameters {
    fn from(def: &PlantDef) -> Self {
        Self {
            sensor: BlockParameters {
                gain: def.sensor_gain,
                tau_s: def.sensor_tau,
            },
            enclosure: BlockParameters {
                gain: def.enclosure_gain,
                tau_s: def.enclosure_tau,
            },
            humidifier: BlockParameters {
                gain: def.humidifier_gain,
                tau_s: def.humidifier_tau,
            },
            loop_gain_k: def.loop_gain_k,
        }
    }
}

impl Default for PlantParameters {
    fn default() -> Self {
        Self::from(&PlantDef::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlantModel {
    pub params: PlantParameters,
    pub sensor: TransferFunction,
    pub enclosure: TransferFunction,
    pub humidifier: TransferFunction,
    /// `G = enclosure * humidifier`
    pub forward: TransferFunction,
    /// `H = sensor * K`
    pub feedback: TransferFunction,
    /// `L = G * H`
    pub open_loop: TransferFunction,
}

fn block(name: &str, p: BlockParameters) -> AppResult<TransferFunction> {
    if !p.gain.is_finite() {
        return Err(AppError::InvalidConfiguration(format!(
            "{name} gain must be finite, got {}",
            p.gain
        )));
    }
    if !(p.tau_s.is_finite() && p.tau_s > 0.0) {
        return Err(AppError::InvalidConfiguration(format!(
            "{name} time constant must be positive, got {}",
            p.tau_s
        )));
    }
    Ok(TransferFunction::first_order(p.gain, p.tau_s)?)
}

impl PlantModel {
    pub fn build(params: &PlantParameters) -> AppResult<Self> {
        let k = params.loop_gain_k;
        if !k.is_finite() || k == 0.0 {
            return Err(AppError::InvalidConfiguration(format!(
                "loop gain K must be finite and nonzero, got {k}"
            )));
        }

        let sensor = block("sensor", params.sensor)?;
        let enclosure = block("enclosure", params.enclosure)?;
        let humidifier = block("humidifier", params.humidifier)?;

        let forward = &enclosure * &humidifier;
        let feedback = &sensor * &TransferFunction::gain(k)?;
        let open_loop = &forward * &feedback;

        Ok(Self {
            params: *params,
            sensor,
            enclosure,
            humidifier,
            forward,
            feedback,
            open_loop,
        })
    }

    /// Static gain of the feedback path, `K_sensor * K`.
    pub fn feedback_dc_gain(&self) -> DcGain {
        self.feedback.dc_gain()
    }
}
