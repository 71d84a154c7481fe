//! Uncompensated loop analysis.

use hf_lti::{
    DcGain, PoleZeroGain, StepResponseMetrics, TimeGrid, TransferFunction, poles_zeros_gain,
    response_metrics, steady_state_error, step_response,
};
use hf_project::AnalysisDef;
use tracing::debug;

use crate::error::AppResult;
use crate::model::PlantModel;

/// Simulated step plus the metrics derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct StepAnalysis {
    pub amplitude: f64,
    pub samples: Vec<(f64, f64)>,
    pub metrics: StepResponseMetrics,
}

impl StepAnalysis {
    /// Simulated static gain, last sample over step height.
    ///
    /// `None` for a zero step or a response that has not settled within the
    /// horizon.
    pub fn static_gain(&self) -> Option<f64> {
        (self.amplitude != 0.0 && self.metrics.settling_time_s.is_some())
            .then(|| self.metrics.last_value / self.amplitude)
    }
}

/// Step `tf` with `amplitude` over `[0, horizon_s]` and compute its metrics.
///
/// Open and closed loop go through this same routine.
pub fn step_with_metrics(
    tf: &TransferFunction,
    amplitude: f64,
    horizon_s: f64,
    analysis: &AnalysisDef,
) -> AppResult<StepAnalysis> {
    let grid = TimeGrid::new(horizon_s, analysis.dt_s)?;
    let response = step_response(tf, amplitude, grid)?;
    let samples = response.samples();
    let steady_state = tf.dc_gain().value().map(|k| k * amplitude);
    let metrics = response_metrics(&samples, analysis.settle_tolerance, steady_state)?;
    Ok(StepAnalysis {
        amplitude,
        samples,
        metrics,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenLoopAnalysis {
    pub pole_zero: PoleZeroGain,
    pub step: StepAnalysis,
    /// `1 / (1 + L(0))`, see [`hf_lti::steady_state_error`].
    pub steady_state_error: Option<f64>,
}

impl OpenLoopAnalysis {
    pub fn dc_gain(&self) -> DcGain {
        self.pole_zero.dc_gain
    }
}

pub fn analyze_open_loop(model: &PlantModel, analysis: &AnalysisDef) -> AppResult<OpenLoopAnalysis> {
    let pole_zero = poles_zeros_gain(&model.open_loop);
    let step = step_with_metrics(
        &model.open_loop,
        analysis.step_amplitude,
        analysis.open_loop_horizon_s,
        analysis,
    )?;
    let steady_state_error = steady_state_error(pole_zero.dc_gain);

    debug!(
        dc_gain = %pole_zero.dc_gain,
        final_value = step.metrics.final_value,
        "open loop analyzed"
    );

    Ok(OpenLoopAnalysis {
        pole_zero,
        step,
        steady_state_error,
    })
}
