//! Compensated closed-loop analysis: time response, static mapping and
//! stability margins.

use hf_lti::{
    BodeResponse, Complex, DcGain, FrequencyGrid, StabilityMargins, bode, stability_margins,
    steady_state_error,
};
use hf_project::AnalysisDef;
use tracing::debug;

use crate::compensator::CompensatedSystem;
use crate::error::AppResult;
use crate::open_loop::{StepAnalysis, step_with_metrics};

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedLoopAnalysis {
    pub poles: Vec<Complex<f64>>,
    pub zeros: Vec<Complex<f64>>,
    pub step: StepAnalysis,
    /// DC gain of the compensated open loop (infinite with the PI integrator).
    pub open_loop_dc_gain: DcGain,
    pub steady_state_error: Option<f64>,
    /// Volts to %RH.
    pub closed_loop_dc_gain: DcGain,
    pub reference_step_v: f64,
    /// RH reached for `reference_step_v`.
    pub rh_for_reference_pct: Option<f64>,
    pub target_rh_pct: f64,
    /// Reference voltage needed to hold `target_rh_pct`.
    pub voltage_for_target_v: Option<f64>,
    pub bode: BodeResponse,
    pub margins: StabilityMargins,
}

pub fn analyze_closed_loop(
    system: &CompensatedSystem,
    analysis: &AnalysisDef,
) -> AppResult<ClosedLoopAnalysis> {
    let step = step_with_metrics(
        &system.closed_loop,
        analysis.step_amplitude,
        analysis.closed_loop_horizon_s,
        analysis,
    )?;

    let open_loop_dc_gain = system.open_loop.dc_gain();
    let closed_loop_dc_gain = system.closed_loop.dc_gain();
    let (rh_for_reference_pct, voltage_for_target_v) = match closed_loop_dc_gain {
        DcGain::Finite(k) => (
            Some(k * analysis.reference_step_v),
            (k.abs() > 1e-12).then(|| analysis.target_rh_pct / k),
        ),
        _ => (None, None),
    };

    let grid = FrequencyGrid::logspace(
        analysis.freq_min_rad_s,
        analysis.freq_max_rad_s,
        analysis.freq_points,
    )?;
    let bode = bode(&system.open_loop, &grid)?;
    let margins = stability_margins(&system.open_loop, &grid)?;

    debug!(
        gm_db = margins.gain_margin_db,
        pm_deg = margins.phase_margin_deg,
        "closed loop analyzed"
    );

    Ok(ClosedLoopAnalysis {
        poles: system.closed_loop.poles(),
        zeros: system.closed_loop.zeros(),
        step,
        open_loop_dc_gain,
        steady_state_error: steady_state_error(open_loop_dc_gain),
        closed_loop_dc_gain,
        reference_step_v: analysis.reference_step_v,
        rh_for_reference_pct,
        target_rh_pct: analysis.target_rh_pct,
        voltage_for_target_v,
        bode,
        margins,
    })
}
