//! Linear time-invariant analysis primitives for Humidiflow.
//!
//! This crate replaces the handful of control-toolbox routines the humidity
//! loop design leans on:
//!
//! - **Polynomials** with highest-degree-first coefficients and companion
//!   matrix root finding
//! - **Transfer functions** with series, parallel and feedback composition
//! - **Step responses** simulated from a controllable canonical realization
//! - **Response metrics** (settling time, rise time, overshoot, steady-state error)
//! - **Frequency response** sweeps and gain/phase margins
//! - **Root locus** magnitude/angle conditions and PI compensator design
//!
//! # Design Principles
//!
//! - **Immutable values**: every operation returns a new transfer function
//! - **Degeneracies are values**: vanishing denominators surface as
//!   [`DcGain::Infinite`]/[`DcGain::Undefined`] or a typed error, never a panic
//! - **Lazy simulation**: [`StepResponse`] integrates on demand and can be
//!   iterated any number of times

pub mod error;
pub mod frequency;
pub mod metrics;
pub mod polynomial;
pub mod response;
pub mod root_locus;
pub mod transfer_function;

pub use error::{LtiError, LtiResult};
pub use frequency::{
    BodePoint, BodeResponse, FrequencyGrid, StabilityMargins, bode, stability_margins,
};
pub use metrics::{StepResponseMetrics, response_metrics, steady_state_error};
pub use nalgebra::Complex;
pub use polynomial::Polynomial;
pub use response::{StepResponse, StepSamples, TimeGrid, step_response};
pub use root_locus::{
    LocusPoint, PiDesign, closed_loop_poles, design_pi, locus_condition, pi_compensator,
};
pub use transfer_function::{DcGain, PoleZeroGain, TransferFunction, poles_zeros_gain};
