//! Root-locus conditions and PI compensator placement.
//!
//! A point `s0` lies on the locus of `1 + k L(s) = 0` when
//! `arg L(s0) = +/-180 deg`, and the gain that puts a closed-loop pole there
//! is `k = 1 / |L(s0)|`.

use nalgebra::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{LtiError, LtiResult};
use crate::polynomial::Polynomial;
use crate::transfer_function::TransferFunction;

/// Magnitudes below this are treated as an open-loop zero at the design point.
const MIN_LOCUS_MAGNITUDE: f64 = 1e-12;

/// Magnitude and angle of a loop transfer function at one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocusPoint {
    pub magnitude: f64,
    /// Angle in degrees, in (-180, 180].
    pub angle_deg: f64,
}

impl LocusPoint {
    /// Distance of the angle from the +/-180 deg locus condition.
    pub fn angle_error_deg(&self) -> f64 {
        180.0 - self.angle_deg.abs()
    }
}

/// Result of placing a PI compensator on the root locus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiDesign {
    /// Compensator zero `z_c` (the zero sits at `s = -z_c`).
    pub zero: f64,
    pub target_pole: (f64, f64),
    /// Solved proportional gain `K_p`.
    pub gain: f64,
    /// Augmented loop `(s + z_c)/s * L(s)` evaluated at the target pole.
    pub locus: LocusPoint,
    pub compensator: TransferFunction,
}

impl PiDesign {
    /// Integral time `T_i = 1 / z_c` of the equivalent `K_p (1 + 1/(T_i s))`.
    pub fn integral_time(&self) -> f64 {
        1.0 / self.zero
    }

    pub fn target(&self) -> Complex<f64> {
        Complex::new(self.target_pole.0, self.target_pole.1)
    }
}

/// `kp * (s + zero) / s`.
pub fn pi_compensator(kp: f64, zero: f64) -> LtiResult<TransferFunction> {
    let kp = hf_core::ensure_finite(kp, "PI gain")?;
    let zero = hf_core::ensure_finite(zero, "PI zero")?;
    TransferFunction::new(Polynomial::linear(kp, kp * zero), Polynomial::s())
}

/// Evaluate the magnitude and angle conditions of `loop_tf` at `s`.
///
/// Returns `None` when `s` is a pole of the loop.
pub fn locus_condition(loop_tf: &TransferFunction, s: Complex<f64>) -> Option<LocusPoint> {
    loop_tf.eval(s).map(|v| LocusPoint {
        magnitude: v.norm(),
        angle_deg: v.arg().to_degrees(),
    })
}

/// Place the compensator zero at `-zero` and solve the gain that puts a
/// closed-loop pole at `target`.
///
/// The augmented loop is `A(s) = (s + zero)/s * loop(s)` and
/// `K_p = 1 / |A(target)|`. The angle condition is not enforced; callers
/// decide how to surface a target that is off the locus.
pub fn design_pi(
    loop_tf: &TransferFunction,
    zero: f64,
    target: Complex<f64>,
) -> LtiResult<PiDesign> {
    let zero = hf_core::ensure_positive(zero, "compensator zero")?;
    hf_core::ensure_finite(target.re, "target pole real part")?;
    hf_core::ensure_finite(target.im, "target pole imaginary part")?;

    let augmented = pi_compensator(1.0, zero)?.series(loop_tf);
    let point = locus_condition(&augmented, target).ok_or_else(|| LtiError::Degenerate {
        what: format!(
            "target pole {:.6}{:+.6}j is a pole of the augmented loop",
            target.re, target.im
        ),
    })?;
    if point.magnitude < MIN_LOCUS_MAGNITUDE {
        return Err(LtiError::Degenerate {
            what: format!(
                "target pole {:.6}{:+.6}j coincides with an open-loop zero",
                target.re, target.im
            ),
        });
    }

    let gain = 1.0 / point.magnitude;
    Ok(PiDesign {
        zero,
        target_pole: (target.re, target.im),
        gain,
        locus: point,
        compensator: pi_compensator(gain, zero)?,
    })
}

/// Closed-loop poles of `1 + k L(s) = 0`, i.e. the roots of `den + k num`.
pub fn closed_loop_poles(loop_tf: &TransferFunction, k: f64) -> Vec<Complex<f64>> {
    loop_tf.den().add(&loop_tf.num().scale(k)).roots()
}
