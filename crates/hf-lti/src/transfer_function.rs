//! Rational transfer functions `num(s) / den(s)`.

use std::fmt;
use std::ops::{Add, Mul};

use nalgebra::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{LtiError, LtiResult};
use crate::polynomial::Polynomial;

/// Relative threshold below which a polynomial value counts as vanishing.
pub(crate) const VANISH_REL: f64 = 1e-12;

/// Proper SISO transfer function.
///
/// Invariants (checked by [`TransferFunction::new`]):
/// - the denominator is not the zero polynomial, so its leading coefficient
///   is nonzero
/// - `degree(num) <= degree(den)`
///
/// Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransferFunction")]
pub struct TransferFunction {
    num: Polynomial,
    den: Polynomial,
}

#[derive(Deserialize)]
struct RawTransferFunction {
    num: Polynomial,
    den: Polynomial,
}

impl TryFrom<RawTransferFunction> for TransferFunction {
    type Error = LtiError;

    fn try_from(raw: RawTransferFunction) -> LtiResult<Self> {
        Self::new(raw.num, raw.den)
    }
}

/// Static gain `G(0)`, with the degenerate cases kept as values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum DcGain {
    Finite(f64),
    /// Denominator vanishes at `s = 0` while the numerator does not
    /// (integrator in the path).
    Infinite,
    /// Both numerator and denominator vanish at `s = 0`.
    Undefined,
}

impl DcGain {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Finite(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl fmt::Display for DcGain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v:.4}"),
            Self::Infinite => write!(f, "inf"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// Poles, zeros and DC gain of a transfer function.
#[derive(Debug, Clone, PartialEq)]
pub struct PoleZeroGain {
    pub poles: Vec<Complex<f64>>,
    pub zeros: Vec<Complex<f64>>,
    pub dc_gain: DcGain,
}

impl TransferFunction {
    /// Create a transfer function, validating the invariants.
    pub fn new(num: Polynomial, den: Polynomial) -> LtiResult<Self> {
        if den.is_zero() {
            return Err(LtiError::Degenerate {
                what: "denominator is identically zero".to_string(),
            });
        }
        if num.degree() > den.degree() && !num.is_zero() {
            return Err(LtiError::Improper {
                num_degree: num.degree(),
                den_degree: den.degree(),
            });
        }
        Ok(Self { num, den })
    }

    /// Create from highest-degree-first coefficient slices.
    pub fn from_coeffs(num: &[f64], den: &[f64]) -> LtiResult<Self> {
        Self::new(Polynomial::new(num.to_vec())?, Polynomial::new(den.to_vec())?)
    }

    /// Pure gain block `k`.
    pub fn gain(k: f64) -> LtiResult<Self> {
        let k = hf_core::ensure_finite(k, "gain")?;
        Self::new(Polynomial::constant(k), Polynomial::constant(1.0))
    }

    /// First-order lag `gain / (tau s + 1)`.
    pub fn first_order(gain: f64, tau: f64) -> LtiResult<Self> {
        let gain = hf_core::ensure_finite(gain, "first-order gain")?;
        let tau = hf_core::ensure_positive(tau, "first-order time constant")?;
        Self::new(Polynomial::constant(gain), Polynomial::linear(tau, 1.0))
    }

    pub fn num(&self) -> &Polynomial {
        &self.num
    }

    pub fn den(&self) -> &Polynomial {
        &self.den
    }

    /// System order (denominator degree).
    pub fn order(&self) -> usize {
        self.den.degree()
    }

    /// Series connection `self * other`.
    pub fn series(&self, other: &TransferFunction) -> TransferFunction {
        // Products of proper functions stay proper and the denominator
        // product of two nonzero polynomials is nonzero.
        TransferFunction {
            num: self.num.mul(&other.num),
            den: self.den.mul(&other.den),
        }
    }

    /// Parallel connection `self + other`.
    pub fn parallel(&self, other: &TransferFunction) -> TransferFunction {
        TransferFunction {
            num: self
                .num
                .mul(&other.den)
                .add(&other.num.mul(&self.den)),
            den: self.den.mul(&other.den),
        }
    }

    /// Negative feedback: `self / (1 + self * h)`.
    ///
    /// Expressed on polynomials as `n_g d_h / (d_g d_h + n_g n_h)`. No
    /// cancellation of common factors is attempted.
    pub fn feedback(&self, h: &TransferFunction) -> LtiResult<TransferFunction> {
        let num = self.num.mul(&h.den);
        let den = self.den.mul(&h.den).add(&self.num.mul(&h.num));
        Self::new(num, den).map_err(|e| match e {
            LtiError::Degenerate { .. } => LtiError::Degenerate {
                what: "closed-loop characteristic polynomial vanishes".to_string(),
            },
            other => other,
        })
    }

    /// Evaluate at a complex point. Returns `None` when `s` is a pole.
    pub fn eval(&self, s: Complex<f64>) -> Option<Complex<f64>> {
        let d = self.den.eval_complex(s);
        if d.norm() <= VANISH_REL * self.den.scale_hint() * (1.0 + s.norm()).powi(self.order() as i32) {
            return None;
        }
        Some(self.num.eval_complex(s) / d)
    }

    /// Frequency response `G(j w)`.
    pub fn freq_response(&self, omega: f64) -> Option<Complex<f64>> {
        self.eval(Complex::new(0.0, omega))
    }

    /// Static gain `num(0) / den(0)`.
    pub fn dc_gain(&self) -> DcGain {
        let n0 = self.num.constant_term();
        let d0 = self.den.constant_term();
        let d_vanishes = d0.abs() <= VANISH_REL * self.den.scale_hint();
        let n_vanishes = n0.abs() <= VANISH_REL * self.num.scale_hint();
        match (d_vanishes, n_vanishes) {
            (false, _) => DcGain::Finite(n0 / d0),
            (true, false) => DcGain::Infinite,
            (true, true) => DcGain::Undefined,
        }
    }

    pub fn poles(&self) -> Vec<Complex<f64>> {
        self.den.roots()
    }

    pub fn zeros(&self) -> Vec<Complex<f64>> {
        if self.num.is_zero() {
            return Vec::new();
        }
        self.num.roots()
    }
}

/// Poles, zeros and DC gain in one pass.
pub fn poles_zeros_gain(tf: &TransferFunction) -> PoleZeroGain {
    PoleZeroGain {
        poles: tf.poles(),
        zeros: tf.zeros(),
        dc_gain: tf.dc_gain(),
    }
}

impl Mul for &TransferFunction {
    type Output = TransferFunction;

    fn mul(self, rhs: &TransferFunction) -> TransferFunction {
        self.series(rhs)
    }
}

impl Add for &TransferFunction {
    type Output = TransferFunction;

    fn add(self, rhs: &TransferFunction) -> TransferFunction {
        self.parallel(rhs)
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) / ({})", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_checks_invariants() {
        let tf: TransferFunction =
            serde_json::from_str(r#"{"num":[2.0],"den":[10.0,1.0]}"#).unwrap();
        assert_eq!(tf, TransferFunction::first_order(2.0, 10.0).unwrap());

        // Improper and zero-denominator inputs are rejected.
        for bad in [
            r#"{"num":[1.0,0.0,0.0],"den":[1.0,1.0]}"#,
            r#"{"num":[1.0],"den":[0.0]}"#,
        ] {
            assert!(serde_json::from_str::<TransferFunction>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn first_order_dc_gain() {
        let g = TransferFunction::first_order(30.0, 45.0).unwrap();
        assert_eq!(g.dc_gain(), DcGain::Finite(30.0));
        assert_eq!(g.order(), 1);
        let p = g.poles();
        assert!((p[0].re + 1.0 / 45.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_blocks() {
        assert!(TransferFunction::first_order(1.0, 0.0).is_err());
        assert!(TransferFunction::first_order(1.0, -5.0).is_err());
        assert!(TransferFunction::first_order(f64::NAN, 5.0).is_err());
        assert!(TransferFunction::from_coeffs(&[1.0], &[0.0]).is_err());
        assert!(matches!(
            TransferFunction::from_coeffs(&[1.0, 0.0, 0.0], &[1.0, 1.0]),
            Err(LtiError::Improper { .. })
        ));
    }

    #[test]
    fn integrator_has_infinite_dc_gain() {
        let pi = TransferFunction::from_coeffs(&[2.0, 1.0], &[1.0, 0.0]).unwrap();
        assert_eq!(pi.dc_gain(), DcGain::Infinite);
        let undefined = TransferFunction::from_coeffs(&[1.0, 0.0], &[1.0, 0.0]).unwrap();
        assert_eq!(undefined.dc_gain(), DcGain::Undefined);
    }

    #[test]
    fn unity_feedback_of_first_order() {
        // G = 1/(s+1), H = 1 -> 1/(s+2)
        let g = TransferFunction::first_order(1.0, 1.0).unwrap();
        let h = TransferFunction::gain(1.0).unwrap();
        let cl = g.feedback(&h).unwrap();
        assert_eq!(cl.num().coeffs(), &[1.0]);
        assert_eq!(cl.den().coeffs(), &[1.0, 2.0]);
        assert_eq!(cl.dc_gain(), DcGain::Finite(0.5));
    }

    #[test]
    fn feedback_detects_vanishing_denominator() {
        let g = TransferFunction::gain(-1.0).unwrap();
        let h = TransferFunction::gain(1.0).unwrap();
        assert!(matches!(g.feedback(&h), Err(LtiError::Degenerate { .. })));
    }

    #[test]
    fn eval_at_pole_is_none() {
        let g = TransferFunction::first_order(1.0, 2.0).unwrap();
        assert!(g.eval(Complex::new(-0.5, 0.0)).is_none());
        let v = g.eval(Complex::new(0.0, 0.0)).unwrap();
        assert!((v.re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn parallel_adds_gains() {
        let a = TransferFunction::first_order(2.0, 1.0).unwrap();
        let b = TransferFunction::first_order(3.0, 4.0).unwrap();
        let sum = &a + &b;
        assert_eq!(sum.dc_gain(), DcGain::Finite(5.0));
    }

    #[test]
    fn display_shows_both_polynomials() {
        let g = TransferFunction::first_order(0.66, 5.0).unwrap();
        assert_eq!(g.to_string(), "(0.66) / (5s + 1)");
    }
}
