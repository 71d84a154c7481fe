//! Real polynomials in the Laplace variable.
//!
//! Coefficients are stored highest degree first: `[a_n, ..., a_1, a_0]`
//! represents `a_n s^n + ... + a_1 s + a_0`. Leading zeros are trimmed on
//! construction, so the leading coefficient is nonzero unless the polynomial
//! is the zero polynomial `[0.0]`.

use std::fmt;

use nalgebra::{Complex, DMatrix};
use serde::{Deserialize, Serialize};

use crate::error::{LtiError, LtiResult};

/// Imaginary parts smaller than this (relative to the root magnitude) are
/// treated as round-off from repeated real roots.
const IMAG_CLEANUP_REL: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// Create a polynomial from highest-degree-first coefficients.
    pub fn new(coeffs: impl Into<Vec<f64>>) -> LtiResult<Self> {
        let coeffs = coeffs.into();
        if coeffs.is_empty() {
            return Err(LtiError::InvalidPolynomial {
                what: "no coefficients".to_string(),
            });
        }
        if let Some(bad) = coeffs.iter().find(|c| !c.is_finite()) {
            return Err(LtiError::InvalidPolynomial {
                what: format!("non-finite coefficient {bad}"),
            });
        }
        Ok(Self::trimmed(coeffs))
    }

    /// Constant polynomial `c`.
    pub fn constant(c: f64) -> Self {
        Self::trimmed(vec![c])
    }

    /// Linear polynomial `a s + b`.
    pub fn linear(a: f64, b: f64) -> Self {
        Self::trimmed(vec![a, b])
    }

    /// The polynomial `s`.
    pub fn s() -> Self {
        Self::linear(1.0, 0.0)
    }

    fn trimmed(mut coeffs: Vec<f64>) -> Self {
        let first_nonzero = coeffs.iter().position(|c| *c != 0.0);
        match first_nonzero {
            Some(0) => {}
            Some(idx) => {
                coeffs.drain(..idx);
            }
            None => coeffs = vec![0.0],
        }
        Self { coeffs }
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0] == 0.0
    }

    pub fn leading(&self) -> f64 {
        self.coeffs[0]
    }

    /// Constant term `a_0`, i.e. the value at `s = 0`.
    pub fn constant_term(&self) -> f64 {
        self.coeffs[self.coeffs.len() - 1]
    }

    /// Largest absolute coefficient, used to scale "vanishes" checks.
    pub fn scale_hint(&self) -> f64 {
        self.coeffs.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()))
    }

    /// Evaluate at a real point (Horner).
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().fold(0.0, |acc, c| acc * x + c)
    }

    /// Evaluate at a complex point (Horner).
    pub fn eval_complex(&self, s: Complex<f64>) -> Complex<f64> {
        self.coeffs
            .iter()
            .fold(Complex::new(0.0, 0.0), |acc, c| acc * s + *c)
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let n = self.coeffs.len().max(other.coeffs.len());
        let mut out = vec![0.0; n];
        for (dst, c) in out.iter_mut().rev().zip(self.coeffs.iter().rev()) {
            *dst += c;
        }
        for (dst, c) in out.iter_mut().rev().zip(other.coeffs.iter().rev()) {
            *dst += c;
        }
        Self::trimmed(out)
    }

    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        let mut out = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Self::trimmed(out)
    }

    pub fn scale(&self, k: f64) -> Polynomial {
        Self::trimmed(self.coeffs.iter().map(|c| c * k).collect())
    }

    /// Roots of the polynomial, sorted by real part then imaginary part.
    ///
    /// Degree 0 (including the zero polynomial) has no roots. Higher degrees
    /// use the eigenvalues of the companion matrix.
    pub fn roots(&self) -> Vec<Complex<f64>> {
        let n = self.degree();
        let mut roots = match n {
            0 => Vec::new(),
            1 => vec![Complex::new(-self.coeffs[1] / self.coeffs[0], 0.0)],
            _ => {
                let lead = self.coeffs[0];
                let mut companion = DMatrix::<f64>::zeros(n, n);
                for j in 0..n {
                    companion[(0, j)] = -self.coeffs[j + 1] / lead;
                }
                for i in 1..n {
                    companion[(i, i - 1)] = 1.0;
                }
                companion.complex_eigenvalues().iter().copied().collect()
            }
        };

        for r in roots.iter_mut() {
            if r.im.abs() <= IMAG_CLEANUP_REL * r.norm().max(1.0) {
                r.im = 0.0;
            }
        }
        roots.sort_by(|a, b| {
            a.re.partial_cmp(&b.re)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.im.partial_cmp(&b.im).unwrap_or(std::cmp::Ordering::Equal))
        });
        roots
    }
}

impl TryFrom<Vec<f64>> for Polynomial {
    type Error = LtiError;

    fn try_from(coeffs: Vec<f64>) -> LtiResult<Self> {
        Self::new(coeffs)
    }
}

impl From<Polynomial> for Vec<f64> {
    fn from(p: Polynomial) -> Self {
        p.coeffs
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let n = self.degree();
        let mut first = true;
        for (i, c) in self.coeffs.iter().enumerate() {
            if *c == 0.0 {
                continue;
            }
            let power = n - i;
            let sign = if *c < 0.0 { "-" } else { "+" };
            if first {
                if *c < 0.0 {
                    write!(f, "-")?;
                }
            } else {
                write!(f, " {sign} ")?;
            }
            first = false;

            let mag = c.abs();
            let show_coeff = power == 0 || (mag - 1.0).abs() > 1e-12;
            if show_coeff {
                write!(f, "{}", format_coeff(mag))?;
            }
            match power {
                0 => {}
                1 => write!(f, "s")?,
                p => write!(f, "s^{p}")?,
            }
        }
        Ok(())
    }
}

fn format_coeff(v: f64) -> String {
    if !(1e-3..1e6).contains(&v) {
        return format!("{v:.4e}");
    }
    let s = format!("{v:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_leading_zeros() {
        let p = Polynomial::new(vec![0.0, 0.0, 2.0, 1.0]).unwrap();
        assert_eq!(p.coeffs(), &[2.0, 1.0]);
        assert_eq!(p.degree(), 1);
    }

    #[test]
    fn zero_polynomial() {
        let p = Polynomial::new(vec![0.0, 0.0]).unwrap();
        assert!(p.is_zero());
        assert_eq!(p.degree(), 0);
        assert!(p.roots().is_empty());
    }

    #[test]
    fn rejects_empty_and_nan() {
        assert!(Polynomial::new(Vec::<f64>::new()).is_err());
        assert!(Polynomial::new(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn horner_eval() {
        // 2s^2 + 3s + 1 at s = 2 -> 8 + 6 + 1
        let p = Polynomial::new(vec![2.0, 3.0, 1.0]).unwrap();
        assert_eq!(p.eval(2.0), 15.0);
        let z = p.eval_complex(Complex::new(0.0, 1.0));
        // -2 + 3j + 1
        assert!((z.re + 1.0).abs() < 1e-12);
        assert!((z.im - 3.0).abs() < 1e-12);
    }

    #[test]
    fn add_and_mul() {
        let a = Polynomial::linear(1.0, 1.0);
        let b = Polynomial::linear(1.0, -1.0);
        assert_eq!(a.mul(&b).coeffs(), &[1.0, 0.0, -1.0]);
        assert_eq!(a.add(&b).coeffs(), &[2.0, 0.0]);
        assert_eq!(a.add(&Polynomial::constant(2.0)).coeffs(), &[1.0, 3.0]);
    }

    #[test]
    fn cancellation_trims_degree() {
        let a = Polynomial::new(vec![1.0, 2.0]).unwrap();
        let b = Polynomial::new(vec![-1.0, 3.0]).unwrap();
        assert_eq!(a.add(&b).coeffs(), &[5.0]);
    }

    #[test]
    fn roots_of_repeated_factor() {
        // (5s + 1)^2 = 25s^2 + 10s + 1, double root at -0.2
        let p = Polynomial::new(vec![25.0, 10.0, 1.0]).unwrap();
        let roots = p.roots();
        assert_eq!(roots.len(), 2);
        for r in roots {
            assert!((r.re + 0.2).abs() < 1e-6);
            assert_eq!(r.im, 0.0);
        }
    }

    #[test]
    fn roots_complex_pair_sorted() {
        // s^2 + 2s + 5 -> -1 +/- 2j
        let p = Polynomial::new(vec![1.0, 2.0, 5.0]).unwrap();
        let roots = p.roots();
        assert!((roots[0].re + 1.0).abs() < 1e-9);
        assert!((roots[0].im + 2.0).abs() < 1e-9);
        assert!((roots[1].im - 2.0).abs() < 1e-9);
    }

    #[test]
    fn display_format() {
        let p = Polynomial::new(vec![225.0, 50.0, 1.0]).unwrap();
        assert_eq!(p.to_string(), "225s^2 + 50s + 1");
        let q = Polynomial::new(vec![1.0, -0.5]).unwrap();
        assert_eq!(q.to_string(), "s - 0.5");
    }
}
