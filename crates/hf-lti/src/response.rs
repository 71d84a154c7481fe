//! Time-domain step response simulation.
//!
//! A transfer function is realized in controllable canonical form and
//! integrated with classical RK4. The response is lazy: nothing is computed
//! until [`StepResponse::iter`] is driven, and every call to `iter` restarts
//! from the zero initial state.

use serde::Serialize;

use crate::error::{LtiError, LtiResult};
use crate::transfer_function::TransferFunction;

/// Largest `h * |p|` allowed per RK4 step, where `p` is the fastest pole.
const MAX_STEP_STIFFNESS: f64 = 0.1;

/// Uniform time grid `t_i = i * dt` for `0 <= t_i <= t_end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeGrid {
    dt: f64,
    len: usize,
}

impl TimeGrid {
    pub fn new(t_end: f64, dt: f64) -> LtiResult<Self> {
        let dt = hf_core::ensure_positive(dt, "time grid step")?;
        let t_end = hf_core::ensure_finite(t_end, "time grid horizon")?;
        if t_end < 0.0 {
            return Err(LtiError::InvalidArg {
                what: "time grid horizon must be non-negative",
            });
        }
        // Small slack so 600.0 / 0.1 lands on 6000 instead of 5999.
        let steps = (t_end / dt + 1e-9).floor() as usize;
        Ok(Self {
            dt,
            len: steps + 1,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn time(&self, index: usize) -> f64 {
        index as f64 * self.dt
    }

    pub fn t_end(&self) -> f64 {
        self.time(self.len - 1)
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(move |i| self.time(i))
    }
}

/// Controllable canonical realization of a proper transfer function.
///
/// With `den = s^n + a_1 s^{n-1} + ... + a_n` (after normalization) the
/// states satisfy `x_k' = x_{k+1}` and
/// `x_{n-1}' = u - a_n x_0 - a_{n-1} x_1 - ... - a_1 x_{n-1}`.
#[derive(Debug, Clone, PartialEq)]
struct Realization {
    /// `[a_n, a_{n-1}, ..., a_1]`, indexed by state.
    feedback: Vec<f64>,
    /// Output weights per state.
    weights: Vec<f64>,
    /// Direct feedthrough.
    feedthrough: f64,
}

impl Realization {
    fn from_tf(tf: &TransferFunction) -> Self {
        let den = tf.den().coeffs();
        let lead = den[0];
        let n = den.len() - 1;
        let a: Vec<f64> = den.iter().map(|c| c / lead).collect();

        // Pad numerator to n + 1 coefficients.
        let num = tf.num().coeffs();
        let mut b = vec![0.0; n + 1 - num.len()];
        b.extend(num.iter().map(|c| c / lead));

        let feedthrough = b[0];
        let feedback = (0..n).map(|i| a[n - i]).collect();
        let weights = (0..n).map(|i| b[n - i] - feedthrough * a[n - i]).collect();

        Self {
            feedback,
            weights,
            feedthrough,
        }
    }

    fn states(&self) -> usize {
        self.feedback.len()
    }

    fn derivative(&self, x: &[f64], u: f64, out: &mut [f64]) {
        let n = x.len();
        if n == 0 {
            return;
        }
        for k in 0..n - 1 {
            out[k] = x[k + 1];
        }
        let coupling: f64 = self.feedback.iter().zip(x).map(|(a, xi)| a * xi).sum();
        out[n - 1] = u - coupling;
    }

    fn output(&self, x: &[f64], u: f64) -> f64 {
        let y: f64 = self.weights.iter().zip(x).map(|(c, xi)| c * xi).sum();
        y + self.feedthrough * u
    }
}

/// Scratch buffers for one RK4 step.
#[derive(Debug, Clone)]
struct Rk4Scratch {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    tmp: Vec<f64>,
}

impl Rk4Scratch {
    fn new(n: usize) -> Self {
        Self {
            k1: vec![0.0; n],
            k2: vec![0.0; n],
            k3: vec![0.0; n],
            k4: vec![0.0; n],
            tmp: vec![0.0; n],
        }
    }

    /// Classical RK4 step with a constant input over the step.
    fn step(&mut self, sys: &Realization, x: &mut [f64], u: f64, h: f64) {
        sys.derivative(x, u, &mut self.k1);

        axpy_into(&mut self.tmp, x, &self.k1, 0.5 * h);
        sys.derivative(&self.tmp, u, &mut self.k2);

        axpy_into(&mut self.tmp, x, &self.k2, 0.5 * h);
        sys.derivative(&self.tmp, u, &mut self.k3);

        axpy_into(&mut self.tmp, x, &self.k3, h);
        sys.derivative(&self.tmp, u, &mut self.k4);

        // x_new = x + (h/6) * (k1 + 2*k2 + 2*k3 + k4)
        for i in 0..x.len() {
            x[i] += h / 6.0 * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]);
        }
    }
}

fn axpy_into(out: &mut [f64], x: &[f64], k: &[f64], h: f64) {
    for ((o, xi), ki) in out.iter_mut().zip(x).zip(k) {
        *o = xi + h * ki;
    }
}

/// Step response of a transfer function over a time grid.
///
/// Holds only the realization and the grid; samples are produced by
/// [`StepSamples`].
#[derive(Debug, Clone)]
pub struct StepResponse {
    realization: Realization,
    amplitude: f64,
    grid: TimeGrid,
    substeps: usize,
}

/// Build the step response of `tf` to a step of height `amplitude`.
pub fn step_response(
    tf: &TransferFunction,
    amplitude: f64,
    grid: TimeGrid,
) -> LtiResult<StepResponse> {
    let amplitude = hf_core::ensure_finite(amplitude, "step amplitude")?;
    let fastest = tf.poles().iter().fold(0.0_f64, |acc, p| acc.max(p.norm()));
    let substeps = ((grid.dt() * fastest / MAX_STEP_STIFFNESS).ceil() as usize).max(1);

    Ok(StepResponse {
        realization: Realization::from_tf(tf),
        amplitude,
        grid,
        substeps,
    })
}

impl StepResponse {
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Fresh pass over the samples, starting from rest.
    pub fn iter(&self) -> StepSamples<'_> {
        let n = self.realization.states();
        StepSamples {
            response: self,
            index: 0,
            state: vec![0.0; n],
            scratch: Rk4Scratch::new(n),
        }
    }

    /// Materialize all `(t, y)` samples.
    pub fn samples(&self) -> Vec<(f64, f64)> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &'a StepResponse {
    type Item = (f64, f64);
    type IntoIter = StepSamples<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(t, y)` samples of a [`StepResponse`].
#[derive(Debug, Clone)]
pub struct StepSamples<'a> {
    response: &'a StepResponse,
    index: usize,
    state: Vec<f64>,
    scratch: Rk4Scratch,
}

impl Iterator for StepSamples<'_> {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let resp = self.response;
        if self.index >= resp.grid.len() {
            return None;
        }

        let u = resp.amplitude;
        let t = resp.grid.time(self.index);
        let y = resp.realization.output(&self.state, u);

        self.index += 1;
        if self.index < resp.grid.len() {
            let h = resp.grid.dt() / resp.substeps as f64;
            for _ in 0..resp.substeps {
                self.scratch
                    .step(&resp.realization, &mut self.state, u, h);
            }
        }

        Some((t, y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.response.grid.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StepSamples<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_lengths() {
        let g = TimeGrid::new(600.0, 0.1).unwrap();
        assert_eq!(g.len(), 6001);
        assert!((g.t_end() - 600.0).abs() < 1e-9);
        assert!(TimeGrid::new(10.0, 0.0).is_err());
        assert!(TimeGrid::new(-1.0, 0.1).is_err());
        assert_eq!(TimeGrid::new(0.0, 0.1).unwrap().len(), 1);
    }

    #[test]
    fn first_order_matches_analytic() {
        let tf = TransferFunction::first_order(2.0, 5.0).unwrap();
        let grid = TimeGrid::new(30.0, 0.5).unwrap();
        let resp = step_response(&tf, 1.5, grid).unwrap();
        for (t, y) in resp.iter() {
            let exact = 3.0 * (1.0 - (-t / 5.0).exp());
            assert!((y - exact).abs() < 1e-5, "t={t} y={y} exact={exact}");
        }
    }

    #[test]
    fn restartable_and_exact_size() {
        let tf = TransferFunction::first_order(1.0, 1.0).unwrap();
        let resp = step_response(&tf, 1.0, TimeGrid::new(5.0, 0.1).unwrap()).unwrap();
        let first: Vec<_> = resp.iter().collect();
        let second: Vec<_> = (&resp).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(resp.iter().len(), 51);
    }

    #[test]
    fn feedthrough_shows_at_t0() {
        // (s + 2) / (s + 1): y(0) = 1, y(inf) = 2
        let tf = TransferFunction::from_coeffs(&[1.0, 2.0], &[1.0, 1.0]).unwrap();
        let resp = step_response(&tf, 1.0, TimeGrid::new(20.0, 0.05).unwrap()).unwrap();
        let samples = resp.samples();
        assert!((samples[0].1 - 1.0).abs() < 1e-12);
        assert!((samples.last().unwrap().1 - 2.0).abs() < 1e-6);
    }

    #[test]
    fn static_gain_has_no_states() {
        let tf = TransferFunction::gain(4.0).unwrap();
        let resp = step_response(&tf, 0.5, TimeGrid::new(1.0, 0.5).unwrap()).unwrap();
        assert_eq!(resp.samples(), vec![(0.0, 2.0), (0.5, 2.0), (1.0, 2.0)]);
    }

    #[test]
    fn fast_pole_gets_substeps() {
        // Pole at -100 on a 0.1 s grid must stay stable.
        let tf = TransferFunction::first_order(1.0, 0.01).unwrap();
        let resp = step_response(&tf, 1.0, TimeGrid::new(1.0, 0.1).unwrap()).unwrap();
        let last = resp.samples().last().unwrap().1;
        assert!((last - 1.0).abs() < 1e-6);
    }
}
