use crate::HfError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HfError::NonFinite { what, value: v })
    }
}

/// Positive, finite value check used for time constants, volumes and steps.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, HfError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(HfError::InvalidArg { what })
    }
}

/// `n` logarithmically spaced points from `start` to `stop` (both inclusive).
pub fn logspace(start: Real, stop: Real, n: usize) -> Result<Vec<Real>, HfError> {
    ensure_positive(start, "logspace start")?;
    ensure_positive(stop, "logspace stop")?;
    if n < 2 {
        return Err(HfError::InvalidArg {
            what: "logspace needs at least two points",
        });
    }
    if stop <= start {
        return Err(HfError::InvalidArg {
            what: "logspace stop must exceed start",
        });
    }

    let (a, b) = (start.log10(), stop.log10());
    let step = (b - a) / (n - 1) as Real;
    Ok((0..n)
        .map(|i| 10f64.powf(a + step * i as Real))
        .collect())
}

/// Linear interpolation of `x` where the segment `(x0, y0)-(x1, y1)` hits `y`.
#[inline]
pub fn interpolate_crossing(x0: Real, y0: Real, x1: Real, y1: Real, y: Real) -> Real {
    let dy = y1 - y0;
    if dy.abs() < 1e-300 {
        return x1;
    }
    x0 + (y - y0) / dy * (x1 - x0)
}
