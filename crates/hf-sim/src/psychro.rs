//! Psychrometric helpers based on the Magnus formula.
//!
//! Working units are degC, hPa and g/m^3; the public functions take and
//! return uom quantities.

use hf_core::units::working::{degc_of, g_per_m3_of, percent_of};
use hf_core::{Density, Ratio, Temperature, g_per_m3, percent};

use crate::error::{SimError, SimResult};

const MAGNUS_A_HPA: f64 = 6.112;
const MAGNUS_B: f64 = 17.62;
const MAGNUS_C_DEGC: f64 = 243.12;
/// `M_w / R` for water vapour scaled to g K / (m^3 hPa).
const VAPOUR_DENSITY_FACTOR: f64 = 216.7;
const ZERO_CELSIUS_K: f64 = 273.15;

fn checked_celsius(t: Temperature) -> SimResult<f64> {
    let t_c = hf_core::ensure_finite(degc_of(t), "temperature")?;
    if t_c <= -MAGNUS_C_DEGC {
        return Err(SimError::NonPhysical {
            what: "temperature outside the Magnus formula range",
        });
    }
    Ok(t_c)
}

/// Saturation vapour pressure in hPa.
pub fn saturation_pressure_hpa(t: Temperature) -> SimResult<f64> {
    let t_c = checked_celsius(t)?;
    Ok(MAGNUS_A_HPA * (MAGNUS_B * t_c / (MAGNUS_C_DEGC + t_c)).exp())
}

/// Vapour density at 100 % RH.
pub fn saturation_density(t: Temperature) -> SimResult<Density> {
    let e_s = saturation_pressure_hpa(t)?;
    let t_k = degc_of(t) + ZERO_CELSIUS_K;
    Ok(g_per_m3(VAPOUR_DENSITY_FACTOR * e_s / t_k))
}

pub fn density_from_rh(rh: Ratio, t: Temperature) -> SimResult<Density> {
    let rh_pct = hf_core::ensure_finite(percent_of(rh), "relative humidity")?;
    let sat = g_per_m3_of(saturation_density(t)?);
    Ok(g_per_m3(rh_pct / 100.0 * sat))
}

pub fn rh_from_density(rho: Density, t: Temperature) -> SimResult<Ratio> {
    let sat = g_per_m3_of(saturation_density(t)?);
    Ok(percent(g_per_m3_of(rho) / sat * 100.0))
}
