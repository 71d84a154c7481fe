//! Humidity fill simulation for the enclosure.
//!
//! Provides:
//! - Magnus-formula psychrometrics (saturation pressure and vapour density)
//! - Explicit mass-balance stepping of the enclosure vapour density with
//!   humidifier injection, ventilation, condensation and a saturation cap
//! - Fill records with time-to-target and mass accounting

pub mod chamber;
pub mod error;
pub mod psychro;

pub use chamber::{ChamberState, Condensation, FillParameters, FillRecord, simulate_fill};
pub use error::{SimError, SimResult};
pub use psychro::{density_from_rh, rh_from_density, saturation_density, saturation_pressure_hpa};
