//! Chamber fill runs driven by the configuration file.

use std::fmt::Write as _;

use hf_core::{degc, g_per_min, m3, minutes, per_hour, percent};
use hf_project::{CondensationDef, FillDef};
use hf_sim::{Condensation, FillParameters, FillRecord, simulate_fill};
use tracing::info;

use crate::error::AppResult;

/// Convert the file-level fill section into typed simulation parameters.
pub fn fill_parameters(def: &FillDef) -> FillParameters {
    let condensation = match def.condensation {
        CondensationDef::Fixed { rate_g_min } => Condensation::Fixed {
            rate: g_per_min(rate_g_min),
        },
        CondensationDef::Proportional { rate_per_min } => Condensation::Proportional {
            rate: per_hour(rate_per_min * 60.0),
        },
    };
    FillParameters {
        volume: m3(def.volume_m3),
        humidifier_rate: g_per_min(def.humidifier_rate_g_min),
        temperature: degc(def.temperature_c),
        initial_rh: percent(def.initial_rh_pct),
        outdoor_rh: percent(def.outdoor_rh_pct),
        air_changes: per_hour(def.air_changes_per_hour),
        condensation,
        target_rh: percent(def.target_rh_pct),
        dt: minutes(def.dt_min),
        t_max: minutes(def.t_max_min),
    }
}

pub fn run_fill(def: &FillDef) -> AppResult<FillRecord> {
    let record = simulate_fill(&fill_parameters(def))?;
    info!(
        time_to_target_s = ?record.time_to_target_s(),
        final_rh_pct = record.final_rh_pct(),
        "chamber fill simulated"
    );
    Ok(record)
}

pub fn render_fill_text(def: &FillDef, record: &FillRecord) -> String {
    let mut out = String::new();
    match record.time_to_target_s() {
        Some(t) => {
            let _ = writeln!(
                out,
                "Se alcanzó el {:.1}% de HR en {t:.1} segundos",
                def.target_rh_pct
            );
        }
        None => {
            let _ = writeln!(out, "No se alcanzó la humedad objetivo en el tiempo simulado");
        }
    }
    let _ = writeln!(out, "HR final: {:.2} %", record.final_rh_pct());
    let _ = writeln!(out, "Densidad de saturación: {:.3} g/m^3", record.saturation_g_m3);
    let _ = writeln!(out, "Masa total inyectada: {:.3} g", record.injected_g);
    let _ = writeln!(out, "Masa total condensada: {:.3} g", record.condensed_g);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fill_report() {
        let def = FillDef::default();
        let record = run_fill(&def).unwrap();
        let text = render_fill_text(&def, &record);
        assert!(text.starts_with("Se alcanzó el 100.0% de HR en 81.0 segundos"));
        assert!(text.contains("Densidad de saturación: 17.243 g/m^3"));
        assert!(text.contains("Masa total inyectada: 4.455 g"));
        assert!(text.contains("Masa total condensada: 0.765 g"));
    }

    #[test]
    fn proportional_rate_is_per_minute() {
        let def = FillDef {
            condensation: CondensationDef::Proportional { rate_per_min: 0.55 },
            ..FillDef::default()
        };
        let record = run_fill(&def).unwrap();
        assert!((record.time_to_target_min.unwrap() - 1.15).abs() < 1e-9);
    }
}
