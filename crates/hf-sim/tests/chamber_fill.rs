use hf_core::{g_per_min, per_hour, percent};
use hf_sim::*;

#[test]
fn reference_chamber_saturates_in_81_seconds() {
    let params = FillParameters::default();
    let record = simulate_fill(&params).unwrap();

    let t = record.time_to_target_min.unwrap();
    assert!((t - 1.35).abs() < 1e-9);
    assert!((record.time_to_target_s().unwrap() - 81.0).abs() < 1e-6);
    assert_eq!(record.times_min.len(), 28);
    assert!((record.injected_g - 4.455).abs() < 1e-6);
    assert!((record.condensed_g - 0.764940).abs() < 1e-5);
    assert!((record.saturation_g_m3 - 17.242830).abs() < 1e-5);
    assert!((record.final_rh_pct() - 100.0).abs() < 1e-9);
}

#[test]
fn density_never_exceeds_saturation() {
    let params = FillParameters {
        humidifier_rate: g_per_min(20.0),
        ..FillParameters::default()
    };
    let record = simulate_fill(&params).unwrap();
    assert!(
        record
            .density_g_m3
            .iter()
            .all(|rho| *rho >= 0.0 && *rho <= record.saturation_g_m3)
    );
    assert!(record.condensed_g >= 0.0);
    assert!(record.injected_g >= record.condensed_g);
}

#[test]
fn weak_humidifier_does_not_reach_target() {
    let params = FillParameters {
        humidifier_rate: g_per_min(0.5),
        ..FillParameters::default()
    };
    let record = simulate_fill(&params).unwrap();
    assert!(record.time_to_target_min.is_none());
    assert_eq!(record.times_min.len(), 1201);
    assert!((record.injected_g - 30.0).abs() < 1e-6);
    let last = *record.density_g_m3.last().unwrap();
    assert!((last - 1.948487).abs() < 1e-4);
}

#[test]
fn proportional_condensation_only_acts_at_saturation() {
    let params = FillParameters {
        condensation: Condensation::Proportional {
            rate: per_hour(0.55 * 60.0),
        },
        ..FillParameters::default()
    };
    let record = simulate_fill(&params).unwrap();
    assert!((record.time_to_target_min.unwrap() - 1.15).abs() < 1e-9);
    assert!((record.condensed_g - 0.138788).abs() < 1e-5);
}

#[test]
fn lower_target_stops_early() {
    let params = FillParameters {
        target_rh: percent(80.0),
        ..FillParameters::default()
    };
    let record = simulate_fill(&params).unwrap();
    assert!((record.time_to_target_min.unwrap() - 1.05).abs() < 1e-9);
    assert!(record.rh_pct().last().unwrap() >= 80.0);
}
