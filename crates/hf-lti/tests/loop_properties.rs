use hf_lti::*;
use proptest::prelude::*;

fn humidity_loop() -> (TransferFunction, TransferFunction) {
    let sensor = TransferFunction::first_order(0.03, 5.0).unwrap();
    let enclosure = TransferFunction::first_order(30.0, 45.0).unwrap();
    let humidifier = TransferFunction::first_order(0.66, 5.0).unwrap();
    let k = TransferFunction::gain(5.0 / 3.0).unwrap();
    (&enclosure * &humidifier, &sensor * &k)
}

fn default_sweep() -> FrequencyGrid {
    FrequencyGrid::logspace(1e-4, 1e2, 2000).unwrap()
}

#[test]
fn first_order_step_settles_at_four_tau() {
    let tf = TransferFunction::first_order(1.0, 10.0).unwrap();
    let grid = TimeGrid::new(200.0, 0.5).unwrap();
    let resp = step_response(&tf, 1.0, grid).unwrap();
    let m = response_metrics(&resp.samples(), 0.02, Some(1.0)).unwrap();

    assert!((m.final_value - 1.0).abs() < 1e-6);
    assert!((m.last_value - 1.0).abs() < 1e-6);
    let ts = m.settling_time_s.unwrap();
    // ln(50) * tau = 39.1 s
    assert!((ts - 40.0).abs() <= 1.0 + grid.dt(), "settling {ts}");
    // ln(19) * tau = 29.4 s
    let tr = m.rise_time_s.unwrap();
    assert!((tr - 10.0 * 19f64.ln()).abs() < 0.05, "rise {tr}");
    assert_eq!(m.overshoot_pct, 0.0);
}

#[test]
fn short_horizon_reports_unreached_rise() {
    let tf = TransferFunction::first_order(1.0, 10.0).unwrap();
    let resp = step_response(&tf, 1.0, TimeGrid::new(0.0, 0.5).unwrap()).unwrap();
    let m = response_metrics(&resp.samples(), 0.02, Some(1.0)).unwrap();
    assert!(m.rise_time_s.is_none());
    assert!(m.settling_time_s.is_none());
}

#[test]
fn truncated_step_is_not_settled() {
    // tau = 45 s cut off at 30 s: y(30) = 1 - exp(-2/3) ~ 0.487.
    let tf = TransferFunction::first_order(1.0, 45.0).unwrap();
    let resp = step_response(&tf, 1.0, TimeGrid::new(30.0, 0.1).unwrap()).unwrap();
    let m = response_metrics(&resp.samples(), 0.02, tf.dc_gain().value()).unwrap();
    assert_eq!(m.final_value, 1.0);
    assert!((m.last_value - 0.4866).abs() < 1e-3);
    assert!(m.settling_time_s.is_none());
    assert!(m.rise_time_s.is_none());
}

#[test]
fn worked_example_open_loop() {
    let (g, h) = humidity_loop();
    let l = &g * &h;
    let pzg = poles_zeros_gain(&l);

    let k = pzg.dc_gain.value().unwrap();
    assert!((k - 0.99).abs() < 1e-12);
    let ess = steady_state_error(pzg.dc_gain).unwrap();
    assert!((ess - 1.0 / 1.99).abs() < 1e-12);

    assert_eq!(pzg.poles.len(), 3);
    assert!(pzg.zeros.is_empty());
    // Sorted by real part: the two -0.2 poles come first.
    assert!((pzg.poles[0].re + 0.2).abs() < 1e-6);
    assert!((pzg.poles[2].re + 1.0 / 45.0).abs() < 1e-8);
}

#[test]
fn worked_example_compensated_loop() {
    let (g, h) = humidity_loop();
    let l = &g * &h;
    let design = design_pi(&l, 1.0 / 45.0, Complex::new(-0.05, 0.0)).unwrap();
    assert!((design.gain - 1.278409).abs() < 1e-5);
    assert!(design.locus.angle_error_deg().abs() < 1e-6);

    let forward = &design.compensator * &g;
    let open = &forward * &h;
    assert!(open.dc_gain().is_infinite());
    let ess = steady_state_error(open.dc_gain()).unwrap();
    assert!(ess < 1e-9);

    let closed = forward.feedback(&h).unwrap();
    let dc = closed.dc_gain().value().unwrap();
    assert!((dc - 20.0).abs() < 1e-9);

    let poles = closed.poles();
    assert!(poles.iter().all(|p| p.re < 0.0));
    assert!(poles.iter().any(|p| (p.re + 0.05).abs() < 1e-6 && p.im.abs() < 1e-6));

    let resp = step_response(&closed, 3.5, TimeGrid::new(600.0, 0.1).unwrap()).unwrap();
    let m = response_metrics(&resp.samples(), 0.02, Some(70.0)).unwrap();
    assert!((m.last_value - 70.0).abs() < 1e-3);
    assert!(m.overshoot_pct < 1e-6);
    let ts = m.settling_time_s.unwrap();
    assert!((ts - 94.1).abs() < 0.5, "settling {ts}");

    let margins = stability_margins(&open, &default_sweep()).unwrap();
    assert!(margins.gain_margin_db > 0.0);
    assert!(margins.phase_margin_deg > 0.0);
    assert!((margins.gain_margin_db - 23.06).abs() < 0.05);
    assert!((margins.phase_margin_deg - 74.29).abs() < 0.05);
    assert!((margins.gain_crossover_rad_s.unwrap() - 0.0276).abs() < 1e-4);
    assert!((margins.phase_crossover_rad_s.unwrap() - 0.2).abs() < 1e-3);
}

#[test]
fn closed_loop_poles_match_feedback() {
    let (g, h) = humidity_loop();
    let l = &g * &h;
    let from_locus = closed_loop_poles(&l, 1.0);
    let from_feedback = g.feedback(&h).unwrap().poles();
    assert_eq!(from_locus.len(), from_feedback.len());
    for (a, b) in from_locus.iter().zip(&from_feedback) {
        assert!((a - b).norm() < 1e-6);
    }
}

proptest! {
    #[test]
    fn first_order_dc_gain_is_its_gain(gain in -100.0..100.0f64, tau in 0.01..1000.0f64) {
        let tf = TransferFunction::first_order(gain, tau).unwrap();
        prop_assert_eq!(tf.dc_gain(), DcGain::Finite(gain));
    }

    #[test]
    fn series_dc_gain_multiplies(
        ka in -50.0..50.0f64, ta in 0.1..100.0f64,
        kb in -50.0..50.0f64, tb in 0.1..100.0f64,
    ) {
        let a = TransferFunction::first_order(ka, ta).unwrap();
        let b = TransferFunction::first_order(kb, tb).unwrap();
        let ab = (&a * &b).dc_gain().value().unwrap();
        let ba = (&b * &a).dc_gain().value().unwrap();
        prop_assert!((ab - ka * kb).abs() <= 1e-9 * (1.0 + (ka * kb).abs()));
        prop_assert!((ab - ba).abs() <= 1e-12 * (1.0 + ab.abs()));
    }
}
