//! Text and JSON reports.
//!
//! The text report uses the Spanish headings and labels of the lab's design
//! worksheets. Unreached time metrics, undefined gains and missing
//! crossings are printed as explicit markers, never as zero.

use std::fmt::Write as _;

use hf_lti::{Complex, DcGain, StabilityMargins, StepResponseMetrics};
use serde::Serialize;

use crate::closed_loop::ClosedLoopAnalysis;
use crate::compensator::CompensatedSystem;
use crate::error::AppResult;
use crate::model::PlantParameters;
use crate::pipeline::{AnalysisReport, Compensation};

pub const NOT_REACHED: &str = "no alcanzado en el horizonte simulado";
pub const UNDEFINED: &str = "indefinido";
pub const INFINITE: &str = "inf";

const RULE: &str = "==================================================";

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{RULE}");
}

fn fmt_time(t: Option<f64>) -> String {
    t.map_or_else(|| NOT_REACHED.to_string(), |t| format!("{t:.2} s"))
}

fn fmt_dc(k: DcGain) -> String {
    match k {
        DcGain::Finite(v) => format!("{v:.4}"),
        DcGain::Infinite => INFINITE.to_string(),
        DcGain::Undefined => UNDEFINED.to_string(),
    }
}

fn fmt_opt(v: Option<f64>, unit: &str) -> String {
    match v {
        Some(v) if v.is_infinite() => INFINITE.to_string(),
        Some(v) => format!("{v:.4}{unit}"),
        None => UNDEFINED.to_string(),
    }
}

fn fmt_roots(roots: &[Complex<f64>]) -> String {
    if roots.is_empty() {
        return "ninguno".to_string();
    }
    roots
        .iter()
        .map(|r| {
            if r.im == 0.0 {
                format!("{:.4}", r.re)
            } else {
                format!("{:.4}{:+.4}j", r.re, r.im)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_metrics(out: &mut String, m: &StepResponseMetrics) {
    let _ = writeln!(out, "Valor final: {:.4}", m.final_value);
    let _ = writeln!(out, "Último valor simulado: {:.4}", m.last_value);
    let _ = writeln!(out, "Tiempo de establecimiento: {}", fmt_time(m.settling_time_s));
    let _ = writeln!(out, "Tiempo de subida: {}", fmt_time(m.rise_time_s));
    let _ = writeln!(out, "Sobrepaso SO: {:.2} %", m.overshoot_pct);
}

fn write_margins(out: &mut String, m: &StabilityMargins) {
    match m.phase_crossover_rad_s {
        Some(w) => {
            let _ = writeln!(
                out,
                "Margen de ganancia: {:.2} dB ({:.4}) en w = {w:.4} rad/s",
                m.gain_margin_db, m.gain_margin
            );
        }
        None => {
            let _ = writeln!(out, "Margen de ganancia: {INFINITE}");
        }
    }
    match m.gain_crossover_rad_s {
        Some(w) => {
            let _ = writeln!(
                out,
                "Margen de fase: {:.2} grados en w = {w:.4} rad/s",
                m.phase_margin_deg
            );
        }
        None => {
            let _ = writeln!(out, "Margen de fase: {INFINITE}");
        }
    }
}

/// Render the fixed-order text report: open loop, compensator, closed loop.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let ol = &report.open_loop;

    heading(&mut out, "ANALISIS DE RESPUESTA TEMPORAL");
    let _ = writeln!(out, "L(s) = {}", report.model.open_loop);
    let _ = writeln!(out, "Polos: {}", fmt_roots(&ol.pole_zero.poles));
    let _ = writeln!(out, "Ceros: {}", fmt_roots(&ol.pole_zero.zeros));
    write_metrics(&mut out, &ol.step.metrics);
    let _ = writeln!(out, "K estatica: {}", fmt_opt(ol.step.static_gain(), ""));
    let _ = writeln!(out, "Ganancia DC (Kp): {}", fmt_dc(ol.dc_gain()));
    let _ = writeln!(
        out,
        "Error en estado estable: {}",
        fmt_opt(ol.steady_state_error, "")
    );
    out.push('\n');

    match &report.compensation {
        Compensation::Designed {
            system,
            closed_loop,
        } => write_compensated(&mut out, system, closed_loop),
        Compensation::Degenerate {
            zero,
            target_pole,
            reason,
        } => {
            heading(&mut out, "DISEÑO DEL COMPENSADOR PI");
            let _ = writeln!(out, "Cero del compensador: s = {:.6}", -zero);
            let _ = writeln!(
                out,
                "Polo deseado: s = {:.4}{:+.4}j",
                target_pole.0, target_pole.1
            );
            let _ = writeln!(out, "Ganancia del compensador Kp: {UNDEFINED}");
            let _ = writeln!(out, "Motivo: {reason}");
            out.push('\n');

            heading(&mut out, "RESPUESTA TEMPORAL LAZO CERRADO COMPENSADO");
            let _ = writeln!(
                out,
                "Lazo cerrado no evaluado: ganancia del compensador {UNDEFINED}"
            );
        }
    }

    out
}

fn write_compensated(out: &mut String, comp: &CompensatedSystem, cl: &ClosedLoopAnalysis) {
    heading(out, "DISEÑO DEL COMPENSADOR PI");
    let d = &comp.design;
    let _ = writeln!(out, "Cero del compensador: s = {:.6}", -d.zero);
    let _ = writeln!(
        out,
        "Polo deseado: s = {:.4}{:+.4}j",
        d.target_pole.0, d.target_pole.1
    );
    let _ = writeln!(out, "Ángulo en el polo deseado: {:.2} grados", d.locus.angle_deg);
    let _ = writeln!(out, "Ganancia del compensador Kp: {:.4}", d.gain);
    let _ = writeln!(out, "Tiempo integral Ti: {:.4} s", d.integral_time());
    let _ = writeln!(out, "PI(s) = {}", d.compensator);
    let _ = writeln!(out, "Ganancia DC (Kp): {}", fmt_dc(cl.open_loop_dc_gain));
    let _ = writeln!(
        out,
        "Error en estado estable: {}",
        fmt_opt(cl.steady_state_error, "")
    );
    out.push('\n');

    heading(out, "RESPUESTA TEMPORAL LAZO CERRADO COMPENSADO");
    let _ = writeln!(out, "Polos: {}", fmt_roots(&cl.poles));
    let _ = writeln!(out, "Ceros: {}", fmt_roots(&cl.zeros));
    write_metrics(out, &cl.step.metrics);
    let _ = writeln!(
        out,
        "Ganancia DC del lazo cerrado: {}",
        fmt_dc(cl.closed_loop_dc_gain)
    );
    let _ = writeln!(
        out,
        "RH resultante de un escalón de {}V: {}",
        cl.reference_step_v,
        fmt_opt(cl.rh_for_reference_pct, " %RH")
    );
    let _ = writeln!(
        out,
        "Voltaje requerido para {}%RH: {}",
        cl.target_rh_pct,
        fmt_opt(cl.voltage_for_target_v, " V")
    );
    write_margins(out, &cl.margins);
}

/// `[re, im]` pairs for JSON output.
fn roots_json(roots: &[Complex<f64>]) -> Vec<[f64; 2]> {
    roots.iter().map(|r| [r.re, r.im]).collect()
}

#[derive(Debug, Serialize)]
struct OpenLoopJson {
    poles: Vec<[f64; 2]>,
    zeros: Vec<[f64; 2]>,
    dc_gain: DcGain,
    static_gain: Option<f64>,
    metrics: StepResponseMetrics,
    steady_state_error: Option<f64>,
}

/// Gain fields are `null` when the design is degenerate.
#[derive(Debug, Serialize)]
struct CompensatorJson {
    zero: f64,
    target_pole: [f64; 2],
    gain: Option<f64>,
    integral_time_s: Option<f64>,
    angle_deg: Option<f64>,
    transfer_function: Option<String>,
    degenerate_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClosedLoopJson {
    poles: Vec<[f64; 2]>,
    zeros: Vec<[f64; 2]>,
    metrics: StepResponseMetrics,
    open_loop_dc_gain: DcGain,
    steady_state_error: Option<f64>,
    closed_loop_dc_gain: DcGain,
    reference_step_v: f64,
    rh_for_reference_pct: Option<f64>,
    target_rh_pct: f64,
    voltage_for_target_v: Option<f64>,
    /// Infinite margins serialize as `null`.
    margins: StabilityMargins,
}

#[derive(Debug, Serialize)]
struct ReportJson<'a> {
    name: &'a str,
    plant: PlantParameters,
    open_loop: OpenLoopJson,
    compensator: CompensatorJson,
    closed_loop: Option<ClosedLoopJson>,
}

fn compensated_json(compensation: &Compensation) -> (CompensatorJson, Option<ClosedLoopJson>) {
    match compensation {
        Compensation::Designed {
            system,
            closed_loop: cl,
        } => {
            let d = &system.design;
            let compensator = CompensatorJson {
                zero: d.zero,
                target_pole: [d.target_pole.0, d.target_pole.1],
                gain: Some(d.gain),
                integral_time_s: Some(d.integral_time()),
                angle_deg: Some(d.locus.angle_deg),
                transfer_function: Some(d.compensator.to_string()),
                degenerate_reason: None,
            };
            let closed = ClosedLoopJson {
                poles: roots_json(&cl.poles),
                zeros: roots_json(&cl.zeros),
                metrics: cl.step.metrics.clone(),
                open_loop_dc_gain: cl.open_loop_dc_gain,
                steady_state_error: cl.steady_state_error,
                closed_loop_dc_gain: cl.closed_loop_dc_gain,
                reference_step_v: cl.reference_step_v,
                rh_for_reference_pct: cl.rh_for_reference_pct,
                target_rh_pct: cl.target_rh_pct,
                voltage_for_target_v: cl.voltage_for_target_v,
                margins: cl.margins,
            };
            (compensator, Some(closed))
        }
        Compensation::Degenerate {
            zero,
            target_pole,
            reason,
        } => (
            CompensatorJson {
                zero: *zero,
                target_pole: [target_pole.0, target_pole.1],
                gain: None,
                integral_time_s: None,
                angle_deg: None,
                transfer_function: None,
                degenerate_reason: Some(reason.clone()),
            },
            None,
        ),
    }
}

pub fn render_json(report: &AnalysisReport) -> AppResult<String> {
    let ol = &report.open_loop;
    let (compensator, closed_loop) = compensated_json(&report.compensation);

    let json = ReportJson {
        name: &report.name,
        plant: report.model.params,
        open_loop: OpenLoopJson {
            poles: roots_json(&ol.pole_zero.poles),
            zeros: roots_json(&ol.pole_zero.zeros),
            dc_gain: ol.dc_gain(),
            static_gain: ol.step.static_gain(),
            metrics: ol.step.metrics.clone(),
            steady_state_error: ol.steady_state_error,
        },
        compensator,
        closed_loop,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_for_missing_values() {
        assert_eq!(fmt_time(None), NOT_REACHED);
        assert_eq!(fmt_time(Some(12.345)), "12.35 s");
        assert_eq!(fmt_dc(DcGain::Infinite), "inf");
        assert_eq!(fmt_dc(DcGain::Undefined), "indefinido");
        assert_eq!(fmt_opt(None, ""), "indefinido");
        assert_eq!(fmt_opt(Some(f64::INFINITY), " dB"), "inf");
    }

    #[test]
    fn roots_formatting() {
        let roots = [Complex::new(-0.2, 0.0), Complex::new(-1.0, 2.0)];
        assert_eq!(fmt_roots(&roots), "-0.2000, -1.0000+2.0000j");
        assert_eq!(fmt_roots(&[]), "ninguno");
    }

    #[test]
    fn infinite_margins_print_inf() {
        let m = StabilityMargins {
            gain_margin: f64::INFINITY,
            gain_margin_db: f64::INFINITY,
            phase_margin_deg: f64::INFINITY,
            phase_crossover_rad_s: None,
            gain_crossover_rad_s: None,
        };
        let mut out = String::new();
        write_margins(&mut out, &m);
        assert_eq!(out, "Margen de ganancia: inf\nMargen de fase: inf\n");
    }
}
