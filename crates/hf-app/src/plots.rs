//! Plot series for the report figures and their CSV export.
//!
//! The viewer draws these directly; the CLI writes one CSV per plot with a
//! `series,x,y` layout.

use std::path::{Path, PathBuf};

use hf_lti::Complex;
use hf_sim::FillRecord;
use serde::{Deserialize, Serialize};

use crate::closed_loop::ClosedLoopAnalysis;
use crate::error::{AppError, AppResult};
use crate::pipeline::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesStyle {
    Line,
    DashedLine,
    /// Markers only (pole-zero maps).
    Points,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub name: String,
    pub style: SeriesStyle,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    /// File stem and widget id.
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<PlotSeries>,
}

fn line(name: &str, points: impl IntoIterator<Item = (f64, f64)>) -> PlotSeries {
    PlotSeries {
        name: name.to_string(),
        style: SeriesStyle::Line,
        points: points.into_iter().map(|(x, y)| [x, y]).collect(),
    }
}

/// Horizontal reference across the x range of `points`.
fn reference(name: &str, points: &[[f64; 2]], y: f64) -> PlotSeries {
    let x0 = points.first().map_or(0.0, |p| p[0]);
    let x1 = points.last().map_or(0.0, |p| p[0]);
    PlotSeries {
        name: name.to_string(),
        style: SeriesStyle::DashedLine,
        points: vec![[x0, y], [x1, y]],
    }
}

pub fn open_loop_step_plot(report: &AnalysisReport) -> PlotSpec {
    let step = &report.open_loop.step;
    PlotSpec {
        id: "open_loop_step".to_string(),
        title: format!("Respuesta al escalón de {} V (lazo abierto)", step.amplitude),
        x_label: "Tiempo [s]".to_string(),
        y_label: "Salida del sensor [V]".to_string(),
        series: vec![line("L(s)", step.samples.iter().copied())],
    }
}

pub fn pole_zero_plot(cl: &ClosedLoopAnalysis) -> PlotSpec {
    let points = |roots: &[Complex<f64>]| -> Vec<[f64; 2]> {
        roots.iter().map(|r| [r.re, r.im]).collect()
    };
    PlotSpec {
        id: "closed_loop_pole_zero".to_string(),
        title: "Mapa de polos y ceros (lazo cerrado compensado)".to_string(),
        x_label: "Re(s)".to_string(),
        y_label: "Im(s)".to_string(),
        series: vec![
            PlotSeries {
                name: "Polos".to_string(),
                style: SeriesStyle::Points,
                points: points(&cl.poles),
            },
            PlotSeries {
                name: "Ceros".to_string(),
                style: SeriesStyle::Points,
                points: points(&cl.zeros),
            },
        ],
    }
}

pub fn closed_loop_step_plot(cl: &ClosedLoopAnalysis) -> PlotSpec {
    let step = &cl.step;
    let response = line("Lazo cerrado compensado", step.samples.iter().copied());
    let final_line = reference(
        &format!("Valor final = {:.2} %RH", step.metrics.final_value),
        &response.points,
        step.metrics.final_value,
    );
    PlotSpec {
        id: "closed_loop_step".to_string(),
        title: format!("Respuesta al escalón de {} V (lazo cerrado compensado)", step.amplitude),
        x_label: "Tiempo [s]".to_string(),
        y_label: "Humedad relativa [%RH]".to_string(),
        series: vec![response, final_line],
    }
}

/// Magnitude and phase of the compensated open loop against `log10(w)`.
pub fn bode_plots(cl: &ClosedLoopAnalysis) -> [PlotSpec; 2] {
    let points = &cl.bode.points;
    let magnitude = PlotSpec {
        id: "bode_magnitude".to_string(),
        title: "Bode de lazo abierto compensado: magnitud".to_string(),
        x_label: "log10(w) [rad/s]".to_string(),
        y_label: "|L(jw)| [dB]".to_string(),
        series: vec![line(
            "PI G H",
            points.iter().map(|p| (p.omega_rad_s.log10(), p.magnitude_db)),
        )],
    };
    let phase = PlotSpec {
        id: "bode_phase".to_string(),
        title: "Bode de lazo abierto compensado: fase".to_string(),
        x_label: "log10(w) [rad/s]".to_string(),
        y_label: "Fase [grados]".to_string(),
        series: vec![line(
            "PI G H",
            points.iter().map(|p| (p.omega_rad_s.log10(), p.phase_deg)),
        )],
    };
    [magnitude, phase]
}

/// Chamber RH against time in seconds with the target as reference.
pub fn fill_plot(record: &FillRecord) -> PlotSpec {
    let target_pct = record.target_g_m3 / record.saturation_g_m3 * 100.0;
    let curve = line(
        "HR interior",
        record
            .times_min
            .iter()
            .zip(record.rh_pct())
            .map(|(t, rh)| (t * 60.0, rh)),
    );
    let target = reference(&format!("Objetivo {target_pct:.0} %"), &curve.points, target_pct);
    PlotSpec {
        id: "chamber_fill".to_string(),
        title: "Evolución de la humedad en el recinto".to_string(),
        x_label: "Tiempo [s]".to_string(),
        y_label: "Humedad relativa [%]".to_string(),
        series: vec![curve, target],
    }
}

/// All analysis plots in report order. A degenerate compensator design
/// leaves only the open-loop step.
pub fn analysis_plots(report: &AnalysisReport) -> Vec<PlotSpec> {
    let mut plots = vec![open_loop_step_plot(report)];
    if let Some((_, cl)) = report.compensation.designed() {
        let [magnitude, phase] = bode_plots(cl);
        plots.extend([pole_zero_plot(cl), closed_loop_step_plot(cl), magnitude, phase]);
    }
    plots
}

pub fn to_csv(plot: &PlotSpec) -> String {
    let mut out = String::from("series,x,y\n");
    for series in &plot.series {
        let name = series.name.replace(',', ";");
        for [x, y] in &series.points {
            out.push_str(&format!("{name},{x},{y}\n"));
        }
    }
    out
}

/// Write `<dir>/<plot id>.csv` for every plot, creating `dir` if needed.
pub fn export_csv(dir: &Path, plots: &[PlotSpec]) -> AppResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(plots.len());
    for plot in plots {
        let path = dir.join(format!("{}.csv", plot.id));
        std::fs::write(&path, to_csv(plot)).map_err(|source| AppError::ExportWrite {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_layout() {
        let plot = PlotSpec {
            id: "t".to_string(),
            title: "t".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            series: vec![line("a,b", [(0.0, 1.0), (1.0, 2.5)])],
        };
        assert_eq!(to_csv(&plot), "series,x,y\na;b,0,1\na;b,1,2.5\n");
    }

    #[test]
    fn reference_spans_series() {
        let pts = [[0.0, 1.0], [10.0, 3.0]];
        let r = reference("ref", &pts, 2.0);
        assert_eq!(r.points, vec![[0.0, 2.0], [10.0, 2.0]]);
        assert_eq!(r.style, SeriesStyle::DashedLine);
    }
}
