//! Shared application service layer for humidiflow.
//!
//! Runs the analysis pipeline (model builder, open-loop analyzer,
//! compensator designer, closed-loop analyzer) and turns its output into the
//! text/JSON reports and plot series consumed by the CLI and the viewer.

pub mod closed_loop;
pub mod compensator;
pub mod error;
pub mod fill_service;
pub mod model;
pub mod open_loop;
pub mod pipeline;
pub mod plots;
pub mod report;

pub use closed_loop::{ClosedLoopAnalysis, analyze_closed_loop};
pub use compensator::CompensatedSystem;
pub use error::{AppError, AppResult};
pub use fill_service::{fill_parameters, render_fill_text, run_fill};
pub use model::{BlockParameters, PlantModel, PlantParameters};
pub use open_loop::{OpenLoopAnalysis, StepAnalysis, analyze_open_loop, step_with_metrics};
pub use pipeline::{AnalysisReport, Compensation, run_analysis};
pub use plots::{PlotSeries, PlotSpec, SeriesStyle, analysis_plots, export_csv, fill_plot};
pub use report::{render_json, render_text};
