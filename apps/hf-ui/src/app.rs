use std::path::PathBuf;

use hf_app::{PlotSpec, analysis_plots, fill_plot};
use hf_project::AnalysisConfig;
use tracing::{error, info};

use crate::views::show_plot;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ViewTab {
    Report,
    OpenLoop,
    PoleZero,
    ClosedLoop,
    Bode,
    Fill,
}

pub struct HumidiflowApp {
    config: AnalysisConfig,
    config_path: Option<PathBuf>,
    active_view: ViewTab,
    report_text: String,
    fill_text: String,
    plots: Vec<PlotSpec>,
    fill: Option<PlotSpec>,
    last_error: Option<String>,
}

impl HumidiflowApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config_path: Option<PathBuf>) -> Self {
        let mut app = Self {
            config: AnalysisConfig::default(),
            config_path,
            active_view: ViewTab::Report,
            report_text: String::new(),
            fill_text: String::new(),
            plots: Vec::new(),
            fill: None,
            last_error: None,
        };
        app.reload_config();
        app
    }

    fn reload_config(&mut self) {
        if let Some(path) = &self.config_path {
            match hf_project::load_config(path) {
                Ok(config) => {
                    info!(path = %path.display(), "configuration loaded");
                    self.config = config;
                }
                Err(e) => {
                    error!(error = %e, "failed to load configuration");
                    self.last_error = Some(format!("Error loading configuration: {e}"));
                    return;
                }
            }
        }
        self.run();
    }

    fn run(&mut self) {
        self.last_error = None;
        match hf_app::run_analysis(&self.config) {
            Ok(report) => {
                self.report_text = hf_app::render_text(&report);
                self.plots = analysis_plots(&report);
            }
            Err(e) => {
                self.plots.clear();
                self.report_text.clear();
                self.last_error = Some(format!("Analysis failed: {e}"));
            }
        }
        match hf_app::run_fill(&self.config.fill) {
            Ok(record) => {
                self.fill_text = hf_app::render_fill_text(&self.config.fill, &record);
                self.fill = Some(fill_plot(&record));
            }
            Err(e) => {
                self.fill = None;
                self.fill_text = format!("Fill simulation failed: {e}");
            }
        }
    }

    fn plot(&self, id: &str) -> Option<&PlotSpec> {
        self.plots.iter().find(|p| p.id == id)
    }

    fn single(&self, ui: &mut egui::Ui, id: &str) {
        match self.plot(id) {
            Some(spec) => show_plot(ui, spec, None),
            None => {
                ui.label("No analysis results available");
            }
        }
    }
}

impl eframe::App for HumidiflowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut rerun = false;
        let mut reload = false;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.config_path.is_some() && ui.button("Reload").clicked() {
                    reload = true;
                }
                if ui.button("Run").clicked() {
                    rerun = true;
                }

                ui.separator();
                ui.label("PI:");
                let comp = &mut self.config.compensator;
                ui.add(
                    egui::DragValue::new(&mut comp.compensator_zero)
                        .speed(0.0005)
                        .range(1e-4..=10.0)
                        .prefix("zero "),
                );
                ui.add(
                    egui::DragValue::new(&mut comp.target_pole.re)
                        .speed(0.001)
                        .range(-10.0..=-1e-4)
                        .prefix("s0 re "),
                );
                ui.add(
                    egui::DragValue::new(&mut comp.target_pole.im)
                        .speed(0.001)
                        .range(0.0..=10.0)
                        .prefix("im "),
                );

                ui.separator();
                ui.label("Step:");
                ui.add(
                    egui::DragValue::new(&mut self.config.analysis.step_amplitude)
                        .speed(0.1)
                        .range(0.0..=10.0)
                        .suffix(" V"),
                );
            });
        });

        if reload {
            self.reload_config();
        } else if rerun {
            self.run();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.active_view, ViewTab::Report, "Report");
                ui.selectable_value(&mut self.active_view, ViewTab::OpenLoop, "Open loop");
                ui.selectable_value(&mut self.active_view, ViewTab::PoleZero, "Poles/zeros");
                ui.selectable_value(&mut self.active_view, ViewTab::ClosedLoop, "Closed loop");
                ui.selectable_value(&mut self.active_view, ViewTab::Bode, "Bode");
                ui.selectable_value(&mut self.active_view, ViewTab::Fill, "Chamber fill");
            });

            ui.separator();

            if let Some(err) = &self.last_error {
                ui.colored_label(egui::Color32::RED, err);
                ui.separator();
            }

            match self.active_view {
                ViewTab::Report => {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.monospace(&self.report_text);
                    });
                }
                ViewTab::OpenLoop => self.single(ui, "open_loop_step"),
                ViewTab::PoleZero => self.single(ui, "closed_loop_pole_zero"),
                ViewTab::ClosedLoop => self.single(ui, "closed_loop_step"),
                ViewTab::Bode => {
                    let half = (ui.available_height() - 40.0) / 2.0;
                    for id in ["bode_magnitude", "bode_phase"] {
                        if let Some(spec) = self.plot(id) {
                            show_plot(ui, spec, Some(half));
                        }
                    }
                }
                ViewTab::Fill => {
                    ui.monospace(&self.fill_text);
                    ui.separator();
                    if let Some(spec) = &self.fill {
                        show_plot(ui, spec, None);
                    }
                }
            }
        });
    }
}
