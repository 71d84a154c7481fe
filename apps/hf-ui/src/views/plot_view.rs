use egui_plot::{Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints, Points};
use hf_app::{PlotSpec, SeriesStyle};

/// Draw one report figure; `height` of `None` fills the remaining space.
pub fn show_plot(ui: &mut egui::Ui, spec: &PlotSpec, height: Option<f32>) {
    ui.label(egui::RichText::new(&spec.title).strong());

    let mut plot = Plot::new(spec.id.as_str())
        .legend(Legend::default())
        .x_axis_label(spec.x_label.as_str())
        .y_axis_label(spec.y_label.as_str());
    if let Some(h) = height {
        plot = plot.height(h);
    }
    if spec.id.ends_with("pole_zero") {
        plot = plot.data_aspect(1.0);
    }

    plot.show(ui, |plot_ui| {
        for series in &spec.series {
            let points: PlotPoints = series.points.clone().into();
            match series.style {
                SeriesStyle::Line => {
                    plot_ui.line(Line::new(points).name(&series.name));
                }
                SeriesStyle::DashedLine => {
                    plot_ui.line(
                        Line::new(points)
                            .name(&series.name)
                            .style(LineStyle::dashed_loose()),
                    );
                }
                SeriesStyle::Points => {
                    let shape = if series.name == "Ceros" {
                        MarkerShape::Circle
                    } else {
                        MarkerShape::Cross
                    };
                    plot_ui.points(
                        Points::new(points)
                            .name(&series.name)
                            .shape(shape)
                            .radius(6.0),
                    );
                }
            }
        }
    });
}
