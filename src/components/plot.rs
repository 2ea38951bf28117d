use crate::metrics::process::ChartSeriesPoint;

/// Fixed 0..=100 percent plot of parallel series sharing one time axis.
pub fn usage_plot(
    ui: &mut egui::Ui,
    id: impl std::hash::Hash,
    height: f32,
    max_points: usize,
    series: &[(&str, &[ChartSeriesPoint])],
) {
    let plot = egui_plot::Plot::new(id)
        .height(height)
        .show_axes(true)
        .legend(egui_plot::Legend::default())
        .set_margin_fraction(egui::Vec2::ZERO)
        .include_x(0.0)
        .include_x(max_points.saturating_sub(1) as f64)
        .include_y(0.0)
        .include_y(100.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false);

    // x axis labels come from the first series
    let labels: Vec<String> = series
        .first()
        .map(|(_, points)| points.iter().map(|p| p.timestamp_label.clone()).collect())
        .unwrap_or_default();
    let plot = plot.x_axis_formatter(move |mark, _range| {
        let index = mark.value.round();
        if index < 0.0 || (index - mark.value).abs() > f64::EPSILON {
            return String::new();
        }
        labels.get(index as usize).cloned().unwrap_or_default()
    });

    plot.show(ui, |plot_ui| {
        for (name, points) in series {
            let points: egui_plot::PlotPoints = points
                .iter()
                .enumerate()
                .map(|(i, p)| [i as f64, p.value as f64])
                .collect();
            plot_ui.line(egui_plot::Line::new(points).name(*name));
        }
    });
}
