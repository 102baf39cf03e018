use std::ops::RangeInclusive;

use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoints, Points};

use hotel_dash::chart::spec::{field_f64, field_text};
use hotel_dash::chart::{ChartId, ChartKind, ChartSpec};
use hotel_dash::state::AppState;

use super::{color32, shapes};

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Central panel layout
// ---------------------------------------------------------------------------

/// Render every chart of the current view in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a booking dataset to begin  (File → Open…)");
        });
        return;
    };

    let rows = [
        [ChartId::Country, ChartId::CompositionHeatmap],
        [ChartId::SeasonMonth, ChartId::Price],
    ];

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for pair in rows {
                ui.columns(2, |cols| {
                    for (col, id) in cols.iter_mut().zip(pair) {
                        if let Some(spec) = view.chart(id) {
                            chart(col, spec);
                        }
                    }
                });
                ui.add_space(12.0);
            }
            if let Some(spec) = view.chart(ChartId::Composition) {
                chart(ui, spec);
            }
        });
}

/// Render one chart spec according to its kind.
pub fn chart(ui: &mut Ui, spec: &ChartSpec) {
    ui.heading(&spec.title);
    if spec.data.is_empty() {
        ui.allocate_ui(egui::vec2(ui.available_width(), CHART_HEIGHT), |ui: &mut Ui| {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label("No bookings match the current filters.");
            });
        });
        return;
    }
    match spec.kind {
        ChartKind::Choropleth => shapes::tile_map(ui, spec, CHART_HEIGHT),
        ChartKind::Sunburst => shapes::sunburst(ui, spec, CHART_HEIGHT),
        ChartKind::Heatmap => shapes::heatmap(ui, spec, CHART_HEIGHT),
        ChartKind::Bar | ChartKind::Histogram => bar_chart(ui, spec),
        ChartKind::Scatter3d => composition_scatter(ui, spec),
    }
}

// ---------------------------------------------------------------------------
// Overall rate
// ---------------------------------------------------------------------------

/// Headline percentage with a progress bar.
pub fn overall_rate(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        return;
    };
    ui.add_space(4.0);
    ui.heading(view.overall.headline());
    ui.add(
        egui::ProgressBar::new(f32::from(view.overall.progress) / 100.0)
            .text(format!("{}%", view.overall.progress)),
    );
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// egui_plot charts
// ---------------------------------------------------------------------------

/// Bars over a categorical x axis, one bar per row in row order.
fn bar_chart(ui: &mut Ui, spec: &ChartSpec) {
    let x_field = spec.dimensions.x.as_deref().unwrap_or_default();
    let y_field = spec.dimensions.y.as_deref().unwrap_or_default();

    let categories: Vec<String> = spec
        .data
        .iter()
        .map(|row| field_text(row, x_field).unwrap_or_default())
        .collect();

    let bars: Vec<Bar> = spec
        .data
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let value = field_f64(row, y_field).unwrap_or(0.0);
            Bar::new(i as f64, value)
                .width(0.9)
                .fill(color32(spec.color_of(row)))
                .name(format!("{}: {value:.3}", categories[i]))
        })
        .collect();

    let x_label = spec.label(x_field).to_string();
    let y_label = spec.label(y_field).to_string();

    Plot::new(format!("{:?}_plot", spec.id))
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_tick(&categories, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Label of the category at integer position `value`, empty between ticks.
fn category_tick(categories: &[String], value: f64) -> String {
    if value.fract().abs() > 1e-6 || value < 0.0 {
        return String::new();
    }
    categories.get(value as usize).cloned().unwrap_or_default()
}

/// Adults on x, children on y, one series per baby count; colour by rate.
fn composition_scatter(ui: &mut Ui, spec: &ChartSpec) {
    let x_field = spec.dimensions.x.as_deref().unwrap_or_default();
    let y_field = spec.dimensions.y.as_deref().unwrap_or_default();
    let z_field = spec.dimensions.z.as_deref().unwrap_or_default();

    Plot::new("composition_plot")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.label(x_field).to_string())
        .y_axis_label(spec.label(y_field).to_string())
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for row in &spec.data {
                let (Some(x), Some(y)) = (field_f64(row, x_field), field_f64(row, y_field)) else {
                    continue;
                };
                let z = field_f64(row, z_field).unwrap_or(0.0);
                // Offset along the diagonal so baby counts do not overlap.
                let points: PlotPoints = vec![[x + z * 0.12, y + z * 0.12]].into();
                plot_ui.points(
                    Points::new(points)
                        .radius(6.0 + z as f32 * 2.0)
                        .color(color32(spec.color_of(row)))
                        .name(format!("{}: {z}", spec.label(z_field))),
                );
            }
        });
}
