use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use hotel_dash::data::filter::{GuestDim, domain};
use hotel_dash::data::loader::load_dataset;
use hotel_dash::data::season::Season;
use hotel_dash::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Season selector ----
            ui.strong("Select Season");
            let current = state.filter.season;
            let current_text = current.map(Season::name).unwrap_or("All");
            let mut chosen = None;
            egui::ComboBox::from_id_salt("season")
                .selected_text(current_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(current.is_none(), "All").clicked() {
                        chosen = Some(None);
                    }
                    for season in dataset.season_options() {
                        if ui
                            .selectable_label(current == Some(season), season.name())
                            .clicked()
                        {
                            chosen = Some(Some(season));
                        }
                    }
                });
            if let Some(season) = chosen {
                state.set_season(season);
            }
            ui.separator();

            // ---- Months ----
            let n_months = state.filter.months.len();
            egui::CollapsingHeader::new(RichText::new(format!("Select Month  ({n_months}/12)")).strong())
                .id_salt("months")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_months();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_months();
                        }
                    });
                    for month in state.config.month_order.sequence() {
                        let mut checked = state.filter.months.contains(&month);
                        if ui.checkbox(&mut checked, month.name()).changed() {
                            state.toggle_month(month);
                        }
                    }
                });

            // ---- Guest counts (collapsible) ----
            for dim in GuestDim::ALL {
                let all_values = domain(&dataset, dim);
                let n_selected = state.filter.guests(dim).len();
                let n_total = all_values.len();
                let header_text = format!("Number of {}  ({n_selected}/{n_total})", dim.label());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });
                        for &value in all_values {
                            let mut checked = state.filter.guests(dim).contains(&value);
                            if ui.checkbox(&mut checked, value.to_string()).changed() {
                                state.toggle_guests(dim, value);
                            }
                        }
                    });
            }
            ui.separator();

            // ---- Price range ----
            ui.strong("Select Price Range (ADR)");
            let (lo_bound, hi_bound) = dataset.price_bounds();
            let (mut lo, mut hi) = state.filter.price_range;
            let mut changed = ui
                .add(egui::Slider::new(&mut lo, lo_bound..=hi_bound).integer().text("min"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut hi, lo_bound..=hi_bound).integer().text("max"))
                .changed();
            if changed {
                state.set_price_range(lo, hi);
            }
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} bookings loaded, {} selected",
                ds.len(),
                state.visible_indices.len()
            ));
        }
        if let Some(report) = &state.report {
            let dropped = report.rows_dropped();
            if dropped > 0 {
                ui.separator();
                ui.label(format!("{dropped} invalid rows removed"));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open booking data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match load_dataset(&path) {
            Ok((dataset, report)) => {
                log::info!(
                    "Loaded {} bookings ({} rows dropped) from {}",
                    dataset.len(),
                    report.rows_dropped(),
                    path.display()
                );
                state.set_dataset(dataset, report);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
