mod app;
mod cli;
mod ui;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use serde::Serialize;

use app::HotelDashApp;
use cli::Cli;
use hotel_dash::chart::{DashboardView, build_dashboard};
use hotel_dash::data::clean::CleaningReport;
use hotel_dash::data::loader::load_dataset;
use hotel_dash::state::AppState;
use hotel_dash::{DashboardConfig, FilterSpec};

/// Everything written by `--export`.
#[derive(Serialize)]
struct Export<'a> {
    source: String,
    config: &'a DashboardConfig,
    cleaning: &'a CleaningReport,
    dashboard: &'a DashboardView,
}

fn export(dataset_path: &Path, out: &Path, config: &DashboardConfig) -> Result<()> {
    let (dataset, report) = load_dataset(dataset_path)?;
    let filter = FilterSpec::all(&dataset);
    let view = build_dashboard(&dataset, &filter, config).context("building charts")?;

    let doc = Export {
        source: dataset_path.display().to_string(),
        config,
        cleaning: &report,
        dashboard: &view,
    };
    let file = std::fs::File::create(out)
        .with_context(|| format!("creating {}", out.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &doc)
        .context("writing dashboard JSON")?;
    log::info!("Exported {} charts to {}", view.charts.len(), out.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate()?;

    if let (Some(dataset), Some(out)) = (&cli.dataset, &cli.export) {
        return export(dataset, out, &config);
    }

    let mut state = AppState::new(config);
    if let Some(path) = &cli.dataset {
        // A dataset named on the command line must load; there is no partial mode.
        let (dataset, report) = load_dataset(path)?;
        state.set_dataset(dataset, report);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Hotel Booking Cancellations",
        options,
        Box::new(|_cc| Ok(Box::new(HotelDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
