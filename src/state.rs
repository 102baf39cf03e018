use std::sync::Arc;

use crate::chart::{DashboardView, build_from_indices};
use crate::config::DashboardConfig;
use crate::data::clean::CleaningReport;
use crate::data::filter::{FilterSpec, GuestDim, filtered_indices};
use crate::data::model::BookingDataset;
use crate::data::season::{Month, Season};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Cleaned dataset (None until a file is loaded). Shared, never mutated.
    pub dataset: Option<Arc<BookingDataset>>,

    /// Outcome of cleaning the loaded file.
    pub report: Option<CleaningReport>,

    pub config: DashboardConfig,

    /// Current filter selections.
    pub filter: FilterSpec,

    /// Indices of bookings passing the current filter (cached).
    pub visible_indices: Vec<usize>,

    /// Charts for the current filter.
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Ingest a newly loaded dataset, select everything and build the charts.
    pub fn set_dataset(&mut self, dataset: BookingDataset, report: CleaningReport) {
        self.filter = FilterSpec::all(&dataset);
        self.dataset = Some(Arc::new(dataset));
        self.report = Some(report);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the charts after a filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.filter);
        match build_from_indices(ds, &self.visible_indices, &self.filter, &self.config) {
            Ok(view) => self.view = Some(view),
            Err(e) => {
                log::error!("Failed to build charts: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.view = None;
            }
        }
    }

    pub fn set_season(&mut self, season: Option<Season>) {
        self.filter.season = season;
        self.refilter();
    }

    pub fn toggle_month(&mut self, month: Month) {
        self.filter.toggle_month(month);
        self.refilter();
    }

    /// Select every month.
    pub fn select_all_months(&mut self) {
        self.filter.months = Month::ALL.into_iter().collect();
        self.refilter();
    }

    pub fn select_no_months(&mut self) {
        self.filter.months.clear();
        self.refilter();
    }

    /// Toggle a single guest-count value.
    pub fn toggle_guests(&mut self, dim: GuestDim, value: u8) {
        self.filter.toggle_guests(dim, value);
        self.refilter();
    }

    /// Select all observed values of a guest dimension.
    pub fn select_all(&mut self, dim: GuestDim) {
        if let Some(ds) = &self.dataset {
            let ds = Arc::clone(ds);
            self.filter.select_all(dim, &ds);
            self.refilter();
        }
    }

    /// Deselect all values of a guest dimension.
    pub fn select_none(&mut self, dim: GuestDim) {
        self.filter.select_none(dim);
        self.refilter();
    }

    pub fn set_price_range(&mut self, min: f64, max: f64) {
        self.filter.set_price_range(min, max);
        self.refilter();
    }

    /// Back to "everything selected".
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filter = FilterSpec::all(ds);
            self.refilter();
        }
    }
}
