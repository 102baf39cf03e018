//! Hotel booking cancellation dashboard.
//!
//! The library holds everything except the window: loading and cleaning the
//! bookings, filtering, aggregating cancellation statistics, and turning the
//! aggregates into [`chart::ChartSpec`]s. The `hotel-dash` binary renders those
//! specs with egui or exports them as JSON.

pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod state;

pub use config::DashboardConfig;
pub use data::filter::FilterSpec;
pub use data::model::{BookingDataset, BookingRecord};
