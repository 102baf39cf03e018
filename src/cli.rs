//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use hotel_dash::DashboardConfig;
use hotel_dash::config::{DEFAULT_BUCKET_WIDTH, DEFAULT_MIN_GROUP_BOOKINGS};
use hotel_dash::data::season::MonthOrder;

/// Interactive dashboard of hotel booking cancellations
#[derive(Parser, Debug)]
#[command(name = "hotel-dash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Booking dataset to open (.csv, .json or .parquet)
    #[arg(value_name = "DATASET")]
    pub dataset: Option<PathBuf>,

    /// Month ordering inside the season chart: calendar or legacy
    #[arg(long, default_value = "calendar")]
    pub month_order: MonthOrder,

    /// Minimum bookings for a country or composition group to be shown
    #[arg(long, default_value_t = DEFAULT_MIN_GROUP_BOOKINGS)]
    pub min_group_bookings: u64,

    /// Width of the ADR buckets in the price chart
    #[arg(long, default_value_t = DEFAULT_BUCKET_WIDTH)]
    pub bucket_width: u32,

    /// Write the unfiltered dashboard as JSON to this path and exit
    #[arg(long, value_name = "OUT", requires = "dataset")]
    pub export: Option<PathBuf>,
}

impl Cli {
    pub fn config(&self) -> DashboardConfig {
        DashboardConfig {
            month_order: self.month_order,
            min_group_bookings: self.min_group_bookings,
            bucket_width: self.bucket_width,
        }
    }
}
