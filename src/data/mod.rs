/// Data layer: loading, cleaning, categorizing, filtering, aggregating.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawBooking>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  fill / drop / coerce → BookingDataset (immutable)
///   └──────────┘     season derived via `season`
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  group → counts → cancellation rate
///   └───────────┘
/// ```

pub mod aggregate;
pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;
pub mod season;
