/// Presentation layer: aggregated tables → renderer-agnostic chart specs.
///
/// ```text
///   FilteredView
///        │  aggregate::by_*
///        ▼
///   Vec<AggregateRow<K>>
///        │  presenter::*_chart
///        ▼
///   ChartSpec { kind, data, dimensions, labels, color_scale }
///        │
///        ▼
///   renderer (egui front-end, or JSON export)
/// ```
pub mod presenter;
pub mod spec;

pub use presenter::{
    ChartError, DashboardView, OverallRate, SeasonLayout, build_dashboard, build_from_indices,
    season_layout,
};
pub use spec::{ChartId, ChartKind, ChartSpec, Dimensions};
