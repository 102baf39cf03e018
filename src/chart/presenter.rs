use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::spec::{ChartId, ChartKind, ChartSpec, Dimensions};
use crate::color::ColorScale;
use crate::config::DashboardConfig;
use crate::data::aggregate::{
    self, AggregateRow, Composition, CountryKey, MonthSeasonKey, PriceBucket, Tally,
};
use crate::data::filter::{FilterSpec, FilteredView, filtered_indices};
use crate::data::model::BookingDataset;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("serializing chart data: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Season chart layout
// ---------------------------------------------------------------------------

/// Representation chosen for the season/month chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonLayout {
    /// Sunburst: seasons on the inner ring, months on the outer.
    Hierarchical,
    /// Histogram over months.
    Flat,
}

/// A hierarchy needs at least two levels and at least one node on every
/// level. `level_sizes` holds the number of distinct nodes per level.
pub fn hierarchy_available(level_sizes: &[usize]) -> bool {
    level_sizes.len() >= 2 && level_sizes.iter().all(|&n| n > 0)
}

/// Decide whether the month/season rows can be drawn as a hierarchy.
pub fn season_layout(rows: &[AggregateRow<MonthSeasonKey>]) -> SeasonLayout {
    let seasons: BTreeSet<_> = rows.iter().map(|r| r.key.season).collect();
    let months: BTreeSet<_> = rows.iter().map(|r| r.key.month).collect();
    if hierarchy_available(&[seasons.len(), months.len()]) {
        SeasonLayout::Hierarchical
    } else {
        SeasonLayout::Flat
    }
}

// ---------------------------------------------------------------------------
// Overall rate
// ---------------------------------------------------------------------------

/// Cancellation rate over the whole filtered selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallRate {
    pub total_bookings: u64,
    pub total_cancellations: u64,
    /// Fraction in `[0, 1]`; 0 for an empty selection.
    pub rate: f64,
    pub percent: f64,
    /// Progress indicator value, clamped to `0..=100`.
    pub progress: u8,
}

impl OverallRate {
    pub fn from_tally(tally: Tally) -> Self {
        let rate = tally.rate().unwrap_or(0.0);
        let percent = rate * 100.0;
        OverallRate {
            total_bookings: tally.bookings,
            total_cancellations: tally.cancellations,
            rate,
            percent,
            progress: percent.clamp(0.0, 100.0) as u8,
        }
    }

    pub fn headline(&self) -> String {
        format!("Overall Cancellation Rate: {:.2}%", self.percent)
    }
}

// ---------------------------------------------------------------------------
// Chart builders
// ---------------------------------------------------------------------------

fn to_data<T: Serialize>(rows: &[T]) -> Result<Vec<Value>, ChartError> {
    rows.iter()
        .map(|r| serde_json::to_value(r).map_err(ChartError::from))
        .collect()
}

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn field(name: &str) -> Option<String> {
    Some(name.to_string())
}

const RATE: &str = "cancellation_rate";

pub fn country_chart(rows: &[AggregateRow<CountryKey>]) -> Result<ChartSpec, ChartError> {
    Ok(ChartSpec {
        id: ChartId::Country,
        kind: ChartKind::Choropleth,
        title: "Cancellation by Country".into(),
        data: to_data(rows)?,
        dimensions: Dimensions {
            x: field("country"),
            color: field(RATE),
            ..Default::default()
        },
        labels: labels(&[
            ("country", "Country"),
            ("total_bookings", "Total Bookings"),
            ("total_cancellations", "Total Cancellations"),
            (RATE, "Cancellation Rate"),
        ]),
        color_scale: ColorScale::Blues,
    })
}

/// Season/month chart in the given layout. Both layouts carry the same rows.
pub fn season_chart(
    rows: &[AggregateRow<MonthSeasonKey>],
    layout: SeasonLayout,
) -> Result<ChartSpec, ChartError> {
    let (kind, dimensions, color_scale) = match layout {
        SeasonLayout::Hierarchical => (
            ChartKind::Sunburst,
            Dimensions {
                color: field(RATE),
                path: vec!["season".into(), "month".into()],
                ..Default::default()
            },
            ColorScale::Blues,
        ),
        SeasonLayout::Flat => (
            ChartKind::Histogram,
            Dimensions {
                x: field("month"),
                y: field(RATE),
                color: field(RATE),
                ..Default::default()
            },
            ColorScale::BluesReversed,
        ),
    };
    Ok(ChartSpec {
        id: ChartId::SeasonMonth,
        kind,
        title: "Hotel Bookings by Month and Season".into(),
        data: to_data(rows)?,
        dimensions,
        labels: labels(&[("month", "Month"), ("season", "Season"), (RATE, "Cancellation Rate")]),
        color_scale,
    })
}

pub fn price_chart(rows: &[AggregateRow<PriceBucket>]) -> Result<ChartSpec, ChartError> {
    Ok(ChartSpec {
        id: ChartId::Price,
        kind: ChartKind::Bar,
        title: "Average Cancellation Rate by ADR".into(),
        data: to_data(rows)?,
        dimensions: Dimensions {
            x: field("label"),
            y: field(RATE),
            color: field(RATE),
            ..Default::default()
        },
        labels: labels(&[("label", "Average Daily Rate"), (RATE, "Average Cancellation Rate")]),
        color_scale: ColorScale::Blues,
    })
}

pub fn composition_chart(rows: &[AggregateRow<Composition>]) -> Result<ChartSpec, ChartError> {
    Ok(ChartSpec {
        id: ChartId::Composition,
        kind: ChartKind::Scatter3d,
        title: "Cancellation by Composition".into(),
        data: to_data(rows)?,
        dimensions: Dimensions {
            x: field("adults"),
            y: field("children"),
            z: field("babies"),
            color: field(RATE),
            ..Default::default()
        },
        labels: labels(&[
            ("adults", "Adults"),
            ("children", "Children"),
            ("babies", "Babies"),
            ("total_bookings", "Total Bookings"),
            (RATE, "Cancellation Rate"),
        ]),
        color_scale: ColorScale::Blues,
    })
}

pub fn composition_heatmap(rows: &[AggregateRow<Composition>]) -> Result<ChartSpec, ChartError> {
    Ok(ChartSpec {
        id: ChartId::CompositionHeatmap,
        kind: ChartKind::Heatmap,
        title: "Cancellation Rate by Party Composition".into(),
        data: to_data(rows)?,
        dimensions: Dimensions {
            x: field("adults"),
            y: field("children"),
            z: field(RATE),
            color: field(RATE),
            facet: field("babies"),
            ..Default::default()
        },
        labels: labels(&[
            ("adults", "Number of Adults"),
            ("children", "Number of Children"),
            ("babies", "Babies"),
            ("total_bookings", "Total Bookings"),
            (RATE, "Average Cancellation Rate"),
        ]),
        color_scale: ColorScale::Blues,
    })
}

// ---------------------------------------------------------------------------
// Whole-dashboard recomputation
// ---------------------------------------------------------------------------

/// Everything the renderer needs for one filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub filter: FilterSpec,
    pub rows_selected: usize,
    pub overall: OverallRate,
    pub season_layout: SeasonLayout,
    pub charts: Vec<ChartSpec>,
}

impl DashboardView {
    pub fn chart(&self, id: ChartId) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.id == id)
    }
}

/// Filter the dataset and build every chart from the filtered rows.
pub fn build_dashboard(
    dataset: &BookingDataset,
    filter: &FilterSpec,
    config: &DashboardConfig,
) -> Result<DashboardView, ChartError> {
    let indices = filtered_indices(dataset, filter);
    build_from_indices(dataset, &indices, filter, config)
}

/// Build every chart from an already filtered selection.
pub fn build_from_indices(
    dataset: &BookingDataset,
    indices: &[usize],
    filter: &FilterSpec,
    config: &DashboardConfig,
) -> Result<DashboardView, ChartError> {
    let view = FilteredView::new(dataset, indices);

    let month_season = aggregate::by_month_season(view, config.month_order);
    let layout = season_layout(&month_season);
    if layout == SeasonLayout::Flat {
        log::debug!("Season chart: no hierarchy in {} rows, using flat layout", month_season.len());
    }

    let charts = vec![
        country_chart(&aggregate::by_country(view, config.min_group_bookings))?,
        composition_heatmap(&aggregate::by_composition_faceted(view))?,
        season_chart(&month_season, layout)?,
        price_chart(&aggregate::by_price_bucket(view, config.bucket_width))?,
        composition_chart(&aggregate::by_composition(view, config.min_group_bookings))?,
    ];
    let overall = OverallRate::from_tally(aggregate::overall_tally(view));

    log::debug!(
        "Dashboard rebuilt: {} of {} rows selected, overall rate {:.4}",
        view.len(),
        dataset.len(),
        overall.rate
    );

    Ok(DashboardView {
        filter: filter.clone(),
        rows_selected: view.len(),
        overall,
        season_layout: layout,
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::season::Month;

    fn month_row(month: Month) -> AggregateRow<MonthSeasonKey> {
        AggregateRow {
            key: MonthSeasonKey {
                month,
                season: month.season(),
            },
            total_bookings: 4,
            total_cancellations: 1,
            cancellation_rate: 0.25,
        }
    }

    #[test]
    fn layout_needs_both_levels() {
        assert_eq!(season_layout(&[]), SeasonLayout::Flat);
        assert_eq!(season_layout(&[month_row(Month::July)]), SeasonLayout::Hierarchical);
        assert!(!hierarchy_available(&[1]));
        assert!(!hierarchy_available(&[4, 0]));
        assert!(hierarchy_available(&[1, 3]));
    }

    #[test]
    fn flat_layout_keeps_rows() {
        let rows = [month_row(Month::July), month_row(Month::August)];
        let spec = season_chart(&rows, SeasonLayout::Flat).unwrap();
        assert_eq!(spec.kind, ChartKind::Histogram);
        assert_eq!(spec.data.len(), 2);
        assert_eq!(spec.data[0]["month"], "July");
        assert_eq!(spec.data[0]["season"], "Summer");

        let spec = season_chart(&rows, SeasonLayout::Hierarchical).unwrap();
        assert_eq!(spec.kind, ChartKind::Sunburst);
        assert_eq!(spec.dimensions.path, vec!["season", "month"]);
    }

    #[test]
    fn overall_rate_progress_is_clamped() {
        let empty = OverallRate::from_tally(Tally::default());
        assert_eq!(empty.rate, 0.0);
        assert_eq!(empty.progress, 0);
        assert_eq!(empty.headline(), "Overall Cancellation Rate: 0.00%");

        let all = OverallRate::from_tally(Tally {
            bookings: 3,
            cancellations: 3,
        });
        assert_eq!(all.progress, 100);

        let some = OverallRate::from_tally(Tally {
            bookings: 3,
            cancellations: 1,
        });
        assert_eq!(some.progress, 33);
        assert_eq!(some.headline(), "Overall Cancellation Rate: 33.33%");
    }
}
