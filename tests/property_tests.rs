//! Property-based tests for cleaning, filtering and aggregation.
//!
//! Raw rows are generated well outside the valid ranges so that every
//! cleaning rule gets exercised, then the surviving records are pushed
//! through the filter and the aggregations.
//!
//! ```bash
//! cargo test --test property_tests
//! PROPTEST_CASES=5000 cargo test --test property_tests
//! ```

use std::collections::BTreeSet;

use proptest::prelude::*;

use hotel_dash::data::aggregate::{
    AggregateRow, MonthSeasonKey, by_composition, by_composition_faceted, by_country,
    by_month_season, by_price_bucket, overall_cancellation_rate, overall_tally,
};
use hotel_dash::data::clean::{
    MAX_ADR, MAX_ADULTS, MAX_BABIES, MAX_CHILDREN, MAX_GUESTS, build_dataset, clean_row,
};
use hotel_dash::data::filter::{FilteredView, filtered_indices};
use hotel_dash::data::model::{BookingDataset, RawBooking, RawNumber};
use hotel_dash::data::season::{Month, MonthOrder, Season};
use hotel_dash::FilterSpec;

// =============================================================================
// Strategies
// =============================================================================

fn raw_number(max: f64) -> impl Strategy<Value = RawNumber> {
    prop_oneof![
        8 => (0.0..max).prop_map(|v| RawNumber::Value(v.trunc())),
        1 => Just(RawNumber::Missing),
        1 => (-5.0..0.0f64).prop_map(RawNumber::Value),
        1 => "[a-z]{1,4}".prop_map(RawNumber::Invalid),
    ]
}

fn month() -> impl Strategy<Value = Month> {
    (0usize..12).prop_map(|i| Month::ALL[i])
}

fn raw_booking() -> impl Strategy<Value = RawBooking> {
    (
        prop_oneof![9 => (0u8..2).prop_map(|v| RawNumber::Value(f64::from(v))), 1 => Just(RawNumber::Value(2.0))],
        raw_number(9.0),
        raw_number(7.0),
        raw_number(7.0),
        prop_oneof![9 => (0.0..520.0f64).prop_map(RawNumber::Value), 1 => (-20.0..0.0f64).prop_map(RawNumber::Value)],
        month(),
        prop_oneof![Just(""), Just("PRT"), Just("GBR"), Just("FRA")],
    )
        .prop_map(|(is_canceled, adults, children, babies, adr, month, country)| RawBooking {
            is_canceled,
            adults,
            children,
            babies,
            adr,
            month,
            country: country.to_string(),
        })
}

fn dataset() -> impl Strategy<Value = BookingDataset> {
    prop::collection::vec(raw_booking(), 0..300).prop_map(|rows| build_dataset(&rows).0)
}

/// A filter narrowed from "everything" by a random subset of choices.
fn narrowed(ds: &BookingDataset, seed: u64) -> FilterSpec {
    let mut filter = FilterSpec::all(ds);
    if seed & 1 == 1 {
        filter.season = Some(Season::DISPLAY_ORDER[(seed >> 1) as usize % 4]);
    }
    if seed & 8 == 8 {
        filter.months.retain(|m| (*m as u64 + seed) % 3 != 0);
    }
    if seed & 16 == 16 {
        filter.adults.retain(|a| *a != 2);
    }
    if seed & 32 == 32 {
        let (lo, hi) = filter.price_range;
        filter.set_price_range(lo + (hi - lo) / 4.0, hi - (hi - lo) / 4.0);
    }
    filter
}

// =============================================================================
// Cleaning
// =============================================================================

proptest! {
    #[test]
    fn cleaned_rows_satisfy_bounds(raw in raw_booking()) {
        if let Ok(r) = clean_row(&raw) {
            let guests = r.guests();
            prop_assert!((1..=MAX_GUESTS).contains(&guests));
            prop_assert!(r.adults <= MAX_ADULTS);
            prop_assert!(r.children <= MAX_CHILDREN);
            prop_assert!(r.babies <= MAX_BABIES);
            prop_assert!((0.0..=MAX_ADR).contains(&r.adr));
            prop_assert_eq!(r.season, r.month.season());
        }
    }

    #[test]
    fn report_accounts_for_every_row(rows in prop::collection::vec(raw_booking(), 0..200)) {
        let (ds, report) = build_dataset(&rows);
        prop_assert_eq!(report.rows_read, rows.len());
        prop_assert_eq!(report.rows_kept, ds.len());
        prop_assert_eq!(report.rows_kept + report.rows_dropped(), rows.len());
    }
}

// =============================================================================
// Filtering
// =============================================================================

proptest! {
    #[test]
    fn default_filter_keeps_every_row(ds in dataset()) {
        let indices = filtered_indices(&ds, &FilterSpec::all(&ds));
        prop_assert_eq!(indices.len(), ds.len());
    }

    #[test]
    fn filter_is_a_subset_and_deterministic(ds in dataset(), seed in any::<u64>()) {
        let filter = narrowed(&ds, seed);
        let first = filtered_indices(&ds, &filter);
        let second = filtered_indices(&ds, &filter);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.windows(2).all(|w| w[0] < w[1]));
        for &i in &first {
            prop_assert!(i < ds.len());
            prop_assert!(filter.matches(&ds.records[i]));
        }
        let kept: BTreeSet<usize> = first.iter().copied().collect();
        for (i, r) in ds.records.iter().enumerate() {
            if !kept.contains(&i) {
                prop_assert!(!filter.matches(r));
            }
        }
    }

    #[test]
    fn empty_month_selection_selects_nothing(ds in dataset()) {
        let mut filter = FilterSpec::all(&ds);
        filter.months.clear();
        prop_assert!(filtered_indices(&ds, &filter).is_empty());
    }
}

// =============================================================================
// Aggregation
// =============================================================================

proptest! {
    #[test]
    fn aggregate_rows_are_well_formed(ds in dataset(), seed in any::<u64>(), min in 0u64..15) {
        let indices = filtered_indices(&ds, &narrowed(&ds, seed));
        let view = FilteredView::new(&ds, &indices);

        macro_rules! check_rows {
            ($rows:expr, $min:expr) => {
                for row in &$rows {
                    prop_assert!(row.total_bookings >= $min.max(1));
                    prop_assert!(row.total_cancellations <= row.total_bookings);
                    prop_assert!((0.0..=1.0).contains(&row.cancellation_rate));
                    let expected = row.total_cancellations as f64 / row.total_bookings as f64;
                    prop_assert!((row.cancellation_rate - expected).abs() < 1e-12);
                }
            };
        }

        let countries = by_country(view, min);
        check_rows!(countries, min);
        prop_assert!(countries.iter().all(|r| !r.key.country.is_empty()));

        check_rows!(by_month_season(view, MonthOrder::Calendar), 1u64);
        check_rows!(by_price_bucket(view, 30), 1u64);
        check_rows!(by_composition(view, min), min);
        check_rows!(by_composition_faceted(view), 1u64);
    }

    #[test]
    fn overall_rate_matches_selection(ds in dataset(), seed in any::<u64>()) {
        let indices = filtered_indices(&ds, &narrowed(&ds, seed));
        let view = FilteredView::new(&ds, &indices);
        let tally = overall_tally(view);
        let rate = overall_cancellation_rate(view);

        prop_assert_eq!(tally.bookings as usize, indices.len());
        prop_assert!((0.0..=1.0).contains(&rate));
        if indices.is_empty() {
            prop_assert_eq!(rate, 0.0);
        }
    }

    #[test]
    fn month_season_totals_cover_selection(ds in dataset(), seed in any::<u64>()) {
        let indices = filtered_indices(&ds, &narrowed(&ds, seed));
        let view = FilteredView::new(&ds, &indices);
        let rows = by_month_season(view, MonthOrder::Legacy);

        let total: u64 = rows.iter().map(|r| r.total_bookings).sum();
        prop_assert_eq!(total as usize, indices.len());
        let sort_key = |r: &AggregateRow<MonthSeasonKey>| {
            (r.key.season.rank(), MonthOrder::Legacy.rank(r.key.month))
        };
        let ordered = rows.windows(2).all(|w| sort_key(&w[0]) < sort_key(&w[1]));
        prop_assert!(ordered, "month/season rows out of order");
    }

    #[test]
    fn price_buckets_are_ordered_and_contain_their_rows(
        ds in dataset(),
        width in 1u32..80,
    ) {
        let indices = filtered_indices(&ds, &FilterSpec::all(&ds));
        let view = FilteredView::new(&ds, &indices);
        let rows = by_price_bucket(view, width);

        let ascending = rows.windows(2).all(|w| w[0].key.lower < w[1].key.lower);
        prop_assert!(ascending, "price buckets out of order");
        for row in &rows {
            prop_assert_eq!(row.key.upper - row.key.lower, width);
            prop_assert_eq!(row.key.lower % width, 0);
        }
        let total: u64 = rows.iter().map(|r| r.total_bookings).sum();
        prop_assert_eq!(total as usize, ds.len());
    }
}
