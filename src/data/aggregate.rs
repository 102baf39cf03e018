//! Cancellation statistics over a filtered view.
//!
//! Every shape groups the view by a key, counts bookings and cancellations per
//! group, and derives `cancellation_rate = cancellations / bookings`. Groups
//! with zero bookings are dropped before the rate is computed, so every
//! [`AggregateRow`] has `total_bookings > 0`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::filter::FilteredView;
use super::model::BookingRecord;
use super::season::{Month, MonthOrder, Season};

// ---------------------------------------------------------------------------
// Rows and keys
// ---------------------------------------------------------------------------

/// One group of an aggregation. The key's fields are flattened into the row
/// when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<K> {
    #[serde(flatten)]
    pub key: K,
    pub total_bookings: u64,
    pub total_cancellations: u64,
    pub cancellation_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CountryKey {
    pub country: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthSeasonKey {
    pub month: Month,
    pub season: Season,
}

/// Party composition of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Composition {
    pub adults: u8,
    pub children: u8,
    pub babies: u8,
}

/// Right-closed ADR interval `(lower, upper]`. The first bucket also takes
/// ADR 0 so that every booking lands in exactly one bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PriceBucket {
    pub lower: u32,
    pub upper: u32,
    pub label: String,
}

impl PriceBucket {
    pub fn new(lower: u32, width: u32) -> Self {
        let upper = lower.saturating_add(width);
        PriceBucket {
            lower,
            upper,
            label: format!("({lower}, {upper}]"),
        }
    }

    /// Bucket containing `adr`, after truncating it to an integer.
    pub fn containing(adr: f64, width: u32) -> Self {
        let width = width.max(1);
        let value = adr.max(0.0).trunc() as u32;
        let lower = value.saturating_sub(1) / width * width;
        Self::new(lower, width)
    }
}

impl fmt::Display for PriceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// ---------------------------------------------------------------------------
// Tallying
// ---------------------------------------------------------------------------

/// Running booking / cancellation counts for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub bookings: u64,
    pub cancellations: u64,
}

impl Tally {
    pub fn add(&mut self, r: &BookingRecord) {
        self.bookings += 1;
        self.cancellations += u64::from(r.is_canceled);
    }

    /// `None` for an empty group; never divides by zero.
    pub fn rate(&self) -> Option<f64> {
        (self.bookings > 0).then(|| self.cancellations as f64 / self.bookings as f64)
    }
}

fn tally_by<K, F>(view: FilteredView<'_>, mut groups: BTreeMap<K, Tally>, key: F) -> BTreeMap<K, Tally>
where
    K: Ord,
    F: Fn(&BookingRecord) -> Option<K>,
{
    for r in view.iter() {
        if let Some(k) = key(r) {
            groups.entry(k).or_default().add(r);
        }
    }
    groups
}

/// Drop groups below `min_bookings` (and always empty ones), then derive rates.
fn finish<K>(groups: BTreeMap<K, Tally>, min_bookings: u64) -> Vec<AggregateRow<K>> {
    groups
        .into_iter()
        .filter(|(_, t)| t.bookings >= min_bookings.max(1))
        .filter_map(|(key, t)| {
            let rate = t.rate()?;
            Some(AggregateRow {
                key,
                total_bookings: t.bookings,
                total_cancellations: t.cancellations,
                cancellation_rate: rate,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// The five shapes
// ---------------------------------------------------------------------------

/// Per-country statistics. Countries with fewer than `min_bookings` bookings
/// are suppressed; bookings without a country code are not grouped.
pub fn by_country(view: FilteredView<'_>, min_bookings: u64) -> Vec<AggregateRow<CountryKey>> {
    let groups = tally_by(view, BTreeMap::new(), |r| {
        (!r.country.is_empty()).then(|| CountryKey {
            country: r.country.clone(),
        })
    });
    finish(groups, min_bookings)
}

/// Per `(month, season)` statistics, ordered by season display order and then
/// by `order`.
pub fn by_month_season(view: FilteredView<'_>, order: MonthOrder) -> Vec<AggregateRow<MonthSeasonKey>> {
    let groups = tally_by(view, BTreeMap::new(), |r| {
        Some(MonthSeasonKey {
            month: r.month,
            season: r.season,
        })
    });
    let mut rows = finish(groups, 1);
    rows.sort_by_key(|row| (row.key.season.rank(), order.rank(row.key.month)));
    rows
}

/// Statistics per ADR bucket of `width`, ascending by lower bound. Only
/// buckets holding at least one booking are returned.
pub fn by_price_bucket(view: FilteredView<'_>, width: u32) -> Vec<AggregateRow<PriceBucket>> {
    let width = width.max(1);
    let groups = tally_by(view, BTreeMap::new(), |r| {
        Some(PriceBucket::containing(r.adr, width))
    });
    let mut rows = finish(groups, 1);
    rows.sort_by_key(|row| row.key.lower);
    rows
}

/// Statistics per `(adults, children, babies)`; compositions with fewer than
/// `min_bookings` bookings are suppressed.
pub fn by_composition(view: FilteredView<'_>, min_bookings: u64) -> Vec<AggregateRow<Composition>> {
    let groups = tally_by(view, BTreeMap::new(), |r| Some(composition(r)));
    finish(groups, min_bookings)
}

/// Statistics per `(adults, children)` faceted by `babies`: ordered by babies
/// first, with no minimum group size.
pub fn by_composition_faceted(view: FilteredView<'_>) -> Vec<AggregateRow<Composition>> {
    let groups = tally_by(view, BTreeMap::new(), |r| Some(composition(r)));
    let mut rows = finish(groups, 1);
    rows.sort_by_key(|row| (row.key.babies, row.key.adults, row.key.children));
    rows
}

/// Booking and cancellation counts over the whole view.
pub fn overall_tally(view: FilteredView<'_>) -> Tally {
    let mut total = Tally::default();
    for r in view.iter() {
        total.add(r);
    }
    total
}

/// `sum(is_canceled) / count` over the whole view; 0 when the view is empty.
pub fn overall_cancellation_rate(view: FilteredView<'_>) -> f64 {
    overall_tally(view).rate().unwrap_or(0.0)
}

fn composition(r: &BookingRecord) -> Composition {
    Composition {
        adults: r.adults,
        children: r.children,
        babies: r.babies,
    }
}
