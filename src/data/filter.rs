use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{BookingDataset, BookingRecord};
use super::season::{Month, Season};

// ---------------------------------------------------------------------------
// FilterSpec: the user's current selection
// ---------------------------------------------------------------------------

/// Guest-count dimension of the filter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestDim {
    Adults,
    Children,
    Babies,
}

impl GuestDim {
    pub const ALL: [GuestDim; 3] = [GuestDim::Adults, GuestDim::Children, GuestDim::Babies];

    pub fn label(self) -> &'static str {
        match self {
            GuestDim::Adults => "Adults",
            GuestDim::Children => "Children",
            GuestDim::Babies => "Babies",
        }
    }
}

/// Every constraint applied before aggregation.
///
/// Dimensions are combined with AND; within a set dimension a row matches
/// when its value is a member. An empty set matches nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// `None` means "All".
    pub season: Option<Season>,
    pub months: BTreeSet<Month>,
    pub adults: BTreeSet<u8>,
    pub children: BTreeSet<u8>,
    pub babies: BTreeSet<u8>,
    /// Inclusive `(min, max)` ADR bounds.
    pub price_range: (f64, f64),
}

/// Selects nothing; replaced by [`FilterSpec::all`] once a dataset is loaded.
impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec {
            season: None,
            months: BTreeSet::new(),
            adults: BTreeSet::new(),
            children: BTreeSet::new(),
            babies: BTreeSet::new(),
            price_range: (0.0, 0.0),
        }
    }
}

impl FilterSpec {
    /// Select everything observed in the dataset.
    pub fn all(dataset: &BookingDataset) -> Self {
        FilterSpec {
            season: None,
            months: Month::ALL.into_iter().collect(),
            adults: dataset.adults.clone(),
            children: dataset.children.clone(),
            babies: dataset.babies.clone(),
            price_range: dataset.price_bounds(),
        }
    }

    /// Whether a single record satisfies every predicate.
    pub fn matches(&self, r: &BookingRecord) -> bool {
        self.season.is_none_or(|s| r.season == s)
            && self.months.contains(&r.month)
            && self.adults.contains(&r.adults)
            && self.children.contains(&r.children)
            && self.babies.contains(&r.babies)
            && self.price_range.0 <= r.adr
            && r.adr <= self.price_range.1
    }

    pub fn guests(&self, dim: GuestDim) -> &BTreeSet<u8> {
        match dim {
            GuestDim::Adults => &self.adults,
            GuestDim::Children => &self.children,
            GuestDim::Babies => &self.babies,
        }
    }

    pub fn guests_mut(&mut self, dim: GuestDim) -> &mut BTreeSet<u8> {
        match dim {
            GuestDim::Adults => &mut self.adults,
            GuestDim::Children => &mut self.children,
            GuestDim::Babies => &mut self.babies,
        }
    }

    /// Toggle a single guest-count value.
    pub fn toggle_guests(&mut self, dim: GuestDim, value: u8) {
        let selected = self.guests_mut(dim);
        if !selected.remove(&value) {
            selected.insert(value);
        }
    }

    pub fn toggle_month(&mut self, month: Month) {
        if !self.months.remove(&month) {
            self.months.insert(month);
        }
    }

    /// Select every observed value of a guest dimension.
    pub fn select_all(&mut self, dim: GuestDim, dataset: &BookingDataset) {
        *self.guests_mut(dim) = domain(dataset, dim).clone();
    }

    /// Deselect every value of a guest dimension.
    pub fn select_none(&mut self, dim: GuestDim) {
        self.guests_mut(dim).clear();
    }

    /// Set the price bounds, swapping them if given in reverse.
    pub fn set_price_range(&mut self, min: f64, max: f64) {
        self.price_range = if min <= max { (min, max) } else { (max, min) };
    }
}

/// Observed values of a guest dimension.
pub fn domain(dataset: &BookingDataset, dim: GuestDim) -> &BTreeSet<u8> {
    match dim {
        GuestDim::Adults => &dataset.adults,
        GuestDim::Children => &dataset.children,
        GuestDim::Babies => &dataset.babies,
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of records that pass every predicate of `spec`.
pub fn filtered_indices(dataset: &BookingDataset, spec: &FilterSpec) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| spec.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// The records of a dataset selected by a filter, in source order.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    dataset: &'a BookingDataset,
    indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a BookingDataset, indices: &'a [usize]) -> Self {
        FilteredView { dataset, indices }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a BookingRecord> + 'a {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(month: Month, adults: u8, children: u8, adr: f64) -> BookingRecord {
        BookingRecord {
            is_canceled: false,
            month,
            season: month.season(),
            adults,
            children,
            babies: 0,
            adr,
            country: "PRT".into(),
        }
    }

    fn dataset() -> BookingDataset {
        BookingDataset::from_records(vec![
            rec(Month::July, 2, 0, 100.0),
            rec(Month::January, 1, 1, 45.5),
            rec(Month::October, 2, 2, 210.0),
            rec(Month::July, 3, 0, 80.0),
        ])
    }

    #[test]
    fn select_all_keeps_every_row() {
        let ds = dataset();
        let spec = FilterSpec::all(&ds);
        assert_eq!(filtered_indices(&ds, &spec), vec![0, 1, 2, 3]);
    }

    #[test]
    fn season_filter() {
        let ds = dataset();
        let mut spec = FilterSpec::all(&ds);
        spec.season = Some(Season::Summer);
        assert_eq!(filtered_indices(&ds, &spec), vec![0, 3]);
        spec.season = Some(Season::Spring);
        assert!(filtered_indices(&ds, &spec).is_empty());
    }

    #[test]
    fn dimensions_are_conjunctive() {
        let ds = dataset();
        let mut spec = FilterSpec::all(&ds);
        spec.toggle_guests(GuestDim::Adults, 3);
        spec.set_price_range(90.0, 50.0);
        assert_eq!(spec.price_range, (50.0, 90.0));
        assert!(filtered_indices(&ds, &spec).is_empty());

        spec.set_price_range(0.0, 150.0);
        assert_eq!(filtered_indices(&ds, &spec), vec![0, 1]);

        spec.toggle_month(Month::July);
        assert_eq!(filtered_indices(&ds, &spec), vec![1]);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let ds = dataset();
        let mut spec = FilterSpec::all(&ds);
        spec.set_price_range(45.5, 100.0);
        assert_eq!(filtered_indices(&ds, &spec), vec![0, 1, 3]);
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let ds = dataset();
        let mut spec = FilterSpec::all(&ds);
        spec.select_none(GuestDim::Children);
        assert!(filtered_indices(&ds, &spec).is_empty());
        spec.select_all(GuestDim::Children, &ds);
        assert_eq!(filtered_indices(&ds, &spec).len(), 4);
    }

    #[test]
    fn view_iterates_selected_records() {
        let ds = dataset();
        let idx = vec![1, 2];
        let view = FilteredView::new(&ds, &idx);
        assert_eq!(view.len(), 2);
        let months: Vec<Month> = view.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![Month::January, Month::October]);
    }
}
