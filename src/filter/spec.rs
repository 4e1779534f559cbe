//! Filter Specification
//! The user-chosen constraints defining which records are currently in view.

use crate::data::LoadedDataset;
use std::collections::BTreeSet;

/// Tri-state constraint for a boolean column: match everything, only true
/// rows, or only false rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Any,
    Yes,
    No,
}

impl TriState {
    /// The boolean a row must equal, or `None` when unconstrained.
    pub fn required_value(self) -> Option<bool> {
        match self {
            TriState::Any => None,
            TriState::Yes => Some(true),
            TriState::No => Some(false),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TriState::Any => "All",
            TriState::Yes => "Yes",
            TriState::No => "No",
        }
    }
}

/// One filtering request. Range bounds are closed intervals; bounds outside
/// the dataset's observed range are legal and simply widen (or empty) the
/// match. An empty `shelve_locs` set matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub sales_range: (f64, f64),
    pub price_range: (f64, f64),
    pub shelve_locs: BTreeSet<String>,
    pub urban: TriState,
    pub us: TriState,
}

impl FilterSpec {
    /// The spec that keeps every record: full observed ranges, all shelf
    /// labels, both tri-states unconstrained.
    pub fn unrestricted(dataset: &LoadedDataset) -> Self {
        Self {
            sales_range: dataset.sales_bounds,
            price_range: dataset.price_bounds,
            shelve_locs: dataset.shelve_labels.iter().cloned().collect(),
            urban: TriState::Any,
            us: TriState::Any,
        }
    }
}
