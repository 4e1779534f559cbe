//! Filter Engine
//! Applies a FilterSpec to the normalized dataset as one AND-composed lazy
//! predicate. Filtering is stable: the view keeps the dataset's row order.

use crate::filter::FilterSpec;
use polars::prelude::*;

/// Select the records satisfying every constraint of `spec`.
///
/// Total over a normalized frame: any spec yields a (possibly empty) view,
/// never an error. The shelf-label predicate is an OR-fold of equalities, so
/// the empty label set folds to `false` and produces an empty view.
pub fn apply(df: &DataFrame, spec: &FilterSpec) -> PolarsResult<DataFrame> {
    let (sales_min, sales_max) = spec.sales_range;
    let (price_min, price_max) = spec.price_range;

    let shelve_predicate = spec
        .shelve_locs
        .iter()
        .fold(lit(false), |acc, label| {
            acc.or(col("ShelveLoc").eq(lit(label.as_str())))
        });

    let mut predicate = col("Sales")
        .gt_eq(lit(sales_min))
        .and(col("Sales").lt_eq(lit(sales_max)))
        .and(col("Price").gt_eq(lit(price_min)))
        .and(col("Price").lt_eq(lit(price_max)))
        .and(shelve_predicate);

    if let Some(required) = spec.urban.required_value() {
        predicate = predicate.and(col("Urban").eq(lit(required)));
    }
    if let Some(required) = spec.us.required_value() {
        predicate = predicate.and(col("US").eq(lit(required)));
    }

    df.clone().lazy().filter(predicate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TriState;
    use polars::df;
    use std::collections::BTreeSet;

    fn sample_frame() -> DataFrame {
        df!(
            "Sales" => [5.0, 9.0, 7.0, 12.0, 3.0],
            "Price" => [100.0, 120.0, 90.0, 150.0, 80.0],
            "ShelveLoc" => ["Good", "Bad", "Good", "Medium", "Bad"],
            "Urban" => [true, false, true, false, true],
            "US" => [true, true, false, false, true],
        )
        .unwrap()
    }

    fn labels(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn wide_open() -> FilterSpec {
        FilterSpec {
            sales_range: (0.0, 20.0),
            price_range: (0.0, 200.0),
            shelve_locs: labels(&["Bad", "Good", "Medium"]),
            urban: TriState::Any,
            us: TriState::Any,
        }
    }

    fn sales_column(view: &DataFrame) -> Vec<f64> {
        view.column("Sales")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn combined_ranges_and_labels_keep_order() {
        let spec = FilterSpec {
            sales_range: (5.0, 12.0),
            price_range: (80.0, 150.0),
            shelve_locs: labels(&["Good", "Medium"]),
            urban: TriState::Any,
            us: TriState::Any,
        };
        let view = apply(&sample_frame(), &spec).unwrap();
        assert_eq!(sales_column(&view), vec![5.0, 7.0, 12.0]);
    }

    #[test]
    fn wide_open_spec_keeps_everything() {
        let view = apply(&sample_frame(), &wide_open()).unwrap();
        assert_eq!(view.height(), 5);
        assert_eq!(sales_column(&view), vec![5.0, 9.0, 7.0, 12.0, 3.0]);
    }

    #[test]
    fn empty_label_set_yields_empty_view() {
        let spec = FilterSpec {
            shelve_locs: BTreeSet::new(),
            ..wide_open()
        };
        let view = apply(&sample_frame(), &spec).unwrap();
        assert_eq!(view.height(), 0);
    }

    #[test]
    fn impossible_range_yields_empty_view() {
        let spec = FilterSpec {
            sales_range: (100.0, 200.0),
            ..wide_open()
        };
        let view = apply(&sample_frame(), &spec).unwrap();
        assert_eq!(view.height(), 0);
    }

    #[test]
    fn out_of_dataset_bounds_only_widen() {
        let spec = FilterSpec {
            sales_range: (-1000.0, 1000.0),
            price_range: (-1000.0, 1000.0),
            ..wide_open()
        };
        let view = apply(&sample_frame(), &spec).unwrap();
        assert_eq!(view.height(), 5);
    }

    #[test]
    fn tri_state_constraints_match_booleans() {
        let spec = FilterSpec {
            urban: TriState::Yes,
            ..wide_open()
        };
        let view = apply(&sample_frame(), &spec).unwrap();
        assert_eq!(sales_column(&view), vec![5.0, 7.0, 3.0]);

        let spec = FilterSpec {
            urban: TriState::Yes,
            us: TriState::No,
            ..wide_open()
        };
        let view = apply(&sample_frame(), &spec).unwrap();
        assert_eq!(sales_column(&view), vec![7.0]);
    }

    #[test]
    fn widening_never_shrinks_the_view() {
        let narrow = FilterSpec {
            sales_range: (5.0, 9.0),
            shelve_locs: labels(&["Good"]),
            ..wide_open()
        };
        let narrow_len = apply(&sample_frame(), &narrow).unwrap().height();

        let wider_range = FilterSpec {
            sales_range: (3.0, 12.0),
            ..narrow.clone()
        };
        assert!(apply(&sample_frame(), &wider_range).unwrap().height() >= narrow_len);

        let more_labels = FilterSpec {
            shelve_locs: labels(&["Good", "Bad"]),
            ..narrow
        };
        assert!(apply(&sample_frame(), &more_labels).unwrap().height() >= narrow_len);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let spec = FilterSpec {
            sales_range: (3.0, 3.0),
            ..wide_open()
        };
        let view = apply(&sample_frame(), &spec).unwrap();
        assert_eq!(sales_column(&view), vec![3.0]);
    }
}
