//! Aggregation Module
//! Derives the summary tables the charts are built from: grouped means,
//! quantile-binned means, a Pearson correlation matrix, and the KPI row.
//! Every function here is total over any view, including the empty one.

use crate::data;
use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Default number of quantile bins for the price elasticity chart.
pub const PRICE_QUANTILES: usize = 4;

/// Mean of Sales for one group value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub label: String,
    pub mean_sales: f64,
    pub count: usize,
}

/// One quantile bin of a numeric column with its mean Sales.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileBin {
    pub lower: f64,
    pub upper: f64,
    pub midpoint: f64,
    pub mean_sales: f64,
    pub count: usize,
}

/// Pearson correlation over a set of numeric columns. Entries are NaN when
/// the view has fewer than two rows or a column has zero variance.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}

/// Headline numbers for the KPI cards.
#[derive(Debug, Clone)]
pub struct KpiSummary {
    pub total_sales: f64,
    pub mean_sales: f64,
    pub record_count: usize,
    pub mean_advertising: f64,
}

impl KpiSummary {
    /// NaN-safe summary of the view; means are NaN on the empty view.
    pub fn compute(view: &DataFrame) -> Self {
        let sales = finite_values(view, "Sales");
        let advertising = finite_values(view, "Advertising");

        Self {
            total_sales: sales.iter().sum(),
            mean_sales: (&sales).mean(),
            record_count: view.height(),
            mean_advertising: (&advertising).mean(),
        }
    }
}

/// Display label for a grouping value; booleans read as "Yes"/"No".
pub fn value_label(value: &AnyValue) -> String {
    match value {
        AnyValue::Boolean(true) => "Yes".to_string(),
        AnyValue::Boolean(false) => "No".to_string(),
        other => other.to_string().trim_matches('"').to_string(),
    }
}

/// Mean of Sales per distinct value of `group_col`, sorted by label.
/// Groups absent from the view are absent from the result.
pub fn mean_by_group(view: &DataFrame, group_col: &str) -> PolarsResult<Vec<GroupMean>> {
    let groups = view.column(group_col)?;
    let sales = view.column("Sales")?.cast(&DataType::Float64)?;
    let sales_ca = sales.f64()?;

    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for i in 0..view.height() {
        let group = groups.get(i)?;
        if group.is_null() {
            continue;
        }
        let Some(value) = sales_ca.get(i) else {
            continue;
        };
        if value.is_nan() {
            continue;
        }
        let entry = acc.entry(value_label(&group)).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    Ok(acc
        .into_iter()
        .map(|(label, (sum, count))| GroupMean {
            label,
            mean_sales: sum / count as f64,
            count,
        })
        .collect())
}

/// Mean of Sales per quantile bin of `value_col`, ascending by bin.
///
/// Bin edges are the `quantile_count`-quantiles of the view's own values
/// (linear interpolation between order statistics). Tied edges are collapsed,
/// so heavy ties produce fewer, wider bins instead of empty ones; when all
/// values are equal the result is a single degenerate bin. Intervals are
/// (lower, upper], with the lowest bin closed at both ends.
pub fn quantile_binned_means(
    view: &DataFrame,
    value_col: &str,
    quantile_count: usize,
) -> PolarsResult<Vec<QuantileBin>> {
    let values = view.column(value_col)?.cast(&DataType::Float64)?;
    let values_ca = values.f64()?;
    let sales = view.column("Sales")?.cast(&DataType::Float64)?;
    let sales_ca = sales.f64()?;

    let pairs: Vec<(f64, f64)> = (0..view.height())
        .filter_map(|i| match (values_ca.get(i), sales_ca.get(i)) {
            (Some(v), Some(s)) if !v.is_nan() && !s.is_nan() => Some((v, s)),
            _ => None,
        })
        .collect();

    if pairs.is_empty() || quantile_count == 0 {
        return Ok(Vec::new());
    }

    let mut sorted: Vec<f64> = pairs.iter().map(|&(v, _)| v).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut edges: Vec<f64> = (0..=quantile_count)
        .map(|k| percentile(&sorted, 100.0 * k as f64 / quantile_count as f64))
        .collect();
    edges.dedup();

    if edges.len() < 2 {
        // All values identical.
        let value = edges[0];
        let mean_sales = pairs.iter().map(|&(_, s)| s).sum::<f64>() / pairs.len() as f64;
        return Ok(vec![QuantileBin {
            lower: value,
            upper: value,
            midpoint: value,
            mean_sales,
            count: pairs.len(),
        }]);
    }

    let bin_count = edges.len() - 1;
    let mut sums = vec![0.0; bin_count];
    let mut counts = vec![0usize; bin_count];
    for &(value, sale) in &pairs {
        let idx = bin_index(&edges, value);
        sums[idx] += sale;
        counts[idx] += 1;
    }

    Ok((0..bin_count)
        .filter(|&k| counts[k] > 0)
        .map(|k| QuantileBin {
            lower: edges[k],
            upper: edges[k + 1],
            midpoint: (edges[k] + edges[k + 1]) / 2.0,
            mean_sales: sums[k] / counts[k] as f64,
            count: counts[k],
        })
        .collect())
}

/// First bin whose upper edge contains `value`. Edges come from the same data
/// the values do, so everything lands inside [first, last].
fn bin_index(edges: &[f64], value: f64) -> usize {
    let last = edges.len() - 2;
    for k in 0..last {
        if value <= edges[k + 1] {
            return k;
        }
    }
    last
}

/// Percentile by linear interpolation between order statistics (the NumPy
/// default). `sorted_values` must be ascending.
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

/// Pearson correlation matrix over `columns`. Rows are computed in parallel;
/// missing columns correlate as NaN.
pub fn correlation_matrix(view: &DataFrame, columns: &[String]) -> CorrelationMatrix {
    let series: Vec<Vec<f64>> = columns
        .iter()
        .map(|name| data::numeric_values(view, name).unwrap_or_default())
        .collect();

    let values: Vec<Vec<f64>> = (0..columns.len())
        .into_par_iter()
        .map(|i| {
            (0..columns.len())
                .map(|j| pearson(&series[i], &series[j]))
                .collect()
        })
        .collect();

    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let x = &x[..n];
    let y = &y[..n];

    let mean_x = x.mean();
    let mean_y = y.mean();

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for k in 0..n {
        let dx = x[k] - mean_x;
        let dy = y[k] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

/// Non-NaN values of a numeric column, for KPI summaries.
fn finite_values(view: &DataFrame, column: &str) -> Vec<f64> {
    data::numeric_values(view, column)
        .unwrap_or_default()
        .into_iter()
        .filter(|v| !v.is_nan())
        .collect()
}
