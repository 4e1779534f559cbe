//! Stats module - aggregates derived from the filtered view

mod aggregate;

pub use aggregate::{
    correlation_matrix, mean_by_group, percentile, quantile_binned_means, value_label,
    CorrelationMatrix, GroupMean, KpiSummary, QuantileBin, PRICE_QUANTILES,
};
