//! Dataset Loader Module
//! Loads the company sales CSV with Polars and caches it for the session.

use crate::data::normalizer;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Columns the dashboard depends on. Extra columns are loaded and shown in the
/// preview but are otherwise ignored.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "Sales",
    "Price",
    "Advertising",
    "Income",
    "Population",
    "Age",
    "Education",
    "ShelveLoc",
    "Urban",
    "US",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Malformed value '{value}' in column '{column}' at row {row}")]
    MalformedRecord {
        column: String,
        value: String,
        row: usize,
    },
    #[error("Column '{column}' has unexpected type {dtype}")]
    UnexpectedType { column: String, dtype: String },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// The dataset plus metadata fixed once at load time.
#[derive(Debug)]
pub struct LoadedDataset {
    /// Normalized frame: Urban/US are boolean, ShelveLoc labels validated.
    pub df: DataFrame,
    pub path: PathBuf,
    /// Distinct ShelveLoc labels observed in the full dataset, sorted.
    pub shelve_labels: Vec<String>,
    /// Min/max of Sales, used to clamp the sales range slider.
    pub sales_bounds: (f64, f64),
    /// Min/max of Price, used to clamp the price range slider.
    pub price_bounds: (f64, f64),
    /// Numeric column names, for the correlation matrix and deep-dive pickers.
    pub numeric_columns: Vec<String>,
    /// Text column names, for the deep-dive categorical X and color pickers.
    pub categorical_columns: Vec<String>,
}

/// Memoization cell for the single dataset of a session. The composition root
/// owns one of these; repeated calls for the same path never re-read the file.
#[derive(Default)]
pub struct DatasetStore {
    dataset: Option<LoadedDataset>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the CSV at `path` unless it is already the cached dataset.
    pub fn ensure_loaded(&mut self, path: &Path) -> Result<&LoadedDataset, LoaderError> {
        let cached = self
            .dataset
            .as_ref()
            .map(|d| d.path == path)
            .unwrap_or(false);

        if !cached {
            let dataset = load_dataset(path)?;
            log::info!(
                "loaded {} ({} rows, {} columns)",
                path.display(),
                dataset.df.height(),
                dataset.df.width()
            );
            self.dataset = Some(dataset);
        }

        // Just stored above when not cached.
        self.dataset
            .as_ref()
            .ok_or_else(|| LoaderError::DataUnavailable(path.display().to_string()))
    }

    pub fn get(&self) -> Option<&LoadedDataset> {
        self.dataset.as_ref()
    }
}

/// Read, validate, and normalize one CSV source.
fn load_dataset(path: &Path) -> Result<LoadedDataset, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::DataUnavailable(format!(
            "{} not found",
            path.display()
        )));
    }

    let raw = LazyCsvReader::new(path.to_string_lossy().as_ref())
        .with_infer_schema_length(Some(10000))
        .finish()
        .and_then(|lazy| lazy.collect())
        .map_err(|e| LoaderError::DataUnavailable(e.to_string()))?;

    for required in REQUIRED_COLUMNS {
        if raw.column(required).is_err() {
            return Err(LoaderError::MissingColumn(required.to_string()));
        }
    }

    let df = normalizer::normalize(&raw)?;

    let mut shelve_labels = unique_strings(&df, "ShelveLoc")?;
    shelve_labels.sort();

    Ok(LoadedDataset {
        sales_bounds: column_bounds(&df, "Sales")?,
        price_bounds: column_bounds(&df, "Price")?,
        numeric_columns: numeric_column_names(&df),
        categorical_columns: categorical_column_names(&df),
        shelve_labels,
        path: path.to_path_buf(),
        df,
    })
}

/// Names of all numeric columns in the frame, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| {
            matches!(
                col.dtype(),
                DataType::Float32
                    | DataType::Float64
                    | DataType::Int8
                    | DataType::Int16
                    | DataType::Int32
                    | DataType::Int64
                    | DataType::UInt8
                    | DataType::UInt16
                    | DataType::UInt32
                    | DataType::UInt64
            )
        })
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of all text columns in the frame, in frame order. After
/// normalization these are the categorical attributes (Urban/US are boolean
/// by then and belong to neither picker).
pub fn categorical_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| matches!(col.dtype(), DataType::String))
        .map(|col| col.name().to_string())
        .collect()
}

/// A numeric column as f64 by name, row-aligned with the frame. Nulls become
/// NaN so positions are preserved.
pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, PolarsError> {
    let cast = df.column(column)?.cast(&DataType::Float64)?;
    let ca = cast.f64()?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Distinct non-null values of a string column.
pub fn unique_strings(df: &DataFrame, column: &str) -> Result<Vec<String>, PolarsError> {
    let unique = df.column(column)?.unique()?;
    let series = unique.as_materialized_series();
    Ok((0..series.len())
        .filter_map(|i| {
            let val = series.get(i).ok()?;
            if val.is_null() {
                None
            } else {
                Some(val.to_string().trim_matches('"').to_string())
            }
        })
        .collect())
}

/// Observed (min, max) of a numeric column. Empty column yields (0, 0).
pub fn column_bounds(df: &DataFrame, column: &str) -> Result<(f64, f64), LoaderError> {
    let cast = df.column(column)?.cast(&DataType::Float64)?;
    let ca = cast.f64()?;
    let min = ca.min().unwrap_or(0.0);
    let max = ca.max().unwrap_or(0.0);
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const SAMPLE: &str = "\
Sales,Price,Advertising,Income,Population,Age,Education,ShelveLoc,Urban,US
9.5,120,11,73,276,42,17,Bad,Yes,Yes
11.22,83,16,48,260,65,10,Good,Yes,Yes
7.4,97,3,35,121,55,12,Medium,No,No
";

    #[test]
    fn missing_file_is_data_unavailable() {
        let mut store = DatasetStore::new();
        let err = store
            .ensure_loaded(Path::new("/nonexistent/company_Data.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::DataUnavailable(_)));
        assert!(store.get().is_none());
    }

    #[test]
    fn missing_column_is_rejected() {
        let path = write_temp_csv(
            "salescope_loader_missing_col.csv",
            "Sales,Price\n9.5,120\n",
        );
        let mut store = DatasetStore::new();
        let err = store.ensure_loaded(&path).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(c) if c == "Advertising"));
    }

    #[test]
    fn load_captures_metadata_and_caches() {
        let path = write_temp_csv("salescope_loader_ok.csv", SAMPLE);
        let mut store = DatasetStore::new();
        let dataset = store.ensure_loaded(&path).unwrap();
        assert_eq!(dataset.df.height(), 3);
        assert_eq!(dataset.shelve_labels, vec!["Bad", "Good", "Medium"]);
        assert_eq!(dataset.sales_bounds, (7.4, 11.22));
        assert_eq!(dataset.price_bounds, (83.0, 120.0));
        assert!(dataset.numeric_columns.contains(&"Sales".to_string()));
        // Urban/US are boolean after normalization, so not numeric.
        assert!(!dataset.numeric_columns.contains(&"Urban".to_string()));
        assert_eq!(dataset.categorical_columns, vec!["ShelveLoc"]);

        // Second call must hit the cache, even if the file disappears.
        std::fs::remove_file(&path).unwrap();
        assert!(store.ensure_loaded(&path).is_ok());
    }

    #[test]
    fn numeric_values_preserve_row_alignment() {
        let df = polars::df!(
            "Sales" => [1.0, 2.0, 3.0],
            "Price" => [Some(10i64), None, Some(30)],
        )
        .unwrap();
        let values = numeric_values(&df, "Price").unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], 10.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 30.0);
    }
}
