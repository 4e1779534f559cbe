//! Data module - CSV loading and type normalization

mod loader;
mod normalizer;

pub use loader::{
    categorical_column_names, column_bounds, numeric_column_names, numeric_values, unique_strings,
    DatasetStore, LoadedDataset, LoaderError,
};
pub use normalizer::normalize;
