//! Type Normalizer Module
//! Coerces the Yes/No text columns to booleans and validates shelf labels.

use crate::data::loader::LoaderError;
use polars::prelude::*;

/// Two-valued text columns stored as exact "Yes"/"No" in the source.
const YES_NO_COLUMNS: [&str; 2] = ["Urban", "US"];

/// Produce a normalized copy of the frame: `Urban` and `US` become boolean,
/// `ShelveLoc` is checked to be non-null text. The input is not mutated.
///
/// Any value other than exact "Yes"/"No" (including null) fails with
/// `MalformedRecord` rather than silently producing a missing boolean.
/// Already-boolean columns pass through unchanged, so normalizing an
/// already-normalized frame is a no-op.
pub fn normalize(df: &DataFrame) -> Result<DataFrame, LoaderError> {
    let mut out = df.clone();

    for column in YES_NO_COLUMNS {
        let replacement = match out.column(column)?.dtype() {
            DataType::Boolean => None,
            DataType::String => Some(yes_no_to_bool(&out, column)?),
            dtype => {
                return Err(LoaderError::UnexpectedType {
                    column: column.to_string(),
                    dtype: dtype.to_string(),
                })
            }
        };
        if let Some(series) = replacement {
            out.replace(column, series)?;
        }
    }

    validate_shelve_loc(&out)?;

    Ok(out)
}

/// Map a "Yes"/"No" text column to a boolean series, failing on anything else.
fn yes_no_to_bool(df: &DataFrame, column: &str) -> Result<Series, LoaderError> {
    let ca = df.column(column)?.str()?.clone();
    let mut values: Vec<bool> = Vec::with_capacity(ca.len());

    for (row, value) in ca.into_iter().enumerate() {
        match value {
            Some("Yes") => values.push(true),
            Some("No") => values.push(false),
            other => {
                return Err(LoaderError::MalformedRecord {
                    column: column.to_string(),
                    value: other.unwrap_or("<null>").to_string(),
                    row,
                })
            }
        }
    }

    Ok(Series::new(column.into(), values))
}

/// ShelveLoc must be text with no missing labels; the label set itself is
/// whatever the dataset contains.
fn validate_shelve_loc(df: &DataFrame) -> Result<(), LoaderError> {
    let column = df.column("ShelveLoc")?;
    match column.dtype() {
        DataType::String => {
            let ca = column.str()?;
            if let Some(row) = ca.into_iter().position(|v| v.is_none()) {
                return Err(LoaderError::MalformedRecord {
                    column: "ShelveLoc".to_string(),
                    value: "<null>".to_string(),
                    row,
                });
            }
            Ok(())
        }
        dtype => Err(LoaderError::UnexpectedType {
            column: "ShelveLoc".to_string(),
            dtype: dtype.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn raw_frame() -> DataFrame {
        df!(
            "Sales" => [9.5, 11.22, 7.4],
            "Price" => [120.0, 83.0, 97.0],
            "ShelveLoc" => ["Bad", "Good", "Medium"],
            "Urban" => ["Yes", "Yes", "No"],
            "US" => ["Yes", "No", "No"],
        )
        .unwrap()
    }

    #[test]
    fn maps_yes_no_to_bool() {
        let normalized = normalize(&raw_frame()).unwrap();

        let urban = normalized.column("Urban").unwrap().bool().unwrap();
        let values: Vec<bool> = urban.into_iter().flatten().collect();
        assert_eq!(values, vec![true, true, false]);

        let us = normalized.column("US").unwrap().bool().unwrap();
        let values: Vec<bool> = us.into_iter().flatten().collect();
        assert_eq!(values, vec![true, false, false]);
    }

    #[test]
    fn does_not_mutate_input() {
        let raw = raw_frame();
        let _ = normalize(&raw).unwrap();
        assert_eq!(raw.column("Urban").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn is_idempotent() {
        let once = normalize(&raw_frame()).unwrap();
        let twice = normalize(&once).unwrap();
        assert!(once.equals(&twice));
    }

    #[test]
    fn rejects_unexpected_text() {
        let df = df!(
            "ShelveLoc" => ["Bad"],
            "Urban" => ["Maybe"],
            "US" => ["Yes"],
        )
        .unwrap();
        let err = normalize(&df).unwrap_err();
        match err {
            LoaderError::MalformedRecord { column, value, row } => {
                assert_eq!(column, "Urban");
                assert_eq!(value, "Maybe");
                assert_eq!(row, 0);
            }
            other => panic!("expected MalformedRecord, got {other}"),
        }
    }

    #[test]
    fn rejects_null_yes_no() {
        let df = df!(
            "ShelveLoc" => ["Bad", "Good"],
            "Urban" => [Some("Yes"), None],
            "US" => [Some("Yes"), Some("No")],
        )
        .unwrap();
        let err = normalize(&df).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MalformedRecord { row: 1, .. }
        ));
    }

    #[test]
    fn rejects_null_shelve_label() {
        let df = df!(
            "ShelveLoc" => [Some("Bad"), None],
            "Urban" => ["Yes", "No"],
            "US" => ["Yes", "No"],
        )
        .unwrap();
        let err = normalize(&df).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MalformedRecord { row: 1, .. }
        ));
    }
}
