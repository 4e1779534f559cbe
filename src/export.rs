//! CSV Export Module
//! Serializes the filtered view back to comma-separated text, header row
//! first, records in view order.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Write the view to `path` as CSV. Booleans serialize as true/false.
pub fn write_csv(view: &DataFrame, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut out = view.clone();
    CsvWriter::new(file).include_header(true).finish(&mut out)?;

    log::info!("exported {} rows to {}", view.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn writes_header_and_rows_in_view_order() {
        let view = df!(
            "Sales" => [5.0, 7.0, 12.0],
            "ShelveLoc" => ["Good", "Good", "Medium"],
            "Urban" => [true, false, true],
        )
        .unwrap();

        let path = temp_path("salescope_export_order.csv");
        write_csv(&view, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Sales,ShelveLoc,Urban");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("5.0,Good"));
        assert!(lines[3].starts_with("12.0,Medium"));
    }

    #[test]
    fn empty_view_writes_header_only() {
        let view = df!(
            "Sales" => [5.0],
            "ShelveLoc" => ["Good"],
        )
        .unwrap()
        .head(Some(0));

        let path = temp_path("salescope_export_empty.csv");
        write_csv(&view, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "Sales,ShelveLoc");
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let view = df!("Sales" => [1.0]).unwrap();
        let err = write_csv(&view, Path::new("/nonexistent_dir/out.csv")).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
