//! Data loading utilities

use crate::error::{HeartwiseError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Token used for missing values in the heart-disease CSV exports
pub const DEFAULT_NA_TOKEN: &str = "?";

/// CSV loader that maps a missing-value token to nulls
pub struct DataLoader {
    /// Cell content treated as missing
    na_token: String,
    /// Rows inspected for type inference
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            na_token: DEFAULT_NA_TOKEN.to_string(),
            infer_schema_length: 1000,
        }
    }

    /// Set the missing-value token
    pub fn with_na_token(mut self, token: impl Into<String>) -> Self {
        self.na_token = token.into();
        self
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let start = Instant::now();
        let file = File::open(path)?;

        let parse_opts = CsvParseOptions::default()
            .with_null_values(Some(NullValues::AllColumnsSingle(
                self.na_token.as_str().into(),
            )));

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| HeartwiseError::DataError(format!("{}: {}", path.display(), e)))?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded CSV"
        );
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "a,b,target").unwrap();
        writeln!(file, "1,2.5,0").unwrap();
        writeln!(file, "4,?,2").unwrap();
        writeln!(file, "7,8.0,1").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_question_mark_is_null() {
        let file = create_test_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();

        let b = df.column("b").unwrap();
        assert_eq!(b.null_count(), 1);
        assert_eq!(b.dtype(), &DataType::Float64);
    }

    #[test]
    fn test_custom_na_token() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a,b").unwrap();
        writeln!(file, "1,NA").unwrap();
        writeln!(file, "2,?").unwrap();
        writeln!(file, "3,4.5").unwrap();

        let df = DataLoader::new().with_na_token("NA").load_csv(file.path()).unwrap();
        let b = df.column("b").unwrap();
        // `?` is an ordinary string once another token is configured
        assert_eq!(b.null_count(), 1);
        assert_eq!(b.dtype(), &DataType::String);
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::new()
            .load_csv(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, HeartwiseError::IoError(_)));
    }
}
