use crate::config::ReaderConfig;
use crate::errors::{BenchError, BenchResult};
use polars::prelude::*;
use std::path::Path;

pub fn read_csv<P: AsRef<Path>>(path: P, reader: &ReaderConfig) -> BenchResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(reader.infer_schema_length)
        .with_ignore_errors(reader.ignore_errors)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))
        .and_then(|r| r.finish())
        .map_err(BenchError::PolarsError)
}

pub fn scan_csv<P: AsRef<Path>>(path: P, reader: &ReaderConfig) -> BenchResult<LazyFrame> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(reader.infer_schema_length)
        .with_ignore_errors(reader.ignore_errors)
        .finish()
        .map_err(BenchError::PolarsError)
}

/// Count data records with the `csv` crate. Ragged rows are an error.
pub fn count_csv_records<P: AsRef<Path>>(path: P) -> BenchResult<u64> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)?;
    let mut record = csv::ByteRecord::new();
    let mut rows = 0u64;
    while rdr.read_byte_record(&mut record)? {
        rows += 1;
    }
    Ok(rows)
}
