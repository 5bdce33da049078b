//! Persists the ranked report as the CSV handed to the charting step.

use crate::errors::{BenchError, BenchResult};
use crate::observability::RunLog;
use crate::report::{BenchmarkReport, ReportRow};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const COL_LIBRARY: &str = "Library";
pub const COL_DURATION: &str = "Duration (seconds)";
pub const COL_ROWS_READ: &str = "Rows Read";
pub const COL_FILES_PROCESSED: &str = "Files Processed";
pub const COL_TOTAL_SIZE: &str = "Total Size";

pub struct ResultSink<'a> {
    log: &'a RunLog,
}

impl<'a> ResultSink<'a> {
    pub fn new(log: &'a RunLog) -> Self {
        Self { log }
    }

    /// Write `report` to `path`, replacing any previous table.
    ///
    /// The table goes to a sibling temp file first and is renamed into
    /// place, so a failed write never leaves a truncated table behind.
    pub fn write<P: AsRef<Path>>(&self, report: &BenchmarkReport, path: P) -> BenchResult<()> {
        let path = path.as_ref();
        self.log.in_scope(|| {
            let mut df = report_frame(report)?;
            let tmp = temp_path(path);

            let written = fs::File::create(&tmp)
                .map_err(|source| BenchError::WriteError {
                    path: path.to_path_buf(),
                    source,
                })
                .and_then(|mut file| {
                    CsvWriter::new(&mut file)
                        .include_header(true)
                        .finish(&mut df)
                        .map_err(BenchError::PolarsError)
                })
                .and_then(|_| {
                    fs::rename(&tmp, path).map_err(|source| BenchError::WriteError {
                        path: path.to_path_buf(),
                        source,
                    })
                });

            if written.is_err() {
                let _ = fs::remove_file(&tmp);
            }
            written?;

            info!("Results saved to {}", path.display());
            Ok(())
        })
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn report_frame(report: &BenchmarkReport) -> BenchResult<DataFrame> {
    let rows = report.rows();
    let df = df!(
        COL_LIBRARY => rows.iter().map(|r| r.library.as_str()).collect::<Vec<_>>(),
        COL_DURATION => rows.iter().map(|r| r.duration_seconds).collect::<Vec<_>>(),
        COL_ROWS_READ => rows.iter().map(|r| r.rows_read).collect::<Vec<_>>(),
        COL_FILES_PROCESSED => rows.iter().map(|r| r.files_processed).collect::<Vec<_>>(),
        COL_TOTAL_SIZE => rows.iter().map(|r| r.total_size.as_str()).collect::<Vec<_>>()
    )?;
    Ok(df)
}

/// Load a results table written by [`ResultSink::write`].
pub fn read_report<P: AsRef<Path>>(path: P) -> BenchResult<Vec<ReportRow>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;

    let library = column(&df, COL_LIBRARY, &DataType::String)?;
    let duration = column(&df, COL_DURATION, &DataType::Float64)?;
    let rows_read = column(&df, COL_ROWS_READ, &DataType::UInt64)?;
    let files = column(&df, COL_FILES_PROCESSED, &DataType::UInt64)?;
    let total_size = column(&df, COL_TOTAL_SIZE, &DataType::String)?;

    let rows = library
        .str()?
        .into_iter()
        .zip(duration.f64()?)
        .zip(rows_read.u64()?)
        .zip(files.u64()?)
        .zip(total_size.str()?)
        .map(|((((library, duration), rows_read), files), total_size)| {
            match (library, duration, rows_read, files, total_size) {
                (Some(library), Some(duration), Some(rows_read), Some(files), Some(total_size)) => {
                    Ok(ReportRow {
                        library: library.to_string(),
                        duration_seconds: duration,
                        rows_read,
                        files_processed: files,
                        total_size: total_size.to_string(),
                    })
                }
                _ => Err(BenchError::ReportFormatError(format!(
                    "{:?} has an incomplete row",
                    path.as_ref()
                ))),
            }
        })
        .collect::<BenchResult<Vec<_>>>()?;
    Ok(rows)
}

fn column(df: &DataFrame, name: &str, dtype: &DataType) -> BenchResult<Series> {
    Ok(df.column(name)?.as_materialized_series().cast(dtype)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory;
    use crate::report::AdapterResult;
    use chrono::Local;
    use tempfile::tempdir;

    fn sample_report(dir: &Path) -> BenchmarkReport {
        let data = dir.join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("one.csv"), "a\n1\n2\n").unwrap();
        fs::write(data.join("two.csv"), "a\n3\n").unwrap();
        let inv = inventory::scan(&data, &["csv".to_string()]).unwrap();
        BenchmarkReport::from_results(
            vec![
                AdapterResult {
                    library: "csv".to_string(),
                    duration_seconds: 0.75,
                    rows_read: 3,
                    failed_files: 0,
                },
                AdapterResult {
                    library: "Polars".to_string(),
                    duration_seconds: 0.015625,
                    rows_read: 2,
                    failed_files: 1,
                },
            ],
            &inv,
        )
    }

    #[test]
    fn test_write_then_read_back() -> BenchResult<()> {
        let dir = tempdir()?;
        let log = RunLog::open(dir.path(), Local::now(), None)?;
        let report = sample_report(dir.path());
        let out = dir.path().join("performance_results.csv");

        ResultSink::new(&log).write(&report, &out)?;

        let header = fs::read_to_string(&out)?;
        assert!(header.starts_with("Library,Duration (seconds),Rows Read,Files Processed,Total Size"));
        assert!(!temp_path(&out).exists());

        let rows = read_report(&out)?;
        assert_eq!(rows, report.rows());
        assert_eq!(rows[0].library, "Polars");
        Ok(())
    }

    #[test]
    fn test_write_overwrites_previous_table() -> BenchResult<()> {
        let dir = tempdir()?;
        let log = RunLog::open(dir.path(), Local::now(), None)?;
        let out = dir.path().join("results.csv");
        fs::write(&out, "stale,content\n1,2\n3,4\n5,6\n7,8\n")?;

        ResultSink::new(&log).write(&sample_report(dir.path()), &out)?;
        assert_eq!(read_report(&out)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_unwritable_destination() -> BenchResult<()> {
        let dir = tempdir()?;
        let log = RunLog::open(dir.path(), Local::now(), None)?;
        let out = dir.path().join("missing_dir").join("results.csv");

        let err = ResultSink::new(&log)
            .write(&sample_report(dir.path()), &out)
            .unwrap_err();
        assert!(matches!(err, BenchError::WriteError { ref path, .. } if path == &out));
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn test_read_incomplete_row() -> BenchResult<()> {
        let dir = tempdir()?;
        let out = dir.path().join("results.csv");
        fs::write(
            &out,
            "Library,Duration (seconds),Rows Read,Files Processed,Total Size\n\
             Polars,0.5,3,2,1.00 KB\n\
             csv,,3,2,1.00 KB\n",
        )?;

        let err = read_report(&out).unwrap_err();
        assert!(
            matches!(err, BenchError::ReportFormatError(ref msg) if msg.contains("incomplete row")),
            "unexpected error: {:?}",
            err
        );
        Ok(())
    }

    #[test]
    fn test_read_rejects_foreign_table() -> BenchResult<()> {
        let dir = tempdir()?;
        let out = dir.path().join("other.csv");
        fs::write(&out, "a,b\n1,2\n")?;
        assert!(read_report(&out).is_err());
        Ok(())
    }
}
