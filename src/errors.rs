use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum BenchError {
    #[error("Input directory not found: {0:?}")]
    #[diagnostic(
        code("READBENCH-001"),
        help("Convert the spreadsheets to CSV first, or point --input-dir at an existing directory.")
    )]
    DirectoryNotFound(PathBuf),

    #[error("No {extensions} files found in {dir:?}")]
    #[diagnostic(
        code("READBENCH-002"),
        help("The input directory exists but holds no files with a recognized extension.")
    )]
    EmptyInventory { dir: PathBuf, extensions: String },

    #[error("{library} failed to read {file}: {message}")]
    #[diagnostic(code("READBENCH-003"))]
    ReadError {
        library: String,
        file: String,
        message: String,
    },

    #[error("Could not write results to {path:?}: {source}")]
    #[diagnostic(
        code("READBENCH-004"),
        help("Check that the output directory exists and is writable.")
    )]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code("READBENCH-005"),
        help("Please check your benchmark YAML file and command line flags.")
    )]
    ConfigError(String),

    #[error("Malformed results table: {0}")]
    #[diagnostic(
        code("READBENCH-009"),
        help("The file does not look like a table written by `readbench run`.")
    )]
    ReportFormatError(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code("READBENCH-006"), help("Check file paths and permissions."))]
    IoError(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    #[diagnostic(
        code("READBENCH-007"),
        help("An error occurred within the data processing engine.")
    )]
    PolarsError(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    #[diagnostic(code("READBENCH-008"))]
    CsvError(#[from] csv::Error),

    #[error(transparent)]
    #[diagnostic(code("READBENCH-000"))]
    Unknown(#[from] anyhow::Error),
}

impl From<serde_yaml::Error> for BenchError {
    fn from(err: serde_yaml::Error) -> Self {
        BenchError::ConfigError(err.to_string())
    }
}

pub type BenchResult<T> = Result<T, BenchError>;
