//! Benchmark harness that times competing CSV readers over a directory of
//! files and ranks them fastest first.

pub mod adapters;
pub mod config;
pub mod errors;
pub mod inventory;
pub mod io;
pub mod observability;
pub mod report;
pub mod runner;
pub mod sink;

pub use adapters::{Adapter, AdapterRegistry, RowCounter};
pub use config::{BenchConfig, ConfigOverride, ReaderConfig};
pub use errors::{BenchError, BenchResult};
pub use inventory::{FileRecord, Inventory};
pub use report::{AdapterResult, BenchmarkReport, ReportRow};
pub use runner::{execute_benchmark, run_benchmark, BenchmarkRunner, RunOptions};
