use crate::adapters::{Adapter, AdapterRegistry};
use crate::config::BenchConfig;
use crate::errors::{BenchError, BenchResult};
use crate::inventory::{self, Inventory};
use crate::observability::{ConsoleLog, RunLog};
use crate::report::{format_size, AdapterResult, BenchmarkReport};
use crate::sink::ResultSink;
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

/// Times each adapter over the whole inventory, one adapter at a time.
pub struct BenchmarkRunner<'a> {
    log: &'a RunLog,
    progress: bool,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(log: &'a RunLog) -> Self {
        Self {
            log,
            progress: false,
        }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Run every registered adapter. An adapter that cannot run at all is
    /// logged and left out of the results.
    pub fn run_all(&self, registry: &AdapterRegistry, inventory: &Inventory) -> Vec<AdapterResult> {
        let mut results = Vec::with_capacity(registry.len());
        for adapter in registry.adapters() {
            match self.run_adapter(adapter, inventory) {
                Ok(result) => results.push(result),
                Err(e) => self
                    .log
                    .in_scope(|| error!(library = adapter.name(), "Skipping library: {}", e)),
            }
        }
        results
    }

    /// Read every file with `adapter`. Per-file failures are logged and
    /// contribute no rows; they never end the loop.
    pub fn run_adapter(&self, adapter: &Adapter, inventory: &Inventory) -> BenchResult<AdapterResult> {
        self.log.in_scope(|| {
            let pb = self.progress_bar(adapter.name(), inventory.len())?;

            let start = Instant::now();
            let mut rows_read = 0u64;
            let mut failed_files = 0usize;

            for record in inventory.files() {
                let path = inventory.resolve(record);
                match read_isolated(adapter, &path, &record.name) {
                    Ok(rows) => rows_read += rows,
                    Err(e) => {
                        failed_files += 1;
                        error!(library = adapter.name(), file = %record.name, "{}", e);
                    }
                }
                pb.inc(1);
            }

            let duration_seconds = start.elapsed().as_secs_f64();
            pb.finish_and_clear();

            if failed_files > 0 {
                warn!(
                    library = adapter.name(),
                    "{} of {} files failed",
                    failed_files,
                    inventory.len()
                );
            }
            info!(
                "{} Processing completed in {:.2} seconds, read {} rows",
                adapter.name(),
                duration_seconds,
                rows_read
            );

            Ok(AdapterResult {
                library: adapter.name().to_string(),
                duration_seconds,
                rows_read,
                failed_files,
            })
        })
    }

    fn progress_bar(&self, name: &str, len: usize) -> BenchResult<ProgressBar> {
        if !self.progress {
            return Ok(ProgressBar::hidden());
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
                .map_err(|e| BenchError::Unknown(e.into()))?
                .progress_chars("#>-"),
        );
        pb.set_message(format!("{} Processing", name));
        Ok(pb)
    }
}

/// Invoke the adapter, turning both errors and panics into `ReadError`.
fn read_isolated(adapter: &Adapter, path: &Path, file: &str) -> BenchResult<u64> {
    let message = match panic::catch_unwind(AssertUnwindSafe(|| adapter.count_rows(path))) {
        Ok(Ok(rows)) => return Ok(rows),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };
    Err(BenchError::ReadError {
        library: adapter.name().to_string(),
        file: file.to_string(),
        message,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// `["csv", ".tsv"]` -> `".csv/.tsv"`
fn describe_extensions(extensions: &[String]) -> String {
    extensions
        .iter()
        .map(|e| format!(".{}", e.trim_start_matches('.')))
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub console: Option<ConsoleLog>,
    pub progress: bool,
}

/// Full run with the stock adapters: opens the run log, benchmarks, writes
/// the results table and closes the log whether or not the run succeeded.
pub fn execute_benchmark(
    config: &BenchConfig,
    run_id: Uuid,
    options: RunOptions,
) -> BenchResult<BenchmarkReport> {
    let mut registry = AdapterRegistry::with_defaults(&config.reader);
    if let Some(libraries) = &config.libraries {
        registry.retain_named(libraries)?;
    }

    let log = RunLog::open(&config.log_dir, Local::now(), options.console)?;
    let outcome = log.in_scope(|| {
        let _span = info_span!("run", run_id = %run_id).entered();
        run_benchmark(config, &registry, &log, options.progress)
    });
    let closed = log.close();

    let report = outcome?;
    closed?;
    Ok(report)
}

pub fn run_benchmark(
    config: &BenchConfig,
    registry: &AdapterRegistry,
    log: &RunLog,
    progress: bool,
) -> BenchResult<BenchmarkReport> {
    log.in_scope(|| {
        info!("Scanning {:?} for input files", config.input_dir);
        let inventory = inventory::scan(&config.input_dir, &config.extensions).map_err(|e| {
            error!("{}", e);
            e
        })?;
        if inventory.is_empty() {
            let err = BenchError::EmptyInventory {
                dir: config.input_dir.clone(),
                extensions: describe_extensions(&config.extensions),
            };
            error!("{}", err);
            return Err(err);
        }

        info!(
            "Starting processing of {} files, total size: {}",
            inventory.len(),
            format_size(inventory.total_size_bytes())
        );

        let results = BenchmarkRunner::new(log)
            .with_progress(progress)
            .run_all(registry, &inventory);
        let report = BenchmarkReport::from_results(results, &inventory);

        ResultSink::new(log)
            .write(&report, &config.output)
            .map_err(|e| {
                error!("{}", e);
                e
            })?;
        Ok(report)
    })
}
