use crate::errors::BenchResult;
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Dispatch, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Env var that overrides the console filter.
pub const LOG_ENV_VAR: &str = "READBENCH_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFormat {
    Text,
    Json,
}

/// Mirror of the run log on stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLog {
    pub format: ConsoleFormat,
    pub level: Level,
}

pub fn log_file_name(started_at: &DateTime<Local>) -> String {
    format!(
        "read_performance_{}.log",
        started_at.format("%Y%m%d_%H%M%S")
    )
}

/// Log destination for one benchmark run.
///
/// Holds its own `tracing` dispatcher instead of installing a global one;
/// components that log take a `&RunLog` and emit inside [`RunLog::in_scope`].
/// The file is synced on [`RunLog::close`] or, failing that, on drop.
pub struct RunLog {
    path: PathBuf,
    file: Arc<File>,
    dispatch: Dispatch,
    closed: bool,
}

impl RunLog {
    pub fn open<P: AsRef<Path>>(
        dir: P,
        started_at: DateTime<Local>,
        console: Option<ConsoleLog>,
    ) -> BenchResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(log_file_name(&started_at));
        let file = Arc::new(OpenOptions::new().create(true).append(true).open(&path)?);

        let console_layer = console.map(|console| {
            let filter = EnvFilter::builder()
                .with_default_directive(console.level.into())
                .with_env_var(LOG_ENV_VAR)
                .from_env_lossy();
            match console.format {
                ConsoleFormat::Json => fmt::layer()
                    .json()
                    .with_span_list(false)
                    .with_current_span(false)
                    .with_writer(io::stderr)
                    .with_filter(filter)
                    .boxed(),
                ConsoleFormat::Text => fmt::layer()
                    .with_writer(io::stderr)
                    .with_filter(filter)
                    .boxed(),
            }
        });

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Arc::clone(&file))
            .with_filter(LevelFilter::INFO);

        let subscriber = Registry::default().with(console_layer).with(file_layer);

        Ok(Self {
            path,
            file,
            dispatch: Dispatch::new(subscriber),
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with this log as the current `tracing` dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    pub fn close(mut self) -> BenchResult<()> {
        self.closed = true;
        self.sync()?;
        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        (&*self.file).flush()?;
        self.file.sync_all()
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.sync();
        }
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog").field("path", &self.path).finish()
    }
}
