//! The competing readers, registered by name.
//!
//! Every adapter answers one question: how many data rows does this file
//! hold. Library-specific table types never leave the adapter, so the
//! runner only ever sees a plain count.

use crate::config::ReaderConfig;
use crate::errors::{BenchError, BenchResult};
use crate::io;
use std::path::Path;

pub trait RowCounter {
    fn count_rows(&self, path: &Path) -> BenchResult<u64>;
}

impl<F> RowCounter for F
where
    F: Fn(&Path) -> BenchResult<u64>,
{
    fn count_rows(&self, path: &Path) -> BenchResult<u64> {
        self(path)
    }
}

/// A named reader.
pub struct Adapter {
    name: String,
    counter: Box<dyn RowCounter>,
}

impl Adapter {
    pub fn new(name: impl Into<String>, counter: impl RowCounter + 'static) -> Self {
        Self {
            name: name.into(),
            counter: Box::new(counter),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count_rows(&self, path: &Path) -> BenchResult<u64> {
        self.counter.count_rows(path)
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter").field("name", &self.name).finish()
    }
}

/// Adapters in registration order. Ties in the final ranking keep this order.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Adapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock line-up: polars eager, polars lazy, and the `csv` crate.
    pub fn with_defaults(reader: &ReaderConfig) -> Self {
        let mut registry = Self::new();

        let eager = reader.clone();
        registry.register("Polars", move |path| {
            Ok(io::read_csv(path, &eager)?.height() as u64)
        });

        let lazy = reader.clone();
        registry.register("Polars Lazy", move |path| {
            let df = io::scan_csv(path, &lazy)?
                .collect()
                .map_err(BenchError::PolarsError)?;
            Ok(df.height() as u64)
        });

        registry.register("csv", |path| io::count_csv_records(path));
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, read: F)
    where
        F: Fn(&Path) -> BenchResult<u64> + 'static,
    {
        self.adapters.push(Adapter::new(name, read));
    }

    pub fn push(&mut self, adapter: Adapter) {
        self.adapters.push(adapter);
    }

    pub fn adapters(&self) -> &[Adapter] {
        &self.adapters
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(Adapter::name).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Keep only the adapters named in `names` (case-insensitive), in
    /// registration order. An empty selection or any unknown name is rejected.
    pub fn retain_named(&mut self, names: &[String]) -> BenchResult<()> {
        if names.is_empty() {
            return Err(BenchError::ConfigError(format!(
                "No libraries selected, expected at least one of: {}",
                self.names().join(", ")
            )));
        }
        if let Some(unknown) = names.iter().find(|n| {
            !self
                .adapters
                .iter()
                .any(|a| a.name.eq_ignore_ascii_case(n))
        }) {
            return Err(BenchError::ConfigError(format!(
                "Unknown library '{}', expected one of: {}",
                unknown,
                self.names().join(", ")
            )));
        }
        self.adapters
            .retain(|a| names.iter().any(|n| a.name.eq_ignore_ascii_case(n)));
        Ok(())
    }
}
