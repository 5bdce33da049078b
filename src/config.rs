use crate::errors::BenchResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Benchmark run settings, loadable from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    pub input_dir: PathBuf,
    pub output: PathBuf,
    pub log_dir: PathBuf,
    pub extensions: Vec<String>,
    /// Restrict the run to these adapters. `None` runs every registered one.
    pub libraries: Option<Vec<String>>,
    pub reader: ReaderConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("csv_files"),
            output: PathBuf::from("performance_results.csv"),
            log_dir: PathBuf::from("."),
            extensions: vec!["csv".to_string()],
            libraries: None,
            reader: ReaderConfig::default(),
        }
    }
}

/// Tuning passed to the polars readers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReaderConfig {
    pub infer_schema_length: Option<usize>,
    pub ignore_errors: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            infer_schema_length: Some(10_000),
            ignore_errors: true,
        }
    }
}

/// Command line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverride {
    pub input_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub libraries: Option<Vec<String>>,
}

impl BenchConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> BenchResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn apply(mut self, over: ConfigOverride) -> Self {
        if let Some(dir) = over.input_dir {
            self.input_dir = dir;
        }
        if let Some(output) = over.output {
            self.output = output;
        }
        if let Some(dir) = over.log_dir {
            self.log_dir = dir;
        }
        if let Some(libs) = over.libraries.filter(|l| !l.is_empty()) {
            self.libraries = Some(libs);
        }
        self
    }
}
