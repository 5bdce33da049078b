use crate::inventory::Inventory;
use std::fmt;

/// Outcome of one adapter's pass over the inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterResult {
    pub library: String,
    pub duration_seconds: f64,
    pub rows_read: u64,
    /// Files that raised an error; they still count toward files processed.
    pub failed_files: usize,
}

/// Adapters ranked fastest first.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub entries: Vec<AdapterResult>,
    pub files_processed: usize,
    pub total_size_bytes: u64,
}

/// One line of the persisted results table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub library: String,
    pub duration_seconds: f64,
    pub rows_read: u64,
    pub files_processed: u64,
    pub total_size: String,
}

impl BenchmarkReport {
    pub fn from_results(mut results: Vec<AdapterResult>, inventory: &Inventory) -> Self {
        // sort_by is stable: equal durations keep registration order
        results.sort_by(|a, b| a.duration_seconds.total_cmp(&b.duration_seconds));
        Self {
            entries: results,
            files_processed: inventory.len(),
            total_size_bytes: inventory.total_size_bytes(),
        }
    }

    pub fn total_size(&self) -> String {
        format_size(self.total_size_bytes)
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        let total_size = self.total_size();
        self.entries
            .iter()
            .map(|e| ReportRow {
                library: e.library.clone(),
                duration_seconds: e.duration_seconds,
                rows_read: e.rows_read,
                files_processed: self.files_processed as u64,
                total_size: total_size.clone(),
            })
            .collect()
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance Summary (Fastest to Slowest):")?;
        writeln!(
            f,
            "Total files: {}, Total size: {}",
            self.files_processed,
            self.total_size()
        )?;
        for entry in &self.entries {
            writeln!(
                f,
                "{}: {:.2} seconds, {} rows read",
                entry.library, entry.duration_seconds, entry.rows_read
            )?;
        }
        Ok(())
    }
}

/// Human-readable size: base 1024, two decimals, capped at GB.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}
