//! Enumerates the input files a benchmark run reads.

use crate::errors::{BenchError, BenchResult};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A candidate input file and its size at listing time.
///
/// `name` is for display and may be lossy; `file_name` is the exact name
/// on disk and is what [`Inventory::resolve`] joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub size_bytes: u64,
    file_name: OsString,
}

impl FileRecord {
    pub fn new(file_name: impl Into<OsString>, size_bytes: u64) -> Self {
        let file_name = file_name.into();
        Self {
            name: file_name.to_string_lossy().into_owned(),
            size_bytes,
            file_name,
        }
    }

    pub fn file_name(&self) -> &std::ffi::OsStr {
        &self.file_name
    }
}

/// The files of one run, shared read-only by every adapter.
#[derive(Debug, Clone)]
pub struct Inventory {
    dir: PathBuf,
    files: Vec<FileRecord>,
}

impl Inventory {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    pub fn resolve(&self, record: &FileRecord) -> PathBuf {
        self.dir.join(&record.file_name)
    }
}

/// List regular files in `dir` whose extension is one of `extensions`.
///
/// Matching ignores case. Files come back sorted by name. A directory with
/// no matching files yields an empty inventory; deciding whether that is
/// fatal is left to the caller.
pub fn scan<P: AsRef<Path>>(dir: P, extensions: &[String]) -> BenchResult<Inventory> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(BenchError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !has_extension(&path, extensions) {
            continue;
        }
        // follows symlinks, so a linked CSV counts as the file it points to
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping unreadable entry {:?}: {}", path, e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        files.push(FileRecord::new(entry.file_name(), metadata.len()));
    }
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(Inventory {
        dir: dir.to_path_buf(),
        files,
    })
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext)),
        None => false,
    }
}
