//! Batch loading of stats files from disk into decoded `FileRecords`.
//!
//! With a single explicit path any failure is returned; with a glob pattern
//! a failing file is logged and skipped so one bad upload cannot sink a
//! whole day's batch.

use std::fs;
use std::path::{Path, PathBuf};

use crate::decoder::decode_file;
use crate::error::LoadError;
use crate::log;
use crate::types::{FileRecords, StatsFileName};

fn load_one(path: &Path) -> Result<FileRecords, LoadError> {
    let base_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let file = StatsFileName::parse(base_name).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    decode_file(file, &contents).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every stats file matched by `pattern` (a glob, or one literal path).
///
/// Results come back in glob order; callers hand them straight to
/// `assemble_matches`.
pub fn load_files(pattern: &str) -> Result<Vec<FileRecords>, LoadError> {
    let paths: Vec<PathBuf> = if pattern.contains('*') || pattern.contains('?') {
        glob::glob(pattern)
            .map_err(|source| LoadError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(err) => {
                    log::unreadable_glob_entry(&err);
                    None
                }
            })
            .collect()
    } else {
        vec![PathBuf::from(pattern)]
    };

    let single_path = paths.len() == 1;
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_one(path) {
            Ok(file) => files.push(file),
            Err(err) if single_path => return Err(err),
            Err(err) => log::skipped_file(&err),
        }
    }

    Ok(files)
}
