//! Reading log batches from disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

/// Expand `paths` into the files to read, in order.
///
/// Files are taken as given. A directory contributes its regular files
/// (not subdirectories), sorted by name.
pub fn collect_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = Vec::new();
            for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
                let entry = entry.with_context(|| format!("reading directory {}", path.display()))?;
                if entry.file_type().is_file() {
                    entries.push(entry.into_path());
                }
            }
            files.extend(entries);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", path.display());
        }
    }
    Ok(files)
}

/// Split raw bytes into lines, each keeping its trailing `\n`.
/// A final segment without a terminator is a line too.
pub fn split_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
    bytes
        .split_inclusive(|b| *b == b'\n')
        .map(<[u8]>::to_vec)
        .collect()
}

pub fn read_lines(path: &Path) -> anyhow::Result<Vec<Vec<u8>>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(split_lines(&bytes))
}

/// All lines of all files under `paths`, in batch order.
pub fn read_batch(paths: &[PathBuf]) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut lines = Vec::new();
    for file in collect_files(paths)? {
        let file_lines = read_lines(&file)?;
        tracing::debug!(file = %file.display(), lines = file_lines.len(), "read log file");
        lines.extend(file_lines);
    }
    Ok(lines)
}
