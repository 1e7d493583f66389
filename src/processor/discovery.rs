//! Measurement file discovery
//!
//! Lists the logger files of a deployment directory. Only the top level is
//! scanned; files are returned sorted by file name so runs are repeatable.

use crate::error::{DoError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Find measurement files with `extension` (case-insensitive) in `directory`
pub async fn discover_measurement_files(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !fs::try_exists(directory).await.unwrap_or(false) {
        return Err(DoError::DirectoryNotFound {
            path: directory.to_path_buf(),
        });
    }

    debug!(
        "Searching for .{} files in: {}",
        extension,
        directory.display()
    );

    let mut files = Vec::new();
    let mut dir = fs::read_dir(directory)
        .await
        .map_err(|e| DoError::file_io(directory, e))?;

    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| DoError::file_io(directory, e))?
    {
        let path = entry.path();
        if entry.file_type().await?.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} measurement files", files.len());

    if files.is_empty() {
        return Err(DoError::EmptyBatch {
            directory: directory.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    Ok(files)
}

/// Check if a path has the given extension, ignoring case
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
