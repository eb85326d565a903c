//! Filesystem helpers shared by the pipeline and the CLI.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_directory_exists(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        info!("Created directory: {}", dir.display());
    }
    Ok(())
}

/// Files directly inside `dir` whose name ends with `extension`.
///
/// The match is case-insensitive and the leading dot is optional, so `"pdf"`
/// and `".PDF"` select the same files. A missing directory yields an empty
/// list. Results are sorted by path.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        warn!("Directory not found: {}", dir.display());
        return Ok(vec![]);
    }

    let suffix = normalize_extension(extension).to_lowercase();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.ends_with(&suffix) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Output path derived from `input`: same stem, optionally a new extension,
/// placed in `output_dir` (created when missing) or next to the input.
pub fn output_path_for(
    input: &Path,
    output_dir: Option<&Path>,
    new_extension: Option<&str>,
) -> Result<PathBuf> {
    let stem = document_id_for(input)?;
    let extension = match new_extension {
        Some(ext) => normalize_extension(ext),
        None => input
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default(),
    };
    let file_name = format!("{stem}{extension}");

    match output_dir {
        Some(dir) => {
            ensure_directory_exists(dir)?;
            Ok(dir.join(file_name))
        }
        None => Ok(input.with_file_name(file_name)),
    }
}

/// Document identifier for a source file: its file stem.
pub fn document_id_for(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .with_context(|| format!("Path has no file name: {}", path.display()))
}

fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}
