//! Archive Extractor (spec §4.1).
//!
//! Opens a ZIP/JAR into a temp working directory, or shallow-copies a
//! directory in place. Idempotent for a given source.

use combiner_core::error::{CombinerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Filenames ignored during the extraction cleanup pass (spec §4.1, §5).
const IGNORED_NAMES: &[&str] = &["__MACOSX", ".DS_Store", "desktop.ini"];

fn is_ignored(name: &str) -> bool {
    IGNORED_NAMES.contains(&name) || name.starts_with("README")
}

/// Extract `source` (a `.zip`/`.jar` file, or a directory) under
/// `extraction_root`, returning the path to the extracted root.
///
/// Re-running with the same `source` and `extraction_root` overwrites into
/// the same target (idempotent).
pub fn extract_source(source: &Path, extraction_root: &Path) -> Result<PathBuf> {
    if !source.exists() {
        return Err(CombinerError::SourceMissing(source.to_path_buf()));
    }

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("pack")
        .to_string();
    let target = extraction_root.join(&stem);

    if source.is_dir() {
        copy_directory(source, &target)?;
    } else {
        extract_archive(source, &target)?;
    }

    Ok(target)
}

fn extract_archive(source: &Path, target: &Path) -> Result<()> {
    let file = fs::File::open(source).map_err(|err| CombinerError::ExtractionFailed {
        source_path: source.to_path_buf(),
        reason: err.to_string(),
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|err| CombinerError::ExtractionFailed {
        source_path: source.to_path_buf(),
        reason: err.to_string(),
    })?;

    fs::create_dir_all(target).map_err(|err| CombinerError::ExtractionFailed {
        source_path: source.to_path_buf(),
        reason: err.to_string(),
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|err| CombinerError::ExtractionFailed {
            source_path: source.to_path_buf(),
            reason: err.to_string(),
        })?;
        let Some(entry_path) = entry.enclosed_name() else {
            continue;
        };
        if entry_path
            .components()
            .any(|c| is_ignored(&c.as_os_str().to_string_lossy()))
        {
            continue;
        }
        let out_path = target.join(entry_path);
        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|err| CombinerError::ExtractionFailed {
                source_path: source.to_path_buf(),
                reason: err.to_string(),
            })?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|err| CombinerError::ExtractionFailed {
                    source_path: source.to_path_buf(),
                    reason: err.to_string(),
                })?;
            }
            let mut out_file =
                fs::File::create(&out_path).map_err(|err| CombinerError::ExtractionFailed {
                    source_path: source.to_path_buf(),
                    reason: err.to_string(),
                })?;
            std::io::copy(&mut entry, &mut out_file).map_err(|err| CombinerError::ExtractionFailed {
                source_path: source.to_path_buf(),
                reason: err.to_string(),
            })?;
        }
    }

    Ok(())
}

fn copy_directory(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target).map_err(|err| CombinerError::ExtractionFailed {
        source_path: source.to_path_buf(),
        reason: err.to_string(),
    })?;

    for entry in walkdir::WalkDir::new(source) {
        let entry = entry.map_err(|err| CombinerError::ExtractionFailed {
            source_path: source.to_path_buf(),
            reason: err.to_string(),
        })?;
        if entry
            .path()
            .components()
            .any(|c| is_ignored(&c.as_os_str().to_string_lossy()))
        {
            continue;
        }
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let dest = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|err| CombinerError::ExtractionFailed {
                source_path: source.to_path_buf(),
                reason: err.to_string(),
            })?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|err| CombinerError::ExtractionFailed {
                    source_path: source.to_path_buf(),
                    reason: err.to_string(),
                })?;
            }
            fs::copy(entry.path(), &dest).map_err(|err| CombinerError::ExtractionFailed {
                source_path: source.to_path_buf(),
                reason: err.to_string(),
            })?;
        }
    }

    Ok(())
}
