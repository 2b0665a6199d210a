//! Delete-path cleanup and residue repackaging (spec §4.13).

use combiner_core::error::{CombinerError, Result};
use combiner_core::pack::Pack;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Unlink every path in `delete_paths`, then recursively prune directories
/// left empty by the deletion. Permission errors downgrade to a warning
/// per spec §5's shared-resource policy rather than aborting the run.
pub fn delete_and_prune(delete_paths: &BTreeSet<PathBuf>, extracted_root: &Path) {
    for path in delete_paths {
        if let Err(err) = fs::remove_file(path) {
            tracing::warn!(
                path = %path.display(),
                error = %CombinerError::DeletePermission {
                    path: path.clone(),
                    reason: err.to_string(),
                },
                "could not delete residue file"
            );
        }
    }
    prune_empty_dirs(extracted_root);
}

fn prune_empty_dirs(root: &Path) {
    if !root.is_dir() {
        return;
    }
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    let mut children: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    children.sort();
    for child in &children {
        if child.is_dir() {
            prune_empty_dirs(child);
        }
    }
    if fs::read_dir(root).map(|mut it| it.next().is_none()).unwrap_or(false) {
        let _ = fs::remove_dir(root);
    }
}

/// Anything still left under `pack.extracted_root` once exports were moved
/// and deletions applied, minus `pack.mcmeta`/`pack.png`, repackaged as
/// `[CE]_<packname>.zip` next to `output_root`.
pub fn repackage_residue(pack: &Pack, output_root: &Path) -> Result<Option<PathBuf>> {
    let root = &pack.extracted_root;
    if !root.is_dir() {
        return Ok(None);
    }

    let mut entries: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| {
            !matches!(
                p.file_name().and_then(|n| n.to_str()),
                Some("pack.mcmeta") | Some("pack.png")
            )
        })
        .collect();
    entries.sort();

    if entries.is_empty() {
        return Ok(None);
    }

    let parent = output_root.parent().unwrap_or(output_root);
    let zip_path = parent.join(format!("[CE]_{}.zip", pack.name));
    let file = fs::File::create(&zip_path).map_err(|source| CombinerError::Io {
        path: zip_path.clone(),
        source,
    })?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in &entries {
        let relative = entry.strip_prefix(root).unwrap_or(entry);
        writer
            .start_file(relative.to_string_lossy(), options)
            .map_err(|err| CombinerError::ExtractionFailed {
                source_path: zip_path.clone(),
                reason: err.to_string(),
            })?;
        let bytes = fs::read(entry).map_err(|source| CombinerError::Io {
            path: entry.clone(),
            source,
        })?;
        writer.write_all(&bytes).map_err(|source| CombinerError::Io {
            path: zip_path.clone(),
            source,
        })?;
    }
    writer.finish().map_err(|err| CombinerError::ExtractionFailed {
        source_path: zip_path.clone(),
        reason: err.to_string(),
    })?;

    Ok(Some(zip_path))
}
