//! Move exported files into the output tree, with collision renaming in
//! `species_additions`/`spawn_pool_world` (spec §4.13).

use combiner_core::error::{CombinerError, Result};
use combiner_core::loose::next_free_name;
use combiner_core::pack::Pack;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Move every path in `export_paths` (absolute, under `pack.extracted_root`)
/// to its mirrored location under `output_root`, creating parent
/// directories as needed.
///
/// `keep_duplicate_sas`/`keep_duplicate_spawns` gate the collision-rename
/// behavior for `species_additions`/`spawn_pool_world` destinations; when
/// off, a colliding destination is simply overwritten (last pack in load
/// order wins, matching the "later pack processed last" convention).
pub fn move_exports(
    pack: &Pack,
    export_paths: &BTreeSet<PathBuf>,
    output_root: &Path,
    keep_duplicate_sas: bool,
    keep_duplicate_spawns: bool,
) -> Result<()> {
    for source in export_paths {
        let Ok(relative) = source.strip_prefix(&pack.extracted_root) else {
            continue;
        };
        let mut dest = output_root.join(relative);

        let in_species_additions = relative
            .components()
            .any(|c| c.as_os_str() == "species_additions");
        let in_spawn_pool = relative
            .components()
            .any(|c| c.as_os_str() == "spawn_pool_world");
        let rename_on_collision = (in_species_additions && keep_duplicate_sas)
            || (in_spawn_pool && keep_duplicate_spawns);

        if dest.exists() {
            if rename_on_collision {
                dest = renamed_destination(&dest);
            } else {
                tracing::warn!(path = %dest.display(), "overwriting on export collision");
            }
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source_err| CombinerError::Io {
                path: parent.to_path_buf(),
                source: source_err,
            })?;
        }
        move_file(source, &dest)?;
    }
    Ok(())
}

/// `rename`, falling back to copy-then-remove across filesystem boundaries.
fn move_file(source: &Path, dest: &Path) -> Result<()> {
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }
    fs::copy(source, dest).map_err(|source_err| CombinerError::Io {
        path: dest.to_path_buf(),
        source: source_err,
    })?;
    fs::remove_file(source).map_err(|source_err| CombinerError::Io {
        path: source.to_path_buf(),
        source: source_err,
    })
}

/// Rename `dest`'s file stem via `NextCandidateName` until the destination
/// is free.
fn renamed_destination(dest: &Path) -> PathBuf {
    let parent = dest.parent().unwrap_or_else(|| Path::new(""));
    let extension = dest.extension().and_then(|e| e.to_str());
    let stem = dest
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string();

    let candidate_name = next_free_name(&stem, |candidate| {
        let candidate_path = match extension {
            Some(ext) => parent.join(format!("{candidate}.{ext}")),
            None => parent.join(candidate),
        };
        candidate_path.exists()
    });

    match extension {
        Some(ext) => parent.join(format!("{candidate_name}.{ext}")),
        None => parent.join(candidate_name),
    }
}
