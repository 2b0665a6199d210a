//! Working-directory orchestration (spec §4.14, §6 "Working-directory
//! contract").

use combiner_core::error::{CombinerError, Result};
use std::path::{Path, PathBuf};

const LOAD_ORDER_FILE: &str = "_load_order.json";

/// One pack as discovered in the working directory, before extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSource {
    pub display_name: String,
    pub source_path: PathBuf,
}

/// Pack display name: directory name for a directory-pack, archive stem
/// for an archive-pack (spec §6).
fn display_name_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("pack")
        .to_string()
}

fn enumerate_candidates(working_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    let entries = std::fs::read_dir(working_dir).map_err(|source| CombinerError::Io {
        path: working_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| CombinerError::Io {
            path: working_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.file_name().and_then(|n| n.to_str()) == Some(LOAD_ORDER_FILE) {
            continue;
        }
        let is_pack = path.is_dir()
            || matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("zip") | Some("jar")
            );
        if is_pack {
            candidates.push(path);
        }
    }
    Ok(candidates)
}

/// Enumerate every `*.zip`/`*.jar`/subdirectory in `working_dir`, ordered
/// per `_load_order.json` when present: named packs come first in the
/// declared order, unknown names are warned about (returned separately),
/// and packs missing from the file are appended deterministically
/// (alphabetically by display name) at the end.
pub fn discover_packs(working_dir: &Path) -> Result<(Vec<PackSource>, Vec<String>)> {
    let candidates = enumerate_candidates(working_dir)?;
    let mut by_name: std::collections::BTreeMap<String, PathBuf> = candidates
        .into_iter()
        .map(|p| (display_name_for(&p), p))
        .collect();

    let load_order_path = working_dir.join(LOAD_ORDER_FILE);
    let mut ordered = Vec::new();
    let mut unknown_names = Vec::new();

    if load_order_path.is_file() {
        let bag = combiner_core::schema::read_json(&load_order_path)?;
        for name in bag.str_array() {
            match by_name.remove(&name) {
                Some(path) => ordered.push(PackSource {
                    display_name: name,
                    source_path: path,
                }),
                None => unknown_names.push(name),
            }
        }
    }

    for (name, path) in by_name {
        ordered.push(PackSource {
            display_name: name,
            source_path: path,
        });
    }

    Ok((ordered, unknown_names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_directories_and_archives() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("PackOne")).unwrap();
        fs::write(tmp.path().join("packtwo.zip"), []).unwrap();

        let (packs, unknown) = discover_packs(tmp.path()).unwrap();
        assert_eq!(unknown.len(), 0);
        let names: Vec<_> = packs.iter().map(|p| p.display_name.clone()).collect();
        assert!(names.contains(&"PackOne".to_string()));
        assert!(names.contains(&"packtwo".to_string()));
    }

    #[test]
    fn load_order_file_orders_known_packs_and_reports_unknown() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("A")).unwrap();
        fs::create_dir(tmp.path().join("B")).unwrap();
        fs::write(tmp.path().join("_load_order.json"), r#"["B", "Ghost"]"#).unwrap();

        let (packs, unknown) = discover_packs(tmp.path()).unwrap();
        assert_eq!(packs[0].display_name, "B");
        assert_eq!(packs[1].display_name, "A");
        assert_eq!(unknown, vec!["Ghost".to_string()]);
    }
}
