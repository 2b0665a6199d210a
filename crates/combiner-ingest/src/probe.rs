//! Layout Prober (spec §4.2).
//!
//! Classifies an extracted pack root as base/mod and infers the
//! well-known sub-locations, tolerating two nesting conventions and
//! "mod-shape" roots.

use combiner_core::pack::Locations;
use std::path::{Path, PathBuf};

pub struct ProbeResult {
    pub is_base: bool,
    pub is_mod: bool,
    pub locations: Locations,
}

/// Probe `root` for the conventional Cobblemon-pack sub-locations.
pub fn probe(root: &Path) -> ProbeResult {
    let is_base = classify_base(root);
    let is_mod = root.join("LICENSE").exists() || root.join("fabric.mod.json").exists();

    let assets_root = find_assets_root(root, is_base);
    let data_root = find_data_root(root);

    let mut locations = Locations::default();

    if let Some(assets) = &assets_root {
        let bedrock_dirs = find_bedrock_dirs(assets);
        for dir in &bedrock_dirs {
            collect_json_files(&dir.join("animations"), &mut locations.animations);
            collect_json_files(&dir.join("models"), &mut locations.models);
            collect_json_files(&dir.join("posers"), &mut locations.posers);
            let resolvers_dir = if dir.join("resolvers").is_dir() {
                dir.join("resolvers")
            } else {
                dir.join("species")
            };
            collect_json_files(&resolvers_dir, &mut locations.resolvers);
        }
        for ns_dir in namespace_dirs(assets) {
            collect_json_files(&ns_dir.join("lang"), &mut locations.lang);
            collect_all_files(&ns_dir.join("textures/pokemon"), &mut locations.textures);
            collect_all_files(&ns_dir.join("sounds/pokemon"), &mut locations.sounds);
            let sj = ns_dir.join("sounds.json");
            if sj.is_file() {
                locations.sounds_json = Some(sj);
            }
        }
    }

    if let Some(data) = &data_root {
        let mut sub_roots = vec![data.join("cobblemon")];
        if !sub_roots[0].is_dir() {
            sub_roots = subdirectories(data);
        }
        for sub in &sub_roots {
            collect_json_files(&sub.join("species"), &mut locations.species);
            collect_json_files(&sub.join("species_additions"), &mut locations.species_additions);
            collect_json_files(&sub.join("spawn_pool_world"), &mut locations.spawn_pool_world);
            collect_json_files(&sub.join("species_features"), &mut locations.species_features);
            collect_json_files(
                &sub.join("species_feature_assignments"),
                &mut locations.species_feature_assignments,
            );
        }
    }

    ProbeResult {
        is_base,
        is_mod,
        locations,
    }
}

/// spec §4.2: base when (a) no `assets/`/`data/` but `common/` exists, or
/// (b) `LICENSE` + a `*cobblemon-common*` file, or (c) `fabric.mod.json`
/// declares id `cobblemon`.
fn classify_base(root: &Path) -> bool {
    let no_assets_or_data = !root.join("assets").exists() && !root.join("data").exists();
    if no_assets_or_data && root.join("common").is_dir() {
        return true;
    }
    if root.join("LICENSE").exists() && has_file_matching(root, "cobblemon-common") {
        return true;
    }
    if let Ok(text) = std::fs::read_to_string(root.join("fabric.mod.json")) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
            if value.get("id").and_then(|v| v.as_str()) == Some("cobblemon") {
                return true;
            }
        }
    }
    false
}

fn has_file_matching(root: &Path, needle: &str) -> bool {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .any(|e| {
            e.file_name()
                .to_str()
                .map(|n| n.contains(needle))
                .unwrap_or(false)
        })
}

fn find_assets_root(root: &Path, is_base: bool) -> Option<PathBuf> {
    if is_base && !root.join("assets").exists() {
        let pivot = root.join("common/src/main/resources");
        if pivot.join("assets").is_dir() {
            return Some(pivot.join("assets"));
        }
    }
    let assets = root.join("assets");
    assets.is_dir().then_some(assets)
}

fn find_data_root(root: &Path) -> Option<PathBuf> {
    if root.join("data").is_dir() {
        return Some(root.join("data"));
    }
    let pivot = root.join("common/src/main/resources/data");
    pivot.is_dir().then_some(pivot)
}

fn namespace_dirs(assets_root: &Path) -> Vec<PathBuf> {
    subdirectories(assets_root)
}

fn subdirectories(root: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(root)
        .into_iter()
        .flatten()
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect()
}

/// `assets/*/bedrock[/pokemon]` — either convention.
fn find_bedrock_dirs(assets_root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for ns in namespace_dirs(assets_root) {
        let bedrock = ns.join("bedrock");
        if !bedrock.is_dir() {
            continue;
        }
        let pokemon = bedrock.join("pokemon");
        if pokemon.is_dir() {
            dirs.push(pokemon);
        } else {
            dirs.push(bedrock);
        }
    }
    dirs
}

fn collect_json_files(dir: &Path, into: &mut std::collections::BTreeSet<PathBuf>) {
    if !dir.is_dir() {
        return;
    }
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
            into.insert(path.to_path_buf());
        }
    }
}

fn collect_all_files(dir: &Path, into: &mut std::collections::BTreeSet<PathBuf>) {
    if !dir.is_dir() {
        return;
    }
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if entry.path().is_file() {
            into.insert(entry.path().to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn probes_standard_data_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("data/cobblemon/species")).unwrap();
        fs::write(root.join("data/cobblemon/species/pikachu.json"), "{}").unwrap();
        fs::create_dir_all(root.join("assets/cobblemon/lang")).unwrap();
        fs::write(root.join("assets/cobblemon/lang/en_us.json"), "{}").unwrap();

        let result = probe(root);
        assert_eq!(result.locations.species.len(), 1);
        assert_eq!(result.locations.lang.len(), 1);
    }

    #[test]
    fn classifies_mod_by_license_or_fabric_json() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("fabric.mod.json"), r#"{"id":"some_mod"}"#).unwrap();
        let result = probe(tmp.path());
        assert!(result.is_mod);
        assert!(!result.is_base);
    }

    #[test]
    fn classifies_base_via_fabric_mod_id() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("fabric.mod.json"), r#"{"id":"cobblemon"}"#).unwrap();
        let result = probe(tmp.path());
        assert!(result.is_base);
    }

    #[test]
    fn falls_back_to_any_subdir_when_cobblemon_namespace_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("data/mymod/species")).unwrap();
        fs::write(root.join("data/mymod/species/eevee.json"), "{}").unwrap();

        let result = probe(root);
        assert_eq!(result.locations.species.len(), 1);
    }
}
