//! Exporter: moves selected files into the output tree, repackages
//! unselected-but-non-empty residue per pack, and emits combined lang,
//! sounds, and metadata (spec §4.13).

pub mod combine;
pub mod meta;
pub mod mover;
pub mod paths;
pub mod residue;

use combiner_core::config::Settings;
use combiner_core::error::Result;
use combiner_core::pack::Pack;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything the Exporter produced for one run.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub output_root: PathBuf,
    pub archive_path: Option<PathBuf>,
    pub residue_archives: Vec<PathBuf>,
}

/// Run the full Exporter pipeline over every pack (spec §4.13): move
/// exports, delete residue files, repackage remaining residue, emit
/// combined lang/sounds/metadata, and compress the output tree.
pub fn export(packs: &[Pack], output_root: &Path, settings: &Settings) -> Result<ExportReport> {
    let mut report = ExportReport {
        output_root: output_root.to_path_buf(),
        ..ExportReport::default()
    };

    let processable: Vec<&Pack> = packs
        .iter()
        .filter(|p| !p.is_base && (!p.is_mod || settings.process_mods))
        .collect();

    let mut exported_entities = std::collections::BTreeSet::new();
    let mut entity_picks: BTreeMap<String, String> = BTreeMap::new();

    for pack in &processable {
        let export_paths = paths::export_paths(pack);
        let delete_paths = paths::delete_paths(pack, &export_paths);

        mover::move_exports(
            pack,
            &export_paths,
            output_root,
            settings.keep_duplicate_sas_on_move,
            settings.keep_duplicate_spawns_on_move,
        )?;
        residue::delete_and_prune(&delete_paths, &pack.extracted_root);
        if let Some(archive) = residue::repackage_residue(pack, output_root)? {
            report.residue_archives.push(archive);
        }

        for entity in pack.entities.values() {
            if entity.selected || entity.merge_pick.is_some() {
                exported_entities.insert(entity.internal_name.clone());
                entity_picks.insert(entity.internal_name.clone(), pack.name.clone());
            }
        }
    }

    let combined_lang = combine::combine_lang(packs, &exported_entities);
    for (basename, entries) in &combined_lang {
        let lang_doc = serde_json::Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        );
        combiner_core::schema::write_json_pretty(
            &output_root.join("assets/cobblemon/lang").join(basename),
            &combiner_core::bag::Bag(lang_doc),
        )?;
    }

    let combined_sounds = combine::combine_sounds(packs, &entity_picks);
    combiner_core::schema::write_json_pretty(
        &output_root.join("assets/cobblemon/sounds.json"),
        &combiner_core::bag::Bag(combined_sounds),
    )?;

    let contributing: Vec<String> = processable.iter().map(|p| p.name.clone()).collect();
    meta::emit_pack_mcmeta(output_root, &contributing)?;
    meta::emit_credits(output_root, &contributing)?;
    meta::emit_pack_png(packs, output_root)?;

    report.archive_path = Some(meta::compress_output(output_root)?);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use combiner_core::entity::Entity;

    #[test]
    fn export_skips_base_pack_and_non_processed_mods() {
        let tmp = tempfile::tempdir().unwrap();
        let base_root = tmp.path().join("base");
        std::fs::create_dir_all(&base_root).unwrap();
        let mut base = Pack::new("BASE", base_root);
        base.is_base = true;
        let mut entity = Entity::new("pikachu", "Pikachu", 25);
        entity.selected = true;
        base.entities.insert("pikachu".to_string(), entity);

        let output = tmp.path().join("output");
        let settings = Settings::default();
        let report = export(&[base], &output, &settings).unwrap();
        assert!(report.archive_path.is_some());
    }

    #[test]
    fn merge_picked_entity_does_not_move_its_raw_species_file_over_a_composed_one() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("output");

        let composed_path = output.join("data/cobblemon/species/gen1/pikachu.json");
        std::fs::create_dir_all(composed_path.parent().unwrap()).unwrap();
        std::fs::write(&composed_path, r#"{"name":"Pikachu","implemented":true}"#).unwrap();

        let pack_root = tmp.path().join("PackA");
        std::fs::create_dir_all(pack_root.join("data/cobblemon/species/gen1")).unwrap();
        let raw_species = pack_root.join("data/cobblemon/species/gen1/pikachu.json");
        std::fs::write(&raw_species, r#"{"name":"Pikachu","custom":true}"#).unwrap();

        let mut pack = Pack::new("PackA", pack_root);
        let mut entity = Entity::new("pikachu", "Pikachu", 25);
        entity.base_form_mut().species = Some(combiner_core::entity::SourceRef::new(
            raw_species,
            combiner_core::bag::Bag(serde_json::json!({"name": "Pikachu", "custom": true})),
        ));
        entity.merge_pick = Some("PackA".to_string());
        pack.entities.insert("pikachu".to_string(), entity);

        let settings = Settings::default();
        export(&[pack], &output, &settings).unwrap();

        let final_contents: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&composed_path).unwrap()).unwrap();
        assert_eq!(final_contents["implemented"], serde_json::json!(true));
        assert!(final_contents.get("custom").is_none());
    }
}
