//! Species Graph Builder (spec §4.5).

use crate::walk;
use combiner_core::bag::Bag;
use combiner_core::entity::{Entity, Form, SourceRef};
use combiner_core::error::Result;
use combiner_core::evolution::EvolutionEdge;
use combiner_core::pack::Pack;
use std::path::Path;

pub fn build_species_graph(pack: &mut Pack, show_warnings: bool) -> Result<()> {
    let species = pack.locations.species.clone();
    walk::for_each_json(
        &species,
        |path, bag| build_from_species_file(pack, path, bag),
        |path, err| {
            if show_warnings {
                tracing::warn!("--! {}: {err}", path.display());
            }
        },
    );

    let additions = pack.locations.species_additions.clone();
    walk::for_each_json(
        &additions,
        |path, bag| apply_species_additions(pack, path, bag),
        |path, err| {
            if show_warnings {
                tracing::warn!("--! {}: {err}", path.display());
            }
        },
    );

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn build_from_species_file(pack: &mut Pack, path: &Path, bag: Bag) {
    let internal_name = file_stem(path);
    let display_name = bag.get("name").str_or(&internal_name);
    let dex_id = bag.get("nationalPokedexNumber").i64_or(-1);

    let mut entity = Entity::new(internal_name.clone(), display_name, dex_id);
    entity.feature_names.extend(bag.get("features").str_array());
    {
        let base = entity.base_form_mut();
        base.aspects = bag.get("aspects").str_array();
        base.species = Some(SourceRef::new(path.to_path_buf(), bag.clone()));
    }

    for form_bag in bag.get("forms").array() {
        let name = form_bag.get("name").str_or("");
        if name.is_empty() {
            continue;
        }
        let idx = entity.get_or_create_form(&name);
        let form = &mut entity.forms[idx];
        form.aspects = form_bag.get("aspects").str_array();
        form.species = Some(SourceRef::new(path.to_path_buf(), form_bag.clone()));
        register_evolutions(pack, &internal_name_of(&entity), &form_bag, path, false);
    }

    register_evolutions(pack, &entity.internal_name, &bag, path, false);

    pack.entities.insert(entity.internal_name.clone(), entity);
}

fn internal_name_of(entity: &Entity) -> String {
    entity.internal_name.clone()
}

/// Register `evolutions[*].result` and `preEvolution`, per spec §4.5.
fn register_evolutions(pack: &mut Pack, from_name: &str, bag: &Bag, source_path: &Path, is_addition: bool) {
    for evo in bag.get("evolutions").array() {
        let result = evo.get("result").str_or("");
        if !result.is_empty() {
            pack.evolutions.push(EvolutionEdge {
                from_name: from_name.to_string(),
                to_name: base_name(&result),
                source_path: source_path.to_path_buf(),
                is_addition,
            });
        }
    }
    let pre = bag.get("preEvolution").str_or("");
    if !pre.is_empty() {
        pack.evolutions.push(EvolutionEdge {
            from_name: base_name(&pre),
            to_name: from_name.to_string(),
            source_path: source_path.to_path_buf(),
            is_addition,
        });
    }
}

/// Evolution targets are occasionally namespaced (`cobblemon:eevee`); keep
/// only the final segment, mirroring the `target` resolution rule used for
/// species-additions (spec §4.5 additions pass).
fn base_name(raw: &str) -> String {
    raw.rsplit(':').next().unwrap_or(raw).to_string()
}

fn apply_species_additions(pack: &mut Pack, path: &Path, bag: Bag) {
    let target_raw = bag.get("target").str_or("");
    let target = base_name(&target_raw);
    if target.is_empty() {
        return;
    }

    if !pack.entities.contains_key(&target) {
        pack.get_or_create_entity(&target);
    }

    register_evolutions(pack, &target, &bag, path, true);

    let entity = pack.entities.get_mut(&target).unwrap();
    entity.feature_names.extend(bag.get("features").str_array());
    {
        let base = entity.base_form_mut();
        base.species_additions = Some(SourceRef::new(path.to_path_buf(), bag.clone()));
    }

    for form_bag in bag.get("forms").array() {
        let name = form_bag.get("name").str_or("");
        if name.is_empty() {
            continue;
        }
        let idx = entity.get_or_create_form(&name);
        let form = &mut entity.forms[idx];
        if form.aspects.is_empty() {
            form.aspects = form_bag.get("aspects").str_array();
        }
        form.species_additions = Some(SourceRef::new(path.to_path_buf(), form_bag.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn builds_entity_and_base_form_from_species_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pikachu.json");
        fs::write(
            &path,
            r#"{"name":"Pikachu","nationalPokedexNumber":25,"aspects":["rat"]}"#,
        )
        .unwrap();

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.species.insert(path.clone());
        build_species_graph(&mut pack, true).unwrap();

        let entity = pack.entity("pikachu").unwrap();
        assert_eq!(entity.display_name, "Pikachu");
        assert_eq!(entity.dex_id, 25);
        assert_eq!(entity.base_form().aspects, vec!["rat".to_string()]);
        assert!(entity.base_form().species.is_some());
    }

    #[test]
    fn builds_named_forms_and_evolutions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("eevee.json");
        fs::write(
            &path,
            r#"{"name":"Eevee","nationalPokedexNumber":133,
               "evolutions":[{"result":"vaporeon"}],
               "forms":[{"name":"Shiny","aspects":["shiny"]}]}"#,
        )
        .unwrap();

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.species.insert(path);
        build_species_graph(&mut pack, true).unwrap();

        let entity = pack.entity("eevee").unwrap();
        assert!(entity.find_form("shiny").is_some());
        assert_eq!(pack.evolutions.len(), 1);
        assert_eq!(pack.evolutions[0].from_name, "eevee");
        assert_eq!(pack.evolutions[0].to_name, "vaporeon");
        assert!(!pack.evolutions[0].is_addition);
    }

    #[test]
    fn species_file_features_populate_feature_names() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pikachu.json");
        fs::write(&path, r#"{"name":"Pikachu","features":["region","legendary"]}"#).unwrap();

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.species.insert(path);
        build_species_graph(&mut pack, true).unwrap();

        let entity = pack.entity("pikachu").unwrap();
        assert!(entity.feature_names.contains("region"));
        assert!(entity.feature_names.contains("legendary"));
    }

    #[test]
    fn additions_features_are_unioned_into_existing_feature_names() {
        let tmp = tempfile::tempdir().unwrap();
        let species_path = tmp.path().join("tauros.json");
        fs::write(&species_path, r#"{"name":"Tauros","features":["region"]}"#).unwrap();
        let addition_path = tmp.path().join("tauros_addition.json");
        fs::write(&addition_path, r#"{"target":"tauros","features":["paldean"]}"#).unwrap();

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.species.insert(species_path);
        pack.locations.species_additions.insert(addition_path);
        build_species_graph(&mut pack, true).unwrap();

        let entity = pack.entity("tauros").unwrap();
        assert!(entity.feature_names.contains("region"));
        assert!(entity.feature_names.contains("paldean"));
    }

    #[test]
    fn additions_synthesize_entity_when_target_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("addition.json");
        fs::write(&path, r#"{"target":"cobblemon:tauros"}"#).unwrap();

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.species_additions.insert(path);
        build_species_graph(&mut pack, true).unwrap();

        let entity = pack.entity("tauros").unwrap();
        assert!(entity.base_form().species_additions.is_some());
        assert_eq!(entity.dex_id, -1);
    }
}
