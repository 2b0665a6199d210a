//! Wires the MERGE-mode resolution engine (`combiner_resolve::merge`) to a
//! concrete output tree.
//!
//! The engine itself only computes values (spec §4.12); this module is the
//! glue that decides where those values land. Spawn pools are always
//! unioned across every contributing pack (step a is unconditional); the
//! composed species document folds every contributing pack's addition,
//! with exactly one pack's *graphics* (resolvers/models/posers/textures)
//! carried through the ordinary file-move export for the chosen pack via
//! [`combiner_core::entity::Entity::graphics_export_paths`], which
//! deliberately excludes species/spawn data. Every contributing pack's
//! original species/spawn files, including the picked pack's, become
//! residue, since their content is now represented in the two files this
//! module writes directly — recorded as an Open Question decision in
//! DESIGN.md.

use anyhow::Result;
use combiner_core::config::Settings;
use combiner_core::pack::Pack;
use combiner_resolve::{merge, Chooser};
use std::collections::BTreeSet;
use std::path::Path;

pub fn run_merge(packs: &mut [Pack], settings: &Settings, chooser: &mut dyn Chooser, output_root: &Path) -> Result<()> {
    let entity_names: BTreeSet<String> = packs
        .iter()
        .filter(|p| !p.is_base && (!p.is_mod || settings.process_mods))
        .flat_map(|p| p.entities.keys().cloned())
        .collect();

    for entity_name in entity_names {
        resolve_one_entity(packs, &entity_name, settings, chooser, output_root)?;
    }
    Ok(())
}

fn resolve_one_entity(
    packs: &mut [Pack],
    entity_name: &str,
    settings: &Settings,
    chooser: &mut dyn Chooser,
    output_root: &Path,
) -> Result<()> {
    let common_base = merge::common_base(packs, entity_name, settings.species_strict_key_match);

    let contributing: Vec<usize> = packs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.entity(entity_name).is_some())
        .map(|(i, _)| i)
        .collect();
    if contributing.is_empty() {
        return Ok(());
    }

    let choice_idxs: Vec<usize> = merge::choice_options(packs, entity_name)
        .into_iter()
        .filter_map(|name| packs.iter().position(|p| p.name == name))
        .collect();

    let pick_idx = match choice_idxs.len() {
        0 => None,
        1 => Some(choice_idxs[0]),
        _ => {
            let candidates: Vec<combiner_resolve::Candidate> = choice_idxs
                .iter()
                .map(|&i| combiner_resolve::Candidate {
                    pack_name: packs[i].name.clone(),
                    is_base: packs[i].is_base,
                    is_mod: packs[i].is_mod,
                })
                .collect();
            let chosen_name = chooser.pick(entity_name, &candidates);
            packs.iter().position(|p| p.name == chosen_name)
        }
    };

    let mut non_pick_additions = Vec::new();
    let mut pick_addition = None;
    let mut is_pseudoform = false;
    for &idx in &contributing {
        let Some(entity) = packs[idx].entity(entity_name) else {
            continue;
        };
        is_pseudoform = is_pseudoform || entity.is_pseudoform;
        let Some(species) = &entity.base_form().species else {
            continue;
        };
        let diff = merge::extract_additions(species.payload.as_value(), &common_base);
        if Some(idx) == pick_idx {
            pick_addition = Some(diff);
        } else {
            non_pick_additions.push(diff);
        }
    }

    let composed = merge::compose_final(
        &common_base,
        &non_pick_additions,
        pick_addition.as_ref(),
        settings.pokedex_fix,
        is_pseudoform,
        settings.exclude_pseudoforms,
        settings.combine_pokemon_moves,
    );

    let generation = packs
        .iter()
        .find(|p| p.entity(entity_name).is_some())
        .map(|p| p.generation_label(entity_name))
        .unwrap_or_else(|| "custom".to_string());
    let species_path = output_root
        .join("data/cobblemon/species")
        .join(&generation)
        .join(format!("{entity_name}.json"));
    combiner_core::schema::write_json_pretty(&species_path, &combiner_core::bag::Bag(composed))?;

    let spawns = merge::merge_spawns(packs, entity_name);
    let dex_id = contributing
        .iter()
        .filter_map(|&i| packs[i].entity(entity_name))
        .map(|e| e.dex_id.max(0))
        .max()
        .unwrap_or(0);
    let spawn_path = output_root
        .join("data/cobblemon/spawn_pool_world")
        .join(format!("{dex_id:04}_{entity_name}.json"));
    combiner_core::schema::write_json_pretty(&spawn_path, &combiner_core::bag::Bag(spawns))?;

    for &idx in &contributing {
        let pack_name = packs[idx].name.clone();
        let is_pick = Some(idx) == pick_idx;
        if let Some(entity) = packs[idx].entity_mut(entity_name) {
            entity.merge_pick = is_pick.then_some(pack_name);
        }
    }

    Ok(())
}
