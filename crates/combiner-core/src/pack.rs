//! A processed pack: the union of everything ingestion attached to it
//! (spec §3, §4.1–§4.10).

use crate::entity::Entity;
use crate::error::{CombinerError, Result};
use crate::evolution::EvolutionEdge;
use crate::feature::{Feature, FeatureAssignment};
use crate::lang::LangEntry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Probed sub-locations under a pack's extracted root (spec §4.2).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Locations {
    pub species: BTreeSet<PathBuf>,
    pub species_additions: BTreeSet<PathBuf>,
    pub spawn_pool_world: BTreeSet<PathBuf>,
    pub species_features: BTreeSet<PathBuf>,
    pub species_feature_assignments: BTreeSet<PathBuf>,
    pub resolvers: BTreeSet<PathBuf>,
    pub models: BTreeSet<PathBuf>,
    pub posers: BTreeSet<PathBuf>,
    pub animations: BTreeSet<PathBuf>,
    pub textures: BTreeSet<PathBuf>,
    pub sounds: BTreeSet<PathBuf>,
    pub sounds_json: Option<PathBuf>,
    pub lang: BTreeSet<PathBuf>,
}

impl Locations {
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
            && self.species_additions.is_empty()
            && self.spawn_pool_world.is_empty()
            && self.species_features.is_empty()
            && self.species_feature_assignments.is_empty()
            && self.resolvers.is_empty()
            && self.models.is_empty()
            && self.posers.is_empty()
            && self.animations.is_empty()
            && self.textures.is_empty()
            && self.sounds.is_empty()
            && self.sounds_json.is_none()
            && self.lang.is_empty()
    }
}

/// One source contribution — everything discovered, parsed, and bound
/// during ingestion for a single archive or directory (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pack {
    pub name: String,
    pub extracted_root: PathBuf,
    pub locations: Locations,
    pub is_base: bool,
    pub is_mod: bool,
    pub entities: BTreeMap<String, Entity>,
    pub features: BTreeMap<String, Feature>,
    pub feature_assignments: Vec<FeatureAssignment>,
    pub evolutions: Vec<EvolutionEdge>,
    pub lang_entries: Vec<LangEntry>,
}

impl Pack {
    pub fn new(name: impl Into<String>, extracted_root: PathBuf) -> Self {
        Self {
            name: name.into(),
            extracted_root,
            locations: Locations::default(),
            is_base: false,
            is_mod: false,
            entities: BTreeMap::new(),
            features: BTreeMap::new(),
            feature_assignments: Vec::new(),
            evolutions: Vec::new(),
            lang_entries: Vec::new(),
        }
    }

    pub fn entity(&self, internal_name: &str) -> Option<&Entity> {
        self.entities.get(internal_name)
    }

    pub fn entity_mut(&mut self, internal_name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(internal_name)
    }

    /// Get an entity by internal name or create a minimal one with
    /// `dex_id = -1` (spec §4.5, §4.6 step 4, §4.7 step 1).
    pub fn get_or_create_entity(&mut self, internal_name: &str) -> &mut Entity {
        self.entities
            .entry(internal_name.to_string())
            .or_insert_with(|| Entity::new(internal_name, internal_name, -1))
    }

    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features
            .values()
            .find(|f| f.matches_name(name))
            .or_else(|| self.features.get(name))
    }

    /// Every file path this pack owns, across its probed locations plus any
    /// `sounds.json`. Used by the Exporter to compute leftover residue.
    pub fn all_pack_paths(&self) -> BTreeSet<PathBuf> {
        let mut paths = BTreeSet::new();
        let loc = &self.locations;
        for set in [
            &loc.species,
            &loc.species_additions,
            &loc.spawn_pool_world,
            &loc.species_features,
            &loc.species_feature_assignments,
            &loc.resolvers,
            &loc.models,
            &loc.posers,
            &loc.animations,
            &loc.textures,
            &loc.sounds,
            &loc.lang,
        ] {
            paths.extend(set.iter().cloned());
        }
        if let Some(sj) = &loc.sounds_json {
            paths.insert(sj.clone());
        }
        paths
    }

    /// The generation label from the first `labels[]` value beginning with
    /// `gen` in the given entity's authoritative species file, defaulting to
    /// `"custom"` (spec §6).
    pub fn generation_label(&self, internal_name: &str) -> String {
        let Some(entity) = self.entity(internal_name) else {
            return "custom".to_string();
        };
        let Some(species) = &entity.base_form().species else {
            return "custom".to_string();
        };
        species
            .payload
            .get("labels")
            .str_array()
            .into_iter()
            .find(|label| label.starts_with("gen"))
            .unwrap_or_else(|| "custom".to_string())
    }
}

/// Verify exactly one pack is flagged base among `packs`; fatal otherwise
/// (spec §7 `MultipleBasePacks`).
pub fn validate_single_base(packs: &[Pack]) -> Result<Option<usize>> {
    let base_indices: Vec<usize> = packs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_base)
        .map(|(i, _)| i)
        .collect();
    match base_indices.len() {
        0 => Ok(None),
        1 => Ok(Some(base_indices[0])),
        _ => Err(CombinerError::MultipleBasePacks {
            count: base_indices.len(),
            names: base_indices
                .iter()
                .map(|&i| packs[i].name.clone())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
