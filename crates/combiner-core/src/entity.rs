//! Entities, Forms, and ResolverEntries (spec §3).
//!
//! Cyclic back-references (Form ⇄ Entity ⇄ Pack) are resolved with an
//! arena + index, per Design Note: a [`Pack`](crate::pack::Pack) owns a
//! `Vec<Entity>`; an `Entity` owns its `Vec<Form>` and `resolvers` map.
//! "Parent" access is always an index lookup the caller performs against
//! the owning collection — never a stored pointer.

use crate::bag::Bag;
use crate::evolution::EvolutionCounters;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub const BASE_FORM: &str = "base_form";

/// A parsed JSON document plus the path it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub path: PathBuf,
    pub payload: Bag,
}

impl SourceRef {
    pub fn new(path: PathBuf, payload: Bag) -> Self {
        Self { path, payload }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MergeLevel {
    No,
    Partial,
    Full,
}

impl Default for MergeLevel {
    fn default() -> Self {
        MergeLevel::No
    }
}

/// Per-form resolution accounting (spec §3, §4.12d).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeStatus {
    pub spawn_pool: MergeLevel,
    pub species: MergeLevel,
    pub species_additions: MergeLevel,
}

/// A named variant of an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub name: String,
    pub aspects: Vec<String>,
    pub resolver_assignments: BTreeSet<i64>,
    pub species: Option<SourceRef>,
    pub species_additions: Option<SourceRef>,
    pub spawn_pool: BTreeSet<PathBuf>,
    pub sound_entry: Option<crate::sound::SoundEntry>,
    pub merge_status: MergeStatus,
}

impl Form {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            aspects: Vec::new(),
            resolver_assignments: BTreeSet::new(),
            species: None,
            species_additions: None,
            spawn_pool: BTreeSet::new(),
            sound_entry: None,
            merge_status: MergeStatus::default(),
        }
    }

    pub fn base() -> Self {
        Self::new(BASE_FORM)
    }

    pub fn is_base(&self) -> bool {
        self.name == BASE_FORM
    }

    /// A form "matches" an aspect when it carries that aspect, or is named
    /// after it (case-insensitively) — spec §4.6 step 3.
    pub fn matches_aspect(&self, aspect: &str) -> bool {
        self.aspects.iter().any(|a| a == aspect) || self.name.eq_ignore_ascii_case(aspect)
    }

    pub fn has_completeness(&self) -> FormCompStamp {
        FormCompStamp {
            has_spawn: !self.spawn_pool.is_empty(),
            has_species: self.species.is_some(),
            has_species_additions: self.species_additions.is_some(),
        }
    }
}

/// A bundle of visual assets at a priority (spec §3, §4.7–§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverEntry {
    pub order: i64,
    pub own_path: PathBuf,
    pub models: BTreeSet<PathBuf>,
    pub posers: BTreeSet<PathBuf>,
    pub animations: BTreeSet<PathBuf>,
    pub textures: BTreeSet<PathBuf>,
    pub has_shiny: bool,
    pub aspects: BTreeSet<String>,
    /// group -> move -> "resolved against present_animations".
    pub requested_animations: BTreeMap<String, BTreeMap<String, bool>>,
}

impl ResolverEntry {
    pub fn new(order: i64, own_path: PathBuf) -> Self {
        Self {
            order,
            own_path,
            models: BTreeSet::new(),
            posers: BTreeSet::new(),
            animations: BTreeSet::new(),
            textures: BTreeSet::new(),
            has_shiny: false,
            aspects: BTreeSet::new(),
            requested_animations: BTreeMap::new(),
        }
    }

    pub fn has_model(&self) -> bool {
        !self.models.is_empty()
    }
    pub fn has_poser(&self) -> bool {
        !self.posers.is_empty()
    }
    pub fn has_animation(&self) -> bool {
        !self.animations.is_empty()
    }
    pub fn has_texture(&self) -> bool {
        !self.textures.is_empty()
    }

    pub fn all_paths(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.own_path)
            .chain(self.models.iter())
            .chain(self.posers.iter())
            .chain(self.animations.iter())
            .chain(self.textures.iter())
    }
}

/// The 9-field completeness stamp (Glossary: `comp_stamp`), split across a
/// per-form component (spawn/species/species_additions) and a per-resolver
/// component (resolver/model/poser/animation/texture/shiny).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormCompStamp {
    pub has_spawn: bool,
    pub has_species: bool,
    pub has_species_additions: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverCompStamp {
    pub has_resolver: bool,
    pub has_model: bool,
    pub has_poser: bool,
    pub has_animation: bool,
    pub has_texture: bool,
    pub has_shiny: bool,
}

impl ResolverCompStamp {
    pub fn from_resolver(resolver: Option<&ResolverEntry>) -> Self {
        match resolver {
            None => Self::default(),
            Some(r) => Self {
                has_resolver: true,
                has_model: r.has_model(),
                has_poser: r.has_poser(),
                has_animation: r.has_animation(),
                has_texture: r.has_texture(),
                has_shiny: r.has_shiny,
            },
        }
    }

    /// Whether any graphics-bearing field is set.
    pub fn has_any_graphics(&self) -> bool {
        self.has_resolver
            || self.has_model
            || self.has_poser
            || self.has_animation
            || self.has_texture
            || self.has_shiny
    }
}

/// One creature identity inside a pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub internal_name: String,
    pub display_name: String,
    /// National Pokedex number; -1 means unknown.
    pub dex_id: i64,
    /// Union of `features` declared across species and species-additions.
    pub feature_names: BTreeSet<String>,
    pub forms: Vec<Form>,
    pub form_index: BTreeMap<String, usize>,
    /// order -> resolver, keyed by its (possibly reassigned) integer order.
    pub resolvers: BTreeMap<i64, ResolverEntry>,
    pub selected: bool,
    pub merged: bool,
    /// Which pack's graphics were chosen for this entity in MERGE mode.
    pub merge_pick: Option<String>,
    pub evolution: EvolutionCounters,
    pub is_pseudoform: bool,
}

impl Entity {
    pub fn new(internal_name: impl Into<String>, display_name: impl Into<String>, dex_id: i64) -> Self {
        let mut entity = Self {
            internal_name: internal_name.into(),
            display_name: display_name.into(),
            dex_id,
            feature_names: BTreeSet::new(),
            forms: Vec::new(),
            form_index: BTreeMap::new(),
            resolvers: BTreeMap::new(),
            selected: false,
            merged: false,
            merge_pick: None,
            evolution: EvolutionCounters::default(),
            is_pseudoform: false,
        };
        entity.insert_form(Form::base());
        entity
    }

    pub fn base_form_idx(&self) -> usize {
        self.form_index[BASE_FORM]
    }

    pub fn base_form(&self) -> &Form {
        &self.forms[self.base_form_idx()]
    }

    pub fn base_form_mut(&mut self) -> &mut Form {
        let idx = self.base_form_idx();
        &mut self.forms[idx]
    }

    pub fn find_form(&self, name: &str) -> Option<usize> {
        self.form_index.get(&name.to_lowercase()).copied()
    }

    pub fn insert_form(&mut self, form: Form) -> usize {
        let key = form.name.clone();
        if let Some(&idx) = self.form_index.get(&key) {
            return idx;
        }
        let idx = self.forms.len();
        self.form_index.insert(key, idx);
        self.forms.push(form);
        idx
    }

    /// Get an existing form by name or create a new one, returning its index.
    pub fn get_or_create_form(&mut self, name: &str) -> usize {
        if let Some(idx) = self.find_form(name) {
            return idx;
        }
        self.insert_form(Form::new(name))
    }

    /// Forms whose aspect set (or name) matches `aspect`.
    pub fn forms_matching_aspect(&self, aspect: &str) -> Vec<usize> {
        self.forms
            .iter()
            .enumerate()
            .filter(|(_, f)| f.matches_aspect(aspect))
            .map(|(i, _)| i)
            .collect()
    }

    /// Insert a resolver, reassigning its order on collision to
    /// `min(existing_min, 0) - 1` (spec §4.7 step 2).
    pub fn insert_resolver(&mut self, mut resolver: ResolverEntry) -> i64 {
        if self.resolvers.contains_key(&resolver.order) {
            let min_existing = self.resolvers.keys().copied().min().unwrap_or(0).min(0);
            resolver.order = min_existing - 1;
        }
        let order = resolver.order;
        self.resolvers.insert(order, resolver);
        order
    }

    /// Every path this entity contributes to the pack, across all its forms
    /// and resolvers — the set the Exporter moves/retains for a selected or
    /// merge-picked entity (spec §4.13).
    pub fn all_export_paths(&self) -> BTreeSet<PathBuf> {
        let mut paths = BTreeSet::new();
        for form in &self.forms {
            if let Some(species) = &form.species {
                paths.insert(species.path.clone());
            }
            if let Some(additions) = &form.species_additions {
                paths.insert(additions.path.clone());
            }
            paths.extend(form.spawn_pool.iter().cloned());
            if let Some(sound) = &form.sound_entry {
                paths.extend(sound.moves.values().flatten().cloned());
                paths.extend(sound.unassigned.iter().cloned());
            }
        }
        for resolver in self.resolvers.values() {
            paths.extend(resolver.all_paths().cloned());
        }
        paths
    }

    /// The subset of [`all_export_paths`](Self::all_export_paths) that is
    /// media, not data: resolver files (models/posers/animations/textures)
    /// and sound assets. Used for a MERGE-picked entity, whose species and
    /// spawn data is instead synthesized directly from the fold rather than
    /// moved from any single contributing pack (spec §4.12f).
    pub fn graphics_export_paths(&self) -> BTreeSet<PathBuf> {
        let mut paths = BTreeSet::new();
        for form in &self.forms {
            if let Some(sound) = &form.sound_entry {
                paths.extend(sound.moves.values().flatten().cloned());
                paths.extend(sound.unassigned.iter().cloned());
            }
        }
        for resolver in self.resolvers.values() {
            paths.extend(resolver.all_paths().cloned());
        }
        paths
    }
}
