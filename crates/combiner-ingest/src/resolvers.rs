//! Visual Resolver Binder (spec §4.7).

use crate::walk;
use combiner_core::bag::Bag;
use combiner_core::entity::ResolverEntry;
use combiner_core::error::Result;
use combiner_core::pack::Pack;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const SHINY_ASPECT: &str = "shiny";

/// Filename-stem indexes over every poser/model/texture file discovered by
/// the prober, consumed (entry removed) as resolvers claim them.
pub struct AssetIndexes {
    pub posers: HashMap<String, PathBuf>,
    pub models: HashMap<String, PathBuf>,
    pub textures: HashMap<String, PathBuf>,
}

fn stem_index(paths: &std::collections::BTreeSet<PathBuf>) -> HashMap<String, PathBuf> {
    paths
        .iter()
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(|s| (s.to_string(), p.clone())))
        .collect()
}

pub fn build_asset_indexes(pack: &Pack) -> AssetIndexes {
    AssetIndexes {
        posers: stem_index(&pack.locations.posers),
        models: stem_index(&pack.locations.models),
        textures: stem_index(&pack.locations.textures),
    }
}

pub fn bind_resolvers(pack: &mut Pack, indexes: &AssetIndexes, show_warnings: bool) -> Result<()> {
    let mut posers = indexes.posers.clone();
    let mut models = indexes.models.clone();
    let mut textures = indexes.textures.clone();

    let resolver_files = pack.locations.resolvers.clone();
    walk::for_each_json(
        &resolver_files,
        |path, bag| bind_resolver_file(pack, path, &bag, &mut posers, &mut models, &mut textures),
        |path, err| {
            if show_warnings {
                tracing::warn!("--! {}: {err}", path.display());
            }
        },
    );
    Ok(())
}

fn last_colon_segment(raw: &str) -> String {
    raw.rsplit(':').next().unwrap_or(raw).to_string()
}

fn bind_resolver_file(
    pack: &mut Pack,
    path: &Path,
    bag: &Bag,
    posers: &mut HashMap<String, PathBuf>,
    models: &mut HashMap<String, PathBuf>,
    textures: &mut HashMap<String, PathBuf>,
) {
    let species_ref = bag.get("species").str_or("");
    let entity_name = last_colon_segment(&species_ref);
    if entity_name.is_empty() {
        return;
    }

    let order = bag.get("order").i64_or(-1);
    let mut resolver = ResolverEntry::new(order, path.to_path_buf());
    let mut aspects: Vec<String> = Vec::new();

    collect_variations(&bag.get("variations"), &mut resolver, &mut aspects, posers, models, textures);

    if let Some(idx) = aspects.iter().position(|a| a == SHINY_ASPECT) {
        aspects.remove(idx);
        resolver.has_shiny = true;
    }
    resolver.aspects = aspects.iter().cloned().collect();

    let entity = pack.get_or_create_entity(&entity_name);
    let assigned_order = entity.insert_resolver(resolver);

    if aspects.is_empty() {
        let idx = entity.base_form_idx();
        entity.forms[idx].resolver_assignments.insert(assigned_order);
        return;
    }
    let mut bound_any = false;
    for aspect in &aspects {
        for idx in entity.forms_matching_aspect(aspect) {
            entity.forms[idx].resolver_assignments.insert(assigned_order);
            bound_any = true;
        }
    }
    if !bound_any {
        let idx = entity.base_form_idx();
        entity.forms[idx].resolver_assignments.insert(assigned_order);
    }
}

fn collect_variations(
    variations: &Bag,
    resolver: &mut ResolverEntry,
    aspects: &mut Vec<String>,
    posers: &mut HashMap<String, PathBuf>,
    models: &mut HashMap<String, PathBuf>,
    textures: &mut HashMap<String, PathBuf>,
) {
    for variation in variations.array() {
        aspects.extend(variation.get("aspects").str_array());
        collect_layers(&variation, resolver, posers, models, textures);
        if variation.get("layers").is_array() {
            for layer in variation.get("layers").array() {
                collect_layers(&layer, resolver, posers, models, textures);
            }
        }
    }
}

fn collect_layers(
    entry: &Bag,
    resolver: &mut ResolverEntry,
    posers: &mut HashMap<String, PathBuf>,
    models: &mut HashMap<String, PathBuf>,
    textures: &mut HashMap<String, PathBuf>,
) {
    if let Some(poser_ref) = entry.get("poser").as_str() {
        if let Some(path) = resolve_by_stem(poser_ref, posers) {
            resolver.posers.insert(path);
        }
    }
    if let Some(model_ref) = entry.get("model").as_str() {
        if let Some(path) = resolve_by_stem(model_ref, models) {
            resolver.models.insert(path);
        }
    }
    let texture_field = entry.get("texture");
    if let Some(texture_ref) = texture_field.as_str() {
        if let Some(path) = resolve_texture(texture_ref, textures) {
            resolver.textures.insert(path);
        }
    } else if texture_field.is_object() {
        for frame in texture_field.get("frames").str_array() {
            if let Some(path) = resolve_texture(&frame, textures) {
                resolver.textures.insert(path);
            }
        }
    }
}

/// Resolve a poser/model reference by filename stem, consuming the entry.
fn resolve_by_stem(raw: &str, index: &mut HashMap<String, PathBuf>) -> Option<PathBuf> {
    let stem = raw.rsplit('/').next().unwrap_or(raw).rsplit(':').next().unwrap_or(raw);
    index.remove(stem)
}

/// Texture refs are `a/b/pokemon/<rest>` paths or bare stems; fall back to
/// the stem index by last path segment (spec §4.7 step 3).
fn resolve_texture(raw: &str, index: &mut HashMap<String, PathBuf>) -> Option<PathBuf> {
    let segments: Vec<&str> = raw.split('/').collect();
    if let Some(pos) = segments.iter().position(|s| *s == "pokemon") {
        if pos + 1 < segments.len() {
            let stem = segments.last().unwrap().rsplit('.').next().unwrap_or(segments.last().unwrap());
            if let Some(path) = index.remove(*stem) {
                return Some(path);
            }
        }
    }
    let last = raw.rsplit('/').next().unwrap_or(raw);
    let stem = last.rsplit('.').next().unwrap_or(last);
    index.remove(stem)
}
