//! Poser / Animation Linker (spec §4.8).

use crate::walk;
use combiner_core::bag::Bag;
use combiner_core::entity::ResolverEntry;
use combiner_core::error::Result;
use combiner_core::pack::Pack;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

const NULL_GROUP: &str = "__null__";

/// Fixed seed of recognized animation field names (spec §4.8); grows with
/// whatever group keys are actually discovered in animation files.
const SEED_ANIMATION_TYPES: &[&str] = &[
    "ground_idle",
    "ground_walk",
    "ground_run",
    "air_idle",
    "air_fly",
    "water_idle",
    "water_swim",
    "render",
    "cry",
    "faint",
    "recoil",
    "blink",
    "sleep",
    "water_sleep",
    "physical",
    "special",
    "status",
];

/// group -> move -> set of animation-file paths defining it.
type PresentAnimations = BTreeMap<String, BTreeMap<String, BTreeSet<PathBuf>>>;

pub fn link_animations(pack: &mut Pack, show_warnings: bool) -> Result<()> {
    let mut present = PresentAnimations::new();
    let mut defined_types: HashSet<String> = SEED_ANIMATION_TYPES.iter().map(|s| s.to_string()).collect();

    let animation_files = pack.locations.animations.clone();
    walk::for_each_json(
        &animation_files,
        |path, bag| collect_present_animations(path, &bag, &mut present, &mut defined_types),
        |path, err| {
            if show_warnings {
                tracing::warn!("--! {}: {err}", path.display());
            }
        },
    );

    let mut accessed_groups: HashSet<String> = HashSet::new();

    let poser_paths: Vec<PathBuf> = pack.locations.posers.iter().cloned().collect();
    let mut poser_cache: BTreeMap<PathBuf, Bag> = BTreeMap::new();
    for path in &poser_paths {
        if let Ok(bag) = combiner_core::schema::read_json(path) {
            poser_cache.insert(path.clone(), bag);
        }
    }

    let entity_names: Vec<String> = pack.entities.keys().cloned().collect();
    for entity_name in entity_names {
        let resolver_orders: Vec<i64> = pack.entities[&entity_name].resolvers.keys().copied().collect();
        for order in resolver_orders {
            let poser_paths_for_resolver: Vec<PathBuf> = pack.entities[&entity_name]
                .resolvers
                .get(&order)
                .map(|r| r.posers.iter().cloned().collect())
                .unwrap_or_default();

            let mut requested: Vec<(String, String)> = Vec::new();
            for poser_path in &poser_paths_for_resolver {
                if let Some(bag) = poser_cache.get(poser_path) {
                    collect_requested_animations(bag, &defined_types, &mut requested);
                }
            }

            let resolver = pack
                .entities
                .get_mut(&entity_name)
                .unwrap()
                .resolvers
                .get_mut(&order)
                .unwrap();
            resolve_requested(resolver, &requested, &present, &mut accessed_groups);
        }
    }

    orphan_sweep(pack, &present, &accessed_groups);

    Ok(())
}

fn parse_animation_key(key: &str) -> (String, String) {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() == 1 {
        (NULL_GROUP.to_string(), parts[0].to_string())
    } else if parts.len() >= 3 {
        (parts[1].to_string(), parts[2].to_string())
    } else {
        (NULL_GROUP.to_string(), key.to_string())
    }
}

fn collect_present_animations(
    path: &Path,
    bag: &Bag,
    present: &mut PresentAnimations,
    defined_types: &mut HashSet<String>,
) {
    for (key, _value) in bag.get("animations").entries() {
        let (group, mv) = parse_animation_key(&key);
        defined_types.insert(group.clone());
        present
            .entry(group)
            .or_default()
            .entry(mv)
            .or_default()
            .insert(path.to_path_buf());
    }
}

/// Extract `(group, move)` from a bedrock/molang reference string such as
/// `q.bedrock('pikachu', 'ground_idle')` (spec §4.8).
fn parse_bedrock_ref(raw: &str) -> Option<(String, String)> {
    let trimmed = raw.trim();
    let is_bedrock = trimmed.starts_with("q.bedrock") || trimmed.starts_with("bedrock");
    if !is_bedrock {
        return None;
    }
    let open = trimmed.find('(')?;
    let close = trimmed.rfind(')')?;
    if close <= open {
        return None;
    }
    let args: Vec<String> = trimmed[open + 1..close]
        .split(',')
        .map(|a| a.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .collect();
    if args.len() < 2 {
        return None;
    }
    Some((args[0].clone(), args[1].clone()))
}

fn collect_strings(bag: &Bag, out: &mut Vec<String>) {
    if let Some(s) = bag.as_str() {
        out.push(s.to_string());
    } else if bag.is_array() {
        for item in bag.array() {
            collect_strings(&item, out);
        }
    } else if bag.is_object() {
        for (_k, v) in bag.entries() {
            collect_strings(&v, out);
        }
    }
}

fn collect_requested_animations(
    poser: &Bag,
    defined_types: &HashSet<String>,
    out: &mut Vec<(String, String)>,
) {
    for (key, value) in poser.entries() {
        if defined_types.contains(&key) {
            let mut strings = Vec::new();
            collect_strings(&value, &mut strings);
            for s in strings {
                if let Some(pair) = parse_bedrock_ref(&s) {
                    out.push(pair);
                }
            }
        }
    }

    let mut animation_strings = Vec::new();
    collect_strings(&poser.get("animations"), &mut animation_strings);
    for s in animation_strings {
        if let Some(pair) = parse_bedrock_ref(&s) {
            out.push(pair);
        }
    }

    let poses_bag = poser.get("poses");
    let poses: Vec<Bag> = if poses_bag.is_array() {
        poses_bag.array()
    } else {
        poses_bag.entries().into_iter().map(|(_, v)| v).collect()
    };
    for pose in poses {
        let mut quirk_strings = Vec::new();
        collect_strings(&pose.get("quirks"), &mut quirk_strings);
        collect_strings(&pose.get("animations"), &mut quirk_strings);
        for s in quirk_strings {
            if let Some(pair) = parse_bedrock_ref(&s) {
                out.push(pair);
            }
        }
    }
}

fn resolve_requested(
    resolver: &mut ResolverEntry,
    requested: &[(String, String)],
    present: &PresentAnimations,
    accessed_groups: &mut HashSet<String>,
) {
    for (group, mv) in requested {
        let resolved = present.get(group).and_then(|moves| moves.get(mv));
        let entry = resolver
            .requested_animations
            .entry(group.clone())
            .or_default();
        entry.insert(mv.clone(), resolved.is_some());
        if let Some(paths) = resolved {
            resolver.animations.extend(paths.iter().cloned());
            accessed_groups.insert(group.clone());
        }
    }
}

/// Bind every unreferenced animation group back onto the entity that names
/// it (spec §4.8 "orphan sweep").
fn orphan_sweep(pack: &mut Pack, present: &PresentAnimations, accessed_groups: &HashSet<String>) {
    for (group, moves) in present {
        if accessed_groups.contains(group) || group == NULL_GROUP {
            continue;
        }
        let (entity_name, aspect) = match group.split_once('_') {
            Some((e, a)) => (e.to_string(), Some(a.to_string())),
            None => (group.clone(), None),
        };
        if !pack.entities.contains_key(&entity_name) {
            continue;
        }
        let paths: BTreeSet<PathBuf> = moves.values().flat_map(|s| s.iter().cloned()).collect();

        let entity = pack.entities.get_mut(&entity_name).unwrap();
        let target_order = match &aspect {
            Some(a) => entity
                .forms_matching_aspect(a)
                .first()
                .and_then(|&idx| entity.forms[idx].resolver_assignments.iter().next().copied())
                .unwrap_or(0),
            None => 0,
        };
        let resolver = entity
            .resolvers
            .entry(target_order)
            .or_insert_with(|| ResolverEntry::new(target_order, PathBuf::new()));
        resolver.animations.extend(paths);
    }
}
