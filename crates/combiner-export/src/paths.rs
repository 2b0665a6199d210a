//! Export/delete path computation (spec §4.13, first two sentences).

use combiner_core::pack::Pack;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// The union of export paths for every entity in `pack` that survived
/// resolution: the full `all_export_paths` set for a CHOOSE-selected
/// entity (its species/spawn data moves verbatim), or just
/// `graphics_export_paths` for a MERGE-picked entity (its species/spawn
/// data was instead synthesized directly into the output tree by the
/// MERGE glue, so only its media needs to move).
pub fn export_paths(pack: &Pack) -> BTreeSet<PathBuf> {
    pack.entities
        .values()
        .flat_map(|e| {
            if e.selected {
                e.all_export_paths()
            } else if e.merge_pick.is_some() {
                e.graphics_export_paths()
            } else {
                BTreeSet::new()
            }
        })
        .collect()
}

/// `all_pack_paths ∖ export_paths` — everything this pack owns that did
/// not survive resolution.
pub fn delete_paths(pack: &Pack, export_paths: &BTreeSet<PathBuf>) -> BTreeSet<PathBuf> {
    pack.all_pack_paths()
        .difference(export_paths)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use combiner_core::entity::Entity;

    #[test]
    fn export_paths_only_include_selected_or_picked_entities() {
        let mut pack = Pack::new("p1", "/tmp/p1".into());
        let mut selected = Entity::new("pikachu", "Pikachu", 25);
        selected.selected = true;
        selected.base_form_mut().spawn_pool.insert("spawn.json".into());
        pack.entities.insert("pikachu".to_string(), selected);

        let mut unselected = Entity::new("eevee", "Eevee", 133);
        unselected.base_form_mut().spawn_pool.insert("eevee_spawn.json".into());
        pack.entities.insert("eevee".to_string(), unselected);

        let exported = export_paths(&pack);
        assert!(exported.contains(&PathBuf::from("spawn.json")));
        assert!(!exported.contains(&PathBuf::from("eevee_spawn.json")));
    }

    #[test]
    fn delete_paths_is_the_complement_of_export_paths() {
        let mut pack = Pack::new("p1", "/tmp/p1".into());
        pack.locations.spawn_pool_world.insert("a.json".into());
        pack.locations.spawn_pool_world.insert("b.json".into());

        let mut exported = BTreeSet::new();
        exported.insert(PathBuf::from("a.json"));

        let deleted = delete_paths(&pack, &exported);
        assert_eq!(deleted, BTreeSet::from([PathBuf::from("b.json")]));
    }
}
