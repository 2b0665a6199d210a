//! Sound Binder (spec §4.9).

use combiner_core::error::Result;
use combiner_core::pack::Pack;
use combiner_core::sound::SoundEntry;
use combiner_core::schema::read_json;
use std::path::{Path, PathBuf};

pub fn bind_sounds(pack: &mut Pack, show_warnings: bool) -> Result<()> {
    if let Some(sounds_json) = pack.locations.sounds_json.clone() {
        bind_sounds_json(pack, &sounds_json, show_warnings);
    }
    bind_unassigned_ogg_files(pack);
    Ok(())
}

fn bind_sounds_json(pack: &mut Pack, path: &Path, show_warnings: bool) {
    let bag = match read_json(path) {
        Ok(bag) => bag,
        Err(err) => {
            if show_warnings {
                tracing::warn!("--! {}: {err}", path.display());
            }
            return;
        }
    };

    let sounds_root = pack.locations.sounds.iter().next().and_then(|p| {
        p.ancestors().find(|a| a.file_name().and_then(|n| n.to_str()) == Some("pokemon"))
    }).map(Path::to_path_buf);

    for (key, entry) in bag.entries() {
        let segments: Vec<&str> = key.split('.').collect();
        let (entity_name, mv) = match segments.as_slice() {
            [entity] => (entity.to_string(), None),
            [first, entity, mv] if *first == "pokemon" => (entity.to_string(), Some(mv.to_string())),
            _ => continue,
        };

        let entity = pack.get_or_create_entity(&entity_name);
        let sound_entry = entity
            .base_form_mut()
            .sound_entry
            .get_or_insert_with(|| SoundEntry::new(entity_name.clone()));
        sound_entry.payload.insert(key.clone(), entry.as_value().clone());

        for raw_path in entry.get("sounds").str_array() {
            let with_ext = if raw_path.ends_with(".ogg") {
                raw_path.clone()
            } else {
                format!("{raw_path}.ogg")
            };
            let tail = with_ext.splitn(2, '/').nth(1).unwrap_or(&with_ext);
            let full_path = sounds_root
                .as_ref()
                .map(|root| root.join(tail))
                .unwrap_or_else(|| PathBuf::from(tail));

            match &mv {
                Some(m) => sound_entry.add_move_sound(m.clone(), full_path),
                None => sound_entry.add_unassigned(full_path),
            }
        }
    }
}

/// Attach loose `.ogg` files not referenced by `sounds.json` (spec §4.9).
fn bind_unassigned_ogg_files(pack: &mut Pack) {
    let ogg_files: Vec<PathBuf> = pack
        .locations
        .sounds
        .iter()
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("ogg"))
        .cloned()
        .collect();

    for path in ogg_files {
        let parent_name = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

        let (entity_name, mv) = if parent_name == "pokemon" || parent_name.is_empty() {
            match stem.split_once('_') {
                Some((name, mv)) => (name.to_string(), Some(mv.to_string())),
                None => (stem.to_string(), None),
            }
        } else {
            match stem.split_once('_') {
                Some((name, mv)) if name == parent_name => (parent_name.to_string(), Some(mv.to_string())),
                _ => (parent_name.to_string(), None),
            }
        };

        if entity_name.is_empty() || !pack.entities.contains_key(&entity_name) {
            continue;
        }
        let entity = pack.entity_mut(&entity_name).unwrap();
        let sound_entry = entity
            .base_form_mut()
            .sound_entry
            .get_or_insert_with(|| SoundEntry::new(entity_name.clone()));

        match mv {
            Some(m) => sound_entry.add_move_sound(m, path),
            None => sound_entry.add_unassigned(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn binds_move_sound_from_sounds_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sounds.json");
        fs::write(
            &path,
            r#"{"pokemon.pikachu.cry":{"sounds":["pikachu/cry"]}}"#,
        )
        .unwrap();

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.sounds_json = Some(path);
        bind_sounds(&mut pack, true).unwrap();

        let entity = pack.entity("pikachu").unwrap();
        let sound_entry = entity.base_form().sound_entry.as_ref().unwrap();
        assert!(sound_entry.moves.contains_key("cry"));
    }

    #[test]
    fn unassigned_ogg_attaches_by_underscore_move_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        let ogg = tmp.path().join("pokemon/pikachu_cry.ogg");
        fs::create_dir_all(ogg.parent().unwrap()).unwrap();
        fs::write(&ogg, []).unwrap();

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.entities.insert(
            "pikachu".to_string(),
            combiner_core::entity::Entity::new("pikachu", "Pikachu", 25),
        );
        pack.locations.sounds.insert(ogg.clone());
        bind_sounds(&mut pack, true).unwrap();

        let entity = pack.entity("pikachu").unwrap();
        let sound_entry = entity.base_form().sound_entry.as_ref().unwrap();
        assert!(sound_entry.moves.get("cry").unwrap().contains(&ogg));
    }
}
