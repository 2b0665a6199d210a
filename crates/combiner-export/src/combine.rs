//! Combined `lang/*.json` and `sounds.json` emission (spec §6 "Output
//! tree").

use combiner_core::pack::Pack;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const SPECIES_KEY_PREFIX: &str = "cobblemon.species.";

fn referenced_entity(key: &str) -> Option<&str> {
    let rest = key.strip_prefix(SPECIES_KEY_PREFIX)?;
    let (name, _field) = rest.split_once('.')?;
    (!name.is_empty()).then_some(name)
}

/// Merge every pack's lang entries into one map per lang-file basename,
/// keeping only keys that are either not species-scoped or reference an
/// exported entity. Later packs in load order win on key collision.
pub fn combine_lang(packs: &[Pack], exported_entities: &BTreeSet<String>) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut combined: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for pack in packs {
        for entry in &pack.lang_entries {
            let basename = entry
                .file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("en_us.json")
                .to_string();
            let bucket = combined.entry(basename).or_default();
            for (key, value) in &entry.source {
                let keep = match referenced_entity(key) {
                    Some(name) => exported_entities.contains(name),
                    None => true,
                };
                if keep {
                    bucket.insert(key.clone(), value.clone());
                }
            }
        }
    }
    combined
}

/// Combine `sounds.json` fragments for every exported entity: the
/// contributing pack's payload (the CHOOSE-selected pack, or the
/// MERGE-pick pack) plus any non-colliding fragment keys from other packs
/// that also held the entity — this is Open Question decision #2 (see
/// DESIGN.md).
pub fn combine_sounds(packs: &[Pack], entity_picks: &BTreeMap<String, String>) -> Value {
    let mut combined = Map::new();
    for (entity_name, picked_pack) in entity_picks {
        let mut fragments: Vec<(&str, &BTreeMap<String, Value>)> = Vec::new();
        for pack in packs {
            let Some(entity) = pack.entity(entity_name) else {
                continue;
            };
            for form in &entity.forms {
                let Some(sound) = &form.sound_entry else {
                    continue;
                };
                fragments.push((pack.name.as_str(), &sound.payload));
            }
        }
        fragments.sort_by_key(|(name, _)| *name != picked_pack.as_str());

        for (_, payload) in fragments {
            for (key, value) in payload {
                combined.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
    Value::Object(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use combiner_core::entity::Entity;
    use combiner_core::lang::LangEntry;

    #[test]
    fn combine_lang_drops_keys_for_unexported_entities() {
        let mut pack = Pack::new("p1", "/tmp/p1".into());
        let mut source = BTreeMap::new();
        source.insert("cobblemon.species.pikachu.name".to_string(), "Pikachu".to_string());
        source.insert("cobblemon.species.missingno.name".to_string(), "Ghost".to_string());
        source.insert("itemGroup.cobblemon".to_string(), "Cobblemon".to_string());
        pack.lang_entries.push(LangEntry::from_source("en_us.json".into(), source));

        let exported = BTreeSet::from(["pikachu".to_string()]);
        let combined = combine_lang(std::slice::from_ref(&pack), &exported);
        let bucket = &combined["en_us.json"];
        assert!(bucket.contains_key("cobblemon.species.pikachu.name"));
        assert!(!bucket.contains_key("cobblemon.species.missingno.name"));
        assert!(bucket.contains_key("itemGroup.cobblemon"));
    }

    #[test]
    fn combine_sounds_prefers_picked_pack_and_fills_gaps() {
        let mut pack_a = Pack::new("A", "/tmp/a".into());
        let mut entity_a = Entity::new("pikachu", "Pikachu", 25);
        let mut sound_a = combiner_core::sound::SoundEntry::new("pikachu");
        sound_a.payload.insert("cry".to_string(), serde_json::json!({"from": "A"}));
        entity_a.base_form_mut().sound_entry = Some(sound_a);
        pack_a.entities.insert("pikachu".to_string(), entity_a);

        let mut pack_b = Pack::new("B", "/tmp/b".into());
        let mut entity_b = Entity::new("pikachu", "Pikachu", 25);
        let mut sound_b = combiner_core::sound::SoundEntry::new("pikachu");
        sound_b.payload.insert("cry".to_string(), serde_json::json!({"from": "B"}));
        sound_b.payload.insert("hurt".to_string(), serde_json::json!({"from": "B"}));
        entity_b.base_form_mut().sound_entry = Some(sound_b);
        pack_b.entities.insert("pikachu".to_string(), entity_b);

        let picks = BTreeMap::from([("pikachu".to_string(), "B".to_string())]);
        let combined = combine_sounds(&[pack_a, pack_b], &picks);
        assert_eq!(combined["cry"]["from"], "B");
        assert_eq!(combined["hurt"]["from"], "B");
    }
}
