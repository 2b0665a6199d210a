//! Pseudoform Detection (spec §4.10).

use combiner_core::pack::Pack;
use std::collections::BTreeMap;

/// The display name Pseudoform Detection tallies against: the `en_us` lang
/// override if present, else the species file's own `name`.
fn resolved_display_name(pack: &Pack, internal_name: &str) -> Option<String> {
    for lang in &pack.lang_entries {
        if let Some(name) = lang.species_name_override(internal_name) {
            return Some(name.to_string());
        }
    }
    pack.entity(internal_name)
        .map(|e| e.display_name.clone())
}

pub fn detect_pseudoforms(pack: &mut Pack) {
    let mut tally: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for internal_name in pack.entities.keys().cloned().collect::<Vec<_>>() {
        let display = resolved_display_name(pack, &internal_name).unwrap_or_else(|| internal_name.clone());
        tally.entry(display.to_lowercase()).or_default().push(internal_name);
    }

    for (display_lower, internal_names) in tally {
        if internal_names.len() < 2 {
            continue;
        }
        let real = internal_names
            .iter()
            .find(|n| n.to_lowercase() == display_lower)
            .cloned();
        for name in &internal_names {
            if Some(name) != real.as_ref() {
                if let Some(entity) = pack.entity_mut(name) {
                    entity.is_pseudoform = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combiner_core::entity::Entity;

    #[test]
    fn marks_all_but_the_name_matching_entity_as_pseudoform() {
        let mut pack = Pack::new("p1", "/tmp/p1".into());
        let mut unown = Entity::new("unown", "Unown", 201);
        unown.display_name = "Unown".to_string();
        let mut unown_a = Entity::new("unown_a", "Unown", 201);
        unown_a.display_name = "Unown".to_string();
        pack.entities.insert("unown".to_string(), unown);
        pack.entities.insert("unown_a".to_string(), unown_a);

        detect_pseudoforms(&mut pack);

        assert!(!pack.entity("unown").unwrap().is_pseudoform);
        assert!(pack.entity("unown_a").unwrap().is_pseudoform);
    }

    #[test]
    fn unique_display_names_are_never_pseudoforms() {
        let mut pack = Pack::new("p1", "/tmp/p1".into());
        pack.entities.insert("pikachu".to_string(), Entity::new("pikachu", "Pikachu", 25));
        detect_pseudoforms(&mut pack);
        assert!(!pack.entity("pikachu").unwrap().is_pseudoform);
    }
}
