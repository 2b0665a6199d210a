//! Resolution Engine — MERGE mode (spec §4.12), the principal algorithm.

use combiner_core::entity::MergeLevel;
use combiner_core::loose::{loose_eq, next_free_name};
use combiner_core::pack::Pack;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

/// (a) Spawn merge: union every form's spawn files across packs for this
/// entity, folding duplicate-content entries and renaming colliding ids.
pub fn merge_spawns(packs: &[Pack], entity_name: &str) -> Value {
    let mut needed_installed: BTreeSet<String> = BTreeSet::new();
    let mut needed_uninstalled: BTreeSet<String> = BTreeSet::new();
    let mut accepted: Vec<Value> = Vec::new();
    let mut accepted_ids: BTreeSet<String> = BTreeSet::new();
    let mut seen_paths: BTreeSet<std::path::PathBuf> = BTreeSet::new();

    for pack in packs {
        let Some(entity) = pack.entity(entity_name) else {
            continue;
        };
        for form in &entity.forms {
            for path in &form.spawn_pool {
                if !seen_paths.insert(path.clone()) {
                    continue;
                }
                let Ok(bag) = combiner_core::schema::read_json(path) else {
                    continue;
                };
                for m in bag.get("neededInstalledMods").str_array() {
                    needed_installed.insert(m);
                }
                for m in bag.get("neededUninstalledMods").str_array() {
                    needed_uninstalled.insert(m);
                }
                for entry in bag.get("spawns").array() {
                    let Some(pokemon) = entry.as_value().get("pokemon").and_then(|v| v.as_str()) else {
                        continue;
                    };
                    let leading = pokemon.split_whitespace().next().unwrap_or("");
                    if !leading.eq_ignore_ascii_case(entity_name) {
                        continue;
                    }
                    accept_spawn_entry(entry.as_value().clone(), &mut accepted, &mut accepted_ids);
                }
            }
        }
    }

    json!({
        "enabled": true,
        "neededInstalledMods": needed_installed.into_iter().collect::<Vec<_>>(),
        "neededUninstalledMods": needed_uninstalled.into_iter().collect::<Vec<_>>(),
        "spawns": accepted,
    })
}

fn accept_spawn_entry(mut entry: Value, accepted: &mut Vec<Value>, accepted_ids: &mut BTreeSet<String>) {
    let id = entry
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or("spawn")
        .to_string();

    let mut without_id = entry.clone();
    if let Some(obj) = without_id.as_object_mut() {
        obj.remove("id");
    }

    for existing in accepted.iter() {
        let mut existing_without_id = existing.clone();
        if let Some(obj) = existing_without_id.as_object_mut() {
            obj.remove("id");
        }
        if loose_eq(&existing_without_id, &without_id) {
            return;
        }
    }

    let final_id = if accepted_ids.contains(&id) {
        next_free_name(&id, |candidate| accepted_ids.contains(candidate))
    } else {
        id
    };
    accepted_ids.insert(final_id.clone());
    if let Some(obj) = entry.as_object_mut() {
        obj.insert("id".to_string(), json!(final_id));
    }
    accepted.push(entry);
}

/// (b) Common species base: the BASE pack's species document if one
/// exists, else a synthesized intersection over loose key equality across
/// every pack's species source (spec §4.12b).
pub fn common_base(packs: &[Pack], entity_name: &str, strict_key_match: bool) -> Value {
    if let Some(base_pack) = packs.iter().find(|p| p.is_base) {
        if let Some(entity) = base_pack.entity(entity_name) {
            if let Some(species) = &entity.base_form().species {
                return species.payload.as_value().clone();
            }
        }
    }
    synthesize_common_base(packs, entity_name, strict_key_match)
}

fn synthesize_common_base(packs: &[Pack], entity_name: &str, strict_key_match: bool) -> Value {
    let docs: Vec<&Value> = packs
        .iter()
        .filter_map(|p| p.entity(entity_name))
        .filter_map(|e| e.base_form().species.as_ref())
        .map(|s| s.payload.as_value())
        .collect();
    if docs.is_empty() {
        return json!({});
    }

    let mut keys: BTreeSet<String> = docs
        .iter()
        .filter_map(|d| d.as_object())
        .flat_map(|o| o.keys().cloned())
        .collect();
    if strict_key_match {
        keys.retain(|k| docs.iter().all(|d| d.get(k).is_some()));
    }

    let mut base = Map::new();
    for key in keys {
        let values: Vec<&Value> = docs.iter().filter_map(|d| d.get(&key)).collect();
        if values.is_empty() {
            continue;
        }
        let first = values[0];
        if values.iter().all(|v| loose_eq(v, first)) {
            base.insert(key, first.clone());
        }
    }
    Value::Object(base)
}

/// Per-key diff for the `evolutions` array: keep an entry only if its `id`
/// is absent from `base`'s evolutions or loose-unequal to the base entry
/// of the same id, mirroring the `forms` diff below. A kept entry whose id
/// collides with one already kept or present in the base gets renamed via
/// [`next_free_name`]; everything else about the entry (including any
/// `is_addition`-style flag already on it) passes through untouched.
fn diff_evolutions(evolutions: &[Value], base_obj: Option<&Map<String, Value>>) -> Vec<Value> {
    let base_evolutions: Vec<Value> = base_obj
        .and_then(|b| b.get("evolutions"))
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut used_ids: BTreeSet<String> = base_evolutions
        .iter()
        .filter_map(|e| e.get("id").and_then(|v| v.as_str()))
        .map(String::from)
        .collect();

    let mut kept = Vec::new();
    for evo in evolutions {
        let id = evo.get("id").and_then(|v| v.as_str()).unwrap_or("evolution").to_string();
        let base_match = base_evolutions
            .iter()
            .find(|b| b.get("id").and_then(|v| v.as_str()) == Some(id.as_str()));
        let differs = match base_match {
            Some(bm) => !loose_eq(bm, evo),
            None => true,
        };
        if !differs {
            continue;
        }

        let mut evo = evo.clone();
        let final_id = if used_ids.contains(&id) {
            next_free_name(&id, |candidate| used_ids.contains(candidate))
        } else {
            id
        };
        used_ids.insert(final_id.clone());
        if let Some(obj) = evo.as_object_mut() {
            obj.insert("id".to_string(), json!(final_id));
        }
        kept.push(evo);
    }
    kept
}

/// (c) Per-pack species→additions extraction: diff `doc` against
/// `base`, keeping every key whose value differs by loose comparison.
/// `evolutions`/`forms` get special per-key handling.
pub fn extract_additions(doc: &Value, base: &Value) -> Value {
    let mut additions = Map::new();
    let Some(doc_obj) = doc.as_object() else {
        return Value::Object(additions);
    };
    let base_obj = base.as_object();

    for (key, value) in doc_obj {
        if key == "evolutions" || key == "forms" {
            continue;
        }
        let base_value = base_obj.and_then(|b| b.get(key));
        let differs = match base_value {
            Some(bv) => !loose_eq(bv, value),
            None => true,
        };
        if differs {
            additions.insert(key.clone(), value.clone());
        }
    }

    if let Some(evolutions) = doc_obj.get("evolutions").and_then(|v| v.as_array()) {
        let kept = diff_evolutions(evolutions, base_obj);
        if !kept.is_empty() {
            additions.insert("evolutions".to_string(), Value::Array(kept));
        }
    }
    if let Some(forms) = doc_obj.get("forms").and_then(|v| v.as_array()) {
        let base_forms = base_obj
            .and_then(|b| b.get("forms"))
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let kept: Vec<Value> = forms
            .iter()
            .filter(|form| {
                let name = form.get("name").and_then(|v| v.as_str());
                match name {
                    Some(n) => {
                        let base_form = base_forms
                            .iter()
                            .find(|f| f.get("name").and_then(|v| v.as_str()) == Some(n));
                        match base_form {
                            Some(bf) => !loose_eq(bf, form),
                            None => true,
                        }
                    }
                    None => true,
                }
            })
            .cloned()
            .collect();
        if !kept.is_empty() {
            additions.insert("forms".to_string(), Value::Array(kept));
        }
    }

    Value::Object(additions)
}

/// (d) FULL/PARTIAL/NO per the diff's remaining keys and whether the
/// field existed in the source at all.
pub fn merge_score(diff: &Value, field_present_in_source: bool, combine_moves: bool) -> MergeLevel {
    if !field_present_in_source {
        return MergeLevel::No;
    }
    let Some(obj) = diff.as_object() else {
        return MergeLevel::Full;
    };
    let mut allowed: BTreeSet<&str> = BTreeSet::from(["target", "dex_id", "evolutions", "forms"]);
    if combine_moves {
        allowed.insert("moves");
    }
    if obj.keys().all(|k| allowed.contains(k.as_str())) {
        MergeLevel::Full
    } else {
        MergeLevel::Partial
    }
}

/// (e) choice_options: packs contributing graphics for this entity.
pub fn choice_options(packs: &[Pack], entity_name: &str) -> Vec<String> {
    packs
        .iter()
        .filter(|p| {
            p.entity(entity_name)
                .map(|e| {
                    e.base_form()
                        .resolver_assignments
                        .iter()
                        .filter_map(|order| e.resolvers.get(order))
                        .any(|r| r.has_model() || r.has_poser() || r.has_animation() || r.has_texture() || r.has_shiny)
                })
                .unwrap_or(false)
        })
        .map(|p| p.name.clone())
        .collect()
}

/// (g) Value combination used throughout the fold. `overwrite` takes the
/// incoming value on non-equal scalars; otherwise majority-vote semantics
/// (approximated here as first-vs-incoming, since the fold is two values
/// at a time — ties favor the existing, i.e. the earlier pack in load
/// order per spec §5's ordering guarantee).
pub fn combine_value(key: &str, existing: &Value, incoming: &Value, overwrite: bool, combine_moves: bool) -> Value {
    if loose_eq(existing, incoming) {
        return existing.clone();
    }
    if key == "moves" && combine_moves {
        return union_arrays(existing, incoming);
    }
    match (existing, incoming) {
        (Value::Object(e), Value::Object(i)) => {
            let mut combined = e.clone();
            for (k, v) in i {
                let merged = match e.get(k) {
                    Some(existing_v) => combine_value(k, existing_v, v, overwrite, combine_moves),
                    None => v.clone(),
                };
                combined.insert(k.clone(), merged);
            }
            Value::Object(combined)
        }
        (Value::Array(_), Value::Array(_)) => union_arrays(existing, incoming),
        _ => {
            if overwrite {
                incoming.clone()
            } else {
                existing.clone()
            }
        }
    }
}

fn union_arrays(a: &Value, b: &Value) -> Value {
    let mut result: Vec<Value> = a.as_array().cloned().unwrap_or_default();
    for item in b.as_array().cloned().unwrap_or_default() {
        if !result.iter().any(|existing| loose_eq(existing, &item)) {
            result.push(item);
        }
    }
    Value::Array(result)
}

/// (f) Final species composition for one entity: fold non-pick additions
/// (overwrite=false), then the pick's addition (overwrite=true), then
/// apply `POKEDEX_FIX`.
pub fn compose_final(
    base: &Value,
    non_pick_additions: &[Value],
    pick_addition: Option<&Value>,
    pokedex_fix: bool,
    is_pseudoform: bool,
    exclude_pseudoforms: bool,
    combine_moves: bool,
) -> Value {
    let mut composed = base.clone();
    for addition in non_pick_additions {
        composed = fold_addition(&composed, addition, false, combine_moves);
    }
    if let Some(pick) = pick_addition {
        composed = fold_addition(&composed, pick, true, combine_moves);
    }
    if pokedex_fix {
        let implemented = !(is_pseudoform && exclude_pseudoforms);
        if let Some(obj) = composed.as_object_mut() {
            obj.insert("implemented".to_string(), json!(implemented));
        }
    }
    composed
}

fn fold_addition(base: &Value, addition: &Value, overwrite: bool, combine_moves: bool) -> Value {
    let Some(add_obj) = addition.as_object() else {
        return base.clone();
    };
    let mut result = base.clone();
    for (key, value) in add_obj {
        let merged = match result.get(key) {
            Some(existing) => combine_value(key, existing, value, overwrite, combine_moves),
            None => value.clone(),
        };
        if let Some(obj) = result.as_object_mut() {
            obj.insert(key.clone(), merged);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_additions_keeps_only_differing_keys() {
        let base = json!({"name": "Pikachu", "type": "electric"});
        let doc = json!({"name": "Pikachu", "type": "electric", "custom": true});
        let diff = extract_additions(&doc, &base);
        assert_eq!(diff, json!({"custom": true}));
    }

    #[test]
    fn extract_additions_keeps_only_differing_evolutions() {
        let base = json!({"evolutions": [{"id": "to-vaporeon", "result": "vaporeon"}]});
        let doc = json!({"evolutions": [
            {"id": "to-vaporeon", "result": "vaporeon"},
            {"id": "to-jolteon", "result": "jolteon"},
        ]});
        let diff = extract_additions(&doc, &base);
        assert_eq!(diff, json!({"evolutions": [{"id": "to-jolteon", "result": "jolteon"}]}));
    }

    #[test]
    fn extract_additions_renames_colliding_evolution_id() {
        let base = json!({"evolutions": [{"id": "evo", "result": "vaporeon"}]});
        let doc = json!({"evolutions": [{"id": "evo", "result": "jolteon"}]});
        let diff = extract_additions(&doc, &base);
        assert_eq!(diff["evolutions"][0]["id"], json!("evo-1"));
        assert_eq!(diff["evolutions"][0]["result"], json!("jolteon"));
    }

    #[test]
    fn extract_additions_drops_empty_evolutions_key_when_nothing_differs() {
        let base = json!({"evolutions": [{"id": "evo", "result": "vaporeon"}]});
        let doc = json!({"evolutions": [{"id": "evo", "result": "vaporeon"}]});
        let diff = extract_additions(&doc, &base);
        assert!(diff.as_object().unwrap().get("evolutions").is_none());
    }

    #[test]
    fn merge_score_full_when_diff_is_empty() {
        let diff = json!({});
        assert_eq!(merge_score(&diff, true, false), MergeLevel::Full);
    }

    #[test]
    fn merge_score_full_with_only_allowed_keys() {
        let diff = json!({"evolutions": [], "moves": []});
        assert_eq!(merge_score(&diff, true, true), MergeLevel::Full);
        assert_eq!(merge_score(&diff, true, false), MergeLevel::Partial);
    }

    #[test]
    fn merge_score_no_when_absent() {
        assert_eq!(merge_score(&json!({}), false, false), MergeLevel::No);
    }

    #[test]
    fn combine_value_unions_moves_when_enabled() {
        let existing = json!(["tackle"]);
        let incoming = json!(["thunderbolt"]);
        let combined = combine_value("moves", &existing, &incoming, false, true);
        assert_eq!(combined, json!(["tackle", "thunderbolt"]));
    }

    #[test]
    fn combine_value_overwrite_takes_incoming_on_scalar_conflict() {
        let combined = combine_value("dex_id", &json!(1), &json!(2), true, false);
        assert_eq!(combined, json!(2));
    }

    #[test]
    fn combine_value_no_overwrite_keeps_existing_on_scalar_conflict() {
        let combined = combine_value("dex_id", &json!(1), &json!(2), false, false);
        assert_eq!(combined, json!(1));
    }

    #[test]
    fn compose_final_sets_implemented_unless_excluded_pseudoform() {
        let base = json!({"name": "Unown"});
        let composed = compose_final(&base, &[], None, true, true, true, false);
        assert_eq!(composed["implemented"], json!(false));

        let composed2 = compose_final(&base, &[], None, true, false, true, false);
        assert_eq!(composed2["implemented"], json!(true));
    }

    #[test]
    fn accept_spawn_entry_renames_colliding_id() {
        let mut accepted = Vec::new();
        let mut ids = BTreeSet::new();
        accept_spawn_entry(json!({"id": "pikachu", "weight": 5}), &mut accepted, &mut ids);
        accept_spawn_entry(json!({"id": "pikachu", "weight": 10}), &mut accepted, &mut ids);
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[1]["id"], json!("pikachu-1"));
    }

    #[test]
    fn accept_spawn_entry_folds_duplicate_content() {
        let mut accepted = Vec::new();
        let mut ids = BTreeSet::new();
        accept_spawn_entry(json!({"id": "a", "weight": 5}), &mut accepted, &mut ids);
        accept_spawn_entry(json!({"id": "b", "weight": 5}), &mut accepted, &mut ids);
        assert_eq!(accepted.len(), 1);
    }
}
