//! Resolution Engine — CHOOSE mode (spec §4.11).

use crate::chooser::{Candidate, Chooser};
use combiner_core::entity::{FormCompStamp, ResolverCompStamp};
use combiner_core::pack::Pack;
use std::collections::BTreeMap;

/// The combined 9-field completeness stamp used by the CHOOSE-mode rule
/// table (spec §3 Glossary "comp_stamp"): per-form plus per-resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompStamp {
    pub form: FormCompStamp,
    pub resolver: ResolverCompStamp,
}

impl CompStamp {
    pub fn has_spawn(&self) -> bool {
        self.form.has_spawn
    }
    pub fn has_graphics(&self) -> bool {
        self.resolver.has_any_graphics()
    }
    /// All of model/poser/animation/texture/shiny present.
    pub fn graphics_complete(&self) -> bool {
        self.resolver.has_model
            && self.resolver.has_poser
            && self.resolver.has_animation
            && self.resolver.has_texture
    }
}

/// comp_stamp for `entity_name`'s base form in `pack`, over its first
/// assigned resolver (if any).
fn comp_stamp_for(pack: &Pack, entity_name: &str) -> CompStamp {
    let Some(entity) = pack.entity(entity_name) else {
        return CompStamp::default();
    };
    let base = entity.base_form();
    let resolver_order = base.resolver_assignments.iter().next().copied();
    let resolver = resolver_order.and_then(|order| entity.resolvers.get(&order));
    CompStamp {
        form: base.has_completeness(),
        resolver: ResolverCompStamp::from_resolver(resolver),
    }
}

/// One outcome of resolving a single entity in CHOOSE mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOutcome {
    pub entity_name: String,
    pub chosen_pack: String,
    /// Rule code, matching spec.md's lettered codes (A, R, I, or a
    /// residual-phase operator pick with no code).
    pub code: &'static str,
}

/// Priority sort key (spec §4.11): ascending
/// `(count_packs_containing, -has_active_request, -max_remaining_requests,
/// -max_evos, -(max_pre_evos + max_evos))`.
fn priority_key(packs: &[Pack], entity_name: &str) -> (usize, i64, i64, i64, i64) {
    let holder: Vec<&Pack> = packs.iter().filter(|p| p.entities.contains_key(entity_name)).collect();
    let count = holder.len();

    let max_remaining = holder
        .iter()
        .filter_map(|p| p.entity(entity_name))
        .map(|e| i64::from(e.evolution.remaining()))
        .max()
        .unwrap_or(0);

    let evos_out = packs
        .iter()
        .flat_map(|p| p.evolutions.iter())
        .filter(|e| e.from_name == entity_name)
        .count() as i64;
    let evos_in = packs
        .iter()
        .flat_map(|p| p.evolutions.iter())
        .filter(|e| e.to_name == entity_name)
        .count() as i64;

    let has_active_request = holder
        .iter()
        .filter_map(|p| p.entity(entity_name))
        .any(|e| e.evolution.is_actively_requested(true));

    (
        count,
        -i64::from(has_active_request),
        -max_remaining,
        -evos_out,
        -(evos_in + evos_out),
    )
}

/// Resolve every entity present across `packs` in CHOOSE mode, returning
/// one [`ChoiceOutcome`] per entity.
pub fn resolve_choose(packs: &[Pack], process_mods: bool, chooser: &mut dyn Chooser) -> Vec<ChoiceOutcome> {
    let mut entity_names: Vec<String> = packs
        .iter()
        .flat_map(|p| p.entities.keys().cloned())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    entity_names.sort_by_key(|name| priority_key(packs, name));

    let mut outcomes = Vec::new();
    for entity_name in entity_names {
        let holder: Vec<usize> = packs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.entities.contains_key(&entity_name))
            .map(|(i, _)| i)
            .collect();

        if let Some(outcome) = resolve_entity(packs, &entity_name, &holder, process_mods, chooser) {
            outcomes.push(outcome);
        }
    }
    outcomes
}

fn resolve_entity(
    packs: &[Pack],
    entity_name: &str,
    holder: &[usize],
    process_mods: bool,
    chooser: &mut dyn Chooser,
) -> Option<ChoiceOutcome> {
    if holder.len() == 1 {
        let idx = holder[0];
        return Some(ChoiceOutcome {
            entity_name: entity_name.to_string(),
            chosen_pack: packs[idx].name.clone(),
            code: "A",
        });
    }

    if holder.len() == 2 {
        if let Some(outcome) = apply_two_way_rules(packs, entity_name, holder, process_mods) {
            return Some(outcome);
        }
    }

    // Residual: prompt the operator with a numbered list (spec §4.11 phase 3).
    let candidates: Vec<Candidate> = holder
        .iter()
        .map(|&i| Candidate {
            pack_name: packs[i].name.clone(),
            is_base: packs[i].is_base,
            is_mod: packs[i].is_mod,
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let chosen = chooser.pick(entity_name, &candidates);
    Some(ChoiceOutcome {
        entity_name: entity_name.to_string(),
        chosen_pack: chosen,
        code: "",
    })
}

/// The two-way Against-BASE rules (a)/(b) of spec §4.11, plus the
/// only-mods-ignore short-circuit. The remaining named rule families
/// (G/G2/CARD*/G3-R..G5c-R) are not fully specified by predicate in the
/// source spec — left to the residual operator prompt rather than
/// guessed (see DESIGN.md).
fn apply_two_way_rules(
    packs: &[Pack],
    entity_name: &str,
    holder: &[usize],
    process_mods: bool,
) -> Option<ChoiceOutcome> {
    let [a, b] = [holder[0], holder[1]];
    let base_idx = holder.iter().copied().find(|&i| packs[i].is_base);

    if let Some(base_idx) = base_idx {
        let other_idx = if base_idx == a { b } else { a };
        let base_stamp = comp_stamp_for(&packs[base_idx], entity_name);
        let other_stamp = comp_stamp_for(&packs[other_idx], entity_name);

        // (a) BASE lacks spawn AND other has spawn, AND (BASE lacks
        // textures AND other has, OR BASE's graphics quintuple is
        // incomplete while other's is complete) -> choose other.
        let rule_a = !base_stamp.has_spawn()
            && other_stamp.has_spawn()
            && ((!base_stamp.resolver.has_texture && other_stamp.resolver.has_texture)
                || (!base_stamp.graphics_complete() && other_stamp.graphics_complete()));
        if rule_a {
            return Some(ChoiceOutcome {
                entity_name: entity_name.to_string(),
                chosen_pack: packs[other_idx].name.clone(),
                code: "R",
            });
        }

        // (b) BASE lacks spawn but has graphics, other has spawn but no
        // graphics -> choose other.
        let rule_b = !base_stamp.has_spawn()
            && base_stamp.has_graphics()
            && other_stamp.has_spawn()
            && !other_stamp.has_graphics();
        if rule_b {
            return Some(ChoiceOutcome {
                entity_name: entity_name.to_string(),
                chosen_pack: packs[other_idx].name.clone(),
                code: "R",
            });
        }
    }

    let both_base_or_mod = holder.iter().all(|&i| packs[i].is_base || packs[i].is_mod);
    if both_base_or_mod && !process_mods {
        return Some(ChoiceOutcome {
            entity_name: entity_name.to_string(),
            chosen_pack: packs[a].name.clone(),
            code: "I",
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chooser::AutoChooser;
    use combiner_core::entity::Entity;

    fn pack_with_entity(name: &str, is_base: bool, entity_name: &str) -> Pack {
        let mut pack = Pack::new(name, format!("/tmp/{name}").into());
        pack.is_base = is_base;
        pack.entities.insert(entity_name.to_string(), Entity::new(entity_name, entity_name, 1));
        pack
    }

    #[test]
    fn singleton_entity_auto_selects_with_code_a() {
        let packs = vec![pack_with_entity("P1", false, "pikachu")];
        let mut chooser = AutoChooser::default();
        let outcomes = resolve_choose(&packs, false, &mut chooser);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].chosen_pack, "P1");
        assert_eq!(outcomes[0].code, "A");
    }

    #[test]
    fn rule_a_prefers_pack_with_spawn_and_textures_over_base() {
        let mut base = pack_with_entity("BASE", true, "pikachu");
        let mut other = pack_with_entity("P1", false, "pikachu");
        {
            let entity = other.entity_mut("pikachu").unwrap();
            entity.base_form_mut().spawn_pool.insert("spawn.json".into());
            let order = entity.insert_resolver(combiner_core::entity::ResolverEntry {
                textures: std::collections::BTreeSet::from(["a.png".into()]),
                ..combiner_core::entity::ResolverEntry::new(0, "r.json".into())
            });
            let idx = entity.base_form_idx();
            entity.forms[idx].resolver_assignments.insert(order);
        }
        let _ = &mut base;

        let packs = vec![base, other];
        let mut chooser = AutoChooser::default();
        let outcomes = resolve_choose(&packs, false, &mut chooser);
        assert_eq!(outcomes[0].chosen_pack, "P1");
        assert_eq!(outcomes[0].code, "R");
    }

    #[test]
    fn residual_phase_delegates_to_chooser() {
        let packs = vec![
            pack_with_entity("P1", false, "eevee"),
            pack_with_entity("P2", false, "eevee"),
        ];
        let mut chooser = AutoChooser::default();
        let outcomes = resolve_choose(&packs, false, &mut chooser);
        assert_eq!(outcomes[0].chosen_pack, "P1");
    }
}
