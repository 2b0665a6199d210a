//! Spawn Binder (spec §4.6).

use crate::walk;
use combiner_core::bag::Bag;
use combiner_core::entity::Form;
use combiner_core::error::Result;
use combiner_core::pack::Pack;
use std::path::{Path, PathBuf};

pub fn bind_spawns(pack: &mut Pack, show_warnings: bool) -> Result<()> {
    let spawn_files = pack.locations.spawn_pool_world.clone();
    walk::for_each_json(
        &spawn_files,
        |path, bag| bind_spawn_file(pack, path, &bag),
        |path, err| {
            if show_warnings {
                tracing::warn!("--! {}: {err}", path.display());
            }
        },
    );
    Ok(())
}

fn bind_spawn_file(pack: &mut Pack, path: &Path, bag: &Bag) {
    for entry in bag.get("spawns").array() {
        let Some(pokemon) = entry.get("pokemon").as_str().map(str::to_string) else {
            continue;
        };
        bind_spawn_entry(pack, path, &pokemon);
    }
}

/// Parse `<name>[<SP><aspect-expr>]` and attach `path` to the matching
/// form(s), synthesizing one if needed (spec §4.6 steps 1-4).
fn bind_spawn_entry(pack: &mut Pack, path: &Path, pokemon: &str) {
    let mut parts = pokemon.splitn(2, ' ');
    let name = parts.next().unwrap_or("").to_lowercase();
    if name.is_empty() {
        return;
    }
    let rest = parts.next();

    let aspect = rest.and_then(|expr| resolve_aspect(pack, &name, expr));
    let (name, aspect) = match aspect {
        Some(a) => (name, Some(a)),
        None => fallback_underscore_aspect(&name),
    };

    let entity = pack.get_or_create_entity(&name);

    let Some(aspect) = aspect else {
        attach_spawn_path(entity.base_form_mut(), path);
        return;
    };

    let matches = entity.forms_matching_aspect(&aspect);
    if matches.is_empty() {
        let idx = entity.insert_form(Form::new(format!("--{aspect}")));
        entity.forms[idx].aspects.push(aspect);
        attach_spawn_path(&mut entity.forms[idx], path);
    } else {
        for idx in matches {
            attach_spawn_path(&mut entity.forms[idx], path);
        }
    }
}

fn attach_spawn_path(form: &mut Form, path: &Path) {
    form.spawn_pool.insert(path.to_path_buf());
}

/// `<key>=<value>`: true/false booleans select or discard the key as an
/// aspect; `form=<value>` is handled by the caller via fallback naming;
/// `<featName>=<choice>` resolves through the Feature Registry.
fn resolve_aspect(pack: &Pack, _entity_name: &str, expr: &str) -> Option<String> {
    if let Some((key, value)) = expr.split_once('=') {
        match value {
            "true" => return Some(key.to_string()),
            "false" => return None,
            _ => {
                if key.eq_ignore_ascii_case("form") {
                    return Some(value.to_string());
                }
                if let Some(feature) = pack.features.values().find(|f| f.matches_name(key)) {
                    return feature.format_aspect(value);
                }
                return None;
            }
        }
    }
    Some(expr.to_string())
}

fn fallback_underscore_aspect(name: &str) -> (String, Option<String>) {
    if let Some((base, suffix)) = name.split_once('_') {
        (base.to_string(), Some(suffix.to_string()))
    } else {
        (name.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn spawn_file(tmp: &tempfile::TempDir, name: &str, pokemon: &str) -> PathBuf {
        let path = tmp.path().join(name);
        fs::write(
            &path,
            format!(r#"{{"spawns":[{{"pokemon":"{pokemon}"}}]}}"#),
        )
        .unwrap();
        path
    }

    #[test]
    fn plain_name_attaches_to_base_form() {
        let tmp = tempfile::tempdir().unwrap();
        let path = spawn_file(&tmp, "a.json", "pikachu");

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.spawn_pool_world.insert(path.clone());
        bind_spawns(&mut pack, true).unwrap();

        let entity = pack.entity("pikachu").unwrap();
        assert!(entity.base_form().spawn_pool.contains(&path));
    }

    #[test]
    fn unknown_aspect_synthesizes_form() {
        let tmp = tempfile::tempdir().unwrap();
        let path = spawn_file(&tmp, "a.json", "tauros paldea_combat");

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.spawn_pool_world.insert(path.clone());
        bind_spawns(&mut pack, true).unwrap();

        let entity = pack.entity("tauros").unwrap();
        let idx = entity.find_form("--paldea_combat").unwrap();
        assert!(entity.forms[idx].spawn_pool.contains(&path));
    }

    #[test]
    fn boolean_key_true_becomes_aspect() {
        let tmp = tempfile::tempdir().unwrap();
        let path = spawn_file(&tmp, "a.json", "rotom wash=true");

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.spawn_pool_world.insert(path.clone());
        bind_spawns(&mut pack, true).unwrap();

        let entity = pack.entity("rotom").unwrap();
        let idx = entity.find_form("--wash").unwrap();
        assert!(entity.forms[idx].aspects.contains(&"wash".to_string()));
    }

    #[test]
    fn unknown_entity_auto_creates_minimal_entity() {
        let tmp = tempfile::tempdir().unwrap();
        let path = spawn_file(&tmp, "a.json", "ghostmon");

        let mut pack = Pack::new("p1", tmp.path().to_path_buf());
        pack.locations.spawn_pool_world.insert(path);
        bind_spawns(&mut pack, true).unwrap();

        let entity = pack.entity("ghostmon").unwrap();
        assert_eq!(entity.dex_id, -1);
    }
}
