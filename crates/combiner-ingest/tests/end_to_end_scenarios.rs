//! Full-pipeline coverage of the end-to-end scenarios from spec §8 that
//! exercise ingestion alone (no resolution/export involved).

use combiner_ingest::load_pack;
use std::fs;

fn write(path: &std::path::Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Scenario 3: aspect-form creation from spawn.
#[test]
fn spawn_entry_synthesizes_missing_aspect_form() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    write(
        &root.join("data/cobblemon/species/tauros.json"),
        r#"{"name":"Tauros","nationalPokedexNumber":128}"#,
    );
    write(
        &root.join("data/cobblemon/spawn_pool_world/tauros.json"),
        r#"{"spawns":[{"pokemon":"tauros paldea_combat=true"}]}"#,
    );

    let pack = load_pack("P1", root, true).unwrap();
    let entity = pack.entity("tauros").unwrap();

    let idx = entity.find_form("--paldea_combat").expect("synthetic form should exist");
    let form = &entity.forms[idx];
    assert_eq!(form.aspects, vec!["paldea_combat".to_string()]);
    assert!(!form.spawn_pool.is_empty());
}

/// Scenario 4: two resolvers for the same entity both declaring order 0.
#[test]
fn colliding_resolver_orders_get_remapped() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    write(
        &root.join("data/cobblemon/species/eevee.json"),
        r#"{"name":"Eevee","nationalPokedexNumber":133}"#,
    );
    write(
        &root.join("assets/cobblemon/bedrock/pokemon/resolvers/eevee_a.json"),
        r#"{"species":"cobblemon:eevee","order":0,"variations":[]}"#,
    );
    write(
        &root.join("assets/cobblemon/bedrock/pokemon/resolvers/eevee_b.json"),
        r#"{"species":"cobblemon:eevee","order":0,"variations":[]}"#,
    );

    let pack = load_pack("P1", root, true).unwrap();
    let entity = pack.entity("eevee").unwrap();

    assert_eq!(entity.resolvers.len(), 2);
    assert!(entity.resolvers.contains_key(&0));
    assert!(entity.resolvers.keys().any(|&k| k < 0));
}

/// Scenario 6: evolution request accounting, declaring-entity side.
#[test]
fn evolution_result_increments_the_declaring_entitys_request_count() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    write(
        &root.join("data/cobblemon/species/eevee.json"),
        r#"{"name":"Eevee","nationalPokedexNumber":133,"evolutions":[{"result":"vaporeon"}]}"#,
    );

    let pack = load_pack("Base", root, true).unwrap();
    let eevee = pack.entity("eevee").unwrap();

    assert_eq!(eevee.evolution.requested, 1);
    assert_eq!(eevee.evolution.request_transferred, 0);
    assert!(!eevee.evolution.is_actively_requested(true));
    assert_eq!(pack.evolutions.len(), 1);
    assert_eq!(pack.evolutions[0].to_name, "vaporeon");
}

/// Scenario 6, continued: an addition edge marks the request transferred.
#[test]
fn addition_evolution_edge_marks_request_transferred() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    write(
        &root.join("data/cobblemon/species/eevee.json"),
        r#"{"name":"Eevee","nationalPokedexNumber":133}"#,
    );
    write(
        &root.join("data/cobblemon/species_additions/eevee_evo.json"),
        r#"{"target":"cobblemon:eevee","evolutions":[{"result":"vaporeon"}]}"#,
    );

    let pack = load_pack("P1", root, true).unwrap();
    let eevee = pack.entity("eevee").unwrap();

    assert_eq!(eevee.evolution.requested, 1);
    assert_eq!(eevee.evolution.request_transferred, 1);
    assert_eq!(eevee.evolution.sa_transfers_received.len(), 1);
    assert!(!eevee.evolution.is_actively_requested(true));
}
