//! Black-box coverage of the `cobble-combiner` binary (spec §8, scenario
//! "two-pack identical-spawn-different-texture").

use assert_cmd::Command;
use std::fs;

fn write_species(dir: &std::path::Path, name: &str, extra: &str) {
    fs::create_dir_all(dir.join("data/cobblemon/species/gen1")).unwrap();
    fs::write(
        dir.join(format!("data/cobblemon/species/gen1/{name}.json")),
        format!(r#"{{"name": "{name}", "nationalPokedexNumber": 25, "labels": ["gen1"]{extra}}}"#),
    )
    .unwrap();
}

#[test]
fn settings_set_and_show_round_trip() {
    let tmp = tempfile::tempdir().unwrap();

    Command::cargo_bin("cobble-combiner")
        .unwrap()
        .args(["settings", "--working-dir", tmp.path().to_str().unwrap(), "--set", "POKEDEX_FIX=true"])
        .assert()
        .success();

    Command::cargo_bin("cobble-combiner")
        .unwrap()
        .args(["settings", "--working-dir", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicates::str::contains("pokedex_fix: true"));
}

#[test]
fn load_order_set_then_show_lists_packs_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("PackA")).unwrap();
    fs::create_dir_all(tmp.path().join("PackB")).unwrap();

    Command::cargo_bin("cobble-combiner")
        .unwrap()
        .args(["load-order", "--working-dir", tmp.path().to_str().unwrap(), "--set", "PackB,PackA"])
        .assert()
        .success();

    Command::cargo_bin("cobble-combiner")
        .unwrap()
        .args(["load-order", "--working-dir", tmp.path().to_str().unwrap(), "--show"])
        .assert()
        .success()
        .stdout("PackB\nPackA\n");
}

#[test]
fn combine_auto_choose_produces_output_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let pack_a = tmp.path().join("PackA");
    let pack_b = tmp.path().join("PackB");
    write_species(&pack_a, "pikachu", "");
    write_species(&pack_b, "pikachu", r#", "custom": true"#);

    Command::cargo_bin("cobble-combiner")
        .unwrap()
        .args([
            "combine",
            "--working-dir",
            tmp.path().to_str().unwrap(),
            "--mode",
            "choose",
            "--auto",
        ])
        .assert()
        .success()
        .stdout(predicates::str::contains("Wrote"));

    assert!(tmp.path().join("output/CORE_Pack.zip").exists());
}
