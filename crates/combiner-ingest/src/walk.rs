//! JSON Walker (spec §4.3).
//!
//! Design Note: "Decorator-based file iteration" — replaced with an
//! explicit higher-order function holding the single skip-on-parse-failure
//! policy, rather than a `safe_parse_per_file` decorator.

use combiner_core::bag::Bag;
use combiner_core::schema::read_json;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Visit every path in `paths`, reading and parsing each as JSON. Files
/// that fail to decode/parse are skipped and reported via `on_skip`
/// (gated by the caller on `Settings.show_warnings`); `handler` runs only
/// for files that parsed successfully.
pub fn for_each_json(
    paths: &BTreeSet<PathBuf>,
    mut handler: impl FnMut(&Path, Bag),
    mut on_skip: impl FnMut(&Path, &combiner_core::error::CombinerError),
) {
    for path in paths {
        match read_json(path) {
            Ok(bag) => handler(path, bag),
            Err(err) => on_skip(path, &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_bad_files_and_visits_good_ones() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("good.json");
        let bad = tmp.path().join("bad.json");
        std::fs::write(&good, r#"{"a":1}"#).unwrap();
        std::fs::write(&bad, "{not json").unwrap();

        let mut paths = BTreeSet::new();
        paths.insert(good.clone());
        paths.insert(bad.clone());

        let mut visited = Vec::new();
        let mut skipped = Vec::new();
        for_each_json(
            &paths,
            |path, bag| visited.push((path.to_path_buf(), bag)),
            |path, _err| skipped.push(path.to_path_buf()),
        );

        assert_eq!(visited, vec![(good, Bag(serde_json::json!({"a": 1})))]);
        assert_eq!(skipped, vec![bad]);
    }
}
