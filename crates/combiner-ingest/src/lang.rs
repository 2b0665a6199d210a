//! Lang Binder (spec §3, §4.9).
//!
//! Each lang file is a flat `{key: value}` JSON object; non-string values
//! are skipped rather than rejecting the whole file.

use crate::walk;
use combiner_core::error::Result;
use combiner_core::lang::LangEntry;
use combiner_core::pack::Pack;
use std::collections::BTreeMap;

pub fn bind_lang(pack: &mut Pack, show_warnings: bool) -> Result<()> {
    let lang_files = pack.locations.lang.clone();
    walk::for_each_json(
        &lang_files,
        |path, bag| {
            let source: BTreeMap<String, String> = bag
                .entries()
                .into_iter()
                .filter_map(|(key, value)| value.as_str().map(|s| (key, s.to_string())))
                .collect();
            pack.lang_entries.push(LangEntry::from_source(path.to_path_buf(), source));
        },
        |path, err| {
            if show_warnings {
                tracing::warn!("--! {}: {err}", path.display());
            }
        },
    );

    Ok(())
}
