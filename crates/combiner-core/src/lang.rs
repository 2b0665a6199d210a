//! One translation file (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

const SPECIES_KEY_PREFIX: &str = "cobblemon.species.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LangEntry {
    pub file: PathBuf,
    pub source: BTreeMap<String, String>,
    /// Entity names referenced by keys of the form
    /// `cobblemon.species.<name>.<field>`, parsed once at load time.
    pub referenced_entities: BTreeSet<String>,
}

impl LangEntry {
    pub fn from_source(file: PathBuf, source: BTreeMap<String, String>) -> Self {
        let referenced_entities = source
            .keys()
            .filter_map(|key| parse_species_name(key))
            .collect();
        Self {
            file,
            source,
            referenced_entities,
        }
    }

    /// Look up the `en_us`-style display-name override for an entity:
    /// `cobblemon.species.<name>.name`.
    pub fn species_name_override(&self, internal_name: &str) -> Option<&str> {
        let key = format!("{SPECIES_KEY_PREFIX}{internal_name}.name");
        self.source.get(&key).map(String::as_str)
    }
}

/// Parse `cobblemon.species.<name>.<field>` into `<name>`.
fn parse_species_name(key: &str) -> Option<String> {
    let rest = key.strip_prefix(SPECIES_KEY_PREFIX)?;
    let (name, _field) = rest.split_once('.')?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
