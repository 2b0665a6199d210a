//! Sounds for one entity (spec §3, §4.9).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoundEntry {
    pub internal_name: String,
    /// move name -> set of `.ogg` paths serving that move.
    pub moves: BTreeMap<String, BTreeSet<PathBuf>>,
    /// Loose `.ogg` files not tied to a specific move.
    pub unassigned: BTreeSet<PathBuf>,
    /// The raw `sounds.json` payload fragment(s) this entry was built from,
    /// kept so the Exporter can re-emit it verbatim when re-combining.
    pub payload: BTreeMap<String, Value>,
}

impl SoundEntry {
    pub fn new(internal_name: impl Into<String>) -> Self {
        Self {
            internal_name: internal_name.into(),
            moves: BTreeMap::new(),
            unassigned: BTreeSet::new(),
            payload: BTreeMap::new(),
        }
    }

    pub fn add_move_sound(&mut self, mv: impl Into<String>, path: PathBuf) {
        self.moves.entry(mv.into()).or_default().insert(path);
    }

    pub fn add_unassigned(&mut self, path: PathBuf) {
        self.unassigned.insert(path);
    }
}
