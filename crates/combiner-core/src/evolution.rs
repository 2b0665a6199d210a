//! Directed evolution edges (spec §3, §4.5, §4.9 request accounting).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A directed evolution relationship, `from` -> `to`, as declared by a
/// species or species-additions file. Edges may reference names not present
/// in any known entity; consumers must tolerate dangling edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionEdge {
    pub from_name: String,
    pub to_name: String,
    pub source_path: PathBuf,
    pub is_addition: bool,
}

/// Per-entity evolution request bookkeeping (spec §4.9).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionCounters {
    /// Number of evolutions this entity itself declares (edges with
    /// `from_name` equal to this entity).
    pub requested: u32,
    /// How many of those declared edges were satisfied via a
    /// species-additions edge (`is_addition == true`).
    pub request_transferred: u32,
    /// Paths of the species-additions files whose edge satisfied a request.
    pub sa_transfers_received: Vec<PathBuf>,
}

impl EvolutionCounters {
    /// Remaining, unfulfilled requests.
    pub fn remaining(&self) -> u32 {
        self.requested.saturating_sub(self.request_transferred)
    }

    /// An evolution request is "active" when it remains unfulfilled and at
    /// least one downstream entity pointing back at this one (in the same
    /// pack) has already been selected. `any_downstream_selected` is supplied
    /// by the caller, which has the cross-pack view this type does not.
    pub fn is_actively_requested(&self, any_downstream_selected: bool) -> bool {
        self.remaining() > 0 && any_downstream_selected
    }
}
