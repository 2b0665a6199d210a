//! Archive extraction, layout probing, and the binders that assemble a
//! [`combiner_core::pack::Pack`] from an extracted source tree.

pub mod animations;
pub mod evolution;
pub mod extract;
pub mod features;
pub mod lang;
pub mod probe;
pub mod pseudoform;
pub mod resolvers;
pub mod sounds;
pub mod spawns;
pub mod species;
pub mod walk;
pub mod workspace;

use combiner_core::error::Result;
use combiner_core::pack::Pack;
use std::path::Path;

/// Ingest a single extracted pack root through the full binder pipeline,
/// producing an assembled [`Pack`] (spec §2 dataflow).
pub fn load_pack(name: &str, extracted_root: &Path, show_warnings: bool) -> Result<Pack> {
    let locations = probe::probe(extracted_root);
    let mut pack = Pack::new(name, extracted_root.to_path_buf());
    pack.is_base = locations.is_base;
    pack.is_mod = locations.is_mod;
    pack.locations = locations.locations;

    features::load_features(&mut pack, show_warnings)?;
    species::build_species_graph(&mut pack, show_warnings)?;
    evolution::tally_evolution_requests(&mut pack);
    spawns::bind_spawns(&mut pack, show_warnings)?;
    let indexes = resolvers::build_asset_indexes(&pack);
    resolvers::bind_resolvers(&mut pack, &indexes, show_warnings)?;
    animations::link_animations(&mut pack, show_warnings)?;
    sounds::bind_sounds(&mut pack, show_warnings)?;
    lang::bind_lang(&mut pack, show_warnings)?;
    pseudoform::detect_pseudoforms(&mut pack);

    Ok(pack)
}
