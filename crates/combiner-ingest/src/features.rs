//! Feature Registry (spec §4.4).

use crate::walk;
use combiner_core::error::Result;
use combiner_core::feature::{Feature, FeatureAssignment, FeatureKind};
use combiner_core::pack::Pack;

pub fn load_features(pack: &mut Pack, show_warnings: bool) -> Result<()> {
    let species_features = pack.locations.species_features.clone();
    walk::for_each_json(
        &species_features,
        |_path, bag| {
            let name = bag.get("name").str_or("");
            if name.is_empty() {
                return;
            }
            let kind = FeatureKind::parse(&bag.get("type").str_or("FLAG"));
            let keys = bag.get("keys").str_array();
            let is_aspect = bag.get("isAspect").bool_or(false);
            let aspect_format = bag.get("aspectFormat").as_str().map(str::to_string);
            pack.features.insert(
                name.clone(),
                Feature {
                    name,
                    kind,
                    keys,
                    is_aspect,
                    aspect_format,
                },
            );
        },
        |path, err| {
            if show_warnings {
                tracing::warn!("--! {}: {err}", path.display());
            }
        },
    );

    let assignments = pack.locations.species_feature_assignments.clone();
    walk::for_each_json(
        &assignments,
        |_path, bag| {
            let name = bag.get("name").str_or("");
            if name.is_empty() {
                return;
            }
            pack.feature_assignments.push(FeatureAssignment {
                name,
                included_entities: bag.get("entities").str_array(),
            });
        },
        |path, err| {
            if show_warnings {
                tracing::warn!("--! {}: {err}", path.display());
            }
        },
    );

    Ok(())
}
