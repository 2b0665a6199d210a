//! Evolution Request Accounting (spec §4.9).
//!
//! Runs after the Species Graph Builder has populated `pack.evolutions`
//! (the Evolution Collector's accumulated edges); tallies, per entity, how
//! many evolutions it has declared and how many of those were satisfied by
//! a species-additions edge.

use combiner_core::pack::Pack;

pub fn tally_evolution_requests(pack: &mut Pack) {
    let edges = pack.evolutions.clone();
    for edge in &edges {
        let Some(entity) = pack.entities.get_mut(&edge.from_name) else {
            continue;
        };
        entity.evolution.requested += 1;
        if edge.is_addition {
            entity.evolution.request_transferred += 1;
            entity.evolution.sa_transfers_received.push(edge.source_path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combiner_core::evolution::EvolutionEdge;

    #[test]
    fn counts_declared_evolutions_on_the_declaring_entity() {
        let mut pack = Pack::new("p1", "/tmp/p1".into());
        pack.get_or_create_entity("eevee");
        pack.evolutions.push(EvolutionEdge {
            from_name: "eevee".to_string(),
            to_name: "vaporeon".to_string(),
            source_path: "eevee.json".into(),
            is_addition: false,
        });

        tally_evolution_requests(&mut pack);

        let eevee = pack.entity("eevee").unwrap();
        assert_eq!(eevee.evolution.requested, 1);
        assert_eq!(eevee.evolution.request_transferred, 0);
        assert!(!eevee.evolution.is_actively_requested(true));
    }

    #[test]
    fn addition_edges_mark_the_request_transferred() {
        let mut pack = Pack::new("p1", "/tmp/p1".into());
        pack.get_or_create_entity("eevee");
        pack.evolutions.push(EvolutionEdge {
            from_name: "eevee".to_string(),
            to_name: "vaporeon".to_string(),
            source_path: "additions/eevee.json".into(),
            is_addition: true,
        });

        tally_evolution_requests(&mut pack);

        let eevee = pack.entity("eevee").unwrap();
        assert_eq!(eevee.evolution.requested, 1);
        assert_eq!(eevee.evolution.request_transferred, 1);
        assert_eq!(eevee.evolution.sa_transfers_received, vec![std::path::PathBuf::from("additions/eevee.json")]);
        assert!(!eevee.evolution.is_actively_requested(true));
    }

    #[test]
    fn dangling_edges_with_no_declaring_entity_are_ignored() {
        let mut pack = Pack::new("p1", "/tmp/p1".into());
        pack.evolutions.push(EvolutionEdge {
            from_name: "ghost".to_string(),
            to_name: "vaporeon".to_string(),
            source_path: "eevee.json".into(),
            is_addition: false,
        });

        tally_evolution_requests(&mut pack);
        assert!(pack.entity("ghost").is_none());
    }
}
