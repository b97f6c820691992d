//! Isolation-triggered speciation: a species split across two tile
//! components with no grid adjacency between them must eventually branch
//! via `geographic_isolation`, since that gate alone satisfies the
//! speciation trigger regardless of ambient pressure.

mod common;

use evoria_core::{SimConfig, TurnPipeline, World};
use evoria_data::{DietType, EnvironmentDelta, LineageEventKind};

#[test]
fn disconnected_population_speciates_by_geographic_isolation() {
    // A wide, single-row world: tile 0 and tile 9 are far enough apart on
    // the grid that `World::neighbors` never links them, so the species'
    // own occupied-tile set forms two connected components.
    let mut world = World::new(10, 1, 23);
    world.tiles.insert(0, common::flat_tile(0, 0, 0, 15.0, 0.5, 1.0, 0.0));
    world.tiles.insert(9, common::flat_tile(9, 9, 0, 15.0, 0.5, 1.0, 0.0));

    let mut parent = common::bare_species("G1", DietType::Herbivore, 2.0);
    parent.hidden_traits.evolution_potential = 0.7;
    parent.morphology_stats.insert("body_length_cm".to_string(), 20.0);
    let sid = parent.id;
    world.species.insert(sid, parent);
    common::place(&mut world, 0, sid, 5_000_000.0);
    common::place(&mut world, 9, sid, 5_000_000.0);

    let mut config = SimConfig::default();
    config.world.width = 10;
    config.world.height = 1;
    let mut pipeline = TurnPipeline::new(world, config);

    let mut speciated = false;
    let mut offspring_for_g1 = 0usize;
    let mut speciation_type = String::new();
    for _ in 0..15 {
        let report = pipeline.run_turn(EnvironmentDelta { light_level: 1.0, ..Default::default() }).expect("turn runs");
        for event in &report.lineage_events {
            if event.event_type == LineageEventKind::Speciation && event.lineage_code == "G1" {
                speciated = true;
                offspring_for_g1 = event.payload["children"].as_array().map(|a| a.len()).unwrap_or(0);
                speciation_type = event.payload["speciation_type"].as_str().unwrap_or_default().to_string();
            }
        }
        if speciated {
            break;
        }
    }

    assert!(speciated, "a species split across two isolated components should branch within a handful of turns");
    assert!((1..=4).contains(&offspring_for_g1), "offspring count must stay within the [1,4] clamp");
    assert_eq!(
        speciation_type, "geographic_isolation",
        "two disconnected tile components must classify as geographic isolation, not another cause"
    );

    let children: Vec<_> = pipeline
        .world
        .species
        .values()
        .filter(|s| s.parent_code.as_deref() == Some("G1"))
        .collect();
    assert_eq!(children.len(), offspring_for_g1);

    let mut lineage_codes: Vec<&str> = children.iter().map(|s| s.lineage_code.as_str()).collect();
    lineage_codes.sort();
    lineage_codes.dedup();
    assert_eq!(lineage_codes.len(), children.len(), "sibling lineage codes must be unique");
}
