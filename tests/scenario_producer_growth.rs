//! Single producer growth to carrying capacity.

mod common;

use evoria_core::{SimConfig, TurnPipeline, World};
use evoria_data::{DietType, EnvironmentDelta, LineageEventKind};

#[test]
fn producer_settles_near_carrying_capacity_with_no_speciation() {
    let mut world = World::new(1, 1, 11);
    world.tiles.insert(0, common::flat_tile(0, 0, 0, 15.0, 0.5, 1.0, 0.0));

    let mut producer = common::bare_species("P1", DietType::Autotroph, 1.0);
    producer.morphology_stats.insert("body_length_cm".to_string(), 0.01);
    producer.abstract_traits.set_clamped("reproduction_speed", 9.0);
    let sid = producer.id;
    world.species.insert(sid, producer);
    common::place(&mut world, 0, sid, 1000.0);

    let mut pipeline = TurnPipeline::new(world, SimConfig::default());
    let mut speciation_events = 0u32;
    for _ in 0..10 {
        let report = pipeline.run_turn(EnvironmentDelta { light_level: 1.0, ..Default::default() }).expect("turn runs");
        speciation_events += report
            .lineage_events
            .iter()
            .filter(|e| e.event_type == LineageEventKind::Speciation)
            .count() as u32;
    }

    assert_eq!(speciation_events, 0, "flat single-tile environment has neither pressure nor isolation to trigger speciation");

    let population = pipeline.world.species[&sid].population_biomass_kg();
    let capacity = 1.0e5;
    assert!(population >= 0.85 * capacity, "population {population} should approach carrying capacity {capacity}");
    assert!(population <= 1.05 * capacity, "population {population} should not overshoot carrying capacity {capacity}");
}
