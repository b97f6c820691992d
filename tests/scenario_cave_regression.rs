//! Regression of light-dependence in a dark cave: a sighted species pushed
//! into near-zero ambient light should lose `light_need` and eventually
//! shut down its sensory organ.

mod common;

use evoria_core::{SimConfig, TurnPipeline, World};
use evoria_data::{DietType, EnvironmentDelta, LineageEventKind};

#[test]
fn sighted_species_regresses_in_deep_darkness() {
    let mut world = World::new(1, 1, 7);
    world.tiles.insert(0, common::flat_tile(0, 0, 0, 12.0, 0.6, 0.6, 0.0));

    let mut dweller = common::bare_species("C1", DietType::Carnivore, 2.5);
    dweller.abstract_traits.set_clamped("light_need", 8.0);
    dweller.organs.insert("sensory".to_string(), common::sensory_organ(4, true));
    let sid = dweller.id;
    world.species.insert(sid, dweller);
    common::place(&mut world, 0, sid, 500.0);

    let mut config = SimConfig::default();
    // Check for regression every turn instead of every 5th, so 15 turns
    // give many independent rolls at the 30% organ-deactivation chance.
    config.adaptation.regression_check_turns = 1;
    let mut pipeline = TurnPipeline::new(world, config);

    let mut regression_events = 0u32;
    let mut organ_deactivated = false;
    for _ in 0..15 {
        let report = pipeline.run_turn(EnvironmentDelta { light_level: 0.02, ..Default::default() }).expect("turn runs");
        for event in &report.lineage_events {
            if event.event_type == LineageEventKind::Regression && event.lineage_code == "C1" {
                regression_events += 1;
                if event.payload["deactivated_organs"].as_array().map(|a| !a.is_empty()).unwrap_or(false) {
                    organ_deactivated = true;
                }
            }
        }
    }

    assert!(regression_events > 0, "deep darkness over 15 checks should log at least one regression event");

    let final_species = &pipeline.world.species[&sid];
    let light_need = final_species.abstract_traits.get("light_need");
    assert!(light_need <= 5.0, "light_need {light_need} should have dropped from its starting value of 8.0");

    let organ_inactive = !final_species.organs.get("sensory").map(|o| o.is_active).unwrap_or(true);
    assert!(
        organ_deactivated || organ_inactive,
        "sensory organ should be deactivated at least once across 15 independent 30%-chance rolls"
    );
}
