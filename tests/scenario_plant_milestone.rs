//! Plant milestone landing: an aquatic producer with enough drought
//! tolerance and water retention should cross onto land in its first turn.

mod common;

use evoria_core::{SimConfig, TurnPipeline, World};
use evoria_data::{DietType, EnvironmentDelta, GrowthForm, LineageEventKind};

#[test]
fn coastal_plant_lands_and_unlocks_land_organs() {
    let mut world = World::new(1, 1, 3);
    world.tiles.insert(0, common::flat_tile(0, 0, 0, 20.0, 0.4, 0.8, 0.0));

    let mut plant = common::bare_species("PL1", DietType::Autotroph, 1.0);
    plant.life_form_stage = 2;
    plant.growth_form = Some(GrowthForm::Aquatic);
    plant.abstract_traits.set_clamped("water_retention", 5.2);
    plant.abstract_traits.set_clamped("drought_tolerance", 4.3);
    let sid = plant.id;
    world.species.insert(sid, plant);
    common::place(&mut world, 0, sid, 2_000.0);

    let mut pipeline = TurnPipeline::new(world, SimConfig::default());
    let report = pipeline.run_turn(EnvironmentDelta { light_level: 1.0, ..Default::default() }).expect("turn runs");

    let milestone_logged = report
        .lineage_events
        .iter()
        .any(|e| e.event_type == LineageEventKind::Milestone && e.payload["milestone"] == "first_land_plant");
    assert!(milestone_logged, "landing should be logged as a milestone lineage event on the first eligible turn");

    let landed = &pipeline.world.species[&sid];
    assert_eq!(landed.life_form_stage, 3);
    assert!(landed.organs.contains_key("root_system"));
    assert!(landed.organs.contains_key("protection"));
    assert!(landed.achieved_milestones.contains(&"first_land_plant".to_string()));
    assert!(landed.growth_form.expect("growth form retained after landing").valid_for_stage(3));
}
