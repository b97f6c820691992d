//! Shared fixtures for the scenario integration tests, mirroring
//! `evoria_core::test_support`'s plain-struct-literal fixture style but
//! kept in `tests/` since that module is crate-private.

use evoria_core::World;
use evoria_data::{
    AbstractTraits, DietType, HabitatPopulation, HabitatType, HiddenTraits, Organ, OrganCategory, Species,
    SpeciesStatus, TaxonomicRank, Tile,
};
use std::collections::HashMap;

pub fn flat_tile(id: u32, x: u16, y: u16, temperature: f32, humidity: f32, resources: f32, cover: f32) -> Tile {
    Tile {
        id,
        x,
        y,
        temperature,
        humidity,
        resources,
        elevation: 10.0,
        biome: "plains".to_string(),
        cover,
        is_lake: false,
        is_ocean: false,
    }
}

/// A bare species with no organs and default traits, matching the shape
/// `evoria_core::test_support::basic_species` uses for unit tests.
pub fn bare_species(lineage_code: &str, diet: DietType, trophic_level: f32) -> Species {
    let abstract_traits = if diet == DietType::Autotroph { AbstractTraits::default_plant() } else { AbstractTraits::default_animal() };
    Species {
        id: uuid::Uuid::new_v4(),
        lineage_code: lineage_code.to_string(),
        parent_code: None,
        genus_code: format!("Genus{lineage_code}"),
        taxonomic_rank: TaxonomicRank::Species,
        status: SpeciesStatus::Alive,
        created_turn: 0,
        is_background: false,
        trophic_level,
        diet_type: diet,
        habitat_type: HabitatType::Terrestrial,
        morphology_stats: HashMap::new(),
        abstract_traits,
        hidden_traits: HiddenTraits::default(),
        organs: HashMap::new(),
        capabilities: Default::default(),
        dormant_genes: Default::default(),
        prey_species: Vec::new(),
        prey_preferences: HashMap::new(),
        life_form_stage: if diet == DietType::Autotroph { 2 } else { 0 },
        growth_form: None,
        achieved_milestones: Vec::new(),
        accumulated_adaptation_score: 0.0,
        last_description_update_turn: 0,
        hybrid_parent_codes: Vec::new(),
        hybrid_fertility: None,
        latin_name: format!("Testus {lineage_code}"),
        common_name: format!("test species {lineage_code}"),
        description: String::new(),
    }
}

pub fn place(world: &mut World, tile_id: u32, species_id: uuid::Uuid, population_kg: f64) {
    let mut row = HabitatPopulation::new(tile_id, species_id, 0);
    row.population = population_kg;
    row.suitability = 0.8;
    row.occupancy = 0.5;
    world.habitats.insert((tile_id, species_id), row);
}

pub fn sensory_organ(stage: u8, active: bool) -> Organ {
    let mut organ = Organ::new_primordium(OrganCategory::Sensory, "vision", 0);
    organ.evolution_stage = stage;
    organ.is_active = active;
    organ
}
