//! Shared species/tile fixtures for unit tests across this crate's modules.
#![cfg(test)]

use evoria_data::{AbstractTraits, DietType, HabitatType, HiddenTraits, Species};
use std::collections::HashMap;

pub fn basic_species(diet: DietType, trophic_level: f32) -> Species {
    Species {
        id: uuid::Uuid::new_v4(),
        lineage_code: "A".to_string(),
        parent_code: None,
        genus_code: "Genus".to_string(),
        taxonomic_rank: evoria_data::TaxonomicRank::Species,
        status: evoria_data::SpeciesStatus::Alive,
        created_turn: 0,
        is_background: false,
        trophic_level,
        diet_type: diet,
        habitat_type: HabitatType::Terrestrial,
        morphology_stats: HashMap::new(),
        abstract_traits: AbstractTraits::default_animal(),
        hidden_traits: HiddenTraits::default(),
        organs: HashMap::new(),
        capabilities: Default::default(),
        dormant_genes: Default::default(),
        prey_species: vec![],
        prey_preferences: HashMap::new(),
        life_form_stage: 0,
        growth_form: None,
        achieved_milestones: vec![],
        accumulated_adaptation_score: 0.0,
        last_description_update_turn: 0,
        hybrid_parent_codes: vec![],
        hybrid_fertility: None,
        latin_name: "Testus".to_string(),
        common_name: "test".to_string(),
        description: String::new(),
    }
}
