use crate::enums::{DietType, GrowthForm, HabitatType, OrganCategory, SpeciesStatus, TaxonomicRank};
use crate::organ::{DormantGenes, Organ};
use crate::traits::{AbstractTraits, HiddenTraits};
use crate::SpeciesId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The primary entity. See spec §3 for the full field-by-field contract;
/// this type holds the data only, the invariants it must satisfy are
/// enforced by `evoria_core::invariants` (a validator is easier to test
/// in isolation than a constructor that can fail in a dozen ways).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub lineage_code: String,
    pub parent_code: Option<String>,
    pub genus_code: String,
    pub taxonomic_rank: TaxonomicRank,
    pub status: SpeciesStatus,
    pub created_turn: u64,
    pub is_background: bool,

    pub trophic_level: f32,
    pub diet_type: DietType,
    pub habitat_type: HabitatType,

    pub morphology_stats: HashMap<String, f64>,
    pub abstract_traits: AbstractTraits,
    pub hidden_traits: HiddenTraits,
    /// Keyed by the organ category's canonical string name (`"locomotion"`,
    /// `"photosynthetic"`, ...) rather than the `OrganCategory` enum
    /// itself, so the map round-trips through `serde_json` the way the
    /// rest of this crate's persisted structures do.
    pub organs: HashMap<String, Organ>,
    pub capabilities: HashSet<String>,
    pub dormant_genes: DormantGenes,

    pub prey_species: Vec<String>,
    pub prey_preferences: HashMap<String, f32>,

    pub life_form_stage: u8,
    pub growth_form: Option<GrowthForm>,
    pub achieved_milestones: Vec<String>,

    pub accumulated_adaptation_score: f32,
    pub last_description_update_turn: u64,

    pub hybrid_parent_codes: Vec<String>,
    pub hybrid_fertility: Option<f32>,

    pub latin_name: String,
    pub common_name: String,
    pub description: String,
}

impl Species {
    pub fn is_plant(&self) -> bool {
        self.trophic_level < 2.0
            || self.diet_type == DietType::Autotroph
            || self.capabilities.contains("photosynthesis")
    }

    pub fn is_alive(&self) -> bool {
        self.status == SpeciesStatus::Alive
    }

    pub fn body_length_cm(&self) -> f64 {
        self.morphology_stats.get("body_length_cm").copied().unwrap_or(1.0)
    }

    pub fn body_weight_g(&self) -> f64 {
        self.morphology_stats.get("body_weight_g").copied().unwrap_or(1.0)
    }

    pub fn population_biomass_kg(&self) -> f64 {
        self.morphology_stats
            .get("population_biomass_kg")
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set_population_biomass_kg(&mut self, value: f64) {
        self.morphology_stats
            .insert("population_biomass_kg".to_string(), value.max(0.0));
    }

    pub fn generation_time_days(&self) -> f64 {
        self.morphology_stats
            .get("generation_time_days")
            .copied()
            .unwrap_or(365.0)
    }

    pub fn accumulated_speciation_pressure(&self) -> f32 {
        self.morphology_stats
            .get("accumulated_speciation_pressure")
            .copied()
            .unwrap_or(0.0) as f32
    }

    pub fn set_accumulated_speciation_pressure(&mut self, v: f32) {
        self.morphology_stats.insert(
            "accumulated_speciation_pressure".to_string(),
            v.clamp(0.0, 0.3) as f64,
        );
    }

    pub fn last_speciation_turn(&self) -> u64 {
        self.morphology_stats
            .get("last_speciation_turn")
            .copied()
            .unwrap_or(0.0) as u64
    }

    pub fn set_last_speciation_turn(&mut self, turn: u64) {
        self.morphology_stats
            .insert("last_speciation_turn".to_string(), turn as f64);
    }

    /// Ecological layer used for competition, per spec §4.9.
    pub fn ecological_layer(&self) -> u8 {
        if self.trophic_level < 1.5 {
            1
        } else if self.trophic_level < 2.5 {
            2
        } else if self.trophic_level < 3.5 {
            3
        } else if self.trophic_level < 4.5 {
            4
        } else {
            5
        }
    }
}
