//! Configuration for simulation parameters.
//!
//! Strongly-typed structures mapping to a `config.toml` file, one struct per
//! subsystem. `SimConfig::default()` reproduces every literal constant named
//! in the component design without requiring a config file on disk.
//!
//! ## Configuration hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls below).
//! 2. `config.toml` file (overrides defaults).
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 128
//! height = 40
//! seed = 42
//!
//! [speciation]
//! cooldown_turns = 3
//! base_rate = 0.15
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, Result};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub turn_years: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 40,
            seed: 0,
            turn_years: 1_000_000.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SuitabilityConfig {
    pub temp_weight: f32,
    pub humidity_weight: f32,
    pub resource_weight: f32,
    pub hot_threshold_c: f32,
    pub cold_threshold_c: f32,
    pub hard_min_c: f32,
    pub hard_max_c: f32,
}

impl Default for SuitabilityConfig {
    fn default() -> Self {
        Self {
            temp_weight: 0.35,
            humidity_weight: 0.30,
            resource_weight: 0.35,
            hot_threshold_c: 20.0,
            cold_threshold_c: 5.0,
            hard_min_c: -30.0,
            hard_max_c: 50.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MortalityConfig {
    pub death_rate_floor: f32,
    pub death_rate_ceiling: f32,
    pub strong_competition_similarity: f32,
    pub weak_competition_similarity: f32,
    pub strong_competition_factor: f32,
    pub weak_competition_factor: f32,
    pub disease_density_threshold: f32,
    pub minimum_viable_population_kg: f64,
    pub allee_mortality_weight: f32,
}

impl Default for MortalityConfig {
    fn default() -> Self {
        Self {
            death_rate_floor: 0.01,
            death_rate_ceiling: 0.99,
            strong_competition_similarity: 0.70,
            weak_competition_similarity: 0.50,
            strong_competition_factor: 0.8,
            weak_competition_factor: 0.3,
            disease_density_threshold: 0.8,
            minimum_viable_population_kg: 50.0,
            allee_mortality_weight: 0.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReproductionConfig {
    pub intrinsic_rate_scale: f64,
    pub generation_scale_factor: f64,
    pub survival_modifier_scale: f64,
    pub survival_modifier_floor: f64,
    pub saturation_threshold: f64,
    pub effective_rate_min: f64,
    pub effective_rate_max: f64,
    pub max_growth_per_step: f64,
    pub max_decline_per_step: f64,
    pub population_cap_kg: f64,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            intrinsic_rate_scale: 0.008,
            generation_scale_factor: 2.0,
            survival_modifier_scale: 1.5,
            survival_modifier_floor: -0.3,
            saturation_threshold: 1.2,
            effective_rate_min: -0.05,
            effective_rate_max: 0.10,
            max_growth_per_step: 0.20,
            max_decline_per_step: 0.10,
            population_cap_kg: 1.0e13,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CarryingCapacityConfig {
    pub producer_resource_multiplier: f64,
    pub ecological_efficiency: f64,
    pub fallback_capacity_fraction: f64,
    pub temp_change_penalty_threshold_c: f32,
    pub sea_level_penalty_threshold_m: f32,
    pub temp_change_penalty_factor: f64,
    pub sea_level_penalty_factor: f64,
}

impl Default for CarryingCapacityConfig {
    fn default() -> Self {
        Self {
            producer_resource_multiplier: 100_000.0,
            ecological_efficiency: 0.15,
            fallback_capacity_fraction: 0.05,
            temp_change_penalty_threshold_c: 2.0,
            sea_level_penalty_threshold_m: 10.0,
            temp_change_penalty_factor: 0.7,
            sea_level_penalty_factor: 0.7,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SpeciationConfig {
    pub cooldown_turns: u64,
    pub base_rate: f32,
    pub evolution_potential_threshold: f32,
    pub accumulated_pressure_threshold: f32,
    pub pressure_range: (f32, f32),
    pub resource_pressure_threshold: f32,
    pub death_rate_floor: f32,
    pub death_rate_ceiling: f32,
    pub accumulated_pressure_step: f32,
    pub accumulated_pressure_cap: f32,
    pub soft_cap_population: u32,
    pub offspring_jitter_probability: f32,
    pub isolation_gradient_threshold: f32,
    pub coevolution_overlap_threshold: f32,
    pub min_trait_increase_to_decrease_ratio: f32,
}

impl Default for SpeciationConfig {
    fn default() -> Self {
        Self {
            cooldown_turns: 3,
            base_rate: 0.15,
            evolution_potential_threshold: 0.35,
            accumulated_pressure_threshold: 0.2,
            pressure_range: (1.2, 15.0),
            resource_pressure_threshold: 0.7,
            death_rate_floor: 0.03,
            death_rate_ceiling: 0.70,
            accumulated_pressure_step: 0.05,
            accumulated_pressure_cap: 0.3,
            soft_cap_population: 50,
            offspring_jitter_probability: 0.30,
            isolation_gradient_threshold: 0.25,
            coevolution_overlap_threshold: 0.4,
            min_trait_increase_to_decrease_ratio: 2.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdaptationConfig {
    pub gradual_evolution_rate: f32,
    pub plant_tradeoff_probability: f32,
    pub organ_param_drift_probability: f32,
    pub organ_param_drift_min: f32,
    pub organ_param_drift_max: f32,
    pub organ_stage_progress_min: f32,
    pub organ_stage_progress_max: f32,
    pub organ_stagnation_probability: f32,
    pub organ_breakthrough_probability: f32,
    pub regression_check_turns: u64,
    pub description_refresh_drift_threshold: f32,
    pub description_refresh_min_turns: u64,
    /// Below this `EnvironmentDelta.light_level`, regression treats the
    /// environment as dark (cave/deep-sea) for the light-dependence branch.
    pub low_light_threshold: f32,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            gradual_evolution_rate: 0.15,
            plant_tradeoff_probability: 0.5,
            organ_param_drift_probability: 0.30,
            organ_param_drift_min: 0.01,
            organ_param_drift_max: 0.05,
            organ_stage_progress_min: 0.02,
            organ_stage_progress_max: 0.06,
            organ_stagnation_probability: 0.10,
            organ_breakthrough_probability: 0.05,
            regression_check_turns: 5,
            description_refresh_drift_threshold: 3.0,
            description_refresh_min_turns: 10,
            low_light_threshold: 0.2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeneFlowConfig {
    pub distance_threshold: f32,
    pub overlap_threshold: f32,
    pub base_flow_rate: f64,
    pub morphology_weight: f32,
    pub trait_weight: f32,
    pub organ_weight: f32,
    pub time_weight: f32,
    pub embedding_weight: f32,
    pub time_divergence_turns: f64,
}

impl Default for GeneFlowConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.28,
            overlap_threshold: 0.12,
            base_flow_rate: 0.03,
            morphology_weight: 0.30,
            trait_weight: 0.25,
            organ_weight: 0.25,
            time_weight: 0.20,
            embedding_weight: 0.20,
            time_divergence_turns: 500.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HybridizationConfig {
    pub max_distance: f32,
    pub fertility_full_below: f32,
    pub min_population_kg: f64,
    pub gene_diversity_boost: f32,
    pub top_n_proposed: usize,
}

impl Default for HybridizationConfig {
    fn default() -> Self {
        Self {
            max_distance: 0.70,
            fertility_full_below: 0.15,
            min_population_kg: 1_000.0,
            gene_diversity_boost: 0.10,
            top_n_proposed: 3,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CompetitionConfig {
    pub occupancy_suitability_gain_max: f32,
    pub occupancy_population_share_gain_max: f32,
    pub occupancy_long_presence_bonus: f32,
    pub occupancy_refuge_bonus_max: f32,
    pub occupancy_competition_loss_cap: f32,
    pub occupancy_decay_no_population: f32,
    pub strong_similarity: f32,
    pub weak_similarity: f32,
    pub strong_factor: f32,
    pub weak_factor: f32,
    pub embedding_weight: f32,
    pub structured_weight: f32,
}

impl Default for CompetitionConfig {
    fn default() -> Self {
        Self {
            occupancy_suitability_gain_max: 0.12,
            occupancy_population_share_gain_max: 0.08,
            occupancy_long_presence_bonus: 0.05,
            occupancy_refuge_bonus_max: 0.15,
            occupancy_competition_loss_cap: 0.15,
            occupancy_decay_no_population: 0.04,
            strong_similarity: 0.70,
            weak_similarity: 0.50,
            strong_factor: 0.8,
            weak_factor: 0.3,
            embedding_weight: 0.4,
            structured_weight: 0.6,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlantConfig {
    pub tradeoff_probability: f32,
    pub first_tree_lignification_threshold: f32,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            tradeoff_probability: 0.5,
            first_tree_lignification_threshold: 7.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AiConfig {
    pub enabled: bool,
    pub stagger_interval_ms: u64,
    pub concurrency_cap: usize,
    pub timeout_secs: u64,
    pub max_consecutive_failures: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stagger_interval_ms: 2_000,
            concurrency_cap: 3,
            timeout_secs: 90,
            max_consecutive_failures: 3,
        }
    }
}

/// Root configuration tree, deserialized from `config.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub suitability: SuitabilityConfig,
    #[serde(default)]
    pub mortality: MortalityConfig,
    #[serde(default)]
    pub reproduction: ReproductionConfig,
    #[serde(default)]
    pub carrying_capacity: CarryingCapacityConfig,
    #[serde(default)]
    pub speciation: SpeciationConfig,
    #[serde(default)]
    pub adaptation: AdaptationConfig,
    #[serde(default)]
    pub gene_flow: GeneFlowConfig,
    #[serde(default)]
    pub hybridization: HybridizationConfig,
    #[serde(default)]
    pub competition: CompetitionConfig,
    #[serde(default)]
    pub plant: PlantConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::configuration(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&text).map_err(EngineError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.speciation.cooldown_turns, 3);
        assert_eq!(cfg.gene_flow.distance_threshold, 0.28);
        assert_eq!(cfg.carrying_capacity.ecological_efficiency, 0.15);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = SimConfig::default();
        let text = toml::to_string(&cfg).expect("serialize");
        let parsed: SimConfig = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.world.width, cfg.world.width);
    }
}
