//! Reproduction — logistic growth per tile against trophic-cascade
//! capacity, plus the species-level redistribution rule. See §4.3.

use evoria_data::{SpeciesId, TileId};
use std::collections::HashMap;

use crate::config::ReproductionConfig;

/// `generations_per_turn = turn_years * 365.25 / generation_time_days`.
pub fn generations_per_turn(turn_years: f64, generation_time_days: f64) -> f64 {
    turn_years * 365.25 / generation_time_days.max(0.01)
}

pub fn generation_scale(generations_per_turn: f64, cfg: &ReproductionConfig) -> f64 {
    generations_per_turn.max(10.0).log10() / cfg.generation_scale_factor
}

/// Effective per-generation growth rate before the per-step cap, clipped
/// to `[effective_rate_min, effective_rate_max]`.
pub fn effective_growth_rate(
    reproduction_speed: f32,
    survivors: f64,
    prior_survival_rate: f64,
    capacity: f64,
    generations_per_turn: f64,
    cfg: &ReproductionConfig,
) -> f64 {
    let scale = generation_scale(generations_per_turn, cfg);
    let intrinsic = reproduction_speed as f64 * cfg.intrinsic_rate_scale * scale;

    let survival_modifier = ((prior_survival_rate - 0.5) * cfg.survival_modifier_scale).max(cfg.survival_modifier_floor);

    let saturation = if capacity > 0.0 { survivors / capacity } else { f64::INFINITY };
    let resource_modifier = if saturation > cfg.saturation_threshold {
        -(saturation - cfg.saturation_threshold) * 0.05
    } else {
        0.0
    };

    (intrinsic + survival_modifier * 0.01 + resource_modifier).clamp(cfg.effective_rate_min, cfg.effective_rate_max)
}

/// Integrates logistic growth over `generations_per_turn` steps, with a
/// per-step growth/decline cap so a multi-million-year turn can't produce
/// an instantaneous explosion or collapse.
pub fn integrate_logistic_growth(
    survivors: f64,
    capacity: f64,
    effective_rate: f64,
    generations_per_turn: f64,
    cfg: &ReproductionConfig,
) -> f64 {
    if survivors <= 0.0 {
        return 0.0;
    }
    let steps = generations_per_turn.max(1.0).round().min(64.0) as u32;
    let mut pop = survivors;
    for _ in 0..steps {
        let logistic_term = if capacity > 0.0 { 1.0 - pop / capacity } else { -1.0 };
        let step_rate = effective_rate * logistic_term;
        let bounded = step_rate.clamp(-cfg.max_decline_per_step, cfg.max_growth_per_step);
        pop *= 1.0 + bounded;
        if !pop.is_finite() || pop < 0.0 {
            pop = capacity.min(cfg.population_cap_kg).max(0.0);
            break;
        }
    }
    pop.min(cfg.population_cap_kg).max(0.0)
}

/// Full per-(species, tile) reproduction step: survivors -> new population.
pub fn reproduce_tile(
    survivors: f64,
    capacity: f64,
    reproduction_speed: f32,
    generation_time_days: f64,
    turn_years: f64,
    prior_death_rate: f32,
    cfg: &ReproductionConfig,
) -> f64 {
    if survivors <= 0.0 {
        return 0.0;
    }
    let gens = generations_per_turn(turn_years, generation_time_days);
    let prior_survival_rate = (1.0 - prior_death_rate as f64).clamp(0.0, 1.0);
    let rate = effective_growth_rate(reproduction_speed, survivors, prior_survival_rate, capacity, gens, cfg);
    integrate_logistic_growth(survivors, capacity, rate, gens, cfg)
}

/// Redistribution rule (§4.3): if the species had a prior tile
/// distribution, shares are proportional to those prior weights; a species
/// with no prior distribution (just speciated) keeps the tiles the
/// speciation stage assigned, unchanged.
pub fn redistribute(
    species_id: SpeciesId,
    total_new_population: f64,
    prior_distribution: &HashMap<TileId, f64>,
) -> HashMap<TileId, f64> {
    let prior_total: f64 = prior_distribution.values().sum();
    if prior_total <= 0.0 || prior_distribution.is_empty() {
        return HashMap::new();
    }
    prior_distribution
        .iter()
        .map(|(tid, share)| {
            let weight = share / prior_total;
            let _ = species_id;
            (*tid, total_new_population * weight)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_survivors_no_growth() {
        let cfg = ReproductionConfig::default();
        assert_eq!(reproduce_tile(0.0, 1000.0, 9.0, 30.0, 1_000_000.0, 0.1, &cfg), 0.0);
    }

    #[test]
    fn growth_stays_below_hard_cap() {
        let cfg = ReproductionConfig::default();
        let next = reproduce_tile(1000.0, 1.0e14, 9.0, 30.0, 1_000_000.0, 0.05, &cfg);
        assert!(next <= cfg.population_cap_kg);
    }

    #[test]
    fn population_approaches_capacity_over_many_turns() {
        let cfg = ReproductionConfig::default();
        let mut pop = 1000.0;
        let capacity = 1.0e5;
        for _ in 0..50 {
            pop = reproduce_tile(pop, capacity, 9.0, 30.0, 1_000_000.0, 0.05, &cfg);
        }
        assert!(pop > 0.5 * capacity);
        assert!(pop <= capacity * 1.5);
    }

    #[test]
    fn redistribution_proportional_to_prior_shares() {
        let sid = uuid::Uuid::new_v4();
        let mut prior = HashMap::new();
        prior.insert(1u32, 30.0);
        prior.insert(2u32, 70.0);
        let next = redistribute(sid, 1000.0, &prior);
        assert!((next[&1] - 300.0).abs() < 1e-6);
        assert!((next[&2] - 700.0).abs() < 1e-6);
    }

    #[test]
    fn no_prior_distribution_yields_empty_map() {
        let sid = uuid::Uuid::new_v4();
        let next = redistribute(sid, 1000.0, &HashMap::new());
        assert!(next.is_empty());
    }

    proptest::proptest! {
        /// Population non-negativity and the hard cap (spec §8) must hold
        /// no matter what survivors/capacity/reproduction-speed/death-rate
        /// combination a turn produces.
        #[test]
        fn reproduce_tile_stays_within_bounds(
            survivors in 0.0f64..1.0e12,
            capacity in 0.0f64..1.0e12,
            reproduction_speed in 0.0f32..15.0,
            generation_time_days in 1.0f64..10_000.0,
            prior_death_rate in 0.0f32..1.0,
        ) {
            let cfg = ReproductionConfig::default();
            let next = reproduce_tile(survivors, capacity, reproduction_speed, generation_time_days, 1_000_000.0, prior_death_rate, &cfg);
            prop_assert!(next >= 0.0);
            prop_assert!(next <= cfg.population_cap_kg);
            prop_assert!(next.is_finite());
        }
    }
}
