//! Trophic-cascade carrying capacity — the other half of §4.3. Computes,
//! per tile, the capacity available to each species by propagating prey
//! biomass up the food web with a fixed ecological efficiency.

use evoria_data::{Species, SpeciesId, Tile, TileId};
use std::collections::HashMap;

use crate::config::CarryingCapacityConfig;
use crate::tables::trophic_capacity_factor;

/// Biomass pool available at one trophic half-step range, for one tile.
#[derive(Debug, Clone, Copy, Default)]
struct RangePool {
    biomass: f64,
}

/// Computes capacity for every (species, tile) pair at one tile, given the
/// species present there and their current population. Body-size modifiers
/// use `body_weight_g` (heavier producers get a smaller per-kg share of
/// producer capacity; heavier consumers need a larger share of prey pool).
pub fn compute_tile_capacity(
    tile: &Tile,
    species_here: &[(&Species, f64)],
    suitability: &HashMap<SpeciesId, f32>,
    global_temp_change: f32,
    global_sea_level_change: f32,
    cfg: &CarryingCapacityConfig,
) -> HashMap<SpeciesId, f64> {
    let mut capacity = HashMap::new();

    let producers: Vec<&(&Species, f64)> = species_here.iter().filter(|(s, _)| s.trophic_level < 1.5).collect();
    let producer_capacity_total = tile.resources.max(0.0) as f64 * cfg.producer_resource_multiplier;
    distribute_by_suitability_and_body(&producers, producer_capacity_total, suitability, false, &mut capacity);

    let mut ranges: Vec<f32> = species_here
        .iter()
        .map(|(s, _)| s.trophic_level)
        .filter(|t| *t >= 1.5)
        .collect();
    ranges.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ranges.dedup();

    for &range_level in &ranges {
        let prey_lo = range_level - 1.5;
        let prey_hi = range_level - 0.5;
        let prey_biomass: f64 = species_here
            .iter()
            .filter(|(s, _)| s.trophic_level >= prey_lo && s.trophic_level <= prey_hi)
            .map(|(_, pop)| *pop)
            .sum();

        let consumers: Vec<&(&Species, f64)> = species_here
            .iter()
            .filter(|(s, _)| (s.trophic_level - range_level).abs() < 0.01)
            .collect();

        if prey_biomass <= 0.0 {
            let fallback = producer_capacity_total * cfg.fallback_capacity_fraction;
            distribute_by_suitability_and_body(&consumers, fallback, suitability, true, &mut capacity);
            continue;
        }

        let available = prey_biomass * cfg.ecological_efficiency;
        distribute_by_suitability_and_body(&consumers, available, suitability, true, &mut capacity);
    }

    let mut modifier = 1.0;
    if global_temp_change.abs() > cfg.temp_change_penalty_threshold_c {
        modifier *= cfg.temp_change_penalty_factor;
    }
    if global_sea_level_change.abs() > cfg.sea_level_penalty_threshold_m {
        modifier *= cfg.sea_level_penalty_factor;
    }

    for (sid, cap) in capacity.iter_mut() {
        let trophic = species_here
            .iter()
            .find(|(s, _)| s.id == *sid)
            .map(|(s, _)| s.trophic_level)
            .unwrap_or(1.0);
        *cap *= modifier * trophic_capacity_factor(trophic);
        if !cap.is_finite() || *cap < 0.0 {
            *cap = 0.0;
        }
    }
    capacity
}

fn distribute_by_suitability_and_body(
    group: &[&(&Species, f64)],
    pool: f64,
    suitability: &HashMap<SpeciesId, f32>,
    is_consumer: bool,
    out: &mut HashMap<SpeciesId, f64>,
) {
    if group.is_empty() || pool <= 0.0 {
        return;
    }
    let weights: Vec<f64> = group
        .iter()
        .map(|(s, _)| {
            let suit = suitability.get(&s.id).copied().unwrap_or(0.5).max(0.01) as f64;
            let body_weight_g = s.body_weight_g().max(0.001);
            let body_modifier = if is_consumer {
                body_weight_g.ln().max(0.1)
            } else {
                1.0 / body_weight_g.ln().max(1.0).max(0.1)
            };
            suit * body_modifier
        })
        .collect();
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return;
    }
    for ((s, _), w) in group.iter().zip(weights.iter()) {
        out.insert(s.id, pool * (w / total_weight));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> Tile {
        Tile {
            id: 0,
            x: 0,
            y: 0,
            temperature: 15.0,
            humidity: 0.5,
            resources: 1.0,
            elevation: 10.0,
            biome: "plains".to_string(),
            cover: 0.0,
            is_lake: false,
            is_ocean: false,
        }
    }

    #[test]
    fn producer_capacity_scales_with_resources() {
        let cfg = CarryingCapacityConfig::default();
        let producer = crate::test_support::basic_species(evoria_data::DietType::Autotroph, 1.0);
        let species_here = vec![(&producer, 100.0)];
        let suit = HashMap::from([(producer.id, 0.8)]);
        let cap = compute_tile_capacity(&tile(), &species_here, &suit, 0.0, 0.0, &cfg);
        assert!(cap[&producer.id] > 0.0);
    }

    #[test]
    fn fallback_used_when_no_prey() {
        let cfg = CarryingCapacityConfig::default();
        let consumer = crate::test_support::basic_species(evoria_data::DietType::Carnivore, 3.0);
        let species_here = vec![(&consumer, 10.0)];
        let suit = HashMap::from([(consumer.id, 0.5)]);
        let cap = compute_tile_capacity(&tile(), &species_here, &suit, 0.0, 0.0, &cfg);
        assert!(cap[&consumer.id] > 0.0);
    }

    #[test]
    fn large_environmental_swing_reduces_capacity() {
        let cfg = CarryingCapacityConfig::default();
        let producer = crate::test_support::basic_species(evoria_data::DietType::Autotroph, 1.0);
        let species_here = vec![(&producer, 100.0)];
        let suit = HashMap::from([(producer.id, 0.8)]);
        let normal = compute_tile_capacity(&tile(), &species_here, &suit, 0.0, 0.0, &cfg);
        let shocked = compute_tile_capacity(&tile(), &species_here, &suit, 5.0, 0.0, &cfg);
        assert!(shocked[&producer.id] < normal[&producer.id]);
    }
}
