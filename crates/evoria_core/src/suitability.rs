//! Suitability matrix — stage 2 of the turn pipeline.
//!
//! Computes `S[species, tile] ∈ [0,1]`, vectorised with `rayon` over the
//! (species, tile) pairs rather than nested scalar loops, mirroring the
//! teacher's `par_iter_mut()` idiom for per-entity passes.

use evoria_data::{HabitatType, Species, SpeciesId, Tile, TileId};
use rayon::prelude::*;
use std::collections::HashMap;

use crate::config::SuitabilityConfig;

/// Dense result keyed by `(species_id, tile_id)`. A `HashMap` rather than a
/// literal row-major `Vec` because species/tiles are sparse id-keyed
/// collections, not a fixed 0..n range; the computation is still a single
/// vectorised pass, not per-pair branching logic scattered through callers.
pub type SuitabilityMatrix = HashMap<(SpeciesId, TileId), f32>;

pub fn compute_suitability(
    species: &HashMap<SpeciesId, Species>,
    tiles: &HashMap<TileId, Tile>,
    cfg: &SuitabilityConfig,
) -> SuitabilityMatrix {
    let pairs: Vec<(SpeciesId, TileId)> = species
        .values()
        .filter(|s| s.is_alive())
        .flat_map(|s| tiles.keys().map(move |t| (s.id, *t)))
        .collect();

    pairs
        .into_par_iter()
        .map(|(sid, tid)| {
            let s = &species[&sid];
            let t = &tiles[&tid];
            (((sid, tid)), score_pair(s, t, cfg))
        })
        .collect()
}

fn score_pair(species: &Species, tile: &Tile, cfg: &SuitabilityConfig) -> f32 {
    if !habitat_compatible(species.habitat_type, tile) {
        return 0.0;
    }
    if tile.temperature < cfg.hard_min_c || tile.temperature > cfg.hard_max_c {
        return 0.0;
    }

    let temp_score = temperature_score(species, tile, cfg);
    let humidity_score = humidity_score(species, tile);
    let resource_score = resource_score(tile);

    (temp_score * cfg.temp_weight + humidity_score * cfg.humidity_weight + resource_score * cfg.resource_weight)
        .clamp(0.0, 1.0)
}

fn temperature_score(species: &Species, tile: &Tile, cfg: &SuitabilityConfig) -> f32 {
    if tile.temperature > cfg.hot_threshold_c {
        (species.abstract_traits.get("heat_tolerance") / 10.0).clamp(0.0, 1.0)
    } else if tile.temperature < cfg.cold_threshold_c {
        (species.abstract_traits.get("cold_tolerance") / 10.0).clamp(0.0, 1.0)
    } else {
        0.8
    }
}

fn humidity_score(species: &Species, tile: &Tile) -> f32 {
    let preferred = 1.0 - species.abstract_traits.get("drought_tolerance") / 10.0;
    (1.0 - (tile.humidity - preferred).abs()).clamp(0.0, 1.0)
}

fn resource_score(tile: &Tile) -> f32 {
    (tile.resources.max(0.0) + 1.0).ln().clamp(0.0, 1.0)
}

fn habitat_compatible(species_habitat: HabitatType, tile: &Tile) -> bool {
    let tile_hint = tile.habitat_hint();
    species_habitat == tile_hint || species_habitat.can_transition_to(tile_hint)
}

/// Spec §7 kind-4 recovery: when a species' suitability sums collapse to
/// near zero across all its occupied tiles (cumulative migration drift),
/// recompute from tiles and renormalise so the sum is at most 1 — the
/// species must not go extinct purely from this numerical condition.
pub fn recompute_habitat_suitability(
    species: &Species,
    tiles: &HashMap<TileId, Tile>,
    occupied: &[TileId],
    cfg: &SuitabilityConfig,
) -> HashMap<TileId, f32> {
    let mut raw: HashMap<TileId, f32> = occupied
        .iter()
        .filter_map(|tid| tiles.get(tid).map(|t| (*tid, score_pair(species, t, cfg))))
        .collect();
    let sum: f32 = raw.values().sum();
    if sum > 1.0 {
        for v in raw.values_mut() {
            *v /= sum;
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    fn test_species(habitat: HabitatType) -> Species {
        let mut s = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        s.habitat_type = habitat;
        s
    }

    fn test_tile(id: TileId, is_ocean: bool, temperature: f32) -> Tile {
        Tile {
            id,
            x: 0,
            y: 0,
            temperature,
            humidity: 0.5,
            resources: 1.0,
            elevation: if is_ocean { -500.0 } else { 10.0 },
            biome: "plains".to_string(),
            cover: 0.0,
            is_lake: false,
            is_ocean,
        }
    }

    #[test]
    fn habitat_mismatch_zeroes_score() {
        let s = test_species(HabitatType::Marine);
        let t = test_tile(0, false, 15.0);
        let cfg = SuitabilityConfig::default();
        assert_eq!(score_pair(&s, &t, &cfg), 0.0);
    }

    #[test]
    fn hard_temperature_extreme_zeroes_score() {
        let s = test_species(HabitatType::Terrestrial);
        let t = test_tile(0, false, 60.0);
        let cfg = SuitabilityConfig::default();
        assert_eq!(score_pair(&s, &t, &cfg), 0.0);
    }

    #[test]
    fn moderate_conditions_yield_positive_score() {
        let s = test_species(HabitatType::Terrestrial);
        let t = test_tile(0, false, 15.0);
        let cfg = SuitabilityConfig::default();
        assert!(score_pair(&s, &t, &cfg) > 0.0);
    }
}
