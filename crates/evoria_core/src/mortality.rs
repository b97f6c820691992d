//! Mortality engine — stage 4. Per-tile death rates from tolerance
//! mismatch, competition, predation, disease, and Allee effects, then
//! aggregated to a species-level result. See component design §4.3.

use evoria_data::{Pressure, PressureKind, Species, SpeciesId, TileHealthBucket, TileId, Tile};
use std::collections::HashMap;

use crate::competition::competition_factor;
use crate::config::{CompetitionConfig, MortalityConfig};

#[derive(Debug, Clone, Default)]
pub struct TileMortality {
    pub death_rate: f32,
    pub deaths: f64,
    pub survivors: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MortalityResult {
    pub species_id: Option<SpeciesId>,
    pub best_tile_rate: f32,
    pub worst_tile_rate: f32,
    pub healthy_tiles: u32,
    pub warning_tiles: u32,
    pub critical_tiles: u32,
    pub refuge_available: bool,
    pub per_tile: HashMap<TileId, TileMortality>,
}

/// Tolerance mismatch contribution: distance between a tile's conditions
/// and a species' tolerance traits, in [0,1] per axis.
fn tolerance_mismatch(species: &Species, tile: &Tile) -> f32 {
    let heat_gap = if tile.temperature > 20.0 {
        (1.0 - species.abstract_traits.get("heat_tolerance") / 10.0).max(0.0)
    } else if tile.temperature < 5.0 {
        (1.0 - species.abstract_traits.get("cold_tolerance") / 10.0).max(0.0)
    } else {
        0.0
    };
    let preferred_humidity = 1.0 - species.abstract_traits.get("drought_tolerance") / 10.0;
    let humidity_gap = (tile.humidity - preferred_humidity).abs();
    let salinity_gap = if tile.is_ocean {
        (1.0 - species.abstract_traits.get("salinity_tolerance") / 10.0).max(0.0) * 0.3
    } else {
        0.0
    };
    let light_gap = (species.abstract_traits.get("light_need") / 10.0 - tile.cover).abs() * 0.2;

    (heat_gap + humidity_gap + salinity_gap + light_gap).clamp(0.0, 1.0)
}

fn competition_pressure(co_inhabitants: &[(SpeciesId, f32, f32)], cfg: &CompetitionConfig) -> f32 {
    co_inhabitants
        .iter()
        .map(|&(_other_id, similarity, occupancy)| similarity * occupancy * competition_factor(similarity, cfg))
        .sum()
}

fn predation_pressure(prey_population: f64, predators: &[(f64, f32)], preference_scale: f32) -> f32 {
    let _ = prey_population;
    let mut total = 0.0f32;
    for &(predator_population, preference) in predators {
        total += (predator_population as f32).max(0.0).ln_1p() * preference * preference_scale * 0.01;
    }
    total.clamp(0.0, 1.0)
}

/// Context for computing a single (species, tile) mortality cell, gathered
/// once per tile by the caller to avoid recomputing co-inhabitant lookups
/// per species.
pub struct MortalityContext<'a> {
    pub tile: &'a Tile,
    pub pressures: &'a [Pressure],
    /// `(other_species_similarity, other_species_occupancy)` for same-layer
    /// co-inhabitants at this tile.
    pub co_inhabitants: Vec<(SpeciesId, f32, f32)>,
    /// `(predator_population_kg, preference_weight)` for every predator
    /// that lists this species as prey.
    pub predators: Vec<(f64, f32)>,
}

pub fn compute_tile_mortality(
    species: &Species,
    population: f64,
    ctx: &MortalityContext,
    cfg: &MortalityConfig,
    comp_cfg: &CompetitionConfig,
) -> TileMortality {
    if population <= 0.0 {
        return TileMortality { death_rate: 0.0, deaths: 0.0, survivors: 0.0 };
    }

    let mismatch = tolerance_mismatch(species, ctx.tile);
    let competition = competition_pressure(&ctx.co_inhabitants, comp_cfg);
    let predation = predation_pressure(population, &ctx.predators, 1.0);
    let disease = disease_pressure(population, cfg);

    let mut total = mismatch + competition + predation + disease;

    let mvp = cfg.minimum_viable_population_kg;
    let allee = population < mvp;
    if allee {
        total *= 1.0 + cfg.allee_mortality_weight * (1.0 - (population / mvp) as f32);
    }

    let pressure_magnitude: f32 = ctx
        .pressures
        .iter()
        .filter(|p| p.tile_ids.contains(&ctx.tile.id))
        .map(|p| p.magnitude)
        .sum();
    total += pressure_magnitude * 0.01;

    let death_rate = total.clamp(cfg.death_rate_floor, cfg.death_rate_ceiling);
    let deaths = population * death_rate as f64;
    let survivors = population - deaths;
    TileMortality { death_rate, deaths, survivors }
}

fn disease_pressure(population: f64, cfg: &MortalityConfig) -> f32 {
    let crowding = (population / 1.0e7).min(3.0) as f32;
    if crowding < cfg.disease_density_threshold {
        0.0
    } else {
        (crowding - cfg.disease_density_threshold) * 0.1
    }
}

/// Rolls up per-tile mortality for one species into the species-level
/// `MortalityResult` the pipeline carries forward (spec §4.3).
pub fn aggregate_species_mortality(species_id: SpeciesId, per_tile: HashMap<TileId, TileMortality>) -> MortalityResult {
    let mut result = MortalityResult {
        species_id: Some(species_id),
        best_tile_rate: f32::MAX,
        worst_tile_rate: f32::MIN,
        ..Default::default()
    };
    for tm in per_tile.values() {
        result.best_tile_rate = result.best_tile_rate.min(tm.death_rate);
        result.worst_tile_rate = result.worst_tile_rate.max(tm.death_rate);
        match TileHealthBucket::from_death_rate(tm.death_rate) {
            TileHealthBucket::Healthy => result.healthy_tiles += 1,
            TileHealthBucket::Warning => result.warning_tiles += 1,
            TileHealthBucket::Critical => result.critical_tiles += 1,
        }
        if tm.death_rate < 0.15 {
            result.refuge_available = true;
        }
    }
    if per_tile.is_empty() {
        result.best_tile_rate = 0.0;
        result.worst_tile_rate = 0.0;
    }
    result.per_tile = per_tile;
    result
}

/// Mass-conservation check required by spec §8: `deaths + survivors` must
/// equal the initial population exactly (up to float tolerance).
pub fn check_mass_conservation(initial: f64, tm: &TileMortality) -> bool {
    (tm.deaths + tm.survivors - initial).abs() < 1e-6 * initial.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evoria_data::PressureDirection;

    fn flat_tile() -> Tile {
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

    fn herbivore() -> Species {
        crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0)
    }

    #[test]
    fn mass_conserved_for_any_rate() {
        let sp = herbivore();
        let ctx = MortalityContext { tile: &flat_tile(), pressures: &[], co_inhabitants: vec![], predators: vec![] };
        let cfg = MortalityConfig::default();
        let comp_cfg = CompetitionConfig::default();
        let tm = compute_tile_mortality(&sp, 1000.0, &ctx, &cfg, &comp_cfg);
        assert!(check_mass_conservation(1000.0, &tm));
    }

    #[test]
    fn death_rate_bounded() {
        let sp = herbivore();
        let mut ctx = MortalityContext { tile: &flat_tile(), pressures: &[], co_inhabitants: vec![], predators: vec![] };
        ctx.pressures = &[];
        let cfg = MortalityConfig::default();
        let comp_cfg = CompetitionConfig::default();
        let tm = compute_tile_mortality(&sp, 1000.0, &ctx, &cfg, &comp_cfg);
        assert!(tm.death_rate >= cfg.death_rate_floor && tm.death_rate <= cfg.death_rate_ceiling);
    }

    #[test]
    fn allee_increases_mortality_below_minimum_viable() {
        let sp = herbivore();
        let ctx = MortalityContext { tile: &flat_tile(), pressures: &[], co_inhabitants: vec![], predators: vec![] };
        let cfg = MortalityConfig::default();
        let comp_cfg = CompetitionConfig::default();
        let low = compute_tile_mortality(&sp, 5.0, &ctx, &cfg, &comp_cfg);
        let high = compute_tile_mortality(&sp, 5000.0, &ctx, &cfg, &comp_cfg);
        assert!(low.death_rate >= high.death_rate);
        let _ = PressureDirection::Cold;
        let _ = PressureKind::Drought;
    }
}
