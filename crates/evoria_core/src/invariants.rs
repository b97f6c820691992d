//! Cross-cutting validators run at the end of a turn (the `Report` stage,
//! before `Committed`) rather than baked into constructors: a single place
//! to check the properties spec §3 and §8 require of committed state. See
//! component design §4.9 and §7 for how a violation maps to `StageOutcome`.

use evoria_data::{Species, TaxonomicRank};
use std::collections::HashSet;

use crate::error::{EngineError, Result};
use crate::tables::trophic_trait_budget;
use crate::world::World;

/// Abstract traits: each in `[0, 15]`, sum within the trophic-tier total
/// budget, at most two traits above `base_limit`, none above
/// `specialized_limit`.
pub fn validate_trait_bounds(species: &Species) -> Result<()> {
    let budget = trophic_trait_budget(species.trophic_level);
    let mut over_base = 0;
    for (name, value) in species.abstract_traits.iter() {
        if !(0.0..=15.0).contains(value) {
            return Err(EngineError::invariant(format!(
                "{}: trait {name} out of [0,15] range ({value})",
                species.lineage_code
            )));
        }
        if *value > budget.specialized_limit {
            return Err(EngineError::invariant(format!(
                "{}: trait {name} exceeds specialized limit ({value} > {})",
                species.lineage_code, budget.specialized_limit
            )));
        }
        if *value > budget.base_limit {
            over_base += 1;
        }
    }
    if over_base > 2 {
        return Err(EngineError::invariant(format!(
            "{}: {over_base} traits exceed base limit, at most 2 allowed",
            species.lineage_code
        )));
    }
    let sum = species.abstract_traits.sum();
    if sum > budget.total_limit {
        return Err(EngineError::invariant(format!(
            "{}: trait sum {sum} exceeds trophic total limit {}",
            species.lineage_code, budget.total_limit
        )));
    }
    Ok(())
}

/// Predator trophic level must exceed prey's by `[0.3, 3.0]`.
pub fn validate_trophic_gap(predator: &Species, prey: &Species) -> Result<()> {
    let gap = predator.trophic_level - prey.trophic_level;
    if !(0.3..=3.0).contains(&gap) {
        return Err(EngineError::invariant(format!(
            "trophic gap {gap} between {} and {} outside [0.3, 3.0]",
            predator.lineage_code, prey.lineage_code
        )));
    }
    Ok(())
}

/// `prey_preferences` weights must sum to ~1 and reference only declared
/// prey.
pub fn validate_prey_preferences(species: &Species) -> Result<()> {
    if species.prey_preferences.is_empty() {
        return Ok(());
    }
    let prey: HashSet<&String> = species.prey_species.iter().collect();
    for key in species.prey_preferences.keys() {
        if !prey.contains(key) {
            return Err(EngineError::invariant(format!(
                "{}: prey_preferences references undeclared prey {key}",
                species.lineage_code
            )));
        }
    }
    let sum: f32 = species.prey_preferences.values().sum();
    if (sum - 1.0).abs() > 0.1 {
        return Err(EngineError::invariant(format!(
            "{}: prey_preferences sum {sum} deviates from 1.0 by more than 0.1",
            species.lineage_code
        )));
    }
    Ok(())
}

/// Population biomass must be non-negative and under the hard cap.
pub fn validate_population_bounds(species: &Species, cap_kg: f64) -> Result<()> {
    let pop = species.population_biomass_kg();
    if !(0.0..=cap_kg).contains(&pop) || pop.is_nan() {
        return Err(EngineError::invariant(format!(
            "{}: population {pop} outside [0, {cap_kg}]",
            species.lineage_code
        )));
    }
    Ok(())
}

/// Occupancy of every habitat row for a species must stay within `[0, 1]`.
pub fn validate_occupancy_bounds(world: &World, species_id: evoria_data::SpeciesId) -> Result<()> {
    for tile_id in world.tiles_of(species_id) {
        if let Some(habitat) = world.habitat(tile_id, species_id) {
            if !(0.0..=1.0).contains(&habitat.occupancy) {
                return Err(EngineError::invariant(format!(
                    "species {species_id} tile {tile_id}: occupancy {} outside [0,1]",
                    habitat.occupancy
                )));
            }
        }
    }
    Ok(())
}

/// Organ evolution stage can only regress through an explicit deactivation
/// (`is_active = false`); an active organ's stage must be non-decreasing
/// relative to `previous_stage`.
pub fn validate_organ_stage_monotonic(organ: &evoria_data::Organ, previous_stage: u8) -> Result<()> {
    if organ.is_active && organ.evolution_stage < previous_stage {
        return Err(EngineError::invariant(format!(
            "organ {} regressed from stage {previous_stage} to {} while still active",
            organ.organ_type, organ.evolution_stage
        )));
    }
    Ok(())
}

/// Speciation offspring count must be `[1, 4]`, and the tiles/population
/// allocated to offspring must be a subset of what the parent actually had.
pub fn validate_speciation_budget(
    offspring_count: usize,
    allocated_tiles: &[Vec<evoria_data::TileId>],
    parent_tiles: &[evoria_data::TileId],
    allocated_population: f64,
    parent_population: f64,
) -> Result<()> {
    if !(1..=4).contains(&offspring_count) {
        return Err(EngineError::invariant(format!(
            "offspring count {offspring_count} outside [1,4]"
        )));
    }
    let parent_set: HashSet<_> = parent_tiles.iter().collect();
    for group in allocated_tiles {
        for tile in group {
            if !parent_set.contains(tile) {
                return Err(EngineError::invariant(format!(
                    "allocated tile {tile} not among parent's occupied tiles"
                )));
            }
        }
    }
    if allocated_population > parent_population + 1e-6 {
        return Err(EngineError::invariant(format!(
            "allocated population {allocated_population} exceeds parent population {parent_population}"
        )));
    }
    Ok(())
}

/// No two alive, non-hybrid species may share both Latin and common name.
pub fn validate_name_uniqueness(world: &World) -> Result<()> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for species in world.species.values() {
        if !species.is_alive() || species.taxonomic_rank == TaxonomicRank::Hybrid {
            continue;
        }
        let key = (species.latin_name.clone(), species.common_name.clone());
        if !seen.insert(key) {
            return Err(EngineError::invariant(format!(
                "duplicate name pair: {} / {}",
                species.latin_name, species.common_name
            )));
        }
    }
    Ok(())
}

/// A proposed habitat transition is legal only if it appears in the
/// source habitat's adjacency table.
pub fn validate_habitat_transition(from: evoria_data::HabitatType, to: evoria_data::HabitatType) -> Result<()> {
    if !from.can_transition_to(to) {
        return Err(EngineError::invariant(format!(
            "habitat transition {from:?} -> {to:?} is not adjacent"
        )));
    }
    Ok(())
}

/// Runs every world-scope invariant against the full committed state: name
/// uniqueness, per-species trait/population/occupancy bounds, predator-prey
/// trophic gaps, habitat-transition legality, organ stage monotonicity, and
/// per-turn speciation budgets. Called once per turn, before `turn_index`
/// advances, so `world.turn_index` still identifies the turn just processed.
pub fn validate_world(world: &World, population_cap_kg: f64) -> Result<()> {
    validate_name_uniqueness(world)?;

    let by_lineage_code: std::collections::HashMap<&str, &Species> =
        world.species.values().map(|s| (s.lineage_code.as_str(), s)).collect();

    for species in world.species.values().filter(|s| s.is_alive()) {
        validate_trait_bounds(species)?;
        validate_prey_preferences(species)?;
        validate_population_bounds(species, population_cap_kg)?;
        validate_occupancy_bounds(world, species.id)?;

        for prey_code in &species.prey_species {
            if let Some(prey) = by_lineage_code.get(prey_code.as_str()) {
                if prey.is_alive() {
                    validate_trophic_gap(species, prey)?;
                }
            }
        }

        if let Some(parent_code) = &species.parent_code {
            if let Some(parent) = by_lineage_code.get(parent_code.as_str()) {
                validate_habitat_transition(parent.habitat_type, species.habitat_type)?;
            }
        }

        for organ in species.organs.values() {
            let previous_stage =
                organ.evolution_history.iter().map(|e| e.stage_after).max().unwrap_or(organ.evolution_stage);
            validate_organ_stage_monotonic(organ, previous_stage)?;
        }
    }

    let mut siblings_by_parent: std::collections::HashMap<&str, Vec<&Species>> = std::collections::HashMap::new();
    for species in world.species.values().filter(|s| s.created_turn == world.turn_index) {
        if let Some(parent_code) = &species.parent_code {
            siblings_by_parent.entry(parent_code.as_str()).or_default().push(species);
        }
    }
    for (parent_code, children) in siblings_by_parent {
        let Some(parent) = by_lineage_code.get(parent_code) else { continue };
        let parent_tiles = world.tiles_of(parent.id);
        let allocated_tiles: Vec<Vec<evoria_data::TileId>> = children.iter().map(|c| world.tiles_of(c.id)).collect();
        let allocated_population: f64 = children.iter().map(|c| c.population_biomass_kg()).sum();
        validate_speciation_budget(
            children.len(),
            &allocated_tiles,
            &parent_tiles,
            allocated_population,
            parent.population_biomass_kg(),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evoria_data::HabitatType;

    #[test]
    fn trait_bounds_reject_out_of_range() {
        let mut sp = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        sp.abstract_traits.0.insert("rogue".to_string(), 20.0);
        assert!(validate_trait_bounds(&sp).is_err());
    }

    #[test]
    fn trait_bounds_accept_defaults() {
        let sp = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        assert!(validate_trait_bounds(&sp).is_ok());
    }

    #[test]
    fn trophic_gap_rejects_too_close_or_too_far() {
        let mut predator = crate::test_support::basic_species(evoria_data::DietType::Carnivore, 3.0);
        let prey = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.9);
        assert!(validate_trophic_gap(&predator, &prey).is_err());
        predator.trophic_level = 5.0;
        assert!(validate_trophic_gap(&predator, &prey).is_err());
        predator.trophic_level = 3.5;
        assert!(validate_trophic_gap(&predator, &prey).is_ok());
    }

    #[test]
    fn prey_preferences_must_sum_near_one() {
        let mut sp = crate::test_support::basic_species(evoria_data::DietType::Carnivore, 3.0);
        sp.prey_species = vec!["A1".to_string()];
        sp.prey_preferences.insert("A1".to_string(), 0.5);
        assert!(validate_prey_preferences(&sp).is_err());
        sp.prey_preferences.insert("A1".to_string(), 1.0);
        assert!(validate_prey_preferences(&sp).is_ok());
    }

    #[test]
    fn habitat_transition_respects_adjacency() {
        assert!(validate_habitat_transition(HabitatType::Coastal, HabitatType::Terrestrial).is_ok());
        assert!(validate_habitat_transition(HabitatType::DeepSea, HabitatType::Terrestrial).is_err());
    }

    #[test]
    fn speciation_budget_rejects_foreign_tile() {
        let parent_tiles = vec![1u32, 2, 3];
        let allocated = vec![vec![1u32], vec![4u32]];
        assert!(validate_speciation_budget(2, &allocated, &parent_tiles, 10.0, 100.0).is_err());
        let allocated_ok = vec![vec![1u32], vec![2u32]];
        assert!(validate_speciation_budget(2, &allocated_ok, &parent_tiles, 10.0, 100.0).is_ok());
    }
}
