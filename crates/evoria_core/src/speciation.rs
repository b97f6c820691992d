//! Speciation engine — stage 8. Candidate detection, geographic isolation
//! via union-find over the tile adjacency graph, offspring allocation, and
//! inherited+mutated child construction. See component design §4.4.

use evoria_data::{
    DormantGeneProvenance, DormantOrganGene, DormantTraitGene, Genus, HabitatType, Organ, OrganCategory, Species,
    SpeciationType, TaxonomicRank, TileId,
};
use petgraph::unionfind::UnionFind;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::config::SpeciationConfig;
use crate::tables::{speciation_body_length_bucket, trophic_trait_budget};
use crate::world::World;

/// Minimum population required to speciate (§4.4 threshold formula).
pub fn speciation_threshold(species: &Species) -> f64 {
    let base = speciation_body_length_bucket(species.body_length_cm());

    let weight_g = species.body_weight_g().max(0.001);
    let weight_modifier = (1.0 / weight_g.ln().max(1.0).max(0.1)).clamp(0.3, 3.0);

    let rk_modifier = (species.abstract_traits.get("reproduction_speed") as f64 / 10.0).clamp(0.5, 1.5);
    // r-strategists (high reproduction_speed) need a larger threshold before
    // splitting pays off, so the modifier grows population requirement; a
    // bigger rk_modifier divides the bucket down, matching "r -> larger"
    // population tolerance translating into an easier-to-meet (smaller)
    // threshold.
    let rk_factor = 1.0 / rk_modifier;

    let metabolic_rate = species.morphology_stats.get("metabolic_rate").copied().unwrap_or(1.0).max(0.1);
    let metabolic_factor = (1.0 / metabolic_rate).clamp(0.3, 3.0);

    let trophic_factor = (1.0 / (species.trophic_level / 2.0).max(0.5)).clamp(0.3, 1.5);

    (base * weight_modifier * rk_factor * metabolic_factor * trophic_factor).clamp(50.0, 5_000_000.0)
}

#[derive(Debug, Clone)]
pub struct SpeciationCandidate {
    pub species_id: evoria_data::SpeciesId,
    pub candidate_tiles: Vec<TileId>,
    pub candidate_population: f64,
}

/// All conditions required for a species to be a speciation candidate this
/// turn, excluding the probability roll (kept separate so callers can log
/// "met every deterministic gate but lost the roll").
#[allow(clippy::too_many_arguments)]
pub fn is_candidate(
    species: &Species,
    candidate_population: f64,
    average_pressure: f32,
    resource_pressure: f32,
    geographic_isolation_detected: bool,
    candidate_death_rate: f32,
    current_turn: u64,
    cfg: &SpeciationConfig,
) -> bool {
    if candidate_population < speciation_threshold(species) {
        return false;
    }
    let potential_gate = species.hidden_traits.evolution_potential >= cfg.evolution_potential_threshold
        || species.accumulated_speciation_pressure() >= cfg.accumulated_pressure_threshold;
    if !potential_gate {
        return false;
    }
    let trigger_gate = (average_pressure >= cfg.pressure_range.0 && average_pressure <= cfg.pressure_range.1)
        || resource_pressure > cfg.resource_pressure_threshold
        || geographic_isolation_detected;
    if !trigger_gate {
        return false;
    }
    if current_turn.saturating_sub(species.last_speciation_turn()) < cfg.cooldown_turns {
        return false;
    }
    candidate_death_rate >= cfg.death_rate_floor && candidate_death_rate <= cfg.death_rate_ceiling
}

/// Probability gate: `rand() < base_rate + potential_bonus + geo_bonus +
/// event_bonus + accumulated_pressure`, density-damped.
pub fn passes_probability_check(
    species: &Species,
    geographic_isolation_detected: bool,
    major_event_present: bool,
    species_population_in_genus: u32,
    rng: &mut impl Rng,
    cfg: &SpeciationConfig,
) -> bool {
    let potential_bonus = species.hidden_traits.evolution_potential * 0.1;
    let geo_bonus = if geographic_isolation_detected { 0.1 } else { 0.0 };
    let event_bonus = if major_event_present { 0.05 } else { 0.0 };
    let accumulated = species.accumulated_speciation_pressure();

    let soft_cap = cfg.soft_cap_population as f32;
    let damping = 1.0 / (1.0 + (species_population_in_genus as f32 - soft_cap).max(0.0) / soft_cap);

    let p = (cfg.base_rate + potential_bonus + geo_bonus + event_bonus + accumulated) * damping;
    rng.gen::<f32>() < p
}

/// Connected components of a species' occupied tiles under grid adjacency
/// (geographic isolation detection via union-find, per §4.4).
pub fn connected_components(world: &World, tiles: &[TileId]) -> Vec<Vec<TileId>> {
    if tiles.is_empty() {
        return Vec::new();
    }
    let index_of: HashMap<TileId, usize> = tiles.iter().enumerate().map(|(i, t)| (*t, i)).collect();
    let mut uf = UnionFind::new(tiles.len());
    let tile_set: HashSet<TileId> = tiles.iter().copied().collect();

    for &t in tiles {
        for n in world.neighbors(t) {
            if tile_set.contains(&n) {
                uf.union(index_of[&t], index_of[&n]);
            }
        }
    }

    let mut groups: HashMap<usize, Vec<TileId>> = HashMap::new();
    for &t in tiles {
        let root = uf.find(index_of[&t]);
        groups.entry(root).or_default().push(t);
    }
    groups.into_values().collect()
}

#[allow(clippy::too_many_arguments)]
pub fn classify_speciation_type(
    components: &[Vec<TileId>],
    per_component_mean_death_rate: &[f32],
    major_event_extreme_present: bool,
    niche_overlap_with_congener: Option<f32>,
    thriving_no_pressure: bool,
    cfg: &SpeciationConfig,
) -> SpeciationType {
    let gradient = per_component_mean_death_rate
        .iter()
        .cloned()
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let gradient_spread = if per_component_mean_death_rate.is_empty() { 0.0 } else { gradient.1 - gradient.0 };

    if components.len() >= 2 || gradient_spread > cfg.isolation_gradient_threshold {
        SpeciationType::GeographicIsolation
    } else if major_event_extreme_present {
        SpeciationType::EcologicalSpecialization
    } else if niche_overlap_with_congener.unwrap_or(0.0) > cfg.coevolution_overlap_threshold {
        SpeciationType::Coevolution
    } else if thriving_no_pressure {
        SpeciationType::Radiation
    } else {
        SpeciationType::EcologicalIsolation
    }
}

/// Offspring count (§4.4): base 2, bonuses/penalties, clamp to [1,4], 30%
/// jitter of -1.
pub fn offspring_count(
    candidate_population: f64,
    evolution_potential: f32,
    total_species_count: u32,
    sibling_count: u32,
    rng: &mut impl Rng,
    cfg: &SpeciationConfig,
) -> u32 {
    let mut n: i32 = 2;
    if candidate_population > 1.0e9 {
        n += 1;
    }
    if evolution_potential > 0.90 {
        n += 1;
    }
    if total_species_count > 100 {
        n -= 2;
    } else if total_species_count > 50 {
        n -= 1;
    }
    if sibling_count >= 5 {
        n -= 2;
    } else if sibling_count >= 3 {
        n -= 1;
    }
    n = n.clamp(1, 4);
    if rng.gen::<f32>() < cfg.offspring_jitter_probability {
        n = (n - 1).max(1);
    }
    n as u32
}

/// Tile allocation (§4.4): one cluster per child if enough clusters exist;
/// otherwise split the largest cluster into contiguous pieces.
pub fn allocate_tiles(mut components: Vec<Vec<TileId>>, offspring_count: u32, rng: &mut impl Rng) -> Vec<Vec<TileId>> {
    use rand::seq::SliceRandom;
    let n = offspring_count as usize;
    if components.len() >= n {
        components.shuffle(rng);
        return components.into_iter().take(n).collect();
    }

    while components.len() < n {
        let (largest_idx, _) = components
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| c.len())
            .expect("at least one component");
        let largest = components.remove(largest_idx);
        if largest.len() < 2 {
            components.push(largest);
            break;
        }
        let mid = largest.len() / 2;
        let (a, b) = largest.split_at(mid);
        components.push(a.to_vec());
        components.push(b.to_vec());
    }
    components.truncate(n.max(1));
    components
}

/// A differentiation archetype injected per offspring so siblings diverge
/// along different axes rather than all mutating identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferentiationAxis {
    EnvironmentAdapter,
    ActivitySpecialist,
    ReproductionSpecialist,
    Defender,
    ExtremeSpecialist,
}

pub fn differentiation_axis_for(lineage_suffix: char) -> DifferentiationAxis {
    match (lineage_suffix as u32) % 5 {
        0 => DifferentiationAxis::EnvironmentAdapter,
        1 => DifferentiationAxis::ActivitySpecialist,
        2 => DifferentiationAxis::ReproductionSpecialist,
        3 => DifferentiationAxis::Defender,
        _ => DifferentiationAxis::ExtremeSpecialist,
    }
}

fn axis_trait_targets(axis: DifferentiationAxis) -> &'static [&'static str] {
    match axis {
        DifferentiationAxis::EnvironmentAdapter => &["cold_tolerance", "heat_tolerance", "drought_tolerance"],
        DifferentiationAxis::ActivitySpecialist => &["locomotion", "sociality"],
        DifferentiationAxis::ReproductionSpecialist => &["reproduction_speed"],
        DifferentiationAxis::Defender => &["defense", "aggression"],
        DifferentiationAxis::ExtremeSpecialist => &["salinity_tolerance", "light_need"],
    }
}

/// Constructs one child species from a parent, applying inheritance,
/// bounded mutation, the differentiation axis, dormant-gene propagation,
/// and the tradeoff rule (increases bounded by `2x` decreases unless a
/// compensating decrease is synthesised).
pub fn construct_child(
    parent: &Species,
    lineage_code: String,
    allocated_tiles: &[TileId],
    axis: DifferentiationAxis,
    speciation_type: SpeciationType,
    current_turn: u64,
    rng: &mut impl Rng,
) -> Species {
    let mut child = parent.clone();
    child.id = uuid::Uuid::new_v4();
    child.latin_name = evoria_observer::naming::latin_binomial(&parent.genus_code, &lineage_code);
    child.common_name = evoria_observer::naming::common_name(child.diet_type, child.habitat_type, &lineage_code);
    child.description = String::new();
    child.lineage_code = lineage_code;
    child.parent_code = Some(parent.lineage_code.clone());
    child.taxonomic_rank = TaxonomicRank::Species;
    child.created_turn = current_turn;
    child.is_background = false;
    child.set_last_speciation_turn(current_turn);
    child.set_accumulated_speciation_pressure(0.0);
    child.achieved_milestones.clear();

    for key in ["body_length_cm", "body_weight_g", "generation_time_days"] {
        if let Some(v) = child.morphology_stats.get(key).copied() {
            let scale = rng.gen_range(0.8..=1.3);
            child.morphology_stats.insert(key.to_string(), v * scale);
        }
    }

    apply_differentiation(&mut child, axis, rng);

    child.hidden_traits.gene_diversity = (child.hidden_traits.gene_diversity + 0.02).min(1.0);
    child.hidden_traits.clamp();

    for organ in child.organs.values_mut() {
        let bump: u8 = rng.gen_range(0..=2);
        organ.evolution_stage = (organ.evolution_stage + bump).min(4);
        organ.record_event(current_turn, "speciation inheritance", organ.evolution_stage.saturating_sub(bump));
    }

    propagate_dormant_genes(parent, &mut child, rng);

    child.trophic_level = (parent.trophic_level + rng.gen_range(-0.5..=0.5)).clamp(1.0, 6.0);
    let _ = speciation_type;
    let _ = allocated_tiles;
    child
}

fn apply_differentiation(child: &mut Species, axis: DifferentiationAxis, rng: &mut impl Rng) {
    let budget = trophic_trait_budget(child.trophic_level);
    let targets = axis_trait_targets(axis);
    let mut total_increase = 0.0f32;
    let mut total_decrease = 0.0f32;

    for &name in targets {
        let before = child.abstract_traits.get(name);
        let delta = rng.gen_range(0.5..=2.0);
        let proposed = (before + delta).min(budget.specialized_limit);
        child.abstract_traits.set_clamped(name, proposed);
        total_increase += child.abstract_traits.get(name) - before;
    }

    // enforce the tradeoff: increases <= 2x decreases; if all increases,
    // synthesise a compensating decrease on an off-axis trait.
    if total_decrease * 2.0 < total_increase {
        let needed = total_increase / 2.0 - total_decrease;
        let off_axis: Vec<&String> = child
            .abstract_traits
            .iter()
            .map(|(k, _)| k)
            .filter(|k| !targets.contains(&k.as_str()))
            .collect();
        if let Some(victim) = off_axis.first() {
            let victim = (*victim).clone();
            let before = child.abstract_traits.get(&victim);
            child.abstract_traits.set_clamped(&victim, before - needed);
        }
    }

    while child.abstract_traits.sum() > budget.total_limit {
        let Some((name, _)) = child
            .abstract_traits
            .iter()
            .filter(|(k, _)| !targets.contains(&k.as_str()))
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(k, v)| (k.clone(), *v))
        else {
            break;
        };
        let before = child.abstract_traits.get(&name);
        child.abstract_traits.set_clamped(&name, before - 0.5);
    }
}

fn propagate_dormant_genes(parent: &Species, child: &mut Species, rng: &mut impl Rng) {
    child.dormant_genes = parent.dormant_genes.clone();

    for (name, _) in parent.abstract_traits.iter() {
        if rng.gen::<f32>() < 0.80 {
            child.dormant_genes.traits.push(DormantTraitGene {
                trait_name: name.clone(),
                potential: rng.gen_range(0.3..=0.9),
                activation_threshold: rng.gen_range(0.2..=0.6),
                required_pressures: Vec::new(),
                exposure_count: 0,
                dominance: rng.gen_range(0.2..=0.8),
                provenance: DormantGeneProvenance::Inherited,
            });
        }
    }
    for (category, organ) in parent.organs.iter() {
        if rng.gen::<f32>() < 0.75 {
            child.dormant_genes.organs.push(DormantOrganGene {
                category: organ.category,
                organ_type: format!("{category}-evolved"),
                potential_stage: (organ.evolution_stage + 1).min(4),
                activation_threshold: rng.gen_range(0.2..=0.6),
                required_pressures: Vec::new(),
                exposure_count: 0,
                dominance: rng.gen_range(0.2..=0.8),
                provenance: DormantGeneProvenance::Inherited,
            });
        }
    }
    if rng.gen::<f32>() < 0.10 {
        child.dormant_genes.traits.push(DormantTraitGene {
            trait_name: "vestigial_harm".to_string(),
            potential: rng.gen_range(0.1..=0.3),
            activation_threshold: 0.9,
            required_pressures: Vec::new(),
            exposure_count: 0,
            dominance: 0.1,
            provenance: DormantGeneProvenance::DeNovoMutation,
        });
    }
}

/// Habitat adjacency table, grounded in the original habitat-transition
/// rules; a proposed habitat for a child is legal only if it appears in the
/// parent's row, otherwise it reverts to the parent's habitat.
pub fn validate_child_habitat(parent_habitat: HabitatType, proposed: HabitatType) -> HabitatType {
    if parent_habitat.can_transition_to(proposed) {
        proposed
    } else {
        parent_habitat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn threshold_within_spec_bounds() {
        let sp = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let t = speciation_threshold(&sp);
        assert!((50.0..=5_000_000.0).contains(&t));
    }

    #[test]
    fn offspring_count_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cfg = SpeciationConfig::default();
        for _ in 0..20 {
            let n = offspring_count(1e10, 0.95, 10, 0, &mut rng, &cfg);
            assert!((1..=4).contains(&n));
        }
    }

    #[test]
    fn habitat_transition_reverts_when_illegal() {
        let result = validate_child_habitat(HabitatType::DeepSea, HabitatType::Terrestrial);
        assert_eq!(result, HabitatType::DeepSea);
    }

    #[test]
    fn habitat_transition_allowed_when_adjacent() {
        let result = validate_child_habitat(HabitatType::Coastal, HabitatType::Terrestrial);
        assert_eq!(result, HabitatType::Terrestrial);
    }

    #[test]
    fn tile_allocation_splits_largest_when_too_few_clusters() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let components = vec![vec![1, 2, 3, 4]];
        let allocated = allocate_tiles(components, 2, &mut rng);
        assert_eq!(allocated.len(), 2);
        let total: usize = allocated.iter().map(|c| c.len()).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn child_trophic_level_stays_within_half_unit_of_parent() {
        let parent = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let child = construct_child(
            &parent,
            "A1".to_string(),
            &[1, 2],
            DifferentiationAxis::EnvironmentAdapter,
            SpeciationType::GeographicIsolation,
            10,
            &mut rng,
        );
        assert!((child.trophic_level - parent.trophic_level).abs() <= 0.5 + 1e-6);
    }
}
