//! Gene flow — stage 7: trait convergence between sympatric congeners
//! below a genetic-distance threshold. See component design §4.6.

use evoria_data::{Genus, Species};
use std::collections::HashSet;

use crate::config::GeneFlowConfig;

/// Morphology diff: `1 - min/max` ratio of body length and weight,
/// averaged.
fn morphology_diff(a: &Species, b: &Species) -> f32 {
    let length_ratio = ratio(a.body_length_cm(), b.body_length_cm());
    let weight_ratio = ratio(a.body_weight_g(), b.body_weight_g());
    (1.0 - (length_ratio + weight_ratio) / 2.0) as f32
}

fn ratio(x: f64, y: f64) -> f64 {
    if x <= 0.0 || y <= 0.0 {
        return 0.0;
    }
    x.min(y) / x.max(y)
}

/// Normalised Euclidean distance over shared trait values in `[0, 15]`.
fn trait_diff(a: &Species, b: &Species) -> f32 {
    let names: HashSet<&String> = a.abstract_traits.iter().map(|(k, _)| k).collect();
    if names.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = names
        .iter()
        .map(|n| {
            let d = a.abstract_traits.get(n) - b.abstract_traits.get(n);
            d * d
        })
        .sum();
    ((sum_sq / names.len() as f32).sqrt() / 15.0).clamp(0.0, 1.0)
}

/// Jaccard of organ-category key sets.
fn organ_jaccard(a: &Species, b: &Species) -> f32 {
    let ka: HashSet<&String> = a.organs.keys().collect();
    let kb: HashSet<&String> = b.organs.keys().collect();
    if ka.is_empty() && kb.is_empty() {
        return 0.0;
    }
    let intersection = ka.intersection(&kb).count() as f32;
    let union = ka.union(&kb).count().max(1) as f32;
    1.0 - intersection / union
}

fn time_divergence(a_turn: u64, b_turn: u64, current_turn: u64, cfg: &GeneFlowConfig) -> f32 {
    let common_ancestor_turn = a_turn.max(b_turn);
    let elapsed = current_turn.saturating_sub(common_ancestor_turn) as f64;
    (elapsed / cfg.time_divergence_turns).min(1.0) as f32
}

/// Genetic distance between two species, optionally blending an
/// embedding-based semantic diff when an embedding service is available
/// (weights re-split 20% each across the four terms instead of the
/// structured 30/25/25/20 split, per §4.6).
pub fn genetic_distance(
    a: &Species,
    b: &Species,
    genus: &Genus,
    current_turn: u64,
    embedding_diff: Option<f32>,
    cfg: &GeneFlowConfig,
) -> f32 {
    let a_anchor = genus.common_ancestor_turn.get(&a.lineage_code).copied().unwrap_or(a.created_turn);
    let b_anchor = genus.common_ancestor_turn.get(&b.lineage_code).copied().unwrap_or(b.created_turn);
    let time = time_divergence(a_anchor, b_anchor, current_turn, cfg);
    let morph = morphology_diff(a, b);
    let traits = trait_diff(a, b);
    let organ = organ_jaccard(a, b);

    match embedding_diff {
        Some(embed) => 0.2 * morph + 0.2 * traits + 0.2 * organ + 0.2 * time + 0.2 * embed,
        None => cfg.morphology_weight * morph + cfg.trait_weight * traits + cfg.organ_weight * organ + cfg.time_weight * time,
    }
    .clamp(0.0, 1.0)
}

/// Jaccard overlap of occupied tile sets, used as the geographic proximity
/// gate for gene flow.
pub fn habitat_overlap(tiles_a: &HashSet<u32>, tiles_b: &HashSet<u32>) -> f32 {
    if tiles_a.is_empty() && tiles_b.is_empty() {
        return 0.0;
    }
    let intersection = tiles_a.intersection(tiles_b).count() as f32;
    let union = tiles_a.union(tiles_b).count().max(1) as f32;
    intersection / union
}

/// Per-trait convergence deltas for a pair (a, b); the caller applies these
/// to both species' trait maps. Asymmetric by population weight: the
/// larger population pushes the smaller more.
pub fn compute_flow_deltas(
    a: &Species,
    b: &Species,
    distance: f32,
    overlap: f32,
    cfg: &GeneFlowConfig,
) -> Option<Vec<(String, f32, f32)>> {
    if distance > cfg.distance_threshold || overlap < cfg.overlap_threshold {
        return None;
    }
    let base_rate = cfg.base_flow_rate * (1.0 - (distance / cfg.distance_threshold) as f64) * overlap as f64;
    let pop_a = a.population_biomass_kg().max(1.0);
    let pop_b = b.population_biomass_kg().max(1.0);
    let total = pop_a + pop_b;
    let weight_a = pop_a / total;
    let weight_b = pop_b / total;
    // the larger population pushes the smaller more
    let rate_on_a = base_rate * weight_b * 2.0;
    let rate_on_b = base_rate * weight_a * 2.0;

    let shared: HashSet<&String> = a.abstract_traits.iter().map(|(k, _)| k).collect();
    let mut deltas = Vec::new();
    for name in shared {
        let va = a.abstract_traits.get(name);
        let vb = b.abstract_traits.get(name);
        if (va - vb).abs() < 1e-6 {
            continue;
        }
        let new_a = (va + (vb - va) * rate_on_a as f32).clamp(0.0, 15.0);
        let new_b = (vb + (va - vb) * rate_on_b as f32).clamp(0.0, 15.0);
        deltas.push((name.clone(), new_a, new_b));
    }
    Some(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_beyond_threshold_blocks_flow() {
        let cfg = GeneFlowConfig::default();
        let a = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let mut b = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        b.abstract_traits.set_clamped("heat_tolerance", 12.0);
        let deltas = compute_flow_deltas(&a, &b, 0.5, 0.5, &cfg);
        assert!(deltas.is_none());
    }

    #[test]
    fn isolated_habitat_blocks_flow() {
        let cfg = GeneFlowConfig::default();
        let a = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let b = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let deltas = compute_flow_deltas(&a, &b, 0.10, 0.01, &cfg);
        assert!(deltas.is_none());
    }

    #[test]
    fn converges_without_crossing_zero() {
        let cfg = GeneFlowConfig::default();
        let mut a = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let mut b = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        a.abstract_traits.set_clamped("heat_tolerance", 9.0);
        b.abstract_traits.set_clamped("heat_tolerance", 5.0);
        a.set_population_biomass_kg(1_000.0);
        b.set_population_biomass_kg(1_000.0);

        let mut diff = 4.0f32;
        for _ in 0..10 {
            let deltas = compute_flow_deltas(&a, &b, 0.20, 0.80, &cfg).expect("flow applies");
            for (name, na, nb) in deltas {
                a.abstract_traits.set_clamped(&name, na);
                b.abstract_traits.set_clamped(&name, nb);
            }
            let new_diff = (a.abstract_traits.get("heat_tolerance") - b.abstract_traits.get("heat_tolerance")).abs();
            assert!(new_diff <= diff + 1e-6);
            diff = new_diff;
        }
        assert!(diff < 1.5);
        assert!(a.abstract_traits.get("heat_tolerance") >= b.abstract_traits.get("heat_tolerance"));
    }
}
