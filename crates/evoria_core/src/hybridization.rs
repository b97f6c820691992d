//! Hybridization — stage 9. Sympatric pairs below a distance threshold are
//! scored; creating an actual hybrid is optional per policy. See §4.7.

use evoria_data::{OrganCategory, Species, TaxonomicRank};
use rand::Rng;
use std::collections::HashMap;

use crate::config::HybridizationConfig;

pub fn fertility(distance: f32, cfg: &HybridizationConfig) -> f32 {
    if distance >= cfg.max_distance {
        return 0.0;
    }
    if distance < cfg.fertility_full_below {
        return 1.0 - distance * 0.5;
    }
    // linear from (fertility_full_below, 1 - fertility_full_below*0.5) down
    // to (max_distance, 0.0)
    let top = 1.0 - cfg.fertility_full_below * 0.5;
    let span = cfg.max_distance - cfg.fertility_full_below;
    (top * (cfg.max_distance - distance) / span).max(0.0)
}

pub fn hybrid_score(sympatry_ratio: f32, fertility: f32, distance: f32) -> f32 {
    sympatry_ratio * fertility * (1.0 - distance)
}

#[derive(Debug, Clone)]
pub struct HybridCandidate {
    pub a: evoria_data::SpeciesId,
    pub b: evoria_data::SpeciesId,
    pub distance: f32,
    pub sympatry_ratio: f32,
    pub fertility: f32,
    pub score: f32,
}

pub fn is_candidate_pair(
    distance: f32,
    sympatric_tile_count: usize,
    population_a: f64,
    population_b: f64,
    cfg: &HybridizationConfig,
) -> bool {
    sympatric_tile_count >= 1
        && distance <= cfg.max_distance
        && population_a >= cfg.min_population_kg
        && population_b >= cfg.min_population_kg
}

/// Selects the top `top_n_proposed` candidates by score.
pub fn rank_candidates(mut candidates: Vec<HybridCandidate>, cfg: &HybridizationConfig) -> Vec<HybridCandidate> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    candidates.truncate(cfg.top_n_proposed);
    candidates
}

/// Constructs an actual hybrid species from a proposed candidate pair, per
/// the trait-mixing policy (70% max, 20% mean, 10% min, ±0.2 noise).
pub fn construct_hybrid(a: &Species, b: &Species, lineage_code: String, fertility: f32, current_turn: u64, rng: &mut impl Rng) -> Species {
    let mut child = a.clone();
    child.id = uuid::Uuid::new_v4();
    child.latin_name = evoria_observer::naming::latin_binomial(&a.genus_code, &lineage_code);
    child.common_name = evoria_observer::naming::common_name(a.diet_type, a.habitat_type, &lineage_code);
    child.description = String::new();
    child.lineage_code = lineage_code;
    child.taxonomic_rank = TaxonomicRank::Hybrid;
    child.hybrid_parent_codes = vec![a.lineage_code.clone(), b.lineage_code.clone()];
    child.hybrid_fertility = Some(fertility.clamp(0.0, 1.0));
    child.created_turn = current_turn;
    child.parent_code = None;
    child.achieved_milestones.clear();

    let names: std::collections::HashSet<String> = a
        .abstract_traits
        .iter()
        .map(|(k, _)| k.clone())
        .chain(b.abstract_traits.iter().map(|(k, _)| k.clone()))
        .collect();

    for name in names {
        let va = a.abstract_traits.get(&name);
        let vb = b.abstract_traits.get(&name);
        let roll: f32 = rng.gen();
        let noise = rng.gen_range(-0.2..=0.2);
        let mixed = if roll < 0.70 {
            va.max(vb)
        } else if roll < 0.90 {
            (va + vb) / 2.0
        } else {
            va.min(vb)
        };
        child.abstract_traits.set_clamped(&name, mixed + noise);
    }

    child.organs = merge_organs(a, b);

    for key in ["body_length_cm", "body_weight_g", "generation_time_days"] {
        let va = a.morphology_stats.get(key).copied();
        let vb = b.morphology_stats.get(key).copied();
        if let (Some(va), Some(vb)) = (va, vb) {
            child.morphology_stats.insert(key.to_string(), (va + vb) / 2.0);
        }
    }

    child.hidden_traits.gene_diversity = (child.hidden_traits.gene_diversity * 1.10).min(1.0);
    child.hidden_traits.clamp();
    child
}

fn merge_organs(a: &Species, b: &Species) -> HashMap<String, evoria_data::Organ> {
    let mut merged = a.organs.clone();
    for (category, organ_b) in &b.organs {
        merged
            .entry(category.clone())
            .and_modify(|organ_a| {
                if organ_efficiency(organ_b) > organ_efficiency(organ_a) {
                    *organ_a = organ_b.clone();
                }
            })
            .or_insert_with(|| organ_b.clone());
    }
    merged
}

fn organ_efficiency(organ: &evoria_data::Organ) -> f32 {
    organ.parameters.get("efficiency").copied().unwrap_or(0.0) + organ.evolution_stage as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn fertility_decreases_with_distance() {
        let cfg = HybridizationConfig::default();
        assert!(fertility(0.05, &cfg) > fertility(0.5, &cfg));
        assert_eq!(fertility(0.70, &cfg), 0.0);
    }

    #[test]
    fn hybrid_is_marked_as_such() {
        let a = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let b = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let hybrid = construct_hybrid(&a, &b, "A1xA2".to_string(), 0.6, 10, &mut rng);
        assert_eq!(hybrid.taxonomic_rank, TaxonomicRank::Hybrid);
        assert_eq!(hybrid.hybrid_parent_codes.len(), 2);
        assert!(hybrid.hybrid_fertility.is_some());
    }

    #[test]
    fn organ_merge_keeps_more_efficient() {
        let mut a = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let mut b = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 2.0);
        let mut organ_a = evoria_data::Organ::new_primordium(OrganCategory::Locomotion, "fin", 0);
        organ_a.parameters.insert("efficiency".to_string(), 1.0);
        let mut organ_b = evoria_data::Organ::new_primordium(OrganCategory::Locomotion, "leg", 0);
        organ_b.parameters.insert("efficiency".to_string(), 5.0);
        a.organs.insert("locomotion".to_string(), organ_a);
        b.organs.insert("locomotion".to_string(), organ_b);
        let merged = merge_organs(&a, &b);
        assert_eq!(merged["locomotion"].organ_type, "leg");
    }
}
