//! Adaptation — stage 6: gradual trait drift, organ parameter drift, organ
//! stage progression, periodic regression. See component design §4.5.
//! All randomness here is drawn from the turn's `TurnRng` sub-stream, never
//! from an ambient source, so the process stays reproducible (spec §9).

use evoria_data::{Organ, Pressure, PressureKind, Species};
use rand::Rng;

use crate::config::AdaptationConfig;
use crate::tables::{animal_organ_param_whitelist, plant_organ_param_whitelist, trophic_trait_budget};

/// Maps a pressure kind to the trait it nudges and the direction of travel.
fn linked_trait(kind: PressureKind) -> Option<&'static str> {
    match kind {
        PressureKind::Temperature => Some("heat_tolerance"),
        PressureKind::Drought => Some("drought_tolerance"),
        PressureKind::Salinity => Some("salinity_tolerance"),
        PressureKind::LightReduction => Some("light_need"),
        PressureKind::Predator => Some("defense"),
        PressureKind::Competition | PressureKind::NicheDisplacement => Some("aggression"),
        PressureKind::Flood | PressureKind::Humidity => Some("drought_tolerance"),
        _ => None,
    }
}

/// A plant "cost" trait that trades off against the trait a pressure would
/// otherwise raise unconditionally.
fn linked_cost_trait(raised: &str) -> Option<&'static str> {
    match raised {
        "drought_tolerance" => Some("nutrient_uptake"),
        "water_retention" => Some("dispersal_ability"),
        _ => None,
    }
}

pub struct DriftOutcome {
    pub traits_changed: Vec<(String, f32, f32)>,
}

/// Gradual trait drift for one species, given the turn's active pressures.
/// Enforces trophic trait budgets: a raised trait is rolled back if it
/// would blow the total-sum limit.
pub fn gradual_trait_drift(
    species: &mut Species,
    pressures: &[Pressure],
    generations: f64,
    rng: &mut impl Rng,
    cfg: &AdaptationConfig,
) -> DriftOutcome {
    let mut outcome = DriftOutcome { traits_changed: Vec::new() };
    let budget = trophic_trait_budget(species.trophic_level);
    let is_plant = species.is_plant();

    for pressure in pressures {
        let Some(trait_name) = linked_trait(pressure.kind) else { continue };
        if rng.gen::<f32>() >= cfg.gradual_evolution_rate {
            continue;
        }

        let scale = generations.max(10.0).log10() / 2.0;
        let delta = (0.05 * scale * (pressure.magnitude.max(0.1) as f64)) as f32;
        let before = species.abstract_traits.get(trait_name);
        let proposed = before + delta;

        let projected_sum = species.abstract_traits.sum() - before + proposed;
        if projected_sum > budget.total_limit {
            continue;
        }
        species.abstract_traits.set_clamped(trait_name, proposed);
        outcome.traits_changed.push((trait_name.to_string(), before, species.abstract_traits.get(trait_name)));

        if is_plant && rng.gen::<f32>() < cfg.plant_tradeoff_probability {
            if let Some(cost_trait) = linked_cost_trait(trait_name) {
                let cost_before = species.abstract_traits.get(cost_trait);
                species.abstract_traits.set_clamped(cost_trait, cost_before - delta * 0.5);
                outcome.traits_changed.push((cost_trait.to_string(), cost_before, species.abstract_traits.get(cost_trait)));
            }
        }
    }
    outcome
}

/// Organ parameter drift for one organ: white-listed parameters only,
/// drifting toward the active pressure's implied direction.
pub fn drift_organ_parameters(organ: &mut Organ, is_plant: bool, rng: &mut impl Rng, cfg: &AdaptationConfig) {
    let whitelist = if is_plant { plant_organ_param_whitelist() } else { animal_organ_param_whitelist() };
    for &param in whitelist {
        if !organ.parameters.contains_key(param) {
            continue;
        }
        if rng.gen::<f32>() >= cfg.organ_param_drift_probability {
            continue;
        }
        let delta = rng.gen_range(cfg.organ_param_drift_min..=cfg.organ_param_drift_max);
        let signed = if rng.gen_bool(0.5) { delta } else { -delta };
        if let Some(v) = organ.parameters.get_mut(param) {
            *v = (*v + signed).max(0.0);
        }
    }
}

/// Organ stage progression for organs in stage 1..=3. Returns `true` if the
/// organ's stage advanced this turn (spec: at most +1 per turn outside
/// speciation).
pub fn progress_organ_stage(
    organ: &mut Organ,
    turn: u64,
    pressure_multiplier: f32,
    generation_multiplier: f32,
    rng: &mut impl Rng,
    cfg: &AdaptationConfig,
) -> bool {
    if organ.evolution_stage == 0 || organ.evolution_stage > 3 {
        return false;
    }
    if rng.gen::<f32>() < cfg.organ_stagnation_probability {
        return false;
    }
    let mut base = rng.gen_range(cfg.organ_stage_progress_min..=cfg.organ_stage_progress_max);
    base *= pressure_multiplier.max(0.1) * generation_multiplier.max(0.1);
    if rng.gen::<f32>() < cfg.organ_breakthrough_probability {
        base *= 2.0;
    }

    let stage_before = organ.evolution_stage;
    organ.evolution_progress = (organ.evolution_progress + base).min(1.5);
    let threshold = Organ::stage_threshold(organ.evolution_stage);
    if organ.evolution_progress >= threshold {
        organ.evolution_stage += 1;
        organ.evolution_progress = 0.0;
        if organ.evolution_stage >= 2 {
            organ.is_active = true;
        }
        organ.record_event(turn, "stage progression", stage_before);
        true
    } else {
        false
    }
}

pub struct RegressionOutcome {
    pub deactivated_organs: Vec<String>,
    pub reduced_traits: Vec<(String, f32, f32)>,
}

/// Periodic regression: entropy tax on a high-value trait, plus
/// use-it-or-lose-it deactivation for persistently unused organs.
pub fn apply_regression(
    species: &mut Species,
    turn: u64,
    low_light: bool,
    sessile: bool,
    parasitic: bool,
    rng: &mut impl Rng,
) -> RegressionOutcome {
    let mut out = RegressionOutcome { deactivated_organs: Vec::new(), reduced_traits: Vec::new() };

    if let Some((name, value)) = highest_trait(species) {
        let delta = value * rng.gen_range(0.05..0.20);
        species.abstract_traits.set_clamped(&name, value - delta);
        let after = species.abstract_traits.get(&name);
        out.reduced_traits.push((name, value, after));
    }

    if low_light {
        let before = species.abstract_traits.get("light_need");
        species.abstract_traits.set_clamped("light_need", before - 1.0);
        if rng.gen::<f32>() < 0.3 {
            deactivate_if_present(species, "sensory", turn, &mut out);
        }
    }
    if sessile {
        let before = species.abstract_traits.get("locomotion");
        species.abstract_traits.set_clamped("locomotion", before - 1.0);
        deactivate_if_present(species, "locomotion", turn, &mut out);
    }
    if parasitic && rng.gen::<f32>() < 0.4 {
        deactivate_if_present(species, "digestive", turn, &mut out);
    }
    out
}

fn deactivate_if_present(species: &mut Species, category: &str, turn: u64, out: &mut RegressionOutcome) {
    if let Some(organ) = species.organs.get_mut(category) {
        if organ.is_active {
            organ.is_active = false;
            organ.record_event(turn, "regression deactivation", organ.evolution_stage);
            out.deactivated_organs.push(category.to_string());
        }
    }
}

fn highest_trait(species: &Species) -> Option<(String, f32)> {
    species
        .abstract_traits
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(k, v)| (k.clone(), *v))
}

pub fn should_refresh_description(species: &Species, current_turn: u64, cfg: &AdaptationConfig) -> bool {
    species.accumulated_adaptation_score >= cfg.description_refresh_drift_threshold
        && current_turn.saturating_sub(species.last_description_update_turn) >= cfg.description_refresh_min_turns
}

/// Accumulates this turn's visible drift (trait deltas plus organ stage
/// advances) into the species' running score, the gate `should_refresh_description`
/// checks against. Called once per species per turn, after drift and organ
/// progression have both run.
pub fn accumulate_adaptation_score(species: &mut Species, drift: &DriftOutcome, organs_advanced: u32) {
    let trait_drift: f32 = drift.traits_changed.iter().map(|(_, before, after)| (after - before).abs()).sum();
    species.accumulated_adaptation_score += trait_drift + organs_advanced as f32 * 0.5;
}

/// Resets the score and cooldown clock once a refresh has been applied.
pub fn mark_description_refreshed(species: &mut Species, current_turn: u64) {
    species.accumulated_adaptation_score = 0.0;
    species.last_description_update_turn = current_turn;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn drift_respects_total_trait_budget() {
        let mut sp = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 1.0);
        for name in ["cold_tolerance", "heat_tolerance", "drought_tolerance", "salinity_tolerance"] {
            sp.abstract_traits.set_clamped(name, 15.0);
        }
        let budget_before = sp.abstract_traits.sum();
        let pressures = vec![Pressure {
            kind: PressureKind::Temperature,
            direction: evoria_data::PressureDirection::Hot,
            magnitude: 10.0,
            tile_ids: vec![0],
        }];
        let cfg = AdaptationConfig { gradual_evolution_rate: 1.0, ..AdaptationConfig::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        gradual_trait_drift(&mut sp, &pressures, 20.0, &mut rng, &cfg);
        let budget = trophic_trait_budget(sp.trophic_level);
        assert!(sp.abstract_traits.sum() <= budget.total_limit.max(budget_before));
    }

    #[test]
    fn organ_stage_progresses_by_at_most_one() {
        let mut organ = Organ::new_primordium(evoria_data::OrganCategory::Locomotion, "fin", 0);
        organ.evolution_stage = 1;
        let cfg = AdaptationConfig { organ_stagnation_probability: 0.0, organ_breakthrough_probability: 0.0, ..AdaptationConfig::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let before = organ.evolution_stage;
        progress_organ_stage(&mut organ, 1, 1.0, 1.0, &mut rng, &cfg);
        assert!(organ.evolution_stage == before || organ.evolution_stage == before + 1);
    }

    #[test]
    fn description_refresh_gated_by_score_and_cooldown() {
        let mut sp = crate::test_support::basic_species(evoria_data::DietType::Herbivore, 1.0);
        sp.accumulated_adaptation_score = 5.0;
        sp.last_description_update_turn = 0;
        let cfg = AdaptationConfig::default();
        assert!(should_refresh_description(&sp, 20, &cfg));
        sp.last_description_update_turn = 19;
        assert!(!should_refresh_description(&sp, 20, &cfg));
    }
}
