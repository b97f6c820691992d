//! Immutable rule/strategy tables consulted by lookup rather than hard-coded
//! per call site: trophic trait budgets, carrying-capacity derating, milestone
//! definitions, organ-category parameter whitelists. Values are taken from
//! `trophic.py`/`trait_config.py` in the source this was distilled from where
//! the component design leaves a function without literal numbers.

use evoria_data::{GrowthForm, OrganCategory};
use std::collections::HashMap;

/// Per-trophic-tier trait budget: `(base_limit, specialized_limit, total_limit)`.
#[derive(Debug, Clone, Copy)]
pub struct TraitBudget {
    pub base_limit: f32,
    pub specialized_limit: f32,
    pub total_limit: f32,
}

pub fn trophic_trait_budget(trophic_level: f32) -> TraitBudget {
    if trophic_level < 2.0 {
        TraitBudget { base_limit: 5.0, specialized_limit: 8.0, total_limit: 30.0 }
    } else if trophic_level < 3.0 {
        TraitBudget { base_limit: 7.0, specialized_limit: 10.0, total_limit: 50.0 }
    } else if trophic_level < 4.0 {
        TraitBudget { base_limit: 9.0, specialized_limit: 12.0, total_limit: 80.0 }
    } else if trophic_level < 5.0 {
        TraitBudget { base_limit: 12.0, specialized_limit: 14.0, total_limit: 105.0 }
    } else {
        TraitBudget { base_limit: 14.0, specialized_limit: 15.0, total_limit: 135.0 }
    }
}

/// Per-trophic-tier carrying-capacity derating factor, a sanity multiplier
/// applied on top of the cascade computation in `carrying_capacity.rs`.
pub fn trophic_capacity_factor(trophic_level: f32) -> f64 {
    if trophic_level < 2.0 {
        1.0
    } else if trophic_level < 3.0 {
        0.6
    } else if trophic_level < 4.0 {
        0.3
    } else if trophic_level < 5.0 {
        0.15
    } else {
        0.05
    }
}

/// Minimum candidate population (kg) required to speciate, bucketed by body
/// length, before the body-weight/r-K/metabolic/trophic modifiers apply.
pub fn speciation_body_length_bucket(body_length_cm: f64) -> f64 {
    if body_length_cm < 0.01 {
        2_000_000.0
    } else if body_length_cm < 0.1 {
        1_000_000.0
    } else if body_length_cm < 1.0 {
        100_000.0
    } else if body_length_cm < 10.0 {
        10_000.0
    } else if body_length_cm < 50.0 {
        2_000.0
    } else if body_length_cm < 200.0 {
        500.0
    } else {
        100.0
    }
}

/// Organ parameter names a drift pass is allowed to touch, per the
/// adaptation component design. Plants get an additional whitelist.
pub fn animal_organ_param_whitelist() -> &'static [&'static str] {
    &["efficiency", "speed", "range", "strength", "defense", "rate", "cost"]
}

pub fn plant_organ_param_whitelist() -> &'static [&'static str] {
    &["efficiency", "capacity", "rate", "density", "resistance", "production", "absorption"]
}

/// A plant evolution milestone, as named in the component design's life-form
/// stage ladder (0 prokaryote .. 6 angiosperm).
#[derive(Debug, Clone)]
pub struct Milestone {
    pub id: &'static str,
    pub from_stage: u8,
    pub to_stage: u8,
    /// Trait name -> minimum value required to trigger.
    pub requirements: &'static [(&'static str, f32)],
    /// Organ category -> canonical organ name unlocked, with its default
    /// parameters.
    pub unlocks: &'static [(OrganCategory, &'static str)],
    /// Morphological milestones don't change the life-form stage; they only
    /// unlock organs and record an achievement.
    pub morphological_only: bool,
}

pub fn plant_milestones() -> &'static [Milestone] {
    &[
        Milestone {
            id: "first_eukaryote",
            from_stage: 0,
            to_stage: 1,
            requirements: &[("multicellularity", 1.0)],
            unlocks: &[(OrganCategory::Photosynthetic, "chloroplast")],
            morphological_only: false,
        },
        Milestone {
            id: "first_colony",
            from_stage: 1,
            to_stage: 2,
            requirements: &[("sociality", 3.0), ("multicellularity", 2.0)],
            unlocks: &[],
            morphological_only: false,
        },
        // `first_land_plant` is strictly more specific than `first_bryophyte`
        // (superset of requirements) and must be tried first: `eligible_milestone`
        // takes the first match, and a species meeting the land-plant
        // requirements always also meets the bryophyte ones.
        Milestone {
            id: "first_land_plant",
            from_stage: 2,
            to_stage: 3,
            requirements: &[("water_retention", 5.0), ("drought_tolerance", 4.0)],
            unlocks: &[
                (OrganCategory::RootSystem, "rhizoid"),
                (OrganCategory::Protection, "cuticle"),
            ],
            morphological_only: false,
        },
        Milestone {
            id: "first_bryophyte",
            from_stage: 2,
            to_stage: 3,
            requirements: &[("water_retention", 4.0)],
            unlocks: &[(OrganCategory::RootSystem, "rhizoid")],
            morphological_only: false,
        },
        Milestone {
            id: "first_pteridophyte",
            from_stage: 3,
            to_stage: 4,
            requirements: &[("root_development", 4.0), ("water_retention", 6.0)],
            unlocks: &[(OrganCategory::Vascular, "vascular_bundle")],
            morphological_only: false,
        },
        Milestone {
            id: "first_gymnosperm",
            from_stage: 4,
            to_stage: 5,
            requirements: &[("seed_ness", 3.0), ("lignification", 4.0)],
            unlocks: &[(OrganCategory::Storage, "seed_coat")],
            morphological_only: false,
        },
        Milestone {
            id: "first_angiosperm",
            from_stage: 5,
            to_stage: 6,
            requirements: &[("seed_ness", 6.0), ("dispersal_ability", 5.0)],
            unlocks: &[(OrganCategory::Reproduction, "flower")],
            morphological_only: false,
        },
        Milestone {
            id: "first_tree",
            from_stage: 5,
            to_stage: 5,
            requirements: &[("lignification", 7.0)],
            unlocks: &[(OrganCategory::Stem, "woody_stem")],
            morphological_only: true,
        },
    ]
}

pub fn milestone_by_id(id: &str) -> Option<&'static Milestone> {
    plant_milestones().iter().find(|m| m.id == id)
}

/// Default organ parameters for a canonical reference organ name, used when
/// a milestone unlocks an organ and no AI-proposed parameters are present.
pub fn default_organ_parameters(organ_type: &str) -> HashMap<String, f32> {
    let mut params = HashMap::new();
    match organ_type {
        "chloroplast" => {
            params.insert("efficiency".to_string(), 3.0);
            params.insert("production".to_string(), 2.0);
        }
        "rhizoid" => {
            params.insert("absorption".to_string(), 2.5);
        }
        "cuticle" => {
            params.insert("resistance".to_string(), 2.0);
        }
        "vascular_bundle" => {
            params.insert("capacity".to_string(), 3.0);
            params.insert("rate".to_string(), 2.0);
        }
        "seed_coat" => {
            params.insert("resistance".to_string(), 3.0);
        }
        "flower" => {
            params.insert("efficiency".to_string(), 3.0);
        }
        "woody_stem" => {
            params.insert("density".to_string(), 4.0);
        }
        _ => {
            params.insert("efficiency".to_string(), 1.0);
        }
    }
    params
}

/// `GrowthForm` variants whose life-form-stage range includes `stage` and
/// are therefore legal to assign when a milestone changes stage.
pub fn growth_forms_for_stage(stage: u8) -> Vec<GrowthForm> {
    GrowthForm::all_valid_for_stage(stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_budget_monotonic_with_trophic_level() {
        let low = trophic_trait_budget(1.0);
        let high = trophic_trait_budget(5.5);
        assert!(high.total_limit > low.total_limit);
        assert!(high.specialized_limit >= low.specialized_limit);
    }

    #[test]
    fn body_length_bucket_monotonic() {
        assert!(speciation_body_length_bucket(0.001) > speciation_body_length_bucket(1000.0));
    }

    #[test]
    fn milestone_lookup_round_trips() {
        let m = milestone_by_id("first_land_plant").expect("milestone exists");
        assert_eq!(m.to_stage, 3);
    }
}
