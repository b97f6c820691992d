//! Plant evolution — stage 10 (milestone evaluation). See §4.8. Milestone
//! definitions and default organ parameters live in `tables`; this module
//! applies them.

use evoria_data::{GrowthForm, Organ, Species};

use crate::tables::{default_organ_parameters, growth_forms_for_stage, milestone_by_id, plant_milestones, Milestone};

pub fn is_plant(species: &Species) -> bool {
    species.is_plant()
}

fn requirements_met(species: &Species, milestone: &Milestone) -> bool {
    milestone.requirements.iter().all(|(name, min)| species.abstract_traits.get(name) >= *min)
}

/// Finds the first milestone whose requirements are satisfied and whose
/// `from_stage` matches the species' current stage (or, for morphological
/// milestones, whose trigger condition is met regardless of stage).
pub fn eligible_milestone(species: &Species) -> Option<&'static Milestone> {
    plant_milestones().iter().find(|m| {
        if m.morphological_only {
            requirements_met(species, m) && !species.achieved_milestones.contains(&m.id.to_string())
        } else {
            m.from_stage == species.life_form_stage
                && requirements_met(species, m)
                && !species.achieved_milestones.contains(&m.id.to_string())
        }
    })
}

/// Applies a milestone: sets the stage (unless morphological-only),
/// re-validates growth form against the resulting stage, adds unlocked
/// organs at their standard parameters, and records the achievement.
pub fn apply_milestone(species: &mut Species, milestone: &Milestone, current_turn: u64) {
    if !milestone.morphological_only {
        species.life_form_stage = milestone.to_stage;
        if let Some(current) = species.growth_form {
            if !current.valid_for_stage(species.life_form_stage) {
                species.growth_form = growth_forms_for_stage(species.life_form_stage).into_iter().next();
            }
        } else {
            species.growth_form = growth_forms_for_stage(species.life_form_stage).into_iter().next();
        }
    }

    for (category, organ_type) in milestone.unlocks {
        let key = category.key_name().to_string();
        let mut organ = Organ::new_primordium(*category, *organ_type, current_turn);
        organ.parameters = default_organ_parameters(organ_type);
        species.organs.entry(key).or_insert(organ);
    }

    species.achieved_milestones.push(milestone.id.to_string());
}

/// An explicit milestone request at speciation time, validated before
/// application: stage can only advance by at most +1, and the requested
/// growth form must be legal for the resulting stage.
pub fn validate_milestone_request(species: &Species, milestone_id: &str) -> Option<&'static Milestone> {
    let m = milestone_by_id(milestone_id)?;
    if !m.morphological_only && m.to_stage > species.life_form_stage + 1 {
        return None;
    }
    if !requirements_met(species, m) {
        return None;
    }
    Some(m)
}

pub fn validate_growth_form(growth_form: GrowthForm, stage: u8) -> bool {
    growth_form.valid_for_stage(stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evoria_data::OrganCategory;

    fn coastal_plant() -> Species {
        let mut sp = crate::test_support::basic_species(evoria_data::DietType::Autotroph, 1.0);
        sp.abstract_traits = evoria_data::AbstractTraits::default_plant();
        sp.life_form_stage = 2;
        sp.growth_form = Some(GrowthForm::Aquatic);
        sp.abstract_traits.set_clamped("water_retention", 5.2);
        sp.abstract_traits.set_clamped("drought_tolerance", 4.3);
        sp
    }

    #[test]
    fn landing_milestone_triggers_and_unlocks_organs() {
        let mut sp = coastal_plant();
        let milestone = eligible_milestone(&sp).expect("first_land_plant should be eligible");
        assert_eq!(milestone.id, "first_land_plant");
        apply_milestone(&mut sp, milestone, 5);
        assert_eq!(sp.life_form_stage, 3);
        assert!(sp.organs.contains_key(&OrganCategory::RootSystem.key_name().to_string()));
        assert!(sp.organs.contains_key(&OrganCategory::Protection.key_name().to_string()));
        assert!(sp.achieved_milestones.contains(&"first_land_plant".to_string()));
        assert!(sp.growth_form.unwrap().valid_for_stage(3));
    }

    #[test]
    fn morphological_milestone_does_not_change_stage() {
        let mut sp = coastal_plant();
        sp.life_form_stage = 5;
        sp.growth_form = Some(GrowthForm::Tree);
        sp.abstract_traits.set_clamped("lignification", 8.0);
        let milestone = milestone_by_id("first_tree").unwrap();
        let stage_before = sp.life_form_stage;
        apply_milestone(&mut sp, milestone, 5);
        assert_eq!(sp.life_form_stage, stage_before);
        assert!(sp.organs.contains_key(&OrganCategory::Stem.key_name().to_string()));
    }
}
