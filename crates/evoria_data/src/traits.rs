use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Abstract traits (cold/heat/drought tolerance, sociality, ...), each
/// clamped to `[0, 15]`. A thin newtype over the map so call sites read
/// `species.abstract_traits.get("heat_tolerance")` the way the teacher's
/// loose-dict source does, while still giving us one place to enforce the
/// `[0, 15]` invariant from spec §3.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbstractTraits(pub HashMap<String, f32>);

impl AbstractTraits {
    pub fn get(&self, name: &str) -> f32 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    pub fn set_clamped(&mut self, name: &str, value: f32) {
        self.0.insert(name.to_string(), value.clamp(0.0, 15.0));
    }

    pub fn sum(&self) -> f32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f32)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut f32)> {
        self.0.iter_mut()
    }

    /// Standard animal trait defaults, matching `TraitConfig.STANDARD_TRAITS`.
    pub fn default_animal() -> Self {
        let mut m = HashMap::new();
        for name in [
            "cold_tolerance",
            "heat_tolerance",
            "drought_tolerance",
            "salinity_tolerance",
            "light_need",
            "locomotion",
            "reproduction_speed",
        ] {
            m.insert(name.to_string(), 5.0);
        }
        for name in ["sociality", "aggression", "defense"] {
            m.insert(name.to_string(), 3.0);
        }
        AbstractTraits(m)
    }

    /// Plant trait defaults, matching `PlantTraitConfig.PLANT_TRAITS` plus
    /// the shared subset of animal traits plants also carry.
    pub fn default_plant() -> Self {
        let mut m = HashMap::new();
        for name in [
            "cold_tolerance",
            "heat_tolerance",
            "drought_tolerance",
            "salinity_tolerance",
            "light_need",
            "reproduction_speed",
        ] {
            m.insert(name.to_string(), 5.0);
        }
        m.insert("photosynthesis_efficiency".to_string(), 5.0);
        m.insert("carbon_fixation".to_string(), 5.0);
        m.insert("root_development".to_string(), 0.0);
        m.insert("water_retention".to_string(), 3.0);
        m.insert("nutrient_uptake".to_string(), 5.0);
        m.insert("multicellularity".to_string(), 1.0);
        m.insert("lignification".to_string(), 0.0);
        m.insert("seed_ness".to_string(), 0.0);
        m.insert("dispersal_ability".to_string(), 3.0);
        m.insert("chemical_defense".to_string(), 3.0);
        m.insert("physical_defense".to_string(), 3.0);
        AbstractTraits(m)
    }
}

/// Hidden traits, each in `[0, 1]`: gene diversity, environment
/// sensitivity, evolution potential, mutation rate, adaptation speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiddenTraits {
    pub gene_diversity: f32,
    pub environment_sensitivity: f32,
    pub evolution_potential: f32,
    pub mutation_rate: f32,
    pub adaptation_speed: f32,
}

impl Default for HiddenTraits {
    fn default() -> Self {
        Self {
            gene_diversity: 0.5,
            environment_sensitivity: 0.5,
            evolution_potential: 0.5,
            mutation_rate: 0.1,
            adaptation_speed: 0.5,
        }
    }
}

impl HiddenTraits {
    pub fn clamp(&mut self) {
        self.gene_diversity = self.gene_diversity.clamp(0.0, 1.0);
        self.environment_sensitivity = self.environment_sensitivity.clamp(0.0, 1.0);
        self.evolution_potential = self.evolution_potential.clamp(0.0, 1.0);
        self.mutation_rate = self.mutation_rate.clamp(0.0, 1.0);
        self.adaptation_speed = self.adaptation_speed.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_animal_traits_are_within_budget() {
        let traits = AbstractTraits::default_animal();
        assert!(traits.sum() > 0.0);
        for (_, v) in traits.iter() {
            assert!((0.0..=15.0).contains(v));
        }
    }

    proptest::proptest! {
        /// `set_clamped` is the only write path onto an abstract trait;
        /// the `[0, 15]` bound (spec §3) must hold for any input.
        #[test]
        fn set_clamped_stays_in_bounds(value in -1000.0f32..1000.0) {
            let mut traits = AbstractTraits::default();
            traits.set_clamped("heat_tolerance", value);
            let stored = traits.get("heat_tolerance");
            prop_assert!((0.0..=15.0).contains(&stored));
        }

        /// `HiddenTraits::clamp` must bring every field into `[0, 1]`
        /// regardless of how far out of range adaptation pushed it.
        #[test]
        fn hidden_traits_clamp_stays_in_unit_interval(
            gene_diversity in -10.0f32..10.0,
            environment_sensitivity in -10.0f32..10.0,
            evolution_potential in -10.0f32..10.0,
            mutation_rate in -10.0f32..10.0,
            adaptation_speed in -10.0f32..10.0,
        ) {
            let mut traits = HiddenTraits {
                gene_diversity,
                environment_sensitivity,
                evolution_potential,
                mutation_rate,
                adaptation_speed,
            };
            traits.clamp();
            prop_assert!((0.0..=1.0).contains(&traits.gene_diversity));
            prop_assert!((0.0..=1.0).contains(&traits.environment_sensitivity));
            prop_assert!((0.0..=1.0).contains(&traits.evolution_potential));
            prop_assert!((0.0..=1.0).contains(&traits.mutation_rate));
            prop_assert!((0.0..=1.0).contains(&traits.adaptation_speed));
        }
    }
}
