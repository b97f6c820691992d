use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxonomicRank {
    Species,
    Subspecies,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeciesStatus {
    Alive,
    Extinct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DietType {
    Autotroph,
    Herbivore,
    Carnivore,
    Omnivore,
    Detritivore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitatType {
    Marine,
    DeepSea,
    Coastal,
    Freshwater,
    Amphibious,
    Terrestrial,
    Aerial,
}

impl HabitatType {
    /// Adjacency table from `speciation_rules.py::HABITAT_TRANSITIONS`.
    /// A child's proposed habitat is legal only if it appears here.
    pub fn valid_transitions(self) -> &'static [HabitatType] {
        use HabitatType::*;
        match self {
            Marine => &[Marine, Coastal, DeepSea],
            DeepSea => &[DeepSea, Marine],
            Coastal => &[Coastal, Marine, Amphibious, Terrestrial],
            Freshwater => &[Freshwater, Amphibious, Coastal],
            Amphibious => &[Amphibious, Freshwater, Coastal, Terrestrial],
            Terrestrial => &[Terrestrial, Amphibious, Aerial],
            Aerial => &[Aerial, Terrestrial],
        }
    }

    pub fn can_transition_to(self, target: HabitatType) -> bool {
        self.valid_transitions().contains(&target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthForm {
    Aquatic,
    Moss,
    Herb,
    Shrub,
    Tree,
}

impl GrowthForm {
    /// `PlantTraitConfig.GROWTH_FORM_STAGE_CONSTRAINTS`.
    pub fn valid_life_form_stages(self) -> &'static [u8] {
        match self {
            GrowthForm::Aquatic => &[0, 1, 2],
            GrowthForm::Moss => &[3],
            GrowthForm::Herb => &[4, 5, 6],
            GrowthForm::Shrub => &[5, 6],
            GrowthForm::Tree => &[5, 6],
        }
    }

    pub fn valid_for_stage(self, stage: u8) -> bool {
        self.valid_life_form_stages().contains(&stage)
    }

    pub fn all_valid_for_stage(stage: u8) -> Vec<GrowthForm> {
        [
            GrowthForm::Aquatic,
            GrowthForm::Moss,
            GrowthForm::Herb,
            GrowthForm::Shrub,
            GrowthForm::Tree,
        ]
        .into_iter()
        .filter(|g| g.valid_for_stage(stage))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganCategory {
    Locomotion,
    Sensory,
    Metabolic,
    Digestive,
    Defense,
    Reproduction,
    Photosynthetic,
    RootSystem,
    Stem,
    Protection,
    Vascular,
    Storage,
}

impl OrganCategory {
    pub fn is_plant_only(self) -> bool {
        matches!(
            self,
            OrganCategory::Photosynthetic
                | OrganCategory::RootSystem
                | OrganCategory::Stem
                | OrganCategory::Protection
                | OrganCategory::Vascular
                | OrganCategory::Storage
        )
    }

    /// Canonical snake_case key used to index `Species::organs`, matching
    /// the category names the component design uses in prose.
    pub fn key_name(self) -> &'static str {
        match self {
            OrganCategory::Locomotion => "locomotion",
            OrganCategory::Sensory => "sensory",
            OrganCategory::Metabolic => "metabolic",
            OrganCategory::Digestive => "digestive",
            OrganCategory::Defense => "defense",
            OrganCategory::Reproduction => "reproduction",
            OrganCategory::Photosynthetic => "photosynthetic",
            OrganCategory::RootSystem => "root_system",
            OrganCategory::Stem => "stem",
            OrganCategory::Protection => "protection",
            OrganCategory::Vascular => "vascular",
            OrganCategory::Storage => "storage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeciationType {
    GeographicIsolation,
    EcologicalSpecialization,
    Coevolution,
    EcologicalIsolation,
    Radiation,
}

impl SpeciationType {
    pub fn as_str(self) -> &'static str {
        match self {
            SpeciationType::GeographicIsolation => "geographic_isolation",
            SpeciationType::EcologicalSpecialization => "ecological_specialization",
            SpeciationType::Coevolution => "coevolution",
            SpeciationType::EcologicalIsolation => "ecological_isolation",
            SpeciationType::Radiation => "radiation",
        }
    }
}

/// Presence bucket derived from occupancy, per spec §4.9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceStatus {
    Established,
    Present,
    Marginal,
    Absent,
}

impl PresenceStatus {
    pub fn from_occupancy(occupancy: f32) -> Self {
        if occupancy >= 0.60 {
            PresenceStatus::Established
        } else if occupancy >= 0.30 {
            PresenceStatus::Present
        } else if occupancy >= 0.10 {
            PresenceStatus::Marginal
        } else {
            PresenceStatus::Absent
        }
    }
}

/// Health bucket for a species' per-tile mortality distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileHealthBucket {
    Healthy,
    Warning,
    Critical,
}

impl TileHealthBucket {
    pub fn from_death_rate(rate: f32) -> Self {
        if rate < 0.15 {
            TileHealthBucket::Healthy
        } else if rate < 0.40 {
            TileHealthBucket::Warning
        } else {
            TileHealthBucket::Critical
        }
    }
}
