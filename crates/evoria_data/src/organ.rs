use crate::enums::OrganCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A recorded change to an organ across its lifetime, kept for provenance
/// (spec §3: "enhancement preserves history list").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganEvent {
    pub turn: u64,
    pub description: String,
    pub stage_before: u8,
    pub stage_after: u8,
}

/// A single organ instance on a species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organ {
    pub category: OrganCategory,
    pub organ_type: String,
    pub parameters: HashMap<String, f32>,
    /// `0..=4`, primordium through fully elaborate.
    pub evolution_stage: u8,
    /// Progress toward the next stage, in `[0, 1]`.
    pub evolution_progress: f32,
    pub is_active: bool,
    pub acquired_turn: u64,
    pub evolution_history: Vec<OrganEvent>,
}

impl Organ {
    pub fn new_primordium(category: OrganCategory, organ_type: impl Into<String>, turn: u64) -> Self {
        Self {
            category,
            organ_type: organ_type.into(),
            parameters: HashMap::new(),
            evolution_stage: 1,
            evolution_progress: 0.0,
            is_active: false,
            acquired_turn: turn,
            evolution_history: Vec::new(),
        }
    }

    /// Threshold for stage `n` is `n / 4.0`; crossing it advances the
    /// stage and activates the organ once stage `>= 2` (spec §4.5).
    pub fn stage_threshold(stage: u8) -> f32 {
        (stage as f32 + 1.0) / 4.0
    }

    pub fn record_event(&mut self, turn: u64, description: impl Into<String>, stage_before: u8) {
        self.evolution_history.push(OrganEvent {
            turn,
            description: description.into(),
            stage_before,
            stage_after: self.evolution_stage,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DormantGeneProvenance {
    Inherited,
    DeNovoMutation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DormantTraitGene {
    pub trait_name: String,
    pub potential: f32,
    pub activation_threshold: f32,
    pub required_pressures: Vec<String>,
    pub exposure_count: u32,
    pub dominance: f32,
    pub provenance: DormantGeneProvenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DormantOrganGene {
    pub category: OrganCategory,
    pub organ_type: String,
    pub potential_stage: u8,
    pub activation_threshold: f32,
    pub required_pressures: Vec<String>,
    pub exposure_count: u32,
    pub dominance: f32,
    pub provenance: DormantGeneProvenance,
}

/// Un-expressed potential carried by a species, per spec §3's
/// "dormant genes" (traits and organs).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DormantGenes {
    pub traits: Vec<DormantTraitGene>,
    pub organs: Vec<DormantOrganGene>,
}
