use crate::enums::{SpeciationType, TileHealthBucket};
use crate::{LineageEvent, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcologicalRealismFlag {
    pub species_id: SpeciesId,
    pub description: String,
}

/// Per-species snapshot rolled up into a `TurnReport`. Purely derived; the
/// report itself contains no authoritative state (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesSnapshot {
    pub species_id: SpeciesId,
    pub lineage_code: String,
    pub population_kg: f64,
    pub deaths_kg: f64,
    pub births_kg: f64,
    pub death_rate: f32,
    pub death_tile_distribution: HashMap<TileHealthBucketKey, u32>,
    pub refuge_available: bool,
}

/// `HashMap` keys must be hashable/serializable as map keys; wrap the
/// bucket enum for that purpose rather than stringly-typing the whole
/// report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileHealthBucketKey {
    Healthy,
    Warning,
    Critical,
}

impl From<TileHealthBucket> for TileHealthBucketKey {
    fn from(b: TileHealthBucket) -> Self {
        match b {
            TileHealthBucket::Healthy => TileHealthBucketKey::Healthy,
            TileHealthBucket::Warning => TileHealthBucketKey::Warning,
            TileHealthBucket::Critical => TileHealthBucketKey::Critical,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchingEvent {
    pub parent_lineage_code: String,
    pub child_lineage_codes: Vec<String>,
    pub speciation_type: SpeciationType,
    pub turn: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PressureSummary {
    pub total_pressure_events: u32,
    pub by_kind: HashMap<String, u32>,
    pub major_events: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcologicalRealismSummary {
    pub flags: Vec<EcologicalRealismFlag>,
    pub trophic_level_counts: HashMap<String, u32>,
}

/// Aggregate per-turn report. Stage outcomes appear in `stage_outcomes` so
/// failed/skipped stages are always enumerated with their reasons, per
/// spec §7's "user-visible behaviour" clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u64,
    pub species_snapshots: Vec<SpeciesSnapshot>,
    pub pressure_summary: PressureSummary,
    pub branching_events: Vec<BranchingEvent>,
    pub major_environmental_events: Vec<String>,
    pub ecological_realism_summary: EcologicalRealismSummary,
    pub stage_outcomes: Vec<StageOutcomeRecord>,
    /// Speciation/hybridization/milestone/regression events raised this
    /// turn, for the caller to persist via an `EventLog` (the pipeline
    /// itself holds no repository handle, per spec §9's pure-stage design).
    pub lineage_events: Vec<LineageEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcomeRecord {
    pub stage: String,
    pub outcome: String,
    pub reason: Option<String>,
}

impl TurnReport {
    pub fn new(turn: u64) -> Self {
        Self {
            turn,
            species_snapshots: Vec::new(),
            pressure_summary: PressureSummary::default(),
            branching_events: Vec::new(),
            major_environmental_events: Vec::new(),
            ecological_realism_summary: EcologicalRealismSummary::default(),
            stage_outcomes: Vec::new(),
            lineage_events: Vec::new(),
        }
    }
}
