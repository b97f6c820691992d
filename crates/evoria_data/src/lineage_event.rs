use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineageEventKind {
    Speciation,
    Milestone,
    Extinction,
    Adaptation,
    Regression,
    Hybridization,
    GeneFlow,
}

/// Append-only log entry; the shape persistence layers key on
/// (`lineage_code`, `event_type`, `created_at`) per spec §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageEvent {
    pub lineage_code: String,
    pub event_type: LineageEventKind,
    pub payload: Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub turn: u64,
}

impl LineageEvent {
    pub fn new(lineage_code: impl Into<String>, event_type: LineageEventKind, turn: u64, payload: Value) -> Self {
        Self {
            lineage_code: lineage_code.into(),
            event_type,
            payload,
            created_at: chrono::Utc::now(),
            turn,
        }
    }
}
