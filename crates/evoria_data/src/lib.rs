//! Plain data types shared by the evolution simulation core.
//!
//! This crate holds no behavior beyond constructors and small invariant
//! checks on the data itself — the algorithms that mutate these types live
//! in `evoria_core`. Mirrors the `primordium_data` split in the wider
//! workspace: one crate of serializable structs, consumed by everything
//! else.

mod enums;
mod genus;
mod lineage_event;
mod organ;
mod pressure;
mod report;
mod species;
mod tile;
mod traits;

pub use enums::*;
pub use genus::Genus;
pub use lineage_event::{LineageEvent, LineageEventKind};
pub use organ::{DormantGeneProvenance, DormantGenes, DormantOrganGene, DormantTraitGene, Organ, OrganEvent};
pub use pressure::{EnvironmentDelta, MajorEvent, MajorEventSeverity, Pressure, PressureDirection, PressureKind};
pub use report::{
    BranchingEvent, EcologicalRealismFlag, EcologicalRealismSummary, PressureSummary,
    SpeciesSnapshot, StageOutcomeRecord, TileHealthBucketKey, TurnReport,
};
pub use species::Species;
pub use tile::{HabitatPopulation, Tile, TileId};
pub use traits::{AbstractTraits, HiddenTraits};

/// Stable identifier for a species, also used as the primary key of the
/// flat id-keyed species map the engine owns during a turn.
pub type SpeciesId = uuid::Uuid;
/// Stable identifier for a genus.
pub type GenusCode = String;
