//! Simulation engine: the per-turn pipeline and every stage algorithm it
//! runs, over the flat id-keyed `World`. See `DESIGN.md` at the workspace
//! root for how each module traces back to its grounding source.

pub mod adaptation;
pub mod carrying_capacity;
pub mod competition;
pub mod config;
pub mod error;
pub mod gene_flow;
pub mod hybridization;
pub mod invariants;
pub mod mortality;
pub mod pipeline;
pub mod plant;
pub mod reproduction;
pub mod rng;
pub mod speciation;
pub mod suitability;
pub mod tables;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::SimConfig;
pub use error::{EngineError, Result, StageOutcome};
pub use evoria_data::TurnReport;
pub use pipeline::TurnPipeline;
pub use rng::TurnRng;
pub use world::World;
