//! # Evoria IO
//!
//! Persistence layer for the simulation: repository traits per spec §6
//! plus an in-memory reference implementation, enough to run the CLI and
//! the test suite without a database.

pub mod error;
pub mod memory;
pub mod repository;

pub use error::{IoError, Result};
pub use memory::InMemoryStore;
pub use repository::{EventLog, GenusRepository, HabitatRepository, Repositories, SpeciesRepository};
