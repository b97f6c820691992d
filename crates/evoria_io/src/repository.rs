//! Repository traits: the abstract persistence contract from spec §6,
//! kept narrow enough that an in-memory store and a future database-backed
//! one can both implement it without the engine knowing which.

use evoria_data::{Genus, HabitatPopulation, LineageEvent, Species, SpeciesId, Tile};

use crate::error::Result;

/// Species table: list, upsert. No delete — extinction is a status flag on
/// `Species`, never a row removal (spec §3/§9 identity model).
pub trait SpeciesRepository {
    fn list_species(&self) -> Result<Vec<Species>>;
    fn get(&self, id: SpeciesId) -> Result<Option<Species>>;
    fn upsert(&mut self, species: Species) -> Result<Species>;
}

/// HabitatPopulation table, keyed by `(tile_id, species_id, turn_index)` in
/// the persisted layout; the in-memory store keeps only the latest turn per
/// key, matching what the pipeline actually reads back.
pub trait HabitatRepository {
    fn latest_habitats(&self, species_ids: Option<&[SpeciesId]>) -> Result<Vec<HabitatPopulation>>;
    fn write_habitats(&mut self, rows: Vec<HabitatPopulation>) -> Result<()>;
    fn list_tiles(&self) -> Result<Vec<Tile>>;
    fn write_tiles(&mut self, tiles: Vec<Tile>) -> Result<()>;
}

/// Genus store: gene library and pairwise genetic distances, keyed by
/// genus code.
pub trait GenusRepository {
    fn get_by_code(&self, genus_code: &str) -> Result<Option<Genus>>;
    fn upsert(&mut self, genus: Genus) -> Result<Genus>;
    fn update_distances(&mut self, genus_code: &str, distances: &[(String, String, f32)], turn: u64) -> Result<()>;
}

/// Append-only lineage-event log (spec §6's `log_event`).
pub trait EventLog {
    fn log_event(&mut self, event: LineageEvent) -> Result<()>;
    fn events_for(&self, lineage_code: &str) -> Result<Vec<LineageEvent>>;
    fn all_events(&self) -> Result<Vec<LineageEvent>>;
}

/// Marker alias for call sites that need every repository trait at once
/// (the CLI wiring, mainly); a single in-memory struct implements all four.
pub trait Repositories: SpeciesRepository + HabitatRepository + GenusRepository + EventLog {}
impl<T: SpeciesRepository + HabitatRepository + GenusRepository + EventLog> Repositories for T {}
