//! In-memory reference implementation of the repository traits, sufficient
//! to run the CLI and integration tests without a database. Mirrors the
//! teacher's `LineagePersistence`/`HistoryLogger` save-load shape, but
//! keeps state in `HashMap`s instead of round-tripping through a file.

use std::collections::HashMap;

use evoria_data::{Genus, HabitatPopulation, LineageEvent, Species, SpeciesId, Tile, TileId};

use crate::error::Result;
use crate::repository::{EventLog, GenusRepository, HabitatRepository, SpeciesRepository};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    species: HashMap<SpeciesId, Species>,
    habitats: HashMap<(TileId, SpeciesId), HabitatPopulation>,
    tiles: HashMap<TileId, Tile>,
    genera: HashMap<String, Genus>,
    events: Vec<LineageEvent>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Round-trips the store through JSON, the same encoding the persisted
    /// layout of spec §6 settles on ("no binary wire format is defined").
    pub fn to_json(&self) -> Result<String> {
        let snapshot = StoreSnapshot {
            species: self.species.values().cloned().collect(),
            habitats: self.habitats.values().cloned().collect(),
            tiles: self.tiles.values().cloned().collect(),
            genera: self.genera.values().cloned().collect(),
            events: self.events.clone(),
        };
        serde_json::to_string_pretty(&snapshot).map_err(Into::into)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: StoreSnapshot = serde_json::from_str(text)?;
        let mut store = Self::new();
        for s in snapshot.species {
            store.species.insert(s.id, s);
        }
        for h in snapshot.habitats {
            store.habitats.insert((h.tile_id, h.species_id), h);
        }
        for t in snapshot.tiles {
            store.tiles.insert(t.id, t);
        }
        for g in snapshot.genera {
            store.genera.insert(g.genus_code.clone(), g);
        }
        store.events = snapshot.events;
        Ok(store)
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StoreSnapshot {
    species: Vec<Species>,
    habitats: Vec<HabitatPopulation>,
    tiles: Vec<Tile>,
    genera: Vec<Genus>,
    events: Vec<LineageEvent>,
}

impl SpeciesRepository for InMemoryStore {
    fn list_species(&self) -> Result<Vec<Species>> {
        Ok(self.species.values().cloned().collect())
    }

    fn get(&self, id: SpeciesId) -> Result<Option<Species>> {
        Ok(self.species.get(&id).cloned())
    }

    fn upsert(&mut self, species: Species) -> Result<Species> {
        tracing::debug!(lineage_code = %species.lineage_code, "upserting species");
        self.species.insert(species.id, species.clone());
        Ok(species)
    }
}

impl HabitatRepository for InMemoryStore {
    fn latest_habitats(&self, species_ids: Option<&[SpeciesId]>) -> Result<Vec<HabitatPopulation>> {
        let rows = self.habitats.values().filter(|row| match species_ids {
            Some(ids) => ids.contains(&row.species_id),
            None => true,
        });
        Ok(rows.cloned().collect())
    }

    fn write_habitats(&mut self, rows: Vec<HabitatPopulation>) -> Result<()> {
        for row in rows {
            self.habitats.insert((row.tile_id, row.species_id), row);
        }
        Ok(())
    }

    fn list_tiles(&self) -> Result<Vec<Tile>> {
        Ok(self.tiles.values().cloned().collect())
    }

    fn write_tiles(&mut self, tiles: Vec<Tile>) -> Result<()> {
        for tile in tiles {
            self.tiles.insert(tile.id, tile);
        }
        Ok(())
    }
}

impl GenusRepository for InMemoryStore {
    fn get_by_code(&self, genus_code: &str) -> Result<Option<Genus>> {
        Ok(self.genera.get(genus_code).cloned())
    }

    fn upsert(&mut self, genus: Genus) -> Result<Genus> {
        self.genera.insert(genus.genus_code.clone(), genus.clone());
        Ok(genus)
    }

    fn update_distances(&mut self, genus_code: &str, distances: &[(String, String, f32)], turn: u64) -> Result<()> {
        let genus = self.genera.entry(genus_code.to_string()).or_insert_with(|| Genus::new(genus_code));
        for (code_a, code_b, distance) in distances {
            genus.set_distance(code_a, code_b, *distance);
            genus.common_ancestor_turn.entry(code_a.clone()).or_insert(turn);
            genus.common_ancestor_turn.entry(code_b.clone()).or_insert(turn);
        }
        Ok(())
    }
}

impl EventLog for InMemoryStore {
    fn log_event(&mut self, event: LineageEvent) -> Result<()> {
        tracing::debug!(lineage_code = %event.lineage_code, ?event.event_type, "lineage event");
        self.events.push(event);
        Ok(())
    }

    fn events_for(&self, lineage_code: &str) -> Result<Vec<LineageEvent>> {
        Ok(self.events.iter().filter(|e| e.lineage_code == lineage_code).cloned().collect())
    }

    fn all_events(&self) -> Result<Vec<LineageEvent>> {
        Ok(self.events.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evoria_data::{AbstractTraits, DietType, HabitatType, HiddenTraits, LineageEventKind, TaxonomicRank};

    fn sample_species() -> Species {
        Species {
            id: uuid::Uuid::new_v4(),
            lineage_code: "A1".to_string(),
            parent_code: None,
            genus_code: "A".to_string(),
            taxonomic_rank: TaxonomicRank::Species,
            status: evoria_data::SpeciesStatus::Alive,
            created_turn: 0,
            is_background: false,
            trophic_level: 1.0,
            diet_type: DietType::Autotroph,
            habitat_type: HabitatType::Terrestrial,
            morphology_stats: HashMap::new(),
            abstract_traits: AbstractTraits::default_plant(),
            hidden_traits: HiddenTraits::default(),
            organs: HashMap::new(),
            capabilities: Default::default(),
            dormant_genes: Default::default(),
            prey_species: Vec::new(),
            prey_preferences: HashMap::new(),
            life_form_stage: 0,
            growth_form: None,
            achieved_milestones: Vec::new(),
            accumulated_adaptation_score: 0.0,
            last_description_update_turn: 0,
            hybrid_parent_codes: Vec::new(),
            hybrid_fertility: None,
            latin_name: "Testus primus".to_string(),
            common_name: "Test species".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn upsert_then_list_round_trips() {
        let mut store = InMemoryStore::new();
        let sp = sample_species();
        let id = sp.id;
        store.upsert(sp).unwrap();
        assert_eq!(store.list_species().unwrap().len(), 1);
        assert!(store.get(id).unwrap().is_some());
    }

    #[test]
    fn events_filter_by_lineage() {
        let mut store = InMemoryStore::new();
        store
            .log_event(LineageEvent::new("A1".to_string(), LineageEventKind::Milestone, 3, serde_json::json!({})))
            .unwrap();
        store
            .log_event(LineageEvent::new("B1".to_string(), LineageEventKind::Milestone, 3, serde_json::json!({})))
            .unwrap();
        assert_eq!(store.events_for("A1").unwrap().len(), 1);
        assert_eq!(store.all_events().unwrap().len(), 2);
    }

    #[test]
    fn json_round_trip_preserves_species() {
        let mut store = InMemoryStore::new();
        store.upsert(sample_species()).unwrap();
        let json = store.to_json().unwrap();
        let reloaded = InMemoryStore::from_json(&json).unwrap();
        assert_eq!(reloaded.list_species().unwrap().len(), 1);
    }
}
