//! The engine's in-memory working set: flat id-keyed maps for species,
//! tiles, habitat rows and genera. No reference counting, no entity
//! hierarchy — every stage is a pure function over these collections,
//! per the design notes' rejection of cyclic object graphs.

use evoria_data::{Genus, HabitatPopulation, Species, SpeciesId, Tile, TileId};
use std::collections::HashMap;

/// Everything a turn operates on. Owned exclusively by the engine while a
/// turn is in flight; background observers may only read committed state
/// between turns.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub width: u32,
    pub height: u32,
    pub world_seed: u64,
    pub turn_index: u64,
    pub species: HashMap<SpeciesId, Species>,
    pub tiles: HashMap<TileId, Tile>,
    /// Keyed by `(tile_id, species_id)`; a row's presence is exactly "this
    /// species exists at this tile" (spec §3).
    pub habitats: HashMap<(TileId, SpeciesId), HabitatPopulation>,
    pub genera: HashMap<String, Genus>,
}

impl World {
    pub fn new(width: u32, height: u32, world_seed: u64) -> Self {
        Self {
            width,
            height,
            world_seed,
            turn_index: 0,
            species: HashMap::new(),
            tiles: HashMap::new(),
            habitats: HashMap::new(),
            genera: HashMap::new(),
        }
    }

    /// Tiles a species currently occupies (has a habitat row on).
    pub fn tiles_of(&self, species_id: SpeciesId) -> Vec<TileId> {
        self.habitats
            .keys()
            .filter(|(_, sid)| *sid == species_id)
            .map(|(tid, _)| *tid)
            .collect()
    }

    /// Species present on a tile.
    pub fn species_at(&self, tile_id: TileId) -> Vec<SpeciesId> {
        self.habitats
            .keys()
            .filter(|(tid, _)| *tid == tile_id)
            .map(|(_, sid)| *sid)
            .collect()
    }

    pub fn habitat(&self, tile_id: TileId, species_id: SpeciesId) -> Option<&HabitatPopulation> {
        self.habitats.get(&(tile_id, species_id))
    }

    /// 4-directional adjacency on the logical tile grid; `tile_id` is
    /// `y * width + x` (the convention `Tile::new` and the CLI's world
    /// initializer use).
    pub fn neighbors(&self, tile_id: TileId) -> Vec<TileId> {
        let x = tile_id % self.width;
        let y = tile_id / self.width;
        let mut out = Vec::with_capacity(4);
        if x > 0 {
            out.push(tile_id - 1);
        }
        if x + 1 < self.width {
            out.push(tile_id + 1);
        }
        if y > 0 {
            out.push(tile_id - self.width);
        }
        if y + 1 < self.height {
            out.push(tile_id + self.width);
        }
        out.retain(|t| self.tiles.contains_key(t));
        out
    }

    pub fn alive_species_ids(&self) -> Vec<SpeciesId> {
        self.species
            .values()
            .filter(|s| s.is_alive())
            .map(|s| s.id)
            .collect()
    }

    pub fn species_in_genus(&self, genus_code: &str) -> Vec<SpeciesId> {
        self.species
            .values()
            .filter(|s| s.genus_code == genus_code && s.is_alive())
            .map(|s| s.id)
            .collect()
    }
}
