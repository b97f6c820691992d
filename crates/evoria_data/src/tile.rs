use crate::SpeciesId;
use serde::{Deserialize, Serialize};

pub type TileId = u32;

/// A cell of the logical map grid. Read-only to the ecology core within a
/// turn; the map state exclusively owns these, the engine only references
/// them by id (spec §3 ownership summary).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub x: u16,
    pub y: u16,
    pub temperature: f32,
    pub humidity: f32,
    pub resources: f32,
    pub elevation: f32,
    pub biome: String,
    pub cover: f32,
    pub is_lake: bool,
    pub is_ocean: bool,
}

impl Tile {
    pub fn habitat_hint(&self) -> crate::HabitatType {
        use crate::HabitatType::*;
        if self.is_ocean {
            if self.elevation < -200.0 {
                DeepSea
            } else {
                Marine
            }
        } else if self.is_lake {
            Freshwater
        } else if self.elevation > 0.0 && self.cover < 0.2 {
            Terrestrial
        } else {
            Coastal
        }
    }
}

/// A `(tile, species, turn)` triple. A species exists at a tile iff a row
/// is present (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitatPopulation {
    pub tile_id: TileId,
    pub species_id: SpeciesId,
    pub turn: u64,
    pub population: f64,
    pub suitability: f32,
    pub occupancy: f32,
}

impl HabitatPopulation {
    pub fn new(tile_id: TileId, species_id: SpeciesId, turn: u64) -> Self {
        Self {
            tile_id,
            species_id,
            turn,
            population: 0.0,
            suitability: 0.0,
            occupancy: 0.0,
        }
    }
}
