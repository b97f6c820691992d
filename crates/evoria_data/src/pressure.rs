use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureDirection {
    Cold,
    Hot,
    High,
    Low,
}

/// A named environmental pressure type, e.g. `temperature`/`cold`,
/// `drought`/`high`, `predator`/`high`. Carried as a tagged kind rather
/// than a bare string so the adaptation/speciation systems can match on
/// it exhaustively (spec §9's "variant-heavy entities" guidance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureKind {
    Temperature,
    Drought,
    Humidity,
    Flood,
    Salinity,
    Pressure,
    LightReduction,
    Acidity,
    Oxygen,
    Toxin,
    UvRadiation,
    ResourceDecline,
    ResourceBoost,
    Competition,
    NicheDisplacement,
    Predator,
    HabitatFragmentation,
    Wildfire,
    Disease,
    Seasonality,
    MortalitySpike,
    CarbonateStress,
    Co2Level,
    NutrientPoor,
    Herbivory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pressure {
    pub kind: PressureKind,
    pub direction: PressureDirection,
    pub magnitude: f32,
    pub tile_ids: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MajorEventSeverity {
    Minor,
    Moderate,
    Severe,
    Extreme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MajorEvent {
    pub name: String,
    pub severity: MajorEventSeverity,
    pub affected_tiles: Vec<u32>,
    pub description: String,
}

/// Output of the external terrain-evolution module, consumed once at the
/// start of a turn (spec §4.1 stage 1, §6 "Terrain module (producer)").
/// The ecology core never produces this; it is a pure input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentDelta {
    pub temp_change: f32,
    pub sea_level_change: f32,
    pub light_level: f32,
    pub pressures: Vec<Pressure>,
    pub major_events: Vec<MajorEvent>,
}
