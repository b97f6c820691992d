//! Competition & territory — stage 3 (occupancy update, read again at
//! mortality) and the niche-similarity kernel shared by mortality's
//! competition term. See component design §4.9.

use evoria_data::{HabitatPopulation, PresenceStatus, Species, SpeciesId, TileId};
use std::collections::HashMap;

use crate::config::CompetitionConfig;

/// Ecological layer derived from trophic level (spec §4.9). Competition is
/// scoped to same-layer co-inhabitants only.
pub fn ecological_layer(trophic_level: f32) -> u8 {
    if trophic_level < 1.5 {
        1
    } else if trophic_level < 2.5 {
        2
    } else if trophic_level < 3.5 {
        3
    } else if trophic_level < 4.5 {
        4
    } else {
        5
    }
}

/// Structured feature-space similarity over trophic level, log body size,
/// habitat code, and thermal/drought traits; blended with an optional
/// embedding cosine similarity when one is available.
pub fn niche_similarity(a: &Species, b: &Species, embedding_cosine: Option<f32>, cfg: &CompetitionConfig) -> f32 {
    let structured = structured_similarity(a, b);
    match embedding_cosine {
        Some(cos) => (cfg.structured_weight * structured + cfg.embedding_weight * cos).clamp(0.0, 1.0),
        None => structured.clamp(0.0, 1.0),
    }
}

fn structured_similarity(a: &Species, b: &Species) -> f32 {
    let trophic_diff = (a.trophic_level - b.trophic_level).abs() / 4.5;
    let body_a = a.body_length_cm().max(0.01).ln();
    let body_b = b.body_length_cm().max(0.01).ln();
    let size_diff = (body_a - body_b).abs() as f32 / 10.0;
    let habitat_match = if a.habitat_type == b.habitat_type { 0.0 } else { 1.0 };
    let thermal_diff = ((a.abstract_traits.get("cold_tolerance") - b.abstract_traits.get("cold_tolerance")).abs()
        + (a.abstract_traits.get("drought_tolerance") - b.abstract_traits.get("drought_tolerance")).abs())
        / 30.0;

    (1.0 - (trophic_diff + size_diff + habitat_match + thermal_diff) / 4.0).clamp(0.0, 1.0)
}

/// Competition factor from similarity, per the strong/weak/none bucketing
/// shared by mortality and occupancy update.
pub fn competition_factor(similarity: f32, cfg: &CompetitionConfig) -> f32 {
    if similarity >= cfg.strong_similarity {
        cfg.strong_factor
    } else if similarity >= cfg.weak_similarity {
        cfg.weak_factor
    } else {
        0.0
    }
}

/// Per-(tile, species) occupancy delta for this turn.
pub struct OccupancyUpdate {
    pub tile_id: TileId,
    pub species_id: SpeciesId,
    pub new_occupancy: f32,
}

/// Advances occupancy for every habitat row, given the suitability matrix
/// and per-tile population shares; co-inhabitants are pre-grouped by the
/// caller (the pipeline), which also resolves embedding cosines if present.
pub fn update_occupancy(
    habitats: &HashMap<(TileId, SpeciesId), HabitatPopulation>,
    species: &HashMap<SpeciesId, Species>,
    suitability: &HashMap<(SpeciesId, TileId), f32>,
    refuge_tiles: &std::collections::HashSet<TileId>,
    presence_turns: &HashMap<(TileId, SpeciesId), u32>,
    cfg: &CompetitionConfig,
) -> Vec<OccupancyUpdate> {
    let mut by_tile: HashMap<TileId, Vec<SpeciesId>> = HashMap::new();
    for (tid, sid) in habitats.keys() {
        by_tile.entry(*tid).or_default().push(*sid);
    }

    let mut out = Vec::with_capacity(habitats.len());
    for ((tile_id, species_id), row) in habitats {
        let Some(sp) = species.get(species_id) else { continue };
        if row.population <= 0.0 {
            let decayed = (row.occupancy - cfg.occupancy_decay_no_population).max(0.0);
            out.push(OccupancyUpdate { tile_id: *tile_id, species_id: *species_id, new_occupancy: decayed });
            continue;
        }

        let suit = suitability.get(&(*species_id, *tile_id)).copied().unwrap_or(0.0);
        let pop_share = population_share(habitats, *tile_id, *species_id);
        let mut gain = (suit * cfg.occupancy_suitability_gain_max).min(cfg.occupancy_suitability_gain_max)
            + (pop_share * cfg.occupancy_population_share_gain_max).min(cfg.occupancy_population_share_gain_max);

        if presence_turns.get(&(*tile_id, *species_id)).copied().unwrap_or(0) >= 2 {
            gain += cfg.occupancy_long_presence_bonus;
        }
        if refuge_tiles.contains(tile_id) {
            gain += cfg.occupancy_refuge_bonus_max;
        }

        let mut loss = 0.0;
        let layer = ecological_layer(sp.trophic_level);
        for other_id in by_tile.get(tile_id).into_iter().flatten() {
            if *other_id == *species_id {
                continue;
            }
            let Some(other_sp) = species.get(other_id) else { continue };
            if ecological_layer(other_sp.trophic_level) != layer {
                continue;
            }
            let other_row = habitats.get(&(*tile_id, *other_id));
            let other_occ = other_row.map(|r| r.occupancy).unwrap_or(0.0);
            let pop_stronger = other_row.map(|r| (r.population > row.population) as i32 as f32).unwrap_or(0.0);
            let sim = structured_similarity(sp, other_sp);
            loss += sim * (other_occ - row.occupancy).max(0.0) * pop_stronger.max(0.2);
        }
        loss = (loss * 0.1).min(cfg.occupancy_competition_loss_cap);

        let new_occ = (row.occupancy + gain - loss).clamp(0.0, 1.0);
        out.push(OccupancyUpdate { tile_id: *tile_id, species_id: *species_id, new_occupancy: new_occ });
    }
    out
}

fn population_share(habitats: &HashMap<(TileId, SpeciesId), HabitatPopulation>, tile_id: TileId, species_id: SpeciesId) -> f32 {
    let total: f64 = habitats
        .iter()
        .filter(|((t, _), _)| *t == tile_id)
        .map(|(_, r)| r.population)
        .sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mine = habitats.get(&(tile_id, species_id)).map(|r| r.population).unwrap_or(0.0);
    (mine / total) as f32
}

pub fn presence_status(occupancy: f32) -> PresenceStatus {
    PresenceStatus::from_occupancy(occupancy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_boundaries() {
        assert_eq!(ecological_layer(1.0), 1);
        assert_eq!(ecological_layer(2.0), 2);
        assert_eq!(ecological_layer(4.6), 5);
    }

    #[test]
    fn competition_factor_buckets() {
        let cfg = CompetitionConfig::default();
        assert_eq!(competition_factor(0.9, &cfg), cfg.strong_factor);
        assert_eq!(competition_factor(0.6, &cfg), cfg.weak_factor);
        assert_eq!(competition_factor(0.2, &cfg), 0.0);
    }
}
