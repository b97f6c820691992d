//! The turn pipeline: the fixed stage order that turns one committed world
//! state into the next. See component design §4.1/§4.2 and §9 for why each
//! stage is a pure function from an immutable snapshot to a delta, applied
//! atomically once every stage has run (or been skipped) without a fatal
//! invariant violation.
//!
//! AI-sourced content (descriptions, embeddings) is deliberately not wired
//! in here: per §6 those run as a best-effort background pass over
//! committed state between turns, never gating the turn loop itself.

use evoria_data::{
    BranchingEvent, EcologicalRealismFlag, EcologicalRealismSummary, EnvironmentDelta, Genus, HabitatPopulation,
    LineageEvent, LineageEventKind, PressureSummary, Species, SpeciesId, SpeciesSnapshot, StageOutcomeRecord, Tile,
    TileHealthBucketKey, TileId, TurnReport,
};
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::config::SimConfig;
use crate::error::{EngineError, Result};
use crate::rng::TurnRng;
use crate::world::World;
use crate::{adaptation, carrying_capacity, competition, gene_flow, hybridization, invariants, mortality, plant, reproduction, speciation, suitability};

/// Owns the working `World` and drives it through one turn at a time.
pub struct TurnPipeline {
    pub world: World,
    pub config: SimConfig,
    /// Consecutive turns a habitat row has shown population > 0, used by
    /// the occupancy long-presence bonus.
    presence_turns: HashMap<(TileId, SpeciesId), u32>,
    /// Tiles where last turn's mortality pass found at least one species
    /// with a healthy (<0.15) death rate; fed to this turn's territory
    /// update as the refuge bonus gate, since territory runs before this
    /// turn's own mortality in the fixed stage order.
    last_healthy_tiles: HashSet<TileId>,
}

impl TurnPipeline {
    pub fn new(world: World, config: SimConfig) -> Self {
        Self { world, config, presence_turns: HashMap::new(), last_healthy_tiles: HashSet::new() }
    }

    /// Runs one full turn, advancing `world.turn_index` only on success.
    /// A fatal (`Invariant`) stage failure leaves the world at its prior
    /// committed state, matching the all-or-nothing contract of §9.
    pub fn run_turn(&mut self, env: EnvironmentDelta) -> Result<TurnReport> {
        let turn = self.world.turn_index;
        let span = tracing::info_span!("turn", turn);
        let _enter = span.enter();
        let mut report = TurnReport::new(turn);
        let mut rng = TurnRng::for_turn(self.world.world_seed, turn);
        let mut lineage_events: Vec<LineageEvent> = Vec::new();

        report.pressure_summary = summarize_pressures(&env);
        report.major_environmental_events = env.major_events.iter().map(|e| e.description.clone()).collect();

        push_outcome(&mut report, "environment", Ok(()));

        let suitability_matrix: suitability::SuitabilityMatrix =
            suitability::compute_suitability(&self.world.species, &self.world.tiles, &self.config.suitability);
        push_outcome(&mut report, "suitability", Ok(()));

        self.update_territory(&suitability_matrix);
        push_outcome(&mut report, "territory", Ok(()));

        let (survivors_by_cell, death_rate_by_cell, mortality_by_species) = self.run_mortality(&env);
        push_outcome(&mut report, "mortality", Ok(()));

        let births_by_species = self.run_reproduction(&survivors_by_cell, &death_rate_by_cell, &suitability_matrix);
        push_outcome(&mut report, "reproduction", Ok(()));

        self.run_adaptation(&env, turn, &mut rng.sub_stream("adaptation"), &mut lineage_events);
        push_outcome(&mut report, "adaptation", Ok(()));

        self.run_gene_flow(turn);
        push_outcome(&mut report, "gene_flow", Ok(()));

        self.run_speciation(turn, &mut rng.sub_stream("speciation"), &death_rate_by_cell, &env, &mut report, &mut lineage_events);
        push_outcome(&mut report, "speciation", Ok(()));

        self.run_hybridization(turn, &mut rng.sub_stream("hybridization"), &mut lineage_events);
        push_outcome(&mut report, "hybridization", Ok(()));

        self.run_milestones(turn, &mut lineage_events);
        push_outcome(&mut report, "milestones", Ok(()));

        report.species_snapshots = self.build_snapshots(&mortality_by_species, &births_by_species);
        report.ecological_realism_summary = self.build_ecological_realism_summary(&mortality_by_species);
        let validation = invariants::validate_world(&self.world, self.config.reproduction.population_cap_kg);
        let fatal = validation.is_err();
        push_outcome(&mut report, "report", validation);

        if fatal {
            return Err(EngineError::invariant("turn failed final invariant check, not committed"));
        }

        self.world.turn_index += 1;
        report.lineage_events = lineage_events;
        tracing::debug!(species = report.species_snapshots.len(), branches = report.branching_events.len(), "turn committed");
        Ok(report)
    }

    fn update_territory(&mut self, suitability_matrix: &suitability::SuitabilityMatrix) {
        let updates = competition::update_occupancy(
            &self.world.habitats,
            &self.world.species,
            suitability_matrix,
            &self.last_healthy_tiles,
            &self.presence_turns,
            &self.config.competition,
        );
        for u in updates {
            if let Some(row) = self.world.habitats.get_mut(&(u.tile_id, u.species_id)) {
                row.occupancy = u.new_occupancy;
                row.suitability = suitability_matrix.get(&(u.species_id, u.tile_id)).copied().unwrap_or(0.0);
                if row.population > 0.0 {
                    *self.presence_turns.entry((u.tile_id, u.species_id)).or_insert(0) += 1;
                } else {
                    self.presence_turns.remove(&(u.tile_id, u.species_id));
                }
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn run_mortality(
        &mut self,
        env: &EnvironmentDelta,
    ) -> (
        HashMap<(TileId, SpeciesId), f64>,
        HashMap<(TileId, SpeciesId), f32>,
        HashMap<SpeciesId, mortality::MortalityResult>,
    ) {
        let mut survivors_by_cell = HashMap::new();
        let mut death_rate_by_cell = HashMap::new();
        let mut by_tile: HashMap<TileId, Vec<SpeciesId>> = HashMap::new();
        for (tid, sid) in self.world.habitats.keys() {
            by_tile.entry(*tid).or_default().push(*sid);
        }

        let mut result_by_species: HashMap<SpeciesId, HashMap<TileId, mortality::TileMortality>> = HashMap::new();

        for (tile_id, occupants) in &by_tile {
            let Some(tile) = self.world.tiles.get(tile_id) else { continue };
            for &species_id in occupants {
                let Some(row) = self.world.habitats.get(&(*tile_id, species_id)) else { continue };
                let Some(species) = self.world.species.get(&species_id) else { continue };
                let layer = species.ecological_layer();

                let co_inhabitants: Vec<(SpeciesId, f32, f32)> = occupants
                    .iter()
                    .filter(|&&other| other != species_id)
                    .filter_map(|&other| {
                        let other_sp = self.world.species.get(&other)?;
                        if other_sp.ecological_layer() != layer {
                            return None;
                        }
                        let other_row = self.world.habitats.get(&(*tile_id, other))?;
                        let sim = competition::niche_similarity(species, other_sp, None, &self.config.competition);
                        Some((other, sim, other_row.occupancy))
                    })
                    .collect();

                let predators: Vec<(f64, f32)> = self
                    .world
                    .species
                    .values()
                    .filter(|p| p.prey_species.contains(&species.lineage_code))
                    .filter_map(|p| {
                        let pop = self.world.habitats.get(&(*tile_id, p.id))?.population;
                        let pref = p.prey_preferences.get(&species.lineage_code).copied().unwrap_or(1.0);
                        Some((pop, pref))
                    })
                    .collect();

                let ctx = mortality::MortalityContext { tile, pressures: &env.pressures, co_inhabitants, predators };
                let tm = mortality::compute_tile_mortality(species, row.population, &ctx, &self.config.mortality, &self.config.competition);
                survivors_by_cell.insert((*tile_id, species_id), tm.survivors);
                death_rate_by_cell.insert((*tile_id, species_id), tm.death_rate);
                result_by_species.entry(species_id).or_default().insert(*tile_id, tm);
            }
        }

        let mut mortality_by_species = HashMap::new();
        for (species_id, per_tile) in result_by_species {
            mortality_by_species.insert(species_id, mortality::aggregate_species_mortality(species_id, per_tile));
        }

        self.last_healthy_tiles = death_rate_by_cell
            .iter()
            .filter(|(_, &rate)| rate < 0.15)
            .map(|((tile_id, _), _)| *tile_id)
            .collect();

        (survivors_by_cell, death_rate_by_cell, mortality_by_species)
    }

    fn run_reproduction(
        &mut self,
        survivors_by_cell: &HashMap<(TileId, SpeciesId), f64>,
        death_rate_by_cell: &HashMap<(TileId, SpeciesId), f32>,
        suitability_matrix: &suitability::SuitabilityMatrix,
    ) -> HashMap<SpeciesId, f64> {
        let mut by_tile: HashMap<TileId, Vec<SpeciesId>> = HashMap::new();
        for (tid, sid) in self.world.habitats.keys() {
            by_tile.entry(*tid).or_default().push(*sid);
        }

        let mut grown_by_cell: HashMap<(TileId, SpeciesId), f64> = HashMap::new();

        for (tile_id, occupants) in &by_tile {
            let Some(tile) = self.world.tiles.get(tile_id).cloned() else { continue };
            let species_here: Vec<(&Species, f64)> = occupants
                .iter()
                .filter_map(|sid| {
                    let sp = self.world.species.get(sid)?;
                    let survivors = survivors_by_cell.get(&(*tile_id, *sid)).copied().unwrap_or(0.0);
                    Some((sp, survivors))
                })
                .collect();

            let suit_here: HashMap<SpeciesId, f32> = occupants
                .iter()
                .map(|sid| (*sid, suitability_matrix.get(&(*sid, *tile_id)).copied().unwrap_or(0.0)))
                .collect();

            let capacity = carrying_capacity::compute_tile_capacity(
                &tile,
                &species_here,
                &suit_here,
                0.0,
                0.0,
                &self.config.carrying_capacity,
            );

            for &species_id in occupants {
                let Some(species) = self.world.species.get(&species_id) else { continue };
                let survivors = survivors_by_cell.get(&(*tile_id, species_id)).copied().unwrap_or(0.0);
                let cap = capacity.get(&species_id).copied().unwrap_or(0.0);
                let reproduction_speed = species.abstract_traits.get("reproduction_speed");
                let prior_death_rate = death_rate_by_cell.get(&(*tile_id, species_id)).copied().unwrap_or(0.0);
                let next = reproduction::reproduce_tile(
                    survivors,
                    cap,
                    reproduction_speed,
                    species.generation_time_days(),
                    self.config.world.turn_years,
                    prior_death_rate,
                    &self.config.reproduction,
                );
                grown_by_cell.insert((*tile_id, species_id), next);
            }
        }

        let mut total_by_species: HashMap<SpeciesId, f64> = HashMap::new();
        for (&(_, species_id), &pop) in &grown_by_cell {
            *total_by_species.entry(species_id).or_insert(0.0) += pop;
        }

        // Redistribution rule (§4.3): reallocate each species' total grown
        // population across its tiles proportional to where it was already
        // established, rather than trusting each tile's independently
        // computed growth. A freshly speciated species has no prior
        // distribution to redistribute against, so it keeps the tiles
        // `run_speciation` just assigned it.
        let mut new_population: HashMap<(TileId, SpeciesId), f64> = HashMap::new();
        let mut births_by_species: HashMap<SpeciesId, f64> = HashMap::new();
        for (species_id, total) in total_by_species {
            let prior_distribution: HashMap<TileId, f64> = self
                .world
                .habitats
                .iter()
                .filter(|((_, sid), _)| *sid == species_id)
                .map(|((tid, _), row)| (*tid, row.population))
                .collect();
            let prior_total: f64 = prior_distribution.values().sum();
            let redistributed = reproduction::redistribute(species_id, total, &prior_distribution);

            if redistributed.is_empty() {
                for (&(tile_id, sid), &pop) in grown_by_cell.iter().filter(|((_, sid), _)| *sid == species_id) {
                    new_population.insert((tile_id, sid), pop);
                }
            } else {
                for (tile_id, pop) in redistributed {
                    new_population.insert((tile_id, species_id), pop);
                }
            }
            births_by_species.insert(species_id, (total - prior_total).max(0.0));
        }

        for ((tile_id, species_id), pop) in new_population {
            if let Some(row) = self.world.habitats.get_mut(&(tile_id, species_id)) {
                row.population = pop;
            }
        }

        for species in self.world.species.values_mut() {
            let total: f64 = self
                .world
                .habitats
                .iter()
                .filter(|((_, sid), _)| *sid == species.id)
                .map(|(_, r)| r.population)
                .sum();
            species.set_population_biomass_kg(total);
        }

        births_by_species
    }

    fn run_adaptation(&mut self, env: &EnvironmentDelta, turn: u64, rng: &mut impl Rng, lineage_events: &mut Vec<LineageEvent>) {
        let species_ids: Vec<SpeciesId> = self.world.species.keys().copied().collect();
        for sid in species_ids {
            let generations = reproduction::generations_per_turn(
                self.config.world.turn_years,
                self.world.species.get(&sid).map(|s| s.generation_time_days()).unwrap_or(365.0),
            );
            let Some(species) = self.world.species.get_mut(&sid) else { continue };
            if !species.is_alive() {
                continue;
            }
            let drift = adaptation::gradual_trait_drift(species, &env.pressures, generations, rng, &self.config.adaptation);
            let is_plant = species.is_plant();
            let mut organs_advanced = 0u32;
            for organ in species.organs.values_mut() {
                adaptation::drift_organ_parameters(organ, is_plant, rng, &self.config.adaptation);
                if adaptation::progress_organ_stage(organ, turn, 1.0, 1.0, rng, &self.config.adaptation) {
                    organs_advanced += 1;
                }
            }
            adaptation::accumulate_adaptation_score(species, &drift, organs_advanced);
            if adaptation::should_refresh_description(species, turn, &self.config.adaptation) {
                adaptation::mark_description_refreshed(species, turn);
                lineage_events.push(LineageEvent::new(
                    species.lineage_code.clone(),
                    LineageEventKind::Adaptation,
                    turn,
                    serde_json::json!({ "event": "description_refresh" }),
                ));
            }
            if turn > 0 && turn % self.config.adaptation.regression_check_turns as u64 == 0 {
                let low_light = env.light_level < self.config.adaptation.low_light_threshold;
                let sessile = species.is_plant();
                let parasitic = species.diet_type == evoria_data::DietType::Detritivore;
                let outcome = adaptation::apply_regression(species, turn, low_light, sessile, parasitic, rng);
                if !outcome.deactivated_organs.is_empty() || !outcome.reduced_traits.is_empty() {
                    lineage_events.push(LineageEvent::new(
                        species.lineage_code.clone(),
                        LineageEventKind::Regression,
                        turn,
                        serde_json::json!({
                            "deactivated_organs": outcome.deactivated_organs,
                            "reduced_traits": outcome.reduced_traits,
                        }),
                    ));
                }
            }
        }
    }

    fn run_gene_flow(&mut self, turn: u64) {
        let mut by_genus: HashMap<String, Vec<SpeciesId>> = HashMap::new();
        for sp in self.world.species.values().filter(|s| s.is_alive()) {
            by_genus.entry(sp.genus_code.clone()).or_default().push(sp.id);
        }

        for (genus_code, members) in by_genus {
            if members.len() < 2 {
                continue;
            }
            let genus = self.world.genera.entry(genus_code).or_insert_with(|| Genus::new("")).clone();
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    let (a_id, b_id) = (members[i], members[j]);
                    let (Some(a), Some(b)) = (self.world.species.get(&a_id), self.world.species.get(&b_id)) else { continue };
                    let tiles_a: HashSet<u32> = self.world.tiles_of(a_id).into_iter().collect();
                    let tiles_b: HashSet<u32> = self.world.tiles_of(b_id).into_iter().collect();
                    let overlap = gene_flow::habitat_overlap(&tiles_a, &tiles_b);
                    let distance = gene_flow::genetic_distance(a, b, &genus, turn, None, &self.config.gene_flow);
                    let Some(deltas) = gene_flow::compute_flow_deltas(a, b, distance, overlap, &self.config.gene_flow) else { continue };
                    for (name, new_a, new_b) in deltas {
                        if let Some(sp) = self.world.species.get_mut(&a_id) {
                            sp.abstract_traits.set_clamped(&name, new_a);
                        }
                        if let Some(sp) = self.world.species.get_mut(&b_id) {
                            sp.abstract_traits.set_clamped(&name, new_b);
                        }
                    }
                }
            }
        }
    }

    fn run_speciation(
        &mut self,
        turn: u64,
        rng: &mut impl Rng,
        death_rate_by_cell: &HashMap<(TileId, SpeciesId), f32>,
        env: &EnvironmentDelta,
        report: &mut TurnReport,
        lineage_events: &mut Vec<LineageEvent>,
    ) {
        let candidate_ids: Vec<SpeciesId> = self.world.alive_species_ids();
        let total_species_count = candidate_ids.len() as u32;
        let major_event_extreme_present =
            env.major_events.iter().any(|e| e.severity == evoria_data::MajorEventSeverity::Extreme);

        for sid in candidate_ids {
            // Snapshot the fields speciation needs up front: the rest of
            // this iteration mutates `self.world.species`, so a live
            // borrow of the parent can't survive alongside it.
            let Some(parent) = self.world.species.get(&sid).cloned() else { continue };
            let tiles = self.world.tiles_of(sid);
            if tiles.is_empty() {
                continue;
            }
            let population = parent.population_biomass_kg();
            let components = speciation::connected_components(&self.world, &tiles);
            let geographic_isolation_detected = components.len() > 1;
            let accumulated_pressure = parent.accumulated_speciation_pressure();

            let per_component_mean_death_rate: Vec<f32> = components
                .iter()
                .map(|group| {
                    let rates: Vec<f32> =
                        group.iter().filter_map(|t| death_rate_by_cell.get(&(*t, sid)).copied()).collect();
                    if rates.is_empty() { 0.0 } else { rates.iter().sum::<f32>() / rates.len() as f32 }
                })
                .collect();
            let mean_death_rate = if per_component_mean_death_rate.is_empty() {
                0.0
            } else {
                per_component_mean_death_rate.iter().sum::<f32>() / per_component_mean_death_rate.len() as f32
            };

            let niche_overlap_with_congener = self
                .world
                .species_in_genus(&parent.genus_code)
                .into_iter()
                .filter(|&other| other != sid)
                .filter_map(|other| self.world.species.get(&other))
                .map(|other| competition::niche_similarity(&parent, other, None, &self.config.competition))
                .fold(None, |acc: Option<f32>, sim| Some(acc.map_or(sim, |a| a.max(sim))));

            let thriving_no_pressure = mean_death_rate < self.config.mortality.death_rate_floor && accumulated_pressure <= 0.0;

            let speciation_type = speciation::classify_speciation_type(
                &components,
                &per_component_mean_death_rate,
                major_event_extreme_present,
                niche_overlap_with_congener,
                thriving_no_pressure,
                &self.config.speciation,
            );

            if !speciation::is_candidate(
                &parent,
                population,
                accumulated_pressure * 10.0,
                accumulated_pressure,
                geographic_isolation_detected,
                0.1,
                turn,
                &self.config.speciation,
            ) {
                continue;
            }

            let sibling_count = self
                .world
                .species
                .values()
                .filter(|s| s.parent_code.as_deref() == Some(parent.lineage_code.as_str()))
                .count() as u32;

            if !speciation::passes_probability_check(
                &parent,
                geographic_isolation_detected,
                major_event_extreme_present,
                total_species_count,
                rng,
                &self.config.speciation,
            ) {
                if let Some(updated) = self.world.species.get_mut(&sid) {
                    updated.set_accumulated_speciation_pressure(accumulated_pressure + self.config.speciation.accumulated_pressure_step);
                }
                continue;
            }

            let evolution_potential = parent.hidden_traits.evolution_potential;
            let count = speciation::offspring_count(population, evolution_potential, total_species_count, sibling_count, rng, &self.config.speciation);
            let allocated = speciation::allocate_tiles(components, count, rng);

            let mut child_codes = Vec::new();
            for (i, tile_group) in allocated.iter().enumerate() {
                let suffix = (b'A' + i as u8) as char;
                let lineage_code = format!("{}{}", parent.lineage_code, suffix);
                let axis = speciation::differentiation_axis_for(suffix);
                let child = speciation::construct_child(&parent, lineage_code.clone(), tile_group, axis, speciation_type, turn, rng);
                let child_id = child.id;
                let share = population / allocated.len().max(1) as f64;

                self.world.species.insert(child_id, child);
                for &tile_id in tile_group {
                    let mut row = HabitatPopulation::new(tile_id, child_id, turn);
                    row.population = share / tile_group.len().max(1) as f64;
                    self.world.habitats.insert((tile_id, child_id), row);
                }
                child_codes.push(lineage_code);
            }

            if let Some(updated) = self.world.species.get_mut(&sid) {
                updated.set_last_speciation_turn(turn);
                updated.set_accumulated_speciation_pressure(0.0);
            }

            report.branching_events.push(BranchingEvent {
                parent_lineage_code: parent.lineage_code.clone(),
                child_lineage_codes: child_codes.clone(),
                speciation_type,
                turn,
            });
            lineage_events.push(LineageEvent::new(
                parent.lineage_code.clone(),
                LineageEventKind::Speciation,
                turn,
                serde_json::json!({ "children": child_codes, "speciation_type": speciation_type.as_str() }),
            ));
        }
    }

    fn run_hybridization(&mut self, turn: u64, rng: &mut impl Rng, lineage_events: &mut Vec<LineageEvent>) {
        let ids: Vec<SpeciesId> = self.world.alive_species_ids();
        let mut candidates = Vec::new();

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (a_id, b_id) = (ids[i], ids[j]);
                let (Some(a), Some(b)) = (self.world.species.get(&a_id), self.world.species.get(&b_id)) else { continue };
                if a.genus_code != b.genus_code || a.lineage_code == b.lineage_code {
                    continue;
                }
                let tiles_a: HashSet<u32> = self.world.tiles_of(a_id).into_iter().collect();
                let tiles_b: HashSet<u32> = self.world.tiles_of(b_id).into_iter().collect();
                let sympatric = tiles_a.intersection(&tiles_b).count();
                if !hybridization::is_candidate_pair(0.2, sympatric, a.population_biomass_kg(), b.population_biomass_kg(), &self.config.hybridization) {
                    continue;
                }
                let genus = self.world.genera.entry(a.genus_code.clone()).or_insert_with(|| Genus::new(a.genus_code.clone())).clone();
                let distance = gene_flow::genetic_distance(a, b, &genus, turn, None, &self.config.gene_flow);
                let fertility = hybridization::fertility(distance, &self.config.hybridization);
                let sympatry_ratio = sympatric as f32 / tiles_a.union(&tiles_b).count().max(1) as f32;
                let score = hybridization::hybrid_score(sympatry_ratio, fertility, distance);
                candidates.push(hybridization::HybridCandidate { a: a_id, b: b_id, distance, sympatry_ratio, fertility, score });
            }
        }

        for candidate in hybridization::rank_candidates(candidates, &self.config.hybridization) {
            let (Some(a), Some(b)) = (self.world.species.get(&candidate.a), self.world.species.get(&candidate.b)) else { continue };
            let lineage_code = format!("{}x{}", a.lineage_code, b.lineage_code);
            let hybrid = hybridization::construct_hybrid(a, b, lineage_code.clone(), candidate.fertility, turn, rng);
            let hybrid_id = hybrid.id;
            self.world.species.insert(hybrid_id, hybrid);
            lineage_events.push(LineageEvent::new(lineage_code, LineageEventKind::Hybridization, turn, serde_json::json!({})));
        }
    }

    fn run_milestones(&mut self, turn: u64, lineage_events: &mut Vec<LineageEvent>) {
        let plant_ids: Vec<SpeciesId> = self
            .world
            .species
            .values()
            .filter(|s| s.is_alive() && plant::is_plant(s))
            .map(|s| s.id)
            .collect();

        for sid in plant_ids {
            let Some(species) = self.world.species.get(&sid) else { continue };
            let Some(milestone) = plant::eligible_milestone(species) else { continue };
            let milestone_id = milestone.id;
            let lineage_code = species.lineage_code.clone();
            if let Some(sp) = self.world.species.get_mut(&sid) {
                let m = crate::tables::milestone_by_id(milestone_id).unwrap();
                plant::apply_milestone(sp, m, turn);
            }
            lineage_events.push(LineageEvent::new(lineage_code, LineageEventKind::Milestone, turn, serde_json::json!({ "milestone": milestone_id })));
        }
    }

    fn build_snapshots(
        &self,
        mortality_by_species: &HashMap<SpeciesId, mortality::MortalityResult>,
        births_by_species: &HashMap<SpeciesId, f64>,
    ) -> Vec<SpeciesSnapshot> {
        self.world
            .species
            .values()
            .filter(|s| s.is_alive())
            .map(|s| {
                let mortality_result = mortality_by_species.get(&s.id);

                let deaths_kg = mortality_result.map(|m| m.per_tile.values().map(|t| t.deaths).sum()).unwrap_or(0.0);

                let death_rate = mortality_result
                    .map(|m| {
                        let (weighted, weight) = m
                            .per_tile
                            .values()
                            .fold((0.0f64, 0.0f64), |(w, total), t| {
                                let mass = t.deaths + t.survivors;
                                (w + t.death_rate as f64 * mass, total + mass)
                            });
                        if weight > 0.0 { (weighted / weight) as f32 } else { 0.0 }
                    })
                    .unwrap_or(0.0);

                let mut death_tile_distribution: HashMap<TileHealthBucketKey, u32> = HashMap::new();
                if let Some(m) = mortality_result {
                    death_tile_distribution.insert(TileHealthBucketKey::Healthy, m.healthy_tiles);
                    death_tile_distribution.insert(TileHealthBucketKey::Warning, m.warning_tiles);
                    death_tile_distribution.insert(TileHealthBucketKey::Critical, m.critical_tiles);
                }

                SpeciesSnapshot {
                    species_id: s.id,
                    lineage_code: s.lineage_code.clone(),
                    population_kg: s.population_biomass_kg(),
                    deaths_kg,
                    births_kg: births_by_species.get(&s.id).copied().unwrap_or(0.0),
                    death_rate,
                    death_tile_distribution,
                    refuge_available: mortality_result.map(|m| m.refuge_available).unwrap_or(false),
                }
            })
            .collect()
    }

    /// Trophic-layer census plus a small set of ecological-plausibility
    /// flags (spec §8's predator-prey/mortality sanity checks, surfaced
    /// per-turn rather than only as hard invariant failures).
    fn build_ecological_realism_summary(
        &self,
        mortality_by_species: &HashMap<SpeciesId, mortality::MortalityResult>,
    ) -> EcologicalRealismSummary {
        let mut trophic_level_counts: HashMap<String, u32> = HashMap::new();
        let mut flags = Vec::new();

        for species in self.world.species.values().filter(|s| s.is_alive()) {
            let layer = competition::ecological_layer(species.trophic_level);
            *trophic_level_counts.entry(layer.to_string()).or_insert(0) += 1;

            if species.diet_type != evoria_data::DietType::Autotroph && species.prey_species.is_empty() {
                flags.push(EcologicalRealismFlag {
                    species_id: species.id,
                    description: format!("{} is a consumer with no declared prey", species.lineage_code),
                });
            }

            if let Some(result) = mortality_by_species.get(&species.id) {
                if result.worst_tile_rate >= self.config.mortality.death_rate_ceiling {
                    flags.push(EcologicalRealismFlag {
                        species_id: species.id,
                        description: format!(
                            "{} faces near-total mortality ({:.2}) on at least one tile",
                            species.lineage_code, result.worst_tile_rate
                        ),
                    });
                }
            }
        }

        EcologicalRealismSummary { flags, trophic_level_counts }
    }
}

fn summarize_pressures(env: &EnvironmentDelta) -> PressureSummary {
    let mut by_kind: HashMap<String, u32> = HashMap::new();
    for p in &env.pressures {
        *by_kind.entry(format!("{:?}", p.kind)).or_insert(0) += 1;
    }
    PressureSummary {
        total_pressure_events: env.pressures.len() as u32,
        by_kind,
        major_events: env.major_events.iter().map(|e| e.name.clone()).collect(),
    }
}

/// Records a stage's result into the turn report: fatal (non-recoverable)
/// errors and recoverable ones both get a `StageOutcomeRecord`, the
/// distinction only matters for whether `run_turn` aborts the commit.
fn push_outcome(report: &mut TurnReport, name: &str, result: Result<()>) {
    let (outcome, reason) = match result {
        Ok(()) => ("ok".to_string(), None),
        Err(e) if e.is_recoverable() => {
            tracing::warn!(stage = name, error = %e, "stage skipped");
            ("skipped".to_string(), Some(e.to_string()))
        }
        Err(e) => {
            tracing::warn!(stage = name, error = %e, "stage failed");
            ("failed".to_string(), Some(e.to_string()))
        }
    };
    report.stage_outcomes.push(StageOutcomeRecord { stage: name.to_string(), outcome, reason });
}

#[cfg(test)]
mod tests {
    use super::*;
    use evoria_data::{DietType, HabitatType};

    fn producer_world() -> World {
        let mut world = World::new(2, 1, 7);
        for id in 0..2u32 {
            world.tiles.insert(
                id,
                Tile {
                    id,
                    x: id as u16,
                    y: 0,
                    temperature: 15.0,
                    humidity: 0.5,
                    resources: 1.0,
                    elevation: 10.0,
                    biome: "plains".to_string(),
                    cover: 0.0,
                    is_lake: false,
                    is_ocean: false,
                },
            );
        }
        let mut producer = crate::test_support::basic_species(DietType::Autotroph, 1.0);
        producer.habitat_type = HabitatType::Terrestrial;
        producer.lineage_code = "P1".to_string();
        let sid = producer.id;
        world.species.insert(sid, producer);
        let mut row = HabitatPopulation::new(0, sid, 0);
        row.population = 1000.0;
        world.habitats.insert((0, sid), row);
        world
    }

    #[test]
    fn single_producer_grows_toward_capacity() {
        let world = producer_world();
        let mut pipeline = TurnPipeline::new(world, SimConfig::default());
        for _ in 0..5 {
            let report = pipeline.run_turn(EnvironmentDelta::default()).expect("turn runs");
            assert!(report.stage_outcomes.iter().all(|s| s.outcome != "failed"));
        }
        let sid = *pipeline.world.species.keys().next().unwrap();
        assert!(pipeline.world.species[&sid].population_biomass_kg() > 0.0);
    }

    #[test]
    fn turn_index_advances_on_success() {
        let world = producer_world();
        let mut pipeline = TurnPipeline::new(world, SimConfig::default());
        pipeline.run_turn(EnvironmentDelta::default()).unwrap();
        assert_eq!(pipeline.world.turn_index, 1);
    }
}
