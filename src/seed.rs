//! Builds a fresh `World` for the CLI and for integration tests, mirroring
//! the teacher's `tests/common::WorldBuilder` fixture pattern but seeding a
//! grid of `Tile`s and a small trophic chain of founder species instead of
//! ECS entities.

use evoria_core::{SimConfig, TurnPipeline, World};
use evoria_data::{
    AbstractTraits, DietType, HabitatPopulation, HabitatType, HiddenTraits, Organ, OrganCategory, Species,
    SpeciesStatus, TaxonomicRank, Tile,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Constructs a `TurnPipeline` ready to run: a `width x height` grid of
/// tiles with seed-derived terrain variety, populated with a three-level
/// trophic chain (producer, herbivore, carnivore) spread uniformly across
/// the grid, per the predator-prey stability scenario (spec §8).
pub struct SimBuilder {
    width: u32,
    height: u32,
    seed: u64,
    config: SimConfig,
}

impl SimBuilder {
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        let mut config = SimConfig::default();
        config.world.width = width;
        config.world.height = height;
        config.world.seed = seed;
        Self { width, height, seed, config }
    }

    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TurnPipeline {
        let mut world = World::new(self.width, self.height, self.seed);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        seed_tiles(&mut world, &mut rng);

        let producer = founder_species(
            "P1",
            DietType::Autotroph,
            1.0,
            HabitatType::Terrestrial,
            OrganCategory::Photosynthetic,
            "chloroplast",
        );
        let herbivore = founder_species(
            "H1",
            DietType::Herbivore,
            2.0,
            HabitatType::Terrestrial,
            OrganCategory::Digestive,
            "gut",
        );
        let carnivore = founder_species(
            "C1",
            DietType::Carnivore,
            3.0,
            HabitatType::Terrestrial,
            OrganCategory::Digestive,
            "gut",
        );

        let producer_id = producer.id;
        let herbivore_id = herbivore.id;
        let carnivore_id = carnivore.id;

        let mut herbivore = herbivore;
        herbivore.prey_species.push(producer.lineage_code.clone());
        herbivore.prey_preferences.insert(producer.lineage_code.clone(), 1.0);

        let mut carnivore = carnivore;
        carnivore.prey_species.push(herbivore.lineage_code.clone());
        carnivore.prey_preferences.insert(herbivore.lineage_code.clone(), 1.0);

        world.species.insert(producer_id, producer);
        world.species.insert(herbivore_id, herbivore);
        world.species.insert(carnivore_id, carnivore);

        place_uniformly(&mut world, producer_id, 1.0e8);
        place_uniformly(&mut world, herbivore_id, 1.0e6);
        place_uniformly(&mut world, carnivore_id, 1.0e4);

        TurnPipeline::new(world, self.config)
    }
}

fn seed_tiles(world: &mut World, rng: &mut ChaCha8Rng) {
    for y in 0..world.height {
        for x in 0..world.width {
            let id = y * world.width + x;
            let temperature = rng.gen_range(5.0..=28.0);
            let humidity = rng.gen_range(0.2..=0.9);
            let resources = rng.gen_range(0.4..=1.0);
            world.tiles.insert(
                id,
                Tile {
                    id,
                    x: x as u16,
                    y: y as u16,
                    temperature,
                    humidity,
                    resources,
                    elevation: 0.0,
                    biome: "plains".to_string(),
                    cover: 0.1,
                    is_lake: false,
                    is_ocean: false,
                },
            );
        }
    }
}

fn founder_species(
    lineage_code: &str,
    diet: DietType,
    trophic_level: f32,
    habitat: HabitatType,
    organ_category: OrganCategory,
    organ_type: &str,
) -> Species {
    let abstract_traits = if diet == DietType::Autotroph {
        AbstractTraits::default_plant()
    } else {
        AbstractTraits::default_animal()
    };

    let mut organs = HashMap::new();
    let mut organ = Organ::new_primordium(organ_category, organ_type, 0);
    organ.is_active = true;
    organ.evolution_stage = 2;
    organs.insert(organ_category.key_name().to_string(), organ);

    let mut morphology_stats = HashMap::new();
    morphology_stats.insert("body_length_cm".to_string(), 1.0 / trophic_level as f64);
    morphology_stats.insert("body_weight_g".to_string(), 10.0 * trophic_level as f64);
    morphology_stats.insert("generation_time_days".to_string(), 30.0 * trophic_level as f64);

    Species {
        id: uuid::Uuid::new_v4(),
        lineage_code: lineage_code.to_string(),
        parent_code: None,
        genus_code: format!("Genus{lineage_code}"),
        taxonomic_rank: TaxonomicRank::Species,
        status: SpeciesStatus::Alive,
        created_turn: 0,
        is_background: false,
        trophic_level,
        diet_type: diet,
        habitat_type: habitat,
        morphology_stats,
        abstract_traits,
        hidden_traits: HiddenTraits::default(),
        organs,
        capabilities: Default::default(),
        dormant_genes: Default::default(),
        prey_species: Vec::new(),
        prey_preferences: HashMap::new(),
        life_form_stage: if diet == DietType::Autotroph { 2 } else { 0 },
        growth_form: if diet == DietType::Autotroph { Some(evoria_data::GrowthForm::Aquatic) } else { None },
        achieved_milestones: Vec::new(),
        accumulated_adaptation_score: 0.0,
        last_description_update_turn: 0,
        hybrid_parent_codes: Vec::new(),
        hybrid_fertility: None,
        latin_name: evoria_observer::naming::latin_binomial(&format!("Genus{lineage_code}"), lineage_code),
        common_name: evoria_observer::naming::common_name(diet, habitat, lineage_code),
        description: String::new(),
    }
}

fn place_uniformly(world: &mut World, species_id: evoria_data::SpeciesId, total_population_kg: f64) {
    let tile_ids: Vec<_> = world.tiles.keys().copied().collect();
    if tile_ids.is_empty() {
        return;
    }
    let per_tile = total_population_kg / tile_ids.len() as f64;
    for tile_id in tile_ids {
        let mut row = HabitatPopulation::new(tile_id, species_id, 0);
        row.population = per_tile;
        row.suitability = 0.8;
        row.occupancy = 0.5;
        world.habitats.insert((tile_id, species_id), row);
    }
}
