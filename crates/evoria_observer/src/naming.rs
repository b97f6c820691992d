//! Deterministic, synchronous name assignment. Runs inside the turn
//! pipeline itself (never the async content service) so the name-
//! uniqueness invariant (spec §8) holds even with no AI configured: a
//! species always gets a name the instant it is constructed, and the
//! content service may only enrich it afterwards, never originate it.

/// Latin-style binomial built from the genus and lineage code — trivially
/// unique because `lineage_code` already is.
pub fn latin_binomial(genus_code: &str, lineage_code: &str) -> String {
    let genus = title_case(genus_code);
    let species_epithet = lineage_code.to_lowercase();
    format!("{genus} {species_epithet}")
}

/// A short descriptive common name built from diet/habitat, matching the
/// match-on-category style of a rule-based narrator: not meant to be
/// pretty, meant to be cheap and always available.
pub fn common_name(diet: evoria_data::DietType, habitat: evoria_data::HabitatType, lineage_code: &str) -> String {
    let diet_word = match diet {
        evoria_data::DietType::Autotroph => "Producer",
        evoria_data::DietType::Herbivore => "Grazer",
        evoria_data::DietType::Carnivore => "Hunter",
        evoria_data::DietType::Omnivore => "Forager",
        evoria_data::DietType::Detritivore => "Scavenger",
    };
    let habitat_word = match habitat {
        evoria_data::HabitatType::Marine => "Sea",
        evoria_data::HabitatType::DeepSea => "Abyssal",
        evoria_data::HabitatType::Coastal => "Shore",
        evoria_data::HabitatType::Freshwater => "River",
        evoria_data::HabitatType::Amphibious => "Wetland",
        evoria_data::HabitatType::Terrestrial => "Plains",
        evoria_data::HabitatType::Aerial => "Sky",
    };
    format!("{habitat_word} {diet_word} {lineage_code}")
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
