use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Groups species by `genus_code`. Stores the pooled `gene_library`
/// (traits/organs discovered by any member) and pairwise genetic
/// distances, keyed by `sort(codeA, codeB)` per spec §3.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Genus {
    pub genus_code: String,
    pub gene_library_traits: HashMap<String, f32>,
    pub gene_library_organs: HashMap<String, f32>,
    pub genetic_distances: HashMap<String, f32>,
    /// `lineage_code -> turn` the member's lineage split from the genus'
    /// common ancestor, needed by the time-divergence term in §4.6.
    pub common_ancestor_turn: HashMap<String, u64>,
}

impl Genus {
    pub fn new(genus_code: impl Into<String>) -> Self {
        Self {
            genus_code: genus_code.into(),
            ..Default::default()
        }
    }

    pub fn distance_key(code_a: &str, code_b: &str) -> String {
        if code_a <= code_b {
            format!("{code_a}|{code_b}")
        } else {
            format!("{code_b}|{code_a}")
        }
    }

    pub fn get_distance(&self, code_a: &str, code_b: &str) -> Option<f32> {
        self.genetic_distances.get(&Self::distance_key(code_a, code_b)).copied()
    }

    pub fn set_distance(&mut self, code_a: &str, code_b: &str, distance: f32) {
        self.genetic_distances
            .insert(Self::distance_key(code_a, code_b), distance.clamp(0.0, 1.0));
    }
}
