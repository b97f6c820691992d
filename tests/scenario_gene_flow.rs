//! Gene flow convergence between two close, overlapping relatives: repeated
//! application of flow deltas should shrink a trait gap monotonically and
//! never cross past equality.

mod common;

use evoria_core::gene_flow::compute_flow_deltas;
use evoria_data::DietType;

#[test]
fn heat_tolerance_gap_converges_without_overshooting() {
    let cfg = evoria_core::SimConfig::default().gene_flow;

    let mut a = common::bare_species("A1", DietType::Herbivore, 2.0);
    let mut b = common::bare_species("A2", DietType::Herbivore, 2.0);
    a.abstract_traits.set_clamped("heat_tolerance", 9.0);
    b.abstract_traits.set_clamped("heat_tolerance", 5.0);
    a.set_population_biomass_kg(1_000.0);
    b.set_population_biomass_kg(1_000.0);

    let mut diff = 4.0f32;
    for _ in 0..10 {
        let deltas = compute_flow_deltas(&a, &b, 0.20, 0.80, &cfg).expect("close, overlapping relatives should flow");
        for (name, new_a, new_b) in deltas {
            a.abstract_traits.set_clamped(&name, new_a);
            b.abstract_traits.set_clamped(&name, new_b);
        }
        let new_diff = (a.abstract_traits.get("heat_tolerance") - b.abstract_traits.get("heat_tolerance")).abs();
        assert!(new_diff <= diff + 1e-6, "gap should shrink or hold, not widen");
        diff = new_diff;
    }

    assert!(diff < 1.5, "ten rounds of flow should narrow the gap well below its starting value of 4.0");
    assert!(
        a.abstract_traits.get("heat_tolerance") >= b.abstract_traits.get("heat_tolerance"),
        "equal-population convergence should not cross past equality"
    );
}
