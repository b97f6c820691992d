//! Wires `evoria_core`'s turn pipeline to `evoria_io`'s in-memory store and
//! `evoria_observer`'s content/embedding services, and provides the
//! `SimBuilder` used to seed a fresh world for the CLI and the integration
//! test suite. See `DESIGN.md` for how each piece traces back to its
//! grounding source.

pub mod report_writer;
pub mod seed;

pub use evoria_core::{EngineError, SimConfig, TurnPipeline, World};
pub use evoria_io::InMemoryStore;
pub use seed::SimBuilder;

use evoria_data::{EnvironmentDelta, TurnReport};

/// Drives `pipeline` for `turns` steps with a calm (no major events, no
/// environmental drift) environment, returning one report per turn.
///
/// A caller wanting storms, sea-level change or other pressures builds
/// its own `EnvironmentDelta` per turn and calls `pipeline.run_turn`
/// directly; this is the steady-state default the CLI uses.
pub fn run_turns(pipeline: &mut TurnPipeline, turns: u64) -> evoria_core::Result<Vec<TurnReport>> {
    let mut reports = Vec::with_capacity(turns as usize);
    for _ in 0..turns {
        let report = pipeline.run_turn(calm_environment())?;
        reports.push(report);
    }
    Ok(reports)
}

/// A flat environment with no drift and no major events — the default
/// background the CLI and most tests run against.
pub fn calm_environment() -> EnvironmentDelta {
    EnvironmentDelta {
        temp_change: 0.0,
        sea_level_change: 0.0,
        light_level: 1.0,
        pressures: Vec::new(),
        major_events: Vec::new(),
    }
}
