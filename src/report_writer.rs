//! Writes one human-readable text report per turn to a reports directory,
//! mirroring the teacher's habit of pairing a machine state with a plain
//! log a person can tail.

use evoria_data::TurnReport;
use std::io::Write;
use std::path::Path;

/// Renders a `TurnReport` as plain text and writes it to
/// `dir/turn_<n>.txt`, creating `dir` if it doesn't exist.
pub fn write_report(dir: &Path, report: &TurnReport) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("turn_{:05}.txt", report.turn));
    let mut file = std::fs::File::create(path)?;

    writeln!(file, "turn {}", report.turn)?;
    writeln!(file, "species alive: {}", report.species_snapshots.len())?;
    for snapshot in &report.species_snapshots {
        writeln!(
            file,
            "  {} ({}): population={:.1}kg death_rate={:.3}",
            snapshot.lineage_code, snapshot.species_id, snapshot.population_kg, snapshot.death_rate
        )?;
    }
    if !report.branching_events.is_empty() {
        writeln!(file, "branching events:")?;
        for event in &report.branching_events {
            writeln!(file, "  {event:?}")?;
        }
    }
    if !report.major_environmental_events.is_empty() {
        writeln!(file, "major environmental events:")?;
        for description in &report.major_environmental_events {
            writeln!(file, "  {description}")?;
        }
    }
    writeln!(file, "stage outcomes:")?;
    for outcome in &report.stage_outcomes {
        match &outcome.reason {
            Some(reason) => writeln!(file, "  {}: {} ({reason})", outcome.stage, outcome.outcome)?,
            None => writeln!(file, "  {}: {}", outcome.stage, outcome.outcome)?,
        }
    }
    Ok(())
}
