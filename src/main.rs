use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evoria_io::{EventLog, InMemoryStore, SpeciesRepository};
use std::path::PathBuf;

use evoria_lib::{calm_environment, report_writer, SimBuilder};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs the evolution simulation for a fixed number of turns, writing
    /// one textual report per turn to a reports directory.
    Simulate {
        /// Number of turns to run.
        #[arg(long, default_value_t = 10)]
        turns: u64,

        /// Grid width, in tiles.
        #[arg(long, default_value_t = 16)]
        width: u32,

        /// Grid height, in tiles.
        #[arg(long, default_value_t = 16)]
        height: u32,

        /// World seed; identical seeds reproduce identical runs.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Directory to write per-turn text reports into.
        #[arg(long, default_value = "reports")]
        reports_dir: PathBuf,

        /// Optional `config.toml` overriding the default parameters.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match args.command {
        Command::Simulate { turns, width, height, seed, reports_dir, config } => {
            let sim_config = match config {
                Some(path) => evoria_core::SimConfig::load(&path).with_context(|| format!("loading {}", path.display()))?,
                None => evoria_core::SimConfig::default(),
            };

            let mut pipeline = SimBuilder::new(width, height, seed).with_config(sim_config).build();
            let mut store = InMemoryStore::new();

            for _ in 0..turns {
                let report = pipeline.run_turn(calm_environment()).context("running turn")?;
                for event in &report.lineage_events {
                    store.log_event(event.clone()).context("logging lineage event")?;
                }
                for species in pipeline.world.species.values() {
                    store.upsert(species.clone()).context("persisting species")?;
                }
                report_writer::write_report(&reports_dir, &report).context("writing turn report")?;
                tracing::info!(turn = report.turn, species = report.species_snapshots.len(), "turn committed");
            }

            std::fs::create_dir_all(&reports_dir).context("creating reports directory")?;
            let snapshot_path = reports_dir.join("store.json");
            std::fs::write(&snapshot_path, store.to_json().context("serializing store")?).context("writing store snapshot")?;

            println!("Simulation complete: {turns} turns, reports and store snapshot written to {}", reports_dir.display());
            Ok(())
        }
    }
}
