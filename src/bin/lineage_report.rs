use anyhow::{Context, Result};
use clap::Parser;
use evoria_data::LineageEventKind;
use evoria_io::{EventLog, InMemoryStore, SpeciesRepository};
use std::collections::HashMap;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Store snapshot written by `evoria simulate` (`<reports-dir>/store.json`).
    #[arg(short, long, default_value = "reports/store.json")]
    input: String,

    #[arg(short, long, default_value = "lineage_report.md")]
    output: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input).with_context(|| format!("reading {}", args.input))?;
    let store = InMemoryStore::from_json(&text).context("parsing store snapshot")?;

    let species = store.list_species().context("listing species")?;
    let alive = species.iter().filter(|s| s.is_alive()).count();
    let extinct = species.len() - alive;

    let events = store.all_events().context("listing lineage events")?;
    let mut by_kind: HashMap<&str, u32> = HashMap::new();
    for event in &events {
        let key = match event.event_type {
            LineageEventKind::Speciation => "speciation",
            LineageEventKind::Milestone => "milestone",
            LineageEventKind::Extinction => "extinction",
            LineageEventKind::Adaptation => "adaptation",
            LineageEventKind::Regression => "regression",
            LineageEventKind::Hybridization => "hybridization",
            LineageEventKind::GeneFlow => "gene_flow",
        };
        *by_kind.entry(key).or_insert(0) += 1;
    }

    let mut event_lines = by_kind.into_iter().collect::<Vec<_>>();
    event_lines.sort_by_key(|(kind, _)| *kind);
    let event_summary = event_lines
        .iter()
        .map(|(kind, count)| format!("- **{kind}**: {count}\n"))
        .collect::<String>();

    let report = format!(
        "# Lineage Report\n\n\
        ## Summary\n\
        - **Alive species**: {alive}\n\
        - **Extinct species**: {extinct}\n\
        - **Total lineage events**: {}\n\n\
        ## Events by kind\n\
        {event_summary}",
        events.len(),
    );

    std::fs::write(&args.output, report).with_context(|| format!("writing {}", args.output))?;
    println!("Report generated: {}", args.output);
    Ok(())
}
