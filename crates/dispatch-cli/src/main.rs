//! Dispatch - Delivery Assignment CLI
//!
//! The `dispatch` command drives the delivery assignment engine from the
//! terminal, covering both consumer roles:
//!
//! ## Dispatcher commands
//!
//! - `generate`: Create a demo batch of deliveries
//! - `list`: Show the full current delivery set
//! - `prioritize`: Score priorities via the priority oracle
//! - `reoptimize`: Re-route via the route oracle, optionally with a
//!   disruption event
//! - `routes`: Per-agent route groupings with path lengths
//!
//! ## Agent commands
//!
//! - `agent <NAME>`: Show one agent's deliveries, optionally
//!   auto-assigning one when the agent has none

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use dispatch_core::{geo, AssignmentEngine, EngineConfig, EngineOutcome, SanitizeConfig, Sanitizer};
use dispatch_oracle::{DisruptionEvent, GeminiOracle, StubOracle};
use dispatch_store::{Delivery, JsonFileStore};

/// Demo batch matching the original dispatcher dashboard.
const DEMO_ITEMS: [&str; 5] = [
    "Insulin Vial for Apollo Pharmacy",
    "Laptop for TechPark Office",
    "Groceries for South City Mall",
    "Poster Banners for College Fest",
    "Blood Pressure Monitor for Clinic",
];

const DEMO_LOCATIONS: [&str; 5] = ["Salt Lake", "New Town", "Park Street", "Howrah", "Dumdum"];

#[derive(Parser)]
#[command(name = "dispatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Delivery assignment and re-optimization engine", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Use the deterministic offline oracle instead of Gemini
    #[arg(long, global = true)]
    offline: bool,

    /// Path to the delivery set file
    #[arg(long, global = true, default_value = "deliveries.json")]
    data_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a batch of deliveries and save it as the new set
    Generate {
        /// Item descriptions (defaults to the demo batch)
        #[arg(long = "item")]
        items: Vec<String>,

        /// Location choices picked at random (defaults to the demo
        /// localities)
        #[arg(long = "location")]
        locations: Vec<String>,

        /// Agent roster assignments are drawn from (defaults to the
        /// configured roster)
        #[arg(long = "agent")]
        agents: Vec<String>,
    },

    /// Show the full current delivery set
    List,

    /// Score delivery priorities via the priority oracle
    Prioritize,

    /// Reassign/reroute deliveries via the route oracle
    Reoptimize {
        /// Free-text disruption event (e.g. "Rally in Park Street")
        #[arg(long)]
        event: Option<String>,
    },

    /// Show one agent's deliveries
    Agent {
        /// Agent name (matched case-insensitively)
        name: String,

        /// Auto-assign one delivery when the agent has none.
        /// Mutates the shared set for all viewers.
        #[arg(long)]
        auto_assign: bool,
    },

    /// Show per-agent route groupings
    Routes,
}

fn build_engine(cli: &Cli) -> Result<AssignmentEngine> {
    let store = Arc::new(JsonFileStore::new(&cli.data_file));
    let sanitizer = Sanitizer::new(SanitizeConfig::default());
    let config = EngineConfig::from_env();

    if cli.offline {
        let stub = Arc::new(StubOracle::new(SanitizeConfig::default().roster));
        Ok(AssignmentEngine::new(store, stub.clone(), stub, sanitizer).with_config(config))
    } else {
        let oracle = Arc::new(
            GeminiOracle::from_env()
                .context("Gemini oracle not configured; set GEMINI_API_KEY or pass --offline")?,
        );
        Ok(AssignmentEngine::new(store, oracle.clone(), oracle, sanitizer).with_config(config))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    dispatch_core::init_tracing(cli.json, level);

    let engine = build_engine(&cli)?;

    match cli.command {
        Commands::Generate {
            items,
            locations,
            agents,
        } => cmd_generate(&engine, items, locations, agents).await,
        Commands::List => cmd_list(&engine).await,
        Commands::Prioritize => cmd_prioritize(&engine).await,
        Commands::Reoptimize { event } => cmd_reoptimize(&engine, event).await,
        Commands::Agent { name, auto_assign } => cmd_agent(&engine, &name, auto_assign).await,
        Commands::Routes => cmd_routes(&engine).await,
    }
}

async fn cmd_generate(
    engine: &AssignmentEngine,
    items: Vec<String>,
    locations: Vec<String>,
    agents: Vec<String>,
) -> Result<()> {
    let items = if items.is_empty() {
        DEMO_ITEMS.map(String::from).to_vec()
    } else {
        items
    };
    let locations = if locations.is_empty() {
        DEMO_LOCATIONS.map(String::from).to_vec()
    } else {
        locations
    };
    let agents = if agents.is_empty() {
        SanitizeConfig::default().roster
    } else {
        agents
    };

    let outcome = engine
        .generate_batch(&items, &locations, &agents)
        .await
        .context("Failed to generate deliveries")?;
    report(&outcome);
    Ok(())
}

async fn cmd_list(engine: &AssignmentEngine) -> Result<()> {
    let set = engine
        .current_set()
        .await
        .context("Failed to load delivery set")?;
    if set.is_empty() {
        println!("No deliveries yet. Run `dispatch generate` first.");
        return Ok(());
    }
    print_deliveries(&set);
    Ok(())
}

async fn cmd_prioritize(engine: &AssignmentEngine) -> Result<()> {
    let outcome = engine
        .prioritize()
        .await
        .context("Failed to prioritize deliveries")?;
    report(&outcome);
    Ok(())
}

async fn cmd_reoptimize(engine: &AssignmentEngine, event: Option<String>) -> Result<()> {
    let event = event.and_then(DisruptionEvent::new);
    let outcome = engine
        .reoptimize(event)
        .await
        .context("Failed to re-optimize routes")?;
    report(&outcome);
    Ok(())
}

async fn cmd_agent(engine: &AssignmentEngine, name: &str, auto_assign: bool) -> Result<()> {
    let mut assigned = engine
        .agent_view(name)
        .await
        .context("Failed to load agent view")?;

    if assigned.is_empty() && auto_assign {
        let (new_assigned, chosen) = engine
            .auto_assign_if_unassigned(name)
            .await
            .context("Failed to auto-assign a delivery")?;
        if let Some(chosen) = &chosen {
            println!("Auto-assigned {} to {}.", chosen.delivery_id, chosen.assigned_agent);
        }
        assigned = new_assigned;
    }

    if assigned.is_empty() {
        println!("No deliveries currently assigned to {name}.");
        return Ok(());
    }
    print_deliveries(&assigned);
    Ok(())
}

async fn cmd_routes(engine: &AssignmentEngine) -> Result<()> {
    let set = engine
        .current_set()
        .await
        .context("Failed to load delivery set")?;
    if set.is_empty() {
        println!("No deliveries yet. Run `dispatch generate` first.");
        return Ok(());
    }

    for (agent, deliveries) in geo::group_by_agent(&set) {
        println!(
            "{agent}: {} stop(s), {:.1} km",
            deliveries.len(),
            geo::route_length_km(&deliveries)
        );
        for (delivery, (lat, lon)) in deliveries.iter().zip(geo::route_order(&deliveries)) {
            println!(
                "  {}  {}  ({lat:.4}, {lon:.4})",
                delivery.delivery_id, delivery.location
            );
        }
    }
    Ok(())
}

fn report(outcome: &EngineOutcome) {
    println!("{}", outcome.status.message());
    print_deliveries(&outcome.deliveries);
}

fn print_deliveries(set: &[Delivery]) {
    println!(
        "{:<6} {:<38} {:<12} {:<8} {:<8} {:>7}  REASON",
        "ID", "ITEM", "LOCATION", "AGENT", "PRIORITY", "URGENCY"
    );
    for d in set {
        println!(
            "{:<6} {:<38} {:<12} {:<8} {:<8} {:>7}  {}",
            d.delivery_id,
            truncate(&d.item, 38),
            truncate(&d.location, 12),
            truncate(&d.assigned_agent, 8),
            d.priority_label.to_string(),
            d.urgency_score,
            d.reason
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn reoptimize_accepts_an_event() {
        let cli = Cli::parse_from([
            "dispatch",
            "--offline",
            "reoptimize",
            "--event",
            "Rally in Park Street",
        ]);
        assert!(cli.offline);
        match cli.command {
            Commands::Reoptimize { event } => {
                assert_eq!(event.as_deref(), Some("Rally in Park Street"));
            }
            _ => panic!("expected reoptimize"),
        }
    }

    #[test]
    fn agent_auto_assign_flag_parses() {
        let cli = Cli::parse_from(["dispatch", "agent", "ravi", "--auto-assign"]);
        match cli.command {
            Commands::Agent { name, auto_assign } => {
                assert_eq!(name, "ravi");
                assert!(auto_assign);
            }
            _ => panic!("expected agent"),
        }
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("Salt Lake", 12), "Salt Lake");
        assert_eq!(truncate("A very long location name", 10).chars().count(), 10);
    }
}
