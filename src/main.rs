use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use realmsim::{
    chronicle::ChronicleLog,
    engine::{EngineBuilder, RunEnd},
    report::StatusReport,
    rng::NAMES_STREAM,
    scenario::{Scenario, ScenarioLoader},
    world::DAYS_PER_YEAR,
};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

#[derive(Debug, Parser)]
#[command(author, version, about = "Tick-based simulator of competing civilizations")]
struct Cli {
    /// Path to a scenario YAML file (built-in two-civilization setup when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of years to simulate
    #[arg(short, long)]
    years: Option<u64>,

    /// Random seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Only print the verdict
    #[arg(short, long)]
    quiet: bool,

    /// Width and height of a square world
    #[arg(short, long)]
    map_size: Option<u32>,

    /// Number of randomly named civilizations, at most six (replaces the
    /// scenario's list)
    #[arg(long)]
    civilizations: Option<usize>,

    /// Pause between ticks, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Turn off random events
    #[arg(long)]
    no_events: bool,

    /// Export the chronicle when the run ends (timestamped file name when no
    /// path is given)
    #[arg(long, num_args = 0..=1)]
    export: Option<Option<PathBuf>>,

    /// Print the final status report as JSON
    #[arg(long)]
    json: bool,

    /// Log filter used when RUST_LOG is unset (defaults to the scenario's level)
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{level}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_status(report: &StatusReport) {
    println!("\n{THIN_RULE}");
    print!("{}", report.render("Civilization Status"));
    println!("{THIN_RULE}");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::default(),
    };
    if let Some(size) = cli.map_size {
        scenario.width = size;
        scenario.height = size;
    }
    if let Some(count) = cli.civilizations {
        scenario.civilizations.clear();
        scenario.random_civilizations = count;
    }
    if let Some(delay) = cli.delay_ms {
        scenario.tick_delay_ms = delay;
    }
    if cli.no_events {
        scenario.events.enabled = false;
    }
    scenario.validate()?;

    init_tracing(cli.log_level.as_deref().unwrap_or(&scenario.logging.level))?;

    let verbose = !cli.quiet;
    let seed = cli.seed.or(scenario.seed).unwrap_or_else(rand::random);
    let days = scenario.days(cli.years);

    let mut engine = EngineBuilder::new(scenario.engine_settings(seed))
        .with_chronicle(ChronicleLog::new(verbose))
        .with_standard_systems(scenario.events.clone())
        .build();

    let foundings = scenario.foundings(&mut engine.rng_stream(NAMES_STREAM));
    for founding in foundings {
        let name = founding.name.clone();
        engine
            .add_civilization(founding)
            .with_context(|| format!("Failed to found {name}"))?;
    }

    if verbose {
        println!("\n{RULE}");
        println!("            CIVILIZATION SIMULATOR");
        println!("{RULE}");
        let settings = engine.settings();
        println!("Scenario: {}", settings.scenario_name);
        println!("Seed: {}", engine.seed());
        println!("Simulating {days} days ({} years)", days / DAYS_PER_YEAR);
        println!("World size: {}x{}", settings.width, settings.height);
        println!("Civilizations: {}", engine.civilizations().len());
        println!("{RULE}\n");
    }

    let stop = engine.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n\nSimulation interrupted by user.");
            stop.stop();
        }
    });

    let (engine, outcome) = tokio::task::spawn_blocking(move || -> Result<_> {
        let outcome = engine.run_with_hook(days, |report| {
            if verbose {
                print_status(report);
            }
        })?;
        Ok((engine, outcome))
    })
    .await
    .context("Simulation task failed")??;

    tracing::info!(ticks = outcome.ticks, end = ?outcome.end, "simulation finished");
    let report = engine.status_report();
    if verbose {
        println!("\n{RULE}");
        if outcome.end == RunEnd::Stopped {
            println!("              SIMULATION STOPPED");
        } else {
            println!("              SIMULATION COMPLETE");
        }
        println!("{RULE}");
        print!("{}", report.render("Final Civilization Status"));
        println!("\n{}", engine.verdict());
        print!("\n{}", engine.chronicle().summary());
    } else {
        println!("{}", engine.verdict());
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    }

    if let Some(path) = &cli.export {
        let written = engine
            .chronicle()
            .export_to_file(path.as_deref())
            .context("Failed to export chronicle")?;
        println!("Chronicle exported to {}", written.display());
    }

    Ok(())
}
