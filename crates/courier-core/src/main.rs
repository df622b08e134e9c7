//! Courier Simulation
//!
//! Four factions of couriers roam a grid, trading and fighting over messages,
//! and race to bring a complete collection home to their Master.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use courier_core::config::{SimConfig, DEFAULT_CONFIG_PATH};
use courier_core::output::{render_tallies, write_json};
use courier_core::{RngKind, Simulation};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "courier_sim")]
#[command(about = "A faction courier simulation on a grid")]
struct Args {
    /// TOML configuration file; defaults apply when it does not exist
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rounds before the most-messages verdict
    #[arg(long)]
    steps: Option<u64>,

    /// Generator behind every random decision
    #[arg(long)]
    rng: Option<RngKind>,

    /// Agents spawned per faction
    #[arg(long)]
    agents: Option<u32>,

    /// Map width in tiles
    #[arg(long)]
    width: Option<i32>,

    /// Map height in tiles
    #[arg(long)]
    height: Option<i32>,

    /// Pause between rounds, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Draw the map after every round
    #[arg(long)]
    render: bool,

    /// Paint the rendered map with faction colours
    #[arg(long)]
    color: bool,

    /// Print Master tallies every round and raise the log level to debug
    #[arg(long, short)]
    verbose: bool,

    /// Append every event to this JSONL file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write the final snapshot and verdict to this JSON file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    /// Command line values win over the file
    fn apply(&self, config: &mut SimConfig) {
        if let Some(seed) = self.seed {
            config.run.seed = Some(seed);
        }
        if let Some(steps) = self.steps {
            config.run.max_steps = steps;
        }
        if let Some(rng) = self.rng {
            config.run.rng = rng;
        }
        if let Some(agents) = self.agents {
            config.population.agents_per_faction = agents;
        }
        if let Some(width) = self.width {
            config.map.width = width;
        }
        if let Some(height) = self.height {
            config.map.height = height;
        }
        if let Some(delay) = self.delay_ms {
            config.run.step_delay_ms = delay;
        }
        if self.events.is_some() {
            config.output.events_path = self.events.clone();
        }
        if self.summary.is_some() {
            config.output.summary_path = self.summary.clone();
        }
        config.output.render |= self.render;
        config.output.color |= self.color;
        config.output.verbose |= self.verbose;
    }
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SimConfig::load_or_default(&args.config)?;
    args.apply(&mut config);
    config.validate()?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut sim = Simulation::new(&config)?;
    if let Some(path) = &config.output.events_path {
        sim.attach_event_log(path)?;
    }

    println!("Courier Simulation");
    println!("==================");
    println!("Seed: {} ({})", sim.rng().seed(), sim.rng().kind().as_str());
    println!("Map: {}x{}", config.map.width, config.map.height);
    println!("Max steps: {}", config.run.max_steps);
    let summary = sim.spawn_summary();
    println!("Spawned {} agents carrying {} messages", summary.total_agents, summary.total_messages);
    for (faction, count) in &summary.by_faction {
        println!("  {}: {}", faction, count);
    }
    println!();

    let draw = |sim: &Simulation| {
        if config.output.color {
            sim.render_colored()
        } else {
            sim.render()
        }
    };

    if config.output.render {
        println!("{}", draw(&sim));
    }

    let delay = Duration::from_millis(config.run.step_delay_ms);
    while !sim.is_finished() {
        sim.step();
        let step = sim.current_step();

        if config.output.verbose {
            println!("[Step {:>3}]", step);
            println!("{}", render_tallies(sim.masters(), sim.ledger().total()));
        }
        if config.output.render {
            println!("{}", draw(&sim));
        }
        if !delay.is_zero() && !sim.is_finished() {
            std::thread::sleep(delay);
        }
    }

    println!();
    println!("Finished after {} steps", sim.current_step());
    println!("{}", render_tallies(sim.masters(), sim.ledger().total()));
    if let Some(verdict) = sim.verdict() {
        println!("{}", verdict.describe());
    }

    if let Some(summary) = sim.summary() {
        let state = &summary.final_state;
        println!("Survivors: {}/{}", state.living_agents().count(), state.agents.len());
        if let Some(path) = &config.output.summary_path {
            write_json(&summary, path)?;
            println!("Summary written to {}", path.display());
        }
    }

    Ok(())
}
