mod commands;
mod roster;
mod scoreboard;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use snake_engine::config::{ConfigStore, FileContentConfigProvider};
use snake_engine::session_rng::SessionRng;
use snake_engine::{Settings, Simulation, Speed, SpeedControl, log, logger, run_paced};
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "snake_arena")]
struct Args {
    /// Settings file; defaults are used when it does not exist.
    #[arg(long, default_value = "snake_arena.yaml")]
    config: PathBuf,

    /// Directory with agent descriptors. Overrides `source_directory`.
    #[arg(long)]
    agents: Option<PathBuf>,

    /// Number of built-in bots when no agent directory is configured.
    #[arg(long, default_value_t = 4)]
    bots: usize,

    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    speed: Option<Speed>,

    /// Print the standings every this many ticks.
    #[arg(long, default_value_t = 10)]
    scoreboard_every: u64,

    /// Write the effective settings back to the settings file.
    #[arg(long)]
    save_config: bool,

    #[arg(long)]
    use_log_prefix: bool,
}

/// How long shutdown waits for controllers still busy with a decision.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(args));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let prefix = if args.use_log_prefix {
        Some("Arena".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let store: ConfigStore<FileContentConfigProvider, Settings> = ConfigStore::from_yaml_file(&args.config);
    let mut settings = store.get_config()?;
    if let Some(agents) = args.agents {
        settings.source_directory = Some(agents);
    }
    if let Some(speed) = args.speed {
        settings.speed = speed;
    }
    // Pin the seed so the roster and the maze come from the same run seed.
    let seed = SessionRng::from_optional_seed(args.seed.or(settings.seed)).seed();
    settings.seed = Some(seed);
    if args.save_config {
        store.set_config(&settings)?;
        log!("Settings saved to {}", args.config.display());
    }

    let entrants = match settings.source_directory.as_deref() {
        Some(directory) => roster::from_directory(directory, seed)?,
        None => roster::built_in(args.bots, seed),
    };
    if entrants.is_empty() {
        log!("No agents to run");
        return Ok(());
    }

    let mut simulation = Simulation::new(settings.clone(), entrants)?;
    let scoreboard = scoreboard::spawn(simulation.subscribe(), args.scoreboard_every);
    println!("{}\n", scoreboard::render(&simulation.snapshot()));

    let speed = Arc::new(SpeedControl::new(settings.speed));
    let (stop_tx, stop_rx) = watch::channel(false);
    let stop = Arc::new(stop_tx);

    let ctrl_c_stop = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log!("Ctrl+C received, stopping");
            let _ = ctrl_c_stop.send(true);
        }
    });
    commands::spawn_stdin_reader(Arc::clone(&speed), Arc::clone(&stop));

    log!("Running at {} speed; type faster, slower, speed <name> or stop", settings.speed);
    let summary = run_paced(&mut simulation, speed.subscribe(), stop_rx, args.ticks).await;
    scoreboard.abort();

    let snapshot = simulation.snapshot();
    println!("{}\n", scoreboard::render(&snapshot));
    println!("{}", scoreboard::render_result(&snapshot));
    log!("Played {} ticks, seed {} ({:?})", summary.ticks, seed, summary.reason);

    Ok(())
}
