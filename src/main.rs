use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use visitsim::config::SimulationConfig;
use visitsim::dashboard::synthesize_business_metrics;
use visitsim::formats::JsonlWriter;
use visitsim::model::{ActionKind, VisitorAction};
use visitsim::scheduler::{ManualClock, ScaledClock};
use visitsim::traits::{Clock, SnapshotWriter};
use visitsim::{EnvironmentSnapshot, PopulationManager, PopulationSettings};

#[derive(Debug, Parser)]
#[command(name = "visitsim")]
#[command(about = "Website visitor simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Runs the live population against the wall clock and streams JSON snapshots.
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 60)]
        seconds: u64,
        #[arg(long, default_value_t = 1.0)]
        time_scale: f64,
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
        /// Seconds into the run at which to trigger a visitor burst.
        #[arg(long)]
        burst_at: Option<u64>,
    },
    /// Simulates a fixed span on a manual clock and prints one snapshot.
    Snapshot {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 60)]
        advance_seconds: u64,
        /// Local visitor action as `kind:page`, e.g. `pageview:/product`. Repeatable.
        #[arg(long = "action")]
        actions: Vec<String>,
    },
    /// Prints one dashboard metrics snapshot.
    Metrics {
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("visitsim=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Run {
            config,
            output,
            seconds,
            time_scale,
            interval_ms,
            burst_at,
        } => {
            let loaded = load_config(config)?;
            let settings = PopulationSettings::default();
            let clock = ScaledClock::new(Utc::now(), time_scale);
            let mut manager = PopulationManager::new(clock, settings, loaded.seed);
            manager.ensure_local_visitor(&environment(&loaded));
            manager.start();

            let compression = loaded.output.compression.as_deref();
            let mut writer = match output.or_else(|| loaded.output.path.clone().map(PathBuf::from)) {
                Some(path) => JsonlWriter::to_path(path, compression)?,
                None => JsonlWriter::from_writer(std::io::stdout(), compression)?,
            };

            let started = Instant::now();
            let deadline = started + Duration::from_secs(seconds);
            let interval = Duration::from_millis(interval_ms.max(10));
            let mut burst_due = burst_at.map(|secs| started + Duration::from_secs(secs));

            loop {
                manager.tick();
                if let Some(due) = burst_due {
                    if Instant::now() >= due {
                        manager.simulate_burst();
                        burst_due = None;
                    }
                }

                let snapshot = serde_json::to_value(manager.snapshot())?;
                writer.write_snapshot(&snapshot)?;
                writer.flush()?;

                if Instant::now() >= deadline {
                    break;
                }
                thread::sleep(interval);
            }

            manager.shutdown();
            writer.close()?;
            tracing::info!("wrote {} snapshots", writer.records());
        }
        Commands::Snapshot {
            config,
            seed,
            advance_seconds,
            actions,
        } => {
            let loaded = load_config(config)?;
            let settings = PopulationSettings::default();
            let clock = ManualClock::new(Utc::now());
            let mut manager =
                PopulationManager::new(clock.clone(), settings, seed.or(loaded.seed));
            manager.ensure_local_visitor(&environment(&loaded));
            manager.start();

            for _ in 0..advance_seconds {
                clock.advance(chrono::Duration::seconds(1));
                manager.tick();
            }
            for raw in &actions {
                let action = parse_action(raw, clock.now())?;
                manager.record_action(action);
            }
            if let Some(local) = manager.local_visitor() {
                tracing::info!(
                    "local visitor score {} ({})",
                    local.lead_score,
                    local.lead_tier().display_name()
                );
            }

            println!("{}", serde_json::to_string_pretty(&manager.snapshot())?);
            manager.shutdown();
        }
        Commands::Metrics { seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let metrics = synthesize_business_metrics(&mut rng, Utc::now());
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(SimulationConfig::from_path(&path)?),
        None => Ok(SimulationConfig::default()),
    }
}

fn environment(config: &SimulationConfig) -> EnvironmentSnapshot {
    EnvironmentSnapshot {
        current_path: config.environment.current_path.clone(),
        viewport_width: config.environment.viewport_width,
    }
}

fn parse_action(
    raw: &str,
    at: chrono::DateTime<Utc>,
) -> Result<VisitorAction, Box<dyn std::error::Error>> {
    let (kind, page) = raw
        .split_once(':')
        .ok_or_else(|| format!("action must look like kind:page, got {raw}"))?;
    let kind: ActionKind = serde_json::from_value(serde_json::Value::String(
        kind.trim().to_lowercase(),
    ))
    .map_err(|_| format!("unknown action kind: {kind}"))?;
    Ok(VisitorAction::new(kind, page.trim(), at))
}
