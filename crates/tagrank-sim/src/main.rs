//! Tagrank simulator
//!
//! Drives a seeded synthetic workload through the affinity engine and
//! prints where each user's interests ended up.

mod simulator;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use simulator::{run_simulator, SimulatorConfig};
use std::time::Duration;
use tagrank_core::EngineConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,tagrank_sim=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_target(false)
        .init();

    let cli = Command::new("tagrank-sim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tag-affinity recommendation simulator")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Engine configuration file (TOML)"),
        )
        .subcommand(
            Command::new("simulate")
                .about("Replay a seeded synthetic workload")
                .arg(
                    Arg::new("users")
                        .long("users")
                        .default_value("20")
                        .value_parser(value_parser!(usize))
                        .help("Number of accounts"),
                )
                .arg(
                    Arg::new("polls")
                        .long("polls")
                        .default_value("100")
                        .value_parser(value_parser!(usize))
                        .help("Number of polls to create"),
                )
                .arg(
                    Arg::new("tags")
                        .long("tags")
                        .default_value("8")
                        .value_parser(value_parser!(usize))
                        .help("Number of distinct tags (at most 16)"),
                )
                .arg(
                    Arg::new("events")
                        .long("events")
                        .default_value("2000")
                        .value_parser(value_parser!(usize))
                        .help("Number of behavioral events to replay"),
                )
                .arg(
                    Arg::new("concurrency")
                        .long("concurrency")
                        .default_value("16")
                        .value_parser(value_parser!(usize))
                        .help("Events processed at once"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("show")
                        .long("show")
                        .default_value("10")
                        .value_parser(value_parser!(usize))
                        .help("Users to include in the report"),
                )
                .arg(
                    Arg::new("latency-ms")
                        .long("latency-ms")
                        .value_parser(value_parser!(u64))
                        .help("Artificial backend latency per call"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(Command::new("config").about("Print the effective engine configuration"));

    let matches = cli.get_matches();
    let engine = load_engine_config(&matches)?;

    match matches.subcommand() {
        Some(("simulate", args)) => {
            let config = simulator_config(args, engine);
            let json = args.get_flag("json");

            tracing::info!(
                seed = config.seed,
                users = config.users,
                polls = config.polls,
                events = config.events,
                "starting simulation"
            );
            let report = run_simulator(config).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.generate_text());
            }

            if !report.passed() {
                anyhow::bail!("{} events failed", report.stats.events_failed);
            }
        }
        Some(("config", _)) => {
            print!("{}", engine.to_toml_string()?);
        }
        _ => {}
    }
    Ok(())
}

fn load_engine_config(matches: &ArgMatches) -> anyhow::Result<EngineConfig> {
    let Some(path) = matches
        .subcommand()
        .and_then(|(_, args)| args.get_one::<std::path::PathBuf>("config"))
    else {
        return Ok(EngineConfig::default());
    };

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    EngineConfig::from_toml_str(&source).with_context(|| format!("parsing {}", path.display()))
}

fn simulator_config(args: &ArgMatches, engine: EngineConfig) -> SimulatorConfig {
    let defaults = SimulatorConfig::default();
    SimulatorConfig {
        seed: args.get_one::<u64>("seed").copied().unwrap_or(defaults.seed),
        users: args.get_one::<usize>("users").copied().unwrap_or(defaults.users),
        polls: args.get_one::<usize>("polls").copied().unwrap_or(defaults.polls),
        tags: args.get_one::<usize>("tags").copied().unwrap_or(defaults.tags),
        events: args.get_one::<usize>("events").copied().unwrap_or(defaults.events),
        concurrency: args
            .get_one::<usize>("concurrency")
            .copied()
            .unwrap_or(defaults.concurrency),
        show: args.get_one::<usize>("show").copied().unwrap_or(defaults.show),
        latency: args
            .get_one::<u64>("latency-ms")
            .map(|ms| Duration::from_millis(*ms)),
        engine,
    }
}
