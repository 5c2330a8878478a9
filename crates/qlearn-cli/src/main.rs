//! qlearn CLI - train and watch tabular Q-Learning agents
//!
//! `qlearn run` reproduces the reference experiment: train on a slippery
//! FrozenLake for 5000 episodes, then play one greedy episode on screen.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{config as config_cmd, run, train, watch};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "qlearn")]
#[command(author, version, about = "qlearn - tabular Q-Learning on discrete environments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to QLEARN_CONFIG, ./qlearn.toml, ~/.config/qlearn/qlearn.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

/// Command line overrides applied on top of the loaded configuration
#[derive(clap::Args, Debug, Default)]
struct Overrides {
    /// Random seed for the agent and environment resets
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Exploration rate
    #[arg(long, global = true)]
    eps: Option<f64>,

    /// Discount factor
    #[arg(long, global = true)]
    gamma: Option<f64>,

    /// Learning rate
    #[arg(long, global = true)]
    stepsize: Option<f64>,

    /// Cap on steps per training episode
    #[arg(long, global = true)]
    max_steps: Option<usize>,

    /// Environment id (FrozenLake-v1, FrozenLake8x8-v1)
    #[arg(long, global = true)]
    env: Option<String>,

    /// Whether the lake is slippery
    #[arg(long, global = true)]
    slippery: Option<bool>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(seed) = self.seed {
            config.agent.seed = seed;
        }
        if let Some(eps) = self.eps {
            config.agent.eps = eps;
        }
        if let Some(gamma) = self.gamma {
            config.agent.gamma = gamma;
        }
        if let Some(stepsize) = self.stepsize {
            config.agent.stepsize = stepsize;
        }
        if let Some(max_steps) = self.max_steps {
            config.agent.max_steps_per_episode = Some(max_steps);
        }
        if let Some(env) = &self.env {
            config.environment.id.clone_from(env);
        }
        if let Some(slippery) = self.slippery {
            config.environment.is_slippery = slippery;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Train, then watch one greedy episode
    Run(run::RunArgs),

    /// Train and export results
    Train(train::TrainArgs),

    /// Play a saved value table greedily
    Watch(watch::WatchArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

fn init_logging(config: &Config, verbose: bool) {
    let log_level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("qlearn={log_level}").into());

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);
    config.validate()?;

    init_logging(&config, cli.verbose);
    match &config.source {
        Some(path) => tracing::info!("Loaded config from: {:?}", path),
        None => tracing::info!("No config file found, using defaults"),
    }

    match cli.command {
        Commands::Run(args) => run::run(&config, &args),
        Commands::Train(args) => train::run(&config, &args),
        Commands::Watch(args) => watch::run(&config, &args),
        Commands::Config(cmd) => config_cmd::run(&config, cmd),
    }
}
