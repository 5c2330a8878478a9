//! Play a saved value table greedily

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use qlearn_core::RenderMode;
use qlearn_env::make;
use qlearn_rl::{QLearningAgent, QTable};

use super::build_env;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Value table written by `train --save-table`
    #[arg(short, long)]
    pub table: PathBuf,

    /// Delay between steps in milliseconds (defaults to watch.step_delay_ms)
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

pub fn run(config: &Config, args: &WatchArgs) -> Result<()> {
    let table = QTable::load_json(&args.table)
        .with_context(|| format!("Failed to load value table from {}", args.table.display()))?;

    let env = build_env(config, RenderMode::None)?;
    let agent = QLearningAgent::with_table(env, config.agent.clone(), table)
        .context("Value table does not fit the configured environment")?;

    let mut watch = config.watch.clone();
    if let Some(delay) = args.delay_ms {
        watch.step_delay_ms = delay;
    }

    let options = config.environment.options();
    let final_reward = agent
        .watch(
            |mode| make(&config.environment.id, &options, mode),
            &watch.options(),
        )
        .context("Playback failed")?;

    println!("Final reward: {final_reward}");
    Ok(())
}
