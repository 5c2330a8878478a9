//! Train, then watch one greedy episode

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use qlearn_env::make;

use super::{evaluate, export, print_policy, print_summary, train_agent};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of training episodes (defaults to training.episodes)
    #[arg(short, long)]
    pub episodes: Option<usize>,

    /// Skip the rendered playback episode
    #[arg(long)]
    pub no_watch: bool,
}

pub fn run(config: &Config, args: &RunArgs) -> Result<()> {
    let episodes = args.episodes.unwrap_or(config.training.episodes);
    let (agent, record) = train_agent(config, episodes)?;

    let evaluation = evaluate(config, &agent)?;
    print_summary(&record, evaluation.as_ref());
    print_policy(&agent, agent.env().inner().ncol());
    export(config, &agent, &record)?;

    if config.watch.enabled && !args.no_watch {
        println!("\nWatching greedy policy on {}", config.environment.id);
        let options = config.environment.options();
        let final_reward = agent
            .watch(
                |mode| make(&config.environment.id, &options, mode),
                &config.watch.options(),
            )
            .context("Playback failed")?;
        println!("Final reward: {final_reward}");
        info!("Playback final reward: {}", final_reward);
    }

    Ok(())
}
