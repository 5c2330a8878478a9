//! Train and export results without playback

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{evaluate, export, print_policy, print_summary, train_agent};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Number of training episodes (defaults to training.episodes)
    #[arg(short, long)]
    pub episodes: Option<usize>,

    /// Write per-episode results (`.json`, otherwise CSV)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the learned value table as JSON
    #[arg(long)]
    pub save_table: Option<PathBuf>,
}

pub fn run(config: &Config, args: &TrainArgs) -> Result<()> {
    let mut config = config.clone();
    if args.output.is_some() {
        config.training.output.clone_from(&args.output);
    }
    if args.save_table.is_some() {
        config.training.save_table.clone_from(&args.save_table);
    }

    let episodes = args.episodes.unwrap_or(config.training.episodes);
    let (agent, record) = train_agent(&config, episodes)?;

    let evaluation = evaluate(&config, &agent)?;
    print_summary(&record, evaluation.as_ref());
    print_policy(&agent, agent.env().inner().ncol());
    export(&config, &agent, &record)
}
