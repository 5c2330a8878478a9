//! CLI command modules

pub mod config;
pub mod run;
pub mod train;
pub mod watch;

use anyhow::{Context, Result};
use tracing::info;

use qlearn_core::{Environment, RenderMode};
use qlearn_env::{make, FrozenLake, TimeLimit};
use qlearn_rl::{QLearningAgent, TrainingRecord, TrainingSummary};

use crate::config::Config;

pub type LakeEnv = TimeLimit<FrozenLake>;

/// Build the configured environment
pub fn build_env(config: &Config, mode: RenderMode) -> Result<LakeEnv> {
    make(&config.environment.id, &config.environment.options(), mode)
        .with_context(|| format!("Failed to build environment {}", config.environment.id))
}

/// Construct an agent and train it for `episodes`
pub fn train_agent(
    config: &Config,
    episodes: usize,
) -> Result<(QLearningAgent<LakeEnv>, TrainingRecord)> {
    let env = build_env(config, RenderMode::None)?;
    let mut agent = QLearningAgent::new(env, config.agent.clone())
        .context("Failed to create agent")?
        .with_log_interval(config.training.log_interval);

    let record = agent.train(episodes).context("Training failed")?;
    agent.close().context("Failed to close training environment")?;
    Ok((agent, record))
}

/// Greedy evaluation on a fresh environment, if enabled
pub fn evaluate<E: Environment>(
    config: &Config,
    agent: &QLearningAgent<E>,
) -> Result<Option<TrainingSummary>> {
    if config.training.eval_episodes == 0 {
        return Ok(None);
    }
    let mut env = build_env(config, RenderMode::None)?;
    let summary = agent
        .evaluate(&mut env, config.training.eval_episodes)
        .context("Evaluation failed")?;
    env.close()?;
    Ok(Some(summary))
}

/// Write the training table and value table where configured
pub fn export<E: Environment>(
    config: &Config,
    agent: &QLearningAgent<E>,
    record: &TrainingRecord,
) -> Result<()> {
    if let Some(path) = &config.training.output {
        record
            .export(path)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        info!("Training results written to {}", path.display());
    }
    if let Some(path) = &config.training.save_table {
        agent
            .q_table()
            .save_json(path)
            .with_context(|| format!("Failed to write value table to {}", path.display()))?;
        info!("Value table written to {}", path.display());
    }
    Ok(())
}

pub fn print_summary(record: &TrainingRecord, evaluation: Option<&TrainingSummary>) {
    let overall = record.summary(None);
    let recent = record.summary(Some(100));

    println!("Training Summary");
    println!("================");
    println!("Run:                  {}", record.run_id);
    println!("Episodes:             {}", overall.episodes);
    println!("Total steps:          {}", overall.total_steps);
    println!("Mean steps:           {:.2}", overall.mean_steps);
    println!("Success rate:         {:.3}", overall.success_rate);
    println!("Success rate (last {}): {:.3}", recent.episodes, recent.success_rate);
    if let Some(eval) = evaluation {
        println!(
            "Greedy evaluation:    {:.3} over {} episodes",
            eval.success_rate, eval.episodes
        );
    }
}

/// Print the greedy action for every state as a grid
pub fn print_policy<E: Environment>(agent: &QLearningAgent<E>, ncol: usize) {
    const ARROWS: [char; 4] = ['<', 'v', '>', '^'];

    println!("\nGreedy policy");
    for row in agent.policy().chunks(ncol.max(1)) {
        let line: String = row
            .iter()
            .map(|&a| ARROWS.get(a).copied().unwrap_or('?'))
            .collect();
        println!("  {line}");
    }
}
