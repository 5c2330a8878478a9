//! Per-episode training records

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use qlearn_core::{Result, Reward};

/// Summary of one finished episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// Number of environment steps taken
    pub steps: usize,
    /// Reward observed on the last transition
    pub final_reward: Reward,
    /// Sum of `gamma^t * r_t` over the episode
    pub discounted_return: f64,
    /// `true` if the environment reached a terminal state, `false` if the
    /// episode was truncated or capped
    pub terminated: bool,
}

/// One row of the training table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub steps: usize,
    pub final_reward: Reward,
    pub discounted_return: f64,
}

/// Ordered, append-only record of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    episodes: Vec<EpisodeRecord>,
}

/// Aggregate statistics over a training record
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub total_steps: usize,
    pub mean_steps: f64,
    pub mean_final_reward: f64,
    pub mean_discounted_return: f64,
    /// Fraction of episodes whose final reward was positive
    pub success_rate: f64,
}

impl TrainingRecord {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            episodes: Vec::with_capacity(capacity),
        }
    }

    /// Append the outcome of the next episode
    pub fn push(&mut self, outcome: &EpisodeOutcome) {
        let episode = self.episodes.len();
        self.episodes.push(EpisodeRecord {
            episode,
            steps: outcome.steps,
            final_reward: outcome.final_reward,
            discounted_return: outcome.discounted_return,
        });
    }

    /// Mark the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn episodes(&self) -> &[EpisodeRecord] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EpisodeRecord> {
        self.episodes.iter()
    }

    /// Summary over the last `window` episodes (all episodes if `None`)
    pub fn summary(&self, window: Option<usize>) -> TrainingSummary {
        let start = window.map_or(0, |w| self.episodes.len().saturating_sub(w));
        let rows = &self.episodes[start..];
        let n = rows.len();
        if n == 0 {
            return TrainingSummary {
                episodes: 0,
                total_steps: 0,
                mean_steps: 0.0,
                mean_final_reward: 0.0,
                mean_discounted_return: 0.0,
                success_rate: 0.0,
            };
        }

        let total_steps: usize = rows.iter().map(|r| r.steps).sum();
        let reward_sum: f64 = rows.iter().map(|r| r.final_reward).sum();
        let return_sum: f64 = rows.iter().map(|r| r.discounted_return).sum();
        let successes = rows.iter().filter(|r| r.final_reward > 0.0).count();

        TrainingSummary {
            episodes: n,
            total_steps,
            mean_steps: total_steps as f64 / n as f64,
            mean_final_reward: reward_sum / n as f64,
            mean_discounted_return: return_sum / n as f64,
            success_rate: successes as f64 / n as f64,
        }
    }

    /// Write the episode table as CSV
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "episode,steps,final_reward,discounted_return")?;
        for row in &self.episodes {
            writeln!(
                writer,
                "{},{},{},{}",
                row.episode, row.steps, row.final_reward, row.discounted_return
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Export to a file; `.json` writes the full record, anything else writes CSV
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            self.write_csv(writer)?;
        }
        Ok(())
    }
}

impl Default for TrainingRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a TrainingRecord {
    type Item = &'a EpisodeRecord;
    type IntoIter = std::slice::Iter<'a, EpisodeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
