//! qlearn RL - tabular Q-Learning
//!
//! This crate provides the value table, the epsilon-greedy Q-Learning agent
//! with its episode and training loops, and the per-episode training record.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod config;
pub mod q_table;
pub mod record;

pub use agent::{QLearningAgent, WatchOptions};
pub use config::AgentConfig;
pub use q_table::QTable;
pub use record::{EpisodeOutcome, EpisodeRecord, TrainingRecord, TrainingSummary};
