//! qlearn environments
//!
//! Reference environments for the Q-Learning agent, built by id the way a
//! gym registry would build them.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod frozen_lake;
pub mod time_limit;

use serde::{Deserialize, Serialize};
use tracing::debug;

use qlearn_core::{QLearnError, RenderMode, Result};

pub use frozen_lake::{FrozenLake, Tile};
pub use time_limit::TimeLimit;

pub const FROZEN_LAKE: &str = "FrozenLake-v1";
pub const FROZEN_LAKE_8X8: &str = "FrozenLake8x8-v1";

/// Keyword options for building a FrozenLake environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrozenLakeOptions {
    pub is_slippery: bool,
    /// Custom map rows; overrides the map named by the id
    pub map: Option<Vec<String>>,
}

impl Default for FrozenLakeOptions {
    fn default() -> Self {
        Self {
            is_slippery: true,
            map: None,
        }
    }
}

/// Build a registered environment wrapped in its step limit
pub fn make(
    id: &str,
    options: &FrozenLakeOptions,
    render_mode: RenderMode,
) -> Result<TimeLimit<FrozenLake>> {
    let (lake, max_episode_steps) = match (id, &options.map) {
        (FROZEN_LAKE | FROZEN_LAKE_8X8, Some(map)) => (
            FrozenLake::new(map.as_slice(), options.is_slippery, render_mode)?,
            100,
        ),
        (FROZEN_LAKE, None) => (
            FrozenLake::four_by_four(options.is_slippery, render_mode)?,
            100,
        ),
        (FROZEN_LAKE_8X8, None) => (
            FrozenLake::eight_by_eight(options.is_slippery, render_mode)?,
            200,
        ),
        _ => {
            return Err(QLearnError::InvalidConfig(format!(
                "unknown environment id '{id}' (expected {FROZEN_LAKE} or {FROZEN_LAKE_8X8})"
            )))
        }
    };

    debug!(
        "Built {} ({}x{}, slippery={}, max_episode_steps={})",
        id,
        lake.nrow(),
        lake.ncol(),
        options.is_slippery,
        max_episode_steps
    );
    Ok(TimeLimit::new(lake, max_episode_steps))
}
