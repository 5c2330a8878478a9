//! Agent hyperparameters

use serde::{Deserialize, Serialize};

use qlearn_core::{QLearnError, Result};

/// Q-Learning agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Seed for the agent's random source and for every environment reset
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Probability of taking a uniformly random action (0..=1)
    #[serde(default = "default_eps")]
    pub eps: f64,

    /// Discount factor applied to the bootstrapped value (0..=1)
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// Learning rate (0 < stepsize <= 1)
    #[serde(default = "default_stepsize")]
    pub stepsize: f64,

    /// Optional cap on steps per episode; `None` runs until the environment ends the episode
    #[serde(default)]
    pub max_steps_per_episode: Option<usize>,

    /// End an episode when the environment reports `truncated`.
    /// Off by default: only termination or the step cap end an episode.
    #[serde(default)]
    pub stop_on_truncation: bool,
}

fn default_seed() -> u64 {
    42
}
fn default_eps() -> f64 {
    0.1
}
fn default_gamma() -> f64 {
    0.95
}
fn default_stepsize() -> f64 {
    0.05
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            eps: default_eps(),
            gamma: default_gamma(),
            stepsize: default_stepsize(),
            max_steps_per_episode: None,
            stop_on_truncation: false,
        }
    }
}

impl AgentConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_stepsize(mut self, stepsize: f64) -> Self {
        self.stepsize = stepsize;
        self
    }

    pub fn with_max_steps_per_episode(mut self, max_steps: usize) -> Self {
        self.max_steps_per_episode = Some(max_steps);
        self
    }

    pub fn with_stop_on_truncation(mut self, stop: bool) -> Self {
        self.stop_on_truncation = stop;
        self
    }

    /// Check every hyperparameter against its documented range
    ///
    /// NaN fails every range check.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.eps) {
            return Err(QLearnError::InvalidConfig(format!(
                "eps must be in [0, 1], got {}",
                self.eps
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(QLearnError::InvalidConfig(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        if !(self.stepsize > 0.0 && self.stepsize <= 1.0) {
            return Err(QLearnError::InvalidConfig(format!(
                "stepsize must be in (0, 1], got {}",
                self.stepsize
            )));
        }
        if self.max_steps_per_episode == Some(0) {
            return Err(QLearnError::InvalidConfig(
                "max_steps_per_episode must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
