//! The environment contract consumed by the learner
//!
//! Environments are discrete: states and actions are indices in
//! `0..observation_space_size()` and `0..action_space_size()`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// State index
pub type StateIndex = usize;

/// Action index
pub type ActionIndex = usize;

/// Reward value from environment
pub type Reward = f64;

/// Auxiliary diagnostic data returned by `reset` and `step`
pub type Info = HashMap<String, serde_json::Value>;

/// Result of resetting an environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reset {
    pub state: StateIndex,
    #[serde(default)]
    pub info: Info,
}

impl Reset {
    pub fn new(state: StateIndex) -> Self {
        Self {
            state,
            info: Info::new(),
        }
    }
}

/// Result of advancing an environment by one timestep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub next_state: StateIndex,
    pub reward: Reward,
    /// The episode reached a terminal state
    pub terminated: bool,
    /// The episode was cut short by a limit outside the MDP (e.g. a time limit)
    pub truncated: bool,
    #[serde(default)]
    pub info: Info,
}

impl Step {
    pub fn new(next_state: StateIndex, reward: Reward, terminated: bool) -> Self {
        Self {
            next_state,
            reward,
            terminated,
            truncated: false,
            info: Info::new(),
        }
    }

    /// Whether the episode is over, for either reason
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// How an environment presents itself while running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// No output
    #[default]
    None,
    /// Draw every reset and step for a person watching
    Human,
}

/// A discrete-state, discrete-action episodic environment
pub trait Environment {
    /// Number of discrete states
    fn observation_space_size(&self) -> usize;

    /// Number of discrete actions
    fn action_space_size(&self) -> usize;

    /// Start a new episode, optionally reseeding the environment's randomness
    fn reset(&mut self, seed: Option<u64>) -> Result<Reset>;

    /// Apply an action and advance one timestep
    fn step(&mut self, action: ActionIndex) -> Result<Step>;

    /// Release any resources held by the environment
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn observation_space_size(&self) -> usize {
        (**self).observation_space_size()
    }

    fn action_space_size(&self) -> usize {
        (**self).action_space_size()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Reset> {
        (**self).reset(seed)
    }

    fn step(&mut self, action: ActionIndex) -> Result<Step> {
        (**self).step(action)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
