//! Tabular Q-Learning agent
//!
//! Off-policy TD control: actions are chosen epsilon-greedily, but every
//! update bootstraps from the greedy (max) value of the next state.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use qlearn_core::{
    ActionIndex, Environment, QLearnError, RenderMode, Result, Reward, StateIndex,
};

use crate::config::AgentConfig;
use crate::q_table::QTable;
use crate::record::{EpisodeOutcome, TrainingRecord, TrainingSummary};

/// Default number of episodes between training progress logs
pub const DEFAULT_LOG_INTERVAL: usize = 500;

/// Options for greedy playback
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Pause after every step so a person can follow along
    pub step_delay: Duration,
    /// Stop after this many steps even if the episode has not ended
    pub max_steps: Option<usize>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(300),
            max_steps: None,
        }
    }
}

/// Value table, hyperparameters and random source.
///
/// Kept apart from the environment so an episode can borrow both mutably.
#[derive(Debug, Clone)]
struct Learner {
    config: AgentConfig,
    q_table: QTable,
    rng: StdRng,
}

impl Learner {
    fn greedy(&self, state: StateIndex) -> Result<ActionIndex> {
        self.q_table.argmax(state)
    }

    fn eps_greedy(&mut self, state: StateIndex) -> Result<ActionIndex> {
        // Reject a bad state before consuming any randomness
        self.q_table.row(state)?;

        if self.rng.gen::<f64>() < self.config.eps {
            Ok(self.rng.gen_range(0..self.q_table.num_actions()))
        } else {
            self.greedy(state)
        }
    }

    fn update(
        &mut self,
        state: StateIndex,
        action: ActionIndex,
        reward: Reward,
        next_state: StateIndex,
    ) -> Result<f64> {
        if !reward.is_finite() {
            return Err(QLearnError::Environment(format!(
                "non-finite reward {reward}"
            )));
        }

        let current_q = self.q_table.get(state, action)?;
        let max_next_q = self.q_table.max_value(next_state)?;
        let td_target = reward + self.config.gamma * max_next_q;
        let new_q = current_q + self.config.stepsize * (td_target - current_q);
        self.q_table.set(state, action, new_q)?;
        Ok(new_q)
    }

    fn check_spaces<W: Environment + ?Sized>(&self, env: &W) -> Result<()> {
        let actual = (env.observation_space_size(), env.action_space_size());
        if actual != self.q_table.shape() {
            return Err(QLearnError::ShapeMismatch {
                expected: self.q_table.shape(),
                actual,
            });
        }
        Ok(())
    }

    fn run_episode<W: Environment + ?Sized>(&mut self, env: &mut W) -> Result<EpisodeOutcome> {
        let mut state = env.reset(Some(self.config.seed))?.state;
        let mut action = self.eps_greedy(state)?;

        let mut steps = 0;
        let mut discounted_return = 0.0;
        let mut discount = 1.0;

        loop {
            let step = env.step(action)?;
            let next_action = self.eps_greedy(step.next_state)?;
            self.update(state, action, step.reward, step.next_state)?;

            state = step.next_state;
            action = next_action;
            steps += 1;
            discounted_return += discount * step.reward;
            discount *= self.config.gamma;

            if step.terminated {
                return Ok(EpisodeOutcome {
                    steps,
                    final_reward: step.reward,
                    discounted_return,
                    terminated: true,
                });
            }
            let capped = self
                .config
                .max_steps_per_episode
                .is_some_and(|max| steps >= max);
            let truncated = step.truncated && self.config.stop_on_truncation;
            if truncated || capped {
                debug!(steps, capped, truncated, "Episode cut short");
                return Ok(EpisodeOutcome {
                    steps,
                    final_reward: step.reward,
                    discounted_return,
                    terminated: false,
                });
            }
        }
    }

    /// Follow the greedy policy for one episode without learning
    ///
    /// `truncated` only ends the episode when `stop_on_truncation` is set.
    fn play_greedy<W: Environment + ?Sized>(
        &self,
        env: &mut W,
        seed: u64,
        step_delay: Option<Duration>,
        max_steps: Option<usize>,
        stop_on_truncation: bool,
    ) -> Result<EpisodeOutcome> {
        let mut state = env.reset(Some(seed))?.state;

        let mut steps = 0;
        let mut discounted_return = 0.0;
        let mut discount = 1.0;

        loop {
            let step = env.step(self.greedy(state)?)?;
            if let Some(delay) = step_delay {
                thread::sleep(delay);
            }

            state = step.next_state;
            steps += 1;
            discounted_return += discount * step.reward;
            discount *= self.config.gamma;

            let capped = max_steps.is_some_and(|max| steps >= max);
            let truncated = step.truncated && stop_on_truncation;
            if step.terminated || truncated || capped {
                return Ok(EpisodeOutcome {
                    steps,
                    final_reward: step.reward,
                    discounted_return,
                    terminated: step.terminated,
                });
            }
        }
    }
}

/// Q-Learning agent bound to the environment it trains on
pub struct QLearningAgent<E> {
    env: E,
    learner: Learner,
    log_interval: usize,
}

impl<E: Environment> QLearningAgent<E> {
    /// Create an agent with a zero-initialized value table sized from `env`
    pub fn new(env: E, config: AgentConfig) -> Result<Self> {
        let table = QTable::new(env.observation_space_size(), env.action_space_size());
        Self::with_table(env, config, table)
    }

    /// Create an agent that continues from an existing value table
    pub fn with_table(env: E, config: AgentConfig, table: QTable) -> Result<Self> {
        config.validate()?;

        let (num_states, num_actions) = (env.observation_space_size(), env.action_space_size());
        if num_states == 0 || num_actions == 0 {
            return Err(QLearnError::InvalidConfig(format!(
                "environment must have at least one state and one action, got {num_states}x{num_actions}"
            )));
        }

        let learner = Learner {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            q_table: table,
        };
        learner.check_spaces(&env)?;

        info!(
            "Q-learning agent initialized: {}x{} table, eps={}, gamma={}, stepsize={}, seed={}",
            num_states,
            num_actions,
            learner.config.eps,
            learner.config.gamma,
            learner.config.stepsize,
            learner.config.seed
        );

        Ok(Self {
            env,
            learner,
            log_interval: DEFAULT_LOG_INTERVAL,
        })
    }

    /// Log training progress every `interval` episodes (0 disables)
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.learner.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.learner.q_table
    }

    pub fn num_states(&self) -> usize {
        self.learner.q_table.num_states()
    }

    pub fn num_actions(&self) -> usize {
        self.learner.q_table.num_actions()
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Action with the highest value in `state`, lowest index on ties
    pub fn greedy(&self, state: StateIndex) -> Result<ActionIndex> {
        self.learner.greedy(state)
    }

    /// Uniform random action with probability `eps`, greedy otherwise
    pub fn eps_greedy(&mut self, state: StateIndex) -> Result<ActionIndex> {
        self.learner.eps_greedy(state)
    }

    /// Apply one Q-Learning update and return the new `Q[state, action]`
    ///
    /// `Q[s,a] += stepsize * (reward + gamma * max_b Q[s',b] - Q[s,a])`
    pub fn update(
        &mut self,
        state: StateIndex,
        action: ActionIndex,
        reward: Reward,
        next_state: StateIndex,
    ) -> Result<f64> {
        self.learner.update(state, action, reward, next_state)
    }

    /// Greedy action for every state
    pub fn policy(&self) -> Vec<ActionIndex> {
        (0..self.num_states())
            .map(|s| self.learner.q_table.argmax(s).unwrap_or(0))
            .collect()
    }

    /// Run one learning episode on the agent's own environment
    pub fn run_episode(&mut self) -> Result<EpisodeOutcome> {
        self.learner.run_episode(&mut self.env)
    }

    /// Run one learning episode on another environment with the same spaces
    pub fn run_episode_on<W: Environment + ?Sized>(
        &mut self,
        env: &mut W,
    ) -> Result<EpisodeOutcome> {
        self.learner.check_spaces(env)?;
        self.learner.run_episode(env)
    }

    /// Run exactly `num_episodes` episodes, recording one row per episode
    pub fn train(&mut self, num_episodes: usize) -> Result<TrainingRecord> {
        let mut record = TrainingRecord::with_capacity(num_episodes);
        info!("Training for {} episodes (run {})", num_episodes, record.run_id);

        for episode in 0..num_episodes {
            let outcome = self.run_episode()?;
            record.push(&outcome);

            if self.log_interval > 0 && (episode + 1) % self.log_interval == 0 {
                let summary = record.summary(Some(self.log_interval));
                info!(
                    "Episode {}/{}: mean_steps={:.2}, success_rate={:.3}",
                    episode + 1,
                    num_episodes,
                    summary.mean_steps,
                    summary.success_rate
                );
            }
        }

        record.finish();
        debug!("Training complete: {} episodes recorded", record.len());
        Ok(record)
    }

    /// Play one greedy episode on a freshly built, human-rendered environment
    ///
    /// The value table is not modified. Returns the final reward.
    pub fn watch<W, F>(&self, make_env: F, options: &WatchOptions) -> Result<Reward>
    where
        W: Environment,
        F: FnOnce(RenderMode) -> Result<W>,
    {
        let mut env = make_env(RenderMode::Human)?;
        self.learner.check_spaces(&env)?;

        let played = self.learner.play_greedy(
            &mut env,
            self.learner.config.seed,
            Some(options.step_delay),
            options.max_steps,
            self.learner.config.stop_on_truncation,
        );
        let closed = env.close();
        let outcome = played?;
        closed?;

        info!(
            "Playback finished after {} steps with final reward {}",
            outcome.steps, outcome.final_reward
        );
        Ok(outcome.final_reward)
    }

    /// Greedy evaluation over `episodes` resets seeded `seed, seed + 1, ...`
    ///
    /// A fixed greedy policy can cycle forever, so evaluation episodes always
    /// end on `truncated` as well as on the configured step cap.
    pub fn evaluate<W: Environment + ?Sized>(
        &self,
        env: &mut W,
        episodes: usize,
    ) -> Result<TrainingSummary> {
        self.learner.check_spaces(env)?;

        let mut record = TrainingRecord::with_capacity(episodes);
        for i in 0..episodes {
            let seed = self.learner.config.seed.wrapping_add(i as u64);
            let outcome = self.learner.play_greedy(
                env,
                seed,
                None,
                self.learner.config.max_steps_per_episode,
                true,
            )?;
            record.push(&outcome);
        }
        record.finish();
        Ok(record.summary(None))
    }

    /// Release the agent's environment
    pub fn close(&mut self) -> Result<()> {
        self.env.close()
    }

    /// Split into the environment and the learned table
    pub fn into_parts(self) -> (E, QTable) {
        (self.env, self.learner.q_table)
    }
}
