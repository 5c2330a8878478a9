//! Integration tests for the Q-Learning agent
//!
//! These tests drive the agent against small hand-written environments and
//! the FrozenLake reference environment.

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

use std::time::Duration;

use qlearn_core::{ActionIndex, Environment, QLearnError, RenderMode, Reset, Result, Step};
use qlearn_env::{make, FrozenLakeOptions, FROZEN_LAKE};
use qlearn_rl::{AgentConfig, QLearningAgent, QTable, WatchOptions};

/// Four states in a row. Action 0 moves right with reward 1 and
/// terminates on reaching state 3; action 1 stays put with reward 0.
struct Chain {
    state: Option<usize>,
}

impl Chain {
    fn new() -> Self {
        Self { state: None }
    }
}

impl Environment for Chain {
    fn observation_space_size(&self) -> usize {
        4
    }

    fn action_space_size(&self) -> usize {
        2
    }

    fn reset(&mut self, _seed: Option<u64>) -> Result<Reset> {
        self.state = Some(0);
        Ok(Reset::new(0))
    }

    fn step(&mut self, action: ActionIndex) -> Result<Step> {
        let state = self.state.ok_or(QLearnError::NotReset)?;
        let step = match action {
            0 => {
                let next = state + 1;
                Step::new(next, 1.0, next == 3)
            }
            1 => Step::new(state, 0.0, false),
            _ => {
                return Err(QLearnError::InvalidAction {
                    action,
                    num_actions: 2,
                })
            }
        };
        self.state = Some(step.next_state);
        Ok(step)
    }
}

/// Chain that fails once it has been stepped `fail_after` times in total
struct FlakyChain {
    inner: Chain,
    steps: usize,
    fail_after: usize,
}

impl Environment for FlakyChain {
    fn observation_space_size(&self) -> usize {
        self.inner.observation_space_size()
    }

    fn action_space_size(&self) -> usize {
        self.inner.action_space_size()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Reset> {
        self.inner.reset(seed)
    }

    fn step(&mut self, action: ActionIndex) -> Result<Step> {
        if self.steps >= self.fail_after {
            return Err(QLearnError::Environment("simulator crashed".to_string()));
        }
        self.steps += 1;
        self.inner.step(action)
    }
}

fn frozen_lake() -> impl Environment {
    make(FROZEN_LAKE, &FrozenLakeOptions::default(), RenderMode::None).unwrap()
}

#[test]
fn test_shape_invariant() {
    let agent = QLearningAgent::new(frozen_lake(), AgentConfig::default()).unwrap();
    let table = agent.q_table();

    assert_eq!(table.shape(), (16, 4));
    assert_eq!(table.len(), 16 * 4);
    assert!(table.values().iter().all(|&v| v == 0.0));
}

#[test]
fn test_greedy_determinism() {
    let mut table = QTable::new(4, 2);
    table.set(1, 1, 0.5).unwrap();
    table.set(2, 0, 0.3).unwrap();
    table.set(2, 1, 0.3).unwrap();
    let agent = QLearningAgent::with_table(Chain::new(), AgentConfig::default(), table).unwrap();

    assert_eq!(agent.greedy(1).unwrap(), 1);
    for _ in 0..20 {
        assert_eq!(agent.greedy(2).unwrap(), 0);
        assert_eq!(agent.greedy(0).unwrap(), 0);
    }
}

#[test]
fn test_full_exploration_is_uniform() {
    let config = AgentConfig::default().with_eps(1.0).with_seed(7);
    let mut agent = QLearningAgent::new(frozen_lake(), config).unwrap();

    let draws = 40_000;
    let mut counts = [0usize; 4];
    for _ in 0..draws {
        counts[agent.eps_greedy(0).unwrap()] += 1;
    }

    let expected = draws as f64 / 4.0;
    for (action, &count) in counts.iter().enumerate() {
        let deviation = (count as f64 - expected).abs() / expected;
        assert!(
            deviation < 0.05,
            "action {action} drawn {count} times, expected about {expected}"
        );
    }
}

#[test]
fn test_no_exploration_is_greedy() {
    let config = AgentConfig::default().with_eps(0.0);
    let mut table = QTable::new(16, 4);
    table.set(0, 2, 0.1).unwrap();
    table.set(5, 3, 0.4).unwrap();
    let mut agent = QLearningAgent::with_table(frozen_lake(), config, table).unwrap();

    for state in [0, 5, 9] {
        for _ in 0..50 {
            assert_eq!(agent.eps_greedy(state).unwrap(), agent.greedy(state).unwrap());
        }
    }
}

#[test]
fn test_update_matches_closed_form() {
    let config = AgentConfig::default().with_gamma(0.95).with_stepsize(0.05);
    let mut table = QTable::new(4, 2);
    table.set(1, 0, 0.6).unwrap();
    table.set(2, 0, 0.2).unwrap();
    table.set(2, 1, 0.9).unwrap();
    let mut agent = QLearningAgent::with_table(Chain::new(), config, table).unwrap();

    let q_sa = 0.6;
    let max_next = 0.9;
    let expected = q_sa + 0.05 * (1.0 + 0.95 * max_next - q_sa);

    agent.update(1, 0, 1.0, 2).unwrap();
    assert!((agent.q_table().get(1, 0).unwrap() - expected).abs() < 1e-12);
    // Only the updated cell changes
    assert_eq!(agent.q_table().get(2, 1).unwrap(), 0.9);
}

#[test]
fn test_train_returns_one_record_per_episode() {
    let mut agent = QLearningAgent::new(frozen_lake(), AgentConfig::default()).unwrap();
    let record = agent.train(250).unwrap();

    assert_eq!(record.len(), 250);
    for (i, row) in record.iter().enumerate() {
        assert_eq!(row.episode, i);
        assert!(row.steps >= 1);
        assert!(row.final_reward == 0.0 || row.final_reward == 1.0);
    }
    assert!(record.finished_at.is_some());
    assert!(agent.q_table().is_all_finite());
}

#[test]
fn test_train_zero_episodes() {
    let mut agent = QLearningAgent::new(Chain::new(), AgentConfig::default()).unwrap();
    let record = agent.train(0).unwrap();
    assert!(record.is_empty());
}

#[test]
fn test_training_is_reproducible() {
    let config = AgentConfig::default().with_seed(1234);
    let mut a = QLearningAgent::new(frozen_lake(), config.clone()).unwrap();
    let mut b = QLearningAgent::new(frozen_lake(), config).unwrap();

    let record_a = a.train(300).unwrap();
    let record_b = b.train(300).unwrap();

    assert_eq!(a.q_table(), b.q_table());
    assert_eq!(record_a.episodes(), record_b.episodes());
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = QLearningAgent::new(frozen_lake(), AgentConfig::default().with_seed(1)).unwrap();
    let mut b = QLearningAgent::new(frozen_lake(), AgentConfig::default().with_seed(2)).unwrap();

    let record_a = a.train(200).unwrap();
    let record_b = b.train(200).unwrap();

    assert_ne!(record_a.episodes(), record_b.episodes());
}

#[test]
fn test_chain_learns_to_move_forward() {
    let mut agent = QLearningAgent::new(Chain::new(), AgentConfig::default()).unwrap();
    agent.train(300).unwrap();

    for state in 0..3 {
        assert_eq!(agent.greedy(state).unwrap(), 0, "state {state}");
    }
    assert_eq!(&agent.policy()[..3], &[0, 0, 0]);
}

#[test]
fn test_chain_episode_outcome() {
    let config = AgentConfig::default().with_eps(0.0).with_gamma(0.5);
    let mut agent = QLearningAgent::new(Chain::new(), config).unwrap();

    // Zero table: greedy walks straight to the end
    let outcome = agent.run_episode().unwrap();
    assert_eq!(outcome.steps, 3);
    assert_eq!(outcome.final_reward, 1.0);
    assert!((outcome.discounted_return - 1.75).abs() < 1e-12);
    assert!(outcome.terminated);
}

#[test]
fn test_environment_failure_keeps_partial_updates() {
    let env = FlakyChain {
        inner: Chain::new(),
        steps: 0,
        fail_after: 2,
    };
    let config = AgentConfig::default().with_eps(0.0);
    let mut agent = QLearningAgent::new(env, config).unwrap();

    let err = agent.run_episode().unwrap_err();
    assert!(matches!(err, QLearnError::Environment(_)));

    // The two completed transitions were applied
    assert!(agent.q_table().get(0, 0).unwrap() > 0.0);
    assert!(agent.q_table().get(1, 0).unwrap() > 0.0);
    assert_eq!(agent.q_table().get(2, 0).unwrap(), 0.0);

    // Training surfaces the same failure
    assert!(agent.train(5).is_err());
}

#[test]
fn test_episode_runs_past_time_limit() {
    // Greedy on a zero table walks left into the wall forever
    let config = AgentConfig::default()
        .with_eps(0.0)
        .with_max_steps_per_episode(150);
    let options = FrozenLakeOptions {
        is_slippery: false,
        map: None,
    };
    let env = make(FROZEN_LAKE, &options, RenderMode::None).unwrap();
    let mut agent = QLearningAgent::new(env, config).unwrap();

    let outcome = agent.run_episode().unwrap();
    assert_eq!(outcome.steps, 150);
    assert!(!outcome.terminated);
}

#[test]
fn test_time_limit_ends_episode_when_enabled() {
    let config = AgentConfig::default()
        .with_eps(0.0)
        .with_stop_on_truncation(true);
    let options = FrozenLakeOptions {
        is_slippery: false,
        map: None,
    };
    let env = make(FROZEN_LAKE, &options, RenderMode::None).unwrap();
    let mut agent = QLearningAgent::new(env, config).unwrap();

    let outcome = agent.run_episode().unwrap();
    assert_eq!(outcome.steps, 100);
    assert!(!outcome.terminated);
}

#[test]
fn test_run_episode_on_fresh_env() {
    let mut agent = QLearningAgent::new(Chain::new(), AgentConfig::default()).unwrap();
    let mut other = Chain::new();

    let outcome = agent.run_episode_on(&mut other).unwrap();
    assert!(outcome.terminated);
    assert_eq!(other.state, Some(3));
}

#[test]
fn test_watch_after_training_on_frozen_lake() {
    let options = FrozenLakeOptions {
        is_slippery: false,
        map: None,
    };
    let env = make(FROZEN_LAKE, &options, RenderMode::None).unwrap();
    let config = AgentConfig::default().with_eps(0.3).with_stepsize(0.5);
    let mut agent = QLearningAgent::new(env, config).unwrap();
    agent.train(2000).unwrap();
    agent.close().unwrap();

    let before = agent.q_table().clone();
    let watch = WatchOptions {
        step_delay: Duration::ZERO,
        max_steps: Some(100),
    };
    let reward = agent
        .watch(|mode| make(FROZEN_LAKE, &options, mode), &watch)
        .unwrap();

    assert_eq!(reward, 1.0);
    assert_eq!(agent.q_table(), &before);
}

#[test]
fn test_evaluate_summary() {
    let mut agent = QLearningAgent::new(frozen_lake(), AgentConfig::default()).unwrap();
    agent.train(100).unwrap();

    let mut env = frozen_lake();
    let summary = agent.evaluate(&mut env, 20).unwrap();
    assert_eq!(summary.episodes, 20);
    assert!((0.0..=1.0).contains(&summary.success_rate));
}

#[test]
fn test_resume_from_saved_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q.json");

    let mut agent = QLearningAgent::new(Chain::new(), AgentConfig::default()).unwrap();
    agent.train(50).unwrap();
    agent.q_table().save_json(&path).unwrap();

    let table = QTable::load_json(&path).unwrap();
    let resumed = QLearningAgent::with_table(Chain::new(), AgentConfig::default(), table).unwrap();
    assert_eq!(resumed.q_table(), agent.q_table());
    assert_eq!(resumed.policy(), agent.policy());

    let too_big = QTable::new(16, 4);
    assert!(matches!(
        QLearningAgent::with_table(Chain::new(), AgentConfig::default(), too_big),
        Err(QLearnError::ShapeMismatch { .. })
    ));
}
