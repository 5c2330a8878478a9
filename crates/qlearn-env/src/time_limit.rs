//! Episode step limit wrapper

use qlearn_core::{ActionIndex, Environment, Reset, Result, Step};

/// Reports `truncated` once an episode has run `max_episode_steps` steps
#[derive(Debug)]
pub struct TimeLimit<E> {
    inner: E,
    max_episode_steps: usize,
    elapsed_steps: usize,
}

impl<E: Environment> TimeLimit<E> {
    pub fn new(inner: E, max_episode_steps: usize) -> Self {
        Self {
            inner,
            max_episode_steps,
            elapsed_steps: 0,
        }
    }

    pub fn max_episode_steps(&self) -> usize {
        self.max_episode_steps
    }

    /// Steps taken since the last reset
    pub fn elapsed_steps(&self) -> usize {
        self.elapsed_steps
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Environment> Environment for TimeLimit<E> {
    fn observation_space_size(&self) -> usize {
        self.inner.observation_space_size()
    }

    fn action_space_size(&self) -> usize {
        self.inner.action_space_size()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Reset> {
        self.elapsed_steps = 0;
        self.inner.reset(seed)
    }

    fn step(&mut self, action: ActionIndex) -> Result<Step> {
        let mut step = self.inner.step(action)?;
        self.elapsed_steps += 1;
        if self.elapsed_steps >= self.max_episode_steps {
            step.truncated = true;
        }
        Ok(step)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
