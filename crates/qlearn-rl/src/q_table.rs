//! Dense state-action value table

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use qlearn_core::{ActionIndex, QLearnError, Result, StateIndex};

/// Q-table holding one value per `(state, action)` pair
///
/// The shape is fixed at construction. Every access is bounds-checked and
/// reports the offending index instead of panicking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    values: Array2<f64>,
}

impl QTable {
    /// Create a zero-initialized table
    pub fn new(num_states: usize, num_actions: usize) -> Self {
        Self {
            values: Array2::zeros((num_states, num_actions)),
        }
    }

    /// `(num_states, num_actions)`
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn num_states(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_actions(&self) -> usize {
        self.values.ncols()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: StateIndex, action: ActionIndex) -> Result<f64> {
        self.check(state, action)?;
        Ok(self.values[[state, action]])
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: StateIndex, action: ActionIndex, value: f64) -> Result<()> {
        self.check(state, action)?;
        self.values[[state, action]] = value;
        Ok(())
    }

    /// All action values for one state
    pub fn row(&self, state: StateIndex) -> Result<ArrayView1<'_, f64>> {
        self.check_state(state)?;
        Ok(self.values.row(state))
    }

    /// Maximum action value in a state
    pub fn max_value(&self, state: StateIndex) -> Result<f64> {
        let row = self.row(state)?;
        Ok(row.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Index of the maximum action value in a state
    ///
    /// Ties resolve to the lowest action index.
    pub fn argmax(&self, state: StateIndex) -> Result<ActionIndex> {
        let row = self.row(state)?;
        let mut best = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (action, &value) in row.iter().enumerate() {
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        Ok(best)
    }

    /// Whether every entry is a finite number
    pub fn is_all_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Borrow the underlying array
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Write the table as JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read a table previously written by [`QTable::save_json`]
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let table: Self = serde_json::from_reader(reader)?;
        Ok(table)
    }

    fn check_state(&self, state: StateIndex) -> Result<()> {
        if state >= self.num_states() {
            return Err(QLearnError::InvalidState {
                state,
                num_states: self.num_states(),
            });
        }
        Ok(())
    }

    fn check(&self, state: StateIndex, action: ActionIndex) -> Result<()> {
        self.check_state(state)?;
        if action >= self.num_actions() {
            return Err(QLearnError::InvalidAction {
                action,
                num_actions: self.num_actions(),
            });
        }
        Ok(())
    }
}

impl From<Array2<f64>> for QTable {
    fn from(values: Array2<f64>) -> Self {
        Self { values }
    }
}
