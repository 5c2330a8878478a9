//! FrozenLake grid world
//!
//! The agent walks from `S` to `G` across frozen tiles `F` without falling
//! into a hole `H`. On a slippery lake the move goes in the intended
//! direction or one of the two perpendicular directions, each with
//! probability 1/3.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use qlearn_core::{
    ActionIndex, Environment, Info, QLearnError, RenderMode, Reset, Result, StateIndex, Step,
};

pub const LEFT: ActionIndex = 0;
pub const DOWN: ActionIndex = 1;
pub const RIGHT: ActionIndex = 2;
pub const UP: ActionIndex = 3;

const NUM_ACTIONS: usize = 4;

pub const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

pub const MAP_8X8: [&str; 8] = [
    "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF",
    "FFFHFFFG",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Start,
    Frozen,
    Hole,
    Goal,
}

impl Tile {
    fn parse(c: char) -> Option<Self> {
        match c {
            'S' => Some(Tile::Start),
            'F' => Some(Tile::Frozen),
            'H' => Some(Tile::Hole),
            'G' => Some(Tile::Goal),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Tile::Start => 'S',
            Tile::Frozen => 'F',
            Tile::Hole => 'H',
            Tile::Goal => 'G',
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Tile::Hole | Tile::Goal)
    }
}

fn action_name(action: ActionIndex) -> &'static str {
    match action {
        LEFT => "Left",
        DOWN => "Down",
        RIGHT => "Right",
        UP => "Up",
        _ => "?",
    }
}

pub struct FrozenLake {
    tiles: Vec<Tile>,
    nrow: usize,
    ncol: usize,
    start: StateIndex,
    is_slippery: bool,
    render_mode: RenderMode,
    rng: StdRng,
    position: Option<StateIndex>,
    last_action: Option<ActionIndex>,
}

impl FrozenLake {
    /// Build a lake from rows of `S`, `F`, `H` and `G`
    pub fn new<S: AsRef<str>>(map: &[S], is_slippery: bool, render_mode: RenderMode) -> Result<Self> {
        let nrow = map.len();
        let ncol = map.first().map_or(0, |row| row.as_ref().chars().count());
        if nrow == 0 || ncol == 0 {
            return Err(QLearnError::InvalidConfig("map must not be empty".to_string()));
        }

        let mut tiles = Vec::with_capacity(nrow * ncol);
        for (r, row) in map.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != ncol {
                return Err(QLearnError::InvalidConfig(format!(
                    "map row {r} has {} tiles, expected {ncol}",
                    row.chars().count()
                )));
            }
            for c in row.chars() {
                let tile = Tile::parse(c).ok_or_else(|| {
                    QLearnError::InvalidConfig(format!("unknown tile '{c}' in map row {r}"))
                })?;
                tiles.push(tile);
            }
        }

        let starts: Vec<StateIndex> = tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Tile::Start)
            .map(|(i, _)| i)
            .collect();
        if starts.len() != 1 {
            return Err(QLearnError::InvalidConfig(format!(
                "map must contain exactly one start tile, found {}",
                starts.len()
            )));
        }
        if !tiles.contains(&Tile::Goal) {
            return Err(QLearnError::InvalidConfig(
                "map must contain a goal tile".to_string(),
            ));
        }

        Ok(Self {
            tiles,
            nrow,
            ncol,
            start: starts[0],
            is_slippery,
            render_mode,
            rng: StdRng::from_entropy(),
            position: None,
            last_action: None,
        })
    }

    /// The standard 4x4 lake
    pub fn four_by_four(is_slippery: bool, render_mode: RenderMode) -> Result<Self> {
        Self::new(&MAP_4X4, is_slippery, render_mode)
    }

    /// The standard 8x8 lake
    pub fn eight_by_eight(is_slippery: bool, render_mode: RenderMode) -> Result<Self> {
        Self::new(&MAP_8X8, is_slippery, render_mode)
    }

    pub fn nrow(&self) -> usize {
        self.nrow
    }

    pub fn ncol(&self) -> usize {
        self.ncol
    }

    pub fn is_slippery(&self) -> bool {
        self.is_slippery
    }

    /// Current agent position, `None` before the first reset
    pub fn position(&self) -> Option<StateIndex> {
        self.position
    }

    pub fn tile(&self, state: StateIndex) -> Option<Tile> {
        self.tiles.get(state).copied()
    }

    fn move_from(&self, state: StateIndex, action: ActionIndex) -> StateIndex {
        let (mut row, mut col) = (state / self.ncol, state % self.ncol);
        match action {
            LEFT => col = col.saturating_sub(1),
            DOWN => row = (row + 1).min(self.nrow - 1),
            RIGHT => col = (col + 1).min(self.ncol - 1),
            UP => row = row.saturating_sub(1),
            _ => {}
        }
        row * self.ncol + col
    }

    /// Text picture of the lake with the agent's tile bracketed
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if let Some(action) = self.last_action {
            out.push_str(&format!("  ({})\n", action_name(action)));
        }
        for r in 0..self.nrow {
            for c in 0..self.ncol {
                let idx = r * self.ncol + c;
                let ch = self.tiles[idx].as_char();
                if self.position == Some(idx) {
                    out.push_str(&format!("[{ch}]"));
                } else {
                    out.push_str(&format!(" {ch} "));
                }
            }
            out.push('\n');
        }
        out
    }

    fn render(&self) {
        if self.render_mode == RenderMode::Human {
            println!("{}", self.render_text());
        }
    }
}

impl fmt::Debug for FrozenLake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenLake")
            .field("nrow", &self.nrow)
            .field("ncol", &self.ncol)
            .field("is_slippery", &self.is_slippery)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl Environment for FrozenLake {
    fn observation_space_size(&self) -> usize {
        self.tiles.len()
    }

    fn action_space_size(&self) -> usize {
        NUM_ACTIONS
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<Reset> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.position = Some(self.start);
        self.last_action = None;
        self.render();

        let mut info = Info::new();
        info.insert("prob".to_string(), json!(1.0));
        Ok(Reset {
            state: self.start,
            info,
        })
    }

    fn step(&mut self, action: ActionIndex) -> Result<Step> {
        let state = self.position.ok_or(QLearnError::NotReset)?;
        if action >= NUM_ACTIONS {
            return Err(QLearnError::InvalidAction {
                action,
                num_actions: NUM_ACTIONS,
            });
        }

        // Terminal tiles absorb
        if self.tiles[state].is_terminal() {
            self.last_action = Some(action);
            return Ok(Step::new(state, 0.0, true));
        }

        let (direction, prob) = if self.is_slippery {
            let offset = self.rng.gen_range(0..3);
            ((action + NUM_ACTIONS - 1 + offset) % NUM_ACTIONS, 1.0 / 3.0)
        } else {
            (action, 1.0)
        };

        let next_state = self.move_from(state, direction);
        let tile = self.tiles[next_state];
        let reward = if tile == Tile::Goal { 1.0 } else { 0.0 };

        self.position = Some(next_state);
        self.last_action = Some(action);
        self.render();

        let mut step = Step::new(next_state, reward, tile.is_terminal());
        step.info.insert("prob".to_string(), json!(prob));
        Ok(step)
    }
}
