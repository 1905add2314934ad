//! Container behaviour knobs.

use serde::{Deserialize, Serialize};

/// What `move_item(i, i)` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoopMoves {
    /// Emit nothing and report that no move happened.
    #[default]
    Suppress,
    /// Emit `moving`/`moved` with `index == new_index`.
    Emit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventedConfig {
    pub noop_moves: NoopMoves,
    /// Clamp out-of-range insert positions to `[0, len]` instead of failing.
    pub clamp_insert: bool,
}

impl EventedConfig {
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn with_noop_moves(mut self, noop_moves: NoopMoves) -> Self {
        self.noop_moves = noop_moves;
        self
    }

    pub fn with_clamp_insert(mut self, clamp_insert: bool) -> Self {
        self.clamp_insert = clamp_insert;
        self
    }
}
