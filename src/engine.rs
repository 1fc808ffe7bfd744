//! Agent configuration and the minimax player.
//!
//! The agent never touches the caller's board: it searches on its own copy and hands the
//! chosen move back, leaving it to the caller to commit it.

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::Board;
use crate::error::ChessError;
use crate::search::{search_root, SearchResult};
use crate::types::{Color, Move};

/// Search options for the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum search depth (ply)
    pub max_depth: u8,
    /// Seed for the move shuffling, random when unset
    pub seed: Option<u64>,
    pub use_ab_pruning: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_depth: 2,
            seed: None,
            use_ab_pruning: true,
        }
    }
}

impl SearchOptions {
    pub fn with_depth(depth: u8) -> Self {
        Self {
            max_depth: depth,
            ..Default::default()
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn without_pruning(self) -> Self {
        Self {
            use_ab_pruning: false,
            ..self
        }
    }
}

/// Difficulty of the one-player game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Level {
    One,
    #[default]
    Two,
    Three,
}

impl Level {
    pub fn depth(&self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
            Level::Three => 3,
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::with_depth(self.depth())
    }
}

/// Plays one side of the game with a fixed-depth minimax search
pub struct MinimaxAgent {
    color: Color,
    options: SearchOptions,
    rng: StdRng,
}

impl MinimaxAgent {
    pub fn new(color: Color, options: SearchOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            color,
            options,
            rng,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Run the search for the agent's side on a copy of `board`
    pub fn search(&mut self, board: &Board) -> Result<SearchResult, ChessError> {
        let mut board = board.clone();
        search_root(
            &mut board,
            self.color,
            self.options.max_depth,
            self.options.use_ab_pruning,
            &mut self.rng,
        )
    }

    /// The move the agent wants to play. The board is left as it was.
    pub fn choose_move(&mut self, board: &Board) -> Result<Move, ChessError> {
        self.search(board)?
            .best_move
            .ok_or(ChessError::NoLegalMoves(self.color))
    }
}
