use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::Board;
use crate::error::ChessError;
use crate::evaluate::evaluate_board;
use crate::types::{Color, Move};

pub const MIN_SCORE: i32 = -1_000_000_000;
pub const MAX_SCORE: i32 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// None at leaves and terminal nodes
    pub best_move: Option<Move>,
    /// Evaluation from white's point of view
    pub best_score: i32,
    pub nodes_searched: u64,
}

impl SearchResult {
    fn leaf(score: i32) -> SearchResult {
        SearchResult {
            best_move: None,
            best_score: score,
            nodes_searched: 1,
        }
    }
}

/// Minimax search with alpha-beta pruning, `color` moving first.
///
/// Moves are shuffled with `rng` before they are tried, so among equally scored moves the
/// one picked depends on the rng state. The board is restored before returning.
pub fn minimax<R: Rng>(
    board: &mut Board,
    color: Color,
    max_depth: u8,
    rng: &mut R,
) -> Result<SearchResult, ChessError> {
    search_root(board, color, max_depth, true, rng)
}

/// Full minimax without pruning. Returns the same score as [`minimax`], visiting more nodes.
pub fn minimax_no_pruning<R: Rng>(
    board: &mut Board,
    color: Color,
    max_depth: u8,
    rng: &mut R,
) -> Result<SearchResult, ChessError> {
    search_root(board, color, max_depth, false, rng)
}

pub fn search_root<R: Rng>(
    board: &mut Board,
    color: Color,
    max_depth: u8,
    use_ab_pruning: bool,
    rng: &mut R,
) -> Result<SearchResult, ChessError> {
    if max_depth == 0 {
        return Err(ChessError::InvalidDepth(max_depth));
    }
    if !board.has_legal_move(color) {
        return Err(ChessError::NoLegalMoves(color));
    }

    let mut search = Search {
        max_depth,
        use_ab_pruning,
        rng,
    };
    let result = search.minimax_mut(board, color, 0, MIN_SCORE, MAX_SCORE);

    if let Some(mv) = result.best_move {
        debug!(
            "search depth {} picked {} for {}: score {}, {} nodes",
            max_depth,
            mv.to_uci(),
            color.to_human(),
            result.best_score,
            result.nodes_searched
        );
    }
    Ok(result)
}

struct Search<'a, R: Rng> {
    max_depth: u8,
    use_ab_pruning: bool,
    rng: &'a mut R,
}

impl<'a, R: Rng> Search<'a, R> {
    fn minimax_mut(
        &mut self,
        board: &mut Board,
        color: Color,
        depth: u8,
        alpha: i32,
        beta: i32,
    ) -> SearchResult {
        if depth >= self.max_depth {
            return SearchResult::leaf(evaluate_board(board));
        }

        // a finished game is scored like any leaf, mate or stalemate alike
        let mut legal_moves = board.all_legal_moves(color);
        if legal_moves.is_empty() || (depth > 0 && !board.has_legal_move(color.other_color())) {
            return SearchResult::leaf(evaluate_board(board));
        }

        legal_moves.shuffle(&mut *self.rng);

        let maximizing = color == Color::White;
        let (mut alpha, mut beta) = (alpha, beta);
        let mut best_move = None;
        let mut best_score = if maximizing { MIN_SCORE } else { MAX_SCORE };
        let mut total_nodes_searched = 0;

        for mv in &legal_moves {
            let child = board.simulate(mv, |board| {
                self.minimax_mut(board, color.other_color(), depth + 1, alpha, beta)
            });
            total_nodes_searched += child.nodes_searched;
            let evaluation = child.best_score;

            if maximizing {
                if evaluation > best_score {
                    best_score = evaluation;
                    best_move = Some(*mv);
                }
                alpha = alpha.max(evaluation);
            } else {
                if evaluation < best_score {
                    best_score = evaluation;
                    best_move = Some(*mv);
                }
                beta = beta.min(evaluation);
            }

            // the opponent would never allow this line, skip the remaining siblings
            if self.use_ab_pruning && beta <= alpha {
                break;
            }
        }

        SearchResult {
            best_move,
            best_score,
            nodes_searched: total_nodes_searched,
        }
    }
}
