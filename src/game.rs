//! A game between two sides, human or agent, on top of the rules engine.
//!
//! `Game` is the surface a presentation layer talks to: it answers which squares a piece
//! may go to, validates and commits moves, reports the game status, and asks the agent for
//! moves without committing them.

use log::{info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bitboard::SquareSet;
use crate::board::Board;
use crate::engine::{MinimaxAgent, SearchOptions};
use crate::error::ChessError;
use crate::types::{Color, Move, MoveFlag, PieceType, Square, Status};

/// What happened to a move attempt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub accepted: bool,
    /// The committed move
    pub mv: Option<Move>,
    pub captured: Option<PieceType>,
    /// Castling, en passant or promotion
    pub special: Option<MoveFlag>,
    /// Is the side now to move in check
    pub in_check: bool,
    pub checkmate: bool,
    /// Any draw: no legal moves without check, or bare kings
    pub stalemate: bool,
}

impl MoveOutcome {
    fn rejected() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStatus {
    pub side_to_move: Color,
    pub in_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    /// Ply counter, starting at 1
    pub turn_number: u32,
}

pub struct Game {
    board: Board,
    history: Vec<Move>,
    result: Option<Status>,
    rng: StdRng,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_board(Board::new(), StdRng::from_entropy())
    }

    /// A game whose agent moves are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::from_board(Board::new(), StdRng::seed_from_u64(seed))
    }

    pub fn from_fen(fen: &str, seed: u64) -> Result<Self, ChessError> {
        let board = Board::from_fen(fen)?;
        Ok(Self::from_board(board, StdRng::seed_from_u64(seed)))
    }

    fn from_board(board: Board, rng: StdRng) -> Self {
        Self {
            board,
            history: Vec::new(),
            result: None,
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Moves committed so far
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn result(&self) -> Option<Status> {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.board.is_game_over()
    }

    /// Legal destinations of the piece on `square`. Empty unless the square holds a piece of
    /// the side to move and the game is still running.
    pub fn legal_moves_for(&mut self, square: Square) -> SquareSet {
        if self.board.is_game_over() {
            return SquareSet::EMPTY;
        }
        match self.board.piece_at(square) {
            Some(id) if self.board.piece(id).color == self.board.side_to_move() => {
                self.board.legal_targets(id)
            }
            _ => SquareSet::EMPTY,
        }
    }

    /// Validate the move from `from` to `to` and commit it if it is legal.
    ///
    /// A rejected attempt leaves the board as it was. After a committed move the outcome
    /// reports the status of the side now to move; checkmate and draws end the game.
    pub fn attempt_move(&mut self, from: Square, to: Square) -> MoveOutcome {
        if self.board.is_game_over() {
            trace!("rejected {}{}: the game is over", from, to);
            return MoveOutcome::rejected();
        }
        let Some(id) = self.board.piece_at(from) else {
            trace!("rejected {}{}: no piece on {}", from, to, from);
            return MoveOutcome::rejected();
        };
        let color = self.board.piece(id).color;
        if color != self.board.side_to_move() {
            trace!("rejected {}{}: not {}'s turn", from, to, color.to_human());
            return MoveOutcome::rejected();
        }
        if !self.board.is_legal_move(id, to) {
            trace!("rejected {}{}: illegal move", from, to);
            return MoveOutcome::rejected();
        }
        match self.board.build_move(id, to) {
            Some(mv) => self.commit(mv),
            None => MoveOutcome::rejected(),
        }
    }

    /// Commit a move produced by the agent or by move generation
    pub fn play_move(&mut self, mv: &Move) -> MoveOutcome {
        self.attempt_move(mv.from, mv.to)
    }

    fn commit(&mut self, mv: Move) -> MoveOutcome {
        let mover = self.board.piece(mv.piece).color;
        let captured = mv.captured.map(|id| self.board.piece(id).piece_type);
        let special = match mv.move_flag {
            MoveFlag::Regular => None,
            flag => Some(flag),
        };

        info!("{}", self.board.describe_move(&mv));
        self.board.apply_move(&mv);
        self.history.push(mv);

        let opponent = mover.other_color();
        let in_check = self.board.is_king_in_check(opponent);
        let checkmate = self.board.is_checkmate(opponent);
        let stalemate = !checkmate && self.board.is_stalemate(opponent);

        if checkmate {
            info!("checkmate, {} wins", mover.to_human());
            self.board.mark_checkmated(opponent);
            self.result = Some(Status::Checkmate(mover));
        } else if stalemate {
            let status = if self.board.only_kings_remain() {
                Status::InsufficientMaterial
            } else {
                Status::Stalemate
            };
            info!("draw: {:?}", status);
            self.board.set_game_over();
            self.result = Some(status);
        }

        MoveOutcome {
            accepted: true,
            mv: Some(mv),
            captured,
            special,
            in_check,
            checkmate,
            stalemate,
        }
    }

    pub fn game_status(&mut self) -> GameStatus {
        let side_to_move = self.board.side_to_move();
        let (in_check, is_checkmate, is_stalemate) = match self.result {
            Some(Status::Checkmate(_)) => (true, true, false),
            Some(Status::Stalemate | Status::InsufficientMaterial) => (false, false, true),
            None => {
                let is_checkmate = self.board.is_checkmate(side_to_move);
                (
                    self.board.is_king_in_check(side_to_move),
                    is_checkmate,
                    !is_checkmate && self.board.is_stalemate(side_to_move),
                )
            }
        };
        GameStatus {
            side_to_move,
            in_check,
            is_checkmate,
            is_stalemate,
            turn_number: self.board.turn(),
        }
    }

    /// Ask the agent for a move for `color`, searching `max_depth` plies. Nothing is
    /// committed; pass the move to [`Game::play_move`] to play it.
    pub fn choose_agent_move(&mut self, color: Color, max_depth: u8) -> Result<Move, ChessError> {
        let options = SearchOptions::with_depth(max_depth).with_seed(self.rng.gen());
        self.choose_move_with(&mut MinimaxAgent::new(color, options))
    }

    /// Ask a configured agent for its move. Nothing is committed.
    pub fn choose_move_with(&mut self, agent: &mut MinimaxAgent) -> Result<Move, ChessError> {
        if self.board.is_game_over() {
            return Err(ChessError::NoLegalMoves(agent.color()));
        }
        agent.choose_move(&self.board)
    }

    /// Let the agent pick a move for `color` and commit it
    pub fn play_agent_move(&mut self, color: Color, max_depth: u8) -> Result<MoveOutcome, ChessError> {
        let mv = self.choose_agent_move(color, max_depth)?;
        Ok(self.play_move(&mv))
    }

    /// Back to the starting setup. Promoted pieces are discarded.
    pub fn reset_game(&mut self) {
        self.board.reset();
        self.history.clear();
        self.result = None;
    }

    /// Let two agents play each other until the game ends or `max_plies` moves were made.
    /// Returns the result, `None` if the ply limit was hit first.
    pub fn self_play(
        &mut self,
        white: &mut MinimaxAgent,
        black: &mut MinimaxAgent,
        max_plies: usize,
    ) -> Result<Option<Status>, ChessError> {
        for _ in 0..max_plies {
            if self.board.is_game_over() {
                break;
            }
            let agent = match self.board.side_to_move() {
                Color::White => &mut *white,
                Color::Black => &mut *black,
            };
            let mv = self.choose_move_with(agent)?;
            let outcome = self.play_move(&mv);
            if !outcome.accepted {
                return Err(ChessError::NoLegalMoves(self.board.side_to_move()));
            }
        }
        Ok(self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::{evaluate_board, MATE_SCORE};
    use pretty_assertions::assert_eq;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, moves: &[(&str, &str)]) -> MoveOutcome {
        let mut outcome = MoveOutcome::rejected();
        for (from, to) in moves {
            outcome = game.attempt_move(sq(from), sq(to));
            assert!(outcome.accepted, "{from}{to} was rejected");
        }
        outcome
    }

    #[test]
    fn test_rejected_moves_leave_the_board_alone() {
        let mut game = Game::with_seed(0);
        let before = game.board().clone();
        // black piece on white's turn
        assert!(!game.attempt_move(sq("e7"), sq("e5")).accepted);
        // empty square
        assert!(!game.attempt_move(sq("e4"), sq("e5")).accepted);
        // not a pawn move
        assert!(!game.attempt_move(sq("e2"), sq("e5")).accepted);
        // own piece in the way
        assert!(!game.attempt_move(sq("a1"), sq("a2")).accepted);
        assert_eq!(game.board(), &before);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_legal_moves_for() {
        let mut game = Game::with_seed(0);
        let knight_targets: SquareSet = [sq("f3"), sq("h3")].into_iter().collect();
        assert_eq!(game.legal_moves_for(sq("g1")), knight_targets);
        assert_eq!(game.legal_moves_for(sq("g8")), SquareSet::EMPTY);
        assert_eq!(game.legal_moves_for(sq("e4")), SquareSet::EMPTY);
    }

    #[test]
    fn test_capture_is_reported() {
        let mut game = Game::with_seed(0);
        let outcome = play(&mut game, &[("e2", "e4"), ("d7", "d5"), ("e4", "d5")]);
        assert_eq!(outcome.captured, Some(PieceType::Pawn));
        assert_eq!(outcome.special, None);
        assert!(!outcome.in_check);
        assert_eq!(game.history().len(), 3);
        assert_eq!(game.game_status().side_to_move, Color::Black);
        assert_eq!(game.game_status().turn_number, 4);
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::with_seed(0);
        let outcome = play(&mut game, &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")]);
        assert!(outcome.in_check);
        assert!(outcome.checkmate);
        assert!(!outcome.stalemate);
        assert_eq!(game.result(), Some(Status::Checkmate(Color::Black)));
        assert!(game.is_over());
        assert_eq!(evaluate_board(game.board()), -MATE_SCORE);

        let status = game.game_status();
        assert!(status.is_checkmate);
        assert!(!status.is_stalemate);
        // nothing moves once the game is over
        assert!(!game.attempt_move(sq("e2"), sq("e3")).accepted);
        assert_eq!(game.legal_moves_for(sq("e2")), SquareSet::EMPTY);
        assert!(game.choose_agent_move(Color::White, 1).is_err());
    }

    #[test]
    fn test_stalemate_ends_the_game() {
        // Qc2 leaves the black king on a1 without a move
        let mut game = Game::from_fen("7K/8/8/8/8/8/3Q4/k7 w - - 0 1", 0).unwrap();
        let outcome = game.attempt_move(sq("d2"), sq("c2"));
        assert!(outcome.accepted);
        assert!(outcome.stalemate);
        assert!(!outcome.checkmate);
        assert_eq!(game.result(), Some(Status::Stalemate));
        assert!(game.is_over());
        assert!(game.game_status().is_stalemate);
    }

    #[test]
    fn test_capturing_the_last_piece_is_a_draw() {
        let mut game = Game::from_fen("7k/8/8/8/8/8/1q6/K7 w - - 0 1", 0).unwrap();
        let outcome = game.attempt_move(sq("a1"), sq("b2"));
        assert_eq!(outcome.captured, Some(PieceType::Queen));
        assert!(outcome.stalemate);
        assert_eq!(game.result(), Some(Status::InsufficientMaterial));
    }

    #[test]
    fn test_special_moves_are_reported() {
        let mut game = Game::from_fen("4k3/1P6/8/8/8/8/8/R3K3 w Q - 0 1", 0).unwrap();
        let outcome = game.attempt_move(sq("e1"), sq("c1"));
        assert_eq!(outcome.special, Some(MoveFlag::CastleQueenside));
        assert_eq!(game.board().piece_on(sq("d1")).map(|p| p.piece_type), Some(PieceType::Rook));

        assert!(game.attempt_move(sq("e8"), sq("f7")).accepted);
        let outcome = game.attempt_move(sq("b7"), sq("b8"));
        assert_eq!(outcome.special, Some(MoveFlag::Promotion(PieceType::Queen)));
        assert_eq!(game.board().piece_on(sq("b8")).map(|p| p.piece_type), Some(PieceType::Queen));
    }

    #[test]
    fn test_reset_game() {
        let mut game = Game::with_seed(0);
        play(&mut game, &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")]);
        game.reset_game();
        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.result(), None);
        assert!(game.history().is_empty());
        assert!(game.attempt_move(sq("e2"), sq("e4")).accepted);
    }

    #[test]
    fn test_agent_move_is_not_committed() {
        let mut game = Game::with_seed(3);
        let before = game.board().clone();
        let mv = game.choose_agent_move(Color::White, 2).unwrap();
        assert_eq!(game.board(), &before);
        assert!(game.play_move(&mv).accepted);
        let outcome = game.play_agent_move(Color::Black, 1).unwrap();
        assert!(outcome.accepted);
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn test_self_play_finds_the_mate() {
        // Rxa8 mates and wins the rook
        let mut game = Game::from_fen("r5k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 0).unwrap();
        let mut white = MinimaxAgent::new(Color::White, SearchOptions::with_depth(2).with_seed(1));
        let mut black = MinimaxAgent::new(Color::Black, SearchOptions::with_depth(2).with_seed(2));
        let result = game.self_play(&mut white, &mut black, 10).unwrap();
        assert_eq!(result, Some(Status::Checkmate(Color::White)));
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_self_play_respects_ply_limit() {
        let mut game = Game::with_seed(0);
        let mut white = MinimaxAgent::new(Color::White, SearchOptions::with_depth(1).with_seed(1));
        let mut black = MinimaxAgent::new(Color::Black, SearchOptions::with_depth(1).with_seed(2));
        let result = game.self_play(&mut white, &mut black, 6).unwrap();
        assert_eq!(result, None);
        assert_eq!(game.history().len(), 6);
    }
}
