use log::trace;

use crate::bitboard::SquareSet;
use crate::board::Board;
use crate::types::{Color, Move, PieceId, Square};

impl Board {
    /// Can the piece legally move to `destination`.
    ///
    /// The destination must be one of the piece's pseudo-legal targets, and playing the
    /// move must not leave the mover's own king in check. The check test runs on the board
    /// with the move simulated, and the move is always taken back afterwards.
    pub fn is_legal_move(&mut self, id: PieceId, destination: Square) -> bool {
        if !self.pseudo_legal_targets(id).contains(destination) {
            return false;
        }
        match self.build_move(id, destination) {
            Some(mv) => self.keeps_king_safe(&mv),
            None => false,
        }
    }

    fn keeps_king_safe(&mut self, mv: &Move) -> bool {
        let color = self.piece(mv.piece).color;
        let safe = self.simulate(mv, |board| !board.is_king_in_check(color));
        if !safe {
            trace!("{} would leave the {} king in check", mv.to_uci(), color.to_human());
        }
        safe
    }

    /// All legal moves of one piece
    pub fn legal_moves(&mut self, id: PieceId) -> Vec<Move> {
        self.pseudo_legal_moves(id)
            .into_iter()
            .filter(|mv| self.keeps_king_safe(mv))
            .collect()
    }

    /// Legal destinations of one piece
    pub fn legal_targets(&mut self, id: PieceId) -> SquareSet {
        self.legal_moves(id).iter().map(|mv| mv.to).collect()
    }

    /// Every legal move of `color`, in piece order
    pub fn all_legal_moves(&mut self, color: Color) -> Vec<Move> {
        self.piece_ids(color)
            .into_iter()
            .flat_map(|id| self.legal_moves(id))
            .collect()
    }

    /// Does `color` have at least one legal move. Stops at the first one found.
    pub fn has_legal_move(&mut self, color: Color) -> bool {
        for id in self.piece_ids(color) {
            for mv in self.pseudo_legal_moves(id) {
                if self.keeps_king_safe(&mv) {
                    return true;
                }
            }
        }
        false
    }

    // ids are collected up front, the arena grows and shrinks while moves are simulated
    fn piece_ids(&self, color: Color) -> Vec<PieceId> {
        self.active_pieces(color).map(|(id, _)| id).collect()
    }
}
