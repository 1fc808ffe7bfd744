use crate::bitboard::{between, SquareSet};
use crate::board::Board;
use crate::types::{Color, PieceId, PieceType, Status};

impl Board {
    /// Is the king of `color` attacked by any active opposing piece
    pub fn is_king_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(square) => self.attacked_squares(color.other_color(), None).contains(square),
            None => false,
        }
    }

    /// Opposing pieces attacking the king of `color`
    pub fn checkers(&self, color: Color) -> Vec<PieceId> {
        let Some(king_square) = self.king_square(color) else {
            return vec![];
        };
        let occupancy = self.occupied_squares(None);
        self.active_pieces(color.other_color())
            .filter(|(id, _)| self.observed_squares(*id, occupancy).contains(king_square))
            .map(|(id, _)| id)
            .collect()
    }

    /// Is `color` checkmated.
    ///
    /// The king must be in check with no safe square to go to, and then either two pieces
    /// give check at once, or the single checker can neither be captured nor blocked. Only
    /// checks along a line can be blocked.
    pub fn is_checkmate(&mut self, color: Color) -> bool {
        let checkers = self.checkers(color);
        let (Some(king), Some(king_square)) = (self.king(color), self.king_square(color)) else {
            return false;
        };
        if checkers.is_empty() || !self.legal_moves(king).is_empty() {
            return false;
        }
        // double check, only a king move could help
        if checkers.len() > 1 {
            return true;
        }

        let checker = checkers[0];
        let checker_piece = self.piece(checker);
        let blocking_squares = match checker_piece.square() {
            Some(square) if checker_piece.piece_type.is_sliding() => between(king_square, square),
            _ => SquareSet::EMPTY,
        };

        let defended = self
            .all_legal_moves(color)
            .iter()
            .any(|mv| mv.captured == Some(checker) || blocking_squares.contains(mv.to));
        !defended
    }

    /// Is `color` out of moves without being in check, or are only the kings left
    pub fn is_stalemate(&mut self, color: Color) -> bool {
        if self.only_kings_remain() {
            return true;
        }
        !self.is_king_in_check(color) && !self.has_legal_move(color)
    }

    /// Final status of the game for the side to move, if the game is over
    pub fn game_result(&mut self) -> Option<Status> {
        let side = self.side_to_move();
        let king_taken_off = self
            .king(side)
            .is_some_and(|id| !self.piece(id).active);
        if king_taken_off || self.is_checkmate(side) {
            return Some(Status::Checkmate(side.other_color()));
        }
        if self.only_kings_remain() {
            return Some(Status::InsufficientMaterial);
        }
        if self.is_stalemate(side) {
            return Some(Status::Stalemate);
        }
        None
    }

    /// Material of `color` in centipawns, kings excluded
    pub fn material(&self, color: Color) -> i32 {
        self.active_pieces(color)
            .filter(|(_, p)| p.piece_type != PieceType::King)
            .map(|(_, p)| p.piece_type.centipawns())
            .sum()
    }
}
