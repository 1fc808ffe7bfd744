//! Pseudo-legal move generation.
//!
//! Generators run in one of two modes. In move mode they list the squares a piece may move
//! to, ignoring whether that exposes its own king. In observed mode they list the squares
//! the piece controls: pawns only see their capture diagonals, and squares held by friendly
//! pieces are included so that a defended piece counts as attacked by its defenders.

use crate::bitboard::{SquareSet, ATTACK_TABLES};
use crate::board::Board;
use crate::types::{Color, Move, MoveFlag, PieceId, PieceType, Square};

/// Column of the king's starting square
const KING_COL: u8 = 4;

impl Board {
    /// Squares the piece could move to, without checking if that leaves its king in check
    pub fn pseudo_legal_targets(&self, id: PieceId) -> SquareSet {
        let occupancy = self.occupied_squares(None);
        self.get_pseudo_targets(id, occupancy, false)
    }

    /// Squares the piece controls given the set of occupied squares
    pub fn observed_squares(&self, id: PieceId, occupancy: SquareSet) -> SquareSet {
        self.get_pseudo_targets(id, occupancy, true)
    }

    /// Union of the squares controlled by every active piece of `color`.
    ///
    /// `ignore` is treated as if it were not on the board: it neither attacks nor blocks.
    /// This is how king moves are checked, so a king cannot step back along the line of a
    /// slider that is attacking it.
    pub fn attacked_squares(&self, color: Color, ignore: Option<PieceId>) -> SquareSet {
        let mut occupancy = self.occupied_squares(None);
        if let Some(square) = ignore.and_then(|id| self.piece(id).square()) {
            occupancy.remove(square);
        }
        self.active_pieces(color)
            .filter(|(id, _)| Some(*id) != ignore)
            .fold(SquareSet::EMPTY, |acc, (id, _)| {
                acc | self.observed_squares(id, occupancy)
            })
    }

    fn get_pseudo_targets(&self, id: PieceId, occupancy: SquareSet, observed_mode: bool) -> SquareSet {
        let piece = self.piece(id);
        let Some(square) = piece.square() else {
            return SquareSet::EMPTY;
        };
        let friendly = if observed_mode {
            SquareSet::EMPTY
        } else {
            self.occupied_squares(Some(piece.color))
        };

        match piece.piece_type {
            PieceType::Pawn => {
                if observed_mode {
                    pawn_observed_squares(square, piece.color)
                } else {
                    self.get_pseudo_pawn_targets(id, square, occupancy)
                }
            }
            PieceType::Knight => ATTACK_TABLES.knight[square.index()] - friendly,
            PieceType::Bishop => {
                sliding_targets(&ATTACK_TABLES.bishop_rays[square.index()], occupancy, friendly)
            }
            PieceType::Rook => {
                sliding_targets(&ATTACK_TABLES.rook_rays[square.index()], occupancy, friendly)
            }
            PieceType::Queen => {
                sliding_targets(&ATTACK_TABLES.bishop_rays[square.index()], occupancy, friendly)
                    | sliding_targets(&ATTACK_TABLES.rook_rays[square.index()], occupancy, friendly)
            }
            PieceType::King => {
                if observed_mode {
                    ATTACK_TABLES.king[square.index()]
                } else {
                    self.get_pseudo_king_targets(id, square, friendly)
                }
            }
        }
    }

    fn get_pseudo_pawn_targets(&self, id: PieceId, square: Square, occupancy: SquareSet) -> SquareSet {
        let pawn = self.piece(id);
        let direction = pawn.color.pawn_direction();
        let mut targets = SquareSet::EMPTY;

        // move one square forward, requires no piece there
        if let Some(one_step) = square.offset(direction, 0).filter(|s| !occupancy.contains(*s)) {
            targets.insert(one_step);

            // from the starting row, if both squares in front are free
            if !pawn.has_moved && square.row() == pawn.color.pawn_start_row() {
                if let Some(two_step) = one_step.offset(direction, 0).filter(|s| !occupancy.contains(*s)) {
                    targets.insert(two_step);
                }
            }
        }

        let enemies = self.occupied_squares(Some(pawn.color.other_color()));
        targets |= pawn_observed_squares(square, pawn.color) & enemies;

        if let Some((target, _)) = self.en_passant_capture(id) {
            targets.insert(target);
        }
        targets
    }

    /// The en passant target square available to this pawn, and the pawn it would capture.
    ///
    /// Only an enemy pawn beside this one that has moved exactly once, on the previous ply,
    /// can be taken. With this pawn on its fifth rank that single move was a double step.
    pub fn en_passant_capture(&self, id: PieceId) -> Option<(Square, PieceId)> {
        let pawn = self.piece(id);
        let square = pawn.square()?;
        if pawn.piece_type != PieceType::Pawn || square.row() != pawn.color.en_passant_row() {
            return None;
        }
        [-1, 1].into_iter().find_map(|d_col| {
            let beside = square.offset(0, d_col)?;
            let other_id = self.piece_at(beside)?;
            let other = self.piece(other_id);
            let just_double_stepped = other.color != pawn.color
                && other.piece_type == PieceType::Pawn
                && other.move_count == 1
                && other.moved_on_turn > 0
                && other.moved_on_turn + 1 == self.turn();
            if just_double_stepped {
                Some((beside.offset(pawn.color.pawn_direction(), 0)?, other_id))
            } else {
                None
            }
        })
    }

    fn get_pseudo_king_targets(&self, id: PieceId, square: Square, friendly: SquareSet) -> SquareSet {
        let king = self.piece(id);
        // the opponent's observed squares include the ones next to its own king,
        // so the two kings never end up adjacent
        let attacked = self.attacked_squares(king.color.other_color(), Some(id));
        let mut targets = ATTACK_TABLES.king[square.index()] - friendly - attacked;

        let back_row = king.color.back_row();
        if king.has_moved || square != Square::at(back_row, KING_COL) || attacked.contains(square) {
            return targets;
        }

        let occupancy = self.occupied_squares(None);
        let rook_ready = |col: u8| {
            self.piece_on(Square::at(back_row, col)).is_some_and(|rook| {
                rook.color == king.color && rook.piece_type == PieceType::Rook && !rook.has_moved
            })
        };
        let free = |cols: &[u8]| {
            cols.iter().all(|&col| !occupancy.contains(Square::at(back_row, col)))
        };
        let safe = |cols: &[u8]| {
            cols.iter().all(|&col| !attacked.contains(Square::at(back_row, col)))
        };

        if rook_ready(7) && free(&[5, 6]) && safe(&[5, 6]) {
            targets.insert(Square::at(back_row, 6));
        }
        if rook_ready(0) && free(&[1, 2, 3]) && safe(&[2, 3]) {
            targets.insert(Square::at(back_row, 2));
        }
        targets
    }

    /// Build the move of piece `id` to `to`, working out what it captures and whether it is
    /// a castle, an en passant capture or a promotion. `None` if the piece is off the board,
    /// or for a diagonal pawn step onto an empty square that is not an en passant capture.
    pub fn build_move(&self, id: PieceId, to: Square) -> Option<Move> {
        let piece = self.piece(id);
        let from = piece.square()?;
        let enemy_at_target = self
            .piece_at(to)
            .filter(|&other| self.piece(other).color != piece.color);

        let mut mv = Move {
            piece: id,
            from,
            to,
            captured: enemy_at_target,
            move_flag: MoveFlag::Regular,
        };

        match piece.piece_type {
            PieceType::King if from.col() == KING_COL && to.row() == from.row() => {
                if to.col() == KING_COL + 2 {
                    mv.move_flag = MoveFlag::CastleKingside;
                } else if to.col() + 2 == KING_COL {
                    mv.move_flag = MoveFlag::CastleQueenside;
                }
            }
            PieceType::Pawn => {
                if to.row() == piece.color.promotion_row() {
                    // no underpromotion
                    mv.move_flag = MoveFlag::Promotion(PieceType::Queen);
                } else if to.col() != from.col() && enemy_at_target.is_none() {
                    let (_, captured) = self
                        .en_passant_capture(id)
                        .filter(|(target, _)| *target == to)?;
                    mv.move_flag = MoveFlag::EnPassantCapture;
                    mv.captured = Some(captured);
                }
            }
            _ => {}
        }
        Some(mv)
    }

    /// All pseudo-legal moves of a piece
    pub fn pseudo_legal_moves(&self, id: PieceId) -> Vec<Move> {
        self.pseudo_legal_targets(id)
            .iter()
            .filter_map(|to| self.build_move(id, to))
            .collect()
    }
}

/// Squares the pawn *could* capture if there is a piece there
fn pawn_observed_squares(square: Square, color: Color) -> SquareSet {
    [-1, 1]
        .into_iter()
        .filter_map(|d_col| square.offset(color.pawn_direction(), d_col))
        .collect()
}

/// Walk every ray until it leaves the board or hits a piece. The blocking square is
/// included unless it is in `friendly`.
fn sliding_targets(rays: &[Vec<Square>; 4], occupancy: SquareSet, friendly: SquareSet) -> SquareSet {
    let mut targets = SquareSet::EMPTY;
    for ray in rays {
        for &candidate in ray {
            if !friendly.contains(candidate) {
                targets.insert(candidate);
            }
            if occupancy.contains(candidate) {
                break;
            }
        }
    }
    targets
}
