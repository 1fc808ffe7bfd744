use itertools::Itertools;

use crate::bitboard::SquareSet;
use crate::error::ChessError;
use crate::types::{Color, Move, MoveFlag, Piece, PieceId, PieceType, Square, BOARD_DIM};

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Information needed to undo a move. Stored during make_move, used in unmake_move.
#[derive(Debug, Clone)]
pub struct UndoInfo {
    /// The move that was made
    pub mv: Move,
    /// The moving piece as it was before the move
    mover: Piece,
    /// The captured piece as it was before the move
    captured: Option<Piece>,
    /// For castling: the rook and its record before the move
    rook: Option<(PieceId, Piece)>,
    /// Piece created by promotion, always the last one in the arena
    promoted: Option<PieceId>,
    turn: u32,
    game_over: bool,
}

/// The position: every piece of the game, the square occupancy derived from them, and the
/// ply counter.
///
/// Pieces live in an arena and are addressed by [`PieceId`]. A piece keeps its id for the
/// whole game; captures and promotions only flip its `active` flag. Promotion appends a new
/// piece to the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pieces: Vec<Piece>,
    occupants: [Option<PieceId>; 64],
    /// Ply counter, starts at 1 and increments after every move. White moves on odd plies.
    turn: u32,
    game_over: bool,
    // records of the pieces as first set up, used to reset the board
    setup: Vec<Piece>,
    setup_turn: u32,
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    /// Standard starting position
    pub fn new() -> Board {
        let mut pieces = Vec::with_capacity(32);
        for color in [Color::White, Color::Black] {
            let pawn_row = color.pawn_start_row();
            for col in 0..BOARD_DIM {
                pieces.push(Piece::new(color, PieceType::Pawn, Square::at(pawn_row, col)));
            }
            for (col, piece_type) in BACK_RANK.iter().enumerate() {
                pieces.push(Piece::new(
                    color,
                    *piece_type,
                    Square::at(color.back_row(), col as u8),
                ));
            }
        }
        Board::from_pieces(pieces, 1)
    }

    fn from_pieces(pieces: Vec<Piece>, turn: u32) -> Board {
        let mut board = Board {
            setup: pieces.clone(),
            pieces,
            occupants: [None; 64],
            turn,
            game_over: false,
            setup_turn: turn,
        };
        board.rebuild_occupants();
        board
    }

    /// Build a position from a FEN string.
    ///
    /// Castling rights mark the king and the matching rook as unmoved. Pawns off their
    /// start row count as having moved once, and an en passant square marks the pawn that
    /// just stepped past it as having made its double step on the previous ply. The half
    /// move clock is accepted but ignored.
    pub fn from_fen(fen_string: &str) -> Result<Board, ChessError> {
        let invalid = |msg: &str| ChessError::InvalidFen(format!("{msg} in {fen_string:?}"));

        let parts: Vec<&str> = fen_string.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(invalid("expected 6 space delimited fields"));
        }

        let mut pieces: Vec<Piece> = vec![];
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != BOARD_DIM as usize {
            return Err(invalid("expected 8 ranks"));
        }
        for (row, rank_data) in ranks.iter().enumerate() {
            let mut col: u8 = 0;
            for piece_char in rank_data.chars() {
                if let Some(skip) = piece_char.to_digit(10) {
                    col = col
                        .checked_add(skip as u8)
                        .filter(|&col| col <= BOARD_DIM)
                        .ok_or_else(|| invalid("rank too long"))?;
                    continue;
                }
                if col >= BOARD_DIM {
                    return Err(invalid("rank too long"));
                }
                let piece = Piece::from_char(piece_char, Square::at(row as u8, col))
                    .ok_or_else(|| invalid(&format!("unexpected char {piece_char:?}")))?;
                pieces.push(piece);
                col += 1;
            }
            if col != BOARD_DIM {
                return Err(invalid(&format!("rank {} does not have 8 squares", 8 - row)));
            }
        }

        for color in [Color::White, Color::Black] {
            let kings = pieces
                .iter()
                .filter(|p| p.color == color && p.piece_type == PieceType::King)
                .count();
            if kings != 1 {
                return Err(invalid(&format!("{} must have exactly one king", color.to_human())));
            }
        }

        let active_color = parts[1]
            .chars()
            .exactly_one()
            .ok()
            .and_then(Color::from_char)
            .ok_or_else(|| invalid("bad side to move"))?;

        let castling = parts[2];
        if castling != "-" && !castling.chars().all(|c| "KQkq".contains(c)) {
            return Err(invalid("bad castling rights"));
        }
        for piece in pieces.iter_mut() {
            match piece.piece_type {
                PieceType::Pawn => {
                    // a pawn off its start row has moved at least once
                    let off_start = piece.location.map(|sq| sq.row()) != Some(piece.color.pawn_start_row());
                    piece.has_moved = off_start;
                    piece.move_count = u32::from(off_start);
                }
                PieceType::King | PieceType::Rook => piece.has_moved = !has_castling_right(piece, castling),
                _ => {}
            }
        }

        let fullmove_clock: u32 = parts[5]
            .parse()
            .map_err(|_| invalid("fullmove clock should be a u32"))?;
        parts[4]
            .parse::<u32>()
            .map_err(|_| invalid("halfmove clock should be a u32"))?;
        let turn = fullmove_clock
            .max(1)
            .checked_mul(2)
            .and_then(|plies| plies.checked_add(u32::from(active_color == Color::Black)))
            .map(|plies| plies - 1)
            .ok_or_else(|| invalid("fullmove clock too large"))?;

        if parts[3] != "-" {
            if turn == 1 {
                return Err(invalid("en passant square before the first move"));
            }
            let target = Square::from_algebraic(parts[3])?;
            // the pawn that just moved stands one step past the target, seen from its side
            let mover = active_color.other_color();
            let pawn_square = target
                .offset(mover.pawn_direction(), 0)
                .ok_or_else(|| invalid("bad en passant square"))?;
            let pawn = pieces
                .iter_mut()
                .find(|p| {
                    p.location == Some(pawn_square)
                        && p.color == mover
                        && p.piece_type == PieceType::Pawn
                        && pawn_square.row() == active_color.en_passant_row()
                })
                .ok_or_else(|| invalid("no pawn to capture en passant"))?;
            pawn.has_moved = true;
            pawn.move_count = 1;
            pawn.moved_on_turn = turn - 1;
        }

        Ok(Board::from_pieces(pieces, turn))
    }

    /// Reinitialize the board to the position it was created with. Pieces keep their ids,
    /// pieces created by promotion are discarded.
    pub fn reset(&mut self) {
        self.pieces.truncate(self.setup.len());
        self.pieces.clone_from_slice(&self.setup);
        self.turn = self.setup_turn;
        self.game_over = false;
        self.rebuild_occupants();
    }

    fn rebuild_occupants(&mut self) {
        self.occupants = [None; 64];
        for (index, piece) in self.pieces.iter().enumerate() {
            if let Some(square) = piece.square() {
                debug_assert!(self.occupants[square.index()].is_none(), "two pieces on {square}");
                self.occupants[square.index()] = Some(PieceId(index));
            }
        }
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0]
    }

    /// Every piece ever created in this game, captured ones included
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces.iter().enumerate().map(|(i, p)| (PieceId(i), p))
    }

    pub fn active_pieces(&self, color: Color) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.active && p.color == color)
    }

    /// The active piece standing on `square`
    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        self.occupants[square.index()]
    }

    pub fn piece_on(&self, square: Square) -> Option<&Piece> {
        self.piece_at(square).map(|id| self.piece(id))
    }

    /// The king of `color`, even once it has been marked inactive by checkmate
    pub fn king(&self, color: Color) -> Option<PieceId> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.piece_type == PieceType::King && !p.promoted)
            .map(|(id, _)| id)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.king(color).and_then(|id| self.piece(id).square())
    }

    /// Get the color of the side to move
    pub fn side_to_move(&self) -> Color {
        if self.turn % 2 == 1 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn set_game_over(&mut self) {
        self.game_over = true;
    }

    /// Terminal marker: the checkmated king leaves the board and the game ends
    pub fn mark_checkmated(&mut self, color: Color) {
        if let Some(id) = self.king(color) {
            if let Some(square) = self.piece(id).square() {
                self.occupants[square.index()] = None;
            }
            self.pieces[id.0].active = false;
        }
        self.game_over = true;
    }

    /// Squares held by active pieces of `color`, or by all active pieces
    pub fn occupied_squares(&self, color: Option<Color>) -> SquareSet {
        self.pieces
            .iter()
            .filter(|p| color.map_or(true, |c| p.color == c))
            .filter_map(|p| p.square())
            .collect()
    }

    /// Are the two kings the only active pieces
    pub fn only_kings_remain(&self) -> bool {
        self.pieces
            .iter()
            .filter(|p| p.active)
            .all(|p| p.piece_type == PieceType::King)
    }

    /// Play `mv` on the board, returning what is needed to take it back.
    ///
    /// Handles captures (including en passant, where the captured pawn is not on the
    /// target square), the rook hop of castling, and promotion, which retires the pawn
    /// and appends the new piece to the arena.
    pub fn make_move(&mut self, mv: &Move) -> UndoInfo {
        let mover = self.pieces[mv.piece.0].clone();
        let color = mover.color;
        let mut undo = UndoInfo {
            mv: *mv,
            mover,
            captured: None,
            rook: None,
            promoted: None,
            turn: self.turn,
            game_over: self.game_over,
        };

        if let Some(captured_id) = mv.captured {
            let captured = &mut self.pieces[captured_id.0];
            undo.captured = Some(captured.clone());
            if let Some(square) = captured.square() {
                self.occupants[square.index()] = None;
            }
            captured.active = false;
        }

        self.relocate(mv.piece, mv.from, mv.to);

        let back_row = color.back_row();
        let rook_hop = match mv.move_flag {
            MoveFlag::CastleKingside => Some((Square::at(back_row, 7), Square::at(back_row, 5))),
            MoveFlag::CastleQueenside => Some((Square::at(back_row, 0), Square::at(back_row, 3))),
            _ => None,
        };
        if let Some((rook_from, rook_to)) = rook_hop {
            if let Some(rook_id) = self.piece_at(rook_from) {
                undo.rook = Some((rook_id, self.pieces[rook_id.0].clone()));
                self.relocate(rook_id, rook_from, rook_to);
            }
        }

        if let MoveFlag::Promotion(piece_type) = mv.move_flag {
            self.pieces[mv.piece.0].active = false;
            let promoted_id = PieceId(self.pieces.len());
            self.pieces.push(Piece {
                has_moved: true,
                moved_on_turn: self.turn,
                promoted: true,
                ..Piece::new(color, piece_type, mv.to)
            });
            self.occupants[mv.to.index()] = Some(promoted_id);
            undo.promoted = Some(promoted_id);
        }

        self.turn += 1;
        undo
    }

    fn relocate(&mut self, id: PieceId, from: Square, to: Square) {
        self.occupants[from.index()] = None;
        self.occupants[to.index()] = Some(id);
        let turn = self.turn;
        let piece = &mut self.pieces[id.0];
        piece.location = Some(to);
        piece.has_moved = true;
        piece.move_count += 1;
        piece.moved_on_turn = turn;
    }

    /// Take back the move recorded in `undo`. Moves must be unmade in reverse order.
    pub fn unmake_move(&mut self, undo: UndoInfo) {
        let mv = undo.mv;

        if let Some(promoted_id) = undo.promoted {
            debug_assert_eq!(promoted_id.0, self.pieces.len() - 1);
            self.pieces.pop();
        }
        self.occupants[mv.to.index()] = None;

        if let Some((rook_id, rook)) = undo.rook {
            if let Some(square) = self.pieces[rook_id.0].location {
                self.occupants[square.index()] = None;
            }
            if let Some(square) = rook.location {
                self.occupants[square.index()] = Some(rook_id);
            }
            self.pieces[rook_id.0] = rook;
        }

        self.pieces[mv.piece.0] = undo.mover;
        self.occupants[mv.from.index()] = Some(mv.piece);

        if let (Some(captured_id), Some(captured)) = (mv.captured, undo.captured) {
            if let Some(square) = captured.square() {
                self.occupants[square.index()] = Some(captured_id);
            }
            self.pieces[captured_id.0] = captured;
        }

        self.turn = undo.turn;
        self.game_over = undo.game_over;
    }

    /// Run `f` on the board with `mv` played, then take the move back before returning
    pub fn simulate<R>(&mut self, mv: &Move, f: impl FnOnce(&mut Board) -> R) -> R {
        let undo = self.make_move(mv);
        let result = f(self);
        self.unmake_move(undo);
        result
    }

    /// Commit a move
    pub fn apply_move(&mut self, mv: &Move) {
        self.make_move(mv);
    }

    pub fn describe_move(&self, mv: &Move) -> String {
        let piece = self.piece(mv.piece);
        match mv.move_flag {
            MoveFlag::CastleKingside => {
                return format!("{} castles kingside", piece.color.to_human())
            }
            MoveFlag::CastleQueenside => {
                return format!("{} castles queenside", piece.color.to_human())
            }
            _ => {}
        }
        let maybe_capture_str = match mv.captured.map(|id| self.piece(id)) {
            Some(p) => format!(
                " capturing {} {}{}",
                p.color.to_human(),
                p.piece_type.to_human(),
                if mv.move_flag == MoveFlag::EnPassantCapture {
                    " en passant"
                } else {
                    ""
                }
            ),
            None => "".to_string(),
        };
        let maybe_promotion_str = match mv.move_flag {
            MoveFlag::Promotion(promoted_to_type) => {
                format!(" promoting to {}", promoted_to_type.to_human())
            }
            _ => "".to_string(),
        };
        format!(
            "{} moves {} from {} to {}{}{}",
            piece.color.to_human(),
            piece.piece_type.to_human(),
            mv.from,
            mv.to,
            maybe_capture_str,
            maybe_promotion_str,
        )
    }

    pub fn draw_board(&self) -> String {
        let mut string = String::new();
        for row in 0..BOARD_DIM {
            let rank = (0..BOARD_DIM)
                .map(|col| match self.piece_on(Square::at(row, col)) {
                    Some(p) => p.to_symbol(),
                    None => ".",
                })
                .join(" ");
            string.push_str(&format!("{} {}\n", BOARD_DIM - row, rank));
        }
        string.push_str("  a b c d e f g h\n");
        string
    }
}

fn has_castling_right(piece: &Piece, castling: &str) -> bool {
    let Some(square) = piece.location else {
        return false;
    };
    if square.row() != piece.color.back_row() {
        return false;
    }
    let (kingside, queenside) = match piece.color {
        Color::White => ('K', 'Q'),
        Color::Black => ('k', 'q'),
    };
    match (piece.piece_type, square.col()) {
        (PieceType::King, 4) => castling.contains(kingside) || castling.contains(queenside),
        (PieceType::Rook, 7) => castling.contains(kingside),
        (PieceType::Rook, 0) => castling.contains(queenside),
        _ => false,
    }
}
