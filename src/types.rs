use std::fmt;
use std::str::FromStr;

use crate::error::ChessError;

/// Number of rows and columns on the board
pub const BOARD_DIM: u8 = 8;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    pub fn from_case(c: char) -> Color {
        if c.is_uppercase() {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn other_color(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn to_human(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Row delta of a pawn step. Row 0 is the eighth rank, so white moves up the board
    /// by decreasing its row.
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row pawns of this color start on
    pub fn pawn_start_row(&self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row on which a pawn of this color promotes
    pub fn promotion_row(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Row a pawn of this color must stand on to capture en passant (fifth rank)
    pub fn en_passant_row(&self) -> u8 {
        match self {
            Color::White => 3,
            Color::Black => 4,
        }
    }

    /// Row the king and rooks of this color start on
    pub fn back_row(&self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// +1 for white, -1 for black. Scores are always from white's point of view.
    pub fn sign(&self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceType {
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'r' => Some(PieceType::Rook),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Is the piece a sliding piece (one which can move multiple square in a given direction)
    pub fn is_sliding(&self) -> bool {
        matches!(*self, PieceType::Rook | PieceType::Bishop | PieceType::Queen)
    }

    pub fn to_human(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// Material value in centipawns. The king is priceless and counts for nothing.
    pub fn centipawns(&self) -> i32 {
        match self {
            Self::Pawn => 100,
            Self::Knight => 300,
            Self::Bishop => 300,
            Self::Rook => 500,
            Self::Queen => 900,
            Self::King => 0,
        }
    }
}

/// A square of the 8x8 board.
///
/// Rows count down from the eighth rank (row 0 is `a8..h8`, row 7 is `a1..h1`) and
/// columns count from the a-file. A `Square` can only be built for coordinates on the
/// board, so every value in circulation is valid.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    pub fn new(row: i8, col: i8) -> Result<Square, ChessError> {
        if (0..BOARD_DIM as i8).contains(&row) && (0..BOARD_DIM as i8).contains(&col) {
            Ok(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            Err(ChessError::InvalidSquare { row, col })
        }
    }

    /// Build a square from coordinates already known to be on the board
    pub(crate) const fn at(row: u8, col: u8) -> Square {
        debug_assert!(row < BOARD_DIM && col < BOARD_DIM);
        Square { row, col }
    }

    pub(crate) const fn from_index(index: u8) -> Square {
        Square::at(index / BOARD_DIM, index % BOARD_DIM)
    }

    pub fn from_algebraic(s: &str) -> Result<Square, ChessError> {
        let malformed = || ChessError::MalformedSquare(s.to_string());
        let mut chars = s.chars();
        let (Some(file_char), Some(rank_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(malformed());
        };
        if !('a'..='h').contains(&file_char) || !('1'..='8').contains(&rank_char) {
            return Err(malformed());
        }
        let col = file_char as u8 - b'a';
        let rank = rank_char as u8 - b'0';
        Ok(Square::at(BOARD_DIM - rank, col))
    }

    pub fn to_algebraic(&self) -> String {
        format!("{}{}", self.file_char(), self.rank())
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    pub fn row_col(&self) -> (u8, u8) {
        (self.row, self.col)
    }

    /// Rank number, 1 to 8
    pub fn rank(&self) -> u8 {
        BOARD_DIM - self.row
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.col) as char
    }

    /// Index in 0..64, a8 = 0, h1 = 63
    pub fn index(&self) -> usize {
        (self.row * BOARD_DIM + self.col) as usize
    }

    /// The square reached by stepping `d_row` rows and `d_col` columns, if on the board
    pub fn offset(&self, d_row: i8, d_col: i8) -> Option<Square> {
        Square::new(self.row as i8 + d_row, self.col as i8 + d_col).ok()
    }

    /// All 64 squares, a8 first
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_DIM * BOARD_DIM).map(Square::from_index)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank())
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s)
    }
}

/// Stable handle of a piece in the board's piece arena
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) usize);

impl PieceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
    /// `None` while the piece is off the board
    pub location: Option<Square>,
    /// Set on the first move and never cleared. Drives castling and the double pawn step.
    pub has_moved: bool,
    pub move_count: u32,
    /// Ply on which the piece last moved (or was created by promotion)
    pub moved_on_turn: u32,
    /// Cleared once the piece is captured or promoted away
    pub active: bool,
    pub promoted: bool,
}

impl Piece {
    pub fn new(color: Color, piece_type: PieceType, location: Square) -> Piece {
        Piece {
            color,
            piece_type,
            location: Some(location),
            has_moved: false,
            move_count: 0,
            moved_on_turn: 0,
            active: true,
            promoted: false,
        }
    }

    pub fn from_char(piece: char, location: Square) -> Option<Piece> {
        PieceType::from_char(piece).map(|pt| Piece::new(Color::from_case(piece), pt, location))
    }

    /// Location of an active piece
    pub fn square(&self) -> Option<Square> {
        if self.active {
            self.location
        } else {
            None
        }
    }

    pub fn to_symbol(&self) -> &'static str {
        match (self.color, self.piece_type) {
            (Color::White, PieceType::Pawn) => "♙",
            (Color::White, PieceType::Rook) => "♖",
            (Color::White, PieceType::Knight) => "♘",
            (Color::White, PieceType::Bishop) => "♗",
            (Color::White, PieceType::Queen) => "♕",
            (Color::White, PieceType::King) => "♔",
            (Color::Black, PieceType::Pawn) => "♟︎",
            (Color::Black, PieceType::Rook) => "♜",
            (Color::Black, PieceType::Knight) => "♞",
            (Color::Black, PieceType::Bishop) => "♝",
            (Color::Black, PieceType::Queen) => "♛",
            (Color::Black, PieceType::King) => "♚",
        }
    }

    /// FEN letter, uppercase for white
    pub fn to_char(&self) -> char {
        match self.color {
            Color::White => self.piece_type.to_char(),
            Color::Black => self.piece_type.to_char().to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    /// Contains the winner
    Checkmate(Color),
    Stalemate,
    /// Only the two kings are left
    InsufficientMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveFlag {
    Regular,
    CastleKingside,
    CastleQueenside,
    EnPassantCapture,
    /// Pawn promotion. Contains the piece promoted to
    Promotion(PieceType),
}

impl MoveFlag {
    pub fn is_castle(&self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceId>,
    pub move_flag: MoveFlag,
}

impl Move {
    /// Coordinate notation, `e2e4`, with a trailing piece letter on promotion (`e7e8q`)
    pub fn to_uci(&self) -> String {
        match self.move_flag {
            MoveFlag::Promotion(pt) => {
                format!("{}{}{}", self.from, self.to, pt.to_char().to_ascii_lowercase())
            }
            _ => format!("{}{}", self.from, self.to),
        }
    }
}
