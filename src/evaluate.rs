use crate::board::Board;
use crate::types::Color;

/// Score of a decided game, from white's point of view
pub const MATE_SCORE: i32 = 10_000;

/// Static evaluation of the position in centipawns, positive when white is ahead.
///
/// Only material counts. A king that has been taken off the board marks a finished game
/// and overrides the material balance.
pub fn evaluate_board(board: &Board) -> i32 {
    for color in [Color::White, Color::Black] {
        let king_lost = board
            .king(color)
            .map_or(false, |id| !board.piece(id).active);
        if king_lost {
            return -color.sign() * MATE_SCORE;
        }
    }
    board.material(Color::White) - board.material(Color::Black)
}
