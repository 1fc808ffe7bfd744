use crate::board::Board;

/// Count the leaf nodes of the legal move tree `depth` plies deep.
/// The board is back in its original state when this returns.
pub fn run_perft_test(board: &mut Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    let moves = board.all_legal_moves(board.side_to_move());
    if depth == 1 {
        return moves.len() as u64;
    }
    for m in &moves {
        nodes += board.simulate(m, |b| run_perft_test(b, depth - 1));
    }
    nodes
}

/// Perft from starting position
///
/// https://www.chessprogramming.org/Perft_Results
///
/// | Depth | Nodes     | Captures | E.p. | Castles | Promotions | Checks | Checkmates |
/// | ----- | --------- | -------- | ---- | ------- | ---------- | ------ | ---------- |
/// | 0     | 1         | 0        | 0    | 0       | 0          | 0      | 0          |
/// | 1     | 20        | 0        | 0    | 0       | 0          | 0      | 0          |
/// | 2     | 400       | 0        | 0    | 0       | 0          | 0      | 0          |
/// | 3     | 8,902     | 34       | 0    | 0       | 0          | 12     | 0          |
/// | 4     | 197,281   | 1576     | 0    | 0       | 0          | 469    | 8          |
/// | 5     | 4,865,609 | 82,719   | 258  | 0       | 0          | 27,351 | 347        |
pub fn get_perft_expected_node_count(depth: u8) -> Option<u64> {
    match depth {
        0 => Some(1),
        1 => Some(20),
        2 => Some(400),
        3 => Some(8902),
        4 => Some(197_281),
        5 => Some(4_865_609),
        _ => None,
    }
}
