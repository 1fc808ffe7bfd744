//! Whole-game scenarios through the public API
//!
//! Run with: cargo test --test scenarios

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use chess_ai::board::Board;
use chess_ai::game::Game;
use chess_ai::search::{minimax, minimax_no_pruning};
use chess_ai::types::{Color, MoveFlag, PieceType, Square, Status};

const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn play(game: &mut Game, moves: &[&str]) {
    for mv in moves {
        let (from, to) = mv.split_at(2);
        assert!(game.attempt_move(sq(from), sq(to)).accepted, "{mv} was rejected");
    }
}

#[test]
fn simulate_restores_every_pseudo_legal_move() {
    let fens = [
        chess_ai::board::STARTING_POSITION_FEN,
        KIWIPETE_FEN,
        // promotions with and without capture
        "1n2k3/P1P5/8/8/8/8/5p1p/4K1R1 w - - 0 1",
        // en passant available
        "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2",
    ];
    for fen in fens {
        let mut board = Board::from_fen(fen).unwrap();
        let snapshot = board.clone();
        let ids: Vec<_> = board.pieces().filter(|(_, p)| p.active).map(|(id, _)| id).collect();
        for id in ids {
            for mv in board.pseudo_legal_moves(id) {
                board.simulate(&mv, |_| ());
                assert_eq!(board, snapshot, "{} in {}", mv.to_uci(), fen);
            }
        }
    }
}

#[test]
fn side_that_moved_is_never_left_in_check() {
    for seed in 0..4 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        for _ in 0..80 {
            let side = board.side_to_move();
            let moves = board.all_legal_moves(side);
            let Some(mv) = moves.choose(&mut rng) else {
                break;
            };
            board.apply_move(mv);
            assert!(!board.is_king_in_check(side), "seed {seed}: {}", mv.to_uci());
        }
    }
}

#[test]
fn fools_mate() {
    let mut board = Board::new();
    for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        let (from, to) = mv.split_at(2);
        let id = board.piece_at(sq(from)).unwrap();
        assert!(board.is_legal_move(id, sq(to)));
        let mv = board.build_move(id, sq(to)).unwrap();
        board.apply_move(&mv);
    }
    assert!(board.is_king_in_check(Color::White));
    assert!(board.is_checkmate(Color::White));
    assert!(!board.is_stalemate(Color::White));
    assert_eq!(board.game_result(), Some(Status::Checkmate(Color::Black)));
}

#[test]
fn lone_king_stalemate() {
    // . . . . . . . ♚
    // . . . . . ♕ . .
    // . . . . . . ♔ .
    // . . . . . . . .
    // . . . . . . . .
    // . . . . . . . .
    // . . . . . . . .
    // . . . . . . . .
    let mut game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 0).unwrap();
    let status = game.game_status();
    assert!(status.is_stalemate);
    assert!(!status.is_checkmate);
    assert!(!status.in_check);
    assert_eq!(game.legal_moves_for(sq("h8")).len(), 0);
}

#[test]
fn en_passant_takes_the_pawn_beside() {
    let mut game = Game::with_seed(0);
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
    assert!(game.legal_moves_for(sq("e5")).contains(sq("d6")));

    let outcome = game.attempt_move(sq("e5"), sq("d6"));
    assert!(outcome.accepted);
    assert_eq!(outcome.special, Some(MoveFlag::EnPassantCapture));
    assert_eq!(outcome.captured, Some(PieceType::Pawn));
    assert!(game.board().piece_on(sq("d5")).is_none());
    let d6 = game.board().piece_on(sq("d6")).unwrap();
    assert_eq!((d6.color, d6.piece_type), (Color::White, PieceType::Pawn));
}

#[test]
fn en_passant_expires_after_one_ply() {
    let mut game = Game::with_seed(0);
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"]);
    assert!(!game.legal_moves_for(sq("e5")).contains(sq("d6")));
}

#[test]
fn single_step_beside_a_pawn_is_not_en_passant() {
    // . . . . ♚ . . .
    // . . . . . . . .
    // . . . . ♟ . . .
    // . . . ♙ . . . .
    // . . . . . . . .
    // . . . . . . . .
    // . . . . . . . .
    // . . . . ♔ . . .
    let mut game = Game::from_fen("4k3/8/4p3/3P4/8/8/8/4K3 b - - 0 1", 0).unwrap();
    play(&mut game, &["e6e5"]);
    assert_eq!(game.legal_moves_for(sq("d5")).iter().collect::<Vec<_>>(), vec![sq("d6")]);

    let outcome = game.attempt_move(sq("d5"), sq("e6"));
    assert!(!outcome.accepted);
    assert!(game.board().piece_on(sq("e5")).is_some());
}

#[test]
fn en_passant_only_follows_a_double_step() {
    let mut game = Game::with_seed(0);
    // the d-pawn reaches d5 in two single steps
    play(&mut game, &["e2e4", "d7d6", "e4e5", "d6d5"]);
    assert!(!game.legal_moves_for(sq("e5")).contains(sq("d6")));

    play(&mut game, &["a2a3", "d5d4", "c2c4"]);
    assert!(game.legal_moves_for(sq("d4")).contains(sq("c3")));
}

#[test]
fn castling_moves_the_rook() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", 0).unwrap();
    let targets = game.legal_moves_for(sq("e1"));
    assert!(targets.contains(sq("c1")));
    assert!(targets.contains(sq("g1")));

    let outcome = game.attempt_move(sq("e1"), sq("c1"));
    assert_eq!(outcome.special, Some(MoveFlag::CastleQueenside));
    let board = game.board();
    assert!(board.piece_on(sq("a1")).is_none());
    assert_eq!(board.piece_on(sq("d1")).map(|p| p.piece_type), Some(PieceType::Rook));
    assert_eq!(board.piece_on(sq("c1")).map(|p| p.piece_type), Some(PieceType::King));
}

#[test]
fn pruning_never_changes_the_score() {
    let mut game = Game::with_seed(0);
    play(&mut game, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);
    let mut board = game.board().clone();
    for seed in 0..5 {
        let pruned = minimax(&mut board, Color::White, 2, &mut StdRng::seed_from_u64(seed)).unwrap();
        let full =
            minimax_no_pruning(&mut board, Color::White, 2, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert_eq!(pruned.best_score, full.best_score, "seed {seed}");
    }
}

#[test]
fn reset_discards_promoted_pieces() {
    let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", 0).unwrap();
    let start = game.board().clone();
    let outcome = game.attempt_move(sq("a7"), sq("a8"));
    assert_eq!(outcome.special, Some(MoveFlag::Promotion(PieceType::Queen)));
    assert_eq!(game.board().pieces().count(), start.pieces().count() + 1);

    game.reset_game();
    assert_eq!(game.board(), &start);
}
