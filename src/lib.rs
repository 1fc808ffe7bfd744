pub mod types;
pub mod error;
pub mod bitboard;
pub mod board;
pub mod movegen;
pub mod legal;
pub mod status;
pub mod evaluate;
pub mod search;
pub mod engine;
pub mod game;
pub mod perft;
