//! Square sets and precomputed movement tables.
//!
//! A `SquareSet` is a 64-bit integer where each bit represents a square on the board.
//! Square indexing follows [`Square::index`]: a8 = 0, b8 = 1, ..., h8 = 7, a7 = 8, ..., h1 = 63.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not, Sub};

use itertools::{iproduct, Itertools};
use once_cell::sync::Lazy;

use crate::types::Square;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SquareSet(pub u64);

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet(0);

    #[inline(always)]
    pub fn from_square(square: Square) -> SquareSet {
        SquareSet(1u64 << square.index())
    }

    #[inline(always)]
    pub fn contains(&self, square: Square) -> bool {
        self.0 & (1u64 << square.index()) != 0
    }

    #[inline(always)]
    pub fn insert(&mut self, square: Square) {
        self.0 |= 1u64 << square.index();
    }

    #[inline(always)]
    pub fn remove(&mut self, square: Square) {
        self.0 &= !(1u64 << square.index());
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_subset(&self, other: SquareSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(&self) -> SquareSetIter {
        SquareSetIter(self.0)
    }
}

/// Iterate over set bits, lowest index first
pub struct SquareSetIter(u64);

impl Iterator for SquareSetIter {
    type Item = Square;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let index = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1; // Clear the lowest set bit
            Some(Square::from_index(index))
        }
    }
}

impl IntoIterator for SquareSet {
    type Item = Square;
    type IntoIter = SquareSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        let mut set = SquareSet::EMPTY;
        for square in iter {
            set.insert(square);
        }
        set
    }
}

impl BitOr for SquareSet {
    type Output = SquareSet;
    fn bitor(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for SquareSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for SquareSet {
    type Output = SquareSet;
    fn bitand(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 & rhs.0)
    }
}

impl Sub for SquareSet {
    type Output = SquareSet;
    fn sub(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 & !rhs.0)
    }
}

impl Not for SquareSet {
    type Output = SquareSet;
    fn not(self) -> Self::Output {
        SquareSet(!self.0)
    }
}

impl fmt::Display for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.iter().join(", "))
    }
}

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Row/column steps of the rook directions followed by the bishop directions
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Precomputed leaper targets and ray walks for every square
pub struct AttackTables {
    pub knight: [SquareSet; 64],
    pub king: [SquareSet; 64],
    /// Squares along each rook direction, nearest first
    pub rook_rays: Vec<[Vec<Square>; 4]>,
    /// Squares along each bishop direction, nearest first
    pub bishop_rays: Vec<[Vec<Square>; 4]>,
}

fn ray(from: Square, (d_row, d_col): (i8, i8)) -> Vec<Square> {
    std::iter::successors(from.offset(d_row, d_col), |sq| sq.offset(d_row, d_col)).collect()
}

impl AttackTables {
    fn new() -> Self {
        let mut knight = [SquareSet::EMPTY; 64];
        let mut king = [SquareSet::EMPTY; 64];
        let mut rook_rays = Vec::with_capacity(64);
        let mut bishop_rays = Vec::with_capacity(64);

        for square in Square::all() {
            knight[square.index()] = KNIGHT_OFFSETS
                .iter()
                .filter_map(|&(dr, dc)| square.offset(dr, dc))
                .collect();
            king[square.index()] = iproduct!(-1i8..=1, -1i8..=1)
                .filter(|&delta| delta != (0, 0))
                .filter_map(|(dr, dc)| square.offset(dr, dc))
                .collect();
            rook_rays.push(ROOK_DIRECTIONS.map(|dir| ray(square, dir)));
            bishop_rays.push(BISHOP_DIRECTIONS.map(|dir| ray(square, dir)));
        }

        AttackTables {
            knight,
            king,
            rook_rays,
            bishop_rays,
        }
    }
}

pub static ATTACK_TABLES: Lazy<AttackTables> = Lazy::new(AttackTables::new);

/// Squares strictly between `a` and `b` when they share a rank, file or diagonal.
/// Empty when they are not aligned or adjacent.
pub fn between(a: Square, b: Square) -> SquareSet {
    let d_row = b.row() as i8 - a.row() as i8;
    let d_col = b.col() as i8 - a.col() as i8;
    if (d_row, d_col) == (0, 0) || !(d_row == 0 || d_col == 0 || d_row.abs() == d_col.abs()) {
        return SquareSet::EMPTY;
    }
    let step = (d_row.signum(), d_col.signum());
    ray(a, step).into_iter().take_while(|&sq| sq != b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn set(squares: &[&str]) -> SquareSet {
        squares.iter().map(|s| sq(s)).collect()
    }

    #[test]
    fn test_insert_contains_remove() {
        let mut s = SquareSet::EMPTY;
        assert!(s.is_empty());
        s.insert(sq("e4"));
        s.insert(sq("a8"));
        assert!(s.contains(sq("e4")));
        assert!(!s.contains(sq("e5")));
        assert_eq!(s.len(), 2);
        s.remove(sq("e4"));
        assert_eq!(s, SquareSet::from_square(sq("a8")));
    }

    #[test]
    fn test_iter_visits_every_square() {
        let s = set(&["a8", "h1", "d4"]);
        let squares: Vec<Square> = s.iter().collect();
        assert_eq!(squares, vec![sq("a8"), sq("d4"), sq("h1")]);
    }

    #[test]
    fn test_knight_table() {
        assert_eq!(ATTACK_TABLES.knight[sq("a1").index()], set(&["b3", "c2"]));
        assert_eq!(ATTACK_TABLES.knight[sq("d4").index()].len(), 8);
    }

    #[test]
    fn test_king_table() {
        assert_eq!(ATTACK_TABLES.king[sq("h8").index()], set(&["g8", "g7", "h7"]));
        assert_eq!(ATTACK_TABLES.king[sq("e4").index()].len(), 8);
    }

    #[test]
    fn test_rays_stop_at_edge() {
        let rays = &ATTACK_TABLES.rook_rays[sq("a1").index()];
        // up the board is row -1
        assert_eq!(rays[0].len(), 7);
        assert_eq!(rays[0][0], sq("a2"));
        assert!(rays[1].is_empty());
        assert!(rays[2].is_empty());
        assert_eq!(rays[3].last(), Some(&sq("h1")));
    }

    #[test]
    fn test_between() {
        assert_eq!(between(sq("a1"), sq("a4")), set(&["a2", "a3"]));
        assert_eq!(between(sq("h8"), sq("e5")), set(&["g7", "f6"]));
        assert_eq!(between(sq("e1"), sq("h1")), set(&["f1", "g1"]));
        assert_eq!(between(sq("e1"), sq("e2")), SquareSet::EMPTY);
        assert_eq!(between(sq("b1"), sq("c3")), SquareSet::EMPTY);
    }
}
