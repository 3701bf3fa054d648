//! A strong solver for the board game 'Connect 4'
//!
//! Given any legal position, the solver computes its exact game-theoretic
//! value with an optimised alpha-beta game tree search, optionally seeded
//! by a precomputed opening book.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_solver::{bitboard::BitBoard, solver::Solver};
//!
//!# fn main() -> anyhow::Result<()> {
//! let board = BitBoard::from_moves("112233")?;
//! let mut solver = Solver::new();
//!
//! // the first player completes a horizontal alignment on their next move
//! assert_eq!(solver.solve(&board, false), 18);
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod transposition_table;

pub mod bitboard;

pub mod opening_book;

pub mod solver;


/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

// ensure that the given dimensions fit in a u64 for the bitboard representation
const_assert!(WIDTH * (HEIGHT + 1) < 64);
