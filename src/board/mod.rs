// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! Chess rules for an authoritative game server
//!
//! A _board_ holds the state of a standard chess game and decides which
//! moves are legal and how a game ends. The following features are
//! supported:
//!
//! [x] Standard chess rules, including castling, en passant and promotion
//! [x] Forsyth-Edwards Notation (FEN) for reading and writing positions
//! [x] Checkmate and stalemate
//! [x] Five-fold repetition
//! [x] Seventy-five-move rule
//! [x] Insufficient mating material (K v K, K+minor v K, same-colored bishops)
//! [x] Perft node counts for validating the move generator
//! [ ] Chess960
//! [ ] Claimable draws (three-fold repetition, fifty-move rule)
//!
//! Some of the key abstractions include:
//!
//! * A `Square` represents the coordinates for a single square
//!   on an 8-by-8 board. The 8 rows and 8 columns on a board
//!   are represented by `Rank` (`Rank1` .. `Rank8`) and `File`
//!   (`FileA` .. `FileH`) respectively. Squares are named using the
//!   letter of the file followed by the number of the rank (`e4`).
//!
//! * A `Mask` is a 64-bit (u64) value in which each bit maps to a
//!   square on the board. Masks can be combined or modified using
//!   bitwise `|`, `|=`, `&`, `&=` and `!` operators.
//!
//! * `Material` represents a piece of a specific color. A `Piece` has
//!   six variants and `Color` is either `White` or `Black`. Pawn
//!   promotions use a separate `Promotion` type with four variants.
//!
//! * A `Position` is an immutable snapshot of the board: contents of each
//!   square, side to move, castling rights, en passant target and the move
//!   counters. `Position::apply` returns the successor position for a
//!   `LegalMove`; the original is never modified.
//!
//! * The `LegalMoves` trait generates and validates moves for anything that
//!   wraps a position. A `Move` is what a client asks for; a `LegalMove` is
//!   a move known to be legal in a specific position.
//!
//! * An `Outcome` classifies a position as in progress or finished, and a
//!   `Game` strings positions together, tracking history so repetitions
//!   can be recognized.
//!

mod castling;
mod fen;
mod material;
mod moves;
mod outcome;
mod play;
mod position;
mod square;

pub use castling::*;
pub use fen::*;
pub use material::*;
pub use moves::*;
pub use outcome::*;
pub use play::*;
pub use position::*;
pub use square::*;

pub trait Turn {
    fn turn(&self) -> Color;
}
