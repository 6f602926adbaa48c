// Copyright 2026 Tobin Edwards
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

//! Static evaluation in centipawns.
//!
//! Piece-square tables are laid out as seen from White's side, `a8` first.
//! Black pieces read them through `Square::flip`.

use strum::IntoEnumIterator;

use crate::{Color, File, LegalMoves, Offset, Piece, Pos, Position, Square, Turn};

const CENTER_BONUS: i32 = 10;
const CHECK_PENALTY: i32 = 50;
const DOUBLED_PAWN_PENALTY: i32 = 15;
const ISOLATED_PAWN_PENALTY: i32 = 10;
const PAWN_SHIELD_BONUS: i32 = 10;

#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,  0,   0,   0,   0,   0,  0,  0,
    50, 50,  50,  50,  50,  50, 50, 50,
    10, 10,  20,  30,  30,  20, 10, 10,
     5,  5,  10,  25,  25,  10,  5,  5,
     0,  0,   0,  20,  20,   0,  0,  0,
     5, -5, -10,   0,   0, -10, -5,  5,
     5, 10,  10, -20, -20,  10, 10,  5,
     0,  0,   0,   0,   0,   0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20,
    -10,   0,   0,  0,  0,   0,   0, -10,
    -10,   0,   5,  5,  5,   5,   0, -10,
     -5,   0,   5,  5,  5,   5,   0,  -5,
      0,   0,   5,  5,  5,   5,   0,  -5,
    -10,   5,   5,  5,  5,   5,   0, -10,
    -10,   0,   5,  0,  0,   0,   0, -10,
    -20, -10, -10, -5, -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING_TABLE: [i32; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
];

fn table(piece: Piece) -> &'static [i32; 64] {
    match piece {
        Piece::Pawn => &PAWN_TABLE,
        Piece::Knight => &KNIGHT_TABLE,
        Piece::Bishop => &BISHOP_TABLE,
        Piece::Rook => &ROOK_TABLE,
        Piece::Queen => &QUEEN_TABLE,
        Piece::King => &KING_TABLE,
    }
}

/// Scores `position` for the side to move; positive is good for them.
pub fn evaluate(position: &Position) -> i32 {
    let balance = side_score(position, Color::White) - side_score(position, Color::Black);
    let mut score = balance * position.turn().sign();
    if position.is_check() {
        score -= CHECK_PENALTY;
    }
    score
}

fn side_score(position: &Position, color: Color) -> i32 {
    let mut score = 0;
    for square in position.occupied_by(color).iter() {
        let Some(material) = position[square] else {
            continue;
        };
        let piece = material.piece();
        let relative = match color {
            Color::White => square,
            Color::Black => square.flip(),
        };
        score += piece.value() + table(piece)[relative.to_index()];
        if matches!(square, Square::D4 | Square::D5 | Square::E4 | Square::E5) {
            score += CENTER_BONUS;
        }
    }
    score + pawn_structure(position, color) + king_shield(position, color)
}

/// Penalizes doubled and isolated pawns.
fn pawn_structure(position: &Position, color: Color) -> i32 {
    let pawns = position.pawns() & position.occupied_by(color);
    let mut score = 0;
    for file in File::iter() {
        let count = (pawns & file.to_mask()).len() as i32;
        if count > 1 {
            score -= DOUBLED_PAWN_PENALTY * (count - 1);
        }
        if count > 0 && (pawns & file.neighbors()).is_empty() {
            score -= ISOLATED_PAWN_PENALTY * count;
        }
    }
    score
}

/// Rewards pawns directly in front of the king while the opponent still
/// has a queen.
fn king_shield(position: &Position, color: Color) -> i32 {
    if (position.queens() & position.occupied_by(!color)).is_empty() {
        return 0;
    }
    let Some(king) = position.king(color) else {
        return 0;
    };
    let forward = -(color.sign() as isize);
    let pawns = position.pawns() & position.occupied_by(color);
    (-1..=1)
        .filter_map(|dx| king + Offset::new(dx, forward))
        .filter(|&square| pawns.contains(square))
        .count() as i32
        * PAWN_SHIELD_BONUS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fen(text: &str) -> Position {
        Position::from_fen(text).unwrap()
    }

    #[test]
    fn test_tables_are_mirrored() {
        assert_eq!(PAWN_TABLE[Square::E2.to_index()], -20);
        assert_eq!(PAWN_TABLE[Square::E7.flip().to_index()], -20);
        assert_eq!(PAWN_TABLE[Square::A7.to_index()], 50);
        assert_eq!(KNIGHT_TABLE[Square::E4.to_index()], 20);
        assert_eq!(KING_TABLE[Square::G1.to_index()], 30);
    }
    #[test]
    fn test_start_position_is_balanced() {
        assert_eq!(evaluate(&Position::default()), 0);
        let position = fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1");
        assert_eq!(evaluate(&position), 0);
    }
    #[test]
    fn test_score_is_from_side_to_move() {
        let white = fen("3qk3/8/8/8/8/8/8/3QK3 w - - 0 1");
        let up_a_queen = fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1");
        let down_a_queen = fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1");
        assert!(evaluate(&up_a_queen) > evaluate(&white) + 800);
        assert!(evaluate(&down_a_queen) < -800);
    }
    #[test]
    fn test_check_is_penalized() {
        let quiet = fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1");
        let checked = fen("R3k3/8/8/8/8/8/8/4K3 b - - 0 1");
        // the rook's table value is the same on a1 and a8 for both
        assert_eq!(evaluate(&checked), evaluate(&quiet) - CHECK_PENALTY);
    }
    #[test]
    fn test_pawn_structure() {
        let healthy = fen("4k3/8/8/8/8/8/3PP3/4K3 w - - 0 1");
        assert_eq!(pawn_structure(&healthy, Color::White), 0);
        let doubled = fen("4k3/8/8/8/8/4P3/4P3/4K3 w - - 0 1");
        assert_eq!(
            pawn_structure(&doubled, Color::White),
            -DOUBLED_PAWN_PENALTY - 2 * ISOLATED_PAWN_PENALTY
        );
    }
    #[test]
    fn test_king_shield_needs_enemy_queen() {
        let position = fen("3qk3/8/8/8/8/8/5PPP/6K1 w - - 0 1");
        assert_eq!(king_shield(&position, Color::White), 3 * PAWN_SHIELD_BONUS);
        let position = fen("4k3/8/8/8/8/8/5PPP/6K1 w - - 0 1");
        assert_eq!(king_shield(&position, Color::White), 0);
    }
}
