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

use crate::game::GameResult;

use super::material::Color;
use super::moves::LegalMoves;
use super::position::{MatingMaterial, Position};
use super::Turn;

/// Plies without a capture or pawn move after which the game is drawn.
pub const SEVENTY_FIVE_MOVE_PLIES: usize = 150;
/// Occurrences of the same position after which the game is drawn.
pub const FIVEFOLD: usize = 5;

/// State of a game as seen from its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    InProgress,
    Checkmate {
        winner: Color,
    },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
}

impl Outcome {
    /// Classifies `position`. `history` holds the positions that preceded
    /// it in the game, oldest first, and is only consulted for repetitions.
    pub fn detect(position: &Position, history: &[Position]) -> Self {
        if !position.has_legal_moves() {
            return if position.is_check() {
                Outcome::Checkmate {
                    winner: !position.turn(),
                }
            } else {
                Outcome::Stalemate
            };
        }
        if position.halfmove_clock() >= SEVENTY_FIVE_MOVE_PLIES {
            return Outcome::SeventyFiveMoves;
        }
        if is_insufficient(position) {
            return Outcome::InsufficientMaterial;
        }
        if repetitions(position, history) >= FIVEFOLD {
            return Outcome::FivefoldRepetition;
        }
        Outcome::InProgress
    }

    pub fn is_over(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    pub fn result(&self) -> Option<GameResult> {
        match self {
            Outcome::InProgress => None,
            Outcome::Checkmate { .. } => Some(GameResult::Checkmate),
            Outcome::Stalemate => Some(GameResult::Stalemate),
            Outcome::InsufficientMaterial => Some(GameResult::InsufficientMaterial),
            Outcome::SeventyFiveMoves => Some(GameResult::SeventyfiveMoves),
            Outcome::FivefoldRepetition => Some(GameResult::FivefoldRepetition),
        }
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }
}

/// Neither side can possibly mate: K v K, K and one minor piece v K, or
/// K and B v K and B with both bishops on squares of the same color.
pub fn is_insufficient(position: &Position) -> bool {
    use MatingMaterial::*;
    match (
        position.mating_material(Color::White),
        position.mating_material(Color::Black),
    ) {
        (Sufficient, _) | (_, Sufficient) => false,
        (LoneKing, _) | (_, LoneKing) => true,
        (OneBishop(ours), OneBishop(theirs)) => ours == theirs,
        _ => false,
    }
}

/// How often the position occurs in the game, counting itself. Only the
/// plies since the last capture or pawn move can repeat it.
fn repetitions(position: &Position, history: &[Position]) -> usize {
    let key = position.key();
    let earlier = history
        .iter()
        .rev()
        .take(position.halfmove_clock())
        .filter(|prior| prior.key() == key)
        .count();
    earlier + 1
}
