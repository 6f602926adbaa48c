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

use std::ops::Index;
use thiserror::Error;

use super::material::{Color, Material};
use super::moves::{LegalMove, LegalMoves, Move, MoveError};
use super::outcome::Outcome;
use super::position::{MoveId, Pos, Position};
use super::square::Square;
use super::Turn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    #[error("the game is over ({0:?})")]
    GameOver(Outcome),
    #[error(transparent)]
    Move(#[from] MoveError),
}

/// A game played from a starting position: the current position, every
/// position that preceded it, the moves played and the resulting outcome.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    history: Vec<Position>,
    moves: Vec<LegalMove>,
    outcome: Outcome,
}

impl Default for Game {
    fn default() -> Self {
        Self::from_position(Position::default())
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a game from an arbitrary position, which may already be over.
    pub fn from_position(position: Position) -> Self {
        let outcome = Outcome::detect(&position, &[]);
        Self {
            position,
            history: Vec::new(),
            moves: Vec::new(),
            outcome,
        }
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }
    pub fn history(&self) -> &[Position] {
        &self.history
    }
    pub fn moves(&self) -> &[LegalMove] {
        &self.moves
    }
    #[inline]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
    #[inline]
    pub fn is_over(&self) -> bool {
        self.outcome.is_over()
    }

    /// Validates and plays a requested move. On error the game is left
    /// untouched.
    pub fn submit_move(&mut self, mv: Move) -> Result<LegalMove, PlayError> {
        self.ensure_in_progress()?;
        let mv = self.validate_move(mv)?;
        self.advance(mv);
        Ok(mv)
    }

    /// Plays a move taken from `legal_moves()` of the current position.
    pub fn play(&mut self, mv: LegalMove) -> Result<MoveId, PlayError> {
        self.ensure_in_progress()?;
        if !self.legal_moves_from(mv.from()).contains(&mv) {
            return Err(MoveError::IllegalMove(mv.to_move()).into());
        }
        Ok(self.advance(mv))
    }

    fn ensure_in_progress(&self) -> Result<(), PlayError> {
        match self.outcome {
            Outcome::InProgress => Ok(()),
            outcome => Err(PlayError::GameOver(outcome)),
        }
    }

    fn advance(&mut self, mv: LegalMove) -> MoveId {
        let next = self.position.apply(mv);
        let prior = std::mem::replace(&mut self.position, next);
        self.history.push(prior);
        self.moves.push(mv);
        self.outcome = Outcome::detect(&self.position, &self.history);
        self.position.next_move_id()
    }
}

impl Index<Square> for Game {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        self.position.index(index)
    }
}

impl Turn for Game {
    fn turn(&self) -> Color {
        self.position.turn()
    }
}

impl AsRef<Position> for Game {
    fn as_ref(&self) -> &Position {
        &self.position
    }
}

impl Pos for Game {}

impl LegalMoves for Game {}
