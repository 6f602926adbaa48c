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

use thiserror::Error;

use super::GameId;
use crate::{FenError, Game, LegalMove, Move, MoveError, Outcome, PlayError, Position};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown game {0}")]
    UnknownGame(GameId),
    #[error(transparent)]
    IllegalMove(#[from] MoveError),
    #[error("game {id} is over")]
    GameOver { id: GameId, fen: String, outcome: Outcome },
    #[error("game {0} is busy with another request")]
    Conflict(GameId),
    #[error("malformed position: {0}")]
    MalformedPosition(#[from] FenError),
}

/// What changed after a move was played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub position: Position,
    pub played: LegalMove,
    pub outcome: Outcome,
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: GameId,
    pub position: Position,
    pub outcome: Outcome,
    pub moves: Vec<LegalMove>,
}

/// One game as seen by the server.
#[derive(Debug, Clone)]
pub struct Session {
    id: GameId,
    game: Game,
}

impl Session {
    pub fn new(id: GameId) -> Self {
        Self::from_position(id, Position::default())
    }

    pub fn from_position(id: GameId, position: Position) -> Self {
        Self {
            id,
            game: Game::from_position(position),
        }
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Validates and plays a client's move. The game is unchanged on error.
    pub fn submit_move(&mut self, mv: Move) -> Result<MoveReport, SessionError> {
        let played = self.game.submit_move(mv).map_err(|err| self.reject(err))?;
        Ok(self.report(played))
    }

    /// Plays a move chosen from the current legal moves.
    pub fn play(&mut self, mv: LegalMove) -> Result<MoveReport, SessionError> {
        self.game.play(mv).map_err(|err| self.reject(err))?;
        Ok(self.report(mv))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            id: self.id.clone(),
            position: self.game.position().clone(),
            outcome: self.game.outcome(),
            moves: self.game.moves().to_vec(),
        }
    }

    pub(super) fn game_over(&self) -> SessionError {
        SessionError::GameOver {
            id: self.id.clone(),
            fen: self.game.position().to_fen(),
            outcome: self.game.outcome(),
        }
    }

    fn reject(&self, err: PlayError) -> SessionError {
        match err {
            PlayError::GameOver(_) => self.game_over(),
            PlayError::Move(err) => err.into(),
        }
    }

    fn report(&self, played: LegalMove) -> MoveReport {
        MoveReport {
            position: self.game.position().clone(),
            played,
            outcome: self.game.outcome(),
        }
    }
}
