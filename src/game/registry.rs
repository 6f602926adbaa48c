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

use parking_lot::{Mutex, MutexGuard, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{GameId, MoveReport, Session, SessionError, Snapshot};
use crate::search::{Budget, Searcher};
use crate::{LegalMove, LegalMoves, Move, Position};

type SessionHandle = Arc<Mutex<Session>>;

/// All live game sessions, keyed by id.
///
/// Every session has its own lock. Writers never wait for it: a request
/// that finds its session locked fails with `SessionError::Conflict` and
/// may be retried. The map lock is only held while looking a session up.
pub struct Registry {
    sessions: RwLock<HashMap<GameId, SessionHandle>>,
    searcher: Searcher,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Budget::default())
    }
}

impl Registry {
    pub fn new(budget: Budget) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            searcher: Searcher::new(budget),
        }
    }

    /// Starts a game from the standard position, replacing any game
    /// already registered under `id`.
    pub fn create(&self, id: GameId) -> Position {
        let position = Position::default();
        self.insert(Session::new(id));
        position
    }

    /// Starts a game from a FEN position, replacing any game already
    /// registered under `id`.
    pub fn create_from_fen(&self, id: GameId, fen: &str) -> Result<Snapshot, SessionError> {
        let position = Position::from_fen(fen)?;
        let session = Session::from_position(id, position);
        let snapshot = session.snapshot();
        self.insert(session);
        Ok(snapshot)
    }

    pub fn submit_move(&self, id: &GameId, mv: Move) -> Result<MoveReport, SessionError> {
        let handle = self.session(id)?;
        let mut session = lock(&handle, id)?;
        let report = session.submit_move(mv)?;
        info!(game = %id, mv = %report.played, outcome = ?report.outcome, "move accepted");
        Ok(report)
    }

    /// Lets the engine choose and play a move for the side to move.
    pub fn request_computer_move(
        &self,
        id: &GameId,
    ) -> Result<(LegalMove, MoveReport), SessionError> {
        let handle = self.session(id)?;
        let mut session = lock(&handle, id)?;
        if session.game().is_over() {
            return Err(session.game_over());
        }
        let moves = session.game().legal_moves();
        let search = self
            .searcher
            .select_move(session.game().position(), &moves)
            .ok_or_else(|| session.game_over())?;
        let report = session.play(search.best)?;
        info!(
            game = %id,
            mv = %search.best,
            score = search.score,
            depth = search.depth,
            nodes = search.nodes,
            elapsed_ms = search.elapsed.as_millis() as u64,
            "computer move"
        );
        Ok((search.best, report))
    }

    /// Current state of a game. Waits for a running writer to finish.
    pub fn snapshot(&self, id: &GameId) -> Result<Snapshot, SessionError> {
        let handle = self.session(id)?;
        let session = handle.lock();
        Ok(session.snapshot())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn insert(&self, session: Session) {
        let id = session.id().clone();
        let replaced = self
            .sessions
            .write()
            .insert(id.clone(), Arc::new(Mutex::new(session)))
            .is_some();
        info!(game = %id, replaced, "new game");
    }

    fn session(&self, id: &GameId) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownGame(id.clone()))
    }
}

fn lock<'a>(handle: &'a SessionHandle, id: &GameId) -> Result<MutexGuard<'a, Session>, SessionError> {
    handle.try_lock().ok_or_else(|| {
        debug!(game = %id, "session busy");
        SessionError::Conflict(id.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Outcome, Turn};

    fn mv(text: &str) -> Move {
        text.parse().unwrap()
    }

    #[test]
    fn test_unknown_game() {
        let registry = Registry::default();
        let id = GameId::from("missing");
        assert_eq!(
            registry.submit_move(&id, mv("e2e4")),
            Err(SessionError::UnknownGame(id.clone()))
        );
        assert!(matches!(
            registry.request_computer_move(&id),
            Err(SessionError::UnknownGame(_))
        ));
        assert!(registry.snapshot(&id).is_err());
    }
    #[test]
    fn test_create_replaces_existing_game() {
        let registry = Registry::default();
        let id = GameId::default();
        assert_eq!(registry.create(id.clone()), Position::default());
        registry.submit_move(&id, mv("e2e4")).unwrap();
        registry.create(id.clone());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot(&id).unwrap().position, Position::default());
    }
    #[test]
    fn test_busy_session_conflicts() {
        let registry = Registry::default();
        let id = GameId::default();
        registry.create(id.clone());
        let handle = registry.session(&id).unwrap();
        let _guard = handle.lock();
        assert_eq!(
            registry.submit_move(&id, mv("e2e4")),
            Err(SessionError::Conflict(id.clone()))
        );
        assert_eq!(
            registry.request_computer_move(&id).map(|(mv, _)| mv),
            Err(SessionError::Conflict(id.clone()))
        );
    }
    #[test]
    fn test_computer_replies() {
        let registry = Registry::new(Budget::depth(2));
        let id = GameId::default();
        registry.create(id.clone());
        registry.submit_move(&id, mv("e2e4")).unwrap();
        let (played, report) = registry.request_computer_move(&id).unwrap();
        assert_eq!(report.played, played);
        assert_eq!(report.position.turn(), crate::Color::White);
        assert_eq!(registry.snapshot(&id).unwrap().moves.len(), 2);
    }
    #[test]
    fn test_computer_refuses_finished_game() {
        let registry = Registry::default();
        let id = GameId::default();
        let snapshot = registry
            .create_from_fen(id.clone(), "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1")
            .unwrap();
        assert_eq!(snapshot.outcome, Outcome::Stalemate);
        assert!(matches!(
            registry.request_computer_move(&id),
            Err(SessionError::GameOver {
                outcome: Outcome::Stalemate,
                ..
            })
        ));
    }
    #[test]
    fn test_malformed_position() {
        let registry = Registry::default();
        assert!(matches!(
            registry.create_from_fen(GameId::default(), "not a position"),
            Err(SessionError::MalformedPosition(_))
        ));
        assert!(registry.is_empty());
    }
}
