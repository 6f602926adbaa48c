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

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::game::{GameId, GameResult, MoveReport, SessionError};
use crate::{Color, Move, Outcome, Promotion, Square, Turn};

#[derive(Debug, Deserialize)]
pub struct NewGameRequest {
    #[serde(default)]
    pub game_id: GameId,
    /// Optional starting position; the standard one when absent.
    #[serde(default)]
    pub fen: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    #[serde(default)]
    pub game_id: GameId,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub promotion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GameRequest {
    #[serde(default)]
    pub game_id: GameId,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewGameResponse {
    pub fen: String,
    pub turn: Color,
    pub is_game_over: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResponse {
    pub success: bool,
    pub fen: String,
    #[serde(rename = "move")]
    pub played: String,
    pub turn: Color,
    pub is_game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_result: Option<GameResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Color>,
}

impl From<MoveReport> for MoveResponse {
    fn from(report: MoveReport) -> Self {
        Self {
            success: true,
            fen: report.position.to_fen(),
            played: report.played.to_string(),
            turn: report.position.turn(),
            is_game_over: report.outcome.is_over(),
            game_result: report.outcome.result(),
            winner: report.outcome.winner(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardStateResponse {
    pub fen: String,
    pub turn: Color,
    pub is_game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_result: Option<GameResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Color>,
    /// Moves played so far in long algebraic notation.
    pub moves: Vec<String>,
}

pub async fn new_game(
    State(state): State<AppState>,
    request: Result<Json<NewGameRequest>, JsonRejection>,
) -> Result<Json<NewGameResponse>, ApiError> {
    let Json(request) = request?;
    let registry = state.registry.clone();
    let (position, outcome) = run_blocking(move || match request.fen {
        Some(fen) => registry
            .create_from_fen(request.game_id, &fen)
            .map(|snapshot| (snapshot.position, snapshot.outcome)),
        None => Ok((registry.create(request.game_id), Outcome::InProgress)),
    })
    .await?;
    Ok(Json(NewGameResponse {
        fen: position.to_fen(),
        turn: position.turn(),
        is_game_over: outcome.is_over(),
    }))
}

pub async fn submit_move(
    State(state): State<AppState>,
    request: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, ApiError> {
    let Json(request) = request?;
    let mv = parse_move(&request)?;
    let registry = state.registry.clone();
    let id = request.game_id;
    let report = run_blocking(move || registry.submit_move(&id, mv)).await?;
    Ok(Json(report.into()))
}

pub async fn computer_move(
    State(state): State<AppState>,
    request: Result<Json<GameRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, ApiError> {
    let Json(request) = request?;
    let registry = state.registry.clone();
    let id = request.game_id;
    let (_, report) = run_blocking(move || registry.request_computer_move(&id)).await?;
    Ok(Json(report.into()))
}

pub async fn board_state(
    State(state): State<AppState>,
    request: Result<Query<GameRequest>, QueryRejection>,
) -> Result<Json<BoardStateResponse>, ApiError> {
    let Query(request) = request?;
    let registry = state.registry.clone();
    let id = request.game_id;
    let snapshot = run_blocking(move || registry.snapshot(&id)).await?;
    Ok(Json(BoardStateResponse {
        fen: snapshot.position.to_fen(),
        turn: snapshot.position.turn(),
        is_game_over: snapshot.outcome.is_over(),
        game_result: snapshot.outcome.result(),
        winner: snapshot.outcome.winner(),
        moves: snapshot.moves.iter().map(|mv| mv.to_string()).collect(),
    }))
}

fn parse_move(request: &MoveRequest) -> Result<Move, ApiError> {
    let square = |text: &str| {
        text.parse::<Square>()
            .map_err(|_| ApiError::BadRequest(format!("invalid square {text:?}")))
    };
    let promotion = match request.promotion.as_deref() {
        None | Some("") => None,
        Some(text) => Some(
            text.parse::<Promotion>()
                .map_err(|_| ApiError::BadRequest(format!("invalid promotion {text:?}")))?,
        ),
    };
    Ok(Move::new(square(&request.from)?, square(&request.to)?, promotion))
}

/// Registry calls may search for a while, so they run off the async
/// executor.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, SessionError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(ApiError::from)
}
