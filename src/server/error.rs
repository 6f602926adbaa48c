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
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::game::SessionError;

/// Every way a request can fail, rendered as `{"success": false, "error": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid request body: {0}")]
    Json(#[from] JsonRejection),
    #[error("invalid query: {0}")]
    Query(#[from] QueryRejection),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Session(SessionError::UnknownGame(_)) => StatusCode::NOT_FOUND,
            ApiError::Session(SessionError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Session(_)
            | ApiError::BadRequest(_)
            | ApiError::Json(_)
            | ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });
        if let ApiError::Session(SessionError::GameOver { fen, outcome, .. }) = &self {
            body["fen"] = json!(fen);
            body["is_game_over"] = json!(true);
            if let Some(result) = outcome.result() {
                body["game_result"] = json!(result);
            }
            if let Some(winner) = outcome.winner() {
                body["winner"] = json!(winner);
            }
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameId;
    use crate::{Move, MoveError, Outcome};

    #[test]
    fn test_status_codes() {
        let id = GameId::default();
        let illegal = MoveError::IllegalMove("e2e5".parse::<Move>().unwrap());
        let cases = [
            (SessionError::UnknownGame(id.clone()), StatusCode::NOT_FOUND),
            (SessionError::Conflict(id.clone()), StatusCode::CONFLICT),
            (SessionError::IllegalMove(illegal), StatusCode::BAD_REQUEST),
            (
                SessionError::GameOver {
                    id,
                    fen: String::new(),
                    outcome: Outcome::Stalemate,
                },
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
