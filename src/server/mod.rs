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

//! JSON over HTTP
//!
//! | Method | Path                  | Body / query                          |
//! |--------|-----------------------|---------------------------------------|
//! | POST   | `/api/new_game`       | `{game_id, fen?}`                     |
//! | POST   | `/api/move`           | `{game_id, from, to, promotion?}`     |
//! | POST   | `/api/computer_move`  | `{game_id}`                           |
//! | GET    | `/api/board_state`    | `?game_id=`                           |
//!
//! `game_id` defaults to `"default"` everywhere.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::game::Registry;

mod api;
mod error;

pub use api::*;
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/new_game", post(api::new_game))
        .route("/api/move", post(api::submit_move))
        .route("/api/computer_move", post(api::computer_move))
        .route("/api/board_state", get(api::board_state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
