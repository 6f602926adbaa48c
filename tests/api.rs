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

//! HTTP contract tests driven through `Router::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chess_referee::game::Registry;
use chess_referee::search::Budget;
use chess_referee::server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn app() -> Router {
    router(AppState::new(Registry::new(Budget::depth(2))))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_new_game() {
    let app = app();
    let (status, body) = post(&app, "/api/new_game", json!({"game_id": "g1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"fen": START, "turn": "white", "is_game_over": false})
    );
}

#[tokio::test]
async fn test_game_id_defaults() {
    let app = app();
    let (status, _) = post(&app, "/api/new_game", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = post(&app, "/api/move", json!({"from": "e2", "to": "e4"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turn"], "black");
    let (_, body) = get(&app, "/api/board_state?game_id=default").await;
    assert_eq!(body["moves"], json!(["e2e4"]));
}

#[tokio::test]
async fn test_move_then_computer_reply() {
    let app = app();
    post(&app, "/api/new_game", json!({"game_id": "g"})).await;
    let (status, body) = post(
        &app,
        "/api/move",
        json!({"game_id": "g", "from": "e2", "to": "e4"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["move"], "e2e4");
    assert_eq!(
        body["fen"],
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
    );
    assert_eq!(body["is_game_over"], false);
    assert!(body.get("game_result").is_none());

    let (status, body) = post(&app, "/api/computer_move", json!({"game_id": "g"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["turn"], "white");
    assert_eq!(body["move"].as_str().unwrap().len(), 4);

    let (status, state) = get(&app, "/api/board_state?game_id=g").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["fen"], body["fen"]);
    assert_eq!(state["moves"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_illegal_move_is_rejected() {
    let app = app();
    post(&app, "/api/new_game", json!({"game_id": "g"})).await;
    let (status, body) = post(
        &app,
        "/api/move",
        json!({"game_id": "g", "from": "e2", "to": "e5"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("e2e5"));

    let (_, state) = get(&app, "/api/board_state?game_id=g").await;
    assert_eq!(state["fen"], START);
}

#[tokio::test]
async fn test_bad_square_is_rejected() {
    let app = app();
    post(&app, "/api/new_game", json!({"game_id": "g"})).await;
    let (status, body) = post(
        &app,
        "/api/move",
        json!({"game_id": "g", "from": "e9", "to": "e4"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_game() {
    let app = app();
    let (status, body) = post(
        &app,
        "/api/move",
        json!({"game_id": "nope", "from": "e2", "to": "e4"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    let (status, _) = post(&app, "/api/computer_move", json!({"game_id": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, "/api/board_state?game_id=nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkmate_and_game_over() {
    let app = app();
    post(&app, "/api/new_game", json!({"game_id": "mate"})).await;
    let mut last = Value::Null;
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
        let (status, body) = post(
            &app,
            "/api/move",
            json!({"game_id": "mate", "from": from, "to": to}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["is_game_over"], true);
    assert_eq!(last["game_result"], "checkmate");
    assert_eq!(last["winner"], "black");

    let (status, body) = post(&app, "/api/computer_move", json!({"game_id": "mate"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["is_game_over"], true);
    assert_eq!(body["fen"], last["fen"]);
    assert_eq!(body["game_result"], "checkmate");
}

#[tokio::test]
async fn test_promotion_defaults_to_queen() {
    let app = app();
    let (status, body) = post(
        &app,
        "/api/new_game",
        json!({"game_id": "p", "fen": "4k3/1P6/8/8/8/8/8/4K3 w - - 0 1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turn"], "white");
    let (status, body) = post(
        &app,
        "/api/move",
        json!({"game_id": "p", "from": "b7", "to": "b8"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["move"], "b7b8q");
    assert_eq!(body["fen"], "1Q2k3/8/8/8/8/8/8/4K3 b - - 0 1");
}

#[tokio::test]
async fn test_explicit_underpromotion() {
    let app = app();
    post(
        &app,
        "/api/new_game",
        json!({"game_id": "p", "fen": "4k3/1P6/8/8/8/8/8/4K3 w - - 0 1"}),
    )
    .await;
    let (status, body) = post(
        &app,
        "/api/move",
        json!({"game_id": "p", "from": "b7", "to": "b8", "promotion": "knight"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["move"], "b7b8n");
}

#[tokio::test]
async fn test_malformed_position() {
    let app = app();
    let (status, body) = post(
        &app,
        "/api/new_game",
        json!({"game_id": "bad", "fen": "8/8/8/8/8/8/8/8 w - - 0 1"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_incomplete_body_is_a_structured_failure() {
    let app = app();
    post(&app, "/api/new_game", json!({})).await;
    let (status, body) = post(&app, "/api/move", json!({"from": "e2"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid request body"));

    let (status, body) = post(&app, "/api/move", json!({"from": "e2", "to": 4})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_body_without_json_content_type() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/new_game")
        .body(Body::from("game_id=g"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}
