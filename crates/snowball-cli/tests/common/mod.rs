//! Shared test helpers for host integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use snowball_cli::requests;
use snowball_cli::state::AppState;
use snowball_core::clock::Clock;
use snowball_core::rng::DeterministicRng;
use snowball_event_store::memory_event_repository::InMemoryEventRepository;
use snowball_game::domain::catalog::ScenarioCatalog;
use snowball_game::domain::config::GameConfig;
use snowball_test_support::{FixedClock, MockRng, fixed_now};
use uuid::Uuid;

/// Build host state over the built-in catalog with a fixed clock and an RNG
/// that always deals the opening scenario.
pub fn build_test_state() -> AppState {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock(fixed_now()));
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
    AppState::new(
        clock,
        rng,
        Arc::new(InMemoryEventRepository::new()),
        Arc::new(ScenarioCatalog::builtin().unwrap()),
        Arc::new(GameConfig::default()),
    )
}

/// Run one request through the host and return the response as JSON.
pub async fn send(state: &AppState, request: &Value) -> Value {
    let response = requests::handle_line(state, &request.to_string()).await;
    serde_json::to_value(&response).unwrap()
}

/// Launch a session and return its ID.
pub async fn launch(state: &AppState, player_id: Uuid) -> Uuid {
    let json = send(state, &json!({ "command": "launch", "player_id": player_id })).await;
    assert_eq!(json["type"], "outcome", "launch failed: {json}");
    json["session_id"].as_str().unwrap().parse().unwrap()
}

/// Submit an input of the given kind, stamped `offset_secs` after the fixed
/// test time.
pub async fn input(state: &AppState, session_id: Uuid, kind: Value, offset_secs: i64) -> Value {
    let timestamp = fixed_now() + chrono::Duration::seconds(offset_secs);
    send(
        state,
        &json!({
            "command": "input",
            "session_id": session_id,
            "input": { "kind": kind, "timestamp": timestamp },
        }),
    )
    .await
}

/// Submit a button press from `gadget`.
pub async fn press(state: &AppState, session_id: Uuid, gadget: &str, offset_secs: i64) -> Value {
    let timestamp = fixed_now() + chrono::Duration::seconds(offset_secs);
    send(
        state,
        &json!({
            "command": "input",
            "session_id": session_id,
            "input": {
                "kind": "button_pressed",
                "source_id": gadget,
                "timestamp": timestamp,
            },
        }),
    )
    .await
}

/// Say something to the session.
pub async fn say(state: &AppState, session_id: Uuid, utterance: &str, offset_secs: i64) -> Value {
    input(state, session_id, json!({ "voice": utterance }), offset_secs).await
}
