//! Integration tests for WebSocket real-time event streaming.
//!
//! These tests validate connection handling, event broadcasting, and the
//! events emitted by API calls and by autoplay.

use std::net::TcpListener;
use std::time::Duration;

use abacus_tutor::{create_router, AppState, Config, StepKind, TopicKind, TutorEvent};
use futures::SinkExt;
use futures::StreamExt;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tungstenite::Message;

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Helper type for WebSocket client
type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Spawns the test server and returns its address.
async fn spawn_test_server(state: AppState) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, handle)
}

/// Connects a WebSocket client to the server at `addr`.
async fn connect_client(addr: &str) -> WsClient {
    let (ws_stream, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("Failed to connect to WebSocket");
    ws_stream
}

/// Receives the next text message and parses it as a `TutorEvent`.
/// Automatically handles ping frames by responding with pong.
async fn receive_event(client: &mut WsClient) -> TutorEvent {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("Timeout waiting for message")
            .expect("Stream ended")
            .expect("WebSocket error");

        match msg {
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("Failed to parse event");
            }
            Message::Ping(data) => {
                client
                    .send(Message::Pong(data))
                    .await
                    .expect("Failed to send pong");
            }
            Message::Pong(_) => {}
            other => panic!("Expected text message, got: {other:?}"),
        }
    }
}

async fn post_json(addr: &str, path: &str, body: serde_json::Value) -> serde_json::Value {
    reqwest::Client::new()
        .post(format!("http://{addr}/api{path}"))
        .json(&body)
        .send()
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Response is JSON")
}

// ============================================================================
// Connection Tests
// ============================================================================

/// Tests that a WebSocket client receives a connected event on connection.
#[tokio::test]
async fn test_client_receives_connected_event_on_connect() {
    let (addr, _handle) = spawn_test_server(AppState::new(Config::default())).await;

    let mut client = connect_client(&addr).await;
    let event = receive_event(&mut client).await;

    if let TutorEvent::Connected(payload) = event {
        assert!(payload.progress.topics.is_empty());
        assert_eq!(payload.progress.open_sessions, 0);
    } else {
        panic!("Expected Connected event, got: {event:?}");
    }
}

/// Tests that the connected event reflects sessions opened before connecting.
#[tokio::test]
async fn test_connected_event_contains_current_progress() {
    let state = AppState::new(Config::default());
    state
        .store
        .lock()
        .await
        .open_topic("rounding")
        .expect("Failed to open topic");
    let (addr, _handle) = spawn_test_server(state).await;

    let mut client = connect_client(&addr).await;
    let event = receive_event(&mut client).await;

    if let TutorEvent::Connected(payload) = event {
        assert_eq!(payload.progress.open_sessions, 1);
    } else {
        panic!("Expected Connected event, got: {event:?}");
    }
}

// ============================================================================
// Event Broadcast Tests
// ============================================================================

/// Tests that events are broadcast to all connected clients.
#[tokio::test]
async fn test_events_broadcast_to_all_clients() {
    let state = AppState::new(Config::default());
    let broadcaster = state.broadcaster.clone();
    let (addr, _handle) = spawn_test_server(state).await;

    let mut client1 = connect_client(&addr).await;
    let mut client2 = connect_client(&addr).await;
    let mut client3 = connect_client(&addr).await;

    // Consume connected events
    receive_event(&mut client1).await;
    receive_event(&mut client2).await;
    receive_event(&mut client3).await;

    broadcaster.send(TutorEvent::division_complete(4, 133, 0));

    for client in [&mut client1, &mut client2, &mut client3] {
        let event = receive_event(client).await;
        if let TutorEvent::DivisionComplete(payload) = event {
            assert_eq!(payload.session, 4);
            assert_eq!(payload.quotient, 133);
        } else {
            panic!("Expected DivisionComplete event, got: {event:?}");
        }
    }
}

// ============================================================================
// API Integration Tests
// ============================================================================

/// Tests that a correct topic answer emits `answer_checked` then `celebrate`.
#[tokio::test]
async fn test_correct_answer_triggers_celebrate() {
    let state = AppState::new(Config {
        seed: Some(11),
        ..Config::default()
    });
    let store = state.store.clone();
    let (addr, _handle) = spawn_test_server(state).await;

    let mut client = connect_client(&addr).await;
    receive_event(&mut client).await; // Consume connected event

    let body = post_json(&addr, "/sessions", json!({"topic": "primes"})).await;
    let id = body["id"].as_u64().expect("id");
    post_json(&addr, &format!("/sessions/{id}/practice"), json!({})).await;

    let answer = {
        let store = store.lock().await;
        let widget = store.topic(id).expect("open session");
        widget
            .practice()
            .expect("practising")
            .problem()
            .answer
            .display()
    };
    post_json(
        &addr,
        &format!("/sessions/{id}/answer"),
        json!({ "answer": answer }),
    )
    .await;

    let event = receive_event(&mut client).await;
    if let TutorEvent::AnswerChecked(payload) = event {
        assert_eq!(payload.session, id);
        assert!(payload.correct);
    } else {
        panic!("Expected AnswerChecked event, got: {event:?}");
    }

    let event = receive_event(&mut client).await;
    if let TutorEvent::Celebrate(payload) = event {
        assert_eq!(payload.topic, TopicKind::Primes);
        assert_eq!(payload.streak, 1);
    } else {
        panic!("Expected Celebrate event, got: {event:?}");
    }
}

/// Tests that a wrong division answer reports the expected value.
#[tokio::test]
async fn test_wrong_division_answer_is_broadcast() {
    let (addr, _handle) = spawn_test_server(AppState::new(Config::default())).await;

    let mut client = connect_client(&addr).await;
    receive_event(&mut client).await;

    let body = post_json(&addr, "/division", json!({"dividend": 532, "divisor": 4})).await;
    let id = body["id"].as_u64().expect("id");
    post_json(&addr, &format!("/division/{id}/mode"), json!({"mode": "practice"})).await;
    post_json(&addr, &format!("/division/{id}/answer"), json!({"answer": "3"})).await;

    // Switching to practice moves the cursor to the first interactive step
    let event = receive_event(&mut client).await;
    assert!(matches!(event, TutorEvent::StepAdvanced(_)), "got: {event:?}");

    let event = receive_event(&mut client).await;
    if let TutorEvent::AnswerChecked(payload) = event {
        assert!(!payload.correct);
        assert_eq!(payload.expected, "1");
    } else {
        panic!("Expected AnswerChecked event, got: {event:?}");
    }
}

/// Tests that manual navigation emits `step_advanced` without autoplay.
#[tokio::test]
async fn test_manual_step_is_broadcast() {
    let (addr, _handle) = spawn_test_server(AppState::new(Config::default())).await;

    let mut client = connect_client(&addr).await;
    receive_event(&mut client).await;

    let body = post_json(&addr, "/division", json!({"dividend": 532, "divisor": 4})).await;
    let id = body["id"].as_u64().expect("id");
    post_json(&addr, &format!("/division/{id}/next"), json!({})).await;

    let event = receive_event(&mut client).await;
    if let TutorEvent::StepAdvanced(payload) = event {
        assert_eq!(payload.cursor, 1);
        assert_eq!(payload.step, StepKind::Divide);
        assert!(!payload.autoplay);
    } else {
        panic!("Expected StepAdvanced event, got: {event:?}");
    }
}

/// Tests that autoplay streams every step and finishes with the result.
#[tokio::test]
async fn test_autoplay_streams_steps_until_complete() {
    let (addr, _handle) = spawn_test_server(AppState::new(Config {
        autoplay_interval_ms: 10,
        ..Config::default()
    }))
    .await;

    let mut client = connect_client(&addr).await;
    receive_event(&mut client).await;

    let body = post_json(&addr, "/division", json!({"dividend": 17, "divisor": 5})).await;
    let id = body["id"].as_u64().expect("id");
    let body = post_json(
        &addr,
        &format!("/division/{id}/autoplay"),
        json!({"enabled": true}),
    )
    .await;
    assert_eq!(body["tutor"]["autoplay"], true);

    let mut cursors = Vec::new();
    loop {
        match receive_event(&mut client).await {
            TutorEvent::StepAdvanced(payload) => {
                assert!(payload.autoplay);
                cursors.push(payload.cursor);
            }
            TutorEvent::DivisionComplete(payload) => {
                assert_eq!(payload.session, id);
                assert_eq!((payload.quotient, payload.remainder), (3, 2));
                break;
            }
            other => panic!("Unexpected event during autoplay: {other:?}"),
        }
    }
    assert_eq!(cursors, (1..=8).collect::<Vec<_>>());
}

/// Tests that a failed request is broadcast as an error event.
#[tokio::test]
async fn test_failed_request_broadcasts_error() {
    let (addr, _handle) = spawn_test_server(AppState::new(Config::default())).await;

    let mut client = connect_client(&addr).await;
    receive_event(&mut client).await;

    post_json(&addr, "/division/999/prev", json!({})).await;

    let event = receive_event(&mut client).await;
    if let TutorEvent::Error(payload) = event {
        assert!(payload.message.contains("999"));
    } else {
        panic!("Expected Error event, got: {event:?}");
    }
}
