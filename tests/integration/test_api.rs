//! End-to-end tests for the HTTP API against a live server.
//!
//! Each test binds its own port, drives the tutor through `reqwest` and
//! checks the JSON the API returns.

use std::net::TcpListener;
use std::time::Duration;

use abacus_report::{DivisionInput, MarkdownGenerator, ProgressReport, TopicInput};
use abacus_tutor::{create_router, AppState, Config};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Spawns the test server and returns the API base URL.
async fn spawn_test_server(state: AppState) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");
    let base_url = format!("http://{addr}/api");

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (base_url, handle)
}

fn seeded_config() -> Config {
    Config {
        seed: Some(7),
        autoplay_interval_ms: 10,
        ..Config::default()
    }
}

async fn post(client: &Client, url: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("Request failed");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get(client: &Client, url: &str) -> (StatusCode, Value) {
    let response = client.get(url).send().await.expect("Request failed");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

// ============================================================================
// Curriculum
// ============================================================================

#[tokio::test]
async fn test_curriculum_lists_both_grades() {
    let (base, _handle) = spawn_test_server(AppState::new(seeded_config())).await;
    let client = Client::new();

    let (status, body) = get(&client, &format!("{base}/curriculum")).await;
    assert_eq!(status, StatusCode::OK);

    let grades = body["grades"].as_array().expect("grades array");
    assert_eq!(grades.len(), 2);
    let slugs: Vec<&str> = grades
        .iter()
        .flat_map(|g| g["terms"].as_array().into_iter().flatten())
        .flat_map(|t| t["topics"].as_array().into_iter().flatten())
        .filter_map(|t| t["slug"].as_str())
        .collect();
    assert!(slugs.contains(&"long-division"));
    assert!(slugs.contains(&"place-value"));
}

// ============================================================================
// Division tutor
// ============================================================================

/// Works a whole problem in practice mode, answering each step from the
/// step the API exposes.
#[tokio::test]
async fn test_division_practice_to_completion() {
    let (base, _handle) = spawn_test_server(AppState::new(seeded_config())).await;
    let client = Client::new();

    let (status, body) = post(
        &client,
        &format!("{base}/division"),
        json!({"dividend": 532, "divisor": 4}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_u64().expect("id");
    assert_eq!(body["tutor"]["stepCount"], 13);

    let (_, mut body) = post(
        &client,
        &format!("{base}/division/{id}/mode"),
        json!({"mode": "practice"}),
    )
    .await;

    // One deliberate mistake first
    let (_, wrong) = post(
        &client,
        &format!("{base}/division/{id}/answer"),
        json!({"answer": "9"}),
    )
    .await;
    assert_eq!(wrong["tutor"]["error"], true);
    assert_eq!(wrong["tutor"]["cursor"], body["tutor"]["cursor"]);

    for _ in 0..13 {
        if body["tutor"]["complete"] == true {
            break;
        }
        let answer = body["tutor"]["step"]["answer"]
            .as_str()
            .expect("interactive step has an answer")
            .to_string();
        let (status, next) = post(
            &client,
            &format!("{base}/division/{id}/answer"),
            json!({ "answer": answer }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body = next;
    }

    assert_eq!(body["tutor"]["complete"], true);
    assert_eq!(body["tutor"]["board"]["summary"]["quotient"], 133);
    assert_eq!(body["tutor"]["board"]["summary"]["remainder"], 0);

    let (_, progress) = get(&client, &format!("{base}/progress")).await;
    assert_eq!(progress["division"]["problemsCompleted"], 1);
    assert_eq!(progress["division"]["mistakes"], 1);
    assert_eq!(progress["division"]["stepsAnswered"], 12);
}

#[tokio::test]
async fn test_division_board_and_close() {
    let (base, _handle) = spawn_test_server(AppState::new(seeded_config())).await;
    let client = Client::new();

    let (_, body) = post(
        &client,
        &format!("{base}/division"),
        json!({"dividend": 17, "divisor": 5}),
    )
    .await;
    let id = body["id"].as_u64().expect("id");

    let (_, body) = post(
        &client,
        &format!("{base}/division/{id}/jump"),
        json!({"index": 100}),
    )
    .await;
    assert_eq!(body["tutor"]["cursor"], 8);

    let (status, board) = get(&client, &format!("{base}/division/{id}/board")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["summary"]["quotient"], 3);
    assert_eq!(board["summary"]["remainder"], 2);

    let status = client
        .delete(format!("{base}/division/{id}"))
        .send()
        .await
        .expect("Request failed")
        .status();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = get(&client, &format!("{base}/division/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().expect("error").contains("not found"));
}

#[tokio::test]
async fn test_division_rejects_bad_settings() {
    let (base, _handle) = spawn_test_server(AppState::new(seeded_config())).await;
    let client = Client::new();

    let (status, body) = post(
        &client,
        &format!("{base}/division"),
        json!({"dividend": 10, "divisor": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("Suggestion"));

    let (status, _) = post(
        &client,
        &format!("{base}/division"),
        json!({"dividend": 10_000_000_000_u64, "divisor": 3}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Topic widgets and reporting
// ============================================================================

#[tokio::test]
async fn test_topic_practice_feeds_progress_report() {
    let state = AppState::new(seeded_config());
    let store = state.store.clone();
    let (base, _handle) = spawn_test_server(state).await;
    let client = Client::new();

    let (status, body) = post(&client, &format!("{base}/sessions"), json!({"topic": "mass"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_u64().expect("id");

    let (_, body) = post(&client, &format!("{base}/sessions/{id}/practice"), json!({})).await;
    assert_eq!(body["widget"]["phase"], "practice");
    assert!(body["widget"]["problem"]["question"].is_string());
    assert!(body["widget"]["problem"].get("answer").is_none());

    let (_, body) = post(
        &client,
        &format!("{base}/sessions/{id}/answer"),
        json!({"answer": "not a mass"}),
    )
    .await;
    assert_eq!(body["feedback"]["correct"], false);
    assert_eq!(body["feedback"]["streak"], 0);

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
    let (_, body) = post(
        &client,
        &format!("{base}/sessions/{id}/answer"),
        json!({ "answer": answer }),
    )
    .await;
    assert_eq!(body["feedback"]["correct"], true);
    assert_eq!(body["feedback"]["streak"], 1);

    let (_, progress) = get(&client, &format!("{base}/progress")).await;
    let topic = &progress["topics"][0];
    assert_eq!(topic["topic"], "mass");
    assert_eq!(topic["attempts"], 2);
    assert_eq!(topic["correct"], 1);

    let as_u32 = |v: &Value| u32::try_from(v.as_u64().unwrap_or(0)).unwrap_or(0);
    let report = ProgressReport::builder()
        .topic(TopicInput::new(
            topic["topic"].as_str().unwrap_or_default(),
            as_u32(&topic["attempts"]),
            as_u32(&topic["correct"]),
            as_u32(&topic["bestStreak"]),
        ))
        .division(DivisionInput::default())
        .build()
        .expect("consistent progress");
    let markdown = MarkdownGenerator::new(&report).generate();
    assert!(markdown.contains("| Mass | 2 | 1 | 50% | 1 |"));
}

#[tokio::test]
async fn test_long_division_topic_is_not_a_quiz() {
    let (base, _handle) = spawn_test_server(AppState::new(seeded_config())).await;
    let client = Client::new();

    let (status, body) = post(
        &client,
        &format!("{base}/sessions"),
        json!({"topic": "long-division"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().expect("error").contains("Quiz topic"));
}
