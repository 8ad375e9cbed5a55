// tests/api_tests.rs

use quizlens::{
    config::{AiConfig, AnalyticsConfig, Config, QuizConfig},
    db,
    questions::QuestionSupplier,
    routes,
    state::AppState,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde_json::{Value, json};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    spawn_app_with(QuizConfig::default()).await
}

/// Same as [`spawn_app`], with custom quiz settings.
async fn spawn_app_with(quiz: QuizConfig) -> String {
    // 1. A fresh, migrated in-memory database per test
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");

    // 2. Create test configuration and state
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        analytics: AnalyticsConfig::default(),
        ai: AiConfig::default(),
        quiz,
    };

    let state = AppState {
        pool,
        config,
        supplier: QuestionSupplier::static_only(),
    };

    // 3. Create the router with the app state
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Registers a fresh user and returns a bearer token for them.
async fn register_and_login(client: &reqwest::Client, address: &str) -> String {
    let unique_name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": unique_name, "password": "password123" }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status().as_u16(), 201);

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "username": unique_name, "password": "password123" }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn get_json(client: &reqwest::Client, url: String, token: &str) -> Value {
    let response = client
        .get(url)
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.unwrap()
}

async fn post_json(client: &reqwest::Client, url: String, token: &str, body: Value) -> reqwest::Response {
    client
        .post(url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
}

/// Plays a whole static quiz, answering option `selected` in `time_taken` seconds.
/// Returns the finish response.
async fn play_static_quiz(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    selected: i64,
    time_taken: i64,
) -> Value {
    play_quiz(client, address, token, "static", selected, time_taken).await
}

/// Reads a token payload the way any client could: without the signing key.
fn unverified_payload(token: &str) -> Value {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    decode::<Value>(token, &DecodingKey::from_secret(b"unknown"), &validation)
        .unwrap()
        .claims
}

/// Starts a static quiz and returns the start response.
async fn start_static_quiz(client: &reqwest::Client, address: &str, token: &str) -> Value {
    let response = post_json(
        client,
        format!("{}/api/quiz/start", address),
        token,
        json!({ "mode": "static" }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.unwrap()
}

async fn play_quiz(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    mode: &str,
    selected: i64,
    time_taken: i64,
) -> Value {
    let response = post_json(
        client,
        format!("{}/api/quiz/start", address),
        token,
        json!({ "mode": mode }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 200);
    let start: Value = response.json().await.unwrap();

    let total = start["total_questions"].as_u64().unwrap();
    let mut context_token = start["context_token"].as_str().unwrap().to_string();
    let mut question = start["question"].clone();

    for _ in 0..total {
        let response = post_json(
            client,
            format!("{}/api/quiz/answer", address),
            token,
            json!({
                "context_token": context_token,
                "question_id": question["id"],
                "selected_option": selected,
                "time_taken": time_taken
            }),
        )
        .await;
        assert_eq!(response.status().as_u16(), 200);
        let answer: Value = response.json().await.unwrap();

        context_token = answer["context_token"].as_str().unwrap().to_string();
        question = answer["next_question"].clone();
    }
    assert!(question.is_null());

    let response = post_json(
        client,
        format!("{}/api/quiz/finish", address),
        token,
        json!({ "context_token": context_token }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.unwrap()
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: Send a username that is too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": "yo", "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let body = json!({ "username": "same_name", "password": "password123" });

    let first = client
        .post(format!("{}/api/auth/register", address))
        .json(&body)
        .send()
        .await
        .unwrap();
    let second = client
        .post(format!("{}/api/auth/register", address))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(first.status().as_u16(), 201);
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": "alice_x", "password": "password123" }))
        .send()
        .await
        .unwrap();
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "username": "alice_x", "password": "not-it" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for path in ["/api/practice", "/api/analytics/weak-areas", "/api/attempts"] {
        let response = client
            .get(format!("{}{}", address, path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401, "{}", path);
    }
}

#[tokio::test]
async fn practice_routes_new_user_to_static_quiz() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let body = get_json(&client, format!("{}/api/practice", address), &token).await;

    assert_eq!(body["state"], "no_history");
    assert_eq!(body["route"], "static_quiz");
    assert_eq!(body["next"], "/api/quiz/start");
}

#[tokio::test]
async fn empty_history_has_no_weak_areas() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let body = get_json(&client, format!("{}/api/analytics/weak-areas", address), &token).await;

    assert_eq!(body["topics"].as_array().unwrap().len(), 0);
    assert_eq!(
        body["recommendations"]["message"],
        "Start practicing to get personalized recommendations!"
    );
}

#[tokio::test]
async fn static_quiz_flow_feeds_analytics() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let topics = get_json(&client, format!("{}/api/quiz/topics", address), &token).await;
    let topic_count = topics.as_array().unwrap().len();

    // Slow answers: every topic carries the full time penalty.
    let summary = play_static_quiz(&client, &address, &token, 0, 90).await;
    let answered = summary["answered"].as_u64().unwrap();
    assert_eq!(summary["mode"], "static");
    assert_eq!(summary["total_questions"].as_u64().unwrap(), answered);
    assert_eq!(summary["total_time"].as_i64().unwrap(), 90 * answered as i64);
    assert!(summary["session"].is_object());

    // History now exists, so practice points at recommendations.
    let practice = get_json(&client, format!("{}/api/practice", address), &token).await;
    assert_eq!(practice["route"], "recommendations");
    assert_eq!(practice["next"], "/api/analytics/recommendations");

    let attempts = get_json(&client, format!("{}/api/attempts", address), &token).await;
    assert_eq!(attempts.as_array().unwrap().len() as u64, answered);

    let weak = get_json(&client, format!("{}/api/analytics/weak-areas", address), &token).await;
    let records = weak["topics"].as_array().unwrap();
    assert_eq!(records.len(), topic_count);
    let scores: Vec<f64> = records.iter().map(|r| r["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert!(scores.iter().all(|s| *s >= 0.3));

    let report = get_json(&client, format!("{}/api/analytics/recommendations", address), &token).await;
    assert!(report["maintain"].as_array().unwrap().is_empty());
    let prioritised = report["high_priority"].as_array().unwrap().len()
        + report["medium_priority"].as_array().unwrap().len();
    assert_eq!(prioritised, topic_count);

    let dashboard = get_json(&client, format!("{}/api/analytics/dashboard", address), &token).await;
    assert_eq!(dashboard["total_attempted"].as_u64().unwrap(), answered);
    assert_eq!(dashboard["avg_time"].as_f64().unwrap(), 90.0);
    assert_eq!(dashboard["recent_sessions"].as_array().unwrap().len(), 1);
    assert_eq!(dashboard["accuracy_trend"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn attempts_can_be_filtered_by_topic() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;
    play_static_quiz(&client, &address, &token, 1, 20).await;

    let attempts = get_json(
        &client,
        format!("{}/api/attempts?topic=Logical%20Reasoning&limit=1", address),
        &token,
    )
    .await;

    let list = attempts.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["topic"], "Logical Reasoning");
}

#[tokio::test]
async fn adaptive_quiz_without_credentials_serves_static_fallback() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let response = post_json(
        &client,
        format!("{}/api/quiz/start", address),
        &token,
        json!({ "mode": "adaptive" }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 200);
    let start: Value = response.json().await.unwrap();

    assert_eq!(start["mode"], "adaptive");
    assert_eq!(start["source"], "static_fallback");
    assert_eq!(start["fallback_reason"]["kind"], "missing_credentials");
    // No history: the default practice topic.
    assert_eq!(start["question"]["topic"], "Logical Reasoning");
    assert!(
        start["question"]["id"]
            .as_str()
            .unwrap()
            .starts_with("fallback_")
    );
    // The answer key never reaches the client before answering.
    assert!(start["question"].get("correct_option").is_none());
    let payload = unverified_payload(start["context_token"].as_str().unwrap());
    assert!(payload["ctx"]["run_id"].is_string());
    assert!(!payload.to_string().contains("correct_option"));
}

#[tokio::test]
async fn answering_a_stale_question_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let start: Value = post_json(
        &client,
        format!("{}/api/quiz/start", address),
        &token,
        json!({ "mode": "static" }),
    )
    .await
    .json()
    .await
    .unwrap();

    let response = post_json(
        &client,
        format!("{}/api/quiz/answer", address),
        &token,
        json!({
            "context_token": start["context_token"],
            "question_id": "no-such-question",
            "selected_option": 0,
            "time_taken": 5
        }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);

    let response = post_json(
        &client,
        format!("{}/api/quiz/answer", address),
        &token,
        json!({
            "context_token": start["context_token"],
            "question_id": start["question"]["id"],
            "selected_option": 0,
            "time_taken": -1
        }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn quiz_context_of_another_user_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let owner = register_and_login(&client, &address).await;
    let intruder = register_and_login(&client, &address).await;

    let start: Value = post_json(
        &client,
        format!("{}/api/quiz/start", address),
        &owner,
        json!({ "mode": "static" }),
    )
    .await
    .json()
    .await
    .unwrap();

    let response = post_json(
        &client,
        format!("{}/api/quiz/finish", address),
        &intruder,
        json!({ "context_token": start["context_token"] }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn finishing_without_answers_stores_nothing() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let start: Value = post_json(
        &client,
        format!("{}/api/quiz/start", address),
        &token,
        json!({ "mode": "static" }),
    )
    .await
    .json()
    .await
    .unwrap();

    let summary: Value = post_json(
        &client,
        format!("{}/api/quiz/finish", address),
        &token,
        json!({ "context_token": start["context_token"] }),
    )
    .await
    .json()
    .await
    .unwrap();

    assert_eq!(summary["answered"], 0);
    assert!(summary["session"].is_null());

    let dashboard = get_json(&client, format!("{}/api/analytics/dashboard", address), &token).await;
    assert_eq!(dashboard["recent_sessions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn start_token_does_not_reveal_answers() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let start = start_static_quiz(&client, &address, &token).await;
    let payload = unverified_payload(start["context_token"].as_str().unwrap());

    let text = payload.to_string();
    assert!(!text.contains("correct_option"));
    assert!(!text.contains("explanation"));
    assert!(!text.contains(start["question"]["text"].as_str().unwrap()));
    assert_eq!(payload["ctx"]["current_index"], 0);
    assert_eq!(payload["ctx"]["total_questions"], start["total_questions"]);
}

#[tokio::test]
async fn answering_the_same_token_twice_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let start = start_static_quiz(&client, &address, &token).await;
    let body = json!({
        "context_token": start["context_token"],
        "question_id": start["question"]["id"],
        "selected_option": 0,
        "time_taken": 7
    });

    let first = post_json(&client, format!("{}/api/quiz/answer", address), &token, body.clone()).await;
    assert_eq!(first.status().as_u16(), 200);

    for _ in 0..2 {
        let replay =
            post_json(&client, format!("{}/api/quiz/answer", address), &token, body.clone()).await;
        assert_eq!(replay.status().as_u16(), 409);
    }

    let attempts = get_json(&client, format!("{}/api/attempts", address), &token).await;
    assert_eq!(attempts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn finishing_the_same_token_twice_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let start = start_static_quiz(&client, &address, &token).await;
    let answer: Value = post_json(
        &client,
        format!("{}/api/quiz/answer", address),
        &token,
        json!({
            "context_token": start["context_token"],
            "question_id": start["question"]["id"],
            "selected_option": 0,
            "time_taken": 7
        }),
    )
    .await
    .json()
    .await
    .unwrap();
    let finish = json!({ "context_token": answer["context_token"] });

    let first = post_json(&client, format!("{}/api/quiz/finish", address), &token, finish.clone()).await;
    assert_eq!(first.status().as_u16(), 200);
    let summary: Value = first.json().await.unwrap();
    assert_eq!(summary["answered"], 1);
    assert_eq!(summary["session"]["total_questions"], 1);

    let again = post_json(&client, format!("{}/api/quiz/finish", address), &token, finish).await;
    assert_eq!(again.status().as_u16(), 409);

    // The start token points at the same run.
    let older = post_json(
        &client,
        format!("{}/api/quiz/finish", address),
        &token,
        json!({ "context_token": start["context_token"] }),
    )
    .await;
    assert_eq!(older.status().as_u16(), 409);

    let dashboard = get_json(&client, format!("{}/api/analytics/dashboard", address), &token).await;
    assert_eq!(dashboard["recent_sessions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn answering_after_finish_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let start = start_static_quiz(&client, &address, &token).await;
    let answer: Value = post_json(
        &client,
        format!("{}/api/quiz/answer", address),
        &token,
        json!({
            "context_token": start["context_token"],
            "question_id": start["question"]["id"],
            "selected_option": 0,
            "time_taken": 4
        }),
    )
    .await
    .json()
    .await
    .unwrap();

    // Close the run early, from the start token.
    let response = post_json(
        &client,
        format!("{}/api/quiz/finish", address),
        &token,
        json!({ "context_token": start["context_token"] }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 200);
    let summary: Value = response.json().await.unwrap();
    // The summary counts what was stored, not what the older token says.
    assert_eq!(summary["answered"], 1);

    let late = post_json(
        &client,
        format!("{}/api/quiz/answer", address),
        &token,
        json!({
            "context_token": answer["context_token"],
            "question_id": answer["next_question"]["id"],
            "selected_option": 0,
            "time_taken": 4
        }),
    )
    .await;
    assert_eq!(late.status().as_u16(), 409);

    let attempts = get_json(&client, format!("{}/api/attempts", address), &token).await;
    assert_eq!(attempts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn adaptive_summary_can_skip_time_while_attempts_keep_it() {
    let address = spawn_app_with(QuizConfig {
        adaptive_tracks_time: false,
        ..QuizConfig::default()
    })
    .await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let summary = play_quiz(&client, &address, &token, "adaptive", 0, 9).await;

    assert_eq!(summary["mode"], "adaptive");
    assert!(summary["answered"].as_u64().unwrap() > 0);
    assert_eq!(summary["total_time"], 0);
    assert_eq!(summary["session"]["total_time"], 0);

    let attempts = get_json(&client, format!("{}/api/attempts", address), &token).await;
    let attempts = attempts.as_array().unwrap();
    assert_eq!(attempts.len() as u64, summary["answered"].as_u64().unwrap());
    assert!(attempts.iter().all(|a| a["time_taken"] == 9));
}

#[tokio::test]
async fn adaptive_summary_tracks_time_by_default() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let summary = play_quiz(&client, &address, &token, "adaptive", 0, 9).await;

    let answered = summary["answered"].as_i64().unwrap();
    assert_eq!(summary["session"]["total_time"], answered * 9);
}
