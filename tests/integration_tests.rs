use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use frontdesk::config::AppConfig;
use frontdesk::handlers;
use frontdesk::services::ai::gateway::{CompletionGateway, BOOKING_FALLBACK_REPLY};
use frontdesk::services::ai::{LlmProvider, Message};
use frontdesk::services::router::IntentRouter;
use frontdesk::services::session::SessionStore;
use frontdesk::state::AppState;

// ── Mock Providers ──

struct MockLlm {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn chat(&self, _system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");

        if last.contains("Mehta") {
            Ok(r#"{"reply":"Of course, let's book you with Dr. Mehta.","intent":"BOOK_APPOINTMENT","doctor":"Dr. Mehta"}"#.to_string())
        } else if last.contains("book") {
            Ok(r#"{"reply":"Sure, let's find you a slot.","intent":"BOOK_APPOINTMENT","doctor":null}"#.to_string())
        } else if last.contains("garbage") {
            Ok("I am not JSON at all".to_string())
        } else {
            Ok(r#"{"reply":"Hello! How can I help you today?","intent":"NONE","doctor":null}"#.to_string())
        }
    }
}

struct PanickingLlm;

#[async_trait]
impl LlmProvider for PanickingLlm {
    async fn chat(&self, _system_prompt: &str, _messages: &[Message]) -> anyhow::Result<String> {
        panic!("provider blew up");
    }
}

// ── Helpers ──

fn test_state_with(llm: Option<Box<dyn LlmProvider>>) -> Arc<AppState> {
    let config = AppConfig::default();
    let gateway = CompletionGateway::new(llm, Duration::from_secs(2));
    Arc::new(AppState {
        config,
        router: Arc::new(IntentRouter::with_gateway(gateway)),
        sessions: SessionStore::new(chrono::Duration::minutes(30)),
    })
}

fn test_state() -> (Arc<AppState>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let llm: Box<dyn LlmProvider> = Box::new(MockLlm {
        calls: Arc::clone(&calls),
    });
    (test_state_with(Some(llm)), calls)
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::routes(state)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn chat(state: &Arc<AppState>, message: &str) -> serde_json::Value {
    let body = serde_json::json!({ "message": message }).to_string();
    let (status, json) = send(state, post_json("/api/chat", &body)).await;
    assert_eq!(status, StatusCode::OK);
    json
}

async fn new_session(state: &Arc<AppState>) -> String {
    let (status, json) = send(state, post_json("/api/sessions", "")).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

async fn session_chat(state: &Arc<AppState>, id: &str, message: &str) -> serde_json::Value {
    let body = serde_json::json!({ "message": message, "session_id": id }).to_string();
    let (status, json) = send(state, post_json("/api/chat", &body)).await;
    assert_eq!(status, StatusCode::OK);
    json
}

async fn booking(state: &Arc<AppState>, id: &str, step: &str, body: serde_json::Value) -> serde_json::Value {
    let uri = format!("/api/sessions/{id}/booking/{step}");
    let (status, json) = send(state, post_json(&uri, &body.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    json
}

// ── Health & Options ──

#[tokio::test]
async fn test_health() {
    let (state, _) = test_state();
    let (status, json) = send(&state, Request::builder().uri("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    // The provider is wired into the router; the config carries no key.
    assert_eq!(json["completion_configured"], true);
}

#[tokio::test]
async fn test_health_without_provider() {
    let state = test_state_with(None);
    let (status, json) = send(&state, Request::builder().uri("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["completion_configured"], false);
}

#[tokio::test]
async fn test_options_lists_doctors_and_slots() {
    let (state, _) = test_state();
    let req = Request::builder()
        .uri("/api/options")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&state, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["doctors"].as_array().unwrap().len(), 3);
    assert_eq!(json["doctors"][0], "Dr. Sharma");
    assert!(json["time_slots"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t == "10:00 AM"));
}

// ── Routing ──

#[tokio::test]
async fn test_emergency_reply() {
    let (state, calls) = test_state();
    let json = chat(&state, "I have severe chest pain").await;

    assert_eq!(json["intent"], "EMERGENCY");
    assert!(json["reply"]
        .as_str()
        .unwrap()
        .contains("emergency number"));
    assert!(json["doctor"].is_null());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_emergency_any_case_any_position() {
    let (state, _) = test_state();
    for text in [
        "HEART ATTACK",
        "please help, my friend is Unconscious in the lobby",
        "where is the ward? my dad had a stroke",
    ] {
        let json = chat(&state, text).await;
        assert_eq!(json["intent"], "EMERGENCY", "utterance: {text}");
    }
}

#[tokio::test]
async fn test_faq_visiting_hours_skips_gateway() {
    let (state, calls) = test_state();
    let json = chat(&state, "what are your visiting hours").await;

    assert_eq!(json["intent"], "NONE");
    assert_eq!(
        json["reply"],
        "Visiting hours are from 10:00 AM to 8:00 PM every day."
    );
    assert!(json["doctor"].is_null());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_gateway_reply_passes_through() {
    let (state, calls) = test_state();
    let json = chat(&state, "good morning").await;

    assert_eq!(json["intent"], "NONE");
    assert_eq!(json["reply"], "Hello! How can I help you today?");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_completion_uses_fallback() {
    let (state, _) = test_state();
    let json = chat(&state, "garbage please").await;

    assert_eq!(json["intent"], "BOOK_APPOINTMENT");
    assert_eq!(json["reply"], BOOKING_FALLBACK_REPLY);
    assert!(json["doctor"].is_null());
}

#[tokio::test]
async fn test_missing_credential_uses_fallback() {
    let state = test_state_with(None);
    for text in ["good morning", "can I see somebody on Tuesday", "thanks"] {
        let json = chat(&state, text).await;
        assert_eq!(json["intent"], "BOOK_APPOINTMENT");
        assert_eq!(json["reply"], BOOKING_FALLBACK_REPLY);
        assert!(json["doctor"].is_null());
    }
}

#[tokio::test]
async fn test_provider_panic_uses_fallback() {
    let llm: Box<dyn LlmProvider> = Box::new(PanickingLlm);
    let state = test_state_with(Some(llm));
    let json = chat(&state, "good morning").await;

    assert_eq!(json["intent"], "BOOK_APPOINTMENT");
    assert_eq!(json["reply"], BOOKING_FALLBACK_REPLY);
}

#[tokio::test]
async fn test_blank_and_unreadable_messages() {
    let (state, calls) = test_state();

    let json = chat(&state, "   ").await;
    assert_eq!(json["intent"], "NONE");
    assert!(json["reply"].as_str().unwrap().contains("rephrase"));

    let (status, json) = send(&state, post_json("/api/chat", "{not json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["intent"], "NONE");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ── Sessions ──

#[tokio::test]
async fn test_unknown_session_not_found() {
    let (state, _) = test_state();
    let body = serde_json::json!({
        "message": "hello",
        "session_id": "6f1c1f4e-3b7e-4a51-9d8e-1f2a3b4c5d6e",
    })
    .to_string();
    let (status, json) = send(&state, post_json("/api/chat", &body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_session_chat_appends_turns() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    let json = session_chat(&state, &id, "what are your visiting hours").await;
    let turns = json["session"]["turns"].as_array().unwrap();

    // greeting, user, assistant
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1]["speaker"], "user");
    assert_eq!(turns[1]["text"], "what are your visiting hours");
    assert_eq!(turns[2]["speaker"], "assistant");
    assert_eq!(turns[2]["text"], json["reply"]);
}

#[tokio::test]
async fn test_blank_message_logs_nothing() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    let json = session_chat(&state, &id, "").await;
    assert_eq!(json["session"]["turns"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_book_intent_with_doctor_hint_starts_flow() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    let json = session_chat(&state, &id, "I'd like to see Dr. Mehta").await;
    assert_eq!(json["intent"], "BOOK_APPOINTMENT");
    assert_eq!(json["doctor"], "Dr. Mehta");

    let session = &json["session"];
    assert_eq!(session["booking_open"], true);
    assert_eq!(session["booking"]["stage"], "DOCTOR_SET");
    assert_eq!(session["booking"]["doctor"], "Dr. Mehta");

    // reply first, then the doctor prompt
    let turns = session["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[2]["text"], json["reply"]);
    assert!(turns[3]["text"]
        .as_str()
        .unwrap()
        .contains("Appointment request noted for Dr. Mehta"));
}

#[tokio::test]
async fn test_book_intent_without_doctor_opens_panel() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    let json = session_chat(&state, &id, "I want to book an appointment").await;
    assert_eq!(json["session"]["booking_open"], true);
    assert_eq!(json["session"]["booking"]["stage"], "EMPTY");
}

// ── Booking ──

#[tokio::test]
async fn test_full_booking_flow() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    let json = booking(&state, &id, "doctor", serde_json::json!({"doctor": "Dr. Sharma"})).await;
    assert_eq!(json["outcome"], "advanced");

    let json = booking(&state, &id, "date", serde_json::json!({"date": "2024-05-01"})).await;
    assert_eq!(json["outcome"], "advanced");

    let json = booking(&state, &id, "time", serde_json::json!({"time": "10:00 AM"})).await;
    assert_eq!(json["outcome"], "advanced");
    assert_eq!(json["session"]["booking"]["stage"], "TIME_SET");

    let json = booking(&state, &id, "confirm", serde_json::json!({"name": "Asha Rao"})).await;
    assert_eq!(json["outcome"], "advanced");

    let session = &json["session"];
    assert_eq!(session["booking"]["confirmed"], true);
    assert_eq!(session["booking"]["stage"], "CONFIRMED");
    assert_eq!(session["booking"]["patient_name"], "Asha Rao");
    assert_eq!(session["booking_open"], false);

    let last = session["turns"].as_array().unwrap().last().unwrap()["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(last.contains("Dr. Sharma"));
    assert!(last.contains("2024-05-01"));
    assert!(last.contains("10:00 AM"));
}

#[tokio::test]
async fn test_same_date_twice_no_duplicate_prompt() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    booking(&state, &id, "doctor", serde_json::json!({"doctor": "Dr. Patel"})).await;
    let first = booking(&state, &id, "date", serde_json::json!({"date": "2024-05-01"})).await;
    let second = booking(&state, &id, "date", serde_json::json!({"date": "2024-05-01"})).await;

    assert_eq!(second["outcome"], "unchanged");
    assert_eq!(
        first["session"]["turns"].as_array().unwrap().len(),
        second["session"]["turns"].as_array().unwrap().len()
    );
}

#[tokio::test]
async fn test_confirm_without_time_is_noop() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    booking(&state, &id, "doctor", serde_json::json!({"doctor": "Dr. Sharma"})).await;
    let before = booking(&state, &id, "date", serde_json::json!({"date": "2024-05-01"})).await;
    let after = booking(&state, &id, "confirm", serde_json::json!({"name": "Asha"})).await;

    assert_eq!(after["outcome"], "rejected");
    assert_eq!(after["session"]["booking"]["confirmed"], false);
    assert_eq!(
        before["session"]["turns"].as_array().unwrap().len(),
        after["session"]["turns"].as_array().unwrap().len()
    );
}

#[tokio::test]
async fn test_confirmed_booking_is_frozen() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    booking(&state, &id, "doctor", serde_json::json!({"doctor": "Dr. Sharma"})).await;
    booking(&state, &id, "date", serde_json::json!({"date": "2024-05-01"})).await;
    booking(&state, &id, "time", serde_json::json!({"time": "10:00 AM"})).await;
    booking(&state, &id, "confirm", serde_json::json!({"name": "Asha"})).await;

    let json = booking(&state, &id, "doctor", serde_json::json!({"doctor": "Dr. Patel"})).await;
    assert_eq!(json["outcome"], "rejected");
    let json = booking(&state, &id, "time", serde_json::json!({"time": "05:00 PM"})).await;
    assert_eq!(json["outcome"], "rejected");

    // A booking request from chat no longer touches the booking either.
    let json = session_chat(&state, &id, "I'd like to see Dr. Mehta").await;
    let booking_state = &json["session"]["booking"];
    assert_eq!(booking_state["doctor"], "Dr. Sharma");
    assert_eq!(booking_state["time"], "10:00 AM");
    assert_eq!(booking_state["confirmed"], true);
    assert_eq!(json["session"]["booking_open"], false);
}

#[tokio::test]
async fn test_invalid_selections_rejected() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    let json = booking(&state, &id, "date", serde_json::json!({"date": "2024-05-01"})).await;
    assert_eq!(json["outcome"], "rejected");

    let json = booking(&state, &id, "doctor", serde_json::json!({"doctor": "Dr. Who"})).await;
    assert_eq!(json["outcome"], "rejected");

    let json = booking(&state, &id, "doctor", serde_json::json!({})).await;
    assert_eq!(json["outcome"], "rejected");
    assert_eq!(json["session"]["turns"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_booking_on_unknown_session() {
    let (state, _) = test_state();
    let uri = "/api/sessions/6f1c1f4e-3b7e-4a51-9d8e-1f2a3b4c5d6e/booking/doctor";
    let (status, _) = send(&state, post_json(uri, r#"{"doctor":"Dr. Sharma"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_session() {
    let (state, _) = test_state();
    let id = new_session(&state).await;

    let req = Request::builder()
        .uri(format!("/api/sessions/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&state, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["booking"]["stage"], "EMPTY");
    assert!(json["turns"][0]["text"]
        .as_str()
        .unwrap()
        .contains("AI Front Desk"));
}
