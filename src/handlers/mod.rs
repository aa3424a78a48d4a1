pub mod chat;
pub mod health;
pub mod session;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/options", get(chat::options))
        .route("/api/chat", post(chat::chat))
        .route("/api/sessions", post(session::create_session))
        .route("/api/sessions/:id", get(session::get_session))
        .route("/api/sessions/:id/booking/doctor", post(session::select_doctor))
        .route("/api/sessions/:id/booking/date", post(session::select_date))
        .route("/api/sessions/:id/booking/time", post(session::select_time))
        .route(
            "/api/sessions/:id/booking/confirm",
            post(session::confirm_booking),
        )
        .with_state(state)
}

/// Unreadable bodies are treated as empty input rather than surfaced as errors.
fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable request body, treating as empty");
            T::default()
        }
    }
}
