use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Doctor, RouteResult, SessionView, TimeSlot};
use crate::services::conversation;
use crate::state::AppState;

use super::body_or_default;

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    #[serde(flatten)]
    pub result: RouteResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
}

// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let request = body_or_default(payload);

    let Some(id) = request.session_id else {
        let result = conversation::route_message(&state, &request.message).await;
        return Ok(Json(ChatResponse {
            result,
            session: None,
        }));
    };

    let shared = state
        .sessions
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))?;
    let (result, view) = conversation::process_message(&state, &shared, &request.message).await;

    Ok(Json(ChatResponse {
        result,
        session: Some(view),
    }))
}

#[derive(Serialize)]
pub struct OptionsResponse {
    doctors: Vec<&'static str>,
    time_slots: Vec<&'static str>,
}

// GET /api/options
pub async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        doctors: Doctor::ALL.iter().map(|d| d.name()).collect(),
        time_slots: TimeSlot::ALL.iter().map(|t| t.label()).collect(),
    })
}
