use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::SessionView;
use crate::services::conversation::{self, BookingAction};
use crate::services::session::SharedSession;
use crate::state::AppState;

use super::body_or_default;

fn find_session(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))
}

// POST /api/sessions
pub async fn create_session(State(state): State<Arc<AppState>>) -> (StatusCode, Json<SessionView>) {
    let shared = state.sessions.create();
    let view = shared.lock().await.view();
    (StatusCode::CREATED, Json(view))
}

// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let shared = find_session(&state, id)?;
    let view = shared.lock().await.view();
    Ok(Json(view))
}

#[derive(Serialize)]
pub struct BookingResponse {
    outcome: &'static str,
    session: SessionView,
}

async fn run_action(
    state: &AppState,
    id: Uuid,
    action: BookingAction,
) -> Result<Json<BookingResponse>, AppError> {
    let shared = find_session(state, id)?;
    let (transition, session) = conversation::apply_booking_action(&shared, action).await;
    Ok(Json(BookingResponse {
        outcome: transition.as_str(),
        session,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorSelection {
    #[serde(default)]
    pub doctor: String,
}

// POST /api/sessions/:id/booking/doctor
pub async fn select_doctor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DoctorSelection>, JsonRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let body = body_or_default(payload);
    run_action(&state, id, BookingAction::Doctor(body.doctor)).await
}

#[derive(Debug, Default, Deserialize)]
pub struct DateSelection {
    #[serde(default)]
    pub date: String,
}

// POST /api/sessions/:id/booking/date
pub async fn select_date(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DateSelection>, JsonRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let body = body_or_default(payload);
    run_action(&state, id, BookingAction::Date(body.date)).await
}

#[derive(Debug, Default, Deserialize)]
pub struct TimeSelection {
    #[serde(default)]
    pub time: String,
}

// POST /api/sessions/:id/booking/time
pub async fn select_time(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<TimeSelection>, JsonRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let body = body_or_default(payload);
    run_action(&state, id, BookingAction::Time(body.time)).await
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub name: String,
    pub doctor: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

// POST /api/sessions/:id/booking/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ConfirmRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let body = body_or_default(payload);
    let action = BookingAction::Confirm {
        name: body.name,
        doctor: body.doctor,
        date: body.date,
        time: body.time,
    };
    run_action(&state, id, action).await
}
