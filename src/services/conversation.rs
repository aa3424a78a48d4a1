use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{
    BookingState, Doctor, Intent, RouteResult, Session, SessionView, TimeSlot, Transition, Turn,
};
use crate::services::ai::gateway::{booking_fallback, HISTORY_TURNS};
use crate::services::session::SharedSession;
use crate::state::AppState;

pub const REPHRASE_REPLY: &str = "I'm here to help. Could you please rephrase your request?";

/// An explicit booking selection made from the UI.
#[derive(Debug, Clone)]
pub enum BookingAction {
    Doctor(String),
    Date(String),
    Time(String),
    Confirm {
        name: String,
        doctor: Option<String>,
        date: Option<String>,
        time: Option<String>,
    },
}

/// Routes an utterance that belongs to no session. Blank input gets the rephrase prompt.
pub async fn route_message(state: &Arc<AppState>, message: &str) -> RouteResult {
    let text = message.trim();
    if text.is_empty() {
        return RouteResult::new(REPHRASE_REPLY, Intent::None);
    }
    route_guarded(state, text.to_string(), Vec::new()).await
}

pub async fn process_message(
    state: &Arc<AppState>,
    shared: &SharedSession,
    message: &str,
) -> (RouteResult, SessionView) {
    let text = message.trim();
    let mut session = shared.lock().await;

    if text.is_empty() {
        return (RouteResult::new(REPHRASE_REPLY, Intent::None), session.view());
    }

    let history = session.log.recent(HISTORY_TURNS).to_vec();
    let result = route_guarded(state, text.to_string(), history).await;

    // Commit only once routing has finished; a dropped request leaves the log untouched.
    session.log.append(Turn::user(text));
    session.log.append(Turn::assistant(result.reply.as_str()));
    apply_route_signal(&mut session, &result);
    session.touch();

    tracing::info!(
        session = %session.id,
        intent = result.intent.as_str(),
        stage = ?session.booking.stage(),
        "processed message"
    );

    (result, session.view())
}

/// Routing runs on its own task so a panic in any tier degrades to the booking fallback.
async fn route_guarded(state: &Arc<AppState>, utterance: String, history: Vec<Turn>) -> RouteResult {
    let router = Arc::clone(&state.router);
    let handle = tokio::spawn(async move { router.route(&utterance, &history).await });

    match handle.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "routing task failed, using booking fallback");
            booking_fallback()
        }
    }
}

fn apply_route_signal(session: &mut Session, result: &RouteResult) {
    if result.intent != Intent::BookAppointment || session.booking.confirmed {
        return;
    }
    session.booking_open = true;

    // A hint only starts the flow; it never overrides a doctor the user already picked.
    if session.booking.doctor.is_some() {
        return;
    }
    if let Some(doctor) = result.doctor.as_deref().and_then(Doctor::parse) {
        let transition = session.booking.select_doctor(doctor);
        if let Some(prompt) = transition.prompt() {
            session.log.append(Turn::assistant(prompt));
        }
    }
}

pub async fn apply_booking_action(
    shared: &SharedSession,
    action: BookingAction,
) -> (Transition, SessionView) {
    let mut session = shared.lock().await;
    let transition = apply_action(&mut session.booking, &action);

    if let Some(prompt) = transition.prompt() {
        session.log.append(Turn::assistant(prompt));
    }
    match (&action, &transition) {
        (BookingAction::Confirm { .. }, Transition::Advanced(_)) => session.booking_open = false,
        (BookingAction::Doctor(_), Transition::Advanced(_)) => session.booking_open = true,
        _ => {}
    }
    session.touch();

    tracing::info!(
        session = %session.id,
        action = ?action,
        outcome = transition.as_str(),
        stage = ?session.booking.stage(),
        "booking action"
    );

    (transition, session.view())
}

fn apply_action(booking: &mut BookingState, action: &BookingAction) -> Transition {
    match action {
        BookingAction::Doctor(raw) => match Doctor::parse(raw) {
            Some(doctor) => booking.select_doctor(doctor),
            None => Transition::Rejected,
        },
        BookingAction::Date(raw) => match parse_date(raw) {
            Some(date) => booking.select_date(date),
            None => Transition::Rejected,
        },
        BookingAction::Time(raw) => match TimeSlot::parse(raw) {
            Some(slot) => booking.select_time(slot),
            None => Transition::Rejected,
        },
        BookingAction::Confirm {
            name,
            doctor,
            date,
            time,
        } => {
            // Whatever the client echoes back has to agree with what we hold.
            let agrees = echo_matches(doctor.as_deref(), Doctor::parse, booking.doctor)
                && echo_matches(date.as_deref(), parse_date, booking.date)
                && echo_matches(time.as_deref(), TimeSlot::parse, booking.time);

            if agrees {
                booking.confirm(name)
            } else {
                Transition::Rejected
            }
        }
    }
}

fn echo_matches<T: PartialEq>(
    raw: Option<&str>,
    parse: fn(&str) -> Option<T>,
    held: Option<T>,
) -> bool {
    raw.map_or(true, |raw| parse(raw).is_some_and(|v| held == Some(v)))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
