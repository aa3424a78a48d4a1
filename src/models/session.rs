use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::booking::{BookingStage, BookingState};
use super::conversation::{ConversationLog, Turn};

pub const GREETING: &str = "Hello 👋 I’m the AI Front Desk. How can I assist you today?";

/// Everything one chat session owns. Nothing here outlives the process.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub log: ConversationLog,
    pub booking: BookingState,
    /// Set once the booking panel has been offered; cleared again on confirmation.
    pub booking_open: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        let mut log = ConversationLog::new();
        log.append(Turn::assistant(GREETING));

        Self {
            id: Uuid::new_v4(),
            log,
            booking: BookingState::new(),
            booking_open: false,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_activity > ttl
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            turns: self.log.clone(),
            booking: BookingView {
                state: self.booking.clone(),
                stage: self.booking.stage(),
            },
            booking_open: self.booking_open,
            created_at: self.created_at,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub turns: ConversationLog,
    pub booking: BookingView,
    pub booking_open: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub state: BookingState,
    pub stage: BookingStage,
}
