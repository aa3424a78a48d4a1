use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    None,
    BookAppointment,
    Emergency,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::None => "NONE",
            Intent::BookAppointment => "BOOK_APPOINTMENT",
            Intent::Emergency => "EMERGENCY",
        }
    }
}

/// Outcome of routing a single user utterance. Never revised once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteResult {
    pub reply: String,
    pub intent: Intent,
    pub doctor: Option<String>,
}

impl RouteResult {
    pub fn new(reply: impl Into<String>, intent: Intent) -> Self {
        Self {
            reply: reply.into(),
            intent,
            doctor: None,
        }
    }
}

/// Shape the completion provider is instructed to emit.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionReply {
    pub reply: String,
    pub intent: Intent,
    #[serde(default)]
    pub doctor: Option<String>,
}
