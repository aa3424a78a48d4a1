use std::time::Duration;

use crate::models::{CompletionReply, Doctor, Intent, RouteResult, Turn};
use crate::services::ai::{LlmProvider, Message};

pub const BOOKING_FALLBACK_REPLY: &str = "I can help you book an appointment. Please choose a doctor, then select a preferred date and time slot.";

/// How much of the transcript the provider sees besides the new utterance.
pub const HISTORY_TURNS: usize = 10;

const SYSTEM_PROMPT: &str = r#"You are "AI Front Desk", a virtual hospital receptionist.

Your personality is warm, calm, professional, and reassuring.

STRICT RULES:
- You must NEVER give medical advice, diagnosis, or treatment.
- You must NEVER recommend medicines or dosages.
- If asked for medical advice, politely refuse and suggest contacting hospital staff.
- Keep responses short, clear, and empathetic.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "reply": "Your reply to the patient",
  "intent": "NONE|BOOK_APPOINTMENT",
  "doctor": "doctor name or null"
}

Intent rules:
- "BOOK_APPOINTMENT": the patient wants to book, schedule or see a doctor
- "NONE": anything else

Only set "doctor" when the patient names one of the doctors below.
"#;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("completion provider not configured")]
    Unconfigured,

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider error: {0:#}")]
    Provider(anyhow::Error),

    #[error("provider returned empty content")]
    EmptyContent,

    #[error("malformed completion: {0}")]
    Malformed(String),
}

/// The reply used whenever the provider cannot be consulted or misbehaves.
pub fn booking_fallback() -> RouteResult {
    RouteResult::new(BOOKING_FALLBACK_REPLY, Intent::BookAppointment)
}

pub struct CompletionGateway {
    llm: Option<Box<dyn LlmProvider>>,
    timeout: Duration,
    system_prompt: String,
}

impl CompletionGateway {
    pub fn new(llm: Option<Box<dyn LlmProvider>>, timeout: Duration) -> Self {
        let doctors = Doctor::ALL
            .iter()
            .map(|d| format!("- {d}"))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            llm,
            timeout,
            system_prompt: format!("{SYSTEM_PROMPT}\nDoctors:\n{doctors}"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Never fails. Every error is logged and turned into [`booking_fallback`].
    pub async fn complete(&self, history: &[Turn], utterance: &str) -> RouteResult {
        match self.try_complete(history, utterance).await {
            Ok(result) => result,
            Err(GatewayError::Unconfigured) => {
                tracing::debug!("no completion credential, using booking fallback");
                booking_fallback()
            }
            Err(e) => {
                tracing::warn!(error = %e, "completion failed, using booking fallback");
                booking_fallback()
            }
        }
    }

    /// `history` is sent as given; callers pass at most [`HISTORY_TURNS`] turns.
    pub async fn try_complete(
        &self,
        history: &[Turn],
        utterance: &str,
    ) -> Result<RouteResult, GatewayError> {
        let llm = self.llm.as_deref().ok_or(GatewayError::Unconfigured)?;

        let mut messages: Vec<Message> = history
            .iter()
            .map(|t| Message {
                role: t.speaker.as_role().to_string(),
                content: t.text.clone(),
            })
            .collect();

        messages.push(Message {
            role: "user".to_string(),
            content: utterance.to_string(),
        });

        let response = tokio::time::timeout(self.timeout, llm.chat(&self.system_prompt, &messages))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))?
            .map_err(GatewayError::Provider)?;

        if response.trim().is_empty() {
            return Err(GatewayError::EmptyContent);
        }

        let parsed = parse_completion_response(&response)?;
        Ok(into_route_result(parsed))
    }
}

fn parse_completion_response(response: &str) -> Result<CompletionReply, GatewayError> {
    let parsed = try_parse(response).ok_or_else(|| {
        GatewayError::Malformed(response.chars().take(200).collect::<String>())
    })?;

    if parsed.reply.trim().is_empty() {
        return Err(GatewayError::Malformed("empty reply field".to_string()));
    }
    Ok(parsed)
}

fn try_parse(response: &str) -> Option<CompletionReply> {
    if let Ok(reply) = serde_json::from_str::<CompletionReply>(response) {
        return Some(reply);
    }

    // Strip markdown code fences
    let trimmed = response.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(reply) = serde_json::from_str::<CompletionReply>(cleaned) {
        return Some(reply);
    }

    // Outermost object buried in prose
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<CompletionReply>(&cleaned[start..=end]).ok()
}

fn into_route_result(parsed: CompletionReply) -> RouteResult {
    // Only the keyword classifier may raise an emergency.
    let intent = match parsed.intent {
        Intent::Emergency => Intent::None,
        other => other,
    };

    let doctor = match intent {
        Intent::BookAppointment => parsed
            .doctor
            .as_deref()
            .and_then(Doctor::parse)
            .map(|d| d.name().to_string()),
        _ => None,
    };

    RouteResult {
        reply: parsed.reply.trim().to_string(),
        intent,
        doctor,
    }
}
