use crate::models::{Intent, RouteResult, Turn};
use crate::services::ai::gateway::CompletionGateway;
use crate::services::emergency::{EmergencyClassifier, EMERGENCY_REPLY};
use crate::services::faq::FaqMatcher;

/// Which tier produced a [`RouteResult`]. Logged, never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Emergency,
    Faq,
    Completion,
}

/// Emergency, then FAQ, then completion. The first tier that answers ends the call.
pub struct IntentRouter {
    emergency: EmergencyClassifier,
    faq: FaqMatcher,
    gateway: CompletionGateway,
}

impl IntentRouter {
    pub fn new(emergency: EmergencyClassifier, faq: FaqMatcher, gateway: CompletionGateway) -> Self {
        Self {
            emergency,
            faq,
            gateway,
        }
    }

    pub fn with_gateway(gateway: CompletionGateway) -> Self {
        Self::new(EmergencyClassifier::default(), FaqMatcher::default(), gateway)
    }

    pub fn completion_configured(&self) -> bool {
        self.gateway.is_configured()
    }

    pub async fn route(&self, utterance: &str, history: &[Turn]) -> RouteResult {
        let (result, source) = self.route_with_source(utterance, history).await;
        tracing::info!(source = ?source, intent = result.intent.as_str(), "routed utterance");
        result
    }

    pub async fn route_with_source(
        &self,
        utterance: &str,
        history: &[Turn],
    ) -> (RouteResult, RouteSource) {
        if self.emergency.is_emergency(utterance) {
            return (
                RouteResult::new(EMERGENCY_REPLY, Intent::Emergency),
                RouteSource::Emergency,
            );
        }

        if let Some(answer) = self.faq.answer(utterance) {
            return (RouteResult::new(answer, Intent::None), RouteSource::Faq);
        }

        (
            self.gateway.complete(history, utterance).await,
            RouteSource::Completion,
        )
    }
}
