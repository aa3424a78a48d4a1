use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use frontdesk::config::AppConfig;
use frontdesk::handlers;
use frontdesk::services::ai::gateway::CompletionGateway;
use frontdesk::services::ai::openai::OpenAiProvider;
use frontdesk::services::ai::LlmProvider;
use frontdesk::services::emergency::EmergencyClassifier;
use frontdesk::services::faq::FaqMatcher;
use frontdesk::services::router::IntentRouter;
use frontdesk::services::session::SessionStore;
use frontdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    let llm: Option<Box<dyn LlmProvider>> = match &config.openai_api_key {
        Some(key) => {
            tracing::info!(
                "using completion provider (model: {}, url: {})",
                config.openai_model,
                config.openai_base_url
            );
            let provider: Box<dyn LlmProvider> = Box::new(OpenAiProvider::new(
                key.clone(),
                config.openai_model.clone(),
                config.openai_base_url.clone(),
            ));
            Some(provider)
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, open questions get the booking fallback");
            None
        }
    };

    let gateway = CompletionGateway::new(llm, config.completion_timeout());
    let router = IntentRouter::new(
        EmergencyClassifier::default(),
        FaqMatcher::default(),
        gateway,
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        router: Arc::new(router),
        sessions: SessionStore::new(config.session_ttl()),
    });

    let cors = if config.cors_allow_any {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    let app = handlers::routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
