use crate::config::Config;
use crate::page::{PageFactory, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Builds and mounts new page sessions with the shared generative client.
    pub pages: PageFactory,
    pub sessions: SessionStore,
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use crate::config::CardSources;
    use crate::genai_client::GenAiClient;
    use std::time::Duration;

    let config = Config {
        gemini_api_key: None,
        gemini_api_base: "http://127.0.0.1:9".to_string(),
        sources: CardSources::default(),
        session_wait_max_ms: 1000,
        session_idle_timeout: Duration::from_secs(1800),
        port: 0,
        rust_log: "debug".to_string(),
    };
    let client = GenAiClient::new(None, &config.gemini_api_base).unwrap();
    AppState {
        pages: PageFactory::new(client, config.sources),
        sessions: SessionStore::default(),
        config,
    }
}
