//! Generative API client: the single point of entry for all Gemini / Imagen calls.
//!
//! ARCHITECTURAL RULE: No other module may call the generative API directly.
//! Content slots reach it through the fetchers in `slot::fetchers`.
//!
//! Models are hardcoded, same as the prompts, so a deployment cannot drift onto a
//! model the prompts were never written for.
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Text model used for compliments and generated cards.
pub const TEXT_MODEL: &str = "gemini-2.5-flash";
/// Image model used for the birthday card image.
pub const IMAGE_MODEL: &str = "imagen-4.0-generate-001";
const IMAGE_MIME_TYPE: &str = "image/png";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("API key is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("No image data found in response")]
    NoImage,
}

// ────────────────────────────────────────────────────────────────────────────
// generateContent wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// predict (Imagen) wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
    output_options: OutputOptions<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions<'a> {
    mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub bytes_base64_encoded: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single generative client used by every content slot.
/// Wraps the Gemini REST API with retry logic.
#[derive(Clone)]
pub struct GenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    retry_base: Duration,
}

impl GenAiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self, GenAiError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry_base: Duration::from_millis(1000),
        })
    }

    /// Overrides the first backoff delay (doubled on every further retry).
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fails without touching the network when no key was configured.
    pub fn ensure_configured(&self) -> Result<&str, GenAiError> {
        self.api_key.as_deref().ok_or(GenAiError::NotConfigured)
    }

    /// Asks the text model for a completion and returns the trimmed text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, GenAiError> {
        let api_key = self.ensure_configured()?;
        let url = format!("{}/models/{}:generateContent", self.base_url, TEXT_MODEL);
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response: GenerateContentResponse = self.post_json(&url, api_key, &body).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Text generation succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        response
            .text()
            .map(|t| t.trim().to_string())
            .ok_or(GenAiError::EmptyContent)
    }

    /// Asks the image model for one square PNG and returns it as a data URI.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, GenAiError> {
        let api_key = self.ensure_configured()?;
        let url = format!("{}/models/{}:predict", self.base_url, IMAGE_MODEL);
        let body = PredictRequest {
            instances: vec![PredictInstance { prompt }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "1:1",
                output_options: OutputOptions {
                    mime_type: IMAGE_MIME_TYPE,
                },
            },
        };

        let response: PredictResponse = self.post_json(&url, api_key, &body).await?;

        let prediction = response
            .predictions
            .into_iter()
            .find(|p| p.bytes_base64_encoded.as_deref().is_some_and(|b| !b.is_empty()))
            .ok_or(GenAiError::NoImage)?;

        let mime = prediction.mime_type.as_deref().unwrap_or(IMAGE_MIME_TYPE);
        let bytes = prediction.bytes_base64_encoded.unwrap_or_default();
        Ok(format!("data:{mime};base64,{bytes}"))
    }

    /// POSTs a JSON body and decodes the JSON response.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    async fn post_json<B, R>(&self, url: &str, api_key: &str, body: &B) -> Result<R, GenAiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut last_error: Option<GenAiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_base * (1 << (attempt - 1));
                warn!(
                    "Generative call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(url)
                .header("x-goog-api-key", api_key)
                .json(body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GenAiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Generative API returned {}: {}", status, body);
                last_error = Some(GenAiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(GenAiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        Err(last_error.unwrap_or(GenAiError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-process stand-in for the generative API, bound to an ephemeral port.

    use std::collections::VecDeque;
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::extract::State;
    use axum::http::{Request, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::any;
    use axum::Router;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct CapturedRequest {
        pub path: String,
        pub api_key: Option<String>,
        pub body: serde_json::Value,
    }

    #[derive(Clone, Default)]
    struct MockState {
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
        responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    }

    pub struct MockGenAi {
        pub addr: SocketAddr,
        state: MockState,
        shutdown: tokio::sync::watch::Sender<bool>,
    }

    impl MockGenAi {
        pub async fn start() -> Self {
            let state = MockState::default();
            let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

            let app = Router::new()
                .route("/*path", any(handle_request))
                .with_state(state.clone());

            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind mock server");
            let addr = listener.local_addr().unwrap();

            tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown_rx.changed().await;
                    })
                    .await
                    .ok();
            });

            Self {
                addr,
                state,
                shutdown: shutdown_tx,
            }
        }

        pub fn base_url(&self) -> String {
            format!("http://{}/v1beta", self.addr)
        }

        pub async fn enqueue(&self, status: u16, body: serde_json::Value) {
            self.state
                .responses
                .lock()
                .await
                .push_back((status, body.to_string()));
        }

        pub async fn requests(&self) -> Vec<CapturedRequest> {
            self.state.requests.lock().await.clone()
        }
    }

    impl Drop for MockGenAi {
        fn drop(&mut self) {
            let _ = self.shutdown.send(true);
        }
    }

    async fn handle_request(State(state): State<MockState>, req: Request<Body>) -> Response {
        let path = req.uri().path().to_string();
        let api_key = req
            .headers()
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(req.into_body(), 1024 * 1024)
            .await
            .unwrap_or_default();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        state.requests.lock().await.push(CapturedRequest {
            path,
            api_key,
            body,
        });

        let (status, body) = state
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or((500, r#"{"error":{"message":"no response queued"}}"#.to_string()));

        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [("content-type", "application/json")], body).into_response()
    }
}
