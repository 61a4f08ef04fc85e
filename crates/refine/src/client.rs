//! The refiner trait and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;

use crate::messages::{ChatMessage, ChatRequest, ChatResponse};

/// Instruction sent as the system message on every refinement call.
const SYSTEM_PROMPT: &str = "You are an AI assistant that refines customer notes. \
    Your goal is to highlight important details and correct any errors in the notes. \
    Reply with the refined notes only.";

/// Rewrites free-text customer notes.
///
/// Implementations must not mutate anything on failure; callers keep the
/// original notes whenever `refine` errors, which makes the operation
/// safely retryable.
#[async_trait]
pub trait NotesRefiner: Send + Sync {
    async fn refine(&self, notes: &str) -> Result<String, RefineError>;
}

/// Errors from the refinement layer.
#[derive(Debug, thiserror::Error)]
pub enum RefineError {
    /// The input was blank. Detected before any network call.
    #[error("Notes are empty, nothing to refine")]
    EmptyNotes,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Refinement API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A well-formed response without usable assistant text.
    #[error("Refinement response contained no content")]
    MissingContent,
}

/// [`NotesRefiner`] backed by an OpenAI-compatible chat-completions
/// endpoint. Single shot, no retries.
pub struct HttpRefiner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl HttpRefiner {
    /// Create a refiner client.
    ///
    /// * `base_url` - API root, e.g. `https://api.openai.com/v1`.
    /// * `api_key` - Bearer token for the provider.
    /// * `model` - Model name to request.
    /// * `timeout` - Per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl NotesRefiner for HttpRefiner {
    async fn refine(&self, notes: &str) -> Result<String, RefineError> {
        if notes.trim().is_empty() {
            return Err(RefineError::EmptyNotes);
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(notes),
            ],
        };

        tracing::debug!(model = %self.model, chars = notes.len(), "Refining notes");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RefineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response.json().await?;
        completion.into_content().ok_or(RefineError::MissingContent)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
