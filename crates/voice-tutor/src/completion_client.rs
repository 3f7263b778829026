//! HTTP client for the tutor's chat endpoint.

use crate::{AppError, AppResult, config::CompletionConfig};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use voice_tutor_core::{
    CompletionDispatcher, CompletionRequest, SessionError, SessionEvent, SessionResult, Turn,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Turn],
    /// Voice sessions never carry a study plan.
    plan: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    reply: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Posts the conversation and returns the tutor's reply.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpCompletionClient {
    /// Build a client for the configured endpoint and timeout.
    #[track_caller]
    pub fn new(config: &CompletionConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to build HTTP client: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Send the whole conversation.
    ///
    /// Returns `Ok(None)` when the service answered without reply text.
    #[instrument(skip(self, messages), fields(endpoint = %self.endpoint, message_count = messages.len()))]
    pub async fn ask_completion(&self, messages: &[Turn]) -> SessionResult<Option<String>> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ChatRequest {
                messages,
                plan: None,
            })
            .send()
            .await
            .map_err(|e| SessionError::CompletionRequestError {
                reason: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SessionError::CompletionRequestError {
                reason: format!("Failed to read response body: {}", e),
                status: Some(status.as_u16()),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if !status.is_success() {
            let reason = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| format!("Request failed: {}", status.as_u16()));

            debug!(status = status.as_u16(), "Completion service returned an error");

            return Err(SessionError::CompletionRequestError {
                reason,
                status: Some(status.as_u16()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_slice(&body).map_err(|e| SessionError::CompletionParseError {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let reply = parsed.reply.filter(|r| !r.trim().is_empty());
        info!(
            reply_len = reply.as_ref().map_or(0, String::len),
            "Completion received"
        );

        Ok(reply)
    }
}

/// Runs each request on its own task and posts the outcome as a
/// [`SessionEvent::Completion`].
pub struct HttpCompletionDispatcher {
    client: Arc<HttpCompletionClient>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl HttpCompletionDispatcher {
    pub fn new(client: HttpCompletionClient, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            client: Arc::new(client),
            events,
        }
    }
}

impl CompletionDispatcher for HttpCompletionDispatcher {
    fn dispatch(&mut self, request: CompletionRequest) {
        let client = Arc::clone(&self.client);
        let events = self.events.clone();

        tokio::spawn(async move {
            let CompletionRequest {
                session_id,
                messages,
            } = request;

            let outcome = client.ask_completion(&messages).await;

            if events
                .send(SessionEvent::Completion {
                    session_id,
                    outcome,
                })
                .is_err()
            {
                error!(%session_id, "Event loop gone, completion dropped");
            }
        });
    }
}
