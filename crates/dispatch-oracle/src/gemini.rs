//! Gemini-backed oracle client
//!
//! Talks to the Google Generative Language API (`generateContent`). Model
//! output arrives as free text, usually wrapped in a ```json fence, and is
//! stripped and parsed into the wire types. Any transport, timeout,
//! status, or parse problem maps to `OracleError` so the engine falls
//! back instead of failing.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dispatch_store::{Delivery, DeliveryDraft};

use crate::client::{DisruptionEvent, OracleResult, PriorityOracle, RouteOracle};
use crate::error::OracleError;
use crate::wire::RoutePatch;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gemini client configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL (overridable for tests)
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// API key
    pub api_key: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Build config from environment variables.
    ///
    /// Reads `GEMINI_API_KEY` (required), `DISPATCH_GEMINI_MODEL`, and
    /// `DISPATCH_ORACLE_TIMEOUT_SECS`.
    pub fn from_env() -> OracleResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| OracleError::NotConfigured("GEMINI_API_KEY is not set".to_string()))?;
        let model =
            std::env::var("DISPATCH_GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("DISPATCH_ORACLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(GeminiConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            api_key,
            timeout_secs,
        })
    }

    /// Config for a specific key and model, with defaults elsewhere.
    pub fn new(api_key: &str, model: &str) -> Self {
        GeminiConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

/// Network-backed oracle over the Gemini `generateContent` endpoint.
pub struct GeminiOracle {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiOracle {
    pub fn new(config: GeminiConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent("dispatch-oracle/0.1.0")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        GeminiOracle {
            config,
            http_client,
        }
    }

    /// Client from environment variables.
    pub fn from_env() -> OracleResult<Self> {
        Ok(Self::new(GeminiConfig::from_env()?))
    }

    async fn generate(&self, prompt: String) -> OracleResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.config.timeout_secs)
                } else {
                    OracleError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "oracle returned error status");
            return Err(OracleError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| OracleError::Malformed("response carried no candidates".to_string()))?;

        debug!(chars = text.len(), "oracle responded");
        Ok(text)
    }
}

/// Strip markdown code fences the model wraps around JSON output.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn priority_prompt(deliveries: &[Delivery]) -> OracleResult<String> {
    let input = serde_json::to_string_pretty(deliveries)?;
    Ok(format!(
        "You are an intelligent logistics planner.\n\
         Analyze each delivery and assign priorities (High, Medium, Low)\n\
         semantically based on the nature of the item (not rules).\n\n\
         Input Deliveries:\n{input}\n\n\
         Return JSON like:\n\
         [\n  {{\n    \"delivery_id\": \"<id>\",\n    \"item\": \"<item>\",\n    \
         \"location\": \"<location>\",\n    \"priority_label\": \"<High|Medium|Low>\",\n    \
         \"urgency_score\": <1-10>,\n    \"reason\": \"<why>\",\n    \"lat\": <float>,\n    \
         \"lon\": <float>,\n    \"assigned_agent\": \"<agent>\"\n  }}\n]"
    ))
}

fn reoptimize_prompt(
    deliveries: &[Delivery],
    event: Option<&DisruptionEvent>,
) -> OracleResult<String> {
    let input = serde_json::to_string_pretty(deliveries)?;
    let event_text = event.map(|e| e.as_str()).unwrap_or("None");
    Ok(format!(
        "You are a route optimization AI.\n\
         Reassign or reroute deliveries if needed based on this event:\n\
         \"{event_text}\"\n\n\
         Example: If rally or flood affects an area, reassign deliveries to\n\
         other agents or alter routes.\n\n\
         Input Deliveries:\n{input}\n\n\
         Return valid JSON with possibly updated 'assigned_agent' and 'reason'."
    ))
}

#[async_trait]
impl PriorityOracle for GeminiOracle {
    async fn analyze(&self, deliveries: &[Delivery]) -> OracleResult<Vec<DeliveryDraft>> {
        let text = self.generate(priority_prompt(deliveries)?).await?;
        let drafts: Vec<DeliveryDraft> = serde_json::from_str(&strip_code_fences(&text))?;
        Ok(drafts)
    }
}

#[async_trait]
impl RouteOracle for GeminiOracle {
    async fn reoptimize(
        &self,
        deliveries: &[Delivery],
        event: Option<&DisruptionEvent>,
    ) -> OracleResult<Vec<RoutePatch>> {
        let text = self.generate(reoptimize_prompt(deliveries, event)?).await?;
        let patches: Vec<RoutePatch> = serde_json::from_str(&strip_code_fences(&text))?;
        Ok(patches)
    }
}
