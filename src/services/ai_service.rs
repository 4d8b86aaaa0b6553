use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::database::models::SuggestedItem;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("suggestion request failed: {0}")]
    Upstream(String),

    #[error("unusable suggestion response: {0}")]
    InvalidResponse(String),
}

/// Boundary capability: turn a free-text order summary into structured
/// candidate line items.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn suggest(
        &self,
        summary: &str,
        address: Option<&str>,
    ) -> Result<Vec<SuggestedItem>, SuggestionError>;
}

struct ProviderClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

/// Chat-completion-backed suggestion adapter. Constructed without a
/// credential it is permanently disabled: every call returns an empty list
/// with no error and no network attempt.
pub struct OpenAiSuggestionService {
    client: Option<ProviderClient>,
}

impl OpenAiSuggestionService {
    pub fn new(cfg: &AiConfig) -> Self {
        let Some(api_key) = cfg.api_key.clone() else {
            warn!("OPENAI_API_KEY not set, suggestion service will return empty suggestions");
            return Self { client: None };
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build();

        match http {
            Ok(http) => Self {
                client: Some(ProviderClient {
                    http,
                    api_key,
                    model: cfg.model.clone(),
                    temperature: cfg.temperature,
                    max_tokens: cfg.max_tokens,
                }),
            },
            Err(e) => {
                warn!("failed to build suggestion HTTP client, running disabled: {}", e);
                Self { client: None }
            }
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You are a professional pharmacy receptionist. You only handle \
medicines and health-related products. Respond with valid JSON arrays only.";

fn build_prompt(summary: &str, address: Option<&str>) -> String {
    let address_context = match address {
        Some(addr) if !addr.is_empty() => format!("\nDelivery Address: {}", addr),
        _ => String::new(),
    };

    format!(
        r#"You are a professional pharmacy receptionist. Your role is to help customers with medicines and health-related products only.
Based on the customer's request below, suggest appropriate medicines and health products. Consider:
1. Any specific medicines mentioned in the request
2. Diseases or symptoms mentioned
3. Location/address context (if provided) - consider local availability and common health needs in that area
4. Only suggest medicines, supplements, medical supplies, and health-related products
5. Do NOT suggest non-medical items like groceries, electronics, etc.
Customer Request: {}{}
Please respond ONLY with a valid JSON array of suggested products in this exact format:
[
  {{
    "name": "Product Name",
    "quantity": 1,
    "price": 0.00,
    "reason": "Brief explanation why this product is suggested"
  }}
]
Important:
- Return ONLY the JSON array, no other text
- Include 2-5 relevant products
- Use realistic prices (in USD)
- Be specific with product names (use actual medicine names if mentioned)
- If no medicines or health-related items are mentioned, return an empty array: []"#,
        summary, address_context
    )
}

/// Providers wrap JSON answers in markdown fences often enough that the raw
/// content must be unwrapped before parsing.
fn parse_suggestions(raw: &str) -> Result<Vec<SuggestedItem>, SuggestionError> {
    let content = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(content).map_err(|e| SuggestionError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl SuggestionProvider for OpenAiSuggestionService {
    async fn suggest(
        &self,
        summary: &str,
        address: Option<&str>,
    ) -> Result<Vec<SuggestedItem>, SuggestionError> {
        let Some(client) = &self.client else {
            debug!("suggestion client not configured, returning empty suggestions");
            return Ok(Vec::new());
        };

        let request = ChatRequest {
            model: client.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(summary, address),
                },
            ],
            temperature: client.temperature,
            max_tokens: client.max_tokens,
        };

        let response = client
            .http
            .post(COMPLETIONS_URL)
            .bearer_auth(&client.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SuggestionError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| SuggestionError::Upstream(e.to_string()))?;

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| SuggestionError::InvalidResponse(e.to_string()))?;

        let Some(choice) = completion.choices.first() else {
            warn!("suggestion provider returned no choices");
            return Ok(Vec::new());
        };

        let items = parse_suggestions(&choice.message.content)?;
        debug!("suggestion provider returned {} items", items.len());
        Ok(items)
    }
}
