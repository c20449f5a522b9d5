//! Assistant chat client — forwards a wizard question plus step context to
//! the chat-completion API and returns the reply text.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{ConfigError, Error, UpstreamError};

const SERVICE: &str = "assistant chat";

/// How much prior conversation is forwarded as context. Older messages are
/// dropped; the cap is deliberate and fixed.
pub const MAX_HISTORY_MESSAGES: usize = 10;

const FALLBACK_REPLY: &str =
    "I'm sorry, I couldn't generate a response. Can you try asking in a different way?";

/// One prior exchange in the help conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub text: String,
    /// True when the assistant said it, false for the buyer.
    #[serde(rename = "isBot")]
    pub from_assistant: bool,
}

/// A chat request from the wizard UI.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Step title, e.g. "Offer Details".
    #[serde(rename = "currentStep")]
    pub current_step: String,
    /// Property record from the lookup step, when one was resolved.
    #[serde(rename = "propertyContext", default)]
    pub property_context: Option<Value>,
    /// The in-progress draft, for personalizing answers.
    #[serde(rename = "formContext", default)]
    pub form_context: Option<Value>,
    #[serde(rename = "conversationHistory", default)]
    pub conversation_history: Vec<ChatTurn>,
}

/// Build the system prompt from whatever context is known so far.
pub fn build_context_prompt(
    current_step: &str,
    property: Option<&Value>,
    form: Option<&Value>,
) -> String {
    let mut prompt = format!(
        "You are a helpful real estate assistant helping someone fill out a home \
         purchase offer form. You should be friendly, conversational, and provide \
         clear guidance.\n\nCurrent Step: {current_step}\n"
    );

    if let Some(property) = property {
        if let Some(full) = property.pointer("/address/full").and_then(|v| v.as_str()) {
            prompt.push_str(&format!("\nProperty: {full}"));
            if let Some(price) = property.get("price").and_then(|v| v.as_f64()) {
                prompt.push_str(&format!("\nListing Price: ${price:.0}"));
            }
            let beds = property.get("bedrooms").and_then(|v| v.as_f64());
            let baths = property.get("bathrooms").and_then(|v| v.as_f64());
            if let (Some(beds), Some(baths)) = (beds, baths) {
                prompt.push_str(&format!("\nBeds/Baths: {beds}/{baths}"));
            }
            if let Some(sqft) = property.get("squareFeet").and_then(|v| v.as_u64()) {
                prompt.push_str(&format!("\nSquare Feet: {sqft}"));
            }
        }
    }

    if let Some(form) = form {
        if let Some(name) = form.pointer("/buyerdata/Buyer1Name").and_then(|v| v.as_str()) {
            prompt.push_str(&format!("\nBuyer Name: {name}"));
        }
        if let Some(price) = form
            .pointer("/buyerdata/offer_price_num")
            .and_then(|v| v.as_f64())
        {
            prompt.push_str(&format!("\nOffer Price: ${price:.0}"));
        }
    }

    prompt.push_str(
        "\n\nProvide helpful, friendly answers. Keep responses concise (2-4 sentences). \
         Use natural, conversational language. Don't use technical jargon unless \
         necessary, and if you do, explain it simply.",
    );
    prompt
}

/// Assemble the upstream message list: system context, capped history, then
/// the new question.
pub fn build_messages(request: &ChatRequest) -> Vec<Value> {
    let context = build_context_prompt(
        &request.current_step,
        request.property_context.as_ref(),
        request.form_context.as_ref(),
    );

    let mut messages = vec![json!({"role": "system", "content": context})];
    let history = &request.conversation_history;
    let start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    for turn in &history[start..] {
        let role = if turn.from_assistant { "assistant" } else { "user" };
        messages.push(json!({"role": role, "content": turn.text}));
    }
    messages.push(json!({"role": "user", "content": request.message}));
    messages
}

/// HTTP client for the chat-completion API.
pub struct AssistantClient {
    http: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl AssistantClient {
    pub fn new(
        http: reqwest::Client,
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            model: model.into(),
            api_key,
        }
    }

    /// Answer a wizard question. A missing API key is a configuration
    /// error, not an upstream one.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String, Error> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(Error::Config(ConfigError::MissingApiKey))?;

        let body = json!({
            "model": self.model,
            "messages": build_messages(request),
            "temperature": 0.7,
            "max_tokens": 300,
        });

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                service: SERVICE.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Assistant upstream error");
            return Err(UpstreamError::Status {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                detail: detail.chars().take(200).collect(),
            }
            .into());
        }

        let data: Value = response.json().await.map_err(|e| UpstreamError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: e.to_string(),
        })?;

        Ok(data
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}
