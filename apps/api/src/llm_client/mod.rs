//! Client for the upstream chat-completion gateway.
//!
//! Every model call in the service goes through `LlmClient`: chat replies,
//! streamed replies and document extraction. The gateway speaks the
//! OpenAI-style `choices` protocol and routes on the `x-higress-llm-model`
//! header.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::sanitize::{sanitize_header_value, sanitize_model_id};

mod stream;

pub use stream::DeltaSink;

const MODEL_HEADER: &str = "x-higress-llm-model";

/// Models the gateway is known to serve. There is no discovery call.
pub const MODEL_CATALOG: &[&str] = &[
    "azure/gpt-5-mini",
    "azure/gpt-5",
    "azure/gpt-5-chat",
    "azure/gpt-5-nano",
    "nbg-v3-33b",
    "bailian/deepseek-v3",
    "bailian/deepseek-r1",
    "bailian/deepseek-v3.1",
    "bailian/qwen-flash",
    "bailian/qwen-plus",
    "bailian/qwen-vl-max",
    "bailian/qwen-vl-plus",
];

/// Bodies some misconfigured gateways return with a 200 instead of a completion.
const DEGENERATE_BODIES: &[&str] = &["success", "ok", "Success"];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("upstream returned an empty body")]
    EmptyBody,

    #[error("upstream returned a bare '{0}' instead of a completion; check the API key and request format")]
    UnexpectedBody(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("stream receiver went away")]
    SinkClosed,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatCompletion {
    /// Content of the first choice; `None` when the model returned no choices.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|c| c.message.content.as_deref().unwrap_or_default())
    }
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url,
            api_key: sanitize_header_value(&api_key),
        })
    }

    pub fn list_models(&self) -> &'static [&'static str] {
        MODEL_CATALOG
    }

    /// Single-shot completion.
    pub async fn send_message(
        &self,
        model_id: &str,
        prompt: &str,
        attachments: &[String],
    ) -> Result<ChatCompletion, LlmError> {
        let content = with_attachment_note(prompt, attachments);
        let response = self.post(model_id, &content, false).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Model API returned {status}: {body}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let completion = parse_completion(&body)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Model call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(completion)
    }

    /// Streams the completion into `sink` delta by delta.
    /// There is no retry: a transport failure mid-stream ends the call.
    pub async fn send_stream_message(
        &self,
        model_id: &str,
        prompt: &str,
        attachments: &[String],
        sink: &mut dyn DeltaSink,
    ) -> Result<(), LlmError> {
        let content = with_attachment_note(prompt, attachments);
        let response = self.post(model_id, &content, true).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Model API returned {status} for stream request: {body}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        stream::pump_deltas(response, sink).await
    }

    async fn post(
        &self,
        model_id: &str,
        content: &str,
        stream: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let routed_model = sanitize_model_id(model_id);
        info!("Calling model API: model={model_id}, routed_as={routed_model}, stream={stream}");

        let request = ChatRequest {
            model: model_id,
            stream,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header(MODEL_HEADER, routed_model)
            .json(&request)
            .send()
            .await?;
        Ok(response)
    }
}

fn parse_completion(body: &str) -> Result<ChatCompletion, LlmError> {
    if body.is_empty() {
        return Err(LlmError::EmptyBody);
    }
    if DEGENERATE_BODIES.contains(&body) {
        return Err(LlmError::UnexpectedBody(body.to_string()));
    }
    Ok(serde_json::from_str(body)?)
}

/// Appends a short note per image/PDF data URL so the model knows files were sent.
fn with_attachment_note(prompt: &str, attachments: &[String]) -> String {
    if attachments.is_empty() {
        return prompt.to_string();
    }
    let mut content = format!("{prompt}\n\n[附件信息]:\n");
    for (i, attachment) in attachments.iter().enumerate() {
        if attachment.starts_with("data:image/") {
            content.push_str(&format!("图片附件 {}: [已上传]\n", i + 1));
        } else if attachment.starts_with("data:application/pdf") {
            content.push_str(&format!("PDF附件 {}: [已上传]\n", i + 1));
        }
    }
    content
}

/// Strips ```json ... ``` or ``` ... ``` fences, then narrows to the outermost
/// `{ ... }` so prose around the object is tolerated.
pub fn extract_json_object(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text).trim();

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}
