use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use taskbridge_core::api::{Completion, LlmConfig, TaskExtractor, TokenUsage, ValidatedRequest};

use super::prompt::system_prompt;
use crate::http::{parse_json_response, ApiHttpError};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Task extraction over an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiExtractor {
    api_key: String,
    model: String,
    max_tokens: u32,
    http: reqwest::Client,
    url_completions: String,
}

impl OpenAiExtractor {
    pub fn new(cfg: &LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()?;
        let normalized = cfg.base_url.trim_end_matches('/');
        Ok(Self {
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            http,
            url_completions: format!("{}/chat/completions", normalized),
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl TaskExtractor for OpenAiExtractor {
    fn name(&self) -> &str {
        "openai"
    }

    async fn extract(&self, req: &ValidatedRequest) -> anyhow::Result<Completion> {
        let url = &self.url_completions;
        let system = system_prompt(req);
        let body = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &req.task,
                },
            ],
        };
        tracing::debug!(
            target: "taskbridge.llm",
            url = %url,
            model = %self.model,
            max_tokens = self.max_tokens,
            task_len = req.task.len(),
            "chat completion request"
        );

        let resp = self
            .auth(self.http.post(url).json(&body))
            .send()
            .await
            .map_err(|err| ApiHttpError::from_reqwest(err, url.clone()))?;
        let value: Value = parse_json_response(resp).await?;
        let parsed: ChatResponse = serde_json::from_value(value)
            .map_err(|err| anyhow::anyhow!("unexpected chat completion shape: {err}"))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("chat completion returned no message content"))?;

        tracing::debug!(
            target: "taskbridge.llm",
            model = %parsed.model,
            prompt_tokens = parsed.usage.prompt_tokens,
            completion_tokens = parsed.usage.completion_tokens,
            "chat completion response"
        );
        Ok(Completion {
            content,
            model: parsed.model,
            usage: parsed.usage,
        })
    }
}
