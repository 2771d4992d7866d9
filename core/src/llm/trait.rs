use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::input::ValidatedRequest;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Raw model answer for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Message text; expected to hold a JSON array of tasks.
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// Language-model stage that turns a free-text request into task JSON.
#[async_trait]
pub trait TaskExtractor: Send + Sync {
    fn name(&self) -> &str;
    async fn extract(&self, req: &ValidatedRequest) -> anyhow::Result<Completion>;
}
