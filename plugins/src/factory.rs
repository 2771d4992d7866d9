use std::sync::Arc;

use anyhow::Result;

use taskbridge_core::api::{AppConfig, DirectoryApi, Dispatcher, TaskExtractor};

use crate::llm::OpenAiExtractor;
use crate::notion::NotionClient;

pub fn build_directory(cfg: &AppConfig) -> Result<Arc<dyn DirectoryApi>> {
    if cfg.directory.api_key.trim().is_empty() {
        tracing::warn!(
            target: "taskbridge.factory",
            "directory api key is empty; remote calls will be unauthenticated"
        );
    }
    Ok(Arc::new(NotionClient::new(&cfg.directory)?))
}

pub fn build_extractor(cfg: &AppConfig) -> Result<Arc<dyn TaskExtractor>> {
    Ok(Arc::new(OpenAiExtractor::new(&cfg.llm)?))
}

/// The single process-wide dispatcher. Build it once and share it.
pub fn build_dispatcher(cfg: &AppConfig) -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(&cfg.limiter))
}
