use crate::config::AppConfig;
use crate::directory::DirectoryApi;
use crate::dispatch::Dispatcher;
use crate::error::CliError;
use crate::llm::TaskExtractor;
use std::sync::Arc;

#[derive(Clone)]
pub struct Services {
    pub directory: Arc<dyn DirectoryApi>,
    pub extractor: Arc<dyn TaskExtractor>,
    /// Process-wide rate-limit state; every remote directory call goes through it.
    pub dispatcher: Arc<Dispatcher>,
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, CliError>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    services_factory: Option<Arc<dyn ServicesFactory>>,
}

impl AppContext {
    pub fn new(cfg: AppConfig, services_factory: Option<Arc<dyn ServicesFactory>>) -> Self {
        Self {
            cfg,
            services_factory,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn with_config(&self, cfg: AppConfig) -> Self {
        Self {
            cfg,
            services_factory: self.services_factory.clone(),
        }
    }

    pub async fn build_services(&self) -> Result<Services, CliError> {
        let Some(factory) = self.services_factory.as_ref() else {
            return Err(CliError::Config(
                "services_factory missing (cannot build directory/extractor services)".into(),
            ));
        };
        factory.build_services(&self.cfg).await
    }
}
