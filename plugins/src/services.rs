//! ServicesFactory 实现：从配置构建目录客户端、任务抽取器与共享调度器，供 CLI 复用。
use async_trait::async_trait;
use taskbridge_core::api::{AppConfig, CliError, Services, ServicesFactory};

use crate::factory;

#[derive(Default)]
pub struct PluginServicesFactory;

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, CliError> {
        let directory = factory::build_directory(cfg)?;
        let extractor = factory::build_extractor(cfg)?;
        let dispatcher = factory::build_dispatcher(cfg);
        Ok(Services {
            directory,
            extractor,
            dispatcher,
        })
    }
}
