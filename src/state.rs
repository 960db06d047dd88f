use crate::config::AppConfig;
use crate::shell::{CommandRunner, SystemRunner};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub runner: Arc<dyn CommandRunner>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let runner = Arc::new(SystemRunner) as Arc<dyn CommandRunner>;
        Ok(Self::from_parts(config, runner))
    }

    pub fn from_parts(config: Arc<AppConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }
}
