use crate::integrations::ApiConfig;
use ot2protocols::engine::config::RunConfig;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub run: RunConfig,
    pub templates_dir: Option<PathBuf>,
    pub benchling: ApiConfig,
    pub genewiz: ApiConfig,
}
