pub mod generate;
pub mod plan;
pub mod sanger;
pub mod templates;

use crate::config::{self, AppConfig, CliOverrides};
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub quiet: bool,
}

impl Context {
    /// Loads the config file and layers the command-line values over it.
    pub fn resolve_config<'a>(&'a self, mut overrides: CliOverrides<'a>) -> Result<AppConfig> {
        let file_config = config::load_file_config(self.config_path.as_deref())?;
        if overrides.templates_dir.is_none() {
            overrides.templates_dir = self.templates_dir.as_deref();
        }
        config::build_config(file_config, overrides)
    }
}

/// Writes a generated script, creating missing parent directories.
pub fn write_script(path: &Path, script: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, script)?;
    info!("Wrote {} bytes to {:?}", script.len(), path);
    Ok(())
}
