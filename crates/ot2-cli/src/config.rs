mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{CliOverrides, build_config};
pub use file::FileConfig;
pub use models::AppConfig;

use crate::error::Result;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// `config.toml` in the platform configuration directory, when one exists.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "ot2protocols", "ot2").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Reads the explicit config file, or the default one if it is present.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return FileConfig::from_file(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => FileConfig::from_file(&path),
        Some(path) => {
            debug!("No configuration file at {:?}; using defaults.", path);
            Ok(FileConfig::default())
        }
        None => Ok(FileConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::io::Write;

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[selection]\ntarget-mass = 800.0").unwrap();

        let config = load_file_config(Some(file.path())).unwrap();
        assert_eq!(config.selection.unwrap().target_mass, Some(800.0));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_file_config(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn default_path_ends_with_the_file_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }
}
