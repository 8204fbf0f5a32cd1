use super::defaults::DefaultsConfig;
use super::file::{FileApiConfig, FileConfig};
use super::models::AppConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::integrations::ApiConfig;
use crate::utils::parser::{self, ParseError};
use ot2protocols::engine::config::{PreparationMode, RunConfigBuilder};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// The command-line layer: dedicated flags plus API keys given as flags or
/// through their environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides<'a> {
    pub run: Option<&'a RunArgs>,
    pub templates_dir: Option<&'a Path>,
    pub benchling_api_key: Option<&'a str>,
    pub genewiz_api_key: Option<&'a str>,
}

pub fn build_config(file_config: FileConfig, overrides: CliOverrides) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let set_values = overrides.run.map(|run| run.set_values.as_slice()).unwrap_or_default();
    let mut file_config = apply_set_values(file_config, set_values)?;

    let selection = file_config.selection.take().unwrap_or_default();
    let dilution = file_config.dilution.take().unwrap_or_default();
    let templates = file_config.templates.take().unwrap_or_default();
    let mut integrations = file_config.integrations.take().unwrap_or_default();

    let run = overrides.run.cloned().unwrap_or_default();
    let cli_preparation = run
        .preparation
        .as_deref()
        .map(str::parse::<PreparationMode>)
        .transpose()
        .map_err(|e| CliError::Argument(e.to_string()))?;

    let run_config = RunConfigBuilder::new()
        .min_concentration(
            run.min_concentration
                .or(selection.min_concentration)
                .unwrap_or(defaults.min_concentration),
        )
        .target_mass(
            run.target_mass
                .or(selection.target_mass)
                .unwrap_or(defaults.target_mass),
        )
        .transfer_volume(
            run.transfer_volume
                .or(selection.transfer_volume)
                .unwrap_or(defaults.transfer_volume),
        )
        .preparation(
            cli_preparation
                .or(dilution.preparation)
                .unwrap_or(defaults.preparation),
        )
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let templates_dir = overrides
        .templates_dir
        .map(Path::to_path_buf)
        .or(templates.directory);

    let benchling = merge_api_config(
        integrations.benchling.take(),
        overrides.benchling_api_key,
        &defaults.benchling_api_url,
        &defaults,
    );
    let genewiz = merge_api_config(
        integrations.genewiz.take(),
        overrides.genewiz_api_key,
        &defaults.genewiz_api_url,
        &defaults,
    );

    debug!(?run_config, ?templates_dir, "Resolved configuration");
    Ok(AppConfig {
        run: run_config,
        templates_dir,
        benchling,
        genewiz,
    })
}

fn merge_api_config(
    file_val: Option<FileApiConfig>,
    cli_key: Option<&str>,
    default_url: &str,
    defaults: &DefaultsConfig,
) -> ApiConfig {
    let file_val = file_val.unwrap_or_default();
    let mut config =
        ApiConfig::disabled(file_val.api_url.unwrap_or_else(|| default_url.to_string()));
    config.enabled = file_val.enabled.unwrap_or(false);
    config.api_key = cli_key.map(str::to_string).or(file_val.api_key);
    config.timeout = file_val
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(defaults.timeout);
    config
}

/// Applies `-S KEY=VALUE` overrides onto the file layer.
pub fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) = parser::split_key_value(kv_pair).map_err(config_error)?;

        match key {
            "selection.min-concentration" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .min_concentration = Some(parse_float(key, value)?);
            }
            "selection.target-mass" => {
                config.selection.get_or_insert_with(Default::default).target_mass =
                    Some(parse_float(key, value)?);
            }
            "selection.transfer-volume" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .transfer_volume = Some(parse_float(key, value)?);
            }
            "dilution.preparation" => {
                let mode = value
                    .parse::<PreparationMode>()
                    .map_err(|e| CliError::Config(e.to_string()))?;
                config.dilution.get_or_insert_with(Default::default).preparation = Some(mode);
            }
            "integrations.benchling.enabled" | "integrations.genewiz.enabled" => {
                let enabled = parser::parse_bool(key, value).map_err(config_error)?;
                api_section(&mut config, key).enabled = Some(enabled);
            }
            "integrations.benchling.timeout-secs" | "integrations.genewiz.timeout-secs" => {
                let secs = parser::parse_number::<u64>(key, value, "integer")
                    .map_err(config_error)?;
                api_section(&mut config, key).timeout_secs = Some(secs);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

fn api_section<'a>(config: &'a mut FileConfig, key: &str) -> &'a mut FileApiConfig {
    let integrations = config.integrations.get_or_insert_with(Default::default);
    if key.starts_with("integrations.benchling.") {
        integrations.benchling.get_or_insert_with(Default::default)
    } else {
        integrations.genewiz.get_or_insert_with(Default::default)
    }
}

fn parse_float(key: &str, value: &str) -> Result<f64> {
    parser::parse_number(key, value, "float").map_err(config_error)
}

fn config_error(e: ParseError) -> CliError {
    CliError::Config(e.to_string())
}
