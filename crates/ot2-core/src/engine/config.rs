use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The four-step doubling ladder used when none is given.
pub const DEFAULT_LADDER: [f64; 4] = [1.0, 2.0, 4.0, 8.0];
pub const DEFAULT_TARGET_MASS_NG: f64 = 1000.0;
pub const DEFAULT_TRANSFER_VOLUME_UL: f64 = 10.0;
pub const DEFAULT_MIN_CONCENTRATION_NG_PER_UL: f64 = 100.0;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// How the dilutions of a ladder are physically prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreparationMode {
    /// Every step is made directly from stock at its target fold.
    #[default]
    Independent,
    /// Every step after the first is made from the step before it.
    Serial,
}

impl PreparationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreparationMode::Independent => "independent",
            PreparationMode::Serial => "serial",
        }
    }
}

impl FromStr for PreparationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(PreparationMode::Independent),
            "serial" => Ok(PreparationMode::Serial),
            other => Err(ConfigError::InvalidValue {
                name: "preparation",
                reason: format!("expected 'independent' or 'serial', got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub min_concentration_ng_per_ul: f64,
    pub target_mass_ng: f64,
    pub transfer_volume_ul: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_concentration_ng_per_ul: DEFAULT_MIN_CONCENTRATION_NG_PER_UL,
            target_mass_ng: DEFAULT_TARGET_MASS_NG,
            transfer_volume_ul: DEFAULT_TRANSFER_VOLUME_UL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DilutionConfig {
    pub preparation: PreparationMode,
}

/// Settings for one generation run, fixed for every sample in it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunConfig {
    pub selection: SelectionConfig,
    pub dilution: DilutionConfig,
}

#[derive(Default)]
pub struct RunConfigBuilder {
    min_concentration_ng_per_ul: Option<f64>,
    target_mass_ng: Option<f64>,
    transfer_volume_ul: Option<f64>,
    preparation: Option<PreparationMode>,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_concentration(mut self, ng_per_ul: f64) -> Self {
        self.min_concentration_ng_per_ul = Some(ng_per_ul);
        self
    }
    pub fn target_mass(mut self, ng: f64) -> Self {
        self.target_mass_ng = Some(ng);
        self
    }
    pub fn transfer_volume(mut self, ul: f64) -> Self {
        self.transfer_volume_ul = Some(ul);
        self
    }
    pub fn preparation(mut self, mode: PreparationMode) -> Self {
        self.preparation = Some(mode);
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let min_concentration_ng_per_ul = self
            .min_concentration_ng_per_ul
            .ok_or(ConfigError::MissingParameter("min_concentration"))?;
        let target_mass_ng = self
            .target_mass_ng
            .ok_or(ConfigError::MissingParameter("target_mass"))?;
        let transfer_volume_ul = self
            .transfer_volume_ul
            .ok_or(ConfigError::MissingParameter("transfer_volume"))?;

        check_non_negative("min_concentration", min_concentration_ng_per_ul)?;
        check_positive("target_mass", target_mass_ng)?;
        check_positive("transfer_volume", transfer_volume_ul)?;

        Ok(RunConfig {
            selection: SelectionConfig {
                min_concentration_ng_per_ul,
                target_mass_ng,
                transfer_volume_ul,
            },
            dilution: DilutionConfig {
                preparation: self.preparation.unwrap_or_default(),
            },
        })
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            reason: format!("must be zero or greater, got {}", value),
        })
    }
}
