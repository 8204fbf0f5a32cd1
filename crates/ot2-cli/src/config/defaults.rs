use crate::integrations::{DEFAULT_TIMEOUT, benchling, genewiz};
use ot2protocols::engine::config::{
    DEFAULT_MIN_CONCENTRATION_NG_PER_UL, DEFAULT_TARGET_MASS_NG, DEFAULT_TRANSFER_VOLUME_UL,
    PreparationMode,
};
use std::time::Duration;

pub struct DefaultsConfig {
    pub min_concentration: f64,
    pub target_mass: f64,
    pub transfer_volume: f64,
    pub preparation: PreparationMode,
    pub benchling_api_url: String,
    pub genewiz_api_url: String,
    pub timeout: Duration,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            min_concentration: DEFAULT_MIN_CONCENTRATION_NG_PER_UL,
            target_mass: DEFAULT_TARGET_MASS_NG,
            transfer_volume: DEFAULT_TRANSFER_VOLUME_UL,
            preparation: PreparationMode::Independent,
            benchling_api_url: benchling::DEFAULT_API_URL.to_string(),
            genewiz_api_url: genewiz::DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
