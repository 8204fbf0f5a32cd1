use super::protocol::Protocol;
use crate::core::models::value::ParamValue;
use crate::engine::error::EngineError;
use crate::engine::parameters::{ParameterBlock, build};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TEMPLATE_NAME: &str = "calibrate";

/// Items that can be calibrated on either robot configuration.
pub const COMMON_ITEMS: [&str; 6] = [
    "96_PCR_flat",
    "tube_rack_48_cold_block",
    "384_plate",
    "tiprack_200ul",
    "96_flat",
    "pipettes",
];

/// Only the low-volume robot carries the 10 µL tip rack.
pub const LOWVOL_ONLY_ITEMS: [&str; 1] = ["tiprack_10ul"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotConfig {
    HighVol,
    LowVol,
}

impl RobotConfig {
    pub const ALL: [RobotConfig; 2] = [RobotConfig::HighVol, RobotConfig::LowVol];

    pub fn as_str(&self) -> &'static str {
        match self {
            RobotConfig::HighVol => "highvol",
            RobotConfig::LowVol => "lowvol",
        }
    }

    /// Calibration items available on this configuration, in display order.
    pub fn items(&self) -> Vec<&'static str> {
        let mut items = COMMON_ITEMS.to_vec();
        if *self == RobotConfig::LowVol {
            // The 10 µL rack sits before the plates in the lowvol listing.
            items.insert(4, LOWVOL_ONLY_ITEMS[0]);
        }
        items
    }

    pub fn supports(&self, item: &str) -> bool {
        self.items().contains(&item)
    }
}

impl fmt::Display for RobotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RobotConfig {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "highvol" => Ok(RobotConfig::HighVol),
            "lowvol" => Ok(RobotConfig::LowVol),
            other => Err(EngineError::InvalidRequest(format!(
                "Unknown robot configuration '{}' (expected highvol or lowvol)",
                other
            ))),
        }
    }
}

/// Calibration run for one labware item (or the pipettes) on one robot
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationProtocol {
    robot_config: RobotConfig,
    item: String,
    name: String,
}

impl CalibrationProtocol {
    pub fn new(robot_config: RobotConfig, item: &str) -> Result<Self, EngineError> {
        if !robot_config.supports(item) {
            return Err(EngineError::InvalidRequest(format!(
                "'{}' cannot be calibrated on a {} robot",
                item, robot_config
            )));
        }
        Ok(Self {
            robot_config,
            item: item.to_string(),
            name: format!("{}_{}", robot_config, item),
        })
    }

    /// Every valid configuration/item pair.
    pub fn all() -> Vec<CalibrationProtocol> {
        RobotConfig::ALL
            .iter()
            .flat_map(|config| {
                config.items().into_iter().map(move |item| CalibrationProtocol {
                    robot_config: *config,
                    item: item.to_string(),
                    name: format!("{}_{}", config, item),
                })
            })
            .collect()
    }

    pub fn robot_config(&self) -> RobotConfig {
        self.robot_config
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    /// `<config>_<item>`, also used as the output file stem.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Protocol for CalibrationProtocol {
    fn short_name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        "Calibration"
    }

    fn description(&self) -> &str {
        "Calibrate a labware item or the pipettes for a robot configuration."
    }

    fn template_name(&self) -> &str {
        TEMPLATE_NAME
    }

    fn parameters(&self) -> Result<ParameterBlock, EngineError> {
        build([
            ("robot_config", ParamValue::from(self.robot_config.as_str())),
            ("item", ParamValue::from(self.item.as_str())),
        ])
    }
}
