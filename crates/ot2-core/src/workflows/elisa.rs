use super::protocol::{Protocol, ProtocolInfo};
use crate::engine::error::EngineError;
use crate::engine::parameters::{ParameterBlock, build};
use crate::core::models::value::ParamValue;

pub const NAME: &str = "elisa";
pub const MAX_SAMPLES: usize = 8;

pub const INFO: ProtocolInfo = ProtocolInfo {
    short_name: NAME,
    title: "ELISA Protocol",
    description: "Generate an ELISA protocol for the OT2.",
};

/// One ELISA plate run; each sample occupies a plate column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElisaProtocol {
    num_samples: usize,
}

impl ElisaProtocol {
    pub fn new(num_samples: usize) -> Result<Self, EngineError> {
        if !(1..=MAX_SAMPLES).contains(&num_samples) {
            return Err(EngineError::InvalidRequest(format!(
                "ELISA runs take between 1 and {} samples, got {}",
                MAX_SAMPLES, num_samples
            )));
        }
        Ok(Self { num_samples })
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }
}

impl Protocol for ElisaProtocol {
    fn short_name(&self) -> &str {
        INFO.short_name
    }

    fn title(&self) -> &str {
        INFO.title
    }

    fn description(&self) -> &str {
        INFO.description
    }

    fn template_name(&self) -> &str {
        NAME
    }

    fn parameters(&self) -> Result<ParameterBlock, EngineError> {
        build([("num_samples", ParamValue::from(self.num_samples))])
    }
}
