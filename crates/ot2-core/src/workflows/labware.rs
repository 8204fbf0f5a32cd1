use super::protocol::Protocol;
use crate::engine::error::EngineError;
use crate::engine::parameters::{ParameterBlock, build};
use crate::core::models::value::ParamValue;

pub const NAME: &str = "labware";

/// Registers every custom labware definition on a robot. Takes no input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabwareProtocol;

impl Protocol for LabwareProtocol {
    fn short_name(&self) -> &str {
        NAME
    }

    fn title(&self) -> &str {
        "Labware Creation Protocol"
    }

    fn description(&self) -> &str {
        "Load all custom labware definitions on a robot (if a robot is new or new labware has been added)."
    }

    fn template_name(&self) -> &str {
        NAME
    }

    fn parameters(&self) -> Result<ParameterBlock, EngineError> {
        build(Vec::<(String, ParamValue)>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::templates::BuiltinTemplates;

    #[test]
    fn labware_script_has_empty_parameter_block() {
        let script = LabwareProtocol.generate(&BuiltinTemplates).unwrap();
        assert!(script.contains("PARAMETERS = {}"));
    }
}
