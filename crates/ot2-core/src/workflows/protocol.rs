use crate::core::io::templates::TemplateSource;
use crate::engine::error::EngineError;
use crate::engine::merger::merge;
use crate::engine::parameters::ParameterBlock;
use serde::Serialize;

/// A protocol that can be rendered into an OT-2 script.
///
/// Implementors describe themselves and produce the parameter block for their
/// template; [`Protocol::generate`] does the rest.
pub trait Protocol {
    fn short_name(&self) -> &str;
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn template_name(&self) -> &str;

    fn parameters(&self) -> Result<ParameterBlock, EngineError>;

    /// Builds the parameter block and merges it into this protocol's template.
    fn generate(&self, templates: &dyn TemplateSource) -> Result<String, EngineError> {
        let block = self.parameters()?;
        merge(&templates, self.template_name(), &block)
    }
}

/// Catalog entry for a user-facing protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtocolInfo {
    pub short_name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// The protocols offered to operators, in display order.
pub fn catalog() -> Vec<ProtocolInfo> {
    vec![super::elisa::INFO, super::sanger::INFO]
}
