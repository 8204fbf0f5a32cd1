use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid dilution ladder for sample '{sample_id}': {reason}")]
    InvalidLadder { sample_id: String, reason: String },

    #[error(
        "Dilution {factor}x of sample '{sample_id}' measured {concentration} ng/µL, below the minimum of {minimum} ng/µL"
    )]
    ThresholdNotMet {
        sample_id: String,
        factor: f64,
        concentration: f64,
        minimum: f64,
    },

    #[error("Parameter '{key}' cannot be serialized: {reason}")]
    UnserializableParameter { key: String, reason: String },

    #[error("Template '{name}' not found")]
    TemplateNotFound { name: String },

    #[error("Template '{name}' is malformed: {reason}")]
    TemplateMalformed { name: String, reason: String },

    #[error("Failed to read template '{name}': {source}")]
    TemplateIo {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template '{template}' requires parameter '{key}', which was not supplied")]
    MissingParameter { template: String, key: String },

    #[error("Dilution {factor}x is not part of the ladder for sample '{sample_id}'")]
    UnknownDilution { sample_id: String, factor: f64 },

    #[error("No concentration was recorded for dilution {factor}x of sample '{sample_id}'")]
    MissingMeasurement { sample_id: String, factor: f64 },

    #[error("Invalid measurement for sample '{sample_id}': {reason}")]
    InvalidMeasurement { sample_id: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl EngineError {
    /// `true` for terminal states that need the operator to act (e.g. repeat a
    /// measurement), as opposed to malformed input or a broken template.
    pub fn requires_operator_followup(&self) -> bool {
        matches!(self, EngineError::ThresholdNotMet { .. })
    }
}
