use super::selection::SelectionResult;
use serde::Serialize;

/// Where the material for a ladder step is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepSource {
    /// Prepared directly from the undiluted stock.
    Stock,
    /// Prepared from the previous step of the same ladder.
    PreviousStep,
}

impl StepSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepSource::Stock => "stock",
            StepSource::PreviousStep => "previous-step",
        }
    }
}

/// A single dilution prepared for a sample.
///
/// Volumes share one unit (µL) across a run. `dilution_factor` is always the
/// fold relative to the original stock, independent of how the step is
/// physically prepared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LadderStep {
    pub dilution_factor: f64,
    pub sample_volume_ul: f64,
    pub diluent_volume_ul: f64,
    pub source: StepSource,
}

impl LadderStep {
    pub fn total_volume_ul(&self) -> f64 {
        self.sample_volume_ul + self.diluent_volume_ul
    }
}

/// A sample moving through the dilution workflow.
///
/// The identifier is fixed at construction. The ladder and the selection are
/// attached as the workflow computes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    id: String,
    sequence: Option<String>,
    ladder: Vec<LadderStep>,
    selection: Option<SelectionResult>,
}

impl Sample {
    pub fn new(id: impl Into<String>, sequence: Option<String>) -> Self {
        let sequence = sequence.filter(|s| !s.trim().is_empty());
        Self {
            id: id.into(),
            sequence,
            ladder: Vec::new(),
            selection: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The manually supplied sequence, if any. Empty input is stored as `None`.
    pub fn sequence(&self) -> Option<&str> {
        self.sequence.as_deref()
    }

    pub fn ladder(&self) -> &[LadderStep] {
        &self.ladder
    }

    pub fn selection(&self) -> Option<&SelectionResult> {
        self.selection.as_ref()
    }

    pub fn with_ladder(mut self, ladder: Vec<LadderStep>) -> Self {
        self.ladder = ladder;
        self
    }

    pub fn attach_selection(&mut self, selection: SelectionResult) {
        self.selection = Some(selection);
    }

    pub fn ladder_step(&self, dilution_factor: f64) -> Option<&LadderStep> {
        self.ladder
            .iter()
            .find(|step| factors_match(step.dilution_factor, dilution_factor))
    }

    pub fn dilution_factors(&self) -> Vec<f64> {
        self.ladder.iter().map(|step| step.dilution_factor).collect()
    }
}

const FACTOR_TOLERANCE: f64 = 1e-9;

/// Compares two dilution factors that may have passed through text parsing.
pub fn factors_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= FACTOR_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}
