use serde::Serialize;

/// Outcome of validating an operator-designated dilution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SelectionStatus {
    /// The designated dilution meets the minimum concentration.
    ///
    /// `shortfall_ng` is set when the fixed transfer volume delivers less than
    /// the target mass. The transfer volume is never rescaled.
    Accepted {
        transfer_volume_ul: f64,
        achieved_mass_ng: f64,
        shortfall_ng: Option<f64>,
    },
    /// The designated dilution is below the minimum. No transfer is computed
    /// and the operator has to repeat the measurement or pick again.
    NoDilutionMet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    pub sample_id: String,
    pub selected_factor: f64,
    pub concentration_ng_per_ul: f64,
    pub min_concentration_ng_per_ul: f64,
    pub target_mass_ng: f64,
    #[serde(flatten)]
    pub status: SelectionStatus,
}

impl SelectionResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, SelectionStatus::Accepted { .. })
    }

    /// The winning dilution factor; absent when no dilution met the minimum.
    pub fn winning_factor(&self) -> Option<f64> {
        self.is_accepted().then_some(self.selected_factor)
    }

    pub fn transfer_volume_ul(&self) -> Option<f64> {
        match self.status {
            SelectionStatus::Accepted {
                transfer_volume_ul, ..
            } => Some(transfer_volume_ul),
            SelectionStatus::NoDilutionMet => None,
        }
    }

    pub fn achieved_mass_ng(&self) -> Option<f64> {
        match self.status {
            SelectionStatus::Accepted {
                achieved_mass_ng, ..
            } => Some(achieved_mass_ng),
            SelectionStatus::NoDilutionMet => None,
        }
    }

    pub fn shortfall_ng(&self) -> Option<f64> {
        match self.status {
            SelectionStatus::Accepted { shortfall_ng, .. } => shortfall_ng,
            SelectionStatus::NoDilutionMet => None,
        }
    }

    /// Short label used in reports and order payloads.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            SelectionStatus::Accepted {
                shortfall_ng: None, ..
            } => "accepted",
            SelectionStatus::Accepted {
                shortfall_ng: Some(_),
                ..
            } => "accepted-under-target",
            SelectionStatus::NoDilutionMet => "no-dilution-met",
        }
    }
}
