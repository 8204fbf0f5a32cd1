use super::sample::factors_match;
use serde::{Deserialize, Serialize};

/// Origin of a recorded value.
///
/// Concentrations are only ever accepted from manual entry. External lookups
/// may supply sequence data but are never authoritative for a concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementSource {
    #[default]
    ManualEntry,
    ExternalLookup,
}

/// A concentration read for one dilution of one sample, in ng/µL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub dilution_factor: f64,
    pub concentration_ng_per_ul: f64,
    #[serde(default)]
    pub source: MeasurementSource,
}

impl Measurement {
    pub fn manual(dilution_factor: f64, concentration_ng_per_ul: f64) -> Self {
        Self {
            dilution_factor,
            concentration_ng_per_ul,
            source: MeasurementSource::ManualEntry,
        }
    }
}

/// The measurements taken for a single sample, keyed by dilution factor.
///
/// Any subset of the ladder may be present. Recording a factor twice keeps
/// the most recent value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementSet {
    entries: Vec<Measurement>,
}

impl MeasurementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, measurement: Measurement) {
        match self
            .entries
            .iter_mut()
            .find(|m| factors_match(m.dilution_factor, measurement.dilution_factor))
        {
            Some(existing) => *existing = measurement,
            None => self.entries.push(measurement),
        }
    }

    pub fn get(&self, dilution_factor: f64) -> Option<&Measurement> {
        self.entries
            .iter()
            .find(|m| factors_match(m.dilution_factor, dilution_factor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.entries.iter()
    }
}

impl FromIterator<Measurement> for MeasurementSet {
    fn from_iter<I: IntoIterator<Item = Measurement>>(iter: I) -> Self {
        let mut set = Self::new();
        for measurement in iter {
            set.record(measurement);
        }
        set
    }
}

impl<const N: usize> From<[(f64, f64); N]> for MeasurementSet {
    fn from(pairs: [(f64, f64); N]) -> Self {
        pairs
            .into_iter()
            .map(|(factor, concentration)| Measurement::manual(factor, concentration))
            .collect()
    }
}
