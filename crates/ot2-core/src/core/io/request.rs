use crate::core::models::measurement::{Measurement, MeasurementSet};
use crate::core::models::sample::factors_match;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;
use thiserror::Error;

pub const MIN_SAMPLES: usize = 1;
pub const MAX_SAMPLES: usize = 12;
pub const MIN_BASE_VOLUME_UL: f64 = 10.0;
pub const MAX_BASE_VOLUME_UL: f64 = 200.0;
pub const MIN_FACTORS: usize = 4;
pub const MAX_FACTORS: usize = 8;
pub const MAX_SAMPLE_ID_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to read request: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid TOML request: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid JSON request: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl RequestError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        RequestError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A value that may be written either as a list or as comma-separated text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListOrText<T> {
    List(Vec<T>),
    Text(String),
}

/// Sequences given either as a `sample -> sequence` table or as
/// `Sample:Sequence` lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SequenceInput {
    Table(BTreeMap<String, String>),
    Lines(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MeasurementEntry {
    pub selected: f64,
    /// Keyed by dilution factor, written as text (`"4"` or `"4.0"`).
    #[serde(default)]
    pub concentrations: BTreeMap<String, f64>,
}

/// A Sanger preparation request as written by the operator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SangerRequest {
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    #[serde(default = "default_base_volume")]
    pub base_volume: f64,
    #[serde(default = "default_target_concentration")]
    pub target_concentration: f64,
    #[serde(default = "default_dilution_factors")]
    pub dilution_factors: ListOrText<f64>,
    #[serde(default)]
    pub sample_ids: Option<ListOrText<String>>,
    #[serde(default)]
    pub sequences: Option<SequenceInput>,
    #[serde(default)]
    pub best_dilution: Option<f64>,
    #[serde(default)]
    pub best_concentration: Option<f64>,
    #[serde(default)]
    pub measurements: BTreeMap<String, MeasurementEntry>,
}

fn default_num_samples() -> usize {
    4
}

fn default_base_volume() -> f64 {
    100.0
}

fn default_target_concentration() -> f64 {
    10.0
}

fn default_dilution_factors() -> ListOrText<f64> {
    ListOrText::Text("1,2,4,8".to_string())
}

/// The operator's dilution choice for one sample together with the
/// concentrations that back it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionInput {
    pub selected_factor: f64,
    pub measurements: MeasurementSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleInput {
    pub id: String,
    pub sequence: Option<String>,
    pub selection: Option<SelectionInput>,
}

/// A validated request.
#[derive(Debug, Clone, PartialEq)]
pub struct SangerParams {
    pub base_volume_ul: f64,
    pub target_concentration_um: f64,
    pub dilution_factors: Vec<f64>,
    pub samples: Vec<SampleInput>,
}

impl SangerParams {
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn sample_ids(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.id.clone()).collect()
    }

    pub fn manual_sequences(&self) -> BTreeMap<String, String> {
        self.samples
            .iter()
            .filter_map(|s| s.sequence.clone().map(|seq| (s.id.clone(), seq)))
            .collect()
    }
}

impl SangerRequest {
    pub fn from_toml_str(text: &str) -> Result<Self, RequestError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a request file. `.json` files are parsed as JSON, everything else
    /// as TOML.
    pub fn load(path: &Path) -> Result<Self, RequestError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    pub fn validate(self) -> Result<SangerParams, RequestError> {
        if !(MIN_SAMPLES..=MAX_SAMPLES).contains(&self.num_samples) {
            return Err(RequestError::invalid(
                "num-samples",
                format!("must be between {} and {}", MIN_SAMPLES, MAX_SAMPLES),
            ));
        }
        if !(MIN_BASE_VOLUME_UL..=MAX_BASE_VOLUME_UL).contains(&self.base_volume) {
            return Err(RequestError::invalid(
                "base-volume",
                format!(
                    "must be between {} and {} µL",
                    MIN_BASE_VOLUME_UL, MAX_BASE_VOLUME_UL
                ),
            ));
        }
        if !self.target_concentration.is_finite() || self.target_concentration < 0.0 {
            return Err(RequestError::invalid(
                "target-concentration",
                "must be zero or greater",
            ));
        }

        let dilution_factors = match self.dilution_factors {
            ListOrText::Text(text) => parse_factors(&text)?,
            ListOrText::List(values) => validate_factors(values)?,
        };
        let sample_ids = match self.sample_ids {
            None => default_sample_ids(self.num_samples),
            Some(ListOrText::Text(text)) => normalize_sample_ids(&text, self.num_samples)?,
            Some(ListOrText::List(ids)) => normalize_sample_id_list(ids, self.num_samples)?,
        };
        let sequences = match self.sequences {
            None => BTreeMap::new(),
            Some(SequenceInput::Lines(text)) => parse_sequences(&text),
            Some(SequenceInput::Table(table)) => table
                .into_iter()
                .map(|(id, seq)| (id.trim().to_string(), seq.trim().to_string()))
                .collect(),
        };

        let global = match (self.best_dilution, self.best_concentration) {
            (None, None) => None,
            (Some(factor), Some(concentration)) => {
                require_known_factor("best-dilution", factor, &dilution_factors)?;
                if !concentration.is_finite() || concentration < 0.0 {
                    return Err(RequestError::invalid(
                        "best-concentration",
                        "must be zero or greater",
                    ));
                }
                Some(SelectionInput {
                    selected_factor: factor,
                    measurements: MeasurementSet::from([(factor, concentration)]),
                })
            }
            (Some(_), None) => {
                return Err(RequestError::invalid(
                    "best-concentration",
                    "is required when best-dilution is given",
                ));
            }
            (None, Some(_)) => {
                return Err(RequestError::invalid(
                    "best-dilution",
                    "is required when best-concentration is given",
                ));
            }
        };

        let mut measurements = self.measurements;
        if let Some(unknown) = measurements.keys().find(|id| !sample_ids.contains(id)) {
            return Err(RequestError::invalid(
                "measurements",
                format!("'{}' is not one of the sample ids", unknown),
            ));
        }

        let mut samples = Vec::with_capacity(sample_ids.len());
        for id in sample_ids {
            let selection = match measurements.remove(&id) {
                Some(entry) => Some(selection_from_entry(entry, &dilution_factors)?),
                None => global.clone(),
            };
            let sequence = sequences.get(&id).filter(|s| !s.is_empty()).cloned();
            samples.push(SampleInput {
                id,
                sequence,
                selection,
            });
        }

        Ok(SangerParams {
            base_volume_ul: self.base_volume,
            target_concentration_um: self.target_concentration,
            dilution_factors,
            samples,
        })
    }
}

fn selection_from_entry(
    entry: MeasurementEntry,
    dilution_factors: &[f64],
) -> Result<SelectionInput, RequestError> {
    require_known_factor("measurements.selected", entry.selected, dilution_factors)?;
    let mut measurements = MeasurementSet::new();
    for (key, concentration) in entry.concentrations {
        let factor: f64 = key.trim().parse().map_err(|_| {
            RequestError::invalid(
                "measurements.concentrations",
                format!("Invalid dilution factor \"{}\"", key),
            )
        })?;
        measurements.record(Measurement::manual(factor, concentration));
    }
    Ok(SelectionInput {
        selected_factor: entry.selected,
        measurements,
    })
}

fn require_known_factor(
    field: &'static str,
    factor: f64,
    dilution_factors: &[f64],
) -> Result<(), RequestError> {
    if dilution_factors.iter().any(|&f| factors_match(f, factor)) {
        Ok(())
    } else {
        let options: Vec<String> = dilution_factors.iter().map(f64::to_string).collect();
        Err(RequestError::invalid(
            field,
            format!("{} must be one of {}", factor, options.join(", ")),
        ))
    }
}

/// Parses comma-separated dilution factors. Whitespace around each factor is
/// ignored.
pub fn parse_factors(text: &str) -> Result<Vec<f64>, RequestError> {
    let tokens: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    let mut values = Vec::with_capacity(tokens.len());
    for token in tokens {
        let value: f64 = token.parse().map_err(|_| {
            RequestError::invalid(
                "dilution-factors",
                format!("Invalid dilution factor \"{}\"", token),
            )
        })?;
        values.push(value);
    }
    validate_factors(values)
}

fn validate_factors(values: Vec<f64>) -> Result<Vec<f64>, RequestError> {
    if values.len() < MIN_FACTORS {
        return Err(RequestError::invalid(
            "dilution-factors",
            format!(
                "Provide at least {} dilution factors (e.g. 1,2,4,8)",
                MIN_FACTORS
            ),
        ));
    }
    if values.len() > MAX_FACTORS {
        return Err(RequestError::invalid(
            "dilution-factors",
            format!("At most {} dilution factors fit on one plate row", MAX_FACTORS),
        ));
    }
    if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return Err(RequestError::invalid(
            "dilution-factors",
            "Dilution factors must be positive",
        ));
    }
    Ok(values)
}

fn default_sample_ids(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Sample{}", i)).collect()
}

/// Splits comma-separated sample ids and fits them to `count`.
///
/// Blank input yields `Sample1..SampleN`. Long lists are truncated. Short
/// lists are padded with `SampleN` names, numbered from the first missing
/// position and skipping any name already in the list.
pub fn normalize_sample_ids(text: &str, count: usize) -> Result<Vec<String>, RequestError> {
    if text.trim().is_empty() {
        return Ok(default_sample_ids(count));
    }
    normalize_sample_id_list(text.split(',').map(str::to_string).collect(), count)
}

fn normalize_sample_id_list(ids: Vec<String>, count: usize) -> Result<Vec<String>, RequestError> {
    let mut normalized = Vec::with_capacity(count);
    for raw in ids {
        let id = raw.trim();
        if id.is_empty() {
            return Err(RequestError::invalid("sample-ids", "Sample ids cannot be empty"));
        }
        if id.chars().count() > MAX_SAMPLE_ID_LEN {
            return Err(RequestError::invalid(
                "sample-ids",
                format!(
                    "Sample id \"{}\" exceeds {} characters",
                    id, MAX_SAMPLE_ID_LEN
                ),
            ));
        }
        normalized.push(id.to_string());
    }

    normalized.truncate(count);

    let mut seen = HashSet::with_capacity(count);
    if let Some(dup) = normalized.iter().find(|id| !seen.insert(id.to_string())) {
        return Err(RequestError::invalid(
            "sample-ids",
            format!("Sample id \"{}\" is used more than once", dup),
        ));
    }

    let mut next = normalized.len() + 1;
    while normalized.len() < count {
        let candidate = format!("Sample{}", next);
        next += 1;
        if seen.insert(candidate.clone()) {
            normalized.push(candidate);
        }
    }
    Ok(normalized)
}

/// Parses `Sample:Sequence` lines. Each line is split on its first colon;
/// blank lines and lines without a colon are skipped.
pub fn parse_sequences(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(sample, sequence)| (sample.trim().to_string(), sequence.trim().to_string()))
        .filter(|(sample, _)| !sample.is_empty())
        .collect()
}
