use super::protocol::{Protocol, ProtocolInfo};
use crate::core::io::report::{ReportWriteError, to_csv_string};
use crate::core::io::request::{SampleInput, SangerParams};
use crate::core::io::templates::TemplateSource;
use crate::core::models::sample::{LadderStep, Sample};
use crate::core::models::selection::SelectionResult;
use crate::core::models::value::ParamValue;
use crate::engine::config::RunConfig;
use crate::engine::error::EngineError;
use crate::engine::parameters::{ParameterBlock, build};
use crate::engine::planner::plan_with_mode;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::report::{ReportRow, assemble, resolve_sequence};
use crate::engine::selection::{require_accepted, select};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

pub const NAME: &str = "sanger";
pub const ORDER_SERVICE: &str = "Sanger Sequencing";

pub const INFO: ProtocolInfo = ProtocolInfo {
    short_name: NAME,
    title: "Sanger Sequencing Prep",
    description: "Generate serial dilutions and NanoDrop prep for Sanger requests.",
};

/// Phase one: plans the dilution ladder for every requested sample, counting
/// each one on `reporter`.
pub fn plan_samples(
    params: &SangerParams,
    config: &RunConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<Sample>, EngineError> {
    reporter.report(Progress::TaskStart {
        total_steps: params.samples.len() as u64,
    });
    let mut planned = Vec::with_capacity(params.samples.len());
    for input in &params.samples {
        planned.push(plan_sample(input, params, config)?);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    Ok(planned)
}

fn plan_sample(
    input: &SampleInput,
    params: &SangerParams,
    config: &RunConfig,
) -> Result<Sample, EngineError> {
    let ladder = plan_with_mode(
        &input.id,
        params.base_volume_ul,
        &params.dilution_factors,
        config.dilution.preparation,
    )?;
    Ok(Sample::new(input.id.clone(), input.sequence.clone()).with_ladder(ladder))
}

/// Phase two: validates each operator-designated dilution and attaches the
/// result to its sample. Samples without a designation are left pending.
///
/// Returns the number of samples that received a selection.
pub fn apply_selections(
    samples: &mut [Sample],
    params: &SangerParams,
    config: &RunConfig,
) -> Result<usize, EngineError> {
    let mut selected = 0;
    for sample in samples.iter_mut() {
        let Some(selection) = params
            .samples
            .iter()
            .find(|input| input.id == sample.id())
            .and_then(|input| input.selection.as_ref())
        else {
            continue;
        };
        let result = select(
            sample,
            &selection.measurements,
            selection.selected_factor,
            &config.selection,
        )?;
        sample.attach_selection(result);
        selected += 1;
    }
    Ok(selected)
}

/// Sample ids whose sequence has to come from an external lookup.
pub fn missing_sequences(params: &SangerParams) -> Vec<String> {
    params
        .samples
        .iter()
        .filter(|s| s.sequence.as_deref().is_none_or(|seq| seq.trim().is_empty()))
        .map(|s| s.id.clone())
        .collect()
}

/// Resolves one sequence per sample: the manual value when present, the
/// fallback otherwise, and an empty string when neither exists.
pub fn build_sequence_map(
    sample_ids: &[String],
    manual: &BTreeMap<String, String>,
    fallback: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    sample_ids
        .iter()
        .map(|id| {
            let sequence = resolve_sequence(manual.get(id).map(String::as_str), fallback.get(id));
            (id.clone(), sequence.to_string())
        })
        .collect()
}

/// A Sanger run with its ladders planned and selections validated.
#[derive(Debug, Clone)]
pub struct SangerProtocol {
    params: SangerParams,
    config: RunConfig,
    samples: Vec<Sample>,
    fallback_sequences: BTreeMap<String, String>,
}

impl SangerProtocol {
    pub fn prepare(
        params: SangerParams,
        config: RunConfig,
        fallback_sequences: BTreeMap<String, String>,
        reporter: &ProgressReporter,
    ) -> Result<Self, EngineError> {
        let mut samples =
            reporter.phase("Planning", || plan_samples(&params, &config, reporter))?;
        info!(
            "Planned {} sample(s) across {} dilution(s).",
            samples.len(),
            params.dilution_factors.len()
        );

        let selected =
            reporter.phase("Selection", || apply_selections(&mut samples, &params, &config))?;
        info!("Validated {} operator selection(s).", selected);

        Ok(Self {
            params,
            config,
            samples,
            fallback_sequences,
        })
    }

    pub fn params(&self) -> &SangerParams {
        &self.params
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sequences(&self) -> BTreeMap<String, String> {
        build_sequence_map(
            &self.params.sample_ids(),
            &self.params.manual_sequences(),
            &self.fallback_sequences,
        )
    }

    pub fn report_rows(&self) -> Vec<ReportRow> {
        assemble(&self.samples, &self.fallback_sequences)
    }

    /// One [`EngineError::ThresholdNotMet`] per sample whose designated
    /// dilution fell below the minimum, in sample order.
    pub fn followups(&self) -> Vec<EngineError> {
        self.samples
            .iter()
            .filter_map(Sample::selection)
            .filter_map(|result| require_accepted(result).err())
            .collect()
    }
}

impl Protocol for SangerProtocol {
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
        let sequences = self.sequences();
        let samples = self
            .samples
            .iter()
            .map(|sample| sample_value(sample, sequences.get(sample.id())))
            .collect();
        let selection = &self.config.selection;

        build([
            ("num_samples", ParamValue::from(self.samples.len())),
            ("base_volume", ParamValue::from(self.params.base_volume_ul)),
            (
                "target_concentration",
                ParamValue::from(self.params.target_concentration_um),
            ),
            (
                "dilution_factors",
                ParamValue::from(self.params.dilution_factors.clone()),
            ),
            ("sample_ids", ParamValue::from(self.params.sample_ids())),
            ("samples", ParamValue::List(samples)),
            ("transfer_volume", ParamValue::from(selection.transfer_volume_ul)),
            ("target_mass", ParamValue::from(selection.target_mass_ng)),
            (
                "min_concentration",
                ParamValue::from(selection.min_concentration_ng_per_ul),
            ),
            (
                "preparation",
                ParamValue::from(self.config.dilution.preparation.as_str()),
            ),
        ])
    }
}

fn sample_value(sample: &Sample, sequence: Option<&String>) -> ParamValue {
    let mut entries = vec![
        ("id", ParamValue::from(sample.id())),
        (
            "sequence",
            ParamValue::from(sequence.cloned().unwrap_or_default()),
        ),
        (
            "ladder",
            ParamValue::List(sample.ladder().iter().map(step_value).collect()),
        ),
    ];
    if let Some(selection) = sample.selection() {
        entries.push(("selection", selection_value(selection)));
    }
    ParamValue::map(entries)
}

fn step_value(step: &LadderStep) -> ParamValue {
    ParamValue::map([
        ("factor", ParamValue::from(step.dilution_factor)),
        ("sample_volume", ParamValue::from(step.sample_volume_ul)),
        ("diluent_volume", ParamValue::from(step.diluent_volume_ul)),
        ("source", ParamValue::from(step.source.as_str())),
    ])
}

fn selection_value(selection: &SelectionResult) -> ParamValue {
    let mut entries = vec![
        ("factor", ParamValue::from(selection.selected_factor)),
        (
            "concentration",
            ParamValue::from(selection.concentration_ng_per_ul),
        ),
        ("status", ParamValue::from(selection.status_label())),
    ];
    if let Some(volume) = selection.transfer_volume_ul() {
        entries.push(("transfer_volume", ParamValue::from(volume)));
    }
    if let Some(mass) = selection.achieved_mass_ng() {
        entries.push(("achieved_mass", ParamValue::from(mass)));
    }
    if let Some(shortfall) = selection.shortfall_ng() {
        entries.push(("shortfall", ParamValue::from(shortfall)));
    }
    ParamValue::map(entries)
}

/// Everything a Sanger run produces.
#[derive(Debug, Clone)]
pub struct SangerOutcome {
    pub protocol: SangerProtocol,
    pub script: String,
    pub rows: Vec<ReportRow>,
}

impl SangerOutcome {
    pub fn report_csv(&self) -> Result<String, ReportWriteError> {
        to_csv_string(&self.rows)
    }

    pub fn order_payload(&self) -> Result<OrderPayload, ReportWriteError> {
        Ok(build_order_payload(
            self.protocol.params(),
            &self.rows,
            self.report_csv()?,
        ))
    }
}

/// Plans, selects, merges and reports a Sanger run.
///
/// A designated dilution below the minimum does not fail the run; it is
/// reported as `no-dilution-met` and listed by [`SangerProtocol::followups`].
#[instrument(skip_all, name = "sanger_workflow")]
pub fn run(
    params: SangerParams,
    config: RunConfig,
    templates: &dyn TemplateSource,
    fallback_sequences: BTreeMap<String, String>,
    reporter: &ProgressReporter,
) -> Result<SangerOutcome, EngineError> {
    let protocol = SangerProtocol::prepare(params, config, fallback_sequences, reporter)?;
    let script = reporter.phase("Merging", || protocol.generate(templates))?;
    let rows = reporter.phase("Reporting", || protocol.report_rows());

    let followups = protocol.followups();
    if !followups.is_empty() {
        warn!(
            "{} sample(s) need a repeated measurement or a different dilution.",
            followups.len()
        );
    }
    Ok(SangerOutcome {
        protocol,
        script,
        rows,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSample {
    pub name: String,
    pub dilution_factors: Vec<f64>,
    pub target_concentration: f64,
    pub pai_sequence: String,
    pub winning_dilution: Option<f64>,
    pub selected_concentration: Option<f64>,
    pub status: String,
}

/// The sequencing order sent to the order-submission service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPayload {
    pub service: String,
    pub samples: Vec<OrderSample>,
    pub instructions: String,
    pub pai_csv: String,
}

pub fn build_order_payload(params: &SangerParams, rows: &[ReportRow], pai_csv: String) -> OrderPayload {
    let samples = rows
        .iter()
        .map(|row| OrderSample {
            name: row.sample_id.clone(),
            dilution_factors: params.dilution_factors.clone(),
            target_concentration: params.target_concentration_um,
            pai_sequence: row.sequence.clone(),
            winning_dilution: row.winning_dilution,
            selected_concentration: row.selected_concentration_ng_per_ul,
            status: row.status.clone(),
        })
        .collect::<Vec<_>>();
    OrderPayload {
        service: ORDER_SERVICE.to_string(),
        instructions: format!(
            "{} samples prepared at {} µM",
            samples.len(),
            params.target_concentration_um
        ),
        samples,
        pai_csv,
    }
}

/// What happened to the order for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OrderStatus {
    Disabled,
    Submitted { response: serde_json::Value },
    Failed { error: String },
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Disabled => "disabled",
            OrderStatus::Submitted { .. } => "submitted",
            OrderStatus::Failed { .. } => "failed",
        }
    }
}
