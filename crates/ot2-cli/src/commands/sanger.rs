use super::{Context, write_script};
use crate::cli::SangerArgs;
use crate::config::{AppConfig, CliOverrides};
use crate::error::{CliError, Result};
use crate::integrations;
use crate::utils::progress::ProgressDisplay;
use ot2protocols::core::io::request::{SangerParams, SangerRequest};
use ot2protocols::core::io::templates::LayeredTemplates;
use ot2protocols::engine::progress::ProgressReporter;
use ot2protocols::engine::report::ReportRow;
use ot2protocols::workflows::sanger::{self, OrderStatus, SangerOutcome};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// The `--json` document.
#[derive(Debug, Serialize)]
pub struct RunDocument<'a> {
    pub protocol_string: &'a str,
    pub rows: &'a [ReportRow],
    pub pai_csv: &'a str,
    pub order: &'a OrderStatus,
}

pub async fn run(args: SangerArgs, ctx: &Context) -> Result<()> {
    let config = ctx.resolve_config(CliOverrides {
        run: Some(&args.run),
        templates_dir: None,
        benchling_api_key: args.benchling_api_key.as_deref(),
        genewiz_api_key: args.genewiz_api_key.as_deref(),
    })?;

    info!("Loading Sanger request from {:?}", &args.input);
    let params = SangerRequest::load(&args.input)?.validate()?;
    let fallback = lookup_missing_sequences(&params, &config).await;

    let templates = LayeredTemplates::new(config.templates_dir.clone());
    let display = if ctx.quiet {
        ProgressDisplay::hidden()
    } else {
        ProgressDisplay::new()
    };

    println!("Generating Sanger protocol for {} sample(s)...", params.num_samples());
    let outcome = tokio::task::block_in_place(|| {
        let reporter = ProgressReporter::with_callback(display.callback());
        sanger::run(params, config.run.clone(), &templates, fallback, &reporter)
    })?;

    let mut followups = outcome.protocol.followups();
    if args.require_all && !followups.is_empty() {
        return Err(followups.remove(0).into());
    }

    write_script(&args.output, &outcome.script)?;
    println!("✓ Protocol written to: {}", args.output.display());

    let order = outcome.order_payload()?;
    if let Some(path) = &args.report {
        std::fs::write(path, &order.pai_csv)?;
        println!("✓ Report written to: {}", path.display());
    }

    let status = match integrations::order_submitter(&config.genewiz) {
        Ok(submitter) => {
            integrations::submit_order(submitter.as_deref(), &order, config.genewiz.timeout).await
        }
        Err(status) => status,
    };

    if let Some(path) = &args.json {
        write_document(path, &outcome, &order.pai_csv, &status)?;
        println!("✓ Run document written to: {}", path.display());
    }

    print_summary(&outcome, &status);
    if !followups.is_empty() {
        println!("⚠ {} sample(s) need follow-up:", followups.len());
        for followup in &followups {
            println!("  - {}", followup);
        }
    }
    Ok(())
}

async fn lookup_missing_sequences(
    params: &SangerParams,
    config: &AppConfig,
) -> BTreeMap<String, String> {
    let missing = sanger::missing_sequences(params);
    if missing.is_empty() {
        return BTreeMap::new();
    }
    match integrations::sequence_lookup(&config.benchling) {
        Some(lookup) => {
            integrations::resolve_sequences(lookup.as_ref(), &missing, config.benchling.timeout)
                .await
        }
        None => {
            warn!(
                "{} sample(s) have no sequence and no lookup service is available.",
                missing.len()
            );
            BTreeMap::new()
        }
    }
}

fn write_document(
    path: &Path,
    outcome: &SangerOutcome,
    pai_csv: &str,
    order: &OrderStatus,
) -> Result<()> {
    let document = RunDocument {
        protocol_string: &outcome.script,
        rows: &outcome.rows,
        pai_csv,
        order,
    };
    let text = serde_json::to_string_pretty(&document).map_err(|e| CliError::Other(e.into()))?;
    std::fs::write(path, text)?;
    Ok(())
}

fn print_summary(outcome: &SangerOutcome, order: &OrderStatus) {
    for row in &outcome.rows {
        match row.winning_dilution {
            Some(factor) => println!("  {}: {}x ({})", row.sample_id, factor, row.status),
            None => println!("  {}: {}", row.sample_id, row.status),
        }
    }
    println!("Order: {}", order.label());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RunArgs;
    use std::path::PathBuf;

    const REQUEST: &str = r#"
num-samples = 2
base-volume = 100
target-concentration = 10
dilution-factors = "1,2,4,8"
sample-ids = "A,B"
sequences = "A:ATCG"
best-dilution = 4
best-concentration = 120.5
"#;

    fn args(dir: &Path, require_all: bool, min_concentration: f64) -> SangerArgs {
        let input = dir.join("request.toml");
        std::fs::write(&input, REQUEST).unwrap();
        SangerArgs {
            input,
            output: dir.join("sanger.ot2"),
            report: Some(dir.join("pai.csv")),
            json: Some(dir.join("run.json")),
            require_all,
            benchling_api_key: None,
            genewiz_api_key: None,
            run: RunArgs {
                min_concentration: Some(min_concentration),
                ..RunArgs::default()
            },
        }
    }

    fn context(dir: &Path) -> Context {
        let config_path = dir.join("config.toml");
        std::fs::write(&config_path, "").unwrap();
        Context {
            config_path: Some(config_path),
            templates_dir: None,
            quiet: true,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn full_run_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), false, 100.0);
        let output = args.output.clone();
        let json_path: PathBuf = args.json.clone().unwrap();

        run(args, &context(dir.path())).await.unwrap();

        let script = std::fs::read_to_string(output).unwrap();
        assert!(script.contains("\"sample_ids\""));

        let csv = std::fs::read_to_string(dir.path().join("pai.csv")).unwrap();
        assert!(csv.starts_with("Sample,Sequence"));
        assert!(csv.contains("A,ATCG,4,120.5,10,1205,accepted"));

        let document: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(document["order"]["status"], "disabled");
        assert_eq!(document["rows"].as_array().unwrap().len(), 2);
        assert_eq!(document["protocol_string"].as_str().unwrap(), script);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn require_all_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), true, 500.0);
        let output = args.output.clone();

        let err = run(args, &context(dir.path())).await.unwrap_err();
        assert!(matches!(err, CliError::Engine(ref e) if e.requires_operator_followup()));
        assert!(!output.exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn below_threshold_run_still_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), false, 500.0);

        run(args, &context(dir.path())).await.unwrap();

        let csv = std::fs::read_to_string(dir.path().join("pai.csv")).unwrap();
        assert!(csv.contains("no-dilution-met"));
    }
}
