use super::Context;
use crate::cli::PlanArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use ot2protocols::core::io::request::SangerRequest;
use ot2protocols::core::models::sample::Sample;
use ot2protocols::engine::progress::ProgressReporter;
use ot2protocols::workflows::sanger;
use std::fmt::Write;
use tracing::info;

pub async fn run(args: PlanArgs, ctx: &Context) -> Result<()> {
    let config = ctx.resolve_config(CliOverrides {
        run: Some(&args.run),
        ..CliOverrides::default()
    })?;

    info!("Loading Sanger request from {:?}", &args.input);
    let params = SangerRequest::load(&args.input)?.validate()?;
    let samples = sanger::plan_samples(&params, &config.run, &ProgressReporter::new())?;

    print!("{}", render_ladders(&samples));
    println!(
        "Planned {} sample(s) with {} preparation.",
        samples.len(),
        config.run.dilution.preparation.as_str()
    );
    Ok(())
}

pub fn render_ladders(samples: &[Sample]) -> String {
    let mut out = String::new();
    for sample in samples {
        let _ = writeln!(out, "Sample {}", sample.id());
        let _ = writeln!(
            out,
            "  {:>8}  {:>12}  {:>13}  {}",
            "Factor", "Sample (µL)", "Diluent (µL)", "Source"
        );
        for step in sample.ladder() {
            let _ = writeln!(
                out,
                "  {:>7}x  {:>12.2}  {:>13.2}  {}",
                step.dilution_factor,
                step.sample_volume_ul,
                step.diluent_volume_ul,
                step.source.as_str()
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ot2protocols::core::models::sample::{LadderStep, StepSource};

    #[test]
    fn ladders_render_one_line_per_step() {
        let sample = Sample::new("A", None).with_ladder(vec![
            LadderStep {
                dilution_factor: 1.0,
                sample_volume_ul: 100.0,
                diluent_volume_ul: 0.0,
                source: StepSource::Stock,
            },
            LadderStep {
                dilution_factor: 2.0,
                sample_volume_ul: 100.0,
                diluent_volume_ul: 100.0,
                source: StepSource::Stock,
            },
        ]);
        let text = render_ladders(&[sample]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Sample A");
        assert!(lines[3].contains("2x"));
        assert!(lines[3].contains("100.00"));
        assert!(lines[3].ends_with("stock"));
    }
}
