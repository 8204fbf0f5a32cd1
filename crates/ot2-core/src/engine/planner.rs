use super::config::PreparationMode;
use super::error::EngineError;
use crate::core::models::sample::{LadderStep, StepSource};
use tracing::debug;

/// Computes the dilution ladder for one sample, preparing every step directly
/// from stock.
///
/// For a factor `f` the step mixes `initial_volume_ul` of stock with
/// `initial_volume_ul * (f - 1)` of diluent, so diluent grows with the factor
/// while the sample volume stays fixed.
pub fn plan(
    sample_id: &str,
    initial_volume_ul: f64,
    ladder_factors: &[f64],
) -> Result<Vec<LadderStep>, EngineError> {
    plan_with_mode(
        sample_id,
        initial_volume_ul,
        ladder_factors,
        PreparationMode::Independent,
    )
}

/// Computes the dilution ladder for one sample using the given preparation
/// mode.
///
/// In [`PreparationMode::Serial`] each step after the first is drawn from the
/// previous one, so its diluent is sized by the fold relative to that step.
/// The recorded `dilution_factor` is always relative to stock.
pub fn plan_with_mode(
    sample_id: &str,
    initial_volume_ul: f64,
    ladder_factors: &[f64],
    mode: PreparationMode,
) -> Result<Vec<LadderStep>, EngineError> {
    let invalid = |reason: String| EngineError::InvalidLadder {
        sample_id: sample_id.to_string(),
        reason,
    };

    if !(initial_volume_ul.is_finite() && initial_volume_ul > 0.0) {
        return Err(invalid(format!(
            "initial volume must be positive, got {}",
            initial_volume_ul
        )));
    }
    if ladder_factors.is_empty() {
        return Err(invalid("ladder has no dilution factors".to_string()));
    }
    for &factor in ladder_factors {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(invalid(format!(
                "dilution factors must be positive, got {}",
                factor
            )));
        }
        if factor < 1.0 {
            return Err(invalid(format!(
                "dilution factor {} is below 1x and would need negative diluent",
                factor
            )));
        }
    }
    if let Some(pair) = ladder_factors.windows(2).find(|w| w[1] <= w[0]) {
        return Err(invalid(format!(
            "dilution factors must be strictly increasing, but {} follows {}",
            pair[1], pair[0]
        )));
    }

    let steps: Vec<LadderStep> = ladder_factors
        .iter()
        .enumerate()
        .map(|(i, &factor)| {
            let (fold, source) = match (mode, i) {
                (PreparationMode::Serial, i) if i > 0 => {
                    (factor / ladder_factors[i - 1], StepSource::PreviousStep)
                }
                _ => (factor, StepSource::Stock),
            };
            LadderStep {
                dilution_factor: factor,
                sample_volume_ul: initial_volume_ul,
                diluent_volume_ul: initial_volume_ul * (fold - 1.0),
                source,
            }
        })
        .collect();

    debug!(
        "Planned {} ladder step(s) for sample '{}' ({:?} preparation).",
        steps.len(),
        sample_id,
        mode
    );
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ladder_keeps_sample_volume_and_scales_diluent() {
        let steps = plan("A", 100.0, &[1.0, 2.0, 4.0, 8.0]).unwrap();

        let factors: Vec<f64> = steps.iter().map(|s| s.dilution_factor).collect();
        let diluent: Vec<f64> = steps.iter().map(|s| s.diluent_volume_ul).collect();
        assert_eq!(factors, vec![1.0, 2.0, 4.0, 8.0]);
        assert_eq!(diluent, vec![0.0, 100.0, 300.0, 700.0]);
        assert!(steps.iter().all(|s| s.sample_volume_ul == 100.0));
        assert!(steps.iter().all(|s| s.source == StepSource::Stock));
    }

    #[test]
    fn diluent_increases_monotonically_for_any_increasing_ladder() {
        let ladders: [&[f64]; 4] = [
            &[1.0, 2.0, 4.0, 8.0],
            &[1.5, 2.5, 4.5, 8.5],
            &[1.0, 3.0, 9.0, 27.0, 81.0],
            &[2.0, 2.001],
        ];
        for ladder in ladders {
            let steps = plan("A", 37.5, ladder).unwrap();
            assert_eq!(steps.len(), ladder.len());
            for pair in steps.windows(2) {
                assert!(pair[1].dilution_factor > pair[0].dilution_factor);
                assert!(pair[1].diluent_volume_ul > pair[0].diluent_volume_ul);
            }
        }
    }

    #[test]
    fn serial_preparation_uses_relative_fold() {
        let steps =
            plan_with_mode("A", 50.0, &[1.0, 2.0, 4.0, 8.0], PreparationMode::Serial).unwrap();

        assert_eq!(steps[0].source, StepSource::Stock);
        assert_eq!(steps[0].diluent_volume_ul, 0.0);
        for step in &steps[1..] {
            assert_eq!(step.source, StepSource::PreviousStep);
            assert_eq!(step.diluent_volume_ul, 50.0);
        }
        assert_eq!(steps[3].dilution_factor, 8.0);
    }

    #[test]
    fn non_increasing_ladder_is_rejected() {
        let err = plan("A", 100.0, &[1.0, 4.0, 2.0, 8.0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidLadder { ref reason, .. } if reason.contains("strictly increasing")
        ));

        let err = plan("A", 100.0, &[1.0, 2.0, 2.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidLadder { .. }));
    }

    #[test]
    fn non_positive_factors_are_rejected() {
        for ladder in [[0.0, 2.0], [-1.0, 2.0], [f64::NAN, 2.0]] {
            let err = plan("A", 100.0, &ladder).unwrap_err();
            assert!(matches!(
                err,
                EngineError::InvalidLadder { ref reason, .. } if reason.contains("positive")
            ));
        }
    }

    #[test]
    fn factor_below_one_is_rejected() {
        let err = plan("A", 100.0, &[0.5, 1.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidLadder { .. }));
    }

    #[test]
    fn empty_ladder_and_bad_volume_are_rejected() {
        assert!(plan("A", 100.0, &[]).is_err());
        assert!(plan("A", 0.0, &[1.0, 2.0]).is_err());
        assert!(plan("A", -5.0, &[1.0, 2.0]).is_err());
    }
}
