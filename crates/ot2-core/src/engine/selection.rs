use super::config::SelectionConfig;
use super::error::EngineError;
use crate::core::models::measurement::{MeasurementSet, MeasurementSource};
use crate::core::models::sample::Sample;
use crate::core::models::selection::{SelectionResult, SelectionStatus};
use tracing::{debug, warn};

/// Validates the dilution the operator designated for `sample` and derives the
/// transfer that delivers the target mass.
///
/// The calculator never chooses among dilutions. `selected_factor` must be a
/// step of the sample's ladder and must have a manually entered concentration
/// in `measurements`. A concentration below the configured minimum yields
/// [`SelectionStatus::NoDilutionMet`] rather than an error; malformed input
/// (unknown factor, missing or non-manual measurement) is an error.
pub fn select(
    sample: &Sample,
    measurements: &MeasurementSet,
    selected_factor: f64,
    config: &SelectionConfig,
) -> Result<SelectionResult, EngineError> {
    let sample_id = sample.id();

    if sample.ladder_step(selected_factor).is_none() {
        return Err(EngineError::UnknownDilution {
            sample_id: sample_id.to_string(),
            factor: selected_factor,
        });
    }

    let measurement =
        measurements
            .get(selected_factor)
            .ok_or_else(|| EngineError::MissingMeasurement {
                sample_id: sample_id.to_string(),
                factor: selected_factor,
            })?;

    if measurement.source != MeasurementSource::ManualEntry {
        return Err(EngineError::InvalidMeasurement {
            sample_id: sample_id.to_string(),
            reason: format!(
                "concentration for dilution {}x must be entered manually",
                selected_factor
            ),
        });
    }

    let concentration = measurement.concentration_ng_per_ul;
    if !(concentration.is_finite() && concentration >= 0.0) {
        return Err(EngineError::InvalidMeasurement {
            sample_id: sample_id.to_string(),
            reason: format!("concentration must be zero or greater, got {}", concentration),
        });
    }

    let status = if concentration < config.min_concentration_ng_per_ul {
        warn!(
            "Sample '{}': dilution {}x at {} ng/µL is below the minimum of {} ng/µL.",
            sample_id, selected_factor, concentration, config.min_concentration_ng_per_ul
        );
        SelectionStatus::NoDilutionMet
    } else {
        let achieved_mass_ng = concentration * config.transfer_volume_ul;
        let shortfall_ng =
            (achieved_mass_ng < config.target_mass_ng).then(|| config.target_mass_ng - achieved_mass_ng);
        if let Some(shortfall) = shortfall_ng {
            warn!(
                "Sample '{}': {} µL delivers {} ng, {} ng short of the {} ng target.",
                sample_id, config.transfer_volume_ul, achieved_mass_ng, shortfall, config.target_mass_ng
            );
        }
        SelectionStatus::Accepted {
            transfer_volume_ul: config.transfer_volume_ul,
            achieved_mass_ng,
            shortfall_ng,
        }
    };

    debug!(
        "Sample '{}': selected {}x at {} ng/µL -> {:?}",
        sample_id, selected_factor, concentration, status
    );

    Ok(SelectionResult {
        sample_id: sample_id.to_string(),
        selected_factor,
        concentration_ng_per_ul: concentration,
        min_concentration_ng_per_ul: config.min_concentration_ng_per_ul,
        target_mass_ng: config.target_mass_ng,
        status,
    })
}

/// Turns a below-threshold result into [`EngineError::ThresholdNotMet`] for
/// callers that cannot proceed without an accepted dilution.
pub fn require_accepted(result: &SelectionResult) -> Result<(), EngineError> {
    if result.is_accepted() {
        Ok(())
    } else {
        Err(EngineError::ThresholdNotMet {
            sample_id: result.sample_id.clone(),
            factor: result.selected_factor,
            concentration: result.concentration_ng_per_ul,
            minimum: result.min_concentration_ng_per_ul,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::measurement::Measurement;
    use crate::engine::planner::plan;

    fn sample() -> Sample {
        Sample::new("A", None).with_ladder(plan("A", 100.0, &[1.0, 2.0, 4.0, 8.0]).unwrap())
    }

    fn measurements() -> MeasurementSet {
        MeasurementSet::from([(1.0, 50.0), (2.0, 90.0), (4.0, 120.0), (8.0, 200.0)])
    }

    #[test]
    fn qualifying_dilution_is_accepted_with_fixed_transfer() {
        let result = select(&sample(), &measurements(), 4.0, &SelectionConfig::default()).unwrap();

        assert_eq!(result.winning_factor(), Some(4.0));
        assert_eq!(result.concentration_ng_per_ul, 120.0);
        assert_eq!(result.transfer_volume_ul(), Some(10.0));
        assert_eq!(result.achieved_mass_ng(), Some(1200.0));
        assert_eq!(result.shortfall_ng(), None);
        assert_eq!(result.status_label(), "accepted");
        assert!(require_accepted(&result).is_ok());
    }

    #[test]
    fn below_threshold_reports_no_dilution_met_without_transfer() {
        let result = select(&sample(), &measurements(), 2.0, &SelectionConfig::default()).unwrap();

        assert_eq!(result.status, SelectionStatus::NoDilutionMet);
        assert_eq!(result.winning_factor(), None);
        assert_eq!(result.transfer_volume_ul(), None);
        assert_eq!(result.achieved_mass_ng(), None);

        let err = require_accepted(&result).unwrap_err();
        assert!(err.requires_operator_followup());
    }

    #[test]
    fn concentration_exactly_at_threshold_is_accepted() {
        let measurements = MeasurementSet::from([(2.0, 100.0)]);
        let result = select(&sample(), &measurements, 2.0, &SelectionConfig::default()).unwrap();
        assert!(result.is_accepted());
        assert_eq!(result.achieved_mass_ng(), Some(1000.0));
        assert_eq!(result.shortfall_ng(), None);
    }

    #[test]
    fn mass_below_target_is_flagged_but_volume_is_not_rescaled() {
        let config = SelectionConfig {
            min_concentration_ng_per_ul: 50.0,
            ..SelectionConfig::default()
        };
        let result = select(&sample(), &measurements(), 2.0, &config).unwrap();

        assert_eq!(result.transfer_volume_ul(), Some(10.0));
        assert_eq!(result.achieved_mass_ng(), Some(900.0));
        assert_eq!(result.shortfall_ng(), Some(100.0));
        assert_eq!(result.status_label(), "accepted-under-target");
    }

    #[test]
    fn factor_outside_ladder_is_rejected() {
        let err = select(&sample(), &measurements(), 3.0, &SelectionConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownDilution { factor, .. } if factor == 3.0));
        assert!(!err.requires_operator_followup());
    }

    #[test]
    fn unmeasured_factor_is_rejected() {
        let measurements = MeasurementSet::from([(1.0, 50.0)]);
        let err = select(&sample(), &measurements, 8.0, &SelectionConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::MissingMeasurement { .. }));
    }

    #[test]
    fn externally_sourced_concentration_is_rejected() {
        let measurements: MeasurementSet = [Measurement {
            dilution_factor: 4.0,
            concentration_ng_per_ul: 120.0,
            source: MeasurementSource::ExternalLookup,
        }]
        .into_iter()
        .collect();
        let err = select(&sample(), &measurements, 4.0, &SelectionConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidMeasurement { .. }));
    }

    #[test]
    fn negative_concentration_is_rejected() {
        let measurements = MeasurementSet::from([(4.0, -1.0)]);
        let err = select(&sample(), &measurements, 4.0, &SelectionConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidMeasurement { .. }));
    }

    #[test]
    fn repeated_selection_is_identical() {
        let a = select(&sample(), &measurements(), 8.0, &SelectionConfig::default()).unwrap();
        let b = select(&sample(), &measurements(), 8.0, &SelectionConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
