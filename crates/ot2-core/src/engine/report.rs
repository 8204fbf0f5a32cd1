use crate::core::models::sample::Sample;
use serde::Serialize;
use std::collections::BTreeMap;

/// Status shown for samples that have not been measured yet.
pub const PENDING_STATUS: &str = "pending";

/// One line of the per-sample summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub sample_id: String,
    pub sequence: String,
    pub winning_dilution: Option<f64>,
    pub selected_concentration_ng_per_ul: Option<f64>,
    pub final_volume_ul: Option<f64>,
    pub final_mass_ng: Option<f64>,
    pub status: String,
}

/// Builds one row per sample, in the order given.
///
/// The sequence is the sample's own manual value when it has one, otherwise
/// the entry in `fallback_sequences`, otherwise empty. Samples whose selection
/// was rejected keep their measured concentration but have no winning
/// dilution, volume or mass.
pub fn assemble(samples: &[Sample], fallback_sequences: &BTreeMap<String, String>) -> Vec<ReportRow> {
    samples
        .iter()
        .map(|sample| {
            let sequence = resolve_sequence(sample.sequence(), fallback_sequences.get(sample.id()))
                .to_string();
            match sample.selection() {
                Some(selection) => ReportRow {
                    sample_id: sample.id().to_string(),
                    sequence,
                    winning_dilution: selection.winning_factor(),
                    selected_concentration_ng_per_ul: Some(selection.concentration_ng_per_ul),
                    final_volume_ul: selection.transfer_volume_ul(),
                    final_mass_ng: selection.achieved_mass_ng(),
                    status: selection.status_label().to_string(),
                },
                None => ReportRow {
                    sample_id: sample.id().to_string(),
                    sequence,
                    winning_dilution: None,
                    selected_concentration_ng_per_ul: None,
                    final_volume_ul: None,
                    final_mass_ng: None,
                    status: PENDING_STATUS.to_string(),
                },
            }
        })
        .collect()
}

/// Manual value first, then the fallback, then empty.
pub fn resolve_sequence<'a>(manual: Option<&'a str>, fallback: Option<&'a String>) -> &'a str {
    manual
        .filter(|s| !s.trim().is_empty())
        .or(fallback.map(String::as_str).filter(|s| !s.trim().is_empty()))
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::measurement::MeasurementSet;
    use crate::engine::config::SelectionConfig;
    use crate::engine::planner::plan;
    use crate::engine::selection::select;

    fn planned(id: &str, sequence: Option<&str>) -> Sample {
        Sample::new(id, sequence.map(str::to_string))
            .with_ladder(plan(id, 100.0, &[1.0, 2.0, 4.0, 8.0]).unwrap())
    }

    fn selected(id: &str, sequence: Option<&str>, factor: f64) -> Sample {
        let mut sample = planned(id, sequence);
        let measurements = MeasurementSet::from([(2.0, 90.0), (4.0, 120.0)]);
        let result = select(&sample, &measurements, factor, &SelectionConfig::default()).unwrap();
        sample.attach_selection(result);
        sample
    }

    #[test]
    fn rows_follow_input_order_without_sorting() {
        let samples = vec![
            selected("C", Some("TTAA"), 4.0),
            selected("A", Some("ATCG"), 4.0),
            planned("B", None),
        ];
        let rows = assemble(&samples, &BTreeMap::new());
        let ids: Vec<&str> = rows.iter().map(|r| r.sample_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn accepted_sample_reports_volume_and_mass() {
        let rows = assemble(&[selected("A", Some("ATCG"), 4.0)], &BTreeMap::new());
        let row = &rows[0];
        assert_eq!(row.sequence, "ATCG");
        assert_eq!(row.winning_dilution, Some(4.0));
        assert_eq!(row.selected_concentration_ng_per_ul, Some(120.0));
        assert_eq!(row.final_volume_ul, Some(10.0));
        assert_eq!(row.final_mass_ng, Some(1200.0));
        assert_eq!(row.status, "accepted");
    }

    #[test]
    fn rejected_sample_has_no_winner_volume_or_mass() {
        let rows = assemble(&[selected("A", None, 2.0)], &BTreeMap::new());
        let row = &rows[0];
        assert_eq!(row.winning_dilution, None);
        assert_eq!(row.selected_concentration_ng_per_ul, Some(90.0));
        assert_eq!(row.final_volume_ul, None);
        assert_eq!(row.final_mass_ng, None);
        assert_eq!(row.status, "no-dilution-met");
    }

    #[test]
    fn unmeasured_sample_is_pending() {
        let rows = assemble(&[planned("A", None)], &BTreeMap::new());
        assert_eq!(rows[0].status, PENDING_STATUS);
        assert_eq!(rows[0].winning_dilution, None);
    }

    #[test]
    fn manual_sequence_wins_over_fallback_and_fallback_fills_gaps() {
        let fallback = BTreeMap::from([
            ("A".to_string(), "LOOKUP_A".to_string()),
            ("B".to_string(), "LOOKUP_B".to_string()),
        ]);
        let samples = vec![
            planned("A", Some("MANUAL")),
            planned("B", None),
            planned("C", None),
        ];
        let rows = assemble(&samples, &fallback);
        assert_eq!(rows[0].sequence, "MANUAL");
        assert_eq!(rows[1].sequence, "LOOKUP_B");
        assert_eq!(rows[2].sequence, "");
    }
}
