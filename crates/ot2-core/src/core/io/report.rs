use crate::engine::report::ReportRow;
use std::io::Write;
use thiserror::Error;

pub const HEADER: [&str; 7] = [
    "Sample",
    "Sequence",
    "Best Dilution",
    "Selected Concentration (ng/µL)",
    "Final Volume (µL)",
    "Final Mass (ng)",
    "Status",
];

/// Placeholder written for values that do not exist yet or were rejected.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Error)]
pub enum ReportWriteError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Report is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Writes `rows` as CSV with a header line. Fields containing commas, quotes
/// or newlines are quoted.
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<(), ReportWriteError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.write_record([
            row.sample_id.clone(),
            row.sequence.clone(),
            format_optional(row.winning_dilution),
            format_optional(row.selected_concentration_ng_per_ul),
            format_optional(row.final_volume_ul),
            format_optional(row.final_mass_ng),
            row.status.clone(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string(rows: &[ReportRow]) -> Result<String, ReportWriteError> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, sequence: &str, accepted: bool) -> ReportRow {
        ReportRow {
            sample_id: id.to_string(),
            sequence: sequence.to_string(),
            winning_dilution: accepted.then_some(4.0),
            selected_concentration_ng_per_ul: Some(120.5),
            final_volume_ul: accepted.then_some(10.0),
            final_mass_ng: accepted.then_some(1205.0),
            status: if accepted { "accepted" } else { "no-dilution-met" }.to_string(),
        }
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let csv = to_csv_string(&[row("A", "ATCG", true), row("B", "GGCC", false)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Sample,Sequence,Best Dilution"));
        assert_eq!(lines[1], "A,ATCG,4,120.5,10,1205,accepted");
        assert_eq!(lines[2], "B,GGCC,N/A,120.5,N/A,N/A,no-dilution-met");
    }

    #[test]
    fn sequences_with_commas_are_quoted() {
        let csv = to_csv_string(&[row("A", "ATCG,GGCC", true)]).unwrap();
        assert!(csv.contains("A,\"ATCG,GGCC\",4"));
    }

    #[test]
    fn empty_report_is_just_the_header() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
