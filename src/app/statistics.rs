//! End-of-run statistics.

use crate::config::StatsLevel;
use crate::export::ExportReport;

/// Statistics lines for `level`: one per table with `Full`, then a summary.
/// `Json` gives a single line holding the serialized report.
pub fn format_statistics(report: &ExportReport, level: StatsLevel) -> Vec<String> {
    let mut lines = Vec::new();
    match level {
        StatsLevel::None => return lines,
        StatsLevel::Json => {
            lines.push(
                serde_json::to_string(report)
                    .unwrap_or_else(|e| format!("{{\"error\":\"unserializable report: {}\"}}", e)),
            );
            return lines;
        }
        StatsLevel::Normal | StatsLevel::Full => {}
    }
    if level == StatsLevel::Full {
        for table in &report.tables {
            let status = match (&table.error, table.cancelled) {
                (Some(_), _) => format!(" (failed, code {})", table.error_code),
                (None, true) => " (cancelled)".to_string(),
                (None, false) => String::new(),
            };
            lines.push(format!(
                "Table: {}, Rows: {}, Batches: {} in {:.1} seconds{}",
                table.name, table.rows, table.batches, table.elapsed_seconds, status
            ));
        }
    }
    lines.push(format!(
        "Tables exported: {}, Rows: {}, Batches: {} in {:.1} seconds",
        report.tables_exported(),
        report.total_rows(),
        report.total_batches(),
        report.elapsed_seconds
    ));
    lines
}

/// Prints [`format_statistics`] to stderr, keeping stdout for `--file -`.
pub fn print_statistics(report: &ExportReport, level: StatsLevel) {
    for line in format_statistics(report, level) {
        eprintln!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::TableReport;

    fn report() -> ExportReport {
        ExportReport {
            tables: vec![
                TableReport {
                    name: "orders".into(),
                    rows: 5,
                    batches: 3,
                    elapsed_seconds: 0.25,
                    ..Default::default()
                },
                TableReport {
                    name: "broken".into(),
                    error_code: 4,
                    error: Some("SQL error".into()),
                    ..Default::default()
                },
            ],
            elapsed_seconds: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_statistics() {
        assert!(format_statistics(&report(), StatsLevel::None).is_empty());
    }

    #[test]
    fn test_summary_line() {
        let lines = format_statistics(&report(), StatsLevel::Normal);
        assert_eq!(
            lines,
            vec!["Tables exported: 1, Rows: 5, Batches: 3 in 1.0 seconds".to_string()]
        );
    }

    #[test]
    fn test_full_statistics() {
        let lines = format_statistics(&report(), StatsLevel::Full);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Table: orders, Rows: 5, Batches: 3 in 0.2 seconds");
        assert!(lines[1].ends_with("(failed, code 4)"));
    }

    #[test]
    fn test_json_statistics() {
        let lines = format_statistics(&report(), StatsLevel::Json);
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&lines[0]).expect("valid JSON");
        assert_eq!(value["tables"][0]["name"], "orders");
        assert_eq!(value["tables"][0]["rows"], 5);
        assert_eq!(value["tables"][1]["error_code"], 4);
        assert_eq!(value["interrupted"], false);
    }
}
