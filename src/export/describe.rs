use std::fmt::Write;

use super::job::{ExportJob, JobSource};
use crate::columns::ColumnFlags;

/// Text description of a job's resolved columns, printed by a dry run.
pub fn describe_job(job: &ExportJob) -> String {
    let mut out = String::new();
    match &job.source {
        JobSource::Table(table) => {
            let _ = writeln!(out, "Table: {}", table);
        }
        JobSource::Statement(_) => {
            let _ = writeln!(out, "SQL: {}", job.materialized_query);
        }
    }
    if job.batch_size > 0 {
        let _ = writeln!(out, "Batch size: {}", job.batch_size);
    }
    if let Some(column) = job.batch_column.and_then(|i| job.columns.get(i)) {
        let _ = writeln!(out, "Batch col: {}", column.name);
    }
    let _ = writeln!(out, "Columns:");

    for column in job
        .columns
        .iter()
        .filter(|c| c.is_from_source() || c.is_fixed())
    {
        let flags = column.flags;
        let _ = writeln!(out, "  Name: {}", column.name);
        if column.json_name != column.name {
            let _ = writeln!(out, "    JSON name: {}", column.json_name);
        }
        if column.is_fixed() {
            let _ = writeln!(out, "    Fixed value");
        }
        if column.is_from_source() {
            let _ = writeln!(out, "    Source column");
        }
        if column.is_skipped() {
            let _ = writeln!(out, "    Skipped");
        }
        let _ = writeln!(out, "    Flags: 0x{:08x}", flags.bits());

        let quoted = flags.contains(ColumnFlags::QUOTED) || !flags.contains(ColumnFlags::UNQUOTED);
        let kind = if flags.contains(ColumnFlags::BOOLEAN) {
            "Boolean"
        } else if flags.contains(ColumnFlags::NUMERIC) {
            if flags.contains(ColumnFlags::QUOTED) {
                "Numeric Quoted"
            } else {
                "Numeric Unquoted"
            }
        } else if quoted {
            "String Quoted"
        } else {
            "String Unquoted"
        };
        let _ = writeln!(out, "    Type: {}", kind);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{ColumnSet, ColumnDescriptor};
    use crate::export::Destination;

    #[test]
    fn test_describe_table_job() {
        let mut columns = ColumnSet::new();
        let id = columns.annotate(
            "id",
            ColumnFlags::FROM_SOURCE | ColumnFlags::INTEGER | ColumnFlags::BATCH,
        );
        columns.annotate("cust", ColumnFlags::FROM_SOURCE);
        columns.annotate("note", ColumnFlags::FROM_SOURCE | ColumnFlags::UNQUOTED);
        columns.annotate("placeholder", ColumnFlags::QUOTED);
        let src = columns.find_or_append("src");
        columns[src] = ColumnDescriptor::fixed("src", "erp");

        let mut job = ExportJob::for_table("orders", columns, Destination::Stdout);
        job.batch_column = Some(id);
        job.batch_size = 2;

        let text = describe_job(&job);
        assert!(text.starts_with("Table: orders\nBatch size: 2\nBatch col: id\nColumns:\n"));
        assert!(text.contains("  Name: id\n    Source column\n    Flags: 0x000002e0\n    Type: Numeric Unquoted\n"));
        assert!(text.contains("  Name: cust\n    Source column\n    Flags: 0x00000020\n    Type: String Quoted\n"));
        assert!(text.contains("Type: String Unquoted"));
        assert!(text.contains("  Name: src\n    Fixed value\n"));
        assert!(!text.contains("placeholder"));
    }
}
