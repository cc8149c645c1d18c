//! Output formatting for the console front-end.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::Format;
use crate::docs::DocIndex;
use crate::parser::SystemConfigSnapshot;
use crate::state::IngestSummary;
use crate::store::OwnedPage;

const LABEL_WIDTH: usize = 22;

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)
}

pub fn write_summary<W: Write>(writer: &mut W, format: Format, summary: &IngestSummary) -> io::Result<()> {
    if format == Format::Json {
        return write_json(writer, summary);
    }
    writeln!(writer, "{}", summary.path.display())?;
    writeln!(
        writer,
        "  {} activities, {} errors, {} lines skipped",
        summary.records, summary.errors, summary.metrics.lines_skipped
    )?;
    if summary.metrics.masked_records > 0 {
        writeln!(writer, "  {} output results masked", summary.metrics.masked_records)?;
    }
    if let Some((first, last)) = summary.time_span {
        writeln!(writer, "  {} .. {}", first.format("%Y-%m-%d %H:%M:%S"), last.format("%Y-%m-%d %H:%M:%S"))?;
    }
    if !summary.activities.is_empty() {
        writeln!(writer, "  Activities: {}", summary.activities.join(", "))?;
    }
    writeln!(writer)
}

pub fn write_system_config<W: Write>(
    writer: &mut W,
    format: Format,
    snapshot: &SystemConfigSnapshot,
) -> io::Result<()> {
    if format == Format::Json {
        let map: serde_json::Map<String, serde_json::Value> = snapshot
            .iter()
            .map(|(label, value)| (label.to_string(), value.into()))
            .collect();
        return write_json(writer, &map);
    }

    writeln!(writer, "System Configuration")?;
    for (label, value) in snapshot.iter() {
        let mut lines = value.lines();
        let first = lines.next().unwrap_or_default();
        writeln!(writer, "{:>width$}: {}", label, first, width = LABEL_WIDTH)?;
        for rest in lines {
            writeln!(writer, "{:>width$}  {}", "", rest, width = LABEL_WIDTH)?;
        }
    }
    writeln!(writer)
}

/// One row per record. Error rows are flagged with `!`.
pub fn write_page<W: Write>(
    writer: &mut W,
    format: Format,
    page: &OwnedPage,
    docs: &DocIndex,
) -> io::Result<()> {
    if format == Format::Json {
        return write_json(writer, page);
    }

    writeln!(
        writer,
        "  {:<36}  {:<24}  {:<32}  {:<8}  {:<16}  {:<24}  Error",
        "ID", "Timestamp", "Activity", "Status", "Branch", "Output"
    )?;
    for stored in &page.records {
        let r = &stored.record;
        let flag = if r.is_error() { '!' } else { ' ' };
        writeln!(
            writer,
            "{} {:<36}  {:<24}  {:<32}  {:<8}  {:<16}  {:<24}  {}",
            flag,
            stored.id.to_string(),
            r.timestamp,
            r.activity_name,
            r.status,
            r.executed_branch,
            single_line(&r.output_result),
            single_line(&r.error_message)
        )?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{} records shown, {:.0}% of log paged{}",
        page.records.len(),
        page.progress,
        if page.has_more {
            format!(", next offset {}", page.next_offset)
        } else {
            String::new()
        }
    )?;
    match page.records.first() {
        Some(first) => {
            writeln!(writer, "Docs for {}: {}", first.record.activity_name, docs.lookup(&first.record))?;
        }
        None if !docs.is_empty() => {
            writeln!(writer, "No matching records")?;
            writeln!(writer, "Known activities: {}", docs.activity_names().join(", "))?;
        }
        None => writeln!(writer, "No matching records")?,
    }
    Ok(())
}

/// Full archived payload of one record, with its documentation link.
pub fn write_detail<W: Write>(
    writer: &mut W,
    format: Format,
    rendered: &str,
    doc_url: &str,
) -> io::Result<()> {
    match format {
        Format::Json => writeln!(writer, "{}", rendered),
        Format::Table => {
            write!(writer, "{}", rendered)?;
            writeln!(writer)?;
            writeln!(writer, "Documentation: {}", doc_url)
        }
    }
}

fn single_line(value: &str) -> String {
    value.replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ActivityOutcome, ActivityRecordBuilder, LineRecordParser};
    use crate::store::StoredRecord;

    fn page() -> OwnedPage {
        let line = r#"2024-01-01T00:00:00 {"activity_name":"Click","status":"error","error_message":"not\nfound"}"#;
        let ActivityOutcome::Record(record) = ActivityRecordBuilder.build(LineRecordParser::new().parse(line).unwrap()) else {
            panic!("expected record");
        };
        OwnedPage {
            offset: 0,
            next_offset: 1,
            records: vec![StoredRecord::new(record)],
            progress: 100.0,
            has_more: false,
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_table_page() {
        let docs = DocIndex::new("https://docs.example.com/default");
        let text = render(|w| write_page(w, Format::Table, &page(), &docs));

        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with('!'));
        assert!(row.contains("click"));
        assert!(row.ends_with("not found"));
        assert!(text.contains("1 records shown, 100% of log paged\n"));
        assert!(text.contains("https://docs.example.com/default"));
    }

    #[test]
    fn test_empty_page_suggests_documented_activities() {
        let docs = DocIndex::from_json(
            r#"{"activities":{"Click":"https://docs.example.com/click","Get Password":"https://docs.example.com/pw"}}"#,
            "https://docs.example.com/default",
        )
        .unwrap();
        let empty = OwnedPage {
            records: Vec::new(),
            ..page()
        };
        let text = render(|w| write_page(w, Format::Table, &empty, &docs));
        assert!(text.contains("No matching records\n"));
        assert!(text.contains("Known activities: click, get password\n"));

        let bare = render(|w| write_page(w, Format::Table, &empty, &DocIndex::new("https://docs.example.com/default")));
        assert!(!bare.contains("Known activities"));
    }

    #[test]
    fn test_summary_table() {
        let at = |s: &str| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .unwrap()
                .and_utc()
        };
        let summary = IngestSummary {
            path: "run.log".into(),
            records: 2,
            errors: 1,
            has_system_config: false,
            time_span: Some((at("2024-01-01T10:00:00"), at("2024-01-01T10:05:00"))),
            activities: vec!["click".into(), "open browser".into()],
            metrics: Default::default(),
        };
        let text = render(|w| write_summary(w, Format::Table, &summary));
        assert!(text.starts_with("run.log\n  2 activities, 1 errors, 0 lines skipped\n"));
        assert!(text.contains("  2024-01-01 10:00:00 .. 2024-01-01 10:05:00\n"));
        assert!(text.contains("  Activities: click, open browser\n"));
    }

    #[test]
    fn test_json_page() {
        let docs = DocIndex::new("https://docs.example.com/default");
        let text = render(|w| write_page(w, Format::Json, &page(), &docs));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["records"][0]["activity_name"], "click");
        assert_eq!(value["has_more"], false);
    }

    #[test]
    fn test_system_config_defaults() {
        let text = render(|w| write_system_config(w, Format::Table, &SystemConfigSnapshot::default()));
        assert!(text.starts_with("System Configuration\n"));
        assert!(text.contains("       Windows Version: N/A\n"));
        assert_eq!(text.matches("N/A").count(), 7);
    }
}
