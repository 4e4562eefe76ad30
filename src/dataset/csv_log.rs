//! CSV event logs with a header row.
//!
//! Column names follow the XES attribute names or their common aliases, so
//! logs exported from other process-mining tools load unchanged.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::core::error::{EpmError, Result};
use crate::core::types::Event;
use crate::dataset::event_log::EventLog;
use crate::dataset::loader;

const CASE_COLUMNS: [&str; 4] = ["case:concept:name", "case_id", "student_id", "Case ID"];
const ACTIVITY_COLUMNS: [&str; 3] = ["concept:name", "activity", "Activity"];
const TIMESTAMP_COLUMNS: [&str; 4] = ["time:timestamp", "timestamp", "Timestamp", "time"];

/// Parse the timestamp formats accepted in uploaded logs.
pub fn parse_flexible_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_utc());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| loader::parse_timestamp(value))
}

fn find_column(header: &StringRecord, candidates: &[&str], role: &str) -> Result<usize> {
    header
        .iter()
        .position(|name| candidates.contains(&name))
        .ok_or_else(|| {
            EpmError::LogFormat(format!(
                "missing {role} column (expected one of: {})",
                candidates.join(", ")
            ))
        })
}

fn optional_column(header: &StringRecord, name: &str) -> Option<usize> {
    header.iter().position(|h| h == name)
}

fn malformed(err: csv::Error) -> EpmError {
    EpmError::LogFormat(format!("malformed CSV: {err}"))
}

/// Parse CSV text into an event log.
///
/// Quoted fields may contain separators and line breaks. Rows whose
/// timestamp does not parse are dropped.
pub fn parse_csv_log(content: &str) -> Result<EventLog> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let header = reader.headers().map_err(malformed)?.clone();
    if header.iter().all(str::is_empty) {
        return Err(EpmError::LogFormat("empty CSV log".to_string()));
    }

    let case_col = find_column(&header, &CASE_COLUMNS, "case")?;
    let activity_col = find_column(&header, &ACTIVITY_COLUMNS, "activity")?;
    let time_col = find_column(&header, &TIMESTAMP_COLUMNS, "timestamp")?;
    let session_col = optional_column(&header, "session");
    let exercise_col = optional_column(&header, "exercise");
    let duration_col = optional_column(&header, "duration");

    let mut events = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let get = |i: usize| record.get(i).unwrap_or_default();

        let Some(timestamp) = parse_flexible_timestamp(get(time_col)) else {
            continue;
        };
        let mut event = Event::new(get(case_col), get(activity_col), timestamp);
        event.session = session_col.and_then(|i| get(i).parse().ok());
        event.exercise = exercise_col
            .map(get)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        event.duration = duration_col.and_then(|i| get(i).parse().ok());
        events.push(event);
    }

    Ok(EventLog::from_events(events))
}

/// Read a CSV event log from disk.
pub fn load_csv_log(path: &Path) -> Result<EventLog> {
    let content = fs::read_to_string(path).map_err(|e| {
        EpmError::Dataset(format!("Could not read event log '{}': {e}", path.display()))
    })?;
    parse_csv_log(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_log_quoted_fields() -> Result<()> {
        let csv = "case_id,activity,timestamp\n\
                   s1,\"Study\nEs_1_1\",2024-10-03 10:00:00\n\
                   s1,\"Deeds, Es_1_1\",2024-10-03 10:05:00\n\
                   s2 ,\"say \"\"hi\"\"\",2024-10-03 11:00:00\n";
        let log = parse_csv_log(csv)?;
        let activities: Vec<&str> = log.events().iter().map(|e| e.activity.as_str()).collect();
        assert_eq!(activities, vec!["Study\nEs_1_1", "Deeds, Es_1_1", "say \"hi\""]);
        assert_eq!(log.events()[2].case_id, "s2");
        Ok(())
    }

    #[test]
    fn test_parse_csv_log_short_rows() -> Result<()> {
        let csv = "case_id,activity,timestamp,session\nc1,Deeds,2024-10-03 09:00:00\nc1,Study\n";
        let log = parse_csv_log(csv)?;
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].session, None);
        Ok(())
    }

    #[test]
    fn test_parse_flexible_timestamp_formats() {
        let expected = "2024-10-03 09:00:00";
        for value in [
            "2024-10-03T09:00:00+00:00",
            "2024-10-03 09:00:00",
            "2024-10-03T09:00:00",
            "3.10.2024 9:00:00",
        ] {
            let parsed = parse_flexible_timestamp(value).unwrap();
            assert_eq!(parsed.to_string(), expected, "format {value}");
        }
        assert!(parse_flexible_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_csv_log_xes_columns() -> Result<()> {
        let csv = "\
case:concept:name,concept:name,time:timestamp,session
c1,Study_Es_1_1,2024-10-03 09:00:00,2
c1,Deeds_Es_1_1,2024-10-03 09:05:00,2
c2,Aulaweb,2024-10-03 10:00:00,3
c2,Broken,not a time,3
";
        let log = parse_csv_log(csv)?;
        assert_eq!(log.len(), 3);
        assert_eq!(log.case_count(), 2);
        assert_eq!(log.events()[0].session, Some(2));
        Ok(())
    }

    #[test]
    fn test_parse_csv_log_alias_columns() -> Result<()> {
        let csv = "student_id,Activity,Timestamp,duration\ns1,Deeds,2024-10-03 09:00:00,42.5\n";
        let log = parse_csv_log(csv)?;
        assert_eq!(log.events()[0].case_id, "s1");
        assert_eq!(log.events()[0].duration, Some(42.5));
        Ok(())
    }

    #[test]
    fn test_parse_csv_log_missing_column() {
        let err = parse_csv_log("case_id,timestamp\nc1,2024-10-03 09:00:00\n").unwrap_err();
        match err {
            EpmError::LogFormat(msg) => assert!(msg.contains("activity")),
            other => panic!("Expected LogFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_csv_log_empty() {
        assert!(matches!(parse_csv_log(""), Err(EpmError::LogFormat(_))));
    }
}
