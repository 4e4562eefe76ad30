//! Reader for the EPM directory layout.
//!
//! `<dataset>/Data/Processes/Session N/<student id>` files are header-less,
//! comma separated, with one activity per row.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::core::constants::dataset;
use crate::core::error::{EpmError, Result};
use crate::core::types::{Event, Interaction};
use crate::dataset::event_log::EventLog;
use crate::reporting::logging;

/// One row of a student log, as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub session: String,
    pub student_id: String,
    pub exercise: String,
    pub activity: String,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    /// `end_time - start_time` in seconds when both parse
    pub duration: Option<f64>,
    pub interaction: Interaction,
    pub case_id: String,
}

/// Parse a timestamp in the raw log format.
///
/// Day and month may be unpadded. Anything else yields `None`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), dataset::TIMESTAMP_FORMAT).ok()
}

fn parse_number(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(0.0)
}

/// Parse the content of one student file.
///
/// `case_id` uses the student id from the file name and the session column
/// of the first row. Rows with fewer than 13 fields are padded with blanks.
pub fn parse_student_log(content: &str, student_id: &str) -> Vec<RawRecord> {
    let rows: Vec<Vec<&str>> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(str::trim).collect())
        .collect();

    let first_session = rows
        .first()
        .and_then(|row| row.first())
        .copied()
        .unwrap_or_default();
    let case_id = format!("Student_{student_id}_Session_{first_session}");

    rows.iter()
        .map(|row| {
            let field = |i: usize| row.get(i).copied().unwrap_or_default();
            let start_time = parse_timestamp(field(4));
            let end_time = parse_timestamp(field(5));
            let duration = match (start_time, end_time) {
                (Some(start), Some(end)) => {
                    Some((end - start).num_milliseconds() as f64 / 1000.0)
                }
                _ => None,
            };

            RawRecord {
                session: field(0).to_string(),
                student_id: field(1).to_string(),
                exercise: field(2).to_string(),
                activity: field(3).to_string(),
                start_time,
                end_time,
                duration,
                interaction: Interaction {
                    idle_time: parse_number(field(6)),
                    mouse_wheel: parse_number(field(7)),
                    mouse_wheel_click: parse_number(field(8)),
                    mouse_click_left: parse_number(field(9)),
                    mouse_click_right: parse_number(field(10)),
                    mouse_movement: parse_number(field(11)),
                    keystroke: parse_number(field(12)),
                },
                case_id: case_id.clone(),
            }
        })
        .collect()
}

/// Directory holding the per-session folders of a dataset
pub fn processes_dir(dataset_path: &Path) -> PathBuf {
    dataset_path.join(dataset::PROCESSES_DIR)
}

/// Whether `path` looks like an EPM dataset root.
pub fn is_epm_dataset(path: &Path) -> bool {
    processes_dir(path).is_dir()
}

/// Load every student file of every session.
///
/// Missing session folders are skipped. Unreadable student files are
/// logged and skipped.
pub fn load_raw_records(dataset_path: &Path) -> Result<Vec<RawRecord>> {
    let processes = processes_dir(dataset_path);
    if !processes.is_dir() {
        return Err(EpmError::Dataset(format!(
            "'{}' is not an EPM dataset (missing {})",
            dataset_path.display(),
            dataset::PROCESSES_DIR
        )));
    }

    let mut records = Vec::new();
    let mut files_loaded = 0usize;

    for session in 1..=dataset::SESSION_COUNT {
        let session_dir = processes.join(format!("Session {session}"));
        if !session_dir.is_dir() {
            continue;
        }

        let mut student_files: Vec<(String, PathBuf)> = fs::read_dir(&session_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let is_student = !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit());
                is_student.then(|| (name, entry.path()))
            })
            .collect();
        student_files.sort();
        logging::log_session_scan(session, student_files.len());

        for (student_id, path) in student_files {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    let rows = parse_student_log(&content, &student_id);
                    if !rows.is_empty() {
                        files_loaded += 1;
                        records.extend(rows);
                    }
                }
                Err(e) => logging::log_unreadable_file(&path, &e),
            }
        }
    }

    logging::log_dataset_loaded(records.len(), files_loaded);
    Ok(records)
}

/// Convert raw rows into an event log, dropping rows without a start time.
pub fn build_event_log(records: Vec<RawRecord>) -> EventLog {
    let events = records
        .into_iter()
        .filter_map(|record| {
            let timestamp = record.start_time?;
            Some(Event {
                case_id: record.case_id,
                activity: record.activity,
                timestamp,
                end_time: record.end_time,
                duration: record.duration,
                session: record.session.trim().parse().ok(),
                student_id: Some(record.student_id),
                exercise: Some(record.exercise),
                interaction: record.interaction,
                event_index: 0,
            })
        })
        .collect();
    EventLog::from_events(events)
}

/// Load an EPM dataset directory straight into an event log.
pub fn load_epm_dataset(dataset_path: &Path) -> Result<EventLog> {
    let records = load_raw_records(dataset_path)?;
    if records.is_empty() {
        return Err(EpmError::Dataset(format!(
            "Failed to load dataset from '{}': no student logs found",
            dataset_path.display()
        )));
    }
    Ok(build_event_log(records))
}
