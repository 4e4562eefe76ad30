//! CSV tables written next to the text reports.

use csv::{Terminator, WriterBuilder};

use crate::analysis::{CaseMetrics, ConformanceAnalysis};
use crate::core::error::{EpmError, Result};
use crate::dataset::describe_activity;
use crate::discovery::SessionActivityMatrix;

/// Serialize a header and rows as CSV text.
///
/// Fields are quoted only when they contain a separator, quote or line break.
pub fn write_csv<I>(header: &[&str], rows: I) -> Result<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| EpmError::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| EpmError::Io(std::io::Error::other(e)))
}

/// `activity,count,description`
pub fn activity_frequency_csv(frequency: &[(String, usize)]) -> Result<String> {
    write_csv(
        &["activity", "count", "description"],
        frequency.iter().map(|(activity, count)| {
            let description = describe_activity(activity).unwrap_or("");
            vec![activity.clone(), count.to_string(), description.to_string()]
        }),
    )
}

/// One row per session, one column per activity.
pub fn session_heatmap_csv(matrix: &SessionActivityMatrix) -> Result<String> {
    let mut header = vec!["session"];
    header.extend(matrix.activities.iter().map(String::as_str));

    write_csv(
        &header,
        matrix.rows.iter().map(|(session, counts)| {
            let mut fields = vec![format!("Session_{session}")];
            fields.extend(counts.iter().map(|c| c.to_string()));
            fields
        }),
    )
}

const CASE_METRICS_HEADER: [&str; 16] = [
    "case_id",
    "student_id",
    "session",
    "total_events",
    "total_duration_hours",
    "unique_activities",
    "activity_diversity",
    "total_clicks",
    "total_keystrokes",
    "total_mouse_movement",
    "total_idle_time_minutes",
    "deeds_time_ratio",
    "study_time_ratio",
    "texteditor_time_ratio",
    "start_time",
    "end_time",
];

pub fn case_metrics_csv(metrics: &[CaseMetrics]) -> Result<String> {
    write_csv(
        &CASE_METRICS_HEADER,
        metrics.iter().map(|m| {
            vec![
                m.case_id.clone(),
                m.student_id.clone().unwrap_or_default(),
                m.session.map(|s| s.to_string()).unwrap_or_default(),
                m.total_events.to_string(),
                format!("{:.4}", m.total_duration_hours),
                m.unique_activities.to_string(),
                format!("{:.4}", m.activity_diversity),
                format!("{}", m.total_clicks),
                format!("{}", m.total_keystrokes),
                format!("{}", m.total_mouse_movement),
                format!("{:.2}", m.total_idle_time_minutes),
                format!("{:.4}", m.deeds_time_ratio),
                format!("{:.4}", m.study_time_ratio),
                format!("{:.4}", m.texteditor_time_ratio),
                m.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                m.end_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        }),
    )
}

/// `case_id,sequence_score,behavioral_score,overall_score,conformance_ratio,exercise_order_correct`
pub fn conformance_scores_csv(conformance: &ConformanceAnalysis) -> Result<String> {
    write_csv(
        &[
            "case_id",
            "sequence_score",
            "behavioral_score",
            "overall_score",
            "conformance_ratio",
            "exercise_order_correct",
        ],
        conformance.cases.iter().map(|case| {
            vec![
                case.case_id.clone(),
                format!("{:.4}", case.sequence.score),
                format!("{:.4}", case.behavioral.score),
                format!("{:.4}", case.overall()),
                format!("{:.4}", case.sequence.conformance_ratio),
                case.sequence.exercise_order_correct.to_string(),
            ]
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::performance::compute_case_metrics;
    use crate::dataset::event_log::fixtures::log_from_traces;

    #[test]
    fn test_write_csv_quoting() -> Result<()> {
        let csv = write_csv(
            &["name", "note"],
            [
                vec!["plain".to_string(), "a,b".to_string()],
                vec!["say \"hi\"".to_string(), "two\nlines".to_string()],
            ],
        )?;
        assert_eq!(
            csv,
            "name,note\nplain,\"a,b\"\n\"say \"\"hi\"\"\",\"two\nlines\"\n"
        );
        Ok(())
    }

    #[test]
    fn test_activity_frequency_csv() -> Result<()> {
        let csv = activity_frequency_csv(&[
            ("Deeds_Es_1_1".to_string(), 12),
            ("Mystery".to_string(), 1),
        ])?;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "activity,count,description");
        assert_eq!(lines[1], "Deeds_Es_1_1,12,Working in DEEDS Simulator");
        assert_eq!(lines[2], "Mystery,1,");
        Ok(())
    }

    #[test]
    fn test_session_heatmap_csv() -> Result<()> {
        let matrix = SessionActivityMatrix {
            activities: vec!["A".to_string(), "B, C".to_string()],
            rows: vec![(1, vec![3, 0]), (2, vec![1, 4])],
        };
        let csv = session_heatmap_csv(&matrix)?;
        assert_eq!(
            csv,
            "session,A,\"B, C\"\nSession_1,3,0\nSession_2,1,4\n"
        );
        Ok(())
    }

    #[test]
    fn test_case_metrics_csv() -> Result<()> {
        let log = log_from_traces(&[("c1", &["A", "B"]), ("c2", &["A"])]);
        let csv = case_metrics_csv(&compute_case_metrics(&log))?;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("case_id,student_id,session,total_events"));
        assert!(lines[1].starts_with("c1,"));
        assert_eq!(lines[1].split(',').count(), CASE_METRICS_HEADER.len());
        Ok(())
    }

    #[test]
    fn test_conformance_scores_csv() -> Result<()> {
        let log = log_from_traces(&[("c1", &["Study_Es_1_1", "Deeds_Es_1_1"])]);
        let csv = conformance_scores_csv(&ConformanceAnalysis::run(&log))?;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("c1,"));
        assert!(lines[1].ends_with(",true"));
        Ok(())
    }
}
