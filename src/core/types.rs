use chrono::NaiveDateTime;
use serde::Serialize;

use crate::core::constants::ports;

/// The two dashboard flavours started by the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DashboardVariant {
    /// Summary metrics only
    Minimal,
    /// Metrics plus bottlenecks, patterns, conformance, process map and upload
    Enhanced,
}

impl DashboardVariant {
    /// Launch order
    pub const ALL: [DashboardVariant; 2] = [DashboardVariant::Minimal, DashboardVariant::Enhanced];

    /// Fixed port of the variant
    pub fn port(self) -> u16 {
        match self {
            DashboardVariant::Minimal => ports::MINIMAL,
            DashboardVariant::Enhanced => ports::ENHANCED,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DashboardVariant::Minimal => "minimal",
            DashboardVariant::Enhanced => "enhanced",
        }
    }

    pub fn is_enhanced(self) -> bool {
        self == DashboardVariant::Enhanced
    }
}

impl std::fmt::Display for DashboardVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mouse and keyboard counters recorded for one logged activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Interaction {
    /// Idle time in milliseconds
    pub idle_time: f64,
    pub mouse_wheel: f64,
    pub mouse_wheel_click: f64,
    pub mouse_click_left: f64,
    pub mouse_click_right: f64,
    pub mouse_movement: f64,
    pub keystroke: f64,
}

impl Interaction {
    /// Left plus right mouse clicks
    pub fn clicks(&self) -> f64 {
        self.mouse_click_left + self.mouse_click_right
    }
}

/// One event of an event log.
///
/// Events are owned by an [`EventLog`](crate::dataset::EventLog), which keeps
/// them sorted by case and timestamp and assigns `event_index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Case identifier, `Student_<id>_Session_<n>` for EPM data
    pub case_id: String,
    /// Activity name (trimmed)
    pub activity: String,
    /// Start of the activity
    pub timestamp: NaiveDateTime,
    /// End of the activity, when known
    pub end_time: Option<NaiveDateTime>,
    /// Duration in seconds, when known
    pub duration: Option<f64>,
    pub session: Option<u32>,
    pub student_id: Option<String>,
    pub exercise: Option<String>,
    pub interaction: Interaction,
    /// 1-based position of the event inside its case
    pub event_index: usize,
}

impl Event {
    /// Create an event with only the mandatory attributes set.
    pub fn new(case_id: impl Into<String>, activity: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            case_id: case_id.into(),
            activity: activity.into(),
            timestamp,
            end_time: None,
            duration: None,
            session: None,
            student_id: None,
            exercise: None,
            interaction: Interaction::default(),
            event_index: 0,
        }
    }

    pub fn with_end_time(mut self, end_time: NaiveDateTime) -> Self {
        self.duration = Some((end_time - self.timestamp).num_milliseconds() as f64 / 1000.0);
        self.end_time = Some(end_time);
        self
    }

    pub fn with_session(mut self, session: u32) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_exercise(mut self, exercise: impl Into<String>) -> Self {
        self.exercise = Some(exercise.into());
        self
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interaction = interaction;
        self
    }

    /// Point in time at which the activity finished, falling back to its start.
    pub fn completed_at(&self) -> NaiveDateTime {
        self.end_time.unwrap_or(self.timestamp)
    }
}
