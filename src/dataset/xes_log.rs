//! XES event logs.
//!
//! Only the attributes the analysis needs are read: the trace name becomes
//! the case id, and each event contributes its `concept:name` and
//! `time:timestamp`. Nested meta-attributes, globals and extensions are
//! skipped.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};

use crate::core::error::{EpmError, Result};
use crate::core::types::Event;
use crate::dataset::csv_log::parse_flexible_timestamp;
use crate::dataset::event_log::EventLog;

fn malformed(err: impl std::fmt::Display) -> EpmError {
    EpmError::LogFormat(format!("malformed XES: {err}"))
}

/// Attributes collected for one `<event>` element
#[derive(Default)]
struct PendingEvent {
    activity: Option<String>,
    timestamp: Option<String>,
    session: Option<u32>,
    exercise: Option<String>,
}

impl PendingEvent {
    fn set(&mut self, key: &str, value: String) {
        match key {
            "concept:name" => self.activity = Some(value),
            "time:timestamp" => self.timestamp = Some(value),
            "session" => self.session = value.trim().parse().ok(),
            "exercise" => self.exercise = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }

    /// Events without a name or a readable timestamp are dropped.
    fn finish(self, case_id: &str) -> Option<Event> {
        let timestamp = parse_flexible_timestamp(self.timestamp.as_deref()?)?;
        let mut event = Event::new(case_id, self.activity?, timestamp);
        event.session = self.session;
        event.exercise = self.exercise;
        Some(event)
    }
}

/// `key` and `value` of a typed XES attribute element
fn key_value(element: &BytesStart) -> Result<Option<(String, String)>> {
    let mut key = None;
    let mut value = None;
    for attr in element.attributes() {
        let attr = attr.map_err(malformed)?;
        match attr.key.local_name().as_ref() {
            b"key" => key = Some(attr.unescape_value().map_err(malformed)?.into_owned()),
            b"value" => value = Some(attr.unescape_value().map_err(malformed)?.into_owned()),
            _ => {}
        }
    }
    Ok(key.zip(value))
}

/// Parse XES text into an event log.
pub fn parse_xes_log(content: &str) -> Result<EventLog> {
    let mut reader = Reader::from_str(content.trim_start_matches('\u{feff}'));
    reader.config_mut().trim_text(true);

    let mut seen_root = false;
    let mut trace_index = 0usize;
    let mut in_trace = false;
    let mut trace_name: Option<String> = None;
    let mut trace_events: Vec<PendingEvent> = Vec::new();
    let mut current: Option<PendingEvent> = None;
    // Depth inside attribute elements opened with a start tag
    let mut nested = 0usize;
    let mut events = Vec::new();

    loop {
        let (element, is_empty) = match reader.read_event().map_err(malformed)? {
            XmlEvent::Start(e) => (e, false),
            XmlEvent::Empty(e) => (e, true),
            XmlEvent::End(e) => {
                match e.local_name().as_ref() {
                    b"log" => {}
                    b"event" => {
                        if let Some(pending) = current.take() {
                            trace_events.push(pending);
                        }
                    }
                    b"trace" => {
                        let case_id = trace_name
                            .take()
                            .unwrap_or_else(|| format!("trace_{trace_index}"));
                        events.extend(trace_events.drain(..).filter_map(|p| p.finish(&case_id)));
                        trace_index += 1;
                        in_trace = false;
                    }
                    _ => nested = nested.saturating_sub(1),
                }
                continue;
            }
            XmlEvent::Eof => break,
            _ => continue,
        };

        let name = element.local_name();
        if !seen_root {
            if name.as_ref() != b"log" {
                return Err(EpmError::LogFormat(
                    "not an XES log: root element is not <log>".to_string(),
                ));
            }
            seen_root = true;
            continue;
        }

        match name.as_ref() {
            b"trace" if nested == 0 && !is_empty => {
                in_trace = true;
                trace_name = None;
                trace_events.clear();
            }
            b"event" if nested == 0 && in_trace => {
                if is_empty {
                    trace_events.push(PendingEvent::default());
                } else {
                    current = Some(PendingEvent::default());
                }
            }
            _ => {
                if nested == 0 && in_trace {
                    if let Some((key, value)) = key_value(&element)? {
                        match current.as_mut() {
                            Some(event) => event.set(&key, value),
                            None if key == "concept:name" => trace_name = Some(value),
                            None => {}
                        }
                    }
                }
                if !is_empty {
                    nested += 1;
                }
            }
        }
    }

    if !seen_root {
        return Err(EpmError::LogFormat("empty XES log".to_string()));
    }
    Ok(EventLog::from_events(events))
}

/// Read an XES event log from disk.
pub fn load_xes_log(path: &Path) -> Result<EventLog> {
    let content = fs::read_to_string(path).map_err(|e| {
        EpmError::Dataset(format!("Could not read event log '{}': {e}", path.display()))
    })?;
    parse_xes_log(&content)
}
