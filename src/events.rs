//! Structured status events for the host process driving a scan.
//!
//! Events are written one JSON object per line, tagged by a `type` field:
//!
//! ```text
//! {"type":"progress","phase":"Scanning","current":1,"total":3,"msg":"Analysing: a.mp4"}
//! {"type":"match","file_a":"a.mp4","file_b":"b.mp4","score":100.0}
//! {"type":"done","message":"Completed. Moved 1 duplicates to 'Delete duplicate'."}
//! ```

use std::io::{self, Write};

use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Scanning,
    Comparing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// Informational progress through the scanning or comparing phase.
    Progress {
        phase: Phase,
        current: usize,
        total: usize,
        msg: String,
    },

    /// A duplicate was found and moved. file_a was kept, file_b is the name the
    /// duplicate now has inside the quarantine directory.
    Match { file_a: String, file_b: String, score: f64 },

    /// The run failed. Terminal.
    Error { message: String },

    /// The run finished. Terminal.
    Done { message: String },
}

impl Event {
    pub fn progress(phase: Phase, current: usize, total: usize, msg: impl Into<String>) -> Self {
        Self::Progress {
            phase,
            current,
            total,
            msg: msg.into(),
        }
    }

    /// A match event. The score is rounded to 2 decimal places.
    pub fn matched(keeper: impl Into<String>, victim: impl Into<String>, score: f64) -> Self {
        Self::Match {
            file_a: keeper.into(),
            file_b: victim.into(),
            score: (score * 100.0).round() / 100.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Done { .. })
    }
}

/// Receiver of the events produced during a run.
pub trait EventSink {
    fn emit(&mut self, event: &Event);
}

/// Writes each event as a single line of JSON, flushing after every line so that a host
/// process reading the pipe sees events as they happen.
#[derive(Debug)]
pub struct JsonLinesReporter<W: Write> {
    output: W,
}

impl JsonLinesReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> EventSink for JsonLinesReporter<W> {
    fn emit(&mut self, event: &Event) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize event {event:?}: {e}");
                return;
            }
        };

        if let Err(e) = writeln!(self.output, "{line}").and_then(|()| self.output.flush()) {
            warn!("Failed to write event: {e}");
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn matches(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| matches!(e, Event::Match { .. }))
    }

    pub fn terminal_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_terminal())
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod test {
    use serde_json::{json, Value};

    use super::*;

    fn lines_of(events: &[Event]) -> Vec<Value> {
        let mut reporter = JsonLinesReporter::new(Vec::new());
        for event in events {
            reporter.emit(event);
        }
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_one_line_per_event_with_type_tag() {
        let lines = lines_of(&[
            Event::progress(Phase::Scanning, 1, 3, "Analysing: a.mp4"),
            Event::matched("a.mp4", "b_1700000000.mp4", 93.33333),
            Event::Error {
                message: "Missing arguments".to_string(),
            },
            Event::Done {
                message: "Not enough videos to compare.".to_string(),
            },
        ]);

        assert_eq!(
            lines,
            vec![
                json!({"type": "progress", "phase": "Scanning", "current": 1, "total": 3, "msg": "Analysing: a.mp4"}),
                json!({"type": "match", "file_a": "a.mp4", "file_b": "b_1700000000.mp4", "score": 93.33}),
                json!({"type": "error", "message": "Missing arguments"}),
                json!({"type": "done", "message": "Not enough videos to compare."}),
            ]
        );
    }

    #[test]
    fn test_comparing_phase_name() {
        let lines = lines_of(&[Event::progress(Phase::Comparing, 2, 5, "Checking a.mp4...")]);
        assert_eq!(lines[0]["phase"], "Comparing");
    }

    #[test]
    fn test_non_ascii_names_are_written_verbatim() {
        let mut reporter = JsonLinesReporter::new(Vec::new());
        reporter.emit(&Event::matched("phim_gốc.mp4", "bản_sao.mp4", 100.0));
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.contains("phim_gốc.mp4"));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_terminal_events() {
        let mut log = EventLog::new();
        log.emit(&Event::progress(Phase::Scanning, 1, 1, ""));
        log.emit(&Event::matched("a", "b", 90.0));
        log.emit(&Event::Done {
            message: String::new(),
        });

        assert_eq!(log.events().len(), 3);
        assert_eq!(log.matches().count(), 1);
        assert_eq!(log.terminal_events().count(), 1);
    }
}
