use std::time::{Duration, Instant};

use crate::pipeline::PositionQuery;

use super::timer::Timer;

/// Render nanoseconds as `m:ss` with the minutes right-aligned to two columns.
pub fn format_clock(ns: u64) -> String {
    let secs = ns / 1_000_000_000;
    format!("{:2}:{:02}", secs / 60, secs % 60)
}

/// A position sample accepted by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSample {
    pub position_ns: u64,
    /// The track's duration as first reported.
    pub duration_ns: u64,
    /// Set on the sample that made the duration known.
    pub duration_first_known: bool,
}

/// Repeating position query while playing. Samples with `ok == false` are
/// dropped so the view keeps its last values.
#[derive(Debug, Clone)]
pub struct PositionPoller {
    timer: Timer,
    duration_ns: Option<u64>,
    duration_label: Option<String>,
}

impl PositionPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: Timer::new(interval),
            duration_ns: None,
            duration_label: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.timer.start(now);
    }

    pub fn suspend(&mut self) {
        self.timer.stop();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn due(&mut self, now: Instant) -> bool {
        self.timer.fire_if_due(now)
    }

    /// New track: duration unknown again.
    pub fn reset_track(&mut self) {
        self.duration_ns = None;
        self.duration_label = None;
    }

    pub fn duration_label(&self) -> Option<&str> {
        self.duration_label.as_deref()
    }

    pub fn sample(&mut self, query: PositionQuery) -> Option<PollSample> {
        if !query.ok {
            return None;
        }

        let duration_first_known = self.duration_ns.is_none();
        let duration_ns = *self.duration_ns.get_or_insert(query.duration_ns);
        if duration_first_known {
            self.duration_label = Some(format_clock(duration_ns));
        }

        Some(PollSample {
            position_ns: query.position_ns,
            duration_ns,
            duration_first_known,
        })
    }
}
