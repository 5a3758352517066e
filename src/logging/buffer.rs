use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const BUFFER_CAP: usize = 500;
pub const ROTATE_KEEP: usize = 100;
pub const ROTATE_INTERVAL_HOURS: i64 = 24;
pub const ERROR_ALERT_THRESHOLD: u32 = 10;
pub const ALERT_SAMPLE: usize = 10;
pub const ALERT_COOLDOWN_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
struct BufferState {
    entries: VecDeque<LogEntry>,
    error_count: u32,
    last_alert: Option<DateTime<Utc>>,
    last_rotation: DateTime<Utc>,
}

/// Bounded in-process log buffer with a rate-limited error-alert policy.
/// Constructed once and handed to request handlers through `AppState`.
#[derive(Clone)]
pub struct LogBuffer {
    development: bool,
    state: Arc<Mutex<BufferState>>,
}

impl LogBuffer {
    pub fn new(development: bool) -> Self {
        Self {
            development,
            state: Arc::new(Mutex::new(BufferState {
                entries: VecDeque::new(),
                error_count: 0,
                last_alert: None,
                last_rotation: Utc::now(),
            })),
        }
    }

    /// Appends an entry, trimming to the most recent entries on overflow.
    /// Debug entries are dropped outside development.
    pub fn record(&self, level: LogLevel, message: impl Into<String>) {
        if level == LogLevel::Debug && !self.development {
            return;
        }
        let message = message.into();
        match level {
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Debug => tracing::debug!("{}", message),
        }

        let mut guard = self.state.lock().expect("log buffer mutex poisoned");
        guard.entries.push_back(LogEntry {
            level,
            message,
            timestamp: Utc::now(),
        });
        if guard.entries.len() > BUFFER_CAP {
            let keep_from = guard.entries.len() - ROTATE_KEEP;
            guard.entries.drain(..keep_from);
        }
        if level == LogLevel::Error {
            guard.error_count += 1;
        }
    }

    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        let guard = self.state.lock().expect("log buffer mutex poisoned");
        guard
            .entries
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Periodic upkeep, driven by the background loop in `main`: trims the
    /// buffer once per rotation interval, and when enough errors have
    /// accumulated (and the cooldown since the previous alert has passed)
    /// returns the most recent error entries for mailing. The error counter
    /// resets when an alert fires.
    pub fn maintain(&self, now: DateTime<Utc>) -> Option<Vec<LogEntry>> {
        let mut guard = self.state.lock().expect("log buffer mutex poisoned");

        if now - guard.last_rotation >= Duration::hours(ROTATE_INTERVAL_HOURS) {
            if guard.entries.len() > ROTATE_KEEP {
                let keep_from = guard.entries.len() - ROTATE_KEEP;
                guard.entries.drain(..keep_from);
            }
            guard.last_rotation = now;
        }

        if guard.error_count < ERROR_ALERT_THRESHOLD {
            return None;
        }
        let cooled_down = match guard.last_alert {
            Some(last) => now - last >= Duration::hours(ALERT_COOLDOWN_HOURS),
            None => true,
        };
        if !cooled_down {
            return None;
        }

        let errors: Vec<LogEntry> = guard
            .entries
            .iter()
            .rev()
            .filter(|e| e.level == LogLevel::Error)
            .take(ALERT_SAMPLE)
            .cloned()
            .collect();
        guard.error_count = 0;
        guard.last_alert = Some(now);
        Some(errors)
    }
}

pub fn summarize(errors: &[LogEntry]) -> String {
    let mut lines = vec![format!(
        "{} recent error(s) in the JustJoin backend:",
        errors.len()
    )];
    for entry in errors {
        lines.push(format!("[{}] {}", entry.timestamp.to_rfc3339(), entry.message));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_rotates_down_to_most_recent() {
        let buffer = LogBuffer::new(true);
        for i in 0..(BUFFER_CAP + 1) {
            buffer.record(LogLevel::Info, format!("entry {}", i));
        }
        let recent = buffer.recent(BUFFER_CAP);
        assert_eq!(recent.len(), ROTATE_KEEP);
        assert_eq!(recent[0].message, format!("entry {}", BUFFER_CAP));
    }

    #[test]
    fn debug_suppressed_outside_development() {
        let buffer = LogBuffer::new(false);
        buffer.record(LogLevel::Debug, "hidden");
        buffer.record(LogLevel::Info, "visible");
        let recent = buffer.recent(10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].message, "visible");
    }

    #[test]
    fn tenth_error_arms_an_alert_and_resets_counter() {
        let buffer = LogBuffer::new(true);
        for i in 0..ERROR_ALERT_THRESHOLD {
            buffer.record(LogLevel::Error, format!("boom {}", i));
        }
        let now = Utc::now();
        let alert = buffer.maintain(now).expect("alert armed");
        assert_eq!(alert.len(), ALERT_SAMPLE);
        assert_eq!(alert[0].message, "boom 9");

        assert!(buffer.maintain(now).is_none());
    }

    #[test]
    fn second_alert_within_cooldown_is_suppressed() {
        let buffer = LogBuffer::new(true);
        let first = Utc::now();
        for _ in 0..ERROR_ALERT_THRESHOLD {
            buffer.record(LogLevel::Error, "boom");
        }
        assert!(buffer.maintain(first).is_some());

        for _ in 0..ERROR_ALERT_THRESHOLD {
            buffer.record(LogLevel::Error, "boom again");
        }
        let soon = first + Duration::minutes(30);
        assert!(buffer.maintain(soon).is_none());

        let later = first + Duration::hours(1);
        assert!(buffer.maintain(later).is_some());
    }

    #[test]
    fn below_threshold_never_alerts() {
        let buffer = LogBuffer::new(true);
        for _ in 0..(ERROR_ALERT_THRESHOLD - 1) {
            buffer.record(LogLevel::Error, "boom");
        }
        assert!(buffer.maintain(Utc::now()).is_none());
    }
}
