//! Boolean-gated diagnostic channel.
//!
//! When enabled, every orchestration step writes one timestamped line. Lines
//! are also mirrored as `tracing` debug events. The channel never influences
//! control flow.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Receives fully formatted debug lines.
pub type DebugSink = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Clone, Default)]
pub struct DebugChannel {
    enabled: bool,
    sink: Option<DebugSink>,
}

impl DebugChannel {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            sink: None,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Route lines to `sink` instead of stderr.
    pub fn with_sink(mut self, sink: DebugSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn emit(&self, message: impl AsRef<str>) {
        if self.enabled {
            self.write(message.as_ref());
        }
    }

    /// Like [`emit`](Self::emit), but builds the line only when enabled.
    pub fn emit_with(&self, message: impl FnOnce() -> String) {
        if self.enabled {
            self.write(&message());
        }
    }

    fn write(&self, message: &str) {
        tracing::debug!(target: "swarm::debug", "{message}");
        let now = Local::now();
        match &self.sink {
            Some(sink) => sink(&format_line(now, message)),
            None => eprintln!(
                "\x1b[97m[\x1b[90m{}\x1b[97m]\x1b[90m {message}\x1b[0m",
                now.format(TIMESTAMP_FORMAT)
            ),
        }
    }
}

impl fmt::Debug for DebugChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugChannel")
            .field("enabled", &self.enabled)
            .field("sink", &self.sink.as_ref().map(|_| ".."))
            .finish()
    }
}

fn format_line(at: DateTime<Local>, message: &str) -> String {
    format!("[{}] {message}", at.format(TIMESTAMP_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn capture() -> (DebugSink, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink_lines = lines.clone();
        let sink: DebugSink = Arc::new(move |line: &str| {
            sink_lines.lock().expect("lines lock").push(line.to_string());
        });
        (sink, lines)
    }

    #[test]
    fn disabled_channel_is_silent() {
        let (sink, lines) = capture();
        DebugChannel::new(false).with_sink(sink).emit("hello");
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn lazy_lines_are_built_only_when_enabled() {
        let built = Mutex::new(0);
        let build = || {
            *built.lock().unwrap() += 1;
            "expensive".to_string()
        };

        DebugChannel::disabled().emit_with(build);
        assert_eq!(*built.lock().unwrap(), 0);

        let (sink, lines) = capture();
        DebugChannel::new(true).with_sink(sink).emit_with(build);
        assert_eq!(*built.lock().unwrap(), 1);
        assert!(lines.lock().unwrap()[0].ends_with("] expensive"));
    }

    #[test]
    fn enabled_channel_timestamps_lines() {
        let (sink, lines) = capture();
        let channel = DebugChannel::new(true).with_sink(sink);
        channel.emit("Ending turn.");
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Ending turn."));
    }

    #[test]
    fn line_format_is_stable() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_line(at, "msg"), "[2024-03-09 07:05:01] msg");
    }
}
