//! Real-time log streaming via Server-Sent Events (SSE).
//!
//! Conversion steps are published on a broadcast channel. `/api/logs?job=<id>`
//! streams the entries of one job to the client that started it; nobody
//! else sees them. Every entry is also emitted as a `tracing` event, tagged
//! with its job id.

use futures::stream::Stream;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Log level for frontend display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One line of the user-visible conversion log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, 0 for top-level steps
    #[serde(default)]
    pub indent: u8,
    /// Conversion the entry belongs to; server-wide entries have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            job: None,
        }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    pub fn for_job(mut self, job: Uuid) -> Self {
        self.job = Some(job.to_string());
        self
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Fans entries out to per-job subscribers and mirrors them to `tracing`.
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    pub fn log(&self, entry: LogEntry) {
        let job = entry.job.as_deref().unwrap_or("-");
        match entry.level {
            LogLevel::Info => tracing::info!(job, indent = entry.indent, "{}", entry.message),
            LogLevel::Success => tracing::info!(job, indent = entry.indent, done = true, "{}", entry.message),
            LogLevel::Warning => tracing::warn!(job, "{}", entry.message),
            LogLevel::Error => tracing::error!(job, "{}", entry.message),
        }

        // No subscribers is fine
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    /// Entries tagged with `job`, from now on. A lagging subscriber skips
    /// what it missed.
    pub fn job_stream(&self, job: Uuid) -> impl Stream<Item = LogEntry> + Send + 'static {
        let job = job.to_string();
        BroadcastStream::new(self.subscribe())
            .filter_map(move |received| received.ok().filter(|entry| entry.job.as_deref() == Some(job.as_str())))
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Log handle for one conversion; every entry carries the job id.
#[derive(Debug, Clone, Copy)]
pub struct JobLog {
    job: Uuid,
}

impl JobLog {
    pub fn new(job: Uuid) -> Self {
        Self { job }
    }

    fn emit(&self, level: LogLevel, indent: u8, msg: impl Into<String>) {
        LOG_BROADCASTER.log(LogEntry::new(level, msg).with_indent(indent).for_job(self.job));
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Info, 0, msg);
    }

    /// Indented line under the previous step
    pub fn detail(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Info, 1, msg);
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Success, 0, msg);
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Warning, 0, msg);
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Error, 0, msg);
    }
}

/// Install the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `camconv=info`.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("camconv=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[test]
    fn test_entry_serializes_for_sse() {
        let job = Uuid::new_v4();
        let entry = LogEntry::new(LogLevel::Warning, "Source coordinate type ignored")
            .with_indent(1)
            .for_job(job);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["indent"], 1);
        assert_eq!(json["job"], job.to_string());

        let server_wide = serde_json::to_value(LogEntry::new(LogLevel::Info, "up")).unwrap();
        assert!(server_wide.get("job").is_none());
    }

    #[test]
    fn test_subscribers_receive_entries() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();
        broadcaster.log(LogEntry::new(LogLevel::Success, "Read 2 rows"));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Success);
        assert_eq!(entry.message, "Read 2 rows");
    }

    #[tokio::test]
    async fn test_job_stream_only_sees_its_own_job() {
        let broadcaster = LogBroadcaster::new();
        let (mine, theirs) = (Uuid::new_v4(), Uuid::new_v4());
        let stream = broadcaster.job_stream(mine);

        broadcaster.log(LogEntry::new(LogLevel::Info, "New upload: secret_site_survey.csv").for_job(theirs));
        broadcaster.log(LogEntry::new(LogLevel::Info, "server-wide"));
        broadcaster.log(LogEntry::new(LogLevel::Success, "Read 2 rows").for_job(mine));
        broadcaster.log(LogEntry::new(LogLevel::Error, "Wrote 1 rows").for_job(theirs));
        drop(broadcaster);

        let seen: Vec<LogEntry> = stream.collect().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message, "Read 2 rows");
        assert_eq!(seen[0].job, Some(mine.to_string()));
    }
}
