//! Append-only log of search queries.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::config::QueryLogConfig;

/// Writes one line per search: `<iso-time> <user_id> <username> # <text>`.
#[derive(Debug, Clone)]
pub struct QueryLog {
    path: PathBuf,
}

impl QueryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build from config, `None` when the log is disabled.
    pub fn from_config(config: &QueryLogConfig) -> Option<Self> {
        config.enabled.then(|| Self::new(&config.path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a query line. Failures are logged and otherwise ignored.
    pub async fn append(&self, user_id: i64, username: Option<&str>, text: &str) {
        let line = format_line(Utc::now(), user_id, username, text);
        if let Err(e) = self.write_line(&line).await {
            warn!(path = %self.path.display(), error = %e, "Failed to write query log");
        }
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

fn format_line(at: DateTime<Utc>, user_id: i64, username: Option<&str>, text: &str) -> String {
    // keep one query per line
    let text = text.replace(['\n', '\r'], " ");
    format!(
        "{} {} {} # {}\n",
        at.format("%Y-%m-%dT%H:%M:%S"),
        user_id,
        username.unwrap_or("None"),
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(
            format_line(at, 42, Some("alice"), "ubuntu\n24.04"),
            "2024-05-01T12:30:00 42 alice # ubuntu 24.04\n"
        );
        assert_eq!(format_line(at, 7, None, "q"), "2024-05-01T12:30:00 7 None # q\n");
    }

    #[tokio::test]
    async fn test_append_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let log = QueryLog::new(dir.path().join("logs").join("query_log.txt"));

        log.append(1, Some("bob"), "first").await;
        log.append(2, None, "second").await;

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" 1 bob # first"));
        assert!(lines[1].ends_with(" 2 None # second"));
    }

    #[test]
    fn test_disabled_config() {
        let config = QueryLogConfig {
            enabled: false,
            path: PathBuf::from("logs/query_log.txt"),
        };
        assert!(QueryLog::from_config(&config).is_none());
    }
}
