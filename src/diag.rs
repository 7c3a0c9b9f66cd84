#![forbid(unsafe_code)]

use std::collections::VecDeque;

use crate::error::FsError;

const STATUS_CAPACITY: usize = 8;

/// Messages produced by the last command, shown under the panels and mirrored
/// to the log.
#[derive(Debug, Default)]
pub struct StatusLog {
    lines: VecDeque<String>,
}

impl StatusLog {
    pub fn error(&mut self, err: &FsError) {
        tracing::warn!(%err, "filesystem operation failed");
        self.push(format!("Error: {err}"));
    }

    pub fn notice(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::info!("{msg}");
        self.push(msg);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    #[cfg(test)]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    fn push(&mut self, line: String) {
        if self.lines.len() == STATUS_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn keeps_only_latest_lines() {
        let mut log = StatusLog::default();
        for i in 0..STATUS_CAPACITY + 3 {
            log.notice(format!("line {i}"));
        }
        assert_eq!(log.lines().count(), STATUS_CAPACITY);
        assert_eq!(log.lines().next(), Some("line 3"));
    }

    #[test]
    fn errors_are_prefixed() {
        let mut log = StatusLog::default();
        log.error(&FsError::CreateCollision { path: PathBuf::from("/tmp/a/b") });
        assert!(log.contains("Error: /tmp/a/b already exists"));
        log.clear();
        assert_eq!(log.lines().count(), 0);
    }
}
