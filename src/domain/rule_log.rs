// ==========================================
// P21 业务规则 - 规则日志
// ==========================================
// 职责: 规则执行期间的日志；add_and_persist 追加写入日志文件
// 说明: 持久化失败只告警，不影响规则结果
// ==========================================

use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
    pub persisted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RuleLog {
    entries: Vec<LogEntry>,
    persist_path: Option<PathBuf>,
}

impl RuleLog {
    /// 仅内存日志
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 带持久化文件的日志
    pub fn persistent<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            entries: Vec::new(),
            persist_path: Some(path.into()),
        }
    }

    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    pub fn add(&mut self, message: &str) {
        self.entries.push(LogEntry {
            at: Local::now(),
            message: message.to_string(),
            persisted: false,
        });
    }

    /// 记录并追加写入日志文件
    pub fn add_and_persist(&mut self, message: &str) {
        let at = Local::now();
        let persisted = match &self.persist_path {
            Some(path) => match append_line(path, &at, message) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "rule log persist failed");
                    false
                }
            },
            None => false,
        };

        self.entries.push(LogEntry {
            at,
            message: message.to_string(),
            persisted,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }
}

fn append_line(path: &Path, at: &DateTime<Local>, message: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{} {}", at.format("%Y-%m-%d %H:%M:%S"), message)
}
