use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LogKind,
    pub text: String,
}

impl LogLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: LogKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: LogKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == LogKind::Error
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LogKind::Info => f.write_str(&self.text),
            LogKind::Error => write!(f, "✗ ERROR: {}", self.text),
        }
    }
}

/// Runner → controller messages, delivered in FIFO order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Log(LogLine),
    Status(String),
    /// Terminal event; nothing follows it for the same batch.
    Done,
}

pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_DONE: &str = "done";
pub const STATUS_POST_PROCESSING: &str = "post-processing…";
