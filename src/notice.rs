// User-visible notifications.
// The single channel through which sync outcomes and failures reach the user.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Receiver of user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Prints notices to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("{}", notice.message),
        }
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
