//! User-visible notices for recoverable failures.
//!
//! Fetch failures never reach callers as errors. They are logged and handed to
//! a [`Notifier`], which the UI layer can drain to show a transient message.

use std::collections::VecDeque;
use std::sync::Mutex;

use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::cache::lock::mutex_lock;

const SOURCE: &str = "application::notice";
const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    /// Module that raised the notice.
    pub source: &'static str,
    pub message: String,
    pub raised_at: OffsetDateTime,
}

impl Notice {
    pub fn new(severity: Severity, source: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            source,
            message: message.into(),
            raised_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn warning(source: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, source, message)
    }
}

/// Sink for notices raised by the content layer.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => info!(source = notice.source, "{}", notice.message),
            Severity::Warning => warn!(source = notice.source, "{}", notice.message),
            Severity::Error => error!(source = notice.source, "{}", notice.message),
        }
    }
}

/// Bounded FIFO of notices waiting to be shown. The oldest notice is dropped
/// once the queue is full.
pub struct NoticeQueue {
    queue: Mutex<VecDeque<Notice>>,
    capacity: usize,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Take every pending notice in FIFO order.
    pub fn drain(&self) -> Vec<Notice> {
        mutex_lock(&self.queue, SOURCE, "drain").drain(..).collect()
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, notice: Notice) {
        let mut queue = mutex_lock(&self.queue, SOURCE, "notify");
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(notice);
    }
}
