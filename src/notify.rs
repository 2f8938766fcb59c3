//! Transient user notices (toasts)

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn css_class(self) -> &'static str {
        match self {
            Level::Success => "toast-success",
            Level::Info => "toast-info",
            Level::Warning => "toast-warning",
            Level::Error => "toast-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: Uuid,
    pub level: Level,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Shared queue of pending notices; cloning shares the queue
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    pending: Arc<Mutex<Vec<Notice>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: Level, text: impl Into<String>) {
        let text = text.into();
        match level {
            Level::Error => log::warn!("notice: {text}"),
            Level::Warning => log::info!("notice: {text}"),
            Level::Success | Level::Info => log::debug!("notice: {text}"),
        }
        let notice = Notice {
            id: Uuid::new_v4(),
            level,
            text,
            at: Utc::now(),
        };
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.push(Level::Success, text);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.push(Level::Info, text);
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.push(Level::Warning, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(Level::Error, text);
    }

    /// Take every pending notice, oldest first
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy of pending notices without consuming them
    pub fn pending(&self) -> Vec<Notice> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
