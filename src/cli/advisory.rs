use std::time::{Duration, Instant};

use super::output::{self, MessageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn message_kind(self) -> MessageKind {
        match self {
            Severity::Info => MessageKind::Info,
            Severity::Success => MessageKind::Success,
            Severity::Warning => MessageKind::Warning,
            Severity::Error => MessageKind::Error,
        }
    }
}

/// Transient, non-blocking notice.
#[derive(Debug, Clone)]
pub struct Advisory {
    pub message: String,
    pub severity: Severity,
    raised_at: Instant,
    ttl: Duration,
}

impl Advisory {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.ttl
    }
}

/// Advisories still within their time-to-live; `status` re-displays them.
#[derive(Debug)]
pub struct AdvisoryBoard {
    ttl: Duration,
    entries: Vec<Advisory>,
}

impl AdvisoryBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Vec::new(),
        }
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Prints the advisory immediately and keeps it until it expires.
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.show_at(message.into(), severity, Instant::now());
    }

    fn show_at(&mut self, message: String, severity: Severity, now: Instant) {
        self.entries.retain(|advisory| !advisory.is_expired(now));
        output::print(severity.message_kind(), &message);
        self.entries.push(Advisory {
            message,
            severity,
            raised_at: now,
            ttl: self.ttl,
        });
    }

    /// Drops expired advisories and returns those still showing.
    pub fn active(&mut self, now: Instant) -> &[Advisory] {
        self.entries.retain(|advisory| !advisory.is_expired(now));
        &self.entries
    }
}
