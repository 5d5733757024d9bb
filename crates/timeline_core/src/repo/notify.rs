//! Semantic outcome events emitted by repository writes and loads.
//!
//! Presentation is the sink's business; the repository only states what
//! happened.

use log::{error, info, warn};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub subject: String,
    pub detail: String,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        subject: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for &T {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Forwards notifications to the `log` facade.
///
/// Only kind and subject are logged; details may quote user-authored text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        let kind = notification.kind.as_str();
        let subject = notification.subject;
        match notification.kind {
            NotificationKind::Success => {
                info!("event=notification module=repo kind={kind} subject=\"{subject}\"")
            }
            NotificationKind::Warning => {
                warn!("event=notification module=repo kind={kind} subject=\"{subject}\"")
            }
            NotificationKind::Error => {
                error!("event=notification module=repo kind={kind} subject=\"{subject}\"")
            }
        }
    }
}

/// Keeps every notification in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    received: RefCell<Vec<Notification>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything collected so far.
    pub fn take(&self) -> Vec<Notification> {
        self.received.take()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.received
            .borrow()
            .iter()
            .map(|notification| notification.kind)
            .collect()
    }
}

impl NotificationSink for CollectingSink {
    fn notify(&self, notification: Notification) {
        self.received.borrow_mut().push(notification);
    }
}
