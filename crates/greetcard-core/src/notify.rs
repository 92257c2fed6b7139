//! User-facing notification capability.
//!
//! Validation and export report failures through a [`Notifier`]; the
//! browser crate renders them as toasts.

use std::cell::RefCell;
use std::rc::Rc;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Something the user asked for did not happen.
    Error,
    /// Informational.
    Info,
}

/// A single notification as delivered to a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Human-readable text.
    pub message: String,
}

/// Something that can show a one-shot message to the user.
pub trait Notifier {
    /// Show `message` to the user.
    fn notify(&self, kind: NotificationKind, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, kind: NotificationKind, message: &str) {
        (**self).notify(kind, message);
    }
}

impl<N: Notifier + ?Sized> Notifier for Rc<N> {
    fn notify(&self, kind: NotificationKind, message: &str) {
        (**self).notify(kind, message);
    }
}

/// Collects notifications in memory, newest last.
impl Notifier for RefCell<Vec<Notification>> {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.borrow_mut().push(Notification {
            kind,
            message: message.to_owned(),
        });
    }
}
