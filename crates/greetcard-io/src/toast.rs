//! Toast notifications.
//!
//! [`ToastNotifier`] is the browser [`Notifier`]: it appends to a
//! [`ToastQueue`] signal rendered by the `Toaster` component and schedules
//! each toast's removal after [`TOAST_LIFETIME_MS`].

use dioxus::prelude::*;
use greetcard_core::{NotificationKind, Notifier};

/// How long a toast stays up unless dismissed.
pub const TOAST_LIFETIME_MS: u32 = 4_500;

/// One visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Identifier used for dismissal.
    pub id: u64,
    /// Severity.
    pub kind: NotificationKind,
    /// Text shown to the user.
    pub message: String,
}

/// Visible toasts, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    /// Add a toast and return its id.
    pub fn push(&mut self, kind: NotificationKind, message: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            kind,
            message: message.to_owned(),
        });
        id
    }

    /// Remove the toast with `id`, if it is still visible.
    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    /// Visible toasts, oldest first.
    #[must_use]
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }
}

/// [`Notifier`] that shows toasts.
#[derive(Clone, Copy, PartialEq)]
pub struct ToastNotifier {
    queue: Signal<ToastQueue>,
}

impl ToastNotifier {
    /// Notifier feeding `queue`.
    #[must_use]
    pub const fn new(queue: Signal<ToastQueue>) -> Self {
        Self { queue }
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        let mut queue = self.queue;
        let id = queue.write().push(kind, message);
        spawn(async move {
            gloo_timers::future::TimeoutFuture::new(TOAST_LIFETIME_MS).await;
            queue.write().dismiss(id);
        });
    }
}
