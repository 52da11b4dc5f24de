//! Desktop Notifier
//!
//! Best-effort desktop notification of sync outcomes.

use notify_rust::Notification;

use crate::utils::error::{RelayError, RelayResult};

/// Something that can show a short human-readable message to the user.
///
/// Callers treat every error as non-fatal.
pub trait Notifier: Send + Sync {
    /// Deliver a notification
    fn notify(&self, message: &str) -> RelayResult<()>;
}

/// Notifier that discards every message
#[derive(Debug, Default, Clone)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _message: &str) -> RelayResult<()> {
        Ok(())
    }
}

/// Notifier backed by the platform notification service
/// (D-Bus on Linux/BSD, Notification Center on macOS, toasts on Windows)
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    title: String,
}

impl DesktopNotifier {
    /// Create a notifier that titles every notification with `title`
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Title shown on each notification
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, message: &str) -> RelayResult<()> {
        Notification::new()
            .summary(&self.title)
            .body(message)
            .show()
            .map(|_| ())
            .map_err(|e| RelayError::notify(format!("failed to notify: {}", e)))
    }
}
