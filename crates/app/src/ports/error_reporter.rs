//! Error reporter port: user-facing "setup failed" notifications.

use homehub_domain::error::SetupError;

/// Surfaces setup failures to the user, on top of the log line the
/// orchestrator writes itself.
pub trait ErrorReporter: Send + Sync {
    /// Report that `domain` could not be set up.
    ///
    /// `show_link` tells whether the notification should point at the
    /// component's documentation.
    fn notify_setup_error(&self, domain: &str, error: &SetupError, show_link: bool);
}
