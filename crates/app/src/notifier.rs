//! Persistent setup notifications: the default [`ErrorReporter`].
//!
//! Failures accumulate into a single user-facing message listing every
//! component that could not be set up, like a sticky notification that is
//! rewritten on each new failure.

use std::collections::BTreeMap;
use std::sync::Mutex;

use homehub_domain::error::SetupError;

use crate::context::lock;
use crate::ports::ErrorReporter;

/// Collects failed domains into one notification.
#[derive(Debug, Default)]
pub struct NotificationReporter {
    /// Base URL of component docs; `<base>/<domain>` is linked when set.
    docs_url: Option<String>,
    /// Domain → whether to link its docs.
    failed: Mutex<BTreeMap<String, bool>>,
}

impl NotificationReporter {
    /// Reporter that links each failed component to `<docs_url>/<domain>`.
    #[must_use]
    pub fn with_docs_url(docs_url: impl Into<String>) -> Self {
        Self {
            docs_url: Some(docs_url.into()),
            failed: Mutex::default(),
        }
    }

    /// Domains reported so far, sorted.
    #[must_use]
    pub fn failed_domains(&self) -> Vec<String> {
        lock(&self.failed).keys().cloned().collect()
    }

    /// Current notification text, `None` when nothing failed.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        let failed = lock(&self.failed);
        if failed.is_empty() {
            return None;
        }
        let mut message =
            String::from("The following components could not be set up:\n\n");
        for (domain, show_link) in failed.iter() {
            match (&self.docs_url, show_link) {
                (Some(base), true) => message.push_str(&format!(
                    " - [{domain}]({}/{domain})\n",
                    base.trim_end_matches('/')
                )),
                _ => message.push_str(&format!(" - {domain}\n")),
            }
        }
        message.push_str("\nPlease check your config.");
        Some(message)
    }
}

impl ErrorReporter for NotificationReporter {
    fn notify_setup_error(&self, domain: &str, error: &SetupError, show_link: bool) {
        lock(&self.failed)
            .entry(domain.to_string())
            .and_modify(|link| *link |= show_link)
            .or_insert(show_link);
        tracing::warn!(domain, %error, "invalid config or setup failure, notification updated");
    }
}
