//! Setup task: the memoized, at-most-once attempt to bring a domain online.
//!
//! A task is a [`watch`] channel carrying its [`TaskState`]. The orchestrator
//! keeps the sending half ([`TaskProgress`]) inside the spawned setup; every
//! caller asking for the same domain gets a clone of the receiving half
//! ([`SetupTask`]) and waits for a settled state.

use homehub_domain::error::SetupError;
use tokio::sync::watch;

/// Lifecycle of one setup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Created and cached, not started yet.
    Pending,
    /// Resolving dependencies/requirements or running the entry point.
    Running,
    Succeeded,
    Failed(SetupError),
}

impl TaskState {
    /// Whether the task reached a terminal state.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    /// The outcome of a settled task, `None` while in flight.
    #[must_use]
    pub fn outcome(&self) -> Option<Result<(), SetupError>> {
        match self {
            Self::Pending | Self::Running => None,
            Self::Succeeded => Some(Ok(())),
            Self::Failed(err) => Some(Err(err.clone())),
        }
    }
}

/// Read side of a setup task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SetupTask {
    domain: String,
    state: watch::Receiver<TaskState>,
}

/// Write side of a setup task, owned by the running setup.
#[derive(Debug)]
pub struct TaskProgress {
    state: watch::Sender<TaskState>,
}

impl SetupTask {
    /// Create a pending task for `domain`.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> (Self, TaskProgress) {
        let (tx, rx) = watch::channel(TaskState::Pending);
        let task = Self {
            domain: domain.into(),
            state: rx,
        };
        (task, TaskProgress { state: tx })
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state.borrow().clone()
    }

    /// Wait until the task settles and return its outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`SetupError`] the setup failed with. If the running side
    /// disappeared without settling, the task is reported as an execution
    /// failure.
    pub async fn wait(&self) -> Result<(), SetupError> {
        let mut rx = self.state.clone();
        let settled = rx
            .wait_for(TaskState::is_settled)
            .await
            .map(|state| state.outcome());
        match settled {
            Ok(Some(outcome)) => outcome,
            Ok(None) | Err(_) => Err(SetupError::Execution {
                message: format!("setup task for {} ended without a result", self.domain),
            }),
        }
    }
}

impl TaskProgress {
    /// Mark the task as running.
    pub fn running(&self) {
        self.state.send_replace(TaskState::Running);
    }

    /// Settle the task. Waiters are woken with the outcome.
    pub fn finish(self, outcome: Result<(), SetupError>) {
        let state = match outcome {
            Ok(()) => TaskState::Succeeded,
            Err(err) => TaskState::Failed(err),
        };
        self.state.send_replace(state);
    }
}
