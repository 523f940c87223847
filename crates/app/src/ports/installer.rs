//! Package installer port: makes a requirement available on disk.

use std::path::Path;

use crate::component::BoxError;

/// Installs external packages needed by components.
///
/// Implementations are **blocking** and may be slow: the orchestrator always
/// calls them from the blocking pool, one at a time.
pub trait PackageInstaller: Send + Sync {
    /// Install `requirement` into `target`.
    ///
    /// # Errors
    ///
    /// Returns an error when the package manager fails. The caller treats
    /// it as a failed requirement and does not roll anything back.
    fn install(&self, requirement: &str, target: &Path) -> Result<(), BoxError>;
}
