//! Package installer error types.

use std::path::PathBuf;

/// Errors raised while installing a requirement.
#[derive(Debug, thiserror::Error)]
pub enum PipError {
    /// The requirement specifier is blank.
    #[error("empty requirement specifier")]
    EmptyRequirement,

    /// The target directory could not be created.
    #[error("unable to create target directory {}", .path.display())]
    CreateTarget {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The python interpreter could not be started.
    #[error("unable to run {}", .python.display())]
    Spawn {
        python: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// pip ran and reported a failure.
    #[error("pip failed to install {requirement} ({status}): {stderr}")]
    Failed {
        requirement: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}
