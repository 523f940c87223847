//! # homehub-adapter-pip
//!
//! Package installer adapter. Installs one requirement at a time into an
//! isolated target directory by running
//! `python -m pip install --quiet --upgrade <requirement> --target <dir>`.
//!
//! Installation is blocking; the bootstrap calls it from the blocking pool
//! and serializes calls behind its install lock.
//!
//! ## Dependency rule
//!
//! Depends on `homehub-app` (port traits) only.

mod error;

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use homehub_app::component::BoxError;
use homehub_app::ports::PackageInstaller;

pub use error::PipError;

/// Installs requirements with pip.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    python: PathBuf,
    constraints: Option<PathBuf>,
}

impl Default for PipInstaller {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl PipInstaller {
    /// Installer running pip through the given interpreter.
    #[must_use]
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            constraints: None,
        }
    }

    /// Pass `--constraint <path>` to every install.
    #[must_use]
    pub fn with_constraints(mut self, constraints: impl Into<PathBuf>) -> Self {
        self.constraints = Some(constraints.into());
        self
    }

    #[must_use]
    pub fn python(&self) -> &Path {
        &self.python
    }

    fn command(&self, requirement: &str, target: &Path) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.args(["-m", "pip", "install", "--quiet", "--upgrade", requirement])
            .arg("--target")
            .arg(target);
        if let Some(constraints) = &self.constraints {
            cmd.arg("--constraint").arg(constraints);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }

    /// Install `requirement` into `target`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns a [`PipError`] when the requirement is blank, the target
    /// cannot be created, the interpreter cannot be started or pip exits
    /// with a failure.
    pub fn install_package(&self, requirement: &str, target: &Path) -> Result<(), PipError> {
        let requirement = requirement.trim();
        if requirement.is_empty() {
            return Err(PipError::EmptyRequirement);
        }
        std::fs::create_dir_all(target).map_err(|source| PipError::CreateTarget {
            path: target.to_path_buf(),
            source,
        })?;

        tracing::info!(%requirement, target = %target.display(), "attempting install of requirement");
        let output = self
            .command(requirement, target)
            .output()
            .map_err(|source| PipError::Spawn {
                python: self.python.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PipError::Failed {
                requirement: requirement.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl PackageInstaller for PipInstaller {
    fn install(&self, requirement: &str, target: &Path) -> Result<(), BoxError> {
        self.install_package(requirement, target)
            .map_err(|err| Box::new(err) as BoxError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("homehub-pip-{}-{name}", std::process::id()))
    }

    #[test]
    fn should_build_pip_install_command() {
        let installer = PipInstaller::new("/opt/python/bin/python3");
        let cmd = installer.command("paho-mqtt==1.3.1", Path::new("/config/deps"));

        assert_eq!(cmd.get_program(), "/opt/python/bin/python3");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(
            args,
            [
                "-m",
                "pip",
                "install",
                "--quiet",
                "--upgrade",
                "paho-mqtt==1.3.1",
                "--target",
                "/config/deps",
            ]
        );
    }

    #[test]
    fn should_append_constraints_file() {
        let installer = PipInstaller::default().with_constraints("/config/constraints.txt");
        let cmd = installer.command("requests", Path::new("deps"));

        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(
            &args[args.len() - 2..],
            ["--constraint", "/config/constraints.txt"]
        );
    }

    #[test]
    fn should_default_to_python3() {
        assert_eq!(PipInstaller::default().python(), Path::new("python3"));
    }

    #[test]
    fn should_reject_blank_requirement() {
        let result = PipInstaller::default().install_package("  ", Path::new("deps"));
        assert!(matches!(result, Err(PipError::EmptyRequirement)));
    }

    #[test]
    fn should_report_missing_interpreter() {
        let target = scratch_dir("missing");
        let installer = PipInstaller::new("/nonexistent/homehub/python");

        let result = installer.install_package("requests", &target);

        assert!(matches!(result, Err(PipError::Spawn { .. })));
        assert!(target.is_dir());
        let _ = std::fs::remove_dir_all(target);
    }

    #[cfg(unix)]
    #[test]
    fn should_report_failed_install() {
        let target = scratch_dir("failed");
        let installer = PipInstaller::new("false");

        let result = installer.install("nonexistent-package", &target);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("nonexistent-package"));
        let _ = std::fs::remove_dir_all(target);
    }
}
