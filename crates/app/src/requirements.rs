//! Requirement installation for one component.
//!
//! All installs go through the context's single install lock, held for the
//! whole requirement list of a component, and run on the blocking pool.

use homehub_domain::error::SetupError;

use crate::context::{SetupContext, lock};

impl SetupContext {
    /// Install every requirement of `domain`, returning `true` on success.
    ///
    /// Trivially succeeds when installation is skipped.
    pub async fn async_process_requirements(&self, domain: &str, requirements: &[String]) -> bool {
        self.process_requirements(domain, requirements).await.is_ok()
    }

    #[tracing::instrument(skip(self, requirements))]
    pub(crate) async fn process_requirements(
        &self,
        domain: &str,
        requirements: &[String],
    ) -> Result<(), SetupError> {
        if self.inner.skip_pip || requirements.is_empty() {
            return Ok(());
        }

        let _guard = self.inner.install_lock.lock().await;
        for requirement in requirements {
            if lock(&self.inner.installed).contains(requirement) {
                continue;
            }
            let failed = || SetupError::Requirement {
                requirement: requirement.clone(),
            };

            let Some(installer) = self.inner.installer.clone() else {
                tracing::error!(%requirement, "no package installer configured");
                return Err(failed());
            };
            let target = self.inner.deps_dir.clone();
            let package = requirement.clone();
            let installed = self
                .inner
                .runtime
                .spawn_blocking(move || installer.install(&package, &target))
                .await;

            match installed {
                Ok(Ok(())) => {
                    tracing::debug!(%requirement, "requirement installed");
                    lock(&self.inner.installed).insert(requirement.clone());
                }
                Ok(Err(err)) => {
                    tracing::error!(%requirement, error = %err, "unable to install requirement");
                    return Err(failed());
                }
                Err(err) => {
                    tracing::error!(%requirement, error = %err, "package installer panicked");
                    return Err(failed());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::component::BoxError;
    use crate::ports::PackageInstaller;
    use crate::registry::ComponentRegistry;

    #[derive(Default)]
    struct RecordingInstaller {
        calls: Mutex<Vec<(String, PathBuf)>>,
        fail_on: Option<String>,
        active: Mutex<usize>,
        max_active: Mutex<usize>,
    }

    impl PackageInstaller for RecordingInstaller {
        fn install(&self, requirement: &str, target: &Path) -> Result<(), BoxError> {
            {
                let mut active = self.active.lock().unwrap();
                *active += 1;
                let mut max = self.max_active.lock().unwrap();
                *max = (*max).max(*active);
            }
            std::thread::sleep(Duration::from_millis(5));
            self.calls
                .lock()
                .unwrap()
                .push((requirement.to_string(), target.to_path_buf()));
            *self.active.lock().unwrap() -= 1;
            if self.fail_on.as_deref() == Some(requirement) {
                return Err(format!("no matching distribution for {requirement}").into());
            }
            Ok(())
        }
    }

    fn context(installer: Arc<RecordingInstaller>, skip_pip: bool) -> SetupContext {
        SetupContext::builder()
            .loader(Arc::new(ComponentRegistry::default()))
            .installer(installer)
            .skip_pip(skip_pip)
            .deps_dir("/config/deps")
            .build()
            .unwrap()
    }

    fn reqs(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn should_install_into_deps_dir() {
        let installer = Arc::new(RecordingInstaller::default());
        let ctx = context(installer.clone(), false);

        assert!(
            ctx.async_process_requirements("mqtt", &reqs(&["paho-mqtt==1.3.1"]))
                .await
        );
        assert_eq!(
            *installer.calls.lock().unwrap(),
            vec![(
                "paho-mqtt==1.3.1".to_string(),
                PathBuf::from("/config/deps")
            )]
        );
    }

    #[tokio::test]
    async fn should_bypass_installer_when_skip_pip() {
        let installer = Arc::new(RecordingInstaller::default());
        let ctx = context(installer.clone(), true);

        assert!(
            ctx.async_process_requirements("ghost", &reqs(&["nonexistent-package"]))
                .await
        );
        assert!(installer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_stop_at_first_failed_requirement() {
        let installer = Arc::new(RecordingInstaller {
            fail_on: Some("broken".to_string()),
            ..RecordingInstaller::default()
        });
        let ctx = context(installer.clone(), false);

        let result = ctx
            .process_requirements("demo", &reqs(&["first", "broken", "never"]))
            .await;

        assert_eq!(
            result,
            Err(SetupError::Requirement {
                requirement: "broken".to_string()
            })
        );
        let calls: Vec<_> = installer
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(req, _)| req.clone())
            .collect();
        assert_eq!(calls, vec!["first", "broken"]);
    }

    #[tokio::test]
    async fn should_not_reinstall_known_requirement() {
        let installer = Arc::new(RecordingInstaller::default());
        let ctx = context(installer.clone(), false);

        assert!(ctx.async_process_requirements("a", &reqs(&["shared"])).await);
        assert!(ctx.async_process_requirements("b", &reqs(&["shared"])).await);
        assert_eq!(installer.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_fail_without_installer() {
        let ctx = SetupContext::builder()
            .loader(Arc::new(ComponentRegistry::default()))
            .build()
            .unwrap();
        assert!(!ctx.async_process_requirements("mqtt", &reqs(&["paho-mqtt"])).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_serialize_concurrent_installs() {
        let installer = Arc::new(RecordingInstaller::default());
        let ctx = context(installer.clone(), false);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    ctx.async_process_requirements(
                        &format!("domain{i}"),
                        &[format!("pkg{i}a"), format!("pkg{i}b")],
                    )
                    .await
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(installer.calls.lock().unwrap().len(), 8);
        assert_eq!(*installer.max_active.lock().unwrap(), 1);
    }
}
