//! Git-backed document store.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, PoisonError, Weak,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    live::Reloadable,
    store::command::Command,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settings of a git store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Remote repository URL; only `http://` and `https://` are accepted.
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Local checkout directory.
    pub location: PathBuf,
    /// Seconds between background syncs.
    #[serde(default = "default_fetch_period")]
    pub fetch_period: u64,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_fetch_period() -> u64 {
    60
}

impl GitConfig {
    pub fn new(repository: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        GitConfig {
            repository: repository.into(),
            branch: default_branch(),
            location: location.into(),
            fetch_period: default_fetch_period(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_fetch_period(mut self, period: Duration) -> Self {
        self.fetch_period = period.as_secs();
        self
    }

    pub fn fetch_period(&self) -> Duration {
        Duration::from_secs(self.fetch_period)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.repository.starts_with("https://") || self.repository.starts_with("http://")) {
            return Err(Error::InvalidStore(format!(
                "repository `{}` must be an http or https URL",
                self.repository
            )));
        }
        if self.branch.is_empty() {
            return Err(Error::InvalidStore("branch must not be empty".to_string()));
        }
        if self.fetch_period == 0 {
            return Err(Error::InvalidStore(
                "fetch period must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Keeps a local checkout of a repository in sync and resolves document
/// paths into it.
pub struct GitOperator {
    namespace: String,
    config: GitConfig,
    sync_lock: Mutex<()>,
    watched: Mutex<Vec<Weak<dyn Reloadable>>>,
    worker: Mutex<Option<Worker>>,
}

impl GitOperator {
    pub fn new(namespace: impl Into<String>, config: GitConfig) -> Result<Self> {
        config.validate()?;
        Ok(GitOperator {
            namespace: namespace.into(),
            config,
            sync_lock: Mutex::new(()),
            watched: Mutex::new(Vec::new()),
            worker: Mutex::new(None),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn config(&self) -> &GitConfig {
        &self.config
    }

    /// Clone the repository, or bring an existing checkout up to date with
    /// the remote branch.
    pub fn sync(&self) -> Result<()> {
        let _guard = self.sync_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let location = &self.config.location;
        let branch = &self.config.branch;

        if location.join(".git").exists() {
            debug!("store `{}`: pulling {branch}", self.namespace);
            Command::new("git", location)
                .args(["fetch", "origin", branch.as_str()])
                .run()
                .map_err(|e| self.sync_error(e))?;
            Command::new("git", location)
                .args(["reset", "--hard"])
                .arg(format!("origin/{branch}"))
                .run()
                .map_err(|e| self.sync_error(e))?;
        } else {
            info!(
                "store `{}`: cloning {} into {}",
                self.namespace,
                self.config.repository,
                location.display()
            );
            let parent = match location.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;
            Command::new("git", &parent)
                .args(["clone", "--branch", branch.as_str(), "--single-branch"])
                .arg(&self.config.repository)
                .arg(location)
                .run()
                .map_err(|e| self.sync_error(e))?;
        }
        Ok(())
    }

    fn sync_error(&self, e: std::io::Error) -> Error {
        Error::Sync {
            namespace: self.namespace.clone(),
            message: e.to_string(),
        }
    }

    /// Local file for a document identifier.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.starts_with(&self.config.location) {
            path.to_path_buf()
        } else {
            self.config.location.join(path)
        }
    }

    /// Reload `target` after every background sync; starts the worker on
    /// first use.
    pub fn watch(self: &Arc<Self>, target: &Arc<dyn Reloadable>) {
        self.watched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::downgrade(target));

        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_none() {
            *worker = Some(self.spawn_worker());
        }
    }

    fn spawn_worker(self: &Arc<Self>) -> Worker {
        let stop = Arc::new(AtomicBool::new(false));
        let period = self.config.fetch_period();
        debug!(
            "store `{}`: syncing every {}s",
            self.namespace,
            period.as_secs()
        );
        let handle = thread::spawn({
            let stop = stop.clone();
            let operator = Arc::downgrade(self);
            move || {
                loop {
                    let deadline = Instant::now() + period;
                    while Instant::now() < deadline {
                        if stop.load(Ordering::Acquire) {
                            return;
                        }
                        thread::sleep(POLL_INTERVAL);
                    }
                    let Some(operator) = operator.upgrade() else {
                        return;
                    };
                    operator.run_once();
                }
            }
        });
        Worker { stop, handle }
    }

    /// Sync now and reload every watched target, routing failures to the
    /// targets' failure handlers.
    pub fn run_once(&self) {
        let targets: Vec<Arc<dyn Reloadable>> = {
            let mut watched = self.watched.lock().unwrap_or_else(PoisonError::into_inner);
            watched.retain(|w| w.strong_count() > 0);
            watched.iter().filter_map(Weak::upgrade).collect()
        };

        if let Err(e) = self.sync() {
            warn!("{e}");
            for target in &targets {
                target.fail(&e);
            }
            return;
        }
        for target in &targets {
            if let Err(e) = target.reload() {
                target.fail(&e);
            }
        }
    }

    /// Stop the background worker, if one runs.
    pub fn shutdown(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            worker.stop.store(true, Ordering::Release);
            if worker.handle.thread().id() != thread::current().id() {
                let _ = worker.handle.join();
            }
        }
    }
}

impl Drop for GitOperator {
    fn drop(&mut self) {
        if let Some(worker) = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            worker.stop.store(true, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: GitConfig = serde_yaml::from_str(
            "repository: https://example.com/configs.git\nlocation: cache\n",
        )
        .unwrap();
        assert_eq!(config.branch, "main");
        assert_eq!(config.fetch_period(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_other_schemes() {
        let config = GitConfig::new("git@example.com:configs.git", "cache");
        assert!(matches!(config.validate(), Err(Error::InvalidStore(_))));
        assert!(GitOperator::new("ns", config).is_err());
    }

    #[test]
    fn test_resolve_into_checkout() {
        let operator =
            GitOperator::new("ns", GitConfig::new("https://example.com/c.git", "cache")).unwrap();
        assert_eq!(operator.resolve("a/b.yml"), PathBuf::from("cache/a/b.yml"));
        assert_eq!(
            operator.resolve("cache/a/b.yml"),
            PathBuf::from("cache/a/b.yml")
        );
    }
}
