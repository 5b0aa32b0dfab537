//! Per-identity job bookkeeping.
//!
//! An identity (a chat, a user, a CLI session) may run at most one job at a
//! time. [`JobRegistry::submit`] claims the identity atomically, spawns the
//! job on the runtime and releases the identity once the completion callback
//! has returned, even if the job panics.

use crate::error::SlidesError;
use crate::job::Job;
use crate::output::Presentation;
use crate::status::{StatusEntry, StatusHistory};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info};

type ActiveJobs = Arc<Mutex<HashMap<String, StatusHistory>>>;

/// Tracks which identities have a job in flight.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    active: ActiveJobs,
}

/// Releases an identity when the job task ends.
struct Release {
    active: ActiveJobs,
    identity: String,
}

impl Drop for Release {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.identity);
        debug!("[{}] identity released", self.identity);
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `job` in the background.
    ///
    /// `on_finish` receives the job's result exactly once. Must be called
    /// from within a tokio runtime.
    ///
    /// # Errors
    /// [`SlidesError::JobAlreadyRunning`] if the job's identity is busy. The
    /// running job is left untouched.
    pub fn submit<F>(&self, job: Job, on_finish: F) -> Result<JoinHandle<()>, SlidesError>
    where
        F: FnOnce(Result<Option<Presentation>, SlidesError>) + Send + 'static,
    {
        let identity = job.identity().to_string();
        {
            let mut active = lock(&self.active);
            if active.contains_key(&identity) {
                info!("[{}] rejected: a job is already running", identity);
                return Err(SlidesError::JobAlreadyRunning { identity });
            }
            active.insert(identity.clone(), job.status());
        }

        let release = Release {
            active: Arc::clone(&self.active),
            identity,
        };
        Ok(tokio::spawn(async move {
            let _release = release;
            let result = job.run().await;
            on_finish(result);
        }))
    }

    /// Status stack of the identity's running job; empty when idle.
    pub fn status(&self, identity: &str) -> Vec<StatusEntry> {
        lock(&self.active)
            .get(identity)
            .map(StatusHistory::snapshot)
            .unwrap_or_default()
    }

    pub fn is_active(&self, identity: &str) -> bool {
        lock(&self.active).contains_key(identity)
    }

    pub fn active_count(&self) -> usize {
        lock(&self.active).len()
    }
}

fn lock(active: &ActiveJobs) -> MutexGuard<'_, HashMap<String, StatusHistory>> {
    active.lock().unwrap_or_else(|e| e.into_inner())
}
