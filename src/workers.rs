//! Bound on concurrently running request handlers

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::info;

/// Semaphore-backed limit that can also wait for every handler to finish
#[derive(Clone)]
pub struct WorkerLimit {
    semaphore: Arc<Semaphore>,
    workers: usize,
}

impl WorkerLimit {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Wait for a free slot; the slot is released when the permit drops
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        Ok(self.semaphore.clone().acquire_owned().await?)
    }

    /// Number of handlers currently running
    pub fn in_flight(&self) -> usize {
        self.workers - self.semaphore.available_permits()
    }

    /// Wait until every running handler has released its slot, then refuse
    /// new ones.
    pub async fn drain(&self) -> Result<()> {
        let in_flight = self.in_flight();
        if in_flight > 0 {
            info!(in_flight, "Waiting for in-flight requests");
        }
        let all = self.semaphore.acquire_many(self.workers as u32).await?;
        self.semaphore.close();
        drop(all);
        Ok(())
    }
}
