//! Handle for a dispatch running in the background.

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{HuginnError, Result};

/// Handle returned by [`RequestOrchestrator::spawn_dispatch`](super::RequestOrchestrator::spawn_dispatch).
///
/// Dropping the handle cancels the dispatch: whoever owned it is gone, so a
/// completion arriving later is discarded instead of delivered. Call
/// [`detach`](Self::detach) to let the dispatch finish on its own.
#[derive(Debug)]
pub struct DispatchHandle {
    token: CancellationToken,
    guard: Option<DropGuard>,
    task: JoinHandle<bool>,
}

impl DispatchHandle {
    pub(crate) fn new(token: CancellationToken, task: JoinHandle<bool>) -> Self {
        let guard = token.clone().drop_guard();
        Self {
            token,
            guard: Some(guard),
            task,
        }
    }

    /// Abandon the dispatch. The completion callback will not run unless it
    /// already has.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the background task has finished (delivered or discarded).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Let the dispatch run to completion without keeping the handle.
    pub fn detach(mut self) {
        if let Some(guard) = self.guard.take() {
            guard.disarm();
        }
    }

    /// Wait for the background task.
    ///
    /// Resolves once the completion callback has run, or with
    /// [`HuginnError::Cancelled`] if the completion was discarded.
    pub async fn wait(mut self) -> Result<()> {
        match (&mut self.task).await {
            Ok(true) => Ok(()),
            _ => Err(HuginnError::Cancelled),
        }
    }
}
