//! Single-slot background task holder.
//!
//! At most one task occupies the slot. Scheduling a new task kills the
//! current occupant: its cancellation token is triggered and the replacement
//! starts only once the killed task has wound down, so the two never run
//! side by side. Scheduling itself does not wait. Cancellation is
//! cooperative, so a task stops at its next checkpoint rather than instantly.
//!
//! The slot lock is never held across a task join. Waiters watch a
//! completion signal instead, which leaves the occupant in place for
//! `create` and `kill` to cancel.
//!
//! Every session built by one `SessionResolver` shares the same manager.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct PendingTask {
    id: u64,
    handle: JoinHandle<()>,
    cancel: CancellationToken,
    // Closed when the task ends, however it ends.
    done: watch::Receiver<()>,
}

impl PendingTask {
    async fn join(self) {
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                tracing::error!(error = %e, "background task panicked");
            }
        }
    }
}

#[derive(Default)]
struct Slot {
    next_id: u64,
    occupant: Option<PendingTask>,
}

async fn finished(mut done: watch::Receiver<()>) {
    while done.changed().await.is_ok() {}
}

#[derive(Clone, Default)]
pub struct AsyncTaskManager {
    slot: Arc<Mutex<Slot>>,
}

impl AsyncTaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the slot occupant with a task built from `task`.
    ///
    /// The closure receives the cancellation token of the new task. The
    /// previous occupant is cancelled and the new task starts after it ends;
    /// this call returns without waiting for either.
    pub async fn create<F, Fut>(&self, task: F) -> bool
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot.lock().await;
        let previous = slot.occupant.take().map(|previous| {
            tracing::debug!("killing pending background task");
            previous.cancel.cancel();
            previous.done.clone()
        });

        let cancel = CancellationToken::new();
        let (done_tx, done) = watch::channel(());
        let future = task(cancel.clone());
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let _done = done_tx;
            if let Some(previous) = previous {
                finished(previous).await;
            }
            if token.is_cancelled() {
                return;
            }
            future.await;
        });

        slot.next_id += 1;
        let id = slot.next_id;
        slot.occupant = Some(PendingTask {
            id,
            handle,
            cancel,
            done,
        });
        true
    }

    /// Waits until the slot is empty.
    ///
    /// Tasks scheduled while waiting are waited for too. Returns `false` when
    /// there was nothing to wait for.
    pub async fn wait(&self) -> bool {
        let mut waited = false;
        loop {
            let (id, done) = {
                let slot = self.slot.lock().await;
                match &slot.occupant {
                    Some(task) => (task.id, task.done.clone()),
                    None => return waited,
                }
            };

            finished(done).await;
            waited = true;

            let ended = {
                let mut slot = self.slot.lock().await;
                if slot.occupant.as_ref().is_some_and(|task| task.id == id) {
                    slot.occupant.take()
                } else {
                    None
                }
            };
            if let Some(task) = ended {
                task.join().await;
            }
        }
    }

    /// Cancels the slot occupant and waits for it to stop.
    ///
    /// Returns `false` when the slot was empty.
    pub async fn kill(&self) -> bool {
        let occupant = self.slot.lock().await.occupant.take();
        match occupant {
            Some(task) => {
                task.cancel.cancel();
                task.join().await;
                true
            }
            None => false,
        }
    }

    /// Whether a task occupies the slot and has not finished yet.
    pub async fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .await
            .occupant
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}

impl std::fmt::Debug for AsyncTaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncTaskManager").finish_non_exhaustive()
    }
}
