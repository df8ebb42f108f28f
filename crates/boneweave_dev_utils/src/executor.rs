use boneweave_core::{MainContext, Task};
use flume::{Receiver, Sender};

/// Main context backed by a queue that the test drains explicitly.
///
/// Tasks submitted from worker threads wait until [`run_pending`] is called
/// on the "main" thread, in submission order.
///
/// [`run_pending`]: QueuedExecutor::run_pending
pub struct QueuedExecutor {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

impl Default for QueuedExecutor {
    fn default() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }
}

impl QueuedExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Runs every queued task. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

impl MainContext for QueuedExecutor {
    fn execute(&self, task: Task) {
        if self.tx.send(task).is_err() {
            log::warn!("Main context queue is closed, task dropped");
        }
    }
}

/// Main context that drops every task, simulating a host shutting down.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardingExecutor;

impl MainContext for DiscardingExecutor {
    fn execute(&self, task: Task) {
        drop(task);
    }
}
