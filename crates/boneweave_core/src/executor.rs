//! Main-context scheduling.
//!
//! The host owns one authoritative execution context for world and entity
//! mutation. Work that touches renderer handles after an asynchronous step is
//! handed to it through [`MainContext`]; the core never picks a thread itself.

/// A unit of work queued onto the main context.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Executor for the host's main context.
///
/// Tasks submitted from the same caller must run in submission order.
pub trait MainContext: Send + Sync {
    fn execute(&self, task: Task);
}

/// Runs every task immediately on the calling thread.
///
/// Suitable when the caller already is the main context.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl MainContext for Immediate {
    #[inline]
    fn execute(&self, task: Task) {
        task();
    }
}
