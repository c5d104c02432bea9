use std::fmt;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use tokio::sync::Notify;
use tokio::task::AbortHandle;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a new process-unique load id
pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone, Default)]
/// A flag with notification capabilities
///
/// Whenever the flag is set, waiters are woken up.
struct Signal {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Signal {
    /// Sets the flag, returning false if it was already set
    fn set(&self) -> bool {
        if self.flag.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.notify.notify_waiters();
        true
    }

    fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);

        // register before checking the flag so a concurrent set is not missed
        notified.as_mut().enable();
        if self.is_set() {
            return;
        }

        notified.await;
    }
}

/// Marks a load as exited when dropped
///
/// The guard lives inside the subscription task, so it is dropped however the
/// task ends: after delivering, on abort, on panic or when the runtime shuts down.
pub(crate) struct ExitGuard(Signal);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.set();
    }
}

/// Create the guard for a load, to be moved into its subscription task, and the
/// signal to hand to [`LoadHandle::new`]
pub(crate) fn exit_guard() -> (ExitGuard, ExitSignal) {
    let signal = Signal::default();
    (ExitGuard(signal.clone()), ExitSignal(signal))
}

/// The observing side of an [`ExitGuard`]
pub(crate) struct ExitSignal(Signal);

#[derive(Clone)]
/// A cancellation handle for an in-flight load
///
/// The handle is held by the [`Loading`](crate::LoadingResult::Loading) variant of a
/// cell. Cancelling it aborts the subscription task, after which no completion
/// is delivered for the load.
///
/// Dropping the handle does not cancel the load.
pub struct LoadHandle {
    id: u64,
    cancelled: Signal,
    exited: Signal,
    task: Arc<AbortHandle>,
}

impl LoadHandle {
    pub(crate) fn new(id: u64, task: AbortHandle, exited: ExitSignal) -> Self {
        Self {
            id,
            cancelled: Signal::default(),
            exited: exited.0,
            task: Arc::new(task),
        }
    }

    /// The unique id of the load
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Aborts the subscription task
    ///
    /// Calling this more than once has no further effect.
    pub fn cancel(&self) {
        if self.cancelled.set() {
            self.task.abort();
        }
    }

    /// Waits asynchronously until the load is cancelled
    pub async fn cancelled(&self) {
        self.cancelled.wait().await
    }

    /// Checks if the load has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_set()
    }

    /// Waits asynchronously until the subscription task is gone
    ///
    /// If the task delivered an outcome, it is queued on the cell before this
    /// returns.
    pub async fn finished(&self) {
        self.exited.wait().await
    }

    /// Checks if the subscription task is done, either because it delivered
    /// its completion or because it was aborted
    pub fn is_finished(&self) -> bool {
        self.exited.is_set() || self.task.is_finished()
    }
}

impl PartialEq for LoadHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for LoadHandle {}

impl fmt::Debug for LoadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
