use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_stream::StreamExt;
use tracing::{debug, field, span, trace, warn, Instrument, Level, Span};

mod queue;

use queue::{completion_queue, Completion, Outcome, Receiver, Sender};

use crate::binding::{Binding, Observable};
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::handle::{exit_guard, next_id, LoadHandle};
use crate::result::LoadingResult;

/// Configuration of a [`LoadingCell`]
///
/// # Example
/// ```rust
/// use endpoint_loading::{LoadingCell, Opts};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let cell: LoadingCell<u32> = LoadingCell::new()
///     .with_opts(Opts::default().cancel_on_drop(false).runtime(rt.handle().clone()));
/// ```
#[derive(Clone)]
pub struct Opts {
    /// Cancel an in-flight load when it is discarded, either by a
    /// [`reset`](LoadingCell::reset) or by dropping the cell. Defaults to true.
    cancel_on_drop: bool,
    /// The runtime to spawn subscriptions on. Defaults to the runtime
    /// current at the time of the trigger.
    runtime: Option<Handle>,
}

impl Opts {
    /// Set whether a load in flight is cancelled when the cell is reset or
    /// dropped. When set, dropping a loading cell also sets its binding back to
    /// [`Empty`](LoadingResult::Empty).
    ///
    /// With `false` the subscription keeps running, but its outcome is never
    /// written anywhere once the cell is gone.
    pub fn cancel_on_drop(self, cancel_on_drop: bool) -> Self {
        let mut opts = self;
        opts.cancel_on_drop = cancel_on_drop;
        opts
    }

    /// Spawn subscriptions on the given runtime instead of the one current at
    /// trigger time. This allows triggering loads from outside of a runtime.
    pub fn runtime(self, runtime: Handle) -> Self {
        let mut opts = self;
        opts.runtime = Some(runtime);
        opts
    }
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            cancel_on_drop: true,
            runtime: None,
        }
    }
}

/// What a call to [`LoadingCell::trigger`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A new load was started with the given id
    Started(u64),
    /// The cell was already loading, nothing was done. Holds the id of the
    /// load in flight
    AlreadyLoading(u64),
}

/// A loading state bound to its owner
///
/// The cell holds a [`LoadingResult`] through a [`Binding`] and is the only one allowed
/// to write to it. Subscriptions started by [`trigger`](Self::trigger) run on the tokio
/// runtime and post their outcome to a queue owned by the cell; the outcome is applied
/// to the state when the owner calls [`apply_pending`](Self::apply_pending) or
/// [`settle`](Self::settle). Since every write requires `&mut self`, all state changes
/// happen on whichever task owns the cell.
///
/// ```rust
/// use endpoint_loading::{endpoint, Endpoint, LoadingCell, LoadingResult};
///
/// # tokio_test::block_on(async {
/// let user = endpoint::from_fn(|| async { Ok::<_, anyhow::Error>("alice") });
///
/// let mut cell = LoadingCell::new();
/// user.load_into(&mut cell).unwrap();
/// assert!(cell.is_loading());
///
/// cell.settle().await;
/// assert_eq!(cell.value(), Some("alice"));
/// # })
/// ```
pub struct LoadingCell<T, E = anyhow::Error, B = Observable<LoadingResult<T, E>>>
where
    B: Binding<LoadingResult<T, E>>,
{
    binding: B,
    opts: Opts,
    tx: Sender<T, E>,
    rx: Receiver<T, E>,
}

impl<T, E> Default for LoadingCell<T, E> {
    fn default() -> Self {
        Self::with_binding(Observable::default())
    }
}

impl<T, E> LoadingCell<T, E> {
    /// Create an empty cell notifying subscribers on every change
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new receiver for state changes
    pub fn subscribe(&self) -> watch::Receiver<LoadingResult<T, E>> {
        self.binding.subscribe()
    }
}

impl<T, E, B> LoadingCell<T, E, B>
where
    B: Binding<LoadingResult<T, E>>,
{
    /// Create a cell writing to the given binding
    ///
    /// The binding is used as is, if it is already loading, no new load can be
    /// triggered until it is reset. If the cell is dropped while loading, the binding
    /// is set back to [`Empty`](LoadingResult::Empty) unless
    /// [`Opts::cancel_on_drop`] is disabled, in which case it keeps the stale
    /// `Loading` state.
    pub fn with_binding(binding: B) -> Self {
        let (tx, rx) = completion_queue();
        Self {
            binding,
            opts: Opts::default(),
            tx,
            rx,
        }
    }

    /// Replace the cell configuration
    pub fn with_opts(self, opts: Opts) -> Self {
        let mut cell = self;
        cell.opts = opts;
        cell
    }

    /// Access the underlying binding
    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Run `f` with a reference to the current state
    pub fn read<R>(&self, f: impl FnOnce(&LoadingResult<T, E>) -> R) -> R {
        self.binding.read(f)
    }

    pub fn is_loading(&self) -> bool {
        self.read(LoadingResult::is_loading)
    }

    pub fn is_error(&self) -> bool {
        self.read(LoadingResult::is_error)
    }

    /// Returns a copy of the loaded value, if any
    pub fn value(&self) -> Option<T>
    where
        T: Clone,
    {
        self.read(|state| state.value().cloned())
    }

    fn loading_handle(&self) -> Option<LoadHandle> {
        self.read(|state| state.handle().cloned())
    }

    /// Start loading from the endpoint
    ///
    /// If the cell is already loading, the call is ignored and the load in flight
    /// continues untouched. Otherwise the endpoint stream is started on the runtime
    /// and the cell is set to [`Loading`](LoadingResult::Loading) before returning,
    /// discarding any previous value or error.
    ///
    /// Failures of the endpoint are never returned here, they end up in the cell once
    /// applied. This only fails if there is no runtime to spawn the subscription on.
    pub fn trigger<P>(&mut self, endpoint: &P) -> Result<Trigger>
    where
        P: Endpoint<Output = T, Error = E> + ?Sized,
        T: Send + 'static,
        E: Send + 'static,
    {
        let description = endpoint.describe();
        if let Some(handle) = self.loading_handle() {
            debug!(endpoint = %description, id = handle.id(), "already loading");
            return Ok(Trigger::AlreadyLoading(handle.id()));
        }

        let runtime = match self.opts.runtime {
            Some(ref runtime) => runtime.clone(),
            None => Handle::try_current()?,
        };

        let id = next_id();
        let mut stream = endpoint.load();
        let tx = self.tx.clone();
        let (guard, exited) = exit_guard();
        let task = runtime.spawn(
            async move {
                // signals the handle however the task ends
                let _guard = guard;

                let outcome = match stream.next().await {
                    Some(Ok(value)) => {
                        Span::current().record("outcome", "loaded");
                        Outcome::Value(value)
                    }
                    Some(Err(err)) => {
                        Span::current().record("outcome", "failed");
                        Outcome::Failure(err)
                    }
                    None => {
                        Span::current().record("outcome", "finished");
                        Outcome::Finished
                    }
                };

                // the stream is not polled past its first item
                drop(stream);

                if let Err(e) = tx.send(id, outcome) {
                    trace!("discarding outcome: {e}");
                }
            }
            .instrument(span!(
                Level::DEBUG,
                "load",
                endpoint = %description,
                id,
                outcome = field::Empty
            )),
        );

        // any previous value or error is dropped here
        self.binding
            .set(LoadingResult::Loading(LoadHandle::new(
            id,
            task.abort_handle(),
            exited,
        )));
        debug!(endpoint = %description, id, "loading");

        Ok(Trigger::Started(id))
    }

    /// Set the cell back to [`Empty`](LoadingResult::Empty), returning the
    /// previous state
    ///
    /// A load in flight is cancelled if [`Opts`] say so. Its outcome, if already
    /// queued, is discarded.
    pub fn reset(&mut self) -> LoadingResult<T, E> {
        let prev = self.binding.set(LoadingResult::Empty);
        if self.opts.cancel_on_drop {
            if let Some(handle) = prev.handle() {
                handle.cancel();
            }
        }
        prev
    }

    /// Apply every outcome queued so far, without waiting
    ///
    /// Returns the number of outcomes that changed the cell.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the load in flight to deliver its outcome and apply it
    ///
    /// Returns immediately if the cell is not loading, and gives up if the load ends
    /// without delivering, because it was cancelled, the endpoint panicked or the
    /// runtime shut down. In that case the cell remains loading.
    pub async fn settle(&mut self) {
        while let Some(handle) = self.loading_handle() {
            let completion = tokio::select! {
                biased;
                completion = self.rx.recv() => completion,
                _ = handle.cancelled() => {
                    // an outcome may have been queued right before the abort
                    self.apply_pending();
                    return;
                }
                _ = handle.finished() => {
                    // the task queues its outcome before signaling the exit
                    if self.apply_pending() == 0 && self.is_loading() {
                        warn!(id = handle.id(), "load ended without an outcome, the cell remains loading");
                    }
                    return;
                }
            };

            let Some(completion) = completion else {
                return;
            };

            if self.apply(completion) {
                return;
            }
        }
    }

    /// Apply an outcome if it belongs to the load in flight
    fn apply(&mut self, completion: Completion<T, E>) -> bool {
        let Completion { id, outcome } = completion;
        if self.read(|state| state.handle().map(LoadHandle::id)) != Some(id) {
            trace!(id, "discarding outcome of a stale load");
            return false;
        }

        match outcome {
            Outcome::Value(value) => {
                self.binding.set(LoadingResult::Loaded(value));
                debug!(id, "loaded");
            }
            Outcome::Failure(err) => {
                self.binding.set(LoadingResult::Error(err));
                debug!(id, "load failed");
            }
            Outcome::Finished => {
                warn!(id, "endpoint stream finished without a value, the cell remains loading");
            }
        }
        true
    }
}

impl<T, E, B> Drop for LoadingCell<T, E, B>
where
    B: Binding<LoadingResult<T, E>>,
{
    fn drop(&mut self) {
        if !self.opts.cancel_on_drop {
            return;
        }

        if let Some(handle) = self.loading_handle() {
            trace!(id = handle.id(), "cell dropped, cancelling load");
            handle.cancel();

            // do not leave a binding owned elsewhere stuck on a dead load
            self.binding.set(LoadingResult::Empty);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;
    use tokio::time::sleep;
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::{prelude::*, EnvFilter};

    use super::*;
    use crate::endpoint::{from_fn, from_stream};

    fn init() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_thread_names(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE),
            )
            .with(EnvFilter::from_default_env())
            .try_init()
            .unwrap_or(());
    }

    /// A binding recording every state written to it
    #[derive(Default)]
    struct History {
        state: LoadingResult<i32, String>,
        writes: Vec<&'static str>,
    }

    impl Binding<LoadingResult<i32, String>> for History {
        fn read<R>(&self, f: impl FnOnce(&LoadingResult<i32, String>) -> R) -> R {
            f(&self.state)
        }

        fn set(&mut self, value: LoadingResult<i32, String>) -> LoadingResult<i32, String> {
            self.writes.push(match value {
                LoadingResult::Empty => "empty",
                LoadingResult::Loading(_) => "loading",
                LoadingResult::Loaded(_) => "loaded",
                LoadingResult::Error(_) => "error",
            });
            std::mem::replace(&mut self.state, value)
        }
    }

    #[tokio::test]
    async fn test_trigger_sets_loading_synchronously() {
        init();
        let endpoint = from_fn(|| async { Ok::<_, String>(1) });
        let mut cell = LoadingCell::new();

        let res = cell.trigger(&endpoint).unwrap();
        assert!(matches!(res, Trigger::Started(_)));
        assert!(cell.is_loading());

        // nothing is applied before the owner asks for it
        assert_eq!(cell.apply_pending(), 0);
        assert!(cell.is_loading());

        cell.settle().await;
        assert_eq!(cell.value(), Some(1));
    }

    #[tokio::test]
    async fn test_trigger_from_terminal_states() {
        init();
        let endpoint = from_fn(|| async { Ok::<_, String>(2) });

        for initial in [LoadingResult::Loaded(1), LoadingResult::Error("bad".to_string())] {
            let mut cell = LoadingCell::with_binding(initial);
            cell.trigger(&endpoint).unwrap();

            // previous value or error is discarded
            assert!(cell.is_loading());
            assert_eq!(cell.value(), None);
            assert!(!cell.is_error());

            cell.settle().await;
            assert_eq!(cell.read(|s| s.value().copied()), Some(2));
        }
    }

    #[tokio::test]
    async fn test_failure_ends_in_error() {
        init();
        let endpoint = from_fn(|| async { Err::<i32, _>("not found".to_string()) });
        let mut cell = LoadingCell::new();

        cell.trigger(&endpoint).unwrap();
        cell.settle().await;

        assert!(cell.is_error());
        assert_eq!(
            cell.read(|s| s.error().cloned()),
            Some("not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_trigger_while_loading_is_ignored() {
        init();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let endpoint = {
            let calls = calls.clone();
            let gate = gate.clone();
            from_fn(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                let gate = gate.clone();
                async move {
                    gate.notified().await;
                    Ok::<_, String>(42)
                }
            })
        };

        let mut cell = LoadingCell::new();
        let Trigger::Started(id) = cell.trigger(&endpoint).unwrap() else {
            panic!("load should have started");
        };
        let handle = cell.loading_handle().unwrap();

        // let the subscription start and wait on the gate
        sleep(Duration::from_millis(10)).await;
        assert_eq!(cell.trigger(&endpoint).unwrap(), Trigger::AlreadyLoading(id));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // the original load is untouched
        assert_eq!(cell.loading_handle(), Some(handle.clone()));
        assert!(!handle.is_cancelled());

        gate.notify_one();
        cell.settle().await;
        assert_eq!(cell.value(), Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transitions_are_written_in_order() {
        init();
        let succeed = from_fn(|| async { Ok::<i32, String>(1) });
        let fail = from_fn(|| async { Err::<i32, String>("failed".into()) });

        let mut cell = LoadingCell::with_binding(History::default());
        assert!(cell.read(LoadingResult::is_empty));

        cell.trigger(&succeed).unwrap();
        cell.settle().await;
        cell.trigger(&fail).unwrap();
        cell.settle().await;

        assert_eq!(cell.binding().writes, vec!["loading", "loaded", "loading", "error"]);
    }

    #[tokio::test]
    async fn test_observers_see_each_transition() {
        init();
        let endpoint = from_fn(|| async { Ok::<_, String>(5) });
        let mut cell = LoadingCell::new();
        let mut rx = cell.subscribe();

        cell.trigger(&endpoint).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_loading());

        cell.settle().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().value(), Some(&5));
    }

    #[tokio::test]
    async fn test_apply_pending_delivers_completed_loads() {
        init();
        let endpoint = from_fn(|| async { Ok::<_, String>(3) });
        let mut cell = LoadingCell::new();

        cell.trigger(&endpoint).unwrap();
        let handle = cell.loading_handle().unwrap();
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }

        assert_eq!(cell.apply_pending(), 1);
        assert_eq!(cell.value(), Some(3));
    }

    #[tokio::test]
    async fn test_stale_outcome_is_discarded() {
        init();
        let endpoint = from_fn(|| async { Ok::<_, String>(1) });
        let mut cell = LoadingCell::new().with_opts(Opts::default().cancel_on_drop(false));

        cell.trigger(&endpoint).unwrap();
        let first = cell.loading_handle().unwrap();
        while !first.is_finished() {
            tokio::task::yield_now().await;
        }

        // the first outcome is queued but the cell moves on
        cell.reset();
        let gate = Arc::new(Notify::new());
        let slow = {
            let gate = gate.clone();
            from_fn(move || {
                let gate = gate.clone();
                async move {
                    gate.notified().await;
                    Ok::<_, String>(2)
                }
            })
        };
        cell.trigger(&slow).unwrap();

        assert_eq!(cell.apply_pending(), 0);
        assert!(cell.is_loading());

        gate.notify_one();
        cell.settle().await;
        assert_eq!(cell.value(), Some(2));
    }

    #[tokio::test]
    async fn test_reset_cancels_load() {
        init();
        let endpoint = from_fn(|| async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, String>(1)
        });
        let mut cell = LoadingCell::new();

        cell.trigger(&endpoint).unwrap();
        let prev = cell.reset();

        let handle = prev.handle().unwrap();
        assert!(handle.is_cancelled());
        assert!(cell.read(LoadingResult::is_empty));
    }

    #[tokio::test]
    async fn test_drop_cancels_load() {
        init();
        let endpoint = from_fn(|| async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, String>(1)
        });
        let mut cell = LoadingCell::new();
        cell.trigger(&endpoint).unwrap();
        let handle = cell.loading_handle().unwrap();

        drop(cell);
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_keeps_load_running_when_configured() {
        init();
        let finished = Arc::new(Notify::new());
        let endpoint = {
            let finished = finished.clone();
            from_fn(move || {
                let finished = finished.clone();
                async move {
                    sleep(Duration::from_millis(10)).await;
                    finished.notify_one();
                    Ok::<_, String>(1)
                }
            })
        };
        let mut cell = LoadingCell::new().with_opts(Opts::default().cancel_on_drop(false));
        cell.trigger(&endpoint).unwrap();
        let handle = cell.loading_handle().unwrap();

        drop(cell);
        assert!(!handle.is_cancelled());

        // the subscription outlives the cell but has nowhere to write
        finished.notified().await;
    }

    #[tokio::test]
    async fn test_empty_stream_leaves_cell_loading() {
        init();
        let endpoint = from_stream(|| tokio_stream::empty::<std::result::Result<i32, String>>());
        let mut cell = LoadingCell::new();

        cell.trigger(&endpoint).unwrap();
        cell.settle().await;

        assert!(cell.is_loading());
        assert!(matches!(
            cell.trigger(&endpoint).unwrap(),
            Trigger::AlreadyLoading(_)
        ));

        cell.reset();
        assert!(cell.read(LoadingResult::is_empty));
    }

    #[tokio::test]
    async fn test_settle_returns_when_cancelled() {
        init();
        let endpoint = from_fn(|| async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, String>(1)
        });
        let mut cell = LoadingCell::new();
        cell.trigger(&endpoint).unwrap();

        let handle = cell.loading_handle().unwrap();
        tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });

        cell.settle().await;
        assert!(cell.is_loading());
    }

    #[tokio::test]
    async fn test_settle_returns_when_endpoint_panics() {
        init();
        let endpoint = from_fn(|| async {
            sleep(Duration::from_millis(10)).await;
            if true {
                panic!("endpoint blew up");
            }
            Ok::<i32, String>(1)
        });
        let mut cell = LoadingCell::new();
        cell.trigger(&endpoint).unwrap();

        let settled = tokio::time::timeout(Duration::from_secs(2), cell.settle()).await;
        assert!(settled.is_ok());
        assert!(cell.is_loading());
        assert!(cell.loading_handle().unwrap().is_finished());

        // reset recovers the cell
        cell.reset();
        let endpoint = from_fn(|| async { Ok::<i32, String>(2) });
        cell.trigger(&endpoint).unwrap();
        cell.settle().await;
        assert_eq!(cell.value(), Some(2));
    }

    #[test]
    fn test_settle_returns_after_runtime_shutdown() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let endpoint = from_fn(|| async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, String>(1)
        });
        let mut cell = LoadingCell::new().with_opts(Opts::default().runtime(rt.handle().clone()));
        cell.trigger(&endpoint).unwrap();

        rt.shutdown_timeout(Duration::from_millis(100));

        let local = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let settled = local.block_on(async {
            tokio::time::timeout(Duration::from_secs(2), cell.settle()).await
        });
        assert!(settled.is_ok());
        assert!(cell.is_loading());
    }

    #[tokio::test]
    async fn test_drop_clears_external_binding() {
        init();
        let slow = from_fn(|| async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, String>(1)
        });
        let mut slot: LoadingResult<i32, String> = LoadingResult::Empty;

        let handle = {
            let mut cell = LoadingCell::with_binding(&mut slot);
            cell.trigger(&slow).unwrap();
            let handle = cell.loading_handle().unwrap();
            handle
        };
        assert!(handle.is_cancelled());
        assert!(slot.is_empty());

        // a new cell on the same slot can load again
        let fast = from_fn(|| async { Ok::<_, String>(2) });
        let mut cell = LoadingCell::with_binding(&mut slot);
        assert!(matches!(cell.trigger(&fast).unwrap(), Trigger::Started(_)));
        cell.settle().await;
        drop(cell);
        assert_eq!(slot.value(), Some(&2));
    }

    #[tokio::test]
    async fn test_drop_keeps_external_binding_when_configured() {
        init();
        let slow = from_fn(|| async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, String>(1)
        });
        let mut slot: LoadingResult<i32, String> = LoadingResult::Empty;
        {
            let mut cell = LoadingCell::with_binding(&mut slot)
                .with_opts(Opts::default().cancel_on_drop(false));
            cell.trigger(&slow).unwrap();
        }
        assert!(slot.is_loading());
        assert!(!slot.handle().unwrap().is_cancelled());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_outcome_from_other_thread() {
        init();
        let endpoint = from_fn(|| async {
            tokio::task::spawn_blocking(|| 9).await.map_err(|e| e.to_string())
        });
        let mut cell = LoadingCell::new();

        cell.trigger(&endpoint).unwrap();
        cell.settle().await;
        assert_eq!(cell.value(), Some(9));
    }

    #[test]
    fn test_trigger_without_runtime_fails() {
        let endpoint = from_fn(|| async { Ok::<_, String>(1) });
        let mut cell = LoadingCell::new();

        assert!(cell.trigger(&endpoint).is_err());
        assert!(cell.read(LoadingResult::is_empty));
    }

    #[test]
    fn test_trigger_on_configured_runtime() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let endpoint = from_fn(|| async { Ok::<_, String>(4) });
        let mut cell = LoadingCell::new().with_opts(Opts::default().runtime(rt.handle().clone()));

        // called from outside the runtime
        cell.trigger(&endpoint).unwrap();
        assert!(cell.is_loading());

        rt.block_on(cell.settle());
        assert_eq!(cell.value(), Some(4));
    }
}
