use thiserror::Error;
use tokio::sync::mpsc;

/// How the endpoint stream ended
pub(crate) enum Outcome<T, E> {
    /// First item was a value
    Value(T),
    /// First item was a failure
    Failure(E),
    /// The stream ended without yielding
    Finished,
}

/// A load outcome tagged with the id of the load that produced it
pub(crate) struct Completion<T, E> {
    pub id: u64,
    pub outcome: Outcome<T, E>,
}

/// The sending half of a cell completion queue
///
/// Subscription tasks hold a clone and post their outcome here instead of writing
/// to the cell, which only the owner of the receiving half may do.
pub(crate) struct Sender<T, E> {
    inner: mpsc::UnboundedSender<Completion<T, E>>,
}

impl<T, E> Clone for Sender<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Sender<T, E> {
    /// Post the outcome of a load
    ///
    /// Fails if the receiving cell no longer exists.
    pub fn send(&self, id: u64, outcome: Outcome<T, E>) -> Result<(), SendError> {
        self.inner
            .send(Completion { id, outcome })
            .map_err(|_| SendError)
    }
}

pub(crate) type Receiver<T, E> = mpsc::UnboundedReceiver<Completion<T, E>>;

#[derive(Debug, Error)]
#[error("the receiving cell no longer exists")]
pub(crate) struct SendError;

/// Create a new completion queue
pub(crate) fn completion_queue<T, E>() -> (Sender<T, E>, Receiver<T, E>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender { inner: tx }, rx)
}
