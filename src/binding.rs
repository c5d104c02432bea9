//! Get/set access to the storage slot holding a loading state

use tokio::sync::watch;

use crate::result::LoadingResult;

/// Read and write access to a value owned elsewhere
///
/// A [`LoadingCell`](crate::LoadingCell) only talks to its state through this trait,
/// which lets the owner of the state decide where it lives and who gets notified
/// when it changes.
pub trait Binding<V> {
    /// Run `f` with a reference to the current value
    fn read<R>(&self, f: impl FnOnce(&V) -> R) -> R;

    /// Replace the current value, returning the previous one
    fn set(&mut self, value: V) -> V;
}

/// A bare storage slot, nobody is notified on change
impl<T, E> Binding<LoadingResult<T, E>> for LoadingResult<T, E> {
    fn read<R>(&self, f: impl FnOnce(&LoadingResult<T, E>) -> R) -> R {
        f(self)
    }

    fn set(&mut self, value: LoadingResult<T, E>) -> LoadingResult<T, E> {
        std::mem::replace(self, value)
    }
}

impl<V, B: Binding<V>> Binding<V> for &mut B {
    fn read<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        (**self).read(f)
    }

    fn set(&mut self, value: V) -> V {
        (**self).set(value)
    }
}

/// A value that notifies subscribers on every write
///
/// Writes go through [`Binding::set`]; renderers hold a [`watch::Receiver`] obtained
/// from [`Observable::subscribe`] and redraw whenever it reports a change.
#[derive(Debug)]
pub struct Observable<V> {
    tx: watch::Sender<V>,
}

impl<V: Default> Default for Observable<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V> Observable<V> {
    pub fn new(value: V) -> Self {
        let (tx, _) = watch::channel(value);
        Self { tx }
    }

    /// Create a new receiver for changes to the value
    ///
    /// The current value is marked as seen by the new receiver.
    pub fn subscribe(&self) -> watch::Receiver<V> {
        self.tx.subscribe()
    }

    /// Borrow the current value
    pub fn borrow(&self) -> watch::Ref<'_, V> {
        self.tx.borrow()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<V> Binding<V> for Observable<V> {
    fn read<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.tx.borrow())
    }

    fn set(&mut self, value: V) -> V {
        self.tx.send_replace(value)
    }
}
