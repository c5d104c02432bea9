use std::fmt;

use crate::handle::LoadHandle;

/// The lifecycle of a single asynchronous load
///
/// Exactly one variant is active at any time. A cell starts as [`Empty`](Self::Empty),
/// moves to [`Loading`](Self::Loading) when a load is triggered and ends in either
/// [`Loaded`](Self::Loaded) or [`Error`](Self::Error) once the endpoint delivers.
///
/// The error type defaults to [`anyhow::Error`].
pub enum LoadingResult<T, E = anyhow::Error> {
    /// No load has been started, or the cell was reset
    Empty,
    /// A load is in flight
    Loading(LoadHandle),
    /// The load produced a value
    Loaded(T),
    /// The load failed
    Error(E),
}

impl<T, E> Default for LoadingResult<T, E> {
    fn default() -> Self {
        LoadingResult::Empty
    }
}

impl<T, E> LoadingResult<T, E> {
    /// Returns the loaded value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            LoadingResult::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the result returning the loaded value, if any
    pub fn into_value(self) -> Option<T> {
        match self {
            LoadingResult::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure of the last load, if any
    pub fn error(&self) -> Option<&E> {
        match self {
            LoadingResult::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the cancellation handle of the in-flight load, if any
    pub fn handle(&self) -> Option<&LoadHandle> {
        match self {
            LoadingResult::Loading(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LoadingResult::Empty)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingResult::Loading(_))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadingResult::Loaded(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadingResult::Error(_))
    }

    pub fn as_ref(&self) -> LoadingResult<&T, &E> {
        match self {
            LoadingResult::Empty => LoadingResult::Empty,
            LoadingResult::Loading(handle) => LoadingResult::Loading(handle.clone()),
            LoadingResult::Loaded(value) => LoadingResult::Loaded(value),
            LoadingResult::Error(err) => LoadingResult::Error(err),
        }
    }

    /// Maps the loaded value, leaving every other variant untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadingResult<U, E> {
        match self {
            LoadingResult::Empty => LoadingResult::Empty,
            LoadingResult::Loading(handle) => LoadingResult::Loading(handle),
            LoadingResult::Loaded(value) => LoadingResult::Loaded(f(value)),
            LoadingResult::Error(err) => LoadingResult::Error(err),
        }
    }

    /// Maps the failure, leaving every other variant untouched
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> LoadingResult<T, F> {
        match self {
            LoadingResult::Empty => LoadingResult::Empty,
            LoadingResult::Loading(handle) => LoadingResult::Loading(handle),
            LoadingResult::Loaded(value) => LoadingResult::Loaded(value),
            LoadingResult::Error(err) => LoadingResult::Error(f(err)),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for LoadingResult<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadingResult::Empty => f.write_str("Empty"),
            LoadingResult::Loading(handle) => f.debug_tuple("Loading").field(&handle.id()).finish(),
            LoadingResult::Loaded(value) => f.debug_tuple("Loaded").field(value).finish(),
            LoadingResult::Error(err) => f.debug_tuple("Error").field(err).finish(),
        }
    }
}

impl<T: PartialEq, E: PartialEq> PartialEq for LoadingResult<T, E> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LoadingResult::Empty, LoadingResult::Empty) => true,
            (LoadingResult::Loading(a), LoadingResult::Loading(b)) => a == b,
            (LoadingResult::Loaded(a), LoadingResult::Loaded(b)) => a == b,
            (LoadingResult::Error(a), LoadingResult::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl<T: Eq, E: Eq> Eq for LoadingResult<T, E> {}
