//! Endpoint trait and implementations

use std::future::Future;
use std::pin::Pin;

use tokio_stream::Stream;

use crate::binding::Binding;
use crate::cell::{LoadingCell, Trigger};
use crate::error::Result;
use crate::result::LoadingResult;

/// A boxed stream of load outcomes that endpoints produce
pub type LoadStream<T, E> = Pin<Box<dyn Stream<Item = std::result::Result<T, E>> + Send + 'static>>;

/// A producer of asynchronous values
///
/// Calling [`load`](Endpoint::load) begins the operation. The returned stream is
/// expected to eventually yield exactly one item, either the produced value or the
/// failure. Only the first item is ever consumed.
pub trait Endpoint {
    type Output: Send + 'static;
    type Error: Send + 'static;

    /// Begin producing the stream
    fn load(&self) -> LoadStream<Self::Output, Self::Error>;

    /// A human readable description, used for diagnostics
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Load into the given cell
    ///
    /// This is the same as calling [`LoadingCell::trigger`] with this endpoint.
    fn load_into<B>(&self, cell: &mut LoadingCell<Self::Output, Self::Error, B>) -> Result<Trigger>
    where
        Self: Sized,
        B: Binding<LoadingResult<Self::Output, Self::Error>>,
    {
        cell.trigger(self)
    }
}

/// An endpoint created from a function returning a future
///
/// See [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F> {
    f: F,
    description: Option<String>,
}

/// Create an endpoint from a function returning a future
///
/// The function is called once per load.
///
/// ```rust
/// use endpoint_loading::endpoint::{self, Endpoint};
///
/// let user = endpoint::from_fn(|| async { Ok::<_, anyhow::Error>("alice") })
///     .with_description("GET /user");
/// assert_eq!(user.describe(), "GET /user");
/// ```
pub fn from_fn<F, Fut, T, E>(f: F) -> FromFn<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
{
    FromFn {
        f,
        description: None,
    }
}

impl<F> FromFn<F> {
    /// Set the description used on diagnostics
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }
}

impl<F, Fut, T, E> Endpoint for FromFn<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn load(&self) -> LoadStream<T, E> {
        Box::pin(futures::stream::once((self.f)()))
    }

    fn describe(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| std::any::type_name::<F>().to_string())
    }
}

/// An endpoint created from a function returning a stream
///
/// See [`from_stream`].
#[derive(Clone)]
pub struct FromStream<F> {
    f: F,
    description: Option<String>,
}

/// Create an endpoint from a function returning a stream
///
/// The function is called once per load, and only the first item of the stream
/// is used.
pub fn from_stream<F, S, T, E>(f: F) -> FromStream<F>
where
    F: Fn() -> S,
    S: Stream<Item = std::result::Result<T, E>> + Send + 'static,
{
    FromStream {
        f,
        description: None,
    }
}

impl<F> FromStream<F> {
    /// Set the description used on diagnostics
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }
}

impl<F, S, T, E> Endpoint for FromStream<F>
where
    F: Fn() -> S,
    S: Stream<Item = std::result::Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn load(&self) -> LoadStream<T, E> {
        Box::pin((self.f)())
    }

    fn describe(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| std::any::type_name::<F>().to_string())
    }
}
