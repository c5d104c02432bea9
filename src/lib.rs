#![cfg_attr(docsrs, feature(doc_cfg))]
//! Bind asynchronous loads to observable state cells.
//!
//! A presentation layer usually wants to render one of four states for a piece of remote
//! data: nothing requested yet, loading, loaded, or failed. This crate models that as a
//! [`LoadingResult`] and provides a [`LoadingCell`] that drives it from an [`Endpoint`],
//! taking care of two things that are easy to get wrong by hand:
//!
//! - Re-entrancy. Triggering a cell that is already loading does nothing, the load in flight
//!   continues and no second request is made.
//! - Confinement. Endpoints run on the tokio runtime, on any thread, but their outcome is only
//!   ever written to the cell by its owner, when it calls [`LoadingCell::settle`] or
//!   [`LoadingCell::apply_pending`].
//!
//! # Example
//!
//! ```rust
//! use endpoint_loading::{endpoint, Endpoint, LoadingCell, LoadingResult, Trigger};
//!
//! # tokio_test::block_on(async {
//! let items = endpoint::from_fn(|| async { Ok::<_, anyhow::Error>(vec![1, 2, 3]) })
//!     .with_description("GET /items");
//!
//! let mut cell = LoadingCell::new();
//!
//! // renderers subscribe to changes
//! let rx = cell.subscribe();
//!
//! let Trigger::Started(id) = items.load_into(&mut cell).unwrap() else {
//!     unreachable!()
//! };
//!
//! // a second trigger while loading is ignored
//! assert_eq!(items.load_into(&mut cell).unwrap(), Trigger::AlreadyLoading(id));
//!
//! cell.settle().await;
//! assert!(matches!(&*rx.borrow(), LoadingResult::Loaded(v) if v == &[1, 2, 3]));
//! # })
//! ```
//!
//! # Cancellation
//!
//! While loading, the cell holds a [`LoadHandle`] that can abort the subscription. By
//! default the load is cancelled when the cell is reset or dropped, see [`Opts`].
//!
//! # Logging
//!
//! The crate emits [tracing](https://crates.io/crates/tracing) events and runs every
//! subscription inside a `load` span. With the `logging` feature, [`init_logging`]
//! forwards the load lifecycle to the [log](https://crates.io/crates/log) facade.

mod cell;
mod error;
mod handle;
mod result;

pub mod binding;
pub mod endpoint;

#[cfg(feature = "logging")]
mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::init as init_logging;

pub use binding::{Binding, Observable};
pub use cell::{LoadingCell, Opts, Trigger};
pub use endpoint::{Endpoint, LoadStream};
pub use error::{Error, Result};
pub use handle::LoadHandle;
pub use result::LoadingResult;
