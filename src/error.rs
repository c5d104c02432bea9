use thiserror::Error;

/// Errors returned when a load cannot be started
///
/// Producer failures are never reported through this type, they are stored in the
/// [`Error`](crate::LoadingResult::Error) variant of the cell instead.
#[derive(Debug, Error)]
pub enum Error {
    /// No tokio runtime was configured in [`Opts`](crate::Opts) and the trigger was
    /// called outside of a runtime context
    #[error("no async runtime available to drive the load: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

pub type Result<T> = std::result::Result<T, Error>;
