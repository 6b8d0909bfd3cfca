//! Unified error type.

use std::any::Any;

use thiserror::Error;

/// The error type handlers return.
///
/// Anything that implements [`std::error::Error`] converts into it with `?`,
/// so handlers can propagate database, I/O or parse failures directly.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised by waypost itself.
///
/// Application-level outcomes (401, 422, ...) are written to the response
/// context by handlers. Every `Error` that reaches [`App::handle`](crate::App::handle)
/// becomes a `500`.
#[derive(Debug, Error)]
pub enum Error {
    /// A handler called [`Context::next`](crate::Context::next) more than
    /// once for the same step.
    #[error("continuation invoked more than once (step {step})")]
    ContinuationReused { step: usize },

    /// A handler panicked. Carries the panic message when it was a string.
    #[error("handler panicked: {message}")]
    HandlerPanicked { message: String },

    /// The request body could not be read.
    #[error("failed to read request body")]
    Body(#[source] BoxError),

    /// The query string could not be decoded.
    #[error("invalid query string")]
    Query(#[from] serde_urlencoded::de::Error),

    /// Binding or accepting on the listening socket failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds [`Error::HandlerPanicked`] from a `catch_unwind` payload.
    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast_ref::<&'static str>() {
                Some(s) => (*s).to_owned(),
                None => "non-string panic payload".to_owned(),
            },
        };
        Error::HandlerPanicked { message }
    }

    /// Renders the error and its `source()` chain, one cause per line.
    ///
    /// Used as the response body of a `500` in debug mode.
    pub(crate) fn report(err: &(dyn std::error::Error + 'static)) -> String {
        let mut out = err.to_string();
        let mut cause = err.source();
        while let Some(e) = cause {
            out.push_str("\ncaused by: ");
            out.push_str(&e.to_string());
            cause = e.source();
        }
        out
    }
}
