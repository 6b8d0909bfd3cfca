//! The argument every handler receives.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::chain::{self, Chain};
use crate::handler::HandlerResult;
use crate::request::RequestContext;
use crate::response::ResponseContext;

/// Per-request state behind every [`Context`] of one chain run.
pub(crate) struct Shared<E> {
    pub(crate) env: E,
    pub(crate) req: Mutex<RequestContext>,
    pub(crate) res: Mutex<ResponseContext>,
    pub(crate) chain: Chain<E>,
}

impl<E> Shared<E> {
    pub(crate) fn new(env: E, req: RequestContext, res: ResponseContext, chain: Chain<E>) -> Self {
        Self { env, req: Mutex::new(req), res: Mutex::new(res), chain }
    }

    /// Takes the response out once the chain has finished.
    pub(crate) fn take_response(&self) -> ResponseContext {
        std::mem::take(&mut *self.res.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// A handler's view of the request in flight: the caller's environment, the
/// request, the response being assembled, and the continuation.
///
/// Cloning is cheap; every clone refers to the same request. The guards
/// returned by [`req`](Self::req) and [`res`](Self::res) are not `Send`, so
/// the compiler rejects holding one across `.await`, including across
/// `cx.next().await`.
///
/// ```rust,no_run
/// use http::StatusCode;
/// use waypost::{BoxError, Context};
///
/// async fn require_token(cx: Context<()>) -> Result<(), BoxError> {
///     let authorized = cx.req().header("authorization").is_some();
///     if !authorized {
///         cx.res().status(StatusCode::UNAUTHORIZED);
///         return Ok(()); // chain stops here
///     }
///     cx.next().await
/// }
/// ```
pub struct Context<E> {
    shared: Arc<Shared<E>>,
    step: usize,
}

impl<E> Clone for Context<E> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared), step: self.step }
    }
}

impl<E> Context<E> {
    pub(crate) fn new(shared: Arc<Shared<E>>, step: usize) -> Self {
        Self { shared, step }
    }

    /// The environment passed to [`App::handle`](crate::App::handle).
    pub fn env(&self) -> &E {
        &self.shared.env
    }

    pub fn req(&self) -> MutexGuard<'_, RequestContext> {
        self.shared.req.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn res(&self) -> MutexGuard<'_, ResponseContext> {
        self.shared.res.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Position of this handler in the chain, globals first.
    pub fn step(&self) -> usize {
        self.step
    }
}

impl<E: Send + Sync + 'static> Context<E> {
    /// Runs the rest of the chain and resolves when it has finished.
    ///
    /// Call it at most once. A second call resolves to
    /// [`Error::ContinuationReused`](crate::Error::ContinuationReused),
    /// which turns the whole request into a `500`.
    pub fn next(&self) -> impl Future<Output = HandlerResult> + Send + use<E> {
        chain::dispatch(&self.shared, self.step + 1)
    }
}
