//! The middleware chain: global handlers followed by the matched route's
//! handlers, run strictly one after another.
//!
//! There is no recursion through closures. The chain keeps a cursor (the
//! number of steps started so far) and each [`Context`] knows its own step
//! index. `cx.next()` asks the chain to start `step + 1`; asking for a step
//! that has already been started means a handler called its continuation
//! twice, which fails the request with [`Error::ContinuationReused`].

use std::future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::context::{Context, Shared};
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};

// ── Chain ─────────────────────────────────────────────────────────────────────

pub(crate) struct Chain<E> {
    // Both slices are shared with the `App`; only the cursor is per request.
    global: Arc<[BoxedHandler<E>]>,
    route: Arc<[BoxedHandler<E>]>,
    started: AtomicUsize,
}

impl<E> Chain<E> {
    pub(crate) fn new(global: Arc<[BoxedHandler<E>]>, route: Arc<[BoxedHandler<E>]>) -> Self {
        Self { global, route, started: AtomicUsize::new(0) }
    }

    pub(crate) fn len(&self) -> usize {
        self.global.len() + self.route.len()
    }

    /// Steps started so far.
    pub(crate) fn started(&self) -> usize {
        self.started.load(Ordering::Acquire)
    }

    fn get(&self, step: usize) -> Option<&BoxedHandler<E>> {
        // Globals occupy the first steps, route handlers follow.
        match step.checked_sub(self.global.len()) {
            None => self.global.get(step),
            Some(i) => self.route.get(i),
        }
    }

    /// Moves the cursor to `step`, refusing steps at or before the last one started.
    fn claim(&self, step: usize) -> Result<(), Error> {
        // `fetch_max` both reads and advances the cursor in one step, so two
        // racing `next()` calls cannot both claim the same handler.
        let prev = self.started.fetch_max(step + 1, Ordering::AcqRel);
        if prev > step {
            // Report the handler that called `next()`, not the one it asked for.
            return Err(Error::ContinuationReused { step: step.saturating_sub(1) });
        }
        Ok(())
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Starts `step` of the chain owned by `shared`.
///
/// Past the last handler this resolves immediately: the chain is complete.
pub(crate) fn dispatch<E>(shared: &Arc<Shared<E>>, step: usize) -> BoxFuture
where
    E: Send + Sync + 'static,
{
    if let Err(e) = shared.chain.claim(step) {
        return Box::pin(future::ready(Err(e.into())));
    }
    match shared.chain.get(step) {
        // Every handler gets its own `Context`, pointing at the same request.
        Some(handler) => handler.call(Context::new(Arc::clone(shared), step)),
        None => Box::pin(future::ready(Ok(()))),
    }
}
