//! The serving half: one call to [`App::handle`] per request.
//!
//! ```text
//! route table ─┬─ no match ─┬─ OPTIONS + CORS ─► preflight response
//!              │            └─ otherwise ──────► 404
//!              └─ match ─► decode body ─► chain ─► normalize ─► response
//! ```
//!
//! Any error along the way becomes a `500`, and so does a handler panic.
//! Nothing is sent before the chain finishes, so the error response always
//! replaces whatever was assembled.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use futures::FutureExt;
use http::{Extensions, HeaderMap, Method, Request, StatusCode};
use tracing::{debug, error, warn};

use crate::chain::{self, Chain};
use crate::context::Shared;
use crate::cors::Cors;
use crate::decode::decode;
use crate::error::{BoxError, Error};
use crate::handler::BoxedHandler;
use crate::request::RequestContext;
use crate::response::{self, Response, ResponseContext};
use crate::table::RouteTable;

const NOT_FOUND_REASON: &str = "route not found";

/// A frozen router, ready to serve.
///
/// Built by [`Router::build`](crate::Router::build). Shared read-only between
/// concurrent requests; each request gets its own request and response state.
pub struct App<E = ()> {
    table: RouteTable<E>,
    global: Arc<[BoxedHandler<E>]>,
    cors: Option<Cors>,
    debug: bool,
}

impl<E: Send + Sync + 'static> App<E> {
    pub(crate) fn new(table: RouteTable<E>, global: Arc<[BoxedHandler<E>]>, cors: Option<Cors>, debug: bool) -> Self {
        Self { table, global, cors, debug }
    }

    // ── Entry point ───────────────────────────────────────────────────────────

    /// Routes one request and produces its response. Never fails: errors
    /// and handler panics become a `500`.
    ///
    /// `extend` is merged into the request's extensions and is visible to
    /// handlers through [`RequestContext::extensions`].
    pub async fn handle<B>(&self, env: E, request: Request<B>, extend: Extensions) -> Response
    where
        B: http_body::Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        match self.dispatch(env, request, extend).await {
            Ok(response) => response,
            Err(e) => {
                let report = Error::report(&*e);
                // Misuse of the chain is a programming error, not a runtime
                // failure, so it gets its own message.
                match e.downcast_ref::<Error>() {
                    Some(Error::ContinuationReused { step }) => {
                        error!(%method, %path, step, "handler called next() more than once");
                    }
                    Some(Error::HandlerPanicked { message }) => {
                        error!(%method, %path, panic = %message, "handler panicked");
                    }
                    _ => error!(%method, %path, error = %report, "request failed"),
                }
                response::plain(StatusCode::INTERNAL_SERVER_ERROR, self.debug.then_some(report))
            }
        }
    }

    async fn dispatch<B>(&self, env: E, request: Request<B>, extend: Extensions) -> Result<Response, BoxError>
    where
        B: http_body::Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = request.into_parts();
        // Caller-supplied extensions win over the inbound request's own.
        let mut extensions = parts.extensions;
        extensions.extend(extend);
        let mut req = RequestContext::new(parts.method, parts.uri, parts.headers, extensions);

        // CORS headers are seeded before routing so every handler sees them
        // and may overwrite them.
        let headers = self.cors.as_ref().map(|c| c.headers().clone()).unwrap_or_default();

        let Some(route) = self.table.find(&mut req)? else {
            return Ok(self.unmatched(&req, headers));
        };

        // The body is read once, only for methods that carry one.
        decode(&mut req, body).await?;

        let chain = Chain::new(Arc::clone(&self.global), Arc::clone(route.handlers()));
        debug!(
            method = %req.method,
            path = req.path(),
            route = %route.method(),
            pattern = route.pattern(),
            handlers = chain.len(),
            "route matched"
        );

        let shared = Arc::new(Shared::new(env, req, ResponseContext::with_headers(headers), chain));

        // A panic anywhere in the chain unwinds through the nested `next()`
        // futures to here.
        AssertUnwindSafe(chain::dispatch(&shared, 0))
            .catch_unwind()
            .await
            .map_err(Error::panicked)??;
        debug!(steps = shared.chain.started(), "chain finished");

        Ok(response::normalize(shared.take_response()))
    }

    // ── Fallbacks ─────────────────────────────────────────────────────────────

    /// Nothing matched: either a CORS preflight or a 404.
    fn unmatched(&self, req: &RequestContext, headers: HeaderMap) -> Response {
        if let Some(cors) = &self.cors {
            if req.method == Method::OPTIONS {
                debug!(path = req.path(), "answering cors preflight");
                return response::empty(cors.preflight_status(), headers);
            }
        }
        warn!(method = %req.method, path = req.path(), "{NOT_FOUND_REASON}");
        response::plain(StatusCode::NOT_FOUND, self.debug.then(|| NOT_FOUND_REASON.to_owned()))
    }

    /// Number of registered routes.
    pub fn routes(&self) -> usize {
        self.table.len()
    }
}
