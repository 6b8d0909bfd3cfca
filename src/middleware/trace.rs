use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::context::Context;
use crate::handler::HandlerResult;

/// Logs one line per request once the rest of the chain has finished.
///
/// Register it first so the measured latency covers every other handler:
///
/// ```rust,no_run
/// # use waypost::{BoxError, Context, Router};
/// # async fn list(_: Context<()>) -> Result<(), BoxError> { Ok(()) }
/// let app = Router::new()
///     .middleware(waypost::middleware::trace)
///     .get("/items", list)
///     .build();
/// ```
///
/// The logged status is the one set on the response context, or `-` when a
/// handler left it to the default.
pub async fn trace<E: Send + Sync + 'static>(cx: Context<E>) -> HandlerResult {
    let (method, path) = {
        let req = cx.req();
        (req.method().clone(), req.path().to_owned())
    };
    let span = info_span!("request", %method, %path);
    let started = Instant::now();

    let result = cx.next().instrument(span.clone()).await;

    let status = cx.res().status.map_or_else(|| "-".to_owned(), |s| s.as_u16().to_string());
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    span.in_scope(|| match &result {
        Ok(()) => info!(%status, latency_ms, "request completed"),
        Err(e) => info!(error = %e, latency_ms, "request aborted"),
    });
    result
}
