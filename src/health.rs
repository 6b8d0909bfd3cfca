//! Built-in health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve traffic? Failure → pulled from the load-balancer. |
//!
//! ```rust,no_run
//! use waypost::{Router, health};
//!
//! let app = Router::<()>::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness)
//!     .build();
//! ```
//!
//! Replace `readiness` with your own handler to gate on dependencies.

use crate::context::Context;
use crate::handler::HandlerResult;

/// Always `200 OK` with body `"ok"`. Ends the chain.
pub async fn liveness<E>(cx: Context<E>) -> HandlerResult {
    cx.res().text("ok");
    Ok(())
}

/// `200 OK` with body `"ready"`. Ends the chain.
pub async fn readiness<E>(cx: Context<E>) -> HandlerResult {
    cx.res().text("ready");
    Ok(())
}
