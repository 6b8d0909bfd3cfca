//! Built-in middleware.
//!
//! Middleware are ordinary handlers registered with
//! [`Router::middleware`](crate::Router::middleware): they run before every
//! route's own handlers and decide whether, and when, to call `cx.next()`.
//!
//! - [`trace`]: per-request span with method, path, status and latency

mod trace;

pub use trace::trace;
