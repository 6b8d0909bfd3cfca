//! # waypost
//!
//! An in-process HTTP router and middleware dispatcher for edge and
//! serverless handlers: one call in, one response out.
//!
//! ## Per request
//!
//! 1. **Route**: linear scan in registration order; `:name` segments bind
//!    parameters, the query string is parsed, the first match wins and a
//!    `*` route catches whatever is left.
//! 2. **CORS**: when enabled, `Access-Control-*` headers are seeded into
//!    every response, and unmatched `OPTIONS` preflights are answered
//!    without running any handler.
//! 3. **Decode**: `POST`/`PUT`/`PATCH` bodies are buffered once and exposed
//!    as text, JSON, or raw bytes for gzip payloads.
//! 4. **Chain**: global middleware then the route's handlers, one at a time,
//!    each deciding whether to call `cx.next()`.
//! 5. **Normalize**: the response context becomes exactly one
//!    `http::Response`: JSON bodies serialized, bodiless statuses emptied.
//!
//! What waypost intentionally leaves to the platform: streaming bodies,
//! timeouts and cancellation, decompression, and the transport itself
//! (though [`Server`] can host an [`App`] on a socket for local use).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use serde_json::json;
//! use waypost::{BoxError, Context, CorsConfig, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .middleware(waypost::middleware::trace)
//!         .cors(CorsConfig::default())
//!         .get("/users/:id", get_user)
//!         .post("/users", (require_token, create_user))
//!         .build();
//!
//!     Server::bind("0.0.0.0:3000").serve(app, ()).await.unwrap();
//! }
//!
//! async fn get_user(cx: Context<()>) -> Result<(), BoxError> {
//!     let id = cx.req().param("id").unwrap_or_default().to_owned();
//!     cx.res().json(json!({ "id": id }));
//!     Ok(())
//! }
//!
//! async fn require_token(cx: Context<()>) -> Result<(), BoxError> {
//!     if cx.req().header("authorization").is_none() {
//!         cx.res().status(StatusCode::UNAUTHORIZED);
//!         return Ok(());
//!     }
//!     cx.next().await
//! }
//!
//! async fn create_user(cx: Context<()>) -> Result<(), BoxError> {
//!     let name = cx.req().body().as_json().and_then(|b| b["name"].as_str()).map(str::to_owned);
//!     let mut res = cx.res();
//!     match name {
//!         Some(name) => res.status(StatusCode::CREATED).json(json!({ "name": name })),
//!         None => res.status(StatusCode::UNPROCESSABLE_ENTITY),
//!     };
//!     Ok(())
//! }
//! ```

mod app;
mod chain;
mod context;
mod cors;
mod decode;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod table;

pub mod health;
pub mod middleware;

pub use app::App;
pub use context::Context;
pub use cors::CorsConfig;
pub use error::{BoxError, Error};
pub use handler::{Handler, HandlerResult, IntoHandlers};
pub use request::{Body, RequestContext};
pub use response::{Response, ResponseBody, ResponseContext, Upgrade};
pub use router::Router;
pub use server::Server;
