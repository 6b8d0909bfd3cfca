//! Minimal waypost example: JSON endpoints, an auth middleware, CORS and
//! health checks.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42?fields=name
//!   curl -X POST http://localhost:3000/users \
//!        -H 'authorization: Bearer t0ken' \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl -X OPTIONS -i http://localhost:3000/users
//!   curl http://localhost:3000/healthz

use http::StatusCode;
use serde_json::json;
use waypost::{BoxError, Context, CorsConfig, Router, Server, health, middleware};

/// Shared by every request; cloned per request by the server.
#[derive(Clone)]
struct Env {
    api_version: &'static str,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .middleware(middleware::trace)
        .cors(CorsConfig::default())
        .get("/users/:id", get_user)
        .post("/users", (require_token, create_user))
        .delete("/users/:id", (require_token, delete_user))
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
        .debug(true)
        .build();

    Server::bind("0.0.0.0:3000")
        .serve(app, Env { api_version: "v1" })
        .await
        .expect("server error");
}

// GET /users/:id
async fn get_user(cx: Context<Env>) -> Result<(), BoxError> {
    let body = {
        let req = cx.req();
        json!({
            "id": req.param("id"),
            "fields": req.query_param("fields"),
            "api": cx.env().api_version,
        })
    };
    cx.res().json(body);
    Ok(())
}

// Stops the chain with 401 unless an authorization header is present.
async fn require_token(cx: Context<Env>) -> Result<(), BoxError> {
    if cx.req().header("authorization").is_none() {
        cx.res().status(StatusCode::UNAUTHORIZED).json(json!({ "error": "missing token" }));
        return Ok(());
    }
    cx.next().await
}

// POST /users
//
// The body arrives already parsed because of the JSON content type. A body
// that fails to parse shows up as an empty object.
async fn create_user(cx: Context<Env>) -> Result<(), BoxError> {
    let name = cx.req().body().as_json().and_then(|b| b["name"].as_str()).map(str::to_owned);

    let mut res = cx.res();
    match name {
        Some(name) => res.status(StatusCode::CREATED).json(json!({ "id": "99", "name": name })),
        None => res.status(StatusCode::UNPROCESSABLE_ENTITY).json(json!({ "error": "name is required" })),
    };
    Ok(())
}

// DELETE /users/:id → 204 No Content
async fn delete_user(_cx: Context<Env>) -> Result<(), BoxError> {
    Ok(())
}
