//! Per-request state handlers read from.

use std::collections::HashMap;

use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Uri};
use serde_json::Value;

/// The decoded request body.
///
/// Which variant a handler sees is decided by the request's method and its
/// `Content-Type` / `Content-Encoding` headers.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Body {
    /// Non-mutating methods are never read.
    #[default]
    Empty,
    /// The body decoded as UTF-8 (lossy).
    Text(String),
    /// `application/json` content. An unparseable payload becomes an empty object.
    Json(Value),
    /// `Content-Encoding: gzip` content, still compressed.
    Raw(Bytes),
}

impl Body {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Bytes> {
        match self {
            Self::Raw(b) => Some(b),
            _ => None,
        }
    }
}

/// Everything known about the inbound request.
///
/// Built fresh for every call to [`App::handle`](crate::App::handle).
/// `params` and `query` are filled in by the route table when a route matches;
/// `body` and `raw_body` only for `POST`, `PUT` and `PATCH`.
#[derive(Debug)]
pub struct RequestContext {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) params: HashMap<String, String>,
    pub(crate) query: HashMap<String, String>,
    pub(crate) body: Body,
    pub(crate) raw_body: Bytes,
    pub(crate) extensions: Extensions,
}

impl RequestContext {
    pub(crate) fn new(method: Method, uri: Uri, headers: HeaderMap, extensions: Extensions) -> Self {
        Self {
            method,
            uri,
            headers,
            params: HashMap::new(),
            query: HashMap::new(),
            body: Body::Empty,
            raw_body: Bytes::new(),
            extensions,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Body { &self.body }
    pub fn raw_body(&self) -> &Bytes { &self.raw_body }

    /// Replaces the decoded body, e.g. after decompressing a [`Body::Raw`] payload.
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// Header lookup. Header names are case-insensitive; non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// Returns a query-string value. When a key repeats, the last occurrence wins.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn query(&self) -> &HashMap<String, String> { &self.query }

    /// Caller-supplied values: the inbound request's extensions plus the
    /// `extend` map passed to [`App::handle`](crate::App::handle).
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}
