//! The response handlers assemble, and its conversion into the outgoing
//! [`http::Response`].
//!
//! Handlers never build the final response themselves. They mutate a shared
//! [`ResponseContext`]; once the chain is done, [`normalize`] turns it into
//! exactly one `http::Response`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use serde_json::Value;

/// The outgoing response type.
pub type Response = http::Response<Full<Bytes>>;

/// A body a handler has set on the response.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    Text(String),
    /// Serialized on the way out; sets `content-type: application/json`
    /// unless a content type is already present. A bare `Value::String` is
    /// the exception and goes out as text.
    Json(Value),
}

impl From<String> for ResponseBody {
    fn from(s: String) -> Self { Self::Text(s) }
}

impl From<&str> for ResponseBody {
    fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<Value> for ResponseBody {
    fn from(v: Value) -> Self { Self::Json(v) }
}

/// An opaque protocol-upgrade handle (e.g. the client half of a WebSocket
/// pair) passed through to the outgoing response's extensions.
///
/// The hosting platform decides what goes in here and how to read it back.
#[derive(Clone)]
pub struct Upgrade(Arc<dyn Any + Send + Sync>);

impl Upgrade {
    pub fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Self(Arc::new(inner))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Upgrade(..)")
    }
}

/// Response state shared by every handler in a chain.
///
/// `headers` starts out holding the CORS headers when CORS is enabled.
#[derive(Debug, Default)]
pub struct ResponseContext {
    pub headers: HeaderMap,
    pub status: Option<StatusCode>,
    pub body: Option<ResponseBody>,
    /// A finished response returned verbatim; everything else is ignored.
    pub raw: Option<Response>,
    pub upgrade: Option<Upgrade>,
}

impl ResponseContext {
    pub(crate) fn with_headers(headers: HeaderMap) -> Self {
        Self { headers, ..Self::default() }
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = Some(status);
        self
    }

    pub fn text(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Some(ResponseBody::Text(body.into()));
        self
    }

    pub fn json(&mut self, body: Value) -> &mut Self {
        self.body = Some(ResponseBody::Json(body));
        self
    }

    /// Sets (replaces) a response header.
    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }
}

/// Statuses that never carry a body.
fn is_bodiless(status: StatusCode) -> bool {
    matches!(status.as_u16(), 101 | 204 | 205 | 304)
}

/// Converts the final response context into the outgoing response.
pub(crate) fn normalize(res: ResponseContext) -> Response {
    let ResponseContext { mut headers, status, body, raw, upgrade } = res;

    let body = match body {
        // A bare JSON string is sent as text, like any other string body.
        Some(ResponseBody::Json(Value::String(text))) => Some(text),
        Some(ResponseBody::Json(value)) => {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Some(value.to_string())
        }
        Some(ResponseBody::Text(text)) => Some(text),
        None => None,
    };

    if let Some(raw) = raw {
        return raw;
    }

    let body = body.filter(|b| !b.is_empty());
    let status = status.unwrap_or(if body.is_some() { StatusCode::OK } else { StatusCode::NO_CONTENT });
    let bytes = match body {
        Some(b) if !is_bodiless(status) => Bytes::from(b),
        _ => Bytes::new(),
    };

    let mut response = http::Response::new(Full::new(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    if let Some(upgrade) = upgrade {
        response.extensions_mut().insert(upgrade);
    }
    response
}

/// A bodiless response with the given status and headers.
pub(crate) fn empty(status: StatusCode, headers: HeaderMap) -> Response {
    let mut response = http::Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// A fixed-status response whose body is plain text, used for 404/500.
pub(crate) fn plain(status: StatusCode, body: Option<String>) -> Response {
    let bytes = body.map(Bytes::from).unwrap_or_default();
    let mut response = http::Response::new(Full::new(bytes));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_of(res: Response) -> Bytes {
        res.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn json_bodies_are_serialized_with_a_content_type() {
        let mut res = ResponseContext::default();
        res.json(json!({ "a": 1 }));
        let out = normalize(res);
        assert_eq!(out.status(), StatusCode::OK);
        assert_eq!(out.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_of(out).await, Bytes::from_static(br#"{"a":1}"#));
    }

    #[tokio::test]
    async fn explicit_content_type_is_kept() {
        let mut res = ResponseContext::default();
        res.header(CONTENT_TYPE, HeaderValue::from_static("application/problem+json"))
            .json(json!({ "title": "nope" }));
        let out = normalize(res);
        assert_eq!(out.headers()[CONTENT_TYPE], "application/problem+json");
    }

    #[tokio::test]
    async fn json_string_is_sent_as_text() {
        let mut res = ResponseContext::default();
        res.json(json!("hello"));
        let out = normalize(res);
        assert!(out.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(body_of(out).await, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn json_scalars_other_than_strings_are_serialized() {
        let mut res = ResponseContext::default();
        res.json(json!(42));
        let out = normalize(res);
        assert_eq!(out.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_of(out).await, Bytes::from_static(b"42"));
    }

    #[tokio::test]
    async fn text_bodies_get_no_implicit_content_type() {
        let mut res = ResponseContext::default();
        res.text("hello");
        let out = normalize(res);
        assert!(out.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(body_of(out).await, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn no_body_defaults_to_no_content() {
        let out = normalize(ResponseContext::default());
        assert_eq!(out.status(), StatusCode::NO_CONTENT);
        assert!(body_of(out).await.is_empty());
    }

    #[tokio::test]
    async fn empty_text_counts_as_no_body() {
        let mut res = ResponseContext::default();
        res.text("");
        assert_eq!(normalize(res).status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn bodiless_statuses_drop_the_body() {
        for code in [101, 204, 205, 304] {
            let mut res = ResponseContext::default();
            res.status(StatusCode::from_u16(code).unwrap()).json(json!({ "ok": true }));
            let out = normalize(res);
            assert_eq!(out.status().as_u16(), code);
            assert!(body_of(out).await.is_empty(), "status {code} kept its body");
        }
    }

    #[tokio::test]
    async fn raw_response_bypasses_everything() {
        let mut res = ResponseContext::default();
        res.status(StatusCode::IM_A_TEAPOT).text("ignored");
        res.raw = Some(plain(StatusCode::ACCEPTED, Some("raw".into())));
        let out = normalize(res);
        assert_eq!(out.status(), StatusCode::ACCEPTED);
        assert_eq!(body_of(out).await, Bytes::from_static(b"raw"));
    }

    #[test]
    fn upgrade_is_attached_to_extensions() {
        let mut res = ResponseContext::default();
        res.status(StatusCode::SWITCHING_PROTOCOLS);
        res.upgrade = Some(Upgrade::new("socket-7"));
        let out = normalize(res);
        let upgrade = out.extensions().get::<Upgrade>().unwrap();
        assert_eq!(upgrade.downcast_ref::<&str>(), Some(&"socket-7"));
    }
}
