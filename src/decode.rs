//! Request body pre-decoding.
//!
//! Runs once per request, before the middleware chain, and only for `POST`,
//! `PUT` and `PATCH`. The whole body is buffered; there is no streaming.
//!
//! | condition                           | `req.body`                        |
//! |-------------------------------------|-----------------------------------|
//! | default                             | [`Body::Text`], lossy UTF-8       |
//! | `Content-Type: application/json`    | [`Body::Json`], `{}` if unparseable |
//! | `Content-Encoding: gzip`            | [`Body::Raw`], still compressed   |
//!
//! Decompression is left to handlers.

use bytes::Bytes;
use http::HeaderMap;
use http::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderName};
use http_body_util::BodyExt;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BoxError, Error};
use crate::method::carries_body;
use crate::request::{Body, RequestContext};

/// Buffers `body` into `req` if the request method carries one.
pub(crate) async fn decode<B>(req: &mut RequestContext, body: B) -> Result<(), Error>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if !carries_body(&req.method) {
        return Ok(());
    }

    let raw = body
        .collect()
        .await
        .map_err(|e| Error::Body(e.into()))?
        .to_bytes();

    apply(req, raw);
    Ok(())
}

fn apply(req: &mut RequestContext, raw: Bytes) {
    let text = String::from_utf8_lossy(&raw).into_owned();

    req.body = if media_token(&req.headers, &CONTENT_TYPE) == Some("application/json") {
        match serde_json::from_str(&text) {
            Ok(value) => Body::Json(value),
            Err(e) => {
                debug!(error = %e, "malformed json body, substituting empty object");
                Body::Json(Value::Object(Map::new()))
            }
        }
    } else {
        Body::Text(text)
    };

    if media_token(&req.headers, &CONTENT_ENCODING) == Some("gzip") {
        req.body = Body::Raw(raw.clone());
    }

    req.raw_body = raw;
}

/// First `;`-delimited token of a header value, trimmed.
fn media_token<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    let value = headers.get(name)?.to_str().ok()?;
    value.split(';').next().map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Extensions, Method, Uri};
    use http_body_util::Full;
    use serde_json::json;

    fn request(method: Method, headers: &[(&'static str, &'static str)]) -> RequestContext {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.insert(*k, v.parse().unwrap());
        }
        RequestContext::new(method, Uri::from_static("/"), map, Extensions::new())
    }

    async fn decoded(mut req: RequestContext, payload: &'static [u8]) -> RequestContext {
        decode(&mut req, Full::new(Bytes::from_static(payload))).await.unwrap();
        req
    }

    #[tokio::test]
    async fn get_bodies_are_never_read() {
        let req = decoded(request(Method::GET, &[]), b"ignored").await;
        assert_eq!(req.body, Body::Empty);
        assert!(req.raw_body.is_empty());
    }

    #[tokio::test]
    async fn plain_bodies_decode_as_text() {
        let req = decoded(request(Method::PUT, &[("content-type", "text/plain")]), b"hello").await;
        assert_eq!(req.body, Body::Text("hello".into()));
        assert_eq!(req.raw_body, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn json_parameters_after_semicolon_are_ignored() {
        let headers = [("content-type", " application/json ; charset=utf-8")];
        let req = decoded(request(Method::POST, &headers), br#"{"a":1}"#).await;
        assert_eq!(req.body, Body::Json(json!({ "a": 1 })));
    }

    #[tokio::test]
    async fn malformed_json_becomes_an_empty_object() {
        let headers = [("content-type", "application/json")];
        let req = decoded(request(Method::PATCH, &headers), b"{").await;
        assert_eq!(req.body, Body::Json(json!({})));
        assert_eq!(req.raw_body, Bytes::from_static(b"{"));
    }

    #[tokio::test]
    async fn json_media_type_must_match_exactly() {
        let headers = [("content-type", "application/json-patch+json")];
        let req = decoded(request(Method::POST, &headers), b"[]").await;
        assert_eq!(req.body, Body::Text("[]".into()));
    }

    #[tokio::test]
    async fn gzip_keeps_the_compressed_bytes() {
        let headers = [("content-type", "application/json"), ("content-encoding", "gzip")];
        let req = decoded(request(Method::POST, &headers), b"\x1f\x8b\x08\x00").await;
        assert_eq!(req.body, Body::Raw(Bytes::from_static(b"\x1f\x8b\x08\x00")));
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let req = decoded(request(Method::POST, &[]), b"ok\xff").await;
        assert_eq!(req.body, Body::Text("ok\u{fffd}".into()));
    }
}
