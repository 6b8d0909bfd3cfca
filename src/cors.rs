//! Cross-origin resource sharing.
//!
//! When enabled, the four `Access-Control-*` headers are placed on every
//! response context before routing. An `OPTIONS` request that matches no
//! route is answered directly with those headers and
//! [`CorsConfig::options_success_status`], without running any handler.

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, HeaderName, HeaderValue,
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

/// CORS settings. Every field has a default, so a config file may name only
/// the fields it overrides.
///
/// A string field that is empty, or a `max_age` of `0`, suppresses its header.
///
/// ```rust
/// use waypost::CorsConfig;
///
/// let config = CorsConfig {
///     allow_origin: "https://app.example.com".into(),
///     ..CorsConfig::default()
/// };
/// assert_eq!(config.max_age, 86400);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    /// Seconds.
    pub max_age: u32,
    pub options_success_status: u16,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_owned(),
            allow_methods: "*".to_owned(),
            allow_headers: "*".to_owned(),
            max_age: 86400,
            options_success_status: 204,
        }
    }
}

/// A frozen [`CorsConfig`], with its headers rendered once at setup.
#[derive(Clone, Debug)]
pub(crate) struct Cors {
    headers: HeaderMap,
    preflight_status: StatusCode,
}

impl Cors {
    /// # Panics
    ///
    /// Panics if a field is not a valid header value or
    /// `options_success_status` is not a valid status code. Both are setup
    /// mistakes, caught before any traffic is served.
    pub(crate) fn new(config: CorsConfig) -> Self {
        let mut headers = HeaderMap::new();
        put(&mut headers, ACCESS_CONTROL_ALLOW_ORIGIN, &config.allow_origin);
        put(&mut headers, ACCESS_CONTROL_ALLOW_METHODS, &config.allow_methods);
        put(&mut headers, ACCESS_CONTROL_ALLOW_HEADERS, &config.allow_headers);
        if config.max_age != 0 {
            headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(config.max_age));
        }

        let preflight_status = StatusCode::from_u16(config.options_success_status)
            .unwrap_or_else(|e| panic!("invalid cors options_success_status `{}`: {e}", config.options_success_status));

        Self { headers, preflight_status }
    }

    /// The headers to seed every response context with.
    pub(crate) fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn preflight_status(&self) -> StatusCode {
        self.preflight_status
    }
}

fn put(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if value.is_empty() {
        return;
    }
    let value = HeaderValue::from_str(value)
        .unwrap_or_else(|e| panic!("invalid cors header `{name}: {value}`: {e}"));
    headers.insert(name, value);
}
