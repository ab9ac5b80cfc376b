//! Request descriptor for a single API call

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Payload sent with a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RequestBody {
    /// Structured JSON, sent with `Content-Type: application/json`
    Json(Value),
    /// Pre-serialized text, sent as-is (JSON content type unless overridden)
    Raw(String),
    /// Multipart form fields; the encoder chooses the content type
    Form(Vec<(String, String)>),
}

/// Options recognized by [`ApiClient::fetch`](super::ApiClient::fetch)
///
/// Only `method`, `headers` and `body` shape the request on the wire, so only
/// they take part in the cache key. The remaining fields steer how the client
/// treats the call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// HTTP verb
    pub method: Method,
    /// Header name (lowercased) to value
    pub headers: BTreeMap<String, String>,
    /// Optional request payload
    pub body: Option<RequestBody>,
    /// Force a network call and skip the cache write
    pub no_cache: bool,
    /// Value returned instead of an error when the call fails
    pub fallback_data: Option<Value>,
    /// UI region whose loading indicator wraps the call
    pub target_id: Option<String>,
    /// Per-call override of the configured timeout
    pub timeout: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: BTreeMap::new(),
            body: None,
            no_cache: false,
            fallback_data: None,
            target_id: None,
            timeout: None,
        }
    }
}

impl FetchOptions {
    /// A plain GET
    pub fn get() -> Self {
        Self::default()
    }

    /// A POST without a body yet
    pub fn post() -> Self {
        Self::default().method(Method::POST)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a header; names are case-insensitive and stored lowercased
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ));
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    pub fn fallback(mut self, data: Value) -> Self {
        self.fallback_data = Some(data);
        self
    }

    pub fn target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cache key for this request against an already resolved URL
    pub fn cache_key(&self, url: &str) -> String {
        #[derive(Serialize)]
        struct KeyParts<'a> {
            method: &'a str,
            headers: &'a BTreeMap<String, String>,
            body: &'a Option<RequestBody>,
        }

        let parts = KeyParts {
            method: self.method.as_str(),
            headers: &self.headers,
            body: &self.body,
        };
        // Maps with string keys always serialize.
        let serialized = serde_json::to_string(&parts).unwrap_or_default();
        format!("{}{}", url, serialized)
    }
}
