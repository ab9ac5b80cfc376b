//! Fetch wrapper for the trade statistics API
//!
//! One call makes at most one network attempt. Around that attempt the client
//! adds a deadline, the shared response cache, failure classification,
//! fallback substitution and the loading indicator for the call's target
//! region. Nothing is retried automatically; [`ApiClient::repeat_last`] is the
//! explicit way to try again.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use super::cache::ResponseCache;
use super::error::FetchError;
use super::indicator::{LoadingGuard, LoadingIndicator, NoopIndicator};
use super::notify::{LogNotifier, Notice, NoticeLevel, Notifier};
use super::options::{FetchOptions, RequestBody};
use crate::config::ApiConfig;

/// Shared online/offline flag
///
/// Hosts that learn about connectivity changes (a network monitor, a UI
/// toggle) flip it; while offline, calls fail fast with
/// [`FetchError::Offline`] instead of waiting on the network.
#[derive(Debug, Clone)]
pub struct Connectivity {
    online: Arc<AtomicBool>,
}

impl Default for Connectivity {
    fn default() -> Self {
        Self {
            online: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl Connectivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Client for the trade statistics API
///
/// Clones share the HTTP connection pool, the response cache, the
/// connectivity flag and the last-request slot.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    cache: ResponseCache,
    connectivity: Connectivity,
    indicator: Arc<dyn LoadingIndicator>,
    notifier: Arc<dyn Notifier>,
    last_request: Arc<Mutex<Option<(String, FetchOptions)>>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("cached_entries", &self.cache.len())
            .field("online", &self.connectivity.is_online())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client with its own empty cache and silent UI hooks
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            cache: ResponseCache::new(),
            connectivity: Connectivity::new(),
            indicator: Arc::new(NoopIndicator),
            notifier: Arc::new(LogNotifier),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Uses a custom HTTP client
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_indicator(mut self, indicator: Arc<dyn LoadingIndicator>) -> Self {
        self.indicator = indicator;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Fetches `endpoint` and returns its parsed JSON body
    ///
    /// # Behavior
    /// - Shows the indicator for `options.target_id` until the call returns
    /// - Returns the cached value for an identical request unless `no_cache`
    /// - Otherwise makes one network attempt bounded by the timeout
    /// - Stores successful responses unless `no_cache`
    /// - On failure, logs and notifies, then returns `fallback_data` if set
    pub async fn fetch(
        &self,
        endpoint: &str,
        options: FetchOptions,
    ) -> Result<Arc<Value>, FetchError> {
        self.fetch_with(endpoint, options, |value| Ok(Arc::clone(value)))
            .await
    }

    /// Fetches `endpoint` and deserializes the body into `T`
    ///
    /// A body that does not match `T` counts as a parse failure: it is not
    /// cached, and a supplied fallback replaces it.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: FetchOptions,
    ) -> Result<T, FetchError> {
        self.fetch_with(endpoint, options, |value| T::deserialize(&**value))
            .await
    }

    /// Shared body of [`Self::fetch`] and [`Self::fetch_json`]
    ///
    /// `decode` runs before anything is cached, so only responses the caller
    /// can use are stored. Each failed call is reported once.
    async fn fetch_with<T, F>(
        &self,
        endpoint: &str,
        options: FetchOptions,
        decode: F,
    ) -> Result<T, FetchError>
    where
        F: Fn(&Arc<Value>) -> Result<T, serde_json::Error>,
    {
        self.remember(endpoint, &options);

        let url = self.config.resolve(endpoint);
        let _loading = LoadingGuard::acquire(
            Arc::clone(&self.indicator),
            options.target_id.as_deref(),
        );

        let key = options.cache_key(&url);
        if !options.no_cache {
            if let Some(cached) = self.cache.read(&key) {
                match decode(&cached.data) {
                    Ok(data) => {
                        debug!(url = %url, cached_at = %cached.cached_at, "cache hit");
                        return Ok(data);
                    }
                    Err(err) => debug!(url = %url, error = %err, "cached entry has another shape"),
                }
            }
        }

        let outcome = match self.perform(&url, &options).await {
            Ok(value) => {
                let value = Arc::new(value);
                decode(&value)
                    .map(|data| (data, value))
                    .map_err(FetchError::from)
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok((data, value)) => {
                if !options.no_cache {
                    self.cache.write(key, value);
                }
                Ok(data)
            }
            Err(err) => {
                self.report(&url, &err, options.fallback_data.is_some());
                match options.fallback_data {
                    Some(fallback) => Ok(decode(&Arc::new(fallback))?),
                    None => Err(err),
                }
            }
        }
    }

    /// The most recent request made through this client or its clones
    pub fn last_request(&self) -> Option<(String, FetchOptions)> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Issues the most recent request again
    ///
    /// Returns `None` if nothing has been requested yet.
    pub async fn repeat_last(&self) -> Option<Result<Arc<Value>, FetchError>> {
        let (endpoint, options) = self.last_request()?;
        debug!(endpoint = %endpoint, "repeating last request");
        Some(self.fetch(&endpoint, options).await)
    }

    fn remember(&self, endpoint: &str, options: &FetchOptions) {
        let mut slot = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some((endpoint.to_string(), options.clone()));
    }

    fn report(&self, url: &str, err: &FetchError, fell_back: bool) {
        warn!(url = %url, kind = err.kind(), error = %err, fell_back, "request failed");
        let level = if fell_back {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        self.notifier.notify(&Notice::new(level, err.user_message()));
    }

    async fn perform(&self, url: &str, options: &FetchOptions) -> Result<Value, FetchError> {
        if !self.connectivity.is_online() {
            return Err(FetchError::Offline("client is offline".to_string()));
        }

        let timeout = options.timeout.unwrap_or(self.config.timeout);
        let request = self.build_request(url, options);
        debug!(url = %url, method = %options.method, timeout_ms = timeout.as_millis() as u64, "request");

        match tokio::time::timeout(timeout, exchange(request, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    }

    fn build_request(&self, url: &str, options: &FetchOptions) -> RequestBuilder {
        let mut request = self
            .http
            .request(options.method.clone(), url)
            .header(ACCEPT, "application/json");

        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        match &options.body {
            Some(RequestBody::Json(body)) => request.json(body),
            Some(RequestBody::Raw(body)) => {
                if !options.headers.contains_key("content-type") {
                    request = request.header(CONTENT_TYPE, "application/json");
                }
                request.body(body.clone())
            }
            Some(RequestBody::Form(fields)) => {
                let form = fields
                    .iter()
                    .fold(multipart::Form::new(), |form, (name, value)| {
                        form.text(name.clone(), value.clone())
                    });
                request.multipart(form)
            }
            None => request,
        }
    }
}

/// Sends the request and classifies the outcome
async fn exchange(request: RequestBuilder, timeout: Duration) -> Result<Value, FetchError> {
    let response = request
        .send()
        .await
        .map_err(|e| FetchError::from_transport(e, timeout))?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| FetchError::from_transport(e, timeout))?;

    if !status.is_success() {
        return Err(FetchError::Http {
            status: status.as_u16(),
            body: text,
        });
    }

    Ok(serde_json::from_str(&text)?)
}
