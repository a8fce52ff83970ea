//! Process-wide settings.
//!
//! Settings are the outermost option layer: every call reads a snapshot of
//! them when its options are merged. The store is swapped atomically, so a
//! concurrent [`set`](SettingsStore::set) affects later calls only and never a
//! merge already in progress.

use std::sync::Arc;

use arc_swap::ArcSwap;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use indexmap::IndexMap;
use interfetch_core::mark_sensitive;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::ApiError;
use crate::options::CallOptions;

/// Settings share the shape of [`CallOptions`]: any option can be given a
/// process-wide default.
pub type Settings = CallOptions;

static GLOBAL: Lazy<SettingsStore> = Lazy::new(SettingsStore::new);

/// A shared, atomically swappable settings snapshot.
///
/// Clones share the same underlying state.
#[derive(Clone, Default)]
pub struct SettingsStore {
    inner: Arc<ArcSwap<Settings>>,
}

impl SettingsStore {
    /// Create a store holding empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(settings)),
        }
    }

    /// The process-wide store used by [`setup`](crate::setup) and [`api`](crate::api).
    pub fn global() -> &'static SettingsStore {
        &GLOBAL
    }

    /// A snapshot of the current settings.
    pub fn get(&self) -> Arc<Settings> {
        self.inner.load_full()
    }

    /// Shallow-merge `patch` into the current settings.
    pub fn set(&self, patch: Settings) {
        self.inner.rcu(|current| {
            let mut next = Settings::clone(current);
            next.overlay(patch.clone());
            next
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(settings = ?self.get(), "settings updated");
    }

    /// Replace the settings wholesale.
    pub fn replace(&self, settings: Settings) {
        self.inner.store(Arc::new(settings));
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("settings", &self.get())
            .finish()
    }
}

/// Serialized form of [`Settings`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SettingsFile {
    api_url: Option<String>,
    api_key: Option<String>,
    url: Option<String>,
    method: Option<String>,
    headers: Option<IndexMap<String, String>>,
    params: Option<IndexMap<String, String>>,
    full_response: Option<bool>,
}

impl CallOptions {
    /// Load settings from a JSON document.
    ///
    /// Recognized keys: `apiUrl`, `apiKey`, `url`, `method`, `headers`,
    /// `params`, `fullResponse`.
    ///
    /// # Example
    ///
    /// ```
    /// use interfetch::Settings;
    ///
    /// let settings = Settings::from_json(r#"{
    ///     "apiUrl": "https://api.example.com",
    ///     "apiKey": "secret",
    ///     "headers": {"x-client": "interfetch"}
    /// }"#).unwrap();
    /// assert_eq!(settings.get_api_url(), Some("https://api.example.com"));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        let file: SettingsFile = serde_json::from_str(json)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid settings: {e}")))?;

        let mut settings = Settings::new();
        settings.api_url = file.api_url;
        settings.api_key = file.api_key;
        settings.url = file.url;
        settings.params = file.params;
        settings.full_response = file.full_response;

        if let Some(method) = file.method {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("invalid method: {e}")))?;
            settings.method = Some(method);
        }

        if let Some(headers) = file.headers {
            let mut map = HeaderMap::with_capacity(headers.len());
            for (name, value) in headers {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| ApiError::InvalidRequest(format!("invalid header name: {e}")))?;
                let value = HeaderValue::from_str(&value)
                    .map_err(|e| ApiError::InvalidRequest(format!("invalid header value: {e}")))?;
                map.insert(name, value);
            }
            mark_sensitive(&mut map);
            settings.headers = Some(map);
        }

        Ok(settings)
    }
}
