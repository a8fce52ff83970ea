//! Client builder.
//!
//! Provides a fluent API for configuring and building a [`Client`].

use std::sync::Arc;
use std::time::Duration;

use rustls::ClientConfig;

use crate::client::Client;
use crate::error::ApiError;
use crate::settings::{Settings, SettingsStore};
use crate::transport::{HyperTransportBuilder, Transport};

/// Builder for creating a [`Client`].
///
/// Without an explicit [`transport`](Self::transport) the client sends
/// requests through a [`HyperTransport`](crate::transport::HyperTransport)
/// configured by the pass-through methods below.
///
/// # Example
///
/// ```ignore
/// use interfetch::{CallOptions, Client};
/// use std::time::Duration;
///
/// let client = Client::builder()
///     .settings(CallOptions::new().api_url("https://api.example.com"))
///     .pool_idle_timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct ClientBuilder {
    /// Custom transport; replaces the hyper transport when set.
    transport: Option<Arc<dyn Transport>>,
    /// Settings store to read from; a private one when unset.
    store: Option<SettingsStore>,
    /// Settings merged into the store at build time.
    settings: Option<Settings>,
    /// Configuration of the default transport.
    hyper: HyperTransportBuilder,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("transport", &self.transport.is_some())
            .field("store", &self.store.is_some())
            .field("settings", &self.settings)
            .field("hyper", &self.hyper)
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            transport: None,
            store: None,
            settings: None,
            hyper: HyperTransportBuilder::new(),
        }
    }

    /// Send requests through `transport` instead of the hyper transport.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Read settings from `store`, shared with its other clones.
    pub fn settings_store(mut self, store: SettingsStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Initial settings, merged into the store when the client is built.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Set a custom TLS configuration for the default transport.
    pub fn tls_config(mut self, config: ClientConfig) -> Self {
        self.hyper = self.hyper.tls_config(config);
        self
    }

    /// Enable HTTP/2 only mode on the default transport.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.hyper = self.hyper.http2_only(enabled);
        self
    }

    /// Set the connection pool idle timeout of the default transport.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.hyper = self.hyper.pool_idle_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host of the default transport.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.hyper = self.hyper.pool_max_idle_per_host(max);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the default transport cannot be created.
    pub fn build(self) -> Result<Client, ClientBuildError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(self.hyper.build()?),
        };

        let store = self.store.unwrap_or_default();
        if let Some(settings) = self.settings {
            store.set(settings);
        }

        Ok(Client::from_parts(transport, store))
    }
}

/// Error type for client building failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientBuildError {
    /// No usable TLS configuration.
    #[error("failed to configure TLS: {0}")]
    Tls(String),
}

impl From<ClientBuildError> for ApiError {
    fn from(err: ClientBuildError) -> Self {
        ApiError::Network(err.to_string())
    }
}
