//! The call controller.
//!
//! A call runs in this order:
//!
//! 1. merge the settings snapshot with the call's options,
//! 2. run the request chain (may stop with a cancellation or an error),
//! 3. send the request, raced against the call's cancel handle,
//! 4. branch on the status: `[200, 400)` is success, anything else is an
//!    [`ApiError::Http`] carrying the error payload,
//! 5. on success, run the response pipeline over the reply.
//!
//! Nothing is retried. Each call owns its options and its cancel handle, so
//! concurrent calls on the same client never observe each other.

use std::sync::Arc;

use interfetch_core::{Reply, Response, decode_json};
use serde_json::Value;

#[cfg(feature = "tracing")]
use tracing::{Instrument, info_span};

use crate::builder::ClientBuilder;
use crate::cancel::CancelHandle;
use crate::error::ApiError;
use crate::options::{CallOptions, RequestOptions, merge};
use crate::pipeline::{run_request_chain, run_response_chain};
use crate::settings::{Settings, SettingsStore};
use crate::transport::{FetchRequest, Transport};

/// HTTP client with layered options and an interceptor pipeline.
///
/// Cloning is cheap; clones share the transport and the settings store.
///
/// # Example
///
/// ```ignore
/// use interfetch::{CallOptions, Client};
///
/// let client = Client::builder().build()?;
/// client.setup(CallOptions::new().api_url("https://api.example.com"));
///
/// let user = client.call(CallOptions::new().get("/users/1")).await?;
/// println!("{}", user.body()?);
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    settings: SettingsStore,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client over `transport` with its own empty settings.
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self::from_parts(Arc::new(transport), SettingsStore::new())
    }

    pub(crate) fn from_parts(transport: Arc<dyn Transport>, settings: SettingsStore) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// The settings store this client reads on every call.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Shallow-merge `patch` into this client's settings.
    ///
    /// Affects calls started afterwards only.
    pub fn setup(&self, patch: Settings) {
        self.settings.set(patch);
    }

    /// Perform a call.
    ///
    /// Resolves to the parsed body, or to the whole response when
    /// `full_response` is set.
    pub async fn call(&self, options: CallOptions) -> Result<Reply, ApiError> {
        let settings = self.settings.get();
        let parent = options.cancel_token.as_ref().or(settings.cancel_token.as_ref());
        let cancel = CancelHandle::new(parent);
        let merged = merge(&settings, &options)?;

        #[cfg(feature = "tracing")]
        {
            let span = info_span!(
                "http.call",
                http.method = %merged.method,
                http.url = tracing::field::Empty,
                http.status_code = tracing::field::Empty,
                otel.kind = "client",
            );
            return self.execute(merged, cancel).instrument(span).await;
        }

        #[cfg(not(feature = "tracing"))]
        self.execute(merged, cancel).await
    }

    /// Perform a call and report its outcome to `callback` once settled.
    ///
    /// The callback observes the same outcome that is returned; it cannot
    /// change it.
    pub async fn call_with<F>(&self, options: CallOptions, callback: F) -> Result<Reply, ApiError>
    where
        F: FnOnce(Result<&Reply, &ApiError>),
    {
        let result = self.call(options).await;
        callback(result.as_ref());
        result
    }

    async fn execute(
        &self,
        options: RequestOptions,
        cancel: CancelHandle,
    ) -> Result<Reply, ApiError> {
        let options = run_request_chain(options, &cancel).await?;
        let request = FetchRequest::from_options(&options)?;

        #[cfg(feature = "tracing")]
        {
            tracing::Span::current().record("http.url", request.url.as_str());
            tracing::debug!(method = %request.method, url = %request.url, "sending request");
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("request cancelled in flight");
                return Err(ApiError::Cancelled);
            }
            result = self.transport.fetch(request) => result?,
        };

        let status = response.status();

        #[cfg(feature = "tracing")]
        tracing::Span::current().record("http.status_code", status.as_u16());

        if !response.ok() {
            #[cfg(feature = "tracing")]
            tracing::debug!(status = status.as_u16(), "request failed with error status");

            let payload = if options.full_response {
                Reply::Full(response)
            } else {
                Reply::Body(error_body(&response))
            };
            return Err(ApiError::http(status, payload));
        }

        let reply = if options.full_response {
            Reply::Full(response)
        } else {
            Reply::Body(response.json()?)
        };

        run_response_chain(&options.interceptors, reply).await
    }
}

/// Parse an error body, keeping non-JSON bodies as text.
fn error_body(response: &Response) -> Value {
    decode_json(response.bytes()).unwrap_or_else(|_| Value::String(response.text()))
}
