//! HTTP request client with composable interceptors.
//!
//! Every call merges three option layers (built-in defaults, process-wide
//! settings, per-call options), runs the merged options through an ordered
//! chain of request interceptors, sends the request, and on success runs the
//! reply through the same interceptors' response hooks.
//!
//! ## Features
//!
//! - Layered options with per-key header precedence
//! - Sync and async interceptors, driven the same way
//! - Per-call cancellation, optionally tied to a caller's token
//! - Parsed-body or full-response results
//! - Pluggable transport; hyper with rustls by default
//!
//! ## Example
//!
//! ```ignore
//! use interfetch::{CallOptions, HeaderInterceptor, api, setup};
//!
//! setup(
//!     CallOptions::new()
//!         .api_url("https://api.example.com")
//!         .api_key("secret"),
//! );
//!
//! let things = api(
//!     CallOptions::new()
//!         .get("/things")
//!         .param("perPage", "10")
//!         .interceptor(HeaderInterceptor::new("x-client", "interfetch")),
//! )
//! .await?;
//!
//! println!("{}", things.body()?);
//! ```
//!
//! ## Cancellation
//!
//! A request interceptor receives the call's [`CancelHandle`]. Cancelling it
//! stops the chain before the next step and the request is never sent; the
//! call fails with [`ApiError::Cancelled`].
//!
//! ```ignore
//! use interfetch::{CallOptions, api, request_fn};
//!
//! let err = api(CallOptions::new().interceptor(request_fn(|opts, cancel| {
//!     if opts.url.is_empty() {
//!         cancel.cancel();
//!     }
//!     Ok(())
//! })))
//! .await
//! .unwrap_err();
//!
//! assert!(err.is_cancelled());
//! ```
//!
//! To cancel from outside, attach a token with
//! [`CallOptions::cancel_token`]; an in-flight request is abandoned when the
//! token fires.
//!
//! ## Errors
//!
//! Status codes in `[200, 400)` are successes. Anything else fails with
//! [`ApiError::Http`], whose payload is the parsed error body (or the whole
//! [`Response`] in full-response mode). Response interceptors do not run on
//! that branch.
//!
//! ## Feature Flags
//!
//! | Feature | Description | Dependencies |
//! |---------|-------------|--------------|
//! | `tls` (default) | `tls-ring` + `tls-native-roots` | |
//! | `tls-ring` / `tls-aws-lc` | Crypto provider | `rustls` |
//! | `tls-native-roots` / `tls-webpki-roots` | Root certificates | `rustls-native-certs` / `webpki-roots` |
//! | `tracing` (default) | Spans and events for calls | `tracing` |
//!
//! When `tracing` is enabled, each call runs in an `http.call` span with
//! `http.method`, `http.url`, `http.status_code` and `otel.kind` fields.

mod builder;
mod cancel;
mod client;
mod error;
mod interceptor;
mod options;
mod pipeline;
mod settings;
pub mod transport;

use once_cell::sync::OnceCell;

pub use builder::{ClientBuildError, ClientBuilder};
pub use cancel::CancelHandle;
pub use client::Client;
pub use error::{ApiError, BoxError};
pub use interceptor::{
    BoxFuture, HeaderInterceptor, Interceptor, RequestAsync, RequestFn, RequestOutcome,
    ResponseAsync, ResponseFn, ResponseOutcome, request_async, request_fn, response_async,
    response_fn,
};
pub use options::{CallOptions, RequestOptions, merge};
pub use settings::{Settings, SettingsStore};

// Re-export transport types at the top level for convenience
pub use transport::{FetchRequest, HyperTransport, HyperTransportBuilder, Transport, transport_fn};

// Re-export core types that users need
pub use interfetch_core::{Body, IndexMap, JsonTransform, Reply, Response};

pub use tokio_util::sync::CancellationToken;

static DEFAULT_CLIENT: OnceCell<Client> = OnceCell::new();

fn default_client() -> Result<&'static Client, ApiError> {
    DEFAULT_CLIENT
        .get_or_try_init(|| {
            Client::builder()
                .settings_store(SettingsStore::global().clone())
                .build()
        })
        .map_err(ApiError::from)
}

/// Shallow-merge `settings` into the process-wide settings.
///
/// Only calls started afterwards see the change.
pub fn setup(settings: Settings) {
    SettingsStore::global().set(settings);
}

/// Perform a call with the process-wide settings and the default transport.
///
/// See [`Client::call`].
pub async fn api(options: CallOptions) -> Result<Reply, ApiError> {
    default_client()?.call(options).await
}

/// Perform a call and report its outcome to `callback` once settled.
///
/// See [`Client::call_with`].
pub async fn api_with<F>(options: CallOptions, callback: F) -> Result<Reply, ApiError>
where
    F: FnOnce(Result<&Reply, &ApiError>),
{
    match default_client() {
        Ok(client) => client.call_with(options, callback).await,
        Err(err) => {
            callback(Err(&err));
            Err(err)
        }
    }
}
