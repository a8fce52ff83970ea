//! Interceptors.
//!
//! Interceptors inject cross-cutting behavior into calls without touching call
//! sites: adding headers, logging, shaping bodies, translating errors, vetoing
//! responses or cancelling requests.
//!
//! An [`Interceptor`] has two hooks, both optional:
//! - [`request`](Interceptor::request) runs before the transport, in chain
//!   order, and may rewrite the options or cancel the call;
//! - [`response`](Interceptor::response) runs after a successful response, in
//!   the same chain order, and may rewrite or reject the reply.
//!
//! Hooks return a future, so synchronous and asynchronous interceptors are
//! driven the same way. A hook that resolves to `Ok(None)` keeps the current
//! (possibly mutated in place) value; `Ok(Some(v))` replaces it.
//!
//! # Example
//!
//! ```ignore
//! use interfetch::{CallOptions, request_fn, response_async};
//!
//! let options = CallOptions::new()
//!     .get("/things")
//!     .interceptor(request_fn(|opts, cancel| {
//!         if opts.url.is_empty() {
//!             cancel.cancel();
//!         }
//!         Ok(())
//!     }))
//!     .interceptor(response_async(|reply| async move {
//!         audit(&reply).await;
//!         Ok(reply)
//!     }));
//! ```

use std::future::Future;
use std::pin::Pin;

use futures::future;
use http::{HeaderName, HeaderValue};
use interfetch_core::Reply;

use crate::cancel::CancelHandle;
use crate::error::ApiError;
use crate::options::RequestOptions;

/// Type alias for a boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of a request hook: `None` keeps the current options.
pub type RequestOutcome = Result<Option<RequestOptions>, ApiError>;

/// Result of a response hook: `None` keeps the current reply.
pub type ResponseOutcome = Result<Option<Reply>, ApiError>;

/// A pair of request/response hooks applied in chain order.
///
/// Both hooks default to identity, so an implementation only overrides the
/// side it cares about.
pub trait Interceptor: Send + Sync {
    /// Transform the outgoing request options.
    ///
    /// Calling [`CancelHandle::cancel`] (before returning, or from inside the
    /// returned future) cancels the call whatever the hook resolves to.
    fn request<'a>(
        &'a self,
        options: &'a mut RequestOptions,
        cancel: &'a CancelHandle,
    ) -> BoxFuture<'a, RequestOutcome> {
        let _ = (options, cancel);
        Box::pin(future::ready(Ok(None)))
    }

    /// Transform the reply of a successful response.
    ///
    /// Returning an error rejects the call even though the HTTP status was a
    /// success.
    fn response<'a>(&'a self, reply: &'a mut Reply) -> BoxFuture<'a, ResponseOutcome> {
        let _ = reply;
        Box::pin(future::ready(Ok(None)))
    }
}

// ============================================================================
// Closure adapters
// ============================================================================

/// A synchronous request interceptor built from a closure.
///
/// Created by [`request_fn`].
#[derive(Clone)]
pub struct RequestFn<F> {
    func: F,
}

/// Build a request interceptor from a synchronous closure that mutates the
/// options in place.
pub fn request_fn<F>(func: F) -> RequestFn<F>
where
    F: Fn(&mut RequestOptions, &CancelHandle) -> Result<(), ApiError> + Send + Sync,
{
    RequestFn { func }
}

impl<F> Interceptor for RequestFn<F>
where
    F: Fn(&mut RequestOptions, &CancelHandle) -> Result<(), ApiError> + Send + Sync,
{
    fn request<'a>(
        &'a self,
        options: &'a mut RequestOptions,
        cancel: &'a CancelHandle,
    ) -> BoxFuture<'a, RequestOutcome> {
        Box::pin(future::ready((self.func)(options, cancel).map(|()| None)))
    }
}

/// An asynchronous request interceptor built from a closure.
///
/// Created by [`request_async`].
#[derive(Clone)]
pub struct RequestAsync<F> {
    func: F,
}

/// Build a request interceptor from an async closure.
///
/// The closure receives its own copy of the options and the call's cancel
/// handle, and resolves to the options the chain continues with.
pub fn request_async<F, Fut>(func: F) -> RequestAsync<F>
where
    F: Fn(RequestOptions, CancelHandle) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RequestOptions, ApiError>> + Send + 'static,
{
    RequestAsync { func }
}

impl<F, Fut> Interceptor for RequestAsync<F>
where
    F: Fn(RequestOptions, CancelHandle) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RequestOptions, ApiError>> + Send + 'static,
{
    fn request<'a>(
        &'a self,
        options: &'a mut RequestOptions,
        cancel: &'a CancelHandle,
    ) -> BoxFuture<'a, RequestOutcome> {
        let fut = (self.func)(options.clone(), cancel.clone());
        Box::pin(async move { fut.await.map(Some) })
    }
}

/// A synchronous response interceptor built from a closure.
///
/// Created by [`response_fn`].
#[derive(Clone)]
pub struct ResponseFn<F> {
    func: F,
}

/// Build a response interceptor from a synchronous closure that mutates the
/// reply in place.
pub fn response_fn<F>(func: F) -> ResponseFn<F>
where
    F: Fn(&mut Reply) -> Result<(), ApiError> + Send + Sync,
{
    ResponseFn { func }
}

impl<F> Interceptor for ResponseFn<F>
where
    F: Fn(&mut Reply) -> Result<(), ApiError> + Send + Sync,
{
    fn response<'a>(&'a self, reply: &'a mut Reply) -> BoxFuture<'a, ResponseOutcome> {
        Box::pin(future::ready((self.func)(reply).map(|()| None)))
    }
}

/// An asynchronous response interceptor built from a closure.
///
/// Created by [`response_async`].
#[derive(Clone)]
pub struct ResponseAsync<F> {
    func: F,
}

/// Build a response interceptor from an async closure that resolves to the
/// replacement reply.
pub fn response_async<F, Fut>(func: F) -> ResponseAsync<F>
where
    F: Fn(Reply) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
{
    ResponseAsync { func }
}

impl<F, Fut> Interceptor for ResponseAsync<F>
where
    F: Fn(Reply) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
{
    fn response<'a>(&'a self, reply: &'a mut Reply) -> BoxFuture<'a, ResponseOutcome> {
        let fut = (self.func)(reply.clone());
        Box::pin(async move { fut.await.map(Some) })
    }
}

impl<F> std::fmt::Debug for RequestFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestFn").finish()
    }
}

impl<F> std::fmt::Debug for RequestAsync<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAsync").finish()
    }
}

impl<F> std::fmt::Debug for ResponseFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseFn").finish()
    }
}

impl<F> std::fmt::Debug for ResponseAsync<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseAsync").finish()
    }
}

// ============================================================================
// Header Interceptor
// ============================================================================

/// An interceptor that sets a header on every request.
///
/// # Example
///
/// ```
/// use interfetch::{CallOptions, HeaderInterceptor};
///
/// let options = CallOptions::new()
///     .interceptor(HeaderInterceptor::new("x-client", "interfetch"));
/// ```
#[derive(Clone, Debug)]
pub struct HeaderInterceptor {
    name: HeaderName,
    value: HeaderValue,
}

impl HeaderInterceptor {
    /// Create a new header interceptor.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.parse().expect("invalid header name"),
            value: value.parse().expect("invalid header value"),
        }
    }

    /// Try to create a new header interceptor, returning an error if invalid.
    pub fn try_new(name: &str, value: &str) -> Result<Self, ApiError> {
        let name = name
            .parse()
            .map_err(|_| ApiError::InvalidRequest(format!("invalid header name: {name}")))?;
        let value = value
            .parse()
            .map_err(|_| ApiError::InvalidRequest(format!("invalid header value: {value}")))?;
        Ok(Self { name, value })
    }

    /// Create a new header interceptor from pre-parsed values.
    pub fn from_parts(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Interceptor for HeaderInterceptor {
    fn request<'a>(
        &'a self,
        options: &'a mut RequestOptions,
        _cancel: &'a CancelHandle,
    ) -> BoxFuture<'a, RequestOutcome> {
        options.headers.insert(self.name.clone(), self.value.clone());
        Box::pin(future::ready(Ok(None)))
    }
}
