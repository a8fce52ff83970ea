//! Request chain runner and response pipeline.
//!
//! The request chain walks the interceptors in order. Each step settles
//! completely (value, cancellation or error) before the next one starts:
//!
//! ```text
//! PENDING -> RUNNING(0) -> RUNNING(1) -> ... -> COMPLETED
//!                  \              \
//!                   +-> CANCELLED  +-> FAILED
//! ```
//!
//! The cancel handle is checked before and after every step. Cancellation
//! wins over whatever the step returned, including an error.
//!
//! The response pipeline walks the same interceptors in the same order
//! (not reversed) over the reply of a successful response.

use std::sync::Arc;

use interfetch_core::Reply;

use crate::cancel::CancelHandle;
use crate::error::ApiError;
use crate::interceptor::Interceptor;
use crate::options::RequestOptions;

/// Run every request hook over `options`.
///
/// The chain is the one present on `options` when the run starts; replacing
/// `interceptors` from inside a hook does not alter the running chain.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub(crate) async fn run_request_chain(
    mut options: RequestOptions,
    cancel: &CancelHandle,
) -> Result<RequestOptions, ApiError> {
    let chain: Vec<Arc<dyn Interceptor>> = options.interceptors.clone();

    for (step, interceptor) in chain.iter().enumerate() {
        if cancel.is_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::debug!(step, "request chain cancelled before step");
            return Err(ApiError::Cancelled);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(step, "running request interceptor");

        let outcome = interceptor.request(&mut options, cancel).await;

        if cancel.is_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::debug!(step, "request interceptor cancelled the call");
            return Err(ApiError::Cancelled);
        }

        match outcome {
            Ok(Some(next)) => options = next,
            Ok(None) => {}
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(step, error = %err, "request interceptor failed");
                return Err(err);
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(ApiError::Cancelled);
    }

    Ok(options)
}

/// Run every response hook over `reply`.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub(crate) async fn run_response_chain(
    chain: &[Arc<dyn Interceptor>],
    mut reply: Reply,
) -> Result<Reply, ApiError> {
    for (step, interceptor) in chain.iter().enumerate() {
        #[cfg(feature = "tracing")]
        tracing::trace!(step, "running response interceptor");

        match interceptor.response(&mut reply).await {
            Ok(Some(next)) => reply = next,
            Ok(None) => {}
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(step, error = %err, "response interceptor failed");
                return Err(err);
            }
        }
    }

    Ok(reply)
}
