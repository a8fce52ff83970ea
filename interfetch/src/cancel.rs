//! Per-call cancellation.
//!
//! Every call owns exactly one [`CancelHandle`]. Request interceptors receive
//! it and may call [`cancel`](CancelHandle::cancel); the chain runner checks
//! it before and after each step, and the transport request is raced against
//! it. The transition from live to cancelled happens at most once.
//!
//! A caller may pass its own [`CancellationToken`] through
//! [`CallOptions::cancel_token`](crate::CallOptions::cancel_token). The call's
//! handle is then a child of that token: cancelling the caller's token
//! cancels the call, while cancelling the call never reaches the parent.

use tokio_util::sync::CancellationToken;

/// The cancellation handle of a single call.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub(crate) fn new(parent: Option<&CancellationToken>) -> Self {
        let token = match parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        Self { token }
    }

    /// Cancel the call. No further interceptors run and the transport is
    /// never invoked (or is abandoned if already in flight).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the call has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the call is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_live() {
        let handle = CancelHandle::new(None);
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let handle = CancelHandle::new(None);
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_clones_share_state() {
        let handle = CancelHandle::new(None);
        let moved = handle.clone();
        moved.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_independent_handles() {
        let a = CancelHandle::new(None);
        let b = CancelHandle::new(None);
        a.cancel();
        assert!(!b.is_cancelled());
    }

    #[test]
    fn test_parent_cancels_child_not_reverse() {
        let parent = CancellationToken::new();
        let first = CancelHandle::new(Some(&parent));
        let second = CancelHandle::new(Some(&parent));

        first.cancel();
        assert!(!parent.is_cancelled());
        assert!(!second.is_cancelled());

        parent.cancel();
        assert!(second.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let handle = CancelHandle::new(None);
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });
        handle.cancel();
        task.await.unwrap();
    }
}
