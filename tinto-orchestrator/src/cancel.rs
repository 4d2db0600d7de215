//! A per-call cancellation token for [`crate::status::poll_until_final`].
//!
//! Grounded directly on the teacher's `common::shutdown::ShutdownChannel`:
//! the same trick of closing a zero-permit `Semaphore` to broadcast a
//! one-shot signal to every clone, generalized from one process-wide
//! instance to one fresh token per polling call (§4.9, §9 design notes).

use std::sync::Arc;

use tokio::sync::Semaphore;

#[derive(Clone, Debug)]
pub struct CancellationToken {
    inner: Arc<Semaphore>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Semaphore::new(0)),
        }
    }

    /// Signal cancellation. Safe to call more than once.
    pub fn cancel(&self) {
        self.inner.close()
    }

    /// Resolves immediately if already cancelled, otherwise waits.
    pub async fn cancelled(&self) {
        self.inner
            .acquire()
            .await
            .map_err(|_| ())
            .expect_err("a zero-permit semaphore never grants a permit")
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_closed()
    }
}
