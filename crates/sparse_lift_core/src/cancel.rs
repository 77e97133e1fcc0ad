//! Cooperative cancellation
//!
//! Long loops poll a `Checkpoint` between iterations. A `CancelToken` can be
//! cloned into another thread and triggered from there.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{LinalgError, Result};

/// Polled between iterations of long-running loops
pub trait Checkpoint {
    /// `Err(LinalgError::Cancelled)` once the computation should stop
    fn checkpoint(&self) -> Result<()>;
}

/// A checkpoint that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct Uninterruptible;

impl Checkpoint for Uninterruptible {
    #[inline]
    fn checkpoint(&self) -> Result<()> {
        Ok(())
    }
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl Checkpoint for CancelToken {
    fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(LinalgError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_state() {
        let token = CancelToken::new();
        let remote = token.clone();
        assert!(token.checkpoint().is_ok());

        std::thread::spawn(move || remote.cancel()).join().unwrap();

        assert!(token.is_cancelled());
        assert!(matches!(token.checkpoint(), Err(LinalgError::Cancelled)));
    }
}
