use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::foundation::error::{SignError, SignResult};

#[derive(Clone, Debug, Default)]
/// Cooperative cancellation flag shared between a caller and a running request.
///
/// Clones observe the same flag.
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, not-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(SignError::Cancelled)` if cancelled.
    pub fn check(&self) -> SignResult<()> {
        if self.is_cancelled() {
            return Err(SignError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cancel.rs"]
mod tests;
