use std::{
    sync::{Mutex, MutexGuard, PoisonError, TryLockError},
    time::Duration,
};

use crate::{
    foundation::error::{SignError, SignResult},
    render::cancel::CancelToken,
};

const WAIT_POLL: Duration = Duration::from_millis(10);

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// What a render request does when another render is running.
pub enum BusyPolicy {
    /// Fail immediately with [`SignError::Busy`].
    #[default]
    Reject,
    /// Cancel the running render and wait for it to release the slot.
    CancelInFlight,
}

#[derive(Debug, Default)]
/// Serializes access to the renderer: at most one render holds the slot at a time.
pub struct RenderSlot {
    policy: BusyPolicy,
    gate: Mutex<()>,
    current: Mutex<Option<CancelToken>>,
}

/// Held for the duration of one render; releases the slot on drop.
#[derive(Debug)]
pub struct RenderPermit<'a> {
    slot: &'a RenderSlot,
    _gate: MutexGuard<'a, ()>,
}

impl Drop for RenderPermit<'_> {
    fn drop(&mut self) {
        *self.slot.current_lock() = None;
    }
}

impl RenderSlot {
    /// A free slot using `policy`.
    pub fn new(policy: BusyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Configured busy policy.
    pub fn policy(&self) -> BusyPolicy {
        self.policy
    }

    /// `true` while a permit is held.
    pub fn is_busy(&self) -> bool {
        self.current_lock().is_some()
    }

    /// Claim the slot for a render cancellable through `token`.
    pub fn acquire(&self, token: &CancelToken) -> SignResult<RenderPermit<'_>> {
        let gate = match self.policy {
            BusyPolicy::Reject => match self.gate.try_lock() {
                Ok(g) => g,
                Err(TryLockError::Poisoned(p)) => p.into_inner(),
                Err(TryLockError::WouldBlock) => return Err(SignError::Busy),
            },
            BusyPolicy::CancelInFlight => loop {
                token.check()?;
                if let Some(running) = self.current_lock().as_ref() {
                    running.cancel();
                }
                match self.gate.try_lock() {
                    Ok(g) => break g,
                    Err(TryLockError::Poisoned(p)) => break p.into_inner(),
                    Err(TryLockError::WouldBlock) => std::thread::sleep(WAIT_POLL),
                }
            },
        };
        *self.current_lock() = Some(token.clone());
        Ok(RenderPermit {
            slot: self,
            _gate: gate,
        })
    }

    fn current_lock(&self) -> MutexGuard<'_, Option<CancelToken>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/slot.rs"]
mod tests;
