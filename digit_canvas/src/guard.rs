use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Allows at most one outstanding prediction request per session.
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    busy: Arc<AtomicBool>,
}

/// Held while a request is outstanding. Dropping it frees the guard.
#[derive(Debug)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl RequestGuard {
    pub fn try_acquire(&self) -> Option<InFlight> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                busy: self.busy.clone(),
            })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
