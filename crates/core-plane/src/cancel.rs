use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellation flag owned by the caller and polled by every long-running
/// primitive between inner-loop iterations (spec §5 "Cancellation semantics",
/// replacing the source's global `SigInterruptPending`).
///
/// Cloning shares the same underlying flag, so a caller can hand one token to
/// a worker and set it from elsewhere (e.g. a UI's cancel button) without the
/// core ever knowing who is driving it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
