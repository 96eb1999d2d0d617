use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{PixcelError, PixcelResult};

/// Rows scanned by the mesher between cancellation polls.
pub const MESH_POLL_ROWS: u32 = 10;
/// Frames processed between cancellation polls while compositing or meshing frames.
pub const FRAME_POLL_FRAMES: usize = 5;

/// Cooperative cancellation flag.
///
/// Clones share the same flag, so a token handed to a conversion can be cancelled from
/// another thread. The conversion only looks at it at fixed polling points.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    #[cfg(test)]
    polls_left: Option<Arc<AtomicUsize>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Token that lets `polls` checks pass and cancels itself on the next one.
    #[cfg(test)]
    pub(crate) fn cancel_after_polls(polls: usize) -> Self {
        Self {
            flag: Arc::default(),
            polls_left: Some(Arc::new(AtomicUsize::new(polls))),
        }
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> PixcelResult<()> {
        #[cfg(test)]
        if let Some(left) = &self.polls_left
            && left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err()
        {
            self.cancel();
        }
        if self.is_cancelled() {
            return Err(PixcelError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/cancel.rs"]
mod tests;
