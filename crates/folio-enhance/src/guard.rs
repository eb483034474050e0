//! Mount lifetime flag shared with in-flight work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cleared when the page view unmounts.
///
/// Clones share one flag. Work started while mounted checks it before
/// touching component state.
#[derive(Clone, Debug)]
pub struct MountGuard(Arc<AtomicBool>);

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl MountGuard {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let guard = MountGuard::new();
        let held = guard.clone();
        assert!(held.is_mounted());
        guard.unmount();
        assert!(!held.is_mounted());
    }
}
