// src/dispatch/limiter.rs
// =============================================================================
// A counting permit pool with a fixed capacity.
//
// - `acquire()` waits until a permit is free
// - dropping the returned `Permit` gives it back, on every exit path
// - capacity 1 means checks run strictly one after another
// =============================================================================

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct Limiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Authorises one in-flight check until dropped.
#[derive(Debug)]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

impl Limiter {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get().min(Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub async fn acquire(&self) -> Permit {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("limiter semaphore is never closed");
        Permit { _permit: permit }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
