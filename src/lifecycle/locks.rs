use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Single-flight locks keyed by container reference.
///
/// Two restarts of the same container never interleave; restarts of
/// different containers proceed independently.
#[derive(Debug, Default)]
pub struct ContainerLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Result of trying to take a container lock without waiting.
pub enum LockAttempt {
    /// The lock was free and is now held.
    Acquired(OwnedMutexGuard<()>),
    /// Another holder exists; await the contained lock to queue behind it.
    Contended(Arc<AsyncMutex<()>>),
}

impl ContainerLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, container: &str) -> Arc<AsyncMutex<()>> {
        // Inserts never leave the map half-written, so poison is ignored.
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(container.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Take the lock for `container` if it is free
    pub fn try_acquire(&self, container: &str) -> LockAttempt {
        let lock = self.entry(container);
        match lock.clone().try_lock_owned() {
            Ok(guard) => LockAttempt::Acquired(guard),
            Err(_) => LockAttempt::Contended(lock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_container_is_contended() {
        let locks = ContainerLocks::new();

        let guard = match locks.try_acquire("valheim") {
            LockAttempt::Acquired(guard) => guard,
            LockAttempt::Contended(_) => panic!("fresh lock should be free"),
        };

        assert!(matches!(
            locks.try_acquire("valheim"),
            LockAttempt::Contended(_)
        ));
        assert!(matches!(
            locks.try_acquire("minecraft"),
            LockAttempt::Acquired(_)
        ));

        drop(guard);
        assert!(matches!(
            locks.try_acquire("valheim"),
            LockAttempt::Acquired(_)
        ));
    }

    #[tokio::test]
    async fn test_contended_lock_waits_for_release() {
        let locks = ContainerLocks::new();
        let LockAttempt::Acquired(guard) = locks.try_acquire("valheim") else {
            panic!("fresh lock should be free");
        };

        let LockAttempt::Contended(lock) = locks.try_acquire("valheim") else {
            panic!("held lock should be contended");
        };
        let waiter = tokio::spawn(async move {
            let _guard = lock.lock_owned().await;
        });

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }
}
