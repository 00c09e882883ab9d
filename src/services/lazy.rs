use crate::error::{AppError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

type Factory<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// A process-wide client handle that is created on first use.
///
/// The process can start without valid credentials; construction is deferred
/// until the first upstream call. Concurrent first callers are serialized on
/// `init_lock` and re-check the slot, so at most one instance is ever built.
/// `shutdown` releases the instance exactly once, after which `get` fails.
pub struct LazyClient<T> {
    name: &'static str,
    slot: RwLock<Option<Arc<T>>>,
    init_lock: Mutex<()>,
    closed: AtomicBool,
    factory: Factory<T>,
}

impl<T> LazyClient<T> {
    pub fn new<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self {
            name,
            slot: RwLock::new(None),
            init_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
            factory: Box::new(factory),
        }
    }

    /// Return the shared instance, constructing it if this is the first use.
    pub fn get(&self) -> Result<Arc<T>> {
        if let Some(client) = self.current()? {
            return Ok(client);
        }

        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = self.current()? {
            return Ok(client);
        }

        let client = Arc::new((self.factory)()?);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&client));
        tracing::info!(client = self.name, "Upstream client created");
        Ok(client)
    }

    pub fn is_initialized(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Release the instance. Returns `true` only for the call that actually
    /// dropped a live client.
    pub fn shutdown(&self) -> bool {
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.closed.store(true, Ordering::SeqCst);
        let released = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if released {
            tracing::info!(client = self.name, "Upstream client released");
        }
        released
    }

    fn current(&self) -> Result<Option<Arc<T>>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AppError::ShutDown(self.name));
        }
        Ok(self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_client(counter: Arc<AtomicUsize>) -> LazyClient<usize> {
        LazyClient::new("test", move || Ok(counter.fetch_add(1, Ordering::SeqCst) + 1))
    }

    #[test]
    fn test_not_created_until_first_use() {
        let counter = Arc::new(AtomicUsize::new(0));
        let client = counting_client(Arc::clone(&counter));

        assert!(!client.is_initialized());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        client.get().unwrap();
        assert!(client.is_initialized());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_use_returns_same_instance() {
        let counter = Arc::new(AtomicUsize::new(0));
        let client = counting_client(Arc::clone(&counter));

        let first = client.get().unwrap();
        let second = client.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_use_constructs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let client = counting_client(Arc::clone(&counter));

        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    client.get().unwrap();
                });
            }
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_factory_failure_is_retried_on_next_use() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&attempts);
        let client = LazyClient::new("flaky", move || {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::CredentialsError("no token".to_string()))
            } else {
                Ok(42u32)
            }
        });

        assert!(client.get().is_err());
        assert_eq!(*client.get().unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_shutdown_releases_exactly_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let client = counting_client(counter);

        client.get().unwrap();
        assert!(client.shutdown());
        assert!(!client.shutdown());
        assert!(!client.is_initialized());
        assert!(matches!(client.get(), Err(AppError::ShutDown("test"))));
    }

    #[test]
    fn test_shutdown_without_use_releases_nothing() {
        let counter = Arc::new(AtomicUsize::new(0));
        let client = counting_client(Arc::clone(&counter));

        assert!(!client.shutdown());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
