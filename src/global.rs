//! Process-wide blackboard instance and its lifecycle.
//!
//! The primary interface of the store is a global one: [`create`] the
//! instance during startup, call the data operations from anywhere, and
//! [`destroy`] it during shutdown. At most one instance is live at a
//! time. Every data operation returns
//! [`BlackboardError::NotInitialized`](crate::BlackboardError::NotInitialized)
//! when called outside the create/destroy window; callers that cannot
//! guarantee ordering should guard with [`is_ready`].
//!
//! The functions here are thin wrappers: each resolves the live
//! [`Blackboard`] handle and delegates. `destroy` only detaches the
//! instance; an operation already in flight on another thread completes
//! against the old instance through its own `Arc` (tearing down while
//! data operations are still running remains a caller-ordering hazard,
//! exactly as with any shared-state shutdown).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::board::Blackboard;
use crate::error::{BlackboardError, Result};

static INSTANCE: Lazy<Mutex<Option<Arc<Blackboard>>>> = Lazy::new(|| Mutex::new(None));
static READY: AtomicBool = AtomicBool::new(false);

fn instance() -> Result<Arc<Blackboard>> {
    INSTANCE
        .lock()
        .clone()
        .ok_or(BlackboardError::NotInitialized)
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Create the process-wide blackboard instance.
///
/// If an instance is already live it is destroyed first, so `create` is
/// idempotent re-initialization: afterwards the board is empty of
/// partitions, values, and subscriptions.
pub fn create() {
    log::debug!("creating blackboard instance");
    let mut slot = INSTANCE.lock();
    *slot = Some(Arc::new(Blackboard::new()));
    READY.store(true, Ordering::SeqCst);
}

/// Destroy the process-wide blackboard instance, releasing every
/// partition with its values and callback registrations.
///
/// No-op when no instance is live; safe to call any number of times.
pub fn destroy() {
    let mut slot = INSTANCE.lock();
    READY.store(false, Ordering::SeqCst);
    if slot.take().is_some() {
        log::debug!("destroyed blackboard instance");
    }
}

/// Whether a live blackboard instance exists.
///
/// Pure atomic query; takes no lock.
pub fn is_ready() -> bool {
    READY.load(Ordering::SeqCst)
}

// ---------------------------------------------------------------------------
// Data reading/writing
// ---------------------------------------------------------------------------

/// Store `value` of type `T` at `key` on the process-wide board.
///
/// See [`Blackboard::write`] for callback ordering and the meaning of
/// `raise_callbacks`.
pub fn write<T>(key: &str, value: T, raise_callbacks: bool) -> Result<()>
where
    T: Clone + Send + 'static,
{
    instance()?.write(key, value, raise_callbacks);
    Ok(())
}

/// Read the value of type `T` stored at `key` on the process-wide board.
///
/// See [`Blackboard::read`]; missing keys are a recoverable
/// [`KeyNotFound`](crate::BlackboardError::KeyNotFound).
pub fn read<T>(key: &str) -> Result<T>
where
    T: Clone + Send + 'static,
{
    instance()?.read(key)
}

/// Read the value of type `T` at `key`, inserting `T::default()` first
/// if the key is absent. See [`Blackboard::read_or_default`].
pub fn read_or_default<T>(key: &str) -> Result<T>
where
    T: Clone + Default + Send + 'static,
{
    Ok(instance()?.read_or_default(key))
}

/// Remove `key` from `T`'s partition only. See
/// [`Blackboard::wipe_type_key`].
pub fn wipe_type_key<T: Send + 'static>(key: &str) -> Result<()> {
    instance()?.wipe_type_key::<T>(key);
    Ok(())
}

/// Remove `key` from every partition regardless of type. See
/// [`Blackboard::wipe_key`].
pub fn wipe_key(key: &str) -> Result<()> {
    instance()?.wipe_key(key);
    Ok(())
}

/// Clear all values everywhere, and all callback registrations too when
/// `wipe_callbacks` is set. See [`Blackboard::wipe_board`].
pub fn wipe_board(wipe_callbacks: bool) -> Result<()> {
    instance()?.wipe_board(wipe_callbacks);
    Ok(())
}

// ---------------------------------------------------------------------------
// Callback subscription
// ---------------------------------------------------------------------------

/// Register the key-only callback for `key` in `T`'s partition. See
/// [`Blackboard::subscribe_key`].
pub fn subscribe_key<T, F>(key: &str, callback: F) -> Result<()>
where
    T: Send + 'static,
    F: Fn(&str) + Send + Sync + 'static,
{
    instance()?.subscribe_key::<T, F>(key, callback);
    Ok(())
}

/// Register the value-only callback for `key` in `T`'s partition. See
/// [`Blackboard::subscribe_value`].
pub fn subscribe_value<T, F>(key: &str, callback: F) -> Result<()>
where
    T: Send + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    instance()?.subscribe_value::<T, F>(key, callback);
    Ok(())
}

/// Register the key+value callback for `key` in `T`'s partition. See
/// [`Blackboard::subscribe_key_value`].
pub fn subscribe_key_value<T, F>(key: &str, callback: F) -> Result<()>
where
    T: Send + 'static,
    F: Fn(&str, &T) + Send + Sync + 'static,
{
    instance()?.subscribe_key_value::<T, F>(key, callback);
    Ok(())
}

/// Remove all three callback shapes for `key` within `T`'s partition.
/// See [`Blackboard::unsubscribe`].
pub fn unsubscribe<T: Send + 'static>(key: &str) -> Result<()> {
    instance()?.unsubscribe::<T>(key);
    Ok(())
}

/// Remove all callback shapes for `key` across every partition. See
/// [`Blackboard::unsubscribe_all`].
pub fn unsubscribe_all(key: &str) -> Result<()> {
    instance()?.unsubscribe_all(key);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering as AtomicOrdering;

    use super::*;

    // The singleton is process-wide state and the test harness runs on
    // multiple threads, so every test here serializes on this lock.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn with_fresh_board(f: impl FnOnce()) {
        let _guard = TEST_LOCK.lock();
        let _ = env_logger::builder().is_test(true).try_init();
        create();
        f();
        destroy();
    }

    #[test]
    fn test_lifecycle_ready_flag() {
        let _guard = TEST_LOCK.lock();
        assert!(!is_ready());
        create();
        assert!(is_ready());
        destroy();
        assert!(!is_ready());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let _guard = TEST_LOCK.lock();
        create();
        destroy();
        assert!(!is_ready());
        destroy();
        assert!(!is_ready());
    }

    #[test]
    fn test_create_reinitializes() {
        let _guard = TEST_LOCK.lock();
        create();
        write("n", 1i32, true).unwrap();
        create();
        // Re-creation starts from an empty board.
        assert!(matches!(
            read::<i32>("n"),
            Err(BlackboardError::KeyNotFound { .. })
        ));
        destroy();
    }

    #[test]
    fn test_operations_fail_without_instance() {
        let _guard = TEST_LOCK.lock();
        destroy();
        assert_eq!(write("n", 1i32, true), Err(BlackboardError::NotInitialized));
        assert_eq!(read::<i32>("n"), Err(BlackboardError::NotInitialized));
        assert_eq!(read_or_default::<i32>("n"), Err(BlackboardError::NotInitialized));
        assert_eq!(wipe_type_key::<i32>("n"), Err(BlackboardError::NotInitialized));
        assert_eq!(wipe_key("n"), Err(BlackboardError::NotInitialized));
        assert_eq!(wipe_board(true), Err(BlackboardError::NotInitialized));
        assert_eq!(
            subscribe_key::<i32, _>("n", |_| {}),
            Err(BlackboardError::NotInitialized)
        );
        assert_eq!(
            subscribe_value::<i32, _>("n", |_| {}),
            Err(BlackboardError::NotInitialized)
        );
        assert_eq!(
            subscribe_key_value::<i32, _>("n", |_, _| {}),
            Err(BlackboardError::NotInitialized)
        );
        assert_eq!(unsubscribe::<i32>("n"), Err(BlackboardError::NotInitialized));
        assert_eq!(unsubscribe_all("n"), Err(BlackboardError::NotInitialized));
    }

    #[test]
    fn test_example_scenario() {
        with_fresh_board(|| {
            write("Number", 42i32, true).unwrap();

            static OBSERVED: AtomicUsize = AtomicUsize::new(0);
            OBSERVED.store(0, AtomicOrdering::SeqCst);
            subscribe_value::<i32, _>("Number", |value| {
                assert_eq!(*value, 7);
                OBSERVED.fetch_add(1, AtomicOrdering::SeqCst);
            })
            .unwrap();

            write("Number", 7i32, true).unwrap();
            assert_eq!(OBSERVED.load(AtomicOrdering::SeqCst), 1);
            assert_eq!(read::<i32>("Number").unwrap(), 7);
        });
    }

    #[test]
    fn test_global_write_read_across_threads() {
        with_fresh_board(|| {
            write("shared", 10i32, true).unwrap();
            let handle = std::thread::spawn(|| read::<i32>("shared").unwrap());
            assert_eq!(handle.join().unwrap(), 10);
        });
    }

    #[test]
    fn test_global_wipe_and_unsubscribe_paths() {
        with_fresh_board(|| {
            write("K", 1i32, true).unwrap();
            write("K", "s".to_string(), true).unwrap();

            wipe_type_key::<i32>("K").unwrap();
            assert!(read::<i32>("K").is_err());
            assert_eq!(read::<String>("K").unwrap(), "s");

            write("K", 2i32, true).unwrap();
            wipe_key("K").unwrap();
            assert!(read::<i32>("K").is_err());
            assert!(read::<String>("K").is_err());

            subscribe_key::<i32, _>("K", |_| {}).unwrap();
            unsubscribe_all("K").unwrap();
            wipe_board(true).unwrap();
        });
    }
}
