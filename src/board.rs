//! The blackboard handle — type-keyed partitions behind one re-entrant lock.
//!
//! A [`Blackboard`] owns one partition per distinct value type, created
//! lazily the first time a type is written,
//! read, or subscribed. Every operation is parameterized by the value type
//! and runs synchronously to completion while holding the single
//! store-wide lock.
//!
//! # Locking
//!
//! The lock is a `parking_lot::ReentrantMutex` wrapping a `RefCell` of the
//! partition registry. Callbacks fire on the writer's thread with the
//! mutex still held, but the `RefCell` borrow is released first, so a
//! callback may call back into the same board (write another key,
//! subscribe, wipe) without deadlock or borrow panic. A callback that
//! writes its own key recurses unboundedly; keeping that recursion finite
//! is the subscriber's responsibility. Across threads the mutex serializes
//! all operations globally, so a long-running callback on one thread
//! blocks every other thread, including operations on unrelated types.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::ReentrantMutex;

use crate::error::{BlackboardError, Result};
use crate::partition::{AnyPartition, Partition};

/// Registry of type-erased partitions, keyed by `TypeId`.
///
/// `TypeId` is exact and stable for the process lifetime, so partition
/// lookup can never alias two distinct types.
struct BoardState {
    partitions: HashMap<TypeId, Box<dyn AnyPartition>>,
}

impl BoardState {
    /// Fetch the partition for `T`, creating it if this is the first
    /// operation ever to mention `T`.
    fn partition_mut<T: Send + 'static>(&mut self) -> &mut Partition<T> {
        self.partitions
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Partition::<T>::new()))
            .as_any_mut()
            .downcast_mut::<Partition<T>>()
            // Safety: the entry for TypeId::of::<T>() only ever holds a
            // Partition<T>.
            .unwrap()
    }
}

/// A process-wide, type-heterogeneous key-value store with per-key change
/// notification.
///
/// Values of arbitrary `Clone + Send + 'static` types are stored under
/// string keys, partitioned by type: the same key names independent
/// entries in each type's partition. Writes are last-write-wins and may
/// raise up to three callbacks (one per registered shape) synchronously
/// on the writing thread.
///
/// Most programs use the process-wide instance managed by
/// [`create`](crate::create) / [`destroy`](crate::destroy) rather than
/// holding a `Blackboard` directly; the handle exists so the store can
/// also be owned and threaded explicitly.
///
/// # Example
///
/// ```
/// use blackboard::Blackboard;
///
/// let board = Blackboard::new();
/// board.write("Number", 42i32, true);
/// assert_eq!(board.read::<i32>("Number").unwrap(), 42);
///
/// // The same key in another type's partition is a different entry.
/// board.write("Number", "forty-two".to_string(), true);
/// assert_eq!(board.read::<i32>("Number").unwrap(), 42);
/// ```
pub struct Blackboard {
    state: ReentrantMutex<RefCell<BoardState>>,
}

impl Default for Blackboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Blackboard {
    /// Create an empty blackboard with no partitions.
    pub fn new() -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(BoardState {
                partitions: HashMap::new(),
            })),
        }
    }

    // --- Data reading/writing ---

    /// Store `value` of type `T` at `key`, overwriting any prior value in
    /// `T`'s partition (last-write-wins, no merge).
    ///
    /// When `raise_callbacks` is true, the callbacks registered for `key`
    /// fire after the value is stored, in fixed order: key-only, then
    /// value-only (receiving the just-stored value), then key+value. Each
    /// shape fires at most once; unregistered shapes are skipped. When
    /// `raise_callbacks` is false no callback fires regardless of
    /// registration.
    pub fn write<T>(&self, key: &str, value: T, raise_callbacks: bool)
    where
        T: Clone + Send + 'static,
    {
        let guard = self.state.lock();
        let callbacks = {
            let mut state = guard.borrow_mut();
            let partition = state.partition_mut::<T>();
            partition.values.insert(key.to_owned(), value.clone());
            raise_callbacks.then(|| partition.callbacks_for(key))
        };
        // Borrow released; the lock stays held so callbacks observe a
        // consistent board and may re-enter from this thread.
        if let Some(callbacks) = callbacks {
            log::trace!("write {:?} ({}) raising callbacks", key, std::any::type_name::<T>());
            if let Some(cb) = callbacks.key {
                cb(key);
            }
            if let Some(cb) = callbacks.value {
                cb(&value);
            }
            if let Some(cb) = callbacks.pair {
                cb(key, &value);
            }
        }
    }

    /// Read the value of type `T` stored at `key`.
    ///
    /// Returns [`BlackboardError::KeyNotFound`] if `key` was never written
    /// (or has been wiped) in `T`'s partition. Reading never inserts; use
    /// [`read_or_default`](Self::read_or_default) when default-value
    /// semantics are wanted.
    pub fn read<T>(&self, key: &str) -> Result<T>
    where
        T: Clone + Send + 'static,
    {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        state
            .partition_mut::<T>()
            .values
            .get(key)
            .cloned()
            .ok_or_else(|| BlackboardError::KeyNotFound {
                key: key.to_owned(),
                type_name: std::any::type_name::<T>(),
            })
    }

    /// Read the value of type `T` at `key`, inserting `T::default()` first
    /// if the key is absent.
    ///
    /// This is the explicit opt-in form of default-value semantics: unlike
    /// [`read`](Self::read) it grows the partition on a miss, and it does
    /// so as a documented effect rather than a hidden side effect of a
    /// read. No callbacks fire for the default insertion.
    pub fn read_or_default<T>(&self, key: &str) -> T
    where
        T: Clone + Default + Send + 'static,
    {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        state
            .partition_mut::<T>()
            .values
            .entry(key.to_owned())
            .or_default()
            .clone()
    }

    /// Remove the entry for `key` from `T`'s partition only.
    ///
    /// Entries under the same key in other types' partitions are
    /// untouched, as are callback registrations. No-op if absent.
    pub fn wipe_type_key<T: Send + 'static>(&self, key: &str) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        state.partition_mut::<T>().wipe_key(key);
    }

    /// Remove `key` from every partition currently registered, regardless
    /// of type. Partitions that never held the key are unaffected.
    pub fn wipe_key(&self, key: &str) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        for partition in state.partitions.values_mut() {
            partition.wipe_key(key);
        }
    }

    /// Clear all values in every partition.
    ///
    /// When `wipe_callbacks` is set, additionally drops every callback
    /// registration of every shape. Partitions themselves stay registered
    /// for their types, just empty.
    pub fn wipe_board(&self, wipe_callbacks: bool) {
        log::debug!("wiping board (wipe_callbacks: {wipe_callbacks})");
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        for partition in state.partitions.values_mut() {
            partition.wipe_values();
            if wipe_callbacks {
                partition.clear_callbacks();
            }
        }
    }

    // --- Callback subscription ---

    /// Register the key-only callback for `key` in `T`'s partition,
    /// replacing any previous key-only callback for that key.
    ///
    /// Callbacks of the other two shapes for the same key are independent
    /// and unaffected, so a key can carry up to three active callbacks at
    /// once, one per shape. The board holds the closure behind an `Arc`
    /// and never manages the lifetime of anything it captures.
    pub fn subscribe_key<T, F>(&self, key: &str, callback: F)
    where
        T: Send + 'static,
        F: Fn(&str) + Send + Sync + 'static,
    {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        state
            .partition_mut::<T>()
            .key_callbacks
            .insert(key.to_owned(), Arc::new(callback));
    }

    /// Register the value-only callback for `key` in `T`'s partition,
    /// replacing any previous value-only callback for that key.
    pub fn subscribe_value<T, F>(&self, key: &str, callback: F)
    where
        T: Send + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        state
            .partition_mut::<T>()
            .value_callbacks
            .insert(key.to_owned(), Arc::new(callback));
    }

    /// Register the key+value callback for `key` in `T`'s partition,
    /// replacing any previous key+value callback for that key.
    pub fn subscribe_key_value<T, F>(&self, key: &str, callback: F)
    where
        T: Send + 'static,
        F: Fn(&str, &T) + Send + Sync + 'static,
    {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        state
            .partition_mut::<T>()
            .pair_callbacks
            .insert(key.to_owned(), Arc::new(callback));
    }

    /// Remove all three callback shapes for `key` within `T`'s partition.
    /// Stored values are untouched.
    pub fn unsubscribe<T: Send + 'static>(&self, key: &str) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        state.partition_mut::<T>().unsubscribe(key);
    }

    /// Remove all callback shapes for `key` across every partition,
    /// regardless of type.
    pub fn unsubscribe_all(&self, key: &str) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        for partition in state.partitions.values_mut() {
            partition.unsubscribe(key);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
