//! Per-type storage partitions.
//!
//! Each distinct value type gets its own [`Partition<T>`]: a key→value map
//! plus three callback maps, one per notification shape. Partitions are
//! held type-erased behind the [`AnyPartition`] capability trait so the
//! board can wipe keys, clear values, and drop subscriptions across every
//! type without knowing the concrete `T`.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Callback fired with the key that changed.
pub type KeyCallback = Arc<dyn Fn(&str) + Send + Sync>;
/// Callback fired with the just-stored value.
pub type ValueCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
/// Callback fired with both the key and the just-stored value.
pub type KeyValueCallback<T> = Arc<dyn Fn(&str, &T) + Send + Sync>;

/// The callbacks registered for one key, cloned out of the partition so
/// they can be invoked after the state borrow is released.
pub(crate) struct KeyedCallbacks<T> {
    pub key: Option<KeyCallback>,
    pub value: Option<ValueCallback<T>>,
    pub pair: Option<KeyValueCallback<T>>,
}

/// Type-erased operations the board needs across all partitions.
///
/// Implemented only by [`Partition<T>`]; `as_any_mut` recovers the
/// concrete partition for typed operations.
pub(crate) trait AnyPartition: Send {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Remove the value stored at `key`, leaving callbacks registered.
    fn wipe_key(&mut self, key: &str);

    /// Remove every stored value, leaving callbacks registered.
    fn wipe_values(&mut self);

    /// Remove all three callback shapes registered for `key`.
    fn unsubscribe(&mut self, key: &str);

    /// Remove every callback registration of every shape.
    fn clear_callbacks(&mut self);
}

/// Keyed values and callbacks for a single value type `T`.
///
/// At most one callback per shape is kept per key; registering the same
/// shape again replaces the previous callback for that shape only.
pub(crate) struct Partition<T> {
    pub values: HashMap<String, T>,
    pub key_callbacks: HashMap<String, KeyCallback>,
    pub value_callbacks: HashMap<String, ValueCallback<T>>,
    pub pair_callbacks: HashMap<String, KeyValueCallback<T>>,
}

impl<T> Partition<T> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            key_callbacks: HashMap::new(),
            value_callbacks: HashMap::new(),
            pair_callbacks: HashMap::new(),
        }
    }

    /// Clone out whatever callbacks are registered for `key`.
    ///
    /// Cloning the `Arc`s lets the caller drop its borrow of the partition
    /// before invoking them, which is what makes re-entrant writes from
    /// inside a callback possible.
    pub fn callbacks_for(&self, key: &str) -> KeyedCallbacks<T> {
        KeyedCallbacks {
            key: self.key_callbacks.get(key).cloned(),
            value: self.value_callbacks.get(key).cloned(),
            pair: self.pair_callbacks.get(key).cloned(),
        }
    }
}

impl<T: Send + 'static> AnyPartition for Partition<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn wipe_key(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn wipe_values(&mut self) {
        self.values.clear();
    }

    fn unsubscribe(&mut self, key: &str) {
        self.key_callbacks.remove(key);
        self.value_callbacks.remove(key);
        self.pair_callbacks.remove(key);
    }

    fn clear_callbacks(&mut self) {
        self.key_callbacks.clear();
        self.value_callbacks.clear();
        self.pair_callbacks.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
