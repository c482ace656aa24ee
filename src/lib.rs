//! # Blackboard
//!
//! A process-wide, type-heterogeneous key-value store with per-key change
//! notification.
//!
//! Independent subsystems publish and observe named values of arbitrary
//! types without knowing about each other: the board keeps one partition
//! per value type, so `write("K", 42i32, ..)` and
//! `write("K", "text".to_string(), ..)` are independent entries, and a
//! read only ever sees the partition of the type it asks for.
//!
//! Per key, subscribers may register up to three callbacks — key-only,
//! value-only, and key+value — which fire in that fixed order on every
//! callback-raising write, synchronously on the writing thread. One
//! store-wide re-entrant lock serializes all operations, so callbacks may
//! call back into the board from the same thread.
//!
//! Most programs use the process-wide instance:
//!
//! ```
//! blackboard::create();
//!
//! blackboard::write("Number", 42i32, true).unwrap();
//! blackboard::subscribe_value::<i32, _>("Number", |value| {
//!     println!("Number is now {value}");
//! }).unwrap();
//! blackboard::write("Number", 7i32, true).unwrap();
//! assert_eq!(blackboard::read::<i32>("Number").unwrap(), 7);
//!
//! blackboard::destroy();
//! ```
//!
//! A [`Blackboard`] can also be owned directly and threaded through call
//! sites when a global is unwanted.
//!
//! Value types must be `Clone + Send + 'static`: writes store a copy, and
//! reads hand one back.

pub mod board;
pub mod error;
pub mod global;
mod partition;

pub use board::Blackboard;
pub use error::{BlackboardError, Result};
pub use global::{
    create, destroy, is_ready, read, read_or_default, subscribe_key, subscribe_key_value,
    subscribe_value, unsubscribe, unsubscribe_all, wipe_board, wipe_key, wipe_type_key, write,
};
pub use partition::{KeyCallback, KeyValueCallback, ValueCallback};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
