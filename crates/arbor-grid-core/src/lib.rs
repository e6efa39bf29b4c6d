//! Core primitives for the Arbor grid data engine.
//!
//! This crate provides the change-notification layer shared by the data
//! engine and its consumers:
//!
//! - **Signal/Slot System**: Type-safe notifications a data source emits when
//!   its base data or derived view changes
//!
//! The engine is single-threaded and synchronous: signals are always invoked
//! directly on the emitting call stack, in connection order, before the
//! emitting operation returns. There is no queued or cross-thread dispatch.
//!
//! # Example
//!
//! ```
//! use arbor_grid_core::Signal;
//!
//! // Create a signal that notifies with the new record count
//! let data_changed = Signal::<usize>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = data_changed.connect(|count| {
//!     println!("data source now holds {} records", count);
//! });
//!
//! // Emit the signal
//! data_changed.emit(42);
//!
//! // Disconnect when done
//! data_changed.disconnect(conn_id);
//! ```

mod signal;

pub use signal::{ConnectionGuard, ConnectionId, Signal};
