#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
//! A shared value that async callers can wait on until it satisfies a predicate.
//!
//! Producers [`write`](`RawValueCell::write`) or [`modify`](`RawValueCell::modify`) the value.
//! Consumers [`wait_for`](`RawValueCell::wait_for`) a predicate and are woken exactly when a
//! mutation produces a value it accepts, with that value, and not before.
//!
//! ```
//! use futures_lite::future::block_on;
//! use waitable::ValueCell;
//!
//! let cell = ValueCell::new(None);
//!
//! std::thread::scope(|s| {
//! 	let waiting = s.spawn(|| block_on(cell.wait_for(Option::is_some)));
//! 	cell.write(Some("Chips"));
//! 	assert_eq!(waiting.join().unwrap(), Ok(Some("Chips")));
//! });
//!
//! assert!(cell.is_idle());
//! ```
//!
//! # Threading Notes
//!
//! Predicates run while the cell is locked, on whichever thread mutates it.
//! They **must not** access the cell and should be cheap.
//!
//! The order in which waits satisfied by the same mutation are resumed is unspecified.

mod error;
pub use error::Cancelled;

pub mod raw;
pub use raw::RawValueCell;

mod value_cell;
pub use value_cell::{ValueCell, WeakValueCell};

mod wait_for;
pub use wait_for::{CancelOn, Canceller, WaitFor};
