//! Unmanaged building blocks. [`ValueCell`](`crate::ValueCell`) wraps these in an [`Arc`](`std::sync::Arc`).

mod raw_value_cell;
pub use raw_value_cell::RawValueCell;

pub(crate) mod waiter;
