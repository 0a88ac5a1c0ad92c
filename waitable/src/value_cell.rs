use std::{
	fmt::{self, Debug, Formatter},
	ops::Deref,
	sync::{Arc, Weak},
};

use crate::raw::RawValueCell;

/// A shared handle to a [`RawValueCell`].
///
/// Cloning is cheap and yields another handle to the same cell, which lives as long as its
/// longest-lived handle. All of [`RawValueCell`]'s methods are available through [`Deref`].
pub struct ValueCell<T>(Arc<RawValueCell<T>>);

/// A non-owning [`ValueCell`] handle.
pub struct WeakValueCell<T>(Weak<RawValueCell<T>>);

impl<T> Clone for ValueCell<T> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<T> Clone for WeakValueCell<T> {
	fn clone(&self) -> Self {
		Self(Weak::clone(&self.0))
	}
}

impl<T: Debug> Debug for ValueCell<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ValueCell").field(&*self.0).finish()
	}
}

impl<T> Debug for WeakValueCell<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("WeakValueCell")
			.field(&format_args!("{:p}", self.0.as_ptr()))
			.finish()
	}
}

impl<T: Default> Default for ValueCell<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T> From<T> for ValueCell<T> {
	fn from(value: T) -> Self {
		Self::new(value)
	}
}

impl<T> Deref for ValueCell<T> {
	type Target = RawValueCell<T>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<T> ValueCell<T> {
	/// Creates a new [`ValueCell`] with no pending waits.
	#[must_use]
	pub fn new(initial_value: T) -> Self {
		Self(Arc::new(RawValueCell::new(initial_value)))
	}

	/// Creates a [`WeakValueCell`] that doesn't keep the cell alive.
	#[must_use]
	pub fn downgrade(&self) -> WeakValueCell<T> {
		WeakValueCell(Arc::downgrade(&self.0))
	}

	/// Whether both handles refer to the same cell.
	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl<T> WeakValueCell<T> {
	/// **Returns** a strong handle iff the cell is still alive.
	#[must_use]
	pub fn upgrade(&self) -> Option<ValueCell<T>> {
		self.0.upgrade().map(ValueCell)
	}
}
