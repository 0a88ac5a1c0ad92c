use std::{
	collections::BTreeMap,
	fmt::{self, Debug, Formatter},
	mem,
	sync::Arc,
	task::Waker,
};

use futures_lite::future;
use parking_lot::Mutex;
use tracing::trace;

use super::waiter::{Predicate, Waiter, WaiterId, WaiterSlot};
use crate::{Cancelled, WaitFor};

/// A value that callers can wait on until it satisfies a predicate.
///
/// Every mutation evaluates the predicates of all pending waits against the new value before
/// the cell's lock is released, so no wait misses a value and no wait sees one twice.
///
/// This is the unmanaged form. Use [`ValueCell`](`crate::ValueCell`) to share one between
/// threads or tasks without borrowing.
pub struct RawValueCell<T> {
	state: Mutex<CellState<T>>,
}

struct CellState<T> {
	value: T,
	waiters: BTreeMap<WaiterId, Waiter<T>>,
	/// The most recently issued [`WaiterId`].
	last_id: u64,
}

impl<T> CellState<T> {
	/// Completes each waiter that accepts the current value.
	///
	/// **Returns** the wakers of the tasks to resume. Wake them only after releasing the lock.
	#[must_use]
	fn notify(&mut self) -> Vec<Waker>
	where
		T: Clone,
	{
		let Self { value, waiters, .. } = self;
		let mut wakers = Vec::new();
		for (&id, waiter) in waiters.iter_mut() {
			waiter.try_deliver(id, value, &mut wakers);
		}
		wakers
	}
}

fn wake_all(wakers: Vec<Waker>) {
	if !wakers.is_empty() {
		trace!(count = wakers.len(), "resuming waits");
	}
	wakers.into_iter().for_each(Waker::wake);
}

impl<T: Debug> Debug for RawValueCell<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.state.try_lock() {
			Some(state) => f
				.debug_struct("RawValueCell")
				.field("value", &state.value)
				.field("waiters", &state.waiters.len())
				.finish(),
			None => f
				.debug_struct("RawValueCell")
				.field("value", &"(locked)")
				.finish_non_exhaustive(),
		}
	}
}

impl<T: Default> Default for RawValueCell<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T> From<T> for RawValueCell<T> {
	fn from(value: T) -> Self {
		Self::new(value)
	}
}

impl<T> RawValueCell<T> {
	/// Creates a new [`RawValueCell`] with no pending waits.
	#[must_use]
	pub const fn new(initial_value: T) -> Self {
		Self {
			state: Mutex::new(CellState {
				value: initial_value,
				waiters: BTreeMap::new(),
				last_id: 0,
			}),
		}
	}

	/// Clones the current value.
	#[must_use]
	pub fn read(&self) -> T
	where
		T: Clone,
	{
		self.state.lock().value.clone()
	}

	/// Runs `f` on the current value while holding the lock.
	///
	/// `f` **must not** access this cell.
	pub fn read_with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
		f(&self.state.lock().value)
	}

	/// Replaces the value and resumes each pending wait that accepts the new one.
	pub fn write(&self, new_value: T)
	where
		T: Clone,
	{
		self.modify(|value| *value = new_value);
	}

	/// Like [`write`](`RawValueCell::write`), but **returns** the previous value.
	pub fn replace(&self, new_value: T) -> T
	where
		T: Clone,
	{
		self.modify(|value| mem::replace(value, new_value))
	}

	/// Writes `new_value` only if it differs from the current value.
	///
	/// # Returns
	///
	/// [`Ok`] with the previous value iff the value changed (and waits were notified),
	/// otherwise [`Err`] with `new_value`.
	///
	/// # Errors
	///
	/// Iff the current value equals `new_value`. This is not a failure as such.
	pub fn change(&self, new_value: T) -> Result<T, T>
	where
		T: Clone + PartialEq,
	{
		let mut state = self.state.lock();
		if state.value == new_value {
			Err(new_value)
		} else {
			let previous = mem::replace(&mut state.value, new_value);
			let wakers = state.notify();
			drop(state);
			wake_all(wakers);
			Ok(previous)
		}
	}

	/// Transforms the value in place, then resumes each pending wait that accepts the result.
	///
	/// `transform` runs under the same lock acquisition as the notification, which makes
	/// read-modify-write sequences (like appending) atomic with regard to all waits.
	/// `transform` **must not** access this cell.
	///
	/// Resumed tasks are woken after the lock is released, so wakers may use this cell.
	pub fn modify<U>(&self, transform: impl FnOnce(&mut T) -> U) -> U
	where
		T: Clone,
	{
		let mut state = self.state.lock();
		let u = transform(&mut state.value);
		let wakers = state.notify();
		drop(state);
		wake_all(wakers);
		u
	}

	/// Waits until `predicate` accepts the value, then resolves to a clone of that value.
	///
	/// The returned future is lazy. When first polled, it checks the current value and, if that
	/// doesn't match, registers itself with the cell. After that, it only ever resolves to the
	/// *first* accepted value written after registration, even if more writes follow before it is
	/// polled again.
	///
	/// `predicate` runs under the cell's lock and **must not** access this cell.
	///
	/// # Cancellation
	///
	/// Use [`WaitFor::canceller`] or [`WaitFor::cancel_on`] to resolve to [`Cancelled`] instead.
	/// Dropping the future also withdraws it.
	pub fn wait_for(&self, predicate: impl 'static + Send + FnMut(&T) -> bool) -> WaitFor<'_, T>
	where
		T: Clone,
	{
		WaitFor::new(self, Box::new(predicate))
	}

	/// Blocks the current thread until `predicate` accepts the value.
	///
	/// # Errors
	///
	/// Never, as nothing can reach this wait's canceller. (The [`Result`] matches [`wait_for`](`RawValueCell::wait_for`).)
	pub fn wait_for_blocking(
		&self,
		predicate: impl 'static + Send + FnMut(&T) -> bool,
	) -> Result<T, Cancelled>
	where
		T: Clone,
	{
		future::block_on(self.wait_for(predicate))
	}

	/// Whether there currently are no registered waits. Diagnostic only.
	#[must_use]
	pub fn is_idle(&self) -> bool {
		self.state.lock().waiters.is_empty()
	}

	/// The number of currently registered waits. Diagnostic only.
	#[must_use]
	pub fn waiter_count(&self) -> usize {
		self.state.lock().waiters.len()
	}

	/// Exclusive access needs no lock, and no waits can be pending.
	pub fn get_mut(&mut self) -> &mut T {
		&mut self.state.get_mut().value
	}

	/// Consumes the cell, **returning** its value.
	#[must_use]
	pub fn into_inner(self) -> T {
		self.state.into_inner().value
	}

	/// Completes `slot` right away if `predicate` accepts the current value.
	/// Otherwise registers a [`Waiter`] for it.
	///
	/// **Returns** the registration's id, if any.
	pub(crate) fn register(
		&self,
		mut predicate: Predicate<T>,
		slot: &Arc<WaiterSlot<T>>,
	) -> Option<WaiterId>
	where
		T: Clone,
	{
		let mut state = self.state.lock();
		if predicate(&state.value) {
			let mut wakers = Vec::new();
			let won = slot.complete_deferred(Ok(state.value.clone()), &mut wakers);
			drop(state);
			drop(predicate);
			if won {
				trace!("immediate match");
			}
			wake_all(wakers);
			return None;
		}

		state.last_id += 1;
		let id = WaiterId::new(state.last_id);
		state
			.waiters
			.insert(id, Waiter::new(predicate, Arc::clone(slot)));
		trace!(
			waiter = id.get(),
			waiters = state.waiters.len(),
			"registered waiter"
		);
		Some(id)
	}

	pub(crate) fn deregister(&self, id: WaiterId) {
		let mut state = self.state.lock();
		let removed = state.waiters.remove(&id);
		let remaining = state.waiters.len();
		drop(state);

		// Dropping the predicate runs foreign code.
		debug_assert!(removed.is_some(), "Waiter {id:?} was removed twice.");
		drop(removed);
		trace!(waiter = id.get(), waiters = remaining, "removed waiter");
	}
}
