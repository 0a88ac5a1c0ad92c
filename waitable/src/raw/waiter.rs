//! A single pending wait: its predicate, and the one-shot slot its result lands in.
//!
//! [`Waiter`] lives in the cell's registry and is only touched under the cell lock.
//! [`WaiterSlot`] is shared between that entry, the suspended future and any cancellers,
//! and has its own (short) critical section.

use std::{
	fmt::{self, Debug, Formatter},
	mem,
	num::NonZeroU64,
	sync::Arc,
	task::{Context, Poll, Waker},
};

use parking_lot::Mutex;
use tracing::trace;

use crate::Cancelled;

pub(crate) type Predicate<T> = Box<dyn 'static + Send + FnMut(&T) -> bool>;

/// Registry key of a [`Waiter`]. Assigned from a per-cell counter, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct WaiterId(NonZeroU64);

impl WaiterId {
	pub(crate) fn new(raw: u64) -> Self {
		Self(raw.try_into().expect("infallible within reasonable time"))
	}

	pub(crate) fn get(self) -> u64 {
		self.0.get()
	}
}

pub(crate) struct Waiter<T> {
	predicate: Predicate<T>,
	slot: Arc<WaiterSlot<T>>,
}

impl<T> Debug for Waiter<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Waiter")
			.field("slot", &self.slot)
			.finish_non_exhaustive()
	}
}

impl<T> Waiter<T> {
	pub(crate) fn new(predicate: Predicate<T>, slot: Arc<WaiterSlot<T>>) -> Self {
		Self { predicate, slot }
	}

	/// Completes the slot with a clone of `value` iff the predicate accepts it.
	///
	/// Completed waiters don't evaluate their predicate again.
	/// The waiting task's waker, if any, is pushed onto `wakers` instead of being woken.
	pub(crate) fn try_deliver(&mut self, id: WaiterId, value: &T, wakers: &mut Vec<Waker>)
	where
		T: Clone,
	{
		if self.slot.is_completed() {
			return;
		}
		if (self.predicate)(value) && self.slot.complete_deferred(Ok(value.clone()), wakers) {
			trace!(waiter = id.get(), "delivered matching value");
		}
	}
}

enum SlotState<T> {
	/// Registered, but the waiting task hasn't parked yet.
	Pending,
	Suspended(Waker),
	Completed(Result<T, Cancelled>),
	/// The result was handed to the waiting task.
	Consumed,
}

/// One-shot result slot, first writer wins.
pub(crate) struct WaiterSlot<T> {
	state: Mutex<SlotState<T>>,
}

impl<T> Debug for WaiterSlot<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let state = match self.state.try_lock().as_deref() {
			None => "(locked)",
			Some(SlotState::Pending) => "Pending",
			Some(SlotState::Suspended(_)) => "Suspended",
			Some(SlotState::Completed(Ok(_))) => "Completed(Ok(..))",
			Some(SlotState::Completed(Err(Cancelled))) => "Completed(Err(Cancelled))",
			Some(SlotState::Consumed) => "Consumed",
		};
		f.debug_tuple("WaiterSlot").field(&state).finish()
	}
}

impl<T> WaiterSlot<T> {
	pub(crate) const fn new() -> Self {
		Self {
			state: Mutex::new(SlotState::Pending),
		}
	}

	pub(crate) fn is_completed(&self) -> bool {
		matches!(
			*self.state.lock(),
			SlotState::Completed(_) | SlotState::Consumed
		)
	}

	/// **Returns** whether `result` was stored, i.e. whether this call won.
	///
	/// Wakes the suspended task (if any) after releasing the slot lock.
	/// Not for use under the cell lock, see [`complete_deferred`](`WaiterSlot::complete_deferred`).
	pub(crate) fn complete(&self, result: Result<T, Cancelled>) -> bool {
		let mut wakers = Vec::new();
		let won = self.complete_deferred(result, &mut wakers);
		wakers.into_iter().for_each(Waker::wake);
		won
	}

	/// Like [`complete`](`WaiterSlot::complete`), but pushes the suspended task's waker onto
	/// `wakers` for the caller to wake once it has released its own locks.
	pub(crate) fn complete_deferred(
		&self,
		result: Result<T, Cancelled>,
		wakers: &mut Vec<Waker>,
	) -> bool {
		let mut state = self.state.lock();
		let waker = match mem::replace(&mut *state, SlotState::Consumed) {
			SlotState::Pending => None,
			SlotState::Suspended(waker) => Some(waker),
			done @ (SlotState::Completed(_) | SlotState::Consumed) => {
				*state = done;
				return false;
			}
		};
		*state = SlotState::Completed(result);

		// This is the only transition out of `Suspended`, so each slot wakes at most once.
		wakers.extend(waker);
		true
	}

	pub(crate) fn cancel(&self) -> bool {
		self.complete(Err(Cancelled))
	}

	/// Parks the current task on this slot, or takes the result if it already arrived.
	///
	/// # Panics
	///
	/// Iff the result was already taken.
	pub(crate) fn poll_result(&self, cx: &mut Context<'_>) -> Poll<Result<T, Cancelled>> {
		let mut state = self.state.lock();
		match mem::replace(&mut *state, SlotState::Consumed) {
			SlotState::Pending => {
				*state = SlotState::Suspended(cx.waker().clone());
				Poll::Pending
			}
			SlotState::Suspended(waker) => {
				*state = SlotState::Suspended(if waker.will_wake(cx.waker()) {
					waker
				} else {
					cx.waker().clone()
				});
				Poll::Pending
			}
			SlotState::Completed(result) => Poll::Ready(result),
			SlotState::Consumed => panic!("Polled a `WaiterSlot` whose result was already taken."),
		}
	}
}
