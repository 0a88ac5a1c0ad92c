//! The futures returned by [`RawValueCell::wait_for`], and their cancellation handles.

use std::{
	fmt::{self, Debug, Formatter},
	future::Future,
	mem,
	pin::Pin,
	sync::{Arc, Weak},
	task::{ready, Context, Poll},
};

use pin_project::pin_project;
use tracing::{debug, trace};

use crate::{
	raw::{
		waiter::{Predicate, WaiterId, WaiterSlot},
		RawValueCell,
	},
	Cancelled,
};

/// Future returned from [`RawValueCell::wait_for`].
///
/// Resolves to the first value accepted by its predicate, or to [`Cancelled`].
///
/// Dropping this future withdraws the wait from its cell.
#[must_use = "futures do nothing unless `.await`ed or `poll`ed"]
pub struct WaitFor<'a, T> {
	cell: &'a RawValueCell<T>,
	slot: Arc<WaiterSlot<T>>,
	stage: Stage<T>,
}

enum Stage<T> {
	/// Not polled yet.
	Unregistered(Predicate<T>),
	Registered(WaiterId),
	/// Never registered, or already deregistered.
	Done,
}

impl<T> Debug for WaitFor<'_, T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let stage = match self.stage {
			Stage::Unregistered(_) => "Unregistered",
			Stage::Registered(_) => "Registered",
			Stage::Done => "Done",
		};
		f.debug_struct("WaitFor")
			.field("stage", &stage)
			.field("slot", &self.slot)
			.finish_non_exhaustive()
	}
}

impl<'a, T> WaitFor<'a, T> {
	pub(crate) fn new(cell: &'a RawValueCell<T>, predicate: Predicate<T>) -> Self {
		Self {
			cell,
			slot: Arc::new(WaiterSlot::new()),
			stage: Stage::Unregistered(predicate),
		}
	}

	/// Creates a handle that can cancel this wait from anywhere.
	///
	/// Cancelling before the first poll means the predicate is never evaluated.
	pub fn canceller(&self) -> Canceller<T> {
		Canceller {
			slot: Arc::downgrade(&self.slot),
		}
	}

	/// Cancels this wait once `signal` resolves, unless a value was accepted first.
	pub fn cancel_on<S: Future>(self, signal: S) -> CancelOn<'a, T, S> {
		CancelOn {
			wait: self,
			signal: Some(signal),
		}
	}
}

impl<T: Clone> Future for WaitFor<'_, T> {
	type Output = Result<T, Cancelled>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let this = self.get_mut();

		match mem::replace(&mut this.stage, Stage::Done) {
			Stage::Unregistered(predicate) => {
				if !this.slot.is_completed() {
					if let Some(id) = this.cell.register(predicate, &this.slot) {
						this.stage = Stage::Registered(id);
					}
				}
			}
			registered @ Stage::Registered(_) => this.stage = registered,
			Stage::Done => (),
		}

		// Where registration found an immediate match or the wait was cancelled early, this is
		// ready right away. Otherwise it parks until a write or a canceller completes the slot.
		let result = ready!(this.slot.poll_result(cx));

		if let Stage::Registered(id) = mem::replace(&mut this.stage, Stage::Done) {
			this.cell.deregister(id);
		}
		if result.is_err() {
			debug!("wait cancelled");
		}
		Poll::Ready(result)
	}
}

impl<T> Drop for WaitFor<'_, T> {
	fn drop(&mut self) {
		if let Stage::Registered(id) = mem::replace(&mut self.stage, Stage::Done) {
			if self.slot.cancel() {
				trace!(waiter = id.get(), "withdrawn by drop");
			}
			self.cell.deregister(id);
		}
	}
}

/// Cancels one specific [`WaitFor`].
///
/// Created by [`WaitFor::canceller`]. Doesn't keep the wait alive.
pub struct Canceller<T> {
	slot: Weak<WaiterSlot<T>>,
}

impl<T> Clone for Canceller<T> {
	fn clone(&self) -> Self {
		Self {
			slot: Weak::clone(&self.slot),
		}
	}
}

impl<T> Debug for Canceller<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Canceller")
			.field(&self.slot.upgrade())
			.finish()
	}
}

impl<T> Canceller<T> {
	/// Resolves the wait to [`Cancelled`], unless it already has a result.
	///
	/// **Returns** whether this call decided the outcome.
	#[allow(clippy::must_use_candidate)]
	pub fn cancel(&self) -> bool {
		self.slot.upgrade().is_some_and(|slot| slot.cancel())
	}
}

/// Future returned from [`WaitFor::cancel_on`].
///
/// Polls the signal first, so a signal that is ready before the first poll wins over
/// a value that's already acceptable.
#[pin_project]
#[must_use = "futures do nothing unless `.await`ed or `poll`ed"]
pub struct CancelOn<'a, T, S> {
	wait: WaitFor<'a, T>,
	#[pin]
	signal: Option<S>,
}

impl<T, S> Debug for CancelOn<'_, T, S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("CancelOn")
			.field("wait", &self.wait)
			.field("signalled", &self.signal.is_none())
			.finish()
	}
}

impl<T: Clone, S: Future> Future for CancelOn<'_, T, S> {
	type Output = Result<T, Cancelled>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let mut this = self.project();

		if let Some(signal) = this.signal.as_mut().as_pin_mut() {
			if signal.poll(cx).is_ready() {
				this.signal.set(None);
				if this.wait.slot.cancel() {
					trace!("cancellation signal won");
				}
			}
		}

		Pin::new(this.wait).poll(cx)
	}
}
