//! Derived waits. Each one is [`RawValueCell::wait_for`] with a particular predicate.
//!
//! The ones returning [`WaitFor`] keep its cancellation methods. The projecting ones are plain
//! `async fn`s. Drop them to withdraw the wait.

use std::sync::Arc;

use waitable::{Cancelled, RawValueCell, WaitFor};

/// Waits until the sequence holds at least `len` elements.
pub fn wait_for_len<T, E>(cell: &RawValueCell<T>, len: usize) -> WaitFor<'_, T>
where
	T: 'static + Clone + AsRef<[E]>,
	E: 'static,
{
	cell.wait_for(move |value| value.as_ref().len() >= len)
}

/// Waits until the value equals `target`.
pub fn wait_for_eq<T>(cell: &RawValueCell<T>, target: T) -> WaitFor<'_, T>
where
	T: 'static + Send + Clone + PartialEq,
{
	cell.wait_for(move |value| *value == target)
}

/// Waits until the sequence has an element at `index`, and resolves to a clone of it.
///
/// # Errors
///
/// Iff the wait was cancelled.
pub async fn wait_for_index<T, E>(cell: &RawValueCell<T>, index: usize) -> Result<E, Cancelled>
where
	T: 'static + Clone + AsRef<[E]>,
	E: 'static + Clone,
{
	// A `Clone` impl could in theory not preserve what the predicate saw. Wait again then.
	loop {
		let value = cell
			.wait_for(move |value| value.as_ref().len() > index)
			.await?;
		if let Some(element) = value.as_ref().get(index) {
			return Ok(element.clone());
		}
	}
}

/// Waits until the [`Option`] is [`Some`], and resolves to a clone of its content.
///
/// # Errors
///
/// Iff the wait was cancelled.
pub async fn wait_for_some<V>(cell: &RawValueCell<Option<V>>) -> Result<V, Cancelled>
where
	V: 'static + Clone,
{
	loop {
		if let Some(value) = cell.wait_for(Option::is_some).await? {
			return Ok(value);
		}
	}
}

/// Waits until any element of the sequence satisfies `predicate`, and resolves to a clone of
/// the first one that does.
///
/// # Errors
///
/// Iff the wait was cancelled.
pub async fn wait_for_element<T, E>(
	cell: &RawValueCell<T>,
	predicate: impl 'static + Send + Sync + Fn(&E) -> bool,
) -> Result<E, Cancelled>
where
	T: 'static + Clone + AsRef<[E]>,
	E: 'static + Clone,
{
	let predicate = Arc::new(predicate);
	loop {
		let value = cell
			.wait_for({
				let predicate = Arc::clone(&predicate);
				move |value| value.as_ref().iter().any(|element| predicate(element))
			})
			.await?;
		if let Some(element) = value.as_ref().iter().find(|&element| predicate(element)) {
			return Ok(element.clone());
		}
	}
}
