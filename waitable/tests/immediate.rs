use proptest::prelude::*;
use waitable::{RawValueCell, ValueCell};

use _block_on::{assert_pending, assert_ready};

use _validator::Validator;

#[test]
fn lazy_until_polled() {
	static V: Validator<i32> = Validator::new();

	let cell = RawValueCell::new(1);
	let mut wait = cell.wait_for(|value| {
		V.push(*value);
		*value == 1
	});
	V.expect([]);
	assert!(cell.is_idle());

	assert_eq!(assert_ready(&mut wait), Ok(1));
	V.expect([1]);
	assert!(cell.is_idle());
}

#[test]
fn immediate_match_registers_nothing() {
	let cell = ValueCell::new(vec![1, 2, 3]);

	assert_eq!(
		assert_ready(cell.wait_for(|v| v.len() >= 3)),
		Ok(vec![1, 2, 3])
	);
	assert_eq!(cell.waiter_count(), 0);
}

#[test]
fn mismatch_registers_one_waiter() {
	let cell = ValueCell::new(0_u8);

	let mut wait = cell.wait_for(|v| *v > 0);
	assert_pending(&mut wait);
	assert_eq!(cell.waiter_count(), 1);

	// Re-polling doesn't register again.
	assert_pending(&mut wait);
	assert_eq!(cell.waiter_count(), 1);
}

#[test]
fn identical_predicates_stay_distinct() {
	let cell = ValueCell::new(false);

	let mut a = cell.wait_for(|v| *v);
	let mut b = cell.wait_for(|v| *v);
	assert_pending(&mut a);
	assert_pending(&mut b);
	assert_eq!(cell.waiter_count(), 2);

	drop(a);
	assert_eq!(cell.waiter_count(), 1);

	cell.write(true);
	assert_eq!(assert_ready(&mut b), Ok(true));
	assert!(cell.is_idle());
}

#[test]
fn blocking_returns_immediately() {
	let cell = RawValueCell::new("ready");
	assert_eq!(cell.wait_for_blocking(|v| v.starts_with('r')), Ok("ready"));
}

proptest! {
	#[test]
	fn accepted_value_is_returned_as_is(value: i64, threshold: i64) {
		prop_assume!(value >= threshold);

		let cell = RawValueCell::new(value);
		prop_assert_eq!(assert_ready(cell.wait_for(move |v| *v >= threshold)), Ok(value));
		prop_assert!(cell.is_idle());
	}

	#[test]
	fn rejected_value_keeps_waiting(value: i64, threshold: i64) {
		prop_assume!(value < threshold);

		let cell = RawValueCell::new(value);
		let mut wait = cell.wait_for(move |v| *v >= threshold);
		assert_pending(&mut wait);
		prop_assert_eq!(cell.waiter_count(), 1);
		drop(wait);
		prop_assert!(cell.is_idle());
	}
}
