use std::{sync::Barrier, thread};

use futures_lite::future::block_on;
use waitable::ValueCell;

use _block_on::{assert_pending, assert_ready, WakeCounter};


#[test]
fn chips() {
	_logging::init();

	let cell = ValueCell::new(None::<&str>);
	let mut waits: Vec<_> = (0..3).map(|_| cell.wait_for(Option::is_some)).collect();
	let counters: Vec<_> = (0..3).map(|_| WakeCounter::new()).collect();
	for (wait, counter) in waits.iter_mut().zip(&counters) {
		assert!(counter.poll(wait).is_pending());
	}
	assert_eq!(cell.waiter_count(), 3);

	cell.write(Some("Chips"));

	for (wait, counter) in waits.iter_mut().zip(&counters) {
		assert_eq!(counter.count(), 1);
		assert_eq!(assert_ready(wait), Ok(Some("Chips")));
	}
	assert!(cell.is_idle());
}

#[test]
fn chips_across_threads() {
	_logging::init();

	let cell = ValueCell::new(None::<&str>);
	let registered = &Barrier::new(4);

	thread::scope(|s| {
		let cell = &cell;
		let waiting: Vec<_> = (0..3)
			.map(|_| {
				s.spawn(move || {
					let mut wait = cell.wait_for(Option::is_some);
					assert_pending(&mut wait);
					registered.wait();
					block_on(wait)
				})
			})
			.collect();

		registered.wait();
		assert_eq!(cell.waiter_count(), 3);
		cell.write(Some("Chips"));

		for handle in waiting {
			assert_eq!(handle.join().unwrap(), Ok(Some("Chips")));
		}
	});

	assert!(cell.is_idle());
}

#[test]
fn only_matching_waits_resume() {
	let cell = ValueCell::new(0);
	let mut small = cell.wait_for(|v| *v >= 1);
	let mut large = cell.wait_for(|v| *v >= 10);
	assert_pending(&mut small);
	assert_pending(&mut large);

	cell.write(5);
	assert_eq!(assert_ready(&mut small), Ok(5));
	assert_pending(&mut large);
	assert_eq!(cell.waiter_count(), 1);

	cell.write(10);
	assert_eq!(assert_ready(&mut large), Ok(10));
	assert!(cell.is_idle());
}
