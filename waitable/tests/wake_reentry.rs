use std::{
	future::Future,
	pin::Pin,
	sync::{mpsc, Arc},
	task::{Context, Wake, Waker},
	thread,
	time::Duration,
};

use parking_lot::Mutex;
use waitable::{RawValueCell, WaitFor};

use _block_on::{assert_pending, assert_ready};

static CELL: RawValueCell<i32> = RawValueCell::new(0);

/// On wake, reads the cell and drops another wait on it, like an executor aborting a sibling.
struct DropsSibling {
	sibling: Mutex<Option<WaitFor<'static, i32>>>,
	seen: Mutex<Option<i32>>,
}

impl Wake for DropsSibling {
	fn wake(self: Arc<Self>) {
		self.wake_by_ref();
	}

	fn wake_by_ref(self: &Arc<Self>) {
		*self.seen.lock() = Some(CELL.read());
		drop(self.sibling.lock().take());
	}
}

#[test]
fn waker_may_use_the_cell() {
	let mut sibling = CELL.wait_for(|&v| v == 2);
	assert_pending(&mut sibling);
	assert_eq!(CELL.waiter_count(), 1);

	let waker = Arc::new(DropsSibling {
		sibling: Mutex::new(Some(sibling)),
		seen: Mutex::new(None),
	});
	let mut wait = CELL.wait_for(|&v| v == 1);
	assert!(Pin::new(&mut wait)
		.poll(&mut Context::from_waker(&Waker::from(Arc::clone(&waker))))
		.is_pending());
	assert_eq!(CELL.waiter_count(), 2);

	let (done, finished) = mpsc::channel();
	thread::spawn(move || {
		CELL.write(1);
		done.send(()).ok();
	});
	finished
		.recv_timeout(Duration::from_secs(10))
		.expect("`write` didn't return");

	assert_eq!(*waker.seen.lock(), Some(1));
	assert!(waker.sibling.lock().is_none());
	assert_eq!(assert_ready(&mut wait), Ok(1));
	assert!(CELL.is_idle());
}
