#![warn(clippy::pedantic)]
#![warn(unreachable_pub)]
//! Convenience waits for [`waitable`] cells holding sequences, [`Option`]s and comparable values.

pub mod future;

#[allow(async_fn_in_trait)]
pub mod prelude {
	use ext_trait::extension;
	use waitable::{Cancelled, RawValueCell, WaitFor};

	use crate::future;

	#[extension(pub trait ValueCellExt)]
	impl<T: 'static + Send + Clone> RawValueCell<T> {
		/// See [`future::wait_for_len`].
		fn wait_for_len<E: 'static>(&self, len: usize) -> WaitFor<'_, T>
		where
			T: AsRef<[E]>,
		{
			future::wait_for_len(self, len)
		}

		/// See [`future::wait_for_eq`].
		fn wait_for_eq(&self, target: T) -> WaitFor<'_, T>
		where
			T: PartialEq,
		{
			future::wait_for_eq(self, target)
		}

		/// See [`future::wait_for_index`].
		async fn wait_for_index<E: 'static + Clone>(&self, index: usize) -> Result<E, Cancelled>
		where
			T: AsRef<[E]>,
		{
			future::wait_for_index(self, index).await
		}

		/// See [`future::wait_for_element`].
		async fn wait_for_element<E: 'static + Clone>(
			&self,
			predicate: impl 'static + Send + Sync + Fn(&E) -> bool,
		) -> Result<E, Cancelled>
		where
			T: AsRef<[E]>,
		{
			future::wait_for_element(self, predicate).await
		}
	}

	#[extension(pub trait OptionCellExt)]
	impl<V: 'static + Send + Clone> RawValueCell<Option<V>> {
		/// See [`future::wait_for_some`].
		async fn wait_for_some(&self) -> Result<V, Cancelled> {
			future::wait_for_some(self).await
		}
	}
}
