//! Offset-keyed cursors over byte resources.
//!
//! Resources may be far larger than memory, so bytes are served from a bounded window
//! which slides over the resource whenever a cursor dereferences an offset outside of it.

use std::{
	cell::RefCell,
	cmp::Ordering,
	ops::{Add, AddAssign, Sub, SubAssign}
};

use crate::source::ByteSource;

/// Default size of the read window.
pub const DEFAULT_WINDOW_SIZE: usize = 64 * 1024;

struct Window<S: ByteSource> {
	source: S,
	start: u64,
	bytes: Vec<u8>,
	capacity: usize,
	error: Option<std::io::Error>
}
impl<S: ByteSource> Window<S> {
	fn contains(&self, offset: u64) -> bool {
		offset >= self.start && offset - self.start < self.bytes.len() as u64
	}

	fn refill(&mut self, offset: u64, size: u64) -> std::io::Result<()> {
		// moving backwards keeps `offset` at the end of the new window, otherwise at the start
		let start = if offset < self.start {
			(offset + 1).saturating_sub(self.capacity as u64)
		} else {
			offset
		};
		let length = (size - start).min(self.capacity as u64) as usize;

		self.bytes.resize(length, 0);
		let read = self.source.read_at(start, &mut self.bytes)?;
		self.bytes.truncate(read);
		self.start = start;

		Ok(())
	}
}

/// Byte resource with a sliding read window.
///
/// Dereferencing is done through shared references so that any number of cursors
/// can point into the same resource.
pub struct WindowedSource<S: ByteSource> {
	window: RefCell<Window<S>>,
	size: u64
}
impl<S: ByteSource> WindowedSource<S> {
	pub fn new(source: S) -> std::io::Result<Self> {
		Self::with_capacity(source, DEFAULT_WINDOW_SIZE)
	}

	pub fn with_capacity(mut source: S, capacity: usize) -> std::io::Result<Self> {
		let size = source.size()?;

		Ok(WindowedSource {
			window: RefCell::new(Window {
				source,
				start: 0,
				bytes: Vec::new(),
				capacity: capacity.max(1),
				error: None
			}),
			size
		})
	}

	pub const fn size(&self) -> u64 {
		self.size
	}

	pub fn cursor(&self, offset: u64) -> ByteCursor<'_, S> {
		ByteCursor { source: self, offset }
	}

	pub fn begin(&self) -> ByteCursor<'_, S> {
		self.cursor(0)
	}

	pub fn end(&self) -> ByteCursor<'_, S> {
		self.cursor(self.size)
	}

	/// Returns the byte at `offset`, refilling the window if needed.
	///
	/// Returns `None` past the end of the resource or when the refill fails. The failure
	/// is latched and can be retrieved with [`take_error`](WindowedSource::take_error).
	pub fn byte_at(&self, offset: u64) -> Option<u8> {
		if offset >= self.size {
			return None
		}

		let mut window = self.window.borrow_mut();
		if !window.contains(offset) {
			if window.error.is_some() {
				return None
			}

			if let Err(err) = window.refill(offset, self.size) {
				log::debug!("window refill at {:#x} failed: {}", offset, err);
				window.error = Some(err);
				return None
			}
			if !window.contains(offset) {
				// resource shrank under us
				return None
			}
		}

		Some(window.bytes[(offset - window.start) as usize])
	}

	/// Reads `[start, end)` straight from the resource, bypassing the window.
	///
	/// The interval is clamped to the resource size.
	pub fn read_range(&self, start: u64, end: u64) -> std::io::Result<Vec<u8>> {
		let end = end.min(self.size);
		let start = start.min(end);

		self.window.borrow_mut().source.read_range(start, end)
	}

	/// Takes the error which stopped cursor dereferencing, if any.
	pub fn take_error(&self) -> Option<std::io::Error> {
		self.window.borrow_mut().error.take()
	}

	pub fn into_inner(self) -> S {
		self.window.into_inner().source
	}
}

/// Cursor pointing at an offset inside a [`WindowedSource`].
///
/// Cursors support offset arithmetic and compare by offset. Comparing cursors of
/// different sources is meaningless.
pub struct ByteCursor<'w, S: ByteSource> {
	source: &'w WindowedSource<S>,
	offset: u64
}
impl<'w, S: ByteSource> ByteCursor<'w, S> {
	pub const fn offset(&self) -> u64 {
		self.offset
	}

	/// Dereferences the cursor.
	pub fn get(&self) -> Option<u8> {
		self.source.byte_at(self.offset)
	}

	/// Iterates the bytes in `[self, end)`.
	pub fn bytes_until(self, end: Self) -> CursorBytes<'w, S> {
		CursorBytes {
			front: self,
			back: end
		}
	}
}
impl<'w, S: ByteSource> Clone for ByteCursor<'w, S> {
	fn clone(&self) -> Self {
		*self
	}
}
impl<'w, S: ByteSource> Copy for ByteCursor<'w, S> {}
impl<'w, S: ByteSource> std::fmt::Debug for ByteCursor<'w, S> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "ByteCursor({:#x})", self.offset)
	}
}
impl<'w, S: ByteSource> PartialEq for ByteCursor<'w, S> {
	fn eq(&self, other: &Self) -> bool {
		debug_assert!(std::ptr::eq(self.source, other.source));

		self.offset == other.offset
	}
}
impl<'w, S: ByteSource> Eq for ByteCursor<'w, S> {}
impl<'w, S: ByteSource> PartialOrd for ByteCursor<'w, S> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl<'w, S: ByteSource> Ord for ByteCursor<'w, S> {
	fn cmp(&self, other: &Self) -> Ordering {
		self.offset.cmp(&other.offset)
	}
}
impl<'w, S: ByteSource> Add<u64> for ByteCursor<'w, S> {
	type Output = Self;

	fn add(self, rhs: u64) -> Self::Output {
		ByteCursor {
			source: self.source,
			offset: self.offset.saturating_add(rhs)
		}
	}
}
impl<'w, S: ByteSource> AddAssign<u64> for ByteCursor<'w, S> {
	fn add_assign(&mut self, rhs: u64) {
		*self = *self + rhs;
	}
}
impl<'w, S: ByteSource> Sub<u64> for ByteCursor<'w, S> {
	type Output = Self;

	fn sub(self, rhs: u64) -> Self::Output {
		ByteCursor {
			source: self.source,
			offset: self.offset.saturating_sub(rhs)
		}
	}
}
impl<'w, S: ByteSource> SubAssign<u64> for ByteCursor<'w, S> {
	fn sub_assign(&mut self, rhs: u64) {
		*self = *self - rhs;
	}
}
/// Signed distance between two cursors.
impl<'w, S: ByteSource> Sub for ByteCursor<'w, S> {
	type Output = i64;

	fn sub(self, rhs: Self) -> Self::Output {
		self.offset.wrapping_sub(rhs.offset) as i64
	}
}

/// Double ended iterator over the bytes between two cursors.
///
/// Iteration ends early if the resource cannot be read.
pub struct CursorBytes<'w, S: ByteSource> {
	front: ByteCursor<'w, S>,
	back: ByteCursor<'w, S>
}
impl<'w, S: ByteSource> CursorBytes<'w, S> {
	/// Cursor at the next byte to be yielded from the front.
	pub fn position(&self) -> ByteCursor<'w, S> {
		self.front
	}
}
impl<'w, S: ByteSource> Iterator for CursorBytes<'w, S> {
	type Item = u8;

	fn next(&mut self) -> Option<Self::Item> {
		if self.front >= self.back {
			return None
		}

		let byte = self.front.get()?;
		self.front += 1;

		Some(byte)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.back.offset().saturating_sub(self.front.offset());

		(0, usize::try_from(remaining).ok())
	}
}
impl<'w, S: ByteSource> DoubleEndedIterator for CursorBytes<'w, S> {
	fn next_back(&mut self) -> Option<Self::Item> {
		if self.front >= self.back {
			return None
		}

		let byte = (self.back - 1).get()?;
		self.back -= 1;

		Some(byte)
	}
}
