use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::slice;

use crate::dynamic_array::{DynamicArray, deallocate};

/// A position inside the live range of a [`DynamicArray`].
///
/// A cursor borrows the array, so it cannot outlive a reallocation or a
/// shift: every mutating method needs `&mut DynamicArray`, which the borrow
/// checker refuses while a cursor is alive.
pub struct Cursor<'a, T> {
    base: *const T,
    index: usize,
    len: usize,
    _marker: PhantomData<&'a T>,
}

impl<T> DynamicArray<T> {
    /// Cursor at the first element (equal to [`end`](Self::end) when empty).
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::at(self, 0)
    }

    /// Cursor one past the last element.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::at(self, self.len())
    }
}

impl<'a, T> Cursor<'a, T> {
    fn at(array: &'a DynamicArray<T>, index: usize) -> Self {
        Self {
            base: array.as_ptr(),
            index,
            len: array.len(),
            _marker: PhantomData,
        }
    }

    /// The element under the cursor, or `None` at the end position.
    pub fn get(&self) -> Option<&'a T> {
        if self.index == self.len {
            None
        } else {
            // SAFETY: `index < len`, and the borrow keeps the slot live.
            Some(unsafe { &*self.base.add(self.index) })
        }
    }

    /// Moves one slot forward. Stays put at the end position.
    pub fn advance(&mut self) {
        if self.index != self.len {
            self.index += 1;
        }
    }

    /// Moves `n` slots forward, clamping at the end position.
    pub fn advance_n(&mut self, n: usize) {
        self.index += n.min(self.remaining());
    }

    /// Index of the slot under the cursor; usable with
    /// [`DynamicArray::insert`] and [`DynamicArray::erase`].
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_end(&self) -> bool {
        self.index == self.len
    }

    fn remaining(&self) -> usize {
        self.len - self.index
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.base, other.base) && self.index == other.index
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("index", &self.index).finish()
    }
}

impl<'a, T> Iterator for Cursor<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let item = self.get()?;
        self.advance();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining();
        (len, Some(len))
    }
}

impl<T> ExactSizeIterator for Cursor<'_, T> {}

impl<T> FusedIterator for Cursor<'_, T> {}

/// Owning iterator returned by `DynamicArray::into_iter`.
///
/// Slots `[start, end)` of `buf` are the elements not yet yielded.
pub struct IntoIter<T> {
    buf: NonNull<T>,
    cap: usize,
    start: usize,
    end: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the iterator owns the remaining elements, exactly like the array
// it came from.
unsafe impl<T: Send> Send for IntoIter<T> {}
// SAFETY: shared access only exposes `&T` via `as_slice`.
unsafe impl<T: Sync> Sync for IntoIter<T> {}

impl<T> IntoIter<T> {
    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` are the remaining live elements.
        unsafe { slice::from_raw_parts(self.buf.as_ptr().add(self.start), self.end - self.start) }
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let (buf, len, cap) = self.into_raw_parts();
        IntoIter {
            buf,
            cap,
            start: 0,
            end: len,
            _marker: PhantomData,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start < end`; the slot is read once and then skipped.
        let value = unsafe { ptr::read(self.buf.as_ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: the old `end - 1` is live and no longer counted.
        Some(unsafe { ptr::read(self.buf.as_ptr().add(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: only `[start, end)` are still live; the block is released
        // with the capacity it was allocated with.
        unsafe {
            let rest = self.buf.as_ptr().add(self.start);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(rest, self.end - self.start));
            deallocate(self.buf, self.cap);
        }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
