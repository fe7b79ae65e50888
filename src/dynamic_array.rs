use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ops::{Bound, Deref, DerefMut, RangeBounds};
use std::ptr::{self, NonNull};
use std::slice;

use tracing::{debug, trace};

use crate::error::{AllocError, OutOfRange};

/// Number of slots reserved by [`DynamicArray::new`].
pub const DEFAULT_CAPACITY: usize = 16;

/// Smallest capacity growth will produce, so doubling an empty block still
/// yields room for one element.
const MIN_NON_ZERO_CAP: usize = 1;

/// A growable array that owns one contiguous block of raw memory.
///
/// The block holds `capacity` slots. Slots `[0, len)` are live, constructed
/// values; slots `[len, capacity)` are uninitialized and never read or
/// dropped. When `capacity == 0`, or `T` is zero-sized, no block is
/// allocated and the pointer is dangling; the length and capacity
/// bookkeeping is the same either way.
///
/// Capacity only grows implicitly. Shrinking `len` through [`truncate`],
/// [`resize`], [`erase_range`], [`clear`] or [`pop`] drops elements but keeps
/// the block; [`shrink_to_fit`] is the only way to hand memory back.
///
/// [`truncate`]: DynamicArray::truncate
/// [`resize`]: DynamicArray::resize
/// [`erase_range`]: DynamicArray::erase_range
/// [`clear`]: DynamicArray::clear
/// [`pop`]: DynamicArray::pop
/// [`shrink_to_fit`]: DynamicArray::shrink_to_fit
pub struct DynamicArray<T> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the array owns its elements exclusively, so moving it to another
// thread moves the elements with it.
unsafe impl<T: Send> Send for DynamicArray<T> {}
// SAFETY: `&DynamicArray<T>` only hands out `&T`.
unsafe impl<T: Sync> Sync for DynamicArray<T> {}

impl<T> DynamicArray<T> {
    /// Creates an empty array with [`DEFAULT_CAPACITY`] slots reserved.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty array with exactly `capacity` slots reserved.
    ///
    /// # Panics
    ///
    /// Panics if the block would exceed `isize::MAX` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        let ptr = if capacity == 0 {
            NonNull::dangling()
        } else {
            allocate(capacity)
        };
        Self {
            ptr,
            cap: capacity,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Creates an array holding `n` copies of `value`, with capacity `n`.
    pub fn filled(n: usize, value: T) -> Self
    where
        T: Clone,
    {
        let mut array = Self::with_capacity(n);
        array.insert_n(0, n, value);
        array
    }

    /// Creates an array by cloning every element of `values`. Capacity equals
    /// the slice length.
    pub fn from_slice(values: &[T]) -> Self
    where
        T: Clone,
    {
        let mut array = Self::with_capacity(values.len());
        array.extend(values.iter().cloned());
        array
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Pointer to the first live element, or `None` while the array is empty.
    pub fn data(&self) -> Option<NonNull<T>> {
        (self.len != 0).then_some(self.ptr)
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized and `ptr` is aligned
        // and non-null even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Bounds-checked access.
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        self.as_slice().get(index).ok_or(OutOfRange)
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        self.as_mut_slice().get_mut(index).ok_or(OutOfRange)
    }

    pub fn front(&self) -> Result<&T, OutOfRange> {
        self.as_slice().first().ok_or(OutOfRange)
    }

    pub fn front_mut(&mut self) -> Result<&mut T, OutOfRange> {
        self.as_mut_slice().first_mut().ok_or(OutOfRange)
    }

    pub fn back(&self) -> Result<&T, OutOfRange> {
        self.as_slice().last().ok_or(OutOfRange)
    }

    pub fn back_mut(&mut self) -> Result<&mut T, OutOfRange> {
        self.as_mut_slice().last_mut().ok_or(OutOfRange)
    }

    /// Unchecked access.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`. This is only asserted in debug
    /// builds.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len, "index out of bounds");
        // SAFETY: the caller guarantees `index < len`.
        unsafe { &*self.ptr.as_ptr().add(index) }
    }

    /// Mutable unchecked access.
    ///
    /// # Safety
    ///
    /// Same contract as [`get_unchecked`](Self::get_unchecked).
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len, "index out of bounds");
        // SAFETY: the caller guarantees `index < len`.
        unsafe { &mut *self.ptr.as_ptr().add(index) }
    }

    /// Appends `value`, doubling the capacity first if every slot is taken.
    pub fn push(&mut self, value: T) {
        if self.len == self.cap {
            self.grow_to_fit(self.len + 1);
        }
        // SAFETY: `len < cap`, so the slot is allocated and uninitialized.
        unsafe {
            ptr::write(self.ptr.as_ptr().add(self.len), value);
        }
        // only count the element once it is written
        self.len += 1;
    }

    /// Removes the last element and hands it back to the caller.
    pub fn pop(&mut self) -> Result<T, OutOfRange> {
        if self.len == 0 {
            return Err(OutOfRange);
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` is live and is no longer
        // counted, so it is read exactly once.
        Ok(unsafe { ptr::read(self.ptr.as_ptr().add(self.len)) })
    }

    /// Drops every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops the elements in `[len, self.len())`. Does nothing when `len` is
    /// not smaller than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let dropped = self.len - len;
        // The length is lowered before dropping so a panicking destructor
        // cannot lead to a second drop from `Drop for DynamicArray`.
        self.len = len;
        // SAFETY: `[len, len + dropped)` were live and are no longer counted.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr().add(len), dropped);
            ptr::drop_in_place(tail);
        }
    }

    /// Resizes to `new_len`, filling new slots with `T::default()`.
    ///
    /// Shrinking drops the excess elements and keeps the capacity.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Resizes to `new_len`, filling new slots with values produced by `f`.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.grow_to_fit(new_len);
        while self.len < new_len {
            // SAFETY: `len < new_len <= cap`.
            unsafe {
                ptr::write(self.ptr.as_ptr().add(self.len), f());
            }
            self.len += 1;
        }
    }

    /// Inserts `value` before `index`, shifting `[index, len)` one slot right.
    /// Returns the index of the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        assert!(
            index <= self.len,
            "index out of bounds: insertion at {index} but len is {}",
            self.len
        );
        if self.len == self.cap {
            self.grow_to_fit(self.len + 1);
        }
        // SAFETY: there is at least one free slot past `len`; the tail is
        // moved into it before the hole is written.
        unsafe {
            let p = self.ptr.as_ptr().add(index);
            ptr::copy(p, p.add(1), self.len - index);
            ptr::write(p, value);
        }
        self.len += 1;
        index
    }

    /// Inserts `n` copies of `value` before `index`. Returns the index of
    /// the first inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_n(&mut self, index: usize, n: usize, value: T) -> usize
    where
        T: Clone,
    {
        assert!(
            index <= self.len,
            "index out of bounds: insertion at {index} but len is {}",
            self.len
        );
        if n == 0 {
            return index;
        }
        let required = self
            .len
            .checked_add(n)
            .unwrap_or_else(|| capacity_overflow());
        self.grow_to_fit(required);

        let old_len = self.len;
        // While the gap is being filled the shifted tail is not counted, so
        // a panicking `clone` leaks it instead of dropping it twice.
        self.len = index;
        // SAFETY: `old_len + n <= cap`. The tail is moved right by `n`, then
        // each of the `n` uninitialized slots in the gap is written once.
        unsafe {
            let p = self.ptr.as_ptr().add(index);
            ptr::copy(p, p.add(n), old_len - index);
            for offset in 0..n - 1 {
                ptr::write(p.add(offset), value.clone());
            }
            ptr::write(p.add(n - 1), value);
        }
        self.len = old_len + n;
        index
    }

    /// Removes the element at `index`, shifting the tail left. Returns
    /// `index`, which now holds the element that followed the removed one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        assert!(
            index < self.len,
            "index out of bounds: erasing {index} but len is {}",
            self.len
        );
        self.erase_range(index..index + 1)
    }

    /// Removes the elements in `range`, shifting the tail left to close the
    /// gap. Returns the start of the range, the new position of the element
    /// that followed the removed run.
    ///
    /// # Panics
    ///
    /// Panics if the range starts after it ends or ends past `len`.
    pub fn erase_range<R>(&mut self, range: R) -> usize
    where
        R: RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => self.len,
        };
        assert!(start <= end, "erase range starts at {start} but ends at {end}");
        assert!(
            end <= self.len,
            "index out of bounds: erase range ends at {end} but len is {}",
            self.len
        );

        let tail = self.len - end;
        // Elements past `start` are uncounted until the tail is moved, so a
        // panicking destructor leaks the tail rather than exposing dropped
        // slots.
        self.len = start;
        // SAFETY: `[start, end)` are live and dropped exactly once; the tail
        // `[end, end + tail)` is then moved down over the dropped slots.
        unsafe {
            let first = self.ptr.as_ptr().add(start);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, end - start));
            ptr::copy(first.add(end - start), first, tail);
        }
        self.len = start + tail;
        start
    }

    /// Removes and returns the element at `index`, shifting the tail left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "index out of bounds: removing {index} but len is {}",
            self.len
        );
        // SAFETY: `index` is live; it is read out once and the tail moved over
        // it before the length is lowered.
        unsafe {
            let p = self.ptr.as_ptr().add(index);
            let value = ptr::read(p);
            ptr::copy(p.add(1), p, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Exchanges storage, length and capacity with `other` without touching
    /// any element.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.cap, &mut other.cap);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Makes room for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        let required = self
            .len
            .checked_add(additional)
            .unwrap_or_else(|| capacity_overflow());
        self.grow_to_fit(required);
    }

    /// Like [`reserve`](Self::reserve), but reports failure instead of
    /// aborting. The array is unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(AllocError::CapacityOverflow)?;
        if required <= self.cap {
            return Ok(());
        }
        let new_cap = grown_capacity(self.cap, required);
        match try_allocate(new_cap) {
            Ok(new_ptr) => {
                self.relocate(new_ptr, new_cap);
                Ok(())
            }
            Err(err) => {
                debug!(%err, len = self.len, cap = self.cap, requested = new_cap, "try_reserve failed");
                Err(err)
            }
        }
    }

    /// Shrinks the capacity to the current length, releasing the block when
    /// the array is empty.
    pub fn shrink_to_fit(&mut self) {
        if self.len == self.cap {
            return;
        }
        let new_ptr = if self.len == 0 {
            NonNull::dangling()
        } else {
            allocate(self.len)
        };
        self.relocate(new_ptr, self.len);
    }

    /// Hands the raw parts to an owning iterator; the array's own destructor
    /// no longer runs.
    pub(crate) fn into_raw_parts(self) -> (NonNull<T>, usize, usize) {
        let this = ManuallyDrop::new(self);
        (this.ptr, this.len, this.cap)
    }

    fn grow_to_fit(&mut self, required: usize) {
        if required <= self.cap {
            return;
        }
        let new_cap = grown_capacity(self.cap, required);
        let new_ptr = allocate(new_cap);
        self.relocate(new_ptr, new_cap);
    }

    /// Moves the live elements into `new_ptr` and releases the old block.
    /// `new_ptr` must have room for at least `len` elements.
    fn relocate(&mut self, new_ptr: NonNull<T>, new_cap: usize) {
        debug_assert!(new_cap >= self.len);
        // SAFETY: both blocks hold at least `len` slots and are distinct
        // allocations; the old block is freed only after the move, and the
        // fields are updated before anything else can observe them.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len);
            deallocate(self.ptr, self.cap);
        }
        trace!(old_cap = self.cap, new_cap, len = self.len, "relocated storage");
        self.ptr = new_ptr;
        self.cap = new_cap;
    }
}

/// Doubling with a floor: the result always satisfies `required` and is
/// never zero.
fn grown_capacity(current: usize, required: usize) -> usize {
    current
        .saturating_mul(2)
        .max(required)
        .max(MIN_NON_ZERO_CAP)
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

fn allocate<T>(cap: usize) -> NonNull<T> {
    let layout = Layout::array::<T>(cap).unwrap_or_else(|_| capacity_overflow());
    if layout.size() == 0 {
        return NonNull::dangling();
    }
    // SAFETY: the layout is non-empty.
    let raw = unsafe { alloc::alloc(layout) };
    NonNull::new(raw.cast::<T>()).unwrap_or_else(|| alloc::handle_alloc_error(layout))
}

fn try_allocate<T>(cap: usize) -> Result<NonNull<T>, AllocError> {
    let layout = Layout::array::<T>(cap).map_err(|_| AllocError::CapacityOverflow)?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }
    // SAFETY: see `allocate`.
    let raw = unsafe { alloc::alloc(layout) };
    NonNull::new(raw.cast::<T>()).ok_or(AllocError::Exhausted {
        bytes: layout.size(),
    })
}

/// Releases a block obtained from `allocate`. A zero `cap` or a zero-sized
/// `T` is a no-op.
///
/// # Safety
///
/// `ptr` must come from `allocate::<T>(cap)` and hold no live elements.
pub(crate) unsafe fn deallocate<T>(ptr: NonNull<T>, cap: usize) {
    if cap == 0 || mem::size_of::<T>() == 0 {
        return;
    }
    // SAFETY: the same layout was accepted by `Layout::array` at allocation.
    unsafe {
        let layout = Layout::from_size_align_unchecked(mem::size_of::<T>() * cap, mem::align_of::<T>());
        alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout);
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: exactly the first `len` slots are live; the block came from
        // `allocate(cap)` or is dangling with `cap == 0`.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len));
            deallocate(self.ptr, self.cap);
        }
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    /// Allocates a block of the same capacity and clones the live elements
    /// into it one by one.
    fn clone(&self) -> Self {
        let mut array = Self::with_capacity(self.cap);
        array.extend(self.iter().cloned());
        array
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, U> PartialEq<DynamicArray<U>> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &DynamicArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T, U> PartialEq<[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U> PartialEq<&[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut array = Self::with_capacity(iter.size_hint().0);
        array.extend(iter);
        array
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(values: [T; N]) -> Self {
        let mut array = Self::with_capacity(N);
        array.extend(values);
        array
    }
}
