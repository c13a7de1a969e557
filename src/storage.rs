// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Type-erased contiguous component storage
//!
//! A [`ComponentStore`] holds fixed-stride records as raw bytes. It never
//! knows the static type of what it stores; the archetype and query layers
//! reinterpret rows at the point where the concrete type is known.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use crate::error::{EcsError, Result};

/// Byte buffer of `len` records, each `stride` bytes, aligned to `align`.
pub struct ComponentStore {
    ptr: NonNull<u8>,
    stride: usize,
    align: usize,
    len: usize,
    capacity: usize,
}

// SAFETY: the store exclusively owns its allocation, and the only records
// placed in it are `Send + Sync` components.
unsafe impl Send for ComponentStore {}
unsafe impl Sync for ComponentStore {}

#[cold]
fn capacity_overflow() -> ! {
    panic!("component store capacity overflow");
}

fn dangling(align: usize) -> NonNull<u8> {
    NonNull::new(align as *mut u8).unwrap_or(NonNull::dangling())
}

impl ComponentStore {
    /// Create a store for records described by `item`.
    ///
    /// The stride is the item size padded to its alignment.
    pub fn new(item: Layout, initial_capacity: usize) -> Self {
        let item = item.pad_to_align();
        let mut store = Self {
            ptr: dangling(item.align()),
            stride: item.size(),
            align: item.align(),
            len: 0,
            capacity: 0,
        };
        if store.stride == 0 {
            store.capacity = usize::MAX;
        } else if initial_capacity > 0 {
            store.grow_to(initial_capacity);
        }
        store
    }

    /// Create a byte-aligned store with an explicit stride.
    pub fn with_stride(stride: usize, initial_capacity: usize) -> Self {
        match Layout::from_size_align(stride, 1) {
            Ok(layout) => Self::new(layout, initial_capacity),
            Err(_) => capacity_overflow(),
        }
    }

    fn buffer_layout(&self, capacity: usize) -> Layout {
        capacity
            .checked_mul(self.stride)
            .and_then(|size| Layout::from_size_align(size, self.align).ok())
            .unwrap_or_else(|| capacity_overflow())
    }

    fn grow_to(&mut self, new_capacity: usize) {
        if self.stride == 0 || new_capacity <= self.capacity {
            return;
        }
        let new_layout = self.buffer_layout(new_capacity);
        let raw = if self.capacity == 0 {
            // SAFETY: stride > 0 and new_capacity > 0, so the layout is non-zero.
            unsafe { alloc::alloc(new_layout) }
        } else {
            let old_layout = self.buffer_layout(self.capacity);
            // SAFETY: ptr was allocated with old_layout; the new size is non-zero.
            unsafe { alloc::realloc(self.ptr.as_ptr(), old_layout, new_layout.size()) }
        };
        self.ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(new_layout),
        };
        self.capacity = new_capacity;
    }

    fn release(&mut self) {
        if self.stride > 0 && self.capacity > 0 {
            let layout = self.buffer_layout(self.capacity);
            // SAFETY: ptr was allocated with exactly this layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
        self.ptr = dangling(self.align);
        self.capacity = if self.stride == 0 { usize::MAX } else { 0 };
    }

    #[inline]
    fn check(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(EcsError::IndexOutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// Pointer to record `index` without a bounds check.
    ///
    /// # Safety
    /// `index` must be `<= len` (one-past-the-end is allowed for writes
    /// after a reserve).
    #[inline]
    pub unsafe fn ptr_unchecked(&self, index: usize) -> NonNull<u8> {
        NonNull::new_unchecked(self.ptr.as_ptr().add(index * self.stride))
    }

    /// Bounds-checked pointer to record `index`
    pub fn ptr(&self, index: usize) -> Result<NonNull<u8>> {
        self.check(index)?;
        // SAFETY: index < len.
        Ok(unsafe { self.ptr_unchecked(index) })
    }

    /// Append a record by copying `stride` bytes from `src`.
    ///
    /// # Safety
    /// `src` must be valid for reads of `stride` bytes.
    pub unsafe fn push_raw(&mut self, src: *const u8) -> usize {
        if self.len == self.capacity {
            let grown = self
                .capacity
                .checked_mul(2)
                .unwrap_or_else(|| capacity_overflow())
                .max(4);
            self.grow_to(grown);
        }
        let row = self.len;
        ptr::copy_nonoverlapping(src, self.ptr_unchecked(row).as_ptr(), self.stride);
        self.len += 1;
        row
    }

    /// Append a record given as bytes. Returns the new record's index.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        if bytes.len() != self.stride {
            return Err(EcsError::StrideMismatch {
                expected: self.stride,
                actual: bytes.len(),
            });
        }
        // SAFETY: bytes holds exactly stride readable bytes.
        Ok(unsafe { self.push_raw(bytes.as_ptr()) })
    }

    /// Drop the last record. Returns false when the store was already empty.
    pub fn pop_back(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        self.len -= 1;
        true
    }

    /// Remove record `index` by copying the last record over it.
    ///
    /// Returns `Some(old_index)` when a record moved from `old_index` (the old
    /// last position) into `index`, and `None` when `index` was the last one.
    pub fn swap_remove(&mut self, index: usize) -> Result<Option<usize>> {
        self.check(index)?;
        let last = self.len - 1;
        let moved = if index != last {
            // SAFETY: both indices are in bounds and distinct.
            unsafe {
                ptr::copy_nonoverlapping(
                    self.ptr_unchecked(last).as_ptr(),
                    self.ptr_unchecked(index).as_ptr(),
                    self.stride,
                );
            }
            Some(last)
        } else {
            None
        };
        self.len = last;
        Ok(moved)
    }

    /// Exchange records `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        self.check(a)?;
        self.check(b)?;
        if a != b {
            // SAFETY: both in bounds, distinct records never overlap.
            unsafe {
                ptr::swap_nonoverlapping(
                    self.ptr_unchecked(a).as_ptr(),
                    self.ptr_unchecked(b).as_ptr(),
                    self.stride,
                );
            }
        }
        Ok(())
    }

    /// Ensure room for at least `capacity` records in total.
    pub fn reserve(&mut self, capacity: usize) {
        self.grow_to(capacity);
    }

    pub fn shrink_to_fit(&mut self) {
        if self.stride == 0 || self.len == self.capacity {
            return;
        }
        if self.len == 0 {
            self.release();
            return;
        }
        let old_layout = self.buffer_layout(self.capacity);
        let new_layout = self.buffer_layout(self.len);
        // SAFETY: ptr was allocated with old_layout; len > 0 so the new size is non-zero.
        let raw = unsafe { alloc::realloc(self.ptr.as_ptr(), old_layout, new_layout.size()) };
        self.ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(new_layout),
        };
        self.capacity = self.len;
    }

    /// Set the record count. New records are zero-filled.
    pub fn resize(&mut self, len: usize) {
        if len > self.len {
            self.grow_to(len);
            // SAFETY: capacity >= len after grow_to.
            unsafe {
                ptr::write_bytes(
                    self.ptr_unchecked(self.len).as_ptr(),
                    0,
                    (len - self.len) * self.stride,
                );
            }
        }
        self.len = len;
    }

    /// Forget every record, keeping the allocation.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn get(&self, index: usize) -> Result<&[u8]> {
        let ptr = self.ptr(index)?;
        // SAFETY: the record lies within the initialised prefix of the buffer.
        Ok(unsafe { std::slice::from_raw_parts(ptr.as_ptr(), self.stride) })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut [u8]> {
        let ptr = self.ptr(index)?;
        // SAFETY: as above, and &mut self guarantees exclusivity.
        Ok(unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), self.stride) })
    }

    /// Every stored record, in row order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.len).map(move |index| {
            // SAFETY: index < len.
            unsafe { std::slice::from_raw_parts(self.ptr_unchecked(index).as_ptr(), self.stride) }
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn align(&self) -> usize {
        self.align
    }

    pub fn memory_usage_in_bytes(&self) -> usize {
        let buffer = if self.stride == 0 {
            0
        } else {
            self.capacity * self.stride
        };
        std::mem::size_of::<Self>() + buffer
    }
}

impl Drop for ComponentStore {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentStore")
            .field("stride", &self.stride)
            .field("align", &self.align)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish()
    }
}
