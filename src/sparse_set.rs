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

//! Paged sparse set
//!
//! Maps a possibly wide integer key domain onto dense, iteration-friendly
//! key/value arrays. The sparse side is split into fixed-size pages that are
//! allocated only when a key inside them is touched, so memory follows the
//! key ranges actually in use rather than the largest key ever seen.
//!
//! The page table itself is a window starting at the lowest allocated page.
//! With reclaiming enabled, empty pages at either end of the window are
//! dropped, so keys that only ever grow (monotonic ids) do not leave a trail
//! of empty table slots behind them.

use std::collections::VecDeque;

use crate::error::{EcsError, Result};

/// Default number of keys covered by one sparse page
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Marker stored in a page slot with no dense entry
const VACANT: usize = usize::MAX;

/// Keys usable in a [`PagedSparseSet`].
pub trait SparseKey: Copy + Eq {
    /// Position of this key in the (conceptual) sparse array
    fn to_index(self) -> usize;
}

macro_rules! impl_sparse_key {
    ($($t:ty),*) => {
        $(
            impl SparseKey for $t {
                #[inline]
                fn to_index(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_sparse_key!(u8, u16, u32, u64, usize);

/// Outcome of a successful [`PagedSparseSet::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseRemoval<K, V> {
    /// Value that was stored under the removed key
    pub value: V,
    /// Key that was swapped into the vacated dense slot, with that slot's index
    pub moved: Option<(K, usize)>,
}

#[derive(Debug, Clone)]
struct Page {
    slots: Box<[usize]>,
    occupied: usize,
}

impl Page {
    fn new(size: usize) -> Self {
        Self {
            slots: vec![VACANT; size].into_boxed_slice(),
            occupied: 0,
        }
    }
}

/// Sparse/dense map with lazily allocated sparse pages.
///
/// Invariant: for every present key `k`, `dense_keys[slot(k)] == k`.
#[derive(Debug, Clone)]
pub struct PagedSparseSet<K, V> {
    page_size: usize,
    /// Page number of `pages[0]`
    first_page: usize,
    pages: VecDeque<Option<Page>>,
    dense_keys: Vec<K>,
    dense_values: Vec<V>,
    reclaim_empty_pages: bool,
}

impl<K: SparseKey, V> Default for PagedSparseSet<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SparseKey, V> PagedSparseSet<K, V> {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a set whose sparse pages cover `page_size` keys each.
    ///
    /// # Panics
    /// Panics if `page_size` is zero.
    pub fn with_page_size(page_size: usize) -> Self {
        assert!(page_size > 0, "sparse set page size must be non-zero");
        Self {
            page_size,
            first_page: 0,
            pages: VecDeque::new(),
            dense_keys: Vec::new(),
            dense_values: Vec::new(),
            reclaim_empty_pages: false,
        }
    }

    /// Free a page as soon as its last key is removed.
    pub fn reclaim_empty_pages(mut self, enabled: bool) -> Self {
        self.reclaim_empty_pages = enabled;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[inline]
    fn locate(&self, key: K) -> (usize, usize) {
        let index = key.to_index();
        (index / self.page_size, index % self.page_size)
    }

    #[inline]
    fn page(&self, page: usize) -> Option<&Page> {
        self.pages.get(page.checked_sub(self.first_page)?)?.as_ref()
    }

    #[inline]
    fn existing_page_mut(&mut self, page: usize) -> Option<&mut Page> {
        self.pages
            .get_mut(page.checked_sub(self.first_page)?)?
            .as_mut()
    }

    #[inline]
    fn slot(&self, key: K) -> Option<usize> {
        let (page, offset) = self.locate(key);
        let slot = self.page(page)?.slots[offset];
        (slot != VACANT).then_some(slot)
    }

    /// Page `page`, allocating it and widening the window as needed.
    fn page_mut(&mut self, page: usize) -> &mut Page {
        if self.pages.is_empty() {
            self.first_page = page;
        }
        while page < self.first_page {
            self.pages.push_front(None);
            self.first_page -= 1;
        }
        let index = page - self.first_page;
        if index >= self.pages.len() {
            self.pages.resize_with(index + 1, || None);
        }
        let size = self.page_size;
        self.pages[index].get_or_insert_with(|| Page::new(size))
    }

    /// Drop unallocated table slots at both ends of the window.
    fn trim_window(&mut self) {
        while matches!(self.pages.front(), Some(None)) {
            self.pages.pop_front();
            self.first_page += 1;
        }
        while matches!(self.pages.back(), Some(None)) {
            self.pages.pop_back();
        }
        if self.pages.is_empty() {
            self.first_page = 0;
        }
    }

    /// Insert or overwrite. Returns the previous value when the key was present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.slot(key) {
            return Some(std::mem::replace(&mut self.dense_values[slot], value));
        }
        self.push_new(key, value);
        None
    }

    /// Insert only if `key` is absent. Returns whether the value was stored.
    pub fn try_insert(&mut self, key: K, value: V) -> bool {
        if self.contains(key) {
            return false;
        }
        self.push_new(key, value);
        true
    }

    fn push_new(&mut self, key: K, value: V) {
        let dense_index = self.dense_keys.len();
        let (page, offset) = self.locate(key);
        let page = self.page_mut(page);
        page.slots[offset] = dense_index;
        page.occupied += 1;
        self.dense_keys.push(key);
        self.dense_values.push(value);
    }

    /// Remove `key` by swapping the last dense entry into its slot.
    ///
    /// Returns `None` if the key was absent. Otherwise the removed value and,
    /// when another key had to move, that key and its new dense index.
    pub fn remove(&mut self, key: K) -> Option<SparseRemoval<K, V>> {
        let removed_index = self.slot(key)?;
        let last_index = self.dense_keys.len() - 1;

        let moved = if removed_index != last_index {
            let last_key = self.dense_keys[last_index];
            self.dense_keys.swap(removed_index, last_index);
            self.dense_values.swap(removed_index, last_index);
            let (page, offset) = self.locate(last_key);
            if let Some(page) = self.existing_page_mut(page) {
                page.slots[offset] = removed_index;
            }
            Some((last_key, removed_index))
        } else {
            None
        };

        self.dense_keys.pop();
        let value = self.dense_values.pop()?;

        let (page_index, offset) = self.locate(key);
        let page_emptied = match self.existing_page_mut(page_index) {
            Some(page) => {
                page.slots[offset] = VACANT;
                page.occupied -= 1;
                page.occupied == 0
            }
            None => false,
        };
        if self.reclaim_empty_pages && page_emptied {
            self.pages[page_index - self.first_page] = None;
            self.trim_window();
        }

        Some(SparseRemoval { value, moved })
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.slot(key).is_some()
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.slot(key).map(|slot| &self.dense_values[slot])
    }

    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let slot = self.slot(key)?;
        self.dense_values.get_mut(slot)
    }

    /// Dense index currently holding `key`
    pub fn index_of(&self, key: K) -> Option<usize> {
        self.slot(key)
    }

    /// Bounds-checked access to the dense entry at `index`
    pub fn entry_at(&self, index: usize) -> Result<(K, &V)> {
        match (self.dense_keys.get(index), self.dense_values.get(index)) {
            (Some(key), Some(value)) => Ok((*key, value)),
            _ => Err(EcsError::IndexOutOfRange {
                index,
                len: self.dense_keys.len(),
            }),
        }
    }

    /// Pre-allocate sparse pages for keys `0..=max_key` and dense room for `count` entries.
    pub fn reserve(&mut self, max_key: usize, count: usize) {
        let required_pages = max_key / self.page_size + 1;
        for page in 0..required_pages {
            self.page_mut(page);
        }

        self.dense_keys
            .reserve(count.saturating_sub(self.dense_keys.len()));
        self.dense_values
            .reserve(count.saturating_sub(self.dense_values.len()));
    }

    pub fn len(&self) -> usize {
        self.dense_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense_keys.is_empty()
    }

    /// Drop every entry and every sparse page.
    pub fn clear(&mut self) {
        self.dense_keys.clear();
        self.dense_values.clear();
        self.pages.clear();
        self.first_page = 0;
    }

    /// Release spare dense capacity and unallocated pages at the window ends.
    pub fn shrink_to_fit(&mut self) {
        self.trim_window();
        self.pages.shrink_to_fit();
        self.dense_keys.shrink_to_fit();
        self.dense_values.shrink_to_fit();
    }

    pub fn keys(&self) -> &[K] {
        &self.dense_keys
    }

    pub fn values(&self) -> &[V] {
        &self.dense_values
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.dense_keys.iter().copied().zip(self.dense_values.iter())
    }

    /// Number of sparse pages currently allocated
    pub fn allocated_pages(&self) -> usize {
        self.pages.iter().filter(|page| page.is_some()).count()
    }

    pub fn memory_usage_in_bytes(&self) -> usize {
        let page_bytes = self.allocated_pages() * self.page_size * std::mem::size_of::<usize>();
        std::mem::size_of::<Self>()
            + self.pages.capacity() * std::mem::size_of::<Option<Page>>()
            + page_bytes
            + self.dense_keys.capacity() * std::mem::size_of::<K>()
            + self.dense_values.capacity() * std::mem::size_of::<V>()
    }
}

impl<K: SparseKey, V: Clone> PagedSparseSet<K, V> {
    fn empty_like(&self) -> Self {
        Self::with_page_size(self.page_size).reclaim_empty_pages(self.reclaim_empty_pages)
    }

    /// Keys present in both sets, with values from `self`
    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = self.empty_like();
        for (key, value) in self.iter() {
            if other.contains(key) {
                out.insert(key, value.clone());
            }
        }
        out
    }

    /// Keys present in either set; `self` wins when both hold a key
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (key, value) in other.iter() {
            out.try_insert(key, value.clone());
        }
        out
    }

    /// Keys of `self` that `other` lacks
    pub fn difference(&self, other: &Self) -> Self {
        let mut out = self.empty_like();
        for (key, value) in self.iter() {
            if !other.contains(key) {
                out.insert(key, value.clone());
            }
        }
        out
    }
}
