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

//! Component mask backed by a Vec<u64>.
//! One bit per ComponentId, used for fast superset checks when matching views.

use crate::component::ComponentId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    pub fn from_ids(ids: &[ComponentId]) -> Self {
        let mut set = Self::default();
        for &id in ids {
            set.set(id as usize);
        }
        set
    }

    /// Set the bit at `index` to true.
    /// Resizes automatically if index is out of bounds.
    pub fn set(&mut self, index: usize) {
        let (word_idx, bit_idx) = (index / 64, index % 64);
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }
        self.words[word_idx] |= 1 << bit_idx;
    }

    /// Check if the bit at `index` is set.
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = (index / 64, index % 64);
        if word_idx >= self.words.len() {
            return false;
        }
        (self.words[word_idx] & (1 << bit_idx)) != 0
    }

    /// Returns true if every bit set in `other` is also set in `self`.
    pub fn is_superset_of(&self, other: &Self) -> bool {
        other.words.iter().enumerate().all(|(i, &word)| {
            let mine = self.words.get(i).copied().unwrap_or(0);
            mine & word == word
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superset() {
        let wide = BitSet::from_ids(&[0, 3, 70]);
        let narrow = BitSet::from_ids(&[3, 70]);
        assert!(wide.is_superset_of(&narrow));
        assert!(!narrow.is_superset_of(&wide));
        assert!(wide.is_superset_of(&BitSet::default()));
        assert!(!BitSet::from_ids(&[1]).is_superset_of(&BitSet::from_ids(&[65])));
    }

    #[test]
    fn test_set_and_contains() {
        let mut set = BitSet::from_ids(&[5, 130]);
        set.set(64);
        assert!(set.contains(5));
        assert!(set.contains(64));
        assert!(set.contains(130));
        assert!(!set.contains(6));
        assert!(!set.contains(1_000));
    }
}
