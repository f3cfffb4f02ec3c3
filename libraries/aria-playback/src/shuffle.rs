//! Shuffle queue
//!
//! A materialized permutation of active-list indices. It is regenerated on
//! demand, always with the index that is playing pinned at position 0, so
//! entering shuffle never interrupts the current track.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffled play order over the active list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShuffleQueue {
    order: Vec<usize>,
}

impl ShuffleQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a stored order if it is a permutation of `0..len`
    pub fn from_order(order: Vec<usize>, len: usize) -> Option<Self> {
        let queue = Self { order };
        queue.is_permutation_of(len).then_some(queue)
    }

    /// Build a new random order over `0..len` with `pinned` first
    ///
    /// Fisher-Yates over the remaining indices. `pinned` outside the range
    /// gives a plain shuffle.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, len: usize, pinned: usize, rng: &mut R) {
        self.order.clear();
        if len == 0 {
            return;
        }

        let mut rest: Vec<usize> = (0..len).filter(|&i| i != pinned).collect();
        rest.shuffle(rng);

        if pinned < len {
            self.order.push(pinned);
        }
        self.order.extend(rest);
    }

    /// Entry after `index` in play order, `None` if `index` is last or absent
    pub fn after(&self, index: usize) -> Option<usize> {
        let position = self.position_of(index)?;
        self.order.get(position + 1).copied()
    }

    /// Entry before `index` in play order, `None` if `index` is first or absent
    pub fn before(&self, index: usize) -> Option<usize> {
        let position = self.position_of(index)?;
        position.checked_sub(1).map(|p| self.order[p])
    }

    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|&i| i == index)
    }

    pub fn first(&self) -> Option<usize> {
        self.order.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.order.last().copied()
    }

    /// Entry at a queue position
    pub fn get(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// Whether the queue holds every index of `0..len` exactly once
    pub fn is_permutation_of(&self, len: usize) -> bool {
        if self.order.len() != len {
            return false;
        }
        let mut seen = vec![false; len];
        for &i in &self.order {
            if i >= len || seen[i] {
                return false;
            }
            seen[i] = true;
        }
        true
    }
}
