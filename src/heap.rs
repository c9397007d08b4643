//! Binary min-heap ordered by an injected comparator.
//!
//! The heap is used by the search to pick the next cell to expand. The ordering is not taken from
//! [`Ord`] but from a `less(a, b)` function handed over at construction time, which lets the search
//! break ties on a secondary key without wrapping its entries in newtypes.

use std::fmt;

use thiserror::Error;

/// Error returned when reading from an empty queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Error)]
#[error("priority queue is empty")]
pub struct EmptyQueue;

/// Binary min-heap keyed by a comparator.
///
/// The element for which `less` holds against every other element sits at the root. Elements that
/// compare equal in both directions come out in unspecified order.
pub struct PriorityQueue<T, F> {
    /// Heap-ordered storage, root first.
    heap: Vec<T>,
    /// Strict ordering function; `less(a, b)` is `true` when `a` must come out before `b`.
    less: F,
}

impl<T, F> fmt::Debug for PriorityQueue<T, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PriorityQueue")
            .field("len", &self.heap.len())
            .finish_non_exhaustive()
    }
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Creates an empty queue ordered by `less`.
    pub const fn new(less: F) -> Self {
        Self {
            heap: Vec::new(),
            less,
        }
    }

    /// Creates an empty queue with room for `capacity` elements.
    pub fn with_capacity(less: F, capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            less,
        }
    }

    /// Returns the number of queued elements.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns whether the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the root element without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueue`] if there is nothing queued.
    pub fn peek(&self) -> Result<&T, EmptyQueue> {
        self.heap.first().ok_or(EmptyQueue)
    }

    /// Appends a value and restores the heap order. Runs in `O(log n)`.
    pub fn push(&mut self, value: T) {
        self.heap.push(value);
        self.sift_up(self.heap.len().saturating_sub(1));
    }

    /// Removes and returns the root element. Runs in `O(log n)`.
    ///
    /// The root is swapped with the last leaf, the old root is taken off the end and the new root
    /// is moved down into place.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueue`] if there is nothing queued.
    pub fn pop(&mut self) -> Result<T, EmptyQueue> {
        let last = self.heap.len().checked_sub(1).ok_or(EmptyQueue)?;
        self.heap.swap(0, last);
        let root = self.heap.pop().ok_or(EmptyQueue)?;
        self.sift_down(0);

        Ok(root)
    }

    /// Compares the elements stored at two heap slots.
    ///
    /// A slot past the end never compares as less, which lets the sift routines probe children
    /// without checking bounds first.
    fn less_at(&self, lhs: usize, rhs: usize) -> bool {
        match (self.heap.get(lhs), self.heap.get(rhs)) {
            (Some(lhs), Some(rhs)) => (self.less)(lhs, rhs),
            _ => false,
        }
    }

    /// Moves the element at `index` towards the root until its parent no longer ranks after it.
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.less_at(index, parent) {
                break;
            }
            self.heap.swap(index, parent);
            index = parent;
        }
    }

    /// Moves the element at `index` towards the leaves until both children rank after it.
    fn sift_down(&mut self, mut index: usize) {
        loop {
            let left = 2 * index + 1;
            let right = left + 1;

            let mut first = index;
            if self.less_at(left, first) {
                first = left;
            }
            if self.less_at(right, first) {
                first = right;
            }
            if first == index {
                break;
            }

            self.heap.swap(index, first);
            index = first;
        }
    }
}
