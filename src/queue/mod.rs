//! Comparator-ordered queue.
//!
//! [`OrderedQueue`] keeps its elements sorted under a caller-supplied
//! [`Comparator`], highest priority at index 0. Elements the comparator ranks
//! equal keep their insertion order, so a comparator that ranks everything
//! equal turns the queue into a plain FIFO.
//!
//! # Complexity
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `offer` | O(n) linear scan + shift |
//! | `peek`, `at`, `len` | O(1) |
//! | `poll`, `remove_at` | O(n) shift |
//! | `remove_all` | O(n) |

use std::cmp::Ordering;

/// Three-way priority comparison between two elements.
///
/// `Less` means `a` has strictly higher priority than `b`, `Greater` means
/// `b` does, and `Equal` means neither outranks the other.
pub trait Comparator<T> {
    /// Compares `a` against `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Comparator that ranks every pair equal, giving pure insertion order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionOrder;

impl<T> Comparator<T> for InsertionOrder {
    fn compare(&self, _a: &T, _b: &T) -> Ordering {
        Ordering::Equal
    }
}

/// A sequence kept sorted by a comparator, with stable ties.
///
/// # Example
/// ```
/// use u_cpusched::queue::OrderedQueue;
///
/// let mut q = OrderedQueue::new(|a: &i32, b: &i32| a.cmp(b));
/// assert_eq!(q.offer(5), 0);
/// assert_eq!(q.offer(1), 0);
/// assert_eq!(q.offer(3), 1);
/// assert_eq!(q.poll(), Some(1));
/// assert_eq!(q.peek(), Some(&3));
/// ```
#[derive(Debug, Clone)]
pub struct OrderedQueue<T, C> {
    items: Vec<T>,
    comparator: C,
}

impl<T, C: Comparator<T>> OrderedQueue<T, C> {
    /// Creates an empty queue ordered by `comparator`.
    pub fn new(comparator: C) -> Self {
        Self {
            items: Vec::new(),
            comparator,
        }
    }

    /// Inserts `item` after every element ranked higher or equal, returning
    /// the index it landed at.
    pub fn offer(&mut self, item: T) -> usize {
        let index = self
            .items
            .iter()
            .position(|existing| self.comparator.compare(existing, &item) == Ordering::Greater)
            .unwrap_or(self.items.len());
        self.items.insert(index, item);
        index
    }

    /// Returns the head without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Removes and returns the head.
    pub fn poll(&mut self) -> Option<T> {
        self.remove_at(0)
    }

    /// Returns the element at `index`, or `None` when out of bounds.
    pub fn at(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Removes the element at `index`, shifting later elements up.
    ///
    /// Out-of-bounds indices return `None` and leave the queue untouched.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Removes every element `same` considers identical to `item`.
    ///
    /// Identity is independent of the comparator. Survivors keep their
    /// relative order. Returns the number removed.
    pub fn remove_all<F>(&mut self, item: &T, same: F) -> usize
    where
        F: Fn(&T, &T) -> bool,
    {
        self.remove_where(|existing| same(existing, item))
    }

    /// Removes every element matching `pred`, returning how many went.
    pub fn remove_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|existing| !pred(existing));
        before - self.items.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates from highest to lowest priority.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The comparator ordering this queue.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }
}

impl<'a, T, C> IntoIterator for &'a OrderedQueue<T, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
