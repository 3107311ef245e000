//! Running median over a stream of values.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

/// Median maintained incrementally with two heaps.
///
/// - `smaller` is a max-heap of values at or below the current median.
/// - `larger` is a min-heap of values at or above the current median.
///
/// After every insertion the heap sizes differ by at most one. Storage grows with the number of
/// values seen.
#[derive(Debug, Clone, Default)]
pub struct RunningMedian {
    smaller: BinaryHeap<OrderedFloat<f64>>,
    larger: BinaryHeap<Reverse<OrderedFloat<f64>>>,
    val: f64,
}

impl RunningMedian {
    /// Create an empty running median.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current median. `0.0` before the first insertion.
    pub fn value(&self) -> f64 {
        self.val
    }

    /// Number of values inserted so far.
    pub fn len(&self) -> usize {
        self.smaller.len() + self.larger.len()
    }

    /// Whether no value was inserted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sizes of the `(smaller, larger)` heaps.
    pub fn heap_sizes(&self) -> (usize, usize) {
        (self.smaller.len(), self.larger.len())
    }

    /// Insert `v` and update the median.
    ///
    /// # Panics
    ///
    /// Panics if the heaps end up differing in size by more than one, which would mean the
    /// balancing logic is broken.
    pub fn push(&mut self, v: f64) {
        let v = OrderedFloat(v);
        match (self.smaller.peek().copied(), self.larger.peek().copied()) {
            (None, None) => self.smaller.push(v),
            (None, Some(Reverse(top))) => {
                if v > top {
                    self.larger.pop();
                    self.smaller.push(top);
                    self.larger.push(Reverse(v));
                } else {
                    self.smaller.push(v);
                }
            }
            (Some(top), None) => {
                if v < top {
                    self.smaller.pop();
                    self.larger.push(Reverse(top));
                    self.smaller.push(v);
                } else {
                    self.larger.push(Reverse(v));
                }
            }
            (Some(_), Some(_)) => {
                let val = OrderedFloat(self.val);
                if v < val {
                    self.smaller.push(v);
                } else if v > val {
                    self.larger.push(Reverse(v));
                } else if self.smaller.len() <= self.larger.len() {
                    self.smaller.push(v);
                } else {
                    self.larger.push(Reverse(v));
                }
            }
        }

        self.rebalance();
        self.val = self.current();

        let (s, l) = self.heap_sizes();
        assert!(
            s.abs_diff(l) <= 1,
            "median heaps out of balance: smaller={s} larger={l}"
        );
    }

    fn rebalance(&mut self) {
        let (s, l) = self.heap_sizes();
        if s == l + 2 {
            if let Some(top) = self.smaller.pop() {
                self.larger.push(Reverse(top));
            }
        } else if l == s + 2 {
            if let Some(Reverse(top)) = self.larger.pop() {
                self.smaller.push(top);
            }
        }
    }

    fn current(&self) -> f64 {
        match (self.smaller.peek(), self.larger.peek()) {
            (Some(s), Some(Reverse(l))) if self.smaller.len() == self.larger.len() => {
                0.5 * (s.0 + l.0)
            }
            (Some(s), _) if self.smaller.len() > self.larger.len() => s.0,
            (_, Some(Reverse(l))) => l.0,
            _ => 0.0,
        }
    }
}

impl Extend<f64> for RunningMedian {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for v in iter {
            self.push(v);
        }
    }
}
