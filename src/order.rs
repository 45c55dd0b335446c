//! Execution ordering for collected items.
//!
//! Items are bucketed by their order key; items without one go to a single
//! unordered bucket. Buckets run in ascending key order. The unordered bucket
//! is spliced in where the key sequence crosses from non-negative into
//! negative, or appended at the end when it never does.
use std::collections::BTreeMap;

/// Order-keyed buckets preserving discovery order within each bucket.
#[derive(Debug)]
pub struct OrderBuckets<T> {
    ordered: BTreeMap<i64, Vec<T>>,
    unordered: Vec<T>,
}

impl<T> Default for OrderBuckets<T> {
    fn default() -> Self {
        Self {
            ordered: BTreeMap::new(),
            unordered: Vec::new(),
        }
    }
}

impl<T> OrderBuckets<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, order: Option<i64>, item: T) {
        match order {
            Some(key) => self.ordered.entry(key).or_default().push(item),
            None => self.unordered.push(item),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty() && self.unordered.is_empty()
    }

    /// Flatten the buckets into final run order.
    pub fn into_ordered(self) -> Vec<T> {
        let mut unordered = Some(self.unordered).filter(|items| !items.is_empty());
        let mut sorted = Vec::new();
        let mut prev_key = 0;
        for (key, items) in self.ordered {
            if key < 0 && prev_key >= 0 {
                if let Some(pending) = unordered.take() {
                    sorted.extend(pending);
                }
            }
            prev_key = key;
            sorted.extend(items);
        }
        if let Some(pending) = unordered {
            sorted.extend(pending);
        }
        sorted
    }
}
