//! Bucket aggregation: counts per key, each bucket with its own nested
//! aggregations.
//!
//! Buckets are kept in ascending key order. A key is located by binary
//! search and a new bucket is inserted at the insertion point, so the list
//! never needs re-sorting.
//!
//! # Examples
//!
//! ```rust
//! use polycodec::bucket::BucketAggregator;
//!
//! // Buckets by year, each counting its months.
//! let mut years: BucketAggregator<u16, BucketAggregator<u8>> = BucketAggregator::new();
//! for (year, month) in [(2024, 3), (2023, 1), (2024, 3), (2024, 7)] {
//!     years.add(year).add(month);
//! }
//!
//! let summary: Vec<_> = years.buckets().iter().map(|b| (b.key, b.count)).collect();
//! assert_eq!(summary, [(2023, 1), (2024, 3)]);
//! assert_eq!(years.get(&2024).unwrap().aggregations.len(), 2);
//! ```
use alloc::vec::Vec;

#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket<K, A> {
    pub key: K,
    pub count: u64,
    /// Aggregations over the items that fell into this bucket.
    pub aggregations: A,
}

#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketAggregator<K, A = ()> {
    buckets: Vec<Bucket<K, A>>,
}

impl<K, A> Default for BucketAggregator<K, A> {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
        }
    }
}

impl<K: Ord, A: Default> BucketAggregator<K, A> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one item under `key` and returns that bucket's nested
    /// aggregations.
    pub fn add(&mut self, key: K) -> &mut A {
        let position = match self.buckets.binary_search_by(|bucket| bucket.key.cmp(&key)) {
            Ok(found) => found,
            Err(insert_at) => {
                self.buckets.insert(
                    insert_at,
                    Bucket {
                        key,
                        count: 0,
                        aggregations: A::default(),
                    },
                );
                insert_at
            }
        };
        let bucket = &mut self.buckets[position];
        bucket.count += 1;
        &mut bucket.aggregations
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&Bucket<K, A>> {
        self.buckets
            .binary_search_by(|bucket| bucket.key.cmp(key))
            .ok()
            .map(|found| &self.buckets[found])
    }
}

impl<K, A> BucketAggregator<K, A> {
    /// All buckets, ascending by key.
    #[must_use]
    pub fn buckets(&self) -> &[Bucket<K, A>] {
        &self.buckets
    }

    #[must_use]
    pub fn into_buckets(self) -> Vec<Bucket<K, A>> {
        self.buckets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use quickcheck_macros::quickcheck;

    use super::*;

    #[test]
    fn keys_stay_sorted_with_counts() {
        let mut aggregator: BucketAggregator<i32> = BucketAggregator::new();
        for key in [5, 1, 3, 1] {
            aggregator.add(key);
        }
        let buckets: Vec<(i32, u64)> = aggregator
            .buckets()
            .iter()
            .map(|bucket| (bucket.key, bucket.count))
            .collect();
        assert_eq!(buckets, [(1, 2), (3, 1), (5, 1)]);
    }

    #[test]
    fn nested_aggregations_are_per_bucket() {
        let mut by_parity: BucketAggregator<bool, BucketAggregator<u8>> = BucketAggregator::new();
        for n in [4u8, 1, 2, 4, 3] {
            by_parity.add(n % 2 == 0).add(n);
        }
        let even = by_parity.get(&true).unwrap();
        assert_eq!(even.count, 3);
        assert_eq!(even.aggregations.get(&4).map(|b| b.count), Some(2));
        assert_eq!(by_parity.get(&false).unwrap().aggregations.len(), 2);
    }

    #[quickcheck]
    fn buckets_match_sorted_input(keys: Vec<i16>) -> bool {
        let mut aggregator: BucketAggregator<i16> = BucketAggregator::new();
        for key in &keys {
            aggregator.add(*key);
        }

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        let mut expected: Vec<(i16, u64)> = Vec::new();
        for key in sorted {
            match expected.last_mut() {
                Some((last, count)) if *last == key => *count += 1,
                _ => expected.push((key, 1)),
            }
        }

        let actual: Vec<(i16, u64)> = aggregator
            .buckets()
            .iter()
            .map(|bucket| (bucket.key, bucket.count))
            .collect();
        actual == expected
    }
}
