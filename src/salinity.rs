//! Nearest-timestamp salinity lookup.
//!
//! Each measurement takes the salinity of the reference sample closest in
//! time; no interpolation. Queries outside the series take the nearest edge.
//!
//! On an exact tie the sample appearing first in the original series wins.
//! The series is stable-sorted once so lookups are a binary search.

use crate::models::SalinitySample;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy)]
struct IndexedSample {
    timestamp: NaiveDateTime,
    /// Position in the series as supplied
    order: usize,
    salinity: f64,
}

/// Salinity reference series sorted for nearest-neighbour queries
#[derive(Debug, Clone)]
pub struct SalinityResolver {
    samples: Vec<IndexedSample>,
}

impl SalinityResolver {
    /// Build a resolver from samples in any order. Returns `None` for an
    /// empty series.
    pub fn new(samples: &[SalinitySample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut indexed: Vec<IndexedSample> = samples
            .iter()
            .enumerate()
            .map(|(order, s)| IndexedSample {
                timestamp: s.timestamp,
                order,
                salinity: s.salinity,
            })
            .collect();
        // Stable, so equal timestamps keep their series order
        indexed.sort_by_key(|s| s.timestamp);

        Some(Self { samples: indexed })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Earliest and latest reference timestamps
    pub fn time_range(&self) -> (NaiveDateTime, NaiveDateTime) {
        (
            self.samples[0].timestamp,
            self.samples[self.samples.len() - 1].timestamp,
        )
    }

    /// Salinity of the sample nearest to `timestamp`
    pub fn resolve(&self, timestamp: NaiveDateTime) -> f64 {
        self.nearest(timestamp).salinity
    }

    fn nearest(&self, timestamp: NaiveDateTime) -> &IndexedSample {
        // First sample at or after the query; heads its group of equal timestamps
        let upper = self.samples.partition_point(|s| s.timestamp < timestamp);

        if upper == 0 {
            return &self.samples[0];
        }

        let below = self.group_head(upper - 1);
        if upper == self.samples.len() {
            return below;
        }

        let above = &self.samples[upper];
        let distance_below = timestamp - below.timestamp;
        let distance_above = above.timestamp - timestamp;

        if distance_below < distance_above {
            below
        } else if distance_above < distance_below {
            above
        } else if below.order < above.order {
            below
        } else {
            above
        }
    }

    /// First sample sharing the timestamp at `index`
    fn group_head(&self, index: usize) -> &IndexedSample {
        let timestamp = self.samples[index].timestamp;
        let head = self.samples[..=index].partition_point(|s| s.timestamp < timestamp);
        &self.samples[head]
    }
}
