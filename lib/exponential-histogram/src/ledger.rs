//! Bucket storage, grouped by level.

use std::{collections::VecDeque, fmt, mem};

use smallvec::SmallVec;

/// Highest level a bucket can be promoted to.
///
/// Buckets at this level carry a weight of 2^63, and are never merged any further: a level that overflows here simply
/// holds more buckets than its capacity.
const MAX_LEVEL: usize = 63;

/// A histogram bucket.
///
/// Represents `weight` stream elements, the most recent of which occurred at `boundary`. The time of the oldest element
/// is not tracked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bucket {
    weight: u64,
    boundary: i64,
}

impl Bucket {
    /// Returns the number of elements represented by this bucket.
    ///
    /// This is always a power of two.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Returns the timestamp of the most recent element represented by this bucket.
    pub fn boundary(&self) -> i64 {
        self.boundary
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}@{}]", self.weight, self.boundary)
    }
}

/// A sequence of `len` same-level buckets that all share the same boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Run {
    boundary: i64,
    len: u64,
}

impl Run {
    const fn single(boundary: i64) -> Self {
        Self { boundary, len: 1 }
    }
}

type Runs = SmallVec<[Run; 4]>;

fn push_run(runs: &mut Runs, boundary: i64, len: u64) {
    match runs.last_mut() {
        Some(last) if last.boundary == boundary => last.len = last.len.saturating_add(len),
        _ => runs.push(Run { boundary, len }),
    }
}

/// Merges two boundary-ordered sequences of runs, keeping runs from `first` ahead of runs from `second` on ties.
fn interleave<A, B>(first: A, second: B) -> Vec<Run>
where
    A: IntoIterator<Item = Run>,
    B: IntoIterator<Item = Run>,
{
    let mut first = first.into_iter().peekable();
    let mut merged = Vec::new();
    for run in second {
        while let Some(earlier) = first.next_if(|r| r.boundary <= run.boundary) {
            merged.push(earlier);
        }
        merged.push(run);
    }
    merged.extend(first);
    merged
}

const fn level_weight(level: usize) -> u64 {
    1 << level
}

/// The bucket ledger.
///
/// Buckets are grouped by level, where every bucket at level `i` has a weight of `2^i`. Within a level, bucket
/// boundaries are kept in ascending order (oldest first), with ties kept in insertion order.
///
/// Every level above zero holds at most `level_capacity` buckets, while level zero holds one more. Whenever a level
/// goes over capacity, its two oldest buckets are merged into a single bucket on the next level up, which can itself
/// go over capacity, and so on.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Ledger {
    levels: Vec<VecDeque<i64>>,
    level_capacity: usize,
    total_weight: u64,
}

impl Ledger {
    /// Creates an empty ledger.
    ///
    /// `level_capacity` is clamped to a minimum of two, as merging the two oldest buckets of a level needs at least
    /// three buckets to be present.
    pub(crate) fn new(level_capacity: usize) -> Self {
        Self {
            levels: Vec::new(),
            level_capacity: level_capacity.max(2),
            total_weight: 0,
        }
    }

    fn empty_like(&self) -> Self {
        Self::new(self.level_capacity)
    }

    fn capacity(&self, level: usize) -> usize {
        if level == 0 {
            self.level_capacity.saturating_add(1)
        } else {
            self.level_capacity
        }
    }

    fn level_mut(&mut self, level: usize) -> &mut VecDeque<i64> {
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, VecDeque::new);
        }
        &mut self.levels[level]
    }

    fn finish_mutation(&mut self) {
        while self.levels.last().is_some_and(VecDeque::is_empty) {
            self.levels.pop();
        }

        self.total_weight = self
            .levels
            .iter()
            .enumerate()
            .fold(0u64, |total, (level, buckets)| {
                total.saturating_add(level_weight(level).saturating_mul(buckets.len() as u64))
            });
    }

    /// Returns the sum of all bucket weights.
    pub(crate) fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns the weight of the oldest bucket, or zero if the ledger is empty.
    pub(crate) fn oldest_weight(&self) -> u64 {
        self.levels
            .iter()
            .rposition(|buckets| !buckets.is_empty())
            .map_or(0, level_weight)
    }

    /// Returns the number of buckets held across all levels.
    pub(crate) fn bucket_count(&self) -> usize {
        self.levels.iter().map(VecDeque::len).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    pub(crate) fn clear(&mut self) {
        self.levels.clear();
        self.total_weight = 0;
    }

    /// Returns an iterator over all buckets, most recent first.
    ///
    /// Lower levels always hold more recent buckets than higher levels, so this walks levels from the bottom up, and
    /// each level from its newest bucket to its oldest.
    pub(crate) fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.levels.iter().enumerate().flat_map(|(level, buckets)| {
            buckets.iter().rev().map(move |&boundary| Bucket {
                weight: level_weight(level),
                boundary,
            })
        })
    }

    /// Adds a single bucket at `level`, cascading merges upward as needed.
    pub(crate) fn add_unit(&mut self, level: usize, boundary: i64) {
        let mut level = level.min(MAX_LEVEL);
        let mut boundary = boundary;
        loop {
            let capacity = self.capacity(level);
            let buckets = self.level_mut(level);
            let idx = buckets.partition_point(|&b| b <= boundary);
            buckets.insert(idx, boundary);

            if buckets.len() <= capacity || level == MAX_LEVEL {
                break;
            }

            let (Some(older), Some(newer)) = (buckets.pop_front(), buckets.pop_front()) else {
                break;
            };
            boundary = older.max(newer);
            level += 1;
        }

        self.finish_mutation();
    }

    /// Adds `count` weight-one buckets with the same boundary.
    ///
    /// The result is identical to calling `add_unit(0, boundary)` `count` times, as long as `boundary` is not older
    /// than any bucket already in level zero, but runs in time proportional to the number of levels touched rather
    /// than to `count`.
    pub(crate) fn add_many(&mut self, boundary: i64, count: u64) {
        if count == 0 {
            return;
        }

        let mut carry = Runs::new();
        carry.push(Run { boundary, len: count });

        let mut level = 0;
        while !carry.is_empty() && level <= MAX_LEVEL {
            carry = self.absorb(level, carry);
            level += 1;
        }

        self.finish_mutation();
    }

    /// Absorbs `incoming` buckets into `level`, returning the runs of merged buckets to carry to the next level.
    ///
    /// Merging two oldest buckets at a time until the level is back within capacity always removes an even number of
    /// buckets from the front of the (ordered) level, so we can figure out up front how many buckets get merged, and
    /// pair them off in a single pass instead of one merge at a time.
    fn absorb<I>(&mut self, level: usize, incoming: I) -> Runs
    where
        I: IntoIterator<Item = Run>,
    {
        let capacity = self.capacity(level) as u64;
        let existing = mem::take(self.level_mut(level));
        let merged = interleave(existing.into_iter().map(Run::single), incoming);

        let total = merged.iter().fold(0u64, |total, run| total.saturating_add(run.len));
        let mut to_merge = if level < MAX_LEVEL && total > capacity {
            (total - capacity).div_ceil(2) * 2
        } else {
            0
        };

        let mut carry = Runs::new();
        let mut unpaired = None;
        let buckets = self.level_mut(level);
        for run in merged {
            let taken = run.len.min(to_merge);
            if taken > 0 {
                let mut remaining = taken;
                if let Some(older) = unpaired.take() {
                    push_run(&mut carry, run.boundary.max(older), 1);
                    remaining -= 1;
                }

                let pairs = remaining / 2;
                if pairs > 0 {
                    push_run(&mut carry, run.boundary, pairs);
                }

                if remaining % 2 == 1 {
                    unpaired = Some(run.boundary);
                }
                to_merge -= taken;
            }

            for _ in taken..run.len {
                buckets.push_back(run.boundary);
            }
        }

        carry
    }

    /// Merges all buckets from `other` into this ledger.
    ///
    /// Levels are combined from the bottom up, with the merges needed to bring each level back within this ledger's
    /// capacity carried into the level above before it is combined.
    pub(crate) fn merge(&mut self, other: &Ledger) {
        let mut carry = Runs::new();
        let mut level = 0;
        while level <= MAX_LEVEL && (level < other.levels.len() || !carry.is_empty()) {
            let theirs = other
                .levels
                .get(level)
                .into_iter()
                .flatten()
                .map(|&boundary| Run::single(boundary));
            let incoming = interleave(theirs, carry);
            carry = self.absorb(level, incoming);
            level += 1;
        }

        self.finish_mutation();
    }

    /// Removes every bucket with a boundary older than `cutoff`, returning the total weight removed.
    pub(crate) fn drop_older_than(&mut self, cutoff: i64) -> u64 {
        let mut removed = 0u64;
        for (level, buckets) in self.levels.iter_mut().enumerate() {
            let before = buckets.len();
            buckets.retain(|&boundary| boundary >= cutoff);
            let dropped = (before - buckets.len()) as u64;
            removed = removed.saturating_add(level_weight(level).saturating_mul(dropped));
        }

        self.finish_mutation();
        removed
    }

    /// Splits off roughly `fraction` of the total weight into a new ledger.
    ///
    /// Buckets are moved starting from the highest level, newest bucket first within a level, until the moved weight
    /// reaches `fraction` of the total weight. The split point can only fall on a bucket boundary.
    pub(crate) fn split_by_count(&mut self, fraction: f64) -> Ledger {
        let target = self.total_weight as f64 * fraction;
        let mut split = self.empty_like();
        let mut moved = 0u64;

        for level in (0..self.levels.len()).rev() {
            while (moved as f64) < target {
                let Some(boundary) = self.levels[level].pop_back() else {
                    break;
                };
                split.level_mut(level).push_front(boundary);
                moved = moved.saturating_add(level_weight(level));
            }
        }

        self.finish_mutation();
        split.finish_mutation();
        split
    }
}
