use crate::population::Population;
use crate::statistics::{Statistics, TrackerSet};
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
#[error("history capacity must be at least 1")]
pub struct ZeroCapacity;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("lookback offset {offset} exceeds the {recorded} recorded snapshots")]
pub struct OutOfRange {
    pub offset: usize,
    pub recorded: usize,
}

/// Bounded, append-only record of per-generation statistics snapshots.
///
/// Appending at capacity evicts the oldest snapshot, so memory stays
/// proportional to the configured capacity no matter how long a run
/// lasts. Created once per run; the driver appends exactly one snapshot
/// per generation via [`History::next`].
pub struct History<T> {
    trackers: TrackerSet<T>,
    snapshots: VecDeque<Statistics>,
    capacity: usize,
    start_generation: u64,
}

impl<T> History<T> {
    /// A history with generation counting starting at zero.
    pub fn new(capacity: usize, trackers: TrackerSet<T>) -> Result<Self, ZeroCapacity> {
        Self::starting_at(capacity, 0, trackers)
    }

    /// A history whose generation counter begins at `start_generation`.
    /// Capacity zero is a configuration error.
    pub fn starting_at(
        capacity: usize,
        start_generation: u64,
        trackers: TrackerSet<T>,
    ) -> Result<Self, ZeroCapacity> {
        if capacity == 0 {
            return Err(ZeroCapacity);
        }
        Ok(Self {
            trackers,
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
            start_generation,
        })
    }

    /// Runs the tracker registry against `population`, freezes the result
    /// and appends it, evicting the oldest snapshot when at capacity.
    /// The population is only read.
    pub fn next(&mut self, population: &Population<T>) {
        let snapshot = self.trackers.snapshot(population, self);
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        debug!(
            generation = ?snapshot.generation(),
            recorded = self.snapshots.len() + 1,
            "recorded statistics snapshot"
        );
        self.snapshots.push_back(snapshot);
    }

    /// The snapshot `offset` generations before the newest; offset 0 is
    /// the newest itself.
    pub fn value_at(&self, offset: usize) -> Result<&Statistics, OutOfRange> {
        self.snapshots
            .len()
            .checked_sub(offset + 1)
            .and_then(|index| self.snapshots.get(index))
            .ok_or(OutOfRange {
                offset,
                recorded: self.snapshots.len(),
            })
    }

    pub fn newest(&self) -> Option<&Statistics> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn start_generation(&self) -> u64 {
        self.start_generation
    }

    /// Snapshots from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Statistics> {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{Direction, Evaluation, RawOrd};
    use crate::individual::{GenotypeId, Individual};

    fn empty_population() -> Population<()> {
        Population::ordered(RawOrd(Direction::Maximize))
    }

    #[test]
    fn zero_capacity_is_rejected_at_construction() {
        assert!(History::<()>::new(0, TrackerSet::standard()).is_err());
        assert!(History::<()>::new(1, TrackerSet::standard()).is_ok());
    }

    #[test]
    fn appending_beyond_capacity_evicts_the_oldest() {
        let population = empty_population();
        let mut history = History::new(3, TrackerSet::standard()).unwrap();

        for _ in 0..5 {
            history.next(&population);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.capacity(), 3);
        // Generations 0 and 1 were evicted.
        assert_eq!(history.value_at(2).unwrap().generation(), Some(2));
        assert_eq!(history.newest().unwrap().generation(), Some(4));
    }

    #[test]
    fn lookback_is_relative_to_the_newest() {
        let population = empty_population();
        let mut history = History::new(8, TrackerSet::standard()).unwrap();

        history.next(&population);
        history.next(&population);
        history.next(&population);

        assert_eq!(history.value_at(0).unwrap().generation(), Some(2));
        assert_eq!(history.value_at(1).unwrap().generation(), Some(1));
        assert_eq!(history.value_at(2).unwrap().generation(), Some(0));

        let err = history.value_at(3).unwrap_err();
        assert_eq!(
            err,
            OutOfRange {
                offset: 3,
                recorded: 3
            }
        );
    }

    #[test]
    fn lookback_on_an_empty_history_is_out_of_range() {
        let history: History<()> = History::new(4, TrackerSet::standard()).unwrap();
        assert!(history.newest().is_none());
        assert!(history.value_at(0).is_err());
    }

    #[test]
    fn next_reads_but_never_mutates_the_population() {
        let mut population = empty_population();
        population.insert([Individual::new(
            GenotypeId::new(0),
            Evaluation::scalar(1.0),
        )]);

        let mut history = History::new(2, TrackerSet::standard()).unwrap();
        history.next(&population);
        history.next(&population);

        assert_eq!(population.len(), 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn iteration_runs_oldest_to_newest() {
        let population = empty_population();
        let mut history = History::new(4, TrackerSet::standard()).unwrap();
        for _ in 0..3 {
            history.next(&population);
        }

        let generations: Vec<_> = history.iter().filter_map(Statistics::generation).collect();
        assert_eq!(generations, vec![0, 1, 2]);
    }
}
