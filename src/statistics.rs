use crate::evaluation::Evaluation;
use crate::history::History;
use crate::population::Population;
use serde::Serialize;

/// Snapshot field name of the built-in generation counter.
pub const GENERATION: &str = "generation";
/// Snapshot field name of the built-in best-raw-fitness tracker.
pub const BEST_RAW_FITNESS: &str = "best_raw_fitness";

/// One recorded metric value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Metric {
    Generation(u64),
    Fitness(Evaluation),
    Scalar(f64),
    /// The tracker had nothing to report, e.g. best fitness of an empty
    /// population.
    Absent,
}

impl Metric {
    pub fn as_generation(&self) -> Option<u64> {
        match self {
            Metric::Generation(generation) => Some(*generation),
            _ => None,
        }
    }

    pub fn as_fitness(&self) -> Option<&Evaluation> {
        match self {
            Metric::Fitness(evaluation) => Some(evaluation),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Metric::Scalar(value) => Some(*value),
            _ => None,
        }
    }
}

/// A per-generation metric: reads the population (and the history
/// recorded so far, where needed) and produces one value.
///
/// Trackers are independent of each other; adding or removing one never
/// requires touching another.
pub trait Tracker<T> {
    fn name(&self) -> &'static str;

    fn compute(&self, population: &Population<T>, history: &History<T>) -> Metric;
}

/// Ordered registry of trackers, assembled at configuration time. Every
/// [`History::next`] call runs the whole registry once, in order.
pub struct TrackerSet<T> {
    trackers: Vec<Box<dyn Tracker<T>>>,
}

impl<T> TrackerSet<T> {
    pub fn new() -> Self {
        Self {
            trackers: Vec::new(),
        }
    }

    /// The generation counter plus the best raw fitness.
    pub fn standard() -> Self
    where
        T: 'static,
    {
        Self::new().with(GenerationCounter).with(BestRawFitness)
    }

    pub fn with(mut self, tracker: impl Tracker<T> + 'static) -> Self {
        self.trackers.push(Box::new(tracker));
        self
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub(crate) fn snapshot(&self, population: &Population<T>, history: &History<T>) -> Statistics {
        Statistics {
            values: self
                .trackers
                .iter()
                .map(|tracker| (tracker.name(), tracker.compute(population, history)))
                .collect(),
        }
    }
}

impl<T> Default for TrackerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen aggregate of metric values, one per configured tracker.
/// Computed once per generation, then never mutated.
#[derive(Clone, Debug, Serialize)]
pub struct Statistics {
    values: Vec<(&'static str, Metric)>,
}

impl Statistics {
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, metric)| metric)
    }

    pub fn metrics(&self) -> impl Iterator<Item = (&'static str, &Metric)> + '_ {
        self.values.iter().map(|(field, metric)| (*field, metric))
    }

    pub fn generation(&self) -> Option<u64> {
        self.metric(GENERATION)?.as_generation()
    }

    pub fn best_raw_fitness(&self) -> Option<&Evaluation> {
        self.metric(BEST_RAW_FITNESS)?.as_fitness()
    }
}

/// Monotonic generation counter. The first snapshot carries the
/// history's configured start value, every later one the predecessor
/// plus one.
pub struct GenerationCounter;

impl<T> Tracker<T> for GenerationCounter {
    fn name(&self) -> &'static str {
        GENERATION
    }

    fn compute(&self, _population: &Population<T>, history: &History<T>) -> Metric {
        let next = history
            .newest()
            .and_then(Statistics::generation)
            .map(|generation| generation + 1)
            .unwrap_or_else(|| history.start_generation());
        Metric::Generation(next)
    }
}

/// Best raw evaluation currently in the population, judged by the
/// population's own fitness comparator.
pub struct BestRawFitness;

impl<T> Tracker<T> for BestRawFitness {
    fn name(&self) -> &'static str {
        BEST_RAW_FITNESS
    }

    fn compute(&self, population: &Population<T>, _history: &History<T>) -> Metric {
        match population.best() {
            Some(individual) => Metric::Fitness(individual.evaluation().clone()),
            None => Metric::Absent,
        }
    }
}
